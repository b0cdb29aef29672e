use std::{fmt, future::Future};

use chrono::{DateTime, FixedOffset, Local, SecondsFormat};
use serde::{ser::SerializeStruct, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::{
    error::SeghashResult,
    fetch::{read_body, ByteStream},
    playlist::Segment,
};

/// Fingerprint of one downloaded segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintRecord {
    sequence: u64,
    size: u64,
    hash: [u8; 32],
    observed_at: DateTime<FixedOffset>,
}

impl FingerprintRecord {
    pub fn new(sequence: u64, payload: &[u8], observed_at: DateTime<FixedOffset>) -> Self {
        Self {
            sequence,
            size: payload.len() as u64,
            hash: Sha256::digest(payload).into(),
            observed_at,
        }
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// SHA-256 of the segment payload.
    pub fn hash(&self) -> &[u8; 32] {
        &self.hash
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    pub fn observed_at(&self) -> DateTime<FixedOffset> {
        self.observed_at
    }

    fn timestamp(&self) -> String {
        self.observed_at
            .to_rfc3339_opts(SecondsFormat::Nanos, true)
    }
}

impl fmt::Display for FingerprintRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - segment {} (size: {}) hash: {}",
            self.timestamp(),
            self.sequence,
            self.size,
            self.hash_hex()
        )
    }
}

impl Serialize for FingerprintRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut record = serializer.serialize_struct("FingerprintRecord", 4)?;
        record.serialize_field("sequence", &self.sequence)?;
        record.serialize_field("size", &self.size)?;
        record.serialize_field("hash", &self.hash_hex())?;
        record.serialize_field("observed_at", &self.timestamp())?;
        record.end()
    }
}

/// Turns a downloaded segment body into a record.
pub trait SegmentProcessor {
    fn process(
        &self,
        segment: &Segment,
        body: ByteStream,
    ) -> impl Future<Output = SeghashResult<FingerprintRecord>> + Send;
}

/// Hashes the whole payload with SHA-256 and stamps it with the local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fingerprinter;

impl SegmentProcessor for Fingerprinter {
    async fn process(&self, segment: &Segment, body: ByteStream) -> SeghashResult<FingerprintRecord> {
        let payload = read_body(body).await?;
        let observed_at: DateTime<FixedOffset> = Local::now().into();
        Ok(FingerprintRecord::new(segment.sequence, &payload, observed_at))
    }
}
