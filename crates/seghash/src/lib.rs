//! Fingerprints every segment of one HLS rendition, in delivery order.
//!
//! ```text
//! master URL ─► PlaylistResolver ─► select_variant ─► PlaylistResolver
//!                                                          │
//!            RecordSink ◄─ SegmentProcessor ◄─ SegmentPipeline ◄─┘
//! ```
//!
//! The lowest-bandwidth variant of the master playlist is chosen, its media
//! playlist is fetched, and each segment is downloaded and hashed with
//! SHA-256. Records leave through a [`RecordSink`] in playlist order.

pub mod error;
pub mod fetch;
pub mod ingest;
pub mod pipeline;
pub mod playlist;
pub mod processor;
pub mod resolve;
pub mod select;
pub mod sink;
pub mod util;

#[cfg(test)]
mod testing;

pub use error::{SeghashError, SeghashResult};
pub use fetch::{ByteStream, Fetch, RequestConfig};
pub use ingest::{Ingest, IngestOutcome};
pub use pipeline::{PipelineReport, SegmentPipeline};
pub use processor::{FingerprintRecord, Fingerprinter, SegmentProcessor};
pub use sink::{OutputFormat, RecordSink, WriterSink};
pub use util::http::HttpClient;

pub use m3u8_rs;
pub use url::Url;
