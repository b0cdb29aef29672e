use crate::{
    error::{SeghashError, SeghashResult},
    playlist::Variant,
};

/// Picks the rendition with the lowest bandwidth.
///
/// When several variants share the lowest bandwidth, the one listed first in
/// the playlist wins, so the same playlist always yields the same choice.
pub fn select_variant(variants: &[Variant]) -> SeghashResult<&Variant> {
    if variants.is_empty() {
        return Err(SeghashError::NoVariantsAvailable);
    }

    // `min_by_key` keeps the first of equal elements
    variants
        .iter()
        .min_by_key(|variant| variant.bandwidth)
        .ok_or(SeghashError::NoVariantsAvailable)
}
