//! Font sizing for rendered signature names

/// Size used for names up to [`THRESHOLD_LENGTH`] characters
pub const DEFAULT_SIZE: f32 = 32.0;

/// Smallest size a name is ever drawn at
pub const MINIMUM_SIZE: f32 = 12.0;

/// Longest name drawn at the default size
pub const THRESHOLD_LENGTH: usize = 20;

/// Font size for a signature name
///
/// Shrinks by one point per character beyond the threshold, never below
/// the minimum. Glyph widths are not measured, so very wide names at the
/// minimum size can still overflow the mark.
pub fn size_for(text: &str) -> f32 {
    let length = text.chars().count();
    if length <= THRESHOLD_LENGTH {
        return DEFAULT_SIZE;
    }
    let shrink = (length - THRESHOLD_LENGTH) as f32;
    (DEFAULT_SIZE - shrink).max(MINIMUM_SIZE)
}
