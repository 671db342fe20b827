//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate output dimensions for a resize to an exact target width.
///
/// The aspect ratio of `original` is preserved and the height rounded to the
/// nearest pixel, never below 1. Targets wider than the original are
/// upscaled: every declared width must exist in the variant set.
///
/// # Examples
/// ```
/// # use folio_images::imaging::scale_to_width;
/// assert_eq!(scale_to_width((2000, 1500), 320), (320, 240));
/// assert_eq!(scale_to_width((600, 900), 1024), (1024, 1536));
/// ```
pub fn scale_to_width(original: (u32, u32), target_width: u32) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    if orig_w == 0 {
        return (target_width, orig_h.max(1));
    }
    let ratio = target_width as f64 / orig_w as f64;
    let height = (orig_h as f64 * ratio).round() as u32;
    (target_width, height.max(1))
}
