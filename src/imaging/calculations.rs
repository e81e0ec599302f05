//! Pure calculation functions for crop geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the centered crop that gives a source the target aspect ratio.
///
/// The crop keeps one source dimension intact and shortens the other:
/// - source relatively wider than the target: height is kept, width is cut
/// - otherwise (taller or equal): width is kept, height is cut
///
/// Only the shortened dimension is rounded (half away from zero), so the crop
/// never exceeds the source and its ratio is within half a pixel of the target.
///
/// # Arguments
/// * `source` - Source image dimensions (width, height), both non-zero
/// * `aspect` - Target aspect ratio as (width, height), both non-zero
///
/// # Returns
/// * `(width, height)` - Crop rectangle size
///
/// # Examples
/// ```
/// # use brand_assets::imaging::calculate_centered_crop;
/// // 2000x1200 source is narrower than 2:1 → keep width, cut height to 1000
/// assert_eq!(calculate_centered_crop((2000, 1200), (2, 1)), (2000, 1000));
///
/// // Square target on a landscape source → min edge on both axes
/// assert_eq!(calculate_centered_crop((1600, 900), (1, 1)), (900, 900));
/// ```
pub fn calculate_centered_crop(source: (u32, u32), aspect: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = aspect;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height is kept, width is cut
        let w = (src_h as f64 * tgt_aspect).round() as u32;
        (w.clamp(1, src_w), src_h)
    } else {
        // Source is taller or equal: width is kept, height is cut
        let h = (src_w as f64 / tgt_aspect).round() as u32;
        (src_w, h.clamp(1, src_h))
    }
}
