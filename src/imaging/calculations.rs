//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Largest size that fits inside `bounds` with `source`'s aspect ratio.
///
/// One edge matches its bound exactly, the other is at most its bound.
/// Small sources are scaled up; nothing is ever cropped or stretched.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `bounds` - Box to fit into (width, height)
///
/// # Returns
/// * `(width, height)` - Fitted dimensions, each at least 1
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;
    if src_w == 0 || src_h == 0 {
        return (max_w.max(1), max_h.max(1));
    }

    let scale_w = max_w as f64 / src_w as f64;
    let scale_h = max_h as f64 / src_h as f64;

    if scale_w <= scale_h {
        // Width is the binding edge
        let h = (src_h as f64 * scale_w).round() as u32;
        (max_w.max(1), h.clamp(1, max_h.max(1)))
    } else {
        let w = (src_w as f64 * scale_h).round() as u32;
        (w.clamp(1, max_w.max(1)), max_h.max(1))
    }
}
