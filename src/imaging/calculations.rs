//! Pure calculation functions for resize geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// Geometry of a best-fill resize: scale to cover, then center-crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillPlan {
    /// Dimensions after scaling, before the crop.
    pub scaled: (u32, u32),
    /// Top-left corner of the crop window inside the scaled image.
    pub offset: (u32, u32),
    /// Final dimensions; always equal to the target.
    pub crop: (u32, u32),
}

/// Plan a best-fill resize.
///
/// The scale ratio is `min(src_w / tgt_w, src_h / tgt_h)`, so one edge lands
/// exactly on the target and the other overshoots. The overshoot is split
/// evenly, rounding the offset down.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Target box (width, height), both non-zero
///
/// # Examples
/// ```
/// # use mediadoc::imaging::calculations::fill_plan;
/// let plan = fill_plan((1000, 500), (400, 400));
/// assert_eq!(plan.scaled, (800, 400));
/// assert_eq!(plan.offset, (200, 0));
/// assert_eq!(plan.crop, (400, 400));
/// ```
pub fn fill_plan(source: (u32, u32), target: (u32, u32)) -> FillPlan {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let width_ratio = src_w as f64 / tgt_w as f64;
    let height_ratio = src_h as f64 / tgt_h as f64;
    let ratio = width_ratio.min(height_ratio);

    // Rounding can only land on the target edge, never below it.
    let scaled_w = ((src_w as f64 / ratio).round() as u32).max(tgt_w);
    let scaled_h = ((src_h as f64 / ratio).round() as u32).max(tgt_h);

    FillPlan {
        scaled: (scaled_w, scaled_h),
        offset: ((scaled_w - tgt_w) / 2, (scaled_h - tgt_h) / 2),
        crop: (tgt_w, tgt_h),
    }
}

/// Bounding box for a best-fit resize.
///
/// With `do_not_enlarge`, each target edge is clamped to the matching source
/// edge so the result is never larger than the original.
pub fn fit_bounds(source: (u32, u32), target: (u32, u32), do_not_enlarge: bool) -> (u32, u32) {
    if do_not_enlarge {
        (target.0.min(source.0), target.1.min(source.1))
    } else {
        target
    }
}

/// Largest dimensions with the source aspect ratio that fit inside `bounds`.
///
/// Neither edge drops below one pixel.
pub fn fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    let ratio = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);

    let w = ((src_w as f64 * ratio).round() as u32).clamp(1, max_w.max(1));
    let h = ((src_h as f64 * ratio).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // fill_plan
    // =========================================================================

    #[test]
    fn fill_landscape_into_square() {
        let plan = fill_plan((1000, 500), (400, 400));
        assert_eq!(plan.scaled, (800, 400));
        assert_eq!(plan.offset, (200, 0));
        assert_eq!(plan.crop, (400, 400));
    }

    #[test]
    fn fill_portrait_into_landscape() {
        // ratio = min(600/300, 800/100) = 2 → 300x400, crop 300x100 from y=150
        let plan = fill_plan((600, 800), (300, 100));
        assert_eq!(plan.scaled, (300, 400));
        assert_eq!(plan.offset, (0, 150));
    }

    #[test]
    fn fill_upscales_small_sources() {
        let plan = fill_plan((100, 50), (400, 400));
        assert_eq!(plan.scaled, (800, 400));
        assert_eq!(plan.crop, (400, 400));
    }

    #[test]
    fn fill_odd_excess_rounds_offset_down() {
        // 1001x500 into 400x400: ratio 1.25 → 800.8 rounds to 801, excess 401
        let plan = fill_plan((1001, 500), (400, 400));
        assert_eq!(plan.scaled, (801, 400));
        assert_eq!(plan.offset, (200, 0));
    }

    #[test]
    fn fill_same_aspect_has_no_offset() {
        let plan = fill_plan((1600, 900), (320, 180));
        assert_eq!(plan.scaled, (320, 180));
        assert_eq!(plan.offset, (0, 0));
    }

    // =========================================================================
    // fit_bounds / fit_dimensions
    // =========================================================================

    #[test]
    fn fit_bounds_clamps_when_not_enlarging() {
        assert_eq!(fit_bounds((1000, 500), (2000, 2000), true), (1000, 500));
        assert_eq!(fit_bounds((1000, 500), (300, 2000), true), (300, 500));
    }

    #[test]
    fn fit_bounds_passthrough_when_enlarging() {
        assert_eq!(fit_bounds((1000, 500), (2000, 2000), false), (2000, 2000));
    }

    #[test]
    fn fit_never_upscales_with_clamped_bounds() {
        let bounds = fit_bounds((1000, 500), (2000, 2000), true);
        assert_eq!(fit_dimensions((1000, 500), bounds), (1000, 500));
    }

    #[test]
    fn fit_preserves_aspect_ratio() {
        assert_eq!(fit_dimensions((1000, 500), (400, 400)), (400, 200));
        assert_eq!(fit_dimensions((500, 1000), (400, 400)), (200, 400));
    }

    #[test]
    fn fit_enlarges_when_allowed() {
        assert_eq!(fit_dimensions((100, 50), (2000, 2000)), (2000, 1000));
    }

    #[test]
    fn fit_keeps_at_least_one_pixel() {
        assert_eq!(fit_dimensions((10000, 10), (100, 100)), (100, 1));
    }
}
