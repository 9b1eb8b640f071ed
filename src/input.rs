// Pure helpers shared by the DOM wiring; no web-sys types so they can be
// exercised on the host.

use ribbons_core::constants::{FALLBACK_DPR, MAX_BACKING_DIMENSION};
use ribbons_core::fit_to_max_dimension;

#[inline]
pub fn effective_dpr(reported: f64) -> f32 {
    if reported.is_finite() && reported > 0.0 {
        reported as f32
    } else {
        FALLBACK_DPR
    }
}

/// Physical backing-store size for a CSS box at `dpr`, never zero and never
/// past the default GPU texture limit (aspect preserved).
#[inline]
pub fn backing_size(css_width: f64, css_height: f64, dpr: f32) -> (u32, u32) {
    let w = (css_width * dpr as f64).max(0.0) as u32;
    let h = (css_height * dpr as f64).max(0.0) as u32;
    fit_to_max_dimension(w, h, MAX_BACKING_DIMENSION)
}

/// Viewport size from `window.innerWidth/innerHeight`, which arrive as
/// loosely typed JS numbers.
#[inline]
pub fn inner_size(width: Option<f64>, height: Option<f64>) -> (f64, f64) {
    let clean = |v: Option<f64>| v.filter(|x| x.is_finite() && *x > 0.0).unwrap_or(1.0);
    (clean(width), clean(height))
}
