// Host-side tests for pure input functions.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod input {
    include!("../src/input.rs");
}

use input::*;
use ribbons_core::constants::FALLBACK_DPR;
use ribbons_core::client_to_ndc;

#[test]
fn reported_dpr_is_used_when_sane() {
    assert_eq!(effective_dpr(1.0), 1.0);
    assert_eq!(effective_dpr(1.5), 1.5);
}

#[test]
fn missing_or_broken_dpr_falls_back() {
    assert_eq!(effective_dpr(0.0), FALLBACK_DPR);
    assert_eq!(effective_dpr(-1.0), FALLBACK_DPR);
    assert_eq!(effective_dpr(f64::NAN), FALLBACK_DPR);
    assert_eq!(effective_dpr(f64::INFINITY), FALLBACK_DPR);
}

#[test]
fn backing_size_scales_by_dpr() {
    assert_eq!(backing_size(800.0, 600.0, 2.0), (1600, 1200));
    assert_eq!(backing_size(1280.0, 720.0, 1.0), (1280, 720));
}

#[test]
fn backing_size_is_never_zero() {
    assert_eq!(backing_size(0.0, 0.0, 2.0), (1, 1));
    assert_eq!(backing_size(-10.0, 5.0, 1.0), (1, 5));
}

#[test]
fn ultrawide_high_dpr_backing_size_stays_within_texture_limit() {
    let (w, h) = backing_size(5120.0, 1440.0, 2.0);
    assert_eq!((w, h), (8192, 2304));
}

#[test]
fn inner_size_rejects_missing_values() {
    assert_eq!(inner_size(Some(1024.0), Some(768.0)), (1024.0, 768.0));
    assert_eq!(inner_size(None, Some(0.0)), (1.0, 1.0));
    assert_eq!(inner_size(Some(f64::NAN), Some(300.0)), (1.0, 300.0));
}

#[test]
fn window_centre_maps_to_ndc_origin() {
    let (w, h) = inner_size(Some(1000.0), Some(500.0));
    let p = client_to_ndc(500.0, 250.0, w as f32, h as f32);
    assert!(p.length() < 1e-6);
}

#[test]
fn window_corners_map_to_ndc_corners() {
    let (w, h) = inner_size(Some(1000.0), Some(500.0));
    let tl = client_to_ndc(0.0, 0.0, w as f32, h as f32);
    assert_eq!((tl.x, tl.y, tl.z), (-1.0, 1.0, 0.0));
    let br = client_to_ndc(1000.0, 500.0, w as f32, h as f32);
    assert_eq!((br.x, br.y), (1.0, -1.0));
}
