// Host-side tests for overlay constants.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}

use constants::*;

fn style(name: &str) -> Option<&'static str> {
    OVERLAY_STYLE.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
}

#[test]
fn overlay_never_intercepts_input() {
    assert_eq!(style("pointer-events"), Some("none"));
}

#[test]
fn overlay_covers_the_viewport_on_top() {
    assert_eq!(style("position"), Some("fixed"));
    assert_eq!(style("width"), Some("100vw"));
    assert_eq!(style("height"), Some("100vh"));
    assert_eq!(style("z-index"), Some("9999"));
}

#[test]
fn style_keys_are_unique() {
    for (i, (a, _)) in OVERLAY_STYLE.iter().enumerate() {
        assert!(OVERLAY_STYLE[i + 1..].iter().all(|(b, _)| a != b));
    }
}

#[test]
fn canvas_id_is_a_valid_dom_id() {
    assert!(!OVERLAY_CANVAS_ID.is_empty());
    assert!(!OVERLAY_CANVAS_ID.contains(char::is_whitespace));
}
