use crate::constants::{OVERLAY_CANVAS_ID, OVERLAY_STYLE};
use crate::input;
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn device_pixel_ratio(window: &web::Window) -> f32 {
    input::effective_dpr(window.device_pixel_ratio())
}

/// Create the transparent full-viewport canvas and attach it to `<body>`.
pub fn mount_overlay_canvas(document: &web::Document) -> anyhow::Result<web::HtmlCanvasElement> {
    let body = document
        .body()
        .ok_or_else(|| anyhow::anyhow!("no document body"))?;
    let canvas: web::HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|e| anyhow::anyhow!("create canvas: {:?}", e))?
        .dyn_into()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    canvas.set_id(OVERLAY_CANVAS_ID);
    let style = canvas.style();
    for (name, value) in OVERLAY_STYLE {
        _ = style.set_property(name, value);
    }
    body.append_child(&canvas)
        .map_err(|e| anyhow::anyhow!("append canvas: {:?}", e))?;
    Ok(canvas)
}

#[inline]
pub fn unmount_overlay_canvas(canvas: &web::HtmlCanvasElement) {
    canvas.remove();
}

/// Match the canvas backing store to the window size times the device pixel
/// ratio. Returns the ratio used.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> f32 {
    let Some(w) = web::window() else {
        return ribbons_core::constants::FALLBACK_DPR;
    };
    let dpr = device_pixel_ratio(&w);
    let (css_w, css_h) = input::inner_size(
        w.inner_width().ok().and_then(|v| v.as_f64()),
        w.inner_height().ok().and_then(|v| v.as_f64()),
    );
    let (w_px, h_px) = input::backing_size(css_w, css_h, dpr);
    canvas.set_width(w_px);
    canvas.set_height(h_px);
    dpr
}

/// Window size in CSS pixels, used to normalize pointer positions.
pub fn window_css_size() -> (f64, f64) {
    match web::window() {
        Some(w) => input::inner_size(
            w.inner_width().ok().and_then(|v| v.as_f64()),
            w.inner_height().ok().and_then(|v| v.as_f64()),
        ),
        None => (1.0, 1.0),
    }
}
