use super::EventSubscription;
use crate::dom;
use ribbons_core::PointerState;
use web_sys as web;

fn set_from_client(pointer: &PointerState, x: i32, y: i32) {
    let (w, h) = dom::window_css_size();
    pointer.set_from_client(x as f32, y as f32, w as f32, h as f32);
}

/// Mouse and first-touch movement on the window feed the shared pointer.
pub fn wire_pointer_tracking(
    window: &web::Window,
    pointer: &PointerState,
) -> anyhow::Result<Vec<EventSubscription>> {
    let mouse_pointer = pointer.clone();
    let mouse = EventSubscription::listen(window, "mousemove", move |ev: web::MouseEvent| {
        set_from_client(&mouse_pointer, ev.client_x(), ev.client_y());
    })?;

    let touch_pointer = pointer.clone();
    let touch = EventSubscription::listen(window, "touchmove", move |ev: web::TouchEvent| {
        if let Some(t) = ev.touches().get(0) {
            set_from_client(&touch_pointer, t.client_x(), t.client_y());
        }
    })?;

    Ok(vec![mouse, touch])
}

/// Keep the canvas backing store in step with the window; the frame loop
/// picks the new size up before its next draw.
pub fn wire_canvas_resize(
    window: &web::Window,
    canvas: &web::HtmlCanvasElement,
    dpr: &std::rc::Rc<std::cell::Cell<f32>>,
) -> anyhow::Result<EventSubscription> {
    dpr.set(dom::sync_canvas_backing_size(canvas));
    let canvas = canvas.clone();
    let dpr = dpr.clone();
    EventSubscription::listen(window, "resize", move |_: web::Event| {
        dpr.set(dom::sync_canvas_backing_size(&canvas));
    })
}
