use ribbons_core::SequenceMatcher;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Page-lifetime keydown listener; `on_complete` runs each time the
/// activation sequence is entered.
pub fn wire_activation_sequence(window: &web::Window, on_complete: impl Fn() + 'static) {
    let matcher = Rc::new(RefCell::new(SequenceMatcher::new()));
    let closure = Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
        if ev.repeat() {
            return;
        }
        let fired = matcher.borrow_mut().feed_key_name(&ev.key());
        if fired {
            log::info!("[keys] activation sequence entered");
            on_complete();
        }
    }) as Box<dyn FnMut(_)>);
    _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    closure.forget();
}
