use ribbons_core::{run_frame, CancelToken, FrameOutcome, GpuRenderer, RibbonEffect, Viewport};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext {
    pub effect: RibbonEffect,
    pub renderer: GpuRenderer<'static>,
    pub canvas: web::HtmlCanvasElement,
    pub dpr: Rc<Cell<f32>>,
}

impl FrameContext {
    /// Pick up any canvas size change before drawing so none is lost.
    fn reconcile_viewport(&mut self) {
        let current = Viewport {
            width: self.canvas.width(),
            height: self.canvas.height(),
            dpr: self.dpr.get(),
        };
        if current != self.effect.viewport() {
            self.effect.resize(current, &mut self.renderer);
        }
    }

    pub fn frame(&mut self, token: &CancelToken) -> FrameOutcome {
        if token.is_cancelled() {
            return FrameOutcome::Stop;
        }
        self.reconcile_viewport();
        run_frame(token, &mut self.effect, &mut self.renderer)
    }
}

type TickClosure = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// A running requestAnimationFrame loop. `stop` cancels the pending frame and
/// releases the closure, and with it the effect and GPU resources.
pub struct FrameLoop {
    tick: TickClosure,
    pending: Rc<Cell<Option<i32>>>,
}

fn schedule(tick: &TickClosure, pending: &Cell<Option<i32>>) {
    let Some(w) = web::window() else { return };
    if let Some(cb) = tick.borrow().as_ref() {
        pending.set(w.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
    }
}

impl FrameLoop {
    pub fn start(mut ctx: FrameContext, token: CancelToken, on_stop: impl Fn() + 'static) -> Self {
        let tick: TickClosure = Rc::new(RefCell::new(None));
        let pending = Rc::new(Cell::new(None));
        let tick_clone = tick.clone();
        let pending_clone = pending.clone();
        *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            pending_clone.set(None);
            match ctx.frame(&token) {
                FrameOutcome::Continue => schedule(&tick_clone, &pending_clone),
                FrameOutcome::Stop => on_stop(),
            }
        }) as Box<dyn FnMut()>));
        schedule(&tick, &pending);
        Self { tick, pending }
    }

    pub fn stop(&self) {
        if let (Some(id), Some(w)) = (self.pending.take(), web::window()) {
            _ = w.cancel_animation_frame(id);
        }
        self.tick.borrow_mut().take();
    }
}
