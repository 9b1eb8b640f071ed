#![cfg(target_arch = "wasm32")]
use ribbons_core::{
    CancelToken, ContextOptions, EffectConfig, GpuRenderer, Mount, PointerState, RibbonEffect,
    ValidatedConfig, Viewport,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod constants;
mod dom;
mod events;
mod frame;
mod input;

use events::EventSubscription;

/// Everything owned by a mounted effect. Dropping it tears the overlay down.
struct Activation {
    canvas: web::HtmlCanvasElement,
    token: CancelToken,
    frame_loop: frame::FrameLoop,
    _subscriptions: Vec<EventSubscription>,
}

impl Drop for Activation {
    fn drop(&mut self) {
        self.token.cancel();
        self.frame_loop.stop();
        dom::unmount_overlay_canvas(&self.canvas);
        log::info!("[ribbons] deactivated");
    }
}

thread_local! {
    static MOUNT: RefCell<Mount<Activation>> = RefCell::new(Mount::Idle);
    static CONFIG: RefCell<EffectConfig> = RefCell::new(EffectConfig::default());
}

async fn mount(cfg: ValidatedConfig, token: CancelToken) -> anyhow::Result<Activation> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas = dom::mount_overlay_canvas(&document)?;
    match mount_on_canvas(&window, &canvas, cfg, token).await {
        Ok(a) => Ok(a),
        Err(e) => {
            dom::unmount_overlay_canvas(&canvas);
            Err(e)
        }
    }
}

async fn mount_on_canvas(
    window: &web::Window,
    canvas: &web::HtmlCanvasElement,
    cfg: ValidatedConfig,
    token: CancelToken,
) -> anyhow::Result<Activation> {
    let dpr = Rc::new(Cell::new(dom::sync_canvas_backing_size(canvas)));
    let (width, height) = (canvas.width(), canvas.height());

    let instance = wgpu::Instance::default();
    let surface = instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
        .map_err(|e| anyhow::anyhow!("create surface: {e}"))?;
    let renderer = GpuRenderer::new(
        &instance,
        surface,
        width,
        height,
        ContextOptions {
            dpr: dpr.get(),
            alpha: true,
            antialias: true,
        },
    )
    .await?;

    let pointer = PointerState::new();
    let viewport = Viewport {
        width,
        height,
        dpr: dpr.get(),
    };
    let effect = RibbonEffect::from_validated(cfg, pointer.clone(), viewport, &mut rand::thread_rng());
    log::info!(
        "[ribbons] mounted {} ribbons at {}x{} (dpr {:.2})",
        effect.ribbons().count(),
        width,
        height,
        dpr.get()
    );

    let mut subscriptions = events::pointer::wire_pointer_tracking(window, &pointer)?;
    subscriptions.push(events::pointer::wire_canvas_resize(window, canvas, &dpr)?);

    let ctx = frame::FrameContext {
        effect,
        renderer,
        canvas: canvas.clone(),
        dpr,
    };
    // The loop may stop itself (device loss); tear down outside the frame callback.
    let frame_loop = frame::FrameLoop::start(ctx, token.clone(), || spawn_local(async { deactivate() }));

    Ok(Activation {
        canvas: canvas.clone(),
        token,
        frame_loop,
        _subscriptions: subscriptions,
    })
}

#[inline]
fn is_idle() -> bool {
    MOUNT.with(|m| m.borrow().is_idle())
}

fn activate_configured() {
    if !is_idle() {
        log::info!("[ribbons] already active");
        return;
    }
    let validated = match CONFIG.with(|c| c.borrow().validate()) {
        Ok(v) => v,
        Err(e) => {
            log::error!("[ribbons] invalid config: {e}");
            return;
        }
    };
    let Some(token) = MOUNT.with(|m| m.borrow_mut().begin()) else {
        return;
    };
    spawn_local(async move {
        let mounted = match mount(validated, token.clone()).await {
            Ok(activation) => Some(activation),
            Err(e) => {
                log::error!("[ribbons] activation failed: {e:#}");
                None
            }
        };
        // deactivated while mounting: dropping tears down immediately
        let discarded = MOUNT.with(|m| m.borrow_mut().finish(&token, mounted));
        drop(discarded);
    });
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    _ = console_log::init_with_level(log::Level::Info);
    log::info!("[ribbons] waiting for activation sequence");
    if let Some(window) = web::window() {
        events::keyboard::wire_activation_sequence(&window, activate_configured);
    }
    Ok(())
}

/// Mount the effect with the current configuration. No-op when already active.
#[wasm_bindgen]
pub fn activate() {
    activate_configured();
}

/// Replace the configuration (camelCase keys, missing keys take defaults;
/// `maxAge: Infinity` arrives as `null` and means infinity) and activate.
/// Rejected while an effect is mounting or active.
#[wasm_bindgen(js_name = activateWith)]
pub fn activate_with(config: JsValue) -> Result<(), JsValue> {
    if !is_idle() {
        return Err(JsValue::from_str("already active; call deactivate() first"));
    }
    #[allow(deprecated)]
    let cfg: EffectConfig = config
        .into_serde()
        .map_err(|e| JsValue::from_str(&format!("invalid config: {e}")))?;
    cfg.validate()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    CONFIG.with(|c| *c.borrow_mut() = cfg);
    activate_configured();
    Ok(())
}

/// Stop the loop, release GPU resources and listeners, and remove the overlay.
#[wasm_bindgen]
pub fn deactivate() {
    let active = MOUNT.with(|m| m.borrow_mut().teardown());
    drop(active);
}
