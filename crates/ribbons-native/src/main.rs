use anyhow::Context;
use ribbons_core::{
    run_frame, CancelToken, ContextOptions, EffectConfig, FrameOutcome, GpuRenderer, PointerState,
    RibbonEffect, RibbonRenderer, SeqKey, SequenceMatcher, ValidatedConfig, Viewport,
};
use std::sync::Arc;
use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::EventLoop,
    keyboard::{Key, NamedKey},
    window::{Window, WindowBuilder, WindowLevel},
};

// Small, decorated window shown while waiting for the key sequence
const STANDBY_SIZE: (f64, f64) = (480.0, 270.0);

struct Args {
    config_path: Option<String>,
    start_active: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Args {
    let mut out = Args {
        config_path: None,
        start_active: false,
    };
    for a in args {
        match a.as_str() {
            "--active" => out.start_active = true,
            _ if out.config_path.is_none() => out.config_path = Some(a),
            _ => log::warn!("[ribbons] ignoring extra argument {a}"),
        }
    }
    out
}

fn load_config(path: Option<&str>) -> anyhow::Result<ValidatedConfig> {
    let cfg = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p).with_context(|| format!("reading {p}"))?;
            toml::from_str::<EffectConfig>(&text).with_context(|| format!("parsing {p}"))?
        }
        None => EffectConfig::default(),
    };
    Ok(cfg.validate()?)
}

fn seq_key(key: &Key) -> Option<SeqKey> {
    match key {
        Key::Named(NamedKey::ArrowUp) => Some(SeqKey::Up),
        Key::Named(NamedKey::ArrowDown) => Some(SeqKey::Down),
        Key::Named(NamedKey::ArrowLeft) => Some(SeqKey::Left),
        Key::Named(NamedKey::ArrowRight) => Some(SeqKey::Right),
        Key::Character(c) => SeqKey::from_key_name(c.as_str()),
        _ => None,
    }
}

fn viewport_of(window: &Window) -> Viewport {
    let size = window.inner_size();
    Viewport {
        width: size.width.max(1),
        height: size.height.max(1),
        dpr: window.scale_factor() as f32,
    }
}

/// Window chrome for each state. Only an active effect covers the desktop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct WindowMode {
    decorated: bool,
    always_on_top: bool,
    maximized: bool,
}

impl WindowMode {
    fn for_state(active: bool) -> Self {
        Self {
            decorated: !active,
            always_on_top: active,
            maximized: active,
        }
    }

    fn apply(self, window: &Window) {
        window.set_decorations(self.decorated);
        window.set_window_level(if self.always_on_top {
            WindowLevel::AlwaysOnTop
        } else {
            WindowLevel::Normal
        });
        window.set_maximized(self.maximized);
        if !self.maximized {
            _ = window.request_inner_size(LogicalSize::new(STANDBY_SIZE.0, STANDBY_SIZE.1));
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum KeyOutcome {
    Ignore,
    Activate,
    Deactivate,
    Quit,
}

/// Escape deactivates a running effect and quits from standby.
fn key_outcome(key: &Key, active: bool, matcher: &mut SequenceMatcher) -> KeyOutcome {
    if let Key::Named(NamedKey::Escape) = key {
        return if active {
            KeyOutcome::Deactivate
        } else {
            KeyOutcome::Quit
        };
    }
    if matcher.feed(seq_key(key)) {
        KeyOutcome::Activate
    } else {
        KeyOutcome::Ignore
    }
}

/// The running effect and the token its frames check.
struct Active {
    effect: RibbonEffect,
    token: CancelToken,
}

struct Overlay {
    window: Arc<Window>,
    renderer: GpuRenderer<'static>,
    config: ValidatedConfig,
    pointer: PointerState,
    matcher: SequenceMatcher,
    active: Option<Active>,
}

impl Overlay {
    fn activate(&mut self) {
        if self.active.is_some() {
            log::info!("[ribbons] already active");
            return;
        }
        let effect = RibbonEffect::from_validated(
            self.config.clone(),
            self.pointer.clone(),
            viewport_of(&self.window),
            &mut rand::thread_rng(),
        );
        log::info!("[ribbons] activated with {} ribbons", effect.ribbons().count());
        WindowMode::for_state(true).apply(&self.window);
        self.active = Some(Active {
            effect,
            token: CancelToken::new(),
        });
        self.window.request_redraw();
    }

    fn deactivate(&mut self) {
        let Some(active) = self.active.take() else { return };
        active.token.cancel();
        // leave a cleared, fully transparent surface behind
        if let Err(e) = self.renderer.render(&[], [0.0; 4]) {
            log::warn!("[gpu] clear after deactivate: {e}");
        }
        WindowMode::for_state(false).apply(&self.window);
        log::info!("[ribbons] deactivated; Esc again quits");
    }

    fn resize(&mut self) {
        let vp = viewport_of(&self.window);
        match self.active.as_mut() {
            Some(a) => a.effect.resize(vp, &mut self.renderer),
            None => self.renderer.resize(vp.width, vp.height),
        }
    }

    /// Returns false when the app should exit.
    fn on_key(&mut self, key: &Key) -> bool {
        match key_outcome(key, self.active.is_some(), &mut self.matcher) {
            KeyOutcome::Ignore => {}
            KeyOutcome::Activate => {
                log::info!("[keys] activation sequence entered");
                self.activate();
            }
            KeyOutcome::Deactivate => self.deactivate(),
            KeyOutcome::Quit => return false,
        }
        true
    }

    fn set_pointer(&self, x: f64, y: f64) {
        let size = self.window.inner_size();
        self.pointer
            .set_from_client(x as f32, y as f32, size.width.max(1) as f32, size.height.max(1) as f32);
    }

    /// Returns false when the GPU is gone and the app should exit.
    fn frame(&mut self) -> bool {
        let Some(active) = self.active.as_mut() else {
            return true;
        };
        match run_frame(&active.token, &mut active.effect, &mut self.renderer) {
            FrameOutcome::Continue => {
                self.window.request_redraw();
                true
            }
            FrameOutcome::Stop => {
                self.active = None;
                false
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = parse_args(std::env::args().skip(1));
    let config = load_config(args.config_path.as_deref())?;

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Ribbons")
            .with_transparent(true)
            .with_inner_size(LogicalSize::new(STANDBY_SIZE.0, STANDBY_SIZE.1))
            .build(&event_loop)?,
    );

    let vp = viewport_of(&window);
    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(Arc::clone(&window))?;
    let renderer = pollster::block_on(GpuRenderer::new(
        &instance,
        surface,
        vp.width,
        vp.height,
        ContextOptions {
            dpr: vp.dpr,
            alpha: true,
            antialias: true,
        },
    ))?;

    let mut overlay = Overlay {
        window,
        renderer,
        config,
        pointer: PointerState::new(),
        matcher: SequenceMatcher::new(),
        active: None,
    };
    if args.start_active {
        overlay.activate();
    } else {
        log::info!(
            "[ribbons] waiting for activation sequence in the standby window; \
             the active overlay covers the desktop, Esc returns to standby, Esc in standby quits"
        );
    }

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => {
                overlay.deactivate();
                elwt.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => overlay.resize(),
            WindowEvent::CursorMoved { position, .. } => overlay.set_pointer(position.x, position.y),
            WindowEvent::Touch(Touch {
                phase: TouchPhase::Started | TouchPhase::Moved,
                location,
                ..
            }) => overlay.set_pointer(location.x, location.y),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if !overlay.on_key(&logical_key) {
                    elwt.exit();
                }
            }
            WindowEvent::RedrawRequested => {
                if !overlay.frame() {
                    elwt.exit();
                }
            }
            _ => {}
        },
        _ => {}
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_keys_and_letters_map_to_sequence_keys() {
        assert_eq!(seq_key(&Key::Named(NamedKey::ArrowUp)), Some(SeqKey::Up));
        assert_eq!(seq_key(&Key::Named(NamedKey::ArrowRight)), Some(SeqKey::Right));
        assert_eq!(seq_key(&Key::Character("b".into())), Some(SeqKey::B));
        assert_eq!(seq_key(&Key::Character("A".into())), Some(SeqKey::A));
        assert_eq!(seq_key(&Key::Character("x".into())), None);
        assert_eq!(seq_key(&Key::Named(NamedKey::Enter)), None);
    }

    #[test]
    fn only_an_active_effect_covers_the_desktop() {
        let standby = WindowMode::for_state(false);
        assert!(standby.decorated);
        assert!(!standby.always_on_top);
        assert!(!standby.maximized);

        let overlay = WindowMode::for_state(true);
        assert!(!overlay.decorated);
        assert!(overlay.always_on_top);
        assert!(overlay.maximized);
    }

    #[test]
    fn escape_deactivates_then_quits() {
        let mut m = SequenceMatcher::new();
        let esc = Key::Named(NamedKey::Escape);
        assert_eq!(key_outcome(&esc, true, &mut m), KeyOutcome::Deactivate);
        assert_eq!(key_outcome(&esc, false, &mut m), KeyOutcome::Quit);
    }

    #[test]
    fn completed_sequence_activates() {
        let mut m = SequenceMatcher::new();
        let keys = [
            Key::Named(NamedKey::ArrowUp),
            Key::Named(NamedKey::ArrowUp),
            Key::Named(NamedKey::ArrowDown),
            Key::Named(NamedKey::ArrowDown),
            Key::Named(NamedKey::ArrowLeft),
            Key::Named(NamedKey::ArrowRight),
            Key::Named(NamedKey::ArrowLeft),
            Key::Named(NamedKey::ArrowRight),
            Key::Character("b".into()),
        ];
        for k in &keys {
            assert_eq!(key_outcome(k, false, &mut m), KeyOutcome::Ignore);
        }
        assert_eq!(
            key_outcome(&Key::Character("a".into()), false, &mut m),
            KeyOutcome::Activate
        );
    }

    #[test]
    fn args_take_a_config_path_and_active_flag() {
        let a = parse_args(["--active".to_string(), "ribbons.toml".to_string()]);
        assert!(a.start_active);
        assert_eq!(a.config_path.as_deref(), Some("ribbons.toml"));

        let b = parse_args(Vec::<String>::new());
        assert!(!b.start_active);
        assert!(b.config_path.is_none());
    }

    #[test]
    fn missing_config_path_uses_defaults() {
        let cfg = load_config(None).unwrap();
        assert_eq!(cfg.palette.len(), 4);
    }

    #[test]
    fn unreadable_config_is_an_error() {
        assert!(load_config(Some("/nonexistent/ribbons.toml")).is_err());
    }
}
