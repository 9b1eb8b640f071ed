//! Per-activation ribbon effect: owns the ribbons and runs one frame at a
//! time against a [`RibbonRenderer`].
//!
//! Frame order is fixed: sample the pointer, spring every head, propagate
//! every trail, rebuild every strip, then submit all ribbons as one batch.

use crate::clock::FrameClock;
use crate::config::{ConfigError, EffectConfig, ValidatedConfig};
use crate::constants::RIBBON_OPACITY;
use crate::geometry::PolylineGeometry;
use crate::pointer::PointerState;
use crate::ribbon::{build_ribbons, Ribbon};
use crate::shader::{FrameUniforms, RibbonUniforms, ShaderToggles};
use crate::spring::step_spring;
use crate::trail::propagate;
use instant::Instant;
use rand::Rng;
use std::cell::Cell;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("surface lost or outdated; reconfigured")]
    SurfaceLost,
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("frame skipped: {0}")]
    Skipped(String),
}

/// One ribbon ready for submission.
#[derive(Clone, Copy, Debug)]
pub struct RibbonDraw<'a> {
    pub geometry: &'a PolylineGeometry,
    pub uniforms: RibbonUniforms,
}

/// Graphics collaborator consumed by the effect.
pub trait RibbonRenderer {
    /// Resize the drawing surface, in physical pixels.
    fn resize(&mut self, width: u32, height: u32);
    /// Draw all ribbons in one pass over a cleared target.
    fn render(&mut self, draws: &[RibbonDraw<'_>], clear: [f32; 4]) -> Result<(), RenderError>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub dpr: f32,
}

struct RibbonRecord {
    ribbon: Ribbon,
    geometry: PolylineGeometry,
}

pub struct RibbonEffect {
    config: ValidatedConfig,
    records: Vec<RibbonRecord>,
    pointer: PointerState,
    clock: FrameClock,
    viewport: Viewport,
}

impl RibbonEffect {
    pub fn new<R: Rng + ?Sized>(
        config: &EffectConfig,
        pointer: PointerState,
        viewport: Viewport,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        let validated = config.validate()?;
        Ok(Self::from_validated(validated, pointer, viewport, rng))
    }

    pub fn from_validated<R: Rng + ?Sized>(
        config: ValidatedConfig,
        pointer: PointerState,
        viewport: Viewport,
        rng: &mut R,
    ) -> Self {
        let records = build_ribbons(&config, rng)
            .into_iter()
            .map(|ribbon| RibbonRecord {
                geometry: PolylineGeometry::new(ribbon.len()),
                ribbon,
            })
            .collect::<Vec<_>>();
        log::info!(
            "[ribbons] built {} ribbons x {} points ({:?})",
            records.len(),
            config.point_count,
            config.trail
        );
        Self {
            config,
            records,
            pointer,
            clock: FrameClock::new(),
            viewport,
        }
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    pub fn ribbons(&self) -> impl Iterator<Item = &Ribbon> {
        self.records.iter().map(|r| &r.ribbon)
    }

    pub fn ribbons_mut(&mut self) -> impl Iterator<Item = &mut Ribbon> {
        self.records.iter_mut().map(|r| &mut r.ribbon)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Apply a host size change. Geometry is regenerated so the next draw
    /// never uses stale buffers, even before the first simulated frame.
    pub fn resize<Rn: RibbonRenderer + ?Sized>(&mut self, viewport: Viewport, renderer: &mut Rn) {
        if viewport.width == 0 || viewport.height == 0 {
            return;
        }
        self.viewport = viewport;
        renderer.resize(viewport.width, viewport.height);
        for rec in &mut self.records {
            rec.geometry.update(&rec.ribbon.points);
        }
    }

    /// Advance the simulation by `dt_ms` and rebuild every strip.
    pub fn step(&mut self, dt_ms: f32) {
        let pointer = self.pointer.get();
        let trail = self.config.trail;
        for rec in &mut self.records {
            step_spring(&mut rec.ribbon, pointer);
            propagate(&mut rec.ribbon.points, dt_ms, trail);
        }
        for rec in &mut self.records {
            rec.geometry.update(&rec.ribbon.points);
        }
    }

    pub fn draws(&self) -> Vec<RibbonDraw<'_>> {
        let frame = FrameUniforms {
            resolution: [self.viewport.width as f32, self.viewport.height as f32],
            dpr: self.viewport.dpr,
            time_sec: self.clock.elapsed_sec(),
        };
        let toggles = ShaderToggles {
            enable_fade: self.config.enable_fade,
            enable_effect: self.config.enable_shader_effect,
            effect_amplitude: self.config.effect_amplitude,
        };
        self.records
            .iter()
            .map(|rec| RibbonDraw {
                geometry: &rec.geometry,
                uniforms: RibbonUniforms::new(
                    rec.ribbon.color,
                    rec.ribbon.thickness,
                    RIBBON_OPACITY,
                    frame,
                    toggles,
                ),
            })
            .collect()
    }

    pub fn frame<Rn: RibbonRenderer + ?Sized>(&mut self, renderer: &mut Rn) -> Result<(), RenderError> {
        self.frame_at(Instant::now(), renderer)
    }

    pub fn frame_at<Rn: RibbonRenderer + ?Sized>(
        &mut self,
        now: Instant,
        renderer: &mut Rn,
    ) -> Result<(), RenderError> {
        let dt_ms = self.clock.tick_at(now);
        self.step(dt_ms);
        let draws = self.draws();
        renderer.render(&draws, self.config.background_color)
    }
}

/// Shared stop flag for a frame loop. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    Stop,
}

/// One loop iteration: honours the token, runs a frame, and decides whether
/// another frame should be scheduled.
pub fn run_frame<Rn: RibbonRenderer + ?Sized>(
    token: &CancelToken,
    effect: &mut RibbonEffect,
    renderer: &mut Rn,
) -> FrameOutcome {
    if token.is_cancelled() {
        return FrameOutcome::Stop;
    }
    match effect.frame(renderer) {
        Ok(()) => FrameOutcome::Continue,
        Err(RenderError::OutOfMemory) => {
            log::error!("[ribbons] out of GPU memory; stopping");
            token.cancel();
            FrameOutcome::Stop
        }
        Err(e) => {
            log::warn!("[ribbons] {e}");
            FrameOutcome::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Default)]
    struct CountingRenderer {
        frames: usize,
        last_draws: usize,
        size: (u32, u32),
    }

    impl RibbonRenderer for CountingRenderer {
        fn resize(&mut self, width: u32, height: u32) {
            self.size = (width, height);
        }
        fn render(&mut self, draws: &[RibbonDraw<'_>], _clear: [f32; 4]) -> Result<(), RenderError> {
            self.frames += 1;
            self.last_draws = draws.len();
            Ok(())
        }
    }

    fn viewport() -> Viewport {
        Viewport {
            width: 800,
            height: 600,
            dpr: 1.0,
        }
    }

    fn effect(pointer: PointerState) -> RibbonEffect {
        RibbonEffect::new(
            &EffectConfig::default(),
            pointer,
            viewport(),
            &mut StdRng::seed_from_u64(3),
        )
        .unwrap()
    }

    #[test]
    fn one_batch_per_frame_with_every_ribbon() {
        let mut fx = effect(PointerState::new());
        let mut r = CountingRenderer::default();
        fx.frame(&mut r).unwrap();
        fx.frame(&mut r).unwrap();
        assert_eq!(r.frames, 2);
        assert_eq!(r.last_draws, 4);
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let cfg = EffectConfig {
            point_count: 1,
            ..Default::default()
        };
        let res = RibbonEffect::new(&cfg, PointerState::new(), viewport(), &mut StdRng::seed_from_u64(0));
        assert!(matches!(res, Err(ConfigError::TooFewPoints(1))));
    }

    #[test]
    fn heads_chase_the_pointer() {
        let pointer = PointerState::new();
        let mut fx = effect(pointer.clone());
        pointer.set(Vec3::new(0.5, 0.5, 0.0));
        fx.step(16.0);
        for r in fx.ribbons() {
            assert!(r.head().x > 0.0 && r.head().y > 0.0);
        }
    }

    #[test]
    fn resize_updates_uniform_resolution() {
        let mut fx = effect(PointerState::new());
        let mut r = CountingRenderer::default();
        fx.resize(
            Viewport {
                width: 1024,
                height: 512,
                dpr: 2.0,
            },
            &mut r,
        );
        assert_eq!(r.size, (1024, 512));
        let draws = fx.draws();
        assert_eq!(draws[0].uniforms.resolution, [1024.0, 512.0]);
        assert_eq!(draws[0].uniforms.dpr, 2.0);
    }

    #[test]
    fn zero_size_resize_is_ignored() {
        let mut fx = effect(PointerState::new());
        let mut r = CountingRenderer::default();
        fx.resize(
            Viewport {
                width: 0,
                height: 10,
                dpr: 1.0,
            },
            &mut r,
        );
        assert_eq!(fx.viewport(), viewport());
        assert_eq!(r.size, (0, 0));
    }

    #[test]
    fn cancelled_loop_does_no_work() {
        let token = CancelToken::new();
        let mut fx = effect(PointerState::new());
        let mut r = CountingRenderer::default();
        assert_eq!(run_frame(&token, &mut fx, &mut r), FrameOutcome::Continue);
        token.clone().cancel();
        assert_eq!(run_frame(&token, &mut fx, &mut r), FrameOutcome::Stop);
        assert_eq!(r.frames, 1);
    }

    struct OomRenderer;

    impl RibbonRenderer for OomRenderer {
        fn resize(&mut self, _: u32, _: u32) {}
        fn render(&mut self, _: &[RibbonDraw<'_>], _: [f32; 4]) -> Result<(), RenderError> {
            Err(RenderError::OutOfMemory)
        }
    }

    #[test]
    fn out_of_memory_stops_the_loop() {
        let token = CancelToken::new();
        let mut fx = effect(PointerState::new());
        assert_eq!(run_frame(&token, &mut fx, &mut OomRenderer), FrameOutcome::Stop);
        assert!(token.is_cancelled());
    }
}
