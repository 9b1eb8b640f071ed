// Host-side integration tests for the ribbon simulation pipeline.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use ribbons_core::{
    EffectConfig, PointerState, RenderError, RibbonDraw, RibbonEffect, RibbonRenderer, Viewport,
};

#[derive(Default)]
struct RecordingRenderer {
    vertex_counts: Vec<Vec<usize>>,
    clears: Vec<[f32; 4]>,
}

impl RibbonRenderer for RecordingRenderer {
    fn resize(&mut self, _width: u32, _height: u32) {}

    fn render(&mut self, draws: &[RibbonDraw<'_>], clear: [f32; 4]) -> Result<(), RenderError> {
        self.vertex_counts
            .push(draws.iter().map(|d| d.geometry.vertex_count()).collect());
        self.clears.push(clear);
        Ok(())
    }
}

fn viewport() -> Viewport {
    Viewport {
        width: 640,
        height: 480,
        dpr: 1.0,
    }
}

/// Single ribbon, spring = friction = 1, zero offset, fixed-ratio easing.
fn exact_effect(pointer: PointerState) -> RibbonEffect {
    let cfg = EffectConfig {
        colors: vec!["#ffffff".into()],
        point_count: 3,
        base_spring: 1.0,
        base_friction: 1.0,
        max_age: 0.0,
        ..Default::default()
    };
    let mut fx = RibbonEffect::new(&cfg, pointer, viewport(), &mut StdRng::seed_from_u64(9)).unwrap();
    for r in fx.ribbons_mut() {
        r.spring = 1.0;
        r.friction = 1.0;
        r.pointer_offset = Vec3::ZERO;
    }
    fx
}

fn approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-6
}

#[test]
fn pointer_at_origin_keeps_everything_at_origin() {
    let mut fx = exact_effect(PointerState::new());
    fx.step(16.0);
    let r = fx.ribbons().next().unwrap();
    assert_eq!(r.points(), &[Vec3::ZERO; 3]);
}

#[test]
fn one_tick_toward_moved_pointer() {
    let pointer = PointerState::new();
    let mut fx = exact_effect(pointer.clone());
    pointer.set(Vec3::X);
    fx.step(16.0);
    let r = fx.ribbons().next().unwrap();
    // force = (1,0,0) * 1, velocity = force * 1, head = velocity
    let head = Vec3::X;
    assert!(approx(r.points()[0], head));
    let p1 = Vec3::ZERO.lerp(head, 0.9);
    assert!(approx(r.points()[1], p1));
    let p2 = Vec3::ZERO.lerp(p1, 0.9);
    assert!(approx(r.points()[2], p2));
}

#[test]
fn point_count_is_stable_across_frames() {
    let pointer = PointerState::new();
    let cfg = EffectConfig {
        point_count: 12,
        ..Default::default()
    };
    let mut fx = RibbonEffect::new(&cfg, pointer.clone(), viewport(), &mut StdRng::seed_from_u64(1)).unwrap();
    let mut renderer = RecordingRenderer::default();
    let t0 = instant::Instant::now();
    for i in 0..120u64 {
        pointer.set(Vec3::new((i as f32 * 0.1).sin(), (i as f32 * 0.07).cos(), 0.0));
        fx.frame_at(t0 + std::time::Duration::from_millis(i * 16), &mut renderer)
            .unwrap();
        for r in fx.ribbons() {
            assert_eq!(r.points().len(), 12);
        }
    }
    for frame in &renderer.vertex_counts {
        assert_eq!(frame, &vec![24; 4]);
    }
}

#[test]
fn retuning_ribbons_keeps_point_count() {
    let pointer = PointerState::new();
    let cfg = EffectConfig {
        point_count: 7,
        ..Default::default()
    };
    let mut fx = RibbonEffect::new(&cfg, pointer.clone(), viewport(), &mut StdRng::seed_from_u64(4)).unwrap();
    for r in fx.ribbons_mut() {
        r.spring = 0.2;
        r.thickness = 5.0;
    }
    pointer.set(Vec3::new(-0.5, 0.5, 0.0));
    for _ in 0..10 {
        fx.step(16.0);
    }
    for r in fx.ribbons() {
        assert_eq!(r.len(), 7);
        assert_eq!(r.spring, 0.2);
    }
    assert!(fx.draws().iter().all(|d| d.geometry.vertex_count() == 14));
}

#[test]
fn trail_never_leads_its_predecessor() {
    let pointer = PointerState::new();
    let mut fx = RibbonEffect::new(
        &EffectConfig::default(),
        pointer.clone(),
        viewport(),
        &mut StdRng::seed_from_u64(5),
    )
    .unwrap();
    // heavy damping keeps the head moving monotonically toward the target
    for r in fx.ribbons_mut() {
        r.spring = 0.03;
        r.friction = 0.5;
        r.pointer_offset = Vec3::ZERO;
    }
    pointer.set(Vec3::new(0.8, 0.0, 0.0));
    for _ in 0..30 {
        fx.step(16.0);
        for r in fx.ribbons() {
            // moving right from the origin: x must be non-increasing head to tail
            for w in r.points().windows(2) {
                assert!(w[1].x <= w[0].x + 1e-6);
            }
        }
    }
}

#[test]
fn first_frame_has_zero_dt_so_trail_is_still() {
    let pointer = PointerState::new();
    let mut fx = RibbonEffect::new(
        &EffectConfig::default(),
        pointer.clone(),
        viewport(),
        &mut StdRng::seed_from_u64(2),
    )
    .unwrap();
    pointer.set(Vec3::ONE);
    let mut renderer = RecordingRenderer::default();
    fx.frame(&mut renderer).unwrap();
    for r in fx.ribbons() {
        assert_ne!(r.points()[0], Vec3::ZERO);
        assert!(r.points()[1..].iter().all(|p| *p == Vec3::ZERO));
    }
}

#[test]
fn background_color_is_the_clear_color() {
    let cfg = EffectConfig {
        background_color: [0.1, 0.2, 0.3, 0.4],
        ..Default::default()
    };
    let mut fx = RibbonEffect::new(&cfg, PointerState::new(), viewport(), &mut StdRng::seed_from_u64(0)).unwrap();
    let mut renderer = RecordingRenderer::default();
    fx.frame(&mut renderer).unwrap();
    assert_eq!(renderer.clears, vec![[0.1, 0.2, 0.3, 0.4]]);
}

#[test]
fn config_parses_from_partial_toml() {
    let cfg: EffectConfig = toml::from_str(
        r##"
        colors = ["#ff0000", "#00ff00"]
        pointCount = 20
        enableFade = true
        maxAge = inf
        "##,
    )
    .unwrap();
    assert_eq!(cfg.point_count, 20);
    assert!(cfg.enable_fade);
    assert_eq!(cfg.base_spring, EffectConfig::default().base_spring);
    let v = cfg.validate().unwrap();
    assert_eq!(v.palette, vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    assert_eq!(v.trail, ribbons_core::TrailPolicy::FixedRatio(0.9));
}
