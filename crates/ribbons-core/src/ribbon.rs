use crate::config::ValidatedConfig;
use crate::constants::*;
use glam::Vec3;
use rand::Rng;

/// Per-ribbon constants, fixed for the lifetime of an activation.
#[derive(Clone, Debug, PartialEq)]
pub struct RibbonParams {
    pub spring: f32,
    pub friction: f32,
    pub thickness: f32,
    pub pointer_offset: Vec3,
    pub color: [f32; 3],
}

impl RibbonParams {
    /// Base values from the config plus a small uniform perturbation, with
    /// the pointer offset fanned symmetrically around the pointer.
    pub fn jittered<R: Rng + ?Sized>(
        cfg: &ValidatedConfig,
        index: usize,
        ribbon_count: usize,
        rng: &mut R,
    ) -> Self {
        let mut jitter = |span: f32| (rng.gen::<f32>() - 0.5) * span;
        let center = (ribbon_count as f32 - 1.0) / 2.0;
        let spring = cfg.base_spring + jitter(SPRING_JITTER);
        let friction = cfg.base_friction + jitter(FRICTION_JITTER);
        let thickness = cfg.base_thickness + jitter(THICKNESS_JITTER);
        let pointer_offset = Vec3::new(
            (index as f32 - center) * cfg.offset_factor + jitter(OFFSET_X_JITTER),
            jitter(OFFSET_Y_JITTER),
            0.0,
        );
        Self {
            spring,
            friction,
            thickness,
            pointer_offset,
            color: cfg.palette[index],
        }
    }
}

/// One spring-driven polyline. `points[0]` is the head; the point count is
/// fixed at construction.
#[derive(Clone, Debug)]
pub struct Ribbon {
    pub(crate) points: Vec<Vec3>,
    pub velocity: Vec3,
    pub spring: f32,
    pub friction: f32,
    pub pointer_offset: Vec3,
    pub thickness: f32,
    pub color: [f32; 3],
}

impl Ribbon {
    /// All points start at the world origin, at rest.
    pub fn new(params: RibbonParams, point_count: usize) -> Self {
        Self {
            points: vec![Vec3::ZERO; point_count],
            velocity: Vec3::ZERO,
            spring: params.spring,
            friction: params.friction,
            pointer_offset: params.pointer_offset,
            thickness: params.thickness,
            color: params.color,
        }
    }

    #[inline]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    #[inline]
    pub fn head(&self) -> Vec3 {
        self.points[0]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Build the full ribbon set, one per palette entry.
pub fn build_ribbons<R: Rng + ?Sized>(cfg: &ValidatedConfig, rng: &mut R) -> Vec<Ribbon> {
    let count = cfg.palette.len();
    (0..count)
        .map(|i| Ribbon::new(RibbonParams::jittered(cfg, i, count, rng), cfg.point_count))
        .collect()
}
