use crate::geometry::RibbonVertex;
use glam::{Vec2, Vec3, Vec4};

/// WGSL source for the ribbon extrusion program.
pub static RIBBON_WGSL: &str = include_str!("../shaders/ribbon.wgsl");

/// Per-ribbon uniform block; mirrors `RibbonUniforms` in `ribbon.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RibbonUniforms {
    pub color: [f32; 4],
    pub resolution: [f32; 2],
    pub dpr: f32,
    pub thickness: f32,
    pub time: f32,
    pub opacity: f32,
    pub enable_fade: f32,
    pub enable_effect: f32,
    pub effect_amplitude: f32,
    pub _pad: [f32; 3],
}

/// Values shared by every ribbon in a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameUniforms {
    pub resolution: [f32; 2],
    pub dpr: f32,
    pub time_sec: f32,
}

/// Feature switches fixed for one activation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShaderToggles {
    pub enable_fade: bool,
    pub enable_effect: bool,
    pub effect_amplitude: f32,
}

#[inline]
fn flag(on: bool) -> f32 {
    if on {
        1.0
    } else {
        0.0
    }
}

impl RibbonUniforms {
    pub fn new(
        color: [f32; 3],
        thickness: f32,
        opacity: f32,
        frame: FrameUniforms,
        toggles: ShaderToggles,
    ) -> Self {
        Self {
            color: [color[0], color[1], color[2], 1.0],
            resolution: frame.resolution,
            dpr: frame.dpr,
            thickness,
            time: frame.time_sec,
            opacity,
            enable_fade: flag(toggles.enable_fade),
            enable_effect: flag(toggles.enable_effect),
            effect_amplitude: toggles.effect_amplitude,
            _pad: [0.0; 3],
        }
    }
}

#[inline]
fn smoothstep(e0: f32, e1: f32, x: f32) -> f32 {
    let t = ((x - e0) / (e1 - e0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// CPU reference of `vs_main`: clip-space position of one strip vertex.
pub fn extrude(v: &RibbonVertex, u: &RibbonUniforms) -> Vec4 {
    let mut current = Vec3::from(v.position).extend(1.0);
    let aspect = Vec2::new(u.resolution[0] / u.resolution[1], 1.0);
    let next_screen = Vec2::new(v.next[0], v.next[1]) * aspect;
    let prev_screen = Vec2::new(v.prev[0], v.prev[1]) * aspect;
    let delta = next_screen - prev_screen;
    let dist = delta.length();
    let tangent = if dist > 1e-6 { delta / dist } else { Vec2::X };
    let mut normal = Vec2::new(-tangent.y, tangent.x) / aspect;

    let edge = (v.uv[1] - 0.5).abs() * 2.0;
    normal *= 1.0 + (0.1 - 1.0) * edge * edge;
    normal *= smoothstep(0.0, 0.02, dist);

    let pixel_width = current.w / (u.resolution[1] / u.dpr);
    normal *= pixel_width * u.thickness;

    let mut xy = current.truncate().truncate() - normal * v.side;
    if u.enable_effect > 0.5 {
        xy += normal * (u.time + xy.x * 10.0).sin() * u.effect_amplitude;
    }
    current.x = xy.x;
    current.y = xy.y;
    current
}

/// CPU reference of `fs_main`'s alpha at parametric `uv_y`.
pub fn fade_alpha(u: &RibbonUniforms, uv_y: f32) -> f32 {
    let fade = if u.enable_fade > 0.5 {
        1.0 - smoothstep(0.0, 1.0, uv_y)
    } else {
        1.0
    };
    u.opacity * fade
}
