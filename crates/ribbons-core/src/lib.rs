pub mod clock;
pub mod config;
pub mod constants;
pub mod effect;
pub mod geometry;
pub mod lifecycle;
pub mod pointer;
pub mod render;
pub mod ribbon;
pub mod sequence;
pub mod shader;
pub mod spring;
pub mod trail;

pub use clock::FrameClock;
pub use config::{ConfigError, EffectConfig, ValidatedConfig};
pub use effect::{
    run_frame, CancelToken, FrameOutcome, RenderError, RibbonDraw, RibbonEffect, RibbonRenderer,
    Viewport,
};
pub use geometry::{PolylineGeometry, RibbonVertex};
pub use lifecycle::Mount;
pub use pointer::{client_to_ndc, PointerState};
pub use render::{fit_to_max_dimension, ContextOptions, GpuRenderer};
pub use ribbon::{Ribbon, RibbonParams};
pub use sequence::{SeqKey, SequenceMatcher};
pub use shader::{RibbonUniforms, RIBBON_WGSL};
pub use trail::TrailPolicy;
