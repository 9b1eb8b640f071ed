// Shared tuning constants used by both web and native frontends.

// Default effect configuration
pub const DEFAULT_PALETTE: [&str; 4] = ["#ff9346", "#7cff67", "#ffee51", "#00d8ff"];
pub const DEFAULT_SPRING: f32 = 0.03;
pub const DEFAULT_FRICTION: f32 = 0.9;
pub const DEFAULT_THICKNESS: f32 = 30.0;
pub const DEFAULT_OFFSET_FACTOR: f32 = 0.05;
pub const DEFAULT_MAX_AGE_MS: f32 = 500.0;
pub const DEFAULT_POINT_COUNT: usize = 50;
pub const DEFAULT_SPEED_MULTIPLIER: f32 = 0.6;
pub const DEFAULT_EFFECT_AMPLITUDE: f32 = 2.0;
pub const DEFAULT_BACKGROUND: [f32; 4] = [0.0, 0.0, 0.0, 0.0];

// Propagation needs at least one predecessor/successor pair
pub const MIN_POINT_COUNT: usize = 2;

// Trail easing used when time-based propagation is disabled
pub const FIXED_EASE_RATIO: f32 = 0.9;

// Per-ribbon jitter spans (full width, centered on zero)
pub const SPRING_JITTER: f32 = 0.05;
pub const FRICTION_JITTER: f32 = 0.05;
pub const THICKNESS_JITTER: f32 = 3.0;
pub const OFFSET_X_JITTER: f32 = 0.01;
pub const OFFSET_Y_JITTER: f32 = 0.1;

// Per-ribbon opacity before fading
pub const RIBBON_OPACITY: f32 = 1.0;

// Used when the host cannot report a device pixel ratio
pub const FALLBACK_DPR: f32 = 2.0;

// wgpu's default max_texture_dimension_2d; caps the canvas backing store
pub const MAX_BACKING_DIMENSION: u32 = 8192;
