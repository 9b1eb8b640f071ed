//! Effect configuration and its validation.
//!
//! `EffectConfig` is the user-facing option set. Every field is optional when
//! deserialized (missing fields fall back to the defaults in
//! [`crate::constants`]). Call [`EffectConfig::validate`] once per activation
//! to obtain a [`ValidatedConfig`] with parsed colors and a chosen
//! [`TrailPolicy`].

use crate::constants::*;
use crate::trail::TrailPolicy;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("pointCount must be at least 2, got {0}")]
    TooFewPoints(usize),
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },
    #[error("palette entry {index} is not a hex color: {value:?}")]
    InvalidColor { index: usize, value: String },
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EffectConfig {
    /// One ribbon per entry, `#rgb` or `#rrggbb`.
    pub colors: Vec<String>,
    pub base_spring: f32,
    pub base_friction: f32,
    pub base_thickness: f32,
    pub offset_factor: f32,
    /// Milliseconds for a perturbation to reach the tail. `0` or infinity
    /// switches to fixed-ratio easing. JSON has no infinity, so `null` reads
    /// as infinity.
    #[serde(deserialize_with = "null_as_infinity")]
    pub max_age: f32,
    pub point_count: usize,
    pub speed_multiplier: f32,
    pub enable_fade: bool,
    pub enable_shader_effect: bool,
    pub effect_amplitude: f32,
    pub background_color: [f32; 4],
}

fn null_as_infinity<'de, D: Deserializer<'de>>(de: D) -> Result<f32, D::Error> {
    Ok(Option::<f32>::deserialize(de)?.unwrap_or(f32::INFINITY))
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            base_spring: DEFAULT_SPRING,
            base_friction: DEFAULT_FRICTION,
            base_thickness: DEFAULT_THICKNESS,
            offset_factor: DEFAULT_OFFSET_FACTOR,
            max_age: DEFAULT_MAX_AGE_MS,
            point_count: DEFAULT_POINT_COUNT,
            speed_multiplier: DEFAULT_SPEED_MULTIPLIER,
            enable_fade: false,
            enable_shader_effect: false,
            effect_amplitude: DEFAULT_EFFECT_AMPLITUDE,
            background_color: DEFAULT_BACKGROUND,
        }
    }
}

/// Configuration that passed validation; immutable for one activation.
#[derive(Clone, Debug)]
pub struct ValidatedConfig {
    pub palette: Vec<[f32; 3]>,
    pub base_spring: f32,
    pub base_friction: f32,
    pub base_thickness: f32,
    pub offset_factor: f32,
    pub point_count: usize,
    pub trail: TrailPolicy,
    pub enable_fade: bool,
    pub enable_shader_effect: bool,
    pub effect_amplitude: f32,
    pub background_color: [f32; 4],
}

impl EffectConfig {
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        if self.point_count < MIN_POINT_COUNT {
            return Err(ConfigError::TooFewPoints(self.point_count));
        }
        let finite = [
            ("baseSpring", self.base_spring),
            ("baseFriction", self.base_friction),
            ("baseThickness", self.base_thickness),
            ("offsetFactor", self.offset_factor),
            ("speedMultiplier", self.speed_multiplier),
            ("effectAmplitude", self.effect_amplitude),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }
        // +inf is a legal way to disable time-based easing; NaN is not
        if self.max_age.is_nan() {
            return Err(ConfigError::NonFinite {
                field: "maxAge",
                value: self.max_age,
            });
        }
        for (i, v) in self.background_color.iter().enumerate() {
            if !v.is_finite() {
                return Err(ConfigError::NonFinite {
                    field: BACKGROUND_FIELDS[i],
                    value: *v,
                });
            }
        }

        let palette = self
            .colors
            .iter()
            .enumerate()
            .map(|(index, value)| {
                parse_hex_color(value).ok_or_else(|| ConfigError::InvalidColor {
                    index,
                    value: value.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if palette.is_empty() {
            log::warn!("[ribbons] empty palette; no ribbons will be drawn");
        }

        Ok(ValidatedConfig {
            palette,
            base_spring: self.base_spring,
            base_friction: self.base_friction,
            base_thickness: self.base_thickness,
            offset_factor: self.offset_factor,
            point_count: self.point_count,
            trail: TrailPolicy::from_max_age(self.max_age, self.point_count, self.speed_multiplier),
            enable_fade: self.enable_fade,
            enable_shader_effect: self.enable_shader_effect,
            effect_amplitude: self.effect_amplitude,
            background_color: self.background_color,
        })
    }
}

const BACKGROUND_FIELDS: [&str; 4] = [
    "backgroundColor.r",
    "backgroundColor.g",
    "backgroundColor.b",
    "backgroundColor.a",
];

/// Parse `#rgb` / `#rrggbb` (leading `#` optional) into 0..1 RGB.
pub fn parse_hex_color(s: &str) -> Option<[f32; 3]> {
    let hex = s.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    let channel = |h: &str| u8::from_str_radix(h, 16).ok().map(|v| v as f32 / 255.0);
    match hex.len() {
        6 => Some([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        ]),
        3 => {
            let short = |i: usize| {
                let c = &hex[i..i + 1];
                channel(&format!("{c}{c}"))
            };
            Some([short(0)?, short(1)?, short(2)?])
        }
        _ => None,
    }
}
