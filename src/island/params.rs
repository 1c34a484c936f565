//! Island shape parameters and their randomization ranges

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Inputs for synthesizing one island.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandParams {
    /// Noise seed; identical params reproduce identical islands
    pub seed: i32,
    /// Grid resolution (cells per side)
    pub n: usize,
    /// World-space width of the island grid
    pub xy_scale: f32,
    /// World-space height of a unit of elevation
    pub z_scale: f32,
    /// Mountain layer strength
    pub mountain_amp: f32,
    /// Slope-weighted cliff noise strength
    pub cliff_amp: f32,
    /// Prefix for generated island names
    pub name_prefix: String,
}

impl Default for IslandParams {
    fn default() -> Self {
        Self {
            seed: 4_121_132,
            n: 160,
            xy_scale: 32.0,
            z_scale: 10.0,
            mountain_amp: 0.58,
            cliff_amp: 0.07,
            name_prefix: "FloatingIsland".to_string(),
        }
    }
}

/// Inclusive range with a quantization step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl ParamRange {
    const fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let raw = self.min + rng.gen::<f32>() * (self.max - self.min);
        let quantized = (raw / self.step).round() * self.step;
        quantized.clamp(self.min, self.max)
    }
}

/// Ranges used when the UI asks for a random island.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomParamRanges {
    pub seed_min: i32,
    pub seed_max: i32,
    pub n: ParamRange,
    pub xy_scale: ParamRange,
    pub z_scale: ParamRange,
    pub mountain_amp: ParamRange,
    pub cliff_amp: ParamRange,
}

pub const RANDOM_PARAM_RANGES: RandomParamRanges = RandomParamRanges {
    seed_min: 1,
    seed_max: 9_999_999,
    n: ParamRange::new(64.0, 280.0, 8.0),
    xy_scale: ParamRange::new(18.0, 52.0, 0.1),
    z_scale: ParamRange::new(6.0, 16.0, 0.1),
    mountain_amp: ParamRange::new(0.3, 0.9, 0.01),
    cliff_amp: ParamRange::new(0.02, 0.18, 0.01),
};

impl IslandParams {
    /// Draw a random island from [`RANDOM_PARAM_RANGES`].
    pub fn random<R: Rng + ?Sized>(rng: &mut R, name_prefix: &str) -> Self {
        Self::random_in(rng, &RANDOM_PARAM_RANGES, name_prefix)
    }

    pub fn random_in<R: Rng + ?Sized>(rng: &mut R, ranges: &RandomParamRanges, name_prefix: &str) -> Self {
        let seed = rng.gen_range(ranges.seed_min..=ranges.seed_max);
        Self {
            seed,
            n: ranges.n.sample(rng) as usize,
            xy_scale: ranges.xy_scale.sample(rng),
            z_scale: ranges.z_scale.sample(rng),
            mountain_amp: ranges.mountain_amp.sample(rng),
            cliff_amp: ranges.cliff_amp.sample(rng),
            name_prefix: name_prefix.to_string(),
        }
    }

    /// Copy with every numeric field made usable: non-finite or zero scales
    /// fall back to the defaults, negative ones are mirrored, amplitudes are
    /// floored at zero.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        Self {
            xy_scale: scale_or(self.xy_scale, defaults.xy_scale),
            z_scale: scale_or(self.z_scale, defaults.z_scale),
            mountain_amp: amplitude_or(self.mountain_amp, defaults.mountain_amp),
            cliff_amp: amplitude_or(self.cliff_amp, defaults.cliff_amp),
            ..self.clone()
        }
    }

    /// Planar radius of the island footprint before any mesh exists.
    pub fn footprint_radius(&self) -> f32 {
        scale_or(self.xy_scale, Self::default().xy_scale) * 0.5
    }
}

fn scale_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value.abs() > f32::EPSILON {
        value.abs()
    } else {
        fallback
    }
}

fn amplitude_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        fallback
    }
}
