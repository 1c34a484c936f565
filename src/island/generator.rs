//! Island heightfield synthesis
//!
//! Layered terrain for a single floating island:
//! 1. Circular base landmass (SDF mask + radial falloff) with rolling hills
//! 2. A chain of domain-warped mountain lobes merged by smooth union
//! 3. Ridged noise, gaussian peaks and an optional crater inside the lobe zone
//! 4. Slope-weighted cliff noise
//! 5. A negative underside and the ocean mask

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::island::params::IslandParams;
use crate::noise::{fbm, normalize, ridged, smooth_mask_from_sdf, smooth_union_sdf, smoothstep, IslandRng};
use crate::seeds::IslandSeeds;
use crate::tilemap::Tilemap;

// =============================================================================
// SHAPE CONSTANTS
// =============================================================================

/// Smallest grid the synthesizer will build.
pub const MIN_RESOLUTION: usize = 32;

const MAIN_RADIUS: f32 = 0.95;
const MAIN_EDGE: f32 = 0.06;
const MAIN_FALLOFF_EXP: f32 = 2.6;

// Lobe chain
const CENTER_ATTEMPTS: usize = 300;
const CENTER_RADIUS: f32 = 0.72;
const CENTER_FALLBACK: (f32, f32) = (0.35, 0.35);
const LOBE_RADIUS_FACTOR: f32 = 0.32;
const WARP_STRENGTH: f32 = 0.12;
const ZONE_BLEND: f32 = 0.2;
const ZONE_BOUNDARY_NOISE: f32 = 0.2;
const ZONE_EDGE: f32 = 0.06;

// Crater profile
const CRATER_SCALE: f32 = 0.18;
const CRATER_RIM: f32 = 0.95;
const CRATER_HOLE: f32 = 0.36;

/// Empirical thresholds of the synthesizer.
///
/// Kept as data so callers can experiment without touching the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConstants {
    /// Cells with `main_mask` below this are ocean
    pub ocean_threshold: f32,
    /// `main_mask` above which the underside is non-zero
    pub underside_cutoff: f32,
    /// `zone_mask` above which a cell contributes to slope statistics
    pub zone_interior_threshold: f32,
    /// Lower slope percentile mapped to 0
    pub slope_low_percentile: f32,
    /// Upper slope percentile mapped to 1
    pub slope_high_percentile: f32,
    /// Minimum interior samples before percentiles are trusted
    pub min_slope_samples: usize,
}

impl Default for SynthesisConstants {
    fn default() -> Self {
        Self {
            ocean_threshold: 0.08,
            underside_cutoff: 0.05,
            zone_interior_threshold: 0.25,
            slope_low_percentile: 0.40,
            slope_high_percentile: 0.92,
            min_slope_samples: 100,
        }
    }
}

/// Top and bottom elevation of one island plus its ocean mask.
#[derive(Clone, Debug, PartialEq)]
pub struct IslandHeightfield {
    pub n: usize,
    /// Cell x coordinate in `[-1, 1]`
    pub x: Tilemap<f32>,
    /// Cell y coordinate in `[-1, 1]`
    pub y: Tilemap<f32>,
    /// Land surface, normalized to `[0, 1]`
    pub top: Tilemap<f32>,
    /// Underside, `<= 0`
    pub bottom: Tilemap<f32>,
    /// `true` where the cell is not land
    pub ocean_mask: Tilemap<bool>,
    pub xy_scale: f32,
    pub z_scale: f32,
}

impl IslandHeightfield {
    pub fn land_cell_count(&self) -> usize {
        self.ocean_mask.as_slice().iter().filter(|&&ocean| !ocean).count()
    }
}

/// Generate an island with the default [`SynthesisConstants`].
pub fn generate_island(params: &IslandParams) -> IslandHeightfield {
    generate_island_with(params, &SynthesisConstants::default())
}

struct LobeCenter {
    x: f32,
    y: f32,
}

fn pick_center(rng: &mut IslandRng) -> (f32, f32) {
    for _ in 0..CENTER_ATTEMPTS {
        let cx = -0.55 + rng.next_f32() * 1.3;
        let cy = -0.55 + rng.next_f32() * 1.3;
        if cx * cx + cy * cy < CENTER_RADIUS * CENTER_RADIUS {
            return (cx, cy);
        }
    }
    CENTER_FALLBACK
}

/// Value at fraction `p` of an ascending slice.
fn percentile(sorted: &[f32], p: f32) -> f32 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() - 1) as f32 * p).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Synthesize the heightfield for `params`.
pub fn generate_island_with(params: &IslandParams, constants: &SynthesisConstants) -> IslandHeightfield {
    let params = &params.sanitized();
    let n = params.n.max(MIN_RESOLUTION);
    let seeds = IslandSeeds::from_master(params.seed);
    let mut rng = IslandRng::new(seeds.master);
    let cells = n * n;

    // Coordinate grid and radial distance
    let mut x = Tilemap::square(n, 0.0f32);
    let mut y = Tilemap::square(n, 0.0f32);
    let mut r = Tilemap::square(n, 0.0f32);
    for i in 0..n {
        for j in 0..n {
            let xx = j as f32 / (n - 1) as f32 * 2.0 - 1.0;
            let yy = i as f32 / (n - 1) as f32 * 2.0 - 1.0;
            x.set(j, i, xx);
            y.set(j, i, yy);
            r.set(j, i, xx.hypot(yy));
        }
    }
    let (xs, ys) = (x.as_slice(), y.as_slice());

    // Base landmass
    let sdf_main = r.map(|&d| d - MAIN_RADIUS);
    let main_mask = smooth_mask_from_sdf(&sdf_main, MAIN_EDGE);
    let main_falloff = r.map(|&d| (1.0 - (d / MAIN_RADIUS).powf(MAIN_FALLOFF_EXP)).clamp(0.0, 1.0));
    let (mask, falloff) = (main_mask.as_slice(), main_falloff.as_slice());

    let small_hills = normalize(&fbm(n, (9, 9), 4, 2.0, 0.5, seeds.hills));
    let h_main: Vec<f32> = (0..cells)
        .map(|k| mask[k] * falloff[k] * (0.12 + 0.12 * small_hills.as_slice()[k]))
        .collect();

    // Mountain lobes along a random axis
    let (cx, cy) = pick_center(&mut rng);
    let theta = rng.next_f32() * TAU;
    let (ux, uy) = (theta.cos(), theta.sin());
    let (vx, vy) = (-uy, ux);
    let lobe_count = 3 + (rng.next_f32() * 4.0).floor() as usize;
    let spacing = 0.12 + rng.next_f32() * 0.06;
    let blob_radius = MAIN_RADIUS * LOBE_RADIUS_FACTOR;
    let offset0 = -0.5 * (lobe_count - 1) as f32 * spacing;

    let warp_a = normalize(&fbm(n, (3, 3), 5, 2.0, 0.55, seeds.warp_x));
    let warp_b = normalize(&fbm(n, (4, 4), 4, 2.0, 0.55, seeds.warp_y));
    let xw: Vec<f32> = (0..cells)
        .map(|k| xs[k] + (warp_a.as_slice()[k] * 2.0 - 1.0) * WARP_STRENGTH)
        .collect();
    let yw: Vec<f32> = (0..cells)
        .map(|k| ys[k] + (warp_b.as_slice()[k] * 2.0 - 1.0) * WARP_STRENGTH)
        .collect();

    let centers: Vec<LobeCenter> = (0..lobe_count)
        .map(|i| {
            let along = offset0 + i as f32 * spacing;
            let side = -0.08 + rng.next_f32() * 0.16;
            LobeCenter {
                x: cx + along * ux + side * vx,
                y: cy + along * uy + side * vy,
            }
        })
        .collect();

    let lobe_sdfs: Vec<Tilemap<f32>> = centers
        .iter()
        .map(|c| {
            let rad = blob_radius * (0.85 + rng.next_f32() * 0.25);
            let mut s = Tilemap::square(n, 0.0f32);
            for (k, v) in s.as_mut_slice().iter_mut().enumerate() {
                *v = (xw[k] - c.x).hypot(yw[k] - c.y) - rad;
            }
            s
        })
        .collect();

    let mut sdf_zone = match smooth_union_sdf(&lobe_sdfs, ZONE_BLEND) {
        Some(zone) => zone,
        None => sdf_main.clone(),
    };
    let boundary = normalize(&fbm(n, (2, 2), 6, 2.0, 0.55, seeds.zone_boundary));
    for (d, b) in sdf_zone.as_mut_slice().iter_mut().zip(boundary.as_slice()) {
        *d += ZONE_BOUNDARY_NOISE * (b * 2.0 - 1.0);
    }

    let zone_mask_raw = smooth_mask_from_sdf(&sdf_zone, ZONE_EDGE);
    let zone_mask: Vec<f32> = (0..cells).map(|k| zone_mask_raw.as_slice()[k] * mask[k]).collect();
    let zone_taper: Vec<f32> = (0..cells)
        .map(|k| {
            let zone_core = (-sdf_zone.as_slice()[k] / (blob_radius * 1.25)).clamp(0.0, 1.0);
            let edge_taper = smoothstep(((mask[k] - 0.15) / 0.35).clamp(0.0, 1.0));
            smoothstep(zone_core) * edge_taper
        })
        .collect();

    // Elevation sources inside the zone
    let ridge_broad = ridged(n, (3, 3), 6, 2.25, 0.55, seeds.ridge_broad);
    let ridge_fine = ridged(n, (7, 7), 5, 2.1, 0.55, seeds.ridge_fine);
    let ridge: Vec<f32> = (0..cells)
        .map(|k| {
            (0.7 * ridge_broad.as_slice()[k] + 0.45 * ridge_fine.as_slice()[k].powf(1.15)).clamp(0.0, 1.0)
        })
        .collect();

    let mut peaks = Tilemap::square(n, 0.0f32);
    for c in &centers {
        let pr = 0.14 + rng.next_f32() * 0.08;
        let amp = 0.45 + rng.next_f32() * 0.3;
        for (k, v) in peaks.as_mut_slice().iter_mut().enumerate() {
            let d = (xs[k] - c.x).hypot(ys[k] - c.y);
            *v += amp * (-(d / pr).powi(2)).exp();
        }
    }
    let peaks = normalize(&peaks);

    let mut volcano = vec![0.0f32; cells];
    let has_crater = rng.next_f32() < 0.5;
    if has_crater {
        let pick = ((rng.next_f32() * centers.len() as f32).floor() as usize).min(centers.len() - 1);
        let c = &centers[pick];
        for (k, v) in volcano.iter_mut().enumerate() {
            let dx = (xs[k] - c.x) / CRATER_SCALE;
            let dy = (ys[k] - c.y) / CRATER_SCALE;
            let rv = dx.hypot(dy);
            let rim = (-(rv / CRATER_RIM).powi(2)).exp();
            let hole = (-(rv / CRATER_HOLE).powi(2)).exp();
            *v = 0.45 * rim - 0.7 * hole;
        }
    }

    let mut zone_base = Tilemap::square(n, 0.0f32);
    for (k, v) in zone_base.as_mut_slice().iter_mut().enumerate() {
        let shape = 0.55 * ridge[k].powf(1.25) + 0.65 * peaks.as_slice()[k].powf(1.05) + 0.35 * volcano[k];
        *v = zone_mask[k] * zone_taper[k] * falloff[k] * params.mountain_amp * shape;
    }

    // Slope statistics over the zone interior
    let mut slope = vec![0.0f32; cells];
    let mut interior = Vec::new();
    for i in 0..n {
        for j in 0..n {
            let k = i * n + j;
            let (gx, gy) = zone_base.gradient(j, i);
            slope[k] = gx.hypot(gy);
            if zone_mask[k] > constants.zone_interior_threshold {
                interior.push(slope[k]);
            }
        }
    }
    interior.sort_by(f32::total_cmp);
    let (slope_lo, slope_hi) = if interior.len() > constants.min_slope_samples {
        (
            percentile(&interior, constants.slope_low_percentile),
            percentile(&interior, constants.slope_high_percentile),
        )
    } else {
        (0.0, slope.iter().copied().fold(1e-6f32, f32::max))
    };

    // Cliff banding proportional to steepness
    let rock_coarse = normalize(&fbm(n, (28, 28), 4, 2.0, 0.5, seeds.rock_coarse));
    let rock_fine = normalize(&fbm(n, (44, 44), 3, 2.0, 0.5, seeds.rock_fine));
    let mut top_raw = Tilemap::square(n, 0.0f32);
    for (k, v) in top_raw.as_mut_slice().iter_mut().enumerate() {
        let slope_n = ((slope[k] - slope_lo) / (slope_hi - slope_lo + 1e-6)).clamp(0.0, 1.0);
        let rock = 0.6 * (rock_coarse.as_slice()[k] * 2.0 - 1.0) + 0.4 * (rock_fine.as_slice()[k] * 2.0 - 1.0);
        let cliffs = params.cliff_amp * rock * (0.25 + 0.75 * slope_n) * zone_mask[k] * zone_taper[k];
        let h_zone = (zone_base.as_slice()[k] + cliffs).max(0.0);
        *v = (h_main[k] + h_zone) * mask[k];
    }
    let top = normalize(&top_raw);

    // Underside and ocean
    let underside = ridged(n, (4, 4), 5, 2.0, 0.55, seeds.underside);
    let mut bottom = Tilemap::square(n, 0.0f32);
    for (k, v) in bottom.as_mut_slice().iter_mut().enumerate() {
        if mask[k] > constants.underside_cutoff {
            *v = -(0.78 * falloff[k].powf(1.9) + 0.38 * underside.as_slice()[k] * mask[k].powf(0.7));
        }
    }
    let ocean_mask = main_mask.map(|&m| m < constants.ocean_threshold);

    let heightfield = IslandHeightfield {
        n,
        x,
        y,
        top,
        bottom,
        ocean_mask,
        xy_scale: params.xy_scale,
        z_scale: params.z_scale,
    };
    debug!(
        seed = params.seed,
        n,
        lobes = lobe_count,
        crater = has_crater,
        land_cells = heightfield.land_cell_count(),
        "synthesized island heightfield"
    );
    heightfield
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> IslandParams {
        IslandParams {
            seed: 4_121_132,
            n: 64,
            xy_scale: 32.0,
            z_scale: 10.0,
            mountain_amp: 0.58,
            cliff_amp: 0.07,
            name_prefix: "FloatingIsland".to_string(),
        }
    }

    fn checksum(values: &Tilemap<f32>) -> f64 {
        values
            .as_slice()
            .iter()
            .enumerate()
            .step_by(97)
            .map(|(i, &v)| v as f64 * (i + 1) as f64)
            .sum()
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate_island(&params());
        let b = generate_island(&params());
        assert_eq!(a.top.as_slice(), b.top.as_slice());
        assert_eq!(a.bottom.as_slice(), b.bottom.as_slice());
        assert_eq!(a.ocean_mask.as_slice(), b.ocean_mask.as_slice());
    }

    #[test]
    fn test_seed_changes_terrain() {
        let a = generate_island(&params());
        let b = generate_island(&IslandParams { seed: params().seed + 1, ..params() });
        assert_ne!(checksum(&a.top), checksum(&b.top));
    }

    #[test]
    fn test_values_finite_and_in_range() {
        let data = generate_island(&params());
        assert!(data.top.as_slice().iter().all(|v| v.is_finite() && (0.0..=1.0).contains(v)));
        assert!(data.bottom.as_slice().iter().all(|v| v.is_finite() && *v <= 0.0));
        let (bottom_min, _) = data.bottom.min_max().unwrap();
        assert!(bottom_min < 0.0);
        let (top_min, top_max) = data.top.min_max().unwrap();
        assert_eq!(top_min, 0.0);
        assert!((top_max - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_coordinates_span_unit_square() {
        let data = generate_island(&params());
        assert_eq!(data.x.min_max(), Some((-1.0, 1.0)));
        assert_eq!(data.y.min_max(), Some((-1.0, 1.0)));
    }

    #[test]
    fn test_ocean_mask_rings_the_island() {
        let data = generate_island(&params());
        let n = data.n;
        // Corners lie outside the unit circle
        assert!(*data.ocean_mask.get(0, 0));
        assert!(*data.ocean_mask.get(n - 1, n - 1));
        // Centre is land
        assert!(!*data.ocean_mask.get(n / 2, n / 2));
        assert!(data.land_cell_count() > n * n / 2);
    }

    #[test]
    fn test_resolution_floor() {
        let data = generate_island(&IslandParams { n: 4, ..params() });
        assert_eq!(data.n, MIN_RESOLUTION);
        assert_eq!(data.top.as_slice().len(), MIN_RESOLUTION * MIN_RESOLUTION);
    }

    #[test]
    fn test_non_finite_params_still_give_finite_fields() {
        let data = generate_island(&IslandParams {
            xy_scale: f32::NAN,
            z_scale: f32::INFINITY,
            mountain_amp: f32::NAN,
            cliff_amp: f32::NEG_INFINITY,
            ..params()
        });
        assert_eq!(data.xy_scale, 32.0);
        assert_eq!(data.z_scale, 10.0);
        assert!(data.top.as_slice().iter().all(|v| v.is_finite()));
        assert!(data.bottom.as_slice().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_ocean_threshold_is_configurable() {
        let strict = SynthesisConstants { ocean_threshold: 0.9, ..SynthesisConstants::default() };
        let loose = generate_island(&params());
        let tight = generate_island_with(&params(), &strict);
        assert!(tight.land_cell_count() < loose.land_cell_count());
    }
}
