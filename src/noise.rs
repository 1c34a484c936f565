//! Noise kernel for island synthesis
//!
//! Seeded value noise, fractal and ridged compositions, SDF combinators and
//! normalization. Everything here is a pure function of its inputs: no
//! generator state outlives a call unless the caller passes it in.

use rand::RngCore;

use crate::tilemap::Tilemap;

/// Span floor used when dividing by a value range or amplitude sum.
const MIN_SPAN: f32 = 1e-6;

/// Exponent applied to folded fbm in [`ridged`].
const RIDGE_SHARPNESS: f32 = 1.7;

// =============================================================================
// RANDOM NUMBER GENERATOR
// =============================================================================

/// Small deterministic 32-bit generator (mulberry32 family).
///
/// Each instance owns its state, so two generators never influence each other.
#[derive(Clone, Debug)]
pub struct IslandRng {
    state: u32,
}

impl IslandRng {
    /// Create a generator from a signed seed. Seed 0 maps to state 1.
    pub fn new(seed: i32) -> Self {
        let state = seed as u32;
        Self {
            state: if state == 0 { 1 } else { state },
        }
    }

    fn step(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6d2b_79f5);
        let s = self.state;
        let mut t = (s ^ (s >> 15)).wrapping_mul(s | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.step() as f64 / 4_294_967_296.0
    }

    /// Next value in `[0, 1)` as `f32`, never rounding up to 1.0.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_f64() as f32).min(1.0 - f32::EPSILON)
    }
}

impl RngCore for IslandRng {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.step() as u64;
        let lo = self.step() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

// =============================================================================
// SCALAR HELPERS
// =============================================================================

/// Cubic Hermite easing on `[0, 1]`.
pub fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Rescale a field to `[0, 1]` using its own min/max.
///
/// A constant field maps to all zeros.
pub fn normalize(values: &Tilemap<f32>) -> Tilemap<f32> {
    let (min_v, max_v) = values.min_max().unwrap_or((0.0, 0.0));
    let span = (max_v - min_v).max(MIN_SPAN);
    values.map(|&v| (v - min_v) / span)
}

// =============================================================================
// VALUE NOISE
// =============================================================================

/// Smoothstep-eased bilinear value noise over an `n x n` grid.
///
/// A `(grid_y + 1) x (grid_x + 1)` lattice of random scalars is drawn from
/// `rng`, then interpolated across the output.
pub fn value_noise_2d(n: usize, grid_y: usize, grid_x: usize, rng: &mut IslandRng) -> Tilemap<f32> {
    let grid_y = grid_y.max(1);
    let grid_x = grid_x.max(1);
    let lattice_w = grid_x + 1;
    let lattice: Vec<f32> = (0..(grid_y + 1) * lattice_w).map(|_| rng.next_f32()).collect();

    let axis = |count: usize, cells: usize| -> Vec<(usize, f32)> {
        (0..count)
            .map(|i| {
                let p = i as f32 / count as f32 * cells as f32;
                let cell = (p.floor() as usize).min(cells - 1);
                (cell, smoothstep(p - cell as f32))
            })
            .collect()
    };
    let rows = axis(n, grid_y);
    let cols = axis(n, grid_x);

    let mut out = Tilemap::square(n, 0.0f32);
    for (i, &(y_cell, sy)) in rows.iter().enumerate() {
        for (j, &(x_cell, sx)) in cols.iter().enumerate() {
            let v00 = lattice[y_cell * lattice_w + x_cell];
            let v10 = lattice[(y_cell + 1) * lattice_w + x_cell];
            let v01 = lattice[y_cell * lattice_w + x_cell + 1];
            let v11 = lattice[(y_cell + 1) * lattice_w + x_cell + 1];

            let vx0 = v00 * (1.0 - sx) + v01 * sx;
            let vx1 = v10 * (1.0 - sx) + v11 * sx;
            out.set(j, i, vx0 * (1.0 - sy) + vx1 * sy);
        }
    }
    out
}

/// Fractional Brownian motion built from [`value_noise_2d`] octaves.
///
/// `base_grid` is `(rows, cols)` of the first octave lattice. The octave sum
/// is divided by the amplitude sum, so the output stays in `[0, 1]`.
pub fn fbm(
    n: usize,
    base_grid: (usize, usize),
    octaves: u32,
    lacunarity: f32,
    gain: f32,
    seed: i32,
) -> Tilemap<f32> {
    let mut rng = IslandRng::new(seed);
    let mut total = Tilemap::square(n, 0.0f32);
    let mut amp = 1.0f32;
    let mut freq = 1.0f64;
    let mut amp_sum = 0.0f32;

    for _ in 0..octaves {
        let gy = ((base_grid.0 as f64 * freq).floor() as usize).max(1);
        let gx = ((base_grid.1 as f64 * freq).floor() as usize).max(1);
        let layer = value_noise_2d(n, gy, gx, &mut rng);
        for (acc, v) in total.as_mut_slice().iter_mut().zip(layer.as_slice()) {
            *acc += v * amp;
        }
        amp_sum += amp;
        amp *= gain;
        freq *= lacunarity as f64;
    }

    let inv = 1.0 / amp_sum.max(MIN_SPAN);
    for v in total.as_mut_slice() {
        *v *= inv;
    }
    total
}

/// Ridged noise: fbm folded around its midpoint and sharpened.
pub fn ridged(
    n: usize,
    base_grid: (usize, usize),
    octaves: u32,
    lacunarity: f32,
    gain: f32,
    seed: i32,
) -> Tilemap<f32> {
    fbm(n, base_grid, octaves, lacunarity, gain, seed).map(|&f| {
        let folded = 1.0 - (2.0 * f - 1.0).abs();
        folded.max(0.0).powf(RIDGE_SHARPNESS).clamp(0.0, 1.0)
    })
}

// =============================================================================
// SIGNED DISTANCE FIELDS
// =============================================================================

/// Soft occupancy mask: 1 inside, 0 outside, with a smoothstep band of width
/// `2 * edge` centred on the zero level set.
pub fn smooth_mask_from_sdf(sdf: &Tilemap<f32>, edge: f32) -> Tilemap<f32> {
    let edge = edge.max(MIN_SPAN);
    sdf.map(|&d| smoothstep(((-d + edge) / (2.0 * edge)).clamp(0.0, 1.0)))
}

/// Polynomial smooth minimum of several SDFs with blend radius `k`.
///
/// Returns `None` for an empty slice.
pub fn smooth_union_sdf(sdfs: &[Tilemap<f32>], k: f32) -> Option<Tilemap<f32>> {
    let (first, rest) = sdfs.split_first()?;
    let k = k.max(MIN_SPAN);
    let mut out = first.clone();
    for b in rest {
        for (a, &bv) in out.as_mut_slice().iter_mut().zip(b.as_slice()) {
            let h = (0.5 + 0.5 * (bv - *a) / k).clamp(0.0, 1.0);
            *a = bv * (1.0 - h) + *a * h - k * h * (1.0 - h);
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_is_deterministic_and_in_range() {
        let mut a = IslandRng::new(42);
        let mut b = IslandRng::new(42);
        for _ in 0..1000 {
            let va = a.next_f64();
            assert_eq!(va, b.next_f64());
            assert!((0.0..1.0).contains(&va));
        }
    }

    #[test]
    fn test_rng_zero_seed_matches_one() {
        let mut zero = IslandRng::new(0);
        let mut one = IslandRng::new(1);
        assert_eq!(zero.next_u32(), one.next_u32());
    }

    #[test]
    fn test_rng_seeds_diverge() {
        let mut a = IslandRng::new(7);
        let mut b = IslandRng::new(8);
        let sa: Vec<u32> = (0..8).map(|_| a.next_u32()).collect();
        let sb: Vec<u32> = (0..8).map(|_| b.next_u32()).collect();
        assert_ne!(sa, sb);
    }

    #[test]
    fn test_normalize_handles_constant_field() {
        let flat = Tilemap::square(4, 3.5f32);
        let out = normalize(&flat);
        assert!(out.as_slice().iter().all(|v| v.is_finite() && *v == 0.0));

        let ramp = Tilemap::from_vec(2, 2, vec![-1.0f32, 0.0, 1.0, 3.0]).unwrap();
        let out = normalize(&ramp);
        assert_eq!(out.min_max(), Some((0.0, 1.0)));
    }

    #[test]
    fn test_value_noise_bounded_by_lattice() {
        let mut rng = IslandRng::new(99);
        let field = value_noise_2d(33, 4, 5, &mut rng);
        let (lo, hi) = field.min_max().unwrap();
        assert!(lo >= 0.0 && hi <= 1.0);
    }

    #[test]
    fn test_fbm_stays_in_unit_range() {
        for octaves in [1, 3, 6] {
            let field = fbm(32, (3, 3), octaves, 2.0, 0.55, 1234);
            let (lo, hi) = field.min_max().unwrap();
            assert!(lo >= 0.0 && hi <= 1.0, "octaves {octaves}: {lo}..{hi}");
        }
    }

    #[test]
    fn test_fbm_is_pure() {
        let a = fbm(24, (2, 2), 4, 2.0, 0.5, 5);
        let b = fbm(24, (2, 2), 4, 2.0, 0.5, 5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_ridged_clipped() {
        let field = ridged(32, (4, 4), 5, 2.0, 0.55, 77);
        assert!(field.as_slice().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_smooth_mask_band() {
        let sdf = Tilemap::from_vec(3, 1, vec![-1.0f32, 0.0, 1.0]).unwrap();
        let mask = smooth_mask_from_sdf(&sdf, 0.1);
        assert_eq!(*mask.get(0, 0), 1.0);
        assert!((*mask.get(1, 0) - 0.5).abs() < 1e-6);
        assert_eq!(*mask.get(2, 0), 0.0);
    }

    #[test]
    fn test_smooth_union_not_above_min() {
        let a = Tilemap::from_vec(2, 1, vec![0.3f32, -0.2]).unwrap();
        let b = Tilemap::from_vec(2, 1, vec![0.1f32, 0.4]).unwrap();
        let u = smooth_union_sdf(&[a.clone(), b.clone()], 0.2).unwrap();
        for i in 0..2 {
            let hard = a.get(i, 0).min(*b.get(i, 0));
            assert!(*u.get(i, 0) <= hard + 1e-6);
        }
        assert!(smooth_union_sdf(&[], 0.2).is_none());
    }
}
