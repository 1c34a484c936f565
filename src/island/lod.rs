//! Adaptive island resolution
//!
//! Grid resolution drops as the island count grows so total scene cost stays
//! bounded.

/// Lowest resolution ever returned.
pub const MIN_ADAPTIVE_RESOLUTION: u32 = 64;
/// Highest base resolution accepted.
pub const MAX_BASE_RESOLUTION: u32 = 280;

/// `(island count threshold, resolution factor)`, highest threshold first.
const LOD_STEPS: [(usize, f32); 3] = [(24, 0.55), (16, 0.70), (8, 0.85)];

fn quantize_to_8(value: f32) -> u32 {
    ((value / 8.0).round() * 8.0) as u32
}

/// Resolution for the next island given how many already exist.
///
/// The result is a multiple of 8 in `[64, base]` (with `base` itself clamped
/// to `[64, 280]`) and never increases with `island_count`.
pub fn choose_adaptive_resolution(base_n: u32, island_count: usize) -> u32 {
    let safe_base = base_n.clamp(MIN_ADAPTIVE_RESOLUTION, MAX_BASE_RESOLUTION);
    let factor = LOD_STEPS
        .iter()
        .find(|(threshold, _)| island_count >= *threshold)
        .map(|&(_, factor)| factor)
        .unwrap_or(1.0);

    quantize_to_8(safe_base as f32 * factor).clamp(MIN_ADAPTIVE_RESOLUTION, safe_base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_base_for_few_islands() {
        assert_eq!(choose_adaptive_resolution(160, 0), 160);
        assert_eq!(choose_adaptive_resolution(160, 7), 160);
    }

    #[test]
    fn test_steps_down_at_thresholds() {
        assert_eq!(choose_adaptive_resolution(160, 8), 136);
        assert_eq!(choose_adaptive_resolution(160, 16), 112);
        assert_eq!(choose_adaptive_resolution(160, 24), 88);
    }

    #[test]
    fn test_monotonic_and_bounded() {
        let mut previous = u32::MAX;
        for count in [0, 6, 8, 16, 24, 100] {
            let n = choose_adaptive_resolution(160, count);
            assert!(n <= previous);
            assert!((64..=160).contains(&n));
            previous = n;
        }
    }

    #[test]
    fn test_clamps_degenerate_base() {
        assert_eq!(choose_adaptive_resolution(0, 0), 64);
        assert_eq!(choose_adaptive_resolution(10_000, 0), 280);
        assert_eq!(choose_adaptive_resolution(64, 30), 64);
    }
}
