//! Seed management for island synthesis
//!
//! Every noise layer of an island gets its own seed derived from the island
//! seed, so layers stay independent while the whole island remains a pure
//! function of one number.

/// Seeds for all noise layers of one island.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IslandSeeds {
    /// Island seed; also drives the shape RNG (lobe centres, peaks, crater)
    pub master: i32,
    /// Rolling hills over the base landmass
    pub hills: i32,
    /// Domain warp, x component
    pub warp_x: i32,
    /// Domain warp, y component
    pub warp_y: i32,
    /// Mountain-zone boundary perturbation
    pub zone_boundary: i32,
    /// Broad ridge field
    pub ridge_broad: i32,
    /// Fine ridge field
    pub ridge_fine: i32,
    /// Underside irregularity
    pub underside: i32,
    /// Coarse cliff rock noise
    pub rock_coarse: i32,
    /// Fine cliff rock noise
    pub rock_fine: i32,
}

impl IslandSeeds {
    /// Derive all layer seeds from the island seed.
    pub fn from_master(master: i32) -> Self {
        Self {
            master,
            hills: derive_seed(master, 1),
            warp_x: derive_seed(master, 100),
            warp_y: derive_seed(master, 101),
            zone_boundary: derive_seed(master, 102),
            ridge_broad: derive_seed(master, 10),
            ridge_fine: derive_seed(master, 11),
            underside: derive_seed(master, 20),
            rock_coarse: derive_seed(master, 200),
            rock_fine: derive_seed(master, 201),
        }
    }
}

/// Offset a seed by a fixed layer id, wrapping on overflow.
pub fn derive_seed(master: i32, layer: i32) -> i32 {
    master.wrapping_add(layer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_seeds_are_distinct() {
        let seeds = IslandSeeds::from_master(4121132);
        let all = [
            seeds.hills,
            seeds.warp_x,
            seeds.warp_y,
            seeds.zone_boundary,
            seeds.ridge_broad,
            seeds.ridge_fine,
            seeds.underside,
            seeds.rock_coarse,
            seeds.rock_fine,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_derive_wraps() {
        assert_eq!(derive_seed(i32::MAX, 1), i32::MIN);
    }
}
