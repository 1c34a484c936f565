//! Height queries against a generated island surface
//!
//! Rail anchors sit on the land surface, so the world keeps a scaled copy of
//! each island's top heightfield after the mesh has been built.

use crate::island::generator::IslandHeightfield;
use crate::tilemap::Tilemap;

/// Top surface of one island in island-local world units.
#[derive(Clone, Debug, PartialEq)]
pub struct IslandSurface {
    n: usize,
    half_extent: f32,
    /// `top * z_scale`, zero on ocean cells
    heights: Tilemap<f32>,
    ocean: Tilemap<bool>,
}

impl IslandSurface {
    pub fn from_heightfield(data: &IslandHeightfield) -> Self {
        let heights = data
            .top
            .zip_map(&data.ocean_mask, |&h, &ocean| if ocean { 0.0 } else { h * data.z_scale });
        Self {
            n: data.n,
            half_extent: (data.xy_scale * 0.5).abs(),
            heights,
            ocean: data.ocean_mask.clone(),
        }
    }

    /// Fractional grid coordinates of a local point, or `None` outside the grid.
    fn grid_coords(&self, local_x: f32, local_z: f32) -> Option<(f32, f32)> {
        if self.n < 2 || self.half_extent <= 0.0 || !local_x.is_finite() || !local_z.is_finite() {
            return None;
        }
        let span = (self.n - 1) as f32;
        let gx = (local_x / self.half_extent + 1.0) * 0.5 * span;
        let gz = (local_z / self.half_extent + 1.0) * 0.5 * span;
        if gx < 0.0 || gz < 0.0 || gx > span || gz > span {
            return None;
        }
        Some((gx, gz))
    }

    /// Surface height at a local planar point; 0 outside the grid.
    pub fn height_at(&self, local_x: f32, local_z: f32) -> f32 {
        match self.grid_coords(local_x, local_z) {
            Some((gx, gz)) => self.heights.sample_bilinear(gx, gz),
            None => 0.0,
        }
    }

    /// Whether the nearest cell to a local point is land.
    pub fn is_land(&self, local_x: f32, local_z: f32) -> bool {
        match self.grid_coords(local_x, local_z) {
            Some((gx, gz)) => !*self.ocean.get(gx.round() as usize, gz.round() as usize),
            None => false,
        }
    }

    pub fn max_height(&self) -> f32 {
        self.heights.min_max().map(|(_, hi)| hi).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::island::generator::generate_island;
    use crate::island::mesh::build_island_mesh;
    use crate::island::params::IslandParams;

    #[test]
    fn test_height_matches_mesh_vertices() {
        let params = IslandParams { n: 48, ..IslandParams::default() };
        let data = generate_island(&params);
        let surface = IslandSurface::from_heightfield(&data);
        let mesh = build_island_mesh(&data);

        let k = 24 * 48 + 24;
        let v = mesh.vertices[k].position;
        assert!((surface.height_at(v[0], v[2]) - v[1]).abs() < 1e-3);
        assert!(surface.is_land(v[0], v[2]));
    }

    #[test]
    fn test_outside_grid_is_zero() {
        let params = IslandParams { n: 32, ..IslandParams::default() };
        let surface = IslandSurface::from_heightfield(&generate_island(&params));
        assert_eq!(surface.height_at(1000.0, 0.0), 0.0);
        assert_eq!(surface.height_at(f32::NAN, 0.0), 0.0);
        assert!(!surface.is_land(-1000.0, 0.0));
        assert!(surface.max_height() > 0.0);
    }
}
