//! Spawn position search inside the world disc

use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Ground-plane footprint of a spawned island.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedIsland {
    pub x: f32,
    pub z: f32,
    pub radius: f32,
}

impl PlacedIsland {
    pub fn distance_to(&self, x: f32, z: f32) -> f32 {
        (x - self.x).hypot(z - self.z)
    }
}

/// A free spawn location on the ground plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnPosition {
    pub x: f32,
    pub z: f32,
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

/// Rejection-sample a position whose footprint clears every existing island.
///
/// Candidates are drawn in polar form with `sqrt`-distributed radius in
/// `[candidate_radius, world_radius - candidate_radius - padding]`. Returns
/// `None` once `max_attempts` candidates have been rejected.
pub fn find_spawn_position<R: Rng + ?Sized>(
    existing: &[PlacedIsland],
    candidate_radius: f32,
    world_radius: f32,
    padding: f32,
    max_attempts: usize,
    rng: &mut R,
) -> Option<SpawnPosition> {
    let candidate_radius = finite_or_zero(candidate_radius);
    let world_radius = finite_or_zero(world_radius);
    let padding = finite_or_zero(padding);

    let min_r = candidate_radius;
    let max_r = min_r.max(world_radius - candidate_radius - padding);

    for _ in 0..max_attempts {
        let angle = rng.gen::<f32>() * TAU;
        let radial = min_r + rng.gen::<f32>().sqrt() * (max_r - min_r).max(0.0);
        let x = angle.cos() * radial;
        let z = angle.sin() * radial;

        let clear = existing
            .iter()
            .all(|island| island.distance_to(x, z) > island.radius + candidate_radius + padding);
        if clear {
            return Some(SpawnPosition { x, z });
        }
    }

    None
}
