//! Single-island pipeline: parameters, heightfield synthesis, mesh
//! extraction, surface queries, level of detail and spawn placement.

pub mod generator;
pub mod lod;
pub mod mesh;
pub mod params;
pub mod placement;
pub mod surface;

pub use generator::{generate_island, generate_island_with, IslandHeightfield, SynthesisConstants};
pub use lod::choose_adaptive_resolution;
pub use mesh::{build_island_mesh, IslandMesh, MeshVertex};
pub use params::{IslandParams, RANDOM_PARAM_RANGES};
pub use placement::{find_spawn_position, PlacedIsland, SpawnPosition};
pub use surface::IslandSurface;
