//! World controller
//!
//! Owns every spawned island together with the rail network and the train
//! running on it. The network (tree, anchors, pieces, traversal path) is
//! derived state and is rebuilt wholesale whenever the island set or the
//! rail kit changes.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::WorldConfig;
use crate::island::{
    build_island_mesh, choose_adaptive_resolution, find_spawn_position, generate_island_with, IslandHeightfield,
    IslandMesh, IslandParams, IslandSurface, PlacedIsland,
};
use crate::rail::graph::{build_mst_edges, planar_distance, RailEdge, RailNode};
use crate::rail::kit::{AlternatingRailKit, RailKit};
use crate::rail::path::{build_traversal_path, path_length, RailEdgeSegment, TrainPathSegment};
use crate::rail::placer::{place_alternating_segments, place_rail_segments, RailPiecePlacement};
use crate::rail::{EdgeId, NodeId};
use crate::train::{TrainMotion, TrainState};

/// Inward halvings tried before an anchor falls back to the island centre.
const ANCHOR_RETRIES: usize = 4;

/// Rail models available to the network builder.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum TrackKit {
    /// Start cap, stretched main pieces, end cap
    Capped(RailKit),
    /// Fixed-length long/short sections
    Alternating(AlternatingRailKit),
}

/// A generated island and where it sits in the world.
pub struct SpawnedIsland {
    pub id: NodeId,
    pub name: String,
    pub params: IslandParams,
    pub placement: PlacedIsland,
    /// Height of the island's local origin
    pub altitude: f32,
    pub resolution: u32,
    pub heightfield: IslandHeightfield,
    pub mesh: IslandMesh,
    pub surface: IslandSurface,
}

impl SpawnedIsland {
    pub fn origin(&self) -> Vec3 {
        Vec3::new(self.placement.x, self.altitude, self.placement.z)
    }

    /// Anchor position `reach` from the centre along `(dx, dz)`, pulled
    /// inwards in halves until it lands on land; the centre is the last resort.
    pub fn land_anchor(&self, dx: f32, dz: f32, reach: f32) -> (f32, f32) {
        let mut r = reach;
        for _ in 0..ANCHOR_RETRIES {
            if self.surface.is_land(dx * r, dz * r) {
                return (self.placement.x + dx * r, self.placement.z + dz * r);
            }
            r *= 0.5;
        }
        (self.placement.x, self.placement.z)
    }

    /// World-space point on the top surface above `(x, z)`, lifted by `lift`.
    pub fn surface_point(&self, x: f32, z: f32, lift: f32) -> Vec3 {
        let local = self.surface.height_at(x - self.placement.x, z - self.placement.z);
        Vec3::new(x, self.altitude + local + lift, z)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnReport {
    pub id: NodeId,
    pub name: String,
    pub position: Vec3,
    pub radius: f32,
    pub resolution: u32,
    pub triangle_count: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SpawnOutcome {
    Spawned(SpawnReport),
    /// No free position was found; the world is unchanged
    NoSpace,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IslandSummary {
    pub id: NodeId,
    pub name: String,
    pub x: f32,
    pub z: f32,
    pub altitude: f32,
    pub radius: f32,
    /// Highest point of the top surface in world space
    pub peak: f32,
    pub resolution: u32,
    pub triangles: usize,
}

/// Serializable snapshot of the world for export and display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSummary {
    pub seed: u64,
    pub island_count: usize,
    pub edge_count: usize,
    pub rail_piece_count: usize,
    pub path_segment_count: usize,
    pub path_length: f32,
    pub islands: Vec<IslandSummary>,
    pub edges: Vec<RailEdgeSegment>,
    pub train: TrainState,
}

pub struct World {
    config: WorldConfig,
    rng: ChaCha8Rng,
    islands: Vec<SpawnedIsland>,
    nodes: Vec<RailNode>,
    edges: Vec<RailEdge>,
    edge_segments: Vec<RailEdgeSegment>,
    track_kit: Option<TrackKit>,
    placements: Vec<RailPiecePlacement>,
    path: Vec<TrainPathSegment>,
    train: TrainMotion,
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let train = TrainMotion::new(Vec::new(), config.train);
        Self {
            config,
            rng,
            islands: Vec::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            edge_segments: Vec::new(),
            track_kit: None,
            placements: Vec::new(),
            path: Vec::new(),
            train,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn islands(&self) -> &[SpawnedIsland] {
        &self.islands
    }

    pub fn nodes(&self) -> &[RailNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[RailEdge] {
        &self.edges
    }

    pub fn edge_segments(&self) -> &[RailEdgeSegment] {
        &self.edge_segments
    }

    pub fn rail_placements(&self) -> &[RailPiecePlacement] {
        &self.placements
    }

    pub fn path(&self) -> &[TrainPathSegment] {
        &self.path
    }

    pub fn train_state(&self) -> &TrainState {
        self.train.state()
    }

    pub fn island_count(&self) -> usize {
        self.islands.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn rail_piece_count(&self) -> usize {
        self.placements.len()
    }

    pub fn path_segment_count(&self) -> usize {
        self.path.len()
    }

    /// Place, generate and connect one island.
    ///
    /// The grid resolution is `params.n` reduced by the current island count.
    pub fn spawn_island(&mut self, params: &IslandParams) -> SpawnOutcome {
        let params = &params.sanitized();
        let index = self.islands.len();
        let resolution = choose_adaptive_resolution(params.n.min(u32::MAX as usize) as u32, index);
        let footprint = params.footprint_radius();

        let existing: Vec<PlacedIsland> = self.islands.iter().map(|i| i.placement).collect();
        let Some(pos) = find_spawn_position(
            &existing,
            footprint,
            self.config.world_radius,
            self.config.spawn_padding,
            self.config.max_spawn_attempts,
            &mut self.rng,
        ) else {
            warn!(
                "No free spawn position after {} attempts (radius {:.1}, {} islands)",
                self.config.max_spawn_attempts, footprint, index
            );
            return SpawnOutcome::NoSpace;
        };

        let altitude = if self.config.altitude_min < self.config.altitude_max {
            self.rng.gen_range(self.config.altitude_min..self.config.altitude_max)
        } else if self.config.altitude_min.is_finite() {
            self.config.altitude_min
        } else {
            0.0
        };

        let mut island_params = params.clone();
        island_params.n = resolution as usize;
        let heightfield = generate_island_with(&island_params, &self.config.synthesis);
        let mesh = build_island_mesh(&heightfield);
        let surface = IslandSurface::from_heightfield(&heightfield);

        let id = NodeId(index as u32);
        let name = format!("{}-{}", params.name_prefix, index + 1);
        let radius = if mesh.approx_radius > 0.0 { mesh.approx_radius } else { footprint };
        let report = SpawnReport {
            id,
            name: name.clone(),
            position: Vec3::new(pos.x, altitude, pos.z),
            radius,
            resolution,
            triangle_count: mesh.triangle_count(),
        };

        let island = SpawnedIsland {
            id,
            name,
            params: island_params,
            placement: PlacedIsland { x: pos.x, z: pos.z, radius: footprint },
            altitude,
            resolution,
            heightfield,
            mesh,
            surface,
        };
        let centre = island.surface_point(pos.x, pos.z, 0.0);
        self.nodes.push(RailNode { id, position: centre, radius });
        self.islands.push(island);

        info!(
            "Spawned {} at ({:.1}, {:.1}, {:.1}), n={}, {} triangles",
            report.name, pos.x, altitude, pos.z, resolution, report.triangle_count
        );

        self.rebuild_network();
        SpawnOutcome::Spawned(report)
    }

    /// Spawn an island with random parameters at the configured base resolution.
    pub fn spawn_random_island(&mut self, name_prefix: &str) -> SpawnOutcome {
        let mut params = IslandParams::random(&mut self.rng, name_prefix);
        params.n = self.config.base_resolution as usize;
        self.spawn_island(&params)
    }

    /// Replace the rail models and re-lay every edge. `None` removes all
    /// pieces; the traversal path is kept either way.
    pub fn set_rail_kit(&mut self, kit: Option<TrackKit>) {
        self.track_kit = kit;
        self.rebuild_network();
    }

    /// Recompute the tree, anchors, rail pieces and path from the island set.
    pub fn rebuild_network(&mut self) {
        self.edges = build_mst_edges(&self.nodes);
        self.edge_segments = self
            .edges
            .iter()
            .enumerate()
            .filter_map(|(i, edge)| self.edge_segment(EdgeId(i as u32), edge))
            .collect();

        self.placements = match &self.track_kit {
            Some(TrackKit::Capped(kit)) => self
                .edge_segments
                .iter()
                .flat_map(|s| place_rail_segments(kit, s.from_point, s.to_point, self.config.rail_min_offset))
                .collect(),
            Some(TrackKit::Alternating(kit)) => self
                .edge_segments
                .iter()
                .flat_map(|s| place_alternating_segments(kit, s.from_point, s.to_point, self.config.rail_min_offset))
                .collect(),
            None => Vec::new(),
        };

        self.path = build_traversal_path(&self.edge_segments);
        // An idle train starts from the head of the new route.
        let moving = self.train.state().travelled > 0.0;
        self.train.set_segments(self.path.clone(), moving);

        debug!(
            "Rebuilt network: {} nodes, {} edges, {} pieces, {} path segments ({:.1} long)",
            self.nodes.len(),
            self.edges.len(),
            self.placements.len(),
            self.path.len(),
            path_length(&self.path)
        );
    }

    /// Anchors sit inside each island, inset from the centre towards the
    /// other end of the edge, on the sampled top surface.
    fn edge_segment(&self, id: EdgeId, edge: &RailEdge) -> Option<RailEdgeSegment> {
        let from = self.islands.get(edge.from_id.0 as usize)?;
        let to = self.islands.get(edge.to_id.0 as usize)?;
        let from_node = self.nodes.get(edge.from_id.0 as usize)?;
        let to_node = self.nodes.get(edge.to_id.0 as usize)?;

        let a = from.origin();
        let b = to.origin();
        let planar = planar_distance(a, b);
        let (dx, dz) = if planar > 1e-6 {
            ((b.x - a.x) / planar, (b.z - a.z) / planar)
        } else {
            (0.0, 0.0)
        };

        let inset = self.config.anchor_inset;
        let lift = self.config.rail_lift;
        let from_reach = from_node.radius * inset;
        let to_reach = to_node.radius * inset;

        let (fx, fz) = from.land_anchor(dx, dz, from_reach);
        let (tx, tz) = to.land_anchor(-dx, -dz, to_reach);

        Some(RailEdgeSegment {
            id,
            from_id: edge.from_id,
            to_id: edge.to_id,
            from_point: from.surface_point(fx, fz, lift),
            to_point: to.surface_point(tx, tz, lift),
        })
    }

    /// Advance the train by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> TrainState {
        self.train.update(dt)
    }

    pub fn set_train_speed(&mut self, speed: f32) {
        self.train.set_speed(speed);
    }

    pub fn summary(&self) -> WorldSummary {
        WorldSummary {
            seed: self.config.seed,
            island_count: self.island_count(),
            edge_count: self.edge_count(),
            rail_piece_count: self.rail_piece_count(),
            path_segment_count: self.path_segment_count(),
            path_length: path_length(&self.path),
            islands: self
                .islands
                .iter()
                .map(|i| IslandSummary {
                    id: i.id,
                    name: i.name.clone(),
                    x: i.placement.x,
                    z: i.placement.z,
                    altitude: i.altitude,
                    radius: i.mesh.approx_radius,
                    peak: i.altitude + i.surface.max_height(),
                    resolution: i.resolution,
                    triangles: i.mesh.triangle_count(),
                })
                .collect(),
            edges: self.edge_segments.clone(),
            train: self.train.state().clone(),
        }
    }
}
