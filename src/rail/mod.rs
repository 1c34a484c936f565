//! Rail network: spanning-tree connectivity, closed traversal path and
//! discrete rail piece placement.

pub mod graph;
pub mod kit;
pub mod path;
pub mod placer;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use graph::{build_mst_edges, RailEdge, RailNode};
pub use kit::{AlternatingRailKit, RailKit};
pub use path::{build_traversal_path, RailEdgeSegment, SegmentKind, TrainPathSegment};
pub use placer::{place_alternating_segments, place_rail_segments, RailPieceKind, RailPiecePlacement};

/// Identifier of a rail node (one per island).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Identifier of a realized rail edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge-{}", self.0)
    }
}
