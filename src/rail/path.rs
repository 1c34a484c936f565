//! Closed traversal path over the rail tree
//!
//! A depth-first walk drives every edge once forward and once back, so the
//! train visits each rail in both directions and ends where it started.
//! Gaps between consecutive rails (anchors on the same island differ per
//! edge) are bridged by connector segments.

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::rail::{EdgeId, NodeId};

/// Segments this short or shorter are dropped.
pub const MIN_SEGMENT_LENGTH: f32 = 1e-5;

/// A realized rail edge with its two surface anchors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RailEdgeSegment {
    pub id: EdgeId,
    pub from_id: NodeId,
    pub to_id: NodeId,
    pub from_point: Vec3,
    pub to_point: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    Rail,
    Connector,
}

/// One straight piece of the train route.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainPathSegment {
    pub start: Vec3,
    pub end: Vec3,
    pub length: f32,
    pub kind: SegmentKind,
    /// Set for rail segments only
    pub edge_id: Option<EdgeId>,
}

impl TrainPathSegment {
    fn new(start: Vec3, end: Vec3, kind: SegmentKind, edge_id: Option<EdgeId>) -> Option<Self> {
        let length = start.distance(end);
        if !(length > MIN_SEGMENT_LENGTH) {
            return None;
        }
        Some(Self { start, end, length, kind, edge_id })
    }

    /// Unit direction from start to end.
    pub fn direction(&self) -> Vec3 {
        (self.end - self.start) / self.length
    }

    /// Point at `distance` from the start, clamped to the segment.
    pub fn point_at(&self, distance: f32) -> Vec3 {
        let t = (distance / self.length).clamp(0.0, 1.0);
        self.start.lerp(self.end, t)
    }
}

struct DirectedEdge {
    start: Vec3,
    end: Vec3,
    edge_id: EdgeId,
}

/// First node of degree one, in order of first appearance; falls back to the
/// first edge's origin when every node has degree two or more.
fn select_start_node(edges: &[RailEdgeSegment]) -> NodeId {
    let mut order: Vec<NodeId> = Vec::new();
    let mut degree: HashMap<NodeId, usize> = HashMap::new();
    for edge in edges {
        for id in [edge.from_id, edge.to_id] {
            let d = degree.entry(id).or_insert_with(|| {
                order.push(id);
                0
            });
            *d += 1;
        }
    }

    order
        .into_iter()
        .find(|id| degree.get(id) == Some(&1))
        .unwrap_or(edges[0].from_id)
}

struct Walker<'a> {
    edges: &'a [RailEdgeSegment],
    adjacency: HashMap<NodeId, Vec<usize>>,
    visited: Vec<bool>,
    ordered: Vec<DirectedEdge>,
}

impl Walker<'_> {
    // Recursion depth is bounded by the tree depth, which is at most the
    // number of islands.
    fn walk(&mut self, node: NodeId) {
        let incident = self.adjacency.get(&node).cloned().unwrap_or_default();
        for edge_index in incident {
            if self.visited[edge_index] {
                continue;
            }
            self.visited[edge_index] = true;

            let edge = &self.edges[edge_index];
            let (start, end, next) = if edge.from_id == node {
                (edge.from_point, edge.to_point, edge.to_id)
            } else {
                (edge.to_point, edge.from_point, edge.from_id)
            };

            self.ordered.push(DirectedEdge { start, end, edge_id: edge.id });
            self.walk(next);
            self.ordered.push(DirectedEdge { start: end, end: start, edge_id: edge.id });
        }
    }
}

/// Build the closed route driving every edge forward and back.
///
/// Returns an empty path for no edges. Degenerate rails are skipped but still
/// advance the connector origin, which keeps the route continuous.
pub fn build_traversal_path(edges: &[RailEdgeSegment]) -> Vec<TrainPathSegment> {
    if edges.is_empty() {
        return Vec::new();
    }

    let mut adjacency: HashMap<NodeId, Vec<usize>> = HashMap::new();
    for (i, edge) in edges.iter().enumerate() {
        adjacency.entry(edge.from_id).or_default().push(i);
        adjacency.entry(edge.to_id).or_default().push(i);
    }

    let mut walker = Walker {
        edges,
        adjacency,
        visited: vec![false; edges.len()],
        ordered: Vec::with_capacity(edges.len() * 2),
    };
    walker.walk(select_start_node(edges));

    let mut result = Vec::with_capacity(walker.ordered.len() * 2);
    let mut prev_end: Option<Vec3> = None;
    let first_start = walker.ordered.first().map(|d| d.start);

    for directed in &walker.ordered {
        if let Some(prev) = prev_end {
            result.extend(TrainPathSegment::new(prev, directed.start, SegmentKind::Connector, None));
        }
        result.extend(TrainPathSegment::new(
            directed.start,
            directed.end,
            SegmentKind::Rail,
            Some(directed.edge_id),
        ));
        prev_end = Some(directed.end);
    }

    if let (Some(prev), Some(first)) = (prev_end, first_start) {
        result.extend(TrainPathSegment::new(prev, first, SegmentKind::Connector, None));
    }

    result
}

/// Total route length.
pub fn path_length(segments: &[TrainPathSegment]) -> f32 {
    segments.iter().map(|s| s.length).sum()
}

/// Edge ids of the rail segments, in route order.
pub fn rail_edge_ids(segments: &[TrainPathSegment]) -> Vec<EdgeId> {
    segments.iter().filter_map(|s| s.edge_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(id: u32, from: u32, to: u32, a: Vec3, b: Vec3) -> RailEdgeSegment {
        RailEdgeSegment {
            id: EdgeId(id),
            from_id: NodeId(from),
            to_id: NodeId(to),
            from_point: a,
            to_point: b,
        }
    }

    fn star() -> Vec<RailEdgeSegment> {
        // Hub node 0 at the origin, three spokes with inset anchors.
        vec![
            edge(0, 0, 1, Vec3::new(1.0, 0.0, 0.0), Vec3::new(9.0, 0.0, 0.0)),
            edge(1, 0, 2, Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 2.0, 9.0)),
            edge(2, 0, 3, Vec3::new(-1.0, 0.0, 0.0), Vec3::new(-9.0, -1.0, 0.0)),
        ]
    }

    #[test]
    fn test_empty_edges_give_empty_path() {
        assert!(build_traversal_path(&[]).is_empty());
    }

    #[test]
    fn test_every_edge_driven_both_ways() {
        let edges = star();
        let path = build_traversal_path(&edges);
        let ids = rail_edge_ids(&path);
        assert_eq!(ids.len(), edges.len() * 2);
        for e in &edges {
            assert_eq!(ids.iter().filter(|&&id| id == e.id).count(), 2);
        }
    }

    #[test]
    fn test_path_is_continuous_and_closed() {
        let path = build_traversal_path(&star());
        for pair in path.windows(2) {
            assert!(pair[0].end.distance(pair[1].start) < 1e-5);
        }
        let first = path.first().unwrap();
        let last = path.last().unwrap();
        assert!(last.end.distance(first.start) < 1e-5);
    }

    #[test]
    fn test_connectors_bridge_anchor_gaps() {
        let path = build_traversal_path(&star());
        let connectors = path.iter().filter(|s| s.kind == SegmentKind::Connector).count();
        assert!(connectors > 0);
        assert!(path.iter().filter(|s| s.kind == SegmentKind::Connector).all(|s| s.edge_id.is_none()));
        assert!(path.len() > star().len());
    }

    #[test]
    fn test_starts_from_leaf() {
        // Chain 0-1-2 listed hub-first: node 0 is still the first leaf seen.
        let edges = vec![
            edge(0, 1, 0, Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO),
            edge(1, 1, 2, Vec3::new(10.0, 0.0, 0.0), Vec3::new(20.0, 0.0, 0.0)),
        ];
        let path = build_traversal_path(&edges);
        assert_eq!(path[0].start, Vec3::ZERO);
        assert_eq!(path[0].edge_id, Some(EdgeId(0)));
    }

    #[test]
    fn test_single_edge_round_trip() {
        let edges = vec![edge(0, 0, 1, Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0))];
        let path = build_traversal_path(&edges);
        assert_eq!(path.len(), 2);
        assert!((path_length(&path) - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_rail_is_dropped() {
        let edges = vec![
            edge(0, 0, 1, Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0)),
            edge(1, 1, 2, Vec3::new(6.0, 0.0, 0.0), Vec3::new(6.0, 0.0, 0.0)),
        ];
        let path = build_traversal_path(&edges);
        assert!(path.iter().all(|s| s.length > MIN_SEGMENT_LENGTH));
        assert_eq!(rail_edge_ids(&path), vec![EdgeId(0), EdgeId(0)]);
        for pair in path.windows(2) {
            assert!(pair[0].end.distance(pair[1].start) < 1e-5);
        }
    }

    #[test]
    fn test_point_at_clamps() {
        let seg = TrainPathSegment::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 4.0), SegmentKind::Rail, None).unwrap();
        assert_eq!(seg.point_at(2.0), Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(seg.point_at(-1.0), Vec3::ZERO);
        assert_eq!(seg.point_at(99.0), seg.end);
        assert_eq!(seg.direction(), Vec3::Z);
    }
}
