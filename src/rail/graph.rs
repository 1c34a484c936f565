//! Minimum spanning tree over island anchors
//!
//! The tree is rebuilt from the full node list on every insertion; a new
//! point can restructure the optimal tree, so incremental patching would not
//! stay minimal.

use std::collections::{HashMap, HashSet};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::rail::NodeId;

/// Network vertex anchored at an island.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RailNode {
    pub id: NodeId,
    pub position: Vec3,
    /// Planar island radius around the anchor
    pub radius: f32,
}

/// Undirected connection between two nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RailEdge {
    pub from_id: NodeId,
    pub to_id: NodeId,
}

/// Ground-plane (x, z) distance.
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    (a.x - b.x).hypot(a.z - b.z)
}

/// Greedy Prim's algorithm over planar distance, starting from node 0.
///
/// Each step scans every (visited, unvisited) pair, visited nodes in the
/// order they joined the tree and unvisited nodes by index; the first pair
/// found at the minimum distance wins. Returns `nodes.len() - 1` edges for
/// two or more nodes and nothing otherwise.
pub fn build_mst_edges(nodes: &[RailNode]) -> Vec<RailEdge> {
    if nodes.len() < 2 {
        return Vec::new();
    }

    let mut in_tree = vec![false; nodes.len()];
    let mut visit_order = vec![0usize];
    in_tree[0] = true;
    let mut edges = Vec::with_capacity(nodes.len() - 1);

    while visit_order.len() < nodes.len() {
        let mut best: Option<(usize, usize, f32)> = None;

        for &from in &visit_order {
            for to in 0..nodes.len() {
                if in_tree[to] {
                    continue;
                }
                let d = planar_distance(nodes[from].position, nodes[to].position);
                if best.map_or(true, |(_, _, best_d)| d < best_d) {
                    best = Some((from, to, d));
                }
            }
        }

        let Some((from, to, _)) = best else {
            break;
        };
        in_tree[to] = true;
        visit_order.push(to);
        edges.push(RailEdge {
            from_id: nodes[from].id,
            to_id: nodes[to].id,
        });
    }

    edges
}

/// Sum of planar edge lengths; edges referring to unknown nodes are skipped.
pub fn total_planar_length(nodes: &[RailNode], edges: &[RailEdge]) -> f32 {
    let by_id: HashMap<NodeId, Vec3> = nodes.iter().map(|n| (n.id, n.position)).collect();
    edges
        .iter()
        .filter_map(|e| Some(planar_distance(*by_id.get(&e.from_id)?, *by_id.get(&e.to_id)?)))
        .sum()
}

/// Whether `edges` connect every node in `nodes`.
pub fn is_connected(nodes: &[RailNode], edges: &[RailEdge]) -> bool {
    let Some(first) = nodes.first() else {
        return true;
    };
    let mut adjacency: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for e in edges {
        adjacency.entry(e.from_id).or_default().push(e.to_id);
        adjacency.entry(e.to_id).or_default().push(e.from_id);
    }

    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut stack = vec![first.id];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        if let Some(next) = adjacency.get(&id) {
            stack.extend(next.iter().filter(|n| !seen.contains(n)));
        }
    }
    nodes.iter().all(|n| seen.contains(&n.id))
}
