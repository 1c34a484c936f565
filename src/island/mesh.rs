//! Closed triangle mesh extraction from an island heightfield
//!
//! Land quads produce a top face and a matching underside face; top edges
//! used by exactly one quad lie on the shoreline and get a vertical skirt
//! quad joining the two surfaces, so the hull has no open faces.

use std::collections::BTreeMap;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::island::generator::IslandHeightfield;

/// Interleaved vertex as handed to the scene layer.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Indexed island mesh.
///
/// Vertices `0..n²` belong to the top surface and `n²..2n²` to the underside.
#[derive(Clone, Debug, PartialEq)]
pub struct IslandMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    /// Largest planar distance of a land vertex from the island centre
    pub approx_radius: f32,
    /// Number of top-surface vertices (`n²`)
    pub surface_offset: u32,
    /// Number of shoreline skirt quads
    pub skirt_quads: usize,
}

impl IslandMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Highest vertex of the top surface in island-local space.
    pub fn top_point(&self) -> Option<Vec3> {
        self.vertices[..self.surface_offset as usize]
            .iter()
            .map(|v| Vec3::from(v.position))
            .max_by(|a, b| a.y.total_cmp(&b.y))
    }

    /// Raw vertex bytes for GPU upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Usage of one undirected top edge.
struct EdgeUse {
    count: u32,
    /// Planar centre of the first quad that used the edge
    quad_center: (f32, f32),
}

/// Build the closed mesh for `data`.
pub fn build_island_mesh(data: &IslandHeightfield) -> IslandMesh {
    let n = data.n;
    let half = data.xy_scale * 0.5;
    let offset = (n * n) as u32;

    let mut positions = vec![Vec3::ZERO; n * n * 2];
    for (j, i, &xx) in data.x.iter() {
        let k = i * n + j;
        let px = xx * half;
        let pz = *data.y.get(j, i) * half;
        positions[k] = Vec3::new(px, *data.top.get(j, i) * data.z_scale, pz);
        positions[k + offset as usize] = Vec3::new(px, *data.bottom.get(j, i) * data.z_scale, pz);
    }

    let ocean = data.ocean_mask.as_slice();
    let mut indices: Vec<u32> = Vec::new();
    let mut edges: BTreeMap<(u32, u32), EdgeUse> = BTreeMap::new();

    for i in 0..n.saturating_sub(1) {
        for j in 0..n.saturating_sub(1) {
            let a = (i * n + j) as u32;
            let b = (i * n + j + 1) as u32;
            let c = ((i + 1) * n + j + 1) as u32;
            let d = ((i + 1) * n + j) as u32;

            if [a, b, c, d].iter().any(|&v| ocean[v as usize]) {
                continue;
            }

            // Top faces +Y, underside faces -Y
            push_quad(&mut indices, a, d, c, b);
            push_quad(&mut indices, a + offset, b + offset, c + offset, d + offset);

            let pa = positions[a as usize];
            let pc = positions[c as usize];
            let center = ((pa.x + pc.x) * 0.5, (pa.z + pc.z) * 0.5);
            for (u, v) in [(a, b), (b, c), (c, d), (d, a)] {
                let key = if u < v { (u, v) } else { (v, u) };
                edges
                    .entry(key)
                    .or_insert(EdgeUse { count: 0, quad_center: center })
                    .count += 1;
            }
        }
    }

    let mut skirt_quads = 0;
    for (&(u, v), edge) in &edges {
        if edge.count != 1 {
            continue;
        }
        let pu = positions[u as usize];
        let pv = positions[v as usize];
        // Orient the wall away from the land quad it borders.
        let edge_dir = pv - pu;
        let mid = (pu + pv) * 0.5;
        let outward = edge_dir.z * (mid.x - edge.quad_center.0) - edge_dir.x * (mid.z - edge.quad_center.1);
        if outward >= 0.0 {
            push_quad(&mut indices, u, v, v + offset, u + offset);
        } else {
            push_quad(&mut indices, v, u, u + offset, v + offset);
        }
        skirt_quads += 1;
    }

    let normals = compute_vertex_normals(&positions, &indices);

    let approx_radius = positions[..offset as usize]
        .iter()
        .zip(ocean)
        .filter(|(_, &is_ocean)| !is_ocean)
        .map(|(p, _)| p.x.hypot(p.z))
        .fold(0.0f32, f32::max);

    let vertices = positions
        .iter()
        .zip(&normals)
        .map(|(p, nrm)| MeshVertex {
            position: p.to_array(),
            normal: nrm.to_array(),
        })
        .collect();

    IslandMesh {
        vertices,
        indices,
        approx_radius,
        surface_offset: offset,
        skirt_quads,
    }
}

fn push_quad(indices: &mut Vec<u32>, a: u32, b: u32, c: u32, d: u32) {
    indices.extend_from_slice(&[a, b, c, a, c, d]);
}

/// Area-weighted vertex normals. Vertices referenced by no triangle keep a
/// zero normal.
pub fn compute_vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    for nrm in &mut normals {
        *nrm = nrm.normalize_or_zero();
    }
    normals
}
