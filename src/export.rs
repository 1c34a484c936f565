use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::{ImageBuffer, Rgb, RgbImage};
use thiserror::Error;

use crate::island::IslandHeightfield;
use crate::noise::normalize;
use crate::world::{World, WorldSummary};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),
}

const OCEAN_COLOR: [u8; 3] = [18, 32, 58];
const BACKGROUND: [u8; 3] = [30, 30, 30];
const RAIL_COLOR: [u8; 3] = [235, 235, 235];

/// Render the top surface with a spectral colormap; ocean cells are dark.
pub fn render_heightfield(data: &IslandHeightfield) -> RgbImage {
    let top = normalize(&data.top);
    let mut img: RgbImage = ImageBuffer::new(top.width as u32, top.height as u32);

    for (x, y, &val) in top.iter() {
        let color = if *data.ocean_mask.get(x, y) {
            OCEAN_COLOR
        } else {
            spectral_colormap(val.clamp(0.0, 1.0))
        };
        img.put_pixel(x as u32, y as u32, Rgb(color));
    }

    img
}

pub fn export_heightfield_png(data: &IslandHeightfield, path: impl AsRef<Path>) -> Result<(), ExportError> {
    render_heightfield(data).save(path)?;
    Ok(())
}

/// White land on black ocean.
pub fn render_ocean_mask(data: &IslandHeightfield) -> RgbImage {
    let mask = &data.ocean_mask;
    ImageBuffer::from_fn(mask.width as u32, mask.height as u32, |x, y| {
        if *mask.get(x as usize, y as usize) {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    })
}

pub fn export_ocean_mask_png(data: &IslandHeightfield, path: impl AsRef<Path>) -> Result<(), ExportError> {
    render_ocean_mask(data).save(path)?;
    Ok(())
}

/// Top-down plan of the world: island footprints coloured by altitude and
/// the rail tree drawn between anchors.
pub fn render_world_map(world: &World, size: u32) -> RgbImage {
    let size = size.max(16);
    let mut img: RgbImage = ImageBuffer::from_pixel(size, size, Rgb(BACKGROUND));
    let world_radius = world.config().world_radius.max(1.0);
    let scale = (size - 1) as f32 * 0.5 / world_radius;
    let to_px = |v: f32| (v + world_radius) * scale;

    let lo = world.config().altitude_min;
    let span = (world.config().altitude_max - lo).max(1e-6);

    for island in world.islands() {
        let t = ((island.altitude - lo) / span).clamp(0.0, 1.0);
        let color = spectral_colormap(t);
        let cx = to_px(island.placement.x);
        let cz = to_px(island.placement.z);
        let r = (island.mesh.approx_radius * scale).max(1.0);

        let x0 = (cx - r).floor().max(0.0) as u32;
        let x1 = ((cx + r).ceil() as u32).min(size - 1);
        let z0 = (cz - r).floor().max(0.0) as u32;
        let z1 = ((cz + r).ceil() as u32).min(size - 1);
        for pz in z0..=z1 {
            for px in x0..=x1 {
                let dx = px as f32 - cx;
                let dz = pz as f32 - cz;
                if dx * dx + dz * dz <= r * r {
                    img.put_pixel(px, pz, Rgb(color));
                }
            }
        }
    }

    for seg in world.edge_segments() {
        draw_line(
            &mut img,
            (to_px(seg.from_point.x), to_px(seg.from_point.z)),
            (to_px(seg.to_point.x), to_px(seg.to_point.z)),
            RAIL_COLOR,
        );
    }

    img
}

fn draw_line(img: &mut RgbImage, from: (f32, f32), to: (f32, f32), color: [u8; 3]) {
    let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs()).ceil().max(1.0) as u32;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = from.0 + (to.0 - from.0) * t;
        let y = from.1 + (to.1 - from.1) * t;
        if x >= 0.0 && y >= 0.0 && (x as u32) < img.width() && (y as u32) < img.height() {
            img.put_pixel(x as u32, y as u32, Rgb(color));
        }
    }
}

pub fn export_world_map_png(world: &World, size: u32, path: impl AsRef<Path>) -> Result<(), ExportError> {
    render_world_map(world, size).save(path)?;
    Ok(())
}

pub fn export_world_summary_json(summary: &WorldSummary, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(path, json).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Spectral colormap (matplotlib style): dark blue -> cyan -> green -> yellow -> orange -> red
fn spectral_colormap(t: f32) -> [u8; 3] {
    let colors: [[f32; 3]; 11] = [
        [0.37, 0.31, 0.64],
        [0.20, 0.53, 0.74],
        [0.40, 0.76, 0.65],
        [0.67, 0.87, 0.64],
        [0.90, 0.96, 0.60],
        [1.00, 1.00, 0.75],
        [1.00, 0.88, 0.55],
        [0.99, 0.68, 0.38],
        [0.96, 0.43, 0.26],
        [0.84, 0.24, 0.31],
        [0.62, 0.00, 0.26],
    ];

    let t_scaled = t * 10.0;
    let idx = (t_scaled as usize).min(9);
    let frac = t_scaled - idx as f32;

    let c1 = colors[idx];
    let c2 = colors[idx + 1];

    [
        ((c1[0] + (c2[0] - c1[0]) * frac) * 255.0) as u8,
        ((c1[1] + (c2[1] - c1[1]) * frac) * 255.0) as u8,
        ((c1[2] + (c2[2] - c1[2]) * frac) * 255.0) as u8,
    ]
}
