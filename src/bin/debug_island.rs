//! Debug tool for a single island
//! Prints heightfield and mesh statistics and dumps PNGs of the surface and ocean mask

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use skyrail::export::{export_heightfield_png, export_ocean_mask_png};
use skyrail::island::{build_island_mesh, generate_island, IslandParams, IslandSurface};

#[derive(Parser, Debug)]
#[command(name = "debug_island")]
struct Args {
    #[arg(short, long, default_value = "4121132")]
    seed: i32,

    /// Grid resolution
    #[arg(short = 'n', long, default_value = "160")]
    resolution: usize,

    #[arg(long, default_value = "32.0")]
    xy_scale: f32,

    #[arg(long, default_value = "10.0")]
    z_scale: f32,

    #[arg(long, default_value = "0.58")]
    mountain_amp: f32,

    #[arg(long, default_value = "0.07")]
    cliff_amp: f32,

    /// Output directory for PNGs
    #[arg(short, long, default_value = ".")]
    out: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let params = IslandParams {
        seed: args.seed,
        n: args.resolution,
        xy_scale: args.xy_scale,
        z_scale: args.z_scale,
        mountain_amp: args.mountain_amp,
        cliff_amp: args.cliff_amp,
        ..IslandParams::default()
    };

    println!("Generating island with seed {} at {}x{}...", params.seed, params.n, params.n);
    let data = generate_island(&params);
    let land = data.land_cell_count();
    let cells = data.n * data.n;
    println!("Land cells: {} ({:.1}%)", land, 100.0 * land as f64 / cells as f64);

    let (top_lo, top_hi) = data.top.min_max().unwrap_or((0.0, 0.0));
    let (bottom_lo, bottom_hi) = data.bottom.min_max().unwrap_or((0.0, 0.0));
    println!("Top range: {:.3} to {:.3}", top_lo, top_hi);
    println!("Bottom range: {:.3} to {:.3}", bottom_lo, bottom_hi);

    let mesh = build_island_mesh(&data);
    println!(
        "Mesh: {} vertices, {} triangles, {} skirt quads, radius {:.2}",
        mesh.vertices.len(),
        mesh.triangle_count(),
        mesh.skirt_quads,
        mesh.approx_radius
    );
    if let Some(peak) = mesh.top_point() {
        println!("Peak at ({:.2}, {:.2}, {:.2})", peak.x, peak.y, peak.z);
    }

    let surface = IslandSurface::from_heightfield(&data);
    println!("Surface height at centre: {:.2}", surface.height_at(0.0, 0.0));

    let heightfield_path = args.out.join(format!("island_{}_top.png", params.seed));
    let mask_path = args.out.join(format!("island_{}_ocean.png", params.seed));
    export_heightfield_png(&data, &heightfield_path)?;
    export_ocean_mask_png(&data, &mask_path)?;
    println!("Saved {} and {}", heightfield_path.display(), mask_path.display());

    Ok(())
}
