//! Triplanar CLI - planar UV projection command-line tool.
//!
//! Usage: triplanar <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `triplanar --help` for available commands.

mod stall;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use nalgebra::{Matrix4, Vector3};

use triplanar::algo::parameterize::{reset_uvs_with_progress, PlanarOptions, UVMap};
use triplanar::algo::Progress;
use triplanar::geometry::Geometry;
use triplanar::io::{self, obj, task::LoadTask, Format};

use stall::StallScene;

#[derive(Parser)]
#[command(name = "triplanar")]
#[command(author, version, about = "Planar UV projection CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display geometry information
    Info {
        /// Input geometry file
        input: PathBuf,
    },

    /// Reproject the UVs of every geometry in a file
    Project {
        /// Input geometry file (.obj, .gltf, .glb)
        input: PathBuf,

        /// Output OBJ file
        output: PathBuf,

        /// Compute normals for geometries that have none
        #[arg(long)]
        compute_normals: bool,

        /// Write an MTL file using this texture path
        #[arg(short, long)]
        texture: Option<String>,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Build the bathroom stall scene and export it
    Stall {
        /// Output OBJ file
        output: PathBuf,

        /// Write an MTL file using this texture path
        #[arg(short, long)]
        texture: Option<String>,

        /// Toilet model (.glb) to place in the stall
        #[arg(long)]
        toilet: Option<PathBuf>,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Project {
            input,
            output,
            compute_normals,
            texture,
            sequential,
        } => {
            cmd_project(&input, &output, compute_normals, texture.as_deref(), sequential)?;
        }

        Commands::Stall {
            output,
            texture,
            toilet,
            sequential,
        } => {
            cmd_stall(&output, texture.as_deref(), toilet.as_deref(), sequential)?;
        }
    }

    Ok(())
}

/// Create a progress callback that displays a progress bar.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0)); // Track highest percent seen (monotonic)

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Only move forward, even if several stages report into one bar
        let (percent, increased) = loop {
            let old_max = max_percent.load(Ordering::Relaxed);
            let new_max = old_max.max(raw_percent);
            if new_max == old_max {
                break (old_max, false);
            }
            match max_percent.compare_exchange_weak(
                old_max,
                new_max,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break (new_max, true),
                Err(_) => continue,
            }
        };

        if !increased && percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        eprint!("\r[{}{}] {:3}% {}", bar, space, percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

/// Load a file on a background thread, drawing a progress bar while it reads.
fn load_with_progress(path: &Path) -> Result<Vec<Geometry>, Box<dyn std::error::Error>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .thread_name(|_| "triplanar-loader".to_string())
        .build()?;

    let progress = create_progress();
    let message = format!("Loading {}", path.display());
    let handle = LoadTask::new(path).spawn(&pool);
    let geometries = handle.wait(|loaded, total| progress.report(loaded, total, &message))?;
    Ok(geometries)
}

/// Save as OBJ, with a material library next to it when a texture is given.
fn save_output(
    geometries: &[Geometry],
    output: &Path,
    texture: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(texture) = texture else {
        io::save(geometries, output)?;
        return Ok(());
    };

    if Format::require(output)? != Format::Obj {
        return Err(format!("--texture needs an .obj output, got {}", output.display()).into());
    }
    let mtl_path = output.with_extension("mtl");
    let mtl_name = mtl_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or("output path has no file name")?;

    obj::save_with_mtl(geometries, output, mtl_name)?;
    obj::write_mtl(&mtl_path, texture)?;
    println!("Material: {}", mtl_path.display());
    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let geometries = io::load(input)?;

    println!("File: {}", input.display());
    println!("Geometries: {}", geometries.len());

    for (i, geometry) in geometries.iter().enumerate() {
        println!();
        println!("[{}] {}", i, geometry.name().unwrap_or("(unnamed)"));
        println!("  Vertices: {}", geometry.vertex_count());
        println!("  Triangles: {}", geometry.triangle_count());

        let mut attributes = vec!["position"];
        if geometry.normal().is_some() {
            attributes.push("normal");
        }
        if geometry.uv().is_some() {
            attributes.push("uv");
        }
        println!("  Attributes: {}", attributes.join(", "));
        println!("  Indexed: {}", if geometry.is_indexed() { "yes" } else { "no" });

        if let Some((min, max)) = geometry.bounding_box() {
            println!(
                "  Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
                min.x, min.y, min.z, max.x, max.y, max.z
            );
            let diag = max - min;
            println!("  Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);
        }

        if let Some(uv) = geometry.uv() {
            let uvs = UVMap::from_attribute(uv)?;
            if let Some((min, max)) = uvs.bounding_box() {
                println!(
                    "  UV bounds: ({:.3}, {:.3}) to ({:.3}, {:.3})",
                    min.x, min.y, max.x, max.y
                );
            }
            println!("  UV area: {:.6}", uvs.total_area(&geometry.triangles()));
        }
    }

    Ok(())
}

fn cmd_project(
    input: &Path,
    output: &Path,
    compute_normals: bool,
    texture: Option<&str>,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut geometries = load_with_progress(input)?;

    let vertices: usize = geometries.iter().map(Geometry::vertex_count).sum();
    println!("Loaded: {} geometries, {} vertices", geometries.len(), vertices);

    if compute_normals {
        for geometry in geometries.iter_mut().filter(|g| g.normal().is_none()) {
            log::info!(
                "computing normals for {}",
                geometry.name().unwrap_or("(unnamed)")
            );
            geometry.compute_vertex_normals();
        }
    }

    let options = PlanarOptions::default().with_parallel(!sequential);
    let mode = if sequential { "sequential" } else { "parallel" };
    println!("Projecting UVs ({})...", mode);

    // Each geometry reports into its own slice of one bar.
    let bar = Arc::new(create_progress());
    let count = geometries.len();

    let start = Instant::now();
    for (i, geometry) in geometries.iter_mut().enumerate() {
        geometry.ensure_uv();
        let bar = Arc::clone(&bar);
        let stage = Progress::new(move |current, total, message| {
            bar.report_sub(current, total, i, count, message);
        });
        reset_uvs_with_progress(geometry, &options, &stage)?;
    }
    let elapsed = start.elapsed();

    save_output(&geometries, output, texture)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}

fn cmd_stall(
    output: &Path,
    texture: Option<&str>,
    toilet: Option<&Path>,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut scene = StallScene::build()?;

    if let Some(toilet) = toilet {
        let geometries = load_with_progress(toilet)?;
        let placement =
            Matrix4::new_translation(&Vector3::new(1.35, -1.0, 0.0)) * Matrix4::new_scaling(10.0);
        scene.add_fixture("toilet", geometries, placement);
    }
    println!("Scene: {} parts", scene.parts().len());

    let options = PlanarOptions::default().with_parallel(!sequential);
    let progress = create_progress();

    let start = Instant::now();
    scene.reproject(&options, &progress)?;
    let geometries = scene.bake()?;
    let elapsed = start.elapsed();

    let vertices: usize = geometries.iter().map(Geometry::vertex_count).sum();
    let triangles: usize = geometries.iter().map(Geometry::triangle_count).sum();
    println!("Baked: {} vertices, {} triangles", vertices, triangles);

    save_output(&geometries, output, texture)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}
