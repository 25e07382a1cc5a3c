//! Chisel CLI - mesh analysis and editing from the command line.
//!
//! Usage: chisel <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `chisel --help` for available commands. Set `RUST_LOG=info` for
//! per-step logging.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};

use chisel::algo::curvature::SharpPointOptions;
use chisel::algo::holes::{self, HoleFillOptions};
use chisel::algo::{smooth, Progress};
use chisel::analysis::{AnalyzerOptions, FeatureAnalyzer};
use chisel::editor::{CutDirection, CutPlane, CutSpec, EditOperation, MeshEditor, StepOutcome};
use chisel::mesh::Axis;

#[derive(Parser)]
#[command(name = "chisel")]
#[command(author, version, about = "Mesh analysis and editing CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh statistics
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Run the full feature analysis and print it as JSON
    Analyze {
        /// Input mesh file
        input: PathBuf,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of top and bottom points to report
        #[arg(short = 'n', long, default_value = "5")]
        top_n: usize,

        /// Maximum number of sharp points considered
        #[arg(short, long, default_value = "20")]
        max_points: usize,

        /// Minimum normal variation for a sharp point
        #[arg(short, long, default_value = "0.7")]
        threshold: f64,

        /// Axis along which top and bottom are measured
        #[arg(short, long, default_value = "y")]
        up_axis: Axis,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Print counts, volume, area and bounds as JSON
    Stats {
        /// Input mesh file
        input: PathBuf,
    },

    /// Export renderer geometry (vertices, faces, normals) as JSON
    View {
        /// Input mesh file
        input: PathBuf,

        /// Write the data here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rotate a mesh about X, then Y, then Z
    Rotate {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Rotation about X in degrees
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        x: f64,

        /// Rotation about Y in degrees
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        y: f64,

        /// Rotation about Z in degrees
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        z: f64,
    },

    /// Cut a mesh by a plane and cap the opening
    Cut {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Reference plane (xy, xz, yz; anything else cuts through the centroid)
        #[arg(short, long, default_value = "xy")]
        plane: String,

        /// Plane offset as a percentage of the bounding box (50 = centroid)
        #[arg(long, default_value = "50", allow_negative_numbers = true)]
        position: f64,

        /// Side to keep (above or below)
        #[arg(short, long, default_value = "above")]
        direction: String,

        /// Tilt about X in degrees
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        tilt_x: f64,

        /// Tilt about Y in degrees
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        tilt_y: f64,
    },

    /// Smooth a mesh
    Smooth {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Number of iterations
        #[arg(short, long, default_value = "5")]
        iterations: usize,

        /// Smoothing factor (0.0 to 1.0)
        #[arg(short, long, default_value = "0.5")]
        lambda: f64,

        /// Allow boundary vertices to move
        #[arg(long)]
        move_boundary: bool,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Close open boundary loops
    FillHoles {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Skip holes with more boundary edges than this
        #[arg(short, long, default_value = "100")]
        max_edges: usize,
    },

    /// Apply a JSON list of operations, exporting after each step
    Apply {
        /// Input mesh file
        input: PathBuf,

        /// JSON file holding an array of operations
        operations: PathBuf,

        /// Final output mesh file
        output: PathBuf,
    },
}

fn main() {
    env_logger::init();
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

        Commands::Analyze {
            input,
            output,
            top_n,
            max_points,
            threshold,
            up_axis,
            sequential,
        } => {
            let sharp = SharpPointOptions::default()
                .with_max_points(max_points)
                .with_threshold(threshold)
                .with_parallel(!sequential);
            let options = AnalyzerOptions::default()
                .with_extremal_count(top_n)
                .with_up_axis(up_axis)
                .with_sharp_points(sharp);
            cmd_analyze(&input, output.as_deref(), options)?;
        }

        Commands::Stats { input } => {
            let analyzer = FeatureAnalyzer::open(&input)?;
            println!("{}", serde_json::to_string_pretty(&analyzer.summary())?);
        }

        Commands::View { input, output } => {
            let analyzer = FeatureAnalyzer::open(&input)?;
            let json = serde_json::to_string(&analyzer.visualization_data())?;
            write_json(&json, output.as_deref())?;
        }

        Commands::Rotate {
            input,
            output,
            x,
            y,
            z,
        } => {
            let op = EditOperation::Rotate {
                x_angle: x,
                y_angle: y,
                z_angle: z,
            };
            cmd_edit(&input, &output, &op)?;
        }

        Commands::Cut {
            input,
            output,
            plane,
            position,
            direction,
            tilt_x,
            tilt_y,
        } => {
            let spec = CutSpec::new(CutPlane::from_name(&plane))
                .at(position)
                .keep(CutDirection::from_name(&direction))
                .tilted(tilt_x, tilt_y);
            cmd_edit(&input, &output, &EditOperation::Cut(spec))?;
        }

        Commands::Smooth {
            input,
            output,
            iterations,
            lambda,
            move_boundary,
            sequential,
        } => {
            cmd_smooth(&input, &output, iterations, lambda, move_boundary, sequential)?;
        }

        Commands::FillHoles {
            input,
            output,
            max_edges,
        } => {
            cmd_fill_holes(&input, &output, max_edges)?;
        }

        Commands::Apply {
            input,
            operations,
            output,
        } => {
            cmd_apply(&input, &operations, &output)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Parallel workers report out of order; only ever move forward.
        let previous = max_percent.fetch_max(raw_percent, Ordering::Relaxed);
        if raw_percent <= previous && raw_percent != 100 {
            return;
        }
        let percent = raw_percent.max(previous);

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

fn write_json(json: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            fs::write(path, json)?;
            eprintln!("Wrote: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let analyzer = FeatureAnalyzer::open(input)?;
    let stats = analyzer.summary();

    println!("File: {}", input.display());
    println!("Vertices: {}", stats.vertices_count);
    println!("Faces: {}", stats.faces_count);
    println!("Surface area: {:.6}", stats.surface_area);
    match stats.volume {
        Some(volume) => println!("Volume: {:.6}", volume),
        None => println!("Volume: n/a (mesh is open)"),
    }

    let [min, max] = stats.bounds;
    println!(
        "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
        min[0], min[1], min[2], max[0], max[1], max[2]
    );
    println!(
        "Dimensions: {:.3} x {:.3} x {:.3}",
        max[0] - min[0],
        max[1] - min[1],
        max[2] - min[2]
    );

    let loops = holes::find_holes(analyzer.mesh());
    if loops.is_empty() {
        println!("Topology: Closed ({})", analyzer.topology_status());
    } else {
        println!("Topology: Open ({} boundary loops, {})", loops.len(), analyzer.topology_status());
    }

    Ok(())
}

fn cmd_analyze(
    input: &Path,
    output: Option<&Path>,
    options: AnalyzerOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let analyzer = FeatureAnalyzer::open(input)?.with_options(options);

    let start = Instant::now();
    let report = analyzer.analyze();
    let elapsed = start.elapsed();

    let json = serde_json::to_string_pretty(&report)?;
    write_json(&json, output)?;
    eprintln!(
        "Analyzed {} vertices, {} faces ({:.2?})",
        report.vertices_count, report.faces_count, elapsed
    );

    Ok(())
}

fn cmd_edit(input: &Path, output: &Path, op: &EditOperation) -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = MeshEditor::open(input)?;
    println!(
        "Loaded: {} vertices, {} faces",
        editor.mesh().num_vertices(),
        editor.mesh().num_faces()
    );

    let start = Instant::now();
    editor.run(op)?;
    let elapsed = start.elapsed();

    let stats = editor.stats();
    println!("Result: {} vertices, {} faces", stats.vertices_count, stats.faces_count);
    editor.export(Some(output))?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}

fn cmd_smooth(
    input: &Path,
    output: &Path,
    iterations: usize,
    lambda: f64,
    move_boundary: bool,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = MeshEditor::open(input)?;

    println!(
        "Loaded: {} vertices, {} faces",
        editor.mesh().num_vertices(),
        editor.mesh().num_faces()
    );

    let mut options = smooth::SmoothOptions::default()
        .with_iterations(iterations)
        .with_lambda(lambda)
        .with_parallel(!sequential);
    if move_boundary {
        options = options.allow_boundary_movement();
    }

    let mode = if sequential { "sequential" } else { "parallel" };
    let progress = create_progress();

    println!(
        "Applying Laplacian smoothing ({} iterations, lambda={}, {})...",
        iterations, options.lambda, mode
    );
    let start = Instant::now();
    editor.smooth_with_progress(&options, &progress)?;
    let elapsed = start.elapsed();

    editor.export(Some(output))?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}

fn cmd_fill_holes(input: &Path, output: &Path, max_edges: usize) -> Result<(), Box<dyn std::error::Error>> {
    let mut editor = MeshEditor::open(input)?;

    let start = Instant::now();
    let filled = editor.fill_holes_with(&HoleFillOptions::default().with_max_hole_edges(max_edges))?;
    let elapsed = start.elapsed();

    let stats = editor.stats();
    println!(
        "Filled {} holes; watertight: {}",
        filled,
        if stats.is_watertight { "yes" } else { "no" }
    );
    editor.export(Some(output))?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}

fn cmd_apply(input: &Path, operations: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let ops = EditOperation::parse_list(&fs::read_to_string(operations)?)?;
    let mut editor = MeshEditor::open(input)?;

    // Per-step exports are removed with the directory once the run ends.
    let scratch = tempfile::tempdir()?;
    let outcomes = run_pipeline(&mut editor, &ops, scratch.path());
    let failures = outcomes.iter().filter(|o| !o.success).count();
    for outcome in &outcomes {
        println!("{}", serde_json::to_string(outcome)?);
    }

    editor.export(Some(output))?;
    println!("{}", serde_json::to_string(&editor.stats())?);
    eprintln!("Saved: {} ({} of {} steps failed)", output.display(), failures, ops.len());

    Ok(())
}

/// Apply each operation in turn, exporting step `i` to `scratch/step-{i}.stl`.
fn run_pipeline(editor: &mut MeshEditor, ops: &[EditOperation], scratch: &Path) -> Vec<StepOutcome> {
    ops.iter()
        .enumerate()
        .map(|(i, op)| editor.apply(op, Some(&scratch.join(format!("step-{}.stl", i)))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chisel::mesh::TriMesh;
    use nalgebra::Point3;

    fn tetrahedron() -> MeshEditor {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        MeshEditor::new(TriMesh::from_triangles(vertices, faces).unwrap()).unwrap()
    }

    #[test]
    fn test_pipeline_exports_into_scratch_dir() {
        let scratch = tempfile::tempdir().unwrap();
        let ops = EditOperation::parse_list(
            r#"[
                {"operation": "rotate", "z_angle": 45},
                {"operation": "drill"},
                {"operation": "cut"}
            ]"#,
        )
        .unwrap();

        let mut editor = tetrahedron();
        let outcomes = run_pipeline(&mut editor, &ops, scratch.path());

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].success);
        assert!(!outcomes[1].success);
        assert!(outcomes[2].success);
        for outcome in outcomes.iter().filter(|o| o.success) {
            let path = outcome.output.as_deref().unwrap();
            assert!(path.starts_with(scratch.path()));
            assert!(path.exists());
        }
        assert!(!scratch.path().join("step-1.stl").exists());

        let dir = scratch.path().to_path_buf();
        drop(scratch);
        assert!(!dir.exists());
    }
}
