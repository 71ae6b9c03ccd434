use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use glam::DVec3;
use tileslicer_export::{ExportError, ExportPlan, ExportScheduler, ExportSettings, FailurePolicy};
use tileslicer_scene::{ObjTileExporter, ObjectId, SceneGraph};
use tileslicer_tileset::{ManifestWriter, TileFormat, TileOriginMode};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tileslicer", about = "Slice a scene collection into a tileset")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Preview the tile grid and per-tile object counts without exporting
    Plan {
        #[command(flatten)]
        target: TargetArgs,
        /// List every tile, including empty ones
        #[arg(long)]
        all: bool,
    },
    /// Export every non-empty tile as OBJ and write the tileset manifest
    Export {
        #[command(flatten)]
        target: TargetArgs,
        /// Output directory for tiles and manifest
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Tile file name prefix
        #[arg(long)]
        prefix: Option<String>,
        /// Where tile geometry is placed relative to its local origin
        #[arg(long, value_enum)]
        origin: Option<OriginArg>,
        /// Convert tiles and manifest to Y-up
        #[arg(long)]
        swizzle: bool,
        /// Write the manifest without whitespace
        #[arg(long)]
        compact: bool,
        /// Log failed tiles and keep going instead of aborting
        #[arg(long)]
        skip_failures: bool,
        /// Tiles processed per scheduler tick
        #[arg(long)]
        tiles_per_tick: Option<usize>,
    },
    /// Swap the Y and Z axes of an existing manifest
    Swizzle {
        /// Manifest to read
        input: PathBuf,
        /// Destination, defaults to overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write the manifest without whitespace
        #[arg(long)]
        compact: bool,
    },
}

#[derive(Args)]
struct TargetArgs {
    /// Scene description (.yaml, .yml or .json)
    #[arg(short, long)]
    scene: PathBuf,
    /// Export settings file (.yaml, .yml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Collection to slice
    #[arg(long)]
    collection: Option<String>,
    /// Tile size as X Y Z
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"])]
    tile_size: Option<Vec<f64>>,
    /// Include objects whose name ends with the collider suffix
    #[arg(long)]
    keep_colliders: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OriginArg {
    Center,
    Min,
    Max,
}

impl From<OriginArg> for TileOriginMode {
    fn from(arg: OriginArg) -> Self {
        match arg {
            OriginArg::Center => TileOriginMode::Center,
            OriginArg::Min => TileOriginMode::TileMin,
            OriginArg::Max => TileOriginMode::TileMax,
        }
    }
}

impl TargetArgs {
    /// Settings from the config file (or defaults) with flag overrides applied.
    fn settings(&self) -> anyhow::Result<ExportSettings> {
        let mut settings = match &self.config {
            Some(path) => ExportSettings::load(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => ExportSettings::default(),
        };
        if let Some(collection) = &self.collection {
            settings.collection = Some(collection.clone());
        }
        if let Some(&[x, y, z]) = self.tile_size.as_deref() {
            settings.tile_dimensions = DVec3::new(x, y, z);
        }
        if self.keep_colliders {
            settings.skip_colliders = false;
        }
        Ok(settings)
    }

    fn load_scene(&self) -> anyhow::Result<SceneGraph> {
        SceneGraph::load(&self.scene)
            .with_context(|| format!("loading scene from {}", self.scene.display()))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("tileslicer v{}", env!("CARGO_PKG_VERSION"));
            println!("grid: {}", tileslicer_grid::crate_info());
            println!("tileset: {}", tileslicer_tileset::crate_info());
            println!("export: {}", tileslicer_export::crate_info());
            println!("scene: {}", tileslicer_scene::crate_info());
        }
        Commands::Plan { target, all } => {
            let scene = target.load_scene()?;
            let settings = target.settings()?;
            let plan = build_plan(&scene, &settings)?;
            let grid = &plan.grid;

            println!("Tileset: {} (collection {})", plan.name, plan.collection);
            println!("Objects: {}", plan.table.len());
            println!("Bounds: {} .. {}", plan.bounds.min, plan.bounds.max);
            println!("Centroid: {}", plan.bounds.centroid);
            println!(
                "Grid: {} x {} x {} tiles of {}, origin {}",
                grid.size.x, grid.size.y, grid.size.z, grid.tile_dimensions, grid.origin
            );

            let counts = plan.membership_counts();
            let occupied = counts.iter().filter(|(_, n)| *n > 0).count();
            println!("Occupied: {occupied} of {} tiles", counts.len());
            for (index, n) in counts {
                if all || n > 0 {
                    println!("  [{}, {}, {}] {n} object(s)", index.x, index.y, index.z);
                }
            }
        }
        Commands::Export {
            target,
            out,
            prefix,
            origin,
            swizzle,
            compact,
            skip_failures,
            tiles_per_tick,
        } => {
            let scene = target.load_scene()?;
            let mut settings = target.settings()?;
            if let Some(out) = out {
                settings.output_dir = out;
            }
            if let Some(prefix) = prefix {
                settings.output_prefix = prefix;
            }
            if let Some(origin) = origin {
                settings.origin_mode = origin.into();
            }
            if let Some(n) = tiles_per_tick {
                settings.tiles_per_tick = n;
            }
            settings.swizzle_yz |= swizzle;
            settings.compact_json |= compact;
            if skip_failures {
                settings.failure_policy = FailurePolicy::SkipAndContinue;
            }
            if settings.tile_format != TileFormat::Obj {
                tracing::warn!(
                    requested = ?settings.tile_format,
                    "only OBJ tiles can be written, switching tile format to OBJ"
                );
                settings.tile_format = TileFormat::Obj;
            }

            let plan = build_plan(&scene, &settings)?;
            let exporter = ObjTileExporter::new(&scene).y_up(settings.swizzle_yz);
            let mut scheduler = ExportScheduler::from_plan(plan, settings, exporter);
            let report = scheduler.run(|progress| tracing::debug!("{progress}"))?;

            println!("{}", report.summary());
            println!(
                "Skipped: {} empty, {} clipped away, {} failed",
                report.counts.skipped, report.counts.skipped_empty, report.counts.failed
            );
            println!(
                "Manifest: {} ({} bytes, sha256 {})",
                report.manifest.path.display(),
                report.manifest.bytes,
                report.manifest.sha256
            );
            println!(
                "Time: {:.2?} total, {:.2?} average per tile ({:.2?} over the last tiles), {:.2?} worst",
                report.elapsed,
                report.average_tile_time,
                report.recent_tile_time,
                report.worst_tile_time
            );
        }
        Commands::Swizzle {
            input,
            output,
            compact,
        } => {
            let manifest = ManifestWriter::read(&input)
                .with_context(|| format!("reading manifest {}", input.display()))?;
            let swizzled = manifest.swizzled();
            let output = output.unwrap_or(input);
            let written = ManifestWriter::new(compact).write(&swizzled, &output)?;
            println!(
                "Swizzled {}: axis_up_is_y={}, size {}",
                written.path.display(),
                swizzled.axis_up_is_y,
                swizzled.tileset_size
            );
        }
    }

    Ok(())
}

/// Plan the export, turning a missing target into a hint listing the candidates.
fn build_plan(
    scene: &SceneGraph,
    settings: &ExportSettings,
) -> anyhow::Result<ExportPlan<ObjectId>> {
    match ExportPlan::build(scene, settings) {
        Ok(plan) => Ok(plan),
        Err(ExportError::NoTargetSelected) => {
            let names: Vec<&str> = scene.collection_names().collect();
            anyhow::bail!(
                "no collection selected, pass --collection or set `collection` in the config (available: {})",
                names.join(", ")
            )
        }
        Err(e) => Err(e.into()),
    }
}
