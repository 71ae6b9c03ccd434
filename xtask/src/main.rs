use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tileslicer_tileset::ManifestWriter;

const DEMO_SCENE: &str = "demos/harbour.yaml";
const DEMO_CONFIG: &str = "demos/harbour-export.yaml";
const DEMO_OUT: &str = "target/demo-tileset";

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for tileslicer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, tests, smoke export
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Run the membership benchmark
    Bench,
    /// Build rustdoc for the workspace
    Doc,
    /// Export the demo scene twice and compare the manifests
    Smoke,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            run_fmt()?;
            run_clippy()?;
            run_tests()?;
            run_smoke()?;
        }
        Commands::Fmt => run_fmt()?,
        Commands::Clippy => run_clippy()?,
        Commands::Test => run_tests()?,
        Commands::Bench => run_bench()?,
        Commands::Doc => run_doc()?,
        Commands::Smoke => run_smoke()?,
    }

    Ok(())
}

fn cargo(step: &str, args: &[&str]) -> Result<()> {
    println!("==> Running cargo {}", args.join(" "));
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("{step} failed");
    }
    Ok(())
}

fn run_fmt() -> Result<()> {
    cargo("cargo fmt check", &["fmt", "--all", "--", "--check"])
}

fn run_clippy() -> Result<()> {
    cargo(
        "cargo clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )
}

fn run_tests() -> Result<()> {
    cargo("cargo test", &["test", "--workspace"])
}

fn run_bench() -> Result<()> {
    cargo(
        "membership bench",
        &["bench", "-p", "tileslicer-grid", "--bench", "bench_membership"],
    )
}

fn run_doc() -> Result<()> {
    cargo("cargo doc", &["doc", "--workspace", "--no-deps"])
}

/// Export the demo scene twice; the manifests must match byte for byte and
/// every `src` must point at a written tile.
fn run_smoke() -> Result<()> {
    let first = export_demo()?;
    let second = export_demo()?;
    if first != second {
        anyhow::bail!("demo export is not reproducible");
    }

    let manifest = ManifestWriter::read(Path::new(DEMO_OUT).join("tileset.json"))?;
    let mut tiles = 0;
    for name in manifest.tiles.iter().filter_map(|t| t.src.as_deref()) {
        let path = Path::new(DEMO_OUT).join(format!("{name}.obj"));
        if !path.is_file() {
            anyhow::bail!("manifest names {name} but {} is missing", path.display());
        }
        tiles += 1;
    }
    if tiles == 0 {
        anyhow::bail!("demo export wrote no tiles");
    }
    println!("==> Smoke export OK: {tiles} tiles");
    Ok(())
}

fn export_demo() -> Result<Vec<u8>> {
    if Path::new(DEMO_OUT).exists() {
        std::fs::remove_dir_all(DEMO_OUT)?;
    }
    cargo(
        "demo export",
        &[
            "run",
            "-q",
            "-p",
            "tileslicer-cli",
            "--",
            "export",
            "--scene",
            DEMO_SCENE,
            "--config",
            DEMO_CONFIG,
        ],
    )?;
    let manifest = Path::new(DEMO_OUT).join("tileset.json");
    std::fs::read(&manifest).with_context(|| format!("reading {}", manifest.display()))
}
