//! Map server binary — loads an octree map file and serves it cached.
//!
//! Usage: octoserve <map.bt> [OPTIONS]
//!
//! Options:
//!   --config <FILE>   JSON configuration file
//!   --export <DIR>    Write the cached outputs to <DIR>:
//!                     map_snapshot.bin (compressed binary snapshot)
//!                     visualization.json (per-level cube lists)

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use octoserve::config::ServerConfig;
use octoserve::core::{Result, logging};
use octoserve::server::MapServer;

const USAGE: &str = "\
USAGE: octoserve <map.bt> [--config <file>] [--export <dir>]
  map.bt: octree 3D map file to read";

fn main() -> ExitCode {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let Some(map_path) = positional_arg(&args) else {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    };
    let config_path = parse_path_arg(&args, "--config");
    let export_dir = parse_path_arg(&args, "--export");

    match run(&map_path, config_path.as_deref(), export_dir.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("map server error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(map_path: &Path, config_path: Option<&Path>, export_dir: Option<&Path>) -> Result<()> {
    let config = match config_path {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    let server = MapServer::load(map_path, config)?;

    println!("=== Octoserve ===");
    println!("Map:      {}", map_path.display());
    println!("Frame:    {}", server.config().frame_id);
    println!("Nodes:    {}", server.node_count());
    println!("Occupied: {} voxels visualized", server.occupied_count());
    println!("Snapshot: {} bytes", server.snapshot().len());

    if let Some(dir) = export_dir {
        export(&server, dir)?;
    }

    Ok(())
}

fn export(server: &MapServer, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    let snapshot_path = dir.join("map_snapshot.bin");
    std::fs::write(&snapshot_path, server.snapshot().bytes())?;

    let viz_path = dir.join("visualization.json");
    let json = serde_json::to_string_pretty(server.visualization().as_ref())?;
    std::fs::write(&viz_path, json)?;

    log::info!("cached outputs exported to {}", dir.display());
    Ok(())
}

/// First argument that is not an option or an option's value.
fn positional_arg(args: &[String]) -> Option<PathBuf> {
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            iter.next();
        } else {
            return Some(PathBuf::from(arg));
        }
    }
    None
}

fn parse_path_arg(args: &[String], name: &str) -> Option<PathBuf> {
    args.iter()
        .position(|arg| arg == name)
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}
