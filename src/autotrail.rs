//! Auto-trail generation: `.atrl` sources routed through the trail builder.
//!
//! An `.atrl` file looks like an `.rtrl` (map id line, then POI lines) but
//! instead of being drawn verbatim its points are routed: the map directory
//! matching the id supplies barriers, shortcut paths, waypoints and optional
//! regions, and the optimizer produces the visiting order.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use waymark_common::fs::files_by_extension;
use waymark_geometry::Region;
use waymark_io::{
    points_to_trl_bytes, swap_extension, ASSETS_DIR, COMPILED_ASSETS_DIR, TRL_EXTENSION,
};
use waymark_routing::{build_trail, partition_points, World};

use crate::maps::read_map_info;
use crate::markers;

pub const ATRL_EXTENSION: &str = ".atrl";

pub const BARRIERS_FILE: &str = "barriers.txt";
pub const PATHS_FILE: &str = "paths.txt";
pub const WAYPOINTS_FILE: &str = "waypoints.txt";
pub const EDGES_FILE: &str = "edges.txt";
pub const REGIONS_FILE: &str = "regions.json";

/// Compile every `.atrl` under `compiled_assets/` into routed `.trl` assets.
///
/// A failing trail (duplicate POIs, missing map, unassignable point) drops
/// that trail only; the rest of the pack continues.
pub fn compile_auto_trails(pack_root: &Path) {
    let src_root = pack_root.join(COMPILED_ASSETS_DIR);
    for src in files_by_extension(&src_root, &[ATRL_EXTENSION]) {
        if let Err(err) = compile_one(pack_root, &src_root, &src) {
            log::error!("auto trail {} dropped: {err:#}", src.display());
        }
    }
}

fn compile_one(pack_root: &Path, src_root: &Path, src: &Path) -> Result<()> {
    let text = std::fs::read_to_string(src)
        .with_context(|| format!("reading {}", src.display()))?;
    let map_id: u32 = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| anyhow!("invalid file, no mapid"))?
        .parse()
        .context("invalid mapid")?;
    // The id line carries no position and falls out of the point parse.
    let pois = markers::parse_points(&text, &src.display().to_string());
    if pois.is_empty() {
        return Err(anyhow!("no points to route"));
    }

    let map_dir = find_map_dir(&pack_root.join("maps"), map_id)?;
    let world = load_world(&map_dir);
    let regions = load_regions(&map_dir)?;

    let relative = src
        .strip_prefix(src_root)
        .expect("walked file is under its root");
    let dst = pack_root
        .join(ASSETS_DIR)
        .join(swap_extension(relative, ATRL_EXTENSION, TRL_EXTENSION));
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if regions.is_empty() {
        let trail = build_trail(&world, &pois, None)?;
        std::fs::write(&dst, points_to_trl_bytes(map_id, &trail))
            .with_context(|| format!("writing {}", dst.display()))?;
        log::info!("{}: {} points", dst.display(), trail.len());
        return Ok(());
    }

    let split = partition_points(&regions, &pois)?;
    let multiple = regions.len() > 1;
    for (index, (region, points)) in regions.iter().zip(&split).enumerate() {
        if points.is_empty() {
            log::warn!("region {index} of {} has no points, skipping", src.display());
            continue;
        }
        let mut region_world = world.clone();
        if let Some(start) = region.start {
            region_world.waypoints = vec![start];
        }
        let trail = build_trail(&region_world, points, region.end)?;
        let target = if multiple {
            indexed_name(&dst, index)
        } else {
            dst.clone()
        };
        std::fs::write(&target, points_to_trl_bytes(map_id, &trail))
            .with_context(|| format!("writing {}", target.display()))?;
        log::info!("{}: {} points", target.display(), trail.len());
    }
    Ok(())
}

/// Locate the map directory whose `mapinfo.txt` declares `map_id`.
fn find_map_dir(maps_dir: &Path, map_id: u32) -> Result<PathBuf> {
    let entries = std::fs::read_dir(maps_dir)
        .with_context(|| format!("reading {}", maps_dir.display()))?;
    let mut dirs: Vec<_> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();

    for dir in dirs {
        if let Ok((id, _)) = read_map_info(&dir) {
            if id == map_id {
                return Ok(dir);
            }
        }
    }
    Err(anyhow!("no map directory with id {map_id}"))
}

/// Assemble the build's world state from the map directory. Point-to-point
/// edge blocks join the shortcut path set.
fn load_world(map_dir: &Path) -> World {
    let mut world = World::new(
        markers::read_typed_groups(&map_dir.join(BARRIERS_FILE)),
        markers::read_typed_groups(&map_dir.join(PATHS_FILE)),
        markers::read_points(&map_dir.join(WAYPOINTS_FILE)),
    );
    world.add_paths(markers::read_edge_groups(&map_dir.join(EDGES_FILE)));
    world
}

fn load_regions(map_dir: &Path) -> Result<Vec<Region>> {
    let path = map_dir.join(REGIONS_FILE);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn indexed_name(dst: &Path, index: usize) -> PathBuf {
    let s = dst.to_string_lossy();
    match s.strip_suffix(TRL_EXTENSION) {
        Some(stem) => PathBuf::from(format!("{stem}_{index}{TRL_EXTENSION}")),
        None => dst.to_path_buf(),
    }
}
