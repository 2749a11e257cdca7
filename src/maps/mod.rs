//! Per-map marker compilation: `mapinfo.txt`, `.poi` and `.trail` files.

mod files;
mod xml;

use std::collections::BTreeMap;
use std::path::Path;

use waymark_common::kv;

use crate::categories::Category;

pub use files::{read_pois, read_trails};
pub use xml::save;

pub const MAP_INFO_FILE: &str = "mapinfo.txt";
pub const POI_EXTENSION: &str = ".poi";
pub const TRAIL_EXTENSION: &str = ".trail";

#[derive(Debug, Clone)]
pub struct PoiEntry {
    pub category: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Passthrough attributes for the overlay XML.
    pub keys: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct TrailEntry {
    pub category: String,
    pub trail_data: String,
    pub keys: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct Map {
    pub id: u32,
    pub name: String,
    pub pois: Vec<PoiEntry>,
    pub trails: Vec<TrailEntry>,
}

/// Compile every map directory under `maps_dir`.
///
/// A map that fails (missing id, malformed marker file) is dropped with a
/// log line; the rest of the pack continues.
pub fn compile(categories: &[Category], maps_dir: &Path, pack_root: &Path) -> (Vec<Map>, Vec<String>) {
    let mut out = Vec::new();
    let mut warns = Vec::new();

    let Ok(entries) = std::fs::read_dir(maps_dir) else {
        log::warn!("no maps directory at {}", maps_dir.display());
        return (out, warns);
    };
    let mut dirs: Vec<_> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();

    for dir in dirs {
        match compile_map(categories, &dir, pack_root) {
            Ok((map, map_warns)) => {
                warns.extend(map_warns);
                out.push(map);
            }
            Err(err) => {
                log::error!("failed to load map {}: {err:#}", dir.display());
            }
        }
    }
    (out, warns)
}

fn compile_map(
    categories: &[Category],
    dir: &Path,
    pack_root: &Path,
) -> anyhow::Result<(Map, Vec<String>)> {
    let (id, name) = read_map_info(dir)?;
    let mut map = Map {
        id,
        name,
        pois: Vec::new(),
        trails: Vec::new(),
    };
    let mut warns = Vec::new();

    for file in waymark_common::fs::files_by_extension(dir, &[POI_EXTENSION, TRAIL_EXTENSION]) {
        let name = file.to_string_lossy();
        if name.ends_with(POI_EXTENSION) {
            let (pois, new_warns) = read_pois(categories, &file)?;
            map.pois.extend(pois);
            warns.extend(new_warns);
        } else {
            let (trails, new_warns) = read_trails(categories, &file, pack_root)?;
            map.trails.extend(trails);
            warns.extend(new_warns);
        }
    }
    Ok((map, warns))
}

/// Read the map's id and name. The id is required: without it no markers can
/// be attached to the map at all.
pub fn read_map_info(dir: &Path) -> anyhow::Result<(u32, String)> {
    let path = dir.join(MAP_INFO_FILE);
    let text = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;

    let mut id: Option<u32> = None;
    let mut name: Option<String> = None;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            log::warn!("[{}] invalid line: {line}, skipping", path.display());
            continue;
        };
        if key.eq_ignore_ascii_case("id") {
            let value = kv::trim(value);
            id = Some(
                value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("[{}] invalid map id: {value}", path.display()))?,
            );
        } else if key.eq_ignore_ascii_case("name") {
            name = Some(kv::trim(value).to_string());
        }
    }

    let id = id.ok_or_else(|| anyhow::anyhow!("map id not defined"))?;
    let name = name.unwrap_or_else(|| {
        log::info!("map {} name not defined, defaulting", path.display());
        id.to_string()
    });
    Ok((id, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_map_info() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MAP_INFO_FILE), "id=15\nname=\"Verdant Brink\"\n")
            .unwrap();
        let (id, name) = read_map_info(dir.path()).unwrap();
        assert_eq!(id, 15);
        assert_eq!(name, "Verdant Brink");
    }

    #[test]
    fn test_map_info_defaults_name_to_id() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MAP_INFO_FILE), "id=7\n").unwrap();
        let (id, name) = read_map_info(dir.path()).unwrap();
        assert_eq!(id, 7);
        assert_eq!(name, "7");
    }

    #[test]
    fn test_map_info_requires_id() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MAP_INFO_FILE), "name=x\n").unwrap();
        assert!(read_map_info(dir.path()).is_err());
    }

    #[test]
    fn test_compile_drops_broken_map_keeps_rest() {
        let dir = tempfile::tempdir().unwrap();
        let maps = dir.path().join("maps");
        std::fs::create_dir_all(maps.join("good")).unwrap();
        std::fs::create_dir_all(maps.join("broken")).unwrap();
        std::fs::write(maps.join("good").join(MAP_INFO_FILE), "id=1\n").unwrap();
        std::fs::write(maps.join("broken").join(MAP_INFO_FILE), "name=x\n").unwrap();

        let (compiled, _) = compile(&[], &maps, dir.path());
        assert_eq!(compiled.len(), 1);
        assert_eq!(compiled[0].id, 1);
    }
}
