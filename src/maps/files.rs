//! Readers for `.poi` and `.trail` marker files.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use waymark_common::kv;

use crate::categories::{reference_exists, Category};
use crate::maps::{PoiEntry, TrailEntry};

/// The category header of a marker file, when present.
///
/// Returns `(category, warning, consumed)`: `consumed` is false when the
/// first line is not a pair at all and should be parsed as marker data.
fn header_category(categories: &[Category], line: &str) -> (String, Option<String>, bool) {
    let Some((key, value)) = line.split_once('=') else {
        return (String::new(), None, false);
    };
    if !key.eq_ignore_ascii_case("category") {
        return (
            String::new(),
            Some(format!("invalid category pair: {line}")),
            true,
        );
    }
    let category = value.to_string();
    if reference_exists(categories, &category) {
        (category, None, true)
    } else {
        (category, Some("category not found".to_string()), true)
    }
}

fn split_header<'a>(
    categories: &[Category],
    path: &Path,
    text: &'a str,
    warns: &mut Vec<String>,
) -> (String, Vec<&'a str>) {
    let mut lines: Vec<&str> = text.lines().collect();
    let first = lines.first().map(|l| l.trim()).unwrap_or_default();
    let (category, warning, consumed) = header_category(categories, first);
    if consumed {
        lines.remove(0);
    } else {
        log::warn!("[{}] category not set", path.display());
    }
    if let Some(warning) = warning {
        warns.push(format!("[{}]: {warning}", path.display()));
    }
    (category, lines)
}

/// Passthrough keys: everything on the line except the fields given their own
/// columns in the XML.
fn extra_keys(map: &BTreeMap<String, String>, consumed: &[&str]) -> BTreeMap<String, String> {
    map.iter()
        .filter(|(k, _)| !consumed.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Parse a `.poi` file into entries. A line without a position aborts the
/// file (and with it the map).
pub fn read_pois(categories: &[Category], path: &Path) -> Result<(Vec<PoiEntry>, Vec<String>)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let mut warns = Vec::new();
    let (category, lines) = split_header(categories, path, &text, &mut warns);

    let mut out = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let map = kv::parse_line(line);
        let (x, y, z) = kv::position(&map)
            .with_context(|| format!("error in line: {line}"))?;
        out.push(PoiEntry {
            category: category.clone(),
            x,
            y,
            z,
            keys: extra_keys(&map, &["xpos", "ypos", "zpos"]),
        });
    }
    Ok((out, warns))
}

/// Parse a `.trail` file into entries. Every line must name its `trailData`
/// file; the reference is validated against the pack.
pub fn read_trails(
    categories: &[Category],
    path: &Path,
    pack_root: &Path,
) -> Result<(Vec<TrailEntry>, Vec<String>)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let mut warns = Vec::new();
    let (category, lines) = split_header(categories, path, &text, &mut warns);

    let mut out = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let map = kv::parse_line(line);
        let trail_data = kv::get(&map, "trailData")
            .with_context(|| format!("traildata not defined in line: {line}"))?
            .to_string();
        if !pack_root.join(&trail_data).exists() {
            warns.push(format!("file {trail_data} not found"));
        }
        out.push(TrailEntry {
            category: category.clone(),
            trail_data,
            keys: extra_keys(&map, &["trailData"]),
        });
    }
    Ok((out, warns))
}
