//! Readers for the line-oriented marker files.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use waymark_common::fs::files_by_extension;
use waymark_common::kv;
use waymark_geometry::{ObjectType, PathGroup, Point};

/// Read plain point lines (waypoints, auto-trail POIs).
///
/// Lines that do not carry a position are skipped; only non-leading lines
/// are worth a log line, the first is often a category header.
pub fn read_points(path: &Path) -> Vec<Point> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            log::warn!("cannot read {}: {err}", path.display());
            return Vec::new();
        }
    };
    parse_points(&text, &path.display().to_string())
}

pub(crate) fn parse_points(text: &str, origin: &str) -> Vec<Point> {
    let mut out = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let map = kv::parse_line(line);
        let (x, y, z) = match kv::position(&map) {
            Ok(pos) => pos,
            Err(err) => {
                if index > 0 {
                    log::warn!("[{origin}] skipping line {}: {err}", index + 1);
                }
                continue;
            }
        };
        let allow_duplicate = kv::get(&map, "AllowDuplicate").is_some_and(kv::is_truthy);
        out.push(Point {
            x,
            y,
            z,
            allow_duplicate,
        });
    }
    out
}

/// Read named typed groups (barriers and shortcut paths). Lines sharing a
/// `name` accumulate into one group in file order; the first line carrying a
/// `type` decides the group's kind.
pub fn read_typed_groups(path: &Path) -> BTreeMap<String, PathGroup> {
    let mut out = BTreeMap::new();
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            log::debug!("no groups at {}: {err}", path.display());
            return out;
        }
    };

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let map = kv::parse_line(line);
        let (x, y, z) = match kv::position(&map) {
            Ok(pos) => pos,
            Err(err) => {
                log::warn!("[{}] skipping line: {err}", path.display());
                continue;
            }
        };
        let point = Point::new(x, y, z);
        let Some(name) = kv::get(&map, "name") else {
            log::warn!("[{}] line missing 'name' field", path.display());
            continue;
        };
        let kind = kv::get(&map, "type").and_then(ObjectType::parse);
        match out.get_mut(name) {
            Some(group) => {
                group.add_point(point);
                if group.kind == ObjectType::Unknown {
                    if let Some(kind) = kind {
                        group.kind = kind;
                    }
                }
            }
            None => {
                let group = PathGroup::new(name, point, kind.unwrap_or_default());
                out.insert(name.to_string(), group);
            }
        }
    }
    out
}

/// Read anonymous point-to-point groups from `Begin`/`End` blocks.
pub fn read_edge_groups(path: &Path) -> Vec<PathGroup> {
    let mut out = Vec::new();
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            log::debug!("no edges at {}: {err}", path.display());
            return out;
        }
    };

    let mut in_block = false;
    // Created lazily on the block's first point; groups are never empty.
    let mut current: Option<PathGroup> = None;
    for line in text.lines() {
        let line = line.trim();
        if line.eq_ignore_ascii_case("begin") {
            if in_block {
                log::warn!("[{}] Begin inside an open block", path.display());
            }
            in_block = true;
            current = None;
            continue;
        }
        if line.eq_ignore_ascii_case("end") {
            match current.take() {
                Some(group) if group.len() > 1 => out.push(group),
                _ => log::warn!("[{}] discarding empty edge block", path.display()),
            }
            in_block = false;
            continue;
        }
        if !in_block {
            continue;
        }
        let map = kv::parse_line(line);
        let Ok((x, y, z)) = kv::position(&map) else {
            continue;
        };
        let point = Point::new(x, y, z);
        match current.as_mut() {
            Some(group) => group.add_point(point),
            None => {
                current = Some(PathGroup::new(
                    format!("edge_{}", out.len()),
                    point,
                    ObjectType::Unknown,
                ));
            }
        }
    }
    out
}

/// A POI as it appears in authored `.poi` files or exported overlay XML.
#[derive(Debug, Clone, Serialize)]
pub struct PoiRecord {
    pub category: String,
    pub map_id: u32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub behavior: i32,
    pub guid: String,
}

impl PoiRecord {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y, self.z)
    }
}

/// Read `.poi` records: a `category=` header line, then one POI per line.
pub fn read_poi_records(path: &Path) -> Result<Vec<PoiRecord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let mut lines = text.lines();
    let header = lines.next().unwrap_or_default();
    let category = match header.split_once('=') {
        Some((key, value)) if key.eq_ignore_ascii_case("category") => kv::trim(value).to_string(),
        _ => {
            log::warn!("[{}] category not set", path.display());
            String::new()
        }
    };

    let mut out = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let map = kv::parse_line(line);
        let Ok((x, y, z)) = kv::position(&map) else {
            log::warn!("[{}] skipping line without position", path.display());
            continue;
        };
        out.push(PoiRecord {
            category: kv::get(&map, "category").unwrap_or(category.as_str()).to_string(),
            map_id: 0,
            x,
            y,
            z,
            behavior: 0,
            guid: String::new(),
        });
    }
    Ok(out)
}

/// Read `<poi .../>` records out of exported overlay XML.
pub fn read_xml_poi_records(path: &Path) -> Result<Vec<PoiRecord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let mut reader = Reader::from_str(&text);

    let mut out = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"poi" => {
                let mut record = PoiRecord {
                    category: String::new(),
                    map_id: 0,
                    x: 0.0,
                    y: 0.0,
                    z: 0.0,
                    behavior: 0,
                    guid: String::new(),
                };
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value().unwrap_or_default().to_string();
                    match attr.key.as_ref() {
                        b"type" => record.category = value,
                        b"mapid" => record.map_id = value.parse().unwrap_or(0),
                        b"xpos" => record.x = value.parse().unwrap_or(0.0),
                        b"ypos" => record.y = value.parse().unwrap_or(0.0),
                        b"zpos" => record.z = value.parse().unwrap_or(0.0),
                        b"behavior" => record.behavior = value.parse().unwrap_or(0),
                        b"guid" => record.guid = value,
                        _ => {}
                    }
                }
                out.push(record);
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(err).with_context(|| format!("parsing {}", path.display())),
            _ => {}
        }
    }
    Ok(out)
}

/// Every POI under `dir`, from both `.poi` files and overlay XML exports.
pub fn read_all_poi_records(dir: &Path) -> Vec<PoiRecord> {
    let mut out = Vec::new();
    for file in files_by_extension(dir, &[".poi"]) {
        match read_poi_records(&file) {
            Ok(records) => out.extend(records),
            Err(err) => log::warn!("{err:#}"),
        }
    }
    for file in files_by_extension(dir, &[".xml"]) {
        match read_xml_poi_records(&file) {
            Ok(records) => out.extend(records),
            Err(err) => log::warn!("{err:#}"),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_points_skips_bad_lines() {
        let pts = parse_points(
            "xpos=1 ypos=2 zpos=3\nnot a point\nxpos=4 ypos=5 zpos=6 AllowDuplicate=1\n",
            "test",
        );
        assert_eq!(pts.len(), 2);
        assert!(!pts[0].allow_duplicate);
        assert!(pts[1].allow_duplicate);
    }

    #[test]
    fn test_typed_groups_accumulate_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("barriers.txt");
        std::fs::write(
            &file,
            concat!(
                "xpos=0 ypos=0 zpos=0 name=wall1 type=wall\n",
                "xpos=10 ypos=0 zpos=0 name=wall1\n",
                "xpos=5 ypos=0 zpos=5 name=jump type=mushroom\n",
                "xpos=5 ypos=9 zpos=5 name=jump\n",
            ),
        )
        .unwrap();

        let groups = read_typed_groups(&file);
        assert_eq!(groups.len(), 2);
        let wall = &groups["wall1"];
        assert_eq!(wall.kind, ObjectType::Wall);
        assert_eq!(wall.len(), 2);
        assert!(groups["jump"].is_oneway());
    }

    #[test]
    fn test_edge_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("edges.txt");
        std::fs::write(
            &file,
            concat!(
                "Begin\n",
                "xpos=0 ypos=0 zpos=0\n",
                "xpos=5 ypos=0 zpos=0\n",
                "End\n",
                "Begin\n",
                "End\n",
                "Begin\n",
                "xpos=9 ypos=0 zpos=0\n",
                "xpos=9 ypos=0 zpos=4\n",
                "xpos=9 ypos=0 zpos=8\n",
                "End\n",
            ),
        )
        .unwrap();

        let groups = read_edge_groups(&file);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 3);
        assert_eq!(groups[1].name, "edge_1");
    }

    #[test]
    fn test_poi_records_inherit_category() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("chests.poi");
        std::fs::write(
            &file,
            "category=loot.chests\nxpos=1 ypos=2 zpos=3\nxpos=4 ypos=5 zpos=6 category=loot.rare\n",
        )
        .unwrap();

        let records = read_poi_records(&file).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category, "loot.chests");
        assert_eq!(records[1].category, "loot.rare");
    }

    #[test]
    fn test_xml_poi_records() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("map15.xml");
        std::fs::write(
            &file,
            r#"<?xml version="1.0" encoding="utf-8"?><overlaydata><pois>
                <poi type="loot.chests" xpos="1.5" ypos="2.5" zpos="3.5" mapid="15" guid="abc=" behavior="2"/>
            </pois></overlaydata>"#,
        )
        .unwrap();

        let records = read_xml_poi_records(&file).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].map_id, 15);
        assert_eq!(records[0].guid, "abc=");
        assert_eq!(records[0].behavior, 2);
        assert_eq!(records[0].point(), Point::new(1.5, 2.5, 3.5));
    }
}
