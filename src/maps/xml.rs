//! Per-map overlay XML emission.

use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use waymark_common::kv;

use crate::maps::Map;

/// Write one `map<id>.xml` per compiled map into the build folder.
pub fn save(maps: &[Map], build_dir: &Path) -> Result<()> {
    for map in maps {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new("overlaydata")))?;
        writer.write_event(Event::Start(BytesStart::new("pois")))?;

        for poi in &map.pois {
            let mut element = BytesStart::new("poi");
            element.push_attribute(("type", poi.category.as_str()));
            element.push_attribute(("xpos", format!("{:.6}", poi.x).as_str()));
            element.push_attribute(("ypos", format!("{:.6}", poi.y).as_str()));
            element.push_attribute(("zpos", format!("{:.6}", poi.z).as_str()));
            element.push_attribute(("mapid", map.id.to_string().as_str()));
            for (key, value) in &poi.keys {
                element.push_attribute((key.as_str(), kv::trim(value)));
            }
            writer.write_event(Event::Empty(element))?;
        }
        for trail in &map.trails {
            let mut element = BytesStart::new("trail");
            element.push_attribute(("type", trail.category.as_str()));
            element.push_attribute(("trailData", trail.trail_data.as_str()));
            element.push_attribute(("mapid", map.id.to_string().as_str()));
            for (key, value) in &trail.keys {
                element.push_attribute((key.as_str(), kv::trim(value)));
            }
            writer.write_event(Event::Empty(element))?;
        }

        writer.write_event(Event::End(BytesEnd::new("pois")))?;
        writer.write_event(Event::End(BytesEnd::new("overlaydata")))?;

        let path = build_dir.join(format!("map{}.xml", map.id));
        std::fs::write(&path, writer.into_inner())
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::maps::{PoiEntry, TrailEntry};

    #[test]
    fn test_save_writes_pois_and_trails() {
        let dir = tempfile::tempdir().unwrap();
        let map = Map {
            id: 15,
            name: "test".into(),
            pois: vec![PoiEntry {
                category: "loot.chests".into(),
                x: 1.0,
                y: 2.0,
                z: 3.0,
                keys: BTreeMap::from([("guid".to_string(), "\"abc=\"".to_string())]),
            }],
            trails: vec![TrailEntry {
                category: "runs".into(),
                trail_data: "assets/run.trl".into(),
                keys: BTreeMap::new(),
            }],
        };

        save(&[map], dir.path()).unwrap();
        let xml = std::fs::read_to_string(dir.path().join("map15.xml")).unwrap();
        assert!(xml.contains(
            r#"<poi type="loot.chests" xpos="1.000000" ypos="2.000000" zpos="3.000000" mapid="15" guid="abc="/>"#
        ));
        assert!(xml.contains(r#"<trail type="runs" trailData="assets/run.trl" mapid="15"/>"#));
        assert!(xml.contains("<pois>") && xml.ends_with("</overlaydata>"));
    }
}
