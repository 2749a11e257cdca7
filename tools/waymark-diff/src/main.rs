//! Reports POI differences between two marker pack snapshots.
//!
//! POIs match by location (5-unit tolerance), so re-exports with jittered
//! coordinates do not show up as differences. POIs present in the second
//! snapshot but not the first are written as JSON; POIs missing from the
//! second are written as overlay-XML stubs ready to import, stamped with
//! fresh GUIDs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use clap::Parser;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use uuid::Uuid;
use waymark::markers::{read_all_poi_records, PoiRecord};
use waymark_geometry::Point;

#[derive(Parser)]
#[command(name = "waymark-diff")]
#[command(about = "Reports POI differences between two marker pack snapshots", long_about = None)]
struct Cli {
    /// First snapshot directory (typically the locally authored pack)
    first: PathBuf,

    /// Second snapshot directory (typically an exported pack)
    second: PathBuf,

    /// JSON array of points to ignore in both directions
    #[arg(long)]
    ignore: Option<PathBuf>,

    /// Directory the reports are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Category stamped onto the generated XML stubs
    #[arg(long, default_value = "")]
    stub_type: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let first = read_all_poi_records(&cli.first);
    let second = read_all_poi_records(&cli.second);
    log::info!(
        "{} POIs in {}, {} in {}",
        first.len(),
        cli.first.display(),
        second.len(),
        cli.second.display()
    );

    let ignore = match &cli.ignore {
        Some(path) => load_ignore_list(path)?,
        None => Vec::new(),
    };

    let missing_from_first = diff(&first, &second, &ignore);
    let missing_from_second = diff(&second, &first, &ignore);

    std::fs::create_dir_all(&cli.out_dir)?;
    if !missing_from_first.is_empty() {
        let path = cli.out_dir.join(format!("missing_{}.json", dir_label(&cli.first)));
        std::fs::write(&path, serde_json::to_string_pretty(&missing_from_first)?)
            .with_context(|| format!("writing {}", path.display()))?;
        println!(
            "{} POIs missing from {} -> {}",
            missing_from_first.len(),
            cli.first.display(),
            path.display()
        );
    }
    if !missing_from_second.is_empty() {
        let path = cli.out_dir.join(format!("missing_{}.xml", dir_label(&cli.second)));
        let defaults = second.first();
        write_stub_xml(&path, &missing_from_second, defaults, &cli.stub_type)?;
        println!(
            "{} POIs missing from {} -> {}",
            missing_from_second.len(),
            cli.second.display(),
            path.display()
        );
    }
    if missing_from_first.is_empty() && missing_from_second.is_empty() {
        println!("snapshots agree");
    }
    Ok(())
}

fn dir_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pack".to_string())
}

fn load_ignore_list(path: &Path) -> Result<Vec<Point>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Records of `candidates` whose location appears in neither `known` nor the
/// ignore list.
fn diff(known: &[PoiRecord], candidates: &[PoiRecord], ignore: &[Point]) -> Vec<PoiRecord> {
    candidates
        .iter()
        .filter(|c| {
            let at = c.point();
            !ignore.iter().any(|p| p.same(&at))
                && !known.iter().any(|k| k.point().same(&at))
        })
        .cloned()
        .collect()
}

fn new_guid() -> String {
    STANDARD.encode(Uuid::new_v4().as_bytes())
}

/// Overlay-XML stubs for import: map id and behavior default to the target
/// snapshot's first record, each stub gets a fresh GUID.
fn write_stub_xml(
    path: &Path,
    records: &[PoiRecord],
    defaults: Option<&PoiRecord>,
    stub_type: &str,
) -> Result<()> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("overlaydata")))?;
    writer.write_event(Event::Start(BytesStart::new("pois")))?;
    for record in records {
        let mut element = BytesStart::new("poi");
        let category = if stub_type.is_empty() {
            record.category.as_str()
        } else {
            stub_type
        };
        element.push_attribute(("type", category));
        element.push_attribute(("xpos", format!("{:.6}", record.x).as_str()));
        element.push_attribute(("ypos", format!("{:.6}", record.y).as_str()));
        element.push_attribute(("zpos", format!("{:.6}", record.z).as_str()));
        let map_id = defaults.map_or(record.map_id, |d| d.map_id);
        let behavior = defaults.map_or(record.behavior, |d| d.behavior);
        element.push_attribute(("mapid", map_id.to_string().as_str()));
        element.push_attribute(("behavior", behavior.to_string().as_str()));
        element.push_attribute(("guid", new_guid().as_str()));
        writer.write_event(Event::Empty(element))?;
    }
    writer.write_event(Event::End(BytesEnd::new("pois")))?;
    writer.write_event(Event::End(BytesEnd::new("overlaydata")))?;
    std::fs::write(path, writer.into_inner())
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
