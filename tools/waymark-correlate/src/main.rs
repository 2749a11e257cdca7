//! Correlates sighted marker locations against authored POI sets.
//!
//! A correlation directory holds one `<category>.poi` file per authored set
//! and a `<category>/` subdirectory of sighting files (`<category>*.txt`),
//! each listing the points observed in one play session. Sessions never show
//! every POI at once, so each sighted point starts out possibly being any
//! authored POI; every session that contains the point rules out the other
//! points it showed alongside. The summary reports how narrow the
//! correlation got.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use waymark::markers::read_points;
use waymark_common::fs::files_by_extension;
use waymark_geometry::Point;

#[derive(Parser)]
#[command(name = "waymark-correlate")]
#[command(about = "Correlates sighted marker locations against authored POI sets", long_about = None)]
struct Cli {
    /// Correlation directory
    #[arg(short = 's', long = "source", default_value = "correlations")]
    source: PathBuf,
}

#[derive(Debug, Serialize)]
struct EntryPoint {
    name: String,
    location: Point,
    possible_pois: Vec<Point>,
}

#[derive(Debug, Serialize)]
struct Summary {
    expected_points: usize,
    min_references: usize,
    max_references: usize,
    average_references: f64,
    data: Vec<EntryPoint>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    for poi_file in files_by_extension(&cli.source, &[".poi"]) {
        let category = poi_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let pois = read_points(&poi_file);
        let entries = read_sightings(&cli.source, &category);
        if entries.is_empty() {
            log::warn!("no sighting files for {category}");
            continue;
        }

        let summary = correlate(&pois, &entries);
        println!(
            "{category} summary: points: {}, min: {}, max: {}, avg: {:.1}",
            summary.expected_points,
            summary.min_references,
            summary.max_references,
            summary.average_references
        );
        let out = cli.source.join(format!("{category}.txt"));
        std::fs::write(&out, serde_json::to_string_pretty(&summary)?)
            .with_context(|| format!("writing {}", out.display()))?;
    }
    Ok(())
}

/// Sighting files live under `<source>/<category>/` and share the category's
/// name prefix.
fn read_sightings(source: &Path, category: &str) -> Vec<Vec<Point>> {
    files_by_extension(&source.join(category), &[".txt"])
        .into_iter()
        .filter(|f| {
            f.file_name()
                .map(|n| n.to_string_lossy().starts_with(category))
                .unwrap_or(false)
        })
        .map(|f| read_points(&f))
        .filter(|points| !points.is_empty())
        .collect()
}

fn contains(points: &[Point], target: &Point) -> bool {
    points.iter().any(|p| p.same(target))
}

fn correlate(pois: &[Point], entries: &[Vec<Point>]) -> Summary {
    // The fullest sighting is the best approximation of the real point set.
    let canonical = entries
        .iter()
        .enumerate()
        .max_by_key(|(_, e)| e.len())
        .map(|(i, _)| i)
        .unwrap_or(0);

    let mut list: Vec<EntryPoint> = entries[canonical]
        .iter()
        .enumerate()
        .map(|(i, p)| EntryPoint {
            name: format!("Point_{i}"),
            location: *p,
            possible_pois: pois.to_vec(),
        })
        .collect();

    for entry_point in &mut list {
        for (index, sighting) in entries.iter().enumerate() {
            // A sighting only tells us something about points it contains.
            if index != canonical && !contains(sighting, &entry_point.location) {
                continue;
            }
            // Whatever else that session showed cannot be this point's POI.
            for p in sighting {
                if !p.same(&entry_point.location) {
                    entry_point
                        .possible_pois
                        .retain(|candidate| !candidate.same(p));
                }
            }
        }
    }

    let counts: Vec<usize> = list.iter().map(|e| e.possible_pois.len()).collect();
    let total: usize = counts.iter().sum();
    Summary {
        expected_points: list.len(),
        min_references: counts.iter().copied().min().unwrap_or(0),
        max_references: counts.iter().copied().max().unwrap_or(0),
        average_references: if counts.is_empty() {
            0.0
        } else {
            total as f64 / counts.len() as f64
        },
        data: list,
    }
}
