//! End-to-end trail assembly for one region of one map.

use rayon::prelude::*;
use thiserror::Error;
use waymark_geometry::{Point, Region};

use crate::chain::Chain;
use crate::graph::Graph;
use crate::world::{BuildPermit, World};

/// Cap on optimization passes per candidate; a guard against oscillation,
/// never reached on real maps.
const MAX_OPTIMIZE_PASSES: usize = 10_000;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("duplicate point at ({x:.1}, {y:.1}, {z:.1}); mark one AllowDuplicate or remove it")]
    DuplicatePoint { x: f64, y: f64, z: f64 },

    #[error("no points to route")]
    NoPoints,

    #[error("no waypoints available to seed the trail")]
    NoWaypoints,

    #[error("point ({x:.1}, {y:.1}, {z:.1}) is not contained in any region")]
    UnassignedPoint { x: f64, y: f64, z: f64 },
}

impl BuildError {
    pub(crate) fn duplicate(p: &Point) -> Self {
        BuildError::DuplicatePoint {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

/// Build the cheapest trail over `pois`, seeded from the world's waypoints.
///
/// Holds the process-wide build permit for the duration: the world is
/// inspected read-only by every candidate, so the parallel optimization
/// below needs no further synchronization.
///
/// With `end` set, every candidate is forced to finish on that point.
/// Returns the expanded point sequence of the winning candidate.
pub fn build_trail(
    world: &World,
    pois: &[Point],
    end: Option<Point>,
) -> Result<Vec<Point>, BuildError> {
    let _permit = BuildPermit::acquire();

    if pois.is_empty() {
        return Err(BuildError::NoPoints);
    }
    check_duplicates(pois)?;
    if world.waypoints.is_empty() {
        return Err(BuildError::NoWaypoints);
    }

    let mut graph = Graph::from_points(world, pois);
    if let Some(endpoint) = end {
        graph.set_endpoint(world, endpoint);
    }
    graph.add_waypoints(world, &world.waypoints);

    let candidates = graph.initial_tours();
    log::info!(
        "routing {} points from {} candidate starts",
        pois.len(),
        candidates.len()
    );

    let optimized: Vec<(f64, Chain)> = candidates
        .into_par_iter()
        .map(|chain| optimize_candidate(&graph, chain))
        .collect();

    // Sequential selection, first minimum wins: the winner is independent of
    // how the parallel fan-out was scheduled.
    let best = optimized
        .iter()
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, chain)| chain)
        .expect("at least one waypoint seed");

    Ok(best.to_points(&graph))
}

fn optimize_candidate(graph: &Graph, mut chain: Chain) -> (f64, Chain) {
    let start = chain.end_distance(graph);
    let mut passes = 0;
    while chain.optimize(graph) {
        passes += 1;
        if passes >= MAX_OPTIMIZE_PASSES {
            log::warn!("optimizer hit the pass cap; keeping the current tour");
            break;
        }
    }
    let done = chain.end_distance(graph);
    log::info!("tour optimized in {passes} passes: {start:.1} -> {done:.1}");
    (done, chain)
}

/// Assign every point to the first region containing it, in region order.
///
/// Fails when a point falls outside all regions; trails would silently skip
/// it otherwise.
pub fn partition_points(
    regions: &[Region],
    points: &[Point],
) -> Result<Vec<Vec<Point>>, BuildError> {
    let mut out: Vec<Vec<Point>> = vec![Vec::new(); regions.len()];
    'points: for p in points {
        for (i, region) in regions.iter().enumerate() {
            if region.contains(p) {
                out[i].push(*p);
                continue 'points;
            }
        }
        return Err(BuildError::UnassignedPoint {
            x: p.x,
            y: p.y,
            z: p.z,
        });
    }
    Ok(out)
}

/// Two points within the identity tolerance are an authoring error unless one
/// of them opts in to duplication.
fn check_duplicates(points: &[Point]) -> Result<(), BuildError> {
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            if a.same(b) && !a.allow_duplicate && !b.allow_duplicate {
                return Err(BuildError::duplicate(b));
            }
        }
    }
    Ok(())
}
