//! Barrier-aware trail building.
//!
//! Given one map's POIs, candidate starting waypoints, barrier segments and
//! shortcut paths, this crate produces the shortest ordered point sequence
//! that visits every POI. The pipeline is: build a weighted directed graph
//! over POIs and waypoints ([`graph`]), seed one nearest-neighbor tour per
//! waypoint, locally optimize each candidate in parallel ([`chain`]), keep
//! the cheapest, and expand it through any shortcut polylines its edges
//! carry ([`builder`]).

pub mod builder;
pub mod chain;
pub mod cost;
pub mod graph;
pub mod world;

pub use builder::{build_trail, partition_points, BuildError};
pub use chain::Chain;
pub use cost::{distance, find_path, BARRIER_VALUE, MAX_PATH_LENGTH};
pub use graph::{Graph, NodeId};
pub use world::{BuildPermit, World};
