//! World-space geometry for waymark.
//!
//! Coordinates follow the overlay convention: `x`/`z` span the ground plane,
//! `y` is height. All traversal costs flow through [`Point::calc_distance`],
//! which penalizes climbs and rewards descents, so distances are directed.

pub mod group;
pub mod intersect;
pub mod point;
pub mod region;

pub use group::{ObjectType, PathGroup, MUSHROOM_COST, WAYPOINT_COST};
pub use intersect::segments_intersect;
pub use point::{Point, SAME_TOLERANCE};
pub use region::Region;
