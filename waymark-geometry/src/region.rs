//! Polygonal map regions used to split a map's POIs into separate trails.

use serde::{Deserialize, Serialize};

use crate::Point;

/// One polygon of a map's region list, with optional forced trail endpoints.
///
/// `start`, when set, seeds the region's trail instead of the map waypoints;
/// `end` pins the trail's final node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    #[serde(default)]
    pub start: Option<Point>,
    #[serde(default)]
    pub end: Option<Point>,
    pub vertices: Vec<Point>,
}

impl Region {
    /// Ray-cast containment in the x-z plane; polygons with fewer than three
    /// vertices contain nothing.
    pub fn contains(&self, point: &Point) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        for i in 0..n {
            let a = &self.vertices[i];
            let b = &self.vertices[(i + 1) % n];
            if (a.z > point.z) != (b.z > point.z) {
                let cross_x = a.x + (point.z - a.z) * (b.x - a.x) / (b.z - a.z);
                if point.x < cross_x {
                    inside = !inside;
                }
            }
        }
        inside
    }
}
