use serde::{Deserialize, Serialize};

/// Two points closer than this are considered the same marker.
pub const SAME_TOLERANCE: f64 = 5.0;

/// A world-space coordinate.
///
/// `allow_duplicate` opts a marker out of the duplicate-point check that
/// otherwise aborts a map's trail build.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default, skip_serializing)]
    pub allow_duplicate: bool,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Point {
            x,
            y,
            z,
            allow_duplicate: false,
        }
    }

    /// Plain 3-D Euclidean distance, used for identity checks only.
    pub fn euclidean(&self, other: &Point) -> f64 {
        let (dx, dy, dz) = (other.x - self.x, other.y - self.y, other.z - self.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Approximate equality: within [`SAME_TOLERANCE`] world units.
    pub fn same(&self, other: &Point) -> bool {
        self.euclidean(other) < SAME_TOLERANCE
    }

    /// Directed traversal cost from `self` to `dst`.
    ///
    /// Steep climbs take far longer to traverse than their raw length, so the
    /// vertical component is scaled up with the climb ratio; drops are cheap
    /// (gliding) and scaled down. The result is asymmetric whenever the two
    /// points differ in height.
    pub fn calc_distance(&self, dst: &Point) -> f64 {
        let diff_x = dst.x - self.x;
        let mut diff_y = dst.y - self.y;
        let diff_z = dst.z - self.z;

        let diff_x_sq = diff_x * diff_x;
        let diff_z_sq = diff_z * diff_z;
        let planar = (diff_x_sq + diff_z_sq).sqrt();
        let climb = if planar > 0.0 { diff_y / planar } else { 1.0 };

        if diff_y > 0.0 {
            if climb > 4.0 {
                // steeper than ~68 degrees
                diff_y *= 4.0;
            } else if climb >= 1.0 {
                // 45 degrees
                diff_y *= 2.0;
            } else if climb >= 0.5 {
                diff_y *= 1.2;
            }
        } else if diff_y < 0.0 {
            diff_y /= 1.5;
        }

        let diff_y_sq = diff_y * diff_y;
        (diff_x_sq + diff_y_sq + diff_z_sq).sqrt()
    }
}
