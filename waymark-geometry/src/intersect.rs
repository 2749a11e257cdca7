//! 2-D segment intersection in the ground (x-z) plane.
//!
//! Barriers only block horizontal movement; height is handled by the
//! movement-cost model, so `y` is ignored throughout.

use crate::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

fn orientation(p: &Point, q: &Point, r: &Point) -> Orientation {
    let val = (q.z - p.z) * (r.x - q.x) - (q.x - p.x) * (r.z - q.z);
    if val == 0.0 {
        Orientation::Collinear
    } else if val > 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::CounterClockwise
    }
}

/// Whether collinear point `q` lies on segment `pr`.
fn on_segment(p: &Point, q: &Point, r: &Point) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.z <= p.z.max(r.z) && q.z >= p.z.min(r.z)
}

/// Whether segments `p1q1` and `p2q2` cross in the x-z plane.
pub fn segments_intersect(p1: &Point, q1: &Point, p2: &Point, q2: &Point) -> bool {
    let o1 = orientation(p1, q1, p2);
    let o2 = orientation(p1, q1, q2);
    let o3 = orientation(p2, q2, p1);
    let o4 = orientation(p2, q2, q1);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    // Collinear overlap cases.
    if o1 == Orientation::Collinear && on_segment(p1, p2, q1) {
        return true;
    }
    if o2 == Orientation::Collinear && on_segment(p1, q2, q1) {
        return true;
    }
    if o3 == Orientation::Collinear && on_segment(p2, p1, q2) {
        return true;
    }
    if o4 == Orientation::Collinear && on_segment(p2, q1, q2) {
        return true;
    }

    false
}
