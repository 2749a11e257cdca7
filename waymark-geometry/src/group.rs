//! Named, typed polylines: barriers and shortcut paths.

use crate::Point;

/// Fixed traversal cost of a mushroom bounce, regardless of its length.
pub const MUSHROOM_COST: f64 = 10.0;

/// Fixed penalty for a waypoint jump.
pub const WAYPOINT_COST: f64 = 5000.0;

/// Classification carried by a marker line's `type` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectType {
    #[default]
    Unknown,
    /// Barrier: blocks movement in both directions.
    Wall,
    /// Barrier: blocks downward movement only.
    DownOnly,
    Leyline,
    Mushroom,
    OneWay,
    Updraft,
    Waypoint,
}

impl ObjectType {
    pub fn parse(s: &str) -> Option<ObjectType> {
        match s.to_ascii_lowercase().as_str() {
            "wall" => Some(ObjectType::Wall),
            "downonly" => Some(ObjectType::DownOnly),
            "leyline" => Some(ObjectType::Leyline),
            "mushroom" => Some(ObjectType::Mushroom),
            "oneway" => Some(ObjectType::OneWay),
            "updraft" => Some(ObjectType::Updraft),
            "waypoint" => Some(ObjectType::Waypoint),
            _ => None,
        }
    }

    pub fn is_barrier(&self) -> bool {
        matches!(self, ObjectType::Wall | ObjectType::DownOnly)
    }

    /// One-way segments cannot be traversed last-to-first.
    pub fn is_oneway(&self) -> bool {
        matches!(
            self,
            ObjectType::OneWay
                | ObjectType::Mushroom
                | ObjectType::Leyline
                | ObjectType::Updraft
                | ObjectType::Waypoint
        )
    }
}

/// A named ordered polyline with a type and cached cumulative lengths.
///
/// The forward and reverse lengths differ because the movement metric is
/// asymmetric; both are maintained incrementally so [`PathGroup::reverse`]
/// is a swap, not a recomputation.
#[derive(Debug, Clone, PartialEq)]
pub struct PathGroup {
    pub name: String,
    pub kind: ObjectType,
    points: Vec<Point>,
    distance: f64,
    rev_distance: f64,
}

impl PathGroup {
    /// A group always starts with one point; later lines append via
    /// [`PathGroup::add_point`].
    pub fn new(name: impl Into<String>, first: Point, kind: ObjectType) -> Self {
        PathGroup {
            name: name.into(),
            kind,
            points: vec![first],
            distance: 0.0,
            rev_distance: 0.0,
        }
    }

    pub fn add_point(&mut self, pt: Point) {
        let last = self.points[self.points.len() - 1];
        self.distance += last.calc_distance(&pt);
        self.rev_distance += pt.calc_distance(&last);
        self.points.push(pt);
    }

    pub fn first(&self) -> Point {
        self.points[0]
    }

    pub fn last(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_oneway(&self) -> bool {
        self.kind.is_oneway()
    }

    /// Traversal cost of the whole group, first to last.
    ///
    /// Mushroom bounces and waypoint jumps cost a fixed amount no matter how
    /// long their drawn polyline is; everything else costs its cached length.
    pub fn cost(&self) -> f64 {
        match self.kind {
            ObjectType::Mushroom => MUSHROOM_COST,
            ObjectType::Waypoint => WAYPOINT_COST,
            _ => self.distance,
        }
    }

    /// Cached geometric length, first to last.
    pub fn forward_distance(&self) -> f64 {
        self.distance
    }

    /// Cached geometric length, last to first.
    pub fn reverse_distance(&self) -> f64 {
        self.rev_distance
    }

    /// The same group walked last-to-first; cached lengths swap roles.
    pub fn reverse(&self) -> PathGroup {
        let mut points = self.points.clone();
        points.reverse();
        PathGroup {
            name: self.name.clone(),
            kind: self.kind,
            points,
            distance: self.rev_distance,
            rev_distance: self.distance,
        }
    }
}
