//! End-to-end trail builds over small hand-laid worlds.

use std::collections::BTreeMap;
use std::sync::Mutex;

use waymark_geometry::{ObjectType, PathGroup, Point};
use waymark_routing::{build_trail, BuildError, BuildPermit, World};

/// `build_trail` takes the process-wide build permit; tests in this file run
/// on parallel threads, so they serialize through this lock.
static BUILD_LOCK: Mutex<()> = Mutex::new(());

fn serial() -> std::sync::MutexGuard<'static, ()> {
    BUILD_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

fn wall(name: &str, a: Point, b: Point) -> (String, PathGroup) {
    let mut g = PathGroup::new(name, a, ObjectType::Wall);
    g.add_point(b);
    (name.to_string(), g)
}

fn contains(points: &[Point], target: &Point) -> bool {
    points.iter().any(|p| p.same(target))
}

#[test]
fn test_two_pois_one_waypoint() {
    let _serial = serial();
    let world = World::new(
        BTreeMap::new(),
        BTreeMap::new(),
        vec![Point::new(0.0, 0.0, -5.0)],
    );
    let pois = [Point::new(0.0, 0.0, 0.0), Point::new(0.0, 0.0, 10.0)];

    let trail = build_trail(&world, &pois, None).unwrap();
    assert_eq!(trail.len(), 3);
    assert_eq!(trail[0], Point::new(0.0, 0.0, -5.0));
    assert_eq!(trail[1], Point::new(0.0, 0.0, 0.0));
    assert_eq!(trail[2], Point::new(0.0, 0.0, 10.0));
}

#[test]
fn test_walled_square_still_visits_everything() {
    let _serial = serial();
    let mut barriers = BTreeMap::new();
    let (k, v) = wall(
        "divider",
        Point::new(5.0, 0.0, -1.0),
        Point::new(5.0, 0.0, 11.0),
    );
    barriers.insert(k, v);
    let world = World::new(barriers, BTreeMap::new(), vec![Point::new(0.0, 0.0, 0.0)]);

    let pois = [
        Point::new(0.0, 0.0, 0.0),
        Point::new(10.0, 0.0, 0.0),
        Point::new(10.0, 0.0, 10.0),
        Point::new(0.0, 0.0, 10.0),
    ];
    let trail = build_trail(&world, &pois, None).unwrap();
    for poi in &pois {
        assert!(contains(&trail, poi), "missing poi {poi:?}");
    }
}

#[test]
fn test_shortcut_points_are_inlined() {
    let _serial = serial();
    let mut barriers = BTreeMap::new();
    let (k, v) = wall(
        "midwall",
        Point::new(-5.0, 0.0, 10.0),
        Point::new(5.0, 0.0, 10.0),
    );
    barriers.insert(k, v);
    let mut paths = BTreeMap::new();
    let mut tunnel = PathGroup::new("tunnel", Point::new(-3.0, 0.0, 9.0), ObjectType::Unknown);
    tunnel.add_point(Point::new(-3.0, 0.0, 11.0));
    paths.insert(tunnel.name.clone(), tunnel);
    let world = World::new(barriers, paths, vec![Point::new(0.0, 0.0, -5.0)]);

    let pois = [Point::new(0.0, 0.0, 0.0), Point::new(0.0, 0.0, 20.0)];
    let trail = build_trail(&world, &pois, None).unwrap();

    // Both tunnel points appear between the POI south of the wall and the
    // POI north of it.
    let south = trail
        .iter()
        .position(|p| *p == Point::new(0.0, 0.0, 0.0))
        .unwrap();
    let north = trail
        .iter()
        .position(|p| *p == Point::new(0.0, 0.0, 20.0))
        .unwrap();
    let entry = trail
        .iter()
        .position(|p| *p == Point::new(-3.0, 0.0, 9.0))
        .expect("tunnel entry inlined");
    let exit = trail
        .iter()
        .position(|p| *p == Point::new(-3.0, 0.0, 11.0))
        .expect("tunnel exit inlined");
    assert!(south < entry && entry < exit && exit < north);
}

#[test]
fn test_best_waypoint_seed_wins() {
    let _serial = serial();
    // W2 sits right next to the first POI of the natural visit order; W1 is
    // far off to the side. Only W2's chain should be emitted.
    let world = World::new(
        BTreeMap::new(),
        BTreeMap::new(),
        vec![Point::new(500.0, 0.0, 0.0), Point::new(0.0, 0.0, -10.0)],
    );
    let pois = [
        Point::new(0.0, 0.0, 0.0),
        Point::new(0.0, 0.0, 50.0),
        Point::new(0.0, 0.0, 100.0),
    ];
    let trail = build_trail(&world, &pois, None).unwrap();
    assert_eq!(trail[0], Point::new(0.0, 0.0, -10.0));
}

#[test]
fn test_bound_endpoint_is_last() {
    let _serial = serial();
    let world = World::new(
        BTreeMap::new(),
        BTreeMap::new(),
        vec![Point::new(0.0, 0.0, -5.0)],
    );
    let pois = [
        Point::new(0.0, 0.0, 30.0),
        Point::new(0.0, 0.0, 10.0),
        Point::new(0.0, 0.0, 20.0),
    ];
    let end = Point::new(0.0, 0.0, 0.0);
    let trail = build_trail(&world, &pois, Some(end)).unwrap();
    assert_eq!(*trail.last().unwrap(), end);
    for poi in &pois {
        assert!(contains(&trail, poi));
    }
}

#[test]
fn test_duplicate_pois_abort_the_build() {
    let _serial = serial();
    let world = World::new(
        BTreeMap::new(),
        BTreeMap::new(),
        vec![Point::new(0.0, 0.0, -5.0)],
    );
    let pois = [Point::new(0.0, 0.0, 0.0), Point::new(0.0, 0.0, 0.0)];
    assert!(matches!(
        build_trail(&world, &pois, None),
        Err(BuildError::DuplicatePoint { .. })
    ));
}

#[test]
fn test_unrouteable_pair_still_produces_a_tour() {
    let _serial = serial();
    // The wall makes the 0<->1 edges cost BARRIER_VALUE; the tour exists
    // anyway and is dominated accordingly.
    let mut barriers = BTreeMap::new();
    let (k, v) = wall(
        "divide",
        Point::new(5.0, 0.0, -100.0),
        Point::new(5.0, 0.0, 100.0),
    );
    barriers.insert(k, v);
    let world = World::new(barriers, BTreeMap::new(), vec![Point::new(-1.0, 0.0, 0.0)]);
    let pois = [Point::new(0.0, 0.0, 0.0), Point::new(10.0, 0.0, 0.0)];

    let trail = build_trail(&world, &pois, None).unwrap();
    for poi in &pois {
        assert!(contains(&trail, poi));
    }
    assert!(trail.len() >= 3);
}

#[test]
fn test_no_waypoints_is_an_error() {
    let _serial = serial();
    let world = World::default();
    assert!(matches!(
        build_trail(&world, &[Point::new(0.0, 0.0, 0.0)], None),
        Err(BuildError::NoWaypoints)
    ));
}

#[test]
fn test_build_permit_is_exclusive() {
    let _serial = serial();
    let held = BuildPermit::acquire();
    let clash = std::panic::catch_unwind(BuildPermit::acquire);
    assert!(clash.is_err(), "second acquire must be fatal");
    drop(held);
    // Release then reacquire is fine.
    let again = BuildPermit::acquire();
    drop(again);
}

#[test]
fn test_deterministic_output() {
    let _serial = serial();
    let build = || {
        let mut barriers = BTreeMap::new();
        let (k, v) = wall(
            "divider",
            Point::new(5.0, 0.0, -1.0),
            Point::new(5.0, 0.0, 11.0),
        );
        barriers.insert(k, v);
        let world = World::new(
            barriers,
            BTreeMap::new(),
            vec![Point::new(0.0, 0.0, 0.0), Point::new(10.0, 0.0, 10.0)],
        );
        let pois = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(10.0, 0.0, 0.0),
            Point::new(10.0, 0.0, 10.0),
            Point::new(0.0, 0.0, 10.0),
        ];
        build_trail(&world, &pois, None).unwrap()
    };
    assert_eq!(build(), build());
}
