//! The movement-cost model and the shortcut-path search.

use waymark_geometry::{segments_intersect, ObjectType, PathGroup, Point, WAYPOINT_COST};

use crate::world::World;

/// Sentinel for "no route". High enough to dominate any real distance while
/// still letting sums of several blocked legs stay comparable.
pub const BARRIER_VALUE: f64 = 1e7;

/// Edges at or above this cost are not worth keeping in the graph.
pub const MAX_PATH_LENGTH: f64 = 10_000.0;

/// Maximum number of shortcut groups chained in one search.
const MAX_SEARCH_DEPTH: usize = 3;

/// Waypoint jumps in the cost model are disabled; the seeded tours already
/// start at waypoints and mid-tour jumping produced worse trails in practice.
const ENABLE_WAYPOINTING: bool = false;

/// Whether the straight segment `src -> dst` crosses an active barrier.
///
/// `DownOnly` barriers only apply to downward movement.
pub fn crosses_barrier(world: &World, src: &Point, dst: &Point) -> bool {
    for barrier in world.barriers.values() {
        if barrier.len() != 2 {
            log::warn!("barrier {} has {} points, skipping", barrier.name, barrier.len());
            continue;
        }
        if barrier.kind == ObjectType::DownOnly && dst.y >= src.y {
            continue;
        }
        if segments_intersect(src, dst, &barrier.first(), &barrier.last()) {
            return true;
        }
    }
    false
}

/// Cost of walking a shortcut sequence from `src`: connector to each group's
/// entry plus the group's own traversal cost. Returns the total and the point
/// the walk ends at.
pub fn take_path(src: &Point, groups: &[PathGroup]) -> (f64, Point) {
    let mut total = 0.0;
    let mut cur = *src;
    for g in groups {
        total += cur.calc_distance(&g.first());
        total += g.cost();
        cur = g.last();
    }
    (total, cur)
}

/// Movement cost from `src` to `dst`.
///
/// A barriered segment costs [`BARRIER_VALUE`] unless `bypass_barriers`
/// allows detouring through a shortcut sequence found by [`find_path`].
/// `allow_waypoints` additionally offers a fixed-penalty waypoint jump when
/// waypointing is compiled in.
pub fn distance(
    world: &World,
    src: &Point,
    dst: &Point,
    allow_waypoints: bool,
    bypass_barriers: bool,
) -> f64 {
    let mut total = 0.0;
    let mut from = *src;

    if crosses_barrier(world, &from, dst) {
        if !bypass_barriers {
            return BARRIER_VALUE;
        }
        match find_path(world, &from, dst) {
            None => return BARRIER_VALUE,
            Some(path) => {
                let (cost, end) = take_path(&from, &path);
                total = cost;
                from = end;
            }
        }
    }

    total += from.calc_distance(dst);

    if allow_waypoints && ENABLE_WAYPOINTING {
        for w in &world.waypoints {
            let via = WAYPOINT_COST + distance(world, w, dst, false, false);
            if via < total {
                return via;
            }
        }
    }

    total
}

/// Find the cheapest bounded-depth sequence of shortcut groups that bypasses
/// the barriers between `src` and `dst`. `None` when no sequence connects.
pub fn find_path(world: &World, src: &Point, dst: &Point) -> Option<Vec<PathGroup>> {
    path_to(world, src, dst, &[])
}

fn path_to(world: &World, src: &Point, dst: &Point, used: &[PathGroup]) -> Option<Vec<PathGroup>> {
    if used.len() > MAX_SEARCH_DEPTH {
        return None;
    }
    let start = used.last().map(|g| g.last()).unwrap_or(*src);

    let mut terminal: Vec<Vec<PathGroup>> = Vec::new();
    let mut choices: Vec<&PathGroup> = Vec::new();

    for group in world.paths.values() {
        // Each group is traversed at most once per sequence.
        if used.iter().any(|u| u.name == group.name) {
            continue;
        }
        let mut entered = false;

        // Forward traversal.
        if !crosses_barrier(world, &start, &group.first()) {
            entered = true;
            if !crosses_barrier(world, &group.last(), dst) {
                let mut seq = used.to_vec();
                seq.push(group.clone());
                terminal.push(seq);
            }
        }
        // Reverse traversal, unless the group is one-way.
        if !group.is_oneway() && !crosses_barrier(world, &start, &group.last()) {
            entered = true;
            if !crosses_barrier(world, &group.first(), dst) {
                let mut seq = used.to_vec();
                seq.push(group.reverse());
                terminal.push(seq);
            }
        }

        if entered {
            choices.push(group);
        }
    }

    // Only recurse when no sequence terminates at this depth.
    if terminal.is_empty() {
        for choice in choices {
            let mut seq = used.to_vec();
            seq.push(choice.clone());
            if let Some(found) = path_to(world, src, dst, &seq) {
                terminal.push(found);
            }
        }
    }

    terminal
        .into_iter()
        .map(|seq| (path_cost(world, src, dst, &seq), seq))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, seq)| seq)
}

/// Full cost of reaching `dst` from `src` through a shortcut sequence.
pub fn path_cost(world: &World, src: &Point, dst: &Point, groups: &[PathGroup]) -> f64 {
    let (total, end) = take_path(src, groups);
    total + distance(world, &end, dst, false, false)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn wall(name: &str, a: Point, b: Point) -> PathGroup {
        let mut g = PathGroup::new(name, a, ObjectType::Wall);
        g.add_point(b);
        g
    }

    fn world_with_wall() -> World {
        let mut barriers = BTreeMap::new();
        let b = wall(
            "midwall",
            Point::new(-5.0, 0.0, 10.0),
            Point::new(5.0, 0.0, 10.0),
        );
        barriers.insert(b.name.clone(), b);
        World::new(barriers, BTreeMap::new(), Vec::new())
    }

    #[test]
    fn test_barrier_blocks_direct_distance() {
        let world = world_with_wall();
        let src = Point::new(0.0, 0.0, 0.0);
        let dst = Point::new(0.0, 0.0, 20.0);
        assert!(crosses_barrier(&world, &src, &dst));
        assert_eq!(distance(&world, &src, &dst, false, false), BARRIER_VALUE);
    }

    #[test]
    fn test_unblocked_distance_is_metric() {
        let world = world_with_wall();
        let src = Point::new(20.0, 0.0, 0.0);
        let dst = Point::new(20.0, 0.0, 5.0);
        assert_eq!(
            distance(&world, &src, &dst, false, false),
            src.calc_distance(&dst)
        );
    }

    #[test]
    fn test_down_only_applies_to_descent_only() {
        let mut barriers = BTreeMap::new();
        let mut ledge = PathGroup::new(
            "ledge",
            Point::new(0.0, 0.0, 0.0),
            ObjectType::DownOnly,
        );
        ledge.add_point(Point::new(10.0, 0.0, 0.0));
        barriers.insert(ledge.name.clone(), ledge);
        let world = World::new(barriers, BTreeMap::new(), Vec::new());

        // Level crossing: ignored.
        let src = Point::new(5.0, 5.0, -1.0);
        let dst = Point::new(5.0, 5.0, 1.0);
        assert!(!crosses_barrier(&world, &src, &dst));

        // Falling across it: applies.
        let src = Point::new(5.0, 5.0, 1.0);
        let dst = Point::new(5.0, -5.0, -1.0);
        assert!(crosses_barrier(&world, &src, &dst));

        // Climbing across it: ignored.
        let src = Point::new(5.0, -5.0, -1.0);
        let dst = Point::new(5.0, 5.0, 1.0);
        assert!(!crosses_barrier(&world, &src, &dst));
    }

    #[test]
    fn test_find_path_through_tunnel() {
        let mut world = world_with_wall();
        let mut tunnel = PathGroup::new(
            "tunnel",
            Point::new(-3.0, 0.0, 9.0),
            ObjectType::Unknown,
        );
        tunnel.add_point(Point::new(-3.0, 0.0, 11.0));
        world.paths.insert(tunnel.name.clone(), tunnel);

        let src = Point::new(0.0, 0.0, 0.0);
        let dst = Point::new(0.0, 0.0, 20.0);

        let found = find_path(&world, &src, &dst).expect("tunnel should connect");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "tunnel");

        let d = distance(&world, &src, &dst, false, true);
        assert!(d < BARRIER_VALUE);
        let (walk, end) = take_path(&src, &found);
        assert!((d - (walk + end.calc_distance(&dst))).abs() < 1e-9);
    }

    #[test]
    fn test_oneway_path_not_reversed() {
        // The wall crosses the whole z=10 line except where the jump lands;
        // the jump only works in its drawn direction.
        let mut world = world_with_wall();
        let mut jump = PathGroup::new(
            "jump",
            Point::new(-3.0, 0.0, 11.0),
            ObjectType::OneWay,
        );
        jump.add_point(Point::new(-3.0, 0.0, 9.0));
        world.paths.insert(jump.name.clone(), jump);

        // Forward (north of wall to south of it) traverses the jump.
        let north = Point::new(0.0, 0.0, 20.0);
        let south = Point::new(0.0, 0.0, 0.0);
        assert!(find_path(&world, &north, &south).is_some());
        // Reverse entry is forbidden for a one-way group.
        assert!(find_path(&world, &south, &north).is_none());
    }

    #[test]
    fn test_bidirectional_path_reversed_when_needed() {
        let mut world = world_with_wall();
        let mut tunnel = PathGroup::new(
            "tunnel",
            Point::new(-3.0, 0.0, 11.0),
            ObjectType::Unknown,
        );
        tunnel.add_point(Point::new(-3.0, 0.0, 9.0));
        world.paths.insert(tunnel.name.clone(), tunnel);

        let south = Point::new(0.0, 0.0, 0.0);
        let north = Point::new(0.0, 0.0, 20.0);
        let found = find_path(&world, &south, &north).expect("reversed tunnel");
        assert_eq!(found.len(), 1);
        // The group was reversed so its first point faces the source.
        assert_eq!(found[0].first(), Point::new(-3.0, 0.0, 9.0));
    }

    #[test]
    fn test_chained_search_respects_depth_cap() {
        // Three parallel walls need three chained tunnels; that fits the cap.
        let mut barriers = BTreeMap::new();
        for (i, z) in [10.0, 20.0, 30.0].into_iter().enumerate() {
            let b = wall(
                &format!("wall{i}"),
                Point::new(-50.0, 0.0, z),
                Point::new(50.0, 0.0, z),
            );
            barriers.insert(b.name.clone(), b);
        }
        let mut world = World::new(barriers, BTreeMap::new(), Vec::new());
        for (i, z) in [10.0, 20.0, 30.0].into_iter().enumerate() {
            let mut t = PathGroup::new(
                format!("tunnel{i}"),
                Point::new(0.0, 0.0, z - 1.0),
                ObjectType::Unknown,
            );
            t.add_point(Point::new(0.0, 0.0, z + 1.0));
            world.paths.insert(t.name.clone(), t);
        }

        let src = Point::new(0.0, 0.0, 0.0);
        let dst = Point::new(0.0, 0.0, 40.0);
        let found = find_path(&world, &src, &dst).expect("chained tunnels");
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].name, "tunnel0");
        assert_eq!(found[2].name, "tunnel2");
    }

    #[test]
    fn test_cheapest_sequence_wins() {
        let mut world = world_with_wall();
        for (name, x) in [("near", -3.0), ("far", -40.0)] {
            let mut t = PathGroup::new(
                name,
                Point::new(x, 0.0, 9.0),
                ObjectType::Unknown,
            );
            t.add_point(Point::new(x, 0.0, 11.0));
            world.paths.insert(t.name.clone(), t);
        }
        // Wall only spans x in [-5, 5]: both tunnels bypass it, near is cheaper.
        let src = Point::new(0.0, 0.0, 0.0);
        let dst = Point::new(0.0, 0.0, 20.0);
        let found = find_path(&world, &src, &dst).unwrap();
        assert_eq!(found[0].name, "near");
    }
}
