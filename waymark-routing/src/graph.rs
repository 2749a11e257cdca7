//! The weighted directed graph over POIs and waypoints.
//!
//! Nodes live in an arena `Vec`; edges refer to destinations by index.
//! Edges are directed and computed independently per orientation, because
//! shortcut detours are often one-way and the movement metric itself is
//! asymmetric.

use waymark_geometry::{PathGroup, Point};

use crate::chain::Chain;
use crate::cost::{distance, find_path, BARRIER_VALUE, MAX_PATH_LENGTH};
use crate::world::World;

pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct Edge {
    pub dest: NodeId,
    pub cost: f64,
    /// Shortcut groups to walk through when taking this edge; empty for a
    /// direct edge.
    pub shortcuts: Vec<PathGroup>,
}

#[derive(Debug)]
pub struct Node {
    pub location: Point,
    /// POIs and bound endpoints are required; waypoint seeds are not.
    pub required: bool,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    waypoints: Vec<NodeId>,
    endpoint: Option<NodeId>,
}

impl Graph {
    /// Build a graph with one required node per point, densely connected.
    pub fn from_points(world: &World, points: &[Point]) -> Graph {
        let mut g = Graph::default();
        for p in points {
            g.add(world, *p, true);
        }
        g
    }

    /// Append non-required waypoint nodes; each becomes a candidate tour seed.
    pub fn add_waypoints(&mut self, world: &World, waypoints: &[Point]) {
        for w in waypoints {
            let id = self.add(world, *w, false);
            self.waypoints.push(id);
        }
    }

    /// Append a required node that tours must end on.
    pub fn set_endpoint(&mut self, world: &World, point: Point) {
        let id = self.add(world, point, true);
        self.endpoint = Some(id);
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge(&self, from: NodeId, to: NodeId) -> Option<&Edge> {
        self.nodes[from].edges.iter().find(|e| e.dest == to)
    }

    pub fn edge_exists(&self, from: NodeId, to: NodeId) -> bool {
        self.edge(from, to).is_some()
    }

    /// Cost of the `from -> to` edge, [`BARRIER_VALUE`] when absent.
    pub fn edge_cost(&self, from: NodeId, to: NodeId) -> f64 {
        self.edge(from, to).map_or(BARRIER_VALUE, |e| e.cost)
    }

    /// Required node ids in insertion order, a bound endpoint always last.
    pub fn required_nodes(&self) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = (0..self.nodes.len())
            .filter(|&id| self.nodes[id].required && self.endpoint != Some(id))
            .collect();
        if let Some(end) = self.endpoint {
            out.push(end);
        }
        out
    }

    /// One nearest-neighbor tour per waypoint seed.
    ///
    /// From the current node, follow the cheapest outgoing edge to a node
    /// still required; when no edge reaches one, fall back to the first
    /// remaining required node and let the optimizer repair the jump. A bound
    /// endpoint is excluded from the greedy pool and appended last.
    pub fn initial_tours(&self) -> Vec<Chain> {
        let bind_end = self.endpoint.is_some();
        self.waypoints
            .iter()
            .map(|&seed| {
                let mut nodes = vec![seed];
                let mut required = self.required_nodes();
                if self.endpoint.is_some() {
                    required.pop();
                }
                let mut current = seed;
                while !required.is_empty() {
                    let next = self.closest(current, &required);
                    let at = required.iter().position(|&id| id == next).unwrap();
                    required.swap_remove(at);
                    nodes.push(next);
                    current = next;
                }
                if let Some(end) = self.endpoint {
                    nodes.push(end);
                }
                Chain::new(nodes, bind_end)
            })
            .collect()
    }

    fn closest(&self, from: NodeId, required: &[NodeId]) -> NodeId {
        let mut best: Option<(NodeId, f64)> = None;
        for edge in &self.nodes[from].edges {
            if !required.contains(&edge.dest) {
                continue;
            }
            match best {
                Some((_, cost)) if edge.cost >= cost => {}
                _ => best = Some((edge.dest, edge.cost)),
            }
        }
        // No edge reaches a required node; pick one anyway to finish the
        // chain and let the optimizer fix things.
        best.map(|(id, _)| id).unwrap_or(required[0])
    }

    fn add(&mut self, world: &World, point: Point, required: bool) -> NodeId {
        let id = self.nodes.len();
        let mut node = Node {
            location: point,
            required,
            edges: Vec::new(),
        };
        for other in 0..self.nodes.len() {
            let there = self.nodes[other].location;
            if let Some(edge) = connect(world, &there, id, &point) {
                self.nodes[other].edges.push(edge);
            }
            if let Some(edge) = connect(world, &point, other, &there) {
                node.edges.push(edge);
            }
        }
        self.nodes.push(node);
        id
    }
}

/// Compute the directed edge `from -> to`, if any survives the cost cap.
///
/// A shortcut-augmented route competes with the direct route; the cheaper of
/// the two is kept, and either is dropped at [`MAX_PATH_LENGTH`].
fn connect(world: &World, from: &Point, dest: NodeId, to: &Point) -> Option<Edge> {
    let shortcut = find_path(world, from, to);
    let shortcut_len = shortcut
        .as_deref()
        .map_or(BARRIER_VALUE, |seq| shortcut_distance(from, seq, to));
    let direct = distance(world, from, to, false, false);

    if direct < shortcut_len {
        (direct < MAX_PATH_LENGTH).then(|| Edge {
            dest,
            cost: direct,
            shortcuts: Vec::new(),
        })
    } else {
        (shortcut_len < MAX_PATH_LENGTH).then(|| Edge {
            dest,
            cost: shortcut_len,
            shortcuts: shortcut.unwrap_or_default(),
        })
    }
}

/// Length of a shortcut-augmented route: entry connector, each group's cost,
/// the connectors between consecutive groups, and the exit connector.
fn shortcut_distance(start: &Point, groups: &[PathGroup], dest: &Point) -> f64 {
    if groups.is_empty() {
        return BARRIER_VALUE;
    }
    let mut total = start.calc_distance(&groups[0].first())
        + groups[groups.len() - 1].last().calc_distance(dest);
    for (index, g) in groups.iter().enumerate() {
        if index > 0 {
            total += groups[index - 1].last().calc_distance(&g.first());
        }
        total += g.cost();
    }
    total
}
