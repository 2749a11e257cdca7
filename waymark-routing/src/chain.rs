//! Local-search optimization of one candidate tour.
//!
//! A [`Chain`] is the sequence of graph nodes a tour visits, head first.
//! [`Chain::optimize`] applies two swap operators at the first position pair
//! that strictly improves the tour, window-local: only the edges into, inside
//! and out of the rewritten span change, so candidates are compared on that
//! span alone.

use waymark_geometry::Point;

use crate::graph::{Graph, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    /// Reverse the whole span between the anchors (2-opt style). Requires
    /// every interior edge to exist in the reverse direction.
    SegmentReverse,
    /// Swap the two span endpoints, keeping the interior order.
    EndpointSwap,
}

#[derive(Debug, Clone)]
pub struct Chain {
    nodes: Vec<NodeId>,
    /// Never move the final node (used when the trail's end is pinned).
    pub bind_end: bool,
}

impl Chain {
    pub fn new(nodes: Vec<NodeId>, bind_end: bool) -> Self {
        Chain { nodes, bind_end }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sum of edge costs from the head to the last node; a missing edge
    /// contributes [`crate::cost::BARRIER_VALUE`].
    pub fn end_distance(&self, graph: &Graph) -> f64 {
        self.nodes
            .windows(2)
            .map(|w| graph.edge_cost(w[0], w[1]))
            .sum()
    }

    /// Attempt one improving swap; `true` when the chain changed.
    ///
    /// Scans every position pair with the segment-reversal operator first,
    /// then again with the endpoint swap; returns at the first improvement.
    /// Call repeatedly until `false` for a local fixpoint.
    pub fn optimize(&mut self, graph: &Graph) -> bool {
        self.scan(graph, Operator::SegmentReverse) || self.scan(graph, Operator::EndpointSwap)
    }

    fn scan(&mut self, graph: &Graph, op: Operator) -> bool {
        let n = self.nodes.len();
        if n < 3 {
            return false;
        }
        for a in 1..n - 1 {
            for b in a + 1..n {
                if self.bind_end && b == n - 1 {
                    continue;
                }
                if self.try_swap(graph, a, b, op) {
                    return true;
                }
            }
        }
        false
    }

    /// Rewrite positions `a..=b` if the operator's candidate beats the
    /// current arrangement over the surrounding window.
    fn try_swap(&mut self, graph: &Graph, a: usize, b: usize, op: Operator) -> bool {
        let lo = a - 1;
        let hi = (b + 1).min(self.nodes.len() - 1);

        let mut candidate = self.nodes[lo..=hi].to_vec();
        match op {
            Operator::SegmentReverse => {
                // The interior is walked backwards afterwards; without the
                // reverse edges the candidate is not a tour at all.
                for k in a + 1..b - 1 {
                    if !graph.edge_exists(self.nodes[k + 1], self.nodes[k]) {
                        return false;
                    }
                }
                candidate[a - lo..=b - lo].reverse();
            }
            Operator::EndpointSwap => {
                candidate.swap(a - lo, b - lo);
            }
        }

        let current = window_distance(graph, &self.nodes[lo..=hi]);
        let improved = window_distance(graph, &candidate);
        if improved < current {
            self.nodes[lo..=hi].copy_from_slice(&candidate);
            true
        } else {
            false
        }
    }

    /// Expand the chain to the world-space point sequence it draws: each
    /// node's location, with the points of any shortcut groups its edges
    /// traverse inlined in between.
    pub fn to_points(&self, graph: &Graph) -> Vec<Point> {
        let mut out = Vec::new();
        if self.nodes.is_empty() {
            return out;
        }
        out.push(graph.node(self.nodes[0]).location);
        for w in self.nodes.windows(2) {
            let Some(edge) = graph.edge(w[0], w[1]) else {
                return out;
            };
            for group in &edge.shortcuts {
                out.extend_from_slice(group.points());
            }
            out.push(graph.node(w[1]).location);
        }
        out
    }
}

fn window_distance(graph: &Graph, ids: &[NodeId]) -> f64 {
    ids.windows(2).map(|w| graph.edge_cost(w[0], w[1])).sum()
}
