//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! The simulation calls routing via the [`Router`] trait, so applications can
//! swap in custom implementations (A*, contraction hierarchies) without
//! touching the rest of the workspace.  The default [`DijkstraRouter`] is
//! sufficient for city-district networks.
//!
//! # Route domain
//!
//! Every query names a [`RouteDomain`]: `Full` uses every edge, `SafeOnly`
//! uses only edges whose `safe` flag is currently set.  The safe subgraph is
//! the planning domain for rescue missions; falling back to `Full` is the
//! caller's policy decision, not the router's.
//!
//! # Cost units
//!
//! Edge lengths are converted to integer **millimetres** internally so the
//! heap ordering is exact; `Route` exposes the total back in metres.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use fr_core::NodeId;

use crate::network::RoadNetwork;
use crate::{NetworkError, NetworkResult};

// ── RouteDomain ───────────────────────────────────────────────────────────────

/// Which edges a routing query may traverse.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RouteDomain {
    /// All edges, regardless of flood state.
    Full,
    /// Only edges currently flagged safe.
    SafeOnly,
}

// ── PathPolicy ────────────────────────────────────────────────────────────────

/// What to do when the safe subgraph has no path: retry on the full graph, or
/// give up.  The source variants disagreed, so it is an explicit policy flag
/// rather than a hard-coded choice.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathPolicy {
    /// Prefer the safe subgraph; if it yields nothing, route over all edges.
    SafeThenFull,
    /// Safe subgraph only — agents stall until the flood recedes.
    SafeOnly,
}

impl PathPolicy {
    /// Domains to try, in order.
    pub fn domains(self) -> &'static [RouteDomain] {
        match self {
            PathPolicy::SafeThenFull => &[RouteDomain::SafeOnly, RouteDomain::Full],
            PathPolicy::SafeOnly     => &[RouteDomain::SafeOnly],
        }
    }
}

/// Route `from → to`, trying each of the policy's domains in order.
pub fn route_with_policy(
    router: &dyn Router,
    network: &RoadNetwork,
    from: NodeId,
    to: NodeId,
    policy: PathPolicy,
) -> NetworkResult<Route> {
    let mut last = NetworkError::NoRoute { from, to };
    for &domain in policy.domains() {
        match router.route(network, from, to, domain) {
            Ok(route) => return Ok(route),
            Err(e) => last = e,
        }
    }
    Err(last)
}

/// Route `from` to the nearest of `targets`, trying each of the policy's
/// domains in order.
pub fn nearest_with_policy(
    router: &dyn Router,
    network: &RoadNetwork,
    from: NodeId,
    targets: &[NodeId],
    policy: PathPolicy,
) -> NetworkResult<Route> {
    let mut last = NetworkError::NoRouteToAny { from };
    for &domain in policy.domains() {
        match router.route_to_nearest(network, from, targets, domain) {
            Ok(route) => return Ok(route),
            Err(e) => last = e,
        }
    }
    Err(last)
}

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query: the node sequence from source to
/// destination (inclusive) and the total length.
#[derive(Debug, Clone)]
pub struct Route {
    /// Nodes to visit in order, starting with the source.
    pub nodes: Vec<NodeId>,
    /// Cumulative length in metres.
    pub total_length_m: f64,
}

impl Route {
    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.nodes.len() < 2
    }

    /// The first node to head for (the node after the source), if any.
    pub fn next_node(&self) -> Option<NodeId> {
        self.nodes.get(1).copied()
    }

    /// Final node of the route.
    pub fn destination(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`; the router itself holds no
/// per-query state.
pub trait Router: Send + Sync {
    /// Shortest route from `from` to `to` within `domain`.
    ///
    /// `from == to` yields a trivial single-node route, not an error.
    fn route(
        &self,
        network: &RoadNetwork,
        from: NodeId,
        to: NodeId,
        domain: RouteDomain,
    ) -> NetworkResult<Route>;

    /// Shortest route from `from` to whichever of `targets` is closest.
    ///
    /// The default implementation runs one query per target; the
    /// [`DijkstraRouter`] override settles all targets in a single sweep.
    fn route_to_nearest(
        &self,
        network: &RoadNetwork,
        from: NodeId,
        targets: &[NodeId],
        domain: RouteDomain,
    ) -> NetworkResult<Route> {
        let mut best: Option<Route> = None;
        for &t in targets {
            if let Ok(route) = self.route(network, from, t, domain) {
                let better = best
                    .as_ref()
                    .is_none_or(|b| route.total_length_m < b.total_length_m);
                if better {
                    best = Some(route);
                }
            }
        }
        best.ok_or(NetworkError::NoRouteToAny { from })
    }
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra's algorithm over the CSR road graph, weighted by edge
/// length.  Ties break on ascending `NodeId`, so results are deterministic.
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(
        &self,
        network: &RoadNetwork,
        from: NodeId,
        to: NodeId,
        domain: RouteDomain,
    ) -> NetworkResult<Route> {
        if !network.contains_node(to) {
            return Err(NetworkError::NodeNotFound(to));
        }
        sweep(network, from, domain, |n| n == to)
            .ok_or(NetworkError::NoRoute { from, to })
    }

    fn route_to_nearest(
        &self,
        network: &RoadNetwork,
        from: NodeId,
        targets: &[NodeId],
        domain: RouteDomain,
    ) -> NetworkResult<Route> {
        if targets.is_empty() {
            return Err(NetworkError::NoRouteToAny { from });
        }
        // Dijkstra settles nodes in ascending distance order, so the first
        // target reached is the nearest one.
        sweep(network, from, domain, |n| targets.contains(&n))
            .ok_or(NetworkError::NoRouteToAny { from })
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Edge length in integer millimetres for exact heap ordering.
#[inline]
fn cost_mm(length_m: f64) -> u64 {
    (length_m * 1000.0).round() as u64
}

/// Run Dijkstra from `from` until `is_goal` settles, then reconstruct.
///
/// Returns `None` if no goal is reachable within `domain`.
fn sweep(
    network: &RoadNetwork,
    from: NodeId,
    domain: RouteDomain,
    is_goal: impl Fn(NodeId) -> bool,
) -> Option<Route> {
    if !network.contains_node(from) {
        return None;
    }
    if is_goal(from) {
        return Some(Route { nodes: vec![from], total_length_m: 0.0 });
    }

    let n = network.node_count();
    // dist[v] = best known cost (mm) to reach v.
    let mut dist = vec![u64::MAX; n];
    // prev[v] = predecessor node on the best path; INVALID for unreached.
    let mut prev = vec![NodeId::INVALID; n];

    dist[from.index()] = 0;

    // Min-heap: (cost, node). Reverse makes BinaryHeap (max) behave as min-heap.
    // Secondary key NodeId ensures deterministic tie-breaking.
    let mut heap: BinaryHeap<Reverse<(u64, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((0, from)));

    while let Some(Reverse((cost, node))) = heap.pop() {
        if is_goal(node) {
            return Some(reconstruct(&prev, from, node, cost));
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for edge in network.out_edges(node) {
            if domain == RouteDomain::SafeOnly && !network.edge_safe[edge.index()] {
                continue;
            }
            let neighbor = network.edge_to[edge.index()];
            let new_cost = cost.saturating_add(cost_mm(network.edge_length_m[edge.index()]));

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev[neighbor.index()] = node;
                heap.push(Reverse((new_cost, neighbor)));
            }
        }
    }

    None
}

fn reconstruct(prev: &[NodeId], from: NodeId, to: NodeId, total_mm: u64) -> Route {
    let mut nodes = vec![to];
    let mut cur = to;
    while cur != from {
        cur = prev[cur.index()];
        debug_assert_ne!(cur, NodeId::INVALID);
        nodes.push(cur);
    }
    nodes.reverse();
    Route {
        nodes,
        total_length_m: total_mm as f64 / 1000.0,
    }
}
