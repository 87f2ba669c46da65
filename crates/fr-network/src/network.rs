//! Road network representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_from[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! Roads are undirected: [`RoadNetworkBuilder::add_road`] records one directed
//! edge per direction, and the hazard derivation keeps the two directions'
//! `safe` flags identical because the rule is symmetric in the endpoints.
//!
//! # Mutable hazard state
//!
//! `node_depth_m`, `node_on_safe_ground`, and `edge_safe` are the only
//! mutable fields.  They are written exclusively by
//! [`refresh_hazard`][crate::refresh_hazard] — agents and the dispatcher only
//! read them.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps planar positions to the nearest `NodeId`.
//! Used at setup time to snap configured coordinates (safe zones, seeded
//! flood sources) to road nodes.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use fr_core::{EdgeId, NodeId, Point2};

use crate::{NetworkError, NetworkResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a planar `[x, y]` point with the
/// associated `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in the projected plane.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Undirected road graph in CSR format plus per-node/per-edge hazard state.
///
/// All fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`RoadNetworkBuilder`].
pub struct RoadNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Planar position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<Point2>,

    /// Water depth sampled at each node's grid cell, metres.  Derived.
    pub node_depth_m: Vec<f64>,

    /// `depth <= critical_depth_m` for each node.  Derived.
    pub node_on_safe_ground: Vec<bool>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Outgoing edges of node `n` are at EdgeIds
    /// `node_out_start[n] .. node_out_start[n+1]`.
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    /// Source node of each directed edge.
    pub edge_from: Vec<NodeId>,

    /// Destination node of each directed edge.
    pub edge_to: Vec<NodeId>,

    /// Length of each edge in metres.  Validated positive at build time.
    pub edge_length_m: Vec<f64>,

    /// `max(depth[from], depth[to]) <= safe_depth_m`.  Derived.
    pub edge_safe: Vec<bool>,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial_idx: RTree<NodeEntry>,
}

impl RoadNetwork {
    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    #[inline]
    pub fn contains_node(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    ///
    /// This is a contiguous index range — no heap allocation.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Out-degree of `node` (number of incident roads).
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// Iterator over the neighbor nodes of `node`.
    #[inline]
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.out_edges(node).map(|e| self.edge_to[e.index()])
    }

    /// The directed edge from `from` to `to`, if those nodes are adjacent.
    ///
    /// O(degree) scan of the CSR row — degrees on road networks are tiny.
    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.out_edges(from).find(|&e| self.edge_to[e.index()] == to)
    }

    /// Length of the road between two adjacent nodes.
    pub fn length_between(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.edge_between(from, to).map(|e| self.edge_length_m[e.index()])
    }

    /// `true` if the road between two adjacent nodes is currently safe.
    pub fn is_safe_between(&self, from: NodeId, to: NodeId) -> bool {
        self.edge_between(from, to)
            .map(|e| self.edge_safe[e.index()])
            .unwrap_or(false)
    }

    /// Depth at a node, metres.
    #[inline]
    pub fn depth_at(&self, node: NodeId) -> f64 {
        self.node_depth_m[node.index()]
    }

    /// Number of edges currently flagged unsafe.
    pub fn unsafe_edge_count(&self) -> usize {
        self.edge_safe.iter().filter(|&&s| !s).count()
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the `NodeId` of the nearest road node to `pos`.
    ///
    /// Returns `None` only if the network has no nodes.
    pub fn snap_to_node(&self, pos: Point2) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.x, pos.y])
            .map(|e| e.id)
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// The builder accepts nodes and roads in any order.  `build()` validates
/// edge lengths and endpoints, sorts edges by source node, constructs the CSR
/// arrays, and bulk-loads the R-tree.
///
/// # Example
///
/// ```
/// use fr_core::Point2;
/// use fr_network::RoadNetworkBuilder;
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(Point2::new(0.0, 0.0));
/// let c = b.add_node(Point2::new(20.0, 0.0));
/// b.add_road(a, c, 20.0);
/// let net = b.build().unwrap();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // bidirectional
/// ```
pub struct RoadNetworkBuilder {
    nodes:     Vec<Point2>,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from:     NodeId,
    to:       NodeId,
    length_m: f64,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), raw_edges: Vec::new() }
    }

    /// Pre-allocate for the expected number of nodes and roads to reduce
    /// reallocations when bulk-loading an extracted network.
    pub fn with_capacity(nodes: usize, roads: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(roads * 2),
        }
    }

    /// Add a road node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: Point2) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Add an undirected road of `length_m` metres between `a` and `b`.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, length_m: f64) {
        self.raw_edges.push(RawEdge { from: a, to: b, length_m });
        self.raw_edges.push(RawEdge { from: b, to: a, length_m });
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Validate, then produce a [`RoadNetwork`].
    ///
    /// Time complexity: O(E log E) for edge sort + O(N log N) for R-tree bulk
    /// load, where N = nodes, E = directed edges.
    pub fn build(self) -> NetworkResult<RoadNetwork> {
        let node_count = self.nodes.len();
        if node_count == 0 {
            return Err(NetworkError::EmptyNetwork);
        }

        for e in &self.raw_edges {
            if !e.length_m.is_finite() || e.length_m <= 0.0 {
                return Err(NetworkError::InvalidEdgeLength {
                    from:   e.from,
                    to:     e.to,
                    length: e.length_m,
                });
            }
            if e.from.index() >= node_count {
                return Err(NetworkError::NodeNotFound(e.from));
            }
            if e.to.index() >= node_count {
                return Err(NetworkError::NodeNotFound(e.to));
            }
        }

        // Sort edges by source node for CSR construction.
        let mut raw = self.raw_edges;
        raw.sort_unstable_by_key(|e| (e.from.0, e.to.0));

        let edge_count = raw.len();
        let edge_from:     Vec<NodeId> = raw.iter().map(|e| e.from).collect();
        let edge_to:       Vec<NodeId> = raw.iter().map(|e| e.to).collect();
        let edge_length_m: Vec<f64>    = raw.iter().map(|e| e.length_m).collect();

        // Build CSR row pointer (node_out_start).
        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        // Bulk-load R-tree for O(N log N) construction (faster than N inserts).
        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry {
                point: [pos.x, pos.y],
                id: NodeId(i as u32),
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        Ok(RoadNetwork {
            node_pos: self.nodes,
            node_depth_m: vec![0.0; node_count],
            node_on_safe_ground: vec![true; node_count],
            node_out_start,
            edge_from,
            edge_to,
            edge_length_m,
            // Dry network: every edge starts safe until the first hazard pass.
            edge_safe: vec![true; edge_count],
            spatial_idx,
        })
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
