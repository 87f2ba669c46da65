//! The safe-zone node set.

use rustc_hash::FxHashSet;

use fr_core::NodeId;

use crate::{NetworkError, NetworkResult, RoadNetwork};

/// Evacuation/drop-off destinations, fixed at setup.
///
/// Keeps both a hash set (O(1) membership tests on the agent hot path) and
/// the original insertion order (deterministic iteration for routing target
/// lists and reports).
#[derive(Clone, Debug)]
pub struct SafeZones {
    ordered: Vec<NodeId>,
    set: FxHashSet<NodeId>,
}

impl SafeZones {
    /// Validate `nodes` against `network` and build the set.
    ///
    /// Duplicates collapse (first occurrence wins the ordering).  An empty
    /// set or an unknown node is a configuration error.
    pub fn new(nodes: Vec<NodeId>, network: &RoadNetwork) -> NetworkResult<Self> {
        if nodes.is_empty() {
            return Err(NetworkError::EmptySafeZones);
        }
        let mut ordered = Vec::with_capacity(nodes.len());
        let mut set = FxHashSet::default();
        for node in nodes {
            if !network.contains_node(node) {
                return Err(NetworkError::NodeNotFound(node));
            }
            if set.insert(node) {
                ordered.push(node);
            }
        }
        Ok(Self { ordered, set })
    }

    /// `true` if `node` is an evacuation destination.
    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        self.set.contains(&node)
    }

    /// Safe-zone nodes in insertion order — the target list for
    /// [`Router::route_to_nearest`][crate::Router::route_to_nearest].
    #[inline]
    pub fn as_slice(&self) -> &[NodeId] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
