//! Fractional edge positions.

use fr_core::NodeId;

/// Where an agent is on the road network: anchored at `from`, optionally
/// heading to `to`, `progress` of the way there.
///
/// `progress` is 0 at `from` and 1 at `to`; it is meaningful only while `to`
/// is set.  Arrival re-anchors the position at the destination node with no
/// progress carry-over.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgePosition {
    /// The node the agent departed from (or stands at).
    pub from: NodeId,
    /// Destination node of the current edge, `None` while parked at `from`.
    pub to: Option<NodeId>,
    /// Fraction of the edge covered, in `[0, 1)`.
    pub progress: f64,
}

impl EdgePosition {
    /// Parked at `node`.
    #[inline]
    pub fn at_node(node: NodeId) -> Self {
        Self { from: node, to: None, progress: 0.0 }
    }

    /// The node the agent currently counts as occupying.
    ///
    /// Mid-edge agents belong to their departure node — depth sampling,
    /// rescue pickup, and safe-zone checks all anchor there.
    #[inline]
    pub fn node(&self) -> NodeId {
        self.from
    }

    /// `true` while parked (no destination chosen).
    #[inline]
    pub fn is_parked(&self) -> bool {
        self.to.is_none()
    }

    /// Advance along the current edge.
    ///
    /// Returns the destination node if this step completes the edge; the
    /// position is then re-anchored there (`progress = 0`, `to = None`).
    /// No-op when parked.
    pub fn advance(&mut self, speed_mps: f64, dt_secs: f64, edge_length_m: f64) -> Option<NodeId> {
        let to = self.to?;
        debug_assert!(edge_length_m > 0.0);
        self.progress += speed_mps * dt_secs / edge_length_m;
        if self.progress >= 1.0 {
            *self = EdgePosition::at_node(to);
            return Some(to);
        }
        None
    }
}
