//! `fr-network` — road graph, flood-hazard derivation, and constrained routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`network`] | `RoadNetwork` (CSR + R-tree), `RoadNetworkBuilder`          |
//! | [`mapping`] | `GridMapping` — planar position → clamped grid cell         |
//! | [`hazard`]  | `HazardThresholds`, `refresh_hazard` — depth sampling + edge safety |
//! | [`router`]  | `Router` trait, `Route`, `RouteDomain`, `DijkstraRouter`    |
//! | [`zones`]   | `SafeZones` — the evacuation drop-off node set              |
//! | [`error`]   | `NetworkError`, `NetworkResult<T>`                          |
//!
//! # Hazard invariant
//!
//! `edge_safe[e] == (max(depth[from], depth[to]) <= safe_depth_m)` — derived
//! by [`refresh_hazard`] after every flood step and written nowhere else.
//! Routing against [`RouteDomain::SafeOnly`] sees exactly the edges for which
//! that flag holds.

pub mod error;
pub mod hazard;
pub mod mapping;
pub mod network;
pub mod router;
pub mod zones;


pub use error::{NetworkError, NetworkResult};
pub use hazard::{refresh_hazard, HazardThresholds};
pub use mapping::GridMapping;
pub use network::{RoadNetwork, RoadNetworkBuilder};
pub use router::{
    nearest_with_policy, route_with_policy, DijkstraRouter, PathPolicy, Route, RouteDomain,
    Router,
};
pub use zones::SafeZones;
