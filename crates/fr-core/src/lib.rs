//! `fr-core` — foundational types for the flood-response simulation.
//!
//! This crate is a dependency of every other `fr-*` crate.  It intentionally
//! has no `fr-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId`, `CitizenId`, `UnitId`             |
//! | [`geo`]         | `Point2` (projected planar metres), bounding boxes    |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                       |
//! | [`rng`]         | `AgentRng` (per-agent), `SimRng` (global)             |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::{BoundingBox, Point2};
pub use ids::{CitizenId, EdgeId, NodeId, UnitId};
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, SimConfig, Tick};
