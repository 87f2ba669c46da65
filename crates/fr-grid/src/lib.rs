//! `fr-grid` — terrain/water grid and the flood-diffusion engine.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`grid`]    | `FloodGrid` — height/water/fast-flow fields, flat storage  |
//! | [`engine`]  | `FloodEngine` — one cellular transfer step, flux-limited   |
//! | [`rain`]    | `RainSchedule` — piecewise-constant storm scenarios        |
//! | [`error`]   | `GridError`, `GridResult<T>`                               |
//!
//! # Flow model
//!
//! For every cell the total level `z = height + water` is compared against
//! its in-bounds 8-neighbors (the window is clipped at the grid edge, so the
//! domain boundary is a no-flux wall); water moves to each strictly lower
//! neighbor at `local_k * (z_self - z_neighbor)`, where `local_k` doubles on
//! fast-flow (road) cells.  All transfers are computed from a read-only
//! snapshot of the pre-step level field, so the update is order-independent
//! and can run in parallel (`parallel` feature).
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | Rayon row-parallel transfer computation.                |
//! | `serde`    | Derives `Serialize`/`Deserialize` on public types.      |

pub mod engine;
pub mod error;
pub mod grid;
pub mod rain;

#[cfg(test)]
mod tests;

pub use engine::{FloodEngine, OverflowTrigger};
pub use error::{GridError, GridResult};
pub use grid::FloodGrid;
pub use rain::{RainBlock, RainSchedule};
