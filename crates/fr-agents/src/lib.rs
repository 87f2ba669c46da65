//! `fr-agents` — citizen and rescue-unit state machines and their stores.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                      |
//! |--------------|---------------------------------------------------------------|
//! | [`movement`] | `EdgePosition` — fractional position along a road             |
//! | [`citizen`]  | `Citizen`, `CitizenState`, `DecisionMode`                     |
//! | [`unit`]     | `RescueUnit`, `UnitState`                                     |
//! | [`store`]    | `CitizenStore`, `UnitStore` — entities + incremental indices  |
//! | [`entity`]   | `Entity` — tagged step-order handle over both populations     |
//! | [`engine`]   | Per-tick stepping: `StepCtx`, `step_entity`, `assign_target`  |
//! | [`spawn`]    | `PopulationConfig`, seeded population construction            |
//! | [`error`]    | `AgentError`, `AgentResult<T>`                                |
//!
//! # State-machine legality
//!
//! All state changes funnel through `CitizenStore::set_state` /
//! `UnitStore::set_state`, which keep the critical/available indices current
//! and debug-assert the transition rules: a citizen never goes
//! `CriticallyUnsafe → Safe` directly (rescue passes through `Rescued`), and
//! `Rescued` citizens never self-move — their position is mirrored from the
//! carrying unit.

pub mod citizen;
pub mod engine;
pub mod entity;
pub mod error;
pub mod movement;
pub mod spawn;
pub mod store;
pub mod unit;


pub use citizen::{Citizen, CitizenState, DecisionMode, DEPTH_SPEED_DECAY, FLOOR_SPEED_MPS};
pub use engine::{assign_target, build_departures, step_entity, StepCtx};
pub use entity::Entity;
pub use error::{AgentError, AgentResult};
pub use movement::EdgePosition;
pub use spawn::{spawn_population, ModeWeights, Population, PopulationConfig};
pub use store::{CitizenStore, UnitStore};
pub use unit::{RescueUnit, UnitState};
