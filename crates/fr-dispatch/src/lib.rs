//! `fr-dispatch` — the call-center coordinator.
//!
//! Matches critically unsafe citizens to available rescue units with a greedy
//! nearest-available rule.  Greedy is deliberate: a globally optimal
//! (min-cost matching) assignment would trade latency for optimality, and in
//! a flood the first minutes dominate outcomes.

pub mod coordinator;

#[cfg(test)]
mod tests;

pub use coordinator::{Assignment, DispatchCoordinator};
