//! Battle engine for PARTBREAK.
//!
//! Owns the hecs ECS world, steps the phase machine on every update,
//! resolves combat and produces BattleSnapshots for the frontend.

pub mod combat;
pub mod context;
pub mod engine;
pub mod scenario;
pub mod systems;
pub mod world_setup;

pub use engine::BattleEngine;
pub use partbreak_core as core;

#[cfg(test)]
mod tests;
