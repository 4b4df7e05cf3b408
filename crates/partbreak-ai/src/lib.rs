//! Personality-driven AI for PARTBREAK.
//!
//! Implements strategy sets, routine conditions, part and target
//! strategies, the decision engine and player-assist hints. Everything
//! reads a `BattleSnapshot`; randomness comes only from the caller's RNG.

pub mod conditions;
pub mod decision;
pub mod hints;
pub mod parts;
pub mod personalities;
pub mod strategy;
pub mod targeting;

pub use partbreak_core as core;
