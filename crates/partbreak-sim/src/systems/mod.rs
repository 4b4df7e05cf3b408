//! ECS systems that operate on the battle world each update.
//!
//! Systems are plain functions over `&mut World` (or `&World` for read-only)
//! plus the pieces of `BattleContext` they need. They own no state.

pub mod cancellation;
pub mod effects;
pub mod execution;
pub mod gauge;
pub mod history;
pub mod resolution;
pub mod selection;
pub mod snapshot;
pub mod victory;
