//! Fundamental identifier and timing types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::enums::PartKey;

/// Stable combatant identifier, assigned at spawn and unique for the battle.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CombatantId(pub u32);

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A specific part on a specific combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetRef {
    pub target_id: CombatantId,
    pub part_key: PartKey,
}

impl TargetRef {
    pub fn new(target_id: CombatantId, part_key: PartKey) -> Self {
        Self { target_id, part_key }
    }
}

/// Record of an executed attack: who was hit, and where.
pub type AttackRecord = TargetRef;

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Number of `update` calls processed while the battle was running.
    pub tick: u64,
    /// Elapsed battle time in milliseconds.
    pub elapsed_ms: f64,
}

impl SimTime {
    /// Advance by one update of `dt_ms` milliseconds.
    pub fn advance(&mut self, dt_ms: f64) {
        self.tick += 1;
        self.elapsed_ms += dt_ms;
    }
}
