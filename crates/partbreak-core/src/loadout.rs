//! Static combatant definitions used to populate a battle.

use serde::{Deserialize, Serialize};

use crate::components::{ActionStats, LegStats, Part, PartStats, Parts};
use crate::enums::{ControlMode, Personality, TeamId};

/// Everything needed to spawn one combatant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantLoadout {
    pub name: String,
    pub team: TeamId,
    #[serde(default)]
    pub is_leader: bool,
    #[serde(default)]
    pub control: ControlMode,
    pub personality: Personality,
    pub head: PartLoadout<ActionStats>,
    pub right_arm: PartLoadout<ActionStats>,
    pub left_arm: PartLoadout<ActionStats>,
    pub legs: PartLoadout<LegStats>,
}

/// HP and stats of one part.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartLoadout<S> {
    pub hp: i32,
    pub stats: S,
}

impl<S> PartLoadout<S> {
    pub fn new(hp: i32, stats: S) -> Self {
        Self { hp, stats }
    }
}

impl CombatantLoadout {
    /// Build the full-HP `Parts` component.
    pub fn build_parts(&self) -> Parts {
        Parts {
            head: Part::new(self.head.hp, PartStats::Action(self.head.stats)),
            right_arm: Part::new(self.right_arm.hp, PartStats::Action(self.right_arm.stats)),
            left_arm: Part::new(self.left_arm.hp, PartStats::Action(self.left_arm.stats)),
            legs: Part::new(self.legs.hp, PartStats::Legs(self.legs.stats)),
        }
    }
}
