//! Commands sent from the host (player input or frontend) to the battle.
//!
//! Commands are queued and processed at the start of the next update.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::loadout::CombatantLoadout;
use crate::types::{CombatantId, TargetRef};

/// All external inputs to the battle core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BattleCommand {
    // --- Setup ---
    /// Use a built-in roster for the next battle.
    SelectScenario { scenario: ScenarioId },
    /// Use a caller-supplied roster for the next battle.
    LoadRoster { roster: Vec<CombatantLoadout> },
    /// Spawn the roster and begin the battle.
    StartBattle,

    // --- Selection ---
    /// Choose the action for a combatant that is ready to select.
    SelectAction {
        combatant_id: CombatantId,
        part_key: PartKey,
        target: Option<TargetRef>,
    },

    // --- Simulation control ---
    Pause,
    Resume,
    /// Tear the battle down and return to idle.
    Reset,
}
