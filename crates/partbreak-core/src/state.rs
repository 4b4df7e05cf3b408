//! Battle state snapshot: the complete observable world.
//!
//! The snapshot is what the frontend renders and also what the AI reads, so
//! decisions and player recommendations see exactly the same state.

use serde::{Deserialize, Serialize};

use crate::components::{Action, ActiveEffects, BattleLog, Gauge, Parts};
use crate::enums::*;
use crate::types::{AttackRecord, CombatantId, SimTime};

/// Attack history of one team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    /// Last attack this team landed.
    pub last_attack: Option<AttackRecord>,
    /// Last enemy that attacked this team's leader.
    pub leader_last_attacked_by: Option<CombatantId>,
}

/// Attack history of both teams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamHistory {
    pub team1: TeamRecord,
    pub team2: TeamRecord,
}

impl TeamHistory {
    pub fn get(&self, team: TeamId) -> &TeamRecord {
        match team {
            TeamId::Team1 => &self.team1,
            TeamId::Team2 => &self.team2,
        }
    }

    pub fn get_mut(&mut self, team: TeamId) -> &mut TeamRecord {
        match team {
            TeamId::Team1 => &mut self.team1,
            TeamId::Team2 => &mut self.team2,
        }
    }
}

/// One combatant as seen from outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantView {
    pub id: CombatantId,
    pub name: String,
    pub team: TeamId,
    pub is_leader: bool,
    pub control: ControlMode,
    pub personality: Personality,
    pub state: CombatantState,
    pub parts: Parts,
    pub gauge: Gauge,
    pub action: Action,
    pub active_effects: ActiveEffects,
    pub battle_log: BattleLog,
}

impl CombatantView {
    pub fn is_dead(&self) -> bool {
        self.parts.is_dead()
    }
}

/// Complete battle state returned by `BattleEngine::snapshot`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub time: SimTime,
    pub phase: BattlePhase,
    pub turn_number: u32,
    pub winning_team: Option<TeamId>,
    /// Ordered by id.
    pub combatants: Vec<CombatantView>,
    pub team_history: TeamHistory,
}

impl BattleSnapshot {
    pub fn combatant(&self, id: CombatantId) -> Option<&CombatantView> {
        self.combatants.iter().find(|c| c.id == id)
    }

    /// Live combatants on the given team.
    pub fn live_members(&self, team: TeamId) -> impl Iterator<Item = &CombatantView> {
        self.combatants
            .iter()
            .filter(move |c| c.team == team && !c.is_dead())
    }

    /// Live combatants opposing the given team.
    pub fn live_opponents(&self, team: TeamId) -> impl Iterator<Item = &CombatantView> {
        self.live_members(team.opponent())
    }

    pub fn leader(&self, team: TeamId) -> Option<&CombatantView> {
        self.combatants
            .iter()
            .find(|c| c.team == team && c.is_leader)
    }
}
