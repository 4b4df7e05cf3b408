//! Battle context: phase, turn bookkeeping and attack history.
//!
//! Stored in `BattleEngine`, not in the ECS world. Everything is keyed by
//! `CombatantId` in ordered maps so iteration order never depends on hashing.

use std::collections::{BTreeMap, VecDeque};

use partbreak_core::components::BattleLog;
use partbreak_core::enums::{BattlePhase, TeamId};
use partbreak_core::events::ActionResult;
use partbreak_core::state::TeamHistory;
use partbreak_core::types::{CombatantId, TargetRef};

/// Per-turn scheduling state.
#[derive(Debug, Clone, Default)]
pub struct TurnContext {
    pub number: u32,
    /// Actor being executed in the current update, if any.
    pub current_actor: Option<CombatantId>,
    /// Combatants waiting to select an action, in arrival order.
    pub action_queue: VecDeque<CombatantId>,
    /// Combatants waiting to execute, sorted when the execution phase begins.
    pub execution_queue: VecDeque<CombatantId>,
    /// Results resolved during this turn.
    pub resolved_actions: Vec<ActionResult>,
}

impl TurnContext {
    /// Drop `id` from both queues.
    pub fn dequeue(&mut self, id: CombatantId) {
        self.action_queue.retain(|&queued| queued != id);
        self.execution_queue.retain(|&queued| queued != id);
    }

    /// Append to the action queue unless already present.
    pub fn enqueue_selection(&mut self, id: CombatantId) {
        if !self.action_queue.contains(&id) {
            self.action_queue.push_back(id);
        }
    }

    pub fn clear_queues(&mut self) {
        self.current_actor = None;
        self.action_queue.clear();
        self.execution_queue.clear();
    }
}

/// Attack history of every combatant and team.
#[derive(Debug, Clone, Default)]
pub struct BattleHistory {
    pub logs: BTreeMap<CombatantId, BattleLog>,
    pub teams: TeamHistory,
}

impl BattleHistory {
    pub fn log(&self, id: CombatantId) -> BattleLog {
        self.logs.get(&id).copied().unwrap_or_default()
    }

    /// The target was attacked, whether or not the attack connected.
    pub fn record_attacked(
        &mut self,
        attacker: CombatantId,
        target: CombatantId,
        target_team: TeamId,
        target_is_leader: bool,
    ) {
        self.logs.entry(target).or_default().last_attacked_by = Some(attacker);
        if target_is_leader {
            self.teams.get_mut(target_team).leader_last_attacked_by = Some(attacker);
        }
    }

    /// The attacker's latest attack, on its own log and its team's.
    pub fn record_attack(&mut self, attacker: CombatantId, attacker_team: TeamId, target: TargetRef) {
        self.logs.entry(attacker).or_default().last_attack = Some(target);
        self.teams.get_mut(attacker_team).last_attack = Some(target);
    }
}

/// All mutable battle state that is not a component.
#[derive(Debug, Clone, Default)]
pub struct BattleContext {
    pub phase: BattlePhase,
    pub turn: TurnContext,
    pub history: BattleHistory,
    pub winning_team: Option<TeamId>,
}
