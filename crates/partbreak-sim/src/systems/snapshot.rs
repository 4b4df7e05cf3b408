//! Snapshot system: queries the ECS world and builds a complete BattleSnapshot.
//!
//! This system is read-only; it never modifies the world.

use hecs::World;

use partbreak_core::components::*;
use partbreak_core::enums::CombatantState;
use partbreak_core::state::{BattleSnapshot, CombatantView};
use partbreak_core::types::{CombatantId, SimTime};

use crate::context::BattleContext;

/// Build a complete BattleSnapshot from the current world and context.
pub fn build_snapshot(world: &World, context: &BattleContext, time: &SimTime) -> BattleSnapshot {
    BattleSnapshot {
        time: *time,
        phase: context.phase,
        turn_number: context.turn.number,
        winning_team: context.winning_team,
        combatants: build_combatants(world, context),
        team_history: context.history.teams,
    }
}

/// One view per combatant, ordered by id.
fn build_combatants(world: &World, context: &BattleContext) -> Vec<CombatantView> {
    let mut combatants: Vec<CombatantView> = world
        .query::<(
            &CombatantId,
            &Profile,
            &Medal,
            &CombatantState,
            &Parts,
            &Gauge,
            &Action,
            &ActiveEffects,
        )>()
        .iter()
        .map(
            |(_, (id, profile, medal, state, parts, gauge, action, effects))| CombatantView {
                id: *id,
                name: profile.name.clone(),
                team: profile.team,
                is_leader: profile.is_leader,
                control: profile.control,
                personality: medal.personality,
                state: *state,
                parts: parts.clone(),
                gauge: *gauge,
                action: *action,
                active_effects: effects.clone(),
                battle_log: context.history.log(*id),
            },
        )
        .collect();

    combatants.sort_by_key(|c| c.id);
    combatants
}
