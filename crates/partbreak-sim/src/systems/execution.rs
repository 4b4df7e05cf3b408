//! Execution queue ordering and post-action cooldown.

use std::cmp::Reverse;
use std::collections::VecDeque;

use hecs::{Entity, World};

use partbreak_core::components::{Action, Gauge, Parts};
use partbreak_core::enums::CombatantState;
use partbreak_core::types::CombatantId;

/// Every combatant ready to execute: faster legs first, then lower id.
pub fn build_queue(world: &World) -> VecDeque<CombatantId> {
    let mut ready: Vec<(i32, CombatantId)> = world
        .query::<(&CombatantId, &CombatantState, &Parts)>()
        .iter()
        .filter(|(_, (_, state, _))| **state == CombatantState::ReadyToExecute)
        .map(|(_, (id, _, parts))| (parts.leg_stats().propulsion, *id))
        .collect();
    ready.sort_by_key(|&(propulsion, id)| (Reverse(propulsion), id));
    ready.into_iter().map(|(_, id)| id).collect()
}

/// Whether any selected action is still charging. Cooldowns do not hold
/// the turn open.
pub fn any_pending(world: &World) -> bool {
    world
        .query::<&CombatantState>()
        .iter()
        .any(|(_, state)| *state == CombatantState::SelectedCharging)
}

/// Whether anyone has a full gauge on a selected action.
pub fn any_ready(world: &World) -> bool {
    world
        .query::<&CombatantState>()
        .iter()
        .any(|(_, state)| *state == CombatantState::ReadyToExecute)
}

/// Return the actor to cooldown from zero. `speed_multiplier` is the used
/// part's, or `None` to keep the current one.
pub fn begin_cooldown(world: &World, entity: Entity, speed_multiplier: Option<f64>) {
    if let Ok(mut state) = world.get::<&mut CombatantState>(entity) {
        if *state != CombatantState::Broken {
            *state = CombatantState::CooldownCharging;
        }
    }
    if let Ok(mut gauge) = world.get::<&mut Gauge>(entity) {
        gauge.reset();
        if let Some(multiplier) = speed_multiplier {
            gauge.speed_multiplier = multiplier;
        }
    }
    if let Ok(mut action) = world.get::<&mut Action>(entity) {
        action.clear();
    }
}
