//! Cancellation system: invalidates pending actions the battlefield has
//! overtaken.
//!
//! Checks are polled: once when an actor comes up for execution, and over
//! every pending action after each resolved one.

use std::collections::BTreeMap;

use hecs::{Entity, World};
use tracing::debug;

use partbreak_core::components::{Action, Gauge, Parts};
use partbreak_core::enums::{CancelReason, CombatantState, TargetTiming};
use partbreak_core::events::ActionResult;
use partbreak_core::types::CombatantId;

use crate::context::TurnContext;

/// Why the pending action of `actor_id` can no longer run, if it can't.
pub fn check(
    world: &World,
    index: &BTreeMap<CombatantId, Entity>,
    actor_id: CombatantId,
) -> Option<CancelReason> {
    let entity = *index.get(&actor_id)?;
    let action = *world.get::<&Action>(entity).ok()?;
    let part_key = action.part_key?;
    let parts = world.get::<&Parts>(entity).ok()?;

    let part = parts.get(part_key);
    if part.is_broken {
        return Some(CancelReason::PartBroken);
    }
    let stats = part.action()?;
    if stats.target_timing == TargetTiming::Post || !stats.target_scope.requires_target() {
        return None;
    }

    let Some(target_id) = action.target_id else {
        return Some(CancelReason::TargetLost);
    };
    let Some(target_parts) = index
        .get(&target_id)
        .and_then(|&target| world.get::<&Parts>(target).ok())
    else {
        return Some(CancelReason::TargetLost);
    };
    if target_parts.is_dead() {
        return Some(CancelReason::TargetLost);
    }
    match action.target_part_key {
        Some(key) if target_parts.get(key).is_broken => Some(CancelReason::TargetLost),
        _ => None,
    }
}

/// Cancel the pending action of `actor_id`: cool down from the inverted
/// gauge, clear the action, leave both queues.
pub fn cancel(
    world: &mut World,
    index: &BTreeMap<CombatantId, Entity>,
    turn: &mut TurnContext,
    actor_id: CombatantId,
    reason: CancelReason,
) -> Option<ActionResult> {
    let entity = *index.get(&actor_id)?;
    let (state, gauge, action) = world
        .query_one_mut::<(&mut CombatantState, &mut Gauge, &mut Action)>(entity)
        .ok()?;

    let result = ActionResult::cancelled(actor_id, action.part_key, action.target_id, reason);
    *state = CombatantState::CooldownCharging;
    gauge.invert();
    action.clear();
    turn.dequeue(actor_id);

    debug!(actor = %actor_id, ?reason, gauge = gauge.value, "action cancelled");
    Some(result)
}

/// Cancel every pending action that is no longer valid, in id order.
pub fn run(
    world: &mut World,
    index: &BTreeMap<CombatantId, Entity>,
    turn: &mut TurnContext,
) -> Vec<ActionResult> {
    let mut pending: Vec<CombatantId> = world
        .query::<(&CombatantId, &CombatantState)>()
        .iter()
        .filter(|(_, (_, state))| {
            matches!(
                state,
                CombatantState::SelectedCharging | CombatantState::ReadyToExecute
            )
        })
        .map(|(_, (id, _))| *id)
        .collect();
    pending.sort();

    let mut cancelled = Vec::new();
    for id in pending {
        if let Some(reason) = check(world, index, id) {
            cancelled.extend(cancel(world, index, turn, id, reason));
        }
    }
    cancelled
}
