//! Selection system: validates and commits a chosen action.
//!
//! AI output and player input both come through here, so both are held to
//! the same rules.

use std::collections::BTreeMap;

use hecs::{Entity, World};

use partbreak_core::components::{Action, Gauge, Parts, Profile};
use partbreak_core::config::GaugeConfig;
use partbreak_core::enums::{CombatantState, PartKey, TargetScope, TargetTiming};
use partbreak_core::error::SelectionError;
use partbreak_core::types::{CombatantId, TargetRef};

use super::gauge::speed_multiplier;

/// A validated selection ready to commit.
#[derive(Debug, Clone, Copy)]
pub struct ValidSelection {
    pub entity: Entity,
    pub action: Action,
    pub speed_multiplier: f64,
}

/// Check a selection against the current world.
///
/// Post-timing parts drop any supplied target: theirs is picked at execution.
/// Team- and self-scoped parts need none.
pub fn validate(
    world: &World,
    index: &BTreeMap<CombatantId, Entity>,
    config: &GaugeConfig,
    actor_id: CombatantId,
    part_key: PartKey,
    target: Option<TargetRef>,
) -> Result<ValidSelection, SelectionError> {
    let entity = *index
        .get(&actor_id)
        .ok_or(SelectionError::UnknownCombatant(actor_id))?;
    let state = world
        .get::<&CombatantState>(entity)
        .map_err(|_| SelectionError::UnknownCombatant(actor_id))?;
    if *state != CombatantState::ReadyToSelect {
        return Err(SelectionError::NotReadyToSelect(actor_id));
    }

    let parts = world
        .get::<&Parts>(entity)
        .map_err(|_| SelectionError::UnknownCombatant(actor_id))?;
    let part = parts.get(part_key);
    if part.is_broken {
        return Err(SelectionError::PartBroken(actor_id, part_key));
    }
    let stats = *part
        .action()
        .ok_or(SelectionError::PartHasNoAction(actor_id, part_key))?;

    let mut action = Action {
        part_key: Some(part_key),
        target_id: None,
        target_part_key: None,
    };

    if stats.target_scope.requires_target() && stats.target_timing == TargetTiming::Pre {
        let target = target.ok_or(SelectionError::TargetRequired(actor_id, part_key))?;
        let target_entity = *index
            .get(&target.target_id)
            .ok_or(SelectionError::TargetLost(target.target_id))?;
        let target_parts = world
            .get::<&Parts>(target_entity)
            .map_err(|_| SelectionError::TargetLost(target.target_id))?;
        if target_parts.is_dead() {
            return Err(SelectionError::TargetLost(target.target_id));
        }
        if target_parts.get(target.part_key).is_broken {
            return Err(SelectionError::TargetPartBroken(
                target.target_id,
                target.part_key,
            ));
        }

        let actor_team = world
            .get::<&Profile>(entity)
            .map_err(|_| SelectionError::UnknownCombatant(actor_id))?
            .team;
        let target_team = world
            .get::<&Profile>(target_entity)
            .map_err(|_| SelectionError::TargetLost(target.target_id))?
            .team;
        let in_scope = match stats.target_scope {
            TargetScope::EnemySingle => target_team != actor_team,
            _ => target_team == actor_team,
        };
        if !in_scope {
            return Err(SelectionError::TargetOutOfScope(target.target_id));
        }

        action.target_id = Some(target.target_id);
        action.target_part_key = Some(target.part_key);
    }

    Ok(ValidSelection {
        entity,
        action,
        speed_multiplier: speed_multiplier(&stats, config),
    })
}

/// Store the action and start charging it from zero.
pub fn commit(world: &mut World, selection: ValidSelection) {
    if let Ok((state, gauge, action)) = world
        .query_one_mut::<(&mut CombatantState, &mut Gauge, &mut Action)>(selection.entity)
    {
        *state = CombatantState::SelectedCharging;
        gauge.reset();
        gauge.speed_multiplier = selection.speed_multiplier;
        *action = selection.action;
    }
}
