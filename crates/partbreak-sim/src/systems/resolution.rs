//! Resolution system: turns one executing action into applied effects.
//!
//! Damage actions roll evasion, critical and defense in that order, then
//! apply the damage formula. Heal and support actions always succeed.

use std::collections::BTreeMap;

use hecs::{Entity, World};
use rand::Rng;
use tracing::debug;

use partbreak_core::components::{
    Action, ActionStats, ActiveEffect, Gauge, LegStats, Parts, Profile,
};
use partbreak_core::config::BattleConfig;
use partbreak_core::enums::*;
use partbreak_core::error::ResolveError;
use partbreak_core::events::{ActionOutcome, ActionResult, AppliedEffect, OutcomeKind};
use partbreak_core::types::{CombatantId, TargetRef};

use super::{cancellation, effects};
use crate::combat::{self, DamageInput};
use crate::context::TurnContext;

/// What one resolved action produced.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub result: ActionResult,
    /// Stats of the part used, for the cooldown multiplier.
    pub stats: ActionStats,
    /// Team of the actor, for the victory tie-break.
    pub attacker_team: TeamId,
    /// A selection cancelled by this action's interrupt.
    pub interrupted: Option<ActionResult>,
}

struct Attacker {
    id: CombatantId,
    entity: Entity,
    team: TeamId,
    part_key: PartKey,
    stats: ActionStats,
    legs: LegStats,
}

/// Resolve the pending action of `actor_id` against `target`.
///
/// `target` is the fixed selection for pre-timing parts, the freshly chosen
/// one for post-timing parts, and ignored for team or self scopes.
pub fn resolve<R: Rng>(
    world: &mut World,
    index: &BTreeMap<CombatantId, Entity>,
    config: &BattleConfig,
    rng: &mut R,
    turn: &mut TurnContext,
    actor_id: CombatantId,
    target: Option<TargetRef>,
) -> Result<Resolution, ResolveError> {
    let attacker = load_attacker(world, index, actor_id)?;
    let mut interrupted = None;

    let (outcome, applied_effects) = match attacker.stats.action_type {
        ActionType::Shoot | ActionType::Melee => {
            let target = target.ok_or(ResolveError::NoPendingAction(actor_id))?;
            attack(
                world,
                index,
                config,
                rng,
                turn,
                &attacker,
                target,
                &mut interrupted,
            )?
        }
        ActionType::Heal => heal(world, index, &attacker, target),
        ActionType::Support => support(world, config, &attacker),
    };

    let result = ActionResult {
        attacker_id: actor_id,
        part_key: Some(attacker.part_key),
        intended_target_id: target
            .filter(|_| attacker.stats.target_scope.requires_target())
            .map(|t| t.target_id),
        outcome,
        applied_effects,
        cancelled: false,
        cancel_reason: None,
    };
    Ok(Resolution {
        result,
        stats: attacker.stats,
        attacker_team: attacker.team,
        interrupted,
    })
}

fn load_attacker(
    world: &World,
    index: &BTreeMap<CombatantId, Entity>,
    id: CombatantId,
) -> Result<Attacker, ResolveError> {
    let entity = *index.get(&id).ok_or(ResolveError::UnknownCombatant(id))?;
    let action = *world
        .get::<&Action>(entity)
        .map_err(|_| ResolveError::MissingComponent(id, "Action"))?;
    let part_key = action.part_key.ok_or(ResolveError::NoPendingAction(id))?;
    let parts = world
        .get::<&Parts>(entity)
        .map_err(|_| ResolveError::MissingComponent(id, "Parts"))?;
    let stats = *parts
        .get(part_key)
        .action()
        .ok_or(ResolveError::MissingComponent(id, "ActionStats"))?;
    let team = world
        .get::<&Profile>(entity)
        .map_err(|_| ResolveError::MissingComponent(id, "Profile"))?
        .team;
    Ok(Attacker {
        id,
        entity,
        team,
        part_key,
        stats,
        legs: parts.leg_stats(),
    })
}

#[allow(clippy::too_many_arguments)]
fn attack<R: Rng>(
    world: &mut World,
    index: &BTreeMap<CombatantId, Entity>,
    config: &BattleConfig,
    rng: &mut R,
    turn: &mut TurnContext,
    attacker: &Attacker,
    target: TargetRef,
    interrupted: &mut Option<ActionResult>,
) -> Result<(ActionOutcome, Vec<AppliedEffect>), ResolveError> {
    let target_entity = *index
        .get(&target.target_id)
        .ok_or(ResolveError::UnknownCombatant(target.target_id))?;
    let target_legs = world
        .get::<&Parts>(target_entity)
        .map_err(|_| ResolveError::MissingComponent(target.target_id, "Parts"))?
        .leg_stats();
    let combat_config = &config.combat;

    let power = combat::attack_power(&attacker.stats, &attacker.legs);
    let success = power.success + effects::total(world, attacker.entity, EffectType::ApplyScan);

    let evasion = combat::evasion_chance(target_legs.mobility, success, combat_config);
    if rng.gen::<f64>() < evasion {
        debug!(attacker = %attacker.id, target = %target.target_id, evasion, "evaded");
        return Ok((
            ActionOutcome {
                struck_part: Some(target.part_key),
                ..ActionOutcome::of(OutcomeKind::Evaded)
            },
            Vec::new(),
        ));
    }

    let critical_chance = combat::critical_chance(
        success,
        target_legs.mobility,
        attacker.stats.attack_type,
        combat_config,
    );
    let is_critical = rng.gen::<f64>() < critical_chance;

    let mut struck_part = target.part_key;
    let mut is_defended = false;
    if !is_critical {
        let defend_bonus = effects::total(world, target_entity, EffectType::ApplyDefend);
        let defense = combat::defense_chance(target_legs.armor, defend_bonus, combat_config);
        if rng.gen::<f64>() < defense {
            is_defended = true;
            if let Some(guard) = guard_part(world, target_entity) {
                struck_part = guard;
            }
        }
    }

    let amount = combat::damage(
        DamageInput {
            success,
            might: power.might,
            target_mobility: target_legs.mobility,
            target_armor: target_legs.armor,
            ignores_armor: attacker.stats.ignores_armor,
            critical: is_critical,
        },
        combat_config.damage_divisor,
    );
    debug!(
        attacker = %attacker.id,
        target = %target.target_id,
        part = %struck_part,
        is_critical,
        is_defended,
        amount,
        "hit"
    );

    let mut applied = vec![apply_damage(
        world,
        turn,
        target.target_id,
        target_entity,
        struck_part,
        amount,
    )?];

    if attacker.stats.attack_type == AttackType::Disrupt {
        let charging = world
            .get::<&CombatantState>(target_entity)
            .is_ok_and(|state| *state == CombatantState::SelectedCharging);
        if charging {
            let old = gauge_value(world, target_entity);
            if let Some(result) = cancellation::cancel(
                world,
                index,
                turn,
                target.target_id,
                CancelReason::Interrupted,
            ) {
                applied.push(AppliedEffect {
                    effect_type: EffectType::Interrupt,
                    target_id: target.target_id,
                    part_key: None,
                    old_value: old,
                    new_value: gauge_value(world, target_entity),
                    is_part_broken: false,
                    is_player_broken: false,
                });
                *interrupted = Some(result);
            }
        }
    }

    Ok((
        ActionOutcome {
            kind: OutcomeKind::Hit,
            is_critical,
            is_defended,
            struck_part: Some(struck_part),
        },
        applied,
    ))
}

/// The target's highest-HP intact part other than the head; first in part order on ties.
fn guard_part(world: &World, entity: Entity) -> Option<PartKey> {
    let parts = world.get::<&Parts>(entity).ok()?;
    let mut best: Option<(PartKey, i32)> = None;
    for (key, part) in parts.iter() {
        if key == PartKey::Head || part.is_broken {
            continue;
        }
        if best.map_or(true, |(_, hp)| part.hp > hp) {
            best = Some((key, part.hp));
        }
    }
    best.map(|(key, _)| key)
}

fn gauge_value(world: &World, entity: Entity) -> i32 {
    world
        .get::<&Gauge>(entity)
        .map(|gauge| gauge.value.round() as i32)
        .unwrap_or(0)
}

/// Subtract HP from one part. A broken head takes the combatant out.
fn apply_damage(
    world: &mut World,
    turn: &mut TurnContext,
    target_id: CombatantId,
    entity: Entity,
    part_key: PartKey,
    amount: i32,
) -> Result<AppliedEffect, ResolveError> {
    let (old_value, new_value, is_part_broken, is_player_broken) = {
        let mut parts = world
            .get::<&mut Parts>(entity)
            .map_err(|_| ResolveError::MissingComponent(target_id, "Parts"))?;
        let part = parts.get_mut(part_key);
        let old = part.hp;
        part.hp = (old - amount).clamp(0, part.max_hp);
        if part.hp == 0 {
            part.is_broken = true;
        }
        let part_broken = part.is_broken;
        (old, part.hp, part_broken, part_key == PartKey::Head && part_broken)
    };

    if is_player_broken {
        if let Ok((state, gauge, action)) =
            world.query_one_mut::<(&mut CombatantState, &mut Gauge, &mut Action)>(entity)
        {
            *state = CombatantState::Broken;
            gauge.value = 0.0;
            gauge.current_speed = 0.0;
            action.clear();
        }
        turn.dequeue(target_id);
        debug!(target = %target_id, "combatant broken");
    }

    Ok(AppliedEffect {
        effect_type: EffectType::Damage,
        target_id,
        part_key: Some(part_key),
        old_value,
        new_value,
        is_part_broken,
        is_player_broken,
    })
}

/// Restore `might` HP to the most damaged intact part of the target.
fn heal(
    world: &mut World,
    index: &BTreeMap<CombatantId, Entity>,
    attacker: &Attacker,
    target: Option<TargetRef>,
) -> (ActionOutcome, Vec<AppliedEffect>) {
    let supported = ActionOutcome::of(OutcomeKind::Supported);
    let Some(target) = target else {
        return (supported, Vec::new());
    };
    let Some(&entity) = index.get(&target.target_id) else {
        return (supported, Vec::new());
    };
    let Ok(mut parts) = world.get::<&mut Parts>(entity) else {
        return (supported, Vec::new());
    };

    let mut worst: Option<(PartKey, i32)> = None;
    for (key, part) in parts.iter() {
        let missing = part.max_hp - part.hp;
        if part.is_broken || missing <= 0 {
            continue;
        }
        if worst.map_or(true, |(_, most)| missing > most) {
            worst = Some((key, missing));
        }
    }
    let Some((key, _)) = worst else {
        return (supported, Vec::new());
    };

    let part = parts.get_mut(key);
    let old = part.hp;
    part.hp = (old + attacker.stats.might.max(0)).min(part.max_hp);
    let effect = AppliedEffect {
        effect_type: EffectType::Heal,
        target_id: target.target_id,
        part_key: Some(key),
        old_value: old,
        new_value: part.hp,
        is_part_broken: false,
        is_player_broken: false,
    };
    (
        ActionOutcome {
            struck_part: Some(key),
            ..supported
        },
        vec![effect],
    )
}

/// Scan buffs every live ally; defend buffs the user.
fn support(
    world: &mut World,
    config: &BattleConfig,
    attacker: &Attacker,
) -> (ActionOutcome, Vec<AppliedEffect>) {
    let (effect_type, value, duration, recipients) = match attacker.stats.attack_type {
        AttackType::Scan => {
            let mut allies: Vec<(CombatantId, Entity)> = world
                .query::<(&CombatantId, &Profile, &Parts)>()
                .iter()
                .filter(|(_, (_, profile, parts))| {
                    profile.team == attacker.team && !parts.is_dead()
                })
                .map(|(entity, (id, _, _))| (*id, entity))
                .collect();
            allies.sort_by_key(|&(id, _)| id);
            (
                EffectType::ApplyScan,
                attacker.stats.might / 2,
                config.effects.scan_duration,
                allies,
            )
        }
        AttackType::Defend => (
            EffectType::ApplyDefend,
            attacker.stats.might,
            config.effects.defend_duration,
            vec![(attacker.id, attacker.entity)],
        ),
        _ => (EffectType::ApplyDefend, 0, 0, Vec::new()),
    };

    let mut applied = Vec::new();
    for (id, entity) in recipients {
        let effect = ActiveEffect {
            effect_type,
            value,
            duration,
        };
        if let Some((old_value, new_value)) = effects::apply(world, entity, effect) {
            applied.push(AppliedEffect {
                effect_type,
                target_id: id,
                part_key: None,
                old_value,
                new_value,
                is_part_broken: false,
                is_player_broken: false,
            });
        }
    }
    (ActionOutcome::of(OutcomeKind::Supported), applied)
}
