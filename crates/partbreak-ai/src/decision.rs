//! AI decision engine.
//!
//! Walks a personality's routines in order. The first routine whose
//! condition holds and which yields both a usable part and a live, in-scope
//! target wins. Otherwise the fallback targeting key is used with a random
//! usable part, which always resolves while an enemy is alive.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use partbreak_core::components::ActionStats;
use partbreak_core::enums::{PartKey, TargetScope};
use partbreak_core::events::{AiDiagnostic, DiagnosticKind};
use partbreak_core::state::{BattleSnapshot, CombatantView};
use partbreak_core::types::{CombatantId, TargetRef};

use crate::conditions;
use crate::parts;
use crate::personalities::{routine_diagnostics, PersonalityRegistry};
use crate::strategy::{
    ConditionKey, PartStrategy, Routine, StrategyKey, StrategySet, TargetStrategy,
};
use crate::targeting::{self, TargetCandidates};

/// A chosen action for one combatant.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub part_key: PartKey,
    /// Always set. Self- and team-scoped actions target the actor's head.
    pub target: TargetRef,
    /// Winning routine, `None` when the fallback was used.
    pub routine_index: Option<usize>,
    /// Unknown keys encountered on the way.
    pub diagnostics: Vec<AiDiagnostic>,
}

/// Choose an action for `actor_id`. `None` only if the actor is unknown,
/// dead, or has no usable part left.
pub fn determine_action<R: Rng>(
    snapshot: &BattleSnapshot,
    actor_id: CombatantId,
    registry: &PersonalityRegistry,
    rng: &mut R,
) -> Option<Decision> {
    let actor = snapshot.combatant(actor_id)?;
    if actor.is_dead() {
        return None;
    }
    let set = registry.strategy_set(actor.personality);
    let mut diagnostics = Vec::new();

    for (index, routine) in set.routines.iter().enumerate() {
        let Some((condition, part_strategy, target_strategy)) =
            known_keys(actor, index, routine, &mut diagnostics)
        else {
            continue;
        };
        if let Some(condition) = condition {
            if !conditions::evaluate(condition, snapshot, actor) {
                continue;
            }
        }
        let Some(part_key) = parts::select_part(part_strategy, actor, rng) else {
            continue;
        };
        let Some(stats) = action_stats(actor, part_key) else {
            continue;
        };
        let Some(target) = target_for(snapshot, actor, &stats, target_strategy, rng) else {
            continue;
        };

        debug!(
            actor = %actor_id,
            personality = %actor.personality,
            routine = index,
            part = %part_key,
            target = %target.target_id,
            "routine selected action"
        );
        return Some(Decision {
            part_key,
            target,
            routine_index: Some(index),
            diagnostics,
        });
    }

    let fallback = fallback_strategy(actor, &set, &mut diagnostics);
    let usable = parts::usable_parts(actor);
    let offensive: Vec<(PartKey, ActionStats)> = usable
        .iter()
        .copied()
        .filter(|(_, stats)| stats.target_scope == TargetScope::EnemySingle)
        .collect();
    let (part_key, stats) = if offensive.is_empty() {
        *usable.choose(rng)?
    } else {
        *offensive.choose(rng)?
    };

    let target = match stats.target_scope {
        TargetScope::EnemySingle => target_for(snapshot, actor, &stats, fallback, rng)
            .or_else(|| target_for(snapshot, actor, &stats, TargetStrategy::RandomEnemy, rng))?,
        TargetScope::AllySingle => {
            target_for(snapshot, actor, &stats, TargetStrategy::MostDamagedAlly, rng)
                .unwrap_or_else(|| own_head(actor))
        }
        TargetScope::AllyTeam | TargetScope::SelfOnly => own_head(actor),
    };

    debug!(
        actor = %actor_id,
        personality = %actor.personality,
        part = %part_key,
        target = %target.target_id,
        "fallback selected action"
    );
    Some(Decision {
        part_key,
        target,
        routine_index: None,
        diagnostics,
    })
}

/// Pick an execution-time target for a post-timing part, reusing the actor's
/// targeting strategies against the current battlefield.
pub fn retarget<R: Rng>(
    snapshot: &BattleSnapshot,
    actor_id: CombatantId,
    part_key: PartKey,
    registry: &PersonalityRegistry,
    rng: &mut R,
) -> Option<TargetRef> {
    let actor = snapshot.combatant(actor_id)?;
    let stats = action_stats(actor, part_key)?;
    if !stats.target_scope.requires_target() {
        return Some(own_head(actor));
    }
    let (_, candidates) = candidates_for_part(snapshot, actor, registry, &stats)?;
    targeting::pick(&candidates, rng)
}

/// Pure candidate search used for retargeting and for player hints: the
/// first applicable routine's targets, else the fallback's, else any enemy.
pub fn candidates_for_part(
    snapshot: &BattleSnapshot,
    actor: &CombatantView,
    registry: &PersonalityRegistry,
    stats: &ActionStats,
) -> Option<(Option<usize>, TargetCandidates)> {
    let set = registry.strategy_set(actor.personality);
    let mut ignored = Vec::new();

    for (index, routine) in set.routines.iter().enumerate() {
        let Some((condition, _, target_strategy)) =
            known_keys(actor, index, routine, &mut ignored)
        else {
            continue;
        };
        if condition.is_some_and(|c| !conditions::evaluate(c, snapshot, actor)) {
            continue;
        }
        if let Some(candidates) = valid_candidates(snapshot, actor, stats, target_strategy) {
            return Some((Some(index), candidates));
        }
    }

    let fallback = fallback_strategy(actor, &set, &mut ignored);
    valid_candidates(snapshot, actor, stats, fallback)
        .or_else(|| {
            let default = match stats.target_scope {
                TargetScope::AllySingle => TargetStrategy::MostDamagedAlly,
                _ => TargetStrategy::RandomEnemy,
            };
            valid_candidates(snapshot, actor, stats, default)
        })
        .map(|candidates| (None, candidates))
}

type KnownRoutine = (Option<ConditionKey>, PartStrategy, TargetStrategy);

/// All keys of the routine, or `None` after recording a diagnostic per unknown key.
fn known_keys(
    actor: &CombatantView,
    index: usize,
    routine: &Routine,
    diagnostics: &mut Vec<AiDiagnostic>,
) -> Option<KnownRoutine> {
    let unknown = routine_diagnostics(routine);
    if !unknown.is_empty() {
        for kind in unknown {
            warn!(
                actor = %actor.id,
                personality = %actor.personality,
                routine = index,
                ?kind,
                "skipping routine with unknown strategy key"
            );
            diagnostics.push(AiDiagnostic {
                personality: actor.personality,
                routine_index: Some(index),
                kind,
            });
        }
        return None;
    }

    let condition = match &routine.condition {
        Some(StrategyKey::Known(c)) => Some(*c),
        _ => None,
    };
    match (&routine.part, &routine.target) {
        (StrategyKey::Known(part), StrategyKey::Known(target)) => Some((condition, *part, *target)),
        _ => None,
    }
}

fn fallback_strategy(
    actor: &CombatantView,
    set: &StrategySet,
    diagnostics: &mut Vec<AiDiagnostic>,
) -> TargetStrategy {
    match &set.fallback {
        StrategyKey::Known(strategy) => *strategy,
        StrategyKey::Unknown(key) => {
            warn!(
                actor = %actor.id,
                personality = %actor.personality,
                key = %key,
                "unknown fallback key, using RandomEnemy"
            );
            diagnostics.push(AiDiagnostic {
                personality: actor.personality,
                routine_index: None,
                kind: DiagnosticKind::UnknownFallback(key.clone()),
            });
            TargetStrategy::RandomEnemy
        }
    }
}

fn valid_candidates(
    snapshot: &BattleSnapshot,
    actor: &CombatantView,
    stats: &ActionStats,
    strategy: TargetStrategy,
) -> Option<TargetCandidates> {
    targeting::resolve(strategy, snapshot, actor)?.retain(|target| {
        targeting::is_live_target(snapshot, target)
            && targeting::in_scope(snapshot, actor, stats.target_scope, target)
    })
}

fn target_for<R: Rng>(
    snapshot: &BattleSnapshot,
    actor: &CombatantView,
    stats: &ActionStats,
    strategy: TargetStrategy,
    rng: &mut R,
) -> Option<TargetRef> {
    if !stats.target_scope.requires_target() {
        return Some(own_head(actor));
    }
    let candidates = valid_candidates(snapshot, actor, stats, strategy)?;
    targeting::pick(&candidates, rng)
}

fn action_stats(actor: &CombatantView, part_key: PartKey) -> Option<ActionStats> {
    let part = actor.parts.get(part_key);
    if part.is_broken {
        return None;
    }
    part.action().copied()
}

fn own_head(actor: &CombatantView) -> TargetRef {
    TargetRef::new(actor.id, PartKey::Head)
}
