//! Player-assist target recommendations.
//!
//! Runs the actor's own personality strategies against the snapshot without
//! drawing from the RNG, so asking for hints never perturbs the battle.

use std::cmp::Ordering;

use partbreak_core::enums::PartKey;
use partbreak_core::state::BattleSnapshot;
use partbreak_core::types::{CombatantId, TargetRef};

use crate::decision::candidates_for_part;
use crate::personalities::PersonalityRegistry;

/// One recommended target with its normalised likelihood.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetHint {
    pub target: TargetRef,
    /// Share of the candidate pool, summing to 1 across a result.
    pub weight: f64,
    /// Routine that produced the hint, `None` for the fallback.
    pub routine_index: Option<usize>,
}

/// Recommended targets for `actor_id` using `part_key`, most likely first.
/// Empty when the actor or part cannot act, or no valid target exists.
pub fn recommend_targets(
    snapshot: &BattleSnapshot,
    actor_id: CombatantId,
    part_key: PartKey,
    registry: &PersonalityRegistry,
) -> Vec<TargetHint> {
    let Some(actor) = snapshot.combatant(actor_id) else {
        return Vec::new();
    };
    let part = actor.parts.get(part_key);
    let Some(stats) = part.action().copied() else {
        return Vec::new();
    };
    if actor.is_dead() || part.is_broken {
        return Vec::new();
    }

    if !stats.target_scope.requires_target() {
        return vec![TargetHint {
            target: TargetRef::new(actor.id, PartKey::Head),
            weight: 1.0,
            routine_index: None,
        }];
    }

    let Some((routine_index, candidates)) = candidates_for_part(snapshot, actor, registry, &stats)
    else {
        return Vec::new();
    };
    let weighted = candidates.into_weighted();
    let total: f64 = weighted.iter().map(|c| c.weight).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut hints: Vec<TargetHint> = weighted
        .into_iter()
        .map(|c| TargetHint {
            target: c.target,
            weight: c.weight / total,
            routine_index,
        })
        .collect();
    hints.sort_by(|a, b| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap_or(Ordering::Equal)
            .then(a.target.target_id.cmp(&b.target.target_id))
            .then(a.target.part_key.cmp(&b.target.part_key))
    });
    hints
}
