//! Targeting strategies.
//!
//! Every function here is referentially pure given `(snapshot, actor)`: no
//! RNG, no mutation. Randomised strategies return a weighted candidate list
//! and the caller draws from it. This is what lets the same strategies drive
//! both AI decisions and player-facing recommendations.

use rand::Rng;

use partbreak_core::enums::{PartKey, TargetScope};
use partbreak_core::state::{BattleSnapshot, CombatantView};
use partbreak_core::types::{CombatantId, TargetRef};

use crate::strategy::TargetStrategy;

/// One weighted candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedTarget {
    pub target: TargetRef,
    pub weight: f64,
}

/// Output of a targeting strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetCandidates {
    Single(TargetRef),
    Weighted(Vec<WeightedTarget>),
}

impl TargetCandidates {
    /// Candidates as a weighted list (a single target has weight 1).
    pub fn into_weighted(self) -> Vec<WeightedTarget> {
        match self {
            TargetCandidates::Single(target) => vec![WeightedTarget {
                target,
                weight: 1.0,
            }],
            TargetCandidates::Weighted(list) => list,
        }
    }

    /// Keep only candidates accepted by `keep`. `None` if nothing survives.
    pub fn retain(self, mut keep: impl FnMut(&TargetRef) -> bool) -> Option<TargetCandidates> {
        match self {
            TargetCandidates::Single(target) => {
                keep(&target).then_some(TargetCandidates::Single(target))
            }
            TargetCandidates::Weighted(mut list) => {
                list.retain(|c| keep(&c.target) && c.weight > 0.0);
                (!list.is_empty()).then_some(TargetCandidates::Weighted(list))
            }
        }
    }
}

/// Resolve `strategy` for `actor`. `None` when the strategy has nothing to offer.
pub fn resolve(
    strategy: TargetStrategy,
    snapshot: &BattleSnapshot,
    actor: &CombatantView,
) -> Option<TargetCandidates> {
    match strategy {
        TargetStrategy::LowestHpPart => extreme_hp_part(snapshot, actor, |hp, best| hp < best),
        TargetStrategy::HighestHpPart => extreme_hp_part(snapshot, actor, |hp, best| hp > best),
        TargetStrategy::RandomEnemy => {
            let mut list = Vec::new();
            for enemy in snapshot.live_opponents(actor.team) {
                list.extend(uniform_parts(enemy, 1.0));
            }
            non_empty(list)
        }
        TargetStrategy::RandomEnemyPart => {
            let list: Vec<WeightedTarget> = snapshot
                .live_opponents(actor.team)
                .flat_map(|enemy| {
                    live_part_keys(enemy).map(move |key| WeightedTarget {
                        target: TargetRef::new(enemy.id, key),
                        weight: 1.0,
                    })
                })
                .collect();
            non_empty(list)
        }
        TargetStrategy::LastAttacker => {
            let attacker = actor.battle_log.last_attacked_by?;
            whole_combatant(snapshot, attacker)
        }
        TargetStrategy::LeaderAttacker => {
            let attacker = snapshot
                .team_history
                .get(actor.team)
                .leader_last_attacked_by?;
            whole_combatant(snapshot, attacker)
        }
        TargetStrategy::PreviousTarget => actor.battle_log.last_attack.map(TargetCandidates::Single),
        TargetStrategy::TeamTarget => snapshot
            .team_history
            .get(actor.team)
            .last_attack
            .map(TargetCandidates::Single),
        TargetStrategy::EnemyLeader => {
            let leader = snapshot.leader(actor.team.opponent())?;
            whole_combatant(snapshot, leader.id)
        }
        TargetStrategy::MostDamagedAlly => most_damaged_ally(snapshot, actor),
        TargetStrategy::Myself => Some(TargetCandidates::Single(TargetRef::new(
            actor.id,
            PartKey::Head,
        ))),
    }
}

/// Draw one target. Weighted lists are sampled proportionally to weight.
pub fn pick<R: Rng>(candidates: &TargetCandidates, rng: &mut R) -> Option<TargetRef> {
    match candidates {
        TargetCandidates::Single(target) => Some(*target),
        TargetCandidates::Weighted(list) => {
            let total: f64 = list.iter().map(|c| c.weight.max(0.0)).sum();
            if total <= 0.0 {
                return None;
            }
            let mut roll = rng.gen_range(0.0..total);
            for candidate in list {
                let weight = candidate.weight.max(0.0);
                if roll < weight {
                    return Some(candidate.target);
                }
                roll -= weight;
            }
            list.last().map(|c| c.target)
        }
    }
}

/// Target exists, is alive, and the named part is not broken.
pub fn is_live_target(snapshot: &BattleSnapshot, target: &TargetRef) -> bool {
    snapshot
        .combatant(target.target_id)
        .is_some_and(|c| !c.is_dead() && !c.parts.get(target.part_key).is_broken)
}

/// Target lies on the side `scope` allows, from `actor`'s point of view.
pub fn in_scope(
    snapshot: &BattleSnapshot,
    actor: &CombatantView,
    scope: TargetScope,
    target: &TargetRef,
) -> bool {
    let Some(target_view) = snapshot.combatant(target.target_id) else {
        return false;
    };
    match scope {
        TargetScope::EnemySingle => target_view.team != actor.team,
        TargetScope::AllySingle | TargetScope::AllyTeam => target_view.team == actor.team,
        TargetScope::SelfOnly => target_view.id == actor.id,
    }
}

fn live_part_keys(combatant: &CombatantView) -> impl Iterator<Item = PartKey> + '_ {
    combatant
        .parts
        .iter()
        .filter(|(_, part)| !part.is_broken)
        .map(|(key, _)| key)
}

/// Spread `total_weight` evenly over the combatant's live parts.
fn uniform_parts(combatant: &CombatantView, total_weight: f64) -> Vec<WeightedTarget> {
    let keys: Vec<PartKey> = live_part_keys(combatant).collect();
    let share = total_weight / keys.len().max(1) as f64;
    keys.into_iter()
        .map(|key| WeightedTarget {
            target: TargetRef::new(combatant.id, key),
            weight: share,
        })
        .collect()
}

fn whole_combatant(snapshot: &BattleSnapshot, id: CombatantId) -> Option<TargetCandidates> {
    let combatant = snapshot.combatant(id)?;
    if combatant.is_dead() {
        return None;
    }
    non_empty(uniform_parts(combatant, 1.0))
}

/// Scan live enemies in id order, parts in part order; first strict winner is kept.
fn extreme_hp_part(
    snapshot: &BattleSnapshot,
    actor: &CombatantView,
    better: impl Fn(i32, i32) -> bool,
) -> Option<TargetCandidates> {
    let mut best: Option<(TargetRef, i32)> = None;
    for enemy in snapshot.live_opponents(actor.team) {
        for (key, part) in enemy.parts.iter() {
            if part.is_broken {
                continue;
            }
            let replace = match best {
                None => true,
                Some((_, best_hp)) => better(part.hp, best_hp),
            };
            if replace {
                best = Some((TargetRef::new(enemy.id, key), part.hp));
            }
        }
    }
    best.map(|(target, _)| TargetCandidates::Single(target))
}

fn most_damaged_ally(snapshot: &BattleSnapshot, actor: &CombatantView) -> Option<TargetCandidates> {
    let mut best: Option<(TargetRef, f64)> = None;
    for ally in snapshot.live_members(actor.team) {
        for (key, part) in ally.parts.iter() {
            if !part.is_damaged() || part.max_hp <= 0 {
                continue;
            }
            let ratio = part.hp as f64 / part.max_hp as f64;
            if best.map_or(true, |(_, best_ratio)| ratio < best_ratio) {
                best = Some((TargetRef::new(ally.id, key), ratio));
            }
        }
    }
    best.map(|(target, _)| TargetCandidates::Single(target))
}

fn non_empty(list: Vec<WeightedTarget>) -> Option<TargetCandidates> {
    (!list.is_empty()).then_some(TargetCandidates::Weighted(list))
}
