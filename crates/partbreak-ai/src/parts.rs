//! Part strategies: filter and sort the actor's usable parts.

use std::cmp::Reverse;

use rand::seq::SliceRandom;
use rand::Rng;

use partbreak_core::components::ActionStats;
use partbreak_core::enums::{ActionType, PartKey};
use partbreak_core::state::CombatantView;

use crate::strategy::PartStrategy;

/// Non-broken, action-carrying parts of `actor`, in part order.
pub fn usable_parts(actor: &CombatantView) -> Vec<(PartKey, ActionStats)> {
    PartKey::ACTION_PARTS
        .into_iter()
        .filter_map(|key| {
            let part = actor.parts.get(key);
            if part.is_broken {
                return None;
            }
            part.action().map(|stats| (key, *stats))
        })
        .collect()
}

/// Choose a part according to `strategy`. `None` when no part qualifies.
pub fn select_part<R: Rng>(
    strategy: PartStrategy,
    actor: &CombatantView,
    rng: &mut R,
) -> Option<PartKey> {
    let usable = usable_parts(actor);
    let damage: Vec<(PartKey, ActionStats)> = usable
        .iter()
        .copied()
        .filter(|(_, stats)| stats.action_type.is_damage())
        .collect();

    match strategy {
        PartStrategy::PowerfulAttack => damage
            .iter()
            .min_by_key(|(key, stats)| (Reverse(stats.might), *key))
            .map(|(key, _)| *key),
        PartStrategy::AccurateAttack => damage
            .iter()
            .min_by_key(|(key, stats)| (Reverse(stats.success), *key))
            .map(|(key, _)| *key),
        PartStrategy::RandomAttack => damage.choose(rng).map(|(key, _)| *key),
        PartStrategy::HealPart => usable
            .iter()
            .filter(|(_, stats)| stats.action_type == ActionType::Heal)
            .min_by_key(|(key, stats)| (Reverse(stats.might), *key))
            .map(|(key, _)| *key),
        PartStrategy::SupportPart => usable
            .iter()
            .find(|(_, stats)| stats.action_type == ActionType::Support)
            .map(|(key, _)| *key),
        PartStrategy::AnyUsable => usable.choose(rng).map(|(key, _)| *key),
    }
}
