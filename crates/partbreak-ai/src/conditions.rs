//! Routine conditions: pure predicates over the battlefield.

use partbreak_core::enums::EffectType;
use partbreak_core::state::{BattleSnapshot, CombatantView};

use crate::strategy::ConditionKey;

/// Evaluate a condition for `actor`.
pub fn evaluate(condition: ConditionKey, snapshot: &BattleSnapshot, actor: &CombatantView) -> bool {
    match condition {
        ConditionKey::AnyAllyDamaged => snapshot
            .live_members(actor.team)
            .any(|ally| ally.parts.iter().any(|(_, part)| part.is_damaged())),
        ConditionKey::SelfDamaged => actor.parts.iter().any(|(_, part)| part.is_damaged()),
        ConditionKey::AllyTeamUnbuffed => !snapshot
            .live_members(actor.team)
            .any(|ally| ally.active_effects.has(EffectType::ApplyScan)),
        ConditionKey::LeaderAlive => snapshot
            .leader(actor.team)
            .is_some_and(|leader| !leader.is_dead()),
        ConditionKey::EnemyLeaderAlive => snapshot
            .leader(actor.team.opponent())
            .is_some_and(|leader| !leader.is_dead()),
    }
}
