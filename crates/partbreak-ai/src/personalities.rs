//! Personality registry.
//!
//! Maps each `Personality` to its strategy set. Built-in sets are static;
//! configuration may replace any of them with string-keyed routines, which
//! are checked once by `validate` when the battle starts.

use std::collections::BTreeMap;

use partbreak_core::config::PersonalityOverride;
use partbreak_core::enums::Personality;
use partbreak_core::events::{AiDiagnostic, DiagnosticKind};

use crate::strategy::{
    ConditionKey, PartStrategy, Routine, StrategyKey, StrategySet, TargetStrategy,
};

/// Built-in strategy set for a personality.
pub fn builtin_set(personality: Personality) -> StrategySet {
    use PartStrategy::*;
    use TargetStrategy::*;

    match personality {
        Personality::Hunter => single(PowerfulAttack, LowestHpPart),
        Personality::Crusher => single(PowerfulAttack, HighestHpPart),
        Personality::Joker => single(RandomAttack, RandomEnemyPart),
        Personality::Counter => single(PowerfulAttack, LastAttacker),
        Personality::Guard => single(PowerfulAttack, LeaderAttacker),
        Personality::Focus => single(PowerfulAttack, PreviousTarget),
        Personality::Assist => single(PowerfulAttack, TeamTarget),
        Personality::LeaderFocus => single(PowerfulAttack, EnemyLeader),
        Personality::Healer => StrategySet::new(
            vec![
                Routine::when(ConditionKey::AnyAllyDamaged, HealPart, MostDamagedAlly),
                Routine::when(ConditionKey::AllyTeamUnbuffed, SupportPart, Myself),
            ],
            RandomEnemy,
        ),
        Personality::Random => StrategySet::new(Vec::new(), RandomEnemy),
    }
}

/// One unconditional routine with the random-enemy fallback.
fn single(part: PartStrategy, target: TargetStrategy) -> StrategySet {
    StrategySet::new(vec![Routine::new(part, target)], TargetStrategy::RandomEnemy)
}

/// Parse a configured override into a strategy set. Unknown keys are kept.
pub fn parse_override(def: &PersonalityOverride) -> StrategySet {
    StrategySet {
        routines: def
            .routines
            .iter()
            .map(|r| Routine {
                condition: r.condition.as_deref().map(StrategyKey::parse),
                part: StrategyKey::parse(&r.part),
                target: StrategyKey::parse(&r.target),
            })
            .collect(),
        fallback: StrategyKey::parse(&def.fallback),
    }
}

/// Personality → strategy set table.
#[derive(Debug, Clone)]
pub struct PersonalityRegistry {
    sets: BTreeMap<Personality, StrategySet>,
}

impl Default for PersonalityRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PersonalityRegistry {
    /// Registry with every built-in personality.
    pub fn builtin() -> Self {
        Self {
            sets: Personality::ALL
                .into_iter()
                .map(|p| (p, builtin_set(p)))
                .collect(),
        }
    }

    /// Built-ins, with the configured overrides replacing their personalities.
    pub fn with_overrides(overrides: &[PersonalityOverride]) -> Self {
        let mut registry = Self::builtin();
        for def in overrides {
            registry.register(def.personality, parse_override(def));
        }
        registry
    }

    pub fn register(&mut self, personality: Personality, set: StrategySet) {
        self.sets.insert(personality, set);
    }

    pub fn strategy_set(&self, personality: Personality) -> StrategySet {
        self.sets
            .get(&personality)
            .cloned()
            .unwrap_or_else(|| builtin_set(personality))
    }

    /// Every unknown key in the table. Empty means the table is fully resolvable.
    pub fn validate(&self) -> Vec<AiDiagnostic> {
        let mut diagnostics = Vec::new();
        for (&personality, set) in &self.sets {
            for (index, routine) in set.routines.iter().enumerate() {
                diagnostics.extend(
                    routine_diagnostics(routine)
                        .into_iter()
                        .map(|kind| AiDiagnostic {
                            personality,
                            routine_index: Some(index),
                            kind,
                        }),
                );
            }
            if let StrategyKey::Unknown(key) = &set.fallback {
                diagnostics.push(AiDiagnostic {
                    personality,
                    routine_index: None,
                    kind: DiagnosticKind::UnknownFallback(key.clone()),
                });
            }
        }
        diagnostics
    }
}

/// Unknown keys in one routine, in condition/part/target order.
pub fn routine_diagnostics(routine: &Routine) -> Vec<DiagnosticKind> {
    let mut kinds = Vec::new();
    if let Some(StrategyKey::Unknown(key)) = &routine.condition {
        kinds.push(DiagnosticKind::UnknownCondition(key.clone()));
    }
    if let StrategyKey::Unknown(key) = &routine.part {
        kinds.push(DiagnosticKind::UnknownPartStrategy(key.clone()));
    }
    if let StrategyKey::Unknown(key) = &routine.target {
        kinds.push(DiagnosticKind::UnknownTargetStrategy(key.clone()));
    }
    kinds
}
