//! Strategy keys, routines and strategy sets.
//!
//! Keys are closed enums. Personalities authored as data carry string keys
//! that are parsed into `StrategyKey`; anything that fails to parse is kept
//! as `Unknown` so the routine can be skipped with a diagnostic instead of
//! failing the whole personality.

use std::str::FromStr;

use strum::{Display, EnumString};

/// Predicate over the battlefield that gates a routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum ConditionKey {
    /// Some live ally (self included) has a damaged, unbroken part.
    AnyAllyDamaged,
    /// The actor itself has a damaged, unbroken part.
    SelfDamaged,
    /// No live ally currently has an active scan.
    AllyTeamUnbuffed,
    /// The actor's own leader is alive.
    LeaderAlive,
    /// The opposing leader is alive.
    EnemyLeaderAlive,
}

/// Rule for choosing which of the actor's parts to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum PartStrategy {
    /// Highest might among damage-dealing parts.
    PowerfulAttack,
    /// Highest success among damage-dealing parts.
    AccurateAttack,
    /// Uniform among damage-dealing parts.
    RandomAttack,
    /// Highest might among healing parts.
    HealPart,
    /// First support part (scan, defend).
    SupportPart,
    /// Uniform among every usable part.
    AnyUsable,
}

/// Rule for choosing a target from the current battlefield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum TargetStrategy {
    LowestHpPart,
    HighestHpPart,
    RandomEnemy,
    RandomEnemyPart,
    LastAttacker,
    LeaderAttacker,
    PreviousTarget,
    TeamTarget,
    EnemyLeader,
    MostDamagedAlly,
    Myself,
}

/// A parsed key, or the raw text of one that did not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyKey<T> {
    Known(T),
    Unknown(String),
}

impl<T: FromStr> StrategyKey<T> {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<T>() {
            Ok(key) => StrategyKey::Known(key),
            Err(_) => StrategyKey::Unknown(raw.to_string()),
        }
    }
}

impl<T> From<T> for StrategyKey<T> {
    fn from(key: T) -> Self {
        StrategyKey::Known(key)
    }
}

/// One AI decision rule: optional condition, part rule, target rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routine {
    pub condition: Option<StrategyKey<ConditionKey>>,
    pub part: StrategyKey<PartStrategy>,
    pub target: StrategyKey<TargetStrategy>,
}

impl Routine {
    /// Unconditional routine.
    pub fn new(part: PartStrategy, target: TargetStrategy) -> Self {
        Self {
            condition: None,
            part: part.into(),
            target: target.into(),
        }
    }

    /// Routine gated by a condition.
    pub fn when(condition: ConditionKey, part: PartStrategy, target: TargetStrategy) -> Self {
        Self {
            condition: Some(condition.into()),
            part: part.into(),
            target: target.into(),
        }
    }
}

/// Ordered routines plus the fallback targeting key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategySet {
    pub routines: Vec<Routine>,
    pub fallback: StrategyKey<TargetStrategy>,
}

impl StrategySet {
    pub fn new(routines: Vec<Routine>, fallback: TargetStrategy) -> Self {
        Self {
            routines,
            fallback: fallback.into(),
        }
    }
}
