//! Error types for selection, resolution and configuration.

use thiserror::Error;

use crate::enums::PartKey;
use crate::types::CombatantId;

/// Rejection of an action selection. Non-fatal: the actor is re-queued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("unknown combatant {0}")]
    UnknownCombatant(CombatantId),

    #[error("combatant {0} is not ready to select an action")]
    NotReadyToSelect(CombatantId),

    #[error("part {1} of combatant {0} is broken")]
    PartBroken(CombatantId, PartKey),

    #[error("part {1} of combatant {0} has no action")]
    PartHasNoAction(CombatantId, PartKey),

    #[error("part {1} of combatant {0} needs a target")]
    TargetRequired(CombatantId, PartKey),

    #[error("target {0} is gone or functionally dead")]
    TargetLost(CombatantId),

    #[error("part {1} of target {0} is broken")]
    TargetPartBroken(CombatantId, PartKey),

    #[error("target {0} is outside the action's scope")]
    TargetOutOfScope(CombatantId),
}

/// Invariant violation while resolving an action. Fatal for that action only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unknown combatant {0}")]
    UnknownCombatant(CombatantId),

    #[error("combatant {0} has no {1} component")]
    MissingComponent(CombatantId, &'static str),

    #[error("combatant {0} has no pending action")]
    NoPendingAction(CombatantId),
}

/// Failure to load or validate a `BattleConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
