//! Records emitted by the battle for presentation layers.
//!
//! Everything here is a plain value returned from `update`; the core never
//! calls out to a renderer.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{CombatantId, TargetRef};

/// One recorded consequence of a resolved action, with before/after values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedEffect {
    pub effect_type: EffectType,
    pub target_id: CombatantId,
    pub part_key: Option<PartKey>,
    pub old_value: i32,
    pub new_value: i32,
    pub is_part_broken: bool,
    pub is_player_broken: bool,
}

/// How an action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    /// Damage action connected.
    Hit,
    /// Target evaded; no effects.
    Evaded,
    /// Heal or support action applied.
    Supported,
    /// Invalidated before execution.
    Cancelled,
    /// Invariant violation; action discarded.
    Dropped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub kind: OutcomeKind,
    pub is_critical: bool,
    pub is_defended: bool,
    /// Part actually struck (after any defense redirect).
    pub struck_part: Option<PartKey>,
}

impl ActionOutcome {
    pub fn of(kind: OutcomeKind) -> Self {
        Self {
            kind,
            is_critical: false,
            is_defended: false,
            struck_part: None,
        }
    }
}

/// Result record for one actor's turn at execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub attacker_id: CombatantId,
    pub part_key: Option<PartKey>,
    pub intended_target_id: Option<CombatantId>,
    pub outcome: ActionOutcome,
    pub applied_effects: Vec<AppliedEffect>,
    pub cancelled: bool,
    pub cancel_reason: Option<CancelReason>,
}

impl ActionResult {
    pub fn cancelled(
        attacker_id: CombatantId,
        part_key: Option<PartKey>,
        intended_target_id: Option<CombatantId>,
        reason: CancelReason,
    ) -> Self {
        Self {
            attacker_id,
            part_key,
            intended_target_id,
            outcome: ActionOutcome::of(OutcomeKind::Cancelled),
            applied_effects: Vec::new(),
            cancelled: true,
            cancel_reason: Some(reason),
        }
    }
}

/// Which strategy table a bad key was looked up in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key")]
pub enum DiagnosticKind {
    UnknownCondition(String),
    UnknownPartStrategy(String),
    UnknownTargetStrategy(String),
    UnknownFallback(String),
}

/// Non-fatal problem found while evaluating or validating a personality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiDiagnostic {
    pub personality: Personality,
    /// Routine position in the strategy set; `None` for the fallback.
    pub routine_index: Option<usize>,
    pub kind: DiagnosticKind,
}

/// Everything the battle reports from one update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BattleEvent {
    PhaseChanged {
        phase: BattlePhase,
        turn_number: u32,
    },
    /// A player-controlled combatant is waiting for `SelectAction`.
    AwaitingInput { combatant_id: CombatantId },
    ActionSelected {
        combatant_id: CombatantId,
        part_key: PartKey,
        target: Option<TargetRef>,
    },
    SelectionRejected {
        combatant_id: CombatantId,
        reason: String,
    },
    ActionResolved(ActionResult),
    ActionCancelled(ActionResult),
    Diagnostic(AiDiagnostic),
    GameOver { winning_team: Option<TeamId> },
}

/// Return value of one `update` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub phase: BattlePhase,
    pub turn_number: u32,
    pub events: Vec<BattleEvent>,
}
