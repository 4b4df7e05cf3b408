//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The four body parts every combatant carries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString,
)]
pub enum PartKey {
    Head,
    RightArm,
    LeftArm,
    Legs,
}

impl PartKey {
    pub const ALL: [PartKey; 4] = [
        PartKey::Head,
        PartKey::RightArm,
        PartKey::LeftArm,
        PartKey::Legs,
    ];

    /// Parts that carry an action (legs only carry movement stats).
    pub const ACTION_PARTS: [PartKey; 3] = [PartKey::Head, PartKey::RightArm, PartKey::LeftArm];
}

/// Side of the battle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
)]
pub enum TeamId {
    Team1,
    Team2,
}

impl TeamId {
    pub fn opponent(self) -> TeamId {
        match self {
            TeamId::Team1 => TeamId::Team2,
            TeamId::Team2 => TeamId::Team1,
        }
    }
}

/// Who chooses actions for a combatant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMode {
    /// Waits for an external `SelectAction`.
    Player,
    /// Selected by the personality AI.
    #[default]
    Ai,
}

/// Specific attack behaviour of an action part. Drives stat bonuses and effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum AttackType {
    Shoot,
    /// Aimed fire: success + stability / 2.
    AimedShot,
    /// Melee strike: success + mobility / 2.
    Strike,
    /// Reckless blow: might + propulsion / 2.
    Reckless,
    /// Melee hit that interrupts the target's charging selection.
    Disrupt,
    Heal,
    /// Raises the success of the whole team for a few actions.
    Scan,
    /// Raises the user's defense chance for a few actions.
    Defend,
}

impl AttackType {
    /// Role category this attack type belongs to by default.
    pub fn default_action_type(self) -> ActionType {
        match self {
            AttackType::Shoot | AttackType::AimedShot => ActionType::Shoot,
            AttackType::Strike | AttackType::Reckless | AttackType::Disrupt => ActionType::Melee,
            AttackType::Heal => ActionType::Heal,
            AttackType::Scan | AttackType::Defend => ActionType::Support,
        }
    }

    pub fn default_scope(self) -> TargetScope {
        match self {
            AttackType::Heal => TargetScope::AllySingle,
            AttackType::Scan => TargetScope::AllyTeam,
            AttackType::Defend => TargetScope::SelfOnly,
            _ => TargetScope::EnemySingle,
        }
    }

    pub fn default_timing(self) -> TargetTiming {
        match self.default_action_type() {
            ActionType::Melee => TargetTiming::Post,
            _ => TargetTiming::Pre,
        }
    }
}

/// Role category of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    Shoot,
    Melee,
    Heal,
    Support,
}

impl ActionType {
    /// Whether this action deals damage (and therefore runs the hit rolls).
    pub fn is_damage(self) -> bool {
        matches!(self, ActionType::Shoot | ActionType::Melee)
    }
}

/// Which combatants an action may be aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetScope {
    EnemySingle,
    AllySingle,
    AllyTeam,
    SelfOnly,
}

impl TargetScope {
    /// Whether a selection with this scope must name a target.
    pub fn requires_target(self) -> bool {
        matches!(self, TargetScope::EnemySingle | TargetScope::AllySingle)
    }
}

/// When the target of an action is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetTiming {
    /// Target chosen at selection time.
    Pre,
    /// Target chosen at execution time from the then-current battlefield.
    Post,
}

/// Per-combatant lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatantState {
    /// Gauge filling after an action (or at battle start).
    #[default]
    CooldownCharging,
    /// Gauge full, waiting for an action to be selected.
    ReadyToSelect,
    /// Action selected, gauge filling towards execution.
    SelectedCharging,
    /// Gauge full, queued for execution.
    ReadyToExecute,
    /// Head destroyed. Functionally dead.
    Broken,
}

impl CombatantState {
    pub fn is_charging(self) -> bool {
        matches!(
            self,
            CombatantState::CooldownCharging | CombatantState::SelectedCharging
        )
    }
}

/// Top-level battle phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattlePhase {
    #[default]
    Idle,
    BattleStart,
    TurnStart,
    ActionSelection,
    ActionExecution,
    TurnEnd,
    GameOver,
}

/// Why a selected action was invalidated before it executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CancelReason {
    PartBroken,
    TargetLost,
    Interrupted,
}

/// Kind of an applied effect, or of an active (lingering) effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectType {
    Damage,
    Heal,
    ApplyScan,
    ApplyDefend,
    Interrupt,
}

/// AI archetype carried by a medal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString,
)]
pub enum Personality {
    Hunter,
    Crusher,
    Joker,
    Counter,
    Guard,
    Focus,
    Assist,
    LeaderFocus,
    Healer,
    Random,
}

impl Personality {
    pub const ALL: [Personality; 10] = [
        Personality::Hunter,
        Personality::Crusher,
        Personality::Joker,
        Personality::Counter,
        Personality::Guard,
        Personality::Focus,
        Personality::Assist,
        Personality::LeaderFocus,
        Personality::Healer,
        Personality::Random,
    ];
}

/// Built-in battle setups.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum ScenarioId {
    /// One combatant per side.
    Duel,
    /// Three per side, mixed personalities.
    #[default]
    Skirmish,
    /// Three per side, both sides led by a healer-backed leader.
    LeaderHunt,
}
