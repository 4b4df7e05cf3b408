//! ECS components for hecs entities.
//!
//! Components are plain data. Game logic lives in systems; the only methods
//! here are accessors that keep part lookups in one place.

use serde::{Deserialize, Serialize};

use crate::constants::GAUGE_MAX;
use crate::enums::*;
use crate::types::{AttackRecord, CombatantId};

/// Identity and allegiance of a combatant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub team: TeamId,
    pub is_leader: bool,
    pub control: ControlMode,
}

/// Stats of an action-carrying part (head and arms).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionStats {
    pub attack_type: AttackType,
    pub action_type: ActionType,
    pub target_scope: TargetScope,
    pub target_timing: TargetTiming,
    pub might: i32,
    pub success: i32,
    /// Damage from this part ignores the target's armor.
    #[serde(default)]
    pub ignores_armor: bool,
}

impl ActionStats {
    /// Build stats with the role, scope and timing implied by the attack type.
    pub fn new(attack_type: AttackType, might: i32, success: i32) -> Self {
        Self {
            attack_type,
            action_type: attack_type.default_action_type(),
            target_scope: attack_type.default_scope(),
            target_timing: attack_type.default_timing(),
            might,
            success,
            ignores_armor: false,
        }
    }
}

/// Stats carried by the legs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LegStats {
    pub mobility: i32,
    pub armor: i32,
    pub propulsion: i32,
    pub stability: i32,
}

/// Immutable stat block of a part.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PartStats {
    Action(ActionStats),
    Legs(LegStats),
}

/// One destructible body part: immutable stats plus mutable HP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub max_hp: i32,
    pub hp: i32,
    pub is_broken: bool,
    pub stats: PartStats,
}

impl Part {
    pub fn new(max_hp: i32, stats: PartStats) -> Self {
        Self {
            max_hp,
            hp: max_hp,
            is_broken: max_hp <= 0,
            stats,
        }
    }

    pub fn action(&self) -> Option<&ActionStats> {
        match &self.stats {
            PartStats::Action(stats) => Some(stats),
            PartStats::Legs(_) => None,
        }
    }

    pub fn legs(&self) -> Option<&LegStats> {
        match &self.stats {
            PartStats::Legs(stats) => Some(stats),
            PartStats::Action(_) => None,
        }
    }

    /// Non-broken and carrying an action.
    pub fn is_usable(&self) -> bool {
        !self.is_broken && self.action().is_some()
    }

    pub fn is_damaged(&self) -> bool {
        !self.is_broken && self.hp < self.max_hp
    }
}

/// The four parts of a combatant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parts {
    pub head: Part,
    pub right_arm: Part,
    pub left_arm: Part,
    pub legs: Part,
}

impl Parts {
    pub fn get(&self, key: PartKey) -> &Part {
        match key {
            PartKey::Head => &self.head,
            PartKey::RightArm => &self.right_arm,
            PartKey::LeftArm => &self.left_arm,
            PartKey::Legs => &self.legs,
        }
    }

    pub fn get_mut(&mut self, key: PartKey) -> &mut Part {
        match key {
            PartKey::Head => &mut self.head,
            PartKey::RightArm => &mut self.right_arm,
            PartKey::LeftArm => &mut self.left_arm,
            PartKey::Legs => &mut self.legs,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PartKey, &Part)> {
        PartKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }

    /// A combatant is functionally dead iff its head is broken.
    pub fn is_dead(&self) -> bool {
        self.head.is_broken
    }

    /// Leg stats, zeroed once the legs are broken.
    pub fn leg_stats(&self) -> LegStats {
        match (&self.legs.stats, self.legs.is_broken) {
            (PartStats::Legs(stats), false) => *stats,
            _ => LegStats::default(),
        }
    }
}

/// Charge meter. Reaching `max` moves the combatant to its next state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gauge {
    pub value: f64,
    pub max: f64,
    /// Divides the charge rate; heavier parts charge slower.
    pub speed_multiplier: f64,
    /// Accelerates towards the propulsion-derived cap each update.
    pub current_speed: f64,
}

impl Default for Gauge {
    fn default() -> Self {
        Self {
            value: 0.0,
            max: GAUGE_MAX,
            speed_multiplier: 1.0,
            current_speed: 0.0,
        }
    }
}

impl Gauge {
    pub fn is_full(&self) -> bool {
        self.value >= self.max
    }

    /// Restart charging from zero.
    pub fn reset(&mut self) {
        self.value = 0.0;
        self.current_speed = 0.0;
    }

    /// Restart charging with the progress inverted (`max - value`).
    pub fn invert(&mut self) {
        self.value = (self.max - self.value).clamp(0.0, self.max);
        self.current_speed = 0.0;
    }
}

/// Personality tag that selects the AI strategy set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medal {
    pub personality: Personality,
}

/// A lingering buff.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub effect_type: EffectType,
    pub value: i32,
    /// Remaining actions of the owner before expiry.
    pub duration: u32,
}

/// Ordered list of active effects on a combatant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub effects: Vec<ActiveEffect>,
}

impl ActiveEffects {
    /// Sum of the values of all effects of the given type.
    pub fn total(&self, effect_type: EffectType) -> i32 {
        self.effects
            .iter()
            .filter(|e| e.effect_type == effect_type)
            .map(|e| e.value)
            .sum()
    }

    pub fn has(&self, effect_type: EffectType) -> bool {
        self.effects.iter().any(|e| e.effect_type == effect_type)
    }
}

/// Pending selection. `part_key == None` means idle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub part_key: Option<PartKey>,
    pub target_id: Option<CombatantId>,
    pub target_part_key: Option<PartKey>,
}

impl Action {
    pub fn is_empty(&self) -> bool {
        self.part_key.is_none()
    }

    pub fn clear(&mut self) {
        *self = Action::default();
    }
}

/// Per-combatant view of the attack history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleLog {
    pub last_attacked_by: Option<CombatantId>,
    pub last_attack: Option<AttackRecord>,
}
