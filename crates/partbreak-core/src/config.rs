//! Battle configuration.
//!
//! Every tuning constant in `constants.rs` is the default of a field here.
//! Configuration loads from TOML; missing fields fall back to defaults.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::{AttackType, Personality};
use crate::error::ConfigError;

/// Top-level configuration for a battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// RNG seed. Same seed and same inputs produce the same battle.
    pub seed: u64,
    pub gauge: GaugeConfig,
    pub combat: CombatConfig,
    pub effects: EffectConfig,
    /// Data-driven replacements for built-in personality routines.
    pub personalities: Vec<PersonalityOverride>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            gauge: GaugeConfig::default(),
            combat: CombatConfig::default(),
            effects: EffectConfig::default(),
            personalities: Vec::new(),
        }
    }
}

impl BattleConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: BattleConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break the formulas (division by zero, certain evasion).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.gauge;
        if g.max <= 0.0 || g.tick_interval_ms <= 0.0 {
            return Err(ConfigError::Invalid(
                "gauge.max and gauge.tick_interval_ms must be positive".into(),
            ));
        }
        if g.multiplier_per_stat < 0.0 {
            return Err(ConfigError::Invalid(
                "gauge.multiplier_per_stat must not be negative".into(),
            ));
        }

        let c = &self.combat;
        for (name, divisor) in [
            ("evasion_divisor", c.evasion_divisor),
            ("critical_divisor", c.critical_divisor),
            ("defense_divisor", c.defense_divisor),
        ] {
            if divisor <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "combat.{name} must be positive"
                )));
            }
        }
        if c.damage_divisor <= 0 {
            return Err(ConfigError::Invalid(
                "combat.damage_divisor must be positive".into(),
            ));
        }
        for (name, max) in [("evasion_max", c.evasion_max), ("defense_max", c.defense_max)] {
            if !(0.0..1.0).contains(&max) {
                return Err(ConfigError::Invalid(format!(
                    "combat.{name} must lie in [0, 1)"
                )));
            }
        }
        if !(0.0..=1.0).contains(&c.critical_max) {
            return Err(ConfigError::Invalid(
                "combat.critical_max must lie in [0, 1]".into(),
            ));
        }
        Ok(())
    }
}

/// Gauge accumulation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugeConfig {
    pub max: f64,
    pub tick_interval_ms: f64,
    pub base_acceleration: f64,
    pub mobility_acceleration: f64,
    pub base_max_speed: f64,
    pub propulsion_max_speed: f64,
    pub multiplier_per_stat: f64,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            max: GAUGE_MAX,
            tick_interval_ms: TICK_INTERVAL_MS,
            base_acceleration: GAUGE_BASE_ACCELERATION,
            mobility_acceleration: GAUGE_MOBILITY_ACCELERATION,
            base_max_speed: GAUGE_BASE_MAX_SPEED,
            propulsion_max_speed: GAUGE_PROPULSION_MAX_SPEED,
            multiplier_per_stat: SPEED_MULTIPLIER_PER_STAT,
        }
    }
}

/// Hit, critical, defense and damage parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub evasion_divisor: f64,
    pub evasion_base: f64,
    pub evasion_max: f64,
    pub critical_divisor: f64,
    pub critical_max: f64,
    pub critical_bonus: CriticalBonus,
    pub defense_divisor: f64,
    pub defense_base: f64,
    pub defense_max: f64,
    pub damage_divisor: i32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            evasion_divisor: EVASION_DIVISOR,
            evasion_base: EVASION_BASE,
            evasion_max: EVASION_MAX,
            critical_divisor: CRITICAL_DIVISOR,
            critical_max: CRITICAL_MAX,
            critical_bonus: CriticalBonus::default(),
            defense_divisor: DEFENSE_DIVISOR,
            defense_base: DEFENSE_BASE,
            defense_max: DEFENSE_MAX,
            damage_divisor: DAMAGE_DIVISOR,
        }
    }
}

/// Critical chance bonus per damage-dealing attack type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriticalBonus {
    pub shoot: f64,
    pub aimed_shot: f64,
    pub strike: f64,
    pub reckless: f64,
    pub disrupt: f64,
}

impl Default for CriticalBonus {
    fn default() -> Self {
        Self {
            shoot: CRITICAL_BONUS_SHOOT,
            aimed_shot: CRITICAL_BONUS_AIMED_SHOT,
            strike: CRITICAL_BONUS_STRIKE,
            reckless: CRITICAL_BONUS_RECKLESS,
            disrupt: CRITICAL_BONUS_DISRUPT,
        }
    }
}

impl CriticalBonus {
    pub fn for_attack(&self, attack_type: AttackType) -> f64 {
        match attack_type {
            AttackType::Shoot => self.shoot,
            AttackType::AimedShot => self.aimed_shot,
            AttackType::Strike => self.strike,
            AttackType::Reckless => self.reckless,
            AttackType::Disrupt => self.disrupt,
            AttackType::Heal | AttackType::Scan | AttackType::Defend => 0.0,
        }
    }
}

/// Durations of lingering support effects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    pub scan_duration: u32,
    pub defend_duration: u32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            scan_duration: SCAN_DURATION,
            defend_duration: DEFEND_DURATION,
        }
    }
}

/// Replacement routine list for a built-in personality.
///
/// Keys are strings so personalities can be authored as data; unknown keys
/// are reported when the AI registry is validated, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityOverride {
    pub personality: Personality,
    #[serde(default)]
    pub routines: Vec<RoutineDef>,
    pub fallback: String,
}

/// One routine as authored in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineDef {
    #[serde(default)]
    pub condition: Option<String>,
    pub part: String,
    pub target: String,
}
