//! Simulation constants and tuning parameters.
//!
//! These are the defaults behind `BattleConfig`; every value can be
//! overridden from configuration.

// --- Timing ---

/// Nominal host frame interval (ms). Gauge rates are expressed per interval.
pub const TICK_INTERVAL_MS: f64 = 1000.0 / 60.0;

// --- Gauge ---

/// Full gauge value.
pub const GAUGE_MAX: f64 = 100.0;

/// Acceleration every combatant receives per interval.
pub const GAUGE_BASE_ACCELERATION: f64 = 0.05;

/// Extra acceleration per point of leg mobility.
pub const GAUGE_MOBILITY_ACCELERATION: f64 = 0.002;

/// Speed cap before propulsion is added.
pub const GAUGE_BASE_MAX_SPEED: f64 = 0.6;

/// Extra speed cap per point of leg propulsion.
pub const GAUGE_PROPULSION_MAX_SPEED: f64 = 0.02;

/// Speed multiplier growth per point of part might + success.
/// A 70/30 part charges at 1 / (1 + 100 * 0.005) = 2/3 speed.
pub const SPEED_MULTIPLIER_PER_STAT: f64 = 0.005;

// --- Evasion ---

pub const EVASION_DIVISOR: f64 = 100.0;
pub const EVASION_BASE: f64 = 0.05;
/// Never 1.0: a hit must always remain possible.
pub const EVASION_MAX: f64 = 0.95;

// --- Critical ---

pub const CRITICAL_DIVISOR: f64 = 100.0;
pub const CRITICAL_MAX: f64 = 1.0;
pub const CRITICAL_BONUS_SHOOT: f64 = 0.0;
pub const CRITICAL_BONUS_AIMED_SHOT: f64 = 0.25;
pub const CRITICAL_BONUS_STRIKE: f64 = 0.1;
pub const CRITICAL_BONUS_RECKLESS: f64 = 0.0;
pub const CRITICAL_BONUS_DISRUPT: f64 = 0.0;

// --- Defense ---

pub const DEFENSE_DIVISOR: f64 = 200.0;
pub const DEFENSE_BASE: f64 = 0.05;
/// Never 1.0: the intended part must always remain hittable.
pub const DEFENSE_MAX: f64 = 0.95;

// --- Damage ---

/// Divides the stat margin before might is added.
pub const DAMAGE_DIVISOR: i32 = 4;

// --- Support effects ---

/// Number of the owner's actions an APPLY_SCAN effect lasts.
pub const SCAN_DURATION: u32 = 3;

/// Number of the owner's actions an APPLY_DEFEND effect lasts.
pub const DEFEND_DURATION: u32 = 2;

// --- Roster limits ---

/// Maximum combatants per team.
pub const MAX_TEAM_SIZE: usize = 5;
