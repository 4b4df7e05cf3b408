//! Combat formulas.
//!
//! Pure functions over stats and configuration. The resolution system rolls
//! the RNG against these; nothing here touches the world.

use partbreak_core::components::{ActionStats, LegStats};
use partbreak_core::config::CombatConfig;
use partbreak_core::enums::AttackType;

/// Success and might after the attack type's leg bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackPower {
    pub success: i32,
    pub might: i32,
}

/// Apply the attack type's leg bonus to a part's stats.
pub fn attack_power(stats: &ActionStats, legs: &LegStats) -> AttackPower {
    let mut power = AttackPower {
        success: stats.success,
        might: stats.might,
    };
    match stats.attack_type {
        AttackType::AimedShot => power.success += legs.stability / 2,
        AttackType::Strike => power.success += legs.mobility / 2,
        AttackType::Reckless => power.might += legs.propulsion / 2,
        _ => {}
    }
    power
}

/// Probability that the target dodges. `success` already includes any scan bonus.
pub fn evasion_chance(target_mobility: i32, success: i32, config: &CombatConfig) -> f64 {
    let raw = f64::from(target_mobility - success) / config.evasion_divisor + config.evasion_base;
    raw.clamp(0.0, config.evasion_max)
}

/// Probability of a critical hit.
pub fn critical_chance(
    success: i32,
    target_mobility: i32,
    attack_type: AttackType,
    config: &CombatConfig,
) -> f64 {
    let margin = (success - target_mobility).max(0);
    let raw = f64::from(margin) / config.critical_divisor
        + config.critical_bonus.for_attack(attack_type);
    raw.clamp(0.0, config.critical_max)
}

/// Probability that the target's guard redirects the blow.
pub fn defense_chance(target_armor: i32, defend_bonus: i32, config: &CombatConfig) -> f64 {
    let raw =
        f64::from(target_armor + defend_bonus) / config.defense_divisor + config.defense_base;
    raw.clamp(0.0, config.defense_max)
}

/// Inputs to the damage formula.
#[derive(Debug, Clone, Copy)]
pub struct DamageInput {
    pub success: i32,
    pub might: i32,
    pub target_mobility: i32,
    pub target_armor: i32,
    pub ignores_armor: bool,
    pub critical: bool,
}

/// Final damage. Never negative.
pub fn damage(input: DamageInput, damage_divisor: i32) -> i32 {
    let base = if input.critical {
        input.success
    } else {
        let armor = if input.ignores_armor {
            0
        } else {
            input.target_armor
        };
        (input.success - input.target_mobility - armor).max(0)
    };
    (base.max(0).div_euclid(damage_divisor.max(1)) + input.might).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config() -> CombatConfig {
        CombatConfig::default()
    }

    fn legs() -> LegStats {
        LegStats {
            mobility: 30,
            armor: 10,
            propulsion: 40,
            stability: 20,
        }
    }

    #[test]
    fn test_reference_damage() {
        let dmg = damage(
            DamageInput {
                success: 70,
                might: 15,
                target_mobility: 20,
                target_armor: 10,
                ignores_armor: false,
                critical: false,
            },
            4,
        );
        assert_eq!(dmg, 40 / 4 + 15);
    }

    #[test]
    fn test_critical_uses_success_as_base() {
        let input = DamageInput {
            success: 70,
            might: 15,
            target_mobility: 20,
            target_armor: 10,
            ignores_armor: false,
            critical: true,
        };
        assert_eq!(damage(input, 4), 70 / 4 + 15);
    }

    #[test]
    fn test_ignores_armor() {
        let input = DamageInput {
            success: 70,
            might: 0,
            target_mobility: 20,
            target_armor: 30,
            ignores_armor: true,
            critical: false,
        };
        assert_eq!(damage(input, 1), 50);
    }

    #[test]
    fn test_overmatched_attack_deals_only_might() {
        let input = DamageInput {
            success: 10,
            might: 8,
            target_mobility: 60,
            target_armor: 40,
            ignores_armor: false,
            critical: false,
        };
        assert_eq!(damage(input, 4), 8);
    }

    #[test]
    fn test_attack_type_bonuses() {
        let aimed = attack_power(&ActionStats::new(AttackType::AimedShot, 10, 50), &legs());
        assert_eq!(aimed, AttackPower { success: 60, might: 10 });

        let strike = attack_power(&ActionStats::new(AttackType::Strike, 10, 50), &legs());
        assert_eq!(strike.success, 65);

        let reckless = attack_power(&ActionStats::new(AttackType::Reckless, 10, 50), &legs());
        assert_eq!(reckless, AttackPower { success: 50, might: 30 });

        let shoot = attack_power(&ActionStats::new(AttackType::Shoot, 10, 50), &legs());
        assert_eq!(shoot, AttackPower { success: 50, might: 10 });
    }

    #[test]
    fn test_chances_hit_their_caps() {
        let c = config();
        assert_eq!(evasion_chance(1000, 0, &c), c.evasion_max);
        assert_eq!(evasion_chance(0, 1000, &c), 0.0);
        assert_eq!(critical_chance(0, 1000, AttackType::Shoot, &c), 0.0);
        assert_eq!(critical_chance(1000, 0, AttackType::Shoot, &c), c.critical_max);
        assert_eq!(defense_chance(10_000, 0, &c), c.defense_max);
    }

    #[test]
    fn test_type_bonus_raises_critical() {
        let c = config();
        let plain = critical_chance(40, 30, AttackType::Shoot, &c);
        let aimed = critical_chance(40, 30, AttackType::AimedShot, &c);
        assert!((aimed - plain - c.critical_bonus.aimed_shot).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_damage_non_negative(
            success in -200i32..400,
            might in -50i32..200,
            mobility in -100i32..300,
            armor in -100i32..300,
            ignores_armor in any::<bool>(),
            critical in any::<bool>(),
            divisor in 1i32..10,
        ) {
            let dmg = damage(
                DamageInput {
                    success,
                    might,
                    target_mobility: mobility,
                    target_armor: armor,
                    ignores_armor,
                    critical,
                },
                divisor,
            );
            prop_assert!(dmg >= 0);
        }

        #[test]
        fn prop_probabilities_clamped(
            a in -500i32..500,
            b in -500i32..500,
            bonus in -100i32..100,
        ) {
            let c = config();
            let evasion = evasion_chance(a, b, &c);
            prop_assert!((0.0..=c.evasion_max).contains(&evasion));
            let critical = critical_chance(a, b, AttackType::AimedShot, &c);
            prop_assert!((0.0..=c.critical_max).contains(&critical));
            let defense = defense_chance(a, bonus, &c);
            prop_assert!((0.0..=c.defense_max).contains(&defense));
        }
    }
}
