//! Gauge system: charges every charging combatant and promotes full gauges.

use hecs::World;
use tracing::debug;

use partbreak_core::components::{ActionStats, Gauge, Parts};
use partbreak_core::config::GaugeConfig;
use partbreak_core::enums::CombatantState;
use partbreak_core::types::CombatantId;

use crate::context::TurnContext;

/// Divisor applied to the charge rate while a part is readied or cooling down.
pub fn speed_multiplier(stats: &ActionStats, config: &GaugeConfig) -> f64 {
    1.0 + f64::from(stats.might + stats.success) * config.multiplier_per_stat
}

/// Put every live combatant at the start line: cooling down from zero.
pub fn reset_all(world: &mut World, config: &GaugeConfig) {
    for (_entity, (parts, gauge, state)) in
        world.query_mut::<(&Parts, &mut Gauge, &mut CombatantState)>()
    {
        *gauge = Gauge {
            max: config.max,
            ..Gauge::default()
        };
        *state = if parts.is_dead() {
            CombatantState::Broken
        } else {
            CombatantState::CooldownCharging
        };
    }
}

/// Advance gauges by `dt_ms`. Full cooldowns join the action queue; full
/// charges become ready to execute.
pub fn run(world: &mut World, config: &GaugeConfig, dt_ms: f64, turn: &mut TurnContext) {
    let step = dt_ms.max(0.0) / config.tick_interval_ms;
    let mut ready_to_select: Vec<CombatantId> = Vec::new();

    for (_entity, (id, parts, gauge, state)) in
        world.query_mut::<(&CombatantId, &Parts, &mut Gauge, &mut CombatantState)>()
    {
        if !state.is_charging() {
            continue;
        }
        if parts.is_dead() {
            *state = CombatantState::Broken;
            gauge.value = 0.0;
            continue;
        }

        let legs = parts.leg_stats();
        let acceleration =
            config.base_acceleration + f64::from(legs.mobility) * config.mobility_acceleration;
        let top_speed =
            config.base_max_speed + f64::from(legs.propulsion) * config.propulsion_max_speed;
        gauge.current_speed = (gauge.current_speed + acceleration).min(top_speed).max(0.0);
        let gain = gauge.current_speed / gauge.speed_multiplier.max(f64::EPSILON) * step;
        gauge.value = (gauge.value + gain).min(gauge.max);

        if gauge.is_full() {
            match *state {
                CombatantState::CooldownCharging => {
                    *state = CombatantState::ReadyToSelect;
                    ready_to_select.push(*id);
                }
                CombatantState::SelectedCharging => {
                    *state = CombatantState::ReadyToExecute;
                    debug!(actor = %id, "ready to execute");
                }
                _ => {}
            }
        }
    }

    // hecs iteration order is archetype order; queue in id order instead.
    ready_to_select.sort();
    for id in ready_to_select {
        debug!(actor = %id, "ready to select");
        turn.enqueue_selection(id);
    }
}
