//! Entity spawn factories for setting up the battle world.
//!
//! Turns a roster of loadouts into combatant entities with their full
//! component bundles.

use std::collections::BTreeMap;

use hecs::{Entity, World};

use partbreak_core::components::*;
use partbreak_core::config::GaugeConfig;
use partbreak_core::constants::MAX_TEAM_SIZE;
use partbreak_core::enums::{CombatantState, TeamId};
use partbreak_core::error::ConfigError;
use partbreak_core::loadout::CombatantLoadout;
use partbreak_core::types::CombatantId;

/// Both teams present, neither over the size limit, at most one leader each.
pub fn validate_roster(roster: &[CombatantLoadout]) -> Result<(), ConfigError> {
    for team in [TeamId::Team1, TeamId::Team2] {
        let members: Vec<&CombatantLoadout> = roster.iter().filter(|c| c.team == team).collect();
        if members.is_empty() {
            return Err(ConfigError::Invalid(format!("{team:?} has no combatants")));
        }
        if members.len() > MAX_TEAM_SIZE {
            return Err(ConfigError::Invalid(format!(
                "{team:?} has {} combatants, limit is {MAX_TEAM_SIZE}",
                members.len()
            )));
        }
        if members.iter().filter(|c| c.is_leader).count() > 1 {
            return Err(ConfigError::Invalid(format!("{team:?} has more than one leader")));
        }
    }
    Ok(())
}

/// Spawn every loadout, assigning ids from 1 in roster order.
pub fn spawn_roster(
    world: &mut World,
    roster: &[CombatantLoadout],
    gauge: &GaugeConfig,
) -> BTreeMap<CombatantId, Entity> {
    roster
        .iter()
        .zip(1u32..)
        .map(|(loadout, n)| {
            let id = CombatantId(n);
            (id, spawn_combatant(world, id, loadout, gauge))
        })
        .collect()
}

/// Spawn one combatant, cooling down from an empty gauge.
pub fn spawn_combatant(
    world: &mut World,
    id: CombatantId,
    loadout: &CombatantLoadout,
    gauge: &GaugeConfig,
) -> Entity {
    let profile = Profile {
        name: loadout.name.clone(),
        team: loadout.team,
        is_leader: loadout.is_leader,
        control: loadout.control,
    };
    let parts = loadout.build_parts();
    let state = if parts.is_dead() {
        CombatantState::Broken
    } else {
        CombatantState::CooldownCharging
    };

    world.spawn((
        id,
        profile,
        Medal {
            personality: loadout.personality,
        },
        state,
        parts,
        Gauge {
            max: gauge.max,
            ..Gauge::default()
        },
        Action::default(),
        ActiveEffects::default(),
    ))
}
