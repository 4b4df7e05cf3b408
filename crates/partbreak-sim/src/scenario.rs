//! Scenario definitions: hardcoded battle rosters.
//!
//! Each scenario fixes team composition, leaders, personalities and part
//! loadouts. All combatants are AI-controlled; hosts that want player
//! control load their own roster.

use partbreak_core::components::{ActionStats, LegStats};
use partbreak_core::enums::{AttackType, ControlMode, Personality, ScenarioId, TeamId};
use partbreak_core::loadout::{CombatantLoadout, PartLoadout};

/// Build the roster for a given scenario.
pub fn build_roster(scenario: ScenarioId) -> Vec<CombatantLoadout> {
    match scenario {
        ScenarioId::Duel => build_duel(),
        ScenarioId::Skirmish => build_skirmish(),
        ScenarioId::LeaderHunt => build_leader_hunt(),
    }
}

/// Duel: one leader per side, a hunter against a crusher.
fn build_duel() -> Vec<CombatantLoadout> {
    vec![
        lead(gunner("Kestrel", TeamId::Team1, Personality::Hunter)),
        lead(brawler("Anvil", TeamId::Team2, Personality::Crusher)),
    ]
}

/// Skirmish: three a side with mixed personalities.
fn build_skirmish() -> Vec<CombatantLoadout> {
    vec![
        lead(gunner("Kestrel", TeamId::Team1, Personality::Hunter)),
        brawler("Bulwark", TeamId::Team1, Personality::Guard),
        medic("Lantern", TeamId::Team1),
        lead(brawler("Anvil", TeamId::Team2, Personality::Crusher)),
        gunner("Magpie", TeamId::Team2, Personality::Joker),
        gunner("Echo", TeamId::Team2, Personality::Counter),
    ]
}

/// Leader hunt: both sides go for the enemy leader, each backed by a medic.
fn build_leader_hunt() -> Vec<CombatantLoadout> {
    vec![
        lead(gunner("Warden", TeamId::Team1, Personality::Focus)),
        brawler("Talon", TeamId::Team1, Personality::LeaderFocus),
        medic("Mender", TeamId::Team1),
        lead(brawler("Sovereign", TeamId::Team2, Personality::Assist)),
        gunner("Viper", TeamId::Team2, Personality::LeaderFocus),
        medic("Salve", TeamId::Team2),
    ]
}

fn lead(mut loadout: CombatantLoadout) -> CombatantLoadout {
    loadout.is_leader = true;
    loadout
}

fn base(
    name: &str,
    team: TeamId,
    personality: Personality,
    head: ActionStats,
    right_arm: ActionStats,
    left_arm: ActionStats,
    legs: LegStats,
) -> CombatantLoadout {
    CombatantLoadout {
        name: name.to_string(),
        team,
        is_leader: false,
        control: ControlMode::Ai,
        personality,
        head: PartLoadout::new(50, head),
        right_arm: PartLoadout::new(60, right_arm),
        left_arm: PartLoadout::new(60, left_arm),
        legs: PartLoadout::new(70, legs),
    }
}

/// Ranged build: accurate arms on light, fast legs.
fn gunner(name: &str, team: TeamId, personality: Personality) -> CombatantLoadout {
    base(
        name,
        team,
        personality,
        ActionStats::new(AttackType::Scan, 12, 20),
        ActionStats::new(AttackType::AimedShot, 18, 55),
        ActionStats::new(AttackType::Shoot, 14, 45),
        LegStats {
            mobility: 40,
            armor: 10,
            propulsion: 45,
            stability: 30,
        },
    )
}

/// Melee build: heavy arms on armored legs.
fn brawler(name: &str, team: TeamId, personality: Personality) -> CombatantLoadout {
    base(
        name,
        team,
        personality,
        ActionStats::new(AttackType::Defend, 20, 10),
        ActionStats::new(AttackType::Strike, 26, 40),
        ActionStats::new(AttackType::Disrupt, 12, 35),
        LegStats {
            mobility: 25,
            armor: 30,
            propulsion: 30,
            stability: 20,
        },
    )
}

/// Support build: heal arm, scan head, one light gun.
fn medic(name: &str, team: TeamId) -> CombatantLoadout {
    base(
        name,
        team,
        Personality::Healer,
        ActionStats::new(AttackType::Scan, 16, 20),
        ActionStats::new(AttackType::Heal, 20, 20),
        ActionStats::new(AttackType::Shoot, 10, 40),
        LegStats {
            mobility: 35,
            armor: 15,
            propulsion: 35,
            stability: 25,
        },
    )
}
