//! Victory check, run after every resolved action.

use hecs::World;

use partbreak_core::components::{Parts, Profile};
use partbreak_core::enums::TeamId;

/// A team with a leader loses when the leader falls; a leaderless team
/// loses when nobody is left standing.
pub fn has_lost(world: &World, team: TeamId) -> bool {
    let mut has_leader = false;
    let mut leader_down = false;
    let mut anyone_alive = false;

    for (_entity, (profile, parts)) in world.query::<(&Profile, &Parts)>().iter() {
        if profile.team != team {
            continue;
        }
        if profile.is_leader {
            has_leader = true;
            leader_down |= parts.is_dead();
        }
        anyone_alive |= !parts.is_dead();
    }

    if has_leader {
        leader_down
    } else {
        !anyone_alive
    }
}

/// The winning team, once the battle is decided. If both sides fall to the
/// same action, the acting side wins.
pub fn check(world: &World, attacker_team: TeamId) -> Option<TeamId> {
    match (
        has_lost(world, TeamId::Team1),
        has_lost(world, TeamId::Team2),
    ) {
        (false, false) => None,
        (true, false) => Some(TeamId::Team2),
        (false, true) => Some(TeamId::Team1),
        (true, true) => Some(attacker_team),
    }
}
