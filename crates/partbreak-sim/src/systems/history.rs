//! History system: records who attacked whom after an executed attack.

use std::collections::BTreeMap;

use hecs::{Entity, World};

use partbreak_core::components::Profile;
use partbreak_core::enums::TeamId;
use partbreak_core::events::{ActionResult, OutcomeKind};
use partbreak_core::types::{CombatantId, TargetRef};

use crate::context::BattleHistory;

/// Update the history from a resolved action. Only attacks count, evaded
/// ones included; an evaded attack records the part it was aimed at.
pub fn record(
    history: &mut BattleHistory,
    world: &World,
    index: &BTreeMap<CombatantId, Entity>,
    result: &ActionResult,
) {
    if !matches!(result.outcome.kind, OutcomeKind::Hit | OutcomeKind::Evaded) {
        return;
    }
    let (Some(target_id), Some(part_key)) = (result.intended_target_id, result.outcome.struck_part)
    else {
        return;
    };
    let Some(attacker_team) = team_of(world, index, result.attacker_id).map(|(team, _)| team)
    else {
        return;
    };
    let Some((target_team, target_is_leader)) = team_of(world, index, target_id) else {
        return;
    };

    history.record_attacked(result.attacker_id, target_id, target_team, target_is_leader);
    history.record_attack(
        result.attacker_id,
        attacker_team,
        TargetRef::new(target_id, part_key),
    );
}

fn team_of(
    world: &World,
    index: &BTreeMap<CombatantId, Entity>,
    id: CombatantId,
) -> Option<(TeamId, bool)> {
    let entity = *index.get(&id)?;
    let profile = world.get::<&Profile>(entity).ok()?;
    Some((profile.team, profile.is_leader))
}
