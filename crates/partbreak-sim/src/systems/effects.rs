//! Active effect bookkeeping: applying buffs and expiring them.

use hecs::{Entity, World};

use partbreak_core::components::{ActiveEffect, ActiveEffects};
use partbreak_core::enums::EffectType;

/// Push a buff and return the owner's `(old, new)` total for that effect type.
pub fn apply(world: &mut World, entity: Entity, effect: ActiveEffect) -> Option<(i32, i32)> {
    let mut effects = world.get::<&mut ActiveEffects>(entity).ok()?;
    let old = effects.total(effect.effect_type);
    effects.effects.push(effect);
    Some((old, effects.total(effect.effect_type)))
}

pub fn total(world: &World, entity: Entity, effect_type: EffectType) -> i32 {
    world
        .get::<&ActiveEffects>(entity)
        .map(|effects| effects.total(effect_type))
        .unwrap_or(0)
}

/// Count one action against the first `carried` effects of the owner and
/// drop the expired ones. Effects gained during that same action are not
/// charged.
pub fn expire_after_action(world: &mut World, entity: Entity, carried: usize) {
    let Ok(mut effects) = world.get::<&mut ActiveEffects>(entity) else {
        return;
    };
    for effect in effects.effects.iter_mut().take(carried) {
        effect.duration = effect.duration.saturating_sub(1);
    }
    effects.effects.retain(|effect| effect.duration > 0);
}

/// Number of effects currently held, for `expire_after_action`.
pub fn count(world: &World, entity: Entity) -> usize {
    world
        .get::<&ActiveEffects>(entity)
        .map(|effects| effects.effects.len())
        .unwrap_or(0)
}
