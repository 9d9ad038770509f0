//! Pet companion and essence drop updates.

use super::*;

impl Simulation {
    pub(super) fn update_pet(&mut self) {
        let world = &mut self.world;
        let update = world.pet.update(
            world.player.position,
            world.player.alive,
            world.player.level,
            world.now,
            &mut world.drops,
        );
        if let Some(id) = update.collected
            && let Some(source) = world.drops.get(id).map(|drop| drop.source)
        {
            let essence = essence_reward(&world.player, &world.traits, source);
            world.player.essence = world.player.essence.saturating_add(essence);
            debug!(essence, by = "pet", "essence collected");
        }
        if update.leveled_up {
            info!(level = world.pet.level, pet = ?world.pet.kind, "pet leveled up");
            world.apply_pet_bonus(&self.content);
        }
    }

    pub(super) fn update_drops(&mut self) {
        let world = &mut self.world;
        let (player, now) = (world.player.position, world.now);
        let mut earned = 0u64;
        for (_, drop) in &mut world.drops {
            if drop.update(player, now) {
                let essence = essence_reward(&world.player, &world.traits, drop.source);
                earned = earned.saturating_add(essence);
            }
        }
        world.player.essence = world.player.essence.saturating_add(earned);
        world.drops.retain(|_, drop| !drop.should_remove(now));
    }
}
