//! Shared fixtures for the `sim` test suite.
//! This module exists to avoid repeating simulation and monster setup across tests.
//! It does not own production gameplay logic.

use super::*;
use crate::entities::Monster;
use crate::types::MonsterTier;

pub(super) fn sim_with_pet(seed: u64, pet: PetType) -> Simulation {
    Simulation::with_pet(seed, SimConfig::default(), Arc::new(ContentPack::default()), pet)
}

pub(super) fn default_sim(seed: u64) -> Simulation {
    sim_with_pet(seed, PetType::Paw)
}

/// Places a monster `offset` units ahead of the player.
pub(super) fn place_monster(
    sim: &mut Simulation,
    category: MonsterCategory,
    offset: f64,
) -> MonsterId {
    let world = sim.world_mut();
    let tier =
        if category == MonsterCategory::Boss { MonsterTier::Boss } else { MonsterTier::Normal };
    let position = world.player.position + offset;
    world.monsters.insert(Monster::new(category, tier, position))
}

/// A monster that neither dies quickly nor hurts.
pub(super) fn place_training_dummy(sim: &mut Simulation, offset: f64) -> MonsterId {
    let id = place_monster(sim, MonsterCategory::Goblin, offset);
    let monster = &mut sim.world_mut().monsters[id];
    monster.health = 1_000_000;
    monster.max_health = 1_000_000;
    monster.attack_interval_ms = 1_000_000;
    monster.attack_cooldown_ms = 1_000_000;
    id
}

pub(super) fn make_player_strong(sim: &mut Simulation) {
    sim.world_mut().player.update_stats(|stats| stats.increase_base(StatKind::Strength, 100));
}

/// Advances until `done` holds, up to `max_ticks`. Returns whether it held.
pub(super) fn run_until(
    sim: &mut Simulation,
    max_ticks: u64,
    mut done: impl FnMut(&Simulation) -> bool,
) -> bool {
    for _ in 0..max_ticks {
        if done(sim) {
            return true;
        }
        sim.advance();
    }
    done(sim)
}
