//! Stable snapshot hashing for deterministic verification.
//! This module exists to keep hashing concerns separate from simulation control code.
//! It does not own replay execution or journal persistence policies.

use std::hash::Hasher;

use super::*;
use crate::types::plain_id;
use xxhash_rust::xxh3::Xxh3;

fn mode_tag(mode: GameMode) -> u8 {
    match mode {
        GameMode::Running => 0,
        GameMode::Combat => 1,
        GameMode::LevelUp => 2,
        GameMode::TraitSelect => 3,
        GameMode::Dead => 4,
    }
}

impl Simulation {
    pub fn snapshot_hash(&self) -> u64 {
        let world = &self.world;
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u64(world.tick);
        hasher.write_u64(world.now);
        hasher.write_u64(self.next_input_seq);
        hasher.write_u64(self.failed_ticks);

        let player = &world.player;
        hasher.write_u64(player.position.to_bits());
        hasher.write_i32(player.health);
        hasher.write_u64(player.mana.to_bits());
        hasher.write_u32(player.level);
        hasher.write_u32(player.xp);
        hasher.write_u64(player.essence);
        hasher.write_u8(u8::from(player.alive));
        hasher.write_u8(u8::from(player.pending_trait));
        hasher.write_u64(player.combat.attack_cooldown_ms);
        let base = player.stats.base();
        for value in [base.strength, base.dexterity, base.intelligence, base.luck] {
            hasher.write_i32(value);
        }
        for stat in &player.chosen_traits {
            hasher.write_u8(*stat as u8);
        }
        hasher.write_usize(player.random_bonuses.len());

        hasher.write_u8(mode_tag(world.mode.mode()));
        hasher.write_u8(mode_tag(world.mode.previous()));
        hasher.write_u64(world.mode.epoch());
        hasher.write_u64(world.mode.engaged().map_or(0, plain_id));
        hasher.write_u64(world.mode.shake().to_bits());

        for (id, monster) in &world.monsters {
            hasher.write_u64(plain_id(id));
            hasher.write_u8(monster.category as u8);
            hasher.write_u8(monster.tier as u8);
            hasher.write_u64(monster.position.to_bits());
            hasher.write_i32(monster.health);
            hasher.write_u64(monster.attack_cooldown_ms);
            hasher.write_u8(u8::from(monster.engaged));
        }
        for (id, drop) in &world.drops {
            hasher.write_u64(plain_id(id));
            hasher.write_u64(drop.position.to_bits());
            hasher.write_u64(drop.y.to_bits());
            hasher.write_u8(u8::from(drop.is_collected()));
        }

        let pet = &world.pet;
        hasher.write_u8(pet.kind as u8);
        hasher.write_u64(pet.x.to_bits());
        hasher.write_u32(pet.level);
        hasher.write_u32(pet.xp);

        for (_, kills) in world.traits.total_kills() {
            hasher.write_u32(kills);
        }
        for unlocked in world.traits.unlocked_traits() {
            hasher.write(unlocked.id.as_bytes());
        }
        hasher.write_u64(world.spawner.cooldown_ms());
        hasher.write_u64(world.distance);
        hasher.finish()
    }
}
