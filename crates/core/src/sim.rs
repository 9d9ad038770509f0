//! Deterministic simulation orchestrator for one auto-running session.
//! This module exists to sequence entity, combat, pickup, and mode updates per fixed tick,
//! and to apply player commands at tick boundaries.
//! It does not own rendering, input devices, timers, or journal persistence.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::combat::{
    CombatContext, Exchange, KILL_SHAKE, essence_reward, grant_kill_rewards, resolve_batch,
    resolve_single,
};
use crate::config::SimConfig;
use crate::content::ContentPack;
use crate::entities::{pick_pet_by_kills, roll_random_bonus};
use crate::error::{CommandError, TickError};
use crate::mode::DeferredKind;
use crate::rng::SimRng;
use crate::state::{BonusNotification, WorldState};
use crate::types::{Command, GameMode, MonsterCategory, MonsterId, PetType, RandomBonus, StatKind};

mod advance;
mod combat_flow;
mod commands;
mod hash;
mod pickups;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests;

pub struct Simulation {
    seed: u64,
    config: SimConfig,
    content: Arc<ContentPack>,
    world: WorldState,
    failed_ticks: u64,
    next_input_seq: u64,
}

impl Simulation {
    /// Starts a run whose pet is drawn from the seed with no kill history.
    pub fn new(seed: u64, config: SimConfig, content: Arc<ContentPack>) -> Self {
        let mut rng = SimRng::from_seed(seed);
        let kills = MonsterCategory::ALL.map(|category| (category, 0));
        let pet = pick_pet_by_kills(&kills, &mut rng);
        Self::from_parts(seed, config, content, pet, rng)
    }

    pub fn with_pet(seed: u64, config: SimConfig, content: Arc<ContentPack>, pet: PetType) -> Self {
        Self::from_parts(seed, config, content, pet, SimRng::from_seed(seed))
    }

    fn from_parts(
        seed: u64,
        config: SimConfig,
        content: Arc<ContentPack>,
        pet: PetType,
        rng: SimRng,
    ) -> Self {
        let world = WorldState::new(&config, &content, pet, 0, rng, 0, 0);
        info!(seed, pet = ?pet, "simulation started");
        Self { seed, config, content, world, failed_ticks: 0, next_input_seq: 0 }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn content(&self) -> &ContentPack {
        &self.content
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn current_tick(&self) -> u64 {
        self.world.tick
    }

    pub fn now(&self) -> u64 {
        self.world.now
    }

    pub fn mode(&self) -> GameMode {
        self.world.mode.mode()
    }

    /// Ticks whose update failed validation and was rolled back.
    pub fn failed_ticks(&self) -> u64 {
        self.failed_ticks
    }

    pub fn input_count(&self) -> u64 {
        self.next_input_seq
    }

    /// Direct world access for scenario setup in tests and tools.
    pub fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }
}
