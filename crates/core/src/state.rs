use serde::Serialize;
use slotmap::SlotMap;

use crate::config::SimConfig;
use crate::content::ContentPack;
use crate::damage_log::DamageLog;
use crate::entities::{EssenceDrop, Monster, Pet, Player, pet_bonus_block};
use crate::mode::ModeMachine;
use crate::rng::SimRng;
use crate::spawner::Spawner;
use crate::trait_engine::TraitEngine;
use crate::types::{DropId, MonsterId, PetType, RandomBonus};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BonusNotification {
    pub bonus: RandomBonus,
    pub at: u64,
}

/// Everything one run mutates. Cloned whole as the per-tick checkpoint.
#[derive(Clone, Debug)]
pub struct WorldState {
    pub tick: u64,
    pub now: u64,
    pub rng: SimRng,
    pub player: Player,
    pub monsters: SlotMap<MonsterId, Monster>,
    pub drops: SlotMap<DropId, EssenceDrop>,
    pub pet: Pet,
    pub traits: TraitEngine,
    pub spawner: Spawner,
    pub mode: ModeMachine,
    pub damage_log: DamageLog,
    /// Distance traveled, `floor(position / 10)`.
    pub distance: u64,
    pub bonus_notification: Option<BonusNotification>,
}

impl WorldState {
    pub fn new(
        config: &SimConfig,
        content: &ContentPack,
        pet: PetType,
        epoch: u64,
        rng: SimRng,
        tick: u64,
        now: u64,
    ) -> Self {
        let mut world = Self {
            tick,
            now,
            rng,
            player: Player::default(),
            monsters: SlotMap::with_key(),
            drops: SlotMap::with_key(),
            pet: Pet::new(pet, 1),
            traits: TraitEngine::new(config.trait_notification_ms),
            spawner: Spawner::default(),
            mode: ModeMachine::new(epoch, config.transition_ms),
            damage_log: DamageLog::default(),
            distance: 0,
            bonus_notification: None,
        };
        world.apply_pet_bonus(content);
        world
    }

    /// Rewrites the pet source of the player's temporary stats.
    pub fn apply_pet_bonus(&mut self, content: &ContentPack) {
        let bonus = content
            .pet(self.pet.kind)
            .map(|def| pet_bonus_block(def, self.pet.level))
            .unwrap_or_default();
        self.player.update_stats(|stats| stats.set_pet_bonus(bonus));
    }

    pub fn live_monster(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters.get(id).filter(|monster| monster.is_alive())
    }

    /// Nearest living monster within `range` of the player.
    pub fn nearest_in_range(&self, range: f64) -> Option<MonsterId> {
        let player = self.player.position;
        self.monsters
            .iter()
            .filter(|(_, monster)| monster.is_alive())
            .map(|(id, monster)| (id, (monster.position - player).abs()))
            .filter(|(_, distance)| *distance <= range)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }
}
