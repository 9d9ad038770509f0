//! Externally issued commands, applied synchronously between ticks.
//! This module exists so every state change outside `advance` goes through one validated surface.
//! It does not record commands; callers journal them.

use super::*;

impl Simulation {
    /// Spends a pending trait choice on `stat` and rolls a random bonus.
    pub fn apply_trait(&mut self, stat: StatKind) -> Result<RandomBonus, CommandError> {
        let world = &mut self.world;
        if !world.player.alive {
            return Err(CommandError::PlayerDead);
        }
        if !world.player.pending_trait {
            return Err(CommandError::NoPendingTrait);
        }

        world.player.update_stats(|stats| stats.increase_base(stat, 1));
        world.player.chosen_traits.push(stat);
        world.player.pending_trait = false;

        let bonus = roll_random_bonus(&mut world.rng);
        world.player.apply_random_bonus(bonus);
        world.bonus_notification = Some(BonusNotification { bonus, at: world.now });
        world.mode.resume_from_trait_select(world.now, self.config.levelup_display_ms);

        info!(stat = ?stat, bonus = ?bonus, level = world.player.level, "trait applied");
        self.next_input_seq += 1;
        Ok(bonus)
    }

    /// Starts a fresh run. The clock and random stream continue; stale deferred
    /// transitions from the old run can never fire.
    pub fn restart(&mut self) {
        let kills = self.world.traits.total_kills();
        let epoch = self.world.mode.epoch() + 1;
        let mut rng = self.world.rng.clone();
        let pet = pick_pet_by_kills(&kills, &mut rng);
        let (tick, now) = (self.world.tick, self.world.now);

        self.world = WorldState::new(&self.config, &self.content, pet, epoch, rng, tick, now);
        self.next_input_seq += 1;
        info!(tick, pet = ?pet, epoch, "run restarted");
    }

    /// Swaps the pet type, keeping its level and xp.
    pub fn change_pet_type(&mut self, pet: PetType) {
        self.world.pet = self.world.pet.retyped(pet);
        self.world.apply_pet_bonus(&self.content);
        self.next_input_seq += 1;
        info!(pet = ?pet, level = self.world.pet.level, "pet type changed");
    }

    pub fn apply_command(&mut self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::ApplyTrait { stat } => self.apply_trait(stat).map(|_| ()),
            Command::ChangePetType { pet } => {
                self.change_pet_type(pet);
                Ok(())
            }
            Command::Restart => {
                self.restart();
                Ok(())
            }
        }
    }
}
