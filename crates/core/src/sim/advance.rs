//! Fixed-tick advancement, deferred transitions, and post-tick validation.

use super::*;

impl Simulation {
    /// Advances one fixed tick. A tick that fails validation is rolled back to the
    /// pre-tick world; only the clock moves.
    pub fn advance(&mut self) {
        let checkpoint = self.world.clone();
        if let Err(failure) = self.step() {
            error!(tick = checkpoint.tick + 1, %failure, "tick rolled back");
            self.world = checkpoint;
            self.world.tick += 1;
            self.world.now += self.config.tick_ms;
            self.failed_ticks += 1;
        }
    }

    pub fn advance_ticks(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.advance();
        }
    }

    pub(super) fn step(&mut self) -> Result<(), TickError> {
        self.world.tick += 1;
        self.world.now += self.config.tick_ms;
        let now = self.world.now;
        let world = &mut self.world;
        world.mode.decay_shake(&mut world.rng, self.config.shake_decay);

        self.fire_deferred();

        if !self.world.player.alive {
            self.settle_death();
            self.update_pet();
            return self.validate();
        }
        if self.world.player.pending_trait {
            self.world.mode.enter_trait_select(now);
            return self.validate();
        }

        self.repair_combat_mode();
        let level_before = self.world.player.level;
        match self.world.mode.behavior_mode() {
            GameMode::Running => self.running_step(),
            GameMode::Combat => self.combat_step(),
            GameMode::LevelUp | GameMode::TraitSelect | GameMode::Dead => {}
        }

        if !self.world.player.alive {
            self.settle_death();
        }
        self.update_pet();
        self.update_drops();
        self.world.distance = (self.world.player.position.max(0.0) / 10.0).floor() as u64;

        if self.world.player.alive && self.world.player.level > level_before {
            self.world.mode.enter_level_up(now, self.config.levelup_display_ms);
            self.world.player.reset_attack_state();
        }

        self.world.damage_log.prune(now, self.config.damage_text_window_ms);
        self.world.traits.expire_notification(now);
        let bonus_ms = self.config.bonus_notification_ms;
        if self.world.bonus_notification.is_some_and(|note| now.saturating_sub(note.at) > bonus_ms)
        {
            self.world.bonus_notification = None;
        }

        self.validate()
    }

    fn fire_deferred(&mut self) {
        let now = self.world.now;
        for kind in self.world.mode.take_due(now) {
            match kind {
                DeferredKind::CombatExit => {
                    self.world.mode.finish_combat_exit(now);
                    self.world.player.exit_combat();
                    self.disengage_monsters();
                }
                DeferredKind::LevelUpResume { started } => {
                    self.world.mode.finish_level_up(started, now);
                }
            }
        }
    }

    fn settle_death(&mut self) {
        if self.world.mode.mode() == GameMode::Dead {
            return;
        }
        info!(tick = self.world.tick, level = self.world.player.level, "player died");
        self.world.mode.enter_dead(self.world.now);
        self.world.player.exit_combat();
        self.disengage_monsters();
    }

    fn disengage_monsters(&mut self) {
        for (_, monster) in &mut self.world.monsters {
            monster.engaged = false;
        }
    }

    /// Entering a tick, combat mode must hold a living engaged monster or be on its way out.
    /// Kills schedule the exit on the same tick, so a miss here is a lost engagement.
    fn repair_combat_mode(&mut self) {
        let mode = &self.world.mode;
        if mode.mode() != GameMode::Combat || mode.combat_exit_pending() {
            return;
        }
        let engaged_alive = mode.engaged().is_some_and(|id| self.world.live_monster(id).is_some());
        if !engaged_alive {
            warn!(tick = self.world.tick, "combat without a living target; forcing running");
            self.world.mode.force_running(self.world.now);
            self.world.player.exit_combat();
            self.disengage_monsters();
        }
    }

    fn validate(&self) -> Result<(), TickError> {
        let world = &self.world;
        let player = &world.player;
        finite("player.position", player.position)?;
        finite("player.mana", player.mana)?;
        let max = player.max_health();
        if player.health < 0 || player.health > max {
            let health = player.health;
            return Err(TickError::HealthOutOfRange { entity: "player", health, max });
        }
        if player.mana < 0.0 || player.mana > player.max_mana() {
            return Err(TickError::ManaOutOfRange { mana: player.mana, max: player.max_mana() });
        }
        for (_, monster) in &world.monsters {
            finite("monster.position", monster.position)?;
            if monster.health < 0 || monster.health > monster.max_health {
                return Err(TickError::HealthOutOfRange {
                    entity: "monster",
                    health: monster.health,
                    max: monster.max_health,
                });
            }
        }
        for (_, drop) in &world.drops {
            finite("drop.position", drop.position)?;
            finite("drop.y", drop.y)?;
        }
        finite("pet.x", world.pet.x)?;
        finite("pet.y", world.pet.y)?;
        if player.alive && world.mode.mode() == GameMode::Dead {
            return Err(TickError::DeadModeMismatch { mode: world.mode.mode() });
        }
        Ok(())
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), TickError> {
    if value.is_finite() { Ok(()) } else { Err(TickError::NonFinite { field }) }
}
