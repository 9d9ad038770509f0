//! Running and combat behavior: movement, spawning, engagement, exchanges, kill rewards.
//! This module exists to keep per-mode behavior out of the tick sequencing in `advance`.
//! It does not own combat formulas; see `crate::combat`.

use super::*;

impl Simulation {
    pub(super) fn running_step(&mut self) {
        let config = &self.config;
        let world = &mut self.world;
        world.player.tick(config.tick_ms);
        world.player.position += config.run_speed;

        let categories = self
            .content
            .biome_at(world.distance)
            .map(|biome| biome.categories.as_slice())
            .unwrap_or_default();
        world.spawner.update(
            world.player.position,
            categories,
            &mut world.monsters,
            config,
            &mut world.rng,
            world.now,
        );
        self.move_monsters();

        if let Some(id) = self.world.nearest_in_range(self.config.engagement_range()) {
            self.engage(id);
        }
    }

    pub(super) fn combat_step(&mut self) {
        self.world.player.tick(self.config.tick_ms);
        self.move_monsters();
        match self.config.batch_cap() {
            None => self.single_exchange(),
            Some(cap) => self.batch_exchange(cap),
        }
    }

    fn move_monsters(&mut self) {
        let player = self.world.player.position;
        for (_, monster) in &mut self.world.monsters {
            monster.tick_timers(self.config.tick_ms);
            monster.approach(player, self.config.engage_distance);
        }
    }

    fn engage(&mut self, id: MonsterId) {
        let now = self.world.now;
        let Some(monster) = self.world.monsters.get_mut(id) else { return };
        monster.engaged = true;
        debug!(category = monster.category.as_str(), now, "engaged");
        self.world.mode.enter_combat(id, now);
        self.world.player.enter_combat(id);
    }

    fn single_exchange(&mut self) {
        let engaged = self.world.mode.engaged().filter(|id| self.world.live_monster(*id).is_some());
        let Some(id) = engaged else {
            self.begin_combat_exit();
            return;
        };

        let world = &mut self.world;
        let Some(monster) = world.monsters.get_mut(id) else { return };
        let mut ctx = CombatContext {
            traits: &world.traits,
            rng: &mut world.rng,
            log: &mut world.damage_log,
            config: &self.config,
            now: world.now,
        };
        let exchange = resolve_single(&mut world.player, id, monster, &mut ctx);
        self.after_exchange(id, exchange);
        if exchange.killed {
            self.begin_combat_exit();
        }
    }

    fn batch_exchange(&mut self, cap: usize) {
        let world = &mut self.world;
        let mut ctx = CombatContext {
            traits: &world.traits,
            rng: &mut world.rng,
            log: &mut world.damage_log,
            config: &self.config,
            now: world.now,
        };
        let results = resolve_batch(&mut world.player, &mut world.monsters, cap, &mut ctx);

        let mut next_target = None;
        for (id, exchange) in results {
            self.after_exchange(id, exchange);
            if !exchange.killed && next_target.is_none() {
                next_target = Some(id);
            }
        }
        match next_target {
            Some(id) if self.world.player.alive => {
                self.world.mode.retarget(id);
                self.world.player.combat.target = Some(id);
            }
            _ => self.begin_combat_exit(),
        }
    }

    fn after_exchange(&mut self, id: MonsterId, exchange: Exchange) {
        if exchange.damage_taken > 0 && !self.world.player.alive {
            self.world.mode.pulse_shake(self.config.death_shake);
        }
        if exchange.killed {
            self.reward_kill(id);
        }
    }

    fn reward_kill(&mut self, id: MonsterId) {
        let world = &mut self.world;
        let Some(monster) = world.monsters.get_mut(id) else { return };
        let rewards = grant_kill_rewards(
            &mut world.player,
            monster,
            &mut world.traits,
            &self.content.traits,
            &mut world.rng,
            world.now,
        );
        let Some(rewards) = rewards else { return };
        if let Some(drop) = rewards.drop {
            world.drops.insert(drop);
        }
        world.mode.pulse_shake(KILL_SHAKE);
    }

    fn begin_combat_exit(&mut self) {
        let now = self.world.now;
        if self.world.mode.schedule_combat_exit(now, self.config.combat_exit_delay_ms) {
            self.world.player.reset_attack_state();
        }
    }
}
