//! Monster spawning ahead of the player and despawning behind.
//! This module exists to own spawn pacing and the category/tier rolls.
//! It does not grant rewards; despawned monsters simply leave the world.

use slotmap::SlotMap;
use tracing::debug;

use crate::config::SimConfig;
use crate::entities::Monster;
use crate::rng::SimRng;
use crate::types::{MonsterCategory, MonsterId, MonsterTier};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpawnReport {
    pub spawned: Option<MonsterId>,
    pub despawned: Vec<MonsterId>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Spawner {
    cooldown_ms: u64,
}

/// Distance band used by the boss and elite curves.
fn distance_band(position: f64) -> f64 {
    (position.max(0.0) / 100.0).floor()
}

pub fn boss_chance(position: f64) -> f64 {
    (0.02 + distance_band(position) / 1000.0).min(0.1)
}

pub fn elite_chance(position: f64) -> f64 {
    (0.05 + distance_band(position) / 2000.0).min(0.25)
}

impl Spawner {
    pub fn cooldown_ms(&self) -> u64 {
        self.cooldown_ms
    }

    pub fn update(
        &mut self,
        player_position: f64,
        biome_categories: &[MonsterCategory],
        monsters: &mut SlotMap<MonsterId, Monster>,
        config: &SimConfig,
        rng: &mut SimRng,
        now: u64,
    ) -> SpawnReport {
        let mut report = SpawnReport::default();
        self.cooldown_ms = self.cooldown_ms.saturating_sub(config.tick_ms);

        if self.cooldown_ms == 0 && monsters.len() < config.max_monsters {
            let jitter = rng.range_f64(0.0, config.spawn_ahead_jitter);
            let position = player_position + config.spawn_ahead + jitter;
            let monster = roll_monster(position, biome_categories, rng);
            debug!(
                category = monster.category.as_str(),
                tier = ?monster.tier,
                position,
                "monster spawned"
            );
            report.spawned = Some(monsters.insert(monster));
            self.cooldown_ms = config.spawn_interval_ms + rng.below(config.spawn_jitter_ms);
        }

        let behind = player_position - config.despawn_behind;
        monsters.retain(|id, monster| {
            let gone = monster.is_settled(now, config.death_settle_ms) || monster.position < behind;
            if gone {
                debug!(category = monster.category.as_str(), "monster despawned");
                report.despawned.push(id);
            }
            !gone
        });
        report
    }
}

fn roll_monster(position: f64, biome_categories: &[MonsterCategory], rng: &mut SimRng) -> Monster {
    if rng.chance(boss_chance(position)) {
        return Monster::new(MonsterCategory::Boss, MonsterTier::Boss, position);
    }
    let regulars: Vec<MonsterCategory> = biome_categories
        .iter()
        .copied()
        .filter(|category| *category != MonsterCategory::Boss)
        .collect();
    let pool: &[MonsterCategory] = if regulars.is_empty() {
        &[MonsterCategory::Wolf, MonsterCategory::Goblin, MonsterCategory::Slime]
    } else {
        &regulars
    };
    let category = rng.pick(pool).copied().unwrap_or(MonsterCategory::Wolf);
    let tier =
        if rng.chance(elite_chance(position)) { MonsterTier::Elite } else { MonsterTier::Normal };
    Monster::new(category, tier, position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_spawn_is_immediate_and_ahead() {
        let config = SimConfig::default();
        let mut spawner = Spawner::default();
        let mut monsters = SlotMap::with_key();
        let mut rng = SimRng::from_seed(2);
        let report = spawner.update(
            0.0,
            &[MonsterCategory::Wolf],
            &mut monsters,
            &config,
            &mut rng,
            16,
        );
        let id = report.spawned.expect("first tick spawns");
        let position = monsters[id].position;
        assert!((600.0..800.0).contains(&position));
        assert!((2000..3000).contains(&spawner.cooldown_ms()));
    }

    #[test]
    fn cap_limits_population() {
        let config = SimConfig::default();
        let mut spawner = Spawner::default();
        let mut monsters = SlotMap::with_key();
        let mut rng = SimRng::from_seed(4);
        for tick in 0..2000u64 {
            let now = tick * 16;
            spawner.update(0.0, &[MonsterCategory::Slime], &mut monsters, &config, &mut rng, now);
            assert!(monsters.len() <= config.max_monsters);
        }
        assert_eq!(monsters.len(), config.max_monsters);
    }

    #[test]
    fn settled_dead_and_far_behind_monsters_despawn() {
        let config = SimConfig { spawn_interval_ms: 1_000_000, ..SimConfig::default() };
        let mut spawner = Spawner::default();
        let mut monsters = SlotMap::with_key();
        let mut rng = SimRng::from_seed(8);
        spawner.update(0.0, &[MonsterCategory::Goblin], &mut monsters, &config, &mut rng, 0);

        let wolf = |x| Monster::new(MonsterCategory::Wolf, MonsterTier::Normal, x);
        let behind = monsters.insert(wolf(100.0));
        let corpse = monsters.insert(wolf(500.0));
        monsters[corpse].take_damage(1000, 1000);

        let goblins = [MonsterCategory::Goblin];
        let report = spawner.update(500.0, &goblins, &mut monsters, &config, &mut rng, 1200);
        assert_eq!(report.despawned, vec![behind]);
        let report = spawner.update(500.0, &goblins, &mut monsters, &config, &mut rng, 1600);
        assert_eq!(report.despawned, vec![corpse]);
    }

    #[test]
    fn boss_and_elite_curves_cap() {
        assert!((boss_chance(0.0) - 0.02).abs() < 1e-12);
        assert!((boss_chance(5_000.0) - 0.07).abs() < 1e-12);
        assert_eq!(boss_chance(1_000_000.0), 0.1);
        assert_eq!(elite_chance(1_000_000.0), 0.25);
    }
}
