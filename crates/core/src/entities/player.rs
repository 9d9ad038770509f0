use serde::Serialize;

use crate::rng::SimRng;
use crate::stats::Stats;
use crate::types::{MonsterId, PercentageKind, RandomBonus, StatKind};

pub const MIN_ATTACK_INTERVAL_MS: u64 = 100;
pub const MAX_ATTACK_INTERVAL_MS: u64 = 5000;

/// Accumulated random level-up bonuses. Multipliers start at 1, additive terms at 0.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PercentageBonuses {
    pub attack_speed: f64,
    /// Percentage points.
    pub crit_chance: f64,
    /// Percentage points.
    pub dodge_chance: f64,
    pub xp_gain: f64,
    pub essence_find: f64,
    /// Percentage points of extra damage.
    pub damage_bonus: f64,
}

impl Default for PercentageBonuses {
    fn default() -> Self {
        Self {
            attack_speed: 1.0,
            crit_chance: 0.0,
            dodge_chance: 0.0,
            xp_gain: 1.0,
            essence_find: 1.0,
            damage_bonus: 0.0,
        }
    }
}

impl PercentageBonuses {
    pub fn apply(&mut self, kind: PercentageKind, value: f64) {
        match kind {
            PercentageKind::AttackSpeed => self.attack_speed *= value,
            PercentageKind::CritChance => self.crit_chance += value,
            PercentageKind::DodgeChance => self.dodge_chance += value,
            PercentageKind::XpGain => self.xp_gain *= value,
            PercentageKind::EssenceFind => self.essence_find *= value,
            PercentageKind::DamageBonus => self.damage_bonus += value,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerCombat {
    pub in_combat: bool,
    pub target: Option<MonsterId>,
    pub attack_anim_ms: u64,
    pub attack_cooldown_ms: u64,
}

impl PlayerCombat {
    pub fn is_attacking(&self) -> bool {
        self.attack_anim_ms > 0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub position: f64,
    pub health: i32,
    pub mana: f64,
    pub level: u32,
    pub xp: u32,
    pub stats: Stats,
    pub percentage: PercentageBonuses,
    pub chosen_traits: Vec<StatKind>,
    pub pending_trait: bool,
    pub combat: PlayerCombat,
    pub alive: bool,
    pub essence: u64,
    pub random_bonuses: Vec<RandomBonus>,
    trait_health_bonus: i32,
}

impl Default for Player {
    fn default() -> Self {
        let stats = Stats::default();
        let derived = stats.derived();
        Self {
            position: 0.0,
            health: derived.max_health,
            mana: derived.max_mana,
            level: 1,
            xp: 0,
            stats,
            percentage: PercentageBonuses::default(),
            chosen_traits: Vec::new(),
            pending_trait: false,
            combat: PlayerCombat::default(),
            alive: true,
            essence: 0,
            random_bonuses: Vec::new(),
            trait_health_bonus: 0,
        }
    }
}

impl Player {
    pub fn max_health(&self) -> i32 {
        self.stats.derived().max_health.saturating_add(self.trait_health_bonus).max(1)
    }

    pub fn max_mana(&self) -> f64 {
        self.stats.derived().max_mana.max(0.0)
    }

    pub fn xp_to_next(&self) -> u32 {
        self.level.saturating_mul(10)
    }

    /// Mutates stats, then grows current health by any max-health gain and clamps vitals.
    pub fn update_stats(&mut self, change: impl FnOnce(&mut Stats)) {
        let before = self.max_health();
        change(&mut self.stats);
        self.settle_vitals(before);
    }

    pub fn set_trait_health_bonus(&mut self, bonus: i32) {
        let before = self.max_health();
        self.trait_health_bonus = bonus;
        self.settle_vitals(before);
    }

    pub fn trait_health_bonus(&self) -> i32 {
        self.trait_health_bonus
    }

    fn settle_vitals(&mut self, previous_max: i32) {
        let max = self.max_health();
        if self.alive && max > previous_max {
            self.health = self.health.saturating_add(max - previous_max);
        }
        self.health = self.health.clamp(0, max);
        self.mana = self.mana.clamp(0.0, self.max_mana());
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.health = self.health.saturating_sub(amount.max(0)).max(0);
        if self.health == 0 {
            self.alive = false;
        }
    }

    /// Adds XP and applies every level-up it pays for. Returns levels gained.
    pub fn gain_xp(&mut self, amount: u32) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        let mut gained = 0;
        while self.xp_to_next() > 0 && self.xp >= self.xp_to_next() {
            self.xp -= self.xp_to_next();
            self.level += 1;
            gained += 1;
        }
        if gained > 0 {
            self.pending_trait = true;
            self.health = self.max_health();
            self.mana = self.max_mana();
        }
        gained
    }

    /// Per-tick timers and mana regeneration.
    pub fn tick(&mut self, dt_ms: u64) {
        self.combat.attack_anim_ms = self.combat.attack_anim_ms.saturating_sub(dt_ms);
        self.combat.attack_cooldown_ms = self.combat.attack_cooldown_ms.saturating_sub(dt_ms);
        if self.alive {
            let regen = self.stats.derived().mana_regen * dt_ms as f64 / 1000.0;
            self.mana = (self.mana + regen).clamp(0.0, self.max_mana());
        }
    }

    /// Milliseconds between player swings, clamped to a sane window.
    pub fn attack_interval_ms(&self, trait_attack_speed: f64) -> u64 {
        let speed = self.stats.derived().attack_speed
            * (1.0 + trait_attack_speed)
            * self.percentage.attack_speed;
        let interval = 1000.0 / speed;
        if !interval.is_finite() || interval <= 0.0 {
            return MAX_ATTACK_INTERVAL_MS;
        }
        (interval as u64).clamp(MIN_ATTACK_INTERVAL_MS, MAX_ATTACK_INTERVAL_MS)
    }

    pub fn enter_combat(&mut self, target: MonsterId) {
        self.combat.in_combat = true;
        self.combat.target = Some(target);
    }

    pub fn exit_combat(&mut self) {
        self.combat = PlayerCombat::default();
    }

    pub fn reset_attack_state(&mut self) {
        self.combat.attack_anim_ms = 0;
        self.combat.attack_cooldown_ms = 0;
    }

    pub fn apply_random_bonus(&mut self, bonus: RandomBonus) {
        match bonus {
            RandomBonus::Stat { stat, amount } => {
                self.update_stats(|stats| stats.increase_base(stat, amount));
            }
            RandomBonus::Percentage { kind, value } => self.percentage.apply(kind, value),
        }
        self.random_bonuses.push(bonus);
    }
}

/// Rolls one level-up bonus: half stat points, half percentage boosts.
pub fn roll_random_bonus(rng: &mut SimRng) -> RandomBonus {
    if rng.chance(0.5) {
        let stat = StatKind::ALL[rng.below(StatKind::ALL.len() as u64) as usize];
        let amount = 1 + rng.below(2) as i32;
        return RandomBonus::Stat { stat, amount };
    }
    let kind = PercentageKind::ALL[rng.below(PercentageKind::ALL.len() as u64) as usize];
    let value = match kind {
        PercentageKind::AttackSpeed | PercentageKind::XpGain => rng.range_f64(1.05, 1.15),
        PercentageKind::CritChance | PercentageKind::DodgeChance => rng.range_f64(2.0, 5.0),
        PercentageKind::EssenceFind => rng.range_f64(1.05, 1.20),
        PercentageKind::DamageBonus => rng.range_f64(5.0, 15.0),
    };
    RandomBonus::Percentage { kind, value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatBlock;

    #[test]
    fn multi_level_gain_loops_and_restores_vitals() {
        let mut player = Player::default();
        player.health = 3;
        player.mana = 0.0;
        let gained = player.gain_xp(35);
        assert_eq!(gained, 2);
        assert_eq!(player.level, 3);
        assert_eq!(player.xp, 5);
        assert!(player.pending_trait);
        assert_eq!(player.health, player.max_health());
        assert_eq!(player.mana, player.max_mana());
    }

    #[test]
    fn max_health_gains_heal_but_losses_clamp() {
        let mut player = Player::default();
        player.health = 100;
        player.set_trait_health_bonus(25);
        assert_eq!(player.max_health(), 175);
        assert_eq!(player.health, 125);

        let weaker = StatBlock { strength: -10, ..StatBlock::default() };
        player.update_stats(|stats| stats.set_pet_bonus(weaker));
        assert_eq!(player.max_health(), 75);
        assert_eq!(player.health, 75);
    }

    #[test]
    fn dead_player_is_not_revived_by_stat_changes() {
        let mut player = Player::default();
        player.take_damage(10_000);
        assert!(!player.alive);
        player.set_trait_health_bonus(50);
        assert_eq!(player.health, 0);
    }

    #[test]
    fn attack_interval_is_clamped() {
        let mut player = Player::default();
        assert_eq!(player.attack_interval_ms(0.0), 909);
        player.percentage.attack_speed = 1000.0;
        assert_eq!(player.attack_interval_ms(0.0), MIN_ATTACK_INTERVAL_MS);
        player.percentage.attack_speed = 0.0;
        assert_eq!(player.attack_interval_ms(0.0), MAX_ATTACK_INTERVAL_MS);
        player.percentage.attack_speed = f64::NAN;
        assert_eq!(player.attack_interval_ms(0.0), MAX_ATTACK_INTERVAL_MS);
    }

    #[test]
    fn random_bonus_rolls_stay_in_their_ranges() {
        let mut rng = SimRng::from_seed(3);
        for _ in 0..500 {
            match roll_random_bonus(&mut rng) {
                RandomBonus::Stat { amount, .. } => assert!((1..=2).contains(&amount)),
                RandomBonus::Percentage { kind, value } => {
                    let (low, high) = match kind {
                        PercentageKind::AttackSpeed | PercentageKind::XpGain => (1.05, 1.15),
                        PercentageKind::CritChance | PercentageKind::DodgeChance => (2.0, 5.0),
                        PercentageKind::EssenceFind => (1.05, 1.20),
                        PercentageKind::DamageBonus => (5.0, 15.0),
                    };
                    assert!(value >= low && value < high, "{kind:?} rolled {value}");
                }
            }
        }
    }
}
