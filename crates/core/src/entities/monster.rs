use crate::content::{SpecialAttack, monster_profile, tier_profile};
use crate::types::{MonsterCategory, MonsterTier};

#[derive(Clone, Debug, PartialEq)]
pub struct Monster {
    pub category: MonsterCategory,
    pub tier: MonsterTier,
    pub position: f64,
    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub attack_interval_ms: u64,
    pub speed: f64,
    pub xp_value: u32,
    pub engaged: bool,
    pub attack_cooldown_ms: u64,
    pub attack_anim_ms: u64,
    pub attack_count: u32,
    pub scale: f64,
    pub special: Option<SpecialAttack>,
    pub died_at: Option<u64>,
    pub rewarded: bool,
    pub facing_left: bool,
}

/// One monster attack as decided by the attacker, before the defender's rolls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonsterStrike {
    pub attack: i32,
    pub multiplier: f64,
    pub special: Option<&'static str>,
}

impl Monster {
    pub fn new(category: MonsterCategory, tier: MonsterTier, position: f64) -> Self {
        let profile = monster_profile(category);
        let modifiers = tier_profile(tier);
        let health = scale_i32(profile.health, modifiers.health_mult).max(1);
        Self {
            category,
            tier,
            position,
            health,
            max_health: health,
            attack: scale_i32(profile.attack, modifiers.damage_mult).max(1),
            attack_interval_ms: profile.attack_cooldown_ms,
            speed: profile.speed,
            xp_value: (f64::from(profile.xp) * modifiers.xp_mult).round() as u32,
            engaged: false,
            attack_cooldown_ms: 0,
            attack_anim_ms: 0,
            attack_count: 0,
            scale: modifiers.scale,
            special: modifiers.special,
            died_at: None,
            rewarded: false,
            facing_left: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn can_attack(&self) -> bool {
        self.is_alive() && self.attack_cooldown_ms == 0
    }

    /// Applies damage; returns true when this hit killed the monster.
    pub fn take_damage(&mut self, amount: i32, now: u64) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = self.health.saturating_sub(amount.max(0)).max(0);
        if self.health == 0 {
            self.died_at = Some(now);
            self.engaged = false;
            self.attack_cooldown_ms = 0;
            self.attack_anim_ms = 0;
            return true;
        }
        false
    }

    /// Commits to an attack: counts it, resets the cooldown, starts the animation.
    pub fn strike(&mut self, anim_ms: u64) -> MonsterStrike {
        self.attack_count = self.attack_count.saturating_add(1);
        self.attack_cooldown_ms = self.attack_interval_ms;
        self.attack_anim_ms = anim_ms;
        let special = self
            .special
            .filter(|special| special.every > 0 && self.attack_count % special.every == 0);
        MonsterStrike {
            attack: self.attack,
            multiplier: special.map_or(1.0, |special| special.multiplier),
            special: special.map(|special| special.name),
        }
    }

    pub fn tick_timers(&mut self, dt_ms: u64) {
        self.attack_cooldown_ms = self.attack_cooldown_ms.saturating_sub(dt_ms);
        self.attack_anim_ms = self.attack_anim_ms.saturating_sub(dt_ms);
    }

    /// Walks toward the player until within `engage_distance`. Engaged monsters hold.
    pub fn approach(&mut self, player_position: f64, engage_distance: f64) {
        if !self.is_alive() {
            return;
        }
        self.facing_left = player_position < self.position;
        if self.engaged {
            return;
        }
        let gap = (self.position - player_position).abs();
        if gap > engage_distance {
            let step = self.speed.min(gap - engage_distance);
            self.position += if self.facing_left { -step } else { step };
        }
    }

    pub fn is_settled(&self, now: u64, settle_ms: u64) -> bool {
        self.died_at.is_some_and(|at| now.saturating_sub(at) >= settle_ms)
    }
}

fn scale_i32(value: i32, mult: f64) -> i32 {
    (f64::from(value) * mult).round() as i32
}
