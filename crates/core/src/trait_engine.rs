//! Kill-count driven trait unlocking and the effect sums read by combat.
//! This module exists to turn monster kills into persistent, tiered bonuses.
//! It does not own the trait table; callers pass the content slice in.

use serde::Serialize;
use tracing::info;

use crate::content::{TraitDef, TraitEffect};
use crate::stats::{StatBlock, Stats};
use crate::types::MonsterCategory;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TraitNotification {
    pub trait_id: String,
    pub name: String,
    pub description: String,
    pub unlocked_at: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TraitProgress {
    pub category: MonsterCategory,
    pub kills: u32,
    /// Kill threshold of the next tier, or `None` once the category is maxed.
    pub next_unlock: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TraitEngine {
    kills: [u32; 4],
    unlocked: Vec<TraitDef>,
    notification: Option<TraitNotification>,
    notification_ms: u64,
}

impl TraitEngine {
    pub fn new(notification_ms: u64) -> Self {
        Self { kills: [0; 4], unlocked: Vec::new(), notification: None, notification_ms }
    }

    /// Counts a kill and unlocks the best newly qualified tier for its category.
    pub fn record_kill(
        &mut self,
        category: MonsterCategory,
        now: u64,
        table: &[TraitDef],
    ) -> Option<TraitDef> {
        let kills = &mut self.kills[category.index()];
        *kills = kills.saturating_add(1);
        let kills = *kills;
        let highest = self.highest_level(category);

        let best = table
            .iter()
            .filter(|def| def.category == category)
            .filter(|def| kills >= def.kills_to_unlock && def.level > highest)
            .max_by_key(|def| def.level)?
            .clone();

        match self.unlocked.iter().position(|def| def.category == category) {
            Some(index) => self.unlocked[index] = best.clone(),
            None => self.unlocked.push(best.clone()),
        }
        info!(trait_id = %best.id, category = category.as_str(), kills, "trait unlocked");
        self.notification = Some(TraitNotification {
            trait_id: best.id.clone(),
            name: best.name.clone(),
            description: best.description.clone(),
            unlocked_at: now,
        });
        Some(best)
    }

    /// Rewrites the trait source of the temporary stat bonuses.
    pub fn apply_effects(&self, stats: &mut Stats) {
        let mut bonus = StatBlock::default();
        for effect in self.effects() {
            if let TraitEffect::Stat { stat, amount } = *effect {
                bonus.add(stat, amount);
            }
        }
        stats.set_trait_bonus(bonus);
    }

    pub fn drop_rate_bonus(&self, category: MonsterCategory) -> f64 {
        self.sum(|effect| match *effect {
            TraitEffect::DropRate { target, value } if applies(target, category) => value,
            _ => 0.0,
        })
    }

    pub fn essence_bonus(&self, category: MonsterCategory) -> u32 {
        self.effects()
            .map(|effect| match *effect {
                TraitEffect::Essence { target, amount } if applies(target, category) => amount,
                _ => 0,
            })
            .fold(0u32, u32::saturating_add)
    }

    pub fn health_bonus(&self) -> i32 {
        self.effects()
            .map(|effect| match *effect {
                TraitEffect::Health { amount } => amount,
                _ => 0,
            })
            .fold(0i32, i32::saturating_add)
    }

    pub fn damage_bonus(&self, category: MonsterCategory) -> f64 {
        self.sum(|effect| match *effect {
            TraitEffect::Damage { target, value } if applies(target, category) => value,
            _ => 0.0,
        })
    }

    pub fn damage_reduction(&self) -> f64 {
        self.sum(|effect| match *effect {
            TraitEffect::DamageReduction { value } => value,
            _ => 0.0,
        })
    }

    pub fn dodge_bonus(&self) -> f64 {
        self.sum(|effect| match *effect {
            TraitEffect::Dodge { percent } => percent,
            _ => 0.0,
        })
    }

    pub fn crit_bonus(&self) -> f64 {
        self.sum(|effect| match *effect {
            TraitEffect::Crit { percent } => percent,
            _ => 0.0,
        })
    }

    pub fn attack_speed_bonus(&self) -> f64 {
        self.sum(|effect| match *effect {
            TraitEffect::AttackSpeed { value } => value,
            _ => 0.0,
        })
    }

    pub fn unlocked_traits(&self) -> &[TraitDef] {
        &self.unlocked
    }

    pub fn kills(&self, category: MonsterCategory) -> u32 {
        self.kills[category.index()]
    }

    pub fn total_kills(&self) -> [(MonsterCategory, u32); 4] {
        MonsterCategory::ALL.map(|category| (category, self.kills(category)))
    }

    pub fn progress(&self, table: &[TraitDef]) -> Vec<TraitProgress> {
        MonsterCategory::ALL
            .into_iter()
            .map(|category| {
                let highest = self.highest_level(category);
                let next_unlock = table
                    .iter()
                    .filter(|def| def.category == category && def.level > highest)
                    .min_by_key(|def| def.level)
                    .map(|def| def.kills_to_unlock);
                TraitProgress { category, kills: self.kills(category), next_unlock }
            })
            .collect()
    }

    /// The latest unlock, if it is younger than the notification window.
    pub fn notification(&self, now: u64) -> Option<&TraitNotification> {
        self.notification
            .as_ref()
            .filter(|note| now.saturating_sub(note.unlocked_at) <= self.notification_ms)
    }

    pub fn expire_notification(&mut self, now: u64) {
        if self.notification(now).is_none() {
            self.notification = None;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.notification_ms);
    }

    fn highest_level(&self, category: MonsterCategory) -> u8 {
        self.unlocked
            .iter()
            .filter(|def| def.category == category)
            .map(|def| def.level)
            .max()
            .unwrap_or(0)
    }

    fn effects(&self) -> impl Iterator<Item = &TraitEffect> {
        self.unlocked.iter().flat_map(|def| def.effects.iter())
    }

    fn sum(&self, value: impl Fn(&TraitEffect) -> f64) -> f64 {
        self.effects().map(value).sum()
    }
}

fn applies(target: Option<MonsterCategory>, category: MonsterCategory) -> bool {
    target.is_none_or(|target| target == category)
}
