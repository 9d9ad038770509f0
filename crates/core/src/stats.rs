//! Primary stats and the derived combat numbers computed from them.
//! This module exists to keep every stat formula in one pure function.
//! It does not own trait effects or pet definitions; those write bonus sources here.

use serde::{Deserialize, Serialize};

use crate::types::StatKind;

pub const BASE_STAT_VALUE: i32 = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatBlock {
    pub strength: i32,
    pub dexterity: i32,
    pub intelligence: i32,
    pub luck: i32,
}

impl StatBlock {
    pub fn uniform(value: i32) -> Self {
        Self { strength: value, dexterity: value, intelligence: value, luck: value }
    }

    pub fn get(&self, stat: StatKind) -> i32 {
        match stat {
            StatKind::Strength => self.strength,
            StatKind::Dexterity => self.dexterity,
            StatKind::Intelligence => self.intelligence,
            StatKind::Luck => self.luck,
        }
    }

    pub fn add(&mut self, stat: StatKind, amount: i32) {
        let slot = match stat {
            StatKind::Strength => &mut self.strength,
            StatKind::Dexterity => &mut self.dexterity,
            StatKind::Intelligence => &mut self.intelligence,
            StatKind::Luck => &mut self.luck,
        };
        *slot = slot.saturating_add(amount);
    }

    fn plus(self, other: StatBlock) -> StatBlock {
        StatBlock {
            strength: self.strength.saturating_add(other.strength),
            dexterity: self.dexterity.saturating_add(other.dexterity),
            intelligence: self.intelligence.saturating_add(other.intelligence),
            luck: self.luck.saturating_add(other.luck),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DerivedStats {
    pub max_health: i32,
    pub attack_power: i32,
    /// Attacks per second.
    pub attack_speed: f64,
    /// Percent.
    pub dodge_chance: f64,
    pub xp_gain: f64,
    pub max_mana: f64,
    /// Mana per second.
    pub mana_regen: f64,
    /// Percent.
    pub crit_chance: f64,
    pub essence_drop_rate: f64,
    /// Percent.
    pub rare_trait_chance: f64,
}

impl DerivedStats {
    pub fn from_block(block: StatBlock) -> Self {
        let StatBlock { strength, dexterity, intelligence, luck } = block;
        Self {
            max_health: 100 + strength * 10,
            attack_power: 10 + strength * 2,
            attack_speed: 1.0 + f64::from(dexterity) * 0.02,
            dodge_chance: f64::from(dexterity) * 0.5,
            xp_gain: 1.0 + f64::from(intelligence) * 0.02,
            max_mana: 20.0 + f64::from(intelligence) * 5.0,
            mana_regen: 1.0 + f64::from(intelligence) * 0.1,
            crit_chance: f64::from(luck) * 0.5,
            essence_drop_rate: 1.0 + f64::from(luck) * 0.02,
            rare_trait_chance: f64::from(luck) * 0.3,
        }
    }
}

/// Base stats plus two independently rewritten temporary sources.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Stats {
    base: StatBlock,
    pet_bonus: StatBlock,
    trait_bonus: StatBlock,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            base: StatBlock::uniform(BASE_STAT_VALUE),
            pet_bonus: StatBlock::default(),
            trait_bonus: StatBlock::default(),
        }
    }
}

impl Stats {
    pub fn base(&self) -> StatBlock {
        self.base
    }

    pub fn temporary(&self) -> StatBlock {
        self.pet_bonus.plus(self.trait_bonus)
    }

    pub fn current(&self) -> StatBlock {
        self.base.plus(self.temporary())
    }

    pub fn derived(&self) -> DerivedStats {
        DerivedStats::from_block(self.current())
    }

    pub fn increase_base(&mut self, stat: StatKind, amount: i32) {
        self.base.add(stat, amount);
    }

    pub fn set_pet_bonus(&mut self, bonus: StatBlock) {
        self.pet_bonus = bonus;
    }

    pub fn set_trait_bonus(&mut self, bonus: StatBlock) {
        self.trait_bonus = bonus;
    }

    pub fn description(&self, stat: StatKind) -> String {
        let value = self.current().get(stat);
        let scaled = f64::from(value);
        match stat {
            StatKind::Strength => format!("+{} ATK, +{} HP", value * 2, value * 10),
            StatKind::Dexterity => {
                format!("+{:.1}% SPD, +{:.1}% Dodge", scaled * 2.0, scaled * 0.5)
            }
            StatKind::Intelligence => format!("+{:.1}% XP, +{} MP", scaled * 2.0, value * 5),
            StatKind::Luck => format!("+{:.1}% Crit, +{:.1}% Drop", scaled * 0.5, scaled * 2.0),
        }
    }
}
