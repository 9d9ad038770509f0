use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use xxhash_rust::xxh3::xxh3_64;

use crate::error::ContentError;
use crate::types::{MonsterCategory, MonsterTier, PetType, StatKind};

pub mod keys {
    pub const TRAIT_KEEN_SENSES_1: &str = "keen_senses_1";
    pub const TRAIT_KEEN_SENSES_2: &str = "keen_senses_2";
    pub const TRAIT_KEEN_SENSES_3: &str = "keen_senses_3";
    pub const TRAIT_GREEDY_GRIP_1: &str = "greedy_grip_1";
    pub const TRAIT_GREEDY_GRIP_2: &str = "greedy_grip_2";
    pub const TRAIT_GREEDY_GRIP_3: &str = "greedy_grip_3";
    pub const TRAIT_ABSORBENT_HIDE_1: &str = "absorbent_hide_1";
    pub const TRAIT_ABSORBENT_HIDE_2: &str = "absorbent_hide_2";
    pub const TRAIT_ABSORBENT_HIDE_3: &str = "absorbent_hide_3";
    pub const TRAIT_CONQUERORS_MIGHT_1: &str = "conquerors_might_1";
    pub const TRAIT_CONQUERORS_MIGHT_2: &str = "conquerors_might_2";
    pub const TRAIT_CONQUERORS_MIGHT_3: &str = "conquerors_might_3";
}

pub struct MonsterProfile {
    pub health: i32,
    pub attack: i32,
    pub attack_cooldown_ms: u64,
    pub speed: f64,
    pub xp: u32,
    pub drop_chance: f64,
    pub essence: u32,
}

pub fn monster_profile(category: MonsterCategory) -> MonsterProfile {
    match category {
        MonsterCategory::Wolf => MonsterProfile {
            health: 30,
            attack: 4,
            attack_cooldown_ms: 1200,
            speed: 1.5,
            xp: 4,
            drop_chance: 0.30,
            essence: 1,
        },
        MonsterCategory::Goblin => MonsterProfile {
            health: 40,
            attack: 5,
            attack_cooldown_ms: 1500,
            speed: 1.0,
            xp: 5,
            drop_chance: 0.45,
            essence: 2,
        },
        MonsterCategory::Slime => MonsterProfile {
            health: 25,
            attack: 3,
            attack_cooldown_ms: 1000,
            speed: 0.8,
            xp: 3,
            drop_chance: 0.35,
            essence: 1,
        },
        MonsterCategory::Boss => MonsterProfile {
            health: 80,
            attack: 9,
            attack_cooldown_ms: 2000,
            speed: 0.6,
            xp: 20,
            drop_chance: 1.0,
            essence: 5,
        },
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SpecialAttack {
    pub name: &'static str,
    /// Every `every`-th attack is special.
    pub every: u32,
    pub multiplier: f64,
}

pub struct TierProfile {
    pub health_mult: f64,
    pub damage_mult: f64,
    pub xp_mult: f64,
    pub scale: f64,
    pub special: Option<SpecialAttack>,
}

pub fn tier_profile(tier: MonsterTier) -> TierProfile {
    match tier {
        MonsterTier::Normal => TierProfile {
            health_mult: 1.0,
            damage_mult: 1.0,
            xp_mult: 1.0,
            scale: 1.0,
            special: None,
        },
        MonsterTier::Elite => TierProfile {
            health_mult: 2.0,
            damage_mult: 1.5,
            xp_mult: 2.0,
            scale: 1.3,
            special: Some(SpecialAttack { name: "Frenzied Bite", every: 4, multiplier: 1.5 }),
        },
        MonsterTier::Boss => TierProfile {
            health_mult: 3.0,
            damage_mult: 2.0,
            xp_mult: 4.0,
            scale: 1.5,
            special: Some(SpecialAttack { name: "Crushing Blow", every: 3, multiplier: 2.0 }),
        },
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraitEffect {
    Stat { stat: StatKind, amount: i32 },
    DropRate { target: Option<MonsterCategory>, value: f64 },
    Damage { target: Option<MonsterCategory>, value: f64 },
    Health { amount: i32 },
    Essence { target: Option<MonsterCategory>, amount: u32 },
    DamageReduction { value: f64 },
    Dodge { percent: f64 },
    Crit { percent: f64 },
    AttackSpeed { value: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TraitDef {
    pub id: String,
    pub category: MonsterCategory,
    pub name: String,
    pub description: String,
    pub level: u8,
    pub kills_to_unlock: u32,
    pub effects: Vec<TraitEffect>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PetDef {
    pub id: PetType,
    pub name: &'static str,
    pub evolved_name: &'static str,
    pub emoji: &'static str,
    pub evolved_emoji: &'static str,
    pub bonus: Vec<(StatKind, i32)>,
    pub description: &'static str,
}

/// Pet level at which the evolved name and emoji apply.
pub const PET_EVOLUTION_LEVEL: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BiomeKind {
    Forest,
    Beach,
    Desert,
    Mountains,
    Ruins,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BiomeDef {
    pub kind: BiomeKind,
    pub name: &'static str,
    pub min_distance: u64,
    pub categories: Vec<MonsterCategory>,
    pub music_track: &'static str,
}

/// Distance over which the approach to the next biome is blended.
pub const BIOME_TRANSITION_DISTANCE: u64 = 100;

#[derive(Clone, Debug, PartialEq)]
pub struct BiomeTransition<'a> {
    pub current: &'a BiomeDef,
    pub next: Option<&'a BiomeDef>,
    pub progress: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContentPack {
    pub traits: Vec<TraitDef>,
    pub pets: Vec<PetDef>,
    pub biomes: Vec<BiomeDef>,
}

impl ContentPack {
    pub fn build_default() -> Self {
        Self { traits: default_traits(), pets: default_pets(), biomes: default_biomes() }
    }

    /// Replaces the trait table with entries parsed from a JSON array.
    /// Malformed entries and effects are skipped with a warning; only a document
    /// that is not an array, or one with nothing usable, is an error.
    pub fn with_trait_table_json(mut self, json: &str) -> Result<Self, ContentError> {
        let entries: Vec<Value> = serde_json::from_str(json)?;
        let traits: Vec<TraitDef> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value::<RawTrait>(entry) {
                Ok(raw) => raw.into_def(),
                Err(err) => {
                    warn!(index, error = %err, "skipping malformed trait entry");
                    None
                }
            })
            .collect();
        if traits.is_empty() {
            return Err(ContentError::EmptyTraitTable);
        }
        self.traits = traits;
        Ok(self)
    }

    pub fn pet(&self, pet: PetType) -> Option<&PetDef> {
        self.pets.iter().find(|def| def.id == pet)
    }

    /// Furthest biome whose threshold `distance` has reached.
    pub fn biome_at(&self, distance: u64) -> Option<&BiomeDef> {
        self.biomes
            .iter()
            .rev()
            .find(|biome| distance >= biome.min_distance)
            .or(self.biomes.first())
    }

    pub fn biome_transition(&self, distance: u64) -> Option<BiomeTransition<'_>> {
        let current = self.biome_at(distance)?;
        let next = self
            .biomes
            .iter()
            .position(|biome| biome.kind == current.kind)
            .and_then(|index| self.biomes.get(index + 1));
        let Some(next) = next else {
            return Some(BiomeTransition { current, next: None, progress: 0.0 });
        };
        let remaining = next.min_distance.saturating_sub(distance);
        if remaining > BIOME_TRANSITION_DISTANCE {
            return Some(BiomeTransition { current, next: None, progress: 0.0 });
        }
        let progress = 1.0 - remaining as f64 / BIOME_TRANSITION_DISTANCE as f64;
        Some(BiomeTransition { current, next: Some(next), progress })
    }

    pub fn content_hash(&self) -> u64 {
        match serde_json::to_string(self) {
            Ok(json) => xxh3_64(json.as_bytes()),
            Err(_) => 0,
        }
    }
}

impl Default for ContentPack {
    fn default() -> Self {
        Self::build_default()
    }
}

#[derive(Deserialize)]
struct RawTrait {
    id: String,
    #[serde(alias = "monsterType")]
    category: String,
    name: String,
    #[serde(default)]
    description: String,
    level: u8,
    #[serde(alias = "killsToUnlock")]
    kills_to_unlock: u32,
    #[serde(default)]
    effects: Vec<Value>,
}

#[derive(Deserialize)]
struct RawEffect {
    #[serde(rename = "type")]
    kind: String,
    target: Option<String>,
    value: f64,
}

impl RawTrait {
    fn into_def(self) -> Option<TraitDef> {
        let Some(category) = MonsterCategory::parse(&self.category) else {
            warn!(
                trait_id = %self.id,
                category = %self.category,
                "skipping trait with unknown category"
            );
            return None;
        };
        let id = self.id;
        let effects = self
            .effects
            .into_iter()
            .filter_map(|effect| match serde_json::from_value::<RawEffect>(effect) {
                Ok(effect) => {
                    let parsed = effect.parse();
                    if parsed.is_none() {
                        let kind = &effect.kind;
                        warn!(trait_id = %id, effect = %kind, "skipping unknown trait effect");
                    }
                    parsed
                }
                Err(err) => {
                    warn!(trait_id = %id, error = %err, "skipping malformed trait effect");
                    None
                }
            })
            .collect();
        Some(TraitDef {
            id,
            category,
            name: self.name,
            description: self.description,
            level: self.level,
            kills_to_unlock: self.kills_to_unlock,
            effects,
        })
    }
}

impl RawEffect {
    fn target_category(&self) -> Option<Option<MonsterCategory>> {
        match self.target.as_deref() {
            None => Some(None),
            Some(raw) => MonsterCategory::parse(raw).map(Some),
        }
    }

    fn parse(&self) -> Option<TraitEffect> {
        let effect = match self.kind.as_str() {
            "stat" => TraitEffect::Stat {
                stat: StatKind::parse(self.target.as_deref()?)?,
                amount: self.value as i32,
            },
            "dropRate" | "drop_rate" => {
                TraitEffect::DropRate { target: self.target_category()?, value: self.value }
            }
            "damage" => TraitEffect::Damage { target: self.target_category()?, value: self.value },
            "health" => TraitEffect::Health { amount: self.value as i32 },
            "essence" => TraitEffect::Essence {
                target: self.target_category()?,
                amount: self.value.max(0.0) as u32,
            },
            "damageReduction" | "damage_reduction" => {
                TraitEffect::DamageReduction { value: self.value }
            }
            "dodge" => TraitEffect::Dodge { percent: self.value },
            "crit" => TraitEffect::Crit { percent: self.value },
            "attackSpeed" | "attack_speed" => TraitEffect::AttackSpeed { value: self.value },
            _ => return None,
        };
        self.value.is_finite().then_some(effect)
    }
}

fn trait_def(
    id: &str,
    category: MonsterCategory,
    name: &str,
    description: &str,
    level: u8,
    kills_to_unlock: u32,
    effects: Vec<TraitEffect>,
) -> TraitDef {
    TraitDef {
        id: id.to_string(),
        category,
        name: name.to_string(),
        description: description.to_string(),
        level,
        kills_to_unlock,
        effects,
    }
}

fn default_traits() -> Vec<TraitDef> {
    use MonsterCategory::{Boss, Goblin, Slime, Wolf};
    use StatKind::{Dexterity, Luck, Strength};
    vec![
        trait_def(
            keys::TRAIT_KEEN_SENSES_1,
            Wolf,
            "Keen Senses I",
            "+2 DEX, +10% wolf drop rate",
            1,
            10,
            vec![
                TraitEffect::Stat { stat: Dexterity, amount: 2 },
                TraitEffect::DropRate { target: Some(Wolf), value: 0.1 },
            ],
        ),
        trait_def(
            keys::TRAIT_KEEN_SENSES_2,
            Wolf,
            "Keen Senses II",
            "+4 DEX, +20% wolf drop rate",
            2,
            25,
            vec![
                TraitEffect::Stat { stat: Dexterity, amount: 4 },
                TraitEffect::DropRate { target: Some(Wolf), value: 0.2 },
            ],
        ),
        trait_def(
            keys::TRAIT_KEEN_SENSES_3,
            Wolf,
            "Keen Senses III",
            "+6 DEX, +30% wolf drop rate, +5% dodge chance",
            3,
            50,
            vec![
                TraitEffect::Stat { stat: Dexterity, amount: 6 },
                TraitEffect::DropRate { target: Some(Wolf), value: 0.3 },
                TraitEffect::Dodge { percent: 5.0 },
            ],
        ),
        trait_def(
            keys::TRAIT_GREEDY_GRIP_1,
            Goblin,
            "Greedy Grip I",
            "+1 Essence gain from goblins",
            1,
            10,
            vec![TraitEffect::Essence { target: Some(Goblin), amount: 1 }],
        ),
        trait_def(
            keys::TRAIT_GREEDY_GRIP_2,
            Goblin,
            "Greedy Grip II",
            "+2 Essence gain from goblins, +1 LUK",
            2,
            25,
            vec![
                TraitEffect::Essence { target: Some(Goblin), amount: 2 },
                TraitEffect::Stat { stat: Luck, amount: 1 },
            ],
        ),
        trait_def(
            keys::TRAIT_GREEDY_GRIP_3,
            Goblin,
            "Greedy Grip III",
            "+3 Essence gain from goblins, +2 LUK",
            3,
            50,
            vec![
                TraitEffect::Essence { target: Some(Goblin), amount: 3 },
                TraitEffect::Stat { stat: Luck, amount: 2 },
            ],
        ),
        trait_def(
            keys::TRAIT_ABSORBENT_HIDE_1,
            Slime,
            "Absorbent Hide I",
            "+10 Max HP",
            1,
            10,
            vec![TraitEffect::Health { amount: 10 }],
        ),
        trait_def(
            keys::TRAIT_ABSORBENT_HIDE_2,
            Slime,
            "Absorbent Hide II",
            "+25 Max HP",
            2,
            25,
            vec![TraitEffect::Health { amount: 25 }],
        ),
        trait_def(
            keys::TRAIT_ABSORBENT_HIDE_3,
            Slime,
            "Absorbent Hide III",
            "+50 Max HP, 10% damage reduction",
            3,
            50,
            vec![TraitEffect::Health { amount: 50 }, TraitEffect::DamageReduction { value: 0.1 }],
        ),
        trait_def(
            keys::TRAIT_CONQUERORS_MIGHT_1,
            Boss,
            "Conqueror's Might I",
            "+3 STR, +5% damage to all monsters",
            1,
            10,
            vec![
                TraitEffect::Stat { stat: Strength, amount: 3 },
                TraitEffect::Damage { target: None, value: 0.05 },
            ],
        ),
        trait_def(
            keys::TRAIT_CONQUERORS_MIGHT_2,
            Boss,
            "Conqueror's Might II",
            "+6 STR, +10% damage to all monsters",
            2,
            25,
            vec![
                TraitEffect::Stat { stat: Strength, amount: 6 },
                TraitEffect::Damage { target: None, value: 0.1 },
            ],
        ),
        trait_def(
            keys::TRAIT_CONQUERORS_MIGHT_3,
            Boss,
            "Conqueror's Might III",
            "+10 STR, +15% damage to all monsters",
            3,
            50,
            vec![
                TraitEffect::Stat { stat: Strength, amount: 10 },
                TraitEffect::Damage { target: None, value: 0.15 },
            ],
        ),
    ]
}

fn default_pets() -> Vec<PetDef> {
    vec![
        PetDef {
            id: PetType::Paw,
            name: "Wolf Cub",
            evolved_name: "Dire Wolf",
            emoji: "🐾",
            evolved_emoji: "🐺",
            bonus: vec![(StatKind::Dexterity, 2)],
            description: "Increases attack speed and dodge chance",
        },
        PetDef {
            id: PetType::Star,
            name: "Star Spirit",
            evolved_name: "Nova Spirit",
            emoji: "🌟",
            evolved_emoji: "⭐",
            bonus: vec![(StatKind::Intelligence, 2)],
            description: "Increases XP gain and mana regeneration",
        },
        PetDef {
            id: PetType::Teddy,
            name: "Teddy Friend",
            evolved_name: "Teddy Guardian",
            emoji: "🧶",
            evolved_emoji: "🧸",
            bonus: vec![(StatKind::Strength, 2)],
            description: "Increases attack power and max health",
        },
        PetDef {
            id: PetType::Ghost,
            name: "Ghost Buddy",
            evolved_name: "Phantom Buddy",
            emoji: "🌫️",
            evolved_emoji: "👻",
            bonus: vec![(StatKind::Luck, 2)],
            description: "Increases critical hit chance and essence drops",
        },
    ]
}

fn default_biomes() -> Vec<BiomeDef> {
    use MonsterCategory::{Goblin, Slime, Wolf};
    vec![
        BiomeDef {
            kind: BiomeKind::Forest,
            name: "Verdant Forest",
            min_distance: 0,
            categories: vec![Wolf, Goblin, Slime],
            music_track: "forest-theme",
        },
        BiomeDef {
            kind: BiomeKind::Beach,
            name: "Tropical Shores",
            min_distance: 500,
            categories: vec![Slime, Goblin],
            music_track: "beach-theme",
        },
        BiomeDef {
            kind: BiomeKind::Desert,
            name: "Scorched Sands",
            min_distance: 1000,
            categories: vec![Goblin, Wolf],
            music_track: "desert-theme",
        },
        BiomeDef {
            kind: BiomeKind::Mountains,
            name: "Frostpeak Heights",
            min_distance: 2000,
            categories: vec![Wolf, Slime],
            music_track: "mountain-theme",
        },
        BiomeDef {
            kind: BiomeKind::Ruins,
            name: "Ancient Ruins",
            min_distance: 3000,
            categories: vec![Goblin, Slime, Wolf],
            music_track: "ruins-theme",
        },
    ]
}
