use serde::{Deserialize, Serialize};
use slotmap::{Key, new_key_type};

new_key_type! {
    pub struct MonsterId;
    pub struct DropId;
}

/// Flattens a slotmap key into a plain value for renderer-facing records.
pub fn plain_id<K: Key>(key: K) -> u64 {
    key.data().as_ffi()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonsterCategory {
    Wolf,
    Goblin,
    Slime,
    Boss,
}

impl MonsterCategory {
    pub const ALL: [MonsterCategory; 4] = [
        MonsterCategory::Wolf,
        MonsterCategory::Goblin,
        MonsterCategory::Slime,
        MonsterCategory::Boss,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MonsterCategory::Wolf => "wolf",
            MonsterCategory::Goblin => "goblin",
            MonsterCategory::Slime => "slime",
            MonsterCategory::Boss => "boss",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "wolf" => Some(MonsterCategory::Wolf),
            "goblin" => Some(MonsterCategory::Goblin),
            "slime" => Some(MonsterCategory::Slime),
            "boss" => Some(MonsterCategory::Boss),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonsterTier {
    Normal,
    Elite,
    Boss,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Strength,
    Dexterity,
    Intelligence,
    Luck,
}

impl StatKind {
    pub const ALL: [StatKind; 4] =
        [StatKind::Strength, StatKind::Dexterity, StatKind::Intelligence, StatKind::Luck];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "strength" | "str" => Some(StatKind::Strength),
            "dexterity" | "dex" => Some(StatKind::Dexterity),
            "intelligence" | "int" => Some(StatKind::Intelligence),
            "luck" | "luk" => Some(StatKind::Luck),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Running,
    Combat,
    LevelUp,
    TraitSelect,
    Dead,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetType {
    Paw,
    Star,
    Teddy,
    Ghost,
}

impl PetType {
    pub const ALL: [PetType; 4] = [PetType::Paw, PetType::Star, PetType::Teddy, PetType::Ghost];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "paw" => Some(PetType::Paw),
            "star" => Some(PetType::Star),
            "teddy" => Some(PetType::Teddy),
            "ghost" => Some(PetType::Ghost),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentageKind {
    AttackSpeed,
    CritChance,
    DodgeChance,
    XpGain,
    EssenceFind,
    DamageBonus,
}

impl PercentageKind {
    pub const ALL: [PercentageKind; 6] = [
        PercentageKind::AttackSpeed,
        PercentageKind::CritChance,
        PercentageKind::DodgeChance,
        PercentageKind::XpGain,
        PercentageKind::EssenceFind,
        PercentageKind::DamageBonus,
    ];
}

/// One roll from the level-up bonus table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RandomBonus {
    Stat { stat: StatKind, amount: i32 },
    Percentage { kind: PercentageKind, value: f64 },
}

/// Externally issued commands. These are the only inputs besides `advance()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    ApplyTrait { stat: StatKind },
    ChangePetType { pet: PetType },
    Restart,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetReaction {
    None,
    LevelUp,
    Death,
}
