use crate::types::GameMode;

/// Rejections for externally issued commands. The world is untouched on error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("no trait choice is pending")]
    NoPendingTrait,
    #[error("the player is dead; restart before choosing a trait")]
    PlayerDead,
}

/// A tick that produced an inconsistent world. The tick is rolled back.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum TickError {
    #[error("non-finite value in {field}")]
    NonFinite { field: &'static str },
    #[error("{entity} health {health} outside 0..={max}")]
    HealthOutOfRange { entity: &'static str, health: i32, max: i32 },
    #[error("player mana {mana} outside 0..={max}")]
    ManaOutOfRange { mana: f64, max: f64 },
    #[error("mode {mode:?} is inconsistent with player liveness")]
    DeadModeMismatch { mode: GameMode },
}

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("trait table is not readable JSON: {0}")]
    TraitTableJson(#[from] serde_json::Error),
    #[error("trait table contained no usable entries")]
    EmptyTraitTable,
}
