//! Entity models owned by the world: player, monsters, pet, essence drops.
//! This module exists to keep per-entity rules next to the data they mutate.
//! It does not own cross-entity sequencing; see `sim`.

mod essence;
mod monster;
mod pet;
mod player;

pub use essence::{DROP_REMOVE_AFTER_MS, DROP_START_HEIGHT, EssenceDrop};
pub use monster::{Monster, MonsterStrike};
pub use pet::{Pet, PetUpdate, pet_bonus_block, pick_pet_by_kills};
pub use player::{PercentageBonuses, Player, PlayerCombat, roll_random_bonus};
