use slotmap::SlotMap;

use super::EssenceDrop;
use crate::content::{PET_EVOLUTION_LEVEL, PetDef};
use crate::rng::SimRng;
use crate::stats::StatBlock;
use crate::types::{DropId, MonsterCategory, PetReaction, PetType};

pub const FOLLOW_OFFSET: f64 = 24.0;
pub const PET_SPEED: f64 = 3.0;
pub const PICKUP_RANGE: f64 = 10.0;
pub const COLLECTING_RANGE: f64 = 20.0;
pub const SEARCH_RANGE: f64 = 200.0;
pub const REACTION_MS: u64 = 2000;
pub const COLLECT_FLASH_MS: u64 = 500;
const HOVER_HEIGHT: f64 = 20.0;
const FOLLOW_EASING: f64 = 0.1;

#[derive(Clone, Debug, PartialEq)]
pub struct Pet {
    pub kind: PetType,
    pub x: f64,
    pub y: f64,
    pub level: u32,
    pub xp: u32,
    /// Non-owning; the drop may vanish between ticks.
    pub target: Option<DropId>,
    pub collecting: bool,
    pub last_collect_at: Option<u64>,
    pub reaction: PetReaction,
    pub reaction_at: u64,
    pub observed_player_level: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PetUpdate {
    pub collected: Option<DropId>,
    pub leveled_up: bool,
}

impl Pet {
    pub fn new(kind: PetType, player_level: u32) -> Self {
        Self {
            kind,
            x: -FOLLOW_OFFSET,
            y: HOVER_HEIGHT,
            level: 1,
            xp: 0,
            target: None,
            collecting: false,
            last_collect_at: None,
            reaction: PetReaction::None,
            reaction_at: 0,
            observed_player_level: player_level,
        }
    }

    /// Same pet progress under a different type.
    pub fn retyped(&self, kind: PetType) -> Self {
        Self { kind, target: None, collecting: false, ..self.clone() }
    }

    pub fn xp_to_next(&self) -> u32 {
        self.level.saturating_mul(5)
    }

    pub fn is_collecting(&self, now: u64) -> bool {
        self.collecting
            || self.last_collect_at.is_some_and(|at| now.saturating_sub(at) < COLLECT_FLASH_MS)
    }

    pub fn emoji<'a>(&self, def: &'a PetDef) -> &'a str {
        if self.level >= PET_EVOLUTION_LEVEL { def.evolved_emoji } else { def.emoji }
    }

    pub fn display_name<'a>(&self, def: &'a PetDef) -> &'a str {
        if self.level >= PET_EVOLUTION_LEVEL { def.evolved_name } else { def.name }
    }

    pub fn reaction_emoji(&self) -> &'static str {
        match self.reaction {
            PetReaction::None => "",
            PetReaction::LevelUp => "🎉",
            PetReaction::Death => "😢",
        }
    }

    /// Reacts to the player, chases the nearest drop in range, and collects it.
    pub fn update(
        &mut self,
        player_x: f64,
        player_alive: bool,
        player_level: u32,
        now: u64,
        drops: &mut SlotMap<DropId, EssenceDrop>,
    ) -> PetUpdate {
        self.update_reaction(player_alive, player_level, now);

        let target_live = self
            .target
            .and_then(|id| drops.get(id))
            .is_some_and(|drop| !drop.is_collected());
        if !target_live {
            self.target = nearest_drop(drops, player_x, self.x);
            self.collecting = false;
        }

        let Some((id, drop)) = self.target.and_then(|id| drops.get_mut(id).map(|drop| (id, drop)))
        else {
            self.x += (player_x - FOLLOW_OFFSET - self.x) * FOLLOW_EASING;
            self.y = HOVER_HEIGHT + (now as f64 / 300.0).sin() * 3.0;
            return PetUpdate::default();
        };

        let gap = drop.position - self.x;
        self.x += gap.signum() * PET_SPEED.min(gap.abs());
        let distance = (self.x - drop.position).abs();
        if distance < COLLECTING_RANGE {
            self.collecting = true;
        }
        if distance >= PICKUP_RANGE {
            return PetUpdate::default();
        }

        drop.collect(now);
        self.target = None;
        self.collecting = false;
        self.last_collect_at = Some(now);
        self.xp = self.xp.saturating_add(1);
        let leveled_up = self.xp >= self.xp_to_next();
        if leveled_up {
            self.level += 1;
            self.xp = 0;
        }
        PetUpdate { collected: Some(id), leveled_up }
    }

    fn update_reaction(&mut self, player_alive: bool, player_level: u32, now: u64) {
        let expired = now.saturating_sub(self.reaction_at) > REACTION_MS;
        if self.reaction != PetReaction::None && expired {
            self.reaction = PetReaction::None;
        }
        if self.reaction != PetReaction::None {
            return;
        }
        if !player_alive {
            self.reaction = PetReaction::Death;
            self.reaction_at = now;
        } else if player_level > self.observed_player_level {
            self.reaction = PetReaction::LevelUp;
            self.reaction_at = now;
            self.observed_player_level = player_level;
        }
    }
}

fn nearest_drop(
    drops: &SlotMap<DropId, EssenceDrop>,
    player_x: f64,
    pet_x: f64,
) -> Option<DropId> {
    drops
        .iter()
        .filter(|(_, drop)| !drop.is_collected())
        .filter(|(_, drop)| (drop.position - player_x).abs() < SEARCH_RANGE)
        .min_by(|(_, a), (_, b)| (a.position - pet_x).abs().total_cmp(&(b.position - pet_x).abs()))
        .map(|(id, _)| id)
}

/// Pet stat bonus, scaled by pet level.
pub fn pet_bonus_block(def: &PetDef, level: u32) -> StatBlock {
    let scale = i32::try_from(level).unwrap_or(i32::MAX);
    let mut block = StatBlock::default();
    for &(stat, amount) in &def.bonus {
        block.add(stat, amount.saturating_mul(scale));
    }
    block
}

fn pet_for_category(category: MonsterCategory) -> PetType {
    match category {
        MonsterCategory::Wolf => PetType::Paw,
        MonsterCategory::Goblin => PetType::Teddy,
        MonsterCategory::Slime => PetType::Ghost,
        MonsterCategory::Boss => PetType::Star,
    }
}

/// Weighted pick: every pet starts at weight 1, plus kills of its affine category.
pub fn pick_pet_by_kills(kills: &[(MonsterCategory, u32)], rng: &mut SimRng) -> PetType {
    let mut weights = PetType::ALL.map(|pet| (pet, 1u64));
    for &(category, count) in kills {
        let pet = pet_for_category(category);
        if let Some(slot) = weights.iter_mut().find(|(kind, _)| *kind == pet) {
            slot.1 = slot.1.saturating_add(u64::from(count));
        }
    }
    let total: u64 = weights.iter().map(|(_, weight)| weight).sum();
    let mut roll = rng.below(total);
    for (pet, weight) in weights {
        if roll < weight {
            return pet;
        }
        roll -= weight;
    }
    PetType::Paw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentPack;
    use crate::types::StatKind;

    #[test]
    fn pet_walks_to_drop_collects_and_levels() {
        let mut drops: SlotMap<DropId, EssenceDrop> = SlotMap::with_key();
        let mut pet = Pet::new(PetType::Paw, 1);
        pet.x = 0.0;
        let mut collected = 0;
        let mut leveled = false;
        for round in 0..5u64 {
            let id = drops.insert(EssenceDrop::new(30.0, MonsterCategory::Wolf));
            for tick in 0..40u64 {
                let now = round * 1000 + tick * 16;
                let update = pet.update(0.0, true, 1, now, &mut drops);
                if update.collected == Some(id) {
                    collected += 1;
                    leveled |= update.leveled_up;
                    break;
                }
            }
            pet.x = 0.0;
        }
        assert_eq!(collected, 5);
        assert!(leveled);
        assert_eq!((pet.level, pet.xp), (2, 0));
    }

    #[test]
    fn reactions_fire_once_and_decay() {
        let mut drops: SlotMap<DropId, EssenceDrop> = SlotMap::with_key();
        let mut pet = Pet::new(PetType::Star, 1);
        pet.update(0.0, true, 2, 100, &mut drops);
        assert_eq!(pet.reaction, PetReaction::LevelUp);
        assert_eq!(pet.level, 1, "pet level is independent of the player");
        pet.update(0.0, true, 2, 2101, &mut drops);
        assert_eq!(pet.reaction, PetReaction::None);
        pet.update(0.0, false, 2, 2200, &mut drops);
        assert_eq!(pet.reaction, PetReaction::Death);
        assert_eq!(pet.reaction_emoji(), "😢");
    }

    #[test]
    fn bonuses_scale_with_level_and_emoji_evolves() {
        let content = ContentPack::default();
        let def = content.pet(PetType::Teddy).expect("teddy is defined");
        let mut pet = Pet::new(PetType::Teddy, 1);
        assert_eq!(pet_bonus_block(def, 1).get(StatKind::Strength), 2);
        assert_eq!(pet_bonus_block(def, 3).get(StatKind::Strength), 6);
        assert_eq!(pet.emoji(def), def.emoji);
        pet.level = 3;
        assert_eq!(pet.emoji(def), def.evolved_emoji);
        assert_eq!(pet.display_name(def), "Teddy Guardian");
    }

    #[test]
    fn kill_weights_favour_affine_pet() {
        let mut rng = SimRng::from_seed(11);
        let kills = [(MonsterCategory::Slime, 200), (MonsterCategory::Wolf, 0)];
        let ghosts =
            (0..200).filter(|_| pick_pet_by_kills(&kills, &mut rng) == PetType::Ghost).count();
        assert!(ghosts > 150, "ghost picked {ghosts} of 200");
    }
}
