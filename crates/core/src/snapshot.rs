//! Read-only projection of the simulation for presentation layers.
//! This module exists so renderers and tools consume owned values instead of live entities.
//! It does not mutate the world; building a snapshot twice yields equal values.

use serde::Serialize;

use crate::combat::{total_crit_chance, total_dodge_chance};
use crate::content::BiomeKind;
use crate::damage_log::{Dodge, MonsterHit, PlayerHit};
use crate::entities::PercentageBonuses;
use crate::sim::Simulation;
use crate::state::BonusNotification;
use crate::stats::{DerivedStats, StatBlock};
use crate::trait_engine::{TraitNotification, TraitProgress};
use crate::types::{
    GameMode, MonsterCategory, MonsterTier, PetReaction, PetType, RandomBonus, StatKind, plain_id,
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub time_ms: u64,
    pub player: PlayerView,
    pub monsters: Vec<MonsterView>,
    pub drops: Vec<DropView>,
    pub pet: PetView,
    pub mode: ModeView,
    pub distance: u64,
    pub biome: Option<BiomeView>,
    pub level_up_banner: bool,
    pub trait_notification: Option<TraitNotification>,
    pub bonus_notification: Option<BonusNotification>,
    pub combat_text: CombatText,
    pub failed_ticks: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatLine {
    pub stat: StatKind,
    pub value: i32,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UnlockedTraitView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: MonsterCategory,
    pub level: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerView {
    pub position: f64,
    pub health: i32,
    pub max_health: i32,
    pub mana: f64,
    pub max_mana: f64,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub essence: u64,
    pub alive: bool,
    pub pending_trait: bool,
    pub in_combat: bool,
    pub attacking: bool,
    pub target: Option<u64>,
    pub base_stats: StatBlock,
    pub current_stats: StatBlock,
    pub derived: DerivedStats,
    pub stat_lines: Vec<StatLine>,
    pub dodge_chance: f64,
    pub crit_chance: f64,
    pub chosen_traits: Vec<StatKind>,
    pub unlocked_traits: Vec<UnlockedTraitView>,
    pub trait_progress: Vec<TraitProgress>,
    pub kills: Vec<(MonsterCategory, u32)>,
    pub percentage: PercentageBonuses,
    pub random_bonuses: Vec<RandomBonus>,
    pub last_damage: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonsterView {
    pub id: u64,
    pub category: MonsterCategory,
    pub tier: MonsterTier,
    pub position: f64,
    pub health: i32,
    pub max_health: i32,
    pub scale: f64,
    pub engaged: bool,
    pub attacking: bool,
    pub facing_left: bool,
    pub dead: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DropView {
    pub id: u64,
    pub position: f64,
    pub y: f64,
    pub source: MonsterCategory,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PetView {
    pub kind: PetType,
    pub name: String,
    pub emoji: String,
    pub description: String,
    pub x: f64,
    pub y: f64,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub collecting: bool,
    pub reaction: PetReaction,
    pub reaction_emoji: &'static str,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModeView {
    pub current: GameMode,
    pub previous: GameMode,
    pub transitioning: bool,
    pub progress: f64,
    pub camera_offset: (f64, f64),
    pub engaged: Option<u64>,
    pub combat_exit_pending: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BiomeView {
    pub current: BiomeKind,
    pub name: &'static str,
    pub music_track: &'static str,
    pub next: Option<BiomeKind>,
    pub transition_progress: f64,
}

/// Damage and dodge events young enough to show as floating text.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CombatText {
    pub monster_hits: Vec<MonsterHit>,
    pub player_hits: Vec<PlayerHit>,
    pub dodges: Vec<Dodge>,
}

impl Simulation {
    pub fn snapshot(&self) -> Snapshot {
        let world = self.world();
        let config = self.config();
        let content = self.content();
        let now = world.now;
        let window = config.damage_text_window_ms;

        Snapshot {
            tick: world.tick,
            time_ms: now,
            player: self.player_view(),
            monsters: world
                .monsters
                .iter()
                .map(|(id, monster)| MonsterView {
                    id: plain_id(id),
                    category: monster.category,
                    tier: monster.tier,
                    position: monster.position,
                    health: monster.health,
                    max_health: monster.max_health,
                    scale: monster.scale,
                    engaged: monster.engaged,
                    attacking: monster.attack_anim_ms > 0,
                    facing_left: monster.facing_left,
                    dead: !monster.is_alive(),
                })
                .collect(),
            drops: world
                .drops
                .iter()
                .filter(|(_, drop)| !drop.is_collected())
                .map(|(id, drop)| DropView {
                    id: plain_id(id),
                    position: drop.position,
                    y: drop.y,
                    source: drop.source,
                })
                .collect(),
            pet: self.pet_view(),
            mode: ModeView {
                current: world.mode.mode(),
                previous: world.mode.previous(),
                transitioning: world.mode.is_transitioning(now),
                progress: world.mode.progress(now),
                camera_offset: world.mode.camera_offset(),
                engaged: world.mode.engaged().map(plain_id),
                combat_exit_pending: world.mode.combat_exit_pending(),
            },
            distance: world.distance,
            biome: content.biome_transition(world.distance).map(|transition| BiomeView {
                current: transition.current.kind,
                name: transition.current.name,
                music_track: transition.current.music_track,
                next: transition.next.map(|next| next.kind),
                transition_progress: transition.progress,
            }),
            level_up_banner: world.mode.levelup_display_active(now, config.levelup_display_ms),
            trait_notification: world.traits.notification(now).cloned(),
            bonus_notification: world
                .bonus_notification
                .filter(|note| now.saturating_sub(note.at) <= config.bonus_notification_ms),
            combat_text: CombatText {
                monster_hits: world.damage_log.monster_hits(now, window),
                player_hits: world.damage_log.player_hits(now, window),
                dodges: world.damage_log.dodges(now, window),
            },
            failed_ticks: self.failed_ticks(),
        }
    }

    fn player_view(&self) -> PlayerView {
        let world = self.world();
        let player = &world.player;
        let current = player.stats.current();
        PlayerView {
            position: player.position,
            health: player.health,
            max_health: player.max_health(),
            mana: player.mana,
            max_mana: player.max_mana(),
            level: player.level,
            xp: player.xp,
            xp_to_next: player.xp_to_next(),
            essence: player.essence,
            alive: player.alive,
            pending_trait: player.pending_trait,
            in_combat: player.combat.in_combat,
            attacking: player.combat.is_attacking(),
            target: player.combat.target.map(plain_id),
            base_stats: player.stats.base(),
            current_stats: current,
            derived: player.stats.derived(),
            stat_lines: StatKind::ALL
                .iter()
                .map(|&stat| StatLine {
                    stat,
                    value: current.get(stat),
                    description: player.stats.description(stat),
                })
                .collect(),
            dodge_chance: total_dodge_chance(player, &world.traits),
            crit_chance: total_crit_chance(player, &world.traits),
            chosen_traits: player.chosen_traits.clone(),
            unlocked_traits: world
                .traits
                .unlocked_traits()
                .iter()
                .map(|def| UnlockedTraitView {
                    id: def.id.clone(),
                    name: def.name.clone(),
                    description: def.description.clone(),
                    category: def.category,
                    level: def.level,
                })
                .collect(),
            trait_progress: world.traits.progress(&self.content().traits),
            kills: world.traits.total_kills().to_vec(),
            percentage: player.percentage,
            random_bonuses: player.random_bonuses.clone(),
            last_damage: world.damage_log.latest_player_damage(),
        }
    }

    fn pet_view(&self) -> PetView {
        let world = self.world();
        let pet = &world.pet;
        let def = self.content().pet(pet.kind);
        PetView {
            kind: pet.kind,
            name: def.map(|def| pet.display_name(def)).unwrap_or_default().to_owned(),
            emoji: def.map(|def| pet.emoji(def)).unwrap_or_default().to_owned(),
            description: def.map(|def| def.description).unwrap_or_default().to_owned(),
            x: pet.x,
            y: pet.y,
            level: pet.level,
            xp: pet.xp,
            xp_to_next: pet.xp_to_next(),
            collecting: pet.is_collecting(world.now),
            reaction: pet.reaction,
            reaction_emoji: pet.reaction_emoji(),
        }
    }
}
