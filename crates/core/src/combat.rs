//! Damage exchange between the player and monsters, and kill rewards.
//! This module exists to keep every combat roll and formula in one place.
//! It does not own mode transitions or engagement selection; see `sim`.

use slotmap::SlotMap;
use tracing::debug;

use crate::config::SimConfig;
use crate::content::{TraitDef, monster_profile};
use crate::damage_log::{DamageLog, Dodge, MonsterHit, PlayerHit};
use crate::entities::{EssenceDrop, Monster, Player};
use crate::rng::SimRng;
use crate::trait_engine::TraitEngine;
use crate::types::{MonsterCategory, MonsterId, plain_id};

pub const MAX_DAMAGE_REDUCTION: f64 = 0.9;
pub const KILL_SHAKE: f64 = 8.0;

pub struct CombatContext<'a> {
    pub traits: &'a TraitEngine,
    pub rng: &'a mut SimRng,
    pub log: &'a mut DamageLog,
    pub config: &'a SimConfig,
    pub now: u64,
}

/// What happened in one call to a resolver, from the player's point of view.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Exchange {
    pub monster_attacked: bool,
    pub dodged: bool,
    pub damage_taken: i32,
    pub player_attacked: bool,
    pub critical: bool,
    pub damage_dealt: i32,
    pub killed: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct KillRewards {
    pub xp: u32,
    pub levels_gained: u32,
    pub drop: Option<EssenceDrop>,
    pub unlocked: Option<TraitDef>,
}

pub fn total_dodge_chance(player: &Player, traits: &TraitEngine) -> f64 {
    player.stats.derived().dodge_chance + traits.dodge_bonus() + player.percentage.dodge_chance
}

pub fn total_crit_chance(player: &Player, traits: &TraitEngine) -> f64 {
    player.stats.derived().crit_chance + traits.crit_bonus() + player.percentage.crit_chance
}

fn monster_attack(
    player: &mut Player,
    monster: &mut Monster,
    ctx: &mut CombatContext<'_>,
    exchange: &mut Exchange,
) {
    if !player.alive || !monster.can_attack() {
        return;
    }
    let strike = monster.strike(ctx.config.monster_attack_anim_ms);
    exchange.monster_attacked = true;

    if ctx.rng.chance_percent(total_dodge_chance(player, ctx.traits)) {
        exchange.dodged = true;
        ctx.log.log_dodge(Dodge { at: ctx.now, position: player.position });
        return;
    }

    let reduction = ctx.traits.damage_reduction().clamp(0.0, MAX_DAMAGE_REDUCTION);
    let raw = f64::from(strike.attack) * strike.multiplier * (1.0 - reduction);
    let damage = (raw.floor() as i32).max(1);
    player.take_damage(damage);
    exchange.damage_taken = damage;
    ctx.log.log_player_hit(PlayerHit {
        amount: damage,
        at: ctx.now,
        position: player.position,
        special: strike.special,
    });
}

fn player_attack(
    player: &mut Player,
    id: MonsterId,
    monster: &mut Monster,
    ctx: &mut CombatContext<'_>,
    exchange: &mut Exchange,
) {
    if !player.alive || !monster.is_alive() || player.combat.attack_cooldown_ms > 0 {
        return;
    }
    let critical = ctx.rng.chance_percent(total_crit_chance(player, ctx.traits));
    let bonus = 1.0
        + ctx.traits.damage_bonus(monster.category)
        + player.percentage.damage_bonus / 100.0;
    let base = f64::from(player.stats.derived().attack_power) * if critical { 2.0 } else { 1.0 };
    let damage = ((base * bonus).floor() as i32).max(1);

    exchange.player_attacked = true;
    exchange.critical = critical;
    exchange.damage_dealt = damage;
    exchange.killed = monster.take_damage(damage, ctx.now);

    player.combat.attack_cooldown_ms = player.attack_interval_ms(ctx.traits.attack_speed_bonus());
    player.combat.attack_anim_ms = ctx.config.player_attack_anim_ms;
    ctx.log.log_monster_hit(MonsterHit {
        monster: plain_id(id),
        amount: damage,
        at: ctx.now,
        position: monster.position,
        critical,
    });
}

/// Canonical one-on-one exchange: the monster swings first, then the player.
pub fn resolve_single(
    player: &mut Player,
    id: MonsterId,
    monster: &mut Monster,
    ctx: &mut CombatContext<'_>,
) -> Exchange {
    let mut exchange = Exchange::default();
    monster_attack(player, monster, ctx, &mut exchange);
    player_attack(player, id, monster, ctx, &mut exchange);
    exchange
}

/// Multi-engagement: the `cap` nearest living monsters in engagement range all swing,
/// the player hits the nearest.
pub fn resolve_batch(
    player: &mut Player,
    monsters: &mut SlotMap<MonsterId, Monster>,
    cap: usize,
    ctx: &mut CombatContext<'_>,
) -> Vec<(MonsterId, Exchange)> {
    let range = ctx.config.engagement_range();
    let mut group: Vec<(MonsterId, f64)> = monsters
        .iter()
        .filter(|(_, monster)| monster.is_alive())
        .map(|(id, monster)| (id, (monster.position - player.position).abs()))
        .filter(|(_, distance)| *distance <= range)
        .collect();
    group.sort_by(|a, b| a.1.total_cmp(&b.1));
    group.truncate(cap);

    let mut results = Vec::with_capacity(group.len());
    for (index, (id, _)) in group.into_iter().enumerate() {
        let Some(monster) = monsters.get_mut(id) else { continue };
        monster.engaged = true;
        let mut exchange = Exchange::default();
        monster_attack(player, monster, ctx, &mut exchange);
        if index == 0 {
            player_attack(player, id, monster, ctx, &mut exchange);
        }
        results.push((id, exchange));
    }
    results
}

/// Essence credited for one collected drop from `category`.
pub fn essence_reward(player: &Player, traits: &TraitEngine, category: MonsterCategory) -> u64 {
    let base = monster_profile(category).essence.saturating_add(traits.essence_bonus(category));
    let scaled = (f64::from(base) * player.percentage.essence_find).floor();
    if scaled.is_finite() { (scaled as u64).max(1) } else { 1 }
}

/// Kill bookkeeping for a monster that just died. Idempotent per monster.
pub fn grant_kill_rewards(
    player: &mut Player,
    monster: &mut Monster,
    traits: &mut TraitEngine,
    table: &[TraitDef],
    rng: &mut SimRng,
    now: u64,
) -> Option<KillRewards> {
    if monster.is_alive() || monster.rewarded {
        return None;
    }
    monster.rewarded = true;

    let unlocked = traits.record_kill(monster.category, now, table);
    player.update_stats(|stats| traits.apply_effects(stats));
    player.set_trait_health_bonus(traits.health_bonus());

    let derived = player.stats.derived();
    let xp_scaled = f64::from(monster.xp_value) * derived.xp_gain * player.percentage.xp_gain;
    let xp = if xp_scaled.is_finite() { xp_scaled.floor().max(0.0) as u32 } else { 0 };
    let levels_gained = player.gain_xp(xp);

    let drop_chance = (monster_profile(monster.category).drop_chance
        * derived.essence_drop_rate
        * (1.0 + traits.drop_rate_bonus(monster.category)))
    .min(1.0);
    let drop = rng
        .chance(drop_chance)
        .then(|| EssenceDrop::new(monster.position, monster.category));

    debug!(
        category = monster.category.as_str(),
        xp,
        levels_gained,
        dropped = drop.is_some(),
        "monster killed"
    );
    Some(KillRewards { xp, levels_gained, drop, unlocked })
}
