use super::test_support::*;
use super::*;
use crate::config::Engagement;
use crate::entities::EssenceDrop;
use crate::types::PetReaction;

#[test]
fn first_tick_runs_forward_and_spawns_ahead() {
    let mut sim = default_sim(1);
    sim.advance();
    let world = sim.world();
    assert_eq!(sim.current_tick(), 1);
    assert_eq!(sim.now(), 16);
    assert_eq!(world.player.position, 2.0);
    assert_eq!(sim.mode(), GameMode::Running);
    assert_eq!(world.monsters.len(), 1);
    assert!(world.monsters.values().all(|monster| monster.position >= 600.0));
}

#[test]
fn monster_in_reach_is_engaged_and_running_stops() {
    let mut sim = default_sim(2);
    let id = place_training_dummy(&mut sim, 60.0);
    sim.advance();
    assert_eq!(sim.mode(), GameMode::Combat);
    assert_eq!(sim.world().mode.engaged(), Some(id));
    assert!(sim.world().player.combat.in_combat);
    assert!(sim.world().monsters[id].engaged);

    let position = sim.world().player.position;
    sim.advance_ticks(100);
    assert_eq!(sim.mode(), GameMode::Combat);
    assert_eq!(sim.world().player.position, position);
    assert!(sim.world().monsters[id].health < 1_000_000);
}

#[test]
fn kill_holds_combat_through_the_exit_delay() {
    let mut sim = default_sim(3);
    make_player_strong(&mut sim);
    let id = place_monster(&mut sim, MonsterCategory::Wolf, 40.0);
    sim.advance();
    sim.advance();

    let world = sim.world();
    assert!(!world.monsters[id].is_alive());
    assert_eq!(world.traits.kills(MonsterCategory::Wolf), 1);
    assert_eq!(world.mode.mode(), GameMode::Combat);
    assert!(world.mode.combat_exit_pending());
    let killed_at = sim.now();

    assert!(run_until(&mut sim, 40, |sim| sim.mode() == GameMode::Running));
    assert!(sim.now() >= killed_at + sim.config().combat_exit_delay_ms);
    assert!(!sim.world().player.combat.in_combat);
}

#[test]
fn leveling_kill_walks_through_level_up_and_trait_select() {
    let mut sim = default_sim(4);
    make_player_strong(&mut sim);
    sim.world_mut().player.xp = 9;
    place_monster(&mut sim, MonsterCategory::Wolf, 40.0);
    sim.advance();
    sim.advance();
    assert_eq!(sim.world().player.level, 2);
    assert_eq!(sim.mode(), GameMode::LevelUp);
    assert_eq!(sim.world().mode.levelup_return(), GameMode::Combat);

    sim.advance();
    assert_eq!(sim.mode(), GameMode::TraitSelect);
    assert_eq!(sim.world().mode.previous(), GameMode::LevelUp);

    let strength = sim.world().player.stats.base().strength;
    let bonus = sim.apply_trait(StatKind::Strength).expect("trait is pending");
    let world = sim.world();
    assert!(!world.player.pending_trait);
    assert_eq!(world.player.chosen_traits, vec![StatKind::Strength]);
    assert!(world.player.stats.base().strength > strength);
    assert_eq!(world.player.random_bonuses, vec![bonus]);
    assert_eq!(world.bonus_notification.map(|note| note.bonus), Some(bonus));
    assert_eq!(sim.mode(), GameMode::LevelUp);

    assert!(run_until(&mut sim, 200, |sim| sim.mode() == GameMode::Running));
    assert!(sim.world().mode.engaged().is_none());
    assert_eq!(sim.input_count(), 1);
}

#[test]
fn apply_trait_without_pending_choice_changes_nothing() {
    let mut sim = default_sim(5);
    sim.advance_ticks(3);
    let before = sim.snapshot();
    assert_eq!(sim.apply_trait(StatKind::Luck), Err(CommandError::NoPendingTrait));
    assert_eq!(sim.snapshot(), before);
    assert_eq!(sim.input_count(), 0);
}

#[test]
fn death_is_terminal_until_restart() {
    let mut sim = default_sim(6);
    sim.advance_ticks(5);
    let epoch = sim.world().mode.epoch();
    sim.world_mut().player.take_damage(10_000);
    sim.advance();
    assert_eq!(sim.mode(), GameMode::Dead);
    assert_eq!(sim.world().pet.reaction, PetReaction::Death);

    let position = sim.world().player.position;
    sim.advance_ticks(50);
    assert_eq!(sim.mode(), GameMode::Dead);
    assert_eq!(sim.world().player.position, position);
    assert_eq!(sim.apply_trait(StatKind::Strength), Err(CommandError::PlayerDead));

    let tick = sim.current_tick();
    sim.restart();
    let world = sim.world();
    assert_eq!(world.mode.mode(), GameMode::Running);
    assert!(world.mode.epoch() > epoch);
    assert_eq!(world.player.level, 1);
    assert_eq!(world.player.position, 0.0);
    assert_eq!(world.player.health, world.player.max_health());
    assert!(world.monsters.is_empty());
    assert_eq!(sim.current_tick(), tick);

    sim.advance();
    assert_eq!(sim.world().player.position, 2.0);
}

#[test]
fn death_in_combat_releases_the_engaged_monster() {
    let mut sim = default_sim(13);
    let id = place_training_dummy(&mut sim, 60.0);
    sim.advance();
    assert!(sim.world().monsters[id].engaged);

    sim.world_mut().player.take_damage(10_000);
    sim.advance();
    assert_eq!(sim.mode(), GameMode::Dead);
    assert!(!sim.world().monsters[id].engaged);
    assert!(sim.world().mode.engaged().is_none());
    assert!(sim.snapshot().monsters.iter().all(|monster| !monster.engaged));
}

#[test]
fn lost_engagement_is_forced_back_to_running() {
    let mut sim = default_sim(14);
    let lost = place_training_dummy(&mut sim, 60.0);
    let bystander = place_training_dummy(&mut sim, 150.0);
    sim.advance();
    assert_eq!(sim.world().mode.engaged(), Some(lost));

    let world = sim.world_mut();
    world.monsters.remove(lost);
    world.monsters[bystander].engaged = true;
    let position = world.player.position;
    sim.advance();

    let world = sim.world();
    assert_eq!(world.mode.mode(), GameMode::Running);
    assert!(!world.mode.combat_exit_pending());
    assert!(world.mode.engaged().is_none());
    assert!(!world.player.combat.in_combat);
    assert!(!world.monsters[bystander].engaged);
    assert!(world.player.position > position);
}

#[test]
fn restart_drops_the_old_runs_combat_exit() {
    let mut sim = default_sim(7);
    make_player_strong(&mut sim);
    place_monster(&mut sim, MonsterCategory::Wolf, 40.0);
    sim.advance_ticks(2);
    assert!(sim.world().mode.combat_exit_pending());

    sim.restart();
    let dummy = place_training_dummy(&mut sim, 40.0);
    sim.advance();
    assert_eq!(sim.world().mode.engaged(), Some(dummy));

    sim.advance_ticks(60);
    assert_eq!(sim.mode(), GameMode::Combat);
    assert_eq!(sim.world().mode.engaged(), Some(dummy));
}

#[test]
fn invalid_tick_is_rolled_back_and_counted() {
    let mut sim = default_sim(8);
    sim.advance();
    let max = sim.world().player.max_health();
    sim.world_mut().player.health = max + 50;

    sim.advance();
    assert_eq!(sim.failed_ticks(), 1);
    assert_eq!(sim.current_tick(), 2);
    assert_eq!(sim.world().player.position, 2.0);
    assert_eq!(sim.snapshot().failed_ticks, 1);
}

#[test]
fn grounded_drop_next_to_player_is_collected() {
    let mut sim = default_sim(9);
    sim.advance();
    let mut drop = EssenceDrop::new(sim.world().player.position + 25.0, MonsterCategory::Goblin);
    drop.y = 0.0;
    let id = sim.world_mut().drops.insert(drop);

    sim.advance();
    assert!(sim.world().drops[id].is_collected());
    assert_eq!(sim.world().player.essence, 2);
    assert!(sim.snapshot().drops.is_empty());

    sim.advance_ticks(60);
    assert!(sim.world().drops.get(id).is_none());
}

#[test]
fn changing_pet_type_swaps_the_bonus_and_keeps_progress() {
    let mut sim = sim_with_pet(10, PetType::Paw);
    let current = sim.world().player.stats.current();
    assert_eq!((current.strength, current.dexterity), (5, 7));

    sim.world_mut().pet.level = 2;
    sim.world_mut().pet.xp = 3;
    sim.change_pet_type(PetType::Teddy);
    let world = sim.world();
    let current = world.player.stats.current();
    assert_eq!((current.strength, current.dexterity), (9, 5));
    assert_eq!((world.pet.kind, world.pet.level, world.pet.xp), (PetType::Teddy, 2, 3));
    assert_eq!(sim.snapshot().pet.name, "Teddy Friend");
}

#[test]
fn same_seed_same_run() {
    let mut first = default_sim(11);
    let mut second = default_sim(11);
    for tick in 0..900u64 {
        if tick == 450 {
            first.restart();
            second.restart();
        }
        first.advance();
        second.advance();
    }
    assert_eq!(first.snapshot_hash(), second.snapshot_hash());
    assert_eq!(first.snapshot(), second.snapshot());
    assert_eq!(first.snapshot(), first.snapshot());
}

#[test]
fn batch_mode_engages_every_monster_in_reach() {
    let config = SimConfig { engagement: Engagement::Batch { cap: 3 }, ..SimConfig::default() };
    let mut sim = Simulation::with_pet(12, config, Arc::new(ContentPack::default()), PetType::Star);
    let near = place_training_dummy(&mut sim, 40.0);
    let other = place_training_dummy(&mut sim, 55.0);
    sim.advance();
    assert_eq!(sim.world().mode.engaged(), Some(near));

    sim.advance();
    assert!(sim.world().monsters[near].engaged);
    assert!(sim.world().monsters[other].engaged);
    assert_eq!(sim.mode(), GameMode::Combat);
}
