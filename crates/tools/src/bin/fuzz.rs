use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use runner_core::{
    CommandError, ContentPack, Engagement, GameMode, PetType, SimConfig, Simulation, StatKind,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 10_000)]
    ticks: u64,
    /// Use multi-engagement combat with this cap.
    #[arg(long)]
    batch: Option<usize>,
}

fn choose<T: Copy>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p]
}

fn check_invariants(sim: &Simulation) -> Result<()> {
    let world = sim.world();
    let player = &world.player;
    let tick = sim.current_tick();
    if player.health < 0 || player.health > player.max_health() {
        bail!("tick {tick}: player health {} > max {}", player.health, player.max_health());
    }
    if player.mana < 0.0 || player.mana > player.max_mana() {
        bail!("tick {tick}: player mana {} outside bounds", player.mana);
    }
    for (_, monster) in &world.monsters {
        if monster.health < 0 || monster.health > monster.max_health {
            bail!("tick {tick}: monster health {} outside bounds", monster.health);
        }
    }
    let mode = &world.mode;
    if mode.mode() == GameMode::Combat
        && !mode.combat_exit_pending()
        && !mode.engaged().is_some_and(|id| world.live_monster(id).is_some())
    {
        bail!("tick {tick}: combat without a living engaged monster");
    }
    if player.alive == (mode.mode() == GameMode::Dead) {
        bail!("tick {tick}: alive={} in mode {:?}", player.alive, mode.mode());
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();

    println!("Starting fuzz harness on seed {} for {} ticks...", args.seed, args.ticks);
    let engagement = args.batch.map_or(Engagement::Single, |cap| Engagement::Batch { cap });
    let config = SimConfig { engagement, ..SimConfig::default() };
    let mut sim = Simulation::new(args.seed, config, Arc::new(ContentPack::default()));
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut restarts = 0u32;

    while sim.current_tick() < args.ticks {
        let player = &sim.world().player;
        if !player.alive {
            restarts += 1;
            sim.restart();
        } else if player.pending_trait {
            sim.apply_trait(choose(&mut rng, &StatKind::ALL))?;
        } else {
            match rng.next_u64() % 500 {
                // Unprompted trait choices must be rejected without side effects.
                0 => {
                    let before = sim.snapshot_hash();
                    if sim.apply_trait(choose(&mut rng, &StatKind::ALL))
                        != Err(CommandError::NoPendingTrait)
                    {
                        bail!("trait accepted without a pending choice");
                    }
                    if sim.snapshot_hash() != before {
                        bail!("rejected trait choice changed the world");
                    }
                }
                1 => sim.change_pet_type(choose(&mut rng, &PetType::ALL)),
                2 if rng.next_u64() % 4 == 0 => {
                    warn!(tick = sim.current_tick(), "forcing a restart mid-run");
                    sim.restart();
                }
                _ => {}
            }
        }

        sim.advance();
        check_invariants(&sim)?;
    }

    if sim.failed_ticks() > 0 {
        bail!("{} ticks failed validation and were rolled back", sim.failed_ticks());
    }
    let snapshot = sim.snapshot();
    info!(restarts, level = snapshot.player.level, distance = snapshot.distance, "fuzz finished");
    println!("Fuzzing completed successfully. Hash: {}", sim.snapshot_hash());
    Ok(())
}
