use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use runner_core::{
    Command, ContentPack, JournalWriter, PetType, SimConfig, Simulation, StatKind,
    load_journal_from_file, replay_to_tick,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Runs the simulation headless and prints the final snapshot as JSON.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Fixed ticks to simulate (16 ms each by default).
    #[arg(short, long, default_value_t = 3600)]
    ticks: u64,
    /// TOML file overriding `SimConfig` fields.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// JSON trait table replacing the built-in one.
    #[arg(long)]
    traits: Option<PathBuf>,
    /// Pet to switch to before the first tick.
    #[arg(long, value_parser = parse_pet)]
    pet: Option<PetType>,
    /// Stat spent on every trait choice.
    #[arg(long, value_parser = parse_stat, default_value = "strength")]
    pick: StatKind,
    /// Restart automatically when the player dies.
    #[arg(long)]
    auto_restart: bool,
    /// Write every applied command to this JSONL journal.
    #[arg(long, conflicts_with = "replay")]
    record: Option<PathBuf>,
    /// Replay a JSONL journal to `--ticks` instead of playing.
    #[arg(long)]
    replay: Option<PathBuf>,
    /// Print only the final snapshot hash.
    #[arg(long)]
    hash_only: bool,
}

fn parse_pet(raw: &str) -> Result<PetType, String> {
    PetType::parse(raw).ok_or_else(|| format!("unknown pet `{raw}` (paw, star, teddy, ghost)"))
}

fn parse_stat(raw: &str) -> Result<StatKind, String> {
    StatKind::parse(raw).ok_or_else(|| format!("unknown stat `{raw}` (str, dex, int, luk)"))
}

fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid config TOML: {}", path.display()))
}

fn load_content(path: Option<&Path>) -> Result<ContentPack> {
    let content = ContentPack::default();
    let Some(path) = path else {
        return Ok(content);
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read trait table: {}", path.display()))?;
    content
        .with_trait_table_json(&json)
        .with_context(|| format!("Unusable trait table: {}", path.display()))
}

fn replay(args: &Args, config: &SimConfig, content: Arc<ContentPack>, path: &Path) -> Result<()> {
    let loaded = load_journal_from_file(path)
        .with_context(|| format!("Failed to load journal: {}", path.display()))?;
    let result = replay_to_tick(config, content, &loaded.journal, args.ticks)
        .context("Replay failed during execution")?;

    info!(inputs = result.applied_inputs, tick = result.final_tick, "replay complete");
    if args.hash_only {
        println!("{}", result.final_snapshot_hash);
    } else {
        println!("Replay complete.");
        println!("Final Tick: {}", result.final_tick);
        println!("Applied Inputs: {}", result.applied_inputs);
        println!("Snapshot Hash: {}", result.final_snapshot_hash);
    }
    Ok(())
}

/// Applies a command and journals it when recording.
fn issue(sim: &mut Simulation, writer: Option<&mut JournalWriter>, command: Command) -> Result<()> {
    let tick = sim.current_tick();
    sim.apply_command(command).with_context(|| format!("Command {command:?} rejected"))?;
    if let Some(writer) = writer {
        writer.append(tick, command).context("Failed to append to journal")?;
    }
    Ok(())
}

fn play(args: &Args, config: SimConfig, content: Arc<ContentPack>) -> Result<()> {
    let mut sim = Simulation::new(args.seed, config, Arc::clone(&content));
    let mut writer = match &args.record {
        Some(path) => Some(
            JournalWriter::create(
                path,
                args.seed,
                env!("CARGO_PKG_VERSION"),
                content.content_hash(),
            )
            .with_context(|| format!("Failed to create journal: {}", path.display()))?,
        ),
        None => None,
    };

    if let Some(pet) = args.pet {
        issue(&mut sim, writer.as_mut(), Command::ChangePetType { pet })?;
    }

    let mut deaths = 0u32;
    while sim.current_tick() < args.ticks {
        let player = &sim.world().player;
        if !player.alive {
            if !args.auto_restart {
                break;
            }
            deaths += 1;
            issue(&mut sim, writer.as_mut(), Command::Restart)?;
        } else if player.pending_trait {
            issue(&mut sim, writer.as_mut(), Command::ApplyTrait { stat: args.pick })?;
        }
        sim.advance();
    }

    let snapshot = sim.snapshot();
    info!(
        tick = snapshot.tick,
        level = snapshot.player.level,
        distance = snapshot.distance,
        deaths,
        failed_ticks = snapshot.failed_ticks,
        "run finished"
    );
    if args.hash_only {
        println!("{}", sim.snapshot_hash());
    } else {
        let json = serde_json::to_string_pretty(&snapshot).context("Failed to encode snapshot")?;
        println!("{json}");
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let content = Arc::new(load_content(args.traits.as_deref())?);
    if config.tick_ms == 0 {
        bail!("tick_ms must be positive");
    }

    match &args.replay {
        Some(path) => replay(&args, &config, content, path),
        None => play(&args, config, content),
    }
}
