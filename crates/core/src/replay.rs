//! Deterministic re-execution of a command journal.
//! This module exists to prove a recorded session reproduces bit-for-bit from its seed.
//! It does not read files; see `journal_file`.

use std::sync::Arc;

use tracing::debug;

use crate::config::SimConfig;
use crate::content::ContentPack;
use crate::error::CommandError;
use crate::journal::InputJournal;
use crate::sim::Simulation;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ReplayError {
    #[error("journal content hash {journal:#018x} does not match loaded content {loaded:#018x}")]
    ContentMismatch { journal: u64, loaded: u64 },
    #[error("record {seq} targets tick {tick_boundary}, but the replay is already at {current}")]
    RecordInPast { seq: u64, tick_boundary: u64, current: u64 },
    #[error("record {seq} targets tick {tick_boundary}, past the replay end {target}")]
    RecordPastEnd { seq: u64, tick_boundary: u64, target: u64 },
    #[error("record {seq} was rejected: {source}")]
    Rejected { seq: u64, source: CommandError },
}

#[derive(Debug, PartialEq)]
pub struct ReplayResult {
    pub final_snapshot_hash: u64,
    pub final_tick: u64,
    pub applied_inputs: usize,
}

/// Rebuilds the session from `journal.seed`, applying each command at its tick
/// boundary, and stops once `target_tick` is reached.
pub fn replay_to_tick(
    config: &SimConfig,
    content: Arc<ContentPack>,
    journal: &InputJournal,
    target_tick: u64,
) -> Result<ReplayResult, ReplayError> {
    let mut sim = replay_inputs(config, content, journal, Some(target_tick))?;
    sim.advance_ticks(target_tick.saturating_sub(sim.current_tick()));

    Ok(ReplayResult {
        final_snapshot_hash: sim.snapshot_hash(),
        final_tick: sim.current_tick(),
        applied_inputs: journal.inputs.len(),
    })
}

/// Rebuilds a live simulation positioned right after the last journaled command.
/// Used to resume an interrupted session.
pub fn replay_journal_inputs(
    config: &SimConfig,
    content: Arc<ContentPack>,
    journal: &InputJournal,
) -> Result<Simulation, ReplayError> {
    replay_inputs(config, content, journal, None)
}

fn replay_inputs(
    config: &SimConfig,
    content: Arc<ContentPack>,
    journal: &InputJournal,
    target_tick: Option<u64>,
) -> Result<Simulation, ReplayError> {
    let loaded = content.content_hash();
    if journal.content_hash != 0 && journal.content_hash != loaded {
        return Err(ReplayError::ContentMismatch { journal: journal.content_hash, loaded });
    }

    let mut sim = Simulation::new(journal.seed, config.clone(), content);
    for record in &journal.inputs {
        let (seq, tick_boundary) = (record.seq, record.tick_boundary);
        if tick_boundary < sim.current_tick() {
            return Err(ReplayError::RecordInPast {
                seq,
                tick_boundary,
                current: sim.current_tick(),
            });
        }
        if let Some(target) = target_tick
            && tick_boundary > target
        {
            return Err(ReplayError::RecordPastEnd { seq, tick_boundary, target });
        }
        sim.advance_ticks(tick_boundary - sim.current_tick());
        sim.apply_command(record.command)
            .map_err(|source| ReplayError::Rejected { seq, source })?;
        debug!(seq, tick_boundary, command = ?record.command, "replayed command");
    }
    Ok(sim)
}
