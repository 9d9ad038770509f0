use serde::{Deserialize, Serialize};

use crate::types::Command;

pub const JOURNAL_FORMAT_VERSION: u16 = 1;

/// Commands applied to one session, in order, with the tick each was applied before.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputJournal {
    pub format_version: u16,
    pub build_id: String,
    pub content_hash: u64,
    pub seed: u64,
    pub inputs: Vec<InputRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    pub seq: u64,
    /// Value of `current_tick()` when the command was applied.
    pub tick_boundary: u64,
    pub command: Command,
}

impl InputJournal {
    pub fn new(seed: u64, content_hash: u64) -> Self {
        Self {
            format_version: JOURNAL_FORMAT_VERSION,
            build_id: "dev".to_string(),
            content_hash,
            seed,
            inputs: Vec::new(),
        }
    }

    pub fn append(&mut self, tick_boundary: u64, command: Command) -> u64 {
        let seq = self.inputs.len() as u64;
        self.inputs.push(InputRecord { seq, tick_boundary, command });
        seq
    }
}
