pub mod combat;
pub mod config;
pub mod content;
pub mod damage_log;
pub mod entities;
pub mod error;
pub mod journal;
pub mod journal_file;
pub mod mode;
pub mod replay;
pub mod rng;
pub mod sim;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod stats;
pub mod trait_engine;
pub mod types;

pub use config::{Engagement, SimConfig};
pub use content::ContentPack;
pub use error::{CommandError, ContentError, TickError};
pub use journal::{InputJournal, InputRecord, JOURNAL_FORMAT_VERSION};
pub use journal_file::{JournalLoadError, JournalWriter, LoadedJournal, load_journal_from_file};
pub use replay::*;
pub use sim::Simulation;
pub use snapshot::Snapshot;
pub use state::WorldState;
pub use types::*;
