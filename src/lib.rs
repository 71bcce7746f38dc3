pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::memory::InMemoryLeague;
pub use config::toml_config::LeagueFile;
pub use core::workflow::{submit_scores, SubmissionReport};
pub use utils::error::{EngineError, Result};
