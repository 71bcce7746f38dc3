pub mod replay;
pub mod report;

pub use replay::{replay_season, BatchOutcome, SeasonReport};
