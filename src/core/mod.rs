pub mod absence;
pub mod adjust;
pub mod course_handicap;
pub mod differential;
pub mod handicap;
pub mod points;
pub mod strokes;
pub mod workflow;

pub use crate::domain::model::{Course, Differential, MatchStrokes, ScoreSubmission};
pub use crate::domain::ports::{LeagueStore, SeasonTx};
pub use crate::utils::error::Result;
