use crate::adapters::memory::InMemoryLeague;
use crate::config::toml_config::LeagueFile;
use crate::core::workflow::{submit_scores, SubmissionReport};
use crate::domain::model::{MatchDayId, PlayerId, SeasonId};
use crate::utils::error::{EngineError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum BatchOutcome {
    Applied(SubmissionReport),
    Rejected { match_day: MatchDayId, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStanding {
    pub player_id: PlayerId,
    pub name: String,
    pub points: u32,
    pub matches_scored: u32,
    pub index: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonReport {
    pub league: String,
    pub season: SeasonId,
    pub batches: Vec<BatchOutcome>,
    pub standings: Vec<PlayerStanding>,
}

/// 依檔案順序把每批成績送進 workflow，最後彙整積分榜
pub fn replay_season(file: &LeagueFile) -> Result<SeasonReport> {
    file.validate()?;
    let store = file.build_store()?;

    let mut batches = Vec::with_capacity(file.submissions.len());
    for batch in &file.submissions {
        match submit_scores(&store, &batch.match_day, &batch.scores) {
            Ok(report) => {
                tracing::info!(
                    "📥 {}: {} match(es) processed, status {}, {} warning(s)",
                    report.match_day,
                    report.matches.len(),
                    report.status,
                    report.warnings.len()
                );
                batches.push(BatchOutcome::Applied(report));
            }
            Err(e @ EngineError::StateViolation { .. }) => {
                tracing::warn!("⛔ {}", e);
                batches.push(BatchOutcome::Rejected {
                    match_day: batch.match_day.clone(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(SeasonReport {
        league: file.league.name.clone(),
        season: file.league.season.clone(),
        batches,
        standings: standings(&store)?,
    })
}

/// 積分高者在前，同分依球員 id
fn standings(store: &InMemoryLeague) -> Result<Vec<PlayerStanding>> {
    let mut table: BTreeMap<PlayerId, PlayerStanding> = store
        .players()?
        .into_iter()
        .map(|p| {
            (
                p.player_id.clone(),
                PlayerStanding {
                    player_id: p.player_id,
                    name: p.name,
                    points: 0,
                    matches_scored: 0,
                    index: p.index,
                },
            )
        })
        .collect();

    for record in store.matches()? {
        let Some(points) = record.points else {
            continue;
        };
        for (player, earned) in [
            (&record.player_a, points.points_a),
            (&record.player_b, points.points_b),
        ] {
            if let Some(row) = table.get_mut(player) {
                row.points += earned;
                row.matches_scored += 1;
            }
        }
    }

    let mut rows: Vec<PlayerStanding> = table.into_values().collect();
    rows.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.player_id.cmp(&b.player_id)));
    Ok(rows)
}
