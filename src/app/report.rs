use crate::app::replay::{BatchOutcome, SeasonReport};
use crate::core::workflow::MatchOutcome;
use crate::domain::model::{MatchDayId, MatchDayStatus};
use crate::utils::error::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;

#[derive(Debug, Serialize)]
struct MatchRow<'a> {
    match_day: &'a str,
    #[serde(rename = "match")]
    match_id: &'a str,
    player_a: &'a str,
    player_b: &'a str,
    points_a: u32,
    points_b: u32,
    status: MatchDayStatus,
}

pub fn write_json<W: Write>(report: &SeasonReport, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

/// 每場已計分的比賽一列；同一場被更正過時以最後一次為準。
/// status 是整季重播結束時該比賽日的狀態，不是計分當下的狀態。
pub fn write_csv<W: Write>(report: &SeasonReport, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut rows: Vec<MatchRow<'_>> = Vec::new();
    let final_status = final_day_status(report);

    for batch in &report.batches {
        let BatchOutcome::Applied(applied) = batch else {
            continue;
        };
        for outcome in &applied.matches {
            if let MatchOutcome::Scored {
                match_id,
                player_a,
                player_b,
                points,
                ..
            } = outcome
            {
                rows.retain(|row| row.match_id != match_id.as_str());
                rows.push(MatchRow {
                    match_day: applied.match_day.as_str(),
                    match_id: match_id.as_str(),
                    player_a: player_a.as_str(),
                    player_b: player_b.as_str(),
                    points_a: points.points_a,
                    points_b: points.points_b,
                    status: final_status
                        .get(&applied.match_day)
                        .copied()
                        .unwrap_or(applied.status),
                });
            }
        }
    }

    for row in &rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// 依批次順序累積每個比賽日的狀態，後面批次連帶鎖定的日子也算進去
fn final_day_status(report: &SeasonReport) -> HashMap<&MatchDayId, MatchDayStatus> {
    let mut statuses: HashMap<&MatchDayId, MatchDayStatus> = HashMap::new();

    for batch in &report.batches {
        let BatchOutcome::Applied(applied) = batch else {
            continue;
        };
        let current = statuses.entry(&applied.match_day).or_insert(applied.status);
        *current = (*current).max(applied.status);
        for locked in &applied.locked_days {
            statuses.insert(locked, MatchDayStatus::Locked);
        }
    }

    statuses
}
