//! Match-day workflow: applies a score batch to one match day inside a single
//! season-scoped transaction.
//!
//! Every step is recomputed from stored rounds and differentials, so replaying
//! the same batch converges to the same state.

use crate::core::absence::{absence_index_adjustment, absence_scores};
use crate::core::adjust::adjust_scores;
use crate::core::course_handicap::CourseHandicaps;
use crate::core::differential::score_differential;
use crate::core::handicap::{calculate_index, most_recent};
use crate::core::points::score_match;
use crate::core::strokes::allocate_match_strokes;
use crate::domain::model::{
    Course, Differential, Match, MatchDay, MatchDayId, MatchDayStatus, MatchId, MatchPoints,
    PlayerHandicap, PlayerId, ScoreSubmission, SeasonId,
};
use crate::domain::ports::{LeagueStore, SeasonTx};
use crate::utils::error::{EngineError, Result};
use crate::utils::validation::checked_sum;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchWarning {
    pub player_id: PlayerId,
    pub match_id: MatchId,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum MatchOutcome {
    Scored {
        match_id: MatchId,
        player_a: PlayerId,
        player_b: PlayerId,
        points: MatchPoints,
        strokes: BTreeMap<PlayerId, Vec<i32>>,
    },
    Pending {
        match_id: MatchId,
        waiting_for: Vec<PlayerId>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandicapUpdate {
    pub player_id: PlayerId,
    pub match_id: MatchId,
    pub adjusted_scores: Vec<i32>,
    pub adjusted_gross: i32,
    pub differential: f64,
    /// 打這一天時使用的 index
    pub previous_index: f64,
    pub index: f64,
    pub established: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsenceRecord {
    pub player_id: PlayerId,
    pub match_id: MatchId,
    pub playing_handicap: i32,
    pub scores: Vec<i32>,
    pub posted_index: f64,
    pub adjusted_index: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReport {
    pub match_day: MatchDayId,
    pub status: MatchDayStatus,
    pub locked_days: Vec<MatchDayId>,
    pub matches: Vec<MatchOutcome>,
    pub handicap_updates: Vec<HandicapUpdate>,
    pub absences: Vec<AbsenceRecord>,
    pub warnings: Vec<BatchWarning>,
}

impl SubmissionReport {
    fn untouched(day: &MatchDay, warnings: Vec<BatchWarning>) -> Self {
        Self {
            match_day: day.id.clone(),
            status: day.status,
            locked_days: Vec::new(),
            matches: Vec::new(),
            handicap_updates: Vec::new(),
            absences: Vec::new(),
            warnings,
        }
    }

    /// 部分成績被拒絕，但有效的仍已寫入
    pub fn is_partial(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// 送出一個比賽日的成績批次。
///
/// 無效的項目變成 warning，有效的項目連同狀態轉換與鎖定連鎖在同一個交易內提交。
/// 比賽日已鎖定時整批拒絕，不留下任何寫入。
pub fn submit_scores<S: LeagueStore>(
    store: &S,
    match_day: &MatchDayId,
    batch: &[ScoreSubmission],
) -> Result<SubmissionReport> {
    let season = store.season_of(match_day)?;
    tracing::debug!(
        "Submitting {} score entries for match day {} (season {})",
        batch.len(),
        match_day,
        season
    );

    store.in_transaction(&season, |tx| apply_batch(tx, match_day, batch))
}

pub fn match_day_status<S: LeagueStore>(store: &S, match_day: &MatchDayId) -> Result<MatchDayStatus> {
    let season = store.season_of(match_day)?;
    store.in_transaction(&season, |tx| Ok(tx.match_day(match_day)?.status))
}

pub fn player_index<S: LeagueStore>(
    store: &S,
    season: &SeasonId,
    player: &PlayerId,
) -> Result<PlayerHandicap> {
    store.in_transaction(season, |tx| tx.player(player))
}

fn apply_batch(
    tx: &mut dyn SeasonTx,
    match_day: &MatchDayId,
    batch: &[ScoreSubmission],
) -> Result<SubmissionReport> {
    let day = tx.match_day(match_day)?;
    if !day.status.accepts_scores() {
        tracing::warn!("Rejecting scores for {} match day {}", day.status, day.id);
        return Err(EngineError::StateViolation {
            match_day: day.id.to_string(),
            status: day.status.to_string(),
        });
    }

    let course = tx.course(&day.course_id)?;
    let matches = tx.matches_for_day(&day.id)?;

    let (accepted, warnings) = screen_entries(batch, &matches, &course);
    if accepted.is_empty() {
        tracing::warn!("No valid entries for match day {}; nothing committed", day.id);
        return Ok(SubmissionReport::untouched(&day, warnings));
    }

    let mut handicap_updates = Vec::new();
    let mut absences = Vec::new();
    let mut touched: BTreeSet<MatchId> = BTreeSet::new();

    for entry in accepted {
        tx.save_round(entry.clone())?;
        touched.insert(entry.match_id.clone());

        if entry.absent {
            absences.push(record_absence(tx, &day, &course, entry)?);
        } else {
            handicap_updates.push(post_round(tx, &day, &course, entry)?);
        }
    }

    let mut outcomes = Vec::new();
    for record in matches.iter().filter(|m| touched.contains(&m.id)) {
        outcomes.push(score_one_match(tx, &day, &course, record)?);
    }

    let status = advance_status(tx, &day)?;
    let locked_days = lock_earlier_days(tx, &day)?;

    Ok(SubmissionReport {
        match_day: day.id.clone(),
        status,
        locked_days,
        matches: outcomes,
        handicap_updates,
        absences,
        warnings,
    })
}

/// 過濾批次：未知比賽、不在該比賽的球員、重複項目、洞數不符或負成績都轉成 warning
fn screen_entries<'a>(
    batch: &'a [ScoreSubmission],
    matches: &[Match],
    course: &Course,
) -> (Vec<&'a ScoreSubmission>, Vec<BatchWarning>) {
    let mut accepted = Vec::new();
    let mut warnings = Vec::new();
    let mut seen: HashSet<(&MatchId, &PlayerId)> = HashSet::new();

    for entry in batch {
        let problem = match matches.iter().find(|m| m.id == entry.match_id) {
            None => Some(format!("match {} is not part of this match day", entry.match_id)),
            Some(m) if !m.involves(&entry.player_id) => Some(format!(
                "player {} does not play in match {}",
                entry.player_id, entry.match_id
            )),
            Some(_) if !seen.insert((&entry.match_id, &entry.player_id)) => {
                Some("duplicate entry in batch".to_string())
            }
            Some(_) => entry.validate_for(course).err().map(|e| e.to_string()),
        };

        match problem {
            Some(reason) => {
                tracing::warn!(
                    "Skipping entry for {} in {}: {}",
                    entry.player_id,
                    entry.match_id,
                    reason
                );
                warnings.push(BatchWarning {
                    player_id: entry.player_id.clone(),
                    match_id: entry.match_id.clone(),
                    reason,
                });
            }
            None => accepted.push(entry),
        }
    }

    (accepted, warnings)
}

/// 打這一天時使用的差點：只看比賽日之前的 differential，重送時結果不變
fn handicaps_for_day(
    tx: &dyn SeasonTx,
    day: &MatchDay,
    course: &Course,
    player: &PlayerId,
) -> Result<(CourseHandicaps, Vec<Differential>)> {
    let seed = tx.player(player)?;
    let prior: Vec<Differential> = tx
        .differentials(player)?
        .into_iter()
        .filter(|d| d.date < day.date)
        .collect();

    let index = calculate_index(&prior, seed.provisional)?.index;
    Ok((CourseHandicaps::for_course(index, course)?, prior))
}

fn post_round(
    tx: &mut dyn SeasonTx,
    day: &MatchDay,
    course: &Course,
    entry: &ScoreSubmission,
) -> Result<HandicapUpdate> {
    let (handicaps, _) = handicaps_for_day(tx, day, course, &entry.player_id)?;

    let adjusted_scores = adjust_scores(&entry.gross, course, handicaps.rounded_course_handicap())?;
    let adjusted_gross = checked_sum("adjusted_gross", &adjusted_scores)?;
    let differential = score_differential(adjusted_gross, course.course_rating, course.slope_rating)?;

    tx.save_differential(
        &entry.player_id,
        Differential {
            value: differential,
            date: day.date,
            match_id: Some(entry.match_id.clone()),
        },
    )?;
    let (index, established) = refresh_index(tx, &entry.player_id)?;

    tracing::debug!(
        "{}: adjusted gross {}, differential {:.1}, index {:.1} -> {:.1}",
        entry.player_id,
        adjusted_gross,
        differential,
        handicaps.index,
        index
    );

    Ok(HandicapUpdate {
        player_id: entry.player_id.clone(),
        match_id: entry.match_id.clone(),
        adjusted_scores,
        adjusted_gross,
        differential,
        previous_index: handicaps.index,
        index,
        established,
    })
}

fn record_absence(
    tx: &mut dyn SeasonTx,
    day: &MatchDay,
    course: &Course,
    entry: &ScoreSubmission,
) -> Result<AbsenceRecord> {
    let (handicaps, prior) = handicaps_for_day(tx, day, course, &entry.player_id)?;
    let scores = absence_scores(handicaps.playing_handicap, course)?;
    let adjusted_index = absence_index_adjustment(handicaps.index, &most_recent(&prior))?;

    // 從出賽改成缺席時，拿掉先前這場產生的 differential
    tx.remove_differential(&entry.player_id, &entry.match_id)?;
    refresh_index(tx, &entry.player_id)?;

    tracing::info!(
        "{} absent from {}: playing handicap {}, adjusted index {:.1}",
        entry.player_id,
        entry.match_id,
        handicaps.playing_handicap,
        adjusted_index
    );

    Ok(AbsenceRecord {
        player_id: entry.player_id.clone(),
        match_id: entry.match_id.clone(),
        playing_handicap: handicaps.playing_handicap,
        scores,
        posted_index: handicaps.index,
        adjusted_index,
    })
}

fn refresh_index(tx: &mut dyn SeasonTx, player: &PlayerId) -> Result<(f64, bool)> {
    let seed = tx.player(player)?;
    let calc = calculate_index(&tx.differentials(player)?, seed.provisional)?;
    tx.set_handicap_index(player, calc.index)?;
    Ok((calc.index, calc.established))
}

/// 比賽用的每洞成績：出賽用總桿，缺席用代打成績
fn scores_for_match(
    tx: &dyn SeasonTx,
    day: &MatchDay,
    course: &Course,
    match_id: &MatchId,
    player: &PlayerId,
) -> Result<(i32, Option<Vec<i32>>)> {
    let (handicaps, _) = handicaps_for_day(tx, day, course, player)?;
    let scores = match tx.round(match_id, player)? {
        Some(round) if round.absent => Some(absence_scores(handicaps.playing_handicap, course)?),
        Some(round) => Some(round.gross),
        None => None,
    };
    Ok((handicaps.playing_handicap, scores))
}

fn score_one_match(
    tx: &mut dyn SeasonTx,
    day: &MatchDay,
    course: &Course,
    record: &Match,
) -> Result<MatchOutcome> {
    let (handicap_a, scores_a) = scores_for_match(tx, day, course, &record.id, &record.player_a)?;
    let (handicap_b, scores_b) = scores_for_match(tx, day, course, &record.id, &record.player_b)?;

    let strokes = allocate_match_strokes(
        &record.player_a,
        handicap_a,
        &record.player_b,
        handicap_b,
        course,
    )?;

    let points = match score_match(
        &record.id,
        (&record.player_a, scores_a.as_deref()),
        (&record.player_b, scores_b.as_deref()),
        &strokes,
    ) {
        Ok(points) => points,
        Err(EngineError::MissingCounterpart { .. }) => {
            let waiting_for = [(&record.player_a, &scores_a), (&record.player_b, &scores_b)]
                .into_iter()
                .filter(|(_, scores)| scores.is_none())
                .map(|(player, _)| player.clone())
                .collect();
            tracing::debug!("Match {} deferred until both players have scores", record.id);
            return Ok(MatchOutcome::Pending {
                match_id: record.id.clone(),
                waiting_for,
            });
        }
        Err(e) => return Err(e),
    };

    tracing::debug!(
        "Match {}: {} {} - {} {}",
        record.id,
        record.player_a,
        points.points_a,
        points.points_b,
        record.player_b
    );

    let by_player = strokes.by_player();
    tx.save_match(Match {
        points: Some(points),
        strokes: Some(strokes),
        ..record.clone()
    })?;

    Ok(MatchOutcome::Scored {
        match_id: record.id.clone(),
        player_a: record.player_a.clone(),
        player_b: record.player_b.clone(),
        points,
        strokes: by_player,
    })
}

/// 當天每場都有積分時 scheduled -> completed
fn advance_status(tx: &mut dyn SeasonTx, day: &MatchDay) -> Result<MatchDayStatus> {
    let matches = tx.matches_for_day(&day.id)?;
    let all_scored = !matches.is_empty() && matches.iter().all(Match::is_scored);

    if day.status != MatchDayStatus::Scheduled || !all_scored {
        return Ok(day.status);
    }

    let status = day.status.transition_to(MatchDayStatus::Completed)?;
    set_day_status(tx, &day.id, matches, status)?;
    tracing::info!("Match day {} completed", day.id);
    Ok(status)
}

/// 較晚的比賽日收到成績時，同賽季所有較早且尚未鎖定的比賽日一併鎖定
fn lock_earlier_days(tx: &mut dyn SeasonTx, day: &MatchDay) -> Result<Vec<MatchDayId>> {
    let mut locked = Vec::new();

    for earlier in tx.match_days()? {
        if earlier.date >= day.date || earlier.status == MatchDayStatus::Locked {
            continue;
        }
        let status = earlier.status.transition_to(MatchDayStatus::Locked)?;
        let matches = tx.matches_for_day(&earlier.id)?;
        set_day_status(tx, &earlier.id, matches, status)?;
        locked.push(earlier.id);
    }

    if !locked.is_empty() {
        tracing::info!(
            "Scores on {} locked {} earlier match day(s) in season {}",
            day.id,
            locked.len(),
            tx.season_id()
        );
    }
    Ok(locked)
}

fn set_day_status(
    tx: &mut dyn SeasonTx,
    id: &MatchDayId,
    matches: Vec<Match>,
    status: MatchDayStatus,
) -> Result<()> {
    tx.set_match_day_status(id, status)?;
    for record in matches {
        tx.save_match(Match { status, ..record })?;
    }
    Ok(())
}
