use crate::core::{LeagueStore, SeasonTx};
use crate::domain::model::{
    Course, CourseId, Differential, Match, MatchDay, MatchDayId, MatchDayStatus, MatchId,
    PlayerHandicap, PlayerId, ScoreSubmission, SeasonId,
};
use crate::utils::error::{EngineError, Result};
use crate::utils::validation::Validate;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
struct LeagueState {
    courses: HashMap<CourseId, Course>,
    players: BTreeMap<PlayerId, PlayerHandicap>,
    differentials: HashMap<PlayerId, Vec<Differential>>,
    match_days: BTreeMap<MatchDayId, MatchDay>,
    matches: BTreeMap<MatchId, Match>,
    rounds: BTreeMap<(MatchId, PlayerId), ScoreSubmission>,
}

/// 記憶體內的聯盟資料。交易期間持有整個鎖，在副本上操作，成功才寫回。
#[derive(Debug, Default)]
pub struct InMemoryLeague {
    state: Mutex<LeagueState>,
}

impl InMemoryLeague {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, LeagueState>> {
        self.state.lock().map_err(|_| EngineError::Storage {
            message: "league state lock poisoned".to_string(),
        })
    }

    pub fn add_course(&self, course: Course) -> Result<()> {
        course.validate()?;
        self.lock()?.courses.insert(course.id.clone(), course);
        Ok(())
    }

    pub fn add_player(&self, player: PlayerHandicap) -> Result<()> {
        self.lock()?.players.insert(player.player_id.clone(), player);
        Ok(())
    }

    pub fn add_differential(&self, player: &PlayerId, differential: Differential) -> Result<()> {
        let mut state = self.lock()?;
        if !state.players.contains_key(player) {
            return Err(EngineError::not_found("player", player));
        }
        state
            .differentials
            .entry(player.clone())
            .or_default()
            .push(differential);
        Ok(())
    }

    pub fn add_match_day(&self, day: MatchDay) -> Result<()> {
        let mut state = self.lock()?;
        if !state.courses.contains_key(&day.course_id) {
            return Err(EngineError::not_found("course", &day.course_id));
        }
        state.match_days.insert(day.id.clone(), day);
        Ok(())
    }

    pub fn add_match(&self, record: Match) -> Result<()> {
        let mut state = self.lock()?;
        if !state.match_days.contains_key(&record.match_day_id) {
            return Err(EngineError::not_found("match day", &record.match_day_id));
        }
        for player in [&record.player_a, &record.player_b] {
            if !state.players.contains_key(player) {
                return Err(EngineError::not_found("player", player));
            }
        }
        state.matches.insert(record.id.clone(), record);
        Ok(())
    }

    pub fn match_day(&self, id: &MatchDayId) -> Result<MatchDay> {
        self.lock()?
            .match_days
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("match day", id))
    }

    pub fn get_match(&self, id: &MatchId) -> Result<Match> {
        self.lock()?
            .matches
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("match", id))
    }

    pub fn matches(&self) -> Result<Vec<Match>> {
        Ok(self.lock()?.matches.values().cloned().collect())
    }

    pub fn players(&self) -> Result<Vec<PlayerHandicap>> {
        Ok(self.lock()?.players.values().cloned().collect())
    }

    pub fn player(&self, id: &PlayerId) -> Result<PlayerHandicap> {
        self.lock()?
            .players
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("player", id))
    }

    pub fn differentials(&self, player: &PlayerId) -> Result<Vec<Differential>> {
        Ok(self
            .lock()?
            .differentials
            .get(player)
            .cloned()
            .unwrap_or_default())
    }
}

struct MemoryTx {
    season: SeasonId,
    state: LeagueState,
}

impl SeasonTx for MemoryTx {
    fn season_id(&self) -> &SeasonId {
        &self.season
    }

    fn match_day(&self, id: &MatchDayId) -> Result<MatchDay> {
        self.state
            .match_days
            .get(id)
            .filter(|day| day.season_id == self.season)
            .cloned()
            .ok_or_else(|| EngineError::not_found("match day", id))
    }

    fn match_days(&self) -> Result<Vec<MatchDay>> {
        let mut days: Vec<MatchDay> = self
            .state
            .match_days
            .values()
            .filter(|day| day.season_id == self.season)
            .cloned()
            .collect();
        days.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(days)
    }

    fn matches_for_day(&self, id: &MatchDayId) -> Result<Vec<Match>> {
        Ok(self
            .state
            .matches
            .values()
            .filter(|m| m.match_day_id == *id)
            .cloned()
            .collect())
    }

    fn course(&self, id: &CourseId) -> Result<Course> {
        self.state
            .courses
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("course", id))
    }

    fn player(&self, id: &PlayerId) -> Result<PlayerHandicap> {
        self.state
            .players
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("player", id))
    }

    fn differentials(&self, player: &PlayerId) -> Result<Vec<Differential>> {
        Ok(self
            .state
            .differentials
            .get(player)
            .cloned()
            .unwrap_or_default())
    }

    fn round(&self, match_id: &MatchId, player: &PlayerId) -> Result<Option<ScoreSubmission>> {
        Ok(self
            .state
            .rounds
            .get(&(match_id.clone(), player.clone()))
            .cloned())
    }

    fn save_round(&mut self, round: ScoreSubmission) -> Result<()> {
        self.state
            .rounds
            .insert((round.match_id.clone(), round.player_id.clone()), round);
        Ok(())
    }

    fn save_differential(&mut self, player: &PlayerId, differential: Differential) -> Result<()> {
        let history = self.state.differentials.entry(player.clone()).or_default();
        match history
            .iter_mut()
            .find(|d| d.match_id.is_some() && d.match_id == differential.match_id)
        {
            Some(existing) => *existing = differential,
            None => history.push(differential),
        }
        Ok(())
    }

    fn remove_differential(&mut self, player: &PlayerId, match_id: &MatchId) -> Result<()> {
        if let Some(history) = self.state.differentials.get_mut(player) {
            history.retain(|d| d.match_id.as_ref() != Some(match_id));
        }
        Ok(())
    }

    fn set_handicap_index(&mut self, player: &PlayerId, index: f64) -> Result<()> {
        let record = self
            .state
            .players
            .get_mut(player)
            .ok_or_else(|| EngineError::not_found("player", player))?;
        record.index = index;
        Ok(())
    }

    fn save_match(&mut self, record: Match) -> Result<()> {
        self.state.matches.insert(record.id.clone(), record);
        Ok(())
    }

    fn set_match_day_status(&mut self, id: &MatchDayId, status: MatchDayStatus) -> Result<()> {
        let day = self
            .state
            .match_days
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("match day", id))?;
        day.status = day.status.transition_to(status)?;
        Ok(())
    }
}

impl LeagueStore for InMemoryLeague {
    fn season_of(&self, match_day: &MatchDayId) -> Result<SeasonId> {
        Ok(self.match_day(match_day)?.season_id)
    }

    fn in_transaction<T, F>(&self, season: &SeasonId, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn SeasonTx) -> Result<T>,
    {
        let mut guard = self.lock()?;
        let mut tx = MemoryTx {
            season: season.clone(),
            state: guard.clone(),
        };

        let output = work(&mut tx)?;
        *guard = tx.state;
        Ok(output)
    }
}
