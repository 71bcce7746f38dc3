use crate::adapters::memory::InMemoryLeague;
use crate::core::handicap::calculate_index;
use crate::domain::model::{
    Course, CourseId, Differential, Match, MatchDay, MatchDayId, MatchDayStatus, MatchId,
    PlayerHandicap, PlayerId, ScoreSubmission, SeasonId,
};
use crate::utils::error::{EngineError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, Validate};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// provisional handicap 的合理範圍
const PROVISIONAL_RANGE: (f64, f64) = (-10.0, 54.0);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueFile {
    pub league: LeagueSection,
    pub courses: Vec<Course>,
    pub players: Vec<PlayerEntry>,
    #[serde(default)]
    pub match_days: Vec<MatchDayEntry>,
    #[serde(default)]
    pub submissions: Vec<SubmissionBatch>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueSection {
    pub name: String,
    pub season: SeasonId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub id: PlayerId,
    #[serde(default)]
    pub name: String,
    pub provisional: f64,
    /// 入會前的 differential
    #[serde(default)]
    pub history: Vec<HistoricalDifferential>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalDifferential {
    pub value: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDayEntry {
    pub id: MatchDayId,
    pub date: NaiveDate,
    pub course: CourseId,
    #[serde(default)]
    pub matches: Vec<MatchEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchEntry {
    pub id: MatchId,
    pub player_a: PlayerId,
    pub player_b: PlayerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionBatch {
    pub match_day: MatchDayId,
    #[serde(default)]
    pub scores: Vec<ScoreSubmission>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: Option<OutputFormat>,
    pub path: Option<String>,
}

impl LeagueFile {
    /// 從 TOML 檔案載入聯盟設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EngineError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${LEAGUE_SEASON})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EngineError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn output(&self) -> OutputConfig {
        self.output.clone().unwrap_or_default()
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("league.name", &self.league.name)?;
        validate_non_empty_string("league.season", self.league.season.as_str())?;

        let mut course_ids = HashSet::new();
        for course in &self.courses {
            course.validate()?;
            if !course_ids.insert(&course.id) {
                return Err(duplicate("courses.id", &course.id));
            }
        }

        let mut player_ids = HashSet::new();
        for player in &self.players {
            validate_non_empty_string("players.id", player.id.as_str())?;
            validate_range(
                "players.provisional",
                player.provisional,
                PROVISIONAL_RANGE.0,
                PROVISIONAL_RANGE.1,
            )?;
            if !player_ids.insert(&player.id) {
                return Err(duplicate("players.id", &player.id));
            }
        }

        let mut day_ids = HashSet::new();
        let mut match_ids = HashSet::new();
        for day in &self.match_days {
            if !day_ids.insert(&day.id) {
                return Err(duplicate("match_days.id", &day.id));
            }
            if !course_ids.contains(&day.course) {
                return Err(EngineError::not_found("course", &day.course));
            }

            // 同一天每位球員最多一場
            let mut playing_today = HashSet::new();
            for entry in &day.matches {
                if !match_ids.insert(&entry.id) {
                    return Err(duplicate("match_days.matches.id", &entry.id));
                }
                if entry.player_a == entry.player_b {
                    return Err(EngineError::invalid_input(
                        "match_days.matches",
                        &entry.id,
                        "A match needs two different players",
                    ));
                }
                for player in [&entry.player_a, &entry.player_b] {
                    if !player_ids.contains(player) {
                        return Err(EngineError::not_found("player", player));
                    }
                    if !playing_today.insert(player) {
                        return Err(EngineError::invalid_input(
                            "match_days.matches",
                            player,
                            format!("Player is scheduled twice on {}", day.id),
                        ));
                    }
                }
            }
        }

        for batch in &self.submissions {
            if !day_ids.contains(&batch.match_day) {
                return Err(EngineError::not_found("match day", &batch.match_day));
            }
        }

        Ok(())
    }

    /// 依設定建立記憶體內的聯盟資料
    pub fn build_store(&self) -> Result<InMemoryLeague> {
        let store = InMemoryLeague::new();

        for course in &self.courses {
            store.add_course(course.clone())?;
        }
        for player in &self.players {
            let history: Vec<Differential> = player
                .history
                .iter()
                .map(|past| Differential {
                    value: past.value,
                    date: past.date,
                    match_id: None,
                })
                .collect();

            // 帶著歷史成績入季的球員，index 直接由歷史算出
            let mut handicap =
                PlayerHandicap::seeded(player.id.clone(), player.name.clone(), player.provisional);
            handicap.index = calculate_index(&history, player.provisional)?.index;

            store.add_player(handicap)?;
            for differential in history {
                store.add_differential(&player.id, differential)?;
            }
        }
        for day in &self.match_days {
            store.add_match_day(MatchDay {
                id: day.id.clone(),
                season_id: self.league.season.clone(),
                date: day.date,
                course_id: day.course.clone(),
                status: MatchDayStatus::Scheduled,
            })?;
            for entry in &day.matches {
                store.add_match(Match::scheduled(
                    entry.id.clone(),
                    day.id.clone(),
                    day.course.clone(),
                    entry.player_a.clone(),
                    entry.player_b.clone(),
                ))?;
            }
        }

        Ok(store)
    }
}

fn duplicate(field: &str, id: impl ToString) -> EngineError {
    EngineError::invalid_input(field, id, "Duplicate id")
}

impl Validate for LeagueFile {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
