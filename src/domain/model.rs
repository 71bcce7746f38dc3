use crate::utils::error::{EngineError, Result};
use crate::utils::validation::{
    checked_sum, validate_len, validate_non_negative_scores, validate_permutation, validate_positive_number,
    Validate,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_type!(PlayerId);
id_type!(MatchId);
id_type!(MatchDayId);
id_type!(SeasonId);
id_type!(CourseId);

/// 球場：每洞 par、每洞難度 (stroke index)、course rating 與 slope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    #[serde(default)]
    pub name: String,
    pub pars: Vec<i32>,
    pub stroke_indices: Vec<u32>,
    pub course_rating: f64,
    pub slope_rating: i32,
    pub par: i32,
}

impl Course {
    pub fn hole_count(&self) -> usize {
        self.pars.len()
    }

    pub fn total_par(&self) -> i32 {
        self.pars.iter().sum()
    }
}

impl Validate for Course {
    fn validate(&self) -> Result<()> {
        validate_positive_number("course.holes", self.pars.len() as i64, 1)?;
        validate_len("course.stroke_indices", &self.stroke_indices, self.pars.len())?;
        validate_permutation("course.stroke_indices", &self.stroke_indices)?;
        validate_positive_number("course.slope_rating", self.slope_rating.into(), 1)?;
        validate_positive_number("course.par", self.par.into(), 1)?;

        if let Some(par) = self.pars.iter().find(|p| **p < 1) {
            return Err(EngineError::invalid_input(
                "course.pars",
                par,
                "Hole par must be at least 1",
            ));
        }
        checked_sum("course.pars", &self.pars)?;
        if !self.course_rating.is_finite() {
            return Err(EngineError::invalid_input(
                "course.course_rating",
                self.course_rating,
                "Course rating must be a finite number",
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub player_id: PlayerId,
    pub match_id: MatchId,
    #[serde(default)]
    pub gross: Vec<i32>,
    #[serde(default)]
    pub absent: bool,
}

impl ScoreSubmission {
    pub fn played(player_id: PlayerId, match_id: MatchId, gross: Vec<i32>) -> Self {
        Self {
            player_id,
            match_id,
            gross,
            absent: false,
        }
    }

    pub fn absent(player_id: PlayerId, match_id: MatchId) -> Self {
        Self {
            player_id,
            match_id,
            gross: Vec::new(),
            absent: true,
        }
    }

    /// 缺席時不檢查成績，出賽時每洞一個非負成績
    pub fn validate_for(&self, course: &Course) -> Result<()> {
        if self.absent {
            return Ok(());
        }
        validate_len("submission.gross", &self.gross, course.hole_count())?;
        validate_non_negative_scores("submission.gross", &self.gross)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Differential {
    pub value: f64,
    pub date: NaiveDate,
    /// 由哪一場比賽產生；入會前帶入的歷史成績沒有
    #[serde(default)]
    pub match_id: Option<MatchId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerHandicap {
    pub player_id: PlayerId,
    #[serde(default)]
    pub name: String,
    pub provisional: f64,
    pub index: f64,
}

impl PlayerHandicap {
    pub fn seeded(player_id: PlayerId, name: impl Into<String>, provisional: f64) -> Self {
        Self {
            player_id,
            name: name.into(),
            provisional,
            index: provisional,
        }
    }
}

/// 一場比賽的讓桿分配：只有差點較高的一方拿到非零桿數
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStrokes {
    pub player_a: PlayerId,
    pub strokes_a: Vec<i32>,
    pub player_b: PlayerId,
    pub strokes_b: Vec<i32>,
}

impl MatchStrokes {
    pub fn for_player(&self, player: &PlayerId) -> Option<&[i32]> {
        if *player == self.player_a {
            Some(&self.strokes_a)
        } else if *player == self.player_b {
            Some(&self.strokes_b)
        } else {
            None
        }
    }

    pub fn receiver(&self) -> Option<&PlayerId> {
        if self.strokes_a.iter().any(|s| *s != 0) {
            Some(&self.player_a)
        } else if self.strokes_b.iter().any(|s| *s != 0) {
            Some(&self.player_b)
        } else {
            None
        }
    }

    pub fn by_player(&self) -> BTreeMap<PlayerId, Vec<i32>> {
        BTreeMap::from([
            (self.player_a.clone(), self.strokes_a.clone()),
            (self.player_b.clone(), self.strokes_b.clone()),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchDayStatus {
    Scheduled,
    Completed,
    Locked,
}

impl MatchDayStatus {
    pub fn accepts_scores(self) -> bool {
        !matches!(self, MatchDayStatus::Locked)
    }

    /// 狀態只能往前走：scheduled -> completed -> locked，或直接 scheduled -> locked
    pub fn transition_to(self, next: MatchDayStatus) -> Result<MatchDayStatus> {
        if next >= self {
            Ok(next)
        } else {
            Err(EngineError::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for MatchDayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchDayStatus::Scheduled => "scheduled",
            MatchDayStatus::Completed => "completed",
            MatchDayStatus::Locked => "locked",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDay {
    pub id: MatchDayId,
    pub season_id: SeasonId,
    pub date: NaiveDate,
    pub course_id: CourseId,
    pub status: MatchDayStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPoints {
    pub points_a: u32,
    pub points_b: u32,
    pub net_total_a: i32,
    pub net_total_b: i32,
}

impl MatchPoints {
    pub fn total(&self) -> u32 {
        self.points_a + self.points_b
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub match_day_id: MatchDayId,
    pub course_id: CourseId,
    pub player_a: PlayerId,
    pub player_b: PlayerId,
    pub status: MatchDayStatus,
    #[serde(default)]
    pub points: Option<MatchPoints>,
    #[serde(default)]
    pub strokes: Option<MatchStrokes>,
}

impl Match {
    pub fn scheduled(
        id: MatchId,
        match_day_id: MatchDayId,
        course_id: CourseId,
        player_a: PlayerId,
        player_b: PlayerId,
    ) -> Self {
        Self {
            id,
            match_day_id,
            course_id,
            player_a,
            player_b,
            status: MatchDayStatus::Scheduled,
            points: None,
            strokes: None,
        }
    }

    pub fn involves(&self, player: &PlayerId) -> bool {
        self.player_a == *player || self.player_b == *player
    }

    pub fn is_scored(&self) -> bool {
        self.points.is_some()
    }
}
