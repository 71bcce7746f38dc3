use crate::core::differential::STANDARD_SLOPE;
use crate::domain::model::Course;
use crate::utils::error::{EngineError, Result};
use crate::utils::rounding::round_half_away;
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};

/// 聯盟比賽的差點折讓
pub const HANDICAP_ALLOWANCE: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CourseHandicaps {
    pub index: f64,
    /// 保持浮點，到 net double bogey 或缺席計分時才取整
    pub course_handicap: f64,
    pub playing_handicap: i32,
}

impl CourseHandicaps {
    pub fn for_course(index: f64, course: &Course) -> Result<Self> {
        let course_handicap = course_handicap(index, course)?;
        Ok(Self {
            index,
            course_handicap,
            playing_handicap: playing_handicap(course_handicap),
        })
    }

    pub fn rounded_course_handicap(&self) -> i32 {
        round_half_away(self.course_handicap)
    }
}

/// index * slope / 113 + (course rating - par)
pub fn course_handicap(index: f64, course: &Course) -> Result<f64> {
    course.validate()?;
    if !index.is_finite() {
        return Err(EngineError::invalid_input(
            "handicap_index",
            index,
            "Handicap index must be a finite number",
        ));
    }

    Ok(index * f64::from(course.slope_rating) / STANDARD_SLOPE
        + (course.course_rating - f64::from(course.par)))
}

pub fn playing_handicap(course_handicap: f64) -> i32 {
    round_half_away(course_handicap * HANDICAP_ALLOWANCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CourseId;

    fn course(rating: f64, slope: i32) -> Course {
        Course {
            id: CourseId::new("front"),
            name: String::new(),
            pars: vec![4, 3, 5, 4, 4, 3, 5, 4, 4],
            stroke_indices: vec![1, 7, 3, 5, 2, 9, 4, 6, 8],
            course_rating: rating,
            slope_rating: slope,
            par: 36,
        }
    }

    #[test]
    fn test_neutral_course() {
        let handicaps = CourseHandicaps::for_course(10.0, &course(36.0, 113)).unwrap();
        assert!((handicaps.course_handicap - 10.0).abs() < 1e-9);
        // round(9.5) = 10
        assert_eq!(handicaps.playing_handicap, 10);
        assert_eq!(handicaps.rounded_course_handicap(), 10);
    }

    #[test]
    fn test_slope_and_rating_adjust_course_handicap() {
        let ch = course_handicap(12.0, &course(37.1, 130)).unwrap();
        assert!((ch - (12.0 * 130.0 / 113.0 + 1.1)).abs() < 1e-9);
        assert_eq!(playing_handicap(ch), 14);
    }

    #[test]
    fn test_low_index_on_easy_course_goes_negative() {
        let ch = course_handicap(0.0, &course(34.0, 113)).unwrap();
        assert!((ch + 2.0).abs() < 1e-9);
        assert_eq!(playing_handicap(ch), -2);
    }

    #[test]
    fn test_invalid_course_is_rejected() {
        assert!(course_handicap(10.0, &course(36.0, 0)).is_err());
        assert!(course_handicap(f64::NAN, &course(36.0, 113)).is_err());
    }
}
