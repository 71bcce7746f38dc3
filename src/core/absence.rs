use crate::core::handicap::MAX_COUNTED_ROUNDS;
use crate::core::strokes::strokes_received;
use crate::domain::model::Course;
use crate::utils::error::{EngineError, Result};
use crate::utils::rounding::round_half_up_tenth;
use crate::utils::validation::checked_add;

/// 缺席者的成績 = playing handicap 再多三桿
pub const ABSENCE_STROKES_OVER_HANDICAP: i32 = 3;
pub const ABSENCE_MIN_INCREASE: f64 = 2.0;
pub const ABSENCE_MAX_INCREASE: f64 = 4.0;
const WORST_OF_FIVE: usize = 3;

/// 缺席者每洞的代打成績：par + 依 stroke index 分配的桿數。
/// 只用來算比賽積分，不進差點計算。
pub fn absence_scores(playing_handicap: i32, course: &Course) -> Result<Vec<i32>> {
    let total = checked_add("playing_handicap", playing_handicap, ABSENCE_STROKES_OVER_HANDICAP)?;
    let strokes = strokes_received(total, course)?;

    course
        .pars
        .iter()
        .zip(strokes)
        .map(|(par, extra)| checked_add("absence_scores", *par, extra))
        .collect()
}

/// min(max(posted + 2, 最近五場最差三場平均), posted + 4)
///
/// `recent` 為最近的 differential（最多五筆）；不足三筆時有幾筆算幾筆，沒有就是 posted + 2。
/// 平均先取一位小數再夾進上下限，posted 本身帶多位小數時結果仍不會超出範圍。
pub fn absence_index_adjustment(posted_index: f64, recent: &[f64]) -> Result<f64> {
    if !posted_index.is_finite() || recent.iter().any(|d| !d.is_finite()) {
        return Err(EngineError::invalid_input(
            "posted_index",
            posted_index,
            "Handicap values must be finite numbers",
        ));
    }

    let floor = posted_index + ABSENCE_MIN_INCREASE;
    let ceiling = posted_index + ABSENCE_MAX_INCREASE;

    let mut window: Vec<f64> = recent.iter().copied().take(MAX_COUNTED_ROUNDS).collect();
    window.sort_by(|a, b| b.total_cmp(a));
    let worst: Vec<f64> = window.into_iter().take(WORST_OF_FIVE).collect();

    let adjusted = if worst.is_empty() {
        floor
    } else {
        let average = round_half_up_tenth(worst.iter().sum::<f64>() / worst.len() as f64);
        average.max(floor).min(ceiling)
    };

    Ok(adjusted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CourseId;
    use proptest::prelude::*;

    fn course() -> Course {
        Course {
            id: CourseId::new("front"),
            name: String::new(),
            pars: vec![4, 3, 5, 4, 4, 3, 5, 4, 4],
            stroke_indices: vec![1, 7, 3, 5, 2, 9, 4, 6, 8],
            course_rating: 36.0,
            slope_rating: 113,
            par: 36,
        }
    }

    #[test]
    fn test_absence_scores_spread_handicap_plus_three() {
        // 10 + 3 = 13：每洞一桿，stroke index 1-4 再多一桿
        let scores = absence_scores(10, &course()).unwrap();
        assert_eq!(scores, vec![6, 4, 7, 5, 6, 4, 7, 5, 5]);
        assert_eq!(scores.iter().sum::<i32>(), 36 + 13);
    }

    #[test]
    fn test_absence_scores_for_low_handicap() {
        let scores = absence_scores(0, &course()).unwrap();
        assert_eq!(scores, vec![5, 3, 6, 4, 5, 3, 5, 4, 4]);
    }

    #[test]
    fn test_adjustment_follows_declining_form() {
        // 最差三場 = 16, 15, 14 -> 平均 15
        let adjusted = absence_index_adjustment(12.0, &[10.0, 14.0, 15.0, 16.0, 9.0]).unwrap();
        assert_eq!(adjusted, 15.0);
    }

    #[test]
    fn test_adjustment_is_bounded() {
        assert_eq!(absence_index_adjustment(12.0, &[5.0, 6.0, 7.0]).unwrap(), 14.0);
        assert_eq!(absence_index_adjustment(12.0, &[30.0, 31.0, 32.0]).unwrap(), 16.0);
        assert_eq!(absence_index_adjustment(12.0, &[]).unwrap(), 14.0);
    }

    #[test]
    fn test_adjustment_stays_bounded_for_unrounded_index() {
        // provisional 11.73 沒有任何成績時直接就是 index
        let adjusted = absence_index_adjustment(11.73, &[]).unwrap();
        assert!((adjusted - 13.73).abs() < 1e-9);

        let adjusted = absence_index_adjustment(11.73, &[30.0, 31.0, 32.0]).unwrap();
        assert!((adjusted - 15.73).abs() < 1e-9);

        let adjusted = absence_index_adjustment(11.73, &[14.0, 15.0, 14.5]).unwrap();
        assert_eq!(adjusted, 14.5);
    }

    #[test]
    fn test_absence_scores_reject_out_of_range_handicap() {
        let err = absence_scores(i32::MAX, &course()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
    }

    proptest! {
        #[test]
        fn prop_absence_total(handicap in -5i32..40) {
            let course = course();
            let scores = absence_scores(handicap, &course).unwrap();
            prop_assert_eq!(
                scores.iter().sum::<i32>(),
                course.total_par() + handicap + ABSENCE_STROKES_OVER_HANDICAP
            );
        }

        #[test]
        fn prop_adjustment_within_bounds(
            posted in 0.0f64..40.0,
            recent in proptest::collection::vec(-10.0f64..60.0, 0..=5),
        ) {
            let adjusted = absence_index_adjustment(posted, &recent).unwrap();
            prop_assert!(adjusted >= posted + ABSENCE_MIN_INCREASE - 1e-9);
            prop_assert!(adjusted <= posted + ABSENCE_MAX_INCREASE + 1e-9);
        }
    }
}
