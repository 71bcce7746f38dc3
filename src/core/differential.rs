use crate::utils::error::{EngineError, Result};

/// slope 的基準值
pub const STANDARD_SLOPE: f64 = 113.0;

/// (adjusted gross - course rating) * 113 / slope
pub fn score_differential(adjusted_gross: i32, course_rating: f64, slope_rating: i32) -> Result<f64> {
    if slope_rating <= 0 {
        return Err(EngineError::invalid_input(
            "slope_rating",
            slope_rating,
            "Slope rating must be positive",
        ));
    }
    if !course_rating.is_finite() {
        return Err(EngineError::invalid_input(
            "course_rating",
            course_rating,
            "Course rating must be a finite number",
        ));
    }

    Ok((f64::from(adjusted_gross) - course_rating) * STANDARD_SLOPE / f64::from(slope_rating))
}
