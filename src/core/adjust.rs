use crate::core::strokes::strokes_received;
use crate::domain::model::Course;
use crate::utils::error::Result;
use crate::utils::validation::{checked_add, checked_sum, validate_len, validate_non_negative_scores};

/// Net double bogey 上限：par + 2 + 該洞受讓桿數
pub fn net_double_bogey_limits(course: &Course, course_handicap: i32) -> Result<Vec<i32>> {
    let strokes = strokes_received(course_handicap, course)?;

    course
        .pars
        .iter()
        .zip(strokes)
        .map(|(par, received)| {
            checked_add("net_double_bogey", *par, 2)
                .and_then(|cap| checked_add("net_double_bogey", cap, received))
        })
        .collect()
}

/// 每洞 adjusted = min(gross, par + 2 + strokesForHole)
pub fn adjust_scores(gross: &[i32], course: &Course, course_handicap: i32) -> Result<Vec<i32>> {
    validate_len("gross", gross, course.hole_count())?;
    validate_non_negative_scores("gross", gross)?;

    let limits = net_double_bogey_limits(course, course_handicap)?;

    Ok(gross
        .iter()
        .zip(limits)
        .map(|(score, limit)| (*score).min(limit))
        .collect())
}

pub fn adjusted_gross_total(gross: &[i32], course: &Course, course_handicap: i32) -> Result<i32> {
    checked_sum("adjusted_gross", &adjust_scores(gross, course, course_handicap)?)
}
