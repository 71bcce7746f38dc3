use crate::domain::model::{Course, MatchStrokes, PlayerId};
use crate::utils::error::{EngineError, Result};
use crate::utils::validation::{checked_sub, validate_permutation, validate_positive_number, Validate};

/// 依 stroke index 由難到易分配 `total` 桿，每洞都拿到一桿後再繞回第二輪。
///
/// 每洞 = total div n，stroke index <= total mod n 的洞再加一桿。
/// 使用 Euclid 除法，所以負的總桿數（plus handicap）會從最簡單的洞扣回，
/// 總和仍然等於 `total`。
pub fn distribute_strokes(total: i32, stroke_indices: &[u32]) -> Result<Vec<i32>> {
    validate_positive_number("stroke_indices", stroke_indices.len() as i64, 1)?;
    validate_permutation("stroke_indices", stroke_indices)?;

    let holes = stroke_indices.len() as i32;
    let base = total.div_euclid(holes);
    let remainder = total.rem_euclid(holes);

    Ok(stroke_indices
        .iter()
        .map(|index| base + i32::from((*index as i32) <= remainder))
        .collect())
}

/// 同一個分配演算法，用單一 course handicap 驅動
pub fn strokes_received(course_handicap: i32, course: &Course) -> Result<Vec<i32>> {
    course.validate()?;
    distribute_strokes(course_handicap, &course.stroke_indices)
}

/// 兩位球員的比賽讓桿：差點較高者拿到 |a - b| 桿，另一方全為零
pub fn allocate_match_strokes(
    player_a: &PlayerId,
    handicap_a: i32,
    player_b: &PlayerId,
    handicap_b: i32,
    course: &Course,
) -> Result<MatchStrokes> {
    course.validate()?;

    let difference = checked_sub("match_handicap", handicap_a, handicap_b)?
        .checked_abs()
        .ok_or_else(|| {
            EngineError::invalid_input("match_handicap", handicap_a, "Handicap difference is out of range")
        })?;
    let received = distribute_strokes(difference, &course.stroke_indices)?;
    let none = vec![0; course.hole_count()];

    let (strokes_a, strokes_b) = if handicap_a > handicap_b {
        (received, none)
    } else if handicap_b > handicap_a {
        (none, received)
    } else {
        (none.clone(), none)
    };

    Ok(MatchStrokes {
        player_a: player_a.clone(),
        strokes_a,
        player_b: player_b.clone(),
        strokes_b,
    })
}
