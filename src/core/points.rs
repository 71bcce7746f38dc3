use crate::domain::model::{MatchId, MatchPoints, MatchStrokes, PlayerId};
use crate::utils::error::{EngineError, Result};
use crate::utils::validation::{checked_sub, checked_sum, validate_len, validate_non_negative_scores};
use std::cmp::Ordering;

/// 聯盟固定打九洞
pub const LEAGUE_HOLES: usize = 9;
pub const POINTS_PER_HOLE: u32 = 2;
pub const POINTS_FOR_TOTAL: u32 = 4;
/// 9 * 2 + 4
pub const POINTS_PER_MATCH: u32 = 22;

/// 贏的拿全部，平手對分
fn split(points: u32, a: i32, b: i32) -> (u32, u32) {
    match a.cmp(&b) {
        Ordering::Less => (points, 0),
        Ordering::Greater => (0, points),
        Ordering::Equal => (points / 2, points / 2),
    }
}

/// 每洞淨桿低者得 2 分，淨桿總和低者再得 4 分
pub fn match_points(
    gross_a: &[i32],
    gross_b: &[i32],
    strokes_a: &[i32],
    strokes_b: &[i32],
) -> Result<MatchPoints> {
    validate_len("gross_a", gross_a, LEAGUE_HOLES)?;
    validate_len("gross_b", gross_b, LEAGUE_HOLES)?;
    validate_len("strokes_a", strokes_a, LEAGUE_HOLES)?;
    validate_len("strokes_b", strokes_b, LEAGUE_HOLES)?;
    validate_non_negative_scores("gross_a", gross_a)?;
    validate_non_negative_scores("gross_b", gross_b)?;

    let net_a = net_scores("net_a", gross_a, strokes_a)?;
    let net_b = net_scores("net_b", gross_b, strokes_b)?;

    let (mut points_a, mut points_b) = (0, 0);
    for (a, b) in net_a.iter().zip(&net_b) {
        let (hole_a, hole_b) = split(POINTS_PER_HOLE, *a, *b);
        points_a += hole_a;
        points_b += hole_b;
    }

    let net_total_a = checked_sum("net_total_a", &net_a)?;
    let net_total_b = checked_sum("net_total_b", &net_b)?;
    let (total_a, total_b) = split(POINTS_FOR_TOTAL, net_total_a, net_total_b);

    Ok(MatchPoints {
        points_a: points_a + total_a,
        points_b: points_b + total_b,
        net_total_a,
        net_total_b,
    })
}

fn net_scores(field_name: &str, gross: &[i32], strokes: &[i32]) -> Result<Vec<i32>> {
    gross
        .iter()
        .zip(strokes)
        .map(|(g, s)| checked_sub(field_name, *g, *s))
        .collect()
}

/// 兩方成績都到齊才計分；缺一方時回傳 `MissingCounterpart`，呼叫端應延後而非視為失敗
pub fn score_match(
    match_id: &MatchId,
    player_a: (&PlayerId, Option<&[i32]>),
    player_b: (&PlayerId, Option<&[i32]>),
    strokes: &MatchStrokes,
) -> Result<MatchPoints> {
    let (Some(scores_a), Some(scores_b)) = (player_a.1, player_b.1) else {
        return Err(EngineError::MissingCounterpart {
            match_id: match_id.to_string(),
        });
    };

    let strokes_a = strokes
        .for_player(player_a.0)
        .ok_or_else(|| EngineError::not_found("stroke allocation", player_a.0))?;
    let strokes_b = strokes
        .for_player(player_b.0)
        .ok_or_else(|| EngineError::not_found("stroke allocation", player_b.0))?;

    match_points(scores_a, scores_b, strokes_a, strokes_b)
}
