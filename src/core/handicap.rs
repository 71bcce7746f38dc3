use crate::domain::model::Differential;
use crate::utils::error::{EngineError, Result};
use crate::utils::rounding::round_half_up_tenth;
use serde::{Deserialize, Serialize};

/// 計算時最多只看最近幾場
pub const MAX_COUNTED_ROUNDS: usize = 5;
/// 五場最佳三場
pub const BEST_OF_FIVE: usize = 3;
pub const ESTABLISHED_ROUNDS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexCalculation {
    pub index: f64,
    pub rounds_counted: usize,
    /// 只影響顯示資格，不影響公式
    pub established: bool,
}

/// 依日期取最近的五筆 differential（新到舊）
pub fn most_recent(differentials: &[Differential]) -> Vec<f64> {
    let mut sorted: Vec<&Differential> = differentials.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
        .into_iter()
        .take(MAX_COUNTED_ROUNDS)
        .map(|d| d.value)
        .collect()
}

pub fn calculate_index(differentials: &[Differential], provisional: f64) -> Result<IndexCalculation> {
    let recent = most_recent(differentials);
    let index = index_from_values(&recent, provisional)?;

    Ok(IndexCalculation {
        index,
        rounds_counted: recent.len(),
        established: differentials.len() >= ESTABLISHED_ROUNDS,
    })
}

/// 依場數套用不同公式，結果四捨五入到一位小數
///
/// - 0 場：provisional
/// - 1 場：(2 * provisional + d1) / 3
/// - 2 場：(provisional + d1 + d2) / 3
/// - 3、4 場：全部平均，不再使用 provisional
/// - 5 場：由低到高排序，取最低三場平均
pub fn index_from_values(recent: &[f64], provisional: f64) -> Result<f64> {
    if !provisional.is_finite() {
        return Err(EngineError::invalid_input(
            "provisional",
            provisional,
            "Provisional handicap must be a finite number",
        ));
    }
    if let Some(bad) = recent.iter().find(|d| !d.is_finite()) {
        return Err(EngineError::invalid_input(
            "differentials",
            bad,
            "Differentials must be finite numbers",
        ));
    }
    if recent.len() > MAX_COUNTED_ROUNDS {
        return Err(EngineError::invalid_input(
            "differentials",
            recent.len(),
            format!("At most {} recent differentials are counted", MAX_COUNTED_ROUNDS),
        ));
    }

    let raw = match recent {
        [] => return Ok(provisional),
        [d1] => (2.0 * provisional + d1) / 3.0,
        [d1, d2] => (provisional + d1 + d2) / 3.0,
        [_, _, _] | [_, _, _, _] => mean(recent),
        _ => {
            let mut sorted = recent.to_vec();
            sorted.sort_by(f64::total_cmp);
            mean(&sorted[..BEST_OF_FIVE])
        }
    };

    Ok(round_half_up_tenth(raw))
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
