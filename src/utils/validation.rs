use crate::utils::error::{EngineError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_positive_number(field_name: &str, value: i64, min_value: i64) -> Result<()> {
    if value < min_value {
        return Err(EngineError::invalid_input(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EngineError::invalid_input(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(EngineError::invalid_input(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

pub fn validate_len<T>(field_name: &str, values: &[T], expected: usize) -> Result<()> {
    if values.len() != expected {
        return Err(EngineError::invalid_input(
            field_name,
            values.len(),
            format!("Expected {} per-hole values", expected),
        ));
    }
    Ok(())
}

pub fn validate_non_negative_scores(field_name: &str, scores: &[i32]) -> Result<()> {
    if let Some((hole, score)) = scores.iter().enumerate().find(|(_, s)| **s < 0) {
        return Err(EngineError::invalid_input(
            format!("{}[{}]", field_name, hole),
            score,
            "Hole scores cannot be negative",
        ));
    }
    Ok(())
}

/// 檢查 stroke index 是否剛好是 1..=n 的排列
pub fn validate_permutation(field_name: &str, values: &[u32]) -> Result<()> {
    let n = values.len() as u32;
    let mut seen: HashSet<u32> = HashSet::with_capacity(values.len());

    for value in values {
        if *value == 0 || *value > n {
            return Err(EngineError::invalid_input(
                field_name,
                value,
                format!("Stroke index must be between 1 and {}", n),
            ));
        }
        if !seen.insert(*value) {
            return Err(EngineError::invalid_input(
                field_name,
                value,
                "Stroke indices must be unique",
            ));
        }
    }

    Ok(())
}

/// 整數相加，溢位視為無效輸入
pub fn checked_add(field_name: &str, a: i32, b: i32) -> Result<i32> {
    a.checked_add(b).ok_or_else(|| {
        EngineError::invalid_input(field_name, format!("{} + {}", a, b), "Value is out of range")
    })
}

pub fn checked_sub(field_name: &str, a: i32, b: i32) -> Result<i32> {
    a.checked_sub(b).ok_or_else(|| {
        EngineError::invalid_input(field_name, format!("{} - {}", a, b), "Value is out of range")
    })
}

pub fn checked_sum(field_name: &str, values: &[i32]) -> Result<i32> {
    values
        .iter()
        .try_fold(0i32, |total, value| checked_add(field_name, total, *value))
}
