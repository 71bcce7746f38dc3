// 浮點表示誤差的容忍值，例如 11.85 實際存成 11.8499999...
const ROUNDING_EPSILON: f64 = 1e-9;

/// 四捨五入到一位小數（half-up：-1.25 -> -1.2）
pub fn round_half_up_tenth(value: f64) -> f64 {
    ((value * 10.0) + 0.5 + ROUNDING_EPSILON).floor() / 10.0
}

/// 四捨五入到整數，0.5 遠離零（9.5 -> 10，-9.5 -> -10）
pub fn round_half_away(value: f64) -> i32 {
    (value + ROUNDING_EPSILON.copysign(value)).round() as i32
}
