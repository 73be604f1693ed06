//! Standard score (偏差値) of a player's score against a chart's statistics.

/// Highest score attainable on any chart.
pub const MAX_SCORE: i64 = 10_000_000;

/// Why a standard score could not be computed. `Display` is the message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScoreError {
    #[error("スコアは数値で入力してください。")]
    NotNumeric,
    #[error("スコアは0～10,000,000の範囲で入力してください。")]
    OutOfRange,
    #[error("スコアデータがないため計算できません。")]
    NoData,
}

/// Validates `raw_score` and returns its standard score, rounded to 3 decimal places.
///
/// A missing or zero `stddev` means the chart has no usable sample.
pub fn validate_and_score(
    raw_score: &str,
    mean: Option<f64>,
    stddev: Option<f64>,
) -> Result<f64, ScoreError> {
    let score: i64 = raw_score
        .trim()
        .parse()
        .map_err(|_| ScoreError::NotNumeric)?;
    if !(0..=MAX_SCORE).contains(&score) {
        return Err(ScoreError::OutOfRange);
    }
    let (mean, stddev) = match (mean, stddev) {
        (Some(m), Some(sd)) if sd != 0.0 => (m, sd),
        _ => return Err(ScoreError::NoData),
    };
    Ok(round3((score as f64 - mean) / stddev * 10.0 + 50.0))
}

pub fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Formats a float the short way, but always with a fractional part (`70.0`, `0.125`).
pub fn format_decimal(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}
