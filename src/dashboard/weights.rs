//! Indicator and dimension weights.
//!
//! The console edits weights as percentages (0 to 100) while the ranking API
//! stores them as decimals (0.0 to 1.0). Within a dimension the indicator
//! weights must add up to 100%.

use serde::Serialize;

use crate::error::ValidationErrors;

pub const MAX_PERCENTAGE: f64 = 100.0;
/// Slack allowed when checking that a dimension sums to 100%.
pub const TOTAL_TOLERANCE: f64 = 0.01;

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// API decimal to display percentage, to 0.1%.
pub fn decimal_to_percentage(decimal: f64) -> f64 {
    if !decimal.is_finite() {
        return 0.0;
    }
    round_to(decimal * 100.0, 1)
}

/// Display percentage to API decimal, to 0.001.
pub fn percentage_to_decimal(percentage: f64) -> f64 {
    if !percentage.is_finite() {
        return 0.0;
    }
    round_to(percentage / 100.0, 3)
}

/// Parses what the user typed into a weight field.
pub fn parse_percentage(input: &str) -> std::result::Result<f64, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let input = input.trim();
    if input.is_empty() {
        errors.add("weight", "Weight is required");
        return Err(errors);
    }
    match input.parse::<f64>() {
        Ok(value) if !value.is_finite() => errors.add("weight", "Weight must be a valid number"),
        Ok(value) if value < 0.0 => errors.add("weight", "Weight must be at least 0%"),
        Ok(value) if value > MAX_PERCENTAGE => errors.add("weight", "Weight must be at most 100%"),
        Ok(value) => return Ok(value),
        Err(_) => errors.add("weight", "Weight must be a valid number"),
    }
    Err(errors)
}

pub fn total_percentage(weights: &[f64]) -> f64 {
    round_to(weights.iter().filter(|w| w.is_finite()).sum(), 1)
}

/// Share of the overall score carried by an indicator, as a percentage.
pub fn effective_weight(indicator_percentage: f64, dimension_percentage: f64) -> f64 {
    round_to(indicator_percentage * dimension_percentage / 100.0, 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightStatus {
    /// Saving would leave the dimension short of 100%.
    Info,
    Success,
    Warning,
    Error,
}

/// Live feedback while a weight is being typed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightCheck {
    pub status: WeightStatus,
    pub message: String,
    pub can_save: bool,
    pub total: f64,
    pub remaining: f64,
}

pub fn validate_weight_input(new_weight: f64, other_weights: &[f64]) -> WeightCheck {
    let total = round_to(total_percentage(other_weights) + new_weight, 1);
    let remaining = round_to(MAX_PERCENTAGE - total, 1);

    let (status, message) = if new_weight < 0.0 {
        (WeightStatus::Error, "Weight cannot be negative".to_string())
    } else if new_weight > MAX_PERCENTAGE {
        (WeightStatus::Error, "Weight cannot exceed 100%".to_string())
    } else if total > MAX_PERCENTAGE + TOTAL_TOLERANCE {
        (
            WeightStatus::Error,
            format!("Total exceeded: {:.1}% ({:.1}% over)", total, total - MAX_PERCENTAGE),
        )
    } else if remaining.abs() <= TOTAL_TOLERANCE {
        (WeightStatus::Success, "Total: 100%".to_string())
    } else {
        (WeightStatus::Info, format!("Remaining weight: {:.1}%", remaining))
    };

    WeightCheck {
        can_save: status != WeightStatus::Error,
        status,
        message,
        total,
        remaining,
    }
}

/// Whether a dimension's indicator weights add up to 100%.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Completeness {
    pub is_complete: bool,
    pub severity: WeightStatus,
    pub current_sum: f64,
    /// Positive when over 100%, negative when short.
    pub difference: f64,
    pub indicator_count: usize,
}

pub fn dimension_completeness(weights: &[f64]) -> Completeness {
    let current_sum = total_percentage(weights);
    let difference = round_to(current_sum - MAX_PERCENTAGE, 1);
    let is_complete = !weights.is_empty() && difference.abs() <= TOTAL_TOLERANCE;

    let severity = if weights.is_empty() {
        WeightStatus::Error
    } else if current_sum == 0.0 {
        WeightStatus::Warning
    } else if is_complete {
        WeightStatus::Success
    } else {
        WeightStatus::Error
    };

    Completeness {
        is_complete,
        severity,
        current_sum,
        difference,
        indicator_count: weights.len(),
    }
}

/// Whole-percent split of 100 across `count` indicators. The first
/// `100 % count` indicators take the leftover points.
pub fn distribute_equal(count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    let base = 100 / count;
    let remainder = 100 % count;
    (0..count)
        .map(|i| (base + usize::from(i < remainder)) as f64)
        .collect()
}

/// Scales weights to whole percents summing to 100. Rounding drift lands on
/// the largest weight. All-zero input falls back to an equal split.
pub fn adjust_proportionally(weights: &[f64]) -> Vec<f64> {
    let current_sum: f64 = weights.iter().filter(|w| w.is_finite()).sum();
    if current_sum <= 0.0 {
        return distribute_equal(weights.len());
    }

    let scale = MAX_PERCENTAGE / current_sum;
    let mut adjusted: Vec<f64> = weights
        .iter()
        .map(|w| if w.is_finite() { (w * scale).round() } else { 0.0 })
        .collect();

    let drift = MAX_PERCENTAGE - adjusted.iter().sum::<f64>();
    if drift != 0.0 {
        let largest = adjusted
            .iter()
            .enumerate()
            .fold(0, |max, (i, w)| if *w > adjusted[max] { i } else { max });
        adjusted[largest] += drift;
    }
    adjusted
}
