//! Deterministic BMI calculation for branch A of the analysis endpoint.

use serde::{Deserialize, Serialize};

/// Fixed categories with the standard WHO thresholds. Boundaries are
/// inclusive on the lower end: a BMI of exactly 18.5 is "Normal weight".
pub const UNDERWEIGHT: &str = "Underweight";
pub const NORMAL_WEIGHT: &str = "Normal weight";
pub const OVERWEIGHT: &str = "Overweight";
pub const OBESE: &str = "Obese";

#[derive(Debug, Serialize, Deserialize)]
pub struct BmiResult {
    pub bmi: f64,
    pub category: &'static str,
    pub message: String,
}

/// Compute BMI from height in centimeters and weight in kilograms, rounded
/// to two decimals.
pub fn calculate_bmi(height_cm: f64, weight_kg: f64) -> BmiResult {
    let meters = height_cm / 100.0;
    let bmi = weight_kg / (meters * meters);
    let bmi = (bmi * 100.0).round() / 100.0;
    let category = classify(bmi);
    let message = format!("Your BMI is {:.2} ({}).", bmi, category);
    BmiResult {
        bmi,
        category,
        message,
    }
}

fn classify(bmi: f64) -> &'static str {
    if bmi < 18.5 {
        UNDERWEIGHT
    } else if bmi < 25.0 {
        NORMAL_WEIGHT
    } else if bmi < 30.0 {
        OVERWEIGHT
    } else {
        OBESE
    }
}
