use serde::Serialize;

use super::types::Meal;

/// One meal's share of its day's calories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MealShare {
    pub id: String,
    pub name: String,
    pub calories: i64,
    pub percentage: i64,
}

/// Per-meal percentage of the day's total, highest calories first.
///
/// Each percentage is rounded on its own, so the column need not add up to
/// exactly 100. A zero total is divided as 1, giving 0% rather than NaN.
pub fn breakdown(meals: &[Meal]) -> Vec<MealShare> {
    let total = super::total_calories(meals);
    let divisor = (if total == 0 { 1 } else { total }) as f64;

    let mut shares: Vec<MealShare> = meals
        .iter()
        .map(|m| MealShare {
            id: m.id.clone(),
            name: m.name.clone(),
            calories: m.calories,
            percentage: round_half_up(m.calories as f64 / divisor * 100.0),
        })
        .collect();
    // stable: equal calories keep ledger order
    shares.sort_by(|a, b| b.calories.cmp(&a.calories));
    shares
}

// Halves round towards +infinity, so -2.5 becomes -2 (f64::round would give -3).
fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}
