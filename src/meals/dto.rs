use serde::{Deserialize, Serialize};
use time::{macros::format_description, OffsetDateTime};

use crate::ledger::{Meal, MealShare, NewMeal};

/// The meal-logging form, fields as typed by the user.
#[derive(Debug, Default, Deserialize)]
pub struct MealForm {
    #[serde(default)]
    pub name: String,
    /// Comma-separated food names.
    #[serde(default)]
    pub foods: String,
    #[serde(default)]
    pub calories: String,
    pub date: Option<String>,
}

impl MealForm {
    /// `None` when a required field is empty or calories is not a number.
    pub fn into_new_meal(self, user_id: &str) -> Option<NewMeal> {
        if self.name.is_empty() || self.foods.is_empty() || self.calories.is_empty() {
            return None;
        }
        let calories = parse_leading_int(&self.calories)?;
        Some(NewMeal {
            name: self.name,
            foods: self.foods.split(',').map(|f| f.trim().to_string()).collect(),
            calories,
            date: self.date.filter(|d| !d.is_empty()).unwrap_or_else(today),
            user_id: user_id.to_string(),
        })
    }
}

/// Integer prefix of `s` after leading whitespace and an optional sign, so
/// "450 kcal" reads as 450. `None` when there are no digits.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let value: i64 = rest[..digits].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Current UTC date as `YYYY-MM-DD`.
pub fn today() -> String {
    OffsetDateTime::now_utc()
        .date()
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

#[derive(Debug, Serialize)]
pub struct CreatedMealResponse {
    pub meal: Meal,
    /// false when the durable copy could not be updated
    pub persisted: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub search: String,
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: String,
    pub total_calories: i64,
    pub meals: Vec<Meal>,
    pub breakdown: Vec<MealShare>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, foods: &str, calories: &str) -> MealForm {
        MealForm {
            name: name.into(),
            foods: foods.into(),
            calories: calories.into(),
            date: Some("2024-01-01".into()),
        }
    }

    #[test]
    fn builds_meal_from_form() {
        let meal = form("Lunch", "rice, beans ,", "500").into_new_meal("u1").unwrap();
        assert_eq!(meal.name, "Lunch");
        // trailing empty item is kept, as the form always did
        assert_eq!(meal.foods, vec!["rice", "beans", ""]);
        assert_eq!(meal.calories, 500);
        assert_eq!(meal.date, "2024-01-01");
        assert_eq!(meal.user_id, "u1");
    }

    #[test]
    fn declines_missing_fields() {
        assert!(form("", "rice", "100").into_new_meal("u").is_none());
        assert!(form("Lunch", "", "100").into_new_meal("u").is_none());
        assert!(form("Lunch", "rice", "").into_new_meal("u").is_none());
        assert!(form("Lunch", "rice", "lots").into_new_meal("u").is_none());
    }

    #[test]
    fn missing_date_means_today() {
        let mut f = form("Lunch", "rice", "100");
        f.date = None;
        let meal = f.into_new_meal("u").unwrap();
        assert_eq!(meal.date, today());
        assert_eq!(meal.date.len(), 10);
    }

    #[test]
    fn leading_int_parsing() {
        assert_eq!(parse_leading_int("450"), Some(450));
        assert_eq!(parse_leading_int("  450 kcal"), Some(450));
        assert_eq!(parse_leading_int("12.9"), Some(12));
        assert_eq!(parse_leading_int("-5"), Some(-5));
        assert_eq!(parse_leading_int("+7"), Some(7));
        assert_eq!(parse_leading_int("kcal 450"), None);
        assert_eq!(parse_leading_int("-"), None);
    }
}
