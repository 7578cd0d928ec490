use std::cmp::Reverse;

use serde::Serialize;
use time::{macros::format_description, Date};

use super::types::Meal;

/// Meals logged on one calendar day, in ledger order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayGroup {
    pub date: String,
    pub meals: Vec<Meal>,
}

/// Parsed form of a stored date; unparseable dates sort after every real one.
fn date_key(date: &str) -> Option<Date> {
    Date::parse(date, format_description!("[year]-[month]-[day]")).ok()
}

/// Latest `limit` meals by date, newest first. Meals sharing a date keep
/// ledger order.
pub fn recent(meals: &[Meal], limit: usize) -> Vec<Meal> {
    let mut sorted = meals.to_vec();
    sorted.sort_by_key(|m| Reverse(date_key(&m.date)));
    sorted.truncate(limit);
    sorted
}

/// Meal history grouped by date, newest day first.
///
/// `search` matches meal names case-insensitively (an empty search matches
/// everything); `date` keeps only that exact day.
pub fn history(meals: &[Meal], search: &str, date: Option<&str>) -> Vec<DayGroup> {
    let needle = search.to_lowercase();
    let mut groups: Vec<DayGroup> = Vec::new();

    for meal in meals {
        if !meal.name.to_lowercase().contains(&needle) {
            continue;
        }
        if date.is_some_and(|d| d != meal.date) {
            continue;
        }
        match groups.iter_mut().find(|g| g.date == meal.date) {
            Some(group) => group.meals.push(meal.clone()),
            None => groups.push(DayGroup {
                date: meal.date.clone(),
                meals: vec![meal.clone()],
            }),
        }
    }

    groups.sort_by_key(|g| Reverse(date_key(&g.date)));
    groups
}
