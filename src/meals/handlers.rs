use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::dto::{CreatedMealResponse, DaySummary, HistoryQuery, MealForm};
use crate::{
    auth::AuthUser,
    ledger::{self, DayGroup, Meal},
    state::AppState,
};

const RECENT_LIMIT: usize = 5;
const PERSISTED_HEADER: &str = "x-ledger-persisted";

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal))
        .route("/meals/recent", get(recent_meals))
        .route("/meals/:id", delete(delete_meal))
        .route("/days/:date", get(day_summary))
}

/// GET /meals?search=&date= → history grouped by day, newest first
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_meals(
    State(state): State<AppState>,
    user: AuthUser,
    Query(q): Query<HistoryQuery>,
) -> Json<Vec<DayGroup>> {
    let meals = state.ledger.user_meals(&user.id).await;
    Json(ledger::history(&meals, &q.search, q.date.as_deref()))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn recent_meals(State(state): State<AppState>, user: AuthUser) -> Json<Vec<Meal>> {
    let meals = state.ledger.user_meals(&user.id).await;
    Json(ledger::recent(&meals, RECENT_LIMIT))
}

/// POST /meals { name, foods: "a, b", calories: "450", date? }
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn create_meal(
    State(state): State<AppState>,
    user: AuthUser,
    Json(form): Json<MealForm>,
) -> Result<(StatusCode, HeaderMap, Json<CreatedMealResponse>), (StatusCode, String)> {
    let Some(new_meal) = form.into_new_meal(&user.id) else {
        warn!("meal form incomplete");
        return Err((
            StatusCode::BAD_REQUEST,
            "name, foods and a numeric calories value are required".into(),
        ));
    };

    let added = state.ledger.add_meal(new_meal).await;
    let persisted = added.persisted();
    let meal = added.value;
    info!(meal_id = %meal.id, calories = meal.calories, persisted, "meal logged");

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/meals/{}", meal.id)) {
        headers.insert(axum::http::header::LOCATION, location);
    }

    Ok((
        StatusCode::CREATED,
        headers,
        Json(CreatedMealResponse { meal, persisted }),
    ))
}

/// DELETE /meals/:id → 204 whether or not the meal existed
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_meal(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> (StatusCode, HeaderMap) {
    let mut headers = HeaderMap::new();

    // someone else's meal is treated as absent
    let owned = state
        .ledger
        .find(&id)
        .await
        .is_some_and(|m| m.user_id == user.id);
    if !owned {
        return (StatusCode::NO_CONTENT, headers);
    }

    let deleted = state.ledger.delete_meal(&id).await;
    if !deleted.persisted() {
        headers.insert(PERSISTED_HEADER, HeaderValue::from_static("false"));
    }
    info!(meal_id = %id, removed = deleted.value, "meal deleted");
    (StatusCode::NO_CONTENT, headers)
}

/// GET /days/:date → the day's meals, total and calorie breakdown
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn day_summary(
    State(state): State<AppState>,
    user: AuthUser,
    Path(date): Path<String>,
) -> Json<DaySummary> {
    let meals = state.ledger.user_meals_for_day(&user.id, &date).await;
    Json(DaySummary {
        total_calories: ledger::total_calories(&meals),
        breakdown: ledger::breakdown(&meals),
        meals,
        date,
    })
}
