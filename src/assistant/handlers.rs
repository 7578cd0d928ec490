use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use tracing::{instrument, warn};

use super::{suggest, Suggestion};
use crate::{auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub user_input: String,
}

pub fn assistant_routes() -> Router<AppState> {
    Router::new().route("/assistant", post(analyze_meal))
}

/// POST /assistant { userInput } → reply plus pre-fill for the meal form
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn analyze_meal(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<Suggestion>, (StatusCode, String)> {
    match suggest(state.assistant.as_ref(), &body.user_input).await {
        Some(s) => Ok(Json(s)),
        None => {
            warn!("empty meal description");
            Err((StatusCode::BAD_REQUEST, "userInput is required".into()))
        }
    }
}
