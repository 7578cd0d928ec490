use axum::{routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;

use super::jwt::AuthUser;
use crate::state::AppState;

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub email: Option<String>,
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(user), fields(user_id = %user.id))]
pub async fn get_me(user: AuthUser) -> Json<PublicUser> {
    Json(PublicUser {
        id: user.id,
        email: user.email,
    })
}
