use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use super::AppState;
use super::dto::SessionResponse;
use super::response::{ApiError, ApiResponse};
use crate::auth::{MaybeUser, RequireUser};
use crate::service::users::{self, ProfileUpdate};

/// GET /users/me - the caller's account, created on first sight
pub async fn get_me(RequireUser(user): RequireUser) -> impl IntoResponse {
    Json(ApiResponse::success(user))
}

pub async fn update_me(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProfileUpdate>,
) -> impl IntoResponse {
    let user = users::update_profile(state.store.as_ref(), state.storage(), &user, &req).await?;
    Ok::<_, ApiError>(Json(ApiResponse::success(user)))
}

/// GET /session - who the caller is, without creating an account
pub async fn session(MaybeUser(user): MaybeUser) -> impl IntoResponse {
    Json(ApiResponse::success(SessionResponse {
        authenticated: user.is_some(),
        user,
    }))
}
