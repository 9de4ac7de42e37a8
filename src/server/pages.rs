use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use super::AppState;
use super::dto::SetCoverRequest;
use super::response::{ApiError, ApiResponse};
use crate::auth::RequireUser;
use crate::service::pages::{self, PageInput};

pub async fn get_page(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let page = pages::get_page(state.store.as_ref(), &user, &id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(page)))
}

pub async fn update_page(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<PageInput>,
) -> impl IntoResponse {
    let page = pages::update_page(state.store.as_ref(), &user, &id, &req)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(page)))
}

pub async fn delete_page(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    pages::delete_page(state.store.as_ref(), state.storage(), &user, &id).await?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn set_page_cover(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SetCoverRequest>,
) -> impl IntoResponse {
    let page = pages::set_page_cover(
        state.store.as_ref(),
        &user,
        &id,
        req.cover_photo_url.as_deref(),
    )?;
    Ok::<_, ApiError>(Json(ApiResponse::success(page)))
}
