use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use super::AppState;
use super::dto::{AddMemberRequest, SetLogoRequest, SetRoleRequest};
use super::response::{ApiError, ApiResponse};
use crate::auth::RequireUser;
use crate::service::groups::{self, GroupInput};
use crate::service::pages::{self, PageInput};

pub async fn list_groups(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let groups = groups::list_groups_for_user(state.store.as_ref(), &user)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(groups)))
}

pub async fn create_group(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<GroupInput>,
) -> impl IntoResponse {
    let group = groups::create_group(state.store.as_ref(), &user, &req)?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(group))))
}

pub async fn get_group(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let detail = groups::get_group(state.store.as_ref(), &user, &id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(detail)))
}

pub async fn update_group(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<GroupInput>,
) -> impl IntoResponse {
    let group = groups::update_group(state.store.as_ref(), &user, &id, &req)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(group)))
}

pub async fn delete_group(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    groups::delete_group(state.store.as_ref(), state.storage(), &user, &id).await?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn set_group_logo(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SetLogoRequest>,
) -> impl IntoResponse {
    let group = groups::set_group_logo(state.store.as_ref(), &user, &id, req.logo_url.as_deref())?;
    Ok::<_, ApiError>(Json(ApiResponse::success(group)))
}

pub async fn add_member(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AddMemberRequest>,
) -> impl IntoResponse {
    let member = groups::add_member(state.store.as_ref(), &user, &id, &req.user_id)?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(member))))
}

pub async fn set_member_role(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path((id, user_id)): Path<(String, String)>,
    Json(req): Json<SetRoleRequest>,
) -> impl IntoResponse {
    let member = groups::set_member_role(state.store.as_ref(), &user, &id, &user_id, req.role)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(member)))
}

pub async fn remove_member(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path((id, user_id)): Path<(String, String)>,
) -> impl IntoResponse {
    groups::remove_member(state.store.as_ref(), &user, &id, &user_id)?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn leave_group(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    groups::leave_group(state.store.as_ref(), &user, &id)?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn list_pages(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let pages = pages::list_pages(state.store.as_ref(), &user, &id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(pages)))
}

pub async fn create_page(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<PageInput>,
) -> impl IntoResponse {
    let page = pages::create_page(state.store.as_ref(), &user, &id, &req)?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(page))))
}
