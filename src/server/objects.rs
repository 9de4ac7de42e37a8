use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};

use super::AppState;
use super::dto::SignedQuery;
use super::response::ApiError;
use crate::error::Error;
use crate::service::validation::MAX_UPLOAD_SIZE;
use crate::storage::{ObjectStorage, SignedMethod, StoredObject, validate_key};

const PUBLIC_CACHE_CONTROL: &str = "public, max-age=3600, s-maxage=3600";
const PRIVATE_CACHE_CONTROL: &str = "private, max-age=3600";

fn require_storage(state: &AppState) -> Result<&dyn ObjectStorage, ApiError> {
    state
        .storage()
        .ok_or_else(|| ApiError::from(Error::StorageUnconfigured))
}

fn object_response(object: StoredObject, cache_control: &'static str) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, object.content_type)
        .header(header::CONTENT_LENGTH, object.bytes.len())
        .header(header::CACHE_CONTROL, cache_control)
        .header("X-Content-Type-Options", "nosniff")
        .body(Body::from(object.bytes))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// GET /files/{*key} - public read-through proxy for stored objects
pub async fn serve_file(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    validate_key(&key)?;
    let storage = require_storage(&state)?;

    let object = storage.get(&key).await?;
    Ok(object_response(object, PUBLIC_CACHE_CONTROL))
}

/// GET /storage/{*key} - download through a presigned URL
pub async fn signed_download(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(query): Query<SignedQuery>,
) -> Result<Response, ApiError> {
    validate_key(&key)?;
    state
        .signer
        .verify(SignedMethod::Get, &key, "", query.expires, &query.signature)?;
    let storage = require_storage(&state)?;

    let object = storage.get(&key).await?;
    Ok(object_response(object, PRIVATE_CACHE_CONTROL))
}

/// PUT /storage/{*key} - upload through a presigned URL. The request's
/// Content-Type must match the one the URL was issued for.
pub async fn signed_upload(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(query): Query<SignedQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    validate_key(&key)?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    state.signer.verify(
        SignedMethod::Put,
        &key,
        content_type,
        query.expires,
        &query.signature,
    )?;

    if body.len() > MAX_UPLOAD_SIZE {
        return Err(ApiError::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "File size must be under 10MB",
        ));
    }

    let storage = require_storage(&state)?;
    storage.put(&key, body, content_type).await?;

    Ok(StatusCode::OK)
}
