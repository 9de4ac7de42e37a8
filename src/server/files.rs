use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};

use super::AppState;
use super::dto::{ImageUploadResponse, PresignQuery};
use super::response::{ApiError, ApiResponse};
use crate::auth::RequireUser;
use crate::service::files::{self, ConfirmUpload, Upload};
use crate::service::images::{self, ImageKind};

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Fields read from an upload form. Unknown fields are ignored.
#[derive(Default)]
struct UploadForm {
    file: Option<Upload>,
    prefix: Option<String>,
    identifier: Option<String>,
}

async fn parse_upload_form(multipart: &mut Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read multipart: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let name = field.file_name().unwrap_or("file").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_MIME_TYPE)
                    .to_string();
                let bytes: Bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;
                form.file = Some(Upload {
                    name,
                    bytes,
                    mime_type,
                });
            }
            Some("prefix") => {
                form.prefix = Some(field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed to read prefix: {e}"))
                })?);
            }
            Some("identifier") => {
                form.identifier = Some(field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed to read identifier: {e}"))
                })?);
            }
            _ => {}
        }
    }

    Ok(form)
}

pub async fn list_files(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let files = files::list_files(state.store.as_ref(), &user)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(files)))
}

/// POST /files - multipart upload with a `file` field
pub async fn upload_file(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let form = parse_upload_form(&mut multipart).await?;
    let upload = form
        .file
        .ok_or_else(|| ApiError::bad_request("No file provided"))?;

    let record =
        files::register_upload(state.store.as_ref(), state.storage(), &user, upload).await?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(record))))
}

pub async fn delete_file(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    files::delete_file(state.store.as_ref(), state.storage(), &user, &id).await?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn presign_upload(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<PresignQuery>,
) -> impl IntoResponse {
    let presigned = files::presign_upload(
        state.storage(),
        &user,
        &query.filename,
        query.size,
        &query.mime_type,
    )
    .await?;
    Ok::<_, ApiError>(Json(ApiResponse::success(presigned)))
}

pub async fn confirm_upload(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConfirmUpload>,
) -> impl IntoResponse {
    let record = files::confirm_upload(state.store.as_ref(), state.storage(), &user, req).await?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(record))))
}

/// POST /upload/image - multipart with `file`, `prefix` (profile, group or
/// page) and `identifier` fields
pub async fn upload_image(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let form = parse_upload_form(&mut multipart).await?;

    let (Some(upload), Some(prefix), Some(identifier)) = (form.file, form.prefix, form.identifier)
    else {
        return Err(ApiError::bad_request(
            "Missing file, prefix, or identifier",
        ));
    };

    let kind = ImageKind::parse(prefix.trim())
        .ok_or_else(|| ApiError::bad_request("Invalid prefix; use profile, group, or page"))?;

    let url = images::upload_image(
        state.store.as_ref(),
        state.storage(),
        &user,
        kind,
        identifier.trim(),
        upload,
    )
    .await?;
    Ok::<_, ApiError>(Json(ApiResponse::success(ImageUploadResponse { url })))
}

/// GET /download/{*key} - redirect to a short-lived URL for an owned file
pub async fn download(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    let url = files::file_download_url(state.store.as_ref(), state.storage(), &user, &key).await?;
    Ok::<_, ApiError>(Redirect::temporary(&url))
}
