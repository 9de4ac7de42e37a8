use serde::{Deserialize, Serialize};

use crate::types::{Role, User};

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

#[derive(Debug, Default, Deserialize)]
pub struct SetLogoRequest {
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SetCoverRequest {
    #[serde(default)]
    pub cover_photo_url: Option<String>,
}

/// Query for `GET /upload/presign`.
#[derive(Debug, Deserialize)]
pub struct PresignQuery {
    pub filename: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: i64,
}

#[derive(Debug, Serialize)]
pub struct ImageUploadResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// Query carried by presigned `/storage/` URLs.
#[derive(Debug, Deserialize)]
pub struct SignedQuery {
    pub expires: i64,
    pub signature: String,
}
