use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRequestParts, Request},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::resolver::{
    IdentityContext, RequestIdentity, resolve_current_user_or_none, resolve_or_create_current_user,
};
use crate::error::Error;
use crate::server::AppState;
use crate::types::User;

/// Extractor that requires an authenticated caller, creating the local user
/// record on first sight.
pub struct RequireUser(pub User);

/// Extractor for routes that work for anonymous callers too. Never creates.
pub struct MaybeUser(pub Option<User>);

#[derive(Debug)]
pub enum AuthError {
    MissingAuth,
    InternalError,
}

impl From<Error> for AuthError {
    fn from(err: Error) -> Self {
        match err {
            Error::Unauthenticated => AuthError::MissingAuth,
            other => {
                tracing::error!("Failed to resolve current user: {}", other);
                AuthError::InternalError
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingAuth => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = json!({ "data": null, "error": message });
        (status, Json(body)).into_response()
    }
}

/// Gives each request its own identity cache.
pub async fn identity_scope(mut request: Request, next: Next) -> Response {
    request
        .extensions_mut()
        .insert(RequestIdentity::default());
    next.run(request).await
}

fn request_identity(parts: &mut Parts) -> RequestIdentity {
    if let Some(identity) = parts.extensions.get::<RequestIdentity>() {
        return identity.clone();
    }
    let identity = RequestIdentity::default();
    parts.extensions.insert(identity.clone());
    identity
}

impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let cache = request_identity(parts);
        let ctx = IdentityContext {
            store: state.store.as_ref(),
            provider: state.identity.as_ref(),
            headers: &parts.headers,
            cache: &cache,
        };

        let user = resolve_or_create_current_user(&ctx).await?;
        Ok(RequireUser(user))
    }
}

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let cache = request_identity(parts);
        let ctx = IdentityContext {
            store: state.store.as_ref(),
            provider: state.identity.as_ref(),
            headers: &parts.headers,
            cache: &cache,
        };

        let user = resolve_current_user_or_none(&ctx).await?;
        Ok(MaybeUser(user))
    }
}
