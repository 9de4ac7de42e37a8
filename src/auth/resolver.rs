use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::Utc;
use tokio::sync::OnceCell;
use uuid::Uuid;

use super::IdentityProvider;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::User;

/// Per-request cache of the resolved user.
///
/// Inserted into request extensions by the identity middleware; clones share
/// the same cell, so every extractor in one request sees one resolution.
#[derive(Debug, Clone, Default)]
pub struct RequestIdentity(Arc<OnceCell<User>>);

impl RequestIdentity {
    #[must_use]
    pub fn cached(&self) -> Option<&User> {
        self.0.get()
    }
}

/// Everything needed to resolve the caller of one request.
pub struct IdentityContext<'a> {
    pub store: &'a dyn Store,
    pub provider: &'a dyn IdentityProvider,
    pub headers: &'a HeaderMap,
    pub cache: &'a RequestIdentity,
}

/// Returns the local user for the authenticated principal, creating it on
/// first sight with the provider's profile.
pub async fn resolve_or_create_current_user(ctx: &IdentityContext<'_>) -> Result<User> {
    if let Some(user) = ctx.cache.cached() {
        return Ok(user.clone());
    }

    let principal = ctx
        .provider
        .session_principal(ctx.headers)
        .ok_or(Error::Unauthenticated)?;

    let user = ctx
        .cache
        .0
        .get_or_try_init(|| async {
            if let Some(user) = ctx.store.get_user_by_external_id(&principal)? {
                return Ok(user);
            }
            create_user(ctx, &principal).await
        })
        .await?;

    Ok(user.clone())
}

/// Like [`resolve_or_create_current_user`] but never creates a record.
pub async fn resolve_current_user_or_none(ctx: &IdentityContext<'_>) -> Result<Option<User>> {
    if let Some(user) = ctx.cache.cached() {
        return Ok(Some(user.clone()));
    }

    let Some(principal) = ctx.provider.session_principal(ctx.headers) else {
        return Ok(None);
    };

    let user = ctx.store.get_user_by_external_id(&principal)?;
    if let Some(user) = &user {
        // A concurrent resolution in the same request may have won; either
        // value is the same row.
        let _ = ctx.cache.0.set(user.clone());
    }
    Ok(user)
}

async fn create_user(ctx: &IdentityContext<'_>, principal: &str) -> Result<User> {
    let profile = ctx.provider.profile(principal, ctx.headers).await?;
    let now = Utc::now();

    let user = User {
        id: Uuid::new_v4().to_string(),
        external_id: principal.to_string(),
        email: profile.email,
        name: profile.name,
        phone: profile.phone,
        profile_image_url: None,
        created_at: now,
        updated_at: now,
    };

    match ctx.store.create_user(&user) {
        Ok(()) => {
            tracing::info!(user_id = %user.id, "Created user on first sign-in");
            Ok(user)
        }
        // Another request created the same principal first.
        Err(Error::Conflict(_)) => ctx
            .store
            .get_user_by_external_id(principal)?
            .ok_or(Error::NotFound),
        Err(e) => Err(e),
    }
}
