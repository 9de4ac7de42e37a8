use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use super::{files, groups, objects, pages, users};
use crate::auth::{IdentityProvider, identity_scope};
use crate::service::validation::MAX_UPLOAD_SIZE;
use crate::storage::{ObjectStorage, UrlSigner};
use crate::store::Store;

/// Room for multipart framing on top of the largest accepted file.
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_SIZE + 1024 * 1024;

pub struct AppState {
    pub store: Arc<dyn Store>,
    /// `None` when no bucket is configured; file operations then fail with
    /// `StorageUnconfigured`.
    pub storage: Option<Arc<dyn ObjectStorage>>,
    pub identity: Arc<dyn IdentityProvider>,
    /// Verifies presigned URLs served by the `/storage/` routes.
    pub signer: UrlSigner,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        storage: Option<Arc<dyn ObjectStorage>>,
        identity: Arc<dyn IdentityProvider>,
        signer: UrlSigner,
    ) -> Self {
        Self {
            store,
            storage,
            identity,
            signer,
        }
    }

    #[must_use]
    pub fn storage(&self) -> Option<&dyn ObjectStorage> {
        self.storage.as_deref()
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Users
        .route("/session", get(users::session))
        .route("/users/me", get(users::get_me).patch(users::update_me))
        // Groups
        .route(
            "/groups",
            get(groups::list_groups).post(groups::create_group),
        )
        .route(
            "/groups/{id}",
            get(groups::get_group)
                .patch(groups::update_group)
                .delete(groups::delete_group),
        )
        .route("/groups/{id}/logo", put(groups::set_group_logo))
        .route("/groups/{id}/members", post(groups::add_member))
        .route(
            "/groups/{id}/members/{user_id}",
            patch(groups::set_member_role).delete(groups::remove_member),
        )
        .route("/groups/{id}/leave", post(groups::leave_group))
        .route(
            "/groups/{id}/pages",
            get(groups::list_pages).post(groups::create_page),
        )
        // Pages
        .route(
            "/pages/{id}",
            get(pages::get_page)
                .patch(pages::update_page)
                .delete(pages::delete_page),
        )
        .route("/pages/{id}/cover", put(pages::set_page_cover))
        // Files
        .route("/files", get(files::list_files).post(files::upload_file))
        .route("/files/{id}", delete(files::delete_file))
        .route("/upload/presign", get(files::presign_upload))
        .route("/upload/confirm", post(files::confirm_upload))
        .route("/upload/image", post(files::upload_image))
        .route("/download/{*key}", get(files::download))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .route("/files/{*key}", get(objects::serve_file))
        .route(
            "/storage/{*key}",
            get(objects::signed_download).put(objects::signed_upload),
        )
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .layer(middleware::from_fn(identity_scope))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
