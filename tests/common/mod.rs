#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use chrono::Utc;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use cohort::auth::HeaderIdentityProvider;
use cohort::server::{AppState, create_router};
use cohort::storage::{LocalStorage, ObjectStorage, StorageError, StoredObject, UrlSigner};
use cohort::store::{SqliteStore, Store};
use cohort::types::User;

pub const BASE_URL: &str = "http://localhost:8080";
pub const SECRET: &[u8] = b"test-signing-secret";

pub fn signer() -> UrlSigner {
    UrlSigner::new(SECRET, BASE_URL).expect("signer")
}

/// A local bucket whose deletes can be switched to fail.
pub struct FlakyStorage {
    inner: LocalStorage,
    fail_deletes: AtomicBool,
}

impl FlakyStorage {
    pub fn new(temp_dir: &TempDir) -> Self {
        Self {
            inner: LocalStorage::new(temp_dir.path(), signer(), None),
            fail_deletes: AtomicBool::new(false),
        }
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStorage for FlakyStorage {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError> {
        self.inner.put(key, bytes, content_type).await
    }

    async fn get(&self, key: &str) -> Result<StoredObject, StorageError> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::other("bucket unavailable")));
        }
        self.inner.delete(key).await
    }

    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> Result<String, StorageError> {
        self.inner.presign_upload(key, content_type, ttl).await
    }

    async fn presign_download(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        self.inner.presign_download(key, ttl).await
    }

    fn public_url(&self, key: &str) -> String {
        self.inner.public_url(key)
    }
}

pub struct TestApp {
    pub temp_dir: TempDir,
    pub store: Arc<SqliteStore>,
    pub storage: Option<Arc<FlakyStorage>>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(true)
    }

    pub fn without_storage() -> Self {
        Self::build(false)
    }

    fn build(with_storage: bool) -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let store = Arc::new(SqliteStore::new(temp_dir.path().join("cohort.db")).expect("open db"));
        store.initialize().expect("initialize db");

        let storage = with_storage.then(|| Arc::new(FlakyStorage::new(&temp_dir)));

        let state = Arc::new(AppState::new(
            store.clone(),
            storage
                .clone()
                .map(|s| s as Arc<dyn ObjectStorage>),
            Arc::new(HeaderIdentityProvider::default()),
            signer(),
        ));

        Self {
            router: create_router(state),
            temp_dir,
            store,
            storage,
        }
    }

    pub fn storage(&self) -> Option<&dyn ObjectStorage> {
        self.storage.as_deref().map(|s| s as &dyn ObjectStorage)
    }

    pub fn flaky(&self) -> &FlakyStorage {
        self.storage.as_deref().expect("storage configured")
    }

    /// Inserts a user directly, bypassing the identity headers.
    pub fn create_user(&self, principal: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            external_id: principal.to_string(),
            email: Some(format!("{principal}@example.com")),
            name: None,
            phone: None,
            profile_image_url: None,
            created_at: now,
            updated_at: now,
        };
        self.store.create_user(&user).expect("create user");
        user
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Sends a JSON request as `principal` and returns the status and body.
    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        principal: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(principal) = principal {
            builder = builder.header("x-auth-user", principal);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self.send(request).await;
        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn get(&self, uri: &str, principal: &str) -> (StatusCode, Value) {
        self.json(Method::GET, uri, Some(principal), None).await
    }

    pub async fn post(&self, uri: &str, principal: &str, body: Value) -> (StatusCode, Value) {
        self.json(Method::POST, uri, Some(principal), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, principal: &str, body: Value) -> (StatusCode, Value) {
        self.json(Method::PATCH, uri, Some(principal), Some(body)).await
    }

    pub async fn put(&self, uri: &str, principal: &str, body: Value) -> (StatusCode, Value) {
        self.json(Method::PUT, uri, Some(principal), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, principal: &str) -> (StatusCode, Value) {
        self.json(Method::DELETE, uri, Some(principal), None).await
    }

    /// Resolves (and creates on first sight) the user behind `principal`.
    pub async fn me(&self, principal: &str) -> Value {
        let (status, body) = self.get("/api/v1/users/me", principal).await;
        assert_eq!(status, StatusCode::OK, "GET /users/me: {body}");
        body["data"].clone()
    }
}

pub async fn body_bytes(response: Response) -> Bytes {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body")
}

pub async fn body_json(response: Response) -> Value {
    let bytes = body_bytes(response).await;
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

const BOUNDARY: &str = "cohort-test-boundary";

/// A multipart body with one file part and any number of text parts.
pub fn multipart_body(
    file: Option<(&str, &str, &[u8])>,
    fields: &[(&str, &str)],
) -> (String, Vec<u8>) {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((filename, content_type, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

pub fn multipart_request(
    uri: &str,
    principal: &str,
    file: Option<(&str, &str, &[u8])>,
    fields: &[(&str, &str)],
) -> Request<Body> {
    let (content_type, body) = multipart_body(file, fields);
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("x-auth-user", principal)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .expect("build multipart request")
}

/// Extracts a query parameter from a URL without decoding it.
pub fn query_param<'a>(url: &'a str, name: &str) -> Option<&'a str> {
    let query = url.split_once('?')?.1;
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
}
