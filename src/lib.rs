//! # Cohort
//!
//! A backend for groups, pages, and per-user file uploads, usable both as a
//! standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! cohort = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cohort::auth::HeaderIdentityProvider;
//! use cohort::server::{AppState, create_router};
//! use cohort::storage::{LocalStorage, UrlSigner};
//! use cohort::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new("./data/cohort.db").unwrap();
//! store.initialize().unwrap();
//!
//! let signer = UrlSigner::new(b"secret", "http://localhost:8080").unwrap();
//! let storage = LocalStorage::new("./data".as_ref(), signer.clone(), None);
//!
//! let state = Arc::new(AppState::new(
//!     Arc::new(store),
//!     Some(Arc::new(storage)),
//!     Arc::new(HeaderIdentityProvider::default()),
//!     signer,
//! ));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `cohort` binary. Disable with `default-features = false`.

pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod service;
pub mod storage;
pub mod store;
pub mod types;
