use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Profile fields the identity provider knows about a principal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// An external identity provider.
///
/// Authentication itself happens outside this crate; a provider only
/// reports who the current request belongs to.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The authenticated subject of the request, or `None` when anonymous.
    fn session_principal(&self, headers: &HeaderMap) -> Option<String>;

    async fn profile(&self, principal: &str, headers: &HeaderMap) -> Result<Profile>;
}

/// Header names set by the authenticating proxy in front of the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityHeaders {
    pub user: String,
    pub email: String,
    pub name: String,
    pub phone: String,
}

impl Default for IdentityHeaders {
    fn default() -> Self {
        Self {
            user: "x-auth-user".to_string(),
            email: "x-auth-email".to_string(),
            name: "x-auth-name".to_string(),
            phone: "x-auth-phone".to_string(),
        }
    }
}

/// Trusts identity headers injected by a reverse proxy.
///
/// Only safe when the server is reachable exclusively through that proxy,
/// which must strip these headers from incoming client requests.
#[derive(Debug, Clone, Default)]
pub struct HeaderIdentityProvider {
    headers: IdentityHeaders,
}

impl HeaderIdentityProvider {
    #[must_use]
    pub fn new(headers: IdentityHeaders) -> Self {
        Self { headers }
    }
}

/// Trimmed UTF-8 value of a header. Absent or blank is `None`.
fn header_value(headers: &HeaderMap, name: &str) -> Result<Option<String>> {
    let Some(raw) = headers.get(name) else {
        return Ok(None);
    };
    let value = std::str::from_utf8(raw.as_bytes())
        .map_err(|_| Error::Identity(format!("{name} header is not valid UTF-8")))?
        .trim();
    if value.is_empty() {
        Ok(None)
    } else {
        Ok(Some(value.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for HeaderIdentityProvider {
    fn session_principal(&self, headers: &HeaderMap) -> Option<String> {
        header_value(headers, &self.headers.user).ok().flatten()
    }

    async fn profile(&self, _principal: &str, headers: &HeaderMap) -> Result<Profile> {
        Ok(Profile {
            email: header_value(headers, &self.headers.email)?,
            name: header_value(headers, &self.headers.name)?,
            phone: header_value(headers, &self.headers.phone)?,
        })
    }
}
