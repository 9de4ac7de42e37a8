use std::fmt;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::{StorageError, join_key};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignedMethod {
    Get,
    Put,
}

impl SignedMethod {
    fn as_str(self) -> &'static str {
        match self {
            SignedMethod::Get => "GET",
            SignedMethod::Put => "PUT",
        }
    }
}

/// Issues and checks the expiring URLs served by the `/storage/` route.
///
/// A signature covers the method, key, content type (empty for downloads)
/// and expiry, so a download URL cannot be replayed as an upload and an
/// upload URL is bound to the content type it was issued for.
#[derive(Clone)]
pub struct UrlSigner {
    mac: HmacSha256,
    base_url: String,
}

impl fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlSigner")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl UrlSigner {
    pub fn new(secret: &[u8], base_url: impl Into<String>) -> Result<Self, StorageError> {
        if secret.is_empty() {
            return Err(StorageError::InvalidSigningKey);
        }
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| StorageError::InvalidSigningKey)?;
        Ok(Self {
            mac,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn signature(&self, method: SignedMethod, key: &str, content_type: &str, expires: i64) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(payload(method, key, content_type, expires).as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    pub fn sign(&self, method: SignedMethod, key: &str, content_type: &str, expires: i64) -> String {
        URL_SAFE_NO_PAD.encode(self.signature(method, key, content_type, expires))
    }

    pub fn signed_url(
        &self,
        method: SignedMethod,
        key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> String {
        let expires = Utc::now().timestamp() + ttl.as_secs() as i64;
        let signature = self.sign(method, key, content_type, expires);
        format!(
            "{}?expires={expires}&signature={signature}",
            join_key(&format!("{}/storage", self.base_url), key)
        )
    }

    pub fn verify(
        &self,
        method: SignedMethod,
        key: &str,
        content_type: &str,
        expires: i64,
        signature: &str,
    ) -> Result<(), StorageError> {
        let provided = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| StorageError::InvalidSignature)?;

        let mut mac = self.mac.clone();
        mac.update(payload(method, key, content_type, expires).as_bytes());
        mac.verify_slice(&provided)
            .map_err(|_| StorageError::InvalidSignature)?;

        if expires < Utc::now().timestamp() {
            return Err(StorageError::Expired);
        }

        Ok(())
    }
}

fn payload(method: SignedMethod, key: &str, content_type: &str, expires: i64) -> String {
    format!("{}\n{key}\n{content_type}\n{expires}", method.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> UrlSigner {
        UrlSigner::new(b"test-secret", "http://localhost:8080/").unwrap()
    }

    fn query_param<'a>(url: &'a str, name: &str) -> &'a str {
        let query = url.split_once('?').unwrap().1;
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix(&format!("{name}=")))
            .unwrap()
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            UrlSigner::new(b"", "http://localhost"),
            Err(StorageError::InvalidSigningKey)
        ));
    }

    #[test]
    fn test_signed_url_verifies() {
        let signer = signer();
        let url = signer.signed_url(
            SignedMethod::Put,
            "uploads/u1/1-a.txt",
            "text/plain",
            Duration::from_secs(60),
        );
        assert!(url.starts_with("http://localhost:8080/storage/uploads/u1/1-a.txt?expires="));

        let expires: i64 = query_param(&url, "expires").parse().unwrap();
        let signature = query_param(&url, "signature");
        signer
            .verify(SignedMethod::Put, "uploads/u1/1-a.txt", "text/plain", expires, signature)
            .unwrap();
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let signer = signer();
        let expires = Utc::now().timestamp() + 60;
        let signature = signer.sign(SignedMethod::Get, "uploads/u1/a", "", expires);

        let wrong_key = signer.verify(SignedMethod::Get, "uploads/u2/a", "", expires, &signature);
        assert!(matches!(wrong_key, Err(StorageError::InvalidSignature)));

        let wrong_method = signer.verify(SignedMethod::Put, "uploads/u1/a", "", expires, &signature);
        assert!(matches!(wrong_method, Err(StorageError::InvalidSignature)));

        let extended = signer.verify(SignedMethod::Get, "uploads/u1/a", "", expires + 3600, &signature);
        assert!(matches!(extended, Err(StorageError::InvalidSignature)));

        let garbage = signer.verify(SignedMethod::Get, "uploads/u1/a", "", expires, "!!!");
        assert!(matches!(garbage, Err(StorageError::InvalidSignature)));
    }

    #[test]
    fn test_expired_signature_rejected() {
        let signer = signer();
        let expires = Utc::now().timestamp() - 1;
        let signature = signer.sign(SignedMethod::Get, "k", "", expires);
        assert!(matches!(
            signer.verify(SignedMethod::Get, "k", "", expires, &signature),
            Err(StorageError::Expired)
        ));
    }

    #[test]
    fn test_different_secrets_disagree() {
        let a = UrlSigner::new(b"one", "http://x").unwrap();
        let b = UrlSigner::new(b"two", "http://x").unwrap();
        let signature = a.sign(SignedMethod::Get, "k", "", i64::MAX);
        assert!(b.verify(SignedMethod::Get, "k", "", i64::MAX, &signature).is_err());
    }
}
