use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::auth::IdentityHeaders;
use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "cohort.toml";
pub const SIGNING_KEY_FILE_NAME: &str = ".signing_key";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Objects on the local filesystem under `<data_dir>/objects`.
    #[default]
    Local,
    /// No bucket; file and image operations report storage as unconfigured.
    None,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Base URL under which objects are publicly readable (e.g. a CDN).
    /// When unset, objects are served through the `/files/` proxy route.
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Public base URL for external access (e.g., "https://app.example.com").
    /// Used for presigned storage URLs. Defaults to `http://<host>:<port>`.
    pub public_base_url: Option<String>,
    pub storage: StorageConfig,
    pub identity: IdentityHeaders,
}

impl ServerConfig {
    /// Reads `cohort.toml` from `data_dir` if present, otherwise returns the
    /// defaults. `data_dir` always wins over a value in the file.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE_NAME);
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.data_dir = data_dir.to_path_buf();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("cohort.db")
    }

    #[must_use]
    pub fn signing_key_path(&self) -> PathBuf {
        self.data_dir.join(SIGNING_KEY_FILE_NAME)
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        match &self.public_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.host, self.port),
        }
    }

    /// Reads the hex-encoded signing key written by `cohort admin init`.
    pub fn read_signing_key(&self) -> Result<Vec<u8>> {
        let path = self.signing_key_path();
        let contents = fs::read_to_string(&path)?;
        let key = hex::decode(contents.trim())
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        if key.is_empty() {
            return Err(Error::Config(format!("{} is empty", path.display())));
        }
        Ok(key)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            public_base_url: None,
            storage: StorageConfig::default(),
            identity: IdentityHeaders::default(),
        }
    }
}
