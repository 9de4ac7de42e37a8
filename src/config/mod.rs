mod server;

pub use server::{
    CONFIG_FILE_NAME, SIGNING_KEY_FILE_NAME, ServerConfig, StorageBackend, StorageConfig,
};
