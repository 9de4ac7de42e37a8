use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use rand::RngCore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cohort::auth::HeaderIdentityProvider;
use cohort::config::{ServerConfig, StorageBackend};
use cohort::server::{AppState, create_router};
use cohort::storage::{LocalStorage, ObjectStorage, UrlSigner};
use cohort::store::{SqliteStore, Store};

const SIGNING_KEY_BYTES: usize = 32;

#[cfg(unix)]
fn set_restrictive_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

#[derive(Parser)]
#[command(name = "cohort")]
#[command(about = "A backend for groups, pages, and file uploads", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Data directory for the database, objects, and cohort.toml
        #[arg(long, env = "COHORT_DATA_DIR", default_value = "./data")]
        data_dir: PathBuf,

        /// Host to bind to [default: 127.0.0.1]
        #[arg(long, env = "COHORT_HOST")]
        host: Option<String>,

        /// Port to bind to [default: 8080]
        #[arg(long, short, env = "COHORT_PORT")]
        port: Option<u16>,

        /// Public base URL for external access (e.g., "https://app.example.com").
        /// Used for presigned storage URLs.
        #[arg(long, env = "COHORT_PUBLIC_BASE_URL")]
        public_base_url: Option<String>,

        /// Base URL under which stored objects are publicly readable
        #[arg(long, env = "COHORT_STORAGE_PUBLIC_URL")]
        storage_public_url: Option<String>,

        /// Run without object storage
        #[arg(long)]
        no_storage: bool,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create database and signing key)
    Init {
        /// Data directory for the database, objects, and cohort.toml
        #[arg(long, env = "COHORT_DATA_DIR", default_value = "./data")]
        data_dir: PathBuf,
    },
}

fn run_init(data_dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;

    let config = ServerConfig::load(data_dir)?;
    let key_file = config.signing_key_path();

    if key_file.exists() {
        bail!(
            "Server already initialized. Signing key exists at: {}",
            key_file.display()
        );
    }

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;

    let mut key = [0u8; SIGNING_KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut key);
    fs::write(&key_file, hex::encode(key))?;

    #[cfg(unix)]
    set_restrictive_permissions(&key_file);

    println!("Initialized database at {}", config.db_path().display());
    println!("Signing key written to {}", key_file.display());

    Ok(())
}

fn build_storage(
    config: &ServerConfig,
    signer: &UrlSigner,
) -> Option<Arc<dyn ObjectStorage>> {
    match config.storage.backend {
        StorageBackend::Local => Some(Arc::new(LocalStorage::new(
            &config.data_dir,
            signer.clone(),
            config.storage.public_url.clone(),
        ))),
        StorageBackend::None => None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("cohort=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init { data_dir } => {
                run_init(&data_dir)?;
            }
        },
        Commands::Serve {
            data_dir,
            host,
            port,
            public_base_url,
            storage_public_url,
            no_storage,
        } => {
            let mut config = ServerConfig::load(&data_dir)?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if public_base_url.is_some() {
                config.public_base_url = public_base_url;
            }
            if storage_public_url.is_some() {
                config.storage.public_url = storage_public_url;
            }
            if no_storage {
                config.storage.backend = StorageBackend::None;
            }

            if !config.signing_key_path().exists() {
                bail!(
                    "Server not initialized. Run 'cohort admin init' first to create the database and signing key."
                );
            }

            let signer = UrlSigner::new(&config.read_signing_key()?, config.base_url())?;
            let storage = build_storage(&config, &signer);
            if storage.is_none() {
                info!("Object storage disabled; file uploads will be rejected");
            }

            let store = SqliteStore::new(config.db_path())?;
            store.initialize()?;

            let state = Arc::new(AppState::new(
                Arc::new(store),
                storage,
                Arc::new(HeaderIdentityProvider::new(config.identity.clone())),
                signer,
            ));

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
