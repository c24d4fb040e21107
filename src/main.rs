use anyhow::{Context, Result};
use clap::Parser;
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use newsdesk::api::{Category, Country, NewsClient};
use newsdesk::app::{App, AppEvent};
use newsdesk::config::{Config, API_KEY_ENV};
use newsdesk::storage::{Database, DatabaseError, KeyValueStore};
use newsdesk::theme::ThemeVariant;
use newsdesk::ui;

/// Get the config directory path (~/.config/newsdesk/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("newsdesk"))
}

#[derive(Parser, Debug)]
#[command(name = "newsdesk", about = "Terminal news browser for NewsAPI headlines and search")]
struct Args {
    /// Config file (default: ~/.config/newsdesk/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Reset database (delete bookmarks and preferences)
    #[arg(long)]
    reset_db: bool,

    /// Start with a search instead of top headlines
    #[arg(long, value_name = "TEXT")]
    search: Option<String>,

    /// Initial headlines category (overrides config)
    #[arg(long, value_name = "NAME")]
    category: Option<Category>,

    /// Initial headlines country, two-letter code (overrides config)
    #[arg(long, value_name = "CODE")]
    country: Option<Country>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        println!("Created config directory: {}", config_dir.display());
    }

    // User-only access to the directory holding the database
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(&config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(&config_dir, perms) {
                    tracing::warn!(
                        path = %config_dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_dir.display(),
                    error = %e,
                    "Failed to read config directory metadata"
                );
            }
        }
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    tracing::debug!(?config, "Configuration resolved");

    let api_key: SecretString = match config.resolve_api_key(std::env::var(API_KEY_ENV).ok()) {
        Ok(key) => key,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("Get a free key at https://newsapi.org and either:");
            eprintln!("  export {}=<your key>", API_KEY_ENV);
            eprintln!("or add to {}:", config_path.display());
            eprintln!("  api_key = \"<your key>\"");
            std::process::exit(1);
        }
    };

    let client = NewsClient::new(&config.base_url, api_key).context("Invalid news service URL")?;

    let db_path = config_dir.join("newsdesk.db");
    if args.reset_db && db_path.exists() {
        std::fs::remove_file(&db_path).context("Failed to delete database")?;
        println!("Database reset.");
    }

    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of newsdesk appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open database: {}", e));
        }
    };
    let store: Arc<dyn KeyValueStore> = Arc::new(db);

    let mut filters = config.initial_filters();
    if let Some(category) = args.category {
        filters.category = category;
    }
    if let Some(country) = args.country {
        filters.country = country;
    }
    if let Some(text) = args.search {
        filters.search_text = text;
    }

    let theme = ThemeVariant::from_str_name(&config.theme).unwrap_or_else(|| {
        tracing::warn!(theme = %config.theme, "Unknown theme in config, using light");
        ThemeVariant::default()
    });

    let mut app = App::new(client, store, filters, theme);
    // A stored theme choice overrides the config default
    app.load_persisted().await;

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    let request = app.apply_filters();
    ui::start_fetch(&mut app, request, &event_tx);

    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
