//! Administration CLI for the shortlink engine.
//!
//! API keys are provisioned out of band with this tool; the HTTP API has no
//! endpoint for it.
//!
//! ```bash
//! cargo run --bin admin -- key create --name "CI" --rate-limit 120
//! cargo run --bin admin -- key list
//! cargo run --bin admin -- key deactivate "CI"
//! cargo run --bin admin -- links purge-expired
//! cargo run --bin admin -- db check
//! ```
//!
//! Reads `DATABASE_URL` (or the `DB_*` components) like the server does.

use shortlink_engine::application::background::BackgroundTasks;
use shortlink_engine::application::services::{AuthService, LinkService, LinkSettings};
use shortlink_engine::config::Config;
use shortlink_engine::domain::entities::ApiKey;
use shortlink_engine::domain::repositories::ApiKeyRepository;
use shortlink_engine::infrastructure::cache::NullCache;
use shortlink_engine::infrastructure::persistence::{PgApiKeyRepository, PgLinkRepository};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage API keys
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Link maintenance
    Links {
        #[command(subcommand)]
        action: LinksAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Create a new API key
    Create {
        /// Key name (e.g., "CI", "Mobile App")
        #[arg(short, long)]
        name: Option<String>,

        /// Requests per rate-limit window
        #[arg(short, long, default_value_t = 60)]
        rate_limit: i32,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all keys
    List,

    /// Deactivate a key; it is kept for audit
    Deactivate {
        /// Key name or UUID
        name_or_id: String,
    },
}

#[derive(Subcommand)]
enum LinksAction {
    /// Delete every link past its expiration
    PurgeExpired,
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    let pool = Arc::new(pool);

    match cli.command {
        Commands::Key { action } => handle_key_action(action, pool).await?,
        Commands::Links { action } => handle_links_action(action, pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_key_action(action: KeyAction, pool: Arc<PgPool>) -> Result<()> {
    let repo = Arc::new(PgApiKeyRepository::new(pool));

    match action {
        KeyAction::Create {
            name,
            rate_limit,
            yes,
        } => create_key(repo, name, rate_limit, yes).await,
        KeyAction::List => list_keys(repo).await,
        KeyAction::Deactivate { name_or_id } => deactivate_key(repo, name_or_id).await,
    }
}

/// Generates a key, stores its hash and prints the raw key once.
async fn create_key(
    repo: Arc<PgApiKeyRepository>,
    name: Option<String>,
    rate_limit: i32,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "Create API key".bright_blue().bold());
    println!();

    let key_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Key name")
            .with_initial_text("Production API")
            .interact_text()?,
    };

    println!("  Name:       {}", key_name.cyan());
    println!("  Rate limit: {} requests/window", rate_limit.to_string().cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this key?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let service = AuthService::new(repo, BackgroundTasks::new(1, Duration::from_secs(5)));
    let (raw_key, stored) = service
        .provision(&key_name, rate_limit)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create key: {e}"))?;

    println!("{}", "Key created.".green().bold());
    println!();
    println!("  ID:  {}", stored.id.to_string().bright_black());
    println!("  Key: {}", raw_key.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "Save this key now. It cannot be shown again.".red().bold()
    );
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"X-API-Key: {}\" -d '{{\"url\":\"https://example.com\"}}' \\",
        raw_key.bright_yellow()
    );
    println!("       -H 'Content-Type: application/json' http://localhost:8080/api/shorten");
    println!();

    Ok(())
}

async fn list_keys(repo: Arc<PgApiKeyRepository>) -> Result<()> {
    println!("{}", "API keys".bright_blue().bold());
    println!();

    let keys = repo
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list keys: {e}"))?;

    if keys.is_empty() {
        println!("{}", "  No keys found".yellow());
        println!();
        println!(
            "  Create one with: {} admin -- key create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<36} {:<24} {:>6} {:<17} {:<17} {:<8}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "RPM".bright_white().bold(),
        "Created".bright_white().bold(),
        "Last used".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "-".repeat(114).bright_black());

    for key in &keys {
        print_key_row(key);
    }

    println!();
    println!("  Total: {}", keys.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

fn print_key_row(key: &ApiKey) {
    let status = if key.is_active {
        "ACTIVE".green()
    } else {
        "INACTIVE".red()
    };
    let last_used = key
        .last_used_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string());

    println!(
        "  {:<36} {:<24} {:>6} {:<17} {:<17} {}",
        key.id.to_string().bright_black(),
        key.name.cyan(),
        key.rate_limit,
        key.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black(),
        last_used.bright_black(),
        status
    );
}

/// Deactivates a key by UUID or exact name, after confirmation.
async fn deactivate_key(repo: Arc<PgApiKeyRepository>, name_or_id: String) -> Result<()> {
    println!("{}", "Deactivate API key".bright_blue().bold());
    println!();

    let key = match name_or_id.parse::<Uuid>() {
        Ok(id) => repo.find_by_id(id).await,
        Err(_) => repo.find_by_name(&name_or_id).await,
    }
    .map_err(|e| anyhow::anyhow!("Database error: {e}"))?
    .context("Key not found")?;

    if !key.is_active {
        println!("{}", "This key is already inactive".yellow());
        return Ok(());
    }

    println!("  Key: {}", key.name.cyan());
    println!("  ID:  {}", key.id.to_string().bright_black());
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Deactivate this key?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "Cancelled".red());
        return Ok(());
    }

    repo.deactivate(key.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to deactivate key: {e}"))?;

    println!("{}", "Key deactivated.".green().bold());
    println!();

    Ok(())
}

async fn handle_links_action(action: LinksAction, pool: Arc<PgPool>) -> Result<()> {
    match action {
        LinksAction::PurgeExpired => {
            let service = LinkService::new(
                Arc::new(PgLinkRepository::new(pool)),
                Arc::new(NullCache::new()),
                BackgroundTasks::new(1, Duration::from_secs(5)),
                LinkSettings::default(),
            );

            let deleted = service
                .purge_expired()
                .await
                .map_err(|e| anyhow::anyhow!("Purge failed: {e}"))?;

            println!(
                "{} {}",
                "Expired links deleted:".green(),
                deleted.to_string().bright_white().bold()
            );
        }
    }

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").execute(pool).await?;

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("{}", "Database connection OK".green().bold());
            println!("  PostgreSQL: {}", version.bright_white());
        }
    }

    Ok(())
}
