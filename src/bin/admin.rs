//! Operator CLI for qr-tracker.
//!
//! Registers owners, shows usage statistics and runs database diagnostics
//! without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Register an owner; the credential is printed once
//! cargo run --bin admin -- owner create --handle alice
//!
//! # List owners
//! cargo run --bin admin -- owner list
//!
//! # Owners, codes and total scans
//! cargo run --bin admin -- stats
//!
//! # Database diagnostics / apply migrations
//! cargo run --bin admin -- db check
//! cargo run --bin admin -- db info
//! cargo run --bin admin -- db migrate
//! ```
//!
//! Reads the same environment as the server (`DATABASE_URL` or `DB_*`,
//! `TOKEN_SIGNING_SECRET`).

use qr_tracker::application::services::auth_service::hash_credential;
use qr_tracker::config::{self, Config};
use qr_tracker::domain::repositories::OwnerRepository;
use qr_tracker::infrastructure::persistence::PgOwnerRepository;
use qr_tracker::server::connect_pool;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// Length of generated owner credentials.
const CREDENTIAL_LEN: usize = 48;

/// CLI tool for managing qr-tracker.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage owners
    Owner {
        #[command(subcommand)]
        action: OwnerAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum OwnerAction {
    /// Register a new owner and print its API credential
    Create {
        /// Login handle (prompted for if omitted)
        #[arg(long)]
        handle: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all owners
    List,
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,

    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;
    let pool = connect_pool(&config).await?;

    match cli.command {
        Commands::Owner { action } => handle_owner_action(action, &config, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_owner_action(action: OwnerAction, config: &Config, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgOwnerRepository::new(Arc::new(pool.clone())));

    match action {
        OwnerAction::Create { handle, yes } => {
            create_owner(repo, &config.token_signing_secret, handle, yes).await
        }
        OwnerAction::List => list_owners(repo).await,
    }
}

/// Registers an owner.
///
/// Only the HMAC of the credential is stored, keyed by `TOKEN_SIGNING_SECRET`,
/// so the server must run with the same secret.
async fn create_owner(
    repo: Arc<PgOwnerRepository>,
    signing_secret: &str,
    handle: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "👤 Create Owner".bright_blue().bold());
    println!();

    let handle = match handle {
        Some(h) => h,
        None => Input::new().with_prompt("Handle").interact_text()?,
    };
    let handle = handle.trim().to_string();

    if handle.is_empty() {
        anyhow::bail!("Handle must not be empty");
    }

    if repo
        .find_by_handle(&handle)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .is_some()
    {
        anyhow::bail!("Handle '{}' is already taken", handle);
    }

    let credential = generate_credential();

    println!("  Handle:     {}", handle.cyan());
    println!("  Credential: {}", credential.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "⚠️  Save this credential now! It cannot be shown again."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this owner?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let owner = repo
        .create(&handle, &hash_credential(signing_secret, &credential))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create owner: {}", e))?;

    println!();
    println!(
        "{} (id {})",
        "✅ Owner created".green().bold(),
        owner.id.to_string().bright_white()
    );
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" -H \"Content-Type: application/json\" \\",
        credential.bright_yellow()
    );
    println!("       -d '{{\"target_url\":\"https://example.com\",\"count\":3}}' http://localhost:3000/codes");
    println!();

    Ok(())
}

async fn list_owners(repo: Arc<PgOwnerRepository>) -> Result<()> {
    println!("{}", "📋 Owners".bright_blue().bold());
    println!();

    let owners = repo
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list owners: {}", e))?;

    if owners.is_empty() {
        println!("{}", "  No owners found".yellow());
        println!();
        println!(
            "  Create one with: {} admin -- owner create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<5} {:<30} {:<20}",
        "ID".bright_white().bold(),
        "Handle".bright_white().bold(),
        "Created".bright_white().bold()
    );
    println!("  {}", "─".repeat(57).bright_black());

    for owner in &owners {
        println!(
            "  {:<5} {:<30} {}",
            owner.id.to_string().bright_black(),
            owner.handle.cyan(),
            owner
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black()
        );
    }

    println!();
    println!("  Total: {}", owners.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let owners: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM owners")
        .fetch_one(pool)
        .await?;

    let (codes, scans): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(scan_count), 0)::BIGINT FROM codes")
            .fetch_one(pool)
            .await?;

    println!("  Owners: {}", owners.to_string().bright_green().bold());
    println!("  Codes:  {}", codes.to_string().bright_green().bold());
    println!("  Scans:  {}", scans.to_string().bright_green().bold());
    println!();

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
        DbAction::Migrate => {
            println!("{}", "🛠  Applying migrations...".bright_blue());

            sqlx::migrate!("./migrations")
                .run(pool)
                .await
                .context("Failed to apply migrations")?;

            println!("{}", "✅ Migrations applied".green().bold());
        }
    }

    Ok(())
}

/// Generates a 48-character alphanumeric credential (~286 bits).
fn generate_credential() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    let mut rng = rand::rng();

    (0..CREDENTIAL_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}
