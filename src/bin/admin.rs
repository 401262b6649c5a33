//! CLI administration tool for shortlink.
//!
//! Runs maintenance against the store without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Deactivate every link past its expiry
//! cargo run --bin admin -- sweep
//!
//! # Deactivate one link (asks for confirmation)
//! cargo run --bin admin -- deactivate promo2025
//!
//! # Show statistics for a code
//! cargo run --bin admin -- stats promo2025
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//!
//! # Estimate collision risk for a code length
//! cargo run --bin admin -- collision --length 6 --entries 1000000
//! ```
//!
//! # Environment Variables
//!
//! Database commands read the same variables as the server (`DATABASE_URL`
//! or `DB_*`, pool settings). When `REDIS_URL` is set, `deactivate` also
//! evicts the cached mapping.

use shortlink::application::services::LinkService;
use shortlink::config::Config;
use shortlink::domain::repositories::LinkRepository;
use shortlink::infrastructure::cache::{CacheService, NullCache, RedisCache};
use shortlink::infrastructure::persistence::PgLinkRepository;
use shortlink::server::connect_pool;
use shortlink::utils::code_generator::{
    ALPHABET, CodeGenerator, MAX_CODE_LENGTH, MIN_CODE_LENGTH, collision_probability,
};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shortlink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Deactivate all links whose expiry has passed
    Sweep,

    /// Deactivate a single link
    Deactivate {
        /// Short code to deactivate
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show statistics for a short code
    Stats {
        /// Short code to inspect
        code: String,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Estimate the chance that random codes collide
    Collision {
        /// Code length (clamped to 4..=12)
        #[arg(short, long, default_value_t = 7)]
        length: usize,

        /// Number of links already stored
        #[arg(short, long, default_value_t = 1_000_000)]
        entries: u64,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Commands::Collision { length, entries } = cli.command {
        print_collision(length, entries);
        return Ok(());
    }

    let config = Config::from_env().context("Failed to load configuration")?;
    let database_url = config
        .database_url
        .clone()
        .context("Admin commands need a Postgres store (DATABASE_URL)")?;
    let pool = connect_pool(&config, &database_url).await?;

    match cli.command {
        Commands::Sweep => sweep(&pool).await?,
        Commands::Deactivate { code, yes } => deactivate(&config, &pool, code, yes).await?,
        Commands::Stats { code } => show_stats(&config, &pool, &code).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
        Commands::Collision { .. } => {}
    }

    Ok(())
}

fn repository(pool: &PgPool) -> Arc<PgLinkRepository> {
    Arc::new(PgLinkRepository::new(Arc::new(pool.clone())))
}

async fn link_service(config: &Config, pool: &PgPool) -> LinkService<PgLinkRepository> {
    let cache: Arc<dyn CacheService> = match &config.redis_url {
        Some(url) => match RedisCache::connect(url).await {
            Ok(redis) => Arc::new(redis),
            Err(e) => {
                println!(
                    "{}",
                    format!("⚠️  Redis unavailable ({}); cache will not be evicted", e).yellow()
                );
                Arc::new(NullCache::new())
            }
        },
        None => Arc::new(NullCache::new()),
    };

    LinkService::new(repository(pool), cache, config.link_settings())
}

/// Bulk-deactivates expired links.
///
/// Resolution never depends on this having run; it only keeps the active
/// set small and frees expired codes for reuse.
async fn sweep(pool: &PgPool) -> Result<()> {
    println!("{}", "🧹 Sweeping expired links...".bright_blue());

    let count = repository(pool)
        .deactivate_expired(Utc::now())
        .await
        .map_err(|e| anyhow::anyhow!("Sweep failed: {}", e))?;

    println!(
        "{} {}",
        "✅ Deactivated:".green().bold(),
        count.to_string().bright_white().bold()
    );

    Ok(())
}

/// Deactivates one link after confirmation (default: No).
async fn deactivate(config: &Config, pool: &PgPool, code: String, skip_confirm: bool) -> Result<()> {
    println!("{}", "🔒 Deactivate Link".bright_blue().bold());
    println!();

    let service = link_service(config, pool).await;

    let link = service
        .get_info(&code)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("  Code:   {}", link.code.cyan());
    println!("  Target: {}", link.target.bright_white());
    println!("  Clicks: {}", link.click_count.to_string().bright_black());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Deactivate this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    service
        .deactivate(&code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to deactivate: {}", e))?;

    println!("{}", "✅ Link deactivated".green().bold());
    Ok(())
}

/// Prints statistics for the most recent link with this code.
async fn show_stats(config: &Config, pool: &PgPool, code: &str) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let stats = link_service(config, pool)
        .await
        .get_stats(code)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let status = if stats.status.is_active() {
        "ACTIVE".green()
    } else {
        "INACTIVE".red()
    };

    println!("  Code:        {}", stats.code.cyan());
    println!("  Target:      {}", stats.target.bright_white());
    println!("  Status:      {}", status);
    println!(
        "  Clicks:      {}",
        stats.total_clicks.to_string().bright_green().bold()
    );
    println!(
        "  Created:     {}",
        stats.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black()
    );

    if let Some(last) = stats.last_access_at {
        println!(
            "  Last access: {}",
            last.format("%Y-%m-%d %H:%M").to_string().bright_black()
        );
    }

    match (stats.expires_at, stats.days_remaining) {
        (Some(at), Some(days)) => println!(
            "  Expires:     {} ({} days left)",
            at.format("%Y-%m-%d %H:%M").to_string().bright_black(),
            days
        ),
        (Some(at), None) => println!(
            "  Expired:     {}",
            at.format("%Y-%m-%d %H:%M").to_string().yellow()
        ),
        _ => println!("  Expires:     {}", "never".bright_black()),
    }
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            repository(pool)
                .ping()
                .await
                .map_err(|e| anyhow::anyhow!("Database check failed: {}", e))?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;
            let (total, active): (i64, i64) = sqlx::query_as(
                "SELECT COUNT(*), COUNT(*) FILTER (WHERE active) FROM short_links",
            )
            .fetch_one(pool)
            .await?;

            println!("  PostgreSQL:   {}", version.bright_white());
            println!("  Links:        {}", total.to_string().bright_green());
            println!("  Active links: {}", active.to_string().bright_green());
            println!();
        }
    }

    Ok(())
}

/// Prints the birthday-bound collision estimate for random codes.
fn print_collision(length: usize, entries: u64) {
    let effective = CodeGenerator::new(length).length();
    let probability = collision_probability(effective, entries);

    println!("{}", "🎲 Collision Estimate".bright_blue().bold());
    println!();

    if effective != length {
        println!(
            "{}",
            format!(
                "⚠️  Length {} clamped to {} (allowed {}..={})",
                length, effective, MIN_CODE_LENGTH, MAX_CODE_LENGTH
            )
            .yellow()
        );
    }

    println!(
        "  Alphabet:    {} symbols",
        ALPHABET.len().to_string().bright_white()
    );
    println!("  Length:      {}", effective.to_string().bright_white());
    println!("  Entries:     {}", entries.to_string().bright_white());
    println!(
        "  Probability: {}",
        format!("{:.6e}", probability).bright_yellow().bold()
    );
    println!();
}
