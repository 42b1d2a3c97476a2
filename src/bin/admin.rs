//! CLI administration tool for link-shortener.
//!
//! Provides commands for inspecting and creating links and for database
//! diagnostics without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # List links, optionally filtered
//! cargo run --bin admin -- links list --search example --limit 20
//!
//! # Show a single link
//! cargo run --bin admin -- links show promo
//!
//! # Create a link with a custom slug and expiry
//! cargo run --bin admin -- links create https://example.com --slug promo --expires-at 2030-01-01T00:00:00Z
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use link_shortener::application::services::LinkService;
use link_shortener::domain::entities::Link;
use link_shortener::infrastructure::persistence::PgLinkRepository;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing link-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage links
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

/// Link management subcommands.
#[derive(Subcommand)]
enum LinksAction {
    /// List links, ordered by id
    List {
        /// Case-insensitive substring of the URL or slug
        #[arg(short, long, default_value = "")]
        search: String,

        #[arg(long, default_value_t = 0)]
        offset: i64,

        #[arg(short, long, default_value_t = 100)]
        limit: i64,
    },

    /// Show a single link without counting a visit
    Show { slug: String },

    /// Create a new link
    Create {
        /// Target URL (http or https)
        url: String,

        /// Custom slug (generated if omitted)
        #[arg(short, long)]
        slug: Option<String>,

        /// Expiry as an RFC 3339 timestamp, e.g. 2030-01-01T00:00:00Z
        #[arg(short, long)]
        expires_at: Option<DateTime<Utc>>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
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

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Links { action } => handle_links_action(action, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches link management commands.
async fn handle_links_action(action: LinksAction, pool: &PgPool) -> Result<()> {
    let service = LinkService::new(Arc::new(PgLinkRepository::new(Arc::new(pool.clone()))));

    match action {
        LinksAction::List {
            search,
            offset,
            limit,
        } => list_links(&service, &search, offset, limit).await?,
        LinksAction::Show { slug } => {
            let link = service
                .get_link(&slug)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;
            print_link(&link);
        }
        LinksAction::Create {
            url,
            slug,
            expires_at,
            yes,
        } => create_link(&service, url, slug, expires_at, yes).await?,
    }

    Ok(())
}

/// Prints one page of links as a table.
///
/// ```text
/// 📋 Links
///
///   ID    Slug             Visits   Expires            URL
///   ───────────────────────────────────────────────────────────────────────────
///   1     promo            42       2030-01-01 00:00   https://example.com
/// ```
async fn list_links(
    service: &LinkService<PgLinkRepository>,
    search: &str,
    offset: i64,
    limit: i64,
) -> Result<()> {
    println!("{}", "📋 Links".bright_blue().bold());
    println!();

    let page = service
        .list_links(search, offset, limit)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if page.items.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<5} {:<16} {:<8} {:<18} {}",
        "ID".bright_white().bold(),
        "Slug".bright_white().bold(),
        "Visits".bright_white().bold(),
        "Expires".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    let now = Utc::now();
    for link in &page.items {
        let expires = match link.expires_at {
            Some(at) if at <= now => at.format("%Y-%m-%d %H:%M").to_string().red(),
            Some(at) => at.format("%Y-%m-%d %H:%M").to_string().normal(),
            None => "never".bright_black(),
        };

        println!(
            "  {:<5} {:<16} {:<8} {:<18} {}",
            link.id.to_string().bright_black(),
            link.slug.cyan(),
            link.visits.to_string().bright_green(),
            expires,
            link.url
        );
    }

    println!();
    println!(
        "  Showing {} of {}",
        page.items.len().to_string().bright_white().bold(),
        page.total.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Creates a link, asking for confirmation unless `--yes` is given.
///
/// An expiry in the past is accepted (the link will answer 410 Gone), but
/// the prompt then defaults to No.
async fn create_link(
    service: &LinkService<PgLinkRepository>,
    url: String,
    slug: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔗 Create Link".bright_blue().bold());
    println!();
    println!("  URL:     {}", url.cyan());
    println!(
        "  Slug:    {}",
        slug.as_deref().unwrap_or("(generated)").cyan()
    );

    let already_expired = expires_at.is_some_and(|at| at <= Utc::now());
    match expires_at {
        Some(at) if already_expired => {
            println!("  Expires: {}", at.to_rfc3339().red());
            println!();
            println!(
                "{}",
                "⚠️  The expiry is in the past; the link will never redirect.".yellow()
            );
        }
        Some(at) => println!("  Expires: {}", at.to_rfc3339().cyan()),
        None => println!("  Expires: {}", "never".bright_black()),
    }
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this link?")
            .default(!already_expired)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let link = service
        .create_link(url, slug, expires_at)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    println!();
    println!("{}", "✅ Link created successfully!".green().bold());
    println!();
    print_link(&link);

    Ok(())
}

fn print_link(link: &Link) {
    println!("  ID:      {}", link.id.to_string().bright_black());
    println!("  Slug:    {}", link.slug.bright_yellow().bold());
    println!("  URL:     {}", link.url.cyan());
    println!("  Visits:  {}", link.visits.to_string().bright_green());
    match link.expires_at {
        Some(at) if link.is_expired() => {
            println!("  Expires: {} {}", at.to_rfc3339().red(), "(expired)".red().bold())
        }
        Some(at) => println!("  Expires: {}", at.to_rfc3339()),
        None => println!("  Expires: {}", "never".bright_black()),
    }
    println!();
}

/// Handles database diagnostic commands.
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

            let (links_count, total_visits): (i64, i64) =
                sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(visits), 0)::BIGINT FROM links")
                    .fetch_one(pool)
                    .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!(
                "  Links:      {}",
                links_count.to_string().bright_green().bold()
            );
            println!(
                "  Visits:     {}",
                total_visits.to_string().bright_green().bold()
            );
            println!();
        }
    }

    Ok(())
}
