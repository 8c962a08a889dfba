//! docsearch CLI - search request/response translation
//!
//! Builds backend search requests from a schema file and search intent, and
//! turns raw backend responses back into typed results.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docsearch::commands::{self, ExtractMode, QueryArgs};
use docsearch_core::config::Config;
use docsearch_query::HandlerRegistry;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "docsearch")]
#[command(about = "Search request builder and response extractor")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Entity type schema file (JSON array)
    #[arg(short, long, value_name = "FILE", global = true)]
    schema: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an offset-paginated search request
    Request {
        #[command(flatten)]
        query: QueryArgs,

        #[arg(long, default_value_t = 0)]
        from: usize,

        #[arg(long, default_value_t = 10)]
        size: usize,
    },
    /// Build a cursor-paginated search request
    ScrollRequest {
        #[command(flatten)]
        query: QueryArgs,

        /// Cursor returned with the previous page
        #[arg(long)]
        cursor: Option<String>,

        /// Session keep-alive, e.g. 5m
        #[arg(long)]
        keep_alive: Option<String>,

        #[arg(long, default_value_t = 10)]
        size: usize,
    },
    /// Build an aggregation-only request for one field
    Aggregate {
        field: String,

        /// Filter JSON file
        #[arg(long, value_name = "FILE")]
        filter: Option<PathBuf>,

        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Extract a typed result from a raw backend response
    Extract {
        /// Raw response JSON file
        response: PathBuf,

        /// Filter JSON file the request was built with
        #[arg(long, value_name = "FILE")]
        filter: Option<PathBuf>,

        #[arg(long, default_value_t = 0)]
        from: usize,

        #[arg(long, default_value_t = 10)]
        size: usize,

        /// Extract a cursor page instead of an offset page
        #[arg(long)]
        scroll: bool,

        /// Cursor the page was requested with (with --scroll)
        #[arg(long, requires = "scroll")]
        cursor: Option<String>,

        /// Session keep-alive the page was requested with (with --scroll)
        #[arg(long, requires = "scroll")]
        keep_alive: Option<String>,

        /// The backend does not support point-in-time sessions
        #[arg(long, requires = "scroll")]
        no_session: bool,
    },
    /// Inspect scroll cursors
    #[command(subcommand)]
    Cursor(CursorCommands),
}

#[derive(Subcommand)]
enum CursorCommands {
    /// Print the contents of a cursor token
    Decode { token: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose)?;

    let Some(command) = cli.command else {
        println!("Run 'docsearch request --schema <FILE>' to build a request, or --help for more options");
        return Ok(());
    };

    let output = match command {
        Commands::Cursor(CursorCommands::Decode { token }) => commands::decode_cursor(&token)?,
        command => {
            let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
            config.validate().context("Invalid configuration")?;
            debug!("Loaded configuration: {:?}", config.search);
            run(command, &config, cli.schema.as_deref())?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run(command: Commands, config: &Config, schema: Option<&Path>) -> Result<Value> {
    let schema = schema.context("--schema is required for this command")?;
    let registry = HandlerRegistry::from_config(config);
    let handler = commands::handler_for(&registry, schema)?;

    match command {
        Commands::Request { query, from, size } => {
            commands::build_request(&handler, &query, from, size)
        }
        Commands::ScrollRequest {
            query,
            cursor,
            keep_alive,
            size,
        } => commands::build_scroll_request(
            &handler,
            &query,
            cursor.as_deref(),
            keep_alive.as_deref(),
            size,
        ),
        Commands::Aggregate {
            field,
            filter,
            limit,
        } => commands::build_aggregation_request(&handler, &field, filter.as_deref(), limit),
        Commands::Extract {
            response,
            filter,
            from,
            size,
            scroll,
            cursor,
            keep_alive,
            no_session,
        } => {
            let mode = if scroll {
                ExtractMode::Scroll {
                    cursor,
                    keep_alive,
                    size,
                    supports_session: !no_session,
                }
            } else {
                ExtractMode::Offset { from, size }
            };
            commands::extract(&handler, &response, filter.as_deref(), mode)
        }
        Commands::Cursor(CursorCommands::Decode { token }) => commands::decode_cursor(&token),
    }
}

/// Initialize logging system
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "docsearch={level},docsearch_query={level},docsearch_core={level}"
        ))
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
