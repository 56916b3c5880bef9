//! Command-line interface parsing for forkful
//!
//! This module handles parsing of CLI arguments using clap. Each subcommand
//! maps onto one recipe API operation; the `--fresh` flag skips cache reads
//! for a forced refetch.

use clap::{Parser, Subcommand};

/// Forkful - Discover recipes from your terminal
#[derive(Parser, Debug)]
#[command(name = "forkful")]
#[command(about = "Search recipes by cuisine, query, or pantry ingredients")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search recipes by free-text query and/or cuisine
    Search {
        /// Free-text search, e.g. "pasta"
        query: Option<String>,

        /// Restrict results to a cuisine, e.g. "italian"
        #[arg(long)]
        cuisine: Option<String>,

        /// Result ordering, e.g. "popularity" or "healthiness"
        #[arg(long)]
        sort: Option<String>,

        /// Number of results per page
        #[arg(long, default_value_t = 6)]
        number: u32,

        /// Result offset for pagination
        #[arg(long, default_value_t = 0)]
        offset: u32,

        /// Skip caches and fetch from the API
        #[arg(long)]
        fresh: bool,
    },

    /// Find recipes that use the ingredients you have on hand
    Pantry {
        /// Comma-separated ingredient list, e.g. "tomato,basil,mozzarella"
        ingredients: String,

        /// Maximum number of matches to show
        #[arg(long, default_value_t = 6)]
        number: u32,

        /// 1 = maximize used ingredients, 2 = minimize missing ones
        #[arg(long, default_value_t = 1)]
        ranking: u8,

        /// Count pantry staples like salt and flour as missing too
        #[arg(long)]
        include_pantry: bool,

        /// Skip caches and fetch from the API
        #[arg(long)]
        fresh: bool,
    },

    /// Show full details for a single recipe
    Show {
        /// Recipe identifier from a previous search
        id: u64,

        /// Skip caches and fetch from the API
        #[arg(long)]
        fresh: bool,
    },

    /// Show today's API usage against the daily limit
    Usage,
}

/// Splits a comma-separated ingredient list into trimmed, non-empty items.
pub fn parse_ingredient_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
