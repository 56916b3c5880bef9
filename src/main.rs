//! Forkful - Discover recipes from the command line
//!
//! Thin front end over the cached recipe API client: parses arguments, loads
//! configuration from the environment, runs one API operation, and prints the
//! results as plain text.

use std::error::Error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use forkful::api::{
    DetailParams, IngredientMatch, PantryParams, Recipe, RecipeClient, SearchParams, SearchResults,
};
use forkful::cli::{parse_ingredient_list, Cli, Command};
use forkful::config::Config;

/// Routes library logging to stderr, filtered by `RUST_LOG`.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?;
    let client = RecipeClient::new(config);

    match cli.command {
        Command::Search {
            query,
            cuisine,
            sort,
            number,
            offset,
            fresh,
        } => {
            let params = SearchParams {
                query,
                cuisine,
                sort,
                number,
                offset,
                bypass_cache: fresh,
                ..SearchParams::default()
            };
            let results = client.search_recipes(&params).await?;
            print_search_results(&results);
        }
        Command::Pantry {
            ingredients,
            number,
            ranking,
            include_pantry,
            fresh,
        } => {
            let params = PantryParams {
                ingredients: parse_ingredient_list(&ingredients),
                number,
                ranking,
                ignore_pantry: !include_pantry,
                bypass_cache: fresh,
                ..PantryParams::default()
            };
            let matches = client.find_by_ingredients(&params).await?;
            print_pantry_matches(&matches);
        }
        Command::Show { id, fresh } => {
            let params = DetailParams {
                bypass_cache: fresh,
                ..DetailParams::default()
            };
            let recipe = client.recipe_information(id, &params).await?;
            print_recipe(&recipe);
        }
        Command::Usage => match client.usage() {
            Some((count, limit)) => {
                println!("API usage today: {} of {} requests", count, limit);
            }
            None => println!("API usage tracking is unavailable (no cache directory)"),
        },
    }

    Ok(())
}

fn print_search_results(results: &SearchResults) {
    if results.results.is_empty() {
        println!("No recipes found.");
        return;
    }

    println!(
        "Found {} recipes (showing {} from offset {}):",
        results.total_results,
        results.results.len(),
        results.offset
    );
    println!();
    for recipe in &results.results {
        let likes = recipe
            .aggregate_likes
            .map(|likes| format!("  ({} likes)", likes))
            .unwrap_or_default();
        println!("  {:>8}  {}{}", recipe.id, recipe.title, likes);
    }
    println!();
    println!("Run `forkful show <ID>` for details.");
}

fn print_pantry_matches(matches: &[IngredientMatch]) {
    if matches.is_empty() {
        println!("No recipes match those ingredients.");
        return;
    }

    println!("Found {} matching recipes:", matches.len());
    println!();
    for hit in matches {
        println!(
            "  {:>8}  {}  (uses {}, missing {})",
            hit.id, hit.title, hit.used_ingredient_count, hit.missed_ingredient_count
        );
        if !hit.missed_ingredients.is_empty() {
            let names: Vec<&str> = hit
                .missed_ingredients
                .iter()
                .map(|ingredient| ingredient.name.as_str())
                .collect();
            println!("            still needed: {}", names.join(", "));
        }
    }
    println!();
    println!("Run `forkful show <ID>` for details.");
}

fn print_recipe(recipe: &Recipe) {
    println!("{}", recipe.title);
    println!();

    if let Some(minutes) = recipe.ready_in_minutes {
        println!("Ready in {} minutes", minutes);
    }
    if let Some(servings) = recipe.servings {
        println!("Serves {}", servings);
    }
    if !recipe.cuisines.is_empty() {
        println!("Cuisine: {}", recipe.cuisines.join(", "));
    }
    if !recipe.dish_types.is_empty() {
        println!("Dish types: {}", recipe.dish_types.join(", "));
    }

    if !recipe.extended_ingredients.is_empty() {
        println!();
        println!("Ingredients:");
        for ingredient in &recipe.extended_ingredients {
            match &ingredient.original {
                Some(line) => println!("  - {}", line),
                None => println!("  - {}", ingredient.name),
            }
        }
    }

    if let Some(instructions) = &recipe.instructions {
        println!();
        println!("Instructions:");
        println!("{}", instructions);
    }

    if let Some(source) = &recipe.source_url {
        println!();
        println!("Source: {}", source);
    }
}
