//! Recipe API client and response models
//!
//! Typed surface over the recipe provider's search, pantry-match, and detail
//! endpoints, routed through the caching and quota layer in [`crate::cache`].

mod client;
mod types;

pub use client::{
    DetailParams, FetchError, FetchOptions, PantryParams, RecipeClient, SearchParams,
};
pub use types::{
    ExtendedIngredient, IngredientMatch, MatchedIngredient, Recipe, RecipeSummary, SearchResults,
};
