//! Response models for the recipe API
//!
//! Mirrors the JSON shapes returned by the recipe provider. Optional fields
//! default so partial payloads still decode, and unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// Paged response from the complex-search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    /// Recipes on this page
    #[serde(default)]
    pub results: Vec<RecipeSummary>,
    /// Offset this page starts at
    #[serde(default)]
    pub offset: u32,
    /// Requested page size
    #[serde(default)]
    pub number: u32,
    /// Total matching recipes across all pages
    #[serde(default)]
    pub total_results: u64,
}

/// One recipe row in a search result page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    /// Recipe identifier used by the details endpoint
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    /// Provider score out of 100
    #[serde(default)]
    pub spoonacular_score: Option<f64>,
    #[serde(default)]
    pub aggregate_likes: Option<u32>,
}

/// A recipe matched against a pantry ingredient list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientMatch {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    /// How many listed ingredients the recipe uses
    #[serde(default)]
    pub used_ingredient_count: u32,
    /// How many additional ingredients the recipe needs
    #[serde(default)]
    pub missed_ingredient_count: u32,
    #[serde(default)]
    pub used_ingredients: Vec<MatchedIngredient>,
    #[serde(default)]
    pub missed_ingredients: Vec<MatchedIngredient>,
    #[serde(default)]
    pub likes: u32,
}

/// Ingredient detail inside a pantry match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedIngredient {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    /// The ingredient line as written in the recipe
    #[serde(default)]
    pub original: Option<String>,
}

/// Full details for a single recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ready_in_minutes: Option<u32>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub source_url: Option<String>,
    /// Short HTML description from the provider
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub cuisines: Vec<String>,
    #[serde(default)]
    pub dish_types: Vec<String>,
    #[serde(default)]
    pub extended_ingredients: Vec<ExtendedIngredient>,
    #[serde(default)]
    pub spoonacular_score: Option<f64>,
    #[serde(default)]
    pub aggregate_likes: Option<u32>,
}

/// One ingredient line in a recipe's details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedIngredient {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub original: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sample complex-search response
    const SEARCH_RESPONSE: &str = r#"{
        "results": [
            {
                "id": 716429,
                "title": "Pasta with Garlic, Scallions, Cauliflower & Breadcrumbs",
                "image": "https://img.spoonacular.com/recipes/716429-312x231.jpg",
                "spoonacularScore": 83.4,
                "aggregateLikes": 209
            },
            {
                "id": 715538,
                "title": "Bruschetta Style Pork & Pasta"
            }
        ],
        "offset": 0,
        "number": 2,
        "totalResults": 86
    }"#;

    /// Sample find-by-ingredients response
    const PANTRY_RESPONSE: &str = r#"[
        {
            "id": 673463,
            "title": "Slow Cooker Apple Pork Tenderloin",
            "image": "https://img.spoonacular.com/recipes/673463-312x231.jpg",
            "usedIngredientCount": 2,
            "missedIngredientCount": 1,
            "usedIngredients": [
                { "id": 9003, "name": "apple", "amount": 2.0, "unit": "" }
            ],
            "missedIngredients": [
                { "id": 10218, "name": "pork tenderloin", "amount": 1.5, "unit": "lb", "original": "1.5 lbs pork tenderloin" }
            ],
            "likes": 12
        }
    ]"#;

    /// Sample single-recipe information response
    const INFORMATION_RESPONSE: &str = r#"{
        "id": 716429,
        "title": "Pasta with Garlic, Scallions, Cauliflower & Breadcrumbs",
        "image": "https://img.spoonacular.com/recipes/716429-556x370.jpg",
        "readyInMinutes": 45,
        "servings": 2,
        "sourceUrl": "https://fullbellysisters.blogspot.com/2012/06/pasta-with-garlic-scallions-cauliflower.html",
        "summary": "Pasta with Garlic is a <b>budget friendly</b> main course.",
        "instructions": "Boil the pasta. Brown the breadcrumbs.",
        "cuisines": ["Mediterranean", "Italian"],
        "dishTypes": ["lunch", "main course"],
        "extendedIngredients": [
            { "id": 1001, "name": "butter", "amount": 1.0, "unit": "tbsp", "original": "1 tbsp butter" },
            { "id": 11135, "name": "cauliflower", "amount": 2.0, "unit": "cups" }
        ],
        "spoonacularScore": 83.4,
        "aggregateLikes": 209
    }"#;

    #[test]
    fn test_parse_search_response() {
        let results: SearchResults =
            serde_json::from_str(SEARCH_RESPONSE).expect("Failed to parse search response");

        assert_eq!(results.results.len(), 2);
        assert_eq!(results.total_results, 86);
        assert_eq!(results.results[0].id, 716429);
        assert_eq!(results.results[0].aggregate_likes, Some(209));
        assert!((results.results[0].spoonacular_score.unwrap() - 83.4).abs() < 0.01);

        // Second row omits every optional field
        assert_eq!(results.results[1].image, None);
        assert_eq!(results.results[1].spoonacular_score, None);
    }

    #[test]
    fn test_parse_pantry_response() {
        let matches: Vec<IngredientMatch> =
            serde_json::from_str(PANTRY_RESPONSE).expect("Failed to parse pantry response");

        assert_eq!(matches.len(), 1);
        let hit = &matches[0];
        assert_eq!(hit.used_ingredient_count, 2);
        assert_eq!(hit.missed_ingredient_count, 1);
        assert_eq!(hit.missed_ingredients[0].name, "pork tenderloin");
        assert_eq!(
            hit.missed_ingredients[0].original.as_deref(),
            Some("1.5 lbs pork tenderloin")
        );
        assert_eq!(hit.likes, 12);
    }

    #[test]
    fn test_parse_information_response() {
        let recipe: Recipe = serde_json::from_str(INFORMATION_RESPONSE)
            .expect("Failed to parse information response");

        assert_eq!(recipe.id, 716429);
        assert_eq!(recipe.ready_in_minutes, Some(45));
        assert_eq!(recipe.servings, Some(2));
        assert_eq!(recipe.cuisines, vec!["Mediterranean", "Italian"]);
        assert_eq!(recipe.extended_ingredients.len(), 2);
        assert_eq!(recipe.extended_ingredients[1].name, "cauliflower");
        assert_eq!(recipe.extended_ingredients[1].unit.as_deref(), Some("cups"));
    }

    #[test]
    fn test_minimal_recipe_decodes() {
        let recipe: Recipe = serde_json::from_str(r#"{"id": 1, "title": "Toast"}"#)
            .expect("Failed to parse minimal recipe");

        assert_eq!(recipe.title, "Toast");
        assert!(recipe.extended_ingredients.is_empty());
        assert_eq!(recipe.instructions, None);
    }

    #[test]
    fn test_search_results_roundtrip() {
        let results: SearchResults = serde_json::from_str(SEARCH_RESPONSE).unwrap();
        let json = serde_json::to_string(&results).expect("Failed to serialize");
        let back: SearchResults = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(back.results.len(), results.results.len());
        assert_eq!(back.results[0].title, results.results[0].title);
    }
}
