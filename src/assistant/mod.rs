mod client;
mod extract;
pub mod handlers;

use serde::Serialize;
use tracing::{error, instrument};

pub use client::{from_config, DisabledAnalyzer, MealAnalyzer, OpenAiAnalyzer, StaticAnalyzer};
pub use extract::{extract_calories, extract_foods};

pub const FALLBACK_REPLY: &str = "Sorry, I was unable to analyze your meal. Please try again.";

/// What the assistant hands back to the meal form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub response: String,
    pub foods: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<String>,
}

/// Asks the analyzer about a meal; failures turn into the fixed apology.
#[instrument(skip(analyzer, description))]
pub async fn clarify(analyzer: &dyn MealAnalyzer, description: &str) -> String {
    match analyzer.analyze(description).await {
        Ok(reply) => reply,
        Err(e) => {
            error!(error = %e, "getting meal clarification failed");
            FALLBACK_REPLY.to_string()
        }
    }
}

/// `None` for a blank description, otherwise the reply plus what could be
/// pulled out of it for pre-filling a meal.
pub async fn suggest(analyzer: &dyn MealAnalyzer, input: &str) -> Option<Suggestion> {
    if input.trim().is_empty() {
        return None;
    }
    let response = clarify(analyzer, input).await;
    Some(Suggestion {
        calories: extract_calories(&response),
        foods: extract_foods(input),
        response,
    })
}
