use lazy_static::lazy_static;
use regex::Regex;

/// First "<n> calories" figure in the assistant's reply, if any.
pub fn extract_calories(reply: &str) -> Option<String> {
    lazy_static! {
        static ref CALORIES_RE: Regex = Regex::new(r"(?i)(\d+)\s*calories").unwrap();
    }
    CALORIES_RE
        .captures(reply)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// The user's own description reformatted as a food list: comma-split,
/// trimmed, blanks dropped. Nothing is taken from the reply.
pub fn extract_foods(input: &str) -> String {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
