// src/ingest/classify.rs
//
// Keyword-rule classifier. Pure and deterministic: the same
// (title, description) pair always yields the same label set.

/// Label assigned when no keyword group matches.
pub const DEFAULT_CATEGORY: &str = "General";

/// Ordered taxonomy: label + the keywords that select it. Adding a label
/// means adding a row here.
const CATEGORY_RULES: &[(&str, &[&str])] = &[
    ("AI Models", &["ai model", "language model", "gpt", "llm"]),
    ("AI in Education", &["education", "learning", "student", "teaching"]),
    ("AI Agents", &["agent", "assistant", "chatbot", "autonomous"]),
    ("Web Development", &["web", "developer", "coding", "programming"]),
];

/// Assign categories from keyword membership over the lowercased
/// title + description. Always returns at least one label.
pub fn categorize(title: &str, description: &str) -> Vec<String> {
    let content = format!("{} {}", title, description).to_lowercase();

    let mut categories: Vec<String> = Vec::new();
    for (label, keywords) in CATEGORY_RULES {
        if keywords.iter().any(|kw| content.contains(kw)) {
            categories.push((*label).to_string());
        }
    }

    if categories.is_empty() {
        categories.push(DEFAULT_CATEGORY.to_string());
    }
    categories
}
