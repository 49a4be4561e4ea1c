//! Prompt templates for LLM-powered features.

/// System prompt for spiciness classification. The model is asked for a
/// bare `{"spicy": bool}` object; callers still parse the reply leniently.
pub const SPICY_SYSTEM_PROMPT: &str = "You are a food classification assistant. Given a food name and its ingredients, determine if the dish is spicy. A dish is spicy if it contains ingredients that produce heat/spiciness such as: chili peppers, jalape\u{f1}os, habaneros, cayenne, hot sauce, sriracha, crushed red pepper, pepper flakes, chipotle, wasabi, horseradish, gochujang, sambal, or similar spicy ingredients. Mildly flavored items with just black pepper or paprika are NOT considered spicy. Respond with ONLY valid JSON: {\"spicy\": true} or {\"spicy\": false}";

/// Reply budget for a classification; the expected answer is a few tokens.
pub const SPICY_MAX_TOKENS: u32 = 20;

/// User message for one food item.
///
/// # Example
/// ```
/// use bearbites::llm::prompts::spicy_classification_prompt;
///
/// let prompt = spicy_classification_prompt("Chili Verde", "Pork, Green Chiles, Salt");
/// assert!(prompt.starts_with("Food: Chili Verde\n"));
/// ```
pub fn spicy_classification_prompt(food_name: &str, ingredients: &str) -> String {
    format!("Food: {food_name}\nIngredients: {ingredients}")
}
