//! Label page parser: name, tags, nutrition facts and the ingredient tree.

use super::icons::IconScanner;
use super::ingredients::{parse_ingredient_container, parse_ingredient_text};
use super::nutrition::NutritionParser;
use super::strategy::StrategyCascade;
use super::text::{decode_entities, strip_tags};
use crate::error::Result;
use crate::models::{FoodDetail, Ingredient};

pub const UNKNOWN_NAME: &str = "Unknown";

pub struct LabelParser {
    name: StrategyCascade,
    ingredient_text: StrategyCascade,
    icons: IconScanner,
    nutrition: NutritionParser,
}

impl LabelParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            name: StrategyCascade::from_patterns(
                "name",
                &[
                    ("recipe_div", r#"(?i)<div class="labelrecipe">([^<]+)</div>"#),
                    ("heading", r"(?i)<h1[^>]*>([^<]+)</h1>"),
                    ("page_title", r"(?i)<title>([^<]+)</title>"),
                ],
            )?,
            ingredient_text: StrategyCascade::from_patterns(
                "ingredients",
                &[
                    ("ingred_paragraph", r#"(?is)<div class="ingred-paragraph">\s*<p>(.*?)</p>"#),
                    ("ingredients_heading", r"(?is)Ingredients:\s*(?:</[^>]+>\s*)*([^<]+)"),
                ],
            )?,
            icons: IconScanner::new()?,
            nutrition: NutritionParser::new()?,
        })
    }

    pub fn parse(&self, html: &str, item_id: &str) -> FoodDetail {
        let name = self
            .name
            .first_text(html)
            .map(|s| decode_entities(&s))
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());

        let ingredients = self.ingredients(html);
        tracing::debug!(item_id, name = %name, ingredients = ingredients.len(), "Parsed label page");

        FoodDetail {
            id: item_id.to_string(),
            name,
            dietary_tags: self.icons.dietary_tags(html),
            allergens: self.icons.allergens(html),
            nutrition: self.nutrition.parse(html),
            ingredients,
        }
    }

    /// Nested list markup when present, otherwise the flat paragraph.
    fn ingredients(&self, html: &str) -> Vec<Ingredient> {
        let tree = parse_ingredient_container(html);
        if !tree.is_empty() {
            return tree;
        }

        self.ingredient_text
            .first_match(html)
            .and_then(|m| m.group(0).map(strip_tags))
            .map(|text| parse_ingredient_text(&text))
            .unwrap_or_default()
    }
}
