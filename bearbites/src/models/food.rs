use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Allergen, DietaryTag};

/// One node of an ingredient tree.
///
/// Sub-ingredients come either from nested list markup or from a
/// parenthetical group ("Cheese (milk, enzymes)"). `is_note` marks
/// annotations such as "*Organic" that are not ingredients themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_note: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Ingredient>>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_note: false,
            children: None,
        }
    }

    pub fn note(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_note: true,
            children: None,
        }
    }

    pub fn with_children(mut self, children: Vec<Ingredient>) -> Self {
        self.children = if children.is_empty() {
            None
        } else {
            Some(children)
        };
        self
    }
}

/// Join an ingredient tree into one comma-separated string, depth first,
/// leaving out note nodes and everything beneath them.
pub fn flatten_ingredients(ingredients: &[Ingredient]) -> String {
    fn walk<'a>(items: &'a [Ingredient], parts: &mut Vec<&'a str>) {
        for item in items {
            if item.is_note {
                continue;
            }
            parts.push(&item.name);
            if let Some(children) = &item.children {
                walk(children, parts);
            }
        }
    }

    let mut parts = Vec::new();
    walk(ingredients, &mut parts);
    parts.join(", ")
}

/// A nutrient reported together with its percent daily value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientAmount {
    pub amount: f64,
    pub daily_value_percent: f64,
}

/// Nutrition facts from a label page. Unmatched nutrients stay at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nutrition {
    pub serving_size: String,
    pub calories: f64,
    pub total_fat: NutrientAmount,
    pub saturated_fat: NutrientAmount,
    pub trans_fat: f64,
    pub cholesterol: NutrientAmount,
    pub sodium: NutrientAmount,
    pub total_carbs: NutrientAmount,
    pub fiber: NutrientAmount,
    pub total_sugars: f64,
    pub added_sugars: NutrientAmount,
    pub protein: f64,
    pub vitamin_d: NutrientAmount,
    pub calcium: NutrientAmount,
    pub iron: NutrientAmount,
    pub potassium: NutrientAmount,
}

impl Default for Nutrition {
    fn default() -> Self {
        Self {
            serving_size: "1 serving".to_string(),
            calories: 0.0,
            total_fat: NutrientAmount::default(),
            saturated_fat: NutrientAmount::default(),
            trans_fat: 0.0,
            cholesterol: NutrientAmount::default(),
            sodium: NutrientAmount::default(),
            total_carbs: NutrientAmount::default(),
            fiber: NutrientAmount::default(),
            total_sugars: 0.0,
            added_sugars: NutrientAmount::default(),
            protein: 0.0,
            vitamin_d: NutrientAmount::default(),
            calcium: NutrientAmount::default(),
            iron: NutrientAmount::default(),
            potassium: NutrientAmount::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodDetail {
    pub id: String,
    pub name: String,
    pub dietary_tags: BTreeSet<DietaryTag>,
    pub allergens: BTreeSet<Allergen>,
    pub nutrition: Nutrition,
    pub ingredients: Vec<Ingredient>,
}

impl FoodDetail {
    pub fn ingredients_text(&self) -> String {
        flatten_ingredients(&self.ingredients)
    }
}
