//! Nutrition facts extraction. Every nutrient is looked up on its own;
//! a nutrient nothing matches stays at zero and never affects the others.

use super::strategy::StrategyCascade;
use super::text::{decode_entities, normalize_ws};
use crate::error::Result;
use crate::models::{NutrientAmount, Nutrition};

/// Non-digit text or whole tags between a label and its value.
const FILL: &str = r"(?:[^\d<]|<[^>]*>)*?";
/// Same, but must not cross a percent sign.
const DV_FILL: &str = r"(?:[^\d<%]|<[^>]*>)*?";
const NUMBER: &str = r"(\d+(?:\.\d+)?)";

fn nutrient_with_dv(field: &'static str, label: &str, unit: &str) -> Result<StrategyCascade> {
    let with_dv = format!(r"(?is)\b{label}{FILL}{NUMBER}\s*{unit}\b{DV_FILL}{NUMBER}\s*%");
    let amount_only = format!(r"(?is)\b{label}{FILL}{NUMBER}\s*{unit}\b");
    StrategyCascade::from_patterns(field, &[("labelled_with_dv", &with_dv), ("labelled", &amount_only)])
}

fn scalar_nutrient(field: &'static str, label: &str, unit: &str) -> Result<StrategyCascade> {
    let amount_only = format!(r"(?is)\b{label}{FILL}{NUMBER}\s*{unit}\b");
    StrategyCascade::from_patterns(field, &[("labelled", &amount_only)])
}

fn number(value: Option<&str>) -> f64 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0.0)
}

pub struct NutritionParser {
    serving_size: StrategyCascade,
    calories: StrategyCascade,
    total_fat: StrategyCascade,
    saturated_fat: StrategyCascade,
    trans_fat: StrategyCascade,
    cholesterol: StrategyCascade,
    sodium: StrategyCascade,
    total_carbs: StrategyCascade,
    fiber: StrategyCascade,
    total_sugars: StrategyCascade,
    added_sugars: StrategyCascade,
    protein: StrategyCascade,
    vitamin_d: StrategyCascade,
    calcium: StrategyCascade,
    iron: StrategyCascade,
    potassium: StrategyCascade,
}

impl NutritionParser {
    pub fn new() -> Result<Self> {
        let added_sugars = StrategyCascade::from_patterns(
            "added_sugars",
            &[
                (
                    "includes_added",
                    &format!(r"(?is)Includes\s*{NUMBER}\s*g\s*Added Sugars{DV_FILL}{NUMBER}\s*%"),
                ),
                (
                    "labelled_with_dv",
                    &format!(r"(?is)\bAdded Sugars{FILL}{NUMBER}\s*g\b{DV_FILL}{NUMBER}\s*%"),
                ),
                ("labelled", &format!(r"(?is)\bAdded Sugars{FILL}{NUMBER}\s*g\b")),
            ],
        )?;

        let trans_fat = StrategyCascade::from_patterns(
            "trans_fat",
            &[
                (
                    "split_emphasis",
                    &format!(r"(?is)Trans\s*</em>\s*Fat{FILL}{NUMBER}\s*g\b"),
                ),
                ("labelled", &format!(r"(?is)\bTrans Fat{FILL}{NUMBER}\s*g\b")),
            ],
        )?;

        Ok(Self {
            serving_size: StrategyCascade::from_patterns(
                "serving_size",
                &[
                    ("span_label", r"(?is)Serving Size[^<]*</span>\s*([^<]+)"),
                    ("right_value", r#"(?i)<div class="nf-right-value">([^<]+)</div>"#),
                    ("inline", r"(?i)Serving Size:\s*([^<]+)"),
                ],
            )?,
            calories: StrategyCascade::from_patterns(
                "calories",
                &[
                    ("calories_count_span", r#"(?i)<span class="nf-calories-count">(\d+)</span>"#),
                    ("calorie_count_div", r#"(?i)<div class="nf-calorie-count">(\d+)</div>"#),
                    ("adjacent_span", r"(?i)Calories\s*</span>\s*<span[^>]*>(\d+)"),
                ],
            )?,
            total_fat: nutrient_with_dv("total_fat", "Total Fat", "g")?,
            saturated_fat: nutrient_with_dv("saturated_fat", "Saturated Fat", "g")?,
            trans_fat,
            cholesterol: nutrient_with_dv("cholesterol", "Cholesterol", "mg")?,
            sodium: nutrient_with_dv("sodium", "Sodium", "mg")?,
            total_carbs: nutrient_with_dv("total_carbs", "Total Carbohydrate", "g")?,
            fiber: nutrient_with_dv("fiber", "Dietary Fiber", "g")?,
            total_sugars: scalar_nutrient("total_sugars", "Total Sugars", "g")?,
            added_sugars,
            protein: scalar_nutrient("protein", "Protein", "g")?,
            vitamin_d: nutrient_with_dv("vitamin_d", "Vitamin D", "mcg")?,
            calcium: nutrient_with_dv("calcium", "Calcium", "mg")?,
            iron: nutrient_with_dv("iron", "Iron", "mg")?,
            potassium: nutrient_with_dv("potassium", "Potassium", "mg")?,
        })
    }

    pub fn parse(&self, html: &str) -> Nutrition {
        let defaults = Nutrition::default();

        Nutrition {
            serving_size: self
                .serving_size
                .first_text(html)
                .map(|s| normalize_ws(&decode_entities(&s)))
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.serving_size),
            calories: Self::scalar(&self.calories, html),
            total_fat: Self::pair(&self.total_fat, html),
            saturated_fat: Self::pair(&self.saturated_fat, html),
            trans_fat: Self::scalar(&self.trans_fat, html),
            cholesterol: Self::pair(&self.cholesterol, html),
            sodium: Self::pair(&self.sodium, html),
            total_carbs: Self::pair(&self.total_carbs, html),
            fiber: Self::pair(&self.fiber, html),
            total_sugars: Self::scalar(&self.total_sugars, html),
            added_sugars: Self::pair(&self.added_sugars, html),
            protein: Self::scalar(&self.protein, html),
            vitamin_d: Self::pair(&self.vitamin_d, html),
            calcium: Self::pair(&self.calcium, html),
            iron: Self::pair(&self.iron, html),
            potassium: Self::pair(&self.potassium, html),
        }
    }

    fn scalar(cascade: &StrategyCascade, html: &str) -> f64 {
        cascade
            .first_match(html)
            .map(|m| number(m.group(0)))
            .unwrap_or(0.0)
    }

    fn pair(cascade: &StrategyCascade, html: &str) -> NutrientAmount {
        cascade
            .first_match(html)
            .map(|m| NutrientAmount {
                amount: number(m.group(0)),
                daily_value_percent: number(m.group(1)),
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_template() {
        let html = r#"
            <span class="nf-serving">Serving Size</span> 1 cup (240g)
            <span class="nf-calories">Calories</span><span class="nf-calories-count">250</span>
            <span><b>Total Fat</b> 12g</span><span class="nf-dv">15%</span>
            <span>Saturated Fat 3g</span><span>15%</span>
            <span><em>Trans</em> Fat 0.5g</span>
            <span><b>Sodium</b> 470mg</span><span>20%</span>
            <span>Includes 4g Added Sugars</span><span>8%</span>
            <span><b>Protein</b> 9g</span>
        "#;

        let parser = NutritionParser::new().unwrap();
        let n = parser.parse(html);
        assert_eq!(n.serving_size, "1 cup (240g)");
        assert_eq!(n.calories, 250.0);
        assert_eq!(n.total_fat, NutrientAmount { amount: 12.0, daily_value_percent: 15.0 });
        assert_eq!(n.saturated_fat.amount, 3.0);
        assert_eq!(n.trans_fat, 0.5);
        assert_eq!(n.sodium, NutrientAmount { amount: 470.0, daily_value_percent: 20.0 });
        assert_eq!(n.added_sugars, NutrientAmount { amount: 4.0, daily_value_percent: 8.0 });
        assert_eq!(n.protein, 9.0);
        assert_eq!(n.iron, NutrientAmount::default());
    }

    #[test]
    fn test_nothing_matches_gives_defaults() {
        let parser = NutritionParser::new().unwrap();
        assert_eq!(parser.parse("<html><body>Not a label</body></html>"), Nutrition::default());
    }

    #[test]
    fn test_amount_without_dv() {
        let parser = NutritionParser::new().unwrap();
        let n = parser.parse("<td>Dietary Fiber 2g</td><td>Total Sugars 5g</td>");
        assert_eq!(n.fiber, NutrientAmount { amount: 2.0, daily_value_percent: 0.0 });
        assert_eq!(n.total_sugars, 5.0);
    }
}
