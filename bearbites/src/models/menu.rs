use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{Allergen, DietaryTag};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Brunch,
    Lunch,
    Dinner,
}

impl MealType {
    /// Meals in the order they are served through the day.
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Brunch,
        MealType::Lunch,
        MealType::Dinner,
    ];
}

impl std::fmt::Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Breakfast => write!(f, "breakfast"),
            Self::Brunch => write!(f, "brunch"),
            Self::Lunch => write!(f, "lunch"),
            Self::Dinner => write!(f, "dinner"),
        }
    }
}

impl std::str::FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "breakfast" => Ok(Self::Breakfast),
            "brunch" => Ok(Self::Brunch),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            _ => Err(format!("Unknown meal type: {s}")),
        }
    }
}

/// Spiciness of a menu item. Carried as `null | true | false` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum SpicyStatus {
    #[default]
    Unknown,
    Spicy,
    NotSpicy,
}

impl SpicyStatus {
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    pub fn from_bool(spicy: bool) -> Self {
        if spicy {
            Self::Spicy
        } else {
            Self::NotSpicy
        }
    }
}

impl From<Option<bool>> for SpicyStatus {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(spicy) => Self::from_bool(spicy),
            None => Self::Unknown,
        }
    }
}

impl From<SpicyStatus> for Option<bool> {
    fn from(value: SpicyStatus) -> Self {
        match value {
            SpicyStatus::Unknown => None,
            SpicyStatus::Spicy => Some(true),
            SpicyStatus::NotSpicy => Some(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    /// `RecNumAndPort` from the label URL; the identity key across caches.
    pub id: String,
    pub name: String,
    pub station: String,
    pub dietary_tags: BTreeSet<DietaryTag>,
    pub allergens: BTreeSet<Allergen>,
    pub label_url: String,
    #[serde(default)]
    pub is_spicy: SpicyStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayMenu {
    pub location_id: String,
    pub location_name: String,
    pub date: NaiveDate,
    /// A meal is present only when at least one item was parsed for it.
    pub meals: BTreeMap<MealType, Vec<MenuItem>>,
}

impl DayMenu {
    pub fn new(location_id: &str, location_name: &str, date: NaiveDate) -> Self {
        Self {
            location_id: location_id.to_string(),
            location_name: location_name.to_string(),
            date,
            meals: BTreeMap::new(),
        }
    }

    pub fn item_count(&self) -> usize {
        self.meals.values().map(Vec::len).sum()
    }

    pub fn has_items(&self) -> bool {
        self.meals.values().any(|items| !items.is_empty())
    }

    pub fn items(&self) -> impl Iterator<Item = &MenuItem> {
        self.meals.values().flatten()
    }

    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut MenuItem> {
        self.meals.values_mut().flatten()
    }

    /// True while any item still has an unknown spiciness.
    pub fn needs_enrichment(&self) -> bool {
        self.items().any(|item| !item.is_spicy.is_known())
    }
}

/// Earliest and latest dates the vendor currently publishes menus for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateBounds {
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
}

/// A search hit: the menu item plus the meal it was found under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealMenuItem {
    #[serde(flatten)]
    pub item: MenuItem,
    pub meal: MealType,
}

/// Dietary and allergen constraints applied to a day's menu.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuFilter {
    #[serde(default)]
    pub vegan: bool,
    #[serde(default)]
    pub vegetarian: bool,
    #[serde(default)]
    pub gluten_free: bool,
    #[serde(default)]
    pub exclude_allergens: BTreeSet<Allergen>,
}

impl MenuFilter {
    pub fn matches(&self, item: &MenuItem) -> bool {
        if self.vegan && !item.dietary_tags.contains(&DietaryTag::Vegan) {
            return false;
        }
        if self.vegetarian && !item.dietary_tags.contains(&DietaryTag::Vegetarian) {
            return false;
        }
        if self.gluten_free && !item.dietary_tags.contains(&DietaryTag::GlutenFree) {
            return false;
        }
        item.allergens.is_disjoint(&self.exclude_allergens)
    }
}
