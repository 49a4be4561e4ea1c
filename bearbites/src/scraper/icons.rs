use regex::Regex;
use std::collections::BTreeSet;

use crate::error::Result;
use crate::models::{Allergen, DietaryTag};

const ALLERGEN_ICONS: &[(&str, Allergen)] = &[
    ("milk.png", Allergen::Milk),
    ("eggs.png", Allergen::Eggs),
    ("fish.png", Allergen::Fish),
    ("crustacean_shellfish.png", Allergen::Shellfish),
    ("tree_nuts.png", Allergen::TreeNuts),
    ("peanuts.png", Allergen::Peanuts),
    ("wheat.png", Allergen::Wheat),
    ("soybeans.png", Allergen::Soybeans),
    ("sesame.png", Allergen::Sesame),
];

const DIETARY_ICONS: &[(&str, DietaryTag)] = &[
    ("vgn_.png", DietaryTag::Vegan),
    ("veg_.png", DietaryTag::Vegetarian),
    ("gf_.png", DietaryTag::GlutenFree),
];

pub fn allergen_for_icon(filename: &str) -> Option<Allergen> {
    ALLERGEN_ICONS
        .iter()
        .find(|(name, _)| *name == filename)
        .map(|(_, allergen)| *allergen)
}

pub fn dietary_tag_for_icon(filename: &str) -> Option<DietaryTag> {
    DIETARY_ICONS
        .iter()
        .find(|(name, _)| *name == filename)
        .map(|(_, tag)| *tag)
}

/// Finds icon image references in a fragment and maps them to tags.
/// Unknown filenames are ignored; repeated icons collapse into one entry.
pub struct IconScanner {
    allergen_src: Regex,
    legend_src: Regex,
}

impl IconScanner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            allergen_src: Regex::new(r#"AllergenImages/([^"']+)"#)?,
            legend_src: Regex::new(r#"LegendImages/([^"']+)"#)?,
        })
    }

    pub fn allergens(&self, fragment: &str) -> BTreeSet<Allergen> {
        self.allergen_src
            .captures_iter(fragment)
            .filter_map(|caps| allergen_for_icon(&caps[1]))
            .collect()
    }

    pub fn dietary_tags(&self, fragment: &str) -> BTreeSet<DietaryTag> {
        self.legend_src
            .captures_iter(fragment)
            .filter_map(|caps| dietary_tag_for_icon(&caps[1]))
            .collect()
    }
}
