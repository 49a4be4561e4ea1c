use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum DietaryTag {
    Vegan,
    Vegetarian,
    GlutenFree,
}

impl std::fmt::Display for DietaryTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vegan => write!(f, "vegan"),
            Self::Vegetarian => write!(f, "vegetarian"),
            Self::GlutenFree => write!(f, "gluten-free"),
        }
    }
}

impl std::str::FromStr for DietaryTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vegan" => Ok(Self::Vegan),
            "vegetarian" => Ok(Self::Vegetarian),
            "gluten-free" | "gluten_free" | "glutenfree" => Ok(Self::GlutenFree),
            _ => Err(format!("Unknown dietary tag: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Allergen {
    Milk,
    Eggs,
    Fish,
    Shellfish,
    TreeNuts,
    Peanuts,
    Wheat,
    Soybeans,
    Sesame,
}

impl std::fmt::Display for Allergen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Milk => write!(f, "milk"),
            Self::Eggs => write!(f, "eggs"),
            Self::Fish => write!(f, "fish"),
            Self::Shellfish => write!(f, "shellfish"),
            Self::TreeNuts => write!(f, "tree-nuts"),
            Self::Peanuts => write!(f, "peanuts"),
            Self::Wheat => write!(f, "wheat"),
            Self::Soybeans => write!(f, "soybeans"),
            Self::Sesame => write!(f, "sesame"),
        }
    }
}

impl std::str::FromStr for Allergen {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "milk" => Ok(Self::Milk),
            "eggs" => Ok(Self::Eggs),
            "fish" => Ok(Self::Fish),
            "shellfish" => Ok(Self::Shellfish),
            "tree-nuts" | "tree_nuts" => Ok(Self::TreeNuts),
            "peanuts" => Ok(Self::Peanuts),
            "wheat" => Ok(Self::Wheat),
            "soybeans" => Ok(Self::Soybeans),
            "sesame" => Ok(Self::Sesame),
            _ => Err(format!("Unknown allergen: {s}")),
        }
    }
}
