use std::{fmt, str::FromStr};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Dairy,
    Beverage,
    Cooked,
    Protein,
    Raw,
    Grain,
    Unknown,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Dairy => "dairy",
            Category::Beverage => "beverage",
            Category::Cooked => "cooked",
            Category::Protein => "protein",
            Category::Raw => "raw",
            Category::Grain => "grain",
            Category::Unknown => "unknown",
        }
    }

    /// Which preparation fields matter for foods of this category.
    pub fn visible_fields(self) -> VisibleFields {
        let none = VisibleFields::default();
        match self {
            Category::Dairy => VisibleFields {
                dairy_base: true,
                milk_type: true,
                ..none
            },
            Category::Beverage => VisibleFields {
                milk_type: true,
                sugar_type: true,
                ..none
            },
            Category::Cooked => VisibleFields {
                oil_type: true,
                cooking_intensity: true,
                spice_level: true,
                utensil: true,
                ..none
            },
            Category::Protein => VisibleFields {
                oil_type: true,
                cooking_intensity: true,
                ..none
            },
            Category::Raw | Category::Grain | Category::Unknown => none,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dairy" => Ok(Category::Dairy),
            "beverage" => Ok(Category::Beverage),
            "cooked" => Ok(Category::Cooked),
            "protein" => Ok(Category::Protein),
            "raw" => Ok(Category::Raw),
            "grain" => Ok(Category::Grain),
            "unknown" => Ok(Category::Unknown),
            other => Err(format!("unknown category '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VisibleFields {
    pub dairy_base: bool,
    pub milk_type: bool,
    pub oil_type: bool,
    pub cooking_intensity: bool,
    pub spice_level: bool,
    pub utensil: bool,
    pub sugar_type: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub category: Category,
    pub visible: VisibleFields,
    pub ingredients: Vec<String>,
}

// Scanned in order; the first keyword contained in the name wins.
const CATEGORY_KEYWORDS: &[(&str, Category)] = &[
    ("milk", Category::Dairy),
    ("tea", Category::Beverage),
    ("coffee", Category::Beverage),
    ("chai", Category::Beverage),
    ("paneer", Category::Protein),
    ("rice", Category::Grain),
    ("chicken", Category::Protein),
    ("poha", Category::Cooked),
    ("roti", Category::Cooked),
    ("curd", Category::Dairy),
    ("fruit", Category::Raw),
    ("dal", Category::Cooked),
    ("sabzi", Category::Cooked),
    ("egg", Category::Protein),
];

const INGREDIENT_KEYWORDS: &[(&str, &[&str])] = &[
    ("poha", &["Onion", "Green Chili", "Peanuts", "Mustard Seeds", "Coriander"]),
    ("sabzi", &["Onion", "Garlic", "Tomato", "Green Chili", "Ginger"]),
    ("dal", &["Onion", "Garlic", "Ghee", "Tomato", "Cumin"]),
    ("chicken", &["Onion", "Garlic", "Ginger", "Tomato", "Green Chili"]),
    ("roti", &["Atta (Chakki Fresh)", "Atta (Maida Mix)", "Multi-grain"]),
    ("tea", &["Sugar", "Milk"]),
    ("coffee", &["Sugar", "Milk"]),
    ("milk", &["Full Cream", "Toned", "Skimmed"]),
    ("paneer", &["Paneer Cubes", "Oil/Ghee", "Spices"]),
    ("salad", &["Lettuce", "Tomato", "Onion", "Olive Oil"]),
];

const MIN_NAME_LEN: usize = 2;

lazy_static! {
    static ref COOKED_RE: Regex = Regex::new(r"curry|fry|stew|sabzi|bhaji").unwrap();
    static ref BEVERAGE_RE: Regex = Regex::new(r"juice|shake|smoothie").unwrap();
}

pub fn detect(food_name: &str) -> Detection {
    let lower = food_name.trim().to_lowercase();
    if lower.chars().count() < MIN_NAME_LEN {
        return Detection {
            category: Category::Unknown,
            visible: VisibleFields::default(),
            ingredients: Vec::new(),
        };
    }
    let category = categorize(&lower);
    Detection {
        category,
        visible: category.visible_fields(),
        ingredients: suggest_ingredients(&lower),
    }
}

fn categorize(lower: &str) -> Category {
    if let Some((_, category)) = CATEGORY_KEYWORDS.iter().find(|(kw, _)| lower.contains(kw)) {
        return *category;
    }
    if COOKED_RE.is_match(lower) {
        Category::Cooked
    } else if BEVERAGE_RE.is_match(lower) {
        Category::Beverage
    } else {
        Category::Raw
    }
}

fn suggest_ingredients(lower: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for (_, items) in INGREDIENT_KEYWORDS.iter().filter(|(kw, _)| lower.contains(kw)) {
        for item in items.iter() {
            if !out.iter().any(|seen| seen == item) {
                out.push((*item).to_string());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masala_chai_is_a_beverage() {
        let d = detect("Masala Chai");
        assert_eq!(d.category, Category::Beverage);
        assert!(d.visible.milk_type);
        assert!(d.visible.sugar_type);
        assert!(!d.visible.oil_type);
    }

    #[test]
    fn keyword_order_decides_ties() {
        // "milk" is scanned before "tea"
        assert_eq!(detect("Milk Tea").category, Category::Dairy);
        assert_eq!(detect("Boiled Rice").category, Category::Grain);
    }

    #[test]
    fn heuristics_after_keywords() {
        assert_eq!(detect("Aloo Bhaji").category, Category::Cooked);
        assert_eq!(detect("Veg Stew").category, Category::Cooked);
        assert_eq!(detect("Mango Smoothie").category, Category::Beverage);
    }

    #[test]
    fn defaults_to_raw_when_nothing_matches() {
        let d = detect("Quinoa Bowl");
        assert_eq!(d.category, Category::Raw);
        assert_eq!(d.visible, VisibleFields::default());
        assert!(d.ingredients.is_empty());
    }

    #[test]
    fn short_names_are_unknown() {
        assert_eq!(detect("").category, Category::Unknown);
        assert_eq!(detect("  a ").category, Category::Unknown);
    }

    #[test]
    fn cooked_dishes_show_cooking_fields() {
        let d = detect("Dal Tadka");
        assert_eq!(d.category, Category::Cooked);
        assert!(d.visible.oil_type && d.visible.cooking_intensity);
        assert!(d.visible.spice_level && d.visible.utensil);
        assert_eq!(d.ingredients, vec!["Onion", "Garlic", "Ghee", "Tomato", "Cumin"]);
    }

    #[test]
    fn ingredient_suggestions_are_unioned_and_deduplicated() {
        let d = detect("Chicken Salad");
        assert_eq!(d.category, Category::Protein);
        assert_eq!(
            d.ingredients,
            vec!["Onion", "Garlic", "Ginger", "Tomato", "Green Chili", "Lettuce", "Olive Oil"]
        );
    }

    #[test]
    fn category_round_trips_through_str() {
        for c in [Category::Dairy, Category::Grain, Category::Unknown] {
            assert_eq!(c.as_str().parse::<Category>(), Ok(c));
        }
    }
}
