use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

/// Declares a preparation option enum whose wire form is its display label.
///
/// Absent, null, or empty values deserialize to the default variant; labels
/// outside the known set are kept verbatim in `Unrecognized`.
macro_rules! preparation_option {
    (
        $(#[$meta:meta])*
        $name:ident {
            default $default:ident => $default_label:literal,
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "Option<String>", into = "String")]
        pub enum $name {
            $default,
            $($variant,)+
            Unrecognized(String),
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl $name {
            pub fn label(&self) -> &str {
                match self {
                    Self::$default => $default_label,
                    $(Self::$variant => $label,)+
                    Self::Unrecognized(raw) => raw,
                }
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                match raw.trim() {
                    "" | $default_label => Self::$default,
                    $($label => Self::$variant,)+
                    other => Self::Unrecognized(other.to_string()),
                }
            }
        }

        impl From<Option<String>> for $name {
            fn from(raw: Option<String>) -> Self {
                raw.as_deref().map(Self::from).unwrap_or_default()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.label().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

preparation_option! {
    /// Cooking fat used in preparation.
    OilType {
        default NoOil => "No Oil",
        Refined => "Refined",
        Mustard => "Mustard",
        Olive => "Olive",
        DesiGhee => "Desi Ghee",
        Butter => "Butter",
    }
}

preparation_option! {
    /// Milk or dairy base mixed into the dish.
    DairyType {
        default NoDairy => "None",
        CowMilk => "Cow Milk",
        BuffaloMilk => "Buffalo Milk",
        SkimmedMilk => "Skimmed Milk",
        PlantMilk => "Plant Milk",
    }
}

preparation_option! {
    CookingIntensity {
        default Normal => "Normal",
        BoiledSteamed => "Boiled/Steamed",
        LightlyFried => "Lightly Fried",
        DeepFried => "Deep Fried",
        ExtraGhee => "Extra Ghee",
    }
}

/// How a dish was prepared. Only oil, dairy and intensity move the
/// calorie multiplier; the rest is kept for display and ingredient hints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreparationContext {
    #[serde(default)]
    pub oil_type: OilType,
    #[serde(default, alias = "milk_type")]
    pub dairy_type: DairyType,
    #[serde(default, alias = "intensity")]
    pub cooking_intensity: CookingIntensity,
    #[serde(default)]
    pub sugar_type: Option<String>,
    #[serde(default)]
    pub spice_level: Option<String>,
    #[serde(default)]
    pub utensil_type: Option<String>,
}

/// Per-option calorie multipliers.
#[derive(Debug, Clone)]
pub struct MultiplierTable {
    oil: HashMap<OilType, f64>,
    dairy: HashMap<DairyType, f64>,
    intensity: HashMap<CookingIntensity, f64>,
}

impl Default for MultiplierTable {
    fn default() -> Self {
        Self::new(
            HashMap::from([
                (OilType::NoOil, 1.0),
                (OilType::Refined, 1.1),
                (OilType::Mustard, 1.15),
                (OilType::Olive, 1.05),
                (OilType::DesiGhee, 1.3),
                (OilType::Butter, 1.25),
            ]),
            HashMap::from([
                (DairyType::NoDairy, 1.0),
                (DairyType::CowMilk, 1.1),
                (DairyType::BuffaloMilk, 1.25),
                (DairyType::SkimmedMilk, 0.9),
                (DairyType::PlantMilk, 0.8),
            ]),
            HashMap::from([
                (CookingIntensity::BoiledSteamed, 0.8),
                (CookingIntensity::LightlyFried, 0.95),
                (CookingIntensity::Normal, 1.0),
                (CookingIntensity::DeepFried, 1.25),
                (CookingIntensity::ExtraGhee, 1.3),
            ]),
        )
    }
}

impl MultiplierTable {
    pub fn new(
        oil: HashMap<OilType, f64>,
        dairy: HashMap<DairyType, f64>,
        intensity: HashMap<CookingIntensity, f64>,
    ) -> Self {
        Self {
            oil,
            dairy,
            intensity,
        }
    }

    pub fn oil(&self, oil: &OilType) -> f64 {
        self.oil.get(oil).copied().unwrap_or(1.0)
    }

    pub fn dairy(&self, dairy: &DairyType) -> f64 {
        self.dairy.get(dairy).copied().unwrap_or(1.0)
    }

    pub fn intensity(&self, intensity: &CookingIntensity) -> f64 {
        self.intensity.get(intensity).copied().unwrap_or(1.0)
    }

    pub fn multiplier(
        &self,
        oil: &OilType,
        dairy: &DairyType,
        intensity: &CookingIntensity,
    ) -> f64 {
        self.oil(oil) * self.dairy(dairy) * self.intensity(intensity)
    }

    pub fn for_context(&self, ctx: &PreparationContext) -> f64 {
        self.multiplier(&ctx.oil_type, &ctx.dairy_type, &ctx.cooking_intensity)
    }
}
