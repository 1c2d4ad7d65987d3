use std::{collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Units a quantity can be logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Grams,
    Ml,
    Cups,
    Pieces,
    Oz,
    Tbsp,
    Tsp,
}

impl Unit {
    pub const ALL: [Unit; 7] = [
        Unit::Grams,
        Unit::Ml,
        Unit::Cups,
        Unit::Pieces,
        Unit::Oz,
        Unit::Tbsp,
        Unit::Tsp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Grams => "grams",
            Unit::Ml => "ml",
            Unit::Cups => "cups",
            Unit::Pieces => "pieces",
            Unit::Oz => "oz",
            Unit::Tbsp => "tbsp",
            Unit::Tsp => "tsp",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Unit::ALL
            .into_iter()
            .find(|u| u.as_str() == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown unit '{}', expected one of grams, ml, cups, pieces, oz, tbsp, tsp",
                    s.trim()
                )
            })
    }
}

/// Gram equivalent of a logged portion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Portion {
    pub grams: f64,
    /// Set when the piece count was read as a count of a sized container.
    pub utensil_conversion: bool,
}

/// Unit and serving-container conversion tables.
#[derive(Debug, Clone)]
pub struct UnitTable {
    grams_per_unit: HashMap<Unit, f64>,
    utensil_grams: Vec<(String, f64)>,
}

impl Default for UnitTable {
    fn default() -> Self {
        let grams_per_unit = HashMap::from([
            (Unit::Grams, 1.0),
            (Unit::Ml, 1.0),
            (Unit::Oz, 28.35),
            (Unit::Tbsp, 15.0),
            (Unit::Tsp, 5.0),
            (Unit::Cups, 240.0),
            (Unit::Pieces, 100.0),
        ]);
        let utensil_grams = [
            ("Small Bowl (~100ml)", 100.0),
            ("Medium Bowl (~150ml)", 150.0),
            ("Large Bowl (~250ml)", 250.0),
            ("Plate (~300ml)", 300.0),
            ("Glass (~200ml)", 200.0),
        ]
        .into_iter()
        .map(|(name, grams)| (name.to_string(), grams))
        .collect();
        Self::new(grams_per_unit, utensil_grams)
    }
}

impl UnitTable {
    pub fn new(grams_per_unit: HashMap<Unit, f64>, utensil_grams: Vec<(String, f64)>) -> Self {
        Self {
            grams_per_unit,
            utensil_grams,
        }
    }

    /// Grams for one `unit`; units missing from the table count as 1 g.
    pub fn grams_per(&self, unit: Unit) -> f64 {
        self.grams_per_unit.get(&unit).copied().unwrap_or(1.0)
    }

    pub fn to_grams(&self, quantity: f64, unit: Unit) -> f64 {
        quantity * self.grams_per(unit)
    }

    pub fn utensil_default(&self, utensil: &str) -> Option<f64> {
        self.utensil_grams
            .iter()
            .find(|(name, _)| name == utensil)
            .map(|(_, grams)| *grams)
    }

    pub fn utensil_defaults(&self) -> &[(String, f64)] {
        &self.utensil_grams
    }

    /// Resolves a logged portion to grams.
    ///
    /// A `pieces` quantity with a utensil is a count of that container:
    /// grams per container come from the user's calibration, then the
    /// default container table, then the generic per-piece weight.
    pub fn resolve(
        &self,
        quantity: f64,
        unit: Unit,
        utensil: Option<&str>,
        calibration: Option<f64>,
    ) -> Portion {
        let utensil = utensil.map(str::trim).filter(|u| !u.is_empty());
        match (unit, utensil) {
            (Unit::Pieces, Some(utensil)) => {
                let container = calibration
                    .filter(|g| g.is_finite() && *g > 0.0)
                    .or_else(|| self.utensil_default(utensil));
                Portion {
                    grams: quantity * container.unwrap_or_else(|| self.grams_per(Unit::Pieces)),
                    utensil_conversion: container.is_some(),
                }
            }
            _ => Portion {
                grams: self.to_grams(quantity, unit),
                utensil_conversion: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tablespoons_of_honey() {
        assert_eq!(UnitTable::default().to_grams(2.0, Unit::Tbsp), 30.0);
    }

    #[test]
    fn fixed_conversions() {
        let t = UnitTable::default();
        assert_eq!(t.to_grams(250.0, Unit::Ml), 250.0);
        assert_eq!(t.to_grams(0.5, Unit::Cups), 120.0);
        assert!((t.to_grams(2.0, Unit::Oz) - 56.7).abs() < 1e-9);
        assert_eq!(t.to_grams(3.0, Unit::Tsp), 15.0);
    }

    #[test]
    fn unit_missing_from_table_counts_as_one_gram() {
        let t = UnitTable::new(HashMap::from([(Unit::Grams, 1.0)]), Vec::new());
        assert_eq!(t.to_grams(7.0, Unit::Cups), 7.0);
    }

    #[test]
    fn medium_bowl_default_without_calibration() {
        let p = UnitTable::default().resolve(1.0, Unit::Pieces, Some("Medium Bowl (~150ml)"), None);
        assert_eq!(p.grams, 150.0);
        assert!(p.utensil_conversion);
    }

    #[test]
    fn calibration_beats_default_table() {
        let p = UnitTable::default().resolve(
            2.0,
            Unit::Pieces,
            Some("Medium Bowl (~150ml)"),
            Some(180.0),
        );
        assert_eq!(p.grams, 360.0);
    }

    #[test]
    fn unknown_utensil_falls_back_to_generic_piece() {
        let p = UnitTable::default().resolve(1.0, Unit::Pieces, Some("Tiffin"), None);
        assert_eq!(p.grams, 100.0);
        assert!(!p.utensil_conversion);
    }

    #[test]
    fn pieces_without_utensil_use_generic_weight() {
        let p = UnitTable::default().resolve(1.0, Unit::Pieces, None, None);
        assert_eq!(p.grams, 100.0);
        assert!(!p.utensil_conversion);
    }

    #[test]
    fn utensil_ignored_for_mass_units() {
        let p =
            UnitTable::default().resolve(80.0, Unit::Grams, Some("Plate (~300ml)"), Some(320.0));
        assert_eq!(p.grams, 80.0);
        assert!(!p.utensil_conversion);
    }

    #[test]
    fn parses_units_case_insensitively() {
        assert_eq!("TBSP".parse::<Unit>(), Ok(Unit::Tbsp));
        assert!("handful".parse::<Unit>().unwrap_err().contains("handful"));
    }
}
