//! Unit conversion functions
//!
//! Converts canonical metric values to and from their imperial display form,
//! formats them with unit suffixes, and parses user-entered strings back.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::units::{
    Language, Quantity, UnitSystem, CM_PER_INCH, G_PER_OZ, INCHES_PER_FOOT, LB_PER_KG, OZ_PER_G,
    PORTION_G_PER_OZ,
};

/// Errors raised by the string parsers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitParseError {
    #[error("No numeric value in '{0}'")]
    NoNumber(String),

    #[error("Invalid feet/inches value '{0}'")]
    InvalidFeetInches(String),

    #[error("Invalid portion '{0}' (expected e.g. \"100g\" or \"3.5oz\")")]
    InvalidPortion(String),
}

/// Round to a fixed number of decimal places, halves away from zero
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

// ============================================================================
// Conversions
// ============================================================================

/// Convert a weight between unit systems (kg <-> lb)
pub fn convert_weight(value: f64, from: UnitSystem, to: UnitSystem) -> f64 {
    match (from, to) {
        (UnitSystem::European, UnitSystem::American) => value * LB_PER_KG,
        (UnitSystem::American, UnitSystem::European) => value / LB_PER_KG,
        _ => value,
    }
}

/// Convert a height between unit systems (cm <-> in)
pub fn convert_height(value: f64, from: UnitSystem, to: UnitSystem) -> f64 {
    match (from, to) {
        (UnitSystem::European, UnitSystem::American) => value / CM_PER_INCH,
        (UnitSystem::American, UnitSystem::European) => value * CM_PER_INCH,
        _ => value,
    }
}

/// Convert a sugar/nutrient mass between unit systems (g <-> oz)
pub fn convert_sugar(value: f64, from: UnitSystem, to: UnitSystem) -> f64 {
    match (from, to) {
        (UnitSystem::European, UnitSystem::American) => value / G_PER_OZ,
        (UnitSystem::American, UnitSystem::European) => value * G_PER_OZ,
        _ => value,
    }
}

/// Dispatch to the converter for a quantity
pub fn convert(quantity: Quantity, value: f64, from: UnitSystem, to: UnitSystem) -> f64 {
    match quantity {
        Quantity::Weight => convert_weight(value, from, to),
        Quantity::Height => convert_height(value, from, to),
        Quantity::Sugar => convert_sugar(value, from, to),
    }
}

// ============================================================================
// Formatting
// ============================================================================

/// Format a weight already expressed in the target system
pub fn format_weight(value: f64, unit_system: UnitSystem) -> String {
    let rounded = value.round() as i64;
    match unit_system {
        UnitSystem::European => format!("{}kg", rounded),
        UnitSystem::American => format!("{}lbs", rounded),
    }
}

/// Format a height already expressed in the target system.
///
/// American values are total inches and render as `5'10"`.
pub fn format_height(value: f64, unit_system: UnitSystem) -> String {
    let total = value.round() as i64;
    match unit_system {
        UnitSystem::European => format!("{}cm", total),
        UnitSystem::American => {
            let feet = total.div_euclid(INCHES_PER_FOOT);
            let inches = total.rem_euclid(INCHES_PER_FOOT);
            format!("{}'{}\"", feet, inches)
        }
    }
}

/// Format a sugar mass given in grams
pub fn format_sugar(grams: f64, unit_system: UnitSystem) -> String {
    match unit_system {
        UnitSystem::European => format!("{}g", grams.round() as i64),
        UnitSystem::American => {
            let oz = grams / G_PER_OZ;
            if oz < 1.0 {
                format!("{:.1}oz", round_to(oz, 1))
            } else {
                format!("{}oz", oz.round() as i64)
            }
        }
    }
}

/// Format a macro-nutrient mass (grams) for the diary labels
pub fn format_nutrient_mass(grams: f64, unit_system: UnitSystem) -> String {
    match unit_system {
        UnitSystem::European => format!("{}g", grams.round() as i64),
        UnitSystem::American => format!("{:.1}oz", round_to(grams * OZ_PER_G, 1)),
    }
}

/// Numeric sugar value for chart axes and editable inputs.
///
/// European keeps two decimals of grams, American one decimal of ounces.
pub fn sugar_display_value(grams: f64, unit_system: UnitSystem) -> f64 {
    match unit_system {
        UnitSystem::European => round_to(grams, 2),
        UnitSystem::American => round_to(grams / G_PER_OZ, 1),
    }
}

/// Convert an edited display value back to whole grams
pub fn sugar_limit_from_display(display_value: f64, unit_system: UnitSystem) -> f64 {
    match unit_system {
        UnitSystem::European => display_value.round(),
        UnitSystem::American => (display_value * G_PER_OZ).round(),
    }
}

/// Sugar unit suffix for a unit system and language
pub fn sugar_unit(unit_system: UnitSystem, language: Language) -> &'static str {
    match (unit_system, language) {
        (UnitSystem::European, Language::Russian) => "г",
        (UnitSystem::European, _) => "g",
        (UnitSystem::American, _) => "oz",
    }
}

/// Energy unit suffix
pub fn calorie_unit(unit_system: UnitSystem) -> &'static str {
    match unit_system {
        UnitSystem::European => "kcal",
        UnitSystem::American => "Cal",
    }
}

// ============================================================================
// Parsing
// ============================================================================

fn strip_to_number(s: &str) -> Result<f64, UnitParseError> {
    let numeric: String = s.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    numeric
        .parse::<f64>()
        .map_err(|_| UnitParseError::NoNumber(s.to_string()))
}

/// Leading integer of a string, ignoring leading whitespace
fn leading_int(s: &str) -> Option<i64> {
    let trimmed = s.trim_start();
    let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Parse a suffixed weight such as "60kg" or "132lbs"
pub fn parse_weight(s: &str) -> Result<f64, UnitParseError> {
    strip_to_number(s)
}

/// Parse a height: "160cm" or `5'10"` (returned as total inches)
pub fn parse_height(s: &str) -> Result<f64, UnitParseError> {
    if let Some((feet_part, inches_part)) = s.split_once('\'') {
        let feet = leading_int(feet_part)
            .ok_or_else(|| UnitParseError::InvalidFeetInches(s.to_string()))?;
        let inches = leading_int(&inches_part.replace('"', ""))
            .ok_or_else(|| UnitParseError::InvalidFeetInches(s.to_string()))?;
        return Ok((feet * INCHES_PER_FOOT + inches) as f64);
    }
    strip_to_number(s)
}

// ============================================================================
// Portions
// ============================================================================

/// A portion as chosen in the product picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portion {
    /// Amount as displayed, e.g. "100g" or "3.5oz"
    pub amount: String,
    /// Weight of the portion in grams
    pub grams: f64,
}

/// Parse a portion string into grams.
///
/// Ounces are converted with the picker's 28.35 factor and rounded to whole
/// grams; grams keep their integer part.
pub fn parse_portion(amount: &str) -> Result<Portion, UnitParseError> {
    let trimmed = amount.trim();
    let lower = trimmed.to_lowercase();

    let grams = if let Some(oz_part) = lower.strip_suffix("oz") {
        let oz: f64 = oz_part
            .trim()
            .parse()
            .map_err(|_| UnitParseError::InvalidPortion(amount.to_string()))?;
        (oz * PORTION_G_PER_OZ).round()
    } else {
        let g_part = lower.strip_suffix('g').unwrap_or(&lower);
        leading_int(g_part).ok_or_else(|| UnitParseError::InvalidPortion(amount.to_string()))?
            as f64
    };

    Ok(Portion {
        amount: trimmed.to_string(),
        grams,
    })
}

/// Portion presets offered by the picker
pub fn predefined_portions(unit_system: UnitSystem) -> &'static [&'static str] {
    match unit_system {
        UnitSystem::European => &["100g", "200g", "300g", "400g", "500g"],
        UnitSystem::American => &["3.5oz", "7oz", "10.5oz", "14oz", "17.5oz"],
    }
}

/// Portion selected when the picker opens
pub fn default_portion(unit_system: UnitSystem) -> &'static str {
    predefined_portions(unit_system)[0]
}

/// Portion string for a custom numeric input
pub fn custom_portion(value: &str, unit_system: UnitSystem) -> String {
    match unit_system {
        UnitSystem::European => format!("{}g", value.trim()),
        UnitSystem::American => format!("{}oz", value.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EU: UnitSystem = UnitSystem::European;
    const US: UnitSystem = UnitSystem::American;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identity_conversions() {
        for v in [0.0, 1.0, 72.5, 1234.567] {
            assert_eq!(convert_weight(v, EU, EU), v);
            assert_eq!(convert_weight(v, US, US), v);
            assert_eq!(convert_height(v, EU, EU), v);
            assert_eq!(convert_sugar(v, US, US), v);
        }
    }

    #[test]
    fn test_round_trip_conversions() {
        for v in [0.0, 0.5, 50.0, 160.0, 999.9] {
            assert!(approx(convert_weight(convert_weight(v, EU, US), US, EU), v));
            assert!(approx(convert_height(convert_height(v, EU, US), US, EU), v));
            assert!(approx(convert_sugar(convert_sugar(v, EU, US), US, EU), v));
        }
    }

    #[test]
    fn test_conversion_factors() {
        assert!(approx(convert_weight(100.0, EU, US), 220.462));
        assert!(approx(convert_height(254.0, EU, US), 100.0));
        assert!(approx(convert_sugar(1.0, US, EU), 28.3495));
        assert_eq!(convert(Quantity::Sugar, 0.0, EU, US), 0.0);
    }

    #[test]
    fn test_format_weight() {
        assert_eq!(format_weight(60.4, EU), "60kg");
        assert_eq!(format_weight(132.6, US), "133lbs");
    }

    #[test]
    fn test_format_height() {
        assert_eq!(format_height(160.0, EU), "160cm");
        assert_eq!(format_height(70.0, US), "5'10\"");
        assert_eq!(format_height(71.6, US), "6'0\"");
    }

    #[test]
    fn test_format_sugar() {
        assert_eq!(format_sugar(49.6, EU), "50g");
        // 20g is ~0.705oz
        assert_eq!(format_sugar(20.0, US), "0.7oz");
        // 50g is ~1.76oz
        assert_eq!(format_sugar(50.0, US), "2oz");
        assert_eq!(format_sugar(0.0, US), "0.0oz");
    }

    #[test]
    fn test_format_nutrient_mass() {
        assert_eq!(format_nutrient_mass(35.4, EU), "35g");
        assert_eq!(format_nutrient_mass(100.0, US), "3.5oz");
    }

    #[test]
    fn test_sugar_display_value() {
        assert_eq!(sugar_display_value(50.0, US), 1.8);
        assert_eq!(sugar_display_value(12.3456, EU), 12.35);
        assert_eq!(sugar_display_value(0.0, US), 0.0);
    }

    #[test]
    fn test_sugar_limit_from_display() {
        assert_eq!(sugar_limit_from_display(50.4, EU), 50.0);
        assert_eq!(sugar_limit_from_display(1.8, US), 51.0);
    }

    #[test]
    fn test_units() {
        assert_eq!(sugar_unit(EU, Language::English), "g");
        assert_eq!(sugar_unit(EU, Language::Russian), "г");
        assert_eq!(sugar_unit(US, Language::Russian), "oz");
        assert_eq!(calorie_unit(US), "Cal");
    }

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight("60kg"), Ok(60.0));
        assert_eq!(parse_weight("132.5lbs"), Ok(132.5));
        assert!(parse_weight("heavy").is_err());
    }

    #[test]
    fn test_parse_height() {
        assert_eq!(parse_height("160cm"), Ok(160.0));
        assert_eq!(parse_height("5'10\""), Ok(70.0));
        assert_eq!(parse_height("6'0\""), Ok(72.0));
        assert!(parse_height("x'y").is_err());
    }

    #[test]
    fn test_parse_portion() {
        let grams = parse_portion("250g").unwrap();
        assert_eq!(grams.grams, 250.0);
        assert_eq!(grams.amount, "250g");

        // 3.5 * 28.35 = 99.225
        assert_eq!(parse_portion("3.5oz").unwrap().grams, 99.0);
        assert_eq!(parse_portion("7oz").unwrap().grams, 198.0);

        assert!(parse_portion("lots").is_err());
        assert!(parse_portion("abcoz").is_err());
    }

    #[test]
    fn test_portion_presets() {
        assert_eq!(default_portion(EU), "100g");
        assert_eq!(default_portion(US), "3.5oz");
        assert_eq!(predefined_portions(US).len(), 5);
        assert_eq!(custom_portion("42", US), "42oz");
    }
}
