//! Unit types and conversion constants
//!
//! Display unit systems, languages, and the factors used to move between
//! canonical metric values and their imperial renderings.

use serde::{Deserialize, Serialize};

/// Display unit system. Stored values are always metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Kilograms, centimeters, grams
    #[default]
    European,
    /// Pounds, feet/inches, ounces
    American,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::European => "european",
            UnitSystem::American => "american",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "european" | "metric" => Some(UnitSystem::European),
            "american" | "imperial" => Some(UnitSystem::American),
            _ => None,
        }
    }
}

/// Interface language. Only unit-suffix text depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    English,
    French,
    Russian,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::French => "French",
            Language::Russian => "Russian",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "english" | "en" => Some(Language::English),
            "french" | "fr" => Some(Language::French),
            "russian" | "ru" => Some(Language::Russian),
            _ => None,
        }
    }
}

/// Quantity handled by the converters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantity {
    /// kg <-> lb
    Weight,
    /// cm <-> in
    Height,
    /// g <-> oz
    Sugar,
}

impl Quantity {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "weight" => Some(Quantity::Weight),
            "height" => Some(Quantity::Height),
            "sugar" | "mass" => Some(Quantity::Sugar),
            _ => None,
        }
    }
}

// ============================================================================
// Conversion Constants
// ============================================================================

/// Pounds per kilogram
pub const LB_PER_KG: f64 = 2.20462;
/// Centimeters per inch
pub const CM_PER_INCH: f64 = 2.54;
/// Grams per ounce
pub const G_PER_OZ: f64 = 28.3495;
/// Grams per ounce used by the portion picker
pub const PORTION_G_PER_OZ: f64 = 28.35;
/// Ounces per gram used by the diary macro labels
pub const OZ_PER_G: f64 = 0.035274;
/// Inches per foot
pub const INCHES_PER_FOOT: i64 = 12;
