//! Data models
//!
//! Catalog, diary entries, settings and profile.

mod diary;
pub mod entry;
mod food_item;
mod nutrition;
mod profile;
mod settings;

pub use diary::Diary;
pub use entry::{NutritionEntry, NutritionEntryCreate, DATE_FORMAT};
pub use food_item::{Category, FoodItem, CATALOG};
pub use nutrition::Nutrition;
pub use profile::{Profile, ProfileUpdate};
pub use settings::{
    NutrientTargets, Settings, SettingsUpdate, DEFAULT_MACRO_TARGET, DEFAULT_REMINDER_TIME,
    DEFAULT_SUGAR_LIMIT,
};
