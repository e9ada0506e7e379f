//! Settings model
//!
//! Single-row table holding display preferences, reminder and sugar-limit
//! configuration, the premium flag and nutrient targets.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::nutrition::{Language, UnitSystem};

/// Default daily sugar limit in grams
pub const DEFAULT_SUGAR_LIMIT: f64 = 50.0;
/// Default reminder time
pub const DEFAULT_REMINDER_TIME: &str = "12:00";
/// Default target for each macro progress bar, grams
pub const DEFAULT_MACRO_TARGET: f64 = 100.0;

/// Targets for the diary progress bars (grams)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientTargets {
    pub carbohydrates: f64,
    pub protein: f64,
    pub fats: f64,
}

impl Default for NutrientTargets {
    fn default() -> Self {
        Self {
            carbohydrates: DEFAULT_MACRO_TARGET,
            protein: DEFAULT_MACRO_TARGET,
            fats: DEFAULT_MACRO_TARGET,
        }
    }
}

/// User settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub unit_system: UnitSystem,
    pub language: Language,
    pub reminder_enabled: bool,
    /// "HH:MM"
    pub reminder_time: String,
    pub sugar_limit_enabled: bool,
    /// Grams
    pub daily_sugar_limit: f64,
    pub is_premium: bool,
    pub targets: NutrientTargets,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            unit_system: UnitSystem::default(),
            language: Language::default(),
            reminder_enabled: false,
            reminder_time: DEFAULT_REMINDER_TIME.to_string(),
            sugar_limit_enabled: false,
            daily_sugar_limit: DEFAULT_SUGAR_LIMIT,
            is_premium: false,
            targets: NutrientTargets::default(),
        }
    }
}

/// Partial settings update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub unit_system: Option<UnitSystem>,
    pub language: Option<Language>,
    pub reminder_enabled: Option<bool>,
    pub reminder_time: Option<String>,
    pub sugar_limit_enabled: Option<bool>,
    pub daily_sugar_limit: Option<f64>,
    pub is_premium: Option<bool>,
    pub carbohydrates_target: Option<f64>,
    pub protein_target: Option<f64>,
    pub fats_target: Option<f64>,
}

impl Settings {
    /// Apply a partial update
    pub fn merged(&self, update: &SettingsUpdate) -> Self {
        Self {
            unit_system: update.unit_system.unwrap_or(self.unit_system),
            language: update.language.unwrap_or(self.language),
            reminder_enabled: update.reminder_enabled.unwrap_or(self.reminder_enabled),
            reminder_time: update
                .reminder_time
                .clone()
                .unwrap_or_else(|| self.reminder_time.clone()),
            sugar_limit_enabled: update.sugar_limit_enabled.unwrap_or(self.sugar_limit_enabled),
            daily_sugar_limit: update.daily_sugar_limit.unwrap_or(self.daily_sugar_limit),
            is_premium: update.is_premium.unwrap_or(self.is_premium),
            targets: NutrientTargets {
                carbohydrates: update
                    .carbohydrates_target
                    .unwrap_or(self.targets.carbohydrates),
                protein: update.protein_target.unwrap_or(self.targets.protein),
                fats: update.fats_target.unwrap_or(self.targets.fats),
            },
        }
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let unit_system: String = row.get("unit_system")?;
        let language: String = row.get("language")?;
        Ok(Self {
            unit_system: UnitSystem::from_str(&unit_system).unwrap_or_default(),
            language: Language::from_str(&language).unwrap_or_default(),
            reminder_enabled: row.get("reminder_enabled")?,
            reminder_time: row.get("reminder_time")?,
            sugar_limit_enabled: row.get("sugar_limit_enabled")?,
            daily_sugar_limit: row.get("daily_sugar_limit")?,
            is_premium: row.get("is_premium")?,
            targets: NutrientTargets {
                carbohydrates: row.get("carbohydrates_target")?,
                protein: row.get("protein_target")?,
                fats: row.get("fats_target")?,
            },
        })
    }

    /// Stored settings, or defaults when none were saved yet
    pub fn get(conn: &Connection) -> DbResult<Self> {
        let mut stmt = conn.prepare("SELECT * FROM settings WHERE id = 1")?;

        let result = stmt.query_row([], Self::from_row);
        match result {
            Ok(settings) => Ok(settings),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Save settings (upsert)
    pub fn save(conn: &Connection, settings: &Settings) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO settings (
                id, unit_system, language, reminder_enabled, reminder_time,
                sugar_limit_enabled, daily_sugar_limit, is_premium,
                carbohydrates_target, protein_target, fats_target
            )
            VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                unit_system = excluded.unit_system,
                language = excluded.language,
                reminder_enabled = excluded.reminder_enabled,
                reminder_time = excluded.reminder_time,
                sugar_limit_enabled = excluded.sugar_limit_enabled,
                daily_sugar_limit = excluded.daily_sugar_limit,
                is_premium = excluded.is_premium,
                carbohydrates_target = excluded.carbohydrates_target,
                protein_target = excluded.protein_target,
                fats_target = excluded.fats_target,
                updated_at = datetime('now')
            "#,
            params![
                settings.unit_system.as_str(),
                settings.language.as_str(),
                settings.reminder_enabled,
                settings.reminder_time,
                settings.sugar_limit_enabled,
                settings.daily_sugar_limit,
                settings.is_premium,
                settings.targets.carbohydrates,
                settings.targets.protein,
                settings.targets.fats,
            ],
        )?;

        Self::get(conn)
    }

    /// Merge an update into the stored settings
    pub fn update(conn: &Connection, update: &SettingsUpdate) -> DbResult<Self> {
        let merged = Self::get(conn)?.merged(update);
        Self::save(conn, &merged)
    }

    /// Restore defaults (account deletion)
    pub fn reset(conn: &Connection) -> DbResult<Self> {
        conn.execute("DELETE FROM settings", [])?;
        Self::get(conn)
    }
}
