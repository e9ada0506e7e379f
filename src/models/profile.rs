//! Profile model
//!
//! The user's personal data. Weight and height are stored in kg and cm.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::nutrition::{convert_height, convert_weight, format_height, format_weight, UnitSystem};
use super::entry::DATE_FORMAT;

/// User profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub birth_date: Option<NaiveDate>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Name".to_string(),
            weight_kg: 60.0,
            height_cm: 160.0,
            birth_date: None,
        }
    }
}

/// Data for updating a profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub birth_date: Option<NaiveDate>,
}

impl Profile {
    /// Weight rendered in a unit system, e.g. "132lbs"
    pub fn weight_display(&self, unit_system: UnitSystem) -> String {
        format_weight(
            convert_weight(self.weight_kg, UnitSystem::European, unit_system),
            unit_system,
        )
    }

    /// Height rendered in a unit system, e.g. "5'3\""
    pub fn height_display(&self, unit_system: UnitSystem) -> String {
        format_height(
            convert_height(self.height_cm, UnitSystem::European, unit_system),
            unit_system,
        )
    }

    /// Age in whole years on a given day
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.birth_date.and_then(|dob| today.years_since(dob))
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let birth_date: Option<String> = row.get("birth_date")?;
        Ok(Self {
            name: row.get("name")?,
            weight_kg: row.get("weight_kg")?,
            height_cm: row.get("height_cm")?,
            birth_date: birth_date.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok()),
        })
    }

    /// Stored profile, or defaults when none was saved yet
    pub fn get(conn: &Connection) -> DbResult<Self> {
        let mut stmt = conn.prepare("SELECT * FROM profile WHERE id = 1")?;

        let result = stmt.query_row([], Self::from_row);
        match result {
            Ok(profile) => Ok(profile),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Merge an update into the stored profile (upsert)
    pub fn update(conn: &Connection, data: &ProfileUpdate) -> DbResult<Self> {
        let current = Self::get(conn)?;
        let name = data.name.clone().unwrap_or(current.name);
        let weight_kg = data.weight_kg.unwrap_or(current.weight_kg);
        let height_cm = data.height_cm.unwrap_or(current.height_cm);
        let birth_date = data.birth_date.or(current.birth_date);

        conn.execute(
            r#"
            INSERT INTO profile (id, name, weight_kg, height_cm, birth_date)
            VALUES (1, ?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                weight_kg = excluded.weight_kg,
                height_cm = excluded.height_cm,
                birth_date = excluded.birth_date,
                updated_at = datetime('now')
            "#,
            params![
                name,
                weight_kg,
                height_cm,
                birth_date.map(|d| d.format(DATE_FORMAT).to_string()),
            ],
        )?;

        Self::get(conn)
    }

    /// Restore defaults (account deletion)
    pub fn reset(conn: &Connection) -> DbResult<Self> {
        conn.execute("DELETE FROM profile", [])?;
        Self::get(conn)
    }
}
