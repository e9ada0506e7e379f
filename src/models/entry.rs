//! Nutrition Entry model
//!
//! One logged portion of a catalog sweet, with its breakdown frozen at the
//! time it was saved.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::nutrition::Portion;
use super::{Category, FoodItem, Nutrition};

/// Date format used for entry dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A logged consumption event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionEntry {
    pub id: i64,
    pub food_id: i64,
    pub food_name: String,
    pub category: Category,
    pub portion: Portion,
    pub date: NaiveDate,
    pub saved_at: DateTime<Utc>,
    /// Breakdown for the portion, rounded to whole units
    pub nutrition: Nutrition,
}

/// Data for creating an entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionEntryCreate {
    pub food_id: i64,
    pub food_name: String,
    pub category: Category,
    pub portion: Portion,
    pub date: NaiveDate,
    pub saved_at: DateTime<Utc>,
    pub nutrition: Nutrition,
}

impl NutritionEntryCreate {
    /// Build an entry for a portion of a catalog food
    pub fn new(
        food: &FoodItem,
        portion: Portion,
        date: NaiveDate,
        category: Category,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            food_id: food.id,
            food_name: food.name.to_string(),
            category,
            nutrition: food.nutrition_for(portion.grams),
            portion,
            date,
            saved_at,
        }
    }
}

fn text_column_error(idx: usize, err: chrono::ParseError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

impl NutritionEntry {
    /// Materialize a create payload under an ID
    pub fn from_create(id: i64, data: NutritionEntryCreate) -> Self {
        Self {
            id,
            food_id: data.food_id,
            food_name: data.food_name,
            category: data.category,
            portion: data.portion,
            date: data.date,
            saved_at: data.saved_at,
            nutrition: data.nutrition,
        }
    }

    /// Replace portion and breakdown, keeping category and date
    pub fn with_portion(&self, food: &FoodItem, portion: Portion, saved_at: DateTime<Utc>) -> Self {
        Self {
            id: self.id,
            food_id: food.id,
            food_name: food.name.to_string(),
            category: self.category,
            nutrition: food.nutrition_for(portion.grams),
            portion,
            date: self.date,
            saved_at,
        }
    }

    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let date_str: String = row.get("date")?;
        let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
            .map_err(|e| text_column_error(0, e))?;
        let saved_at_str: String = row.get("saved_at")?;
        let saved_at = DateTime::parse_from_rfc3339(&saved_at_str)
            .map_err(|e| text_column_error(0, e))?
            .with_timezone(&Utc);
        let category_str: String = row.get("category")?;
        let category = Category::from_str(&category_str).ok_or_else(|| {
            rusqlite::Error::InvalidColumnType(0, format!("category '{}'", category_str), Type::Text)
        })?;

        Ok(Self {
            id: row.get("id")?,
            food_id: row.get("food_id")?,
            food_name: row.get("food_name")?,
            category,
            portion: Portion {
                amount: row.get("amount")?,
                grams: row.get("grams")?,
            },
            date,
            saved_at,
            nutrition: Nutrition {
                calories: row.get("calories")?,
                sugar: row.get("sugar")?,
                protein: row.get("protein")?,
                carbohydrates: row.get("carbohydrates")?,
                fats: row.get("fats")?,
                sodium: row.get("sodium")?,
                cholesterol: row.get("cholesterol")?,
                potassium: row.get("potassium")?,
            },
        })
    }

    /// Insert a new entry
    pub fn create(conn: &Connection, data: &NutritionEntryCreate) -> DbResult<Self> {
        let n = &data.nutrition;
        conn.execute(
            r#"
            INSERT INTO entries (
                food_id, food_name, category, amount, grams, date, saved_at,
                calories, sugar, protein, carbohydrates, fats, sodium, cholesterol, potassium
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                data.food_id,
                data.food_name,
                data.category.as_str(),
                data.portion.amount,
                data.portion.grams,
                data.date.format(DATE_FORMAT).to_string(),
                data.saved_at.to_rfc3339(),
                n.calories,
                n.sugar,
                n.protein,
                n.carbohydrates,
                n.fats,
                n.sodium,
                n.cholesterol,
                n.potassium,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or_else(|| DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get an entry by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM entries WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All entries in insertion order
    pub fn list_all(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM entries ORDER BY id")?;
        let rows = stmt.query_map([], Self::from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Entries for one date in insertion order
    pub fn list_for_date(conn: &Connection, date: NaiveDate) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM entries WHERE date = ?1 ORDER BY id")?;
        let rows = stmt.query_map([date.format(DATE_FORMAT).to_string()], Self::from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Persist a replaced entry (portion, breakdown, food, saved_at)
    pub fn update(conn: &Connection, entry: &NutritionEntry) -> DbResult<Option<Self>> {
        let n = &entry.nutrition;
        let changed = conn.execute(
            r#"
            UPDATE entries SET
                food_id = ?2, food_name = ?3, amount = ?4, grams = ?5, saved_at = ?6,
                calories = ?7, sugar = ?8, protein = ?9, carbohydrates = ?10,
                fats = ?11, sodium = ?12, cholesterol = ?13, potassium = ?14
            WHERE id = ?1
            "#,
            params![
                entry.id,
                entry.food_id,
                entry.food_name,
                entry.portion.amount,
                entry.portion.grams,
                entry.saved_at.to_rfc3339(),
                n.calories,
                n.sugar,
                n.protein,
                n.carbohydrates,
                n.fats,
                n.sodium,
                n.cholesterol,
                n.potassium,
            ],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        Self::get_by_id(conn, entry.id)
    }

    /// Delete an entry
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let deleted = conn.execute("DELETE FROM entries WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    /// Delete every entry, returning how many were removed
    pub fn delete_all(conn: &Connection) -> DbResult<usize> {
        Ok(conn.execute("DELETE FROM entries", [])?)
    }
}
