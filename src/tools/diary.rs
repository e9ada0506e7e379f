//! Diary MCP Tools
//!
//! Tools for logging, editing and deleting entries and for viewing a day.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::db::Database;
use crate::models::{
    Category, Diary, FoodItem, Nutrition, NutritionEntry, NutritionEntryCreate, Settings,
    DATE_FORMAT,
};
use crate::notifications::{NotificationService, SugarLimitAlert};
use crate::nutrition::{
    calorie_unit, format_nutrient_mass, format_sugar, macro_split, parse_portion, MacroProgress,
    MacroSplit, UnitSystem,
};

/// Response for log_entry and edit_entry
#[derive(Debug, Serialize)]
pub struct SaveEntryResponse {
    pub entry: NutritionEntry,
    /// Totals for the entry's date after the save
    pub day_totals: Nutrition,
    /// Set when the day's sugar is now above the limit
    pub sugar_alert: Option<SugarLimitAlert>,
}

/// Response for delete_entry
#[derive(Debug, Serialize)]
pub struct DeleteEntryResponse {
    pub success: bool,
    pub message: String,
}

/// Display strings for the diary header
#[derive(Debug, Serialize)]
pub struct DayLabels {
    pub calories: String,
    pub carbohydrates: String,
    pub protein: String,
    pub fats: String,
    pub sugar: String,
}

/// Response for get_day
#[derive(Debug, Serialize)]
pub struct DayView {
    pub date: String,
    pub unit_system: UnitSystem,
    pub entries: Vec<NutritionEntry>,
    pub totals: Nutrition,
    pub progress: MacroProgress,
    pub macro_split: Option<MacroSplit>,
    pub labels: DayLabels,
}

/// Parse an ISO date
pub fn parse_date(date: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", date))
}

/// Load every entry into an in-memory diary
pub fn load_diary(db: &Database) -> Result<Diary, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let entries =
        NutritionEntry::list_all(&conn).map_err(|e| format!("Failed to load entries: {}", e))?;
    Ok(Diary::from_entries(entries))
}

fn sugar_check(
    db: &Database,
    notifier: &NotificationService,
    date: NaiveDate,
) -> Result<(Nutrition, Option<SugarLimitAlert>), String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let entries = NutritionEntry::list_for_date(&conn, date)
        .map_err(|e| format!("Failed to get entries: {}", e))?;
    let totals: Nutrition = entries.iter().map(|e| &e.nutrition).sum();
    Ok((totals, notifier.check_sugar_limit(totals.sugar)))
}

// ============================================================================
// Entry Tools
// ============================================================================

/// Log a portion of a catalog food
pub fn log_entry(
    db: &Database,
    notifier: &NotificationService,
    food_id: i64,
    portion: &str,
    date: &str,
    category: Option<&str>,
) -> Result<SaveEntryResponse, String> {
    let food = FoodItem::get_by_id(food_id).ok_or_else(|| format!("Food {} not found", food_id))?;
    let portion = parse_portion(portion).map_err(|e| e.to_string())?;
    let date = parse_date(date)?;
    let category = match category {
        Some(c) => Category::from_str(c).ok_or_else(|| format!("Invalid category '{}'", c))?,
        None => food.category,
    };

    let data = NutritionEntryCreate::new(food, portion, date, category, Utc::now());
    let entry = db
        .with_conn(|conn| NutritionEntry::create(conn, &data))
        .map_err(|e| format!("Failed to log entry: {}", e))?;

    info!(
        "Logged entry {}: {} {} on {} ({} kcal, {}g sugar)",
        entry.id,
        entry.portion.amount,
        entry.food_name,
        entry.date,
        entry.nutrition.calories,
        entry.nutrition.sugar
    );

    let (day_totals, sugar_alert) = sugar_check(db, notifier, entry.date)?;
    Ok(SaveEntryResponse {
        entry,
        day_totals,
        sugar_alert,
    })
}

/// Replace an entry's portion; date and category are kept
pub fn edit_entry(
    db: &Database,
    notifier: &NotificationService,
    id: i64,
    portion: &str,
) -> Result<SaveEntryResponse, String> {
    let portion = parse_portion(portion).map_err(|e| e.to_string())?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let existing = NutritionEntry::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get entry: {}", e))?
        .ok_or_else(|| format!("Entry {} not found", id))?;

    // Recompute from the catalog by name, falling back to the stored id
    let food = FoodItem::get_by_name(&existing.food_name)
        .or_else(|| FoodItem::get_by_id(existing.food_id))
        .ok_or_else(|| format!("Food '{}' is no longer in the catalog", existing.food_name))?;

    let replaced = existing.with_portion(food, portion, Utc::now());
    let entry = NutritionEntry::update(&conn, &replaced)
        .map_err(|e| format!("Failed to update entry: {}", e))?
        .ok_or_else(|| format!("Entry {} not found", id))?;
    drop(conn);

    info!(
        "Edited entry {}: now {} ({} kcal)",
        entry.id, entry.portion.amount, entry.nutrition.calories
    );

    let (day_totals, sugar_alert) = sugar_check(db, notifier, entry.date)?;
    Ok(SaveEntryResponse {
        entry,
        day_totals,
        sugar_alert,
    })
}

/// Delete an entry
pub fn delete_entry(db: &Database, id: i64) -> Result<DeleteEntryResponse, String> {
    let deleted = db
        .with_conn(|conn| NutritionEntry::delete(conn, id))
        .map_err(|e| format!("Failed to delete entry: {}", e))?;

    if deleted {
        info!("Deleted entry {}", id);
        Ok(DeleteEntryResponse {
            success: true,
            message: format!("Entry {} deleted", id),
        })
    } else {
        Err(format!("Entry {} not found", id))
    }
}

// ============================================================================
// Day View
// ============================================================================

/// Entries, totals and progress for one date
pub fn get_day(db: &Database, date: &str) -> Result<DayView, String> {
    let day = parse_date(date)?;
    let settings = db
        .with_conn(|conn| Settings::get(conn))
        .map_err(|e| format!("Failed to get settings: {}", e))?;
    let diary = load_diary(db)?;

    let entries: Vec<NutritionEntry> = diary.for_date(day).into_iter().cloned().collect();
    let totals = diary.totals_for(day);
    let us = settings.unit_system;

    debug!("Day {} has {} entries", day, entries.len());

    Ok(DayView {
        date: day.format(DATE_FORMAT).to_string(),
        unit_system: us,
        progress: MacroProgress::new(&totals, &settings.targets),
        macro_split: macro_split(&entries),
        labels: DayLabels {
            calories: format!("{} {}", totals.calories, calorie_unit(us)),
            carbohydrates: format_nutrient_mass(totals.carbohydrates, us),
            protein: format_nutrient_mass(totals.protein, us),
            fats: format_nutrient_mass(totals.fats, us),
            sugar: format_sugar(totals.sugar, us),
        },
        totals,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::SettingsUpdate;
    use crate::notifications::NotificationSettingsUpdate;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn limited(limit: f64) -> NotificationService {
        let mut notifier = NotificationService::new();
        notifier.update_settings(NotificationSettingsUpdate {
            sugar_limit_enabled: Some(true),
            daily_sugar_limit: Some(limit),
            ..Default::default()
        });
        notifier
    }

    #[test]
    fn test_log_and_get_day() {
        let db = setup();
        let notifier = NotificationService::new();

        // chocolate cake 400 kcal + lollipop 100 kcal
        log_entry(&db, &notifier, 31, "100g", "2024-01-01", None).unwrap();
        log_entry(&db, &notifier, 23, "100g", "2024-01-01", None).unwrap();
        log_entry(&db, &notifier, 22, "100g", "2024-01-02", None).unwrap();

        let day = get_day(&db, "2024-01-01").unwrap();
        assert_eq!(day.entries.len(), 2);
        assert_eq!(day.totals.calories, 500.0);
        assert_eq!(day.labels.calories, "500 kcal");
        assert_eq!(day.labels.carbohydrates, "80g");
        assert_eq!(day.progress.carbohydrates, 80.0);
        assert!(day.macro_split.is_some());
    }

    #[test]
    fn test_empty_day() {
        let db = setup();
        let day = get_day(&db, "2024-05-05").unwrap();
        assert!(day.entries.is_empty());
        assert_eq!(day.totals, Nutrition::zero());
        assert!(day.macro_split.is_none());
        assert_eq!(day.progress.fats, 0.0);
    }

    #[test]
    fn test_get_day_in_american_units() {
        let db = setup();
        db.with_conn(|conn| {
            Settings::update(
                conn,
                &SettingsUpdate {
                    unit_system: Some(UnitSystem::American),
                    ..Default::default()
                },
            )
        })
        .unwrap();
        log_entry(&db, &NotificationService::new(), 31, "100g", "2024-01-01", None).unwrap();

        let day = get_day(&db, "2024-01-01").unwrap();
        assert_eq!(day.labels.calories, "400 Cal");
        // 55g carbs
        assert_eq!(day.labels.carbohydrates, "1.9oz");
    }

    #[test]
    fn test_sugar_alert_is_strict() {
        let db = setup();
        let notifier = limited(35.0);

        // chocolate cake: 35g sugar per 100g
        let first = log_entry(&db, &notifier, 31, "100g", "2024-01-01", None).unwrap();
        assert_eq!(first.day_totals.sugar, 35.0);
        assert!(first.sugar_alert.is_none());

        let second = log_entry(&db, &notifier, 23, "100g", "2024-01-01", None).unwrap();
        let alert = second.sugar_alert.unwrap();
        assert_eq!(alert.daily_total, 60.0);
        assert_eq!(alert.limit, 35.0);

        // other days are unaffected
        let other = log_entry(&db, &notifier, 30, "100g", "2024-01-02", None).unwrap();
        assert!(other.sugar_alert.is_none());
    }

    #[test]
    fn test_edit_keeps_date_and_category() {
        let db = setup();
        let notifier = NotificationService::new();
        let logged = log_entry(&db, &notifier, 21, "100g", "2024-01-03", Some("cake")).unwrap();

        let edited = edit_entry(&db, &notifier, logged.entry.id, "7oz").unwrap();
        assert_eq!(edited.entry.category, Category::Cake);
        assert_eq!(edited.entry.date, logged.entry.date);
        // 7oz -> 198g
        assert_eq!(edited.entry.portion.grams, 198.0);
        assert_eq!(edited.entry.nutrition.calories, 297.0);
        assert_eq!(edited.day_totals.calories, 297.0);
    }

    #[test]
    fn test_delete_entry() {
        let db = setup();
        let notifier = NotificationService::new();
        let logged = log_entry(&db, &notifier, 1, "200g", "2024-01-01", None).unwrap();

        assert!(delete_entry(&db, logged.entry.id).unwrap().success);
        assert!(delete_entry(&db, logged.entry.id).is_err());
        assert!(get_day(&db, "2024-01-01").unwrap().entries.is_empty());
    }

    #[test]
    fn test_invalid_input() {
        let db = setup();
        let notifier = NotificationService::new();
        assert!(log_entry(&db, &notifier, 99, "100g", "2024-01-01", None).is_err());
        assert!(log_entry(&db, &notifier, 1, "100g", "01/02/2024", None).is_err());
        assert!(log_entry(&db, &notifier, 1, "heaps", "2024-01-01", None).is_err());
        assert!(log_entry(&db, &notifier, 1, "100g", "2024-01-01", Some("pie")).is_err());
        assert!(edit_entry(&db, &notifier, 42, "100g").is_err());
        assert!(get_day(&db, "yesterday").is_err());
    }
}
