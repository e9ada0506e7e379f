//! Settings and Profile MCP Tools
//!
//! Preferences, sugar limit, reminders, personal data and unit conversion.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::{Database, DbError};
use crate::models::{NutritionEntry, Profile, ProfileUpdate, Settings, SettingsUpdate};
use crate::notifications::{parse_reminder_time, NotificationService};
use crate::nutrition::{
    calorie_unit, convert, convert_height, convert_sugar, convert_weight, format_height,
    format_sugar, format_weight, parse_height, parse_weight, predefined_portions,
    sugar_display_value, sugar_limit_from_display, sugar_unit, Language, Quantity, UnitSystem,
};
use super::diary::parse_date;

/// Settings with values rendered for the user's unit system
#[derive(Debug, Serialize)]
pub struct SettingsView {
    #[serde(flatten)]
    pub settings: Settings,
    /// Daily sugar limit in the user's unit system
    pub sugar_limit_display: f64,
    pub sugar_unit: &'static str,
    pub calorie_unit: &'static str,
    pub portions: Vec<&'static str>,
}

impl From<Settings> for SettingsView {
    fn from(settings: Settings) -> Self {
        let us = settings.unit_system;
        Self {
            sugar_limit_display: sugar_display_value(settings.daily_sugar_limit, us),
            sugar_unit: sugar_unit(us, settings.language),
            calorie_unit: calorie_unit(us),
            portions: predefined_portions(us).to_vec(),
            settings,
        }
    }
}

/// Requested settings changes; string enums are parsed here
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsChanges {
    pub unit_system: Option<String>,
    pub language: Option<String>,
    pub reminder_enabled: Option<bool>,
    pub reminder_time: Option<String>,
    pub sugar_limit_enabled: Option<bool>,
    /// Grams
    pub daily_sugar_limit: Option<f64>,
    /// In the (resulting) unit system, e.g. 1.8 for ounces
    pub sugar_limit_display: Option<f64>,
    pub is_premium: Option<bool>,
    pub carbohydrates_target: Option<f64>,
    pub protein_target: Option<f64>,
    pub fats_target: Option<f64>,
}

/// Profile with rendered weight and height
#[derive(Debug, Serialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: Profile,
    pub age: Option<u32>,
    pub weight_display: String,
    pub height_display: String,
}

/// Response for convert_units
#[derive(Debug, Serialize)]
pub struct ConvertUnitsResponse {
    pub quantity: Quantity,
    pub value: f64,
    pub from: UnitSystem,
    pub to: UnitSystem,
    pub converted: f64,
    pub formatted: String,
}

/// Response for next_reminder
#[derive(Debug, Serialize)]
pub struct NextReminderResponse {
    pub enabled: bool,
    pub time: String,
    pub next: Option<String>,
    pub minutes_until: Option<i64>,
}

/// Response for delete_account
#[derive(Debug, Serialize)]
pub struct DeleteAccountResponse {
    pub success: bool,
    pub entries_deleted: usize,
    pub message: String,
}

fn parse_unit_system(s: &str) -> Result<UnitSystem, String> {
    UnitSystem::from_str(s)
        .ok_or_else(|| format!("Invalid unit system '{}'. Must be 'european' or 'american'", s))
}

fn parse_language(s: &str) -> Result<Language, String> {
    Language::from_str(s)
        .ok_or_else(|| format!("Invalid language '{}'. Must be English, French or Russian", s))
}

fn check_non_negative(name: &str, value: Option<f64>) -> Result<(), String> {
    match value {
        Some(v) if v < 0.0 || v.is_nan() => Err(format!("{} must be zero or more, got {}", name, v)),
        _ => Ok(()),
    }
}

// ============================================================================
// Settings Tools
// ============================================================================

/// Get the current settings
pub fn get_settings(db: &Database) -> Result<SettingsView, String> {
    db.with_conn(|conn| Settings::get(conn))
        .map(SettingsView::from)
        .map_err(|e| format!("Failed to get settings: {}", e))
}

/// Merge changes into the stored settings and the notifier
pub fn update_settings(
    db: &Database,
    notifier: &mut NotificationService,
    changes: SettingsChanges,
) -> Result<SettingsView, String> {
    if let Some(time) = &changes.reminder_time {
        parse_reminder_time(time).map_err(|e| e.to_string())?;
    }
    check_non_negative("daily_sugar_limit", changes.daily_sugar_limit)?;
    check_non_negative("sugar_limit_display", changes.sugar_limit_display)?;
    check_non_negative("carbohydrates_target", changes.carbohydrates_target)?;
    check_non_negative("protein_target", changes.protein_target)?;
    check_non_negative("fats_target", changes.fats_target)?;

    let unit_system = changes.unit_system.as_deref().map(parse_unit_system).transpose()?;
    let language = changes.language.as_deref().map(parse_language).transpose()?;

    let settings = db
        .with_conn(|conn| {
            let current = Settings::get(conn)?;
            let effective_units = unit_system.unwrap_or(current.unit_system);
            let daily_sugar_limit = changes
                .sugar_limit_display
                .map(|v| sugar_limit_from_display(v, effective_units))
                .or(changes.daily_sugar_limit);

            let update = SettingsUpdate {
                unit_system,
                language,
                reminder_enabled: changes.reminder_enabled,
                reminder_time: changes.reminder_time.clone(),
                sugar_limit_enabled: changes.sugar_limit_enabled,
                daily_sugar_limit,
                is_premium: changes.is_premium,
                carbohydrates_target: changes.carbohydrates_target,
                protein_target: changes.protein_target,
                fats_target: changes.fats_target,
            };
            Settings::save(conn, &current.merged(&update))
        })
        .map_err(|e| format!("Failed to update settings: {}", e))?;

    notifier.sync(&settings);
    info!(
        "Settings updated: units={}, sugar limit {} ({}g)",
        settings.unit_system.as_str(),
        if settings.sugar_limit_enabled { "on" } else { "off" },
        settings.daily_sugar_limit
    );

    Ok(settings.into())
}

/// Next reminder after `now` according to the notifier
pub fn next_reminder(notifier: &NotificationService, now: NaiveDateTime) -> NextReminderResponse {
    let settings = notifier.settings();
    let next = notifier.next_reminder(now);
    NextReminderResponse {
        enabled: settings.enabled,
        time: settings.time.clone(),
        next: next.map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string()),
        minutes_until: next.map(|t| (t - now).num_minutes()),
    }
}

/// Remove all entries and restore default settings and profile
pub fn delete_account(
    db: &Database,
    notifier: &mut NotificationService,
) -> Result<DeleteAccountResponse, String> {
    let (entries_deleted, settings) = db
        .with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let deleted = NutritionEntry::delete_all(&tx)?;
            let settings = Settings::reset(&tx)?;
            Profile::reset(&tx)?;
            tx.commit()?;
            Ok::<_, DbError>((deleted, settings))
        })
        .map_err(|e| format!("Failed to delete account: {}", e))?;

    notifier.sync(&settings);
    warn!("Account deleted: {} entries removed", entries_deleted);

    Ok(DeleteAccountResponse {
        success: true,
        entries_deleted,
        message: "Account deleted; all data has been reset".to_string(),
    })
}

// ============================================================================
// Profile Tools
// ============================================================================

fn profile_view(profile: Profile, unit_system: UnitSystem) -> ProfileView {
    ProfileView {
        age: profile.age_on(chrono::Local::now().date_naive()),
        weight_display: profile.weight_display(unit_system),
        height_display: profile.height_display(unit_system),
        profile,
    }
}

/// Get the profile rendered in the user's unit system
pub fn get_profile(db: &Database) -> Result<ProfileView, String> {
    let (profile, settings) = db
        .with_conn(|conn| Ok((Profile::get(conn)?, Settings::get(conn)?)))
        .map_err(|e| format!("Failed to get profile: {}", e))?;
    Ok(profile_view(profile, settings.unit_system))
}

/// Update the profile. Weight and height are read in the user's unit system,
/// e.g. "132lbs" and `5'10"` for American units.
pub fn update_profile(
    db: &Database,
    name: Option<String>,
    weight: Option<&str>,
    height: Option<&str>,
    birth_date: Option<&str>,
) -> Result<ProfileView, String> {
    if let Some(n) = &name {
        if n.trim().is_empty() {
            return Err("Name must not be empty".to_string());
        }
    }

    let settings = db
        .with_conn(|conn| Settings::get(conn))
        .map_err(|e| format!("Failed to get settings: {}", e))?;
    let us = settings.unit_system;

    let weight_kg = weight
        .map(|w| parse_weight(w).map(|v| convert_weight(v, us, UnitSystem::European)))
        .transpose()
        .map_err(|e| e.to_string())?;
    let height_cm = height
        .map(|h| parse_height(h).map(|v| convert_height(v, us, UnitSystem::European)))
        .transpose()
        .map_err(|e| e.to_string())?;
    let birth_date = birth_date.map(parse_date).transpose()?;

    let update = ProfileUpdate {
        name: name.map(|n| n.trim().to_string()),
        weight_kg,
        height_cm,
        birth_date,
    };
    let profile = db
        .with_conn(|conn| Profile::update(conn, &update))
        .map_err(|e| format!("Failed to update profile: {}", e))?;

    info!("Profile updated for {}", profile.name);
    Ok(profile_view(profile, us))
}

// ============================================================================
// Unit Conversion
// ============================================================================

/// Convert a weight, height or sugar value between unit systems
pub fn convert_units(
    quantity: &str,
    value: f64,
    from: &str,
    to: &str,
) -> Result<ConvertUnitsResponse, String> {
    let quantity = Quantity::from_str(quantity).ok_or_else(|| {
        format!("Invalid quantity '{}'. Must be weight, height or sugar", quantity)
    })?;
    let from = parse_unit_system(from)?;
    let to = parse_unit_system(to)?;

    let converted = convert(quantity, value, from, to);
    let formatted = match quantity {
        Quantity::Weight => format_weight(converted, to),
        Quantity::Height => format_height(converted, to),
        Quantity::Sugar => format_sugar(convert_sugar(value, from, UnitSystem::European), to),
    };

    Ok(ConvertUnitsResponse {
        quantity,
        value,
        from,
        to,
        converted,
        formatted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::tools::diary::{get_day, log_entry};

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_default_settings_view() {
        let db = setup();
        let view = get_settings(&db).unwrap();
        assert_eq!(view.settings.daily_sugar_limit, 50.0);
        assert_eq!(view.sugar_limit_display, 50.0);
        assert_eq!(view.sugar_unit, "g");
        assert_eq!(view.calorie_unit, "kcal");
    }

    #[test]
    fn test_update_settings_syncs_notifier() {
        let db = setup();
        let mut notifier = NotificationService::new();
        let view = update_settings(
            &db,
            &mut notifier,
            SettingsChanges {
                unit_system: Some("american".to_string()),
                sugar_limit_enabled: Some(true),
                sugar_limit_display: Some(1.8),
                ..Default::default()
            },
        )
        .unwrap();

        // 1.8oz -> 51g
        assert_eq!(view.settings.daily_sugar_limit, 51.0);
        assert_eq!(view.sugar_limit_display, 1.8);
        assert_eq!(view.sugar_unit, "oz");
        assert!(notifier.settings().sugar_limit_enabled);
        assert_eq!(notifier.settings().daily_sugar_limit, 51.0);
        assert!(notifier.check_sugar_limit(52.0).is_some());
    }

    #[test]
    fn test_update_settings_rejects_bad_input() {
        let db = setup();
        let mut notifier = NotificationService::new();
        let bad = [
            SettingsChanges {
                reminder_time: Some("7pm".to_string()),
                ..Default::default()
            },
            SettingsChanges {
                unit_system: Some("lunar".to_string()),
                ..Default::default()
            },
            SettingsChanges {
                daily_sugar_limit: Some(-1.0),
                ..Default::default()
            },
            SettingsChanges {
                language: Some("Klingon".to_string()),
                ..Default::default()
            },
        ];
        for changes in bad {
            assert!(update_settings(&db, &mut notifier, changes).is_err());
        }
        assert_eq!(get_settings(&db).unwrap().settings, Settings::default());
    }

    #[test]
    fn test_next_reminder() {
        let db = setup();
        let mut notifier = NotificationService::new();
        assert!(next_reminder(&notifier, at("2024-01-01 08:00")).next.is_none());

        update_settings(
            &db,
            &mut notifier,
            SettingsChanges {
                reminder_enabled: Some(true),
                reminder_time: Some("09:00".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let reminder = next_reminder(&notifier, at("2024-01-01 08:00"));
        assert_eq!(reminder.next.as_deref(), Some("2024-01-01T09:00:00"));
        assert_eq!(reminder.minutes_until, Some(60));
    }

    #[test]
    fn test_profile_in_american_units() {
        let db = setup();
        let mut notifier = NotificationService::new();
        update_settings(
            &db,
            &mut notifier,
            SettingsChanges {
                unit_system: Some("american".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let view = update_profile(
            &db,
            Some("Sam".to_string()),
            Some("132lbs"),
            Some("5'10\""),
            Some("1990-04-01"),
        )
        .unwrap();

        assert!((view.profile.height_cm - 177.8).abs() < 1e-9);
        assert!((view.profile.weight_kg - 59.874).abs() < 0.001);
        assert_eq!(view.height_display, "5'10\"");
        assert_eq!(view.weight_display, "132lbs");
        assert!(view.age.is_some());

        assert_eq!(get_profile(&db).unwrap().profile.name, "Sam");
    }

    #[test]
    fn test_update_profile_errors() {
        let db = setup();
        assert!(update_profile(&db, Some("  ".to_string()), None, None, None).is_err());
        assert!(update_profile(&db, None, Some("heavy"), None, None).is_err());
        assert!(update_profile(&db, None, None, Some("tall'"), None).is_err());
        assert!(update_profile(&db, None, None, None, Some("1990")).is_err());
    }

    #[test]
    fn test_delete_account_resets_everything() {
        let db = setup();
        let mut notifier = NotificationService::new();
        update_settings(
            &db,
            &mut notifier,
            SettingsChanges {
                sugar_limit_enabled: Some(true),
                is_premium: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        update_profile(&db, Some("Kim".to_string()), None, None, None).unwrap();
        log_entry(&db, &notifier, 1, "100g", "2024-01-01", None).unwrap();

        let result = delete_account(&db, &mut notifier).unwrap();
        assert_eq!(result.entries_deleted, 1);
        assert_eq!(get_settings(&db).unwrap().settings, Settings::default());
        assert_eq!(get_profile(&db).unwrap().profile, Profile::default());
        assert!(get_day(&db, "2024-01-01").unwrap().entries.is_empty());
        assert!(!notifier.settings().sugar_limit_enabled);
    }

    #[test]
    fn test_convert_units() {
        let weight = convert_units("weight", 60.0, "european", "american").unwrap();
        assert!((weight.converted - 132.2772).abs() < 1e-9);
        assert_eq!(weight.formatted, "132lbs");

        let height = convert_units("height", 177.8, "european", "american").unwrap();
        assert_eq!(height.formatted, "5'10\"");

        let sugar = convert_units("sugar", 50.0, "european", "american").unwrap();
        assert!((sugar.converted - 1.7637).abs() < 1e-4);
        assert_eq!(sugar.formatted, "2oz");

        let same = convert_units("sugar", 12.5, "american", "american").unwrap();
        assert_eq!(same.converted, 12.5);

        assert!(convert_units("volume", 1.0, "european", "american").is_err());
        assert!(convert_units("weight", 1.0, "european", "martian").is_err());
    }
}
