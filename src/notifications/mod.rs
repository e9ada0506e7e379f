//! Notification service
//!
//! Evaluates the daily sugar limit after each save and computes when the next
//! daily reminder is due. One instance is constructed at startup and shared
//! by the server.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{Settings, DEFAULT_REMINDER_TIME, DEFAULT_SUGAR_LIMIT};
use crate::nutrition::{sugar_display_value, sugar_unit, Language, UnitSystem};

/// Reminder time format
pub const REMINDER_TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Error, PartialEq)]
pub enum NotificationError {
    #[error("Invalid reminder time '{0}', expected HH:MM")]
    InvalidTime(String),
}

/// Parse an "HH:MM" reminder time
pub fn parse_reminder_time(s: &str) -> Result<NaiveTime, NotificationError> {
    NaiveTime::parse_from_str(s.trim(), REMINDER_TIME_FORMAT)
        .map_err(|_| NotificationError::InvalidTime(s.to_string()))
}

/// Settings the notifier works from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Daily reminder on/off
    pub enabled: bool,
    /// "HH:MM"
    pub time: String,
    pub sugar_limit_enabled: bool,
    /// Grams
    pub daily_sugar_limit: f64,
    pub language: Language,
    pub unit_system: UnitSystem,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            time: DEFAULT_REMINDER_TIME.to_string(),
            sugar_limit_enabled: false,
            daily_sugar_limit: DEFAULT_SUGAR_LIMIT,
            language: Language::default(),
            unit_system: UnitSystem::default(),
        }
    }
}

impl From<&Settings> for NotificationSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            enabled: settings.reminder_enabled,
            time: settings.reminder_time.clone(),
            sugar_limit_enabled: settings.sugar_limit_enabled,
            daily_sugar_limit: settings.daily_sugar_limit,
            language: settings.language,
            unit_system: settings.unit_system,
        }
    }
}

/// Partial update; `None` fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationSettingsUpdate {
    pub enabled: Option<bool>,
    pub time: Option<String>,
    pub sugar_limit_enabled: Option<bool>,
    pub daily_sugar_limit: Option<f64>,
    pub language: Option<Language>,
    pub unit_system: Option<UnitSystem>,
}

/// Raised when the day's sugar goes over the configured limit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SugarLimitAlert {
    /// Grams logged today
    pub daily_total: f64,
    /// Grams
    pub limit: f64,
    /// Limit in the user's unit system
    pub display_limit: f64,
    pub unit: String,
    /// e.g. "Limit: 1.8oz"
    pub message: String,
}

fn limit_label(language: Language) -> &'static str {
    match language {
        Language::English => "Limit",
        Language::French => "Limite",
        Language::Russian => "Лимит",
    }
}

/// Sugar-limit checks and reminder scheduling
#[derive(Debug, Clone, Default)]
pub struct NotificationService {
    settings: NotificationSettings,
}

impl NotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from persisted settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            settings: settings.into(),
        }
    }

    pub fn settings(&self) -> &NotificationSettings {
        &self.settings
    }

    /// Merge a partial update into the current settings
    pub fn update_settings(&mut self, update: NotificationSettingsUpdate) {
        let s = &mut self.settings;
        if let Some(enabled) = update.enabled {
            s.enabled = enabled;
        }
        if let Some(time) = update.time {
            s.time = time;
        }
        if let Some(enabled) = update.sugar_limit_enabled {
            s.sugar_limit_enabled = enabled;
        }
        if let Some(limit) = update.daily_sugar_limit {
            s.daily_sugar_limit = limit;
        }
        if let Some(language) = update.language {
            s.language = language;
        }
        if let Some(unit_system) = update.unit_system {
            s.unit_system = unit_system;
        }
        info!(
            "Notification settings updated: reminder={} at {}, sugar limit={} ({}g)",
            s.enabled, s.time, s.sugar_limit_enabled, s.daily_sugar_limit
        );
    }

    /// Replace all settings from the persisted copy
    pub fn sync(&mut self, settings: &Settings) {
        self.settings = settings.into();
        debug!("Notification settings synced from storage");
    }

    /// Signal when the limit is enabled and `daily_total` is strictly above it
    pub fn check_sugar_limit(&self, daily_total: f64) -> Option<SugarLimitAlert> {
        let s = &self.settings;
        if !s.sugar_limit_enabled || daily_total <= s.daily_sugar_limit {
            return None;
        }

        let unit = sugar_unit(s.unit_system, s.language);
        let display_limit = sugar_display_value(s.daily_sugar_limit, s.unit_system);
        warn!(
            "Daily sugar limit exceeded: {}g > {}g",
            daily_total, s.daily_sugar_limit
        );

        Some(SugarLimitAlert {
            daily_total,
            limit: s.daily_sugar_limit,
            display_limit,
            unit: unit.to_string(),
            message: format!("{}: {}{}", limit_label(s.language), display_limit, unit),
        })
    }

    /// Next reminder strictly after `now`, or `None` when reminders are off.
    ///
    /// The configured time today if it is still ahead, otherwise tomorrow.
    pub fn next_reminder(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        if !self.settings.enabled {
            return None;
        }

        let time = match parse_reminder_time(&self.settings.time) {
            Ok(time) => time,
            Err(e) => {
                warn!("Reminder not scheduled: {}", e);
                return None;
            }
        };

        let today = now.date().and_time(time);
        let next = if today <= now {
            today + Duration::days(1)
        } else {
            today
        };
        debug!("Next reminder at {}", next);
        Some(next)
    }
}
