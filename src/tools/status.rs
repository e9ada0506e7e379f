//! Sugar Insider Status Tool
//!
//! Provides runtime status information and usage instructions.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Diary logging instructions for AI assistants
pub const DIARY_INSTRUCTIONS: &str = r#"
# Sugar Insider Diary Instructions

This guide explains how to log sweets and read statistics with the Sugar
Insider tools.

## Overview

The diary records portions of sweets from a fixed catalog of 40 items in four
categories: `icecream`, `chocolate`, `candies`, `cake`. Each logged entry
stores the nutrition of its portion at the moment it was saved; later catalog
changes never alter past entries.

## Logging a Portion

1. Find the food: `list_catalog` (optionally with `category` and `query`)
2. Pick a portion:
   - European units: `100g`, `200g`, `300g`, `400g`, `500g`, or any `Ng`
   - American units: `3.5oz`, `7oz`, `10.5oz`, `14oz`, `17.5oz`, or any `N.Noz`
   - Ounces are converted with 28.35 g/oz and rounded to whole grams
3. Call `log_entry` with `food_id`, `portion` and `date` (YYYY-MM-DD)
4. If the sugar limit is enabled and today's sugar goes above it, the
   response contains a `sugar_alert`. Tell the user.

Every nutrient of an entry is `round(per_100g * grams / 100)`.

## Editing and Deleting

- `edit_entry` replaces the portion (and the nutrition) of an entry. The
  entry keeps its date and category.
- `delete_entry` removes an entry.

## Reading the Diary

`get_day` returns a date's entries, nutrient totals, progress toward the
carbohydrate/protein/fat targets (0-100%), the macro split and labels
formatted in the user's unit system.

## Statistics

`get_statistics` with `period`:

| period | buckets | label | window |
|--------|---------|-------|--------|
| day | 7 | day of month | one day each |
| week | 4 | W1..W4 | 7 days each, ending at the reference date |
| month | 31 | day of month | one day each |

The average ignores empty days for `month` and counts them as zero for `day`
and `week`, unless `zero_buckets` says otherwise.

`generate_statistics_report` writes the same data to a PDF.

## Units

Values are stored metric (kg, cm, g). `convert_units` converts weight, height
and sugar between `european` and `american`. Heights in American units are
shown as feet and inches, e.g. `5'10"`.

## Navigation

The server tracks the current screen. `navigate` applies an event such as
`open_diary` or `add_sweets` (with `category`) and fails when the event is not
available on the current screen. `current_screen` reads it back.

## Account

`delete_account` with `force=true` removes every entry and resets settings and
profile. There is no undo.

## Notes

- Dates use ISO format: YYYY-MM-DD
- The daily sugar limit is stored in grams; in American units it is shown in
  ounces with one decimal
- Reaching the limit exactly does not raise an alert; only going above it does
"#;

/// Runtime status of the Sugar Insider service
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> ServiceStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        ServiceStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
