//! Statistics MCP Tools
//!
//! Period charts and averages over the diary.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::db::Database;
use crate::models::{Nutrition, Settings, DATE_FORMAT};
use crate::nutrition::{
    average_calories, calorie_status, calorie_unit, chart_data, day_totals, macro_split,
    sugar_chart, Bucket, CalorieStatus, MacroSplit, Period, SugarChart, ZeroBuckets,
};
use super::diary::{load_diary, parse_date};

/// One bucket of the calorie chart
#[derive(Debug, Serialize)]
pub struct BucketView {
    pub date: String,
    pub label: String,
    pub calories: f64,
    pub sugar: f64,
    pub entry_count: usize,
    /// Only reported for premium users
    pub status: Option<CalorieStatus>,
}

/// Response for get_statistics
#[derive(Debug, Serialize)]
pub struct StatisticsView {
    pub period: Period,
    pub reference_date: String,
    pub zero_buckets: ZeroBuckets,
    pub calorie_unit: &'static str,
    pub average_calories: f64,
    pub buckets: Vec<BucketView>,
    pub sugar_chart: SugarChart,
    /// Totals and macro split of the reference date
    pub day_totals: Nutrition,
    pub macro_split: Option<MacroSplit>,
}

/// Parse a period name
pub fn parse_period(period: &str) -> Result<Period, String> {
    Period::from_str(period)
        .ok_or_else(|| format!("Invalid period '{}'. Must be one of: day, week, month", period))
}

/// Parse an optional averaging policy
pub fn parse_zero_buckets(value: Option<&str>) -> Result<Option<ZeroBuckets>, String> {
    match value.map(|v| v.trim().to_lowercase()) {
        None => Ok(None),
        Some(v) if v.is_empty() => Ok(None),
        Some(v) if v == "include" => Ok(Some(ZeroBuckets::Include)),
        Some(v) if v == "exclude" => Ok(Some(ZeroBuckets::Exclude)),
        Some(v) => Err(format!(
            "Invalid zero_buckets '{}'. Must be 'include' or 'exclude'",
            v
        )),
    }
}

/// Buckets for a period ending at `reference`
pub fn period_buckets(
    db: &Database,
    period: Period,
    reference: NaiveDate,
) -> Result<Vec<Bucket>, String> {
    let diary = load_diary(db)?;
    Ok(chart_data(diary.entries(), reference, period))
}

/// Calorie and sugar charts for a period
pub fn get_statistics(
    db: &Database,
    period: &str,
    reference_date: &str,
    zero_buckets: Option<&str>,
) -> Result<StatisticsView, String> {
    let period = parse_period(period)?;
    let reference = parse_date(reference_date)?;
    let zero_buckets = parse_zero_buckets(zero_buckets)?.unwrap_or(period.default_zero_buckets());

    let settings = db
        .with_conn(|conn| Settings::get(conn))
        .map_err(|e| format!("Failed to get settings: {}", e))?;
    let diary = load_diary(db)?;
    let buckets = chart_data(diary.entries(), reference, period);

    debug!(
        "Statistics for {} ending {}: {} buckets",
        period.as_str(),
        reference,
        buckets.len()
    );

    let reference_entries = diary.for_date(reference);

    Ok(StatisticsView {
        period,
        reference_date: reference.format(DATE_FORMAT).to_string(),
        zero_buckets,
        calorie_unit: calorie_unit(settings.unit_system),
        average_calories: average_calories(&buckets, zero_buckets),
        sugar_chart: sugar_chart(&buckets, period, settings.unit_system, settings.language),
        buckets: buckets
            .iter()
            .map(|b| BucketView {
                date: b.date.format(DATE_FORMAT).to_string(),
                label: b.label.clone(),
                calories: b.calories,
                sugar: b.sugar(),
                entry_count: b.entries.len(),
                status: if settings.is_premium {
                    calorie_status(b.calories)
                } else {
                    None
                },
            })
            .collect(),
        day_totals: day_totals(diary.entries(), reference),
        macro_split: macro_split(reference_entries),
    })
}
