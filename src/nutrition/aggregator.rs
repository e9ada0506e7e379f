//! Period aggregation
//!
//! Groups diary entries into day, week or month buckets ending at a reference
//! date and derives the statistics shown alongside them.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{NutrientTargets, Nutrition, NutritionEntry};
use super::converter::{sugar_display_value, sugar_unit};
use super::units::{Language, UnitSystem};

/// Daily calorie target used for the status labels
pub const CALORIE_TARGET: f64 = 2000.0;
/// Sugar chart never scales below this many grams
pub const MIN_SUGAR_CHART_MAX: f64 = 25.0;
/// Number of y-axis ticks on the sugar chart
pub const SUGAR_CHART_TICKS: usize = 5;

/// Statistics period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Trailing 7 days
    Day,
    /// Trailing 4 weeks
    Week,
    /// Trailing 31 days
    Month,
}

/// Whether empty buckets count toward an average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroBuckets {
    Include,
    Exclude,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" => Some(Period::Day),
            "week" | "weekly" => Some(Period::Week),
            "month" | "monthly" => Some(Period::Month),
            _ => None,
        }
    }

    /// Number of buckets in the series
    pub fn bucket_count(&self) -> usize {
        match self {
            Period::Day => 7,
            Period::Week => 4,
            Period::Month => 31,
        }
    }

    /// Averaging policy the statistics view has always used.
    ///
    /// Month skips empty days; day and week count them as zero.
    pub fn default_zero_buckets(&self) -> ZeroBuckets {
        match self {
            Period::Month => ZeroBuckets::Exclude,
            Period::Day | Period::Week => ZeroBuckets::Include,
        }
    }
}

/// One point of the time series
#[derive(Debug, Clone, Serialize)]
pub struct Bucket {
    /// The day, or the first day of the week window
    pub date: NaiveDate,
    pub label: String,
    pub calories: f64,
    pub entries: Vec<NutritionEntry>,
}

impl Bucket {
    fn collect<'a, I>(date: NaiveDate, label: String, entries: I) -> Self
    where
        I: Iterator<Item = &'a NutritionEntry>,
    {
        let entries: Vec<NutritionEntry> = entries.cloned().collect();
        let calories = entries.iter().map(|e| e.nutrition.calories).sum();
        Self {
            date,
            label,
            calories,
            entries,
        }
    }

    /// Summed breakdown of the bucket's entries
    pub fn totals(&self) -> Nutrition {
        self.entries.iter().map(|e| &e.nutrition).sum()
    }

    pub fn sugar(&self) -> f64 {
        self.entries.iter().map(|e| e.nutrition.sugar).sum()
    }
}

fn days_before(date: NaiveDate, days: i64) -> NaiveDate {
    date - Duration::days(days)
}

fn daily_buckets(entries: &[NutritionEntry], reference: NaiveDate, count: usize) -> Vec<Bucket> {
    (0..count as i64)
        .rev()
        .map(|i| {
            let date = days_before(reference, i);
            Bucket::collect(
                date,
                date.day().to_string(),
                entries.iter().filter(|e| e.date == date),
            )
        })
        .collect()
}

fn weekly_buckets(entries: &[NutritionEntry], reference: NaiveDate, count: usize) -> Vec<Bucket> {
    (0..count as i64)
        .rev()
        .map(|i| {
            let end = days_before(reference, i * 7);
            let start = days_before(end, 6);
            Bucket::collect(
                start,
                format!("W{}", count as i64 - i),
                entries.iter().filter(|e| e.date >= start && e.date <= end),
            )
        })
        .collect()
}

/// Build the time series for a period ending at `reference`, oldest first
pub fn chart_data(entries: &[NutritionEntry], reference: NaiveDate, period: Period) -> Vec<Bucket> {
    let count = period.bucket_count();
    match period {
        Period::Day | Period::Month => daily_buckets(entries, reference, count),
        Period::Week => weekly_buckets(entries, reference, count),
    }
}

/// Average bucket calories, rounded to a whole number. No buckets gives 0.
pub fn average_calories(buckets: &[Bucket], zero_buckets: ZeroBuckets) -> f64 {
    let values: Vec<f64> = buckets
        .iter()
        .map(|b| b.calories)
        .filter(|c| zero_buckets == ZeroBuckets::Include || *c > 0.0)
        .collect();

    if values.is_empty() {
        return 0.0;
    }
    (values.iter().sum::<f64>() / values.len() as f64).round()
}

/// Sum of every nutrient over the entries logged on `date`
pub fn day_totals(entries: &[NutritionEntry], date: NaiveDate) -> Nutrition {
    entries
        .iter()
        .filter(|e| e.date == date)
        .map(|e| &e.nutrition)
        .sum()
}

/// Progress toward a target as a percentage in `[0, 100]`
pub fn progress_percentage(current: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    (current / target * 100.0).clamp(0.0, 100.0)
}

/// Progress of the three diary macros toward their targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroProgress {
    pub carbohydrates: f64,
    pub protein: f64,
    pub fats: f64,
}

impl MacroProgress {
    pub fn new(totals: &Nutrition, targets: &NutrientTargets) -> Self {
        Self {
            carbohydrates: progress_percentage(totals.carbohydrates, targets.carbohydrates),
            protein: progress_percentage(totals.protein, targets.protein),
            fats: progress_percentage(totals.fats, targets.fats),
        }
    }
}

/// One slice of the macro pie
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroShare {
    pub value: f64,
    pub percentage: f64,
}

/// Carbohydrate/fat/protein split of a set of totals
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroSplit {
    pub carbohydrates: MacroShare,
    pub fats: MacroShare,
    pub protein: MacroShare,
}

/// Macro split of a set of entries, or `None` when all three sum to zero
pub fn macro_split<'a, I>(entries: I) -> Option<MacroSplit>
where
    I: IntoIterator<Item = &'a NutritionEntry>,
{
    let totals: Nutrition = entries.into_iter().map(|e| &e.nutrition).sum();
    let total = totals.carbohydrates + totals.fats + totals.protein;
    if total == 0.0 {
        return None;
    }
    let share = |value: f64| MacroShare {
        value,
        percentage: value / total * 100.0,
    };
    Some(MacroSplit {
        carbohydrates: share(totals.carbohydrates),
        fats: share(totals.fats),
        protein: share(totals.protein),
    })
}

/// Calorie intake relative to the daily target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalorieStatus {
    Under,
    Normal,
    Over,
    High,
}

/// Status label for a bucket's calories; empty buckets have none
pub fn calorie_status(calories: f64) -> Option<CalorieStatus> {
    if calories == 0.0 {
        return None;
    }
    let status = if calories < CALORIE_TARGET * 0.7 {
        CalorieStatus::Under
    } else if calories <= CALORIE_TARGET * 1.1 {
        CalorieStatus::Normal
    } else if calories <= CALORIE_TARGET * 1.3 {
        CalorieStatus::Over
    } else {
        CalorieStatus::High
    };
    Some(status)
}

// ============================================================================
// Sugar Chart
// ============================================================================

/// A point on the sugar line
#[derive(Debug, Clone, Serialize)]
pub struct SugarPoint {
    pub label: String,
    /// Grams
    pub sugar: f64,
    /// Horizontal position as a fraction of the plot width
    pub x: f64,
    /// Height as a fraction of the plot height, capped at 1
    pub y: f64,
    pub show_label: bool,
}

/// A y-axis tick
#[derive(Debug, Clone, Serialize)]
pub struct AxisTick {
    pub grams: f64,
    pub display_value: f64,
    pub label: String,
}

/// Sugar chart geometry for a bucket series
#[derive(Debug, Clone, Serialize)]
pub struct SugarChart {
    /// Grams at the top of the chart
    pub max: f64,
    pub points: Vec<SugarPoint>,
    pub ticks: Vec<AxisTick>,
}

/// Lay out the sugar chart for a series
pub fn sugar_chart(
    buckets: &[Bucket],
    period: Period,
    unit_system: UnitSystem,
    language: Language,
) -> SugarChart {
    let sugar: Vec<f64> = buckets.iter().map(Bucket::sugar).collect();
    let max = sugar.iter().copied().fold(MIN_SUGAR_CHART_MAX, f64::max);
    let len = buckets.len().max(1) as f64;

    let points = buckets
        .iter()
        .zip(&sugar)
        .enumerate()
        .map(|(index, (bucket, &grams))| SugarPoint {
            label: bucket.label.clone(),
            sugar: grams,
            x: index as f64 / len,
            y: (grams / max).min(1.0),
            show_label: period != Period::Month || index % 3 == 0,
        })
        .collect();

    let unit = sugar_unit(unit_system, language);
    let ticks = (0..SUGAR_CHART_TICKS)
        .map(|i| {
            let grams = (max / (SUGAR_CHART_TICKS - 1) as f64 * i as f64).round();
            let display_value = sugar_display_value(grams, unit_system);
            AxisTick {
                grams,
                display_value,
                label: format!("{}{}", display_value, unit),
            }
        })
        .collect();

    SugarChart { max, points, ticks }
}

// ============================================================================
// Report Summary
// ============================================================================

/// A row of the report table
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub date: NaiveDate,
    pub label: String,
    pub calories: f64,
    pub carbohydrates: f64,
    pub fats: f64,
    pub protein: f64,
    pub sugar: f64,
}

/// Totals and averages over a bucket series
#[derive(Debug, Clone, Serialize)]
pub struct PeriodSummary {
    pub total_calories: f64,
    /// Over all buckets, empty ones included
    pub average_calories: f64,
    pub total_sugar: f64,
    pub average_sugar: f64,
    pub totals: Nutrition,
    pub rows: Vec<SummaryRow>,
}

/// Summarize a series for the statistics report
pub fn period_summary(buckets: &[Bucket]) -> PeriodSummary {
    let rows: Vec<SummaryRow> = buckets
        .iter()
        .map(|b| {
            let totals = b.totals();
            SummaryRow {
                date: b.date,
                label: b.label.clone(),
                calories: b.calories,
                carbohydrates: totals.carbohydrates,
                fats: totals.fats,
                protein: totals.protein,
                sugar: totals.sugar,
            }
        })
        .collect();

    let totals: Nutrition = buckets.iter().map(Bucket::totals).sum();
    let total_calories: f64 = rows.iter().map(|r| r.calories).sum();
    let total_sugar: f64 = rows.iter().map(|r| r.sugar).sum();
    let (average_calories, average_sugar) = if rows.is_empty() {
        (0.0, 0.0)
    } else {
        let n = rows.len() as f64;
        ((total_calories / n).round(), total_sugar / n)
    };

    PeriodSummary {
        total_calories,
        average_calories,
        total_sugar,
        average_sugar,
        totals,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::{Category, NutrientTargets};
    use crate::nutrition::Portion;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn entry(id: i64, day: &str, calories: f64, sugar: f64) -> NutritionEntry {
        NutritionEntry {
            id,
            food_id: 1,
            food_name: "Chocolate ice cream".to_string(),
            category: Category::Icecream,
            portion: Portion {
                amount: "100g".to_string(),
                grams: 100.0,
            },
            date: date(day),
            saved_at: Utc::now(),
            nutrition: Nutrition {
                calories,
                sugar,
                protein: 5.0,
                carbohydrates: 30.0,
                fats: 15.0,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_day_bucket_sums_same_date() {
        let entries = vec![
            entry(1, "2024-01-01", 300.0, 10.0),
            entry(2, "2024-01-01", 150.0, 5.0),
            entry(3, "2024-01-02", 200.0, 5.0),
        ];
        let buckets = chart_data(&entries, date("2024-01-01"), Period::Day);

        assert_eq!(buckets.len(), 7);
        let last = buckets.last().unwrap();
        assert_eq!(last.date, date("2024-01-01"));
        assert_eq!(last.label, "1");
        assert_eq!(last.calories, 450.0);
        assert_eq!(last.entries.len(), 2);

        assert_eq!(buckets[0].date, date("2023-12-26"));
        assert_eq!(buckets[0].label, "26");
        assert_eq!(last.calories, day_totals(&entries, date("2024-01-01")).calories);
    }

    #[test]
    fn test_week_windows_are_inclusive() {
        let entries = vec![
            entry(1, "2024-01-28", 100.0, 0.0), // reference day, W4
            entry(2, "2024-01-22", 200.0, 0.0), // first day of W4
            entry(3, "2024-01-21", 400.0, 0.0), // last day of W3
            entry(4, "2024-01-01", 800.0, 0.0), // first day of W1
            entry(5, "2023-12-31", 1600.0, 0.0), // outside
        ];
        let buckets = chart_data(&entries, date("2024-01-28"), Period::Week);

        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["W1", "W2", "W3", "W4"]);
        assert_eq!(buckets[0].date, date("2024-01-01"));
        assert_eq!(buckets[0].calories, 800.0);
        assert_eq!(buckets[2].calories, 400.0);
        assert_eq!(buckets[3].date, date("2024-01-22"));
        assert_eq!(buckets[3].calories, 300.0);
    }

    #[test]
    fn test_month_spans_31_days() {
        let buckets = chart_data(&[], date("2024-03-31"), Period::Month);
        assert_eq!(buckets.len(), 31);
        assert_eq!(buckets[0].date, date("2024-03-01"));
        assert!(buckets.iter().all(|b| b.calories == 0.0 && b.entries.is_empty()));
    }

    #[test]
    fn test_average_includes_or_excludes_zero_buckets() {
        let entries = vec![
            entry(1, "2024-01-07", 700.0, 0.0),
            entry(2, "2024-01-06", 700.0, 0.0),
        ];
        let week = chart_data(&entries, date("2024-01-07"), Period::Day);
        assert_eq!(average_calories(&week, Period::Day.default_zero_buckets()), 200.0);

        let month = chart_data(&entries, date("2024-01-07"), Period::Month);
        assert_eq!(average_calories(&month, Period::Month.default_zero_buckets()), 700.0);
        // 1400 / 31 = 45.16
        assert_eq!(average_calories(&month, ZeroBuckets::Include), 45.0);
    }

    #[test]
    fn test_average_of_empty_input_is_zero() {
        for period in [Period::Day, Period::Week, Period::Month] {
            let buckets = chart_data(&[], date("2024-01-01"), period);
            assert_eq!(average_calories(&buckets, period.default_zero_buckets()), 0.0);
        }
        assert_eq!(average_calories(&[], ZeroBuckets::Include), 0.0);
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(progress_percentage(50.0, 100.0), 50.0);
        assert_eq!(progress_percentage(250.0, 100.0), 100.0);
        assert_eq!(progress_percentage(0.0, 100.0), 0.0);
        assert_eq!(progress_percentage(-5.0, 100.0), 0.0);
        assert_eq!(progress_percentage(10.0, 0.0), 100.0);
        for v in [0.0, 1.0, 99.9, 1e9] {
            let p = progress_percentage(v, 42.0);
            assert!((0.0..=100.0).contains(&p));
        }
    }

    #[test]
    fn test_macro_progress() {
        let totals = Nutrition {
            carbohydrates: 150.0,
            protein: 25.0,
            fats: 0.0,
            ..Default::default()
        };
        let progress = MacroProgress::new(&totals, &NutrientTargets::default());
        assert_eq!(progress.carbohydrates, 100.0);
        assert_eq!(progress.protein, 25.0);
        assert_eq!(progress.fats, 0.0);
    }

    #[test]
    fn test_macro_split() {
        // carbs 30, fats 15, protein 5 per entry
        let entries = vec![
            entry(1, "2024-01-01", 100.0, 0.0),
            entry(2, "2024-01-01", 100.0, 0.0),
        ];
        let split = macro_split(&entries).unwrap();
        assert_eq!(split.carbohydrates.value, 60.0);
        assert!((split.carbohydrates.percentage - 60.0).abs() < 1e-9);
        assert!((split.fats.percentage - 30.0).abs() < 1e-9);
        assert!((split.protein.percentage - 10.0).abs() < 1e-9);

        assert!(macro_split(&Vec::<NutritionEntry>::new()).is_none());

        let mut zero = entry(3, "2024-01-01", 0.0, 0.0);
        zero.nutrition = Nutrition::zero();
        assert!(macro_split(vec![&zero]).is_none());
    }

    #[test]
    fn test_calorie_status() {
        assert_eq!(calorie_status(0.0), None);
        assert_eq!(calorie_status(1000.0), Some(CalorieStatus::Under));
        assert_eq!(calorie_status(1400.0), Some(CalorieStatus::Normal));
        assert_eq!(calorie_status(2200.0), Some(CalorieStatus::Normal));
        assert_eq!(calorie_status(2500.0), Some(CalorieStatus::Over));
        assert_eq!(calorie_status(3000.0), Some(CalorieStatus::High));
    }

    #[test]
    fn test_sugar_chart_scale_and_ticks() {
        let entries = vec![entry(1, "2024-01-07", 100.0, 10.0)];
        let buckets = chart_data(&entries, date("2024-01-07"), Period::Day);
        let chart = sugar_chart(&buckets, Period::Day, UnitSystem::European, Language::English);

        assert_eq!(chart.max, 25.0);
        assert_eq!(chart.points.len(), 7);
        assert_eq!(chart.points[6].y, 0.4);
        assert_eq!(chart.points[0].y, 0.0);
        assert!(chart.points.iter().all(|p| p.show_label));

        let grams: Vec<f64> = chart.ticks.iter().map(|t| t.grams).collect();
        // 6.25 -> 6, 12.5 -> 13, 18.75 -> 19
        assert_eq!(grams, vec![0.0, 6.0, 13.0, 19.0, 25.0]);
        assert_eq!(chart.ticks[4].label, "25g");
    }

    #[test]
    fn test_sugar_chart_grows_with_data() {
        let entries = vec![entry(1, "2024-01-07", 100.0, 80.0)];
        let buckets = chart_data(&entries, date("2024-01-07"), Period::Month);
        let chart = sugar_chart(&buckets, Period::Month, UnitSystem::American, Language::English);

        assert_eq!(chart.max, 80.0);
        assert_eq!(chart.points[30].y, 1.0);
        assert!(chart.points[0].show_label);
        assert!(!chart.points[1].show_label);
        assert!(chart.points[3].show_label);
        // 80g is ~2.8oz
        assert_eq!(chart.ticks[4].label, "2.8oz");
    }

    #[test]
    fn test_period_summary_averages_over_all_buckets() {
        let entries = vec![
            entry(1, "2024-01-07", 700.0, 14.0),
            entry(2, "2024-01-06", 700.0, 0.0),
        ];
        let buckets = chart_data(&entries, date("2024-01-07"), Period::Day);
        let summary = period_summary(&buckets);

        assert_eq!(summary.rows.len(), 7);
        assert_eq!(summary.total_calories, 1400.0);
        assert_eq!(summary.average_calories, 200.0);
        assert_eq!(summary.total_sugar, 14.0);
        assert_eq!(summary.average_sugar, 2.0);
        assert_eq!(summary.totals.carbohydrates, 60.0);
        assert_eq!(summary.rows[6].fats, 15.0);

        let empty = period_summary(&[]);
        assert_eq!(empty.average_calories, 0.0);
        assert_eq!(empty.average_sugar, 0.0);
    }

    #[test]
    fn test_period_from_str() {
        assert_eq!(Period::from_str("Week"), Some(Period::Week));
        assert_eq!(Period::from_str("year"), None);
        assert_eq!(Period::Month.bucket_count(), 31);
    }
}
