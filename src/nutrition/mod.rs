//! Nutrition engine
//!
//! Unit systems, portion parsing and conversions, plus period aggregation
//! over diary entries.

pub mod aggregator;
pub mod converter;
pub mod units;

pub use aggregator::{
    average_calories, calorie_status, chart_data, day_totals, macro_split, period_summary,
    progress_percentage, sugar_chart, Bucket, CalorieStatus, MacroProgress, MacroSplit,
    PeriodSummary, Period, SugarChart, ZeroBuckets,
};
pub use converter::{
    calorie_unit, convert, convert_height, convert_sugar, convert_weight, custom_portion,
    default_portion, format_height, format_nutrient_mass, format_sugar, format_weight,
    parse_height, parse_portion, parse_weight, predefined_portions, round_to,
    sugar_display_value, sugar_limit_from_display, sugar_unit, Portion, UnitParseError,
};
pub use units::{Language, Quantity, UnitSystem};
