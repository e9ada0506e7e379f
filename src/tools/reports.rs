//! Report generation tools
//!
//! Generate a PDF statistics report with a per-bucket nutrition table and a
//! sugar trend chart.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::image_crate::{DynamicImage, ImageFormat, RgbImage};
use printpdf::*;
use serde::Serialize;
use tracing::info;

use crate::db::Database;
use crate::models::{Settings, DATE_FORMAT};
use crate::nutrition::{
    calorie_unit, period_summary, sugar_chart, sugar_display_value, sugar_unit, Language,
    Period, PeriodSummary, SugarChart, UnitSystem,
};
use super::diary::parse_date;
use super::statistics::{parse_period, period_buckets};

// ============================================================================
// Color Constants (RGB 0-255)
// ============================================================================

const COLOR_TITLE: (u8, u8, u8) = (214, 51, 132); // Pink
const COLOR_SUGAR: (u8, u8, u8) = (255, 99, 71); // Tomato
const COLOR_LIMIT: (u8, u8, u8) = (255, 0, 0); // Red
const COLOR_CARBS: (u8, u8, u8) = (0, 112, 192); // Blue
const COLOR_FATS: (u8, u8, u8) = (255, 165, 0); // Orange
const COLOR_PROTEIN: (u8, u8, u8) = (0, 176, 80); // Green
const COLOR_BLACK: (u8, u8, u8) = (0, 0, 0);
const COLOR_GRAY: (u8, u8, u8) = (128, 128, 128);

/// Prefix of generated report file names
pub const REPORT_FILE_PREFIX: &str = "SugarInsider_Statistics";

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GenerateReportResponse {
    pub success: bool,
    pub file_path: String,
    pub period: Period,
    pub reference_date: String,
    pub buckets: usize,
    pub total_calories: f64,
    pub average_calories: f64,
    /// Average sugar per bucket in the user's unit system
    pub average_sugar: f64,
    pub message: String,
}

/// File name for a report, e.g. `SugarInsider_Statistics_week_2024-01-31.pdf`
pub fn report_file_name(period: Period, reference_date: &str) -> String {
    format!("{}_{}_{}.pdf", REPORT_FILE_PREFIX, period.as_str(), reference_date)
}

// ============================================================================
// Chart Generation (plotters)
// ============================================================================

/// Generate the sugar trend chart as PNG bytes.
///
/// `limit` draws a reference line at the daily limit (grams) when set.
pub fn generate_sugar_chart(
    chart_data: &SugarChart,
    limit: Option<f64>,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, String> {
    use plotters::prelude::*;

    if chart_data.points.is_empty() {
        return Err("No data to chart".to_string());
    }

    let points = &chart_data.points;
    let y_max = limit.map_or(chart_data.max, |l| chart_data.max.max(l)) * 1.1;
    let mut buffer = vec![0u8; (width * height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0..(points.len() as i32), 0.0..y_max)
            .map_err(|e| e.to_string())?;

        chart
            .configure_mesh()
            .x_labels(points.len())
            .x_label_formatter(&|x| {
                points
                    .get(*x as usize)
                    .filter(|p| *x >= 0 && p.show_label)
                    .map(|p| p.label.clone())
                    .unwrap_or_default()
            })
            .y_desc("Sugar (g)")
            .draw()
            .map_err(|e| e.to_string())?;

        if let Some(limit) = limit {
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(0, limit), (points.len() as i32, limit)],
                    RGBColor(COLOR_LIMIT.0, COLOR_LIMIT.1, COLOR_LIMIT.2).mix(0.5).stroke_width(1),
                )))
                .map_err(|e| e.to_string())?
                .label("Daily limit")
                .legend(|(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], RGBColor(255, 0, 0).stroke_width(1))
                });
        }

        let sugar_color = RGBColor(COLOR_SUGAR.0, COLOR_SUGAR.1, COLOR_SUGAR.2);

        // Area under the line
        let mut area: Vec<(i32, f64)> = vec![(0, 0.0)];
        area.extend(points.iter().enumerate().map(|(i, p)| (i as i32, p.sugar)));
        area.push(((points.len() - 1) as i32, 0.0));
        chart
            .draw_series(std::iter::once(Polygon::new(area, sugar_color.mix(0.15))))
            .map_err(|e| e.to_string())?;

        let sugar_points: Vec<(i32, f64)> = points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as i32, p.sugar))
            .collect();

        chart
            .draw_series(LineSeries::new(sugar_points.clone(), sugar_color.stroke_width(2)))
            .map_err(|e| e.to_string())?
            .label("Sugar")
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], sugar_color.stroke_width(2))
            });

        chart
            .draw_series(
                sugar_points
                    .iter()
                    .map(|(x, y)| Circle::new((*x, *y), 3, sugar_color.filled())),
            )
            .map_err(|e| e.to_string())?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| e.to_string())?;

        root.present().map_err(|e| e.to_string())?;
    }

    let img = RgbImage::from_raw(width, height, buffer).ok_or("Failed to create image from buffer")?;

    let mut png_bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| e.to_string())?;

    Ok(png_bytes)
}

// ============================================================================
// PDF Generation Helper Functions
// ============================================================================

fn rgb_to_printpdf(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

fn add_text(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    x: Mm,
    y: Mm,
    size: f32,
    color: (u8, u8, u8),
) {
    layer.set_fill_color(rgb_to_printpdf(color.0, color.1, color.2));
    layer.use_text(text, size, x, y, font);
}

fn add_line(
    layer: &PdfLayerReference,
    x1: Mm,
    y1: Mm,
    x2: Mm,
    y2: Mm,
    color: (u8, u8, u8),
    width: f32,
) {
    layer.set_outline_color(rgb_to_printpdf(color.0, color.1, color.2));
    layer.set_outline_thickness(width);

    let line = Line {
        points: vec![(Point::new(x1, y1), false), (Point::new(x2, y2), false)],
        is_closed: false,
    };
    layer.add_line(line);
}

fn period_title(period: Period) -> &'static str {
    match period {
        Period::Day => "Day",
        Period::Week => "Week",
        Period::Month => "Month",
    }
}

// ============================================================================
// Statistics Report Generation
// ============================================================================

/// Generate the statistics PDF for a period into `output_dir`
pub fn generate_statistics_report(
    db: &Database,
    period: &str,
    reference_date: &str,
    output_dir: &str,
) -> Result<GenerateReportResponse, String> {
    let period = parse_period(period)?;
    let reference = parse_date(reference_date)?;
    let reference_str = reference.format(DATE_FORMAT).to_string();

    let settings = db
        .with_conn(|conn| Settings::get(conn))
        .map_err(|e| format!("Failed to get settings: {}", e))?;
    let buckets = period_buckets(db, period, reference)?;
    let summary = period_summary(&buckets);
    let us = settings.unit_system;

    // Builtin PDF fonts only cover Latin text
    let sugar_unit = sugar_unit(us, Language::English);
    let calorie_unit = calorie_unit(us);

    let (doc, page1, layer1) = PdfDocument::new(
        "Sugar Insider Statistics",
        Mm(215.9), // Letter width
        Mm(279.4), // Letter height
        "Layer 1",
    );

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| e.to_string())?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| e.to_string())?;

    let layer = doc.get_page(page1).get_layer(layer1);

    let page_height = 279.4;
    let margin_left = 15.0;
    let mut y = page_height - 20.0;

    // Title
    add_text(&layer, &font_bold, "Sugar Insider - Statistics", Mm(margin_left), Mm(y), 18.0, COLOR_TITLE);
    y -= 10.0;

    add_text(&layer, &font, &format!("Period: {}", period_title(period)), Mm(margin_left), Mm(y), 11.0, COLOR_BLACK);
    add_text(&layer, &font, &format!("Date: {}", reference_str), Mm(120.0), Mm(y), 11.0, COLOR_BLACK);
    y -= 10.0;

    add_line(&layer, Mm(margin_left), Mm(y), Mm(200.0), Mm(y), COLOR_GRAY, 0.5);
    y -= 8.0;

    // Summary section
    add_text(&layer, &font_bold, "Summary", Mm(margin_left), Mm(y), 12.0, COLOR_BLACK);
    y -= 7.0;

    add_text(
        &layer,
        &font,
        &format!("Average Calorie Intake: {} {}", summary.average_calories, calorie_unit),
        Mm(margin_left),
        Mm(y),
        10.0,
        COLOR_BLACK,
    );
    add_text(
        &layer,
        &font,
        &format!(
            "Average Sugar Intake: {}{}",
            sugar_display_value(summary.average_sugar, us),
            sugar_unit
        ),
        Mm(110.0),
        Mm(y),
        10.0,
        COLOR_SUGAR,
    );
    y -= 6.0;

    add_text(
        &layer,
        &font,
        &format!("Total Calories: {} {}", summary.total_calories.round(), calorie_unit),
        Mm(margin_left),
        Mm(y),
        10.0,
        COLOR_BLACK,
    );
    if settings.sugar_limit_enabled {
        add_text(
            &layer,
            &font,
            &format!(
                "Daily Sugar Limit: {}{}",
                sugar_display_value(settings.daily_sugar_limit, us),
                sugar_unit
            ),
            Mm(110.0),
            Mm(y),
            10.0,
            COLOR_LIMIT,
        );
    }
    y -= 12.0;

    // Breakdown table
    let breakdown_title = if period == Period::Week { "Weekly Breakdown" } else { "Daily Breakdown" };
    add_text(&layer, &font_bold, breakdown_title, Mm(margin_left), Mm(y), 12.0, COLOR_BLACK);
    y -= 7.0;

    let col_widths = [30.0, 14.0, 28.0, 28.0, 28.0, 28.0, 28.0];
    let headers = [
        "Date".to_string(),
        "Label".to_string(),
        format!("Calories ({})", calorie_unit),
        format!("Carbs ({})", sugar_unit),
        format!("Fats ({})", sugar_unit),
        format!("Proteins ({})", sugar_unit),
        format!("Sugar ({})", sugar_unit),
    ];

    let mut col_x = margin_left;
    for (i, header) in headers.iter().enumerate() {
        add_text(&layer, &font_bold, header, Mm(col_x), Mm(y), 8.0, COLOR_BLACK);
        col_x += col_widths[i];
    }
    y -= 5.0;

    for row in &summary.rows {
        col_x = margin_left;
        let values = [
            row.date.format(DATE_FORMAT).to_string(),
            row.label.clone(),
            format!("{}", row.calories.round()),
            sugar_display_value(row.carbohydrates, us).to_string(),
            sugar_display_value(row.fats, us).to_string(),
            sugar_display_value(row.protein, us).to_string(),
            sugar_display_value(row.sugar, us).to_string(),
        ];

        for (i, value) in values.iter().enumerate() {
            let (face, color) = if i == 6 { (&font_bold, COLOR_SUGAR) } else { (&font, COLOR_BLACK) };
            add_text(&layer, face, value, Mm(col_x), Mm(y), 7.0, color);
            col_x += col_widths[i];
        }
        y -= 4.5;
    }
    y -= 6.0;

    // Totals
    add_text(&layer, &font_bold, "Nutrition Totals", Mm(margin_left), Mm(y), 12.0, COLOR_BLACK);
    y -= 7.0;
    let totals = [
        ("Carbohydrates", summary.totals.carbohydrates, COLOR_CARBS),
        ("Fats", summary.totals.fats, COLOR_FATS),
        ("Proteins", summary.totals.protein, COLOR_PROTEIN),
        ("Sugar", summary.totals.sugar, COLOR_SUGAR),
    ];
    let mut total_x = margin_left;
    for (label, grams, color) in totals {
        add_text(
            &layer,
            &font,
            &format!("{}: {}{}", label, sugar_display_value(grams, us), sugar_unit),
            Mm(total_x),
            Mm(y),
            10.0,
            color,
        );
        total_x += 46.0;
    }

    // ========================================================================
    // Page 2 - Landscape for Chart
    // ========================================================================
    let (page2, layer2) = doc.add_page(Mm(279.4), Mm(215.9), "Chart Page");
    let layer2 = doc.get_page(page2).get_layer(layer2);

    let landscape_height = 215.9;
    let mut y2 = landscape_height - 20.0;

    add_text(&layer2, &font_bold, "Sugar Trend", Mm(margin_left), Mm(y2), 16.0, COLOR_TITLE);
    add_text(&layer2, &font, &format!("{} - {}", period_title(period), reference_str), Mm(120.0), Mm(y2), 11.0, COLOR_BLACK);
    y2 -= 10.0;

    let chart = sugar_chart(&buckets, period, us, settings.language);
    let limit = settings.sugar_limit_enabled.then_some(settings.daily_sugar_limit);
    match generate_sugar_chart(&chart, limit, 1000, 400) {
        Ok(png_bytes) => {
            let dynamic_image = printpdf::image_crate::load_from_memory(&png_bytes)
                .map_err(|e| e.to_string())?;
            let pdf_image = Image::from_dynamic_image(&dynamic_image);

            // 1000x400 pixels at 120 DPI = ~212mm x 85mm
            let transform = ImageTransform {
                translate_x: Some(Mm(margin_left)),
                translate_y: Some(Mm(y2 - 90.0)),
                dpi: Some(120.0),
                ..Default::default()
            };

            pdf_image.add_to_layer(layer2.clone(), transform);
        }
        Err(e) => {
            add_text(&layer2, &font, &format!("Chart generation error: {}", e), Mm(margin_left), Mm(y2 - 10.0), 9.0, COLOR_LIMIT);
        }
    }

    add_text(
        &layer2,
        &font,
        &format!("Generated by Sugar Insider - {}", chrono::Local::now().format("%Y-%m-%d %H:%M")),
        Mm(margin_left),
        Mm(15.0),
        8.0,
        COLOR_GRAY,
    );

    // Save PDF
    let dir = Path::new(output_dir);
    std::fs::create_dir_all(dir).map_err(|e| e.to_string())?;
    let path: PathBuf = dir.join(report_file_name(period, &reference_str));

    let file = File::create(&path).map_err(|e| e.to_string())?;
    let mut writer = BufWriter::new(file);
    doc.save(&mut writer).map_err(|e| e.to_string())?;

    info!("Statistics report written to {}", path.display());

    Ok(report_response(period, reference_str, path, &summary, us))
}

fn report_response(
    period: Period,
    reference_date: String,
    path: PathBuf,
    summary: &PeriodSummary,
    us: UnitSystem,
) -> GenerateReportResponse {
    GenerateReportResponse {
        success: true,
        file_path: path.display().to_string(),
        buckets: summary.rows.len(),
        total_calories: summary.total_calories,
        average_calories: summary.average_calories,
        average_sugar: sugar_display_value(summary.average_sugar, us),
        message: format!(
            "Statistics report generated for {} ending {} with {} buckets",
            period.as_str(),
            reference_date,
            summary.rows.len()
        ),
        period,
        reference_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::notifications::NotificationService;
    use crate::tools::diary::log_entry;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sugar_insider_{}_{}", name, std::process::id()))
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(
            report_file_name(Period::Week, "2024-01-31"),
            "SugarInsider_Statistics_week_2024-01-31.pdf"
        );
    }

    #[test]
    fn test_generate_report() {
        let db = setup();
        let notifier = NotificationService::new();
        log_entry(&db, &notifier, 31, "100g", "2024-01-07", None).unwrap();
        log_entry(&db, &notifier, 12, "200g", "2024-01-05", None).unwrap();

        let dir = temp_dir("report");
        let response =
            generate_statistics_report(&db, "day", "2024-01-07", dir.to_str().unwrap()).unwrap();

        assert!(response.success);
        assert_eq!(response.buckets, 7);
        assert_eq!(response.total_calories, 960.0);
        // 960 / 7 = 137.1
        assert_eq!(response.average_calories, 137.0);
        assert!(response.file_path.ends_with("SugarInsider_Statistics_day_2024-01-07.pdf"));

        let bytes = std::fs::read(&response.file_path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_report_rejects_bad_period() {
        let db = setup();
        let dir = temp_dir("bad_period");
        assert!(generate_statistics_report(&db, "decade", "2024-01-07", dir.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_empty_chart_is_an_error() {
        let chart = SugarChart {
            max: 25.0,
            points: Vec::new(),
            ticks: Vec::new(),
        };
        assert!(generate_sugar_chart(&chart, None, 100, 50).is_err());
    }
}
