//! Utility to export a statistics PDF from the command line
//!
//! Usage: export_statistics <day|week|month> [YYYY-MM-DD] [output_dir]

use std::path::PathBuf;

use sugar_insider::tools::reports::generate_statistics_report;

fn get_database_path() -> PathBuf {
    std::env::var("SUGAR_INSIDER_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            std::fs::create_dir_all(&path).ok();
            path.push("sugar_insider.db");
            path
        })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(period) = args.first() else {
        eprintln!("Usage: export_statistics <day|week|month> [YYYY-MM-DD] [output_dir]");
        std::process::exit(2);
    };
    let reference_date = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| chrono::Local::now().date_naive().to_string());

    let db_path = get_database_path();
    println!("Database path: {}", db_path.display());

    let output_dir = args.get(2).map(PathBuf::from).unwrap_or_else(|| {
        db_path
            .parent()
            .map(|p| p.join("reports"))
            .unwrap_or_else(|| PathBuf::from("reports"))
    });

    let database = sugar_insider::db::Database::new(&db_path)?;

    // Run migrations
    database.with_conn(|conn| {
        if sugar_insider::db::migrations::needs_migration(conn)? {
            println!("Migrating database...");
            sugar_insider::db::migrations::run_migrations(conn)?;
        }
        Ok(())
    })?;

    let report = generate_statistics_report(
        &database,
        period,
        &reference_date,
        &output_dir.display().to_string(),
    )?;

    println!("{}", report.message);
    println!("  File: {}", report.file_path);
    println!("  Total calories: {}", report.total_calories);
    println!("  Average calories: {}", report.average_calories);
    println!("  Average sugar: {}", report.average_sugar);

    Ok(())
}
