//! Sugar Insider
//!
//! An MCP server for a sweets diary with calorie and sugar statistics.

use std::path::PathBuf;
use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

mod app;
mod build_info;
mod db;
mod mcp;
mod models;
mod notifications;
mod nutrition;
mod tools;

use mcp::SugarInsiderService;

/// Get the project root next to target/release or target/debug
fn project_dir() -> PathBuf {
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

    path
}

/// Get the database path from environment or use default
fn get_database_path() -> PathBuf {
    std::env::var("SUGAR_INSIDER_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| project_dir().join("data").join("sugar_insider.db"))
}

/// Get the reports directory from environment or use default
fn get_reports_dir(db_path: &std::path::Path) -> PathBuf {
    std::env::var("SUGAR_INSIDER_REPORTS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            db_path
                .parent()
                .map(|p| p.join("reports"))
                .unwrap_or_else(|| PathBuf::from("reports"))
        })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sugar_insider=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    // Get database path
    let db_path = get_database_path();
    eprintln!("Database path: {}", db_path.display());

    // Ensure data directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Initialize database
    eprintln!("Initializing database...");
    let database = db::Database::new(&db_path)?;

    // Run migrations and load the notification settings
    let settings = database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        let version = db::migrations::get_schema_version(conn)?;
        eprintln!("Database schema version: {}", version);
        models::Settings::get(conn)
    })?;
    let notifier = notifications::NotificationService::from_settings(&settings);

    let reports_dir = get_reports_dir(&db_path);
    eprintln!("Reports directory: {}", reports_dir.display());

    // Create the Sugar Insider service
    let service = SugarInsiderService::new(db_path, database, notifier, reports_dir);

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
