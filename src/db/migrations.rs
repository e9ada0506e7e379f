//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- ENTRIES
        -- Logged portions with their breakdown frozen at save time
        -- ============================================
        CREATE TABLE entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            food_id INTEGER NOT NULL,            -- catalog id
            food_name TEXT NOT NULL,
            category TEXT NOT NULL CHECK(category IN ('icecream', 'chocolate', 'candies', 'cake')),
            amount TEXT NOT NULL,                -- as entered: "100g", "3.5oz"
            grams REAL NOT NULL,
            date TEXT NOT NULL,                  -- ISO date: "2024-01-09"
            saved_at TEXT NOT NULL,              -- RFC 3339 timestamp

            calories REAL NOT NULL DEFAULT 0,
            sugar REAL NOT NULL DEFAULT 0,       -- grams
            protein REAL NOT NULL DEFAULT 0,     -- grams
            carbohydrates REAL NOT NULL DEFAULT 0, -- grams
            fats REAL NOT NULL DEFAULT 0,        -- grams
            sodium REAL NOT NULL DEFAULT 0,      -- milligrams
            cholesterol REAL NOT NULL DEFAULT 0, -- milligrams
            potassium REAL NOT NULL DEFAULT 0,   -- milligrams

            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_entries_date ON entries(date);

        -- ============================================
        -- SETTINGS
        -- Single row (id = 1)
        -- ============================================
        CREATE TABLE settings (
            id INTEGER PRIMARY KEY CHECK(id = 1),
            unit_system TEXT NOT NULL DEFAULT 'european' CHECK(unit_system IN ('european', 'american')),
            language TEXT NOT NULL DEFAULT 'english',
            reminder_enabled INTEGER NOT NULL DEFAULT 0,
            reminder_time TEXT NOT NULL DEFAULT '12:00',
            sugar_limit_enabled INTEGER NOT NULL DEFAULT 0,
            daily_sugar_limit REAL NOT NULL DEFAULT 50,  -- grams
            is_premium INTEGER NOT NULL DEFAULT 0,
            carbohydrates_target REAL NOT NULL DEFAULT 100,
            protein_target REAL NOT NULL DEFAULT 100,
            fats_target REAL NOT NULL DEFAULT 100,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- PROFILE
        -- Single row (id = 1), metric storage
        -- ============================================
        CREATE TABLE profile (
            id INTEGER PRIMARY KEY CHECK(id = 1),
            name TEXT NOT NULL DEFAULT 'Name',
            weight_kg REAL NOT NULL DEFAULT 60,
            height_cm REAL NOT NULL DEFAULT 160,
            birth_date TEXT,                     -- ISO date
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 0);

        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());
    }

    #[test]
    fn test_settings_is_single_row() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        assert!(conn
            .execute("INSERT INTO settings (id) VALUES (2)", [])
            .is_err());
    }
}
