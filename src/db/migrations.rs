use rusqlite::Connection;

use crate::error::Result;

/// Target schema version. Bump when appending to `MIGRATIONS`.
pub const SCHEMA_VERSION: u32 = 2;

/// Ordered, idempotent migration steps. Each entry is applied exactly once;
/// the current version lives in the `meta` table. This replaces the old
/// "ALTER TABLE, swallow the error if the column exists" pattern.
const MIGRATIONS: &[&str] = &[
    // v1: base tables
    "
    CREATE TABLE IF NOT EXISTS prayer_times (
        date        TEXT PRIMARY KEY,
        date_hijri  TEXT,
        name_arabic TEXT,
        fajr        TEXT,
        dhuhr       TEXT,
        asr         TEXT,
        maghrib     TEXT,
        isha        TEXT
    );

    CREATE TABLE IF NOT EXISTS prayer_settings (
        id               INTEGER PRIMARY KEY CHECK(id = 1),
        location         TEXT,
        method_calculate TEXT,
        method_asr       TEXT
    );

    CREATE TABLE IF NOT EXISTS meta (
        key   TEXT PRIMARY KEY,
        value TEXT
    );
    ",
    // v2: tag rows with their date-encoding version. Legacy rows (format 1)
    // may hold JSON date descriptors; new rows are plain DD-MM-YYYY.
    "
    ALTER TABLE prayer_times ADD COLUMN format INTEGER NOT NULL DEFAULT 1;
    ",
];

pub fn run_migrations(conn: &Connection) -> Result<()> {
    // The meta table must exist before we can read the version out of it.
    conn.execute_batch("CREATE TABLE IF NOT EXISTS meta (key TEXT PRIMARY KEY, value TEXT);")?;

    let current = schema_version(conn)?;
    for (i, step) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as u32;
        if version <= current {
            continue;
        }
        log::info!("applying schema migration v{}", version);
        conn.execute_batch(step)?;
        set_schema_version(conn, version)?;
    }
    Ok(())
}

pub fn schema_version(conn: &Connection) -> Result<u32> {
    use rusqlite::OptionalExtension;
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value.and_then(|v| v.parse().ok()).unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: u32) -> Result<()> {
    conn.execute(
        "INSERT INTO meta (key, value) VALUES ('schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value = ?1",
        rusqlite::params![version.to_string()],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);

        // The format column from v2 must be present.
        conn.execute(
            "INSERT INTO prayer_times (date, format) VALUES ('01-01-2025', 2)",
            [],
        )
        .unwrap();
    }
}
