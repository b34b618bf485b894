//! `SQLite` schema definitions for the weather archive.
//!
//! The `wx` table follows the column naming of the original weewx-style
//! archive (`dateTime`, `usUnits`, `outTemp`, `barometer`, ...), with one
//! trio of `outTemp<n>`/`outHumidity<n>`/`outDewpoint<n>` columns per
//! alternate-sensor channel.

/// SQL statement to create the archive table.
pub const CREATE_WX_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS wx (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    dateTime INTEGER NOT NULL,
    usUnits INTEGER NOT NULL DEFAULT 0,
    barometer REAL,
    inTemp REAL,
    inHumidity REAL,
    inDewpoint REAL,
    outTemp REAL,
    outHumidity REAL,
    outDewpoint REAL,
    windchill REAL,
    windSpeed REAL,
    windGust REAL,
    windDir REAL,
    rainRate REAL,
    rain REAL,
    uv REAL,
    comfort TEXT,
    forecast TEXT,
    outTemp1 REAL,
    outHumidity1 REAL,
    outDewpoint1 REAL,
    outTemp2 REAL,
    outHumidity2 REAL,
    outDewpoint2 REAL,
    outTemp3 REAL,
    outHumidity3 REAL,
    outDewpoint3 REAL,
    outTemp4 REAL,
    outHumidity4 REAL,
    outDewpoint4 REAL
)
";

/// SQL statement to create an index on `dateTime` for time-range queries.
pub const CREATE_DATETIME_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_wx_datetime ON wx(dateTime)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_WX_TABLE,
    CREATE_DATETIME_INDEX,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_create_wx_table_contains_required_columns() {
        assert!(CREATE_WX_TABLE.contains("dateTime INTEGER NOT NULL"));
        assert!(CREATE_WX_TABLE.contains("usUnits INTEGER NOT NULL"));
        assert!(CREATE_WX_TABLE.contains("barometer REAL"));
        assert!(CREATE_WX_TABLE.contains("outTemp REAL"));
        for channel in 1..=4 {
            assert!(CREATE_WX_TABLE.contains(&format!("outTemp{channel} REAL")));
            assert!(CREATE_WX_TABLE.contains(&format!("outHumidity{channel} REAL")));
            assert!(CREATE_WX_TABLE.contains(&format!("outDewpoint{channel} REAL")));
        }
    }

    #[test]
    fn test_create_metadata_table_structure() {
        assert!(CREATE_METADATA_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_METADATA_TABLE.contains("value TEXT NOT NULL"));
    }
}
