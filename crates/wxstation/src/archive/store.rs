//! `SQLite`-backed row store for archived snapshots.
//!
//! One [`Store`] owns one database connection. Above this layer the archive
//! worker is the only holder of a `Store`, so no locking happens here.

use std::path::{Path, PathBuf};

use chrono::{Datelike, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::protocol::{ComfortLevel, Forecast};
use crate::snapshot::WeatherSnapshot;

use super::{migrations, ArchiveRow};

/// Columns read back into an [`ArchiveRow`], in fixed order.
const ROW_COLUMNS: &str = "dateTime, barometer, inTemp, inHumidity, inDewpoint, \
    outTemp, outHumidity, outDewpoint, windchill, windSpeed, windGust, windDir, \
    rainRate, rain, uv, comfort, forecast, \
    outTemp1, outHumidity1, outDewpoint1, outTemp2, outHumidity2, outDewpoint2, \
    outTemp3, outHumidity3, outDewpoint3, outTemp4, outHumidity4, outDewpoint4";

/// Persistent store for archived weather snapshots.
#[derive(Debug)]
pub struct Store {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Store {
    /// Open an existing archive database.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArchiveMissing`] if no database exists at `path`,
    /// or an error if it cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(Error::ArchiveMissing { path });
        }
        Self::open_connection(path)
    }

    /// Create a new archive database (or open it if it already exists).
    ///
    /// Creates parent directories as needed and initializes the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or schema
    /// initialization fails.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        Self::open_connection(path)
    }

    fn open_connection(path: PathBuf) -> Result<Self> {
        debug!("opening archive at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::ArchiveOpen {
            path: path.clone(),
            source,
        })?;

        // WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("archive opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::ArchiveOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert an archive row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert(&self, row: &ArchiveRow) -> Result<()> {
        let s = &row.snapshot;
        self.conn.execute(
            r"
            INSERT INTO wx (dateTime, usUnits, barometer, inTemp, inHumidity, inDewpoint,
                outTemp, outHumidity, outDewpoint, windchill, windSpeed, windGust, windDir,
                rainRate, rain, uv, comfort, forecast,
                outTemp1, outHumidity1, outDewpoint1, outTemp2, outHumidity2, outDewpoint2,
                outTemp3, outHumidity3, outDewpoint3, outTemp4, outHumidity4, outDewpoint4)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30)
            ",
            params![
                row.timestamp,
                0, // usUnits: metric
                s.pressure,
                s.indoor_temperature,
                s.indoor_humidity,
                s.indoor_dewpoint,
                s.temperature,
                s.humidity,
                s.dewpoint,
                s.windchill,
                s.wind_average,
                s.wind_gust,
                s.wind_direction,
                s.rain_rate,
                s.rain_total,
                s.uv_index,
                s.comfort.map(|c| c.to_string()),
                s.forecast.map(|f| f.to_string()),
                s.alt_temperature[0],
                s.alt_humidity[0],
                s.alt_dewpoint[0],
                s.alt_temperature[1],
                s.alt_humidity[1],
                s.alt_dewpoint[1],
                s.alt_temperature[2],
                s.alt_humidity[2],
                s.alt_dewpoint[2],
                s.alt_temperature[3],
                s.alt_humidity[3],
                s.alt_dewpoint[3],
            ],
        )?;

        debug!(timestamp = row.timestamp, "archived snapshot");
        Ok(())
    }

    /// Get the most recent archive row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn latest(&self) -> Result<Option<ArchiveRow>> {
        let sql = format!("SELECT {ROW_COLUMNS} FROM wx ORDER BY dateTime DESC, id DESC LIMIT 1");
        let row = self
            .conn
            .query_row(&sql, [], Self::row_to_archive)
            .optional()?;
        Ok(row)
    }

    /// Get the oldest archive row at or after the given unix timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn first_since(&self, since: i64) -> Result<Option<ArchiveRow>> {
        let sql = format!(
            "SELECT {ROW_COLUMNS} FROM wx WHERE dateTime >= ?1 ORDER BY dateTime ASC, id ASC LIMIT 1"
        );
        let row = self
            .conn
            .query_row(&sql, [since], Self::row_to_archive)
            .optional()?;
        Ok(row)
    }

    /// Get the first archive row of the calendar year containing `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if `now` is out of range or the database operation
    /// fails.
    pub fn start_of_year(&self, now: i64) -> Result<Option<ArchiveRow>> {
        let year = Utc
            .timestamp_opt(now, 0)
            .single()
            .ok_or_else(|| Error::internal(format!("timestamp out of range: {now}")))?
            .year();
        let jan1 = Utc
            .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| Error::internal(format!("bad year boundary for {year}")))?;
        self.first_since(jan1.timestamp())
    }

    /// Get every archive row in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn all(&self) -> Result<Vec<ArchiveRow>> {
        let sql = format!("SELECT {ROW_COLUMNS} FROM wx ORDER BY id ASC");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], Self::row_to_archive)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Count archived rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM wx", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Run arbitrary SQL, for tests that need to stage legacy data or break
    /// the schema.
    #[cfg(test)]
    pub(crate) fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Convert a database row to an archive row.
    fn row_to_archive(row: &rusqlite::Row) -> rusqlite::Result<ArchiveRow> {
        // Legacy archives wrote -99 where a reading was absent.
        fn reading(value: Option<f64>) -> Option<f64> {
            value.filter(|v| *v != -99.0)
        }

        let timestamp: i64 = row.get(0)?;
        let mut snapshot = WeatherSnapshot::new();
        snapshot.pressure = reading(row.get(1)?);
        snapshot.indoor_temperature = reading(row.get(2)?);
        snapshot.indoor_humidity = reading(row.get(3)?);
        snapshot.indoor_dewpoint = reading(row.get(4)?);
        snapshot.temperature = reading(row.get(5)?);
        snapshot.humidity = reading(row.get(6)?);
        snapshot.dewpoint = reading(row.get(7)?);
        snapshot.windchill = reading(row.get(8)?);
        snapshot.wind_average = reading(row.get(9)?);
        snapshot.wind_gust = reading(row.get(10)?);
        snapshot.wind_direction = reading(row.get(11)?);
        snapshot.rain_rate = reading(row.get(12)?);
        snapshot.rain_total = reading(row.get(13)?);
        snapshot.uv_index = reading(row.get(14)?);

        let comfort: Option<String> = row.get(15)?;
        snapshot.comfort = comfort.as_deref().map(ComfortLevel::from_label);
        let forecast: Option<String> = row.get(16)?;
        snapshot.forecast = forecast.as_deref().map(Forecast::from_label);

        for (slot, base) in (17..).step_by(3).take(4).enumerate() {
            snapshot.alt_temperature[slot] = reading(row.get(base)?);
            snapshot.alt_humidity[slot] = reading(row.get(base + 1)?);
            snapshot.alt_dewpoint[slot] = reading(row.get(base + 2)?);
        }

        Ok(ArchiveRow {
            timestamp,
            snapshot,
        })
    }
}
