//! SQLite backing table with repair-on-corruption

use super::{RateRecord, StoreLocation};
use crate::dates::{db_seek_date, parse_db_date, to_db_date};
use crate::error::{RatesError, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::fs;
use std::io;

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS rates (
        date TEXT,
        currency TEXT,
        rate REAL NOT NULL
    );
    CREATE UNIQUE INDEX IF NOT EXISTS idx_rate ON rates (date, currency);";

const PROBE_SQL: &str = "SELECT date, currency, rate FROM rates WHERE 1 = 2";

const SEEK_BEFORE_SQL: &str =
    "SELECT rate FROM rates WHERE date <= ?1 AND currency = ?2 ORDER BY date DESC LIMIT 1";

const SEEK_AFTER_SQL: &str =
    "SELECT rate FROM rates WHERE date >= ?1 AND currency = ?2 ORDER BY date ASC LIMIT 1";

const UPSERT_SQL: &str = "INSERT OR REPLACE INTO rates (date, currency, rate) VALUES (?1, ?2, ?3)";

/// How a failed statement is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    /// Unreadable file: discard it and start over
    Corrupt,
    /// Missing table or similar: (re)create the schema
    Operational,
    /// Not a storage problem; surfaced as is
    Other,
}

fn classify(err: &rusqlite::Error) -> Failure {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => match e.code {
            ErrorCode::DatabaseCorrupt | ErrorCode::NotADatabase => Failure::Corrupt,
            _ => Failure::Operational,
        },
        _ => Failure::Other,
    }
}

fn seek(conn: &Connection, sql: &str, date: &str, code: &str) -> rusqlite::Result<Option<f64>> {
    conn.query_row(sql, params![date, code], |row| row.get(0))
        .optional()
}

fn memory_connection() -> Result<Connection> {
    Connection::open_in_memory().map_err(|e| {
        RatesError::StorageUnavailable(format!("Failed to create in-memory database: {}", e))
    })
}

fn create_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CREATE_TABLE_SQL)
}

/// The connection actually in use, which may be a memory fallback for a
/// requested file location.
pub(crate) struct Storage {
    location: StoreLocation,
    conn: Connection,
    persistent: bool,
    /// Bumped whenever the table is replaced by an empty one
    generation: u64,
}

impl Storage {
    pub(crate) fn open(location: StoreLocation) -> Result<Self> {
        let (conn, persistent) = match &location {
            StoreLocation::Memory => (memory_connection()?, false),
            StoreLocation::File(path) => match Connection::open(path) {
                Ok(conn) => (conn, true),
                Err(e) => {
                    log::warn!(
                        "Can't open currency database at {}: {}. Using a memory table",
                        path.display(),
                        e
                    );
                    (memory_connection()?, false)
                }
            },
        };

        let mut storage = Self {
            location,
            conn,
            persistent,
            generation: 0,
        };
        storage.execute(|conn| conn.prepare(PROBE_SQL).map(|_| ()))?;
        log::info!("Opened rate store at {}", storage.location);
        Ok(storage)
    }

    /// Whether rows currently reach the requested file
    pub(crate) fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub(crate) fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Changes when rows read earlier may no longer exist
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Run `op`, repairing the storage and retrying once on a storage failure
    fn execute<T, F>(&mut self, op: F) -> Result<T>
    where
        F: Fn(&Connection) -> rusqlite::Result<T>,
    {
        match op(&self.conn) {
            Ok(value) => return Ok(value),
            Err(err) => match classify(&err) {
                Failure::Corrupt => self.recover_corrupt(&err)?,
                Failure::Operational => self.recover_operational(&err)?,
                Failure::Other => return Err(err.into()),
            },
        }
        op(&self.conn).map_err(RatesError::from)
    }

    fn recover_operational(&mut self, err: &rusqlite::Error) -> Result<()> {
        log::debug!("Rate table unavailable ({}), creating schema", err);
        if let Err(e) = create_tables(&self.conn) {
            log::warn!(
                "Messy problems with the currency database ({}), starting anew with a memory table",
                e
            );
            self.fall_back_to_memory()?;
        }
        Ok(())
    }

    fn recover_corrupt(&mut self, err: &rusqlite::Error) -> Result<()> {
        let corrupt = RatesError::StorageCorrupt(err.to_string());
        log::warn!("{} at {}. Starting over.", corrupt, self.location);
        self.generation += 1;

        match self.location.clone() {
            StoreLocation::File(path) if self.persistent => {
                // Close the file before deleting it
                self.conn = memory_connection()?;
                self.persistent = false;

                let reopened = match fs::remove_file(&path) {
                    Ok(()) => Ok(()),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                    Err(e) => Err(RatesError::from(e)),
                }
                .and_then(|()| Connection::open(&path).map_err(RatesError::from));

                match reopened {
                    Ok(conn) => {
                        self.conn = conn;
                        self.persistent = true;
                    }
                    Err(e) => log::warn!(
                        "Can't re-use {} ({}), using a memory table",
                        path.display(),
                        e
                    ),
                }
            }
            _ => {
                log::warn!("Can't re-use the storage, using a memory table");
                self.conn = memory_connection()?;
                self.persistent = false;
            }
        }

        if let Err(e) = create_tables(&self.conn) {
            log::warn!("Failed to recreate rate table ({}), using a memory table", e);
            self.fall_back_to_memory()?;
        }
        Ok(())
    }

    fn fall_back_to_memory(&mut self) -> Result<()> {
        let conn = memory_connection()?;
        create_tables(&conn).map_err(|e| {
            RatesError::StorageUnavailable(format!("Failed to create in-memory rate table: {}", e))
        })?;
        self.conn = conn;
        self.persistent = false;
        self.generation += 1;
        Ok(())
    }

    /// Rate at the nearest date on or before `date`, else on or after it
    pub(crate) fn seek_rate(&mut self, date: NaiveDate, code: &str) -> Result<Option<f64>> {
        let str_date = db_seek_date(date);
        if let Some(rate) = self.execute(|conn| seek(conn, SEEK_BEFORE_SQL, &str_date, code))? {
            return Ok(Some(rate));
        }
        self.execute(|conn| seek(conn, SEEK_AFTER_SQL, &str_date, code))
    }

    pub(crate) fn date_range(&mut self, code: &str) -> Result<Option<(NaiveDate, NaiveDate)>> {
        let (start, end) = self.execute(|conn| {
            conn.query_row(
                "SELECT MIN(date), MAX(date) FROM rates WHERE currency = ?1",
                params![code],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<String>>(1)?,
                    ))
                },
            )
        })?;

        match (start, end) {
            (Some(start), Some(end)) => Ok(Some((parse_db_date(&start)?, parse_db_date(&end)?))),
            _ => Ok(None),
        }
    }

    /// Upsert all rows in one transaction
    pub(crate) fn upsert(&mut self, records: &[RateRecord]) -> Result<()> {
        let rows = records
            .iter()
            .map(|record| Ok((to_db_date(record.date)?, record.currency.as_str(), record.rate)))
            .collect::<Result<Vec<_>>>()?;

        self.execute(|conn| {
            let tx = conn.unchecked_transaction()?;
            {
                let mut stmt = tx.prepare_cached(UPSERT_SQL)?;
                for (date, currency, rate) in &rows {
                    stmt.execute(params![date, currency, rate])?;
                }
            }
            tx.commit()
        })
    }

    /// Persisted records of one currency, oldest first
    pub(crate) fn history(&mut self, code: &str) -> Result<Vec<RateRecord>> {
        let rows = self.execute(|conn| {
            let mut stmt =
                conn.prepare("SELECT date, rate FROM rates WHERE currency = ?1 ORDER BY date")?;
            let rows = stmt
                .query_map(params![code], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })?;

        rows.into_iter()
            .map(|(date, rate)| {
                Ok(RateRecord {
                    date: parse_db_date(&date)?,
                    currency: code.to_string(),
                    rate,
                })
            })
            .collect()
    }

    pub(crate) fn count(&mut self) -> Result<usize> {
        let count: i64 =
            self.execute(|conn| conn.query_row("SELECT COUNT(*) FROM rates", [], |row| row.get(0)))?;
        Ok(count as usize)
    }
}
