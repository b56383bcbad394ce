//! # Store Module
//!
//! This module owns the connection pool to the schema store and the statement
//! helpers shared by the entity modules. It handles backend detection,
//! bootstrap DDL for the persisted tables and the `$N` placeholder bookkeeping
//! for inserts and partial updates, across PostgreSQL and SQLite.

// ============================================================================
// External Crate Imports
// ============================================================================

use chrono::{DateTime, NaiveDateTime};
use sqlx::{
    Any, AnyPool, Arguments, Encode, FromRow, Row, Type,
    any::{AnyArguments, AnyPoolOptions, AnyRow},
};

// ============================================================================
// Internal Crate Imports
// ============================================================================

use crate::{
    Error, Result,
    migration::Migrator,
    model::{Model, SqlType},
};

/// Text layout used for timestamps that travel as strings.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

// ============================================================================
// Database Driver Enum
// ============================================================================

/// Supported store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drivers {
    /// PostgreSQL driver
    Postgres,
    /// SQLite driver, used for local development and tests
    SQLite,
}

impl Drivers {
    /// Detects the backend from a connection URL scheme.
    pub fn from_url(url: &str) -> Result<Self> {
        if url.starts_with("postgres") {
            Ok(Drivers::Postgres)
        } else if url.starts_with("sqlite") {
            Ok(Drivers::SQLite)
        } else {
            let scheme = url.split(':').next().unwrap_or_default();
            Err(sqlx::Error::Configuration(format!("unsupported store backend `{scheme}`").into()).into())
        }
    }

    /// Select-list expression reading a timestamp column back as text.
    pub fn timestamp_column(self, column: &str) -> String {
        match self {
            Drivers::Postgres => format!("CAST({column} AS TEXT) AS {column}"),
            Drivers::SQLite => column.to_string(),
        }
    }

    /// Placeholder for a timestamp bound as text.
    pub fn timestamp_param(self, index: usize) -> String {
        match self {
            Drivers::Postgres => format!("CAST(${index} AS TIMESTAMP)"),
            Drivers::SQLite => format!("${index}"),
        }
    }

    fn false_literal(self) -> &'static str {
        match self {
            Drivers::Postgres => "FALSE",
            Drivers::SQLite => "0",
        }
    }
}

// ============================================================================
// Store Struct
// ============================================================================

/// Handle to the schema store.
///
/// `Store` wraps a bounded connection pool. Every operation checks a
/// connection out for a single statement and hands it back when the statement
/// finishes or fails. Cloning is cheap and shares the same pool.
#[derive(Debug, Clone)]
pub struct Store {
    /// The underlying SQLx connection pool
    pub(crate) pool: AnyPool,
    /// The detected backend
    pub(crate) driver: Drivers,
}

impl Store {
    /// Creates a new StoreBuilder for configuring the connection.
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    /// Connects using the provided connection string and default pool settings.
    pub async fn connect(url: &str) -> Result<Self> {
        StoreBuilder::new().connect(url).await
    }

    /// Returns a Migrator that bootstraps the persisted tables.
    pub fn migrator(&self) -> Migrator<'_> {
        Migrator::new(self)
    }

    /// Closes the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Checks if a table exists in the store.
    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        let query = match self.driver {
            Drivers::Postgres => {
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = $1 AND table_schema = current_schema()"
            }
            Drivers::SQLite => "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = $1",
        };

        let row = sqlx::query(query).bind(table_name.to_string()).fetch_one(&self.pool).await?;
        let count: i64 = row.try_get(0)?;
        Ok(count > 0)
    }

    /// Creates the table described by a Model if it does not exist yet.
    pub async fn ensure_table<T: Model>(&self) -> Result<()> {
        let mut column_defs = Vec::new();

        for col in T::columns() {
            let mut def = format!("\"{}\" {}", col.name, col.sql_type.render(self.driver));

            if col.is_primary_key {
                def.push_str(" PRIMARY KEY");
                if col.sql_type == SqlType::Serial && self.driver == Drivers::SQLite {
                    def.push_str(" AUTOINCREMENT");
                }
            } else if col.sql_type == SqlType::Flag {
                def.push_str(" NOT NULL DEFAULT ");
                def.push_str(self.driver.false_literal());
            } else if !col.is_nullable {
                def.push_str(" NOT NULL");
            }

            if let (Some(f_table), Some(f_key)) = (col.foreign_table, col.foreign_key) {
                def.push_str(&format!(" REFERENCES \"{}\" (\"{}\")", f_table, f_key));
            }

            column_defs.push(def);
        }

        let query = format!("CREATE TABLE IF NOT EXISTS \"{}\" ({})", T::table_name(), column_defs.join(", "));
        log::debug!("bootstrap: {}", query);
        sqlx::query(&query).execute(&self.pool).await?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Statement helpers used by the entity modules
    // ------------------------------------------------------------------------

    /// Fetches one row by primary key.
    pub(crate) async fn find<T>(&self, id: i64) -> Result<Option<T>>
    where
        T: Model + for<'r> FromRow<'r, AnyRow> + Send + Unpin,
    {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1",
            T::select_list(self.driver),
            T::table_name(),
            T::primary_key()
        );
        Ok(sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    /// Fetches every row, optionally filtered on one integer column, in
    /// primary key order.
    pub(crate) async fn list<T>(&self, filter: Option<(&str, i64)>) -> Result<Vec<T>>
    where
        T: Model + for<'r> FromRow<'r, AnyRow> + Send + Unpin,
    {
        let mut sql = format!("SELECT {} FROM {}", T::select_list(self.driver), T::table_name());
        match filter {
            Some((column, value)) => {
                sql.push_str(&format!(" WHERE {} = $1 ORDER BY {}", column, T::primary_key()));
                Ok(sqlx::query_as::<_, T>(&sql).bind(value).fetch_all(&self.pool).await?)
            }
            None => {
                sql.push_str(&format!(" ORDER BY {}", T::primary_key()));
                Ok(sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?)
            }
        }
    }

    /// Inserts one row and returns the identifier the store assigned to it.
    ///
    /// Both backends hand the key back through `RETURNING`.
    pub(crate) async fn insert<T: Model>(&self, bindings: Bindings<'_>) -> Result<i64> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            T::table_name(),
            bindings.columns.join(", "),
            bindings.placeholders.join(", "),
            T::primary_key()
        );

        let row = sqlx::query_with(&sql, bindings.args).fetch_one(&self.pool).await?;
        Ok(row.try_get::<i64, _>(0)?)
    }

    /// Writes the bound columns of one row.
    ///
    /// Returns `false` when no row carries the identifier. An empty set of
    /// bindings is rejected before any statement is issued.
    pub(crate) async fn update<T: Model>(&self, id: i64, bindings: Bindings<'_>) -> Result<bool> {
        if bindings.is_empty() {
            return Err(Error::empty_patch());
        }

        let assignments = bindings
            .columns
            .iter()
            .zip(&bindings.placeholders)
            .map(|(column, placeholder)| format!("{} = {}", column, placeholder))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ${}",
            T::table_name(),
            assignments,
            T::primary_key(),
            bindings.columns.len() + 1
        );

        let mut args = bindings.args;
        args.add(id).map_err(sqlx::Error::Encode)?;
        let result = sqlx::query_with(&sql, args).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Deletes one row by primary key.
    ///
    /// Succeeds only when exactly one row was removed.
    pub(crate) async fn delete<T: Model>(&self, id: i64) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE {} = $1", T::table_name(), T::primary_key());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() == 1)
    }

    /// Counts the rows of a table.
    pub(crate) async fn count<T: Model>(&self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", T::table_name());
        let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
        Ok(row.try_get::<i64, _>(0)?)
    }
}

// ============================================================================
// StoreBuilder Struct
// ============================================================================

pub struct StoreBuilder {
    max_connections: u32,
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self { max_connections: 10 }
    }

    /// Caps the pool size. Callers wait for a free connection once the cap is reached.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub async fn connect(self, url: &str) -> Result<Store> {
        let driver = Drivers::from_url(url)?;
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new().max_connections(self.max_connections).connect(url).await?;
        log::info!("connected to {:?} store (max {} connections)", driver, self.max_connections);
        Ok(Store { pool, driver })
    }
}

// ============================================================================
// Bindings
// ============================================================================

/// Column values collected for an INSERT or UPDATE, with their placeholders.
pub(crate) struct Bindings<'q> {
    driver: Drivers,
    columns: Vec<&'static str>,
    placeholders: Vec<String>,
    args: AnyArguments<'q>,
}

impl<'q> Bindings<'q> {
    pub(crate) fn new(driver: Drivers) -> Self {
        Self { driver, columns: Vec::new(), placeholders: Vec::new(), args: AnyArguments::default() }
    }

    pub(crate) fn bind<T>(mut self, column: &'static str, value: T) -> Result<Self>
    where
        T: 'q + Encode<'q, Any> + Type<Any>,
    {
        self.args.add(value).map_err(sqlx::Error::Encode)?;
        self.columns.push(column);
        self.placeholders.push(format!("${}", self.columns.len()));
        Ok(self)
    }

    pub(crate) fn bind_timestamp(mut self, column: &'static str, value: Option<NaiveDateTime>) -> Result<Self> {
        self.args.add(value.map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())).map_err(sqlx::Error::Encode)?;
        self.columns.push(column);
        self.placeholders.push(self.driver.timestamp_param(self.columns.len()));
        Ok(self)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ============================================================================
// Row decoding helpers
// ============================================================================

/// Reads a boolean flag. SQLite stores flags as integers.
pub(crate) fn flag(row: &AnyRow, column: &str) -> Result<bool, sqlx::Error> {
    match row.try_get::<Option<bool>, _>(column) {
        Ok(value) => Ok(value.unwrap_or(false)),
        Err(_) => Ok(row.try_get::<Option<i64>, _>(column)?.is_some_and(|v| v != 0)),
    }
}

/// Reads a timestamp that was selected as text.
pub(crate) fn timestamp(row: &AnyRow, column: &str) -> Result<Option<NaiveDateTime>, sqlx::Error> {
    let Some(raw) = row.try_get::<Option<String>, _>(column)? else {
        return Ok(None);
    };

    parse_timestamp(&raw).map(Some).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: format!("unrecognised timestamp `{raw}`").into(),
    })
}

/// Naive layouts accepted for timestamps, seconds and fraction optional.
const NAIVE_TIMESTAMP_FORMATS: &[&str] =
    &[TIMESTAMP_FORMAT, "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"];

/// Parses a timestamp as stored or as sent by clients.
///
/// Values carrying an offset (`Z`, `+02:00`) are converted to UTC and the
/// offset dropped.
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }

    // `datetime-local` precision with an offset, e.g. `2024-05-01T10:30Z`.
    let with_offset = match raw.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{rest}+00:00"),
        None => raw.to_string(),
    };
    if let Ok(ts) = DateTime::parse_from_str(&with_offset, "%Y-%m-%dT%H:%M%:z") {
        return Some(ts.naive_utc());
    }

    NAIVE_TIMESTAMP_FORMATS.iter().find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}
