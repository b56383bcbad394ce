//! # Datatype Catalog
//!
//! Reference data mapping a datatype identifier to the physical type name each
//! supported engine uses for it. Only the PostgreSQL name feeds the SQL
//! generator; the other engines are kept for clients that display them.
//!
//! Resolution is permissive: an identifier that does not resolve, or a catalog
//! row with no name for the requested engine, yields [`DEFAULT_PHYSICAL_TYPE`].

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, any::AnyRow};

use crate::{
    Error, Result,
    model::{ColumnInfo, Model, SqlType},
    store::{Bindings, Store},
};

/// Physical type used when a datatype cannot be resolved.
pub const DEFAULT_PHYSICAL_TYPE: &str = "TEXT";

/// Engines the catalog carries physical type names for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    PostgreSql,
    MySql,
    MongoDb,
}

impl Engine {
    /// Catalog column holding this engine's type names.
    pub fn column(self) -> &'static str {
        match self {
            Engine::PostgreSql => "postgresql",
            Engine::MySql => "mysql",
            Engine::MongoDb => "mongodb",
        }
    }
}

/// One catalog entry, a row of `field_datatype`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datatype {
    #[serde(rename = "field_datatype_id")]
    pub id: i64,
    pub display_name: String,
    pub postgresql: Option<String>,
    pub mysql: Option<String>,
    pub mongodb: Option<String>,
}

impl Datatype {
    pub fn physical_name(&self, engine: Engine) -> Option<&str> {
        match engine {
            Engine::PostgreSql => self.postgresql.as_deref(),
            Engine::MySql => self.mysql.as_deref(),
            Engine::MongoDb => self.mongodb.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDatatype {
    pub display_name: String,
    #[serde(default)]
    pub postgresql: Option<String>,
    #[serde(default)]
    pub mysql: Option<String>,
    #[serde(default)]
    pub mongodb: Option<String>,
}

/// Entries seeded into an empty catalog, as
/// `(display name, postgresql, mysql, mongodb)`.
///
/// The order fixes the seeded identifiers: `Integer` is always entry 1.
pub const BUILTIN_DATATYPES: &[(&str, &str, &str, &str)] = &[
    ("Integer", "INTEGER", "INT", "int"),
    ("Big Integer", "BIGINT", "BIGINT", "long"),
    ("Small Integer", "SMALLINT", "SMALLINT", "int"),
    ("Text", "TEXT", "TEXT", "string"),
    ("Varchar", "VARCHAR(255)", "VARCHAR(255)", "string"),
    ("Boolean", "BOOLEAN", "TINYINT(1)", "bool"),
    ("Date", "DATE", "DATE", "date"),
    ("Time", "TIME", "TIME", "string"),
    ("Timestamp", "TIMESTAMP", "DATETIME", "date"),
    ("Decimal", "NUMERIC(10,2)", "DECIMAL(10,2)", "decimal"),
    ("Float", "REAL", "FLOAT", "double"),
    ("Double", "DOUBLE PRECISION", "DOUBLE", "double"),
    ("UUID", "UUID", "CHAR(36)", "uuid"),
    ("JSON", "JSONB", "JSON", "object"),
];

impl Model for Datatype {
    fn table_name() -> &'static str {
        "field_datatype"
    }

    fn columns() -> Vec<ColumnInfo> {
        vec![
            ColumnInfo::id("field_datatype_id"),
            ColumnInfo::new("display_name", SqlType::Name).required(),
            ColumnInfo::new("postgresql", SqlType::Name),
            ColumnInfo::new("mysql", SqlType::Name),
            ColumnInfo::new("mongodb", SqlType::Name),
        ]
    }
}

impl<'r> FromRow<'r, AnyRow> for Datatype {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("field_datatype_id")?,
            display_name: row.try_get("display_name")?,
            postgresql: row.try_get("postgresql")?,
            mysql: row.try_get("mysql")?,
            mongodb: row.try_get("mongodb")?,
        })
    }
}

impl Store {
    pub async fn list_datatypes(&self) -> Result<Vec<Datatype>> {
        self.list::<Datatype>(None).await
    }

    /// Resolves the PostgreSQL type name used in generated DDL.
    pub async fn resolve_physical_type(&self, datatype_id: i64) -> Result<String> {
        self.resolve_physical_type_for(Engine::PostgreSql, datatype_id).await
    }

    /// Resolves the physical type name for any catalog engine.
    pub async fn resolve_physical_type_for(&self, engine: Engine, datatype_id: i64) -> Result<String> {
        let sql = format!("SELECT {} FROM field_datatype WHERE field_datatype_id = $1", engine.column());
        let row = sqlx::query(&sql).bind(datatype_id).fetch_optional(&self.pool).await?;

        let resolved = match row {
            Some(row) => row.try_get::<Option<String>, _>(0)?,
            None => None,
        };
        Ok(resolved.unwrap_or_else(|| DEFAULT_PHYSICAL_TYPE.to_string()))
    }

    pub async fn create_datatype(&self, datatype: NewDatatype) -> Result<Datatype> {
        let bindings = Bindings::new(self.driver)
            .bind("display_name", datatype.display_name)?
            .bind("postgresql", datatype.postgresql)?
            .bind("mysql", datatype.mysql)?
            .bind("mongodb", datatype.mongodb)?;
        let id = self.insert::<Datatype>(bindings).await?;
        self.find::<Datatype>(id).await?.ok_or(Error::NotFound("Datatype"))
    }

    /// Fills an empty catalog with [`BUILTIN_DATATYPES`].
    ///
    /// Returns the number of entries inserted; zero when the catalog already
    /// had rows.
    pub async fn seed_datatypes(&self) -> Result<usize> {
        if self.count::<Datatype>().await? > 0 {
            return Ok(0);
        }

        for (display_name, postgresql, mysql, mongodb) in BUILTIN_DATATYPES {
            self.create_datatype(NewDatatype {
                display_name: display_name.to_string(),
                postgresql: Some(postgresql.to_string()),
                mysql: Some(mysql.to_string()),
                mongodb: Some(mongodb.to_string()),
            })
            .await?;
        }
        log::info!("seeded {} datatypes into the catalog", BUILTIN_DATATYPES.len());
        Ok(BUILTIN_DATATYPES.len())
    }
}
