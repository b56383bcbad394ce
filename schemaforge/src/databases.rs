use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, any::AnyRow};

use crate::{
    Error, Result,
    model::{ColumnInfo, Model, SqlType},
    store::{Bindings, Store},
};

/// Root grouping for projects, one row of `database_table`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    #[serde(rename = "database_id")]
    pub id: i64,
    #[serde(rename = "database_name")]
    pub name: String,
}

impl Model for Database {
    fn table_name() -> &'static str {
        "database_table"
    }

    fn columns() -> Vec<ColumnInfo> {
        vec![ColumnInfo::id("database_id"), ColumnInfo::new("database_name", SqlType::Name).required()]
    }
}

impl<'r> FromRow<'r, AnyRow> for Database {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self { id: row.try_get("database_id")?, name: row.try_get("database_name")? })
    }
}

impl Store {
    pub async fn list_databases(&self) -> Result<Vec<Database>> {
        self.list::<Database>(None).await
    }

    pub async fn create_database(&self, name: &str) -> Result<Database> {
        let bindings = Bindings::new(self.driver).bind("database_name", name.to_string())?;
        let id = self.insert::<Database>(bindings).await?;
        self.find::<Database>(id).await?.ok_or(Error::NotFound("Database"))
    }
}
