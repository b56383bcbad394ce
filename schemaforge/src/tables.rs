use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, de};
use sqlx::{FromRow, Row, any::AnyRow};

use crate::{
    Error, Result,
    model::{ColumnInfo, Model, SqlType},
    patch::{self, Patch},
    projects::Project,
    store::{self, Bindings, Drivers, Store},
};

/// A logical table inside a project, one row of `all_table`.
///
/// `is_generated` and `generated_date` record when DDL was last produced for
/// the table. They are written through [`Store::update_table`] by whoever
/// generated it, never by the generator itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    #[serde(rename = "table_id")]
    pub id: i64,
    pub project_id: i64,
    #[serde(rename = "table_name")]
    pub name: String,
    #[serde(rename = "table_description")]
    pub description: Option<String>,
    pub is_generated: bool,
    pub generated_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTable {
    pub project_id: i64,
    #[serde(rename = "table_name")]
    pub name: String,
    #[serde(rename = "table_description", default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_generated: bool,
    #[serde(default, deserialize_with = "client_timestamp")]
    pub generated_date: Option<NaiveDateTime>,
}

/// Partial update of a table. The owning project cannot be changed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TablePatch {
    #[serde(rename = "table_name", deserialize_with = "patch::skip_null")]
    pub name: Patch<String>,
    #[serde(rename = "table_description")]
    pub description: Patch<Option<String>>,
    #[serde(deserialize_with = "patch::skip_null")]
    pub is_generated: Patch<bool>,
    #[serde(deserialize_with = "client_timestamp_patch")]
    pub generated_date: Patch<Option<NaiveDateTime>>,
}

/// Accepts the timestamp layouts browsers send, including `datetime-local`
/// values without seconds and values with a UTC offset.
fn client_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => store::parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp `{raw}`"))),
        None => Ok(None),
    }
}

fn client_timestamp_patch<'de, D>(deserializer: D) -> Result<Patch<Option<NaiveDateTime>>, D::Error>
where
    D: Deserializer<'de>,
{
    client_timestamp(deserializer).map(Patch::Set)
}

impl TablePatch {
    pub fn is_empty(&self) -> bool {
        !(self.name.is_set() || self.description.is_set() || self.is_generated.is_set() || self.generated_date.is_set())
    }

    fn bindings(self, driver: Drivers) -> Result<Bindings<'static>> {
        let mut bindings = Bindings::new(driver);
        if let Patch::Set(name) = self.name {
            bindings = bindings.bind("table_name", name)?;
        }
        if let Patch::Set(description) = self.description {
            bindings = bindings.bind("table_description", description)?;
        }
        if let Patch::Set(is_generated) = self.is_generated {
            bindings = bindings.bind("is_generated", is_generated)?;
        }
        if let Patch::Set(generated_date) = self.generated_date {
            bindings = bindings.bind_timestamp("generated_date", generated_date)?;
        }
        Ok(bindings)
    }
}

impl Model for Table {
    fn table_name() -> &'static str {
        "all_table"
    }

    fn columns() -> Vec<ColumnInfo> {
        vec![
            ColumnInfo::id("table_id"),
            ColumnInfo::new("project_id", SqlType::Integer)
                .required()
                .references(Project::table_name(), "project_id"),
            ColumnInfo::new("table_name", SqlType::Name).required(),
            ColumnInfo::new("table_description", SqlType::Text),
            ColumnInfo::new("is_generated", SqlType::Flag),
            ColumnInfo::new("generated_date", SqlType::Timestamp),
        ]
    }
}

impl<'r> FromRow<'r, AnyRow> for Table {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("table_id")?,
            project_id: row.try_get("project_id")?,
            name: row.try_get("table_name")?,
            description: row.try_get("table_description")?,
            is_generated: store::flag(row, "is_generated")?,
            generated_date: store::timestamp(row, "generated_date")?,
        })
    }
}

impl Store {
    /// Lists the tables of one project in creation order.
    pub async fn list_tables(&self, project_id: i64) -> Result<Vec<Table>> {
        self.list::<Table>(Some(("project_id", project_id))).await
    }

    pub async fn get_table(&self, id: i64) -> Result<Table> {
        self.find::<Table>(id).await?.ok_or(Error::NotFound("Table"))
    }

    pub async fn get_table_name(&self, id: i64) -> Result<String> {
        let row = sqlx::query("SELECT table_name FROM all_table WHERE table_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(row.try_get("table_name")?),
            None => Err(Error::NotFound("Table")),
        }
    }

    pub async fn create_table(&self, table: NewTable) -> Result<Table> {
        let bindings = Bindings::new(self.driver)
            .bind("project_id", table.project_id)?
            .bind("table_name", table.name)?
            .bind("table_description", table.description)?
            .bind("is_generated", table.is_generated)?
            .bind_timestamp("generated_date", table.generated_date)?;
        let id = self.insert::<Table>(bindings).await?;
        self.get_table(id).await
    }

    pub async fn update_table(&self, id: i64, patch: TablePatch) -> Result<Table> {
        if !self.update::<Table>(id, patch.bindings(self.driver)?).await? {
            return Err(Error::NotFound("Table"));
        }
        self.get_table(id).await
    }

    /// Removes one table. Fields are not cascaded, so the store rejects the
    /// delete while any field still belongs to the table.
    pub async fn delete_table(&self, id: i64) -> Result<bool> {
        self.delete::<Table>(id).await
    }
}
