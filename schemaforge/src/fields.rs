use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, any::AnyRow};

use crate::{
    Error, Result,
    catalog::Datatype,
    model::{ColumnInfo, Model, SqlType},
    patch::{self, Patch},
    store::{self, Bindings, Drivers, Store},
    tables::Table,
};

/// A column of a designed table, one row of `table_wise_field`.
///
/// The foreign-key attributes are descriptive only. They are not checked
/// against the referenced table and never reach generated DDL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    #[serde(rename = "table_wise_field_id")]
    pub id: i64,
    pub table_id: i64,
    #[serde(rename = "field_name")]
    pub name: String,
    #[serde(rename = "field_datatype_id")]
    pub datatype_id: i64,
    pub is_primary: bool,
    #[serde(rename = "field_label")]
    pub label: Option<String>,
    pub display_name: Option<String>,
    pub is_auto_increment: bool,
    pub is_foreign_key: bool,
    pub reference_table_id: Option<i64>,
    pub reference_table_field_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewField {
    pub table_id: i64,
    #[serde(rename = "field_name")]
    pub name: String,
    #[serde(rename = "field_datatype_id")]
    pub datatype_id: i64,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(rename = "field_label", default)]
    pub label: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub is_auto_increment: bool,
    #[serde(default)]
    pub is_foreign_key: bool,
    #[serde(default)]
    pub reference_table_id: Option<i64>,
    #[serde(default)]
    pub reference_table_field_id: Option<i64>,
}

impl NewField {
    /// A plain column with every flag cleared.
    pub fn new(table_id: i64, name: impl Into<String>, datatype_id: i64) -> Self {
        Self {
            table_id,
            name: name.into(),
            datatype_id,
            is_primary: false,
            label: None,
            display_name: None,
            is_auto_increment: false,
            is_foreign_key: false,
            reference_table_id: None,
            reference_table_field_id: None,
        }
    }
}

/// Partial update of a field. Setting `table_id` moves the field to another table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FieldPatch {
    #[serde(deserialize_with = "patch::skip_null")]
    pub table_id: Patch<i64>,
    #[serde(rename = "field_name", deserialize_with = "patch::skip_null")]
    pub name: Patch<String>,
    #[serde(rename = "field_datatype_id", deserialize_with = "patch::skip_null")]
    pub datatype_id: Patch<i64>,
    #[serde(deserialize_with = "patch::skip_null")]
    pub is_primary: Patch<bool>,
    #[serde(rename = "field_label")]
    pub label: Patch<Option<String>>,
    pub display_name: Patch<Option<String>>,
    #[serde(deserialize_with = "patch::skip_null")]
    pub is_auto_increment: Patch<bool>,
    #[serde(deserialize_with = "patch::skip_null")]
    pub is_foreign_key: Patch<bool>,
    pub reference_table_id: Patch<Option<i64>>,
    pub reference_table_field_id: Patch<Option<i64>>,
}

impl FieldPatch {
    pub fn is_empty(&self) -> bool {
        !(self.table_id.is_set()
            || self.name.is_set()
            || self.datatype_id.is_set()
            || self.is_primary.is_set()
            || self.label.is_set()
            || self.display_name.is_set()
            || self.is_auto_increment.is_set()
            || self.is_foreign_key.is_set()
            || self.reference_table_id.is_set()
            || self.reference_table_field_id.is_set())
    }

    fn bindings(self, driver: Drivers) -> Result<Bindings<'static>> {
        let mut bindings = Bindings::new(driver);
        if let Patch::Set(table_id) = self.table_id {
            bindings = bindings.bind("table_id", table_id)?;
        }
        if let Patch::Set(name) = self.name {
            bindings = bindings.bind("field_name", name)?;
        }
        if let Patch::Set(datatype_id) = self.datatype_id {
            bindings = bindings.bind("field_datatype_id", datatype_id)?;
        }
        if let Patch::Set(is_primary) = self.is_primary {
            bindings = bindings.bind("is_primary", is_primary)?;
        }
        if let Patch::Set(label) = self.label {
            bindings = bindings.bind("field_label", label)?;
        }
        if let Patch::Set(display_name) = self.display_name {
            bindings = bindings.bind("display_name", display_name)?;
        }
        if let Patch::Set(is_auto_increment) = self.is_auto_increment {
            bindings = bindings.bind("is_auto_increment", is_auto_increment)?;
        }
        if let Patch::Set(is_foreign_key) = self.is_foreign_key {
            bindings = bindings.bind("is_foreign_key", is_foreign_key)?;
        }
        if let Patch::Set(reference_table_id) = self.reference_table_id {
            bindings = bindings.bind("reference_table_id", reference_table_id)?;
        }
        if let Patch::Set(reference_table_field_id) = self.reference_table_field_id {
            bindings = bindings.bind("reference_table_field_id", reference_table_field_id)?;
        }
        Ok(bindings)
    }
}

impl Model for Field {
    fn table_name() -> &'static str {
        "table_wise_field"
    }

    fn columns() -> Vec<ColumnInfo> {
        vec![
            ColumnInfo::id("table_wise_field_id"),
            ColumnInfo::new("table_id", SqlType::Integer).required().references(Table::table_name(), "table_id"),
            ColumnInfo::new("field_name", SqlType::Name).required(),
            ColumnInfo::new("field_datatype_id", SqlType::Integer)
                .required()
                .references(Datatype::table_name(), "field_datatype_id"),
            ColumnInfo::new("is_primary", SqlType::Flag),
            ColumnInfo::new("field_label", SqlType::Name),
            ColumnInfo::new("display_name", SqlType::Name),
            ColumnInfo::new("is_auto_increment", SqlType::Flag),
            ColumnInfo::new("is_foreign_key", SqlType::Flag),
            ColumnInfo::new("reference_table_id", SqlType::Integer),
            ColumnInfo::new("reference_table_field_id", SqlType::Integer),
        ]
    }
}

impl<'r> FromRow<'r, AnyRow> for Field {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("table_wise_field_id")?,
            table_id: row.try_get("table_id")?,
            name: row.try_get("field_name")?,
            datatype_id: row.try_get("field_datatype_id")?,
            is_primary: store::flag(row, "is_primary")?,
            label: row.try_get("field_label")?,
            display_name: row.try_get("display_name")?,
            is_auto_increment: store::flag(row, "is_auto_increment")?,
            is_foreign_key: store::flag(row, "is_foreign_key")?,
            reference_table_id: row.try_get("reference_table_id")?,
            reference_table_field_id: row.try_get("reference_table_field_id")?,
        })
    }
}

impl Store {
    /// Lists the fields of one table in creation order.
    pub async fn list_fields(&self, table_id: i64) -> Result<Vec<Field>> {
        self.list::<Field>(Some(("table_id", table_id))).await
    }

    pub async fn get_field(&self, id: i64) -> Result<Field> {
        self.find::<Field>(id).await?.ok_or(Error::NotFound("Field"))
    }

    pub async fn create_field(&self, field: NewField) -> Result<Field> {
        let bindings = Bindings::new(self.driver)
            .bind("table_id", field.table_id)?
            .bind("field_name", field.name)?
            .bind("field_datatype_id", field.datatype_id)?
            .bind("is_primary", field.is_primary)?
            .bind("field_label", field.label)?
            .bind("display_name", field.display_name)?
            .bind("is_auto_increment", field.is_auto_increment)?
            .bind("is_foreign_key", field.is_foreign_key)?
            .bind("reference_table_id", field.reference_table_id)?
            .bind("reference_table_field_id", field.reference_table_field_id)?;
        let id = self.insert::<Field>(bindings).await?;
        self.get_field(id).await
    }

    pub async fn update_field(&self, id: i64, patch: FieldPatch) -> Result<Field> {
        if !self.update::<Field>(id, patch.bindings(self.driver)?).await? {
            return Err(Error::NotFound("Field"));
        }
        self.get_field(id).await
    }

    pub async fn delete_field(&self, id: i64) -> Result<bool> {
        self.delete::<Field>(id).await
    }
}
