use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, any::AnyRow};

use crate::{
    Error, Result,
    databases::Database,
    model::{ColumnInfo, Model, SqlType},
    patch::{self, Patch},
    store::{Bindings, Drivers, Store},
};

/// A design project, one row of `project_table`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "project_id")]
    pub id: i64,
    #[serde(rename = "project_name")]
    pub name: String,
    #[serde(rename = "project_description")]
    pub description: Option<String>,
    pub database_id: i64,
    pub database_path: Option<String>,
    pub project_path: Option<String>,
}

/// Attributes of a project to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    #[serde(rename = "project_name")]
    pub name: String,
    #[serde(rename = "project_description", default)]
    pub description: Option<String>,
    pub database_id: i64,
    #[serde(default)]
    pub database_path: Option<String>,
    #[serde(default)]
    pub project_path: Option<String>,
}

/// Partial update of a project.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectPatch {
    #[serde(rename = "project_name", deserialize_with = "patch::skip_null")]
    pub name: Patch<String>,
    #[serde(rename = "project_description")]
    pub description: Patch<Option<String>>,
    #[serde(deserialize_with = "patch::skip_null")]
    pub database_id: Patch<i64>,
    pub database_path: Patch<Option<String>>,
    pub project_path: Patch<Option<String>>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        !(self.name.is_set()
            || self.description.is_set()
            || self.database_id.is_set()
            || self.database_path.is_set()
            || self.project_path.is_set())
    }

    fn bindings(self, driver: Drivers) -> Result<Bindings<'static>> {
        let mut bindings = Bindings::new(driver);
        if let Patch::Set(name) = self.name {
            bindings = bindings.bind("project_name", name)?;
        }
        if let Patch::Set(description) = self.description {
            bindings = bindings.bind("project_description", description)?;
        }
        if let Patch::Set(database_id) = self.database_id {
            bindings = bindings.bind("database_id", database_id)?;
        }
        if let Patch::Set(database_path) = self.database_path {
            bindings = bindings.bind("database_path", database_path)?;
        }
        if let Patch::Set(project_path) = self.project_path {
            bindings = bindings.bind("project_path", project_path)?;
        }
        Ok(bindings)
    }
}

impl Model for Project {
    fn table_name() -> &'static str {
        "project_table"
    }

    fn columns() -> Vec<ColumnInfo> {
        vec![
            ColumnInfo::id("project_id"),
            ColumnInfo::new("project_name", SqlType::Name).required(),
            ColumnInfo::new("project_description", SqlType::Text),
            ColumnInfo::new("database_id", SqlType::Integer)
                .required()
                .references(Database::table_name(), "database_id"),
            ColumnInfo::new("database_path", SqlType::Text),
            ColumnInfo::new("project_path", SqlType::Text),
        ]
    }
}

impl<'r> FromRow<'r, AnyRow> for Project {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("project_id")?,
            name: row.try_get("project_name")?,
            description: row.try_get("project_description")?,
            database_id: row.try_get("database_id")?,
            database_path: row.try_get("database_path")?,
            project_path: row.try_get("project_path")?,
        })
    }
}

impl Store {
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.list::<Project>(None).await
    }

    pub async fn get_project(&self, id: i64) -> Result<Project> {
        self.find::<Project>(id).await?.ok_or(Error::NotFound("Project"))
    }

    pub async fn create_project(&self, project: NewProject) -> Result<Project> {
        let bindings = Bindings::new(self.driver)
            .bind("project_name", project.name)?
            .bind("project_description", project.description)?
            .bind("database_id", project.database_id)?
            .bind("database_path", project.database_path)?
            .bind("project_path", project.project_path)?;
        let id = self.insert::<Project>(bindings).await?;
        self.get_project(id).await
    }

    /// Applies the attributes set in `patch` and returns the updated project.
    pub async fn update_project(&self, id: i64, patch: ProjectPatch) -> Result<Project> {
        if !self.update::<Project>(id, patch.bindings(self.driver)?).await? {
            return Err(Error::NotFound("Project"));
        }
        self.get_project(id).await
    }

    /// Returns `true` when exactly one project was removed.
    pub async fn delete_project(&self, id: i64) -> Result<bool> {
        self.delete::<Project>(id).await
    }
}
