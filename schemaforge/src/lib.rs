//! # SchemaForge
//!
//! Schema model and `CREATE TABLE` generation for a database design tool.
//!
//! A [`Store`] wraps the connection pool to the schema store and exposes CRUD
//! over [`Database`], [`Project`], [`Table`] and [`Field`] entities, the
//! [datatype catalog](catalog) and [`Store::generate_sql`].
//!
//! ```rust,ignore
//! let store = Store::connect("sqlite::memory:").await?;
//! store.bootstrap().await?;
//! let sql = store.generate_sql(table_id).await?;
//! ```

pub mod catalog;
pub mod databases;
pub mod error;
pub mod fields;
pub mod generator;
pub mod migration;
pub mod model;
pub mod patch;
pub mod projects;
pub mod store;
pub mod tables;

pub use catalog::{Datatype, Engine, NewDatatype, DEFAULT_PHYSICAL_TYPE};
pub use databases::Database;
pub use error::{Error, Result};
pub use fields::{Field, FieldPatch, NewField};
pub use generator::{ColumnSpec, render_create_table};
pub use model::{ColumnInfo, Model};
pub use patch::Patch;
pub use projects::{NewProject, Project, ProjectPatch};
pub use store::{Drivers, Store, StoreBuilder};
pub use tables::{NewTable, Table, TablePatch};
