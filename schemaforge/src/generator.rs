//! # SQL Generator
//!
//! Renders a stored table definition as a single `CREATE TABLE` statement.
//!
//! Loading and rendering are split: [`Store::generate_sql`] reads the table,
//! its fields in creation order and their physical types, then hands plain
//! [`ColumnSpec`] values to [`render_create_table`], which does no I/O.
//!
//! Foreign-key fields render as plain columns. Generation never records that
//! the table was generated.

use crate::{Result, store::Store};

/// One column line of a `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub physical_type: String,
    pub auto_increment: bool,
    pub primary_key: bool,
}

/// Renders `<name> <type>[ SERIAL][ PRIMARY KEY]`.
pub fn render_column(column: &ColumnSpec) -> String {
    let mut line = format!("{} {}", column.name, column.physical_type);
    if column.auto_increment {
        line.push_str(" SERIAL");
    }
    if column.primary_key {
        line.push_str(" PRIMARY KEY");
    }
    line
}

/// Renders the full statement with columns in the given order.
pub fn render_create_table(table_name: &str, columns: &[ColumnSpec]) -> String {
    let lines = columns.iter().map(|c| format!("  {}", render_column(c))).collect::<Vec<_>>();
    format!("CREATE TABLE {} (\n{}\n);", table_name, lines.join(",\n"))
}

impl Store {
    /// Builds the `CREATE TABLE` statement for a stored table.
    ///
    /// Fails with `NotFound` when the table does not exist. Unknown datatypes
    /// render as `TEXT`.
    pub async fn generate_sql(&self, table_id: i64) -> Result<String> {
        let table = self.get_table(table_id).await?;
        let fields = self.list_fields(table_id).await?;

        let mut columns = Vec::with_capacity(fields.len());
        for field in fields {
            let physical_type = self.resolve_physical_type(field.datatype_id).await?;
            columns.push(ColumnSpec {
                name: field.name,
                physical_type,
                auto_increment: field.is_auto_increment,
                primary_key: field.is_primary,
            });
        }

        log::debug!("rendering {} column(s) for table {}", columns.len(), table.name);
        Ok(render_create_table(&table.name, &columns))
    }
}
