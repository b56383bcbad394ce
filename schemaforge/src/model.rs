use crate::store::Drivers;

/// Storage class of a persisted column.
///
/// The concrete type name depends on the backend, see [`SqlType::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    /// Store-assigned integer identifier.
    Serial,
    Integer,
    /// Short name, `VARCHAR(255)` where the backend distinguishes it.
    Name,
    Text,
    /// Boolean flag, `NOT NULL DEFAULT FALSE`.
    Flag,
    /// Naive timestamp. SQLite keeps it as text.
    Timestamp,
}

impl SqlType {
    /// Returns the backend type name used in bootstrap DDL.
    pub fn render(self, driver: Drivers) -> &'static str {
        match (self, driver) {
            (SqlType::Serial, Drivers::Postgres) => "SERIAL",
            (SqlType::Serial, Drivers::SQLite) => "INTEGER",
            (SqlType::Integer, _) => "INTEGER",
            (SqlType::Name, Drivers::Postgres) => "VARCHAR(255)",
            (SqlType::Name, Drivers::SQLite) => "TEXT",
            (SqlType::Text, _) => "TEXT",
            (SqlType::Flag, Drivers::Postgres) => "BOOLEAN",
            (SqlType::Flag, Drivers::SQLite) => "INTEGER",
            (SqlType::Timestamp, Drivers::Postgres) => "TIMESTAMP",
            (SqlType::Timestamp, Drivers::SQLite) => "TEXT",
        }
    }
}

/// Metadata about one persisted column of the schema store.
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    /// The column name in the database.
    pub name: &'static str,
    pub sql_type: SqlType,
    pub is_primary_key: bool,
    pub is_nullable: bool,
    /// The name of the referenced table, if this is a Foreign Key.
    pub foreign_table: Option<&'static str>,
    /// The name of the referenced column, if this is a Foreign Key.
    pub foreign_key: Option<&'static str>,
}

impl ColumnInfo {
    pub fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self { name, sql_type, is_primary_key: false, is_nullable: true, foreign_table: None, foreign_key: None }
    }

    /// A store-assigned primary key.
    pub fn id(name: &'static str) -> Self {
        Self { is_primary_key: true, is_nullable: false, ..Self::new(name, SqlType::Serial) }
    }

    pub fn required(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    pub fn references(mut self, table: &'static str, column: &'static str) -> Self {
        self.foreign_table = Some(table);
        self.foreign_key = Some(column);
        self
    }
}

/// A row type persisted in one table of the schema store.
///
/// The column list drives both bootstrap DDL and the select lists used to
/// read rows back.
pub trait Model {
    /// Returns the persisted table name.
    fn table_name() -> &'static str;

    /// Returns the column definitions, in declaration order.
    fn columns() -> Vec<ColumnInfo>;

    /// Returns the primary key column name.
    fn primary_key() -> &'static str {
        Self::columns().iter().find(|c| c.is_primary_key).map(|c| c.name).unwrap_or("id")
    }

    /// Builds the `SELECT` column list for this model.
    ///
    /// Timestamps are read back as text on every backend.
    fn select_list(driver: Drivers) -> String {
        Self::columns()
            .iter()
            .map(|col| match col.sql_type {
                SqlType::Timestamp => driver.timestamp_column(col.name),
                _ => col.name.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sample;

    impl Model for Sample {
        fn table_name() -> &'static str {
            "sample"
        }

        fn columns() -> Vec<ColumnInfo> {
            vec![
                ColumnInfo::id("sample_id"),
                ColumnInfo::new("label", SqlType::Name).required(),
                ColumnInfo::new("stamped_at", SqlType::Timestamp),
            ]
        }
    }

    #[test]
    fn primary_key_comes_from_columns() {
        assert_eq!(Sample::primary_key(), "sample_id");
    }

    #[test]
    fn select_list_casts_timestamps_on_postgres_only() {
        assert_eq!(
            Sample::select_list(Drivers::Postgres),
            "sample_id, label, CAST(stamped_at AS TEXT) AS stamped_at"
        );
        assert_eq!(Sample::select_list(Drivers::SQLite), "sample_id, label, stamped_at");
    }
}
