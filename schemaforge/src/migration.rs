use crate::{
    Result, catalog::Datatype, databases::Database, fields::Field, model::Model, projects::Project, store::Store,
    tables::Table,
};
use futures::future::BoxFuture;

/// Type alias for bootstrap tasks (create a table, seed reference data).
///
/// These tasks are closures that take a `Store` handle and return a future.
pub type MigrationTask = Box<dyn Fn(Store) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Bootstrap manager for the persisted schema.
///
/// Creates missing tables in registration order, then runs the seed tasks.
/// Tables must be registered after the tables their foreign keys point to.
pub struct Migrator<'a> {
    pub(crate) store: &'a Store,
    pub(crate) tasks: Vec<MigrationTask>,
    pub(crate) seed_tasks: Vec<MigrationTask>,
}

impl<'a> Migrator<'a> {
    /// Creates a new Migrator instance associated with a Store.
    pub fn new(store: &'a Store) -> Self {
        Self { store, tasks: Vec::new(), seed_tasks: Vec::new() }
    }

    /// Queues creation of the table for a Model.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// store.migrator()
    ///   .register::<Database>()
    ///   .register::<Project>()
    ///   .run()
    ///   .await?;
    /// ```
    pub fn register<T>(mut self) -> Self
    where
        T: Model + 'static + Send + Sync,
    {
        let task = Box::new(|store: Store| -> BoxFuture<'static, Result<()>> {
            Box::pin(async move {
                store.ensure_table::<T>().await?;
                log::debug!("table {} ready", T::table_name());
                Ok(())
            })
        });
        self.tasks.push(task);
        self
    }

    /// Queues seeding of the datatype catalog when it is empty.
    pub fn seed_datatypes(mut self) -> Self {
        let task = Box::new(|store: Store| -> BoxFuture<'static, Result<()>> {
            Box::pin(async move {
                store.seed_datatypes().await?;
                Ok(())
            })
        });
        self.seed_tasks.push(task);
        self
    }

    /// Executes all registered tasks.
    ///
    /// The process follows two steps:
    /// 1. Creates all tables.
    /// 2. Runs the seed tasks, which need the tables to exist.
    pub async fn run(self) -> Result<Store> {
        for task in self.tasks {
            (task)(self.store.clone()).await?;
        }

        for task in self.seed_tasks {
            (task)(self.store.clone()).await?;
        }
        Ok(self.store.clone())
    }
}

impl Store {
    /// Creates every persisted table that is missing and seeds the catalog.
    pub async fn bootstrap(&self) -> Result<()> {
        self.migrator()
            .register::<Database>()
            .register::<Datatype>()
            .register::<Project>()
            .register::<Table>()
            .register::<Field>()
            .seed_datatypes()
            .run()
            .await?;
        log::info!("schema store bootstrapped");
        Ok(())
    }
}
