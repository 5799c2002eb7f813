use crate::store;
use crate::synth::Synthesizer;

use salesdesk_core::schema::{Catalog, Table};
use salesdesk_core::stmt::Record;
use salesdesk_core::{Result, Storage};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

/// Handle to the record engine. Cheap to clone and share across
/// threads; every operation takes the storage lock for its full
/// read-then-write span, so identifier allocation and cascading default
/// creation never interleave.
#[derive(Clone)]
pub struct Db {
    shared: Arc<Shared>,
}

struct Shared {
    catalog: Catalog,
    storage: Mutex<Box<dyn Storage>>,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// The registered schema.
    pub fn schema(&self) -> &Catalog {
        &self.shared.catalog
    }

    /// Looks up a table definition, for callers that render forms or
    /// grids from the schema.
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.shared.catalog.lookup(name)
    }

    /// All rows of a table, in schema column order.
    pub fn list(&self, table: &str) -> Result<Vec<Record>> {
        let table = self.shared.catalog.lookup(table)?;
        let storage = self.lock();
        store::list(&**storage, table)
    }

    /// One row by primary key, or `None`.
    pub fn find(&self, table: &str, key: &Record) -> Result<Option<Record>> {
        let table = self.shared.catalog.lookup(table)?;
        let storage = self.lock();
        store::find(&**storage, table, key)
    }

    pub fn insert(&self, table: &str, record: &Record) -> Result<()> {
        let table = self.shared.catalog.lookup(table)?;
        debug!(table = %table.name, columns = record.len(), "insert");
        let storage = self.lock();
        store::insert(&**storage, table, record)
    }

    /// Applies `changes` to the row addressed by `key`. Key columns are
    /// immutable; change the key by deleting and re-inserting.
    pub fn update(&self, table: &str, key: &Record, changes: &Record) -> Result<()> {
        let table = self.shared.catalog.lookup(table)?;
        debug!(table = %table.name, columns = changes.len(), "update");
        let storage = self.lock();
        store::update(&**storage, table, key, changes)
    }

    pub fn delete(&self, table: &str, key: &Record) -> Result<()> {
        let table = self.shared.catalog.lookup(table)?;
        debug!(table = %table.name, "delete");
        let storage = self.lock();
        store::delete(&**storage, table, key)
    }

    /// Builds a default row for `table` without inserting it.
    ///
    /// Parent rows that had to be cascaded into existence are committed
    /// as one unit, so the returned row's foreign keys are valid the
    /// moment this returns.
    pub fn synthesize_default(&self, table: &str) -> Result<Record> {
        let catalog = &self.shared.catalog;
        catalog.lookup(table)?;
        let storage = self.lock();
        transactionally(&**storage, |storage| {
            Synthesizer::new(catalog, storage).synthesize(table)
        })
    }

    /// Synthesizes a default row and inserts it, atomically with any
    /// cascaded parent rows.
    pub fn create_default(&self, table: &str) -> Result<Record> {
        let catalog = &self.shared.catalog;
        let target = catalog.lookup(table)?;
        debug!(table = %target.name, "create default row");
        let storage = self.lock();
        transactionally(&**storage, |storage| {
            let record = Synthesizer::new(catalog, storage).synthesize(table)?;
            store::insert(storage, target, &record)?;
            Ok(record)
        })
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Storage>> {
        // A poisoned lock means another thread panicked mid-operation;
        // its transaction was never committed, so the state is usable.
        self.shared
            .storage
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn transactionally<T>(
    storage: &dyn Storage,
    f: impl FnOnce(&dyn Storage) -> Result<T>,
) -> Result<T> {
    storage.begin()?;
    match f(storage) {
        Ok(value) => {
            storage.commit()?;
            Ok(value)
        }
        Err(err) => {
            let _ = storage.rollback();
            Err(err)
        }
    }
}

/// Configures and opens a [`Db`].
#[derive(Default)]
pub struct Builder {
    catalog: Option<Catalog>,
}

impl Builder {
    /// Registers a declared schema. Without one, the schema is
    /// introspected from the backend in [`Builder::build`].
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Opens a SQLite database by connection URL. A declared catalog's
    /// tables are created first if they do not exist.
    pub fn connect(self, url: &str) -> Result<Db> {
        let connection = salesdesk_sqlite::Sqlite::new(url)?.connect()?;
        if let Some(catalog) = &self.catalog {
            connection.create_tables(catalog)?;
        }
        self.build(connection)
    }

    pub fn build(self, storage: impl Storage + 'static) -> Result<Db> {
        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => Catalog::introspect(&storage)?,
        };
        debug!(tables = catalog.len(), "engine ready");
        Ok(Db {
            shared: Arc::new(Shared {
                catalog,
                storage: Mutex::new(Box::new(storage)),
            }),
        })
    }
}
