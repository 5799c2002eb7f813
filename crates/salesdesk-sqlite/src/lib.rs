mod ddl;
mod value;

use salesdesk_core::schema::Catalog;
use salesdesk_core::stmt::Value;
use salesdesk_core::storage::{RawColumn, RawForeignKey, RawTable, Storage};
use salesdesk_core::{Error, Result};

use rusqlite::Connection as RusqliteConnection;
use url::Url;

use std::path::PathBuf;

/// Where the database lives.
#[derive(Debug, Clone)]
pub enum Sqlite {
    File(PathBuf),
    InMemory,
}

impl Sqlite {
    /// Parses a `sqlite:` connection URL.
    ///
    /// `sqlite::memory:` opens an in-memory database, anything else is
    /// treated as a filesystem path.
    pub fn new(url: &str) -> Result<Sqlite> {
        let url: Url = url
            .parse()
            .map_err(|err| Error::from(anyhow::anyhow!("invalid connection URL: {err}")))?;

        if url.scheme() != "sqlite" {
            return Err(Error::from(anyhow::anyhow!(
                "connection URL does not have a `sqlite` scheme; url={url}"
            )));
        }

        if url.path() == ":memory:" {
            Ok(Sqlite::InMemory)
        } else {
            Ok(Sqlite::File(PathBuf::from(url.path())))
        }
    }

    pub fn connect(&self) -> Result<Connection> {
        match self {
            Sqlite::File(path) => Connection::open(path),
            Sqlite::InMemory => Ok(Connection::in_memory()),
        }
    }
}

/// A live SQLite connection implementing the engine's [`Storage`]
/// contract.
pub struct Connection {
    connection: RusqliteConnection,
}

impl Connection {
    pub fn open(path: impl Into<PathBuf>) -> Result<Connection> {
        let connection = RusqliteConnection::open(path.into()).map_err(storage_err)?;
        Connection::configure(connection)
    }

    pub fn in_memory() -> Connection {
        let connection =
            RusqliteConnection::open_in_memory().expect("opening in-memory SQLite failed");
        match Connection::configure(connection) {
            Ok(connection) => connection,
            Err(err) => panic!("configuring in-memory SQLite failed: {err}"),
        }
    }

    fn configure(connection: RusqliteConnection) -> Result<Connection> {
        // Constraint enforcement is off by default in SQLite.
        connection
            .execute_batch("PRAGMA foreign_keys = ON")
            .map_err(storage_err)?;
        Ok(Connection { connection })
    }

    /// Creates every table of the catalog that does not exist yet.
    pub fn create_tables(&self, catalog: &Catalog) -> Result<()> {
        for table in catalog.tables() {
            let sql = ddl::create_table(table);
            self.connection.execute_batch(&sql).map_err(storage_err)?;
        }
        Ok(())
    }
}

impl Storage for Connection {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        let mut stmt = self.connection.prepare_cached(sql).map_err(storage_err)?;
        stmt.execute(rusqlite::params_from_iter(params.iter().map(value::Param)))
            .map_err(storage_err)
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Vec<Value>>> {
        let mut stmt = self.connection.prepare_cached(sql).map_err(storage_err)?;
        let width = stmt.column_count();

        let mut rows = stmt
            .query(rusqlite::params_from_iter(params.iter().map(value::Param)))
            .map_err(storage_err)?;

        let mut out = vec![];
        while let Some(row) = rows.next().map_err(storage_err)? {
            let mut record = Vec::with_capacity(width);
            for index in 0..width {
                let cell: rusqlite::types::Value = row.get(index).map_err(storage_err)?;
                record.push(value::from_sql(cell)?);
            }
            out.push(record);
        }
        Ok(out)
    }

    fn begin(&self) -> Result<()> {
        self.connection
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(storage_err)
    }

    fn commit(&self) -> Result<()> {
        self.connection.execute_batch("COMMIT").map_err(storage_err)
    }

    fn rollback(&self) -> Result<()> {
        self.connection
            .execute_batch("ROLLBACK")
            .map_err(storage_err)
    }

    fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .map_err(storage_err)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(storage_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(storage_err)?;
        Ok(names)
    }

    fn introspect(&self, table: &str) -> Result<RawTable> {
        let columns = self.table_info(table)?;
        if columns.is_empty() {
            return Err(Error::unknown_table(table));
        }
        let foreign_keys = self.foreign_key_list(table)?;

        Ok(RawTable {
            name: table.to_string(),
            columns,
            foreign_keys,
        })
    }
}

impl Connection {
    fn table_info(&self, table: &str) -> Result<Vec<RawColumn>> {
        let sql = format!("PRAGMA table_info({})", ddl::quote(table));
        let mut stmt = self.connection.prepare(&sql).map_err(storage_err)?;

        let columns = stmt
            .query_map([], |row| {
                Ok(RawColumn {
                    name: row.get(1)?,
                    decl_ty: row.get(2)?,
                    not_null: row.get::<_, i64>(3)? != 0,
                    default: row.get(4)?,
                    pk_position: row.get::<_, i64>(5)? as usize,
                })
            })
            .map_err(storage_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(storage_err)?;
        Ok(columns)
    }

    fn foreign_key_list(&self, table: &str) -> Result<Vec<RawForeignKey>> {
        let sql = format!("PRAGMA foreign_key_list({})", ddl::quote(table));
        let mut stmt = self.connection.prepare(&sql).map_err(storage_err)?;

        let edges = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })
            .map_err(storage_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(storage_err)?;

        let mut foreign_keys = Vec::with_capacity(edges.len());
        for (ref_table, column, ref_column) in edges {
            let ref_column = match ref_column {
                Some(name) => name,
                // An implicit reference points at the target's primary key.
                None => self.sole_primary_key_of(&ref_table)?,
            };
            foreign_keys.push(RawForeignKey {
                column,
                ref_table,
                ref_column,
            });
        }
        Ok(foreign_keys)
    }

    fn sole_primary_key_of(&self, table: &str) -> Result<String> {
        let mut keyed: Vec<_> = self
            .table_info(table)?
            .into_iter()
            .filter(|column| column.pk_position > 0)
            .collect();
        keyed.sort_by_key(|column| column.pk_position);
        match keyed.into_iter().next() {
            Some(column) => Ok(column.name),
            None => Err(Error::invalid_schema(format!(
                "table `{table}` is referenced by an implicit foreign key but has no primary key"
            ))),
        }
    }
}

/// Maps a rusqlite error onto the engine's error model. Constraint
/// failures get their own kind so callers can react to them; everything
/// else is an opaque storage error.
fn storage_err(err: rusqlite::Error) -> Error {
    if let rusqlite::Error::SqliteFailure(failure, ref message) = err {
        if failure.code == rusqlite::ErrorCode::ConstraintViolation {
            let detail = message.clone().unwrap_or_else(|| failure.to_string());
            return Error::constraint_violation(detail);
        }
    }
    Error::storage(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use salesdesk_core::schema::Column;

    fn quotes_catalog() -> Catalog {
        let mut builder = Catalog::builder();
        builder
            .table("customers")
            .column(Column::text("customer_id"))
            .column(Column::text("name").not_null())
            .primary_key(["customer_id"]);
        builder
            .table("quotations")
            .column(Column::text("quotation_id"))
            .column(Column::text("customer_id").not_null())
            .column(Column::integer("quantity").not_null().default_value(1))
            .column(Column::date("quotation_date"))
            .primary_key(["quotation_id"])
            .foreign_key("customer_id", "customers", "customer_id");
        builder.build().unwrap()
    }

    #[test]
    fn parses_connection_urls() {
        assert!(matches!(
            Sqlite::new("sqlite::memory:").unwrap(),
            Sqlite::InMemory
        ));
        assert!(matches!(
            Sqlite::new("sqlite:/tmp/sales.db").unwrap(),
            Sqlite::File(_)
        ));
        assert!(Sqlite::new("postgres://localhost/sales").is_err());
    }

    #[test]
    fn round_trips_schema_through_introspection() {
        let connection = Connection::in_memory();
        connection.create_tables(&quotes_catalog()).unwrap();

        let names = connection.table_names().unwrap();
        assert_eq!(names, ["customers", "quotations"]);

        let raw = connection.introspect("quotations").unwrap();
        let quantity = raw.columns.iter().find(|c| c.name == "quantity").unwrap();
        assert!(quantity.not_null);
        assert_eq!(quantity.default.as_deref(), Some("1"));
        assert_eq!(raw.foreign_keys.len(), 1);
        assert_eq!(raw.foreign_keys[0].ref_table, "customers");
        assert_eq!(raw.foreign_keys[0].ref_column, "customer_id");

        let catalog = Catalog::introspect(&connection).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn introspect_unknown_table() {
        let connection = Connection::in_memory();
        assert!(connection
            .introspect("shipments")
            .unwrap_err()
            .is_unknown_table());
    }

    #[test]
    fn execute_and_query_round_trip() {
        let connection = Connection::in_memory();
        connection.create_tables(&quotes_catalog()).unwrap();

        let affected = connection
            .execute(
                "INSERT INTO \"customers\" (\"customer_id\", \"name\") VALUES (?, ?)",
                &[Value::from("CUST001"), Value::from("Acme")],
            )
            .unwrap();
        assert_eq!(affected, 1);

        let rows = connection
            .query(
                "SELECT \"name\" FROM \"customers\" WHERE \"customer_id\" = ?",
                &[Value::from("CUST001")],
            )
            .unwrap();
        assert_eq!(rows, vec![vec![Value::from("Acme")]]);
    }

    #[test]
    fn fk_violation_maps_to_constraint_kind() {
        let connection = Connection::in_memory();
        connection.create_tables(&quotes_catalog()).unwrap();

        let err = connection
            .execute(
                "INSERT INTO \"quotations\" (\"quotation_id\", \"customer_id\", \"quantity\") VALUES (?, ?, ?)",
                &[
                    Value::from("QUO001"),
                    Value::from("CUST999"),
                    Value::from(1),
                ],
            )
            .unwrap_err();
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn non_constraint_failures_map_to_storage_kind() {
        let connection = Connection::in_memory();
        let err = connection
            .execute("INSERT INTO \"missing\" DEFAULT VALUES", &[])
            .unwrap_err();
        assert!(err.is_storage());
        assert!(!err.is_constraint_violation());
    }

    #[test]
    fn rollback_discards_writes() {
        let connection = Connection::in_memory();
        connection.create_tables(&quotes_catalog()).unwrap();

        connection.begin().unwrap();
        connection
            .execute(
                "INSERT INTO \"customers\" (\"customer_id\", \"name\") VALUES (?, ?)",
                &[Value::from("CUST001"), Value::from("Acme")],
            )
            .unwrap();
        connection.rollback().unwrap();

        let rows = connection
            .query("SELECT \"customer_id\" FROM \"customers\"", &[])
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn opens_file_backed_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.db");
        {
            let connection = Connection::open(&path).unwrap();
            connection.create_tables(&quotes_catalog()).unwrap();
        }
        let connection = Connection::open(&path).unwrap();
        assert_eq!(connection.table_names().unwrap().len(), 2);
    }
}
