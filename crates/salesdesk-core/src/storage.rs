use crate::stmt::Value;
use crate::Result;

/// The minimal storage contract the engine consumes.
///
/// Every call blocks on the backend round trip; the engine provides no
/// asynchrony of its own. Implementations are expected to run
/// `begin`/`commit`/`rollback` as real transactions; the engine wraps
/// its multi-statement units (identifier allocation, cascading default
/// creation) in them.
pub trait Storage: Send {
    /// Executes a write statement, returning the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<usize>;

    /// Executes a read statement, returning all result rows.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Vec<Value>>>;

    fn begin(&self) -> Result<()>;

    fn commit(&self) -> Result<()>;

    fn rollback(&self) -> Result<()>;

    /// Names of all user tables, for whole-catalog introspection.
    fn table_names(&self) -> Result<Vec<String>>;

    /// Raw column/key metadata for one table, consumed once at catalog
    /// construction.
    fn introspect(&self, table: &str) -> Result<RawTable>;
}

/// Raw table metadata as reported by the backend.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub name: String,
    pub columns: Vec<RawColumn>,
    pub foreign_keys: Vec<RawForeignKey>,
}

#[derive(Debug, Clone)]
pub struct RawColumn {
    pub name: String,

    /// Declared SQL type, e.g. `TEXT` or `REAL`.
    pub decl_ty: String,

    pub not_null: bool,

    /// Declared default, as a SQL literal.
    pub default: Option<String>,

    /// 1-based position within the primary key; 0 when not part of it.
    pub pk_position: usize,
}

#[derive(Debug, Clone)]
pub struct RawForeignKey {
    pub column: String,
    pub ref_table: String,
    pub ref_column: String,
}
