mod business;
pub use business::business_schema;

mod db;
pub use db::{Builder, Db};

mod idgen;
mod store;
mod synth;

pub use salesdesk_core::schema::{self, Catalog, Column, ColumnDefault, Table, Type};
pub use salesdesk_core::stmt::{Record, Value};
pub use salesdesk_core::{Error, Result, Storage};

pub use salesdesk_sqlite::{Connection, Sqlite};
