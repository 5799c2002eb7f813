mod builder;
pub use builder::{Builder, TableBuilder};

mod catalog;
pub use catalog::Catalog;

mod column;
pub use column::{Column, ColumnDefault};

mod fk;
pub use fk::ForeignKey;

mod table;
pub use table::Table;

mod ty;
pub use ty::Type;
