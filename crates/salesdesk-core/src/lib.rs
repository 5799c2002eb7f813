mod error;
pub use error::Error;

pub mod schema;
pub use schema::Catalog;

pub mod stmt;

pub mod storage;
pub use storage::Storage;

/// A Result type alias that uses Salesdesk's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
