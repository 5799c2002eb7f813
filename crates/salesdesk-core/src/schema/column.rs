use super::Type;
use crate::stmt::Value;

/// A column of a registered table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Column {
    /// The name of the column in the database.
    pub name: String,

    /// The column's semantic type.
    pub ty: Type,

    /// Whether or not the column is nullable. Primary-key columns are
    /// forced non-nullable at catalog construction.
    pub nullable: bool,

    /// Declared default used by the synthesizer before falling back to
    /// the type placeholder.
    pub default: Option<ColumnDefault>,
}

/// A declared column default.
///
/// Beyond plain literals, two computed forms recur in the business
/// schema: dates relative to today (invoice due dates) and values
/// adopted from the row's foreign-key parent (a line item picking up the
/// product's unit price).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnDefault {
    /// A literal value.
    Value(Value),

    /// Today's date plus the given number of days, ISO-8601.
    TodayPlusDays(i64),

    /// The value of `column` on the parent row this record's foreign key
    /// to `table` resolves to. Falls back to the type placeholder when
    /// the foreign key resolved to null.
    FromParent { table: String, column: String },
}

impl Column {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: true,
            default: None,
        }
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, Type::Integer)
    }

    pub fn real(name: impl Into<String>) -> Self {
        Self::new(name, Type::Real)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, Type::Text)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, Type::Date)
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(ColumnDefault::Value(value.into()));
        self
    }

    pub fn default_today_plus(mut self, days: i64) -> Self {
        self.default = Some(ColumnDefault::TodayPlusDays(days));
        self
    }

    pub fn default_from_parent(
        mut self,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        self.default = Some(ColumnDefault::FromParent {
            table: table.into(),
            column: column.into(),
        });
        self
    }
}
