use super::{Column, ForeignKey, Type};

/// A registered table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    /// Name of the table
    pub name: String,

    /// The table's columns, in declaration order
    pub columns: Vec<Column>,

    /// Indices into `columns` composing the primary key, in key order.
    /// May be empty for keyless tables; at most two entries.
    pub primary_key: Vec<usize>,

    /// Foreign-key edges to other tables
    pub foreign_keys: Vec<ForeignKey>,

    /// Human-readable identifier prefix hint (`CUST`, `PROD`, ...)
    /// used when generating key values for an empty table.
    pub id_prefix: Option<String>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key_columns(&self) -> impl ExactSizeIterator<Item = &Column> + '_ {
        self.primary_key.iter().map(|&index| &self.columns[index])
    }

    pub fn is_primary_key(&self, name: &str) -> bool {
        self.primary_key_columns().any(|c| c.name == name)
    }

    pub fn foreign_key_for(&self, column: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.column == column)
    }

    /// The single primary-key column, if the key is not composite.
    pub fn sole_primary_key(&self) -> Option<&Column> {
        match self.primary_key.as_slice() {
            [index] => Some(&self.columns[*index]),
            _ => None,
        }
    }

    /// For composite-key "line item" tables: the parent key column and
    /// the per-parent integer sequence column.
    pub fn sequence_key(&self) -> Option<(&Column, &Column)> {
        match self.primary_key.as_slice() {
            [parent, seq] if self.columns[*seq].ty == Type::Integer => {
                Some((&self.columns[*parent], &self.columns[*seq]))
            }
            _ => None,
        }
    }
}
