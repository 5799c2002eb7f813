/// A foreign-key edge from a local column to another table's key column.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForeignKey {
    /// Local column holding the reference.
    pub column: String,

    /// Referenced table.
    pub ref_table: String,

    /// Referenced column; must be part of the referenced table's primary
    /// key (validated at catalog construction).
    pub ref_column: String,
}
