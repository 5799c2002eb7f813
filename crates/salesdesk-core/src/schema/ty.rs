/// The semantic type of a column, from the engine's point of view.
///
/// The storage backend may use a coarser palette (SQLite stores dates as
/// TEXT); mapping between the two is the backend's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Type {
    Integer,
    Real,
    Text,
    Date,
}

impl Type {
    /// Maps a declared SQL column type to a semantic type.
    ///
    /// Follows SQLite's affinity sniffing: any `INT` means integer,
    /// `REAL`/`FLOA`/`DOUB` mean real, `DATE`/`TIME` mean date, anything
    /// else is text.
    pub fn from_sql_decl(decl: &str) -> Self {
        let decl = decl.to_ascii_uppercase();

        if decl.contains("INT") {
            Self::Integer
        } else if decl.contains("REAL") || decl.contains("FLOA") || decl.contains("DOUB") {
            Self::Real
        } else if decl.contains("DATE") || decl.contains("TIME") {
            Self::Date
        } else {
            Self::Text
        }
    }
}

impl core::fmt::Display for Type {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(match self {
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Text => "text",
            Self::Date => "date",
        })
    }
}
