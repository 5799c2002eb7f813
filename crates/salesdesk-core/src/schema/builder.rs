use super::{Catalog, Column, ForeignKey, Table};
use crate::{Error, Result};

use indexmap::IndexMap;
use std::collections::HashSet;

/// Builds a [`Catalog`] from static table declarations.
///
/// All schema invariants are checked in [`Builder::build`]; nothing is
/// validated incrementally, so declaration order between tables does not
/// matter.
#[derive(Default)]
pub struct Builder {
    tables: Vec<TableBuilder>,
}

pub struct TableBuilder {
    name: String,
    columns: Vec<Column>,
    primary_key: Vec<String>,
    foreign_keys: Vec<ForeignKey>,
    id_prefix: Option<String>,
}

impl Builder {
    pub fn table(&mut self, name: impl Into<String>) -> &mut TableBuilder {
        self.tables.push(TableBuilder {
            name: name.into(),
            columns: vec![],
            primary_key: vec![],
            foreign_keys: vec![],
            id_prefix: None,
        });
        self.tables.last_mut().unwrap()
    }

    pub fn build(self) -> Result<Catalog> {
        let mut tables = IndexMap::new();

        for table in &self.tables {
            let built = table.build()?;
            if tables.insert(built.name.clone(), built).is_some() {
                return Err(Error::invalid_schema(format!(
                    "duplicate table `{}`",
                    table.name
                )));
            }
        }

        let catalog = Catalog::from_tables(tables);
        catalog.validate_foreign_keys()?;
        Ok(catalog)
    }
}

impl TableBuilder {
    pub fn id_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.id_prefix = Some(prefix.into());
        self
    }

    pub fn column(&mut self, column: Column) -> &mut Self {
        self.columns.push(column);
        self
    }

    pub fn primary_key<'a>(&mut self, columns: impl IntoIterator<Item = &'a str>) -> &mut Self {
        self.primary_key = columns.into_iter().map(str::to_string).collect();
        self
    }

    pub fn foreign_key(
        &mut self,
        column: impl Into<String>,
        ref_table: impl Into<String>,
        ref_column: impl Into<String>,
    ) -> &mut Self {
        self.foreign_keys.push(ForeignKey {
            column: column.into(),
            ref_table: ref_table.into(),
            ref_column: ref_column.into(),
        });
        self
    }

    fn build(&self) -> Result<Table> {
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(Error::invalid_schema(format!(
                    "duplicate column `{}` in table `{}`",
                    column.name, self.name
                )));
            }
        }

        if self.primary_key.len() > 2 {
            return Err(Error::invalid_schema(format!(
                "table `{}` declares a {}-column primary key; at most 2 are supported",
                self.name,
                self.primary_key.len()
            )));
        }

        let mut columns = self.columns.clone();
        let mut primary_key = Vec::with_capacity(self.primary_key.len());

        for name in &self.primary_key {
            let index = columns
                .iter()
                .position(|c| &c.name == name)
                .ok_or_else(|| {
                    Error::invalid_schema(format!(
                        "primary-key column `{}` is not a column of table `{}`",
                        name, self.name
                    ))
                })?;
            // Key columns must be declared in key order so the
            // synthesizer resolves the parent before the sequence.
            if let Some(&prev) = primary_key.last() {
                if index < prev {
                    return Err(Error::invalid_schema(format!(
                        "primary-key columns of table `{}` must be declared in key order",
                        self.name
                    )));
                }
            }
            columns[index].nullable = false;
            primary_key.push(index);
        }

        for fk in &self.foreign_keys {
            if !columns.iter().any(|c| c.name == fk.column) {
                return Err(Error::invalid_schema(format!(
                    "foreign-key column `{}` is not a column of table `{}`",
                    fk.column, self.name
                )));
            }
        }

        Ok(Table {
            name: self.name.clone(),
            columns,
            primary_key,
            foreign_keys: self.foreign_keys.clone(),
            id_prefix: self.id_prefix.clone(),
        })
    }
}
