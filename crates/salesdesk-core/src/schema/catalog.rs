use super::{Builder, Column, ForeignKey, Table, Type};
use crate::stmt::Value;
use crate::storage::{RawTable, Storage};
use crate::{Error, Result};

use indexmap::IndexMap;

/// The registered schema: one source of truth for every table the engine
/// may touch.
///
/// Built once, from static declarations or by introspecting the storage
/// backend, and immutable for the engine's lifetime. Dispatch is always
/// by registered name; there is no open-ended reflection.
#[derive(Debug, Default, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Catalog {
    tables: IndexMap<String, Table>,
}

impl Catalog {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Builds a catalog by introspecting every user table of the storage
    /// backend. Called once at engine start.
    pub fn introspect(storage: &dyn Storage) -> Result<Catalog> {
        let mut raw = vec![];
        for name in storage.table_names()? {
            raw.push(storage.introspect(&name)?);
        }
        Self::from_raw(raw)
    }

    /// Builds a catalog from raw backend metadata.
    pub fn from_raw(raw: Vec<RawTable>) -> Result<Catalog> {
        let mut tables = IndexMap::new();

        for table in raw {
            let mut columns = Vec::with_capacity(table.columns.len());
            let mut keyed: Vec<(usize, usize)> = vec![];

            for (index, raw_column) in table.columns.iter().enumerate() {
                let ty = Type::from_sql_decl(&raw_column.decl_ty);
                let default = raw_column
                    .default
                    .as_deref()
                    .and_then(parse_sql_default)
                    .map(super::ColumnDefault::Value);

                columns.push(Column {
                    name: raw_column.name.clone(),
                    ty,
                    nullable: !raw_column.not_null && raw_column.pk_position == 0,
                    default,
                });
                if raw_column.pk_position > 0 {
                    keyed.push((raw_column.pk_position, index));
                }
            }

            keyed.sort_unstable();
            if keyed.len() > 2 {
                return Err(Error::invalid_schema(format!(
                    "table `{}` has a {}-column primary key; at most 2 are supported",
                    table.name,
                    keyed.len()
                )));
            }
            let primary_key = keyed.into_iter().map(|(_, index)| index).collect();

            let foreign_keys = table
                .foreign_keys
                .iter()
                .map(|fk| ForeignKey {
                    column: fk.column.clone(),
                    ref_table: fk.ref_table.clone(),
                    ref_column: fk.ref_column.clone(),
                })
                .collect();

            let name = table.name.clone();
            let table = Table {
                name: name.clone(),
                columns,
                primary_key,
                foreign_keys,
                id_prefix: None,
            };
            if tables.insert(name, table).is_some() {
                return Err(Error::invalid_schema("duplicate table in raw metadata"));
            }
        }

        let catalog = Catalog::from_tables(tables);
        catalog.validate_foreign_keys()?;
        Ok(catalog)
    }

    pub(crate) fn from_tables(tables: IndexMap<String, Table>) -> Catalog {
        Catalog { tables }
    }

    pub fn lookup(&self, table: &str) -> Result<&Table> {
        self.tables
            .get(table)
            .ok_or_else(|| Error::unknown_table(table))
    }

    pub fn columns(&self, table: &str) -> Result<&[Column]> {
        Ok(&self.lookup(table)?.columns)
    }

    pub fn primary_key(&self, table: &str) -> Result<Vec<&Column>> {
        Ok(self.lookup(table)?.primary_key_columns().collect())
    }

    pub fn foreign_keys(&self, table: &str) -> Result<&[ForeignKey]> {
        Ok(&self.lookup(table)?.foreign_keys)
    }

    pub fn tables(&self) -> impl ExactSizeIterator<Item = &Table> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Checks every foreign-key edge: the referenced table exists, the
    /// referenced column is part of its primary key, and the local
    /// column's semantic type matches the referenced column's.
    pub(crate) fn validate_foreign_keys(&self) -> Result<()> {
        for table in self.tables.values() {
            for fk in &table.foreign_keys {
                let local = table.column(&fk.column).ok_or_else(|| {
                    Error::invalid_schema(format!(
                        "foreign-key column `{}` is not a column of table `{}`",
                        fk.column, table.name
                    ))
                })?;
                let referenced = self.tables.get(&fk.ref_table).ok_or_else(|| {
                    Error::invalid_schema(format!(
                        "table `{}` references unknown table `{}`",
                        table.name, fk.ref_table
                    ))
                })?;
                if !referenced.is_primary_key(&fk.ref_column) {
                    return Err(Error::invalid_schema(format!(
                        "foreign key `{}`.`{}` references `{}`.`{}`, which is not part of its primary key",
                        table.name, fk.column, fk.ref_table, fk.ref_column
                    )));
                }
                let target = referenced
                    .column(&fk.ref_column)
                    .expect("primary-key column exists");
                if local.ty != target.ty {
                    return Err(Error::invalid_schema(format!(
                        "foreign key `{}`.`{}` is {} but `{}`.`{}` is {}",
                        table.name, fk.column, local.ty, fk.ref_table, fk.ref_column, target.ty
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Parses a SQL default-value literal from introspected metadata.
fn parse_sql_default(literal: &str) -> Option<Value> {
    let literal = literal.trim();
    if literal.eq_ignore_ascii_case("NULL") {
        return None;
    }
    if literal.len() >= 2 && (literal.starts_with('\'') && literal.ends_with('\'')) {
        return Some(Value::String(literal[1..literal.len() - 1].replace("''", "'")));
    }
    if let Ok(v) = literal.parse::<i64>() {
        return Some(Value::I64(v));
    }
    if let Ok(v) = literal.parse::<f64>() {
        return Some(Value::F64(v));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{RawColumn, RawForeignKey};

    fn raw_column(name: &str, decl: &str, pk: usize) -> RawColumn {
        RawColumn {
            name: name.to_string(),
            decl_ty: decl.to_string(),
            not_null: false,
            default: None,
            pk_position: pk,
        }
    }

    #[test]
    fn from_raw_maps_types_and_keys() {
        let raw = vec![
            RawTable {
                name: "products".to_string(),
                columns: vec![
                    raw_column("product_id", "TEXT", 1),
                    raw_column("name", "TEXT", 0),
                    RawColumn {
                        default: Some("18.0".to_string()),
                        ..raw_column("tax_rate", "REAL", 0)
                    },
                ],
                foreign_keys: vec![],
            },
            RawTable {
                name: "quotations".to_string(),
                columns: vec![
                    raw_column("quotation_id", "TEXT", 1),
                    raw_column("product_id", "TEXT", 0),
                    raw_column("quotation_date", "DATE", 0),
                ],
                foreign_keys: vec![RawForeignKey {
                    column: "product_id".to_string(),
                    ref_table: "products".to_string(),
                    ref_column: "product_id".to_string(),
                }],
            },
        ];

        let catalog = Catalog::from_raw(raw).unwrap();
        let products = catalog.lookup("products").unwrap();
        assert_eq!(products.sole_primary_key().unwrap().name, "product_id");
        assert!(!products.column("product_id").unwrap().nullable);
        assert_eq!(
            products.column("tax_rate").unwrap().default,
            Some(super::super::ColumnDefault::Value(Value::F64(18.0)))
        );
        let quotations = catalog.lookup("quotations").unwrap();
        assert_eq!(quotations.column("quotation_date").unwrap().ty, Type::Date);
        assert_eq!(quotations.foreign_keys.len(), 1);
    }

    #[test]
    fn from_raw_rejects_dangling_fk() {
        let raw = vec![RawTable {
            name: "orders".to_string(),
            columns: vec![
                raw_column("order_id", "TEXT", 1),
                raw_column("customer_id", "TEXT", 0),
            ],
            foreign_keys: vec![RawForeignKey {
                column: "customer_id".to_string(),
                ref_table: "customers".to_string(),
                ref_column: "customer_id".to_string(),
            }],
        }];
        assert!(Catalog::from_raw(raw).unwrap_err().is_invalid_schema());
    }

    #[test]
    fn sql_default_literals() {
        assert_eq!(parse_sql_default("'Pending'"), Some(Value::from("Pending")));
        assert_eq!(parse_sql_default("''"), Some(Value::from("")));
        assert_eq!(parse_sql_default("1"), Some(Value::I64(1)));
        assert_eq!(parse_sql_default("18.0"), Some(Value::F64(18.0)));
        assert_eq!(parse_sql_default("NULL"), None);
    }
}
