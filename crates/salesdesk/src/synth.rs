use crate::idgen;
use crate::store;

use salesdesk_core::schema::{Catalog, Column, ColumnDefault, ForeignKey, Table, Type};
use salesdesk_core::stmt::{Record, Value};
use salesdesk_core::{Error, Result, Storage};

use chrono::{Duration, Local};
use tracing::debug;

/// Builds complete default rows for a table.
///
/// Every column gets a value, resolved in declaration order: generated
/// key values, adopted (or cascaded) foreign keys, declared defaults,
/// and finally the type placeholder. Cascaded parent rows are inserted
/// as they are produced; the caller is responsible for wrapping the
/// whole run in one transaction.
pub(crate) struct Synthesizer<'a> {
    catalog: &'a Catalog,
    storage: &'a dyn Storage,

    /// Tables currently being synthesized, outermost first. Guards
    /// against foreign-key cycles among non-nullable edges.
    chain: Vec<String>,
}

impl<'a> Synthesizer<'a> {
    pub(crate) fn new(catalog: &'a Catalog, storage: &'a dyn Storage) -> Self {
        Self {
            catalog,
            storage,
            chain: vec![],
        }
    }

    pub(crate) fn synthesize(&mut self, table: &str) -> Result<Record> {
        let table = self.catalog.lookup(table)?;

        if self.chain.iter().any(|name| name == &table.name) {
            let mut chain = self.chain.clone();
            chain.push(table.name.clone());
            return Err(Error::synthesis(
                &*table.name,
                format!(
                    "circular foreign-key dependency: {}",
                    chain.join(" -> ")
                ),
            ));
        }

        self.chain.push(table.name.clone());
        let result = self.build_row(table);
        self.chain.pop();
        result
    }

    fn build_row(&mut self, table: &'a Table) -> Result<Record> {
        let mut record = Record::new();
        for column in &table.columns {
            let value = self.column_value(table, column, &record)?;
            record.set(&column.name, value);
        }
        Ok(record)
    }

    fn column_value(&mut self, table: &'a Table, column: &Column, partial: &Record) -> Result<Value> {
        if table.is_primary_key(&column.name) {
            if let Some((parent, seq)) = table.sequence_key() {
                if column.name == seq.name {
                    let parent_value = partial.get(&parent.name).cloned().unwrap_or(Value::Null);
                    return self.next_sequence(table, parent, seq, parent_value);
                }
                // The parent half of a composite key resolves like any
                // other foreign key below.
            } else if let Some(sole) = table.sole_primary_key() {
                return match sole.ty {
                    Type::Integer => self.next_integer_key(table, sole),
                    _ => self.next_generated_identifier(table, sole),
                };
            }
        }

        if let Some(fk) = table.foreign_key_for(&column.name) {
            return self.resolve_parent(table, column, fk);
        }

        match &column.default {
            Some(default) => self.declared_default(table, column, default, partial),
            None => Ok(placeholder(table, column)),
        }
    }

    /// Picks a parent key value for a foreign-key column: any existing
    /// parent row, a null when the edge is optional, or a freshly
    /// synthesized and inserted parent row.
    fn resolve_parent(&mut self, table: &'a Table, column: &Column, fk: &ForeignKey) -> Result<Value> {
        let catalog = self.catalog;
        let parent_table = catalog.lookup(&fk.ref_table)?;

        let sql = format!(
            "SELECT {} FROM {} LIMIT 1",
            store::quote(&fk.ref_column),
            store::quote(&fk.ref_table)
        );
        if let Some(value) = self
            .storage
            .query(&sql, &[])?
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
        {
            return Ok(value);
        }

        if column.nullable {
            return Ok(Value::Null);
        }

        debug!(
            child = %table.name,
            parent = %parent_table.name,
            "no parent row exists; synthesizing one"
        );
        let parent_name = parent_table.name.clone();
        let parent_record = self.synthesize(&parent_name)?;
        store::insert(self.storage, parent_table, &parent_record)?;

        parent_record.get(&fk.ref_column).cloned().ok_or_else(|| {
            Error::synthesis(
                &*table.name,
                format!(
                    "synthesized parent row in `{}` has no `{}` value",
                    fk.ref_table, fk.ref_column
                ),
            )
        })
    }

    /// Per-parent sequence numbers for composite-key line items.
    fn next_sequence(
        &self,
        table: &Table,
        parent: &Column,
        seq: &Column,
        parent_value: Value,
    ) -> Result<Value> {
        if parent_value.is_null() {
            return Err(Error::synthesis(
                &*table.name,
                format!(
                    "sequence column `{}` needs a value for `{}` first",
                    seq.name, parent.name
                ),
            ));
        }

        let sql = format!(
            "SELECT MAX({}) FROM {} WHERE {} = ?",
            store::quote(&seq.name),
            store::quote(&table.name),
            store::quote(&parent.name)
        );
        let rows = self.storage.query(&sql, &[parent_value])?;
        let max = rows
            .first()
            .and_then(|row| row.first())
            .and_then(Value::as_i64)
            .unwrap_or(0);
        Ok(Value::I64(max + 1))
    }

    fn next_integer_key(&self, table: &Table, column: &Column) -> Result<Value> {
        let sql = format!(
            "SELECT MAX({}) FROM {}",
            store::quote(&column.name),
            store::quote(&table.name)
        );
        let rows = self.storage.query(&sql, &[])?;
        let max = rows
            .first()
            .and_then(|row| row.first())
            .and_then(Value::as_i64)
            .unwrap_or(0);
        Ok(Value::I64(max + 1))
    }

    fn next_generated_identifier(&self, table: &Table, column: &Column) -> Result<Value> {
        let sql = format!(
            "SELECT {} FROM {}",
            store::quote(&column.name),
            store::quote(&table.name)
        );
        let existing: Vec<String> = self
            .storage
            .query(&sql, &[])?
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .filter_map(|value| match value {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect();

        let fallback = table
            .id_prefix
            .clone()
            .unwrap_or_else(|| idgen::derive_prefix(&column.name));
        let id = idgen::next_identifier(existing.iter().map(String::as_str), &fallback);
        Ok(Value::String(id))
    }

    fn declared_default(
        &self,
        table: &'a Table,
        column: &Column,
        default: &ColumnDefault,
        partial: &Record,
    ) -> Result<Value> {
        match default {
            ColumnDefault::Value(value) => value.clone().coerce(column.ty, &column.name),
            ColumnDefault::TodayPlusDays(days) => Ok(Value::String(iso_date(*days))),
            ColumnDefault::FromParent {
                table: parent,
                column: parent_column,
            } => {
                let fk = table
                    .foreign_keys
                    .iter()
                    .find(|fk| &fk.ref_table == parent)
                    .ok_or_else(|| {
                        Error::synthesis(
                            &*table.name,
                            format!(
                                "default for `{}` adopts from `{}`, which no foreign key references",
                                column.name, parent
                            ),
                        )
                    })?;

                let fk_value = partial.get(&fk.column).cloned().unwrap_or(Value::Null);
                if fk_value.is_null() {
                    return Ok(placeholder(table, column));
                }

                let parent_table = self.catalog.lookup(parent)?;
                let key: Record = [(fk.ref_column.clone(), fk_value)].into_iter().collect();
                match store::find(self.storage, parent_table, &key)? {
                    Some(row) => match row.get(parent_column).cloned() {
                        Some(value) if !value.is_null() => value.coerce(column.ty, &column.name),
                        _ => Ok(placeholder(table, column)),
                    },
                    None => Ok(placeholder(table, column)),
                }
            }
        }
    }
}

/// The last-resort value for a column with nothing else to say.
fn placeholder(table: &Table, column: &Column) -> Value {
    match column.ty {
        Type::Integer => Value::I64(0),
        Type::Real => Value::F64(0.0),
        Type::Date => Value::String(iso_date(0)),
        Type::Text => {
            // A bare `name` column reads better labelled after its table.
            let label = if column.name == "name" {
                humanized_singular(&table.name)
            } else {
                humanize(&column.name)
            };
            Value::String(format!("New {label}"))
        }
    }
}

fn iso_date(days_from_today: i64) -> String {
    (Local::now().date_naive() + Duration::days(days_from_today))
        .format("%Y-%m-%d")
        .to_string()
}

/// `order_items` becomes `Order Item`, for placeholder display names.
fn humanized_singular(table: &str) -> String {
    humanize(&pluralizer::pluralize(table, 1, false))
}

fn humanize(identifier: &str) -> String {
    identifier
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use salesdesk_core::schema::Column as Col;
    use salesdesk_sqlite::Connection;

    fn synthesize_on(catalog: &Catalog, connection: &Connection, table: &str) -> Result<Record> {
        Synthesizer::new(catalog, connection).synthesize(table)
    }

    fn mini_catalog() -> Catalog {
        let mut builder = Catalog::builder();
        builder
            .table("products")
            .id_prefix("PROD")
            .column(Col::text("product_id"))
            .column(Col::text("name").not_null())
            .column(Col::real("unit_price").not_null().default_value(0.0))
            .column(Col::real("tax_rate").not_null().default_value(18.0))
            .primary_key(["product_id"]);
        builder
            .table("orders")
            .id_prefix("ORD")
            .column(Col::text("order_id"))
            .column(Col::text("status").not_null().default_value("Pending"))
            .primary_key(["order_id"]);
        builder
            .table("order_items")
            .column(Col::text("order_id"))
            .column(Col::integer("line_no"))
            .column(Col::text("product_id").not_null())
            .column(Col::integer("quantity").not_null().default_value(1))
            .column(
                Col::real("unit_price")
                    .not_null()
                    .default_from_parent("products", "unit_price"),
            )
            .primary_key(["order_id", "line_no"])
            .foreign_key("order_id", "orders", "order_id")
            .foreign_key("product_id", "products", "product_id");
        builder.build().unwrap()
    }

    fn fixture() -> (Connection, Catalog) {
        let connection = Connection::in_memory();
        let catalog = mini_catalog();
        connection.create_tables(&catalog).unwrap();
        (connection, catalog)
    }

    #[test]
    fn empty_table_gets_prefixed_identifier_and_placeholders() {
        let (connection, catalog) = fixture();
        let row = synthesize_on(&catalog, &connection, "products").unwrap();

        assert_eq!(row.get("product_id"), Some(&Value::from("PROD001")));
        assert_eq!(row.get("name"), Some(&Value::from("New Product")));
        assert_eq!(row.get("tax_rate"), Some(&Value::F64(18.0)));
    }

    #[test]
    fn cascades_missing_parents_and_adopts_price() {
        let (connection, catalog) = fixture();

        let products = catalog.lookup("products").unwrap();
        let seeded: Record = [
            ("product_id", Value::from("PROD001")),
            ("name", Value::from("Widget")),
            ("unit_price", Value::from(99.5)),
            ("tax_rate", Value::from(18.0)),
        ]
        .into_iter()
        .collect();
        store::insert(&connection, products, &seeded).unwrap();

        let row = synthesize_on(&catalog, &connection, "order_items").unwrap();

        // orders was empty, so a parent order was created on the fly
        assert_eq!(row.get("order_id"), Some(&Value::from("ORD001")));
        assert_eq!(row.get("line_no"), Some(&Value::I64(1)));
        assert_eq!(row.get("product_id"), Some(&Value::from("PROD001")));
        assert_eq!(row.get("unit_price"), Some(&Value::F64(99.5)));

        let orders = store::list(&connection, catalog.lookup("orders").unwrap()).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].get("status"), Some(&Value::from("Pending")));
    }

    #[test]
    fn sequence_continues_per_parent() {
        let (connection, catalog) = fixture();
        let items = catalog.lookup("order_items").unwrap();

        let first = synthesize_on(&catalog, &connection, "order_items").unwrap();
        store::insert(&connection, items, &first).unwrap();
        let second = synthesize_on(&catalog, &connection, "order_items").unwrap();

        assert_eq!(second.get("order_id"), first.get("order_id"));
        assert_eq!(second.get("line_no"), Some(&Value::I64(2)));
    }

    #[test]
    fn nullable_fk_stays_null_when_parent_table_is_empty() {
        let mut builder = Catalog::builder();
        builder
            .table("quotations")
            .id_prefix("QUO")
            .column(Col::text("quotation_id"))
            .primary_key(["quotation_id"]);
        builder
            .table("orders")
            .id_prefix("ORD")
            .column(Col::text("order_id"))
            .column(Col::text("quotation_id"))
            .primary_key(["order_id"])
            .foreign_key("quotation_id", "quotations", "quotation_id");
        let catalog = builder.build().unwrap();

        let connection = Connection::in_memory();
        connection.create_tables(&catalog).unwrap();

        let row = synthesize_on(&catalog, &connection, "orders").unwrap();
        assert_eq!(row.get("quotation_id"), Some(&Value::Null));
        // and nothing was cascaded into quotations
        let quotations = catalog.lookup("quotations").unwrap();
        assert!(store::list(&connection, quotations).unwrap().is_empty());
    }

    #[test]
    fn mutual_required_foreign_keys_are_reported_as_a_cycle() {
        let mut builder = Catalog::builder();
        builder
            .table("a")
            .column(Col::text("a_id"))
            .column(Col::text("b_id").not_null())
            .primary_key(["a_id"])
            .foreign_key("b_id", "b", "b_id");
        builder
            .table("b")
            .column(Col::text("b_id"))
            .column(Col::text("a_id").not_null())
            .primary_key(["b_id"])
            .foreign_key("a_id", "a", "a_id");
        let catalog = builder.build().unwrap();

        let connection = Connection::in_memory();
        connection.create_tables(&catalog).unwrap();

        let err = synthesize_on(&catalog, &connection, "a").unwrap_err();
        assert!(err.is_synthesis());
        assert!(err.to_string().contains("a -> b -> a"));
    }

    #[test]
    fn integer_key_counts_up() {
        let mut builder = Catalog::builder();
        builder
            .table("counters")
            .column(Col::integer("counter_id"))
            .column(Col::text("label"))
            .primary_key(["counter_id"]);
        let catalog = builder.build().unwrap();
        let connection = Connection::in_memory();
        connection.create_tables(&catalog).unwrap();

        let row = synthesize_on(&catalog, &connection, "counters").unwrap();
        assert_eq!(row.get("counter_id"), Some(&Value::I64(1)));

        let counters = catalog.lookup("counters").unwrap();
        store::insert(&connection, counters, &row).unwrap();
        let row = synthesize_on(&catalog, &connection, "counters").unwrap();
        assert_eq!(row.get("counter_id"), Some(&Value::I64(2)));
    }

    #[test]
    fn humanizes_singular_table_names() {
        assert_eq!(humanized_singular("products"), "Product");
        assert_eq!(humanized_singular("order_items"), "Order Item");
        assert_eq!(humanized_singular("customers"), "Customer");
    }
}
