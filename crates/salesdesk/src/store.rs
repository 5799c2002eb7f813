//! Schema-checked row access. Every statement is built from the
//! registered table definition: column lists are always explicit and
//! identifiers are always quoted, so a record can never smuggle SQL in
//! through a column name.

use salesdesk_core::schema::Table;
use salesdesk_core::stmt::{Record, Value};
use salesdesk_core::{Error, Result, Storage};

pub(crate) fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

pub(crate) fn list(storage: &dyn Storage, table: &Table) -> Result<Vec<Record>> {
    let columns: Vec<_> = table.columns.iter().map(|c| quote(&c.name)).collect();
    let sql = format!(
        "SELECT {} FROM {}",
        columns.join(", "),
        quote(&table.name)
    );

    let rows = storage.query(&sql, &[])?;
    Ok(rows
        .into_iter()
        .map(|row| {
            table
                .columns
                .iter()
                .map(|c| c.name.clone())
                .zip(row)
                .collect()
        })
        .collect())
}

pub(crate) fn find(storage: &dyn Storage, table: &Table, key: &Record) -> Result<Option<Record>> {
    let (predicate, params) = key_predicate(table, key)?;
    let columns: Vec<_> = table.columns.iter().map(|c| quote(&c.name)).collect();
    let sql = format!(
        "SELECT {} FROM {} WHERE {}",
        columns.join(", "),
        quote(&table.name),
        predicate
    );

    let mut rows = storage.query(&sql, &params)?;
    Ok(rows.pop().map(|row| {
        table
            .columns
            .iter()
            .map(|c| c.name.clone())
            .zip(row)
            .collect()
    }))
}

pub(crate) fn insert(storage: &dyn Storage, table: &Table, record: &Record) -> Result<()> {
    if record.is_empty() {
        return Err(Error::illegal_operation(format!(
            "insert into `{}` supplies no columns",
            table.name
        )));
    }

    let mut columns = Vec::with_capacity(record.len());
    let mut params = Vec::with_capacity(record.len());
    for (name, value) in record.iter() {
        let column = table
            .column(name)
            .ok_or_else(|| Error::unknown_column(&*table.name, name))?;
        columns.push(quote(name));
        params.push(value.clone().coerce(column.ty, name)?);
    }

    let placeholders = vec!["?"; params.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote(&table.name),
        columns.join(", "),
        placeholders
    );
    storage.execute(&sql, &params)?;
    Ok(())
}

pub(crate) fn update(
    storage: &dyn Storage,
    table: &Table,
    key: &Record,
    changes: &Record,
) -> Result<()> {
    if changes.is_empty() {
        return Err(Error::illegal_operation(format!(
            "update of `{}` supplies no columns",
            table.name
        )));
    }

    let (predicate, key_params) = key_predicate(table, key)?;

    let mut sets = Vec::with_capacity(changes.len());
    let mut params = Vec::with_capacity(changes.len() + key_params.len());
    for (name, value) in changes.iter() {
        let column = table
            .column(name)
            .ok_or_else(|| Error::unknown_column(&*table.name, name))?;
        if table.is_primary_key(name) {
            return Err(Error::illegal_operation(format!(
                "primary-key column `{}` of `{}` cannot be updated",
                name, table.name
            )));
        }
        sets.push(format!("{} = ?", quote(name)));
        params.push(value.clone().coerce(column.ty, name)?);
    }
    params.extend(key_params);

    let sql = format!(
        "UPDATE {} SET {} WHERE {}",
        quote(&table.name),
        sets.join(", "),
        predicate
    );
    if storage.execute(&sql, &params)? == 0 {
        return Err(Error::not_found(&*table.name, describe_key(key)));
    }
    Ok(())
}

pub(crate) fn delete(storage: &dyn Storage, table: &Table, key: &Record) -> Result<()> {
    let (predicate, params) = key_predicate(table, key)?;
    let sql = format!("DELETE FROM {} WHERE {}", quote(&table.name), predicate);
    if storage.execute(&sql, &params)? == 0 {
        return Err(Error::not_found(&*table.name, describe_key(key)));
    }
    Ok(())
}

/// Builds the `WHERE` clause addressing exactly one row.
///
/// The key must supply every primary-key column, nothing else, and no
/// nulls. A keyless table cannot be addressed at all.
fn key_predicate(table: &Table, key: &Record) -> Result<(String, Vec<Value>)> {
    if table.primary_key.is_empty() {
        return Err(Error::illegal_operation(format!(
            "table `{}` has no primary key; rows cannot be addressed individually",
            table.name
        )));
    }

    for (name, _) in key.iter() {
        if !table.is_primary_key(name) {
            return Err(Error::illegal_operation(format!(
                "`{}` is not part of the primary key of `{}`",
                name, table.name
            )));
        }
    }

    let mut clauses = Vec::with_capacity(table.primary_key.len());
    let mut params = Vec::with_capacity(table.primary_key.len());
    for column in table.primary_key_columns() {
        let value = key.get(&column.name).ok_or_else(|| {
            Error::illegal_operation(format!(
                "key for table `{}` must supply column `{}`",
                table.name, column.name
            ))
        })?;
        if value.is_null() {
            return Err(Error::illegal_operation(format!(
                "key column `{}` of `{}` must not be null",
                column.name, table.name
            )));
        }
        clauses.push(format!("{} = ?", quote(&column.name)));
        params.push(value.clone().coerce(column.ty, &column.name)?);
    }

    Ok((clauses.join(" AND "), params))
}

fn describe_key(key: &Record) -> String {
    let parts: Vec<_> = key
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect();
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use salesdesk_core::schema::{Catalog, Column};
    use salesdesk_sqlite::Connection;

    fn items_catalog() -> Catalog {
        let mut builder = Catalog::builder();
        builder
            .table("orders")
            .column(Column::text("order_id"))
            .column(Column::text("status").not_null().default_value("Pending"))
            .primary_key(["order_id"]);
        builder
            .table("order_items")
            .column(Column::text("order_id"))
            .column(Column::integer("line_no"))
            .column(Column::integer("quantity").not_null().default_value(1))
            .primary_key(["order_id", "line_no"])
            .foreign_key("order_id", "orders", "order_id");
        builder.build().unwrap()
    }

    fn fixture() -> (Connection, Catalog) {
        let connection = Connection::in_memory();
        let catalog = items_catalog();
        connection.create_tables(&catalog).unwrap();
        (connection, catalog)
    }

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs.iter().cloned().collect()
    }

    #[test]
    fn insert_then_list_preserves_column_order() {
        let (connection, catalog) = fixture();
        let orders = catalog.lookup("orders").unwrap();

        insert(
            &connection,
            orders,
            &record(&[
                ("order_id", Value::from("ORD001")),
                ("status", Value::from("Pending")),
            ]),
        )
        .unwrap();

        let rows = list(&connection, orders).unwrap();
        assert_eq!(rows.len(), 1);
        let columns: Vec<_> = rows[0].columns().collect();
        assert_eq!(columns, ["order_id", "status"]);
    }

    #[test]
    fn insert_rejects_unknown_column() {
        let (connection, catalog) = fixture();
        let orders = catalog.lookup("orders").unwrap();
        let err = insert(
            &connection,
            orders,
            &record(&[("order_ref", Value::from("ORD001"))]),
        )
        .unwrap_err();
        assert!(err.is_unknown_column());
    }

    #[test]
    fn insert_coerces_before_writing() {
        let (connection, catalog) = fixture();
        let items = catalog.lookup("order_items").unwrap();
        insert(
            &connection,
            catalog.lookup("orders").unwrap(),
            &record(&[("order_id", Value::from("ORD001"))]),
        )
        .unwrap();
        insert(
            &connection,
            items,
            &record(&[
                ("order_id", Value::from("ORD001")),
                ("line_no", Value::from("1")),
                ("quantity", Value::from(" 2 ")),
            ]),
        )
        .unwrap();

        let rows = list(&connection, items).unwrap();
        assert_eq!(rows[0].get("quantity"), Some(&Value::I64(2)));
    }

    #[test]
    fn update_refuses_key_columns() {
        let (connection, catalog) = fixture();
        let orders = catalog.lookup("orders").unwrap();
        insert(
            &connection,
            orders,
            &record(&[("order_id", Value::from("ORD001"))]),
        )
        .unwrap();

        let err = update(
            &connection,
            orders,
            &record(&[("order_id", Value::from("ORD001"))]),
            &record(&[("order_id", Value::from("ORD999"))]),
        )
        .unwrap_err();
        assert!(err.is_illegal_operation());
    }

    #[test]
    fn update_missing_row_is_not_found() {
        let (connection, catalog) = fixture();
        let orders = catalog.lookup("orders").unwrap();
        let err = update(
            &connection,
            orders,
            &record(&[("order_id", Value::from("ORD404"))]),
            &record(&[("status", Value::from("Shipped"))]),
        )
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn delete_requires_full_composite_key() {
        let (connection, catalog) = fixture();
        let items = catalog.lookup("order_items").unwrap();

        let err = delete(
            &connection,
            items,
            &record(&[("order_id", Value::from("ORD001"))]),
        )
        .unwrap_err();
        assert!(err.is_illegal_operation());
    }

    #[test]
    fn delete_removes_exactly_the_addressed_row() {
        let (connection, catalog) = fixture();
        let orders = catalog.lookup("orders").unwrap();
        let items = catalog.lookup("order_items").unwrap();
        insert(
            &connection,
            orders,
            &record(&[("order_id", Value::from("ORD001"))]),
        )
        .unwrap();
        for line in [1i64, 2] {
            insert(
                &connection,
                items,
                &record(&[
                    ("order_id", Value::from("ORD001")),
                    ("line_no", Value::from(line)),
                ]),
            )
            .unwrap();
        }

        delete(
            &connection,
            items,
            &record(&[
                ("order_id", Value::from("ORD001")),
                ("line_no", Value::from(1)),
            ]),
        )
        .unwrap();

        let rows = list(&connection, items).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("line_no"), Some(&Value::I64(2)));
    }

    #[test]
    fn find_returns_none_for_missing_row() {
        let (connection, catalog) = fixture();
        let orders = catalog.lookup("orders").unwrap();
        let found = find(
            &connection,
            orders,
            &record(&[("order_id", Value::from("ORD404"))]),
        )
        .unwrap();
        assert_eq!(found, None);
    }
}
