use salesdesk_core::schema::{ColumnDefault, Table, Type};
use salesdesk_core::stmt::Value;

/// Renders a `CREATE TABLE IF NOT EXISTS` statement for one registered
/// table. Computed defaults have no SQL counterpart and are left to the
/// synthesizer.
pub(crate) fn create_table(table: &Table) -> String {
    let mut parts: Vec<String> = table
        .columns
        .iter()
        .map(|column| {
            let mut part = format!("{} {}", quote(&column.name), sql_type(column.ty));
            if !column.nullable {
                part.push_str(" NOT NULL");
            }
            if let Some(ColumnDefault::Value(value)) = &column.default {
                part.push_str(" DEFAULT ");
                part.push_str(&sql_literal(value));
            }
            part
        })
        .collect();

    if !table.primary_key.is_empty() {
        let key: Vec<_> = table
            .primary_key_columns()
            .map(|column| quote(&column.name))
            .collect();
        parts.push(format!("PRIMARY KEY ({})", key.join(", ")));
    }

    for fk in &table.foreign_keys {
        parts.push(format!(
            "FOREIGN KEY ({}) REFERENCES {} ({})",
            quote(&fk.column),
            quote(&fk.ref_table),
            quote(&fk.ref_column)
        ));
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        quote(&table.name),
        parts.join(",\n  ")
    )
}

fn sql_type(ty: Type) -> &'static str {
    match ty {
        Type::Integer => "INTEGER",
        Type::Real => "REAL",
        Type::Text => "TEXT",
        Type::Date => "DATE",
    }
}

fn sql_literal(value: &Value) -> String {
    match value {
        Value::I64(v) => v.to_string(),
        Value::F64(v) => {
            if v.fract() == 0.0 {
                format!("{v:.1}")
            } else {
                v.to_string()
            }
        }
        Value::String(v) => format!("'{}'", v.replace('\'', "''")),
        Value::Null => "NULL".to_string(),
    }
}

/// Double-quotes an identifier for SQLite.
pub(crate) fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}
