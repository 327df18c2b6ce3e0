//! Generic row extraction: run a statement and return every row as a flat
//! JSON object keyed by column name, plus the column names in select order.

use rusqlite::types::ValueRef;
use rusqlite::{Connection, Params};
use serde::de::DeserializeOwned;
use serde_json::{Number, Value};

use crate::error::Result;
use crate::reshape::{self, Row};

/// Rows plus the column names the statement produced.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    pub fields: Vec<String>,
}

impl QueryResult {
    /// Rebuild nested objects from prefix-named columns and deserialize each row.
    pub fn deepen_into<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        let fields = self.fields;
        self.rows
            .iter()
            .map(|row| {
                let deep = reshape::deepen(row, &fields, reshape::DEFAULT_SEPARATOR);
                Ok(serde_json::from_value(Value::Object(deep))?)
            })
            .collect()
    }

    /// Deserialize each flat row as-is.
    pub fn into_records<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        self.rows
            .into_iter()
            .map(|row| Ok(serde_json::from_value(Value::Object(row))?))
            .collect()
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(String::from_utf8_lossy(b).into_owned()),
    }
}

/// Run `sql` with `params` and collect every row.
pub fn query_rows<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<QueryResult> {
    let mut stmt = conn.prepare(sql)?;
    let fields: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut rows = Vec::new();
    let mut cursor = stmt.query(params)?;
    while let Some(row) = cursor.next()? {
        let mut record = Row::new();
        for (idx, field) in fields.iter().enumerate() {
            record.insert(field.clone(), to_json(row.get_ref(idx)?));
        }
        rows.push(record);
    }

    log::debug!("SQLite > {} ({} rows)", sql.trim(), rows.len());
    Ok(QueryResult { rows, fields })
}
