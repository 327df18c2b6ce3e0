//! Flat-row to nested-object reshaping.
//!
//! SQL views expose nested entities as prefix-named columns
//! (`input_id`, `input_name`, `utensil1_waitTimeInMillis`, ...). These helpers
//! drop SQL nulls from such rows and rebuild the nesting encoded in the
//! column names.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// A flat row keyed by column name.
pub type Row = Map<String, Value>;

/// Separator used by the storage views to encode nesting.
pub const DEFAULT_SEPARATOR: &str = "_";

/// Keep only the entries of `fields` whose value in `row` is not SQL null.
///
/// Falsy values (`0`, `false`, `""`) are kept. Fields absent from `row` are
/// dropped, as are keys of `row` not listed in `fields`.
pub fn filter_null_values<S: AsRef<str>>(row: &Row, fields: &[S]) -> Row {
    fields
        .iter()
        .filter_map(|field| {
            let field = field.as_ref();
            match row.get(field) {
                Some(Value::Null) | None => None,
                Some(value) => Some((field.to_string(), value.clone())),
            }
        })
        .collect()
}

/// [`filter_null_values`] over every key of `row`.
pub fn strip_null_values(row: &Row) -> Row {
    let fields: Vec<&String> = row.keys().collect();
    filter_null_values(row, &fields)
}

/// Intermediate tree; a branch always wins over a leaf at the same path.
enum Node {
    Leaf(Value),
    Branch(BTreeMap<String, Node>),
}

impl Node {
    fn insert(branch: &mut BTreeMap<String, Node>, path: &[&str], value: Value) {
        let Some((head, rest)) = path.split_first() else {
            return;
        };

        if rest.is_empty() {
            match branch.get(*head) {
                Some(Node::Branch(_)) => {
                    log::debug!("Dropping leaf '{}': an object already lives at that path", head);
                }
                _ => {
                    branch.insert(head.to_string(), Node::Leaf(value));
                }
            }
            return;
        }

        let child = branch
            .entry(head.to_string())
            .or_insert_with(|| Node::Branch(BTreeMap::new()));
        if let Node::Leaf(_) = child {
            log::debug!("Replacing leaf '{}' with a nested object", head);
            *child = Node::Branch(BTreeMap::new());
        }
        if let Node::Branch(children) = child {
            Node::insert(children, rest, value);
        }
    }

    fn into_value(self) -> Value {
        match self {
            Node::Leaf(value) => value,
            Node::Branch(children) => Value::Object(
                children
                    .into_iter()
                    .map(|(key, node)| (key, node.into_value()))
                    .collect(),
            ),
        }
    }
}

/// Rebuild the nested object encoded by `separator`-joined field names.
///
/// `deepen({"input_id": 1, "input_name": "egg", "steps": 2}, all, "_")`
/// yields `{"input": {"id": 1, "name": "egg"}, "steps": 2}`. Fields absent
/// from `row` are skipped; an empty separator disables nesting.
pub fn deepen<S: AsRef<str>>(row: &Row, fields: &[S], separator: &str) -> Row {
    let mut root = BTreeMap::new();

    for field in fields {
        let field = field.as_ref();
        let Some(value) = row.get(field) else {
            continue;
        };
        let path: Vec<&str> = if separator.is_empty() {
            vec![field]
        } else {
            field.split(separator).collect()
        };
        Node::insert(&mut root, &path, value.clone());
    }

    match Node::Branch(root).into_value() {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

/// [`deepen`] over every key of `row` with [`DEFAULT_SEPARATOR`].
pub fn deepen_all(row: &Row) -> Row {
    let fields: Vec<&String> = row.keys().collect();
    deepen(row, &fields, DEFAULT_SEPARATOR)
}
