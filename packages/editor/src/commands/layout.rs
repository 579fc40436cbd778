//! Column containers: inserting them pre-filled and changing their width.

use super::blocks::insert_block;
use super::{applied, map_selection, not_applicable, relocate, Call, Draft, Failure, Handled};
use crate::context::{child_path, nearest};
use folio_model::{Attrs, Node, Selection};
use folio_schema::Schema;
use serde_json::Value;

pub const MAX_COLUMNS: u64 = 12;

/// Column count from `3`, `{"columns": 3}` or, when `fallback` is given,
/// `null`; at most [`MAX_COLUMNS`]
fn column_count(args: &Value, key: &str, fallback: Option<usize>) -> Result<usize, Failure> {
    let raw = match args {
        Value::Object(object) => object.get(key).unwrap_or(&Value::Null),
        other => other,
    };
    let count = match (raw, fallback) {
        (Value::Null, Some(fallback)) => Some(fallback as u64),
        (value, _) => value.as_u64(),
    };
    match count {
        Some(count) if (1..=MAX_COLUMNS).contains(&count) => Ok(count as usize),
        _ => Err(Failure::Args(format!("`{}` must be an integer from 1 to {}", key, MAX_COLUMNS))),
    }
}

/// A column holding one empty default textblock
fn empty_column(schema: &Schema, column_type: &str) -> Result<Node, Failure> {
    match schema.default_textblock() {
        Some(textblock) => {
            let block = schema.create_and_fill(textblock, &Attrs::new())?;
            Ok(schema.node(column_type, &Attrs::new(), vec![block])?)
        }
        None => Ok(schema.create_and_fill(column_type, &Attrs::new())?),
    }
}

pub fn insert_columns(
    call: &Call,
    draft: &mut Draft,
    node_type: &str,
    column_type: &str,
    count_key: &str,
    default_count: usize,
) -> Handled {
    let schema = draft.schema();
    let count = column_count(call.args, count_key, Some(default_count))?;
    let columns = (0..count)
        .map(|_| empty_column(schema, column_type))
        .collect::<Result<Vec<_>, _>>()?;

    let mut attrs = Attrs::new();
    attrs.insert(count_key.to_string(), Value::from(count));
    let container = schema.node(node_type, &attrs, columns)?;

    match insert_block(draft, container)? {
        Some(path) => {
            draft.selection = Selection::cursor(child_path(&child_path(&path, 0), 0), 0);
            applied()
        }
        None => not_applicable(),
    }
}

/// Set the column count of the enclosing container. New columns are empty;
/// the blocks of removed columns move to the end of the last kept column.
pub fn resize_columns(call: &Call, draft: &mut Draft, node_type: &str, column_type: &str, count_key: &str) -> Handled {
    let schema = draft.schema();
    let count = column_count(call.args, count_key, None)?;
    let Some(path) = nearest(draft.doc(), &draft.selection, node_type) else {
        return not_applicable();
    };
    let container = draft.tr.node(&path)?.clone();
    let current = container.content.len();

    let mut columns = container.content.clone();
    let mut moved = Vec::new();
    if count > current {
        for _ in current..count {
            columns.push(empty_column(schema, column_type)?);
        }
    } else if count < current {
        let removed: Vec<Node> = columns.drain(count..).collect();
        let mut offset = columns[count - 1].content.len();
        for (index, removed) in removed.into_iter().enumerate() {
            moved.push((count + index, offset));
            offset += removed.content.len();
            columns[count - 1].content.extend(removed.content);
        }
    }

    draft.tr.set_content(&path, columns)?;
    let mut attrs = Attrs::new();
    attrs.insert(count_key.to_string(), Value::from(count));
    draft.tr.update_attrs(&path, &attrs)?;

    draft.selection = map_selection(schema, draft.doc(), &draft.selection, &path, |p| {
        relocate(p, &path, count, current.saturating_sub(count), 0, |relative| {
            let (_, offset) = moved.iter().find(|(column, _)| *column == relative[0])?;
            let block = *relative.get(1)?;
            let mut out = vec![count - 1, offset + block];
            out.extend_from_slice(&relative[2..]);
            Some(out)
        })
    });
    applied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_count_shapes() {
        assert_eq!(column_count(&json!(3), "columns", Some(2)).unwrap(), 3);
        assert_eq!(column_count(&json!({"columns": 4}), "columns", None).unwrap(), 4);
        assert_eq!(column_count(&Value::Null, "columns", Some(2)).unwrap(), 2);

        assert!(column_count(&json!(0), "columns", Some(2)).is_err());
        assert!(column_count(&Value::Null, "columns", None).is_err());
        assert!(column_count(&json!("three"), "columns", None).is_err());

        assert_eq!(column_count(&json!(MAX_COLUMNS), "columns", None).unwrap(), 12);
        assert!(column_count(&json!(1_000_000_000_000u64), "columns", Some(2)).is_err());
    }
}
