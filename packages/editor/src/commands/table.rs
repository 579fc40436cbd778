use super::blocks::insert_block;
use super::{applied, not_applicable, Call, Draft, Failure, Handled};
use crate::context::{child_path, nearest, selection_near};
use crate::transform::split_path;
use folio_model::{Attrs, Node, Selection};
use folio_schema::{Schema, TableTypes};
use serde_json::Value;

const DEFAULT_ROWS: u64 = 3;
const DEFAULT_COLS: u64 = 3;
pub const MAX_DIMENSION: u64 = 100;

fn dimension(args: &Value, key: &str, default: u64) -> Result<usize, Failure> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default as usize),
        Some(value) => match value.as_u64() {
            Some(n) if (1..=MAX_DIMENSION).contains(&n) => Ok(n as usize),
            _ => Err(Failure::Args(format!("`{}` must be an integer from 1 to {}", key, MAX_DIMENSION))),
        },
    }
}

fn row(schema: &Schema, types: &TableTypes, cell_type: &str, cols: usize) -> Result<Node, Failure> {
    let cells = (0..cols)
        .map(|_| schema.create_and_fill(cell_type, &Attrs::new()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(schema.node(&types.row, &Attrs::new(), cells)?)
}

/// `{rows, cols, withHeaderRow}`, defaulting to a 3×3 table with a header
pub fn insert_table(call: &Call, draft: &mut Draft, types: &TableTypes) -> Handled {
    let schema = draft.schema();
    let rows = dimension(call.args, "rows", DEFAULT_ROWS)?;
    let cols = dimension(call.args, "cols", DEFAULT_COLS)?;
    let header = call.args.get("withHeaderRow").and_then(Value::as_bool).unwrap_or(true);

    let rows = (0..rows)
        .map(|index| {
            let cell_type = if index == 0 && header { &types.header } else { &types.cell };
            row(schema, types, cell_type, cols)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let table = schema.node(&types.table, &Attrs::new(), rows)?;

    match insert_block(draft, table)? {
        Some(path) => {
            draft.selection = selection_near(schema, draft.doc(), &path);
            applied()
        }
        None => not_applicable(),
    }
}

/// New row of plain cells after the row holding the selection
pub fn add_row_after(draft: &mut Draft, types: &TableTypes) -> Handled {
    let schema = draft.schema();
    let Some(path) = nearest(draft.doc(), &draft.selection, &types.row) else {
        return not_applicable();
    };
    let (table, index) = split_path(&path)?;
    let cols = draft.tr.node(&path)?.content.len().max(1);

    let new_row = row(schema, types, &types.cell, cols)?;
    draft.tr.insert(table, index + 1, vec![new_row])?;
    draft.selection = Selection::cursor(child_path(&child_path(&child_path(table, index + 1), 0), 0), 0);
    if draft.selection.validate(draft.doc()).is_err() {
        draft.selection = selection_near(schema, draft.doc(), &child_path(table, index + 1));
    }
    applied()
}

/// Remove the row holding the selection; removing the last row removes the
/// table
pub fn delete_row(draft: &mut Draft, types: &TableTypes) -> Handled {
    let schema = draft.schema();
    let Some(path) = nearest(draft.doc(), &draft.selection, &types.row) else {
        return not_applicable();
    };
    let (table, _) = split_path(&path)?;
    let rows = draft.tr.node(table)?.content.len();

    let removed = if rows <= 1 { table.to_vec() } else { path.clone() };
    let (parent, _) = split_path(&removed)?;
    draft.tr.remove(&removed)?;
    draft.tr.fill(parent)?;
    draft.selection = selection_near(schema, draft.doc(), &removed);
    applied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dimension_bounds() {
        assert_eq!(dimension(&json!({}), "rows", DEFAULT_ROWS).unwrap(), 3);
        assert_eq!(dimension(&json!({"rows": 100}), "rows", DEFAULT_ROWS).unwrap(), 100);

        assert!(dimension(&json!({"rows": 0}), "rows", DEFAULT_ROWS).is_err());
        assert!(dimension(&json!({"rows": 101}), "rows", DEFAULT_ROWS).is_err());
        assert!(dimension(&json!({"cols": 1e12}), "cols", DEFAULT_COLS).is_err());
    }
}
