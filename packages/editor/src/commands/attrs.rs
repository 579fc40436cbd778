use super::{applied, not_applicable, Call, Draft, Handled};
use crate::context::{nearest, nearest_where, textblocks};
use folio_model::Attrs;
use folio_schema::{ArgBinding, Schema};
use serde_json::Value;

/// Selected textblocks of the owner type, otherwise the nearest ancestor of
/// it
pub fn update_attributes(call: &Call, draft: &mut Draft, binding: &ArgBinding) -> Handled {
    let Some(owner) = call.owner else {
        return not_applicable();
    };
    let changes = call.bind(binding)?;

    let schema = draft.schema();
    let doc = draft.doc();
    let mut targets: Vec<Vec<usize>> = textblocks(schema, doc, &draft.selection)
        .into_iter()
        .filter(|path| doc.node_at(path).is_some_and(|node| node.kind == owner))
        .collect();
    if targets.is_empty() {
        targets.extend(nearest(doc, &draft.selection, owner));
    }
    if targets.is_empty() {
        return not_applicable();
    }

    for path in targets {
        draft.tr.update_attrs(&path, &changes)?;
    }
    applied()
}

pub fn set_global_attribute(call: &Call, draft: &mut Draft, key: &str, types: &[String], allowed: &[Value]) -> Handled {
    let bound = call.bind(&ArgBinding::Value(key.to_string()))?;
    let value = bound.get(key).cloned().unwrap_or(Value::Null);
    if !allowed.is_empty() && !allowed.contains(&value) {
        return not_applicable();
    }
    apply_global(draft, key, types, |_, _| value.clone())
}

pub fn reset_global_attribute(draft: &mut Draft, key: &str, types: &[String]) -> Handled {
    apply_global(draft, key, types, |schema, kind| {
        schema
            .node_type(kind)
            .and_then(|node_type| node_type.definition.attribute(key))
            .map_or(Value::Null, |spec| spec.default.clone())
    })
}

fn apply_global<F>(draft: &mut Draft, key: &str, types: &[String], value: F) -> Handled
where
    F: Fn(&Schema, &str) -> Value,
{
    let schema = draft.schema();
    let doc = draft.doc();
    let declares = |kind: &str| {
        types.iter().any(|t| t == kind)
            && schema
                .node_type(kind)
                .is_some_and(|node_type| node_type.definition.attribute(key).is_some())
    };

    let mut targets: Vec<(Vec<usize>, String)> = textblocks(schema, doc, &draft.selection)
        .into_iter()
        .filter_map(|path| {
            let kind = doc.node_at(&path)?.kind.clone();
            declares(&kind).then_some((path, kind))
        })
        .collect();
    if targets.is_empty() {
        if let Some(path) = nearest_where(doc, &draft.selection, |node| declares(&node.kind)) {
            let kind = doc.node_at(&path).map(|node| node.kind.clone()).unwrap_or_default();
            targets.push((path, kind));
        }
    }
    if targets.is_empty() {
        return not_applicable();
    }

    for (path, kind) in targets {
        let mut changes = Attrs::new();
        changes.insert(key.to_string(), value(schema, &kind));
        draft.tr.update_attrs(&path, &changes)?;
    }
    applied()
}
