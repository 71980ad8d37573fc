use bson::{Bson, Document};
use indexmap::IndexMap;
use tabson_schema::{
    Cell, CompiledMapping, CompiledSchema, ModifierPolicy, RowMeta, TopLevel, classify, parse_path,
};
use tracing::warn;

use crate::coerce::{cell_for_column, cell_to_bson};
use crate::error::BuildError;
use crate::insert::build_document;
use crate::probe::MatchProbe;
use crate::query::{build_query, flatten_brackets};

/// Build the modifier update document for one row: a document keyed by
/// update operators, `{ "$set": { path: value, … }, "$push": { … }, … }`.
///
/// On a modifier upsert the server materializes the query paths into the
/// newly created document before the operators run. Numeric segments of a
/// query path (`a.0.b`) become literal field names there, which turns `a`
/// into a record and makes a later `$push` against it fail. Match fields
/// therefore contribute only to the query document, never to the modifier
/// update — unlike a plain upsert, where the caller duplicates them into
/// the replacement body.
///
/// When any surviving mapping carries an `Insert` or `Update` apply
/// policy, a single existence probe (limit 1) against `probe` decides
/// which side applies for this row. A null match document counts as
/// insert.
///
/// Returns `Ok(None)` when every surviving value was null (the caller
/// drops the row). Fails with [`BuildError::NoModifierFields`] when no
/// mapping carries a modifier operation at all.
pub fn build_modifier_update(
    schema: &CompiledSchema,
    meta: &RowMeta,
    row: &[Cell],
    probe: &dyn MatchProbe,
) -> Result<Option<Document>, BuildError> {
    // all three buckets are row-local: grouped complex $set arrays,
    // grouped complex $push structures, and primitive leaf writes
    let mut set_arrays: IndexMap<String, Vec<CompiledMapping>> = IndexMap::new();
    let mut push_structures: IndexMap<String, Vec<CompiledMapping>> = IndexMap::new();
    let mut leaf_writes: IndexMap<String, LeafWrite> = IndexMap::new();

    let check_for_match = schema.mappings.iter().any(|m| {
        !m.is_match_field
            && matches!(
                m.modifier_policy,
                ModifierPolicy::Insert | ModifierPolicy::Update
            )
    });

    let mut is_update = false;
    if check_for_match
        && let Some(query) = build_query(&schema.mappings, meta, row)?
    {
        is_update = probe.exists(&query)?;
    }

    let mut have_update_fields = false;
    for mapping in schema.mappings.iter().filter(|m| !m.is_match_field) {
        let Some(op) = mapping.modifier_op.as_deref() else {
            continue;
        };

        if check_for_match {
            if is_update && mapping.modifier_policy == ModifierPolicy::Insert {
                continue;
            }
            if !is_update && mapping.modifier_policy == ModifierPolicy::Update {
                continue;
            }
        }
        have_update_fields = true;

        let cell = cell_for_column(meta, row, &mapping.incoming_name)?;
        if cell.is_null() {
            continue;
        }

        let path = resolve_modifier_path(mapping, op);
        match split_array_path(&path) {
            Some((array_path, array_spec, _)) if op == "$set" => {
                // many mappings may share the array; the whole list value
                // is built once from the bracketed remainder of each path
                set_arrays
                    .entry(array_path.to_string())
                    .or_default()
                    .push(sub_mapping(mapping, array_spec)?);
            }
            Some((array_path, _, after_close)) if op == "$push" => {
                // any index is ignored — $push always appends to the end
                let structure = after_close.strip_prefix('.').unwrap_or(after_close);
                push_structures
                    .entry(array_path.to_string())
                    .or_default()
                    .push(sub_mapping(mapping, structure)?);
            }
            _ => {
                let Some(value) =
                    cell_to_bson(&mapping.incoming_name, cell, mapping.value_is_json)?
                else {
                    continue;
                };
                leaf_writes.insert(
                    flatten_brackets(&path),
                    LeafWrite {
                        op: op.to_string(),
                        value,
                    },
                );
            }
        }
    }

    let mut update = Document::new();

    for (array_path, group) in &set_arrays {
        if let Some(value) = build_document(group, TopLevel::Array, meta, row)? {
            op_entry(&mut update, "$set").insert(array_path.clone(), value);
        }
    }

    for (array_path, group) in &push_structures {
        let top_level = classify(group);
        if let Some(value) = build_document(group, top_level, meta, row)? {
            op_entry(&mut update, "$push").insert(array_path.clone(), value);
        }
    }

    for (path, leaf) in leaf_writes {
        op_entry(&mut update, &leaf.op).insert(path, leaf.value);
    }

    if !have_update_fields {
        return Err(BuildError::NoModifierFields);
    }
    if update.is_empty() {
        return Ok(None);
    }
    Ok(Some(update))
}

struct LeafWrite {
    op: String,
    value: Bson,
}

/// Resolve the dot path a modifier operation is keyed by.
///
/// `$push` appends implicitly, so a trailing bracket group is dropped
/// when the path itself names the leaf. When the incoming name is
/// appended instead, the bracket is kept as authored — warned about,
/// since the resulting key is almost certainly not what was intended.
fn resolve_modifier_path(mapping: &CompiledMapping, op: &str) -> String {
    let mut path = mapping.doc_path.clone();

    if op == "$push" && path.ends_with(']') {
        if mapping.append_incoming_name {
            warn!(
                column = %mapping.incoming_name,
                path = %path,
                "$push path keeps its bracketed tail when the incoming name is appended"
            );
        } else if let Some(open) = path.rfind('[') {
            path.truncate(open);
        }
    }

    if mapping.append_incoming_name {
        if !path.is_empty() {
            path.push('.');
        }
        path.push_str(&mapping.incoming_name);
    }
    path
}

/// Split `a.b[0].c` into `("a.b", "[0].c", ".c")`: the part before the
/// first bracket, the bracketed remainder, and the part after the first
/// closing bracket. `None` when the path has no brackets.
fn split_array_path(path: &str) -> Option<(&str, &str, &str)> {
    let open = path.find('[')?;
    let close = path.find(']')?;
    Some((&path[..open], &path[open..], &path[close + 1..]))
}

/// Rewrite a mapping against a sub-path carved out of its resolved path.
/// The incoming name, if it was to be appended, already is.
fn sub_mapping(parent: &CompiledMapping, sub_path: &str) -> Result<CompiledMapping, BuildError> {
    Ok(CompiledMapping {
        incoming_name: parent.incoming_name.clone(),
        doc_path: sub_path.to_string(),
        steps: parse_path(sub_path)?,
        append_incoming_name: false,
        value_is_json: parent.value_is_json,
        is_match_field: false,
        modifier_op: None,
        modifier_policy: parent.modifier_policy,
    })
}

fn op_entry<'a>(update: &'a mut Document, op: &str) -> &'a mut Document {
    if !update.contains_key(op) {
        update.insert(op, Document::new());
    }
    update
        .get_document_mut(op)
        .expect("operator entries are documents")
}
