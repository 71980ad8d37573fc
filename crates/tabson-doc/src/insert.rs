use bson::{Bson, Document};
use tabson_schema::{Cell, CompiledMapping, CompiledSchema, PathStep, RowMeta, SchemaError, TopLevel};

use crate::coerce::{cell_for_column, cell_to_bson};
use crate::error::BuildError;

/// Build the full insert/upsert document for one row.
///
/// Walks every non-match mapping through its compiled steps, creating
/// nested objects and arrays on demand. Mapping order defines resolution
/// order: the first mapping to create a node fixes its kind for the rest
/// of the row, and a later mapping that disagrees fails the row.
///
/// Null cells are skipped entirely — they materialize nothing, not even
/// intermediate nodes. Returns `Ok(None)` when every relevant cell was
/// null (the caller drops the row).
pub fn row_to_document(
    schema: &CompiledSchema,
    meta: &RowMeta,
    row: &[Cell],
) -> Result<Option<Bson>, BuildError> {
    build_document(&schema.mappings, schema.top_level, meta, row)
}

/// As [`row_to_document`], but over an explicit mapping subset and root
/// kind. The modifier builder uses this to assemble the grouped values it
/// `$set`s and `$push`es.
pub fn build_document(
    mappings: &[CompiledMapping],
    top_level: TopLevel,
    meta: &RowMeta,
    row: &[Cell],
) -> Result<Option<Bson>, BuildError> {
    let mut root = match top_level {
        TopLevel::Record => Bson::Document(Document::new()),
        TopLevel::Array => Bson::Array(Vec::new()),
        TopLevel::Inconsistent => return Err(SchemaError::InconsistentTopLevel.into()),
    };

    let mut wrote_any = false;
    for mapping in mappings.iter().filter(|m| !m.is_match_field) {
        let cell = cell_for_column(meta, row, &mapping.incoming_name)?;
        let Some(value) = cell_to_bson(&mapping.incoming_name, cell, mapping.value_is_json)?
        else {
            continue;
        };
        write_leaf(&mut root, mapping, value)?;
        wrote_any = true;
    }

    if !wrote_any {
        return Ok(None);
    }
    Ok(Some(root))
}

/// The container kind a step needs to find (or create) beneath it.
#[derive(Clone, Copy, PartialEq)]
enum NodeKind {
    Object,
    List,
}

fn write_leaf(root: &mut Bson, mapping: &CompiledMapping, value: Bson) -> Result<(), BuildError> {
    let steps = &mapping.steps;
    if steps.is_empty() && !mapping.append_incoming_name {
        return Err(SchemaError::MissingLeafName(mapping.incoming_name.clone()).into());
    }

    let mut cur = root;
    for (pos, step) in steps.iter().enumerate() {
        let terminal = pos + 1 == steps.len();
        if terminal && !mapping.append_incoming_name {
            return write_at_step(cur, step, &mapping.doc_path, value);
        }
        let child = match steps.get(pos + 1) {
            Some(PathStep::Key(_)) => NodeKind::Object,
            Some(PathStep::Index(_)) | Some(PathStep::Append) => NodeKind::List,
            // terminal step with the incoming name appended: the leaf
            // lives in an object under that name
            None => NodeKind::Object,
        };
        cur = descend(cur, step, child, &mapping.doc_path)?;
    }

    let Bson::Document(doc) = cur else {
        return Err(BuildError::NotARecord(mapping.doc_path.clone()));
    };
    doc.insert(mapping.incoming_name.clone(), value);
    Ok(())
}

/// Resolve one step, materializing a missing child of the required kind.
fn descend<'a>(
    cur: &'a mut Bson,
    step: &PathStep,
    child: NodeKind,
    path: &str,
) -> Result<&'a mut Bson, BuildError> {
    match step {
        PathStep::Key(name) => {
            let Bson::Document(doc) = cur else {
                return Err(BuildError::NotARecord(path.to_string()));
            };
            if !doc.contains_key(name) {
                doc.insert(name.clone(), empty_node(child));
            }
            let node = doc.get_mut(name).expect("just inserted");
            check_kind(node, child, name)?;
            Ok(node)
        }
        PathStep::Index(i) => {
            let Bson::Array(items) = cur else {
                return Err(BuildError::NotAnArray(path.to_string()));
            };
            if *i >= items.len() {
                items.resize(*i + 1, Bson::Null);
            }
            if items[*i] == Bson::Null {
                items[*i] = empty_node(child);
            }
            let node = &mut items[*i];
            check_kind(node, child, path)?;
            Ok(node)
        }
        PathStep::Append => {
            let Bson::Array(items) = cur else {
                return Err(BuildError::NotAnArray(path.to_string()));
            };
            items.push(empty_node(child));
            Ok(items.last_mut().expect("just pushed"))
        }
    }
}

/// Terminal write when the last path step itself names the target.
fn write_at_step(
    cur: &mut Bson,
    step: &PathStep,
    path: &str,
    value: Bson,
) -> Result<(), BuildError> {
    match step {
        PathStep::Key(name) => {
            let Bson::Document(doc) = cur else {
                return Err(BuildError::NotARecord(path.to_string()));
            };
            doc.insert(name.clone(), value);
        }
        PathStep::Index(i) => {
            let Bson::Array(items) = cur else {
                return Err(BuildError::NotAnArray(path.to_string()));
            };
            if *i >= items.len() {
                items.resize(*i + 1, Bson::Null);
            }
            items[*i] = value;
        }
        PathStep::Append => {
            let Bson::Array(items) = cur else {
                return Err(BuildError::NotAnArray(path.to_string()));
            };
            items.push(value);
        }
    }
    Ok(())
}

fn empty_node(kind: NodeKind) -> Bson {
    match kind {
        NodeKind::Object => Bson::Document(Document::new()),
        NodeKind::List => Bson::Array(Vec::new()),
    }
}

fn check_kind(node: &Bson, expected: NodeKind, at: &str) -> Result<(), BuildError> {
    match (expected, node) {
        (NodeKind::Object, Bson::Document(_)) | (NodeKind::List, Bson::Array(_)) => Ok(()),
        (NodeKind::Object, _) => Err(BuildError::NotARecord(at.to_string())),
        (NodeKind::List, _) => Err(BuildError::NotAnArray(at.to_string())),
    }
}
