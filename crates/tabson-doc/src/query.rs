use bson::Document;
use tabson_schema::{Cell, CompiledMapping, RowMeta};

use crate::coerce::{cell_for_column, cell_to_bson};
use crate::error::BuildError;

/// Build the match document for an update/upsert from the match-field
/// mappings.
///
/// Query documents reach into embedded structure with dot notation, so
/// bracket groups are flattened (`a[0].b` becomes `a.0.b`). Null match
/// cells are ignored; `Ok(None)` means no match cell had a value and the
/// caller should drop the row.
pub fn build_query(
    mappings: &[CompiledMapping],
    meta: &RowMeta,
    row: &[Cell],
) -> Result<Option<Document>, BuildError> {
    let mut query = Document::new();
    let mut have_match_fields = false;
    let mut have_values = false;

    for mapping in mappings.iter().filter(|m| m.is_match_field) {
        have_match_fields = true;

        let cell = cell_for_column(meta, row, &mapping.incoming_name)?;
        let Some(value) = cell_to_bson(&mapping.incoming_name, cell, mapping.value_is_json)?
        else {
            continue;
        };
        have_values = true;

        let mut path = mapping.doc_path.clone();
        if mapping.append_incoming_name {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(&mapping.incoming_name);
        }
        query.insert(flatten_brackets(&path), value);
    }

    if !have_match_fields {
        return Err(BuildError::NoMatchFields);
    }
    if !have_values {
        return Ok(None);
    }
    Ok(Some(query))
}

/// Rewrite bracketed array markers to dot notation: `a[0].b[1]` → `a.0.b.1`.
pub(crate) fn flatten_brackets(path: &str) -> String {
    let flattened = path.replace('[', ".").replace(']', "");
    flattened.trim_start_matches('.').to_string()
}
