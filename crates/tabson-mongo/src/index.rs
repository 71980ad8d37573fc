use bson::Document;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::IndexError;

/// One index operation from step configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Comma-separated `name[:direction]` tokens; direction is 1 or -1,
    /// default 1. A trailing bracket group on a name is stripped to the
    /// field name itself (`tags[0]` indexes `tags`).
    pub path_to_fields: String,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub sparse: bool,
    /// Drop the index instead of creating it.
    #[serde(default)]
    pub drop: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateIndexOptions {
    pub background: bool,
    pub unique: bool,
    pub sparse: bool,
}

/// Index create/drop operations on the target collection. The write
/// layer owns the real collection handle and implements this.
pub trait IndexOps {
    fn create_index(&self, keys: Document, options: &CreateIndexOptions)
    -> Result<(), IndexError>;
    fn drop_index(&self, keys: Document) -> Result<(), IndexError>;
}

/// Parse a spec's `name[:direction]` tokens into an index key document.
pub fn index_keys(spec: &IndexSpec) -> Result<Document, IndexError> {
    let mut keys = Document::new();

    for token in spec.path_to_fields.split(',') {
        let token = token.trim();
        let (name, direction) = match token.split_once(':') {
            Some((name, dir)) => {
                let direction: i32 = dir
                    .trim()
                    .parse()
                    .map_err(|_| IndexError::BadDirection(token.to_string()))?;
                if direction != 1 && direction != -1 {
                    return Err(IndexError::BadDirection(token.to_string()));
                }
                (name.trim(), direction)
            }
            None => (token, 1),
        };

        let name = match name.find('[') {
            Some(pos) => &name[..pos],
            None => name,
        };
        if name.is_empty() {
            return Err(IndexError::EmptyField(spec.path_to_fields.clone()));
        }
        keys.insert(name, direction);
    }

    Ok(keys)
}

/// Apply index operations to the collection.
///
/// Creates run in the background with the spec's unique/sparse flags.
/// Drops are skipped when the collection was truncated in the current
/// run — the index entries are already gone.
pub fn apply_indexes(
    specs: &[IndexSpec],
    ops: &dyn IndexOps,
    truncated: bool,
) -> Result<(), IndexError> {
    for spec in specs {
        let keys = index_keys(spec)?;

        if spec.drop {
            if truncated {
                info!(index = %spec.path_to_fields, "skipping drop of index on truncated collection");
                continue;
            }
            ops.drop_index(keys)?;
            info!(index = %spec.path_to_fields, "dropped index");
        } else {
            let options = CreateIndexOptions {
                background: true,
                unique: spec.unique,
                sparse: spec.sparse,
            };
            ops.create_index(keys, &options)?;
            info!(
                index = %spec.path_to_fields,
                unique = spec.unique,
                sparse = spec.sparse,
                "created index"
            );
        }
    }
    Ok(())
}
