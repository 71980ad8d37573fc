use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::path::{PathStep, parse_path};
use crate::top_level::{TopLevel, classify};
use crate::vars::Interpolator;

/// One user-authored rule binding a source row column to a target
/// document path. Immutable after compilation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Name of the source row column. May reference variables.
    pub incoming_name: String,
    /// Dot-notation path into the target document. May be empty; may
    /// contain bracket groups. May reference variables.
    #[serde(default)]
    pub doc_path: String,
    /// When true, `incoming_name` is appended as the final path segment;
    /// when false, `doc_path` already identifies the leaf.
    #[serde(default)]
    pub append_incoming_name: bool,
    /// When true, the string cell value is parsed as a document literal
    /// and spliced in.
    #[serde(default)]
    pub value_is_json: bool,
    /// Participates in the query half of updates/upserts.
    #[serde(default)]
    pub is_match_field: bool,
    /// Modifier update operator (`$set`, `$push`, `$inc`, …) or `N/A`.
    /// May reference variables. Only consulted by the modifier builder.
    #[serde(default)]
    pub modifier_op: String,
    #[serde(default)]
    pub modifier_policy: ModifierPolicy,
}

/// When a modifier operation applies, relative to whether the row's match
/// query finds an existing record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierPolicy {
    #[default]
    #[serde(rename = "Insert&Update")]
    InsertAndUpdate,
    Insert,
    Update,
}

/// A mapping with variables substituted and its path compiled to steps.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledMapping {
    pub incoming_name: String,
    /// Interpolated raw path. The modifier builder buckets on the string
    /// form; the insert builder walks `steps`.
    pub doc_path: String,
    pub steps: Vec<PathStep>,
    pub append_incoming_name: bool,
    pub value_is_json: bool,
    pub is_match_field: bool,
    /// Interpolated operator; `None` when empty or `N/A`.
    pub modifier_op: Option<String>,
    pub modifier_policy: ModifierPolicy,
}

impl FieldMapping {
    /// Interpolate variables and compile the document path.
    pub fn compile(&self, interp: &dyn Interpolator) -> Result<CompiledMapping, SchemaError> {
        let incoming_name = interp.interpolate(&self.incoming_name);
        let doc_path = interp.interpolate(&self.doc_path);

        if doc_path.is_empty() && !self.append_incoming_name {
            return Err(SchemaError::MissingLeafName(incoming_name));
        }

        let steps = parse_path(&doc_path)?;

        let modifier_op = match interp.interpolate(&self.modifier_op) {
            op if op.is_empty() || op == "N/A" => None,
            op => Some(op),
        };

        Ok(CompiledMapping {
            incoming_name,
            doc_path,
            steps,
            append_incoming_name: self.append_incoming_name,
            value_is_json: self.value_is_json,
            is_match_field: self.is_match_field,
            modifier_op,
            modifier_policy: self.modifier_policy,
        })
    }
}

/// A full mapping set, compiled once per stream and shared (immutably)
/// across row workers.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSchema {
    pub mappings: Vec<CompiledMapping>,
    pub top_level: TopLevel,
}

/// Compile a mapping set and classify its top-level structure.
///
/// An inconsistent top level (some paths rooted at an object, some at an
/// array — or no mappings at all) is a hard error here, before any row
/// is processed.
pub fn compile_mappings(
    fields: &[FieldMapping],
    interp: &dyn Interpolator,
) -> Result<CompiledSchema, SchemaError> {
    let mappings = fields
        .iter()
        .map(|f| f.compile(interp))
        .collect::<Result<Vec<_>, _>>()?;

    let top_level = classify(&mappings);
    if top_level == TopLevel::Inconsistent {
        return Err(SchemaError::InconsistentTopLevel);
    }

    Ok(CompiledSchema {
        mappings,
        top_level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vars::{NoVars, Variables};

    fn mapping(incoming: &str, path: &str, append: bool) -> FieldMapping {
        FieldMapping {
            incoming_name: incoming.into(),
            doc_path: path.into(),
            append_incoming_name: append,
            ..FieldMapping::default()
        }
    }

    #[test]
    fn compiles_path_and_flags() {
        let compiled = mapping("field1", "a.b[0]", true).compile(&NoVars).unwrap();
        assert_eq!(compiled.incoming_name, "field1");
        assert_eq!(
            compiled.steps,
            vec![
                PathStep::Key("a".into()),
                PathStep::Key("b".into()),
                PathStep::Index(0),
            ]
        );
        assert_eq!(compiled.modifier_op, None);
    }

    #[test]
    fn interpolates_before_parsing() {
        let mut vars = Variables::new();
        vars.set("ROOT", "orders").set("OP", "$inc");
        let field = FieldMapping {
            incoming_name: "qty".into(),
            doc_path: "${ROOT}.count".into(),
            modifier_op: "${OP}".into(),
            ..FieldMapping::default()
        };
        let compiled = field.compile(&vars).unwrap();
        assert_eq!(compiled.doc_path, "orders.count");
        assert_eq!(
            compiled.steps,
            vec![PathStep::Key("orders".into()), PathStep::Key("count".into())]
        );
        assert_eq!(compiled.modifier_op, Some("$inc".into()));
    }

    #[test]
    fn na_operator_compiles_to_none() {
        let mut field = mapping("f", "a", false);
        field.modifier_op = "N/A".into();
        assert_eq!(field.compile(&NoVars).unwrap().modifier_op, None);
    }

    #[test]
    fn empty_path_without_append_is_rejected() {
        let err = mapping("f", "", false).compile(&NoVars).unwrap_err();
        assert_eq!(err, SchemaError::MissingLeafName("f".into()));
    }

    #[test]
    fn empty_path_with_append_is_a_root_leaf() {
        let compiled = mapping("f", "", true).compile(&NoVars).unwrap();
        assert!(compiled.steps.is_empty());
    }

    #[test]
    fn mapping_set_with_mixed_roots_fails_compile() {
        let fields = vec![mapping("f1", "a.b", true), mapping("f2", "[0].c", true)];
        let err = compile_mappings(&fields, &NoVars).unwrap_err();
        assert_eq!(err, SchemaError::InconsistentTopLevel);
    }

    #[test]
    fn consistent_set_records_top_level() {
        let fields = vec![mapping("f1", "a.b", true), mapping("f2", "a.c", true)];
        let schema = compile_mappings(&fields, &NoVars).unwrap();
        assert_eq!(schema.top_level, TopLevel::Record);
        assert_eq!(schema.mappings.len(), 2);
    }

    #[test]
    fn config_round_trips_through_serde() {
        let field = FieldMapping {
            incoming_name: "qty".into(),
            doc_path: "stats.count".into(),
            modifier_op: "$inc".into(),
            modifier_policy: ModifierPolicy::Insert,
            ..FieldMapping::default()
        };
        let json = serde_json::to_string(&field).unwrap();
        assert!(json.contains("\"Insert\""));
        let back: FieldMapping = serde_json::from_str(&json).unwrap();
        assert_eq!(back, field);
    }
}
