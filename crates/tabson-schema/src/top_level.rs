use crate::mapping::CompiledMapping;
use crate::path::PathStep;

/// The kind of the root node of produced documents.
///
/// Derived from the first step of every mapping path: paths that start
/// with a field name (or are empty) want an object root, paths that
/// start with a bracket group want an array root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopLevel {
    Record,
    Array,
    /// Mappings disagree on the root kind. Surfaced once as a hard error
    /// before any row is processed.
    Inconsistent,
}

/// Classify the top-level structure implied by a set of compiled mappings.
pub fn classify(mappings: &[CompiledMapping]) -> TopLevel {
    let mut records = 0usize;
    let mut arrays = 0usize;

    for mapping in mappings {
        match mapping.steps.first() {
            Some(PathStep::Index(_)) | Some(PathStep::Append) => arrays += 1,
            Some(PathStep::Key(_)) | None => records += 1,
        }
    }

    match (records, arrays) {
        (0, a) if a > 0 => TopLevel::Array,
        (r, 0) if r > 0 => TopLevel::Record,
        _ => TopLevel::Inconsistent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::FieldMapping;
    use crate::vars::NoVars;

    fn compiled(path: &str) -> CompiledMapping {
        FieldMapping {
            incoming_name: "f".into(),
            doc_path: path.into(),
            append_incoming_name: true,
            ..FieldMapping::default()
        }
        .compile(&NoVars)
        .unwrap()
    }

    #[test]
    fn all_object_paths_are_record() {
        let mappings = vec![compiled("a.b"), compiled("c"), compiled("")];
        assert_eq!(classify(&mappings), TopLevel::Record);
    }

    #[test]
    fn all_array_paths_are_array() {
        let mappings = vec![compiled("[0].a"), compiled("[1]")];
        assert_eq!(classify(&mappings), TopLevel::Array);
    }

    #[test]
    fn mixed_paths_are_inconsistent() {
        let mappings = vec![compiled("a.b"), compiled("[0].c")];
        assert_eq!(classify(&mappings), TopLevel::Inconsistent);
    }

    #[test]
    fn empty_set_is_inconsistent() {
        assert_eq!(classify(&[]), TopLevel::Inconsistent);
    }
}
