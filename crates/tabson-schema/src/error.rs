use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A document path failed to parse. Carries the offending path and a reason.
    PathSyntax { path: String, reason: String },
    /// A mapping has an empty path and does not append the incoming name,
    /// so there is no field name to write the value under.
    MissingLeafName(String),
    /// Some mapping paths start with an object and some with an array.
    InconsistentTopLevel,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathSyntax { path, reason } => {
                write!(f, "invalid document path '{path}': {reason}")
            }
            Self::MissingLeafName(incoming) => write!(
                f,
                "mapping for '{incoming}' has no path and does not use the incoming name as the field name"
            ),
            Self::InconsistentTopLevel => write!(
                f,
                "mapping paths disagree on the top-level document structure (object vs array)"
            ),
        }
    }
}

impl std::error::Error for SchemaError {}
