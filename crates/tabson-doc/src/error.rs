use std::fmt;

use tabson_schema::SchemaError;

#[derive(Debug, Clone, PartialEq)]
pub enum BuildError {
    Schema(SchemaError),
    /// An existing node on the path is not an object but the remaining
    /// path descends into one.
    NotARecord(String),
    /// An existing node on the path is not an array but the path indexes
    /// into one.
    NotAnArray(String),
    /// No mapping is flagged as a match field.
    NoMatchFields,
    /// No mapping carries a modifier operation after policy filtering.
    NoModifierFields,
    /// The cell type cannot be stored in a document. Carries the column name.
    UnsupportedCellType(String),
    /// A JSON-literal cell failed to parse.
    InvalidJson { column: String, reason: String },
    /// A mapping names a column the row does not have.
    ColumnNotFound(String),
    /// The existence probe against the target collection failed.
    Probe(String),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(e) => write!(f, "schema error: {e}"),
            Self::NotARecord(path) => {
                write!(f, "field '{path}' exists but is not a record")
            }
            Self::NotAnArray(path) => {
                write!(f, "field '{path}' exists but is not an array")
            }
            Self::NoMatchFields => write!(f, "no fields specified for the match query"),
            Self::NoModifierFields => {
                write!(f, "no fields to update specified for the modifier operation")
            }
            Self::UnsupportedCellType(column) => {
                write!(f, "cannot store value of column '{column}' in a document")
            }
            Self::InvalidJson { column, reason } => {
                write!(f, "invalid JSON value in column '{column}': {reason}")
            }
            Self::ColumnNotFound(name) => write!(f, "incoming column not found: {name}"),
            Self::Probe(msg) => write!(f, "existence probe failed: {msg}"),
        }
    }
}

impl std::error::Error for BuildError {}

impl From<SchemaError> for BuildError {
    fn from(e: SchemaError) -> Self {
        Self::Schema(e)
    }
}
