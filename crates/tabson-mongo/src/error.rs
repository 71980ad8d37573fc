use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum IndexError {
    /// An index field token was empty.
    EmptyField(String),
    /// An index direction was not 1 or -1.
    BadDirection(String),
    /// The underlying collection operation failed.
    Store(String),
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyField(spec) => write!(f, "empty index field in '{spec}'"),
            Self::BadDirection(token) => {
                write!(f, "index direction in '{token}' must be 1 or -1")
            }
            Self::Store(msg) => write!(f, "index operation failed: {msg}"),
        }
    }
}

impl std::error::Error for IndexError {}
