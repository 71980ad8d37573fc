mod error;
mod index;
mod replset;

pub use error::IndexError;
pub use index::{CreateIndexOptions, IndexOps, IndexSpec, apply_indexes, index_keys};
pub use replset::{
    DEFAULT_PORT, LOCAL_DB, REPL_SET_COLLECTION, REPL_SET_LAST_ERROR_MODES, REPL_SET_SETTINGS,
    last_error_modes,
};
