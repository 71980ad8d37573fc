mod cell;
mod error;
mod mapping;
mod path;
mod top_level;
mod vars;

pub use cell::{Cell, RowMeta};
pub use error::SchemaError;
pub use mapping::{CompiledMapping, CompiledSchema, FieldMapping, ModifierPolicy, compile_mappings};
pub use path::{PathStep, parse_path};
pub use top_level::{TopLevel, classify};
pub use vars::{Interpolator, NoVars, Variables};
