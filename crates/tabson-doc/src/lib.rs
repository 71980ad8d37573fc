mod coerce;
mod error;
mod insert;
mod modifier;
mod probe;
mod query;

pub use coerce::cell_to_bson;
pub use error::BuildError;
pub use insert::{build_document, row_to_document};
pub use modifier::build_modifier_update;
pub use probe::MatchProbe;
pub use query::build_query;
