//! CSV import of the records this crate consumes but does not own: farms and
//! daily production logs.

pub mod farm_reader;
pub mod production_reader;
