//! Row structs for the persisted tables.
//!
//! Each submodule contains a `FromRow` struct matching the database row and
//! the conversion into the matching `pathwise_core` domain type.

pub mod assessment;
pub mod course;
pub mod roadmap;
