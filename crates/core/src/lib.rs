//! Domain types, validation rules and the local image store shared by the
//! database and API crates.

pub mod coercion;
pub mod error;
pub mod image_store;
pub mod status;
pub mod submission;
pub mod types;
