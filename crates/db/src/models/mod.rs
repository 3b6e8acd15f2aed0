//! Row models for the pereval tables.

pub mod area;
pub mod image;
pub mod level;
pub mod pereval;
pub mod user;
