//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Reads take
//! `&PgPool`; writes take `&mut PgConnection` so the data manager can run
//! them inside one transaction.

pub mod area_repo;
pub mod image_repo;
pub mod level_repo;
pub mod pereval_repo;
pub mod user_repo;

pub use area_repo::AreaRepo;
pub use image_repo::ImageRepo;
pub use level_repo::LevelRepo;
pub use pereval_repo::PerevalRepo;
pub use user_repo::UserRepo;
