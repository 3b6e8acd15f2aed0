pub mod health;
pub mod pereval;
