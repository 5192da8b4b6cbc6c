//! SQLite persistence for oracle settings

mod db;
mod models;

pub use db::Database;
pub use models::*;
