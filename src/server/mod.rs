//! REST API server for the athlete registry.

pub mod accounts;
pub mod db;
pub mod error;
pub mod records;
pub mod routes;
pub mod sessions;

pub use routes::{router, AppState};
