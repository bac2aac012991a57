
//! Diesel schema and row types for the PostgreSQL backend.

pub mod models;
pub mod schema;
