//! Shared building blocks for the Herald notification backend:
//! configuration, database pool, error type, and persisted row types.

pub mod config;
pub mod db;
pub mod error;
pub mod types;
