// ABOUTME: Library root for tagtrim - exposes the cleanup pipeline for testing.
// ABOUTME: The main binary is in main.rs.

pub mod cleanup;
pub mod config;
pub mod error;
pub mod output;
pub mod protect;
pub mod registry;
pub mod retention;
pub mod types;
