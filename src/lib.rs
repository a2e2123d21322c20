//! Goal Tracker Library
//!
//! Goals, their dated tasks, and the HTTP API over them. Exported for the
//! binary and for integration tests.

pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod types;
