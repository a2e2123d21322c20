//! HTTP API module.
//!
//! Task CRUD and goal listing over JSON, served by axum.

mod extract;
mod server;

pub use extract::{ValidJson, ValidPath};
pub use server::{
    ApiState, DeleteResponse, ServerHandle, build_router, cors_layer, start_server,
};
