//! ep-api: HTTP API for the Editor Playground
//!
//! Serves the page hosting the editor, stored-session CRUD, the live session
//! relay, and binary previews. Built with axum.

pub mod error;
pub mod handlers;
pub mod page;
pub mod routes;
pub mod server;

pub use error::{ApiError, Result};
pub use server::{AppState, PlaygroundServer, create_router, start_server};
