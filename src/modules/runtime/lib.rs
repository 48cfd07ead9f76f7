//! Runtime server for the portfolio backend
//!
//! This crate provides the HTTP server, the document store connectors and
//! the request handlers for contacts, users and projects.

pub mod connectors;
pub mod convert;
pub mod handlers;
pub mod server;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use connectors::{DocumentStore, MemoryStore, MongoStore, StoreManager};
pub use handlers::{ContactsHandler, HealthHandler, ProjectsHandler, UsersHandler};
pub use server::Runtime;
pub use state::AppState;
