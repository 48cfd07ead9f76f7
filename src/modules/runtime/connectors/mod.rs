//! Document store connectors
//!
//! This module provides the store trait over the logical collections, the
//! MongoDB and in-memory implementations, and the deferred handle the HTTP
//! handlers resolve the store through.

mod manager;
mod memory;
mod mongodb;
mod traits;

pub use manager::StoreManager;
pub use memory::MemoryStore;
pub use mongodb::MongoStore;
pub use traits::{DocumentStore, UpdateOutcome};
