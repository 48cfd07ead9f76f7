//! Domain models for the portfolio server

mod config;
mod pagination;

pub use config::{AppConfig, DatabaseConfig, LogFormat, PoolConfig, ServerConfig, StoreBackend};
pub use pagination::{PageRequest, CONTACTS_PAGE_SIZE};
