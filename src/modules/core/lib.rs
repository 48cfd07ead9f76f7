//! Core domain logic for the portfolio server
//!
//! This crate contains configuration, pagination, request validation and
//! the error type shared by the runtime and the CLI.

pub mod domain;
pub mod error;
pub mod validation;

pub use domain::*;
pub use error::{PortfolioError, Result};
pub use validation::RequestValidator;
