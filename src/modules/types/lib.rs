//! Type definitions for the portfolio server
//!
//! This crate contains the wire types shared across the workspace: request
//! bodies, response bodies, driver-style write results and the logical
//! collection names.

pub mod collection;
pub mod request;
pub mod response;

pub use collection::Collection;
pub use request::{ContactsQuery, NewContact, NewProject, NewUser, ProjectFields};
pub use response::{
    ContactPage, DeleteResult, ErrorBody, HealthResponse, InsertResult, MessageBody, RoleResponse,
    UpdateResult,
};
