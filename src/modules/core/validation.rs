//! Request body validation
//!
//! Contacts and projects are free-form objects: only their keys are checked
//! and server-owned fields stripped. Users need a well-formed email.

use once_cell::sync::Lazy;
use portfolio_types::{NewContact, NewProject, NewUser, ProjectFields};
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{PortfolioError, Result};

/// Loose email shape: something@something.tld, no whitespace
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap()
});

/// Fields assigned by the server on contacts
const CONTACT_SERVER_FIELDS: &[&str] = &["_id", "date"];

/// Fields assigned by the server on users
const USER_SERVER_FIELDS: &[&str] = &["_id", "createdAt"];

/// Fields a new project may not carry; `published` is set by the publish action
const PROJECT_SERVER_FIELDS: &[&str] = &["_id", "published"];

/// Validator for request bodies
pub struct RequestValidator;

impl RequestValidator {
    /// Create a new request validator
    pub fn new() -> Self {
        Self
    }

    /// Validate a contact form submission
    pub fn contact(&self, contact: NewContact) -> Result<Map<String, Value>> {
        let mut map = contact.into_map();
        Self::check_keys(&map)?;
        Self::strip(&mut map, CONTACT_SERVER_FIELDS);
        Ok(map)
    }

    /// Validate a user registration
    pub fn user(&self, user: NewUser) -> Result<Map<String, Value>> {
        self.email(&user.email)?;
        Self::require_text("role", &user.role)?;

        let mut map = user.into_map();
        Self::check_keys(&map)?;
        Self::strip(&mut map, USER_SERVER_FIELDS);
        Ok(map)
    }

    /// Validate a new project
    pub fn new_project(&self, project: NewProject) -> Result<Map<String, Value>> {
        let mut map = project.into_map();
        Self::check_keys(&map)?;
        Self::strip(&mut map, PROJECT_SERVER_FIELDS);
        Ok(map)
    }

    /// Validate the fields of a project update
    pub fn project_fields(&self, fields: ProjectFields) -> Result<Map<String, Value>> {
        let map = fields.0;
        if map.is_empty() {
            return Err(PortfolioError::Validation(
                "update must set at least one field".to_string(),
            ));
        }
        if map.contains_key("_id") {
            return Err(PortfolioError::Validation("_id cannot be updated".to_string()));
        }
        Self::check_keys(&map)?;
        Ok(map)
    }

    /// Check that a string looks like an email address
    pub fn email(&self, email: &str) -> Result<()> {
        if EMAIL_PATTERN.is_match(email) {
            Ok(())
        } else {
            Err(PortfolioError::Validation(format!(
                "'{}' is not a valid email address",
                email
            )))
        }
    }

    fn require_text(field: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(PortfolioError::Validation(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Reject keys the store would treat as operators or paths
    fn check_keys(map: &Map<String, Value>) -> Result<()> {
        for key in map.keys() {
            if key.is_empty() || key.starts_with('$') || key.contains('.') {
                return Err(PortfolioError::Validation(format!(
                    "invalid field name '{}'",
                    key
                )));
            }
        }
        Ok(())
    }

    fn strip(map: &mut Map<String, Value>, fields: &[&str]) {
        for field in fields {
            map.remove(*field);
        }
    }
}

impl Default for RequestValidator {
    fn default() -> Self {
        Self::new()
    }
}
