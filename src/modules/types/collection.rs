//! Logical collection names

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Collections exposed by the document store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Messages submitted through the contact form
    Contacts,
    /// Registered users
    Users,
    /// Portfolio projects
    Projects,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "contacts" => Ok(Collection::Contacts),
            "users" => Ok(Collection::Users),
            "projects" => Ok(Collection::Projects),
            _ => Err(format!("Unknown collection: {}", s)),
        }
    }
}

impl Collection {
    /// Returns all collections
    pub fn all() -> &'static [Collection] {
        &[Collection::Contacts, Collection::Users, Collection::Projects]
    }

    /// Name of the collection in the database
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Contacts => "contacts",
            Collection::Users => "users",
            Collection::Projects => "projects",
        }
    }

    /// Field that must be unique across the collection, if any
    pub fn unique_key(&self) -> Option<&'static str> {
        match self {
            Collection::Users => Some("email"),
            Collection::Contacts | Collection::Projects => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_from_str() {
        assert_eq!(Collection::from_str("contacts").unwrap(), Collection::Contacts);
        assert_eq!(Collection::from_str("Users").unwrap(), Collection::Users);
        assert_eq!(Collection::from_str("projects").unwrap(), Collection::Projects);
        assert!(Collection::from_str("orders").is_err());
    }

    #[test]
    fn test_collection_display_round_trips_name() {
        for collection in Collection::all() {
            assert_eq!(collection.to_string(), collection.name());
        }
    }

    #[test]
    fn test_only_users_have_unique_key() {
        assert_eq!(Collection::Users.unique_key(), Some("email"));
        assert_eq!(Collection::Contacts.unique_key(), None);
        assert_eq!(Collection::Projects.unique_key(), None);
    }
}
