//! Request body and query-string schemas

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Query string for `GET /contacts`
///
/// `page` is kept as a raw string so that unparseable values fall back to
/// the first page instead of rejecting the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactsQuery {
    #[serde(default)]
    pub page: Option<String>,
}

/// Body of `POST /contacts`: any JSON object of form fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewContact(pub Map<String, Value>);

impl NewContact {
    /// The submitted fields
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

fn default_role() -> String {
    "user".to_string()
}

/// Body of `POST /users`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    /// Role returned by the role lookup, `user` when not supplied
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewUser {
    /// Flatten into a single JSON object
    pub fn into_map(self) -> Map<String, Value> {
        let mut map = self.extra;
        map.insert("email".to_string(), Value::String(self.email));
        map.insert("role".to_string(), Value::String(self.role));
        map
    }
}

/// Body of `POST /projects`: any JSON object describing the project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewProject(pub Map<String, Value>);

impl NewProject {
    /// The submitted fields
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// Body of `PUT /projects/:id`: the fields to `$set` on the project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectFields(pub Map<String, Value>);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_contact_accepts_any_object() {
        let contact: NewContact = serde_json::from_value(json!({
            "subject": "Hire",
            "phone": "555-0100"
        }))
        .unwrap();
        let map = contact.into_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("subject"), Some(&json!("Hire")));

        let empty: NewContact = serde_json::from_value(json!({})).unwrap();
        assert!(empty.0.is_empty());
    }

    #[test]
    fn test_new_contact_must_be_an_object() {
        assert!(serde_json::from_value::<NewContact>(json!("hello")).is_err());
        assert!(serde_json::from_value::<NewContact>(json!([{ "name": "Ada" }])).is_err());
    }

    #[test]
    fn test_new_project_needs_no_title() {
        let project: NewProject =
            serde_json::from_value(json!({ "name": "Site", "url": "https://x" })).unwrap();
        assert_eq!(project.into_map().get("url"), Some(&json!("https://x")));
    }

    #[test]
    fn test_new_user_role_defaults_to_user() {
        let user: NewUser = serde_json::from_value(json!({ "email": "a@b.io" })).unwrap();
        assert_eq!(user.role, "user");

        let user: NewUser =
            serde_json::from_value(json!({ "email": "a@b.io", "role": "admin" })).unwrap();
        assert_eq!(user.into_map().get("role"), Some(&json!("admin")));
    }

    #[test]
    fn test_project_fields_is_a_plain_object() {
        let fields: ProjectFields =
            serde_json::from_value(json!({ "title": "New", "stars": 3 })).unwrap();
        assert_eq!(fields.0.len(), 2);
        assert!(serde_json::from_value::<ProjectFields>(json!([1, 2])).is_err());
    }

    #[test]
    fn test_contacts_query_page_is_optional() {
        let query: ContactsQuery = serde_json::from_value(json!({})).unwrap();
        assert!(query.page.is_none());
    }
}
