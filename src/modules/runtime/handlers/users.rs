//! User registration and role lookup handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bson::doc;
use portfolio_core::PortfolioError;
use portfolio_types::{Collection, InsertResult, MessageBody, NewUser, RoleResponse};
use serde_json::Value;
use tracing::info;

use super::{error_response, json_body};
use crate::convert::{bson_to_json, document_to_json, json_to_document};
use crate::state::AppState;

const FETCH_FAILED: &str = "Failed to fetch users";
const SAVE_FAILED: &str = "Failed to save user";
const ROLE_FAILED: &str = "Failed to fetch user role";

/// Handler for `/users`
pub struct UsersHandler;

impl UsersHandler {
    /// Handle GET /users
    pub async fn list(State(state): State<AppState>) -> Response {
        match Self::fetch_all(&state).await {
            Ok(users) => (StatusCode::OK, Json(users)).into_response(),
            Err(e) => error_response(FETCH_FAILED, e),
        }
    }

    /// Handle POST /users
    ///
    /// Registration is idempotent per email: a second registration answers
    /// with a message instead of inserting.
    pub async fn register(
        State(state): State<AppState>,
        body: Result<Json<NewUser>, JsonRejection>,
    ) -> Response {
        match Self::insert_if_absent(&state, body).await {
            Ok(Some(result)) => {
                info!("Registered user {}", result.inserted_id);
                (StatusCode::OK, Json(result)).into_response()
            }
            Ok(None) => {
                (StatusCode::OK, Json(MessageBody::new("User already exists"))).into_response()
            }
            Err(e) => error_response(SAVE_FAILED, e),
        }
    }

    /// Handle GET /users/:email
    pub async fn role(State(state): State<AppState>, Path(email): Path<String>) -> Response {
        match Self::find_role(&state, &email).await {
            Ok(role) => (StatusCode::OK, Json(role)).into_response(),
            Err(e) => error_response(ROLE_FAILED, e),
        }
    }

    async fn fetch_all(state: &AppState) -> Result<Vec<Value>, PortfolioError> {
        let store = state.store.get().await?;
        let users = store.find(Collection::Users, None).await?;
        Ok(users.into_iter().map(document_to_json).collect())
    }

    async fn insert_if_absent(
        state: &AppState,
        body: Result<Json<NewUser>, JsonRejection>,
    ) -> Result<Option<InsertResult>, PortfolioError> {
        let fields = state.validator.user(json_body(body)?)?;
        let mut document = json_to_document(fields)?;
        document.insert("createdAt", bson::DateTime::now());

        let store = state.store.get().await?;
        let id = store.insert_unique(Collection::Users, document).await?;
        Ok(id.map(|id| InsertResult::new(bson_to_json(id))))
    }

    async fn find_role(state: &AppState, email: &str) -> Result<RoleResponse, PortfolioError> {
        let store = state.store.get().await?;
        let user = store
            .find_one(Collection::Users, doc! { "email": email })
            .await?
            .ok_or_else(|| PortfolioError::NotFound("User not found".to_string()))?;

        let role = user.get("role").cloned().map_or(Value::Null, bson_to_json);
        Ok(RoleResponse { role })
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{memory_router, send};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_register_then_duplicate() {
        let router = memory_router();
        let body = json!({ "email": "ada@example.com", "name": "Ada" });

        let (status, created) = send(&router, Method::POST, "/users", Some(body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert!(created["insertedId"].is_string());

        let (status, again) = send(&router, Method::POST, "/users", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again, json!({ "message": "User already exists" }));

        let (_, users) = send(&router, Method::GET, "/users", None).await;
        let users = users.as_array().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["email"], json!("ada@example.com"));
        assert!(users[0]["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_concurrent_registrations_insert_once() {
        let router = memory_router();
        let mut tasks = Vec::new();
        for _ in 0..10 {
            let router = router.clone();
            tasks.push(tokio::spawn(async move {
                send(
                    &router,
                    Method::POST,
                    "/users",
                    Some(json!({ "email": "race@example.com" })),
                )
                .await
            }));
        }
        for task in tasks {
            let (status, _) = task.await.unwrap();
            assert_eq!(status, StatusCode::OK);
        }

        let (_, users) = send(&router, Method::GET, "/users", None).await;
        assert_eq!(users.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_role_lookup() {
        let router = memory_router();
        send(
            &router,
            Method::POST,
            "/users",
            Some(json!({ "email": "admin@example.com", "role": "admin" })),
        )
        .await;

        let (status, role) = send(&router, Method::GET, "/users/admin@example.com", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(role, json!({ "role": "admin" }));

        let (status, missing) = send(&router, Method::GET, "/users/ghost@example.com", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(missing, json!({ "message": "User not found" }));
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_email() {
        let router = memory_router();
        let (status, _) = send(
            &router,
            Method::POST,
            "/users",
            Some(json!({ "email": "not an email" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, users) = send(&router, Method::GET, "/users", None).await;
        assert!(users.as_array().unwrap().is_empty());
    }
}
