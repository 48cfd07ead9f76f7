//! Project handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bson::doc;
use portfolio_core::PortfolioError;
use portfolio_types::{
    Collection, DeleteResult, InsertResult, NewProject, ProjectFields, UpdateResult,
};
use serde_json::Value;
use tracing::info;

use super::{error_response, json_body};
use crate::connectors::UpdateOutcome;
use crate::convert::{bson_to_json, document_to_json, json_to_document, parse_object_id};
use crate::state::AppState;

const FETCH_FAILED: &str = "Failed to fetch projects";
const SAVE_FAILED: &str = "Failed to save project";
const UPDATE_FAILED: &str = "Failed to update project";
const DELETE_FAILED: &str = "Failed to delete project";
const PUBLISH_FAILED: &str = "Failed to publish project";

fn update_result(outcome: UpdateOutcome) -> UpdateResult {
    UpdateResult::new(outcome.matched, outcome.modified)
}

/// Handler for `/projects`
pub struct ProjectsHandler;

impl ProjectsHandler {
    /// Handle GET /projects
    pub async fn list(State(state): State<AppState>) -> Response {
        match Self::fetch_all(&state).await {
            Ok(projects) => (StatusCode::OK, Json(projects)).into_response(),
            Err(e) => error_response(FETCH_FAILED, e),
        }
    }

    /// Handle POST /projects
    pub async fn create(
        State(state): State<AppState>,
        body: Result<Json<NewProject>, JsonRejection>,
    ) -> Response {
        match Self::insert(&state, body).await {
            Ok(result) => {
                info!("Created project {}", result.inserted_id);
                (StatusCode::CREATED, Json(result)).into_response()
            }
            Err(e) => error_response(SAVE_FAILED, e),
        }
    }

    /// Handle PUT /projects/:id
    pub async fn update(
        State(state): State<AppState>,
        Path(id): Path<String>,
        body: Result<Json<ProjectFields>, JsonRejection>,
    ) -> Response {
        match Self::set_fields(&state, &id, body).await {
            Ok(result) => (StatusCode::OK, Json(result)).into_response(),
            Err(e) => error_response(UPDATE_FAILED, e),
        }
    }

    /// Handle DELETE /projects/:id
    pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Response {
        match Self::remove(&state, &id).await {
            Ok(result) => {
                info!("Deleted {} project(s) with id {}", result.deleted_count, id);
                (StatusCode::OK, Json(result)).into_response()
            }
            Err(e) => error_response(DELETE_FAILED, e),
        }
    }

    /// Handle PUT /projects/publish/:id
    ///
    /// Only `published` is touched; every other field keeps its value.
    pub async fn publish(State(state): State<AppState>, Path(id): Path<String>) -> Response {
        match Self::mark_published(&state, &id).await {
            Ok(result) => {
                info!("Published project {} (matched {})", id, result.matched_count);
                (StatusCode::OK, Json(result)).into_response()
            }
            Err(e) => error_response(PUBLISH_FAILED, e),
        }
    }

    async fn fetch_all(state: &AppState) -> Result<Vec<Value>, PortfolioError> {
        let store = state.store.get().await?;
        let projects = store.find(Collection::Projects, None).await?;
        Ok(projects.into_iter().map(document_to_json).collect())
    }

    async fn insert(
        state: &AppState,
        body: Result<Json<NewProject>, JsonRejection>,
    ) -> Result<InsertResult, PortfolioError> {
        let fields = state.validator.new_project(json_body(body)?)?;
        let document = json_to_document(fields)?;

        let store = state.store.get().await?;
        let id = store.insert_one(Collection::Projects, document).await?;
        Ok(InsertResult::new(bson_to_json(id)))
    }

    async fn set_fields(
        state: &AppState,
        id: &str,
        body: Result<Json<ProjectFields>, JsonRejection>,
    ) -> Result<UpdateResult, PortfolioError> {
        let id = parse_object_id(id)?;
        let fields = state.validator.project_fields(json_body(body)?)?;
        let fields = json_to_document(fields)?;

        let store = state.store.get().await?;
        let outcome = store.update_one(Collection::Projects, id, fields).await?;
        Ok(update_result(outcome))
    }

    async fn remove(state: &AppState, id: &str) -> Result<DeleteResult, PortfolioError> {
        let id = parse_object_id(id)?;
        let store = state.store.get().await?;
        let deleted = store.delete_one(Collection::Projects, id).await?;
        Ok(DeleteResult::new(deleted))
    }

    async fn mark_published(state: &AppState, id: &str) -> Result<UpdateResult, PortfolioError> {
        let id = parse_object_id(id)?;
        let store = state.store.get().await?;
        let outcome = store
            .update_one(Collection::Projects, id, doc! { "published": true })
            .await?;
        Ok(update_result(outcome))
    }
}
