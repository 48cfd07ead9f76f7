//! Contact form handlers

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use portfolio_core::{PageRequest, PortfolioError, CONTACTS_PAGE_SIZE};
use portfolio_types::{Collection, ContactPage, ContactsQuery, InsertResult, NewContact};
use tracing::info;

use super::{error_response, json_body};
use crate::convert::{bson_to_json, document_to_json, json_to_document};
use crate::state::AppState;

const FETCH_FAILED: &str = "Failed to fetch contacts";
const SAVE_FAILED: &str = "Failed to save contact";

/// Handler for `/contacts`
pub struct ContactsHandler;

impl ContactsHandler {
    /// Handle GET /contacts?page=N
    pub async fn list(State(state): State<AppState>, Query(query): Query<ContactsQuery>) -> Response {
        match Self::fetch_page(&state, query).await {
            Ok(page) => {
                info!(
                    "Served contacts page {}/{} ({} of {})",
                    page.page,
                    page.total_pages,
                    page.contacts.len(),
                    page.total
                );
                (StatusCode::OK, Json(page)).into_response()
            }
            Err(e) => error_response(FETCH_FAILED, e),
        }
    }

    /// Handle POST /contacts
    pub async fn create(
        State(state): State<AppState>,
        body: Result<Json<NewContact>, JsonRejection>,
    ) -> Response {
        match Self::save(&state, body).await {
            Ok(result) => {
                info!("Saved contact {}", result.inserted_id);
                (StatusCode::CREATED, Json(result)).into_response()
            }
            Err(e) => error_response(SAVE_FAILED, e),
        }
    }

    async fn fetch_page(state: &AppState, query: ContactsQuery) -> Result<ContactPage, PortfolioError> {
        let request = PageRequest::from_query(query.page.as_deref(), CONTACTS_PAGE_SIZE)?;
        let store = state.store.get().await?;

        let total = store.count(Collection::Contacts).await?;
        let contacts = store
            .find(Collection::Contacts, Some(request))
            .await?
            .into_iter()
            .map(document_to_json)
            .collect();

        Ok(ContactPage {
            total,
            page: request.page(),
            total_pages: request.total_pages(total),
            contacts,
        })
    }

    async fn save(
        state: &AppState,
        body: Result<Json<NewContact>, JsonRejection>,
    ) -> Result<InsertResult, PortfolioError> {
        let fields = state.validator.contact(json_body(body)?)?;
        let mut document = json_to_document(fields)?;
        document.insert("date", bson::DateTime::now());

        let store = state.store.get().await?;
        let id = store.insert_one(Collection::Contacts, document).await?;
        Ok(InsertResult::new(bson_to_json(id)))
    }
}
