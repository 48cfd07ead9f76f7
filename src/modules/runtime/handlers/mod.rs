//! HTTP request handlers for the portfolio server
//!
//! One handler type per resource. Every handler maps failures through
//! [`error_response`], so database problems surface as a fixed message per
//! operation while validation and lookup failures keep their reason.

mod contacts;
mod health;
mod projects;
mod users;

pub use contacts::ContactsHandler;
pub use health::HealthHandler;
pub use projects::ProjectsHandler;
pub use users::UsersHandler;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use portfolio_core::PortfolioError;
use portfolio_types::{ErrorBody, MessageBody};
use tracing::{error, warn};

/// Unwrap a JSON body, turning extractor rejections into validation errors
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, PortfolioError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| PortfolioError::Validation(rejection.body_text()))
}

/// Map an error to a response; `failure` is the body for database errors
pub(crate) fn error_response(failure: &str, err: PortfolioError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if err.is_error() {
        error!("{}: {}", failure, err);
    } else {
        warn!("{}: {}", failure, err);
    }

    match err {
        PortfolioError::NotFound(message) => (status, Json(MessageBody::new(message))).into_response(),
        PortfolioError::Validation(_) | PortfolioError::NotReady(_) => {
            (status, Json(ErrorBody::new(err.sanitized_message()))).into_response()
        }
        _ => (status, Json(ErrorBody::new(failure))).into_response(),
    }
}
