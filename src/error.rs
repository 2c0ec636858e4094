use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

use crate::booking::BookingError;
use crate::services::{AuthError, CatalogError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Precondition(#[from] BookingError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("Invalid {}", field),
                })
            })
            .collect();
        messages.sort();
        messages.dedup();
        if messages.is_empty() {
            messages.push("Invalid request".to_string());
        }
        AppError::Validation(messages.join("; "))
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Precondition(_) => StatusCode::CONFLICT,
            AppError::Auth(e) => match e {
                AuthError::InvalidCode | AuthError::InvalidCredentials | AuthError::Unauthenticated => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::Forbidden => StatusCode::FORBIDDEN,
                AuthError::Delivery(_) => StatusCode::BAD_GATEWAY,
            },
            AppError::Catalog(e) => match e {
                CatalogError::TheatreNotFound(_)
                | CatalogError::MovieNotFound(_)
                | CatalogError::ShowtimeNotFound(_) => StatusCode::NOT_FOUND,
                CatalogError::Invalid(_) | CatalogError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            },
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {:?}", self);
        } else {
            warn!("Request rejected ({}): {}", status.as_u16(), self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::NotificationError;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(email(message = "Invalid email address"))]
        email: String,
    }

    #[test]
    fn precondition_errors_are_conflicts() {
        let err = AppError::from(BookingError::PaymentUnavailable);
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "This theatre is in demo mode only");
    }

    #[test]
    fn failed_delivery_is_a_bad_gateway() {
        let err = AppError::from(AuthError::Delivery(NotificationError::CircuitOpen));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn validation_messages_are_surfaced() {
        let errors = Probe { email: "nope".into() }.validate().unwrap_err();
        let err = AppError::from(errors);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid email address");
    }

    #[test]
    fn unknown_records_are_not_found() {
        let err = AppError::from(CatalogError::MovieNotFound("movie-9".into()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
