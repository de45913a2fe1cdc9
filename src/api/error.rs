use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::ledger::error::{ErrorKind, LedgerError};
use crate::ledger::pricing::UnknownOperation;
use crate::middleware::logging::FailedOutcome;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Failed to validate: {0}")]
    ValidationFail(#[from] ValidationErrors),
    #[error(transparent)]
    Operation(#[from] UnknownOperation),
}

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Ledger(err) => match err.kind() {
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, "not_found"),
                ErrorKind::Conflict => (StatusCode::CONFLICT, "conflict"),
                ErrorKind::BusinessRule => (StatusCode::BAD_REQUEST, "business_rule"),
                ErrorKind::Database => (StatusCode::INTERNAL_SERVER_ERROR, "database"),
            },
            ApiError::ValidationFail(_) | ApiError::Operation(_) => {
                (StatusCode::BAD_REQUEST, "validation")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        let message = self.to_string();

        // Database details stay in the logs.
        let public_message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal server error".to_owned()
        } else {
            message.clone()
        };

        let mut response = (
            status,
            Json(json!({
                "error": public_message,
                "kind": kind,
            })),
        )
            .into_response();
        response
            .extensions_mut()
            .insert(FailedOutcome { kind, message });
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::error::{Resource, RuleViolation};
    use sea_orm::DbErr;

    #[test]
    fn maps_kinds_to_statuses() {
        let cases = [
            (
                ApiError::from(LedgerError::not_found(Resource::Cart, "id", 1)),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(LedgerError::AlreadyInCart { cart_id: 1, product_id: 2 }),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::from(LedgerError::StaleCart { cart_id: 1 }),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::from(LedgerError::from(RuleViolation::OutOfStock { product_id: 2 })),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(LedgerError::from(DbErr::Custom("disk".into()))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::from(UnknownOperation("twice".into())),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, status) in cases {
            let response = err.into_response();
            assert_eq!(response.status(), status);
            assert!(response.extensions().get::<FailedOutcome>().is_some());
        }
    }
}
