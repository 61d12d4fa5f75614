use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;

use crate::repository::RepositoryError;
use crate::workflow::transition::DecisionError;

impl ResponseError for DecisionError {
    fn status_code(&self) -> StatusCode {
        match self {
            DecisionError::NotAuthorized { .. } | DecisionError::NotRequester { .. } => {
                StatusCode::FORBIDDEN
            }
            DecisionError::InvalidTransition { .. } => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string(),
            "code": self.code(),
        }))
    }
}

impl ResponseError for RepositoryError {
    fn status_code(&self) -> StatusCode {
        match self {
            RepositoryError::NotFound(_) => StatusCode::NOT_FOUND,
            RepositoryError::Conflict(_) => StatusCode::CONFLICT,
            RepositoryError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            RepositoryError::NotFound(_) => json!({
                "error": self.to_string(),
                "code": "NOT_FOUND",
            }),
            RepositoryError::Conflict(_) => json!({
                "error": "The request was changed by someone else, reload and try again",
                "code": "CONFLICT",
            }),
            RepositoryError::Backend(e) => {
                tracing::error!(error = %e, "Repository failure");
                json!({
                    "error": "Internal Server Error",
                    "code": "INTERNAL",
                })
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
