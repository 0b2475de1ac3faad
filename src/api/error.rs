use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::error::EngineError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Engine(EngineError::ClaimInProgress) => StatusCode::CONFLICT,
            ApiError::Engine(EngineError::Configuration(_)) => StatusCode::BAD_REQUEST,
            ApiError::Engine(EngineError::Claim(_))
            | ApiError::Engine(EngineError::HolderFetch(_))
            | ApiError::Engine(EngineError::Payment { .. }) => StatusCode::BAD_GATEWAY,
            ApiError::Engine(EngineError::Persistence(_)) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}
