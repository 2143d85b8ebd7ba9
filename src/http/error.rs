use crate::error::StoreError;
use crate::store::EntityKind;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{} not found", .0.label())]
    NotFound(EntityKind),

    #[error("{0}")]
    BadRequest(String),

    /// `context` is the only text the client sees; `source` is logged
    #[error("{context}")]
    Internal {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    /// For `map_err`: wraps a store failure under a client-facing message
    pub fn internal(context: &'static str) -> impl FnOnce(StoreError) -> ApiError {
        move |source| ApiError::Internal { context, source }
    }
}

#[derive(Debug, Serialize)]
struct ErrBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal { context, source } => {
                error!(error = %source, "{}", context);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (code, Json(ErrBody { error: self.to_string() })).into_response()
    }
}
