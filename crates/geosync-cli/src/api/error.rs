use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use geosync_core::AppError;
use serde::Serialize;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    App(#[from] AppError),

    /// Query string that does not deserialize, e.g. `?skip=abc`.
    #[error("{0}")]
    BadQuery(#[from] QueryRejection),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::App(err) => match err {
                AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                AppError::NotFound(_) => StatusCode::NOT_FOUND,
                AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
                AppError::DatabaseError(_)
                | AppError::SerializationError(_)
                | AppError::InvalidUrl(_)
                | AppError::Generic(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadQuery(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.status_code();
        if code.is_server_error() {
            error!("Request failed with {}: {}", code.as_u16(), self);
        }
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (code, Json(body)).into_response()
    }
}
