use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub const NOT_FOUND_MESSAGE: &str = "Bookmark Not Found";
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized request";
const SERVER_ERROR_MESSAGE: &str = "server error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,
    #[error("{}", UNAUTHORIZED_MESSAGE)]
    Unauthorized,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorMessage<'a> {
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct ErrorBody<T> {
    error: T,
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            // 401 is the one error whose body is a bare string.
            ApiError::Unauthorized => (
                status,
                Json(ErrorBody {
                    error: UNAUTHORIZED_MESSAGE,
                }),
            )
                .into_response(),
            ApiError::Internal(err) => {
                tracing::error!(error = %crate::unpack_error(&*err), "request failed");
                (
                    status,
                    Json(ErrorBody {
                        error: ErrorMessage {
                            message: SERVER_ERROR_MESSAGE,
                        },
                    }),
                )
                    .into_response()
            }
            other => {
                let message = other.to_string();
                (
                    status,
                    Json(ErrorBody {
                        error: ErrorMessage { message: &message },
                    }),
                )
                    .into_response()
            }
        }
    }
}
