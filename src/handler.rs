use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRequest, Request},
    response::IntoResponse,
};
use serde::{Serialize, de::DeserializeOwned};

use tracing::info;

use crate::auth::ApiToken;
use crate::db::Database;
use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub token: ApiToken,
}

impl AppState {
    pub fn new(db: Arc<Database>, token: ApiToken) -> Self {
        Self { db, token }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    Json(HealthResponse { status: "ok" })
}

/// JSON body extractor whose rejections come back as `400` in the
/// `{ "error": { "message": ... } }` shape instead of axum's plain text.
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                let message = rejection.body_text();
                tracing::error!("rejected request body: {}", message);
                Err(ApiError::Validation(message))
            }
        }
    }
}
