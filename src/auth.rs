//! Static bearer-token authentication.
//!
//! Every bookmark route expects `Authorization: Bearer <token>` where the
//! token matches `app.api_token` from the config file. Tokens are compared
//! through their SHA-256 digests so the comparison does not depend on how
//! much of the token matched.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};

use crate::error::ApiError;
use crate::handler::AppState;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone)]
pub struct ApiToken {
    digest: [u8; 32],
}

impl ApiToken {
    pub fn new(token: &str) -> Self {
        Self {
            digest: Sha256::digest(token.as_bytes()).into(),
        }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        let candidate: [u8; 32] = Sha256::digest(candidate.as_bytes()).into();
        candidate == self.digest
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiToken(..)")
    }
}

fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn require_api_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .is_some_and(|token| state.token.matches(token));

    if !authorized {
        tracing::warn!(path = %request.uri().path(), "unauthorized request");
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}
