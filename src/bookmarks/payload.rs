//! Request bodies accepted by the bookmark handlers, and the rules that turn
//! them into store inputs.

use serde::Deserialize;
use serde_json::Value as JsonValue;
use url::Url;

use super::store::{BookmarkUpdate, NewBookmark};
use crate::error::ApiError;

const MIN_RATING: f64 = 0.0;
const MAX_RATING: f64 = 5.0;

pub const RATING_MESSAGE: &str = "'rating' must be a number between 0 and 5";
pub const URL_MESSAGE: &str = "'url' must be a valid URL";
pub const EMPTY_UPDATE_MESSAGE: &str =
    "Request body must contain either 'title', 'url', 'description', or 'rating'";

/// Body of `POST /api/bookmarks`. Unknown keys are ignored.
///
/// Fields stay untyped until `validate` so that a missing field is reported
/// before a wrongly typed one.
#[derive(Debug, Default, Deserialize)]
pub struct CreateBookmarkPayload {
    pub title: Option<JsonValue>,
    pub url: Option<JsonValue>,
    pub description: Option<JsonValue>,
    pub rating: Option<JsonValue>,
}

/// Body of `PATCH /api/bookmarks/:id`. A key counts as supplied when it is
/// present and not `null`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBookmarkPayload {
    pub title: Option<JsonValue>,
    pub url: Option<JsonValue>,
    pub description: Option<JsonValue>,
    pub rating: Option<JsonValue>,
}

fn required(field: &str) -> ApiError {
    ApiError::validation(format!("'{field}' is required"))
}

fn is_blank(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(s) => s.is_empty(),
        _ => false,
    }
}

fn present(value: Option<JsonValue>) -> Option<JsonValue> {
    value.filter(|value| !is_blank(value))
}

fn supplied(value: Option<JsonValue>) -> Option<JsonValue> {
    value.filter(|value| !value.is_null())
}

fn into_string(field: &str, value: JsonValue) -> Result<String, ApiError> {
    match value {
        JsonValue::String(s) => Ok(s),
        _ => Err(ApiError::validation(format!("'{field}' must be a string"))),
    }
}

fn optional_string(field: &str, value: Option<JsonValue>) -> Result<Option<String>, ApiError> {
    supplied(value).map(|value| into_string(field, value)).transpose()
}

/// Numbers are taken as-is and strings are parsed, so `"3"` is a valid rating.
pub fn parse_rating(value: &JsonValue) -> Result<i32, ApiError> {
    let number = match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if n.fract() == 0.0 && (MIN_RATING..=MAX_RATING).contains(&n) => Ok(n as i32),
        _ => Err(ApiError::validation(RATING_MESSAGE)),
    }
}

/// Absolute `http`/`https` URL with a host.
pub fn is_valid_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}

fn validate_url(candidate: &str) -> Result<(), ApiError> {
    if is_valid_url(candidate) {
        Ok(())
    } else {
        Err(ApiError::validation(URL_MESSAGE))
    }
}

impl CreateBookmarkPayload {
    /// Checks presence (title, url, rating, in that order), then field types,
    /// then the rating range, then the URL.
    pub fn validate(self) -> Result<NewBookmark, ApiError> {
        let title = present(self.title).ok_or_else(|| required("title"))?;
        let url = present(self.url).ok_or_else(|| required("url"))?;
        let rating = present(self.rating).ok_or_else(|| required("rating"))?;

        let title = into_string("title", title)?;
        let url = into_string("url", url)?;
        let description = optional_string("description", self.description)?;

        let rating = parse_rating(&rating)?;
        validate_url(&url)?;

        Ok(NewBookmark {
            title,
            url,
            description,
            rating,
        })
    }
}

impl UpdateBookmarkPayload {
    pub fn validate(self) -> Result<BookmarkUpdate, ApiError> {
        let changes = BookmarkUpdate {
            title: optional_string("title", self.title)?,
            url: optional_string("url", self.url)?,
            description: optional_string("description", self.description)?,
            rating: supplied(self.rating).as_ref().map(parse_rating).transpose()?,
        };

        if changes.is_empty() {
            return Err(ApiError::validation(EMPTY_UPDATE_MESSAGE));
        }
        if let Some(url) = &changes.url {
            validate_url(url)?;
        }

        Ok(changes)
    }
}
