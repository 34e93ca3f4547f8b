use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::ValidationErrors;
use crate::record::Record;
use crate::schema::{ObjectParser, Schema};

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 120;
pub const DETAILS_MIN_CHARS: usize = 10;
pub const DETAILS_MAX_CHARS: usize = 2000;

/// Name of the counter bumped by a like.
pub const LIKES_FIELD: &str = "likes";

/// A community request for a leak on some topic.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeakRequest {
    pub id: Uuid,
    pub title: String,
    pub details: String,
    pub likes: u64,
    #[serde(serialize_with = "crate::timestamp::serialize")]
    pub created_at: DateTime<Utc>,
}

impl Schema for LeakRequest {
    fn parse_at(value: &Value, path: &str) -> Result<Self, ValidationErrors> {
        let mut p = ObjectParser::new(value, path)?;
        let id = p.uuid("id");
        let title = p.text("title", TITLE_MIN_CHARS, Some(TITLE_MAX_CHARS));
        let details = p.text("details", DETAILS_MIN_CHARS, Some(DETAILS_MAX_CHARS));
        let likes = p.non_negative_int(LIKES_FIELD);
        let created_at = p.timestamp("createdAt");
        match (id, title, details, likes, created_at) {
            (Some(id), Some(title), Some(details), Some(likes), Some(created_at)) if p.is_clean() => {
                Ok(LeakRequest { id, title, details, likes, created_at })
            }
            _ => Err(p.into_errors()),
        }
    }
}

impl Record for LeakRequest {
    const COLLECTION: &'static str = "leak_requests";

    fn id(&self) -> Uuid { self.id }
    fn created_at(&self) -> DateTime<Utc> { self.created_at }
}

/// Creation body: trimmed title and details.
#[derive(Clone, Debug, PartialEq)]
pub struct CreateLeakRequest {
    pub title: String,
    pub details: String,
}

impl Schema for CreateLeakRequest {
    fn parse_at(value: &Value, path: &str) -> Result<Self, ValidationErrors> {
        let mut p = ObjectParser::new(value, path)?;
        let title = p.trimmed("title", TITLE_MIN_CHARS, Some(TITLE_MAX_CHARS));
        let details = p.trimmed("details", DETAILS_MIN_CHARS, Some(DETAILS_MAX_CHARS));
        match (title, details) {
            (Some(title), Some(details)) if p.is_clean() => Ok(CreateLeakRequest { title, details }),
            _ => Err(p.into_errors()),
        }
    }
}
