use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of an object-storage listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedObject {
    pub key: Option<String>,
    pub size: Option<i64>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl ListedObject {
    pub fn new(key: impl Into<String>, size: i64, last_modified: DateTime<Utc>) -> Self {
        Self {
            key: Some(key.into()),
            size: Some(size),
            last_modified: Some(last_modified),
        }
    }
}

/// A single page returned by a paginated listing call.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub objects: Vec<ListedObject>,
    pub next_continuation_token: Option<String>,
}
