use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::SystemTime};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub slug: String,
    pub path: PathBuf,
    pub title: String,
    pub summary: String,
    pub date: DateTime<Utc>,
    pub modified: Option<DateTime<Utc>>,
    pub category: String,
    pub tags: Vec<String>,
    pub author: Option<Author>,
    pub cover_image: Option<String>,
    pub read_time_minutes: usize,
    pub content: String,
    pub html_content: String,
    #[serde(skip)]
    pub last_modified: Option<SystemTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostMetadata {
    pub title: String,
    pub summary: Option<String>,
    pub date: DateTime<Utc>,
    pub modified: Option<DateTime<Utc>>,
    pub category: String,
    pub tags: Vec<String>,
    pub author: Option<Author>,
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub date: DateTime<Utc>,
    pub date_formatted: String,
    pub category: String,
    pub tags: Vec<String>,
    pub read_time: String,
    pub cover_image: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub date: DateTime<Utc>,
    pub date_formatted: String,
    pub modified: Option<DateTime<Utc>>,
    pub category: String,
    pub tags: Vec<String>,
    pub author: Option<Author>,
    pub cover_image: Option<String>,
    pub read_time: String,
    pub html_content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostsPage {
    pub posts: Vec<PostSummary>,
    pub page: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub slug: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineMonth {
    pub month: u32,
    pub month_name: String,
    pub posts: Vec<PostSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineYear {
    pub year: i32,
    pub count: usize,
    pub months: Vec<TimelineMonth>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

#[derive(Debug, Clone, Default)]
pub struct PostsFilter {
    /// Category slug.
    pub category: Option<String>,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostsConfig {
    pub source_directory: PathBuf,
    pub url_prefix: String,
    pub posts_per_page: usize,
    pub excerpt_length: usize,
    pub refresh_interval_minutes: Option<u64>,
}

impl Default for PostsConfig {
    fn default() -> Self {
        Self {
            source_directory: PathBuf::from("posts"),
            url_prefix: String::from("/posts"),
            posts_per_page: 20,
            excerpt_length: 150,
            refresh_interval_minutes: None,
        }
    }
}
