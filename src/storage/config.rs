use super::StorageError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BUCKET: &str = "blog-post";
pub const DEFAULT_BASE_URL: &str = "https://img.waynspace.com";
pub const DEFAULT_PREFIX: &str = "personal-photos/";

/// Object storage settings. Any field left out of the config file is read
/// from the environment when the configuration is resolved.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub account_id: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub bucket: Option<String>,
    pub base_url: Option<String>,
    pub prefix: Option<String>,
}

/// Where photos live and how their public URLs are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub bucket: String,
    pub prefix: String,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStorageConfig {
    pub account_id: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub location: SourceLocation,
}

impl ResolvedStorageConfig {
    pub fn endpoint_url(&self) -> String {
        format!("https://{}.r2.cloudflarestorage.com", self.account_id)
    }
}

impl StorageConfig {
    pub fn resolve(&self) -> Result<ResolvedStorageConfig, StorageError> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve against an arbitrary variable lookup instead of the process
    /// environment.
    pub fn resolve_with<F>(&self, lookup: F) -> Result<ResolvedStorageConfig, StorageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |value: &Option<String>, var: &str| {
            non_blank(value.clone())
                .or_else(|| non_blank(lookup(var)))
                .ok_or_else(|| StorageError::Configuration(format!("{} is not set", var)))
        };

        let account_id = required(&self.account_id, "CF_ACCOUNT_ID")?;
        let access_key_id = required(&self.access_key_id, "R2_ACCESS_KEY_ID")?;
        let secret_access_key = required(&self.secret_access_key, "R2_SECRET_ACCESS_KEY")?;

        Ok(ResolvedStorageConfig {
            account_id,
            access_key_id,
            secret_access_key,
            location: self.location_with(&lookup),
        })
    }

    /// Bucket, prefix and base URL with defaults applied. Needs no credentials.
    pub fn location(&self) -> SourceLocation {
        self.location_with(|name| std::env::var(name).ok())
    }

    fn location_with<F>(&self, lookup: F) -> SourceLocation
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |value: &Option<String>, var: &str, default: &str| {
            non_blank(value.clone())
                .or_else(|| non_blank(lookup(var)))
                .unwrap_or_else(|| default.to_string())
        };

        SourceLocation {
            bucket: optional(&self.bucket, "R2_BUCKET", DEFAULT_BUCKET),
            prefix: self
                .prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            base_url: optional(&self.base_url, "R2_BASE_URL", DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
