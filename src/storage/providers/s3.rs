use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    Client,
    config::{Credentials, Region},
};
use chrono::DateTime;
use tracing::{debug, error};

use crate::storage::{ListPage, ListedObject, ObjectLister, ResolvedStorageConfig, StorageError};

/// Lists objects from an S3-compatible bucket (Cloudflare R2).
pub struct S3Lister {
    client: Client,
}

impl S3Lister {
    pub async fn new(config: &ResolvedStorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "waynspace-r2-lister",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new("auto"))
            .endpoint_url(config.endpoint_url())
            .credentials_provider(credentials)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(s3_config),
        }
    }
}

#[async_trait]
impl ObjectLister for S3Lister {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage, StorageError> {
        debug!(
            "Listing s3://{}/{} (continuation: {:?})",
            bucket, prefix, continuation_token
        );

        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .set_continuation_token(continuation_token)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to list objects in bucket {}: {}", bucket, e);
                StorageError::Listing(e.to_string())
            })?;

        let objects = output
            .contents()
            .iter()
            .map(|object| ListedObject {
                key: object.key().map(str::to_string),
                size: object.size(),
                last_modified: object
                    .last_modified()
                    .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
            })
            .collect();

        Ok(ListPage {
            objects,
            next_continuation_token: output.next_continuation_token().map(str::to_string),
        })
    }

    fn name(&self) -> &str {
        "Cloudflare R2"
    }
}
