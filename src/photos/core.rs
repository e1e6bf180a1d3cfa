use super::{Pagination, PhotoDescriptor, PhotosError, PhotosResponse};
use crate::storage::{DynObjectLister, ListedObject, SourceLocation, StorageError};
use chrono::{DateTime, SecondsFormat, Utc};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp", ".gif", ".avif"];

pub type SharedPhotoSource = Arc<PhotoSource>;

struct CachedListing {
    photos: Arc<[PhotoDescriptor]>,
    fetched_at: Instant,
}

/// Flattens the paginated storage listing into one newest-first photo
/// sequence, cached for `ttl`.
pub struct PhotoSource {
    lister: DynObjectLister,
    location: SourceLocation,
    ttl: Duration,
    cache: RwLock<Option<CachedListing>>,
}

impl PhotoSource {
    pub fn new(lister: DynObjectLister, location: SourceLocation, ttl: Duration) -> Self {
        Self {
            lister,
            location,
            ttl,
            cache: RwLock::new(None),
        }
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The full photo sequence, served from cache while it is fresh.
    pub async fn list_photos(&self) -> Result<Arc<[PhotoDescriptor]>, PhotosError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref()
                && cached.fetched_at.elapsed() < self.ttl
            {
                debug!("Serving {} photos from cache", cached.photos.len());
                return Ok(cached.photos.clone());
            }
        }

        let mut cache = self.cache.write().await;

        // Another caller may have refilled the cache while we waited.
        if let Some(cached) = cache.as_ref()
            && cached.fetched_at.elapsed() < self.ttl
        {
            return Ok(cached.photos.clone());
        }

        let photos: Arc<[PhotoDescriptor]> = self.fetch_from_storage().await?.into();
        *cache = Some(CachedListing {
            photos: photos.clone(),
            fetched_at: Instant::now(),
        });

        Ok(photos)
    }

    /// Relist storage now and replace the cached sequence.
    pub async fn refresh(&self) -> Result<Arc<[PhotoDescriptor]>, PhotosError> {
        // Readers keep the old listing until the new one is swapped in
        let photos: Arc<[PhotoDescriptor]> = self.fetch_from_storage().await?.into();
        let mut cache = self.cache.write().await;
        *cache = Some(CachedListing {
            photos: photos.clone(),
            fetched_at: Instant::now(),
        });
        Ok(photos)
    }

    pub async fn invalidate(&self) {
        let mut cache = self.cache.write().await;
        *cache = None;
        debug!("Photo cache invalidated");
    }

    pub fn start_background_refresh(source: SharedPhotoSource, interval_minutes: u64) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(
                interval_minutes.saturating_mul(60),
            ));
            interval.tick().await; // Skip the first immediate tick

            loop {
                interval.tick().await;
                info!("Starting scheduled photo listing refresh");

                match source.refresh().await {
                    Ok(photos) => info!("Photo listing refreshed: {} photos", photos.len()),
                    Err(e) => error!("Failed to refresh photo listing: {}", e),
                }
            }
        });
    }

    async fn fetch_from_storage(&self) -> Result<Vec<PhotoDescriptor>, StorageError> {
        info!(
            "Listing photos from {} bucket {} under {}",
            self.lister.name(),
            self.location.bucket,
            self.location.prefix
        );

        let mut photos = Vec::new();
        let mut continuation_token = None;
        let mut pages = 0;

        loop {
            let page = self
                .lister
                .list_page(
                    &self.location.bucket,
                    &self.location.prefix,
                    continuation_token,
                )
                .await?;
            pages += 1;

            photos.extend(page.objects.iter().filter_map(|o| self.describe(o)));

            continuation_token = page.next_continuation_token;
            if continuation_token.is_none() {
                break;
            }
        }

        sort_newest_first(&mut photos);

        info!("Found {} photos across {} listing pages", photos.len(), pages);
        Ok(photos)
    }

    fn describe(&self, object: &ListedObject) -> Option<PhotoDescriptor> {
        let key = object.key.as_deref()?;
        if !is_image_key(key) {
            return None;
        }

        let relative_path = key.replacen(&self.location.prefix, "", 1);
        let name = match relative_path.rsplit('/').next() {
            Some(last) if !last.is_empty() => last.to_string(),
            _ => relative_path.clone(),
        };

        Some(PhotoDescriptor {
            url: format!("{}/{}", self.location.base_url, key),
            key: key.to_string(),
            name,
            size: object.size.unwrap_or(0).max(0) as u64,
            last_modified: object
                .last_modified
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
                .unwrap_or_default(),
        })
    }
}

/// Case-insensitive check of the text after the last `.` against the
/// recognised image extensions.
pub fn is_image_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    lower
        .rfind('.')
        .is_some_and(|dot| IMAGE_EXTENSIONS.contains(&&lower[dot..]))
}

/// Stable sort, most recent first. Unparseable or empty timestamps go last.
pub fn sort_newest_first(photos: &mut [PhotoDescriptor]) {
    photos.sort_by_cached_key(|p| std::cmp::Reverse(parse_timestamp(&p.last_modified)));
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Slice one page out of the full sequence. `page` is 1-indexed.
pub fn paginate(photos: &[PhotoDescriptor], page: usize, limit: usize) -> PhotosResponse {
    let page = page.max(1);
    let limit = limit.max(1);
    let total = photos.len();

    let start = (page - 1).saturating_mul(limit);
    let end = start.saturating_add(limit);

    PhotosResponse {
        photos: photos
            .get(start.min(total)..end.min(total))
            .unwrap_or_default()
            .to_vec(),
        pagination: Pagination {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit),
            has_more: end < total,
        },
    }
}
