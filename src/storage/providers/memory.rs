use crate::storage::{ListPage, ListedObject, ObjectLister, StorageError};
use async_trait::async_trait;
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

/// In-memory listing with the same continuation-token protocol as the real
/// store. Tokens are the offset of the next object as a decimal string.
pub struct MemoryLister {
    objects: Mutex<Vec<ListedObject>>,
    page_size: usize,
    failure: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl MemoryLister {
    pub fn new(objects: Vec<ListedObject>, page_size: usize) -> Self {
        Self {
            objects: Mutex::new(objects),
            page_size: page_size.max(1),
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn replace_objects(&self, objects: Vec<ListedObject>) {
        if let Ok(mut current) = self.objects.lock() {
            *current = objects;
        }
    }

    /// Make every subsequent call fail with a listing error (or succeed again
    /// with `None`).
    pub fn set_failure(&self, message: Option<String>) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = message;
        }
    }

    /// Number of `list_page` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectLister for MemoryLister {
    async fn list_page(
        &self,
        _bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.failure.lock().ok().and_then(|f| f.clone()) {
            return Err(StorageError::Listing(message));
        }

        let start = match continuation_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| StorageError::Listing(format!("Invalid continuation token: {}", token)))?,
            None => 0,
        };

        let objects = self
            .objects
            .lock()
            .map_err(|_| StorageError::Listing("Object list poisoned".to_string()))?;

        let matching: Vec<&ListedObject> = objects
            .iter()
            .filter(|o| o.key.as_deref().is_none_or(|k| k.starts_with(prefix)))
            .collect();

        let end = (start + self.page_size).min(matching.len());
        let page = matching
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|o| (*o).clone())
            .collect();

        Ok(ListPage {
            objects: page,
            next_continuation_token: (end < matching.len()).then(|| end.to_string()),
        })
    }

    fn name(&self) -> &str {
        "In-memory"
    }
}
