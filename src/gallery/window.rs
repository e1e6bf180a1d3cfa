use crate::photos::PhotoDescriptor;
use std::{sync::Arc, time::Duration};
use tracing::debug;

/// A page load that has started but not yet been applied. Produced by
/// [`PageWindow::begin_load_next_page`] and consumed by
/// [`PageWindow::complete_load`].
#[derive(Debug)]
#[must_use]
pub struct PendingPage {
    page: usize,
}

impl PendingPage {
    /// Page count the window will have once this load completes.
    pub fn page(&self) -> usize {
        self.page
    }
}

/// Tracks which prefix of the full photo sequence has been materialized.
///
/// The window is always `photos[0 .. min(current_page * page_size, len)]`;
/// it only grows.
#[derive(Debug, Clone)]
pub struct PageWindow {
    photos: Arc<[PhotoDescriptor]>,
    page_size: usize,
    current_page: usize,
    loading: bool,
}

impl PageWindow {
    pub fn new(photos: Arc<[PhotoDescriptor]>, page_size: usize) -> Self {
        Self {
            photos,
            page_size: page_size.max(1),
            current_page: 1,
            loading: false,
        }
    }

    pub fn photos(&self) -> &Arc<[PhotoDescriptor]> {
        &self.photos
    }

    pub fn materialized(&self) -> &[PhotoDescriptor] {
        &self.photos[..self.len()]
    }

    pub fn len(&self) -> usize {
        self.current_page
            .saturating_mul(self.page_size)
            .min(self.photos.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn has_more(&self) -> bool {
        self.len() < self.photos.len()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn contains_index(&self, index: usize) -> bool {
        index < self.len()
    }

    /// Start loading the next page. Returns `None` while another load is in
    /// flight or when everything is already materialized.
    pub fn begin_load_next_page(&mut self) -> Option<PendingPage> {
        if self.loading || !self.has_more() {
            return None;
        }

        self.loading = true;
        Some(PendingPage {
            page: self.current_page + 1,
        })
    }

    /// Apply a pending load and release the loading flag. Returns how many
    /// photos were added. A load overtaken by [`Self::ensure_materialized`]
    /// adds nothing.
    pub fn complete_load(&mut self, pending: PendingPage) -> usize {
        self.loading = false;

        if pending.page <= self.current_page {
            debug!(
                "Page {} already materialized, dropping stale load",
                pending.page
            );
            return 0;
        }

        let before = self.len();
        self.current_page = pending.page;
        let added = self.len() - before;
        debug!(
            "Materialized page {} ({} photos, {} total)",
            self.current_page,
            added,
            self.len()
        );
        added
    }

    /// Load the next page, holding the loading flag for `debounce` so rapid
    /// triggers collapse into one load.
    pub async fn load_next_page(&mut self, debounce: Duration) -> usize {
        let Some(pending) = self.begin_load_next_page() else {
            return 0;
        };

        if !debounce.is_zero() {
            tokio::time::sleep(debounce).await;
        }

        self.complete_load(pending)
    }

    /// Make sure `target_index` is materialized, extending the window to the
    /// page containing it in one step. Returns whether the window grew.
    pub fn ensure_materialized(&mut self, target_index: usize) -> bool {
        if self.contains_index(target_index) {
            return false;
        }
        if target_index >= self.photos.len() {
            debug!(
                "Index {} outside sequence of {}",
                target_index,
                self.photos.len()
            );
            return false;
        }

        let target_page = target_index / self.page_size + 1;
        if target_page <= self.current_page {
            return false;
        }

        self.current_page = target_page;
        debug!(
            "Jumped window to page {} for index {} ({} photos)",
            target_page,
            target_index,
            self.len()
        );
        true
    }
}
