use super::{
    Direction, FrameScheduler, GalleryError, ImageLoadEvent, ImageLoadReceiver, ImageMetrics, Key,
    LayoutConfig, Lightbox, LightboxCommand, MasonryLayout, PageWindow, PendingPage,
    ResizeThrottle, ScrollLock, SentinelObserver, Tile, TileState, compute_layout,
};
use crate::{GalleryConfig, photos::PhotoDescriptor};
use std::{
    collections::HashSet,
    sync::Arc,
    time::Duration,
};
use tracing::{debug, warn};

/// Aspect ratio assumed for a tile whose image has not loaded yet.
pub const PLACEHOLDER_ASPECT_RATIO: f64 = 1.0;

/// Height reserved for the grid before any tile has been placed.
pub const EMPTY_CONTAINER_MIN_HEIGHT: f64 = 400.0;

/// The photo wall: materialized window, image metrics, masonry layout,
/// lightbox and infinite-scroll sentinel wired together.
///
/// All methods are synchronous state transitions except
/// [`MasonryGallery::load_next_page`]. Layout is not recomputed inside the
/// event handlers; they mark it dirty and the host calls
/// [`MasonryGallery::tick`] once per frame.
pub struct MasonryGallery {
    config: GalleryConfig,
    window: PageWindow,
    keys: HashSet<String>,
    metrics: ImageMetrics,
    failed: HashSet<String>,
    container_width: f64,
    layout_config: LayoutConfig,
    layout: MasonryLayout,
    scheduler: FrameScheduler,
    resize: ResizeThrottle,
    lightbox: Lightbox,
    sentinel: SentinelObserver,
}

impl MasonryGallery {
    pub fn new(photos: Arc<[PhotoDescriptor]>, config: GalleryConfig) -> Result<Self, GalleryError> {
        let mut keys = HashSet::with_capacity(photos.len());
        for photo in photos.iter() {
            if !keys.insert(photo.key.clone()) {
                return Err(GalleryError::DuplicateKey(photo.key.clone()));
            }
        }

        let window = PageWindow::new(photos, config.photos_per_page);
        let mut sentinel = SentinelObserver::new(config.sentinel_threshold);
        sentinel.sync(window.has_more(), window.is_loading());

        let mut scheduler = FrameScheduler::default();
        scheduler.mark_dirty();

        debug!(
            "Gallery initialized with {} photos, {} materialized",
            window.photos().len(),
            window.len()
        );

        Ok(Self {
            config,
            window,
            keys,
            metrics: ImageMetrics::new(),
            failed: HashSet::new(),
            container_width: 0.0,
            layout_config: LayoutConfig::for_width(0.0),
            layout: MasonryLayout::default(),
            scheduler,
            resize: ResizeThrottle::default(),
            lightbox: Lightbox::new(ScrollLock::default()),
            sentinel,
        })
    }

    pub fn photos(&self) -> &[PhotoDescriptor] {
        self.window.photos()
    }

    pub fn window(&self) -> &PageWindow {
        &self.window
    }

    pub fn metrics(&self) -> &ImageMetrics {
        &self.metrics
    }

    pub fn layout(&self) -> &MasonryLayout {
        &self.layout
    }

    pub fn layout_config(&self) -> LayoutConfig {
        self.layout_config
    }

    pub fn container_width(&self) -> f64 {
        self.container_width
    }

    pub fn container_height(&self) -> f64 {
        if self.layout.total_height > 0.0 {
            self.layout.total_height
        } else {
            EMPTY_CONTAINER_MIN_HEIGHT
        }
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    pub fn selected_photo(&self) -> Option<&PhotoDescriptor> {
        self.lightbox.selected(self.window.photos())
    }

    pub fn counter(&self) -> Option<(usize, usize)> {
        self.lightbox.counter(self.window.photos())
    }

    pub fn load_debounce(&self) -> Duration {
        Duration::from_millis(self.config.load_debounce_ms)
    }

    /// Generation of the live sentinel observer, or `None` when no sentinel
    /// is rendered because everything is materialized.
    pub fn sentinel_generation(&self) -> Option<u64> {
        self.window
            .has_more()
            .then(|| self.sentinel.generation())
    }

    pub fn needs_frame(&self) -> bool {
        self.scheduler.is_dirty()
    }

    pub fn frames_run(&self) -> u64 {
        self.scheduler.frames_run()
    }

    pub fn resize(&mut self, container_width: f64) {
        self.resize.note(container_width);
    }

    /// An image finished loading. Returns whether the metrics changed.
    pub fn image_loaded(&mut self, key: &str, width: u32, height: u32) -> bool {
        if !self.keys.contains(key) {
            debug!("Ignoring load event for unknown photo {}", key);
            return false;
        }
        if width == 0 || height == 0 {
            warn!("Photo {} reported empty dimensions {}x{}", key, width, height);
            self.image_failed(key);
            return false;
        }

        self.failed.remove(key);
        let changed = self.metrics.record(key, width, height);
        if changed {
            self.scheduler.mark_dirty();
        }
        changed
    }

    /// An image failed to load. Its tile stays a placeholder for the rest of
    /// the page's life.
    pub fn image_failed(&mut self, key: &str) {
        if self.keys.contains(key) && !self.metrics.contains(key) {
            warn!("Photo {} failed to load", key);
            self.failed.insert(key.to_string());
        }
    }

    pub fn apply(&mut self, event: ImageLoadEvent) -> bool {
        match event {
            ImageLoadEvent::Loaded { key, width, height } => self.image_loaded(&key, width, height),
            ImageLoadEvent::Failed { key } => {
                self.image_failed(&key);
                false
            }
        }
    }

    /// Apply every load event already queued, without waiting.
    pub fn drain_load_events(&mut self, events: &mut ImageLoadReceiver) -> usize {
        let mut applied = 0;
        while let Ok(event) = events.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Intersection callback from the sentinel observer.
    pub fn sentinel_intersected(&mut self, generation: u64, visible_ratio: f64) -> Option<PendingPage> {
        if !self.sentinel.should_load(generation, visible_ratio) {
            return None;
        }
        self.begin_load_next_page()
    }

    pub fn begin_load_next_page(&mut self) -> Option<PendingPage> {
        let pending = self.window.begin_load_next_page();
        self.sync_sentinel();
        pending
    }

    pub fn finish_page_load(&mut self, pending: PendingPage) -> usize {
        let added = self.window.complete_load(pending);
        if added > 0 {
            self.scheduler.mark_dirty();
        }
        self.sync_sentinel();
        added
    }

    /// Begin a page load, wait out the debounce, then apply it.
    pub async fn load_next_page(&mut self) -> usize {
        let Some(pending) = self.begin_load_next_page() else {
            return 0;
        };

        let debounce = self.load_debounce();
        if !debounce.is_zero() {
            tokio::time::sleep(debounce).await;
        }

        self.finish_page_load(pending)
    }

    /// Open the lightbox on `key`, materializing its page if the grid has not
    /// reached it yet.
    pub fn open(&mut self, key: &str) -> Result<(), GalleryError> {
        let index = self.lightbox.open(self.window.photos(), key)?;
        self.materialize(index);
        Ok(())
    }

    pub fn close(&mut self) {
        self.lightbox.close();
    }

    /// Move the lightbox across the full sequence, wrapping at both ends.
    pub fn navigate(&mut self, direction: Direction) -> Option<&PhotoDescriptor> {
        let index = self.lightbox.navigate(self.window.photos(), direction)?;
        self.materialize(index);
        self.window.photos().get(index)
    }

    /// Keyboard input. Returns whether the key was handled.
    pub fn key_pressed(&mut self, key: Key) -> bool {
        match self.lightbox.command_for(key) {
            Some(LightboxCommand::Close) => {
                self.close();
                true
            }
            Some(LightboxCommand::Navigate(direction)) => self.navigate(direction).is_some(),
            None => false,
        }
    }

    /// Run one frame: apply the latest resize and recompute the layout from
    /// scratch if anything changed. Returns whether a recompute happened.
    pub fn tick(&mut self) -> bool {
        if let Some(width) = self.resize.take() {
            let config = LayoutConfig::for_width(width);
            if width != self.container_width || config != self.layout_config {
                self.container_width = width;
                self.layout_config = config;
                self.scheduler.mark_dirty();
            }
        }

        if !self.scheduler.take() {
            return false;
        }

        self.layout = compute_layout(
            self.window.materialized(),
            &self.metrics,
            self.layout_config,
            self.container_width,
            self.config.min_tile_height,
        );
        true
    }

    /// Render model for the materialized window, in display order.
    pub fn tiles(&self) -> Vec<Tile<'_>> {
        self.window
            .materialized()
            .iter()
            .map(|photo| match self.layout.get(&photo.key) {
                Some(position) => Tile::Positioned {
                    photo,
                    position: *position,
                },
                None => Tile::Placeholder {
                    photo,
                    aspect_ratio: self
                        .metrics
                        .get(&photo.key)
                        .map(|d| d.aspect_ratio())
                        .unwrap_or(PLACEHOLDER_ASPECT_RATIO),
                    state: if self.failed.contains(&photo.key) {
                        TileState::Failed
                    } else {
                        TileState::Loading
                    },
                },
            })
            .collect()
    }

    /// Release the sentinel and scroll lock when the gallery goes away.
    pub fn teardown(&mut self) {
        self.sentinel.teardown();
        self.lightbox.close();
    }

    fn materialize(&mut self, index: usize) {
        if self.window.ensure_materialized(index) {
            self.scheduler.mark_dirty();
            self.sync_sentinel();
        }
    }

    fn sync_sentinel(&mut self) {
        self.sentinel
            .sync(self.window.has_more(), self.window.is_loading());
    }
}
