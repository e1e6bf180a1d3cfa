use super::Dimensions;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Natural dimensions of every photo whose image has finished loading.
/// Entries are never evicted.
#[derive(Debug, Clone, Default)]
pub struct ImageMetrics {
    entries: HashMap<String, Dimensions>,
}

impl ImageMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record dimensions for `key`. Returns `true` only when the map actually
    /// changed; repeating a known value is a no-op. Zero-sized dimensions are
    /// rejected.
    pub fn record(&mut self, key: &str, width: u32, height: u32) -> bool {
        let dimensions = Dimensions::new(width, height);
        if dimensions.is_empty() {
            return false;
        }

        match self.entries.get(key) {
            Some(existing) if *existing == dimensions => false,
            _ => {
                self.entries.insert(key.to_string(), dimensions);
                true
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<Dimensions> {
        self.entries.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Completion of one tile's image resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLoadEvent {
    Loaded { key: String, width: u32, height: u32 },
    Failed { key: String },
}

impl ImageLoadEvent {
    pub fn key(&self) -> &str {
        match self {
            ImageLoadEvent::Loaded { key, .. } | ImageLoadEvent::Failed { key } => key,
        }
    }
}

/// Sending half handed to whatever loads images. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ImageLoadNotifier {
    tx: mpsc::UnboundedSender<ImageLoadEvent>,
}

impl ImageLoadNotifier {
    /// Returns `false` once the gallery side has gone away.
    pub fn loaded(&self, key: impl Into<String>, width: u32, height: u32) -> bool {
        self.tx
            .send(ImageLoadEvent::Loaded {
                key: key.into(),
                width,
                height,
            })
            .is_ok()
    }

    pub fn failed(&self, key: impl Into<String>) -> bool {
        self.tx
            .send(ImageLoadEvent::Failed { key: key.into() })
            .is_ok()
    }
}

pub type ImageLoadReceiver = mpsc::UnboundedReceiver<ImageLoadEvent>;

pub fn image_load_channel() -> (ImageLoadNotifier, ImageLoadReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ImageLoadNotifier { tx }, rx)
}
