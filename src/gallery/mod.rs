// Gallery module - masonry photo wall engine, independent of any UI toolkit
mod core;
mod error;
mod layout;
mod lightbox;
mod loader;
mod metrics;
mod scheduler;
mod types;
mod window;

pub use core::{EMPTY_CONTAINER_MIN_HEIGHT, MasonryGallery, PLACEHOLDER_ASPECT_RATIO};
pub use error::GalleryError;
pub use layout::{LayoutConfig, MasonryLayout, compute_layout};
pub use lightbox::{Lightbox, LightboxCommand, LightboxState, ScrollLock, wrap_index};
pub use loader::SentinelObserver;
pub use metrics::{
    ImageLoadEvent, ImageLoadNotifier, ImageLoadReceiver, ImageMetrics, image_load_channel,
};
pub use scheduler::{FrameScheduler, ResizeThrottle};
pub use types::*;
pub use window::{PageWindow, PendingPage};
