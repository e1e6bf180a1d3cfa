// Photo source - storage listing flattened into one sorted, cached sequence
pub mod core;
mod error;
mod handlers;
mod types;

pub use core::{IMAGE_EXTENSIONS, PhotoSource, SharedPhotoSource, is_image_key, paginate, sort_newest_first};
pub use error::PhotosError;
pub use handlers::{photos_handler, refresh_photos_handler};
pub use types::*;
