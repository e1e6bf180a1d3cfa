use crate::photos::PhotoDescriptor;
use serde::{Deserialize, Serialize};

/// Absolute placement of one tile inside the gallery container, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutPosition {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutPosition {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Natural pixel size of a loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// Keys the lightbox reacts to. Everything else maps to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    Other,
}

impl Key {
    /// Map a DOM-style key name (`KeyboardEvent.key`).
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Key::Escape,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            _ => Key::Other,
        }
    }
}

/// Why a tile has no position yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    /// Image still loading; dimensions unknown.
    Loading,
    /// Image failed to load. The tile stays a placeholder; there is no retry.
    Failed,
}

/// Render model for one materialized photo.
#[derive(Debug, Clone, PartialEq)]
pub enum Tile<'a> {
    Positioned {
        photo: &'a PhotoDescriptor,
        position: LayoutPosition,
    },
    Placeholder {
        photo: &'a PhotoDescriptor,
        aspect_ratio: f64,
        state: TileState,
    },
}

impl<'a> Tile<'a> {
    pub fn photo(&self) -> &'a PhotoDescriptor {
        match self {
            Tile::Positioned { photo, .. } | Tile::Placeholder { photo, .. } => photo,
        }
    }

    pub fn position(&self) -> Option<LayoutPosition> {
        match self {
            Tile::Positioned { position, .. } => Some(*position),
            Tile::Placeholder { .. } => None,
        }
    }
}
