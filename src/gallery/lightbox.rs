use super::{Direction, GalleryError, Key};
use crate::photos::PhotoDescriptor;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LightboxState {
    #[default]
    Closed,
    Open {
        key: String,
    },
}

/// Page scroll suppression. Remembers whether scrolling was already locked
/// when the lightbox opened so closing restores exactly that.
#[derive(Debug, Clone, Default)]
pub struct ScrollLock {
    locked: bool,
    saved: Option<bool>,
}

impl ScrollLock {
    pub fn new(locked: bool) -> Self {
        Self {
            locked,
            saved: None,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn acquire(&mut self) {
        if self.saved.is_none() {
            self.saved = Some(self.locked);
        }
        self.locked = true;
    }

    pub fn release(&mut self) {
        if let Some(previous) = self.saved.take() {
            self.locked = previous;
        }
    }
}

/// What a key press asks the gallery to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxCommand {
    Close,
    Navigate(Direction),
}

/// Full-screen viewer over the whole photo sequence. Indices are looked up
/// by key on demand and never stored.
#[derive(Debug, Clone, Default)]
pub struct Lightbox {
    state: LightboxState,
    scroll: ScrollLock,
}

impl Lightbox {
    pub fn new(scroll: ScrollLock) -> Self {
        Self {
            state: LightboxState::Closed,
            scroll,
        }
    }

    pub fn state(&self) -> &LightboxState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, LightboxState::Open { .. })
    }

    pub fn scroll_lock(&self) -> &ScrollLock {
        &self.scroll
    }

    pub fn selected_key(&self) -> Option<&str> {
        match &self.state {
            LightboxState::Open { key } => Some(key),
            LightboxState::Closed => None,
        }
    }

    pub fn selected_index(&self, photos: &[PhotoDescriptor]) -> Option<usize> {
        let key = self.selected_key()?;
        photos.iter().position(|p| p.key == key)
    }

    pub fn selected<'a>(&self, photos: &'a [PhotoDescriptor]) -> Option<&'a PhotoDescriptor> {
        self.selected_index(photos).map(|i| &photos[i])
    }

    /// Open on `key`, or switch to it if already open. Returns the photo's
    /// index in `photos`.
    pub fn open(&mut self, photos: &[PhotoDescriptor], key: &str) -> Result<usize, GalleryError> {
        if photos.is_empty() {
            return Err(GalleryError::EmptySequence);
        }
        let index = photos
            .iter()
            .position(|p| p.key == key)
            .ok_or_else(|| GalleryError::UnknownPhoto(key.to_string()))?;

        self.scroll.acquire();
        self.state = LightboxState::Open {
            key: key.to_string(),
        };
        debug!("Lightbox opened on {} (index {})", key, index);
        Ok(index)
    }

    pub fn close(&mut self) {
        if self.is_open() {
            debug!("Lightbox closed");
        }
        self.state = LightboxState::Closed;
        self.scroll.release();
    }

    /// Step to the neighbouring photo, wrapping at both ends. Returns the new
    /// index, or `None` when closed. A selected key that is no longer in the
    /// sequence stays selected.
    pub fn navigate(&mut self, photos: &[PhotoDescriptor], direction: Direction) -> Option<usize> {
        let current = self.selected_key()?;
        let index = photos.iter().position(|p| p.key == current)?;

        let next = wrap_index(index, photos.len(), direction);
        self.state = LightboxState::Open {
            key: photos[next].key.clone(),
        };
        Some(next)
    }

    /// Keyboard bindings, active only while open.
    pub fn command_for(&self, key: Key) -> Option<LightboxCommand> {
        if !self.is_open() {
            return None;
        }
        match key {
            Key::Escape => Some(LightboxCommand::Close),
            Key::ArrowLeft => Some(LightboxCommand::Navigate(Direction::Prev)),
            Key::ArrowRight => Some(LightboxCommand::Navigate(Direction::Next)),
            Key::Other => None,
        }
    }

    /// 1-indexed `(position, total)` for the counter overlay.
    pub fn counter(&self, photos: &[PhotoDescriptor]) -> Option<(usize, usize)> {
        self.selected_index(photos).map(|i| (i + 1, photos.len()))
    }
}

pub fn wrap_index(index: usize, len: usize, direction: Direction) -> usize {
    if len == 0 {
        return 0;
    }
    match direction {
        Direction::Prev => (index + len - 1) % len,
        Direction::Next => (index + 1) % len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photos(count: usize) -> Vec<PhotoDescriptor> {
        (0..count)
            .map(|i| PhotoDescriptor {
                url: format!("https://img.example.com/{}.jpg", i),
                key: format!("{}.jpg", i),
                name: format!("{}.jpg", i),
                size: 0,
                last_modified: String::new(),
            })
            .collect()
    }

    #[test]
    fn test_wraparound() {
        let photos = photos(5);
        let mut lightbox = Lightbox::default();

        lightbox.open(&photos, "4.jpg").unwrap();
        assert_eq!(lightbox.navigate(&photos, Direction::Next), Some(0));
        assert_eq!(lightbox.navigate(&photos, Direction::Prev), Some(4));
        assert_eq!(lightbox.navigate(&photos, Direction::Prev), Some(3));

        lightbox.open(&photos, "0.jpg").unwrap();
        assert_eq!(lightbox.navigate(&photos, Direction::Prev), Some(4));
    }

    #[test]
    fn test_single_photo_wraps_to_itself() {
        let photos = photos(1);
        let mut lightbox = Lightbox::default();
        lightbox.open(&photos, "0.jpg").unwrap();
        assert_eq!(lightbox.navigate(&photos, Direction::Next), Some(0));
        assert_eq!(lightbox.navigate(&photos, Direction::Prev), Some(0));
    }

    #[test]
    fn test_closed_lightbox_ignores_navigation_and_keys() {
        let photos = photos(3);
        let mut lightbox = Lightbox::default();
        assert_eq!(lightbox.navigate(&photos, Direction::Next), None);
        assert_eq!(lightbox.command_for(Key::Escape), None);
        assert_eq!(lightbox.counter(&photos), None);
    }

    #[test]
    fn test_key_bindings_while_open() {
        let photos = photos(3);
        let mut lightbox = Lightbox::default();
        lightbox.open(&photos, "1.jpg").unwrap();

        assert_eq!(
            lightbox.command_for(Key::from_name("Escape")),
            Some(LightboxCommand::Close)
        );
        assert_eq!(
            lightbox.command_for(Key::from_name("ArrowLeft")),
            Some(LightboxCommand::Navigate(Direction::Prev))
        );
        assert_eq!(
            lightbox.command_for(Key::from_name("ArrowRight")),
            Some(LightboxCommand::Navigate(Direction::Next))
        );
        assert_eq!(lightbox.command_for(Key::from_name("a")), None);
    }

    #[test]
    fn test_counter_is_one_indexed_over_full_sequence() {
        let photos = photos(30);
        let mut lightbox = Lightbox::default();
        lightbox.open(&photos, "25.jpg").unwrap();
        assert_eq!(lightbox.counter(&photos), Some((26, 30)));
    }

    #[test]
    fn test_open_unknown_key() {
        let photos = photos(2);
        let mut lightbox = Lightbox::default();
        assert_eq!(
            lightbox.open(&photos, "missing.jpg"),
            Err(GalleryError::UnknownPhoto("missing.jpg".to_string()))
        );
        assert!(!lightbox.is_open());
        assert!(!lightbox.scroll_lock().is_locked());
    }

    #[test]
    fn test_scroll_lock_restores_previous_state() {
        let photos = photos(2);

        let mut lightbox = Lightbox::new(ScrollLock::new(false));
        lightbox.open(&photos, "0.jpg").unwrap();
        assert!(lightbox.scroll_lock().is_locked());
        lightbox.open(&photos, "1.jpg").unwrap();
        lightbox.close();
        assert!(!lightbox.scroll_lock().is_locked());

        let mut already_locked = Lightbox::new(ScrollLock::new(true));
        already_locked.open(&photos, "0.jpg").unwrap();
        already_locked.close();
        assert!(already_locked.scroll_lock().is_locked());
    }
}
