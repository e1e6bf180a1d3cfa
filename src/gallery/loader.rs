use tracing::trace;

/// Visibility watcher for the sentinel placed after the last tile.
///
/// The underlying observer is torn down and recreated whenever `has_more` or
/// `loading` changes; each incarnation gets a new generation number and
/// callbacks carrying an older generation are ignored.
#[derive(Debug, Clone)]
pub struct SentinelObserver {
    threshold: f64,
    generation: u64,
    armed: bool,
    observed: Option<(bool, bool)>,
}

impl SentinelObserver {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            generation: 0,
            armed: false,
            observed: None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Bring the observer in line with the window state. Returns `true` when
    /// the observer was recreated.
    pub fn sync(&mut self, has_more: bool, loading: bool) -> bool {
        if self.observed == Some((has_more, loading)) {
            return false;
        }

        self.observed = Some((has_more, loading));
        self.generation += 1;
        self.armed = has_more && !loading;
        trace!(
            "Sentinel observer recreated (generation {}, armed {})",
            self.generation, self.armed
        );
        true
    }

    pub fn teardown(&mut self) {
        self.generation += 1;
        self.armed = false;
        self.observed = None;
    }

    /// Whether an intersection report should trigger a page load.
    pub fn should_load(&self, generation: u64, visible_ratio: f64) -> bool {
        generation == self.generation
            && self.armed
            && visible_ratio > 0.0
            && visible_ratio >= self.threshold
    }
}
