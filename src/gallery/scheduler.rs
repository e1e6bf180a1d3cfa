/// Dirty flag drained at most once per frame.
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    dirty: bool,
    frames: u64,
}

impl FrameScheduler {
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the flag, reporting whether work was pending.
    pub fn take(&mut self) -> bool {
        let was_dirty = std::mem::take(&mut self.dirty);
        if was_dirty {
            self.frames += 1;
        }
        was_dirty
    }

    /// Number of frames that actually ran a recompute.
    pub fn frames_run(&self) -> u64 {
        self.frames
    }
}

/// Coalesces bursts of resize notifications: only the latest width seen
/// before the next frame is applied.
#[derive(Debug, Clone, Default)]
pub struct ResizeThrottle {
    pending: Option<f64>,
}

impl ResizeThrottle {
    pub fn note(&mut self, width: f64) {
        self.pending = Some(width);
    }

    pub fn take(&mut self) -> Option<f64> {
        self.pending.take()
    }
}
