/// Coalesces bursts of scroll requests into one window recompute per frame.
///
/// Only the latest requested offset survives until the next [`ScrollCoalescer::take`].
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ScrollCoalescer {
    pending: Option<f64>,
    dropped: usize,
}

impl ScrollCoalescer {
    pub(crate) const fn request(&mut self, offset: f64) {
        if self.pending.is_some() {
            self.dropped += 1;
        }
        self.pending = Some(offset);
    }

    /// Returns the pending offset, if any, and resets the superseded counter.
    pub(crate) const fn take(&mut self) -> Option<f64> {
        self.dropped = 0;
        self.pending.take()
    }

    /// Number of requests replaced by a later one since the last take.
    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    pub(crate) const fn superseded(&self) -> usize {
        self.dropped
    }

    pub(crate) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) const fn clear(&mut self) {
        self.pending = None;
        self.dropped = 0;
    }
}
