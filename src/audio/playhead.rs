/// Read-only playback position, in seconds, sampled once per analysis frame.
pub trait PositionProvider {
    fn position(&self) -> f64;
}

impl PositionProvider for f64 {
    fn position(&self) -> f64 {
        *self
    }
}

/// Seconds within this distance of the end count as finished.
const END_TOLERANCE: f64 = 0.001;

/// A playback cursor over a buffer of known duration. Seeking is clamped to
/// `[0, duration]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playhead {
    position: f64,
    duration: f64,
}

impl Playhead {
    pub fn new(duration: f64) -> Self {
        Self {
            position: 0.0,
            duration: duration.max(0.0),
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn seek(&mut self, time: f64) {
        self.position = time.clamp(0.0, self.duration);
    }

    pub fn advance(&mut self, seconds: f64) {
        self.seek(self.position + seconds);
    }

    pub fn rewind(&mut self) {
        self.position = 0.0;
    }

    pub fn is_finished(&self) -> bool {
        self.position > self.duration - END_TOLERANCE
    }
}

impl PositionProvider for Playhead {
    fn position(&self) -> f64 {
        self.position
    }
}
