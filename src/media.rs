/// The single resource learners must watch before the post-test.
pub const VIDEO_SOURCE: &str =
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4";

/// Natural length of `VIDEO_SOURCE` as reported by its metadata.
pub const VIDEO_DURATION_SECS: f64 = 596.5;

/// Watch ceiling in seconds.
pub const MAX_WATCH_SECS: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    Completed,
}

/// Playback gate for the instructional video.
///
/// Completion fires once, when elapsed time first reaches `limit()`. Later
/// boundary crossings are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaGate {
    source: &'static str,
    natural_duration: Option<f64>,
    elapsed: f64,
    playing: bool,
    completed: bool,
}

impl Default for MediaGate {
    fn default() -> Self {
        Self::new(VIDEO_SOURCE)
    }
}

impl MediaGate {
    pub fn new(source: &'static str) -> Self {
        Self {
            source,
            natural_duration: None,
            elapsed: 0.0,
            playing: false,
            completed: false,
        }
    }

    /// A gate for a video the learner already finished in an earlier run.
    pub fn already_completed() -> Self {
        let mut gate = Self::default();
        gate.elapsed = gate.limit();
        gate.completed = true;
        gate
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn limit(&self) -> f64 {
        match self.natural_duration {
            Some(d) => d.min(MAX_WATCH_SECS),
            None => MAX_WATCH_SECS,
        }
    }

    pub fn progress(&self) -> f64 {
        let limit = self.limit();
        if limit <= 0.0 {
            return 1.0;
        }
        (self.elapsed / limit).clamp(0.0, 1.0)
    }

    /// Metadata arrived. Unusable durations leave the 60s ceiling in place.
    pub fn load_metadata(&mut self, duration: f64) -> Option<MediaEvent> {
        if duration.is_finite() && duration > 0.0 {
            self.natural_duration = Some(duration);
        }
        self.check_boundary()
    }

    pub fn toggle_play_pause(&mut self) -> bool {
        if self.completed {
            return false;
        }
        self.playing = !self.playing;
        true
    }

    /// Advances the playhead by `delta` seconds while playing.
    pub fn advance(&mut self, delta: f64) -> Option<MediaEvent> {
        if !self.playing || !delta.is_finite() || delta <= 0.0 {
            return None;
        }
        self.time_update(self.elapsed + delta)
    }

    pub fn time_update(&mut self, current: f64) -> Option<MediaEvent> {
        if current.is_finite() && current >= 0.0 {
            self.elapsed = current;
        }
        self.check_boundary()
    }

    fn check_boundary(&mut self) -> Option<MediaEvent> {
        let limit = self.limit();
        if self.elapsed < limit {
            return None;
        }
        self.elapsed = limit;
        self.playing = false;
        self.fire()
    }

    fn fire(&mut self) -> Option<MediaEvent> {
        if self.completed {
            return None;
        }
        self.completed = true;
        Some(MediaEvent::Completed)
    }
}
