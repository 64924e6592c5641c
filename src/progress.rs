use regex_lite::Regex;

/// Derives a completion percentage from the two interleaved output streams
/// of a running ffmpeg process.
///
/// The total duration is announced once on the diagnostic stream
/// (`Duration: HH:MM:SS.ff`); the running position arrives repeatedly on the
/// progress stream (`out_time_ms=<microseconds>`). The two streams are
/// concurrent and unordered, so position markers seen before the duration is
/// known are dropped rather than dividing by zero. Malformed lines on either
/// stream are ignored.
pub struct ProgressTracker {
    duration_re: Regex,
    position_re: Regex,
    total_seconds: Option<f64>,
    last_percentage: f64,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            // Regexes are fixed literals; construction cannot fail.
            duration_re: Regex::new(r"Duration: (\d{2}):(\d{2}):(\d{2}\.\d{2})")
                .expect("duration pattern is valid"),
            position_re: Regex::new(r"out_time_ms=(\d+)").expect("position pattern is valid"),
            total_seconds: None,
            last_percentage: 0.0,
        }
    }

    /// Scan a diagnostic line for the duration announcement. The first match
    /// wins; later matches are ignored.
    pub fn observe_diagnostic(&mut self, line: &str) {
        if self.total_seconds.is_some() {
            return;
        }
        if let Some(caps) = self.duration_re.captures(line) {
            let hours: f64 = caps[1].parse().unwrap_or(0.0);
            let minutes: f64 = caps[2].parse().unwrap_or(0.0);
            let seconds: f64 = caps[3].parse().unwrap_or(0.0);
            self.total_seconds = Some(hours * 3600.0 + minutes * 60.0 + seconds);
        }
    }

    /// Scan a progress line for a position marker. Yields a percentage in
    /// [0, 100] once the duration is known, `None` before that or when the
    /// line carries no marker.
    pub fn observe_progress(&mut self, line: &str) -> Option<f64> {
        let caps = self.position_re.captures(line)?;
        let micros: f64 = caps[1].parse().ok()?;
        let total = self.total_seconds?;
        if total <= 0.0 {
            return None;
        }
        let percentage = (micros / 1_000_000.0 / total * 100.0).clamp(0.0, 100.0);
        self.last_percentage = percentage;
        Some(percentage)
    }

    pub fn total_seconds(&self) -> Option<f64> {
        self.total_seconds
    }

    /// Last percentage surfaced; monotonic by convention, not enforced.
    pub fn percentage(&self) -> f64 {
        self.last_percentage
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_halfway_through() {
        let mut tracker = ProgressTracker::new();
        tracker.observe_diagnostic("  Duration: 00:01:40.00, start: 0.000000, bitrate: 5000 kb/s");
        let pct = tracker.observe_progress("out_time_ms=50000000").unwrap();
        assert!((pct - 50.0).abs() < 1e-9);
        assert_eq!(tracker.percentage(), pct);
    }

    #[test]
    fn test_marker_before_duration_is_dropped() {
        let mut tracker = ProgressTracker::new();
        assert_eq!(tracker.observe_progress("out_time_ms=50000000"), None);
        assert_eq!(tracker.percentage(), 0.0);

        tracker.observe_diagnostic("  Duration: 00:01:40.00");
        assert!(tracker.observe_progress("out_time_ms=50000000").is_some());
    }

    #[test]
    fn test_first_duration_wins() {
        let mut tracker = ProgressTracker::new();
        tracker.observe_diagnostic("  Duration: 00:01:40.00");
        tracker.observe_diagnostic("  Duration: 02:00:00.00");
        assert_eq!(tracker.total_seconds(), Some(100.0));
    }

    #[test]
    fn test_malformed_lines_ignored() {
        let mut tracker = ProgressTracker::new();
        tracker.observe_diagnostic("frame=  100 fps= 25 q=28.0");
        assert_eq!(tracker.total_seconds(), None);
        assert_eq!(tracker.observe_progress("speed=1.02x"), None);
        assert_eq!(tracker.observe_progress("out_time_ms=oops"), None);
    }

    #[test]
    fn test_percentage_clamped_to_hundred() {
        let mut tracker = ProgressTracker::new();
        tracker.observe_diagnostic("  Duration: 00:00:10.00");
        let pct = tracker.observe_progress("out_time_ms=99000000").unwrap();
        assert_eq!(pct, 100.0);
    }

    #[test]
    fn test_hours_and_minutes_summed() {
        let mut tracker = ProgressTracker::new();
        tracker.observe_diagnostic("  Duration: 01:30:00.00, start: 0.000000");
        assert_eq!(tracker.total_seconds(), Some(5400.0));
        let pct = tracker.observe_progress("out_time_ms=2700000000").unwrap();
        assert!((pct - 50.0).abs() < 1e-9);
    }
}
