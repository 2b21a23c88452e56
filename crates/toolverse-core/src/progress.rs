//! Percent-complete bookkeeping for loader and assembler passes

/// Receives percent-complete updates in `[0, 100]`
pub trait ProgressSink {
    fn report(&mut self, percent: u8);
}

impl<F: FnMut(u8)> ProgressSink for F {
    fn report(&mut self, percent: u8) {
        self(percent)
    }
}

/// Sink that drops every update
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _percent: u8) {}
}

/// Tracks completed units of one pass and reports `round(done / total * 100)`.
///
/// Starting a tracker reports 0. Reported values never decrease, and
/// [`ProgressTracker::finish`] always reports exactly 100.
pub struct ProgressTracker<'a> {
    total: usize,
    done: usize,
    last: u8,
    sink: &'a mut dyn ProgressSink,
}

impl<'a> ProgressTracker<'a> {
    pub fn start(total: usize, sink: &'a mut dyn ProgressSink) -> Self {
        sink.report(0);
        Self {
            total,
            done: 0,
            last: 0,
            sink,
        }
    }

    /// Mark one more unit as done and report the new percentage
    pub fn advance(&mut self) -> u8 {
        self.done = (self.done + 1).min(self.total);
        let percent = percent_of(self.done, self.total).max(self.last);
        self.last = percent;
        self.sink.report(percent);
        percent
    }

    /// Report completion; no-op if 100 was already reported
    pub fn finish(&mut self) {
        if self.last < 100 {
            self.last = 100;
            self.sink.report(100);
        }
    }

    pub fn percent(&self) -> u8 {
        self.last
    }
}

/// `round(done / total * 100)`, with an empty pass counting as complete
pub fn percent_of(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let done = done.min(total) as f64;
    ((done / total as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent_of(0, 3), 0);
        assert_eq!(percent_of(1, 3), 33);
        assert_eq!(percent_of(2, 3), 67);
        assert_eq!(percent_of(3, 3), 100);
        assert_eq!(percent_of(0, 0), 100);
    }

    #[test]
    fn test_tracker_reports_start_each_unit_and_finish() {
        let mut seen = Vec::new();
        let mut sink = |p: u8| seen.push(p);
        let mut tracker = ProgressTracker::start(4, &mut sink);
        for _ in 0..4 {
            tracker.advance();
        }
        tracker.finish();
        assert_eq!(seen, vec![0, 25, 50, 75, 100]);
    }

    #[test]
    fn test_empty_pass_finishes_at_100() {
        let mut seen = Vec::new();
        let mut sink = |p: u8| seen.push(p);
        ProgressTracker::start(0, &mut sink).finish();
        assert_eq!(seen, vec![0, 100]);
    }

    #[test]
    fn test_advance_past_total_saturates() {
        let mut sink = NoProgress;
        let mut tracker = ProgressTracker::start(1, &mut sink);
        assert_eq!(tracker.advance(), 100);
        assert_eq!(tracker.advance(), 100);
    }
}
