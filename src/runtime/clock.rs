/// Frame clock driven by explicit millisecond timestamps.
///
/// Deltas and elapsed time are in seconds. An auto-start clock starts on its first
/// [`Clock::get_delta`] call, which returns `0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Clock {
    auto_start: bool,
    start_time: f64,
    old_time: f64,
    elapsed: f64,
    running: bool,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Clock {
    /// Stopped clock.
    pub fn new(auto_start: bool) -> Self {
        Self {
            auto_start,
            start_time: 0.0,
            old_time: 0.0,
            elapsed: 0.0,
            running: false,
        }
    }

    /// Start (or restart) at `now_ms`, resetting elapsed time.
    pub fn start(&mut self, now_ms: f64) {
        self.start_time = now_ms;
        self.old_time = now_ms;
        self.elapsed = 0.0;
        self.running = true;
    }

    /// Stop at `now_ms`; later deltas are zero until [`Clock::start`].
    pub fn stop(&mut self, now_ms: f64) {
        self.get_delta(now_ms);
        self.running = false;
        self.auto_start = false;
    }

    /// Seconds since the previous call.
    pub fn get_delta(&mut self, now_ms: f64) -> f64 {
        if self.auto_start && !self.running {
            self.start(now_ms);
            return 0.0;
        }
        if !self.running {
            return 0.0;
        }
        let diff = (now_ms - self.old_time) / 1000.0;
        self.old_time = now_ms;
        self.elapsed += diff;
        diff
    }

    /// Advance to `now_ms` and return total running seconds.
    pub fn elapsed_time(&mut self, now_ms: f64) -> f64 {
        self.get_delta(now_ms);
        self.elapsed
    }

    /// Total running seconds as of the last update.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Timestamp of the last start.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Return `true` between start and stop.
    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/clock.rs"]
mod tests;
