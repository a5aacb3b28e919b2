/// Clicks at the same index closer together than this count as one gesture.
pub const CLICK_WINDOW_MS: f64 = 400.0;

/// Highest count reported; a triple click selects a line.
pub const MAX_CLICKS: u8 = 3;

/// Multi-click detector for single, double and triple clicks.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClickCounter {
    last_clicked: Option<f64>,
    times_clicked: u8,
    last_index: Option<usize>,
}

impl ClickCounter {
    /// Counter with no gesture in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a click at `index` and return the running count.
    ///
    /// The count grows while clicks land on the same index within [`CLICK_WINDOW_MS`]
    /// of each other and stops at [`MAX_CLICKS`]. Anything else starts a new gesture.
    pub fn handle_click(&mut self, index: usize, now_ms: f64) -> u8 {
        let in_window = self
            .last_clicked
            .is_some_and(|t| now_ms - t < CLICK_WINDOW_MS);
        if self.last_index == Some(index) && in_window {
            self.times_clicked = (self.times_clicked + 1).min(MAX_CLICKS);
        } else {
            self.reset_state();
            self.last_index = Some(index);
            self.times_clicked = 1;
        }
        self.last_clicked = Some(now_ms);
        self.times_clicked
    }

    /// Forget the current gesture.
    pub fn reset_state(&mut self) {
        *self = Self::default();
    }

    /// Clicks in the current gesture.
    pub fn times_clicked(&self) -> u8 {
        self.times_clicked
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/click.rs"]
mod tests;
