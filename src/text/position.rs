use crate::render::backend::LineMetrics;

/// Line/column location of a character index within laid-out text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Zero-based line.
    pub line: usize,
    /// Characters from the start of the line.
    pub column: usize,
}

impl Position {
    /// Position at `line`, `column`.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Resolve `index` against `metrics`.
    ///
    /// A line whose `start..=end_excluding_whitespace` holds the index wins; otherwise the
    /// first line whose `start..=end_index` holds it. `None` when no line does.
    pub fn from_index(index: usize, metrics: &[LineMetrics]) -> Option<Self> {
        let line = metrics
            .iter()
            .position(|m| (m.start_index..=m.end_excluding_whitespace).contains(&index))
            .or_else(|| {
                metrics
                    .iter()
                    .position(|m| (m.start_index..=m.end_index).contains(&index))
            })?;
        Some(Self {
            line,
            column: index - metrics[line].start_index,
        })
    }

    /// Character index of this position, or `None` when the line does not exist.
    pub fn to_index(&self, metrics: &[LineMetrics]) -> Option<usize> {
        metrics.get(self.line).map(|m| m.start_index + self.column)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/position.rs"]
mod tests;
