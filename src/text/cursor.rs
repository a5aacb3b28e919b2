use std::ops::Range;

use crate::foundation::core::Rect;
use crate::render::backend::{LineMetrics, ParagraphHandle};
use crate::text::position::Position;

/// Anchor/extent pair of character indices. Either end may be unset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    /// Where the selection started.
    pub start: Option<usize>,
    /// Where the selection currently ends.
    pub end: Option<usize>,
}

impl Selection {
    /// Ordered `min..max` range when both ends are set.
    pub fn range(&self) -> Option<Range<usize>> {
        let (a, b) = (self.start?, self.end?);
        Some(a.min(b)..a.max(b))
    }
}

/// Caret over a laid-out paragraph, addressed by flat character index.
///
/// The cursor keeps a copy of the paragraph's line metrics; call
/// [`Cursor::update_line_metrics`] after every rebuild or reflow.
///
/// Every `move_*` takes a `select` flag. When set, the first selecting move anchors the
/// selection at its target index and later ones extend it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cursor {
    position: Position,
    index: usize,
    text_len: usize,
    line_metrics: Vec<LineMetrics>,
    selection: Selection,
}

impl Cursor {
    /// Cursor at the start of `paragraph`.
    pub fn new<P: ParagraphHandle + ?Sized>(paragraph: &P) -> Self {
        Self::at_index(paragraph, 0)
    }

    /// Cursor at `index` of `paragraph`, clamped to the text.
    pub fn at_index<P: ParagraphHandle + ?Sized>(paragraph: &P, index: usize) -> Self {
        let mut cursor = Self {
            text_len: paragraph.text_len(),
            line_metrics: paragraph.line_metrics(),
            ..Self::default()
        };
        cursor.move_to_index(index, false);
        cursor
    }

    /// Character index of the caret.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Line/column of the caret.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Line metrics as of the last refresh.
    pub fn line_metrics(&self) -> &[LineMetrics] {
        &self.line_metrics
    }

    /// Current selection ends.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Re-read line metrics from `paragraph` and re-resolve the caret against them.
    pub fn update_line_metrics<P: ParagraphHandle + ?Sized>(&mut self, paragraph: &P) {
        self.text_len = paragraph.text_len();
        self.line_metrics = paragraph.line_metrics();
        self.move_to_index(self.index, false);
    }

    /// End of the text, or 0 for empty text.
    pub fn last_index(&self) -> usize {
        self.text_len
    }

    fn current_line(&self) -> Option<&LineMetrics> {
        self.line_metrics.get(self.position.line)
    }

    /// Place the caret at `index`, clamped to the text.
    pub fn move_to_index(&mut self, index: usize, select: bool) -> &mut Self {
        let index = index.min(self.last_index());
        // Text cut by `max_lines` has no line of its own; it extends the last kept one.
        self.position = Position::from_index(index, &self.line_metrics)
            .or_else(|| {
                let last = self.line_metrics.len().checked_sub(1)?;
                let start = self.line_metrics[last].start_index;
                Some(Position::new(last, index.saturating_sub(start)))
            })
            .unwrap_or_default();
        self.index = index;
        if select {
            if self.selection.start.is_none() {
                self.selection.start = Some(index);
            }
            self.selection.end = Some(index);
        }
        self
    }

    /// Move by `delta` characters, clamped to the text.
    pub fn move_x(&mut self, delta: isize, select: bool) -> &mut Self {
        let next = self.index.saturating_add_signed(delta).min(self.last_index());
        self.move_to_index(next, select)
    }

    /// Move by `delta` lines, keeping the column where the target line allows.
    pub fn move_y(&mut self, delta: isize, select: bool) -> &mut Self {
        let Some(last_line) = self.line_metrics.len().checked_sub(1) else {
            return self;
        };
        let next_line = self.position.line.saturating_add_signed(delta).min(last_line);
        let column = self.current_line().map_or(0, |m| self.index - m.start_index);
        let next = &self.line_metrics[next_line];
        let index = (next.start_index + column).min(next.end_index);
        self.move_to_index(index, select)
    }

    /// One character back.
    pub fn move_left(&mut self, select: bool) -> &mut Self {
        self.move_x(-1, select)
    }

    /// One character forward.
    pub fn move_right(&mut self, select: bool) -> &mut Self {
        self.move_x(1, select)
    }

    /// One line up.
    pub fn move_up(&mut self, select: bool) -> &mut Self {
        self.move_y(-1, select)
    }

    /// One line down.
    pub fn move_down(&mut self, select: bool) -> &mut Self {
        self.move_y(1, select)
    }

    /// Start of the text.
    pub fn move_top(&mut self, select: bool) -> &mut Self {
        self.move_to_index(0, select)
    }

    /// End of the text.
    pub fn move_bottom(&mut self, select: bool) -> &mut Self {
        self.move_to_index(self.last_index(), select)
    }

    /// Start of the current line.
    pub fn move_start_of_line(&mut self, select: bool) -> &mut Self {
        let start = self.current_line().map_or(0, |m| m.start_index);
        self.move_to_index(start, select)
    }

    /// End of the visible content of the current line.
    pub fn move_end_of_line(&mut self, select: bool) -> &mut Self {
        let end = self
            .current_line()
            .map_or(0, |m| m.end_excluding_whitespace);
        self.move_to_index(end, select)
    }

    /// Start of the current word, or of the previous word when already at a word start.
    ///
    /// [`Cursor::move_end_of_word`] has no matching skip-forward step.
    pub fn move_start_of_word<P: ParagraphHandle + ?Sized>(
        &mut self,
        paragraph: &P,
        select: bool,
    ) -> &mut Self {
        let target = word_start_before(paragraph, self.index);
        self.move_to_index(target, select)
    }

    /// End of the word containing the caret.
    pub fn move_end_of_word<P: ParagraphHandle + ?Sized>(
        &mut self,
        paragraph: &P,
        select: bool,
    ) -> &mut Self {
        let end = paragraph.word_boundary(self.index).end;
        self.move_to_index(end, select)
    }

    /// Set both ends of the selection.
    pub fn select(&mut self, from: usize, to: usize) {
        self.selection = Selection {
            start: Some(from),
            end: Some(to),
        };
    }

    /// Select the word under the caret.
    pub fn select_word<P: ParagraphHandle + ?Sized>(&mut self, paragraph: &P) {
        self.move_start_of_word(paragraph, true);
        self.move_end_of_word(paragraph, true);
    }

    /// Select the visible content of the current line.
    pub fn select_line(&mut self) {
        self.move_start_of_line(true);
        self.move_end_of_line(true);
    }

    /// Unset both selection ends.
    pub fn clear_selection(&mut self) {
        self.selection = Selection::default();
    }

    /// Return `true` when both ends are set.
    pub fn selection_is_valid(&self) -> bool {
        self.selection.start.is_some() && self.selection.end.is_some()
    }

    /// Ordered selection range.
    pub fn selection_range(&self) -> Option<Range<usize>> {
        self.selection.range()
    }

    /// Paragraph-space boxes covering the selection. Empty without a selection.
    pub fn selection_rects<P: ParagraphHandle + ?Sized>(&self, paragraph: &P) -> Vec<Rect> {
        match self.selection_range() {
            Some(r) => paragraph.rects_for_range(r.start, r.end),
            None => Vec::new(),
        }
    }

    /// Box of the character after the caret, or `None` at the end of the text.
    pub fn cursor_rect<P: ParagraphHandle + ?Sized>(&self, paragraph: &P) -> Option<Rect> {
        paragraph
            .rects_for_range(self.index, self.index + 1)
            .into_iter()
            .next()
    }
}

/// Word start used by backward word moves and word deletion.
pub(crate) fn word_start_before<P: ParagraphHandle + ?Sized>(paragraph: &P, index: usize) -> usize {
    let start = paragraph.word_boundary(index).start;
    if start == index {
        paragraph.word_boundary(start.saturating_sub(1)).start
    } else {
        start
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/cursor.rs"]
mod tests;
