//! Single-paragraph text editing on top of a mounted `skParagraph` node.

use std::ops::Range;

use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{SkeneError, SkeneResult};
use crate::render::backend::{GraphicsBackend, ParagraphHandle};
use crate::runtime::root::RootState;
use crate::scene::graph::NodeId;
use crate::scene::leaf::paragraph::ParagraphNode;
use crate::text::boundary::byte_offset;
use crate::text::click::ClickCounter;
use crate::text::cursor::{Cursor, word_start_before};

/// Caret width in pixels.
pub const CURSOR_WIDTH: f64 = 3.0;

/// How much text a backspace removes when nothing is selected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeleteMode {
    /// The character before the caret.
    #[default]
    Char,
    /// Back to the start of the word (or previous word).
    Word,
    /// Back to the start of the line.
    Line,
}

/// Text editor bound to one paragraph node of a root.
///
/// Every edit rewrites the node text, then rebuilds and relays out the whole paragraph
/// before the cursor re-reads its line metrics. Coordinates passed to the mouse handlers
/// are in the parent space of the node.
#[derive(Debug)]
pub struct TextEditor {
    node: NodeId,
    cursor: Cursor,
    clicks: ClickCounter,
    dragging: bool,
}

fn paragraph_node<G: GraphicsBackend>(
    root: &RootState<G>,
    id: NodeId,
) -> SkeneResult<&ParagraphNode<G>> {
    root.graph
        .get(id)
        .and_then(|n| n.as_paragraph())
        .ok_or_else(|| SkeneError::structural(format!("{id:?} is not a live skParagraph")))
}

fn native<G: GraphicsBackend>(node: &ParagraphNode<G>) -> SkeneResult<&G::Paragraph> {
    node.paragraph()
        .ok_or_else(|| SkeneError::structural("paragraph edited before it was built"))
}

impl TextEditor {
    /// Bind to paragraph `node`, laying it out if needed. The caret starts at index 0.
    pub fn attach<G: GraphicsBackend>(root: &mut RootState<G>, node: NodeId) -> SkeneResult<Self> {
        let RootState { gfx, graph, .. } = root;
        let para = graph
            .get_mut(node)
            .and_then(|n| n.as_paragraph_mut())
            .ok_or_else(|| SkeneError::structural(format!("{node:?} is not a live skParagraph")))?;
        para.ensure_layout(gfx)?;
        Ok(Self {
            node,
            cursor: Cursor::new(native(para)?),
            clicks: ClickCounter::new(),
            dragging: false,
        })
    }

    /// Bound node.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Caret state.
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Caret state, for keyboard moves.
    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    /// Click gesture state.
    pub fn clicks(&self) -> &ClickCounter {
        &self.clicks
    }

    /// Return `true` between a hit `mouse_down` and the next `mouse_up`.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Native paragraph of the bound node, for word moves on the cursor.
    pub fn paragraph<'a, G: GraphicsBackend>(
        &self,
        root: &'a RootState<G>,
    ) -> SkeneResult<&'a G::Paragraph> {
        native(paragraph_node(root, self.node)?)
    }

    /// Current text of the bound node.
    pub fn text<'a, G: GraphicsBackend>(&self, root: &'a RootState<G>) -> SkeneResult<&'a str> {
        Ok(paragraph_node(root, self.node)?.text())
    }

    /// Insert `text` at the caret and move past it.
    pub fn insert_text<G: GraphicsBackend>(
        &mut self,
        root: &mut RootState<G>,
        text: &str,
    ) -> SkeneResult<()> {
        let at = self.cursor.index();
        self.splice(root, at..at, text, at + text.chars().count())
    }

    /// Delete the selection, or text before the caret as chosen by `mode`.
    pub fn backspace<G: GraphicsBackend>(
        &mut self,
        root: &mut RootState<G>,
        mode: DeleteMode,
    ) -> SkeneResult<()> {
        if let Some(range) = self.cursor.selection_range() {
            return self.remove_selection(root, range);
        }
        let index = self.cursor.index();
        let from = match mode {
            DeleteMode::Char => index.saturating_sub(1),
            DeleteMode::Word => word_start_before(self.paragraph(root)?, index),
            DeleteMode::Line => self.cursor.line_metrics().get(self.cursor.position().line).map_or(0, |m| m.start_index),
        };
        if from == index {
            return Ok(());
        }
        self.splice(root, from..index, "", from)
    }

    /// Delete the selection, or the character after the caret.
    pub fn delete_forward<G: GraphicsBackend>(&mut self, root: &mut RootState<G>) -> SkeneResult<()> {
        if let Some(range) = self.cursor.selection_range() {
            return self.remove_selection(root, range);
        }
        let index = self.cursor.index();
        if index >= self.text(root)?.chars().count() {
            return Ok(());
        }
        self.splice(root, index..index + 1, "", index)
    }

    /// Select the whole text, leaving the caret at the end.
    pub fn select_all(&mut self) {
        self.cursor.clear_selection();
        self.clicks.reset_state();
        self.cursor.move_top(true);
        self.cursor.move_bottom(true);
    }

    /// Selected text, if any.
    pub fn selected_text<G: GraphicsBackend>(
        &self,
        root: &RootState<G>,
    ) -> SkeneResult<Option<String>> {
        let Some(range) = self.cursor.selection_range() else {
            return Ok(None);
        };
        let text = self.text(root)?;
        Ok(Some(slice_chars(text, range).to_owned()))
    }

    /// Remove the selection and return it.
    pub fn cut_selection<G: GraphicsBackend>(
        &mut self,
        root: &mut RootState<G>,
    ) -> SkeneResult<Option<String>> {
        let Some(range) = self.cursor.selection_range() else {
            return Ok(None);
        };
        let cut = slice_chars(self.text(root)?, range.clone()).to_owned();
        self.remove_selection(root, range)?;
        Ok(Some(cut))
    }

    /// Press at `(x, y)`.
    ///
    /// One click places the caret and starts a drag selection, two select the word and
    /// three select the line. Returns `false` when the point misses the text.
    pub fn mouse_down<G: GraphicsBackend>(
        &mut self,
        root: &mut RootState<G>,
        x: f64,
        y: f64,
        now_ms: f64,
    ) -> SkeneResult<bool> {
        let Some(index) = self.hit(root, x, y)? else {
            return Ok(false);
        };
        self.cursor.clear_selection();
        self.dragging = true;
        match self.clicks.handle_click(index, now_ms) {
            2 => {
                self.cursor.move_to_index(index, false);
                let para = self.paragraph(root)?;
                self.cursor.select_word(para);
            }
            3 => {
                self.cursor.move_to_index(index, false);
                self.cursor.select_line();
            }
            _ => {
                self.cursor.move_to_index(index, true);
            }
        }
        root.invalidate();
        Ok(true)
    }

    /// Extend the drag selection to `(x, y)`. Returns `false` when nothing moved.
    pub fn mouse_move<G: GraphicsBackend>(
        &mut self,
        root: &mut RootState<G>,
        x: f64,
        y: f64,
    ) -> SkeneResult<bool> {
        if !self.dragging {
            return Ok(false);
        }
        let Some(index) = self.hit(root, x, y)? else {
            return Ok(false);
        };
        self.cursor.move_to_index(index, true);
        root.invalidate();
        Ok(true)
    }

    /// End a drag.
    pub fn mouse_up(&mut self) {
        self.dragging = false;
    }

    /// Caret box in the parent space of the node.
    ///
    /// The caret sits before the character at the index, or after the last character at
    /// the end of the text. Empty text falls back to the line box.
    pub fn cursor_caret_rect<G: GraphicsBackend>(
        &self,
        root: &RootState<G>,
    ) -> SkeneResult<Option<Rect>> {
        let node = paragraph_node(root, self.node)?;
        let para = native(node)?;
        let index = self.cursor.index();
        let at_end = index > 0 && index == self.cursor.last_index();
        let caret = if at_end {
            para.rects_for_range(index - 1, index)
                .first()
                .map(|r| Rect::new(r.x1, r.y0, r.x1 + CURSOR_WIDTH, r.y1))
        } else {
            self.cursor
                .cursor_rect(para)
                .map(|r| Rect::new(r.x0, r.y0, r.x0 + CURSOR_WIDTH, r.y1))
        };
        let caret = caret.or_else(|| {
            let line = self.cursor.line_metrics().get(self.cursor.position().line)?;
            let top = line.top();
            Some(Rect::new(line.left, top, line.left + CURSOR_WIDTH, top + line.height))
        });
        Ok(caret.map(|r| r + node.origin().to_vec2()))
    }

    /// Selection boxes in the parent space of the node.
    pub fn selection_rects<G: GraphicsBackend>(&self, root: &RootState<G>) -> SkeneResult<Vec<Rect>> {
        let node = paragraph_node(root, self.node)?;
        let offset = node.origin().to_vec2();
        Ok(self
            .cursor
            .selection_rects(native(node)?)
            .into_iter()
            .map(|r| r + offset)
            .collect())
    }

    fn hit<G: GraphicsBackend>(&self, root: &RootState<G>, x: f64, y: f64) -> SkeneResult<Option<usize>> {
        let node = paragraph_node(root, self.node)?;
        let para = native(node)?;
        let local = Point::new(x, y) - node.origin().to_vec2();
        let height: f64 = self.cursor.line_metrics().iter().map(|m| m.height).sum();
        let inside = local.x >= 0.0
            && local.y >= 0.0
            && local.x <= f64::from(para.max_width())
            && local.y <= height;
        if !inside {
            return Ok(None);
        }
        Ok(para.glyph_position_at(local.x, local.y))
    }

    fn remove_selection<G: GraphicsBackend>(
        &mut self,
        root: &mut RootState<G>,
        range: Range<usize>,
    ) -> SkeneResult<()> {
        let start = range.start;
        self.cursor.clear_selection();
        self.dragging = false;
        self.splice(root, range, "", start)
    }

    /// Replace chars `range` with `insert`, rebuild, and put the caret at `caret`.
    fn splice<G: GraphicsBackend>(
        &mut self,
        root: &mut RootState<G>,
        range: Range<usize>,
        insert: &str,
        caret: usize,
    ) -> SkeneResult<()> {
        let RootState { gfx, graph, .. } = &mut *root;
        let para = graph
            .get_mut(self.node)
            .and_then(|n| n.as_paragraph_mut())
            .ok_or_else(|| SkeneError::structural(format!("{:?} is not a live skParagraph", self.node)))?;

        let text = para.text();
        let (a, b) = (byte_offset(text, range.start), byte_offset(text, range.end));
        let mut next = String::with_capacity(text.len() + insert.len());
        next.push_str(&text[..a]);
        next.push_str(insert);
        next.push_str(&text[b..]);

        para.set_text(next);
        para.build(gfx)?;
        para.layout(para.width())?;
        self.cursor.update_line_metrics(native(para)?);
        self.cursor.move_to_index(caret, false);
        self.clicks.reset_state();
        tracing::trace!(chars = para.text().chars().count(), caret, "paragraph edited");
        root.invalidate();
        Ok(())
    }
}

fn slice_chars(text: &str, range: Range<usize>) -> &str {
    &text[byte_offset(text, range.start)..byte_offset(text, range.end)]
}

#[cfg(test)]
#[path = "../../tests/unit/text/editor.rs"]
mod tests;
