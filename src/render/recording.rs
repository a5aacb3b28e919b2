//! Headless backend that records draw calls and accounts for every native allocation.
//!
//! Paragraphs use a fixed monospace model so layout is deterministic: every char advances
//! `0.5 * font_size`, every line is `1.2 * font_size` tall, and lines break greedily at
//! whitespace and at `\n`.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::foundation::core::{BezPath, Color, PathCmd, Point, RRect, Rect, bezpath_from_cmds};
use crate::foundation::error::{SkeneError, SkeneResult};
use crate::render::backend::{
    GraphicsBackend, LineMetrics, PaintHandle, PaintState, ParagraphHandle, ResourceKind,
};
use crate::style::color::resolve_color;
use crate::style::paragraph::{ParagraphStyle, TextAlign};
use crate::text::boundary::word_boundary;

const CHAR_WIDTH_EM: f32 = 0.5;
const LINE_HEIGHT_EM: f32 = 1.2;
const ASCENT_EM: f32 = 1.0;

/// One recorded drawing call.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum DrawCommand {
    Save,
    Restore,
    Clear(Color),
    Rotate { degrees: f64, px: f64, py: f64 },
    RRect { rrect: RRect, paint: PaintState },
    Line { p0: Point, p1: Point, paint: PaintState },
    Text { text: String, origin: Point, size: f32, paint: PaintState },
    Path { path: u64, paint: PaintState },
    Paragraph { paragraph: u64, origin: Point, lines: usize },
    Image { image: u64, origin: Point, paint: PaintState },
    Flush,
}

/// A drawing call together with the surface it targeted.
#[derive(Clone, Debug, PartialEq)]
pub struct Recorded {
    /// Id of the target surface.
    pub surface: u64,
    /// The call.
    pub command: DrawCommand,
}

/// Recorded paint.
#[derive(Debug)]
pub struct RecordedPaint {
    id: u64,
    state: PaintState,
}

impl RecordedPaint {
    /// Resource id.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl PaintHandle for RecordedPaint {
    fn state(&self) -> &PaintState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PaintState {
        &mut self.state
    }
}

/// Recorded font.
#[derive(Debug)]
pub struct RecordedFont {
    id: u64,
    size: f32,
}

impl RecordedFont {
    /// Resource id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Font size in pixels.
    pub fn size(&self) -> f32 {
        self.size
    }
}

/// Recorded path.
#[derive(Debug)]
pub struct RecordedPath {
    id: u64,
    path: BezPath,
}

impl RecordedPath {
    /// Resource id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Path geometry.
    pub fn path(&self) -> &BezPath {
        &self.path
    }
}

/// Recorded surface; the canvas bound to it is implicit.
#[derive(Debug)]
pub struct RecordedSurface {
    id: u64,
    width: u32,
    height: u32,
    depth: usize,
}

impl RecordedSurface {
    /// Resource id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Pixel size.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Current save depth.
    pub fn save_depth(&self) -> usize {
        self.depth
    }
}

/// Recorded surface snapshot.
#[derive(Debug)]
pub struct RecordedImage {
    id: u64,
    source: u64,
}

impl RecordedImage {
    /// Resource id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Id of the surface the image was captured from.
    pub fn source(&self) -> u64 {
        self.source
    }
}

/// Font manager listing the families the recording backend pretends to know.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordingFontManager {
    /// Registered family names.
    pub families: Vec<String>,
}

/// Monospace paragraph.
#[derive(Debug)]
pub struct RecordedParagraph {
    id: u64,
    text: String,
    chars: Vec<char>,
    font_size: f32,
    color: Color,
    align: TextAlign,
    max_lines: Option<usize>,
    width: f32,
    lines: Vec<LineMetrics>,
}

impl RecordedParagraph {
    /// Resource id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Resolved glyph color.
    pub fn color(&self) -> Color {
        self.color
    }

    fn char_width(&self) -> f64 {
        f64::from(self.font_size * CHAR_WIDTH_EM)
    }

    fn line_height(&self) -> f64 {
        f64::from(self.font_size * LINE_HEIGHT_EM)
    }

    /// Greedy line breaking over one hard line `[s, e)`; returns `(start, visible_end, end)`.
    fn break_segment(&self, s: usize, e: usize, max_chars: usize, out: &mut Vec<(usize, usize, usize)>) {
        let is_ws = |i: usize| self.chars[i].is_whitespace();
        let mut start = s;
        loop {
            let mut visible = e;
            while visible > start && is_ws(visible - 1) {
                visible -= 1;
            }
            if visible - start <= max_chars {
                out.push((start, visible, e));
                return;
            }

            let limit = start + max_chars;
            match (start + 1..=limit).rev().find(|&i| is_ws(i)) {
                Some(b) => {
                    let mut next = b;
                    while next < e && is_ws(next) {
                        next += 1;
                    }
                    let mut vis = b;
                    while vis > start && is_ws(vis - 1) {
                        vis -= 1;
                    }
                    out.push((start, vis, next));
                    start = next;
                }
                None => {
                    out.push((start, limit, limit));
                    start = limit;
                }
            }
            if start >= e {
                return;
            }
        }
    }

    fn line_at_y(&self, y: f64) -> Option<&LineMetrics> {
        let idx = (y / self.line_height()).floor().max(0.0) as usize;
        self.lines.get(idx).or_else(|| self.lines.last())
    }
}

impl ParagraphHandle for RecordedParagraph {
    fn layout(&mut self, width: f32) {
        self.width = width;
        let cw = self.char_width();
        let max_chars = ((f64::from(width) / cw).floor() as usize).max(1);

        let mut spans = Vec::new();
        let mut seg_start = 0;
        let n = self.chars.len();
        let mut newline_ends = Vec::new();
        for i in 0..=n {
            if i == n || self.chars[i] == '\n' {
                self.break_segment(seg_start, i, max_chars, &mut spans);
                newline_ends.push((spans.len() - 1, i < n));
                seg_start = i + 1;
            }
        }

        let lh = self.line_height();
        let ascent = f64::from(self.font_size * ASCENT_EM);
        let mut lines = Vec::with_capacity(spans.len());
        for (k, (start, visible, end)) in spans.into_iter().enumerate() {
            let ends_with_newline = newline_ends.iter().any(|&(line, nl)| line == k && nl);
            let w = (visible - start) as f64 * cw;
            let slack = (f64::from(width) - w).max(0.0);
            let left = match self.align {
                TextAlign::Left | TextAlign::Start | TextAlign::Justify => 0.0,
                TextAlign::Right | TextAlign::End => slack,
                TextAlign::Center => slack / 2.0,
            };
            lines.push(LineMetrics {
                start_index: start,
                end_index: end,
                end_excluding_whitespace: visible,
                end_including_newline: if ends_with_newline { end + 1 } else { end },
                line_number: k,
                ascent,
                descent: lh - ascent,
                height: lh,
                width: w,
                baseline: k as f64 * lh + ascent,
                left,
            });
        }
        if let Some(max) = self.max_lines {
            lines.truncate(max.max(1));
        }
        self.lines = lines;
    }

    fn line_metrics(&self) -> Vec<LineMetrics> {
        self.lines.clone()
    }

    fn text_len(&self) -> usize {
        self.chars.len()
    }

    fn glyph_position_at(&self, x: f64, y: f64) -> Option<usize> {
        if x < 0.0 || y < 0.0 || x > f64::from(self.width) || y > f64::from(self.height()) {
            return None;
        }
        let line = self.line_at_y(y)?;
        let col = ((x - line.left) / self.char_width()).round().max(0.0) as usize;
        Some((line.start_index + col).min(line.end_excluding_whitespace))
    }

    fn word_boundary(&self, index: usize) -> Range<usize> {
        word_boundary(&self.text, index)
    }

    fn rects_for_range(&self, start: usize, end: usize) -> Vec<Rect> {
        let cw = self.char_width();
        self.lines
            .iter()
            .filter_map(|l| {
                let a = start.max(l.start_index);
                let b = end.min(l.end_index);
                (a < b).then(|| {
                    let x0 = l.left + (a - l.start_index) as f64 * cw;
                    let x1 = l.left + (b - l.start_index) as f64 * cw;
                    Rect::new(x0, l.top(), x1, l.top() + l.height)
                })
            })
            .collect()
    }

    fn max_width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        (self.lines.len() as f64 * self.line_height()) as f32
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Tally {
    allocated: u64,
    released: u64,
}

/// Recording implementation of [`GraphicsBackend`].
#[derive(Debug, Default)]
pub struct RecordingBackend {
    next_id: u64,
    tallies: BTreeMap<ResourceKind, Tally>,
    log: Vec<Recorded>,
    fonts: RecordingFontManager,
}

impl RecordingBackend {
    /// Empty backend.
    pub fn new() -> Self {
        Self {
            fonts: RecordingFontManager {
                families: vec!["Roboto".to_owned()],
            },
            ..Self::default()
        }
    }

    /// Number of resources of `kind` ever allocated.
    pub fn allocated(&self, kind: ResourceKind) -> u64 {
        self.tallies.get(&kind).map_or(0, |t| t.allocated)
    }

    /// Number of resources of `kind` released.
    pub fn released(&self, kind: ResourceKind) -> u64 {
        self.tallies.get(&kind).map_or(0, |t| t.released)
    }

    /// Number of resources of `kind` currently alive.
    pub fn live(&self, kind: ResourceKind) -> u64 {
        self.allocated(kind).saturating_sub(self.released(kind))
    }

    /// Every recorded call, oldest first.
    pub fn commands(&self) -> &[Recorded] {
        &self.log
    }

    /// Recorded calls that targeted `surface`.
    pub fn commands_for(&self, surface: u64) -> impl Iterator<Item = &DrawCommand> {
        self.log
            .iter()
            .filter(move |r| r.surface == surface)
            .map(|r| &r.command)
    }

    /// Drop the call log; resource tallies are kept.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    fn alloc(&mut self, kind: ResourceKind) -> u64 {
        self.tallies.entry(kind).or_default().allocated += 1;
        self.next_id += 1;
        self.next_id
    }

    fn release(&mut self, kind: ResourceKind) {
        self.tallies.entry(kind).or_default().released += 1;
    }

    fn record(&mut self, surface: &RecordedSurface, command: DrawCommand) {
        self.log.push(Recorded {
            surface: surface.id,
            command,
        });
    }
}

impl GraphicsBackend for RecordingBackend {
    type Paint = RecordedPaint;
    type Font = RecordedFont;
    type Path = RecordedPath;
    type Paragraph = RecordedParagraph;
    type Surface = RecordedSurface;
    type Image = RecordedImage;
    type FontManager = RecordingFontManager;

    fn make_paint(&mut self) -> Self::Paint {
        RecordedPaint {
            id: self.alloc(ResourceKind::Paint),
            state: PaintState::default(),
        }
    }

    fn make_font(&mut self, size: f32) -> Self::Font {
        RecordedFont {
            id: self.alloc(ResourceKind::Font),
            size,
        }
    }

    fn make_path_from_svg(&mut self, svg: &str) -> Option<Self::Path> {
        let path = BezPath::from_svg(svg).ok()?;
        Some(RecordedPath {
            id: self.alloc(ResourceKind::Path),
            path,
        })
    }

    fn make_path_from_cmds(&mut self, cmds: &[PathCmd]) -> SkeneResult<Self::Path> {
        let path = bezpath_from_cmds(cmds)?;
        Ok(RecordedPath {
            id: self.alloc(ResourceKind::Path),
            path,
        })
    }

    fn default_font_manager(&mut self) -> Self::FontManager {
        self.fonts.clone()
    }

    fn build_paragraph(
        &mut self,
        style: &ParagraphStyle,
        text: &str,
        _fonts: Option<&Self::FontManager>,
    ) -> SkeneResult<Self::Paragraph> {
        let font_size = style.text_style.font_size;
        if !font_size.is_finite() || font_size <= 0.0 {
            return Err(SkeneError::validation("paragraph font size must be finite and > 0"));
        }
        let color = resolve_color(&style.text_style.color)?;
        Ok(RecordedParagraph {
            id: self.alloc(ResourceKind::Paragraph),
            text: text.to_owned(),
            chars: text.chars().collect(),
            font_size,
            color,
            align: style.text_align,
            max_lines: style.max_lines,
            width: 0.0,
            lines: Vec::new(),
        })
    }

    fn make_surface(&mut self, width: u32, height: u32) -> SkeneResult<Self::Surface> {
        if width == 0 || height == 0 {
            return Err(SkeneError::backend(format!(
                "cannot allocate a {width}x{height} surface"
            )));
        }
        Ok(RecordedSurface {
            id: self.alloc(ResourceKind::Surface),
            width,
            height,
            depth: 0,
        })
    }

    fn snapshot(&mut self, surface: &mut Self::Surface) -> SkeneResult<Self::Image> {
        Ok(RecordedImage {
            id: self.alloc(ResourceKind::Image),
            source: surface.id,
        })
    }

    fn save(&mut self, target: &mut Self::Surface) {
        target.depth += 1;
        self.record(target, DrawCommand::Save);
    }

    fn restore(&mut self, target: &mut Self::Surface) {
        target.depth = target.depth.saturating_sub(1);
        self.record(target, DrawCommand::Restore);
    }

    fn clear(&mut self, target: &mut Self::Surface, color: Color) {
        self.record(target, DrawCommand::Clear(color));
    }

    fn rotate(&mut self, target: &mut Self::Surface, degrees: f64, px: f64, py: f64) {
        self.record(target, DrawCommand::Rotate { degrees, px, py });
    }

    fn draw_rrect(&mut self, target: &mut Self::Surface, rrect: &RRect, paint: &Self::Paint) {
        self.record(
            target,
            DrawCommand::RRect {
                rrect: *rrect,
                paint: paint.state,
            },
        );
    }

    fn draw_line(&mut self, target: &mut Self::Surface, p0: Point, p1: Point, paint: &Self::Paint) {
        self.record(
            target,
            DrawCommand::Line {
                p0,
                p1,
                paint: paint.state,
            },
        );
    }

    fn draw_text(
        &mut self,
        target: &mut Self::Surface,
        text: &str,
        origin: Point,
        paint: &Self::Paint,
        font: &Self::Font,
    ) {
        self.record(
            target,
            DrawCommand::Text {
                text: text.to_owned(),
                origin,
                size: font.size,
                paint: paint.state,
            },
        );
    }

    fn draw_path(&mut self, target: &mut Self::Surface, path: &Self::Path, paint: &Self::Paint) {
        self.record(
            target,
            DrawCommand::Path {
                path: path.id,
                paint: paint.state,
            },
        );
    }

    fn draw_paragraph(
        &mut self,
        target: &mut Self::Surface,
        paragraph: &Self::Paragraph,
        origin: Point,
    ) {
        self.record(
            target,
            DrawCommand::Paragraph {
                paragraph: paragraph.id,
                origin,
                lines: paragraph.lines.len(),
            },
        );
    }

    fn draw_image(
        &mut self,
        target: &mut Self::Surface,
        image: &Self::Image,
        origin: Point,
        paint: &Self::Paint,
    ) {
        self.record(
            target,
            DrawCommand::Image {
                image: image.id,
                origin,
                paint: paint.state,
            },
        );
    }

    fn flush(&mut self, target: &mut Self::Surface) {
        self.record(target, DrawCommand::Flush);
    }

    fn delete_paint(&mut self, _paint: Self::Paint) {
        self.release(ResourceKind::Paint);
    }

    fn delete_font(&mut self, _font: Self::Font) {
        self.release(ResourceKind::Font);
    }

    fn delete_path(&mut self, _path: Self::Path) {
        self.release(ResourceKind::Path);
    }

    fn delete_paragraph(&mut self, _paragraph: Self::Paragraph) {
        self.release(ResourceKind::Paragraph);
    }

    fn delete_surface(&mut self, _surface: Self::Surface) {
        self.release(ResourceKind::Surface);
    }

    fn delete_image(&mut self, _image: Self::Image) {
        self.release(ResourceKind::Image);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/recording.rs"]
mod tests;
