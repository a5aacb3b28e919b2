use std::borrow::Cow;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use parley::layout::PositionedLayoutItem;

use crate::foundation::core::{
    Affine, BezPath, Color, PathCmd, Point, RRect, Rect, bezpath_from_cmds,
};
use crate::foundation::error::{SkeneError, SkeneResult};
use crate::render::backend::{
    GraphicsBackend, LineMetrics, PaintHandle, PaintState, ParagraphHandle,
};
use crate::style::color::resolve_color;
use crate::style::paint::{BlendMode, PaintMode};
use crate::style::paragraph::{ParagraphStyle, TextAlign};
use crate::text::boundary::word_boundary;

/// Brush carried through parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Color> for TextBrushRgba8 {
    fn from(c: Color) -> Self {
        let [r, g, b, a] = c.to_rgba8();
        Self { r, g, b, a }
    }
}

/// Options for [`CpuBackend`].
#[derive(Clone, Debug)]
pub struct CpuBackendOpts {
    /// Size used by `make_font` when asked for a non-positive size.
    pub default_font_size: f32,
    /// Font files registered at startup; they form the default font manager.
    pub fonts: Vec<Vec<u8>>,
}

impl Default for CpuBackendOpts {
    fn default() -> Self {
        Self {
            default_font_size: 12.0,
            fonts: Vec::new(),
        }
    }
}

/// Font families known to the backend's font collection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CpuFontManager {
    families: Vec<String>,
}

impl CpuFontManager {
    /// Registered family names.
    pub fn families(&self) -> &[String] {
        &self.families
    }
}

/// Paint handle.
#[derive(Clone, Debug, Default)]
pub struct CpuPaint {
    state: PaintState,
}

impl PaintHandle for CpuPaint {
    fn state(&self) -> &PaintState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PaintState {
        &mut self.state
    }
}

/// Font handle; glyphs come from the default font manager.
#[derive(Clone, Copy, Debug)]
pub struct CpuFont {
    size: f32,
}

/// Path handle.
#[derive(Clone, Debug)]
pub struct CpuPath {
    path: vello_cpu::kurbo::BezPath,
}

/// Raster target plus the canvas state bound to it.
pub struct CpuSurface {
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    width: u16,
    height: u16,
    transform: Affine,
    stack: Vec<Affine>,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("save_depth", &self.stack.len())
            .finish()
    }
}

impl CpuSurface {
    /// Width in pixels.
    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    /// Flushed pixels as premultiplied RGBA8.
    pub fn premul_rgba8(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Flushed pixels as straight-alpha RGBA8.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = self.pixmap.data_as_u8_slice().to_vec();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }

    fn render(&mut self) {
        self.ctx.flush();
        self.pixmap.data_as_u8_slice_mut().fill(0);
        self.ctx.render_to_pixmap(&mut self.pixmap);
    }
}

/// Snapshot of a surface.
#[derive(Clone)]
pub struct CpuImage {
    paint: vello_cpu::Image,
    width: u16,
    height: u16,
}

impl std::fmt::Debug for CpuImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Parley-shaped paragraph.
pub struct CpuParagraph {
    layout: parley::Layout<TextBrushRgba8>,
    ellipsis: Option<parley::Layout<TextBrushRgba8>>,
    text: String,
    chars: Vec<char>,
    char_of_byte: Vec<usize>,
    byte_of_char: Vec<usize>,
    alignment: parley::Alignment,
    font_size: f32,
    max_lines: Option<usize>,
    width: f32,
    lines: Vec<LineMetrics>,
    ellipsis_at: Option<(usize, f32)>,
}

impl std::fmt::Debug for CpuParagraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuParagraph")
            .field("text", &self.text)
            .field("width", &self.width)
            .field("lines", &self.lines.len())
            .field("ellipsis_at", &self.ellipsis_at)
            .finish()
    }
}

impl CpuParagraph {
    fn new(
        layout: parley::Layout<TextBrushRgba8>,
        ellipsis: Option<parley::Layout<TextBrushRgba8>>,
        text: &str,
        style: &ParagraphStyle,
    ) -> Self {
        let mut char_of_byte = vec![0; text.len() + 1];
        let mut byte_of_char = Vec::with_capacity(text.len() + 1);
        let mut count = 0;
        for (b, ch) in text.char_indices() {
            char_of_byte[b..b + ch.len_utf8()].fill(count);
            byte_of_char.push(b);
            count += 1;
        }
        char_of_byte[text.len()] = count;
        byte_of_char.push(text.len());

        Self {
            layout,
            ellipsis,
            text: text.to_owned(),
            chars: text.chars().collect(),
            char_of_byte,
            byte_of_char,
            alignment: alignment_for(style.text_align),
            font_size: style.text_style.font_size,
            max_lines: style.max_lines,
            width: 0.0,
            lines: Vec::new(),
            ellipsis_at: None,
        }
    }

    fn char_at_byte(&self, b: usize) -> usize {
        self.char_of_byte
            .get(b)
            .copied()
            .unwrap_or(self.chars.len())
    }

    fn byte_at_char(&self, c: usize) -> usize {
        self.byte_of_char
            .get(c)
            .copied()
            .unwrap_or(self.text.len())
    }

    fn visible_lines(&self) -> usize {
        self.max_lines.map_or(usize::MAX, |m| m.max(1))
    }

    /// Where the ellipsis starts on the last kept line, when `max_lines` cut the text.
    ///
    /// The point is in paragraph space with `y` on that line's baseline.
    pub fn ellipsis_origin(&self) -> Option<Point> {
        let (line, x) = self.ellipsis_at?;
        let baseline = self.lines.get(line)?.baseline;
        Some(Point::new(f64::from(x), baseline))
    }

    fn rebuild_metrics(&mut self) {
        let keep = self.visible_lines();
        let mut lines = Vec::new();

        for (li, line) in self.layout.lines().take(keep).enumerate() {
            let r = line.text_range();
            let start = self.char_at_byte(r.start);
            let full_end = self.char_at_byte(r.end);
            let ends_with_newline = full_end > start && self.chars[full_end - 1] == '\n';
            let end = if ends_with_newline { full_end - 1 } else { full_end };
            let mut visible = end;
            while visible > start && self.chars[visible - 1].is_whitespace() {
                visible -= 1;
            }

            let m = line.metrics();
            lines.push(LineMetrics {
                start_index: start,
                end_index: end,
                end_excluding_whitespace: visible,
                end_including_newline: full_end,
                line_number: li,
                ascent: f64::from(m.ascent),
                descent: f64::from(m.descent),
                height: f64::from(m.line_height),
                width: f64::from(m.advance - m.trailing_whitespace),
                baseline: f64::from(m.baseline),
                left: f64::from(m.offset),
            });
        }

        if lines.is_empty() {
            let h = f64::from(self.font_size) * 1.2;
            lines.push(LineMetrics {
                ascent: f64::from(self.font_size),
                descent: h - f64::from(self.font_size),
                height: h,
                baseline: f64::from(self.font_size),
                ..LineMetrics::default()
            });
        }

        self.lines = lines;
        self.ellipsis_at = self.place_ellipsis();
    }

    /// Cut position on the last kept line so that the kept clusters plus the ellipsis fit
    /// the layout width. Trailing spaces before the cut are dropped.
    fn place_ellipsis(&self) -> Option<(usize, f32)> {
        let ellipsis = self.ellipsis.as_ref()?;
        let keep = self.visible_lines();
        if self.layout.len() <= keep {
            return None;
        }
        let line_index = keep - 1;
        let line = self.layout.get(line_index)?;
        let limit = self.width - ellipsis.full_width();
        let mut cut = line.metrics().offset;
        for item in line.items() {
            let PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let mut x = run.offset();
            for cluster in run.run().visual_clusters() {
                x += cluster.advance();
                if x > limit {
                    return Some((line_index, cut));
                }
                if !cluster.is_space_or_nbsp() {
                    cut = x;
                }
            }
        }
        Some((line_index, cut))
    }

    fn line_at_y(&self, y: f64) -> Option<&LineMetrics> {
        self.lines
            .iter()
            .find(|l| y <= l.baseline + l.descent)
            .or_else(|| self.lines.last())
    }
}

impl ParagraphHandle for CpuParagraph {
    fn layout(&mut self, width: f32) {
        self.width = width;
        self.layout.break_all_lines(Some(width));
        self.layout
            .align(Some(width), self.alignment, parley::AlignmentOptions::default());
        self.rebuild_metrics();
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
        let cursor = parley::Cursor::from_point(&self.layout, x as f32, y as f32);
        let index = self.char_at_byte(cursor.index());
        Some(index.clamp(line.start_index, line.end_excluding_whitespace))
    }

    fn word_boundary(&self, index: usize) -> Range<usize> {
        let len = self.chars.len();
        if index >= len {
            return len..len;
        }
        // Clusters only exist once lines are broken.
        let Some(cluster) = parley::Cluster::from_byte_index(&self.layout, self.byte_at_char(index))
        else {
            return word_boundary(&self.text, index);
        };
        let start = if cluster.is_word_boundary() {
            cluster.text_range().start
        } else {
            cluster
                .previous_logical_word()
                .map_or(0, |c| c.text_range().start)
        };
        let end = cluster
            .next_logical_word()
            .map_or(self.text.len(), |n| n.text_range().start);
        self.char_at_byte(start)..self.char_at_byte(end)
    }

    fn rects_for_range(&self, start: usize, end: usize) -> Vec<Rect> {
        if start >= end {
            return Vec::new();
        }
        let (a, b) = (self.byte_at_char(start), self.byte_at_char(end));
        let selection = parley::Selection::new(
            parley::Cursor::from_byte_index(&self.layout, a, parley::Affinity::Downstream),
            parley::Cursor::from_byte_index(&self.layout, b, parley::Affinity::Upstream),
        );
        let keep = self.visible_lines();
        selection
            .geometry(&self.layout)
            .into_iter()
            .filter(|(_, line)| *line < keep)
            .map(|(bb, _)| Rect::new(bb.x0, bb.y0, bb.x1, bb.y1))
            .collect()
    }

    fn max_width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.lines
            .last()
            .map_or(0.0, |l| (l.baseline + l.descent) as f32)
    }
}

/// CPU raster backend built on `vello_cpu` with `parley` text.
pub struct CpuBackend {
    opts: CpuBackendOpts,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    font_data: HashMap<(u64, u32), vello_cpu::peniko::FontData>,
    fonts: CpuFontManager,
}

impl CpuBackend {
    /// Construct a backend and register `opts.fonts`.
    pub fn new(opts: CpuBackendOpts) -> SkeneResult<Self> {
        let mut out = Self {
            opts: opts.clone(),
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            font_data: HashMap::new(),
            fonts: CpuFontManager::default(),
        };
        for bytes in opts.fonts {
            let mgr = out.register_fonts(bytes)?;
            out.fonts.families.extend(mgr.families);
        }
        tracing::debug!(families = ?out.fonts.families, "cpu backend ready");
        Ok(out)
    }

    /// Register a font file and return a manager over just its families.
    pub fn register_fonts(&mut self, bytes: Vec<u8>) -> SkeneResult<CpuFontManager> {
        let registered = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes), None);
        let mut families = Vec::new();
        for (id, _) in registered {
            if let Some(name) = self.font_ctx.collection.family_name(id) {
                families.push(name.to_owned());
            }
        }
        if families.is_empty() {
            return Err(SkeneError::validation("no font families registered from font bytes"));
        }
        Ok(CpuFontManager { families })
    }

    fn shape(
        &mut self,
        text: &str,
        families: &[String],
        size: f32,
        brush: TextBrushRgba8,
    ) -> parley::Layout<TextBrushRgba8> {
        let stack = families
            .iter()
            .map(|f| format!("\"{f}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(stack)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size));
        builder.push_default(parley::style::StyleProperty::Brush(brush));
        builder.build(text)
    }

    fn font_data_for(&mut self, key: (u64, u32), bytes: &[u8]) -> vello_cpu::peniko::FontData {
        self.font_data
            .entry(key)
            .or_insert_with(|| {
                let blob = vello_cpu::peniko::Blob::from(bytes.to_vec());
                vello_cpu::peniko::FontData::new(blob, key.1)
            })
            .clone()
    }

    fn draw_layout(
        &mut self,
        target: &mut CpuSurface,
        layout: &parley::Layout<TextBrushRgba8>,
        transform: Affine,
        max_lines: usize,
        cut: Option<(usize, f32)>,
    ) {
        target.ctx.set_transform(affine_to_cpu(transform));
        target
            .ctx
            .set_blend_mode(vello_cpu::peniko::BlendMode::default());
        for (li, line) in layout.lines().take(max_lines).enumerate() {
            let limit = match cut {
                Some((at, x)) if at == li => x,
                _ => f32::INFINITY,
            };
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                target.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let source = run.run().font();
                let font =
                    self.font_data_for((source.data.id(), source.index), source.data.data());
                let glyphs = run
                    .positioned_glyphs()
                    .filter(|g| g.x + g.advance <= limit + 0.01)
                    .map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                target
                    .ctx
                    .glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }

    fn fill_or_stroke(target: &mut CpuSurface, path: &vello_cpu::kurbo::BezPath, paint: &CpuPaint) {
        prepare_paint(target, paint);
        match paint.mode() {
            PaintMode::Fill => target.ctx.fill_path(path),
            PaintMode::Stroke => {
                target.ctx.set_stroke(stroke_for(paint));
                target.ctx.stroke_path(path);
            }
        }
    }
}

impl GraphicsBackend for CpuBackend {
    type Paint = CpuPaint;
    type Font = CpuFont;
    type Path = CpuPath;
    type Paragraph = CpuParagraph;
    type Surface = CpuSurface;
    type Image = CpuImage;
    type FontManager = CpuFontManager;

    fn make_paint(&mut self) -> Self::Paint {
        CpuPaint::default()
    }

    fn make_font(&mut self, size: f32) -> Self::Font {
        let size = if size.is_finite() && size > 0.0 {
            size
        } else {
            self.opts.default_font_size
        };
        CpuFont { size }
    }

    fn make_path_from_svg(&mut self, svg: &str) -> Option<Self::Path> {
        let path = BezPath::from_svg(svg).ok()?;
        Some(CpuPath {
            path: bezpath_to_cpu(&path),
        })
    }

    fn make_path_from_cmds(&mut self, cmds: &[PathCmd]) -> SkeneResult<Self::Path> {
        Ok(CpuPath {
            path: bezpath_to_cpu(&bezpath_from_cmds(cmds)?),
        })
    }

    fn default_font_manager(&mut self) -> Self::FontManager {
        self.fonts.clone()
    }

    fn build_paragraph(
        &mut self,
        style: &ParagraphStyle,
        text: &str,
        fonts: Option<&Self::FontManager>,
    ) -> SkeneResult<Self::Paragraph> {
        let size = style.text_style.font_size;
        if !size.is_finite() || size <= 0.0 {
            return Err(SkeneError::validation("paragraph font size must be finite and > 0"));
        }
        let brush = TextBrushRgba8::from(resolve_color(&style.text_style.color)?);
        let mut families = style.text_style.font_families.clone();
        families.extend(fonts.unwrap_or(&self.fonts).families.iter().cloned());
        let layout = self.shape(text, &families, size, brush);
        let ellipsis = style
            .ellipsis
            .as_deref()
            .filter(|e| !e.is_empty())
            .map(|e| {
                let mut l = self.shape(e, &families, size, brush);
                l.break_all_lines(None);
                l
            });
        Ok(CpuParagraph::new(layout, ellipsis, text, style))
    }

    fn make_surface(&mut self, width: u32, height: u32) -> SkeneResult<Self::Surface> {
        let to_u16 = |v: u32| -> SkeneResult<u16> {
            u16::try_from(v)
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| {
                    SkeneError::backend(format!("cannot allocate a {width}x{height} surface"))
                })
        };
        let (w, h) = (to_u16(width)?, to_u16(height)?);
        Ok(CpuSurface {
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
            width: w,
            height: h,
            transform: Affine::IDENTITY,
            stack: Vec::new(),
        })
    }

    fn snapshot(&mut self, surface: &mut Self::Surface) -> SkeneResult<Self::Image> {
        surface.render();
        let pixmap = pixmap_from_premul_bytes(
            surface.pixmap.data_as_u8_slice(),
            surface.width,
            surface.height,
        )?;
        Ok(CpuImage {
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            width: surface.width,
            height: surface.height,
        })
    }

    fn save(&mut self, target: &mut Self::Surface) {
        target.stack.push(target.transform);
    }

    fn restore(&mut self, target: &mut Self::Surface) {
        if let Some(t) = target.stack.pop() {
            target.transform = t;
        }
    }

    fn clear(&mut self, target: &mut Self::Surface, color: Color) {
        // Clearing replaces every pixel, so earlier commands can be dropped.
        target.ctx.reset();
        target.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        target
            .ctx
            .set_blend_mode(vello_cpu::peniko::BlendMode::default());
        let [r, g, b, a] = color.to_rgba8();
        target
            .ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        target.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(target.width),
            f64::from(target.height),
        ));
    }

    fn rotate(&mut self, target: &mut Self::Surface, degrees: f64, px: f64, py: f64) {
        target.transform =
            target.transform * Affine::rotate_about(degrees.to_radians(), Point::new(px, py));
    }

    fn draw_rrect(&mut self, target: &mut Self::Surface, rrect: &RRect, paint: &Self::Paint) {
        Self::fill_or_stroke(target, &bezpath_to_cpu(&rrect.to_path()), paint);
    }

    fn draw_line(&mut self, target: &mut Self::Surface, p0: Point, p1: Point, paint: &Self::Paint) {
        // Lines are always stroked; the paint mode does not apply.
        let mut path = vello_cpu::kurbo::BezPath::new();
        path.move_to(vello_cpu::kurbo::Point::new(p0.x, p0.y));
        path.line_to(vello_cpu::kurbo::Point::new(p1.x, p1.y));
        prepare_paint(target, paint);
        target.ctx.set_stroke(stroke_for(paint));
        target.ctx.stroke_path(&path);
    }

    fn draw_text(
        &mut self,
        target: &mut Self::Surface,
        text: &str,
        origin: Point,
        paint: &Self::Paint,
        font: &Self::Font,
    ) {
        let families = self.fonts.families.clone();
        let mut layout = self.shape(text, &families, font.size, paint.color().into());
        layout.break_all_lines(None);
        let baseline = layout
            .lines()
            .next()
            .map_or(0.0, |l| f64::from(l.metrics().baseline));
        let transform =
            target.transform * Affine::translate((origin.x, origin.y - baseline));
        self.draw_layout(target, &layout, transform, 1, None);
    }

    fn draw_path(&mut self, target: &mut Self::Surface, path: &Self::Path, paint: &Self::Paint) {
        Self::fill_or_stroke(target, &path.path, paint);
    }

    fn draw_paragraph(
        &mut self,
        target: &mut Self::Surface,
        paragraph: &Self::Paragraph,
        origin: Point,
    ) {
        let transform = target.transform * Affine::translate(origin.to_vec2());
        let keep = paragraph.visible_lines();
        self.draw_layout(target, &paragraph.layout, transform, keep, paragraph.ellipsis_at);
        if let (Some(origin), Some(ellipsis)) =
            (paragraph.ellipsis_origin(), paragraph.ellipsis.as_ref())
        {
            let baseline = ellipsis
                .lines()
                .next()
                .map_or(0.0, |l| f64::from(l.metrics().baseline));
            let at = transform * Affine::translate((origin.x, origin.y - baseline));
            self.draw_layout(target, ellipsis, at, 1, None);
        }
    }

    fn draw_image(
        &mut self,
        target: &mut Self::Surface,
        image: &Self::Image,
        origin: Point,
        paint: &Self::Paint,
    ) {
        let opacity = paint.alpha();
        target.ctx.set_transform(affine_to_cpu(
            target.transform * Affine::translate(origin.to_vec2()),
        ));
        target.ctx.set_blend_mode(blend_to_cpu(paint.blend_mode()));
        target.ctx.set_paint(image.paint.clone());
        if opacity < 1.0 {
            target.ctx.push_opacity_layer(opacity);
        }
        target.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(image.width),
            f64::from(image.height),
        ));
        if opacity < 1.0 {
            target.ctx.pop_layer();
        }
    }

    fn flush(&mut self, target: &mut Self::Surface) {
        target.render();
    }

    fn delete_paint(&mut self, _paint: Self::Paint) {}

    fn delete_font(&mut self, _font: Self::Font) {}

    fn delete_path(&mut self, _path: Self::Path) {}

    fn delete_paragraph(&mut self, _paragraph: Self::Paragraph) {}

    fn delete_surface(&mut self, _surface: Self::Surface) {}

    fn delete_image(&mut self, _image: Self::Image) {}
}

fn prepare_paint(target: &mut CpuSurface, paint: &CpuPaint) {
    target.ctx.set_transform(affine_to_cpu(target.transform));
    target.ctx.set_blend_mode(blend_to_cpu(paint.blend_mode()));
    let [r, g, b, a] = paint.color().to_rgba8();
    target
        .ctx
        .set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
}

fn stroke_for(paint: &CpuPaint) -> vello_cpu::kurbo::Stroke {
    // Zero width is a hairline.
    let width = f64::from(paint.stroke_width()).max(1.0);
    vello_cpu::kurbo::Stroke::new(width).with_miter_limit(f64::from(paint.stroke_miter()))
}

fn alignment_for(align: TextAlign) -> parley::Alignment {
    match align {
        TextAlign::Left | TextAlign::Start => parley::Alignment::Start,
        TextAlign::Right | TextAlign::End => parley::Alignment::End,
        TextAlign::Center => parley::Alignment::Center,
        TextAlign::Justify => parley::Alignment::Justify,
    }
}

fn blend_to_cpu(mode: BlendMode) -> vello_cpu::peniko::BlendMode {
    use vello_cpu::peniko::{Compose, Mix};

    let (mix, compose) = match mode {
        BlendMode::Clear => (Mix::Normal, Compose::Clear),
        BlendMode::Src => (Mix::Normal, Compose::Copy),
        BlendMode::Dst => (Mix::Normal, Compose::Dest),
        BlendMode::SrcOver => (Mix::Normal, Compose::SrcOver),
        BlendMode::DstOver => (Mix::Normal, Compose::DestOver),
        BlendMode::SrcIn => (Mix::Normal, Compose::SrcIn),
        BlendMode::DstIn => (Mix::Normal, Compose::DestIn),
        BlendMode::SrcOut => (Mix::Normal, Compose::SrcOut),
        BlendMode::DstOut => (Mix::Normal, Compose::DestOut),
        BlendMode::SrcATop => (Mix::Normal, Compose::SrcAtop),
        BlendMode::DstATop => (Mix::Normal, Compose::DestAtop),
        BlendMode::Xor => (Mix::Normal, Compose::Xor),
        BlendMode::Plus => (Mix::Normal, Compose::Plus),
        BlendMode::Modulate | BlendMode::Multiply => (Mix::Multiply, Compose::SrcOver),
        BlendMode::Screen => (Mix::Screen, Compose::SrcOver),
        BlendMode::Overlay => (Mix::Overlay, Compose::SrcOver),
        BlendMode::Darken => (Mix::Darken, Compose::SrcOver),
        BlendMode::Lighten => (Mix::Lighten, Compose::SrcOver),
        BlendMode::ColorDodge => (Mix::ColorDodge, Compose::SrcOver),
        BlendMode::ColorBurn => (Mix::ColorBurn, Compose::SrcOver),
        BlendMode::HardLight => (Mix::HardLight, Compose::SrcOver),
        BlendMode::SoftLight => (Mix::SoftLight, Compose::SrcOver),
        BlendMode::Difference => (Mix::Difference, Compose::SrcOver),
        BlendMode::Exclusion => (Mix::Exclusion, Compose::SrcOver),
        BlendMode::Hue => (Mix::Hue, Compose::SrcOver),
        BlendMode::Saturation => (Mix::Saturation, Compose::SrcOver),
        BlendMode::Color => (Mix::Color, Compose::SrcOver),
        BlendMode::Luminosity => (Mix::Luminosity, Compose::SrcOver),
    };
    vello_cpu::peniko::BlendMode::new(mix, compose)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(bytes: &[u8], w: u16, h: u16) -> SkeneResult<vello_cpu::Pixmap> {
    if bytes.len() != usize::from(w) * usize::from(h) * 4 {
        return Err(SkeneError::backend("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
