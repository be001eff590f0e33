//! Software 2D drawing surface with an immediate-mode paint model.
//!
//! Paths are accumulated in device space (points pass through the current
//! transform as they are added) and rasterized with tiny-skia. Paint state
//! lives on a save/restore stack; the current path does not.

pub mod color;
pub mod font;

use std::f64::consts::TAU;

use image::{Rgba, RgbaImage};
use kurbo::{Affine, Arc, BezPath, PathEl, Point, Rect, Shape, Vec2};
use thiserror::Error;
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, IntSize, Mask, Paint, PathBuilder, Pixmap, PixmapPaint,
    Stroke, StrokeDash, Transform,
};

pub use color::{fade, hex, hsl, hsla, rgb, rgba, Brush, Stop};
pub use font::TextAlign;
pub use tiny_skia::{Color, LineCap, LineJoin};

/// Flattening tolerance for arcs, in device pixels.
const ARC_TOLERANCE: f64 = 0.1;
/// Opacity of the halo drawn in place of a blurred shadow.
const SHADOW_HALO_ALPHA: f64 = 0.35;

#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("canvas must be at least 1x1, got {width}x{height}")]
    ZeroSize { width: u32, height: u32 },
    #[error("image is {actual_width}x{actual_height}, canvas is {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },
}

/// How new paint combines with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Composite {
    #[default]
    SourceOver,
    /// Erase the destination where the source is opaque.
    DestinationOut,
}

impl Composite {
    fn blend_mode(self) -> tiny_skia::BlendMode {
        match self {
            Composite::SourceOver => tiny_skia::BlendMode::SourceOver,
            Composite::DestinationOut => tiny_skia::BlendMode::DestinationOut,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Shadow {
    color: Color,
    blur: f64,
}

#[derive(Clone)]
struct PaintState {
    fill: Brush,
    stroke: Brush,
    line_width: f64,
    line_cap: LineCap,
    line_join: LineJoin,
    dash: Vec<f64>,
    alpha: f64,
    composite: Composite,
    shadow: Option<Shadow>,
    font_size: f64,
    text_align: TextAlign,
    transform: Affine,
    clip: Option<Mask>,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            fill: Brush::Solid(Color::BLACK),
            stroke: Brush::Solid(Color::BLACK),
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            dash: Vec::new(),
            alpha: 1.0,
            composite: Composite::SourceOver,
            shadow: None,
            font_size: 10.0,
            text_align: TextAlign::Left,
            transform: Affine::IDENTITY,
            clip: None,
        }
    }
}

/// An RGBA drawing surface.
pub struct Canvas {
    pixmap: Pixmap,
    state: PaintState,
    stack: Vec<PaintState>,
    path: BezPath,
    draw_calls: u64,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self, CanvasError> {
        let pixmap = Pixmap::new(width, height).ok_or(CanvasError::ZeroSize { width, height })?;
        Ok(Self {
            pixmap,
            state: PaintState::default(),
            stack: Vec::new(),
            path: BezPath::new(),
            draw_calls: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Reallocate the surface if its size differs, resetting all state.
    pub fn ensure_size(&mut self, width: u32, height: u32) -> Result<(), CanvasError> {
        if self.width() != width || self.height() != height {
            tracing::debug!(width, height, "resizing canvas");
            *self = Self::new(width, height)?;
        }
        Ok(())
    }

    /// Number of primitives that have touched pixels since creation.
    pub fn draw_calls(&self) -> u64 {
        self.draw_calls
    }

    // --- state ---

    pub fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    /// Pop the last saved state. No effect when nothing was saved.
    pub fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    /// Run `f` between a save and its matching restore.
    pub fn with_saved<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.save();
        let result = f(self);
        self.restore();
        result
    }

    /// Drop every saved state and reset paint state to defaults.
    pub fn reset_state(&mut self) {
        self.stack.clear();
        self.state = PaintState::default();
        self.path = BezPath::new();
    }

    pub fn set_fill(&mut self, brush: impl Into<Brush>) {
        self.state.fill = brush.into();
    }

    pub fn set_stroke(&mut self, brush: impl Into<Brush>) {
        self.state.stroke = brush.into();
    }

    /// Non-positive and non-finite widths are ignored.
    pub fn set_line_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.state.line_width = width;
        }
    }

    pub fn line_width(&self) -> f64 {
        self.state.line_width
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.state.line_cap = cap;
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.state.line_join = join;
    }

    /// Dash pattern in user units; an empty slice restores solid lines.
    pub fn set_line_dash(&mut self, pattern: &[f64]) {
        if pattern.iter().all(|d| d.is_finite() && *d >= 0.0) {
            self.state.dash = pattern.to_vec();
        }
    }

    pub fn set_global_alpha(&mut self, alpha: f64) {
        if (0.0..=1.0).contains(&alpha) {
            self.state.alpha = alpha;
        }
    }

    pub fn set_composite(&mut self, composite: Composite) {
        self.state.composite = composite;
    }

    /// Glow around subsequent fills and strokes. `blur <= 0` turns it off.
    pub fn set_shadow(&mut self, color: Color, blur: f64) {
        self.state.shadow = (blur > 0.0).then_some(Shadow { color, blur });
    }

    pub fn clear_shadow(&mut self) {
        self.state.shadow = None;
    }

    pub fn set_font_size(&mut self, px: f64) {
        if px.is_finite() && px > 0.0 {
            self.state.font_size = px;
        }
    }

    pub fn set_text_align(&mut self, align: TextAlign) {
        self.state.text_align = align;
    }

    // --- transform ---

    pub fn translate(&mut self, x: f64, y: f64) {
        self.state.transform *= Affine::translate((x, y));
    }

    /// Rotate clockwise by `angle` radians (y axis points down).
    pub fn rotate(&mut self, angle: f64) {
        self.state.transform *= Affine::rotate(angle);
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.state.transform *= Affine::scale_non_uniform(sx, sy);
    }

    pub fn reset_transform(&mut self) {
        self.state.transform = Affine::IDENTITY;
    }

    // --- path ---

    pub fn begin_path(&mut self) {
        self.path = BezPath::new();
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        let p = self.state.transform * Point::new(x, y);
        self.path.move_to(p);
    }

    /// Starts a subpath when there is no current point.
    pub fn line_to(&mut self, x: f64, y: f64) {
        let p = self.state.transform * Point::new(x, y);
        if self.path.elements().is_empty() {
            self.path.move_to(p);
        } else {
            self.path.line_to(p);
        }
    }

    pub fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.ensure_subpath(cx, cy);
        let t = self.state.transform;
        self.path.quad_to(t * Point::new(cx, cy), t * Point::new(x, y));
    }

    pub fn cubic_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        self.ensure_subpath(c1x, c1y);
        let t = self.state.transform;
        self.path.curve_to(
            t * Point::new(c1x, c1y),
            t * Point::new(c2x, c2y),
            t * Point::new(x, y),
        );
    }

    fn ensure_subpath(&mut self, x: f64, y: f64) {
        if self.path.elements().is_empty() {
            self.move_to(x, y);
        }
    }

    pub fn close_path(&mut self) {
        if !self.path.elements().is_empty() {
            self.path.close_path();
        }
    }

    /// Circular arc with canvas angle conventions.
    pub fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64, anticlockwise: bool) {
        self.ellipse(cx, cy, radius, radius, 0.0, start, end, anticlockwise);
    }

    /// Elliptical arc, connected to the current point by a straight line.
    ///
    /// Negative or non-finite radii add nothing.
    #[allow(clippy::too_many_arguments)]
    pub fn ellipse(
        &mut self,
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        rotation: f64,
        start: f64,
        end: f64,
        anticlockwise: bool,
    ) {
        if !(rx >= 0.0 && ry >= 0.0 && rx.is_finite() && ry.is_finite()) {
            return;
        }
        let arc = Arc {
            center: Point::new(cx, cy),
            radii: Vec2::new(rx, ry),
            start_angle: start,
            sweep_angle: arc_sweep(start, end, anticlockwise),
            x_rotation: rotation,
        };
        let (sin, cos) = start.sin_cos();
        let (rot_sin, rot_cos) = rotation.sin_cos();
        let u = rx * cos;
        let v = ry * sin;
        let first = Point::new(cx + u * rot_cos - v * rot_sin, cy + u * rot_sin + v * rot_cos);
        self.line_to(first.x, first.y);

        let t = self.state.transform;
        for el in arc.append_iter(ARC_TOLERANCE) {
            self.path.push(t * el);
        }
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.move_to(x, y);
        self.line_to(x + w, y);
        self.line_to(x + w, y + h);
        self.line_to(x, y + h);
        self.close_path();
    }

    pub fn fill(&mut self) {
        let path = self.path.clone();
        self.fill_device_path(&path);
    }

    pub fn stroke(&mut self) {
        let path = self.path.clone();
        self.stroke_device_path(&path);
    }

    /// Intersect the clip region with the current path.
    pub fn clip(&mut self) {
        let (width, height) = (self.width(), self.height());
        let Some(path) = to_skia_path(&self.path) else {
            // Clipping to nothing hides all later drawing.
            self.state.clip = Mask::new(width, height);
            return;
        };
        if let Some(mask) = self.state.clip.as_mut() {
            mask.intersect_path(&path, FillRule::Winding, true, Transform::identity());
            return;
        }
        let Some(mut mask) = Mask::new(width, height) else {
            return;
        };
        mask.fill_path(&path, FillRule::Winding, true, Transform::identity());
        self.state.clip = Some(mask);
    }

    // --- shapes ---

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let path = self.user_path(&Rect::new(x, y, x + w, y + h).abs().to_path(ARC_TOLERANCE));
        self.fill_device_path(&path);
    }

    pub fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let path = self.user_path(&Rect::new(x, y, x + w, y + h).abs().to_path(ARC_TOLERANCE));
        self.stroke_device_path(&path);
    }

    /// Replace the current path with a full ellipse and fill it.
    pub fn fill_ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, rotation: f64) {
        self.begin_path();
        self.ellipse(cx, cy, rx, ry, rotation, 0.0, TAU, false);
        self.fill();
    }

    pub fn fill_circle(&mut self, cx: f64, cy: f64, r: f64) {
        self.fill_ellipse(cx, cy, r, r, 0.0);
    }

    pub fn stroke_circle(&mut self, cx: f64, cy: f64, r: f64) {
        self.begin_path();
        self.arc(cx, cy, r, 0.0, TAU, false);
        self.stroke();
    }

    /// Replace the current path with one segment and stroke it.
    pub fn stroke_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        self.begin_path();
        self.move_to(x0, y0);
        self.line_to(x1, y1);
        self.stroke();
    }

    /// Replace the current path with a closed polygon and fill it.
    pub fn fill_polygon(&mut self, points: &[(f64, f64)]) {
        self.begin_path();
        for &(x, y) in points {
            self.line_to(x, y);
        }
        self.close_path();
        self.fill();
    }

    /// Transparent black everywhere; paint state is untouched.
    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    // --- text ---

    pub fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        let glyphs = font::text_path(text, x, y, self.state.font_size, self.state.text_align);
        let path = self.user_path(&glyphs);
        self.fill_device_path(&path);
    }

    /// Outline every glyph cell with the stroke brush.
    pub fn stroke_text(&mut self, text: &str, x: f64, y: f64) {
        let glyphs = font::text_path(text, x, y, self.state.font_size, self.state.text_align);
        let path = self.user_path(&glyphs);
        self.stroke_device_path(&path);
    }

    pub fn measure_text(&self, text: &str) -> f64 {
        font::measure(text, self.state.font_size)
    }

    // --- pixels ---

    /// Draw `image` stretched over the whole surface.
    pub fn draw_image(&mut self, image: &RgbaImage) {
        self.draw_calls += 1;
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return;
        }

        let passthrough = w == self.width()
            && h == self.height()
            && self.state.clip.is_none()
            && self.state.alpha >= 1.0
            && self.state.composite == Composite::SourceOver
            && self.state.transform == Affine::IDENTITY
            && image.pixels().all(|p| p[3] == u8::MAX);
        if passthrough {
            self.pixmap.data_mut().copy_from_slice(image.as_raw());
            return;
        }

        let Some(source) = premultiplied_pixmap(image) else {
            return;
        };
        let stretch = Affine::scale_non_uniform(
            self.width() as f64 / w as f64,
            self.height() as f64 / h as f64,
        );
        let paint = PixmapPaint {
            opacity: self.state.alpha as f32,
            blend_mode: self.state.composite.blend_mode(),
            quality: FilterQuality::Bilinear,
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            source.as_ref(),
            &paint,
            color::skia_transform(self.state.transform * stretch),
            self.state.clip.as_ref(),
        );
    }

    /// Copy of the surface with straight (non-premultiplied) alpha.
    pub fn image_data(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.width(), self.height());
        for (dst, src) in out.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    /// Overwrite the surface with `image`, ignoring clip, alpha and composite.
    pub fn put_image_data(&mut self, image: &RgbaImage) -> Result<(), CanvasError> {
        if image.dimensions() != (self.width(), self.height()) {
            return Err(CanvasError::SizeMismatch {
                width: self.width(),
                height: self.height(),
                actual_width: image.width(),
                actual_height: image.height(),
            });
        }
        self.draw_calls += 1;
        for (dst, src) in self.pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
        Ok(())
    }

    /// Straight-alpha RGBA at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Alias for [`image_data`](Self::image_data) used by capture.
    pub fn snapshot(&self) -> RgbaImage {
        self.image_data()
    }

    // --- rasterization ---

    fn user_path(&self, path: &BezPath) -> BezPath {
        let mut out = path.clone();
        out.apply_affine(self.state.transform);
        out
    }

    fn fill_device_path(&mut self, path: &BezPath) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let brush = self.state.fill.clone();
        self.paint_path(&path, &brush, None);
    }

    fn stroke_device_path(&mut self, path: &BezPath) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let brush = self.state.stroke.clone();
        let stroke = self.current_stroke();
        self.paint_path(&path, &brush, Some(&stroke));
    }

    fn current_stroke(&self) -> Stroke {
        let scale = self.state.transform.determinant().abs().sqrt();
        let mut stroke = Stroke {
            width: (self.state.line_width * scale) as f32,
            line_cap: self.state.line_cap,
            line_join: self.state.line_join,
            ..Stroke::default()
        };
        if !self.state.dash.is_empty() {
            let mut pattern: Vec<f32> = self.state.dash.iter().map(|d| (d * scale) as f32).collect();
            if pattern.len() % 2 == 1 {
                pattern.extend_from_within(..);
            }
            stroke.dash = StrokeDash::new(pattern, 0.0);
        }
        stroke
    }

    fn paint_path(&mut self, path: &tiny_skia::Path, brush: &Brush, stroke: Option<&Stroke>) {
        self.draw_calls += 1;
        if let Some(shadow) = self.state.shadow {
            self.paint_halo(path, shadow, stroke);
        }
        let Some(shader) = brush.shader(self.state.alpha, self.state.transform) else {
            return;
        };
        let paint = Paint {
            shader,
            blend_mode: self.state.composite.blend_mode(),
            anti_alias: true,
            ..Paint::default()
        };
        let mask = self.state.clip.as_ref();
        match stroke {
            Some(stroke) => self
                .pixmap
                .stroke_path(path, &paint, stroke, Transform::identity(), mask),
            None => self
                .pixmap
                .fill_path(path, &paint, FillRule::Winding, Transform::identity(), mask),
        }
    }

    /// Stand-in for a Gaussian shadow: a translucent outline `blur` pixels wider.
    fn paint_halo(&mut self, path: &tiny_skia::Path, shadow: Shadow, stroke: Option<&Stroke>) {
        let base = stroke.map_or(0.0, |s| s.width);
        let halo = Stroke {
            width: base + shadow.blur as f32,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        let mut paint = Paint {
            anti_alias: true,
            ..Paint::default()
        };
        paint.set_color(fade(shadow.color, SHADOW_HALO_ALPHA * self.state.alpha));
        self.pixmap.stroke_path(
            path,
            &paint,
            &halo,
            Transform::identity(),
            self.state.clip.as_ref(),
        );
    }
}

/// Canvas sweep for an arc from `start` to `end`.
///
/// Clockwise sweeps land in `[0, 2pi]`, anticlockwise in `[-2pi, 0]`.
fn arc_sweep(start: f64, end: f64, anticlockwise: bool) -> f64 {
    if !anticlockwise && end - start >= TAU {
        TAU
    } else if anticlockwise && start - end >= TAU {
        -TAU
    } else if anticlockwise {
        -(start - end).rem_euclid(TAU)
    } else {
        (end - start).rem_euclid(TAU)
    }
}

fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn premultiplied_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(image.width(), image.height())?;
    let mut data = Vec::with_capacity(image.as_raw().len());
    for px in image.pixels() {
        let c = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Pixmap::from_vec(data, size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn white(width: u32, height: u32) -> Canvas {
        let mut canvas = Canvas::new(width, height).unwrap();
        canvas.set_fill(hex(0xFFFFFF));
        canvas.fill_rect(0.0, 0.0, width as f64, height as f64);
        canvas
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            Canvas::new(0, 10),
            Err(CanvasError::ZeroSize { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_arc_sweep_conventions() {
        assert!((arc_sweep(0.0, PI, false) - PI).abs() < 1e-12);
        assert!((arc_sweep(PI, 0.0, false) - PI).abs() < 1e-12);
        assert!((arc_sweep(0.0, PI, true) + PI).abs() < 1e-12);
        assert_eq!(arc_sweep(0.0, TAU, false), TAU);
        assert_eq!(arc_sweep(0.0, 3.0 * TAU, false), TAU);
        assert_eq!(arc_sweep(TAU, 0.0, true), -TAU);
        assert_eq!(arc_sweep(1.0, 1.0, false), 0.0);
    }

    #[test]
    fn test_fill_circle_covers_center_not_corner() {
        let mut canvas = white(40, 40);
        canvas.set_fill(hex(0xFF0000));
        canvas.fill_circle(20.0, 20.0, 10.0);
        assert_eq!(canvas.pixel(20, 20), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(2, 2), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_zero_radius_draws_nothing() {
        let mut canvas = white(20, 20);
        let before = canvas.image_data();
        canvas.set_fill(hex(0x000000));
        canvas.fill_circle(10.0, 10.0, 0.0);
        canvas.fill_ellipse(10.0, 10.0, -3.0, 2.0, 0.0);
        assert_eq!(canvas.image_data(), before);
    }

    #[test]
    fn test_save_restore_scopes_paint_state() {
        let mut canvas = white(20, 20);
        canvas.set_fill(hex(0x0000FF));
        canvas.with_saved(|c| {
            c.translate(10.0, 0.0);
            c.set_fill(hex(0xFF0000));
            c.set_global_alpha(0.5);
            c.fill_rect(0.0, 0.0, 5.0, 5.0);
        });
        canvas.fill_rect(0.0, 0.0, 5.0, 5.0);
        assert_eq!(canvas.pixel(2, 2), Some([0, 0, 255, 255]));
        // Red at half alpha over white.
        let [r, g, b, a] = canvas.pixel(12, 2).unwrap();
        assert_eq!((r, a), (255, 255));
        assert!((g as i32 - 128).abs() <= 1 && (b as i32 - 128).abs() <= 1);
    }

    #[test]
    fn test_restore_without_save_is_noop() {
        let mut canvas = white(4, 4);
        canvas.set_line_width(7.0);
        canvas.restore();
        assert_eq!(canvas.line_width(), 7.0);
    }

    #[test]
    fn test_rotate_moves_geometry() {
        let mut canvas = white(40, 40);
        canvas.set_fill(hex(0x000000));
        canvas.translate(20.0, 20.0);
        canvas.rotate(PI / 2.0);
        // A bar along +x becomes a bar along +y.
        canvas.fill_rect(0.0, -2.0, 15.0, 4.0);
        assert_eq!(canvas.pixel(20, 30), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(30, 20), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_destination_out_erases() {
        let mut canvas = white(20, 20);
        canvas.set_composite(Composite::DestinationOut);
        canvas.fill_circle(10.0, 10.0, 5.0);
        assert_eq!(canvas.pixel(10, 10).unwrap()[3], 0);
        assert_eq!(canvas.pixel(0, 0).unwrap()[3], 255);
    }

    #[test]
    fn test_clip_limits_drawing() {
        let mut canvas = white(20, 20);
        canvas.begin_path();
        canvas.rect(0.0, 0.0, 10.0, 20.0);
        canvas.clip();
        canvas.set_fill(hex(0x00FF00));
        canvas.fill_rect(0.0, 0.0, 20.0, 20.0);
        assert_eq!(canvas.pixel(5, 5), Some([0, 255, 0, 255]));
        assert_eq!(canvas.pixel(15, 5), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_draw_image_passthrough_is_exact() {
        let frame = RgbaImage::from_fn(8, 6, |x, y| Rgba([x as u8 * 30, y as u8 * 40, 7, 255]));
        let mut canvas = Canvas::new(8, 6).unwrap();
        canvas.draw_image(&frame);
        assert_eq!(canvas.image_data(), frame);
        assert_eq!(canvas.draw_calls(), 1);
    }

    #[test]
    fn test_put_image_data_roundtrip_and_size_check() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        let image = RgbaImage::from_pixel(4, 4, Rgba([10, 200, 30, 255]));
        canvas.put_image_data(&image).unwrap();
        assert_eq!(canvas.image_data(), image);
        assert!(matches!(
            canvas.put_image_data(&RgbaImage::new(3, 4)),
            Err(CanvasError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_dashed_stroke_has_gaps() {
        let mut canvas = white(60, 10);
        canvas.set_stroke(hex(0x000000));
        canvas.set_line_width(4.0);
        canvas.set_line_dash(&[10.0, 5.0]);
        canvas.stroke_line(0.0, 5.0, 60.0, 5.0);
        assert_eq!(canvas.pixel(5, 5), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(12, 5), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_text_draws_inside_its_box() {
        let mut canvas = white(80, 30);
        canvas.set_fill(hex(0x000000));
        canvas.set_font_size(16.0);
        canvas.fill_text("HI", 10.0, 20.0);
        // Left stem of the H.
        assert_eq!(canvas.pixel(11, 10), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(70, 10), Some([255, 255, 255, 255]));
        assert_eq!(canvas.measure_text("HI"), 22.0);
    }

    #[test]
    fn test_gradient_fill_varies() {
        let mut canvas = Canvas::new(100, 4).unwrap();
        canvas.set_fill(
            Brush::linear(0.0, 0.0, 100.0, 0.0)
                .stop(0.0, hex(0x000000))
                .stop(1.0, hex(0xFFFFFF)),
        );
        canvas.fill_rect(0.0, 0.0, 100.0, 4.0);
        let left = canvas.pixel(2, 2).unwrap()[0];
        let right = canvas.pixel(97, 2).unwrap()[0];
        assert!(left < 20 && right > 235);
    }
}
