//! Colour constructors with CSS semantics, and fill/stroke brushes.

use kurbo::{Affine, Point};
use tiny_skia::{Color, GradientStop, LinearGradient, RadialGradient, Shader, SpreadMode};

/// `#rrggbb` as an integer, fully opaque.
pub fn hex(rgb: u32) -> Color {
    Color::from_rgba8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 255)
}

pub fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::from_rgba8(r, g, b, 255)
}

/// `rgba()` with alpha in [0, 1]; out-of-range alpha is clamped.
pub fn rgba(r: u8, g: u8, b: u8, a: f64) -> Color {
    let mut color = Color::from_rgba8(r, g, b, 255);
    color.set_alpha(clamp_unit(a) as f32);
    color
}

/// `hsl()` with hue in degrees (any range) and saturation/lightness in percent.
pub fn hsl(h: f64, s: f64, l: f64) -> Color {
    hsla(h, s, l, 1.0)
}

pub fn hsla(h: f64, s: f64, l: f64, a: f64) -> Color {
    let h = if h.is_finite() { h.rem_euclid(360.0) / 360.0 } else { 0.0 };
    let s = clamp_unit(s / 100.0);
    let l = clamp_unit(l / 100.0);

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |t: f64| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };

    Color::from_rgba(
        channel(h + 1.0 / 3.0) as f32,
        channel(h) as f32,
        channel(h - 1.0 / 3.0) as f32,
        clamp_unit(a) as f32,
    )
    .unwrap_or(Color::BLACK)
}

/// Same colour with its alpha multiplied by `factor`.
pub fn fade(mut color: Color, factor: f64) -> Color {
    color.apply_opacity(clamp_unit(factor) as f32);
    color
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// A colour stop at `offset` in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stop {
    pub offset: f64,
    pub color: Color,
}

/// Paint source for fills and strokes.
///
/// Gradient geometry is in user space and follows the transform that is
/// current when the brush is used.
#[derive(Debug, Clone, PartialEq)]
pub enum Brush {
    Solid(Color),
    Linear {
        start: Point,
        end: Point,
        stops: Vec<Stop>,
    },
    /// Two-point radial gradient: zero radius at `focal`, `radius` around `center`.
    Radial {
        focal: Point,
        center: Point,
        radius: f64,
        stops: Vec<Stop>,
    },
}

impl Brush {
    pub fn linear(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Brush::Linear {
            start: Point::new(x0, y0),
            end: Point::new(x1, y1),
            stops: Vec::new(),
        }
    }

    /// Concentric radial gradient from `(cx, cy)` out to `radius`.
    pub fn radial(cx: f64, cy: f64, radius: f64) -> Self {
        Self::radial_focal(cx, cy, cx, cy, radius)
    }

    pub fn radial_focal(fx: f64, fy: f64, cx: f64, cy: f64, radius: f64) -> Self {
        Brush::Radial {
            focal: Point::new(fx, fy),
            center: Point::new(cx, cy),
            radius,
            stops: Vec::new(),
        }
    }

    /// Add a colour stop. No effect on solid brushes.
    pub fn stop(mut self, offset: f64, color: Color) -> Self {
        match &mut self {
            Brush::Solid(_) => {}
            Brush::Linear { stops, .. } | Brush::Radial { stops, .. } => stops.push(Stop {
                offset: offset.clamp(0.0, 1.0),
                color,
            }),
        }
        self
    }

    /// Build a tiny-skia shader with `alpha` applied and `transform` mapping user to device space.
    ///
    /// Degenerate gradients fall back to their last stop, and a gradient with
    /// no stops paints nothing.
    pub(crate) fn shader(&self, alpha: f64, transform: Affine) -> Option<Shader<'static>> {
        match self {
            Brush::Solid(color) => Some(Shader::SolidColor(fade(*color, alpha))),
            Brush::Linear { start, end, stops } => {
                let last = stops.last()?.color;
                if start == end {
                    return Some(Shader::SolidColor(fade(last, alpha)));
                }
                LinearGradient::new(
                    skia_point(*start),
                    skia_point(*end),
                    skia_stops(stops, alpha),
                    SpreadMode::Pad,
                    skia_transform(transform),
                )
                .or(Some(Shader::SolidColor(fade(last, alpha))))
            }
            Brush::Radial {
                focal,
                center,
                radius,
                stops,
            } => {
                let last = stops.last()?.color;
                if !(*radius > 0.0) {
                    return Some(Shader::SolidColor(fade(last, alpha)));
                }
                RadialGradient::new(
                    skia_point(*focal),
                    skia_point(*center),
                    *radius as f32,
                    skia_stops(stops, alpha),
                    SpreadMode::Pad,
                    skia_transform(transform),
                )
                .or(Some(Shader::SolidColor(fade(last, alpha))))
            }
        }
    }
}

impl From<Color> for Brush {
    fn from(color: Color) -> Self {
        Brush::Solid(color)
    }
}

fn skia_stops(stops: &[Stop], alpha: f64) -> Vec<GradientStop> {
    stops
        .iter()
        .map(|s| GradientStop::new(s.offset as f32, fade(s.color, alpha)))
        .collect()
}

pub(crate) fn skia_point(p: Point) -> tiny_skia::Point {
    tiny_skia::Point::from_xy(p.x as f32, p.y as f32)
}

pub(crate) fn skia_transform(affine: Affine) -> tiny_skia::Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    tiny_skia::Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba8(color: Color) -> [u8; 4] {
        let c = color.to_color_u8();
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    #[test]
    fn test_hex() {
        assert_eq!(rgba8(hex(0x8B4513)), [0x8B, 0x45, 0x13, 255]);
        assert_eq!(rgba8(hex(0x000000)), [0, 0, 0, 255]);
    }

    #[test]
    fn test_rgba_clamps_alpha() {
        assert_eq!(rgba8(rgba(10, 20, 30, 2.0))[3], 255);
        assert_eq!(rgba8(rgba(10, 20, 30, -1.0))[3], 0);
        assert_eq!(rgba8(rgba(10, 20, 30, 0.5))[3], 128);
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(rgba8(hsl(0.0, 100.0, 50.0)), [255, 0, 0, 255]);
        assert_eq!(rgba8(hsl(120.0, 100.0, 50.0)), [0, 255, 0, 255]);
        assert_eq!(rgba8(hsl(240.0, 100.0, 50.0)), [0, 0, 255, 255]);
        assert_eq!(rgba8(hsl(0.0, 0.0, 100.0)), [255, 255, 255, 255]);
    }

    #[test]
    fn test_hsla_mixed_saturation_and_alpha() {
        // hsl(30, 50%, 25%): q = 0.375, p = 0.125.
        assert_eq!(rgba8(hsla(30.0, 50.0, 25.0, 1.0)), [96, 64, 32, 255]);
        assert_eq!(rgba8(hsla(200.0, 80.0, 60.0, 0.5))[3], 128);
        assert_eq!(rgba8(hsla(0.0, f64::NAN, 150.0, 1.0)), [255, 255, 255, 255]);
    }

    #[test]
    fn test_hsl_hue_wraps() {
        assert_eq!(rgba8(hsl(480.0, 100.0, 50.0)), rgba8(hsl(120.0, 100.0, 50.0)));
        assert_eq!(rgba8(hsl(-120.0, 100.0, 50.0)), rgba8(hsl(240.0, 100.0, 50.0)));
    }

    #[test]
    fn test_empty_gradient_paints_nothing() {
        assert!(Brush::linear(0.0, 0.0, 10.0, 0.0)
            .shader(1.0, Affine::IDENTITY)
            .is_none());
    }

    #[test]
    fn test_degenerate_gradient_falls_back_to_solid() {
        let brush = Brush::radial(5.0, 5.0, 0.0)
            .stop(0.0, hex(0xFFFFFF))
            .stop(1.0, hex(0x123456));
        assert!(matches!(
            brush.shader(1.0, Affine::IDENTITY),
            Some(Shader::SolidColor(_))
        ));
    }

    #[test]
    fn test_stop_on_solid_is_ignored() {
        let brush = Brush::from(hex(0x112233)).stop(0.5, hex(0xFFFFFF));
        assert_eq!(brush, Brush::Solid(hex(0x112233)));
    }
}
