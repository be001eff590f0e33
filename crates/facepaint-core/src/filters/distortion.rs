//! The crazy-face effect: a per-pixel warp of the frame followed by a
//! vector overlay.
//!
//! The warp reads every source pixel from a snapshot taken before the pass,
//! so already-written destination pixels never feed back into the result.
//! Transforms compose in a fixed order: nose swirl, eye bulges, mouth
//! stretch, wave, pinch, kaleidoscope fold, fractal rescale. Only pixels
//! within `1.2` face widths of the face centre are displaced; the colour
//! shift applies to the whole frame.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use image::{Rgba, RgbaImage};
use kurbo::Point;

use crate::canvas::{hex, hsl, Canvas, LineCap, TextAlign};
use crate::landmarks::{mesh, Face};
use crate::scene::Scene;

/// Slow and fast animation clocks, in radians per millisecond.
const SLOW_RATE: f64 = 0.008;
const FAST_RATE: f64 = 0.015;

const SHOUTS: [&str; 4] = ["DINGUE!", "FOLIE!", "MALADE!", "OUFFF!"];

pub(super) fn crazy_face(scene: &mut Scene<'_>) {
    let warp = Warp::new(&scene.face, scene.time.phase(SLOW_RATE), scene.time.phase(FAST_RATE));
    let source = scene.canvas.image_data();
    let warped = warp.remap(&source);
    if let Err(err) = scene.canvas.put_image_data(&warped) {
        tracing::warn!(error = %err, "crazy-face remap discarded");
    }
    overlay(scene.canvas, &scene.face, warp.t, warp.ct);
}

/// Face geometry and clock values fixed for one frame.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Warp {
    nose: Point,
    left_eye: Point,
    right_eye: Point,
    mouth: Point,
    center: Point,
    face_width: f64,
    t: f64,
    ct: f64,
}

impl Warp {
    pub(crate) fn new(face: &Face<'_>, t: f64, ct: f64) -> Self {
        Self {
            nose: face.point(mesh::NOSE_TIP),
            left_eye: face.point(mesh::LEFT_EYE),
            right_eye: face.point(mesh::RIGHT_EYE),
            mouth: face.point(mesh::UPPER_LIP),
            center: face.center(),
            face_width: face.eye_distance() * 2.0,
            t,
            ct,
        }
    }

    fn reach(&self) -> f64 {
        self.face_width * 1.2
    }

    /// Unclamped source coordinate for destination pixel `(x, y)`.
    pub(crate) fn source(&self, x: f64, y: f64) -> (f64, f64) {
        let (t, ct, fw) = (self.t, self.ct, self.face_width);
        let dx = x - self.center.x;
        let dy = y - self.center.y;
        let distance = dx.hypot(dy);
        if distance >= self.reach() {
            return (x, y);
        }
        let angle = dy.atan2(dx);
        let (mut sx, mut sy) = (x, y);

        let nose_distance = (x - self.nose.x).hypot(y - self.nose.y);
        if nose_distance < fw * 0.4 {
            let strength = (1.0 - nose_distance / (fw * 0.4)) * 2.5;
            let swirl = angle + strength * (ct * 4.0).sin() * (t * 3.0).cos();
            sx = self.nose.x + swirl.cos() * nose_distance * (1.0 + (t * 6.0).sin() * 0.5);
            sy = self.nose.y + swirl.sin() * nose_distance * (1.0 + (t * 5.0).cos() * 0.5);
        }

        let eyes = [
            (self.left_eye, (ct * 8.0).sin() * (t * 4.0).cos()),
            (self.right_eye, (ct * 8.0 + PI).sin() * (t * 6.0).sin()),
        ];
        for (eye, pulse) in eyes {
            let d = (x - eye.x).hypot(y - eye.y);
            if d < fw * 0.25 {
                let strength = (1.0 - d / (fw * 0.25)) * 50.0 * pulse;
                let a = (y - eye.y).atan2(x - eye.x);
                sx += a.cos() * strength;
                sy += a.sin() * strength;
            }
        }

        let mouth_distance = (x - self.mouth.x).hypot(y - self.mouth.y);
        if mouth_distance < fw * 0.3 {
            let strength = (1.0 - mouth_distance / (fw * 0.3)) * 40.0 * (ct * 10.0).sin();
            sx += (x - self.mouth.x) * strength * 0.03 * (t * 7.0).cos();
            sy += (ct * 12.0).sin() * 25.0 * (x * 0.05).cos();
        }

        let falloff = 1.0 - distance / self.reach();
        let wave = falloff * 20.0;
        sx += (y * 0.03 + ct * 5.0).sin() * wave * (t * 3.0).cos();
        sy += (x * 0.03 + ct * 4.0).cos() * wave * (t * 4.0).sin();
        sx += (y * 0.01 + t * 8.0).sin() * wave * 0.5;
        sy += (x * 0.01 + t * 6.0).cos() * wave * 0.5;

        let pinch = 1.0 + ((ct * 3.0).sin() * 0.4 + (t * 5.0).cos() * 0.3) * falloff;
        sx = self.center.x + (sx - self.center.x) * pinch;
        sy = self.center.y + (sy - self.center.y) * pinch;

        if (t * 4.0).sin() > 0.5 {
            let segment = TAU / 6.0;
            let folded = angle.rem_euclid(segment) + (ct * 6.0).sin() * 0.5;
            sx = self.center.x + folded.cos() * distance;
            sy = self.center.y + folded.sin() * distance;
        }

        if (t * 2.0).cos() > 0.3 {
            let zoom = 1.0 + (ct * 7.0).sin() * 0.8;
            sx = self.center.x + (sx - self.center.x) * zoom;
            sy = self.center.y + (sy - self.center.y) * zoom;
        }

        (sx, sy)
    }

    /// Warp `source` into a new image of the same size.
    pub(crate) fn remap(&self, source: &RgbaImage) -> RgbaImage {
        let (width, height) = source.dimensions();
        let (t, ct) = (self.t, self.ct);
        RgbaImage::from_fn(width, height, |x, y| {
            let (fx, fy) = (x as f64, y as f64);
            let (sx, sy) = self.source(fx, fy);
            let sx = clamp_round(sx, width);
            let sy = clamp_round(sy, height);
            let [r, g, b, a] = source.get_pixel(sx, sy).0;

            let dx = fx - self.center.x;
            let dy = fy - self.center.y;
            let distance = dx.hypot(dy);
            let angle = dy.atan2(dx);
            let shift = (ct * 10.0 + fx * 0.02 + fy * 0.02).sin() * 100.0;
            let red = (t * 8.0 + distance * 0.01).sin() * 50.0;
            let green = (t * 6.0 + angle).cos() * 50.0;
            let blue = (t * 12.0 + distance * 0.02).sin() * 50.0;

            Rgba([
                channel(r as f64 + red + shift),
                channel(g as f64 + green - shift * 0.5),
                channel(b as f64 + blue + shift * 0.3),
                a,
            ])
        })
    }
}

fn clamp_round(v: f64, extent: u32) -> u32 {
    let max = extent.saturating_sub(1) as f64;
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, max) as u32
}

fn channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

fn overlay(c: &mut Canvas, face: &Face<'_>, t: f64, ct: f64) {
    let left_eye = face.point(mesh::LEFT_EYE);
    let right_eye = face.point(mesh::RIGHT_EYE);
    let nose = face.point(mesh::NOSE_TIP);
    let mouth = face.point(mesh::UPPER_LIP);
    let forehead = face.point(mesh::FOREHEAD);
    let chin = face.point(mesh::CHIN);

    // Spinning eye spokes
    c.set_stroke(hsl(ct * 100.0, 100.0, 50.0));
    c.set_line_width(5.0);
    for i in 0..16 {
        let i = i as f64;
        let angle = ct * 15.0 + i * PI / 8.0;
        let radius = (25.0 + (ct * 8.0).sin() * 15.0) * (1.0 + (t * 12.0 + i).sin() * 0.5);
        c.stroke_line(
            left_eye.x,
            left_eye.y,
            left_eye.x + angle.cos() * radius,
            left_eye.y + angle.sin() * radius,
        );
        c.stroke_line(
            right_eye.x,
            right_eye.y,
            right_eye.x + (-angle * 1.5).cos() * radius,
            right_eye.y + (-angle * 1.5).sin() * radius,
        );
    }

    c.set_stroke(hsl(t * 200.0, 100.0, 50.0));
    c.set_line_width(6.0);
    c.set_line_cap(LineCap::Round);
    for i in 0..12 {
        let i = i as f64;
        let offset = (ct * 12.0 + i).sin() * 40.0;
        let lift = (t * 8.0 + i).cos() * 30.0;
        let x = mouth.x - 60.0 + i * 10.0;
        c.stroke_line(x, mouth.y, x + offset, mouth.y + offset + lift);
    }

    for i in 0..25 {
        let i = i as f64;
        let angle = ct * 5.0 + i * PI / 12.5;
        let radius = 100.0 + (ct * 6.0 + i).sin() * 60.0;
        let x = nose.x + angle.cos() * radius;
        let y = nose.y + angle.sin() * radius;
        let hue = ct * 50.0 + i * 15.0;

        c.set_fill(hsl(hue, 100.0, 50.0));
        c.fill_circle(x, y, 5.0 + (ct * 15.0 + i).sin() * 4.0);
        c.set_stroke(hsl(hue, 100.0, 30.0));
        c.set_line_width(2.0);
        c.stroke_line(x, y, x - angle.cos() * 20.0, y - angle.sin() * 20.0);
    }

    c.set_stroke(hex(0xFFFF00));
    c.set_line_width(4.0);
    c.set_shadow(hex(0xFFFF00), 10.0);
    for i in 0..8 {
        let i = i as f64;
        if (ct * 20.0 + i).sin() <= 0.7 {
            continue;
        }
        let angle = i * PI / 4.0 + (t * 10.0).sin() * 0.5;
        let (x0, y0) = (nose.x + angle.cos() * 80.0, nose.y + angle.sin() * 80.0);
        let (x1, y1) = (nose.x + angle.cos() * 150.0, nose.y + angle.sin() * 150.0);
        c.begin_path();
        c.move_to(x0, y0);
        for j in 0..5 {
            let j = j as f64;
            let progress = j / 4.0;
            c.line_to(
                x0 + (x1 - x0) * progress + (ct * 30.0 + j).sin() * 15.0,
                y0 + (y1 - y0) * progress + (ct * 25.0 + j).cos() * 15.0,
            );
        }
        c.stroke();
    }
    c.clear_shadow();

    c.set_stroke(hsl(t * 300.0, 100.0, 50.0));
    c.set_line_width(3.0);
    for i in 0..6 {
        let i = i as f64;
        let spin = ct * 8.0 + i * PI / 3.0;
        let size = 20.0 + (t * 10.0 + i).sin() * 10.0;
        triangle(c, left_eye, spin, size);
        triangle(c, right_eye, -spin, size);
    }

    for i in 0..5 {
        let i = i as f64;
        c.set_stroke(hsl(ct * 80.0 + i * 72.0, 100.0, 50.0));
        c.set_line_width(3.0);
        c.stroke_circle(nose.x, nose.y, 30.0 + i * 20.0 + (ct * 6.0 + i).sin() * 15.0);
    }

    c.set_text_align(TextAlign::Center);
    for (i, text) in SHOUTS.iter().enumerate() {
        let i = i as f64;
        let angle = ct * 3.0 + i * FRAC_PI_2;
        let radius = 120.0 + (t * 5.0 + i).sin() * 30.0;
        c.set_font_size(20.0 + (ct * 8.0 + i).sin() * 10.0);
        c.set_fill(hsl(ct * 150.0 + i * 90.0, 100.0, 50.0));
        c.set_stroke(hsl(ct * 150.0 + i * 90.0 + 180.0, 100.0, 50.0));
        c.set_line_width(3.0);
        c.with_saved(|c| {
            c.translate(nose.x + angle.cos() * radius, nose.y + angle.sin() * radius);
            c.rotate(ct * 5.0 + i);
            c.stroke_text(text, 0.0, 0.0);
            c.fill_text(text, 0.0, 0.0);
        });
    }

    // Trails from forehead to chin
    c.set_stroke(hsl(ct * 200.0, 100.0, 50.0));
    c.set_line_width(8.0);
    for i in 0..3 {
        let i = i as f64;
        c.begin_path();
        c.move_to(forehead.x, forehead.y);
        c.quad_to(
            nose.x + (ct * 4.0 + i).sin() * 50.0,
            nose.y + (ct * 3.0 + i).cos() * 30.0,
            chin.x + (ct * 5.0 + i).sin() * 40.0,
            chin.y,
        );
        c.stroke();
    }
}

fn triangle(c: &mut Canvas, at: Point, spin: f64, size: f64) {
    c.begin_path();
    for j in 0..3 {
        let a = spin + j as f64 * TAU / 3.0;
        c.line_to(at.x + a.cos() * size, at.y + a.sin() * size);
    }
    c.close_path();
    c.stroke();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::LandmarkSet;

    fn warp_at(t: f64, ct: f64) -> (LandmarkSet, Warp) {
        let set = LandmarkSet::neutral();
        let warp = Warp::new(&Face::new(&set, 160.0, 120.0), t, ct);
        (set, warp)
    }

    #[test]
    fn test_colour_shift_rounds_to_nearest() {
        assert_eq!(channel(127.6), 128);
        assert_eq!(channel(127.4), 127);
        assert_eq!(channel(254.5), 255);
        assert_eq!(channel(300.0), 255);
        assert_eq!(channel(-3.2), 0);
    }

    #[test]
    fn test_pixels_outside_reach_are_not_displaced() {
        let (_set, warp) = warp_at(1.3, 2.9);
        // Face width is 2 * 38.4 = 76.8, so the reach is ~92px from (80, 61.8).
        assert_eq!(warp.source(0.0, 0.0), (0.0, 0.0));
        assert_eq!(warp.source(159.0, 119.0), (159.0, 119.0));
    }

    #[test]
    fn test_pixels_inside_reach_are_displaced() {
        let (_set, warp) = warp_at(1.3, 2.9);
        let (sx, sy) = warp.source(85.0, 60.0);
        assert!((sx - 85.0).abs() > 1e-6 || (sy - 60.0).abs() > 1e-6);
    }

    #[test]
    fn test_remap_keeps_size_and_alpha() {
        let (_set, warp) = warp_at(4.0, 7.5);
        let src = RgbaImage::from_fn(160, 120, |x, y| Rgba([x as u8, y as u8, 128, (x % 256) as u8]));
        let out = warp.remap(&src);
        assert_eq!(out.dimensions(), (160, 120));
        // Far corner copies its own alpha; only colour shifts.
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(out.get_pixel(159, 0)[3], 159);
    }

    #[test]
    fn test_source_coordinates_are_clamped() {
        assert_eq!(clamp_round(-40.0, 160), 0);
        assert_eq!(clamp_round(1e9, 160), 159);
        assert_eq!(clamp_round(f64::NAN, 160), 0);
        assert_eq!(clamp_round(12.5, 160), 13);
    }

    #[test]
    fn test_remap_reads_from_snapshot() {
        let (_set, warp) = warp_at(0.25, 0.7);
        let src = RgbaImage::from_fn(160, 120, |x, y| Rgba([(x * 3) as u8, (y * 2) as u8, 60, 255]));
        assert_eq!(warp.remap(&src), warp.remap(&src.clone()));
    }
}
