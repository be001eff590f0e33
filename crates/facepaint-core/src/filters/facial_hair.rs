//! Mustache, cigar and beard overlays around the mouth and jaw.

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::canvas::{hex, rgba, Brush, LineCap};
use crate::landmarks::mesh;
use crate::scene::Scene;

pub(super) fn mustache(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let nose = face.point(mesh::NOSE_BOTTOM);
    let lip = face.point(mesh::UPPER_LIP);
    let y = nose.y + (lip.y - nose.y) * 0.3;
    let width =
        (face.point(mesh::LEFT_MOUTH).x - face.point(mesh::RIGHT_MOUTH).x).abs() * 1.2;

    c.set_fill(hex(0x8B4513));
    c.fill_ellipse(nose.x, y, width * 0.5, width * 0.15, 0.0);
    c.fill_ellipse(nose.x - width * 0.3, y - width * 0.05, width * 0.2, width * 0.1, -0.3);
    c.fill_ellipse(nose.x + width * 0.3, y - width * 0.05, width * 0.2, width * 0.1, 0.3);
}

pub(super) fn cigar(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let mouth = face.point(mesh::UPPER_LIP);
    let mouth_width =
        (face.point(mesh::RIGHT_MOUTH).x - face.point(mesh::LEFT_MOUTH).x).abs();
    let length = mouth_width * 1.5;
    let thickness = mouth_width * 0.15;
    let start = mouth.x + mouth_width * 0.3;

    c.set_fill(hex(0x8B4513));
    c.set_stroke(hex(0x654321));
    c.set_line_width(2.0);
    c.begin_path();
    c.rect(start, mouth.y - thickness * 0.5, length, thickness);
    c.fill();
    c.stroke();

    c.set_fill(hex(0xFFD700));
    for i in 0..2 {
        let x = start + length * (0.3 + i as f64 * 0.3);
        c.fill_rect(x, mouth.y - thickness * 0.5, length * 0.1, thickness);
    }

    // Lit end
    c.set_fill(hex(0xFF4500));
    c.fill_circle(start + length, mouth.y, thickness * 0.3);

    c.set_stroke(hex(0xD3D3D3));
    c.set_line_width(3.0);
    c.set_line_cap(LineCap::Round);
    for i in 0..3 {
        let i = i as f64;
        let sx = start + length + 10.0;
        let sy = mouth.y + (i - 1.0) * 5.0;
        c.begin_path();
        c.move_to(sx, sy);
        c.quad_to(sx + 20.0 + i * 10.0, sy - 20.0, sx + 40.0 + i * 15.0, sy - 40.0);
        c.stroke();
    }
}

/// Gradient beard filling the jaw line, with scattered strands.
pub(super) fn realistic_beard(scene: &mut Scene<'_>) {
    let face = scene.face;
    let chin = face.point(mesh::CHIN);
    let left = face.point(mesh::LEFT_JAW);
    let right = face.point(mesh::RIGHT_JAW);
    let span = face.eye_distance() * 2.0;

    let c = &mut *scene.canvas;
    c.set_fill(
        Brush::radial(chin.x, chin.y, span * 0.4)
            .stop(0.0, rgba(101, 67, 33, 0.9))
            .stop(0.3, rgba(139, 69, 19, 0.8))
            .stop(0.7, rgba(101, 67, 33, 0.6))
            .stop(1.0, rgba(101, 67, 33, 0.2)),
    );
    c.begin_path();
    c.move_to(left.x, left.y);
    c.quad_to(chin.x, chin.y + span * 0.15, right.x, right.y);
    c.quad_to(right.x + span * 0.1, chin.y + span * 0.2, chin.x, chin.y + span * 0.25);
    c.quad_to(left.x - span * 0.1, chin.y + span * 0.2, left.x, left.y);
    c.fill();

    c.set_stroke(rgba(101, 67, 33, 0.7));
    c.set_line_width(1.5);
    c.set_line_cap(LineCap::Round);
    for _ in 0..200 {
        let x = left.x + scene.random() * (right.x - left.x);
        let y = chin.y + scene.random() * span * 0.25;
        let len = 8.0 + scene.random() * 12.0;
        let angle = FRAC_PI_2 + (scene.random() - 0.5) * 0.8;
        scene.canvas.stroke_line(x, y, x + angle.cos() * len, y + angle.sin() * len);
    }

    let nose = face.point(mesh::NOSE_BOTTOM);
    let c = &mut *scene.canvas;
    c.set_fill(rgba(101, 67, 33, 0.9));
    c.begin_path();
    c.ellipse(nose.x, nose.y + span * 0.06, span * 0.12, span * 0.03, 0.0, 0.0, TAU, false);
    c.fill();

    for _ in 0..50 {
        let x = nose.x + (scene.random() - 0.5) * span * 0.2;
        let y = nose.y + span * 0.05 + scene.random() * span * 0.02;
        let len = 4.0 + scene.random() * 6.0;
        let dx = (scene.random() - 0.5) * len;
        let dy = scene.random() * len;
        scene.canvas.stroke_line(x, y, x + dx, y + dy);
    }
}

#[cfg(test)]
mod tests {
    use crate::filters::test_support::{grey_frame, render_still};

    #[test]
    fn test_mustache_stays_below_nose() {
        let raw = grey_frame();
        let out = render_still("mustache", 0.0, 0);
        assert_eq!(out.get_pixel(80, 5), raw.get_pixel(80, 5));
        assert_ne!(out, raw);
    }

    #[test]
    fn test_cigar_smoke_is_drawn() {
        let out = render_still("cigar", 0.0, 0);
        let smoke = out.pixels().filter(|p| p.0 == [0xD3, 0xD3, 0xD3, 255]).count();
        assert!(smoke > 0);
    }

    #[test]
    fn test_beard_strands_vary_with_seed() {
        assert_ne!(render_still("realistic-beard", 0.0, 1), render_still("realistic-beard", 0.0, 2));
    }
}
