//! Skin-level effects: cosmetics, scars, wrinkles and tattoos.

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::canvas::{rgba, Brush, Canvas, LineCap, LineJoin};
use crate::landmarks::mesh;
use crate::scene::Scene;

pub(super) fn makeup_glam(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let ed = face.eye_distance();

    for eye in [mesh::LEFT_EYE, mesh::RIGHT_EYE] {
        let e = face.point(eye);
        let cy = e.y - ed * 0.1;
        c.set_fill(
            Brush::radial(e.x, cy, ed * 0.4)
                .stop(0.0, rgba(147, 112, 219, 0.8))
                .stop(0.5, rgba(186, 85, 211, 0.6))
                .stop(1.0, rgba(147, 112, 219, 0.2)),
        );
        c.fill_ellipse(e.x, cy, ed * 0.35, ed * 0.25, 0.0);
    }

    // Eyeliner with a small flick at the outer corner.
    c.set_stroke(rgba(0, 0, 0, 1.0));
    c.set_line_width(3.0);
    c.set_line_cap(LineCap::Round);
    for eye in [mesh::LEFT_EYE, mesh::RIGHT_EYE] {
        let e = face.point(eye);
        c.begin_path();
        c.move_to(e.x - ed * 0.2, e.y);
        c.line_to(e.x + ed * 0.2, e.y);
        c.line_to(e.x + ed * 0.25, e.y - ed * 0.05);
        c.stroke();
    }

    for cheek in [mesh::LEFT_CHEEK, mesh::RIGHT_CHEEK] {
        let p = face.point(cheek);
        c.set_fill(
            Brush::radial(p.x, p.y, ed * 0.3)
                .stop(0.0, rgba(255, 182, 193, 0.6))
                .stop(1.0, rgba(255, 182, 193, 0.1)),
        );
        c.fill_circle(p.x, p.y, ed * 0.25);
    }

    let mouth = face.point(mesh::UPPER_LIP);
    c.set_fill(
        Brush::linear(mouth.x, mouth.y - ed * 0.05, mouth.x, mouth.y + ed * 0.05)
            .stop(0.0, rgba(220, 20, 60, 0.9))
            .stop(0.5, rgba(255, 20, 147, 0.8))
            .stop(1.0, rgba(199, 21, 133, 0.9)),
    );
    c.fill_ellipse(mouth.x, mouth.y, ed * 0.2, ed * 0.08, 0.0);

    // Gloss
    c.set_fill(rgba(255, 255, 255, 0.3));
    c.fill_ellipse(mouth.x, mouth.y - ed * 0.02, ed * 0.15, ed * 0.03, 0.0);
}

/// Two fixed scars (forehead, left cheek) plus three small ones at random.
pub(super) fn battle_scars(scene: &mut Scene<'_>) {
    let face = scene.face;
    let f = face.point(mesh::FOREHEAD);
    let lc = face.point(mesh::LEFT_CHEEK);
    let fw = face.eye_distance() * 2.0;

    let c = &mut *scene.canvas;
    scar(
        c,
        (f.x - fw * 0.08, f.y - fw * 0.05),
        (f.x + fw * 0.12, f.y + fw * 0.02),
        fw * 0.008,
    );
    scar(
        c,
        (lc.x - fw * 0.05, lc.y - fw * 0.08),
        (lc.x + fw * 0.03, lc.y + fw * 0.05),
        fw * 0.006,
    );

    for _ in 0..3 {
        let x = f.x + (scene.random() - 0.5) * fw * 0.6;
        let y = f.y + (scene.random() - 0.2) * fw * 0.4;
        let end_x = x + (scene.random() - 0.5) * fw * 0.1;
        let end_y = y + (scene.random() - 0.5) * fw * 0.08;
        scar(scene.canvas, (x, y), (end_x, end_y), fw * 0.004);
    }
}

/// A raised scar line with a pale highlight and cross stitches every ~20px.
fn scar(c: &mut Canvas, start: (f64, f64), end: (f64, f64), width: f64) {
    c.set_line_cap(LineCap::Round);
    c.set_stroke(rgba(139, 90, 90, 0.8));
    c.set_line_width(width * 2.0);
    c.stroke_line(start.0, start.1, end.0, end.1);

    c.set_stroke(rgba(210, 180, 180, 0.6));
    c.set_line_width(width);
    c.stroke_line(start.0, start.1, end.0, end.1);

    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let stitches = (dx.hypot(dy) / 20.0).floor() as usize;
    // A single stitch has no span to interpolate over.
    if stitches < 2 {
        return;
    }
    c.set_stroke(rgba(80, 80, 80, 0.7));
    c.set_line_width(1.0);
    let arm = width * 2.0;
    for i in 0..stitches {
        let t = i as f64 / (stitches - 1) as f64;
        let x = start.0 + dx * t;
        let y = start.1 + dy * t;
        c.begin_path();
        c.move_to(x - arm, y - arm);
        c.line_to(x + arm, y + arm);
        c.move_to(x + arm, y - arm);
        c.line_to(x - arm, y + arm);
        c.stroke();
    }
}

pub(super) fn aging(scene: &mut Scene<'_>) {
    // Crow's feet endpoints, in eye distances from the eye corner.
    const CROWS_FEET: [(f64, f64); 5] = [(0.25, -0.1), (0.3, -0.05), (0.3, 0.0), (0.3, 0.05), (0.25, 0.1)];

    let face = scene.face;
    let f = face.point(mesh::FOREHEAD);
    let ed = face.eye_distance();
    let fw = ed * 2.0;

    let c = &mut *scene.canvas;
    c.set_stroke(rgba(139, 115, 85, 0.4));
    c.set_line_width(1.5);
    c.set_line_cap(LineCap::Round);
    for i in 0..4 {
        let y = f.y - fw * 0.1 + i as f64 * fw * 0.04;
        c.begin_path();
        c.move_to(f.x - fw * 0.2, y);
        c.quad_to(f.x, y + fw * 0.01, f.x + fw * 0.2, y);
        c.stroke();
    }

    let le = face.point(mesh::LEFT_EYE);
    let re = face.point(mesh::RIGHT_EYE);
    for (dx, dy) in CROWS_FEET {
        c.stroke_line(le.x + ed * 0.15, le.y, le.x + ed * dx, le.y + ed * dy);
        c.stroke_line(re.x - ed * 0.15, re.y, re.x - ed * dx, re.y + ed * dy);
    }

    // Nasolabial folds
    let nose = face.point(mesh::NOSE_TIP);
    let mouth = face.point(mesh::UPPER_LIP);
    for side in [-1.0, 1.0] {
        c.begin_path();
        c.move_to(nose.x + side * ed * 0.1, nose.y + ed * 0.1);
        c.quad_to(
            nose.x + side * ed * 0.15,
            mouth.y - ed * 0.05,
            mouth.x + side * ed * 0.15,
            mouth.y + ed * 0.05,
        );
        c.stroke();
    }

    for _ in 0..8 {
        let x = f.x + (scene.random() - 0.5) * fw * 0.8;
        let y = f.y + (scene.random() - 0.2) * fw * 0.6;
        let r = 2.0 + scene.random() * 4.0;
        let c = &mut *scene.canvas;
        c.set_fill(rgba(139, 115, 85, 0.3));
        c.fill_circle(x, y, r);
    }
}

/// Tribal swirl on the left cheek, a star on the forehead and a dot arc on
/// the right cheek.
pub(super) fn face_tattoos(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let f = face.point(mesh::FOREHEAD);
    let lc = face.point(mesh::LEFT_CHEEK);
    let rc = face.point(mesh::RIGHT_CHEEK);
    let fw = face.eye_distance() * 2.0;
    let ink = rgba(0, 0, 0, 0.8);

    c.set_stroke(ink);
    c.set_line_width(3.0);
    c.set_line_cap(LineCap::Round);
    c.set_line_join(LineJoin::Round);
    c.begin_path();
    c.move_to(lc.x - fw * 0.08, lc.y - fw * 0.1);
    c.quad_to(lc.x, lc.y - fw * 0.05, lc.x + fw * 0.05, lc.y);
    c.quad_to(lc.x + fw * 0.03, lc.y + fw * 0.08, lc.x - fw * 0.02, lc.y + fw * 0.1);
    c.quad_to(lc.x - fw * 0.06, lc.y + fw * 0.05, lc.x - fw * 0.08, lc.y - fw * 0.1);
    c.stroke();

    c.set_line_width(2.0);
    c.begin_path();
    c.move_to(lc.x - fw * 0.04, lc.y - fw * 0.03);
    c.line_to(lc.x + fw * 0.02, lc.y + fw * 0.02);
    c.move_to(lc.x - fw * 0.02, lc.y + fw * 0.03);
    c.line_to(lc.x + fw * 0.01, lc.y - fw * 0.02);
    c.stroke();

    // Star traced by skipping every other vertex.
    let (sx, sy) = (f.x, f.y - fw * 0.08);
    let size = fw * 0.04;
    let vertex = |i: i32| {
        let angle = i as f64 * TAU / 5.0 - FRAC_PI_2;
        (sx + angle.cos() * size, sy + angle.sin() * size)
    };
    c.set_fill(rgba(0, 0, 0, 0.7));
    c.begin_path();
    let (x0, y0) = vertex(0);
    c.move_to(x0, y0);
    for i in 1..5 {
        let (px, py) = vertex(i - 2);
        let (x, y) = vertex(i);
        c.line_to(px, py);
        c.line_to(x, y);
    }
    c.close_path();
    c.fill();
    c.stroke();

    c.set_fill(ink);
    for i in 0..7 {
        let a = i as f64 * 0.8;
        let r = (2 + i % 3) as f64;
        c.fill_circle(rc.x + a.sin() * fw * 0.05, rc.y + a.cos() * fw * 0.05, r);
    }
}

#[cfg(test)]
mod tests {
    use crate::filters::test_support::{grey_frame, render_still};

    #[test]
    fn test_glam_lips_are_pink() {
        let raw = grey_frame();
        let out = render_still("makeup-glam", 0.0, 0);
        let (lip, before) = (out.get_pixel(80, 77).0, raw.get_pixel(80, 77).0);
        assert!(lip[0] > before[0] + 60, "{lip:?}");
    }

    #[test]
    fn test_tattoos_leave_the_chin_alone() {
        let raw = grey_frame();
        let out = render_still("face-tattoos", 0.0, 0);
        assert_eq!(out.get_pixel(80, 100), raw.get_pixel(80, 100));
    }

    #[test]
    fn test_aging_spots_follow_the_seed() {
        assert_eq!(render_still("aging-time", 0.0, 9), render_still("aging-time", 0.0, 9));
        assert_ne!(render_still("aging-time", 0.0, 9), render_still("aging-time", 0.0, 10));
    }
}
