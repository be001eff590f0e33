//! Expression overlays.

use std::f64::consts::TAU;

use crate::canvas::{hex, rgba, Canvas, LineCap};
use crate::landmarks::{mesh, Face};
use crate::scene::Scene;

/// Scowling brows, frown lines, steam, gritted teeth, flush, a throbbing vein
/// and a ring of flames.
pub(super) fn angry(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let ed = face.eye_distance();
    let fw = ed * 2.0;

    brows(c, &face, ed);
    frown_lines(c, &face, ed);
    steam(c, &face, fw, scene.time.phase(0.005));
    gritted_mouth(c, &face, ed);
    flush(c, &face, fw);
    vein(c, &face, ed, scene.time.phase(0.01));
    flames(c, &face, fw, scene.time.phase(0.008));
}

fn brows(c: &mut Canvas, face: &Face<'_>, ed: f64) {
    let thick = ed * 0.15;
    let len = ed * 0.8;

    c.set_fill(hex(0x2F1B14));
    c.set_stroke(hex(0x1A0F0A));
    c.set_line_width(2.0);
    for (side, eye, brow) in [(1.0, mesh::LEFT_EYE, mesh::LEFT_BROW), (-1.0, mesh::RIGHT_EYE, mesh::RIGHT_BROW)] {
        let e = face.point(eye);
        let b = face.point(brow);
        c.begin_path();
        c.move_to(e.x - side * len * 0.6, b.y - thick * 0.5);
        c.line_to(e.x + side * len * 0.2, b.y - thick * 2.0);
        c.line_to(e.x + side * len * 0.3, b.y - thick * 1.5);
        c.line_to(e.x - side * len * 0.5, b.y + thick * 0.5);
        c.close_path();
        c.fill();
        c.stroke();
    }

    c.set_stroke(hex(0x2F1B14));
    c.set_line_width(3.0);
    c.set_line_cap(LineCap::Round);
    for (side, eye, brow) in [(1.0, mesh::LEFT_EYE, mesh::LEFT_BROW), (-1.0, mesh::RIGHT_EYE, mesh::RIGHT_BROW)] {
        let e = face.point(eye);
        let b = face.point(brow);
        for i in 0..8 {
            let i = i as f64;
            let x = e.x - side * (len * 0.5 - len * 0.6 / 7.0 * i);
            let lean = (side * (i - 4.0) * 0.1).sin() * 8.0;
            c.stroke_line(x, b.y - thick * 0.3, x + lean, b.y + thick * 0.3);
        }
    }
}

fn frown_lines(c: &mut Canvas, face: &Face<'_>, ed: f64) {
    let f = face.point(mesh::FOREHEAD);
    c.set_stroke(hex(0x8B4513));
    c.set_line_width(4.0);
    c.set_line_cap(LineCap::Round);
    c.stroke_line(f.x, f.y - ed * 0.1, f.x, f.y + ed * 0.3);

    c.set_line_width(3.0);
    for side in [-1.0, 1.0] {
        c.stroke_line(f.x + side * ed * 0.15, f.y, f.x + side * ed * 0.1, f.y + ed * 0.25);
    }

    c.set_line_width(2.0);
    c.set_stroke(hex(0xA0522D));
    for i in 0..3 {
        let offset = (i as f64 - 1.0) * ed * 0.2;
        c.stroke_line(
            f.x + offset - ed * 0.1,
            f.y - ed * 0.05,
            f.x + offset + ed * 0.1,
            f.y + ed * 0.15,
        );
    }
}

fn steam(c: &mut Canvas, face: &Face<'_>, fw: f64, t: f64) {
    let f = face.point(mesh::FOREHEAD);
    c.set_stroke(hex(0xDCDCDC));
    c.set_line_width(6.0);
    c.set_line_cap(LineCap::Round);
    for i in 0..6 {
        let i = i as f64;
        let x = f.x + (i - 2.5) * fw * 0.1;
        let y = f.y - fw * 0.3;
        c.begin_path();
        c.move_to(x, y);
        for j in 1..=8 {
            let j = j as f64;
            c.line_to(x + (t + i + j * 0.5).sin() * j * 2.0, y - j * 8.0);
        }
        c.stroke();
    }

    c.set_fill(rgba(220, 220, 220, 0.6));
    for i in 0..4 {
        let i = i as f64;
        c.fill_circle(
            f.x + (i - 1.5) * fw * 0.15 + (t + i).sin() * 5.0,
            f.y - fw * 0.4 - (t * 2.0 + i).sin() * 10.0,
            8.0 + (t * 3.0 + i).sin() * 3.0,
        );
    }
}

fn gritted_mouth(c: &mut Canvas, face: &Face<'_>, ed: f64) {
    let lip = face.point(mesh::UPPER_LIP);
    let lm = face.point(mesh::LEFT_MOUTH);
    let rm = face.point(mesh::RIGHT_MOUTH);

    c.set_stroke(hex(0x8B4513));
    c.set_line_width(3.0);
    c.set_line_cap(LineCap::Round);
    c.begin_path();
    c.move_to(lm.x, lm.y);
    c.quad_to(lip.x, lip.y + ed * 0.2, rm.x, rm.y);
    c.stroke();

    let width = (rm.x - lm.x).abs();
    for i in 0..6 {
        let x = lm.x + width / 5.0 * i as f64;
        c.stroke_line(x, lip.y - 5.0, x, lip.y + 5.0);
    }

    c.set_line_width(4.0);
    c.stroke_line(lm.x - ed * 0.1, lm.y - ed * 0.05, lm.x, lm.y + ed * 0.05);
    c.stroke_line(rm.x + ed * 0.1, rm.y - ed * 0.05, rm.x, rm.y + ed * 0.05);
}

fn flush(c: &mut Canvas, face: &Face<'_>, fw: f64) {
    let lc = face.point(mesh::LEFT_CHEEK);
    let rc = face.point(mesh::RIGHT_CHEEK);
    c.set_fill(rgba(255, 69, 69, 0.6));
    c.fill_ellipse(lc.x - fw * 0.1, lc.y, fw * 0.15, fw * 0.1, 0.0);
    c.fill_ellipse(rc.x + fw * 0.1, rc.y, fw * 0.15, fw * 0.1, 0.0);

    c.set_fill(rgba(255, 100, 100, 0.3));
    for eye in [mesh::LEFT_EYE, mesh::RIGHT_EYE] {
        let e = face.point(eye);
        c.fill_ellipse(e.x, e.y, fw * 0.12, fw * 0.08, 0.0);
    }
}

fn vein(c: &mut Canvas, face: &Face<'_>, ed: f64, t: f64) {
    let f = face.point(mesh::FOREHEAD);
    let pulse = (t * 3.0).sin() * 0.5 + 1.0;

    c.set_stroke(rgba(139, 0, 0, 0.7 * pulse));
    c.set_line_width(4.0 * pulse);
    c.set_line_cap(LineCap::Round);
    c.begin_path();
    c.move_to(f.x - ed * 0.2, f.y - ed * 0.15);
    c.quad_to(f.x - ed * 0.05, f.y - ed * 0.25, f.x + ed * 0.1, f.y - ed * 0.1);
    c.stroke();

    c.set_line_width(2.0 * pulse);
    c.stroke_line(f.x - ed * 0.1, f.y - ed * 0.2, f.x - ed * 0.15, f.y - ed * 0.3);
    c.stroke_line(f.x + ed * 0.05, f.y - ed * 0.15, f.x + ed * 0.1, f.y - ed * 0.25);
}

fn flames(c: &mut Canvas, face: &Face<'_>, fw: f64, t: f64) {
    const FIRE: [u32; 4] = [0xFF4500, 0xFF6347, 0xFF8C00, 0xFFD700];
    let f = face.point(mesh::FOREHEAD);

    for i in 0..12 {
        let i = i as f64;
        let angle = i * TAU / 12.0 + t;
        let radius = fw * 0.6 + (t * 4.0 + i).sin() * 10.0;
        let x = f.x + angle.cos() * radius;
        let y = f.y + angle.sin() * radius * 0.8;

        let shade = ((t * 2.0 + i).sin() * 2.0 + 2.0).floor() as usize % FIRE.len();
        c.set_fill(hex(FIRE[shade]));
        let height = 15.0 + (t * 6.0 + i).sin() * 8.0;
        let width = 8.0 + (t * 4.0 + i).sin() * 4.0;
        c.begin_path();
        c.move_to(x, y);
        c.quad_to(x - width, y - height * 0.6, x, y - height);
        c.quad_to(x + width, y - height * 0.6, x, y);
        c.fill();
    }

    c.set_fill(hex(0xFFFF00));
    for i in 0..8 {
        let i = i as f64;
        let r = 2.0 + (t * 8.0 + i).sin() * 2.0;
        if r > 0.0 {
            c.fill_circle(
                f.x + (t * 5.0 + i).sin() * fw * 0.8,
                f.y + (t * 4.0 + i).cos() * fw * 0.6,
                r,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::filters::test_support::render_still;

    #[test]
    fn test_angry_flush_reddens_cheeks() {
        let out = render_still("angry", 0.0, 0);
        // Left cheek flush centre: (57.6 - 7.68, 66).
        let p = out.get_pixel(48, 66).0;
        assert!(p[0] > p[1] && p[0] > p[2], "{p:?}");
    }
}
