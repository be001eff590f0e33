//! Full-face creature transformations: alien, zombie, cyborg and dragon.
//!
//! These cover most of the face and animate text or effects around it. The
//! alien, zombie and cyborg scatter some elements with the scene's random
//! source.

use std::f64::consts::{PI, TAU};

use crate::canvas::{hex, hsl, rgba, Canvas, LineCap, TextAlign};
use crate::landmarks::{mesh, Face};
use crate::scene::Scene;

/// Spins the three alien glyph strings around the forehead.
const ALIEN_GLYPHS: [&str; 3] = ["▲◆●◄", "☰☱☲☳", "⟐⟑⟒⟓"];
const ZOMBIE_GROANS: [&str; 3] = ["BRAINSSS...", "GRAAAH!", "URGHHHH"];
const CYBORG_STATUS: [&str; 3] = ["SCANNING...", "TARGET LOCKED", "ANALYZE COMPLETE"];
const CYBORG_ERRORS: [&str; 3] = ["ERROR 404", "SYSTEM FAIL", "REBOOT REQ"];

pub(super) fn alien_invasion(scene: &mut Scene<'_>) {
    let face = scene.face;
    let f = face.point(mesh::FOREHEAD);
    let ed = face.eye_distance();
    let fw = ed * 2.0;
    let fh = face.face_height();

    // Skin
    let c = &mut *scene.canvas;
    c.set_fill(rgba(100, 200, 100, 0.6));
    c.fill_ellipse(f.x, f.y + fh * 0.2, fw * 0.6, fh * 0.8, 0.0);
    for _ in 0..8 {
        let x = f.x + (scene.random() - 0.5) * fw * 0.8;
        let y = f.y + (scene.random() - 0.2) * fh * 0.8;
        let r = 5.0 + scene.random() * 8.0;
        let c = &mut *scene.canvas;
        c.set_fill(rgba(80, 180, 80, 0.4));
        c.fill_circle(x, y, r);
    }

    let c = &mut *scene.canvas;
    alien_eyes(c, &face, ed);
    let ufo_y = f.y - fw * 0.8;
    ufo(c, f.x, ufo_y, fw, scene.time.phase(0.003));

    // Tractor beam
    c.set_fill(rgba(255, 255, 0, 0.3));
    c.set_stroke(rgba(255, 255, 0, 0.6));
    c.set_line_width(3.0);
    c.begin_path();
    c.move_to(f.x - fw * 0.3, ufo_y);
    c.line_to(f.x - fw * 0.5, f.y + fh * 0.5);
    c.line_to(f.x + fw * 0.5, f.y + fh * 0.5);
    c.line_to(f.x + fw * 0.3, ufo_y);
    c.close_path();
    c.fill();
    c.stroke();

    let t = scene.time.phase(0.01);
    for i in 0..15 {
        let i = i as f64;
        let x = f.x + (scene.random() - 0.5) * fw * 0.8;
        let c = &mut *scene.canvas;
        c.set_fill(hex(0xFFFF00));
        let r = 2.0 + (t * 2.0 + i).sin() * 2.0;
        if r > 0.0 {
            c.fill_circle(x, f.y + (t + i).sin() * fh * 0.3, r);
        }
    }

    let t = scene.time.phase(0.005);
    let c = &mut *scene.canvas;
    c.set_font_size((fw * 0.08).floor());
    c.set_fill(hsl((t * 100.0) % 360.0, 100.0, 50.0));
    c.set_text_align(TextAlign::Center);
    for (i, glyphs) in ALIEN_GLYPHS.iter().enumerate() {
        let i = i as f64;
        let angle = t * 2.0 + i * PI / 1.5;
        let radius = fw * 0.6;
        c.with_saved(|c| {
            c.translate(f.x + angle.cos() * radius, f.y + angle.sin() * radius);
            c.rotate(t + i);
            c.fill_text(glyphs, 0.0, 0.0);
        });
    }
}

fn alien_eyes(c: &mut Canvas, face: &Face<'_>, ed: f64) {
    let size = ed * 0.8;
    let eyes = [face.point(mesh::LEFT_EYE), face.point(mesh::RIGHT_EYE)];

    c.set_fill(hex(0x000000));
    c.set_stroke(hex(0x333333));
    c.set_line_width(3.0);
    for e in eyes {
        c.begin_path();
        c.ellipse(e.x, e.y, size * 0.6, size * 0.8, 0.0, 0.0, TAU, false);
        c.fill();
        c.stroke();
    }

    c.set_fill(hex(0xFFFFFF));
    for e in eyes {
        c.fill_ellipse(e.x - size * 0.2, e.y - size * 0.3, size * 0.15, size * 0.2, 0.0);
    }
}

fn ufo(c: &mut Canvas, x: f64, y: f64, fw: f64, t: f64) {
    const LIGHTS: [u32; 4] = [0xFF0000, 0x00FF00, 0x0000FF, 0xFFFF00];

    c.set_fill(hex(0xC0C0C0));
    c.set_stroke(hex(0x808080));
    c.set_line_width(3.0);
    c.begin_path();
    c.arc(x, y, fw * 0.3, 0.0, PI, true);
    c.fill();
    c.stroke();

    c.begin_path();
    c.ellipse(x, y, fw * 0.5, fw * 0.15, 0.0, 0.0, TAU, false);
    c.fill();
    c.stroke();

    for i in 0..6 {
        let angle = i as f64 * PI / 3.0 + t;
        c.set_fill(hex(LIGHTS[i % LIGHTS.len()]));
        c.fill_circle(x + angle.cos() * fw * 0.4, y, 5.0);
    }
}

pub(super) fn zombie_outbreak(scene: &mut Scene<'_>) {
    let face = scene.face;
    let f = face.point(mesh::FOREHEAD);
    let ed = face.eye_distance();
    let fw = ed * 2.0;
    let fh = face.face_height();

    let c = &mut *scene.canvas;
    c.set_fill(rgba(120, 140, 100, 0.7));
    c.fill_ellipse(f.x, f.y + fh * 0.2, fw * 0.6, fh * 0.8, 0.0);
    for _ in 0..12 {
        let x = f.x + (scene.random() - 0.5) * fw * 0.8;
        let y = f.y + (scene.random() - 0.2) * fh * 0.8;
        let r = 8.0 + scene.random() * 15.0;
        let c = &mut *scene.canvas;
        c.set_fill(rgba(80, 100, 60, 0.8));
        c.fill_circle(x, y, r);
    }

    // Forehead gash and cheek scratches
    let c = &mut *scene.canvas;
    c.set_fill(hex(0x8B0000));
    c.fill_polygon(&[
        (f.x - fw * 0.1, f.y - fh * 0.1),
        (f.x + fw * 0.15, f.y - fh * 0.05),
        (f.x + fw * 0.05, f.y + fh * 0.05),
        (f.x - fw * 0.05, f.y),
    ]);
    let lc = face.point(mesh::LEFT_CHEEK);
    c.set_stroke(hex(0x8B0000));
    c.set_line_width(4.0);
    c.set_line_cap(LineCap::Round);
    for i in 0..3 {
        let dy = i as f64 * fh * 0.04;
        c.stroke_line(
            lc.x - fw * 0.1,
            lc.y - fh * 0.1 + dy,
            lc.x + fw * 0.05,
            lc.y + fh * 0.05 + dy,
        );
    }

    for i in 0..5 {
        let x = f.x + (i as f64 - 2.0) * fw * 0.15;
        let end = f.y + fh * 0.4 + scene.random() * fh * 0.2;
        let c = &mut *scene.canvas;
        c.set_line_width(6.0);
        c.stroke_line(x, f.y + fh * 0.1, x, end);
    }

    let c = &mut *scene.canvas;
    bloodshot_eyes(c, &face, ed);

    let mouth = face.point(mesh::UPPER_LIP);
    let lm = face.point(mesh::LEFT_MOUTH);
    let rm = face.point(mesh::RIGHT_MOUTH);
    c.set_fill(hex(0x2F2F2F));
    c.set_stroke(hex(0x8B0000));
    c.set_line_width(2.0);
    c.begin_path();
    c.ellipse(mouth.x, mouth.y, ed * 0.4, ed * 0.15, 0.0, 0.0, TAU, false);
    c.fill();
    c.stroke();

    let mouth_width = (rm.x - lm.x).abs();
    // Teeth 2 and 4 are missing; tooth 1 has rotted.
    for i in [0, 1, 3, 5] {
        let x = lm.x + mouth_width / 5.0 * i as f64;
        let height = 8.0 + scene.random() * 5.0;
        let c = &mut *scene.canvas;
        c.set_fill(hex(if i == 1 { 0x8B4513 } else { 0xFFFACD }));
        c.fill_rect(x - 3.0, mouth.y - height / 2.0, 6.0, height);
    }

    let t = scene.time.phase(0.003);
    let c = &mut *scene.canvas;
    c.set_font_size((fw * 0.1).floor());
    c.set_fill(hex(0x8B0000));
    c.set_stroke(hex(0x000000));
    c.set_line_width(2.0);
    c.set_text_align(TextAlign::Center);
    for (i, groan) in ZOMBIE_GROANS.iter().enumerate() {
        let i = i as f64;
        let angle = t * 1.5 + i * PI / 1.5;
        let radius = fw * 0.7;
        c.with_saved(|c| {
            c.translate(f.x + angle.cos() * radius, f.y + angle.sin() * radius);
            c.rotate((t * 3.0 + i).sin() * 0.3);
            c.stroke_text(groan, 0.0, 0.0);
            c.fill_text(groan, 0.0, 0.0);
        });
    }
}

fn bloodshot_eyes(c: &mut Canvas, face: &Face<'_>, ed: f64) {
    let eyes = [face.point(mesh::LEFT_EYE), face.point(mesh::RIGHT_EYE)];
    c.set_fill(hex(0xFFFF00));
    c.set_stroke(hex(0x8B0000));
    c.set_line_width(3.0);
    for e in eyes {
        c.begin_path();
        c.arc(e.x, e.y, ed * 0.2, 0.0, TAU, false);
        c.fill();
        c.stroke();
    }

    c.set_stroke(hex(0xFF0000));
    c.set_line_width(2.0);
    for i in 0..6 {
        let angle = i as f64 * PI / 3.0;
        for e in eyes {
            c.stroke_line(e.x, e.y, e.x + angle.cos() * ed * 0.15, e.y + angle.sin() * ed * 0.15);
        }
    }
}

/// Metal plates, a laser eye, circuit traces, intermittent glitches and
/// orbiting status readouts.
pub(super) fn cyborg(scene: &mut Scene<'_>) {
    let face = scene.face;
    let f = face.point(mesh::FOREHEAD);
    let ed = face.eye_distance();
    let fw = ed * 2.0;
    let fh = face.face_height();

    let c = &mut *scene.canvas;
    metal_plates(c, &face, fw, fh);
    laser_eye(c, &face, ed, scene.time.phase(0.01));

    c.set_stroke(hex(0x00FF00));
    c.set_fill(hex(0x00FF00));
    c.set_line_width(2.0);
    for i in 0..6 {
        let y = f.y + i as f64 * fh * 0.1;
        c.stroke_line(f.x - fw * 0.3, y, f.x + fw * 0.3, y);
        for j in 0..4 {
            c.fill_circle(f.x - fw * 0.2 + j as f64 * fw * 0.133, y, 3.0);
        }
    }
    for i in 0..4 {
        let x = f.x - fw * 0.2 + i as f64 * fw * 0.133;
        c.stroke_line(x, f.y, x, f.y + fh * 0.5);
    }

    // Glitches
    let t = scene.time.phase(0.02);
    if (t * 10.0).sin() > 0.7 {
        let alpha = scene.random() * 0.5 + 0.3;
        for _ in 0..3 {
            let y = f.y + scene.random() * fh;
            let height = 5.0 + scene.random() * 10.0;
            let c = &mut *scene.canvas;
            c.set_fill(rgba(255, 0, 255, alpha));
            c.fill_rect(f.x - fw * 0.4, y, fw * 0.8, height);
        }
    }
    if (t * 15.0).sin() > 0.8 {
        let pick = (scene.random() * CYBORG_ERRORS.len() as f64) as usize;
        let c = &mut *scene.canvas;
        c.set_font_size((fw * 0.04).floor());
        c.set_fill(hex(0xFF0000));
        c.set_text_align(TextAlign::Left);
        c.fill_text(
            CYBORG_ERRORS[pick.min(CYBORG_ERRORS.len() - 1)],
            f.x - fw * 0.3,
            f.y + fh * 0.6,
        );
    }

    let t = scene.time.phase(0.005);
    let c = &mut *scene.canvas;
    c.set_font_size((fw * 0.06).floor());
    c.set_fill(hex(0x00FFFF));
    c.set_stroke(hex(0x000000));
    c.set_line_width(1.0);
    c.set_text_align(TextAlign::Center);
    for (i, status) in CYBORG_STATUS.iter().enumerate() {
        let angle = t * 2.0 + i as f64 * PI / 1.5;
        let radius = fw * 0.8;
        let x = f.x + angle.cos() * radius;
        let y = f.y + angle.sin() * radius * 0.5;
        c.stroke_text(status, x, y);
        c.fill_text(status, x, y);
    }
}

fn metal_plates(c: &mut Canvas, face: &Face<'_>, fw: f64, fh: f64) {
    let lc = face.point(mesh::LEFT_CHEEK);
    let f = face.point(mesh::FOREHEAD);

    c.set_fill(hex(0xC0C0C0));
    c.set_stroke(hex(0x808080));
    c.set_line_width(3.0);
    c.begin_path();
    c.move_to(lc.x - fw * 0.15, lc.y - fh * 0.1);
    c.line_to(lc.x + fw * 0.05, lc.y - fh * 0.05);
    c.line_to(lc.x + fw * 0.1, lc.y + fh * 0.15);
    c.line_to(lc.x - fw * 0.1, lc.y + fh * 0.1);
    c.close_path();
    c.fill();
    c.stroke();

    c.begin_path();
    c.rect(f.x - fw * 0.2, f.y - fh * 0.15, fw * 0.4, fh * 0.1);
    c.fill();
    c.stroke();

    c.set_fill(hex(0x2F2F2F));
    for i in 0..8 {
        let x = lc.x - fw * 0.1 + (i % 3) as f64 * fw * 0.06;
        let y = lc.y - fh * 0.05 + (i / 3) as f64 * fh * 0.06;
        c.fill_circle(x, y, 3.0);
    }
}

fn laser_eye(c: &mut Canvas, face: &Face<'_>, ed: f64, t: f64) {
    let eye = face.point(mesh::RIGHT_EYE);

    c.set_fill(hex(0xFF0000));
    c.set_stroke(hex(0x8B0000));
    c.set_line_width(3.0);
    c.begin_path();
    c.arc(eye.x, eye.y, ed * 0.25, 0.0, TAU, false);
    c.fill();
    c.stroke();

    c.set_stroke(hex(0xFF4500));
    c.set_line_width(2.0);
    for i in 0..5 {
        let i = i as f64;
        let y = eye.y - ed * 0.2 + i * ed * 0.1 + (t * 5.0 + i).sin() * 5.0;
        c.stroke_line(eye.x - ed * 0.2, y, eye.x + ed * 0.2, y);
    }

    let beam = (t * 8.0).sin() * 0.5 + 0.5;
    c.set_stroke(rgba(255, 0, 0, beam));
    c.set_line_width(4.0);
    c.stroke_line(
        eye.x + ed * 0.25,
        eye.y,
        eye.x + ed * 2.0,
        eye.y + (t * 2.0).sin() * 20.0,
    );
}

/// Scales, horns, fire breath and circling coins.
pub(super) fn dragon(scene: &mut Scene<'_>) {
    const FIRE: [u32; 3] = [0xFF4500, 0xFF6347, 0xFFD700];

    let face = scene.face;
    let c = &mut *scene.canvas;
    let f = face.point(mesh::FOREHEAD);
    let nose = face.point(mesh::NOSE_TIP);
    let fw = face.eye_distance() * 2.0;
    let t = scene.time.phase(0.005);

    c.set_fill(hex(0x228B22));
    for row in 0..8 {
        for col in 0..6 {
            c.fill_ellipse(
                f.x - fw * 0.3 + col as f64 * fw * 0.1,
                f.y - fw * 0.2 + row as f64 * fw * 0.08,
                fw * 0.04,
                fw * 0.03,
                0.0,
            );
        }
    }

    c.set_fill(hex(0x8B4513));
    for side in [-1.0, 1.0] {
        c.fill_polygon(&[
            (f.x + side * fw * 0.2, f.y - fw * 0.1),
            (f.x + side * fw * 0.25, f.y - fw * 0.4),
            (f.x + side * fw * 0.15, f.y - fw * 0.3),
        ]);
    }

    for i in 0..12 {
        let k = i as f64;
        c.set_fill(hex(FIRE[i % FIRE.len()]));
        c.fill_circle(
            nose.x + fw * 0.2 + (t * 5.0 + k).sin() * fw * 0.3,
            nose.y + (t * 3.0 + k).cos() * fw * 0.2,
            8.0 + (t * 8.0 + k).sin() * 5.0,
        );
    }

    c.set_fill(hex(0xFFD700));
    for i in 0..6 {
        let i = i as f64;
        c.fill_circle(
            f.x + (t + i).sin() * fw * 0.8,
            f.y + fw * 0.6 + (t * 2.0 + i).cos() * fw * 0.2,
            8.0,
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::filters::test_support::{grey_frame, render_still};

    #[test]
    fn test_alien_eyes_are_black() {
        let out = render_still("alien", 0.0, 0);
        // Below the highlight; only the yellow beam is layered on top.
        let p = out.get_pixel(61, 55).0;
        assert!(p[0] < 100 && p[2] < 20, "{p:?}");
    }

    #[test]
    fn test_zombie_skin_tints_the_face() {
        let raw = grey_frame();
        let a = render_still("zombie", 500.0, 1);
        let b = render_still("zombie", 500.0, 2);
        assert_ne!(a, raw);
        assert_ne!(a, b);
    }

    #[test]
    fn test_cyborg_laser_lens_is_red() {
        let out = render_still("cyborg", 0.0, 0);
        let p = out.get_pixel(99, 51).0;
        assert!(p[0] > 150 && p[1] < 100, "{p:?}");
    }

    #[test]
    fn test_dragon_has_no_randomness() {
        assert_eq!(render_still("dragon", 300.0, 1), render_still("dragon", 300.0, 2));
    }
}
