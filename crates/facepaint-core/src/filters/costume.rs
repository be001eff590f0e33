//! Full-outfit filters: headgear plus clothing drawn below the chin.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use kurbo::Point;

use crate::canvas::{hex, hsl, rgba, Canvas, LineCap, TextAlign};
use crate::landmarks::{mesh, Face};
use crate::scene::Scene;

pub(super) fn hijab(scene: &mut Scene<'_>) {
    const CLOTH: u32 = 0x2C5F41;
    const HEM: u32 = 0x1A4B33;
    const PATTERN: u32 = 0x4A7C59;

    let face = scene.face;
    let c = &mut *scene.canvas;
    let f = face.point(mesh::FOREHEAD);
    let lt = face.point(mesh::LEFT_TEMPLE);
    let rt = face.point(mesh::RIGHT_TEMPLE);
    let lc = face.point(mesh::LEFT_CHEEK);
    let rc = face.point(mesh::RIGHT_CHEEK);
    let chin = face.point(mesh::CHIN);
    let lj = face.point(mesh::LEFT_JAW);
    let rj = face.point(mesh::RIGHT_JAW);
    let w = face.temple_width();
    let h = face.face_height();

    c.set_fill(hex(CLOTH));
    c.set_stroke(hex(HEM));
    c.set_line_width(2.0);

    // Crown of the head, stopping short of the face opening.
    c.begin_path();
    c.move_to(lt.x - w * 0.4, f.y - h * 0.05);
    c.quad_to(lt.x - w * 0.2, f.y - h * 0.8, f.x - w * 0.1, f.y - h);
    c.quad_to(f.x, f.y - h * 1.1, f.x + w * 0.1, f.y - h);
    c.quad_to(rt.x + w * 0.2, f.y - h * 0.8, rt.x + w * 0.4, f.y - h * 0.05);
    c.line_to(rt.x + w * 0.1, f.y - h * 0.1);
    c.quad_to(f.x + w * 0.05, f.y - h * 0.15, f.x, f.y - h * 0.18);
    c.quad_to(f.x - w * 0.05, f.y - h * 0.15, lt.x - w * 0.1, lt.y - h * 0.1);
    c.close_path();
    c.fill();
    c.stroke();

    // Side panels down to the shoulders, mirrored.
    for (side, temple, cheek, jaw) in [(-1.0, lt, lc, lj), (1.0, rt, rc, rj)] {
        c.begin_path();
        c.move_to(temple.x + side * w * 0.4, f.y - h * 0.05);
        c.line_to(temple.x + side * w * 0.1, f.y - h * 0.1);
        c.line_to(cheek.x + side * w * 0.15, cheek.y + h * 0.1);
        c.line_to(cheek.x + side * w * 0.25, cheek.y + h * 0.2);
        c.line_to(cheek.x + side * w * 0.3, chin.y + h * 0.8);
        c.quad_to(f.x + side * w * 0.5, chin.y + h * 1.2, f.x + side * w * 0.2, chin.y + h);
        c.line_to(jaw.x + side * w * 0.1, chin.y + h * 0.3);
        c.quad_to(
            cheek.x + side * w * 0.05,
            cheek.y + h * 0.15,
            temple.x + side * w * 0.35,
            temple.y - h * 0.02,
        );
        c.close_path();
        c.fill();
        c.stroke();
    }

    // Under the chin
    c.begin_path();
    c.move_to(lj.x - w * 0.1, chin.y + h * 0.3);
    c.line_to(f.x - w * 0.2, chin.y + h);
    c.quad_to(f.x, chin.y + h * 1.1, f.x + w * 0.2, chin.y + h);
    c.line_to(rj.x + w * 0.1, chin.y + h * 0.3);
    c.quad_to(f.x, chin.y + h * 0.5, lj.x - w * 0.1, chin.y + h * 0.3);
    c.close_path();
    c.fill();
    c.stroke();

    c.set_stroke(hex(PATTERN));
    c.set_line_width(1.0);
    c.set_global_alpha(0.4);
    for i in 0..5 {
        let y = f.y - h * 0.9 + i as f64 * h * 0.12;
        let span = w * (0.6 - i as f64 * 0.08);
        c.stroke_line(f.x - span * 0.5, y, f.x + span * 0.5, y);
        if i % 2 == 0 {
            for j in -1..=1 {
                c.fill_circle(f.x + j as f64 * span * 0.2, y - 6.0, 1.5);
            }
        }
    }

    // Gold trim around the face opening
    c.set_stroke(hex(0xFFD700));
    c.set_line_width(2.0);
    c.set_global_alpha(0.8);
    c.begin_path();
    c.move_to(lc.x - w * 0.15, lc.y + h * 0.1);
    c.quad_to(lt.x - w * 0.05, f.y - h * 0.05, f.x - w * 0.02, f.y - h * 0.12);
    c.quad_to(f.x, f.y - h * 0.15, f.x + w * 0.02, f.y - h * 0.12);
    c.quad_to(rt.x + w * 0.05, f.y - h * 0.05, rc.x + w * 0.15, rc.y + h * 0.1);
    c.stroke();
    c.set_global_alpha(1.0);

    let pin = Point::new(rt.x + w * 0.08, f.y - h * 0.08);
    c.set_fill(hex(0xFFD700));
    c.set_stroke(hex(0xB8860B));
    c.set_line_width(1.0);
    c.begin_path();
    c.arc(pin.x, pin.y, 3.0, 0.0, TAU, false);
    c.fill();
    c.stroke();
    c.set_stroke(hex(HEM));
    for i in 0..4 {
        let a = i as f64 * FRAC_PI_2;
        c.stroke_line(pin.x, pin.y, pin.x + a.cos() * 2.0, pin.y + a.sin() * 2.0);
    }
}

/// Combat helmet, camouflage paint, dog tags, collar, chevrons and vest.
pub(super) fn army(scene: &mut Scene<'_>) {
    const CAMO: [u32; 4] = [0x4F5D2F, 0x2F3B1F, 0x1C2812, 0x654321];

    let face = scene.face;
    let f = face.point(mesh::FOREHEAD);
    let lt = face.point(mesh::LEFT_TEMPLE);
    let rt = face.point(mesh::RIGHT_TEMPLE);
    let chin = face.point(mesh::CHIN);
    let fw = face.eye_distance() * 2.0;
    let fh = face.face_height();

    // Helmet shell and rim
    let c = &mut *scene.canvas;
    c.set_fill(hex(0x4F5D2F));
    c.set_stroke(hex(0x3C4A25));
    c.set_line_width(3.0);
    c.begin_path();
    c.arc(f.x, f.y - fh * 0.2, fw * 0.75, 0.1 * PI, 0.9 * PI, false);
    c.close_path();
    c.fill();
    c.stroke();
    c.set_fill(hex(0x3C4A25));
    c.begin_path();
    c.ellipse(f.x, f.y + fh * 0.02, fw * 0.55, fh * 0.08, 0.0, 0.0, PI, false);
    c.fill();
    c.stroke();

    c.set_fill(hex(0x2F3B1F));
    for _ in 0..12 {
        let x = f.x + (scene.random() - 0.5) * fw * 1.2;
        let y = f.y - fh * 0.4 + scene.random() * fh * 0.6;
        let r = 8.0 + scene.random() * 12.0;
        scene.canvas.fill_circle(x, y, r);
    }

    let c = &mut *scene.canvas;
    c.set_stroke(hex(0x654321));
    c.set_line_width(6.0);
    c.set_line_cap(LineCap::Round);
    c.begin_path();
    c.move_to(lt.x - fw * 0.05, lt.y + fh * 0.25);
    c.quad_to(f.x, lt.y + fh * 0.45, rt.x + fw * 0.05, rt.y + fh * 0.25);
    c.stroke();

    // Night-vision mount and strap buckles
    c.set_fill(hex(0x2F2F2F));
    c.set_stroke(hex(0x1C1C1C));
    c.set_line_width(2.0);
    plate(c, f.x - fw * 0.08, f.y - fh * 0.35, fw * 0.16, fh * 0.08);
    c.set_fill(hex(0x8B7355));
    plate(c, lt.x - fw * 0.08, lt.y + fh * 0.15, fw * 0.06, fh * 0.04);
    plate(c, rt.x + fw * 0.02, rt.y + fh * 0.15, fw * 0.06, fh * 0.04);

    // Face paint
    let lc = face.point(mesh::LEFT_CHEEK);
    let rc = face.point(mesh::RIGHT_CHEEK);
    let nose = face.point(mesh::NOSE_TIP);
    c.set_line_width(8.0);
    for i in 0..3 {
        c.set_stroke(hex(CAMO[i % CAMO.len()]));
        let y = f.y + i as f64 * fh * 0.08;
        c.stroke_line(f.x - fw * 0.3, y, f.x + fw * 0.3, y);
    }
    c.set_line_width(6.0);
    for (side, cheek) in [(-1.0, lc), (1.0, rc)] {
        for i in 0..4 {
            c.set_stroke(hex(CAMO[i % CAMO.len()]));
            let x = cheek.x + side * fw * 0.15;
            let y = cheek.y - fh * 0.1 + i as f64 * fh * 0.06;
            c.stroke_line(x, y, x - side * fw * 0.2, y + fh * 0.08);
        }
    }
    c.set_stroke(hex(CAMO[2]));
    c.set_line_width(4.0);
    c.stroke_line(nose.x, nose.y - fh * 0.05, nose.x, nose.y + fh * 0.1);

    for i in 0..8 {
        let x = f.x + (scene.random() - 0.5) * fw * 0.8;
        let y = f.y + (scene.random() - 0.2) * fh * 0.6;
        let r = 3.0 + scene.random() * 5.0;
        scene.canvas.set_fill(hex(CAMO[i % CAMO.len()]));
        scene.canvas.fill_circle(x, y, r);
    }

    let c = &mut *scene.canvas;
    dog_tags(c, chin, fw);
    collar(c, chin, fw, fh);
    chevrons(c, chin, fw);
    vest(c, chin, fw);
}

fn plate(c: &mut Canvas, x: f64, y: f64, w: f64, h: f64) {
    c.begin_path();
    c.rect(x, y, w, h);
    c.fill();
    c.stroke();
}

fn disc(c: &mut Canvas, x: f64, y: f64, r: f64) {
    c.begin_path();
    c.arc(x, y, r, 0.0, TAU, false);
    c.fill();
    c.stroke();
}

fn dog_tags(c: &mut Canvas, chin: Point, fw: f64) {
    let neck = Point::new(chin.x, chin.y + fw * 0.3);
    c.set_stroke(hex(0xC0C0C0));
    c.set_line_width(3.0);
    c.begin_path();
    c.move_to(neck.x - fw * 0.1, neck.y - fw * 0.2);
    c.quad_to(neck.x, neck.y - fw * 0.15, neck.x + fw * 0.1, neck.y - fw * 0.2);
    c.stroke();

    c.set_fill(hex(0xC0C0C0));
    c.set_stroke(hex(0xA0A0A0));
    c.set_line_width(1.0);
    plate(c, neck.x - fw * 0.04, neck.y - fw * 0.05, fw * 0.08, fw * 0.12);
    plate(c, neck.x - fw * 0.02, neck.y + fw * 0.02, fw * 0.08, fw * 0.12);

    let size = (fw * 0.02).floor();
    if size >= 1.0 {
        c.set_fill(hex(0x000000));
        c.set_font_size(size);
        c.set_text_align(TextAlign::Center);
        c.fill_text("SOLDIER", neck.x, neck.y);
        c.fill_text("US ARMY", neck.x + fw * 0.02, neck.y + fw * 0.08);
    }
}

fn collar(c: &mut Canvas, chin: Point, fw: f64, fh: f64) {
    let neck = Point::new(chin.x, chin.y + fh * 0.3);
    c.set_fill(hex(0x4F5D2F));
    c.set_stroke(hex(0x3C4A25));
    c.set_line_width(2.0);
    for side in [-1.0, 1.0] {
        c.begin_path();
        c.move_to(neck.x + side * fw * 0.3, neck.y + fh * 0.1);
        c.line_to(neck.x + side * fw * 0.15, neck.y - fh * 0.05);
        c.line_to(neck.x + side * fw * 0.05, neck.y + fh * 0.05);
        c.line_to(neck.x + side * fw * 0.25, neck.y + fh * 0.2);
        c.close_path();
        c.fill();
        c.stroke();
    }
}

fn chevrons(c: &mut Canvas, chin: Point, fw: f64) {
    let shoulder = Point::new(chin.x - fw * 0.25, chin.y + fw * 0.4);
    c.set_fill(hex(0xFFD700));
    c.set_stroke(hex(0xB8860B));
    c.set_line_width(1.0);
    for i in 0..3 {
        let y = shoulder.y - fw * 0.05 + i as f64 * fw * 0.04;
        let x = shoulder.x;
        c.begin_path();
        c.move_to(x - fw * 0.06, y);
        c.line_to(x, y - fw * 0.02);
        c.line_to(x + fw * 0.06, y);
        c.line_to(x + fw * 0.04, y + fw * 0.015);
        c.line_to(x, y - fw * 0.005);
        c.line_to(x - fw * 0.04, y + fw * 0.015);
        c.close_path();
        c.fill();
        c.stroke();
    }
}

fn vest(c: &mut Canvas, chin: Point, fw: f64) {
    let chest = Point::new(chin.x, chin.y + fw * 0.5);
    c.set_stroke(hex(0x2F2F2F));
    c.set_line_width(4.0);
    c.stroke_rect(chest.x - fw * 0.3, chest.y, fw * 0.6, fw * 0.4);

    c.set_fill(hex(0x2F2F2F));
    c.set_stroke(hex(0x1C1C1C));
    c.set_line_width(1.0);
    for dx in [-0.25, -0.04, 0.17] {
        plate(c, chest.x + fw * dx, chest.y + fw * 0.05, fw * 0.08, fw * 0.12);
    }

    // Shoulder radio
    let radio = Point::new(chin.x + fw * 0.25, chin.y + fw * 0.35);
    c.set_fill(hex(0x1C1C1C));
    plate(c, radio.x, radio.y, fw * 0.06, fw * 0.1);
    c.set_stroke(hex(0xC0C0C0));
    c.set_line_width(2.0);
    c.stroke_line(radio.x + fw * 0.03, radio.y, radio.x + fw * 0.03, radio.y - fw * 0.08);
}

pub(super) fn medieval_knight(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let fw = face.eye_distance() * 2.0;
    let fh = face.face_height();
    let chin = face.point(mesh::CHIN);

    knight_helmet(c, &face, fw, fh);
    chain_mail(c, chin, fw, fh);
    breastplate(c, chin, fw);
    sword(c, chin, fw);
    shield(c, chin, fw);
    cape(c, chin, fw, fh);
}

fn knight_helmet(c: &mut Canvas, face: &Face<'_>, fw: f64, fh: f64) {
    let f = face.point(mesh::FOREHEAD);
    let le = face.point(mesh::LEFT_EYE);
    let re = face.point(mesh::RIGHT_EYE);
    let nose = face.point(mesh::NOSE_TIP);

    c.set_fill(hex(0xC0C0C0));
    c.set_stroke(hex(0x808080));
    c.set_line_width(3.0);
    c.begin_path();
    c.arc(f.x, f.y - fh * 0.25, fw * 0.7, 0.15 * PI, 0.85 * PI, false);
    c.close_path();
    c.fill();
    c.stroke();

    c.set_fill(hex(0xA9A9A9));
    plate(c, nose.x - fw * 0.03, f.y - fh * 0.1, fw * 0.06, fh * 0.4);
    for (side, eye) in [(-1.0, le), (1.0, re)] {
        c.begin_path();
        c.move_to(eye.x + side * fw * 0.2, f.y);
        c.line_to(eye.x + side * fw * 0.25, f.y + fh * 0.3);
        c.line_to(eye.x + side * fw * 0.1, f.y + fh * 0.35);
        c.line_to(eye.x + side * fw * 0.05, f.y + fh * 0.1);
        c.close_path();
        c.fill();
        c.stroke();
    }

    // Plume
    c.set_fill(hex(0xDC143C));
    c.set_stroke(hex(0x8B0000));
    c.set_line_width(2.0);
    for i in 0..5 {
        let i = i as f64;
        let height = fh * 0.6 + i.sin() * 20.0;
        c.begin_path();
        c.ellipse(f.x + (i - 2.0) * fw * 0.08, f.y - fh * 0.4, fw * 0.02, height * 0.5, 0.0, 0.0, TAU, false);
        c.fill();
        c.stroke();
    }

    c.set_fill(hex(0x000000));
    c.fill_rect(le.x - fw * 0.08, le.y - fh * 0.03, fw * 0.1, fh * 0.02);
    c.fill_rect(re.x - fw * 0.02, re.y - fh * 0.03, fw * 0.1, fh * 0.02);
    for i in 0..4 {
        c.fill_circle(nose.x + (i as f64 - 1.5) * fw * 0.02, nose.y + fh * 0.1, 2.0);
    }
}

/// Rings on a staggered grid; odd rows (by absolute y) shift half a pitch.
fn ring_grid(c: &mut Canvas, x0: f64, x1: f64, y0: f64, y1: f64, pitch: f64, radius: f64) {
    let mut y = y0;
    while y < y1 {
        let stagger = if (y / pitch).floor() as i64 % 2 == 0 { 0.0 } else { pitch * 0.5 };
        let mut x = x0;
        while x < x1 {
            c.stroke_circle(x + stagger, y, radius);
            x += pitch;
        }
        y += pitch;
    }
}

fn chain_mail(c: &mut Canvas, chin: Point, fw: f64, fh: f64) {
    c.set_stroke(hex(0x2F2F2F));
    c.set_line_width(1.0);

    let neck = Point::new(chin.x, chin.y + fh * 0.2);
    ring_grid(c, neck.x - fw * 0.4, neck.x + fw * 0.4, neck.y, neck.y + fh * 0.6, 8.0, 3.0);

    let y = chin.y + fh * 0.5;
    let left = chin.x - fw * 0.3;
    let right = chin.x + fw * 0.3;
    ring_grid(c, left - fw * 0.15, left + fw * 0.1, y, y + fh * 0.3, 6.0, 2.0);
    ring_grid(c, right - fw * 0.1, right + fw * 0.15, y, y + fh * 0.3, 6.0, 2.0);
}

fn breastplate(c: &mut Canvas, chin: Point, fw: f64) {
    let chest = Point::new(chin.x, chin.y + fw * 0.6);
    c.set_fill(hex(0xC0C0C0));
    c.set_stroke(hex(0x808080));
    c.set_line_width(3.0);
    c.begin_path();
    c.move_to(chest.x - fw * 0.25, chest.y);
    c.line_to(chest.x - fw * 0.3, chest.y + fw * 0.4);
    c.quad_to(chest.x, chest.y + fw * 0.5, chest.x + fw * 0.3, chest.y + fw * 0.4);
    c.line_to(chest.x + fw * 0.25, chest.y);
    c.close_path();
    c.fill();
    c.stroke();

    c.set_stroke(hex(0xA9A9A9));
    c.set_line_width(2.0);
    for i in 0..4 {
        let y = chest.y + fw * 0.1 + i as f64 * fw * 0.08;
        c.begin_path();
        c.move_to(chest.x - fw * 0.2, y);
        c.quad_to(chest.x, y + fw * 0.02, chest.x + fw * 0.2, y);
        c.stroke();
    }

    c.set_fill(hex(0x2F2F2F));
    for i in 0..6 {
        c.fill_circle(chest.x + (i as f64 - 2.5) * fw * 0.1, chest.y + fw * 0.1, 3.0);
    }

    // Pauldrons
    c.set_fill(hex(0xC0C0C0));
    c.set_stroke(hex(0x808080));
    c.set_line_width(2.0);
    for side in [-1.0, 1.0] {
        c.begin_path();
        c.arc(chest.x + side * fw * 0.25, chest.y + fw * 0.05, fw * 0.12, 0.0, PI, false);
        c.fill();
        c.stroke();
    }
}

fn sword(c: &mut Canvas, chin: Point, fw: f64) {
    let at = Point::new(chin.x + fw * 0.4, chin.y + fw * 0.3);
    c.set_fill(hex(0x8B4513));
    c.set_stroke(hex(0x654321));
    c.set_line_width(2.0);
    plate(c, at.x, at.y, fw * 0.04, fw * 0.2);

    c.set_fill(hex(0xC0C0C0));
    c.set_stroke(hex(0x808080));
    plate(c, at.x - fw * 0.06, at.y - fw * 0.02, fw * 0.16, fw * 0.04);

    c.set_fill(hex(0xE6E6FA));
    c.set_stroke(hex(0xC0C0C0));
    c.begin_path();
    c.move_to(at.x + fw * 0.02, at.y - fw * 0.02);
    c.line_to(at.x + fw * 0.015, at.y - fw * 0.25);
    c.line_to(at.x + fw * 0.025, at.y - fw * 0.25);
    c.line_to(at.x + fw * 0.02, at.y - fw * 0.02);
    c.fill();
    c.stroke();

    c.set_fill(hex(0xFFD700));
    c.set_stroke(hex(0xB8860B));
    disc(c, at.x + fw * 0.02, at.y + fw * 0.2, fw * 0.03);
}

fn shield(c: &mut Canvas, chin: Point, fw: f64) {
    let at = Point::new(chin.x - fw * 0.4, chin.y + fw * 0.2);
    c.set_fill(hex(0x8B0000));
    c.set_stroke(hex(0x654321));
    c.set_line_width(3.0);
    c.begin_path();
    c.move_to(at.x, at.y);
    c.line_to(at.x - fw * 0.1, at.y + fw * 0.05);
    c.line_to(at.x - fw * 0.12, at.y + fw * 0.2);
    c.line_to(at.x - fw * 0.06, at.y + fw * 0.3);
    c.line_to(at.x, at.y + fw * 0.25);
    c.line_to(at.x + fw * 0.02, at.y + fw * 0.15);
    c.close_path();
    c.fill();
    c.stroke();

    // Cross
    c.set_fill(hex(0xFFD700));
    c.set_stroke(hex(0xB8860B));
    c.set_line_width(1.0);
    plate(c, at.x - fw * 0.07, at.y + fw * 0.08, fw * 0.02, fw * 0.12);
    plate(c, at.x - fw * 0.1, at.y + fw * 0.13, fw * 0.08, fw * 0.02);

    c.set_fill(hex(0xC0C0C0));
    c.set_stroke(hex(0x808080));
    disc(c, at.x - fw * 0.06, at.y + fw * 0.14, fw * 0.015);
}

fn cape(c: &mut Canvas, chin: Point, fw: f64, fh: f64) {
    let neck = Point::new(chin.x, chin.y + fh * 0.3);
    c.set_fill(hex(0x4B0082));
    c.set_stroke(hex(0x2F1B69));
    c.set_line_width(2.0);
    c.begin_path();
    c.move_to(neck.x - fw * 0.2, neck.y);
    c.quad_to(neck.x - fw * 0.6, neck.y + fh * 0.3, neck.x - fw * 0.4, neck.y + fh * 0.8);
    c.quad_to(neck.x, neck.y + fh * 0.9, neck.x + fw * 0.4, neck.y + fh * 0.8);
    c.quad_to(neck.x + fw * 0.6, neck.y + fh * 0.3, neck.x + fw * 0.2, neck.y);
    c.close_path();
    c.fill();
    c.stroke();

    c.set_fill(hex(0xFFD700));
    c.set_stroke(hex(0xB8860B));
    c.set_line_width(1.0);
    disc(c, neck.x, neck.y, fw * 0.02);

    c.set_stroke(hex(0xFFD700));
    c.set_line_width(2.0);
    c.begin_path();
    c.move_to(neck.x - fw * 0.15, neck.y + fh * 0.1);
    c.quad_to(neck.x, neck.y + fh * 0.05, neck.x + fw * 0.15, neck.y + fh * 0.1);
    c.stroke();
}

/// White greasepaint, tear lines, a striped shirt and a dashed invisible box.
pub(super) fn mime(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let f = face.point(mesh::FOREHEAD);
    let lc = face.point(mesh::LEFT_CHEEK);
    let rc = face.point(mesh::RIGHT_CHEEK);
    let fw = face.eye_distance() * 2.0;

    c.set_fill(rgba(255, 255, 255, 0.9));
    c.fill_ellipse(f.x, f.y + fw * 0.1, fw * 0.5, fw * 0.6, 0.0);

    c.set_stroke(hex(0x000000));
    c.set_line_width(4.0);
    c.begin_path();
    for cheek in [lc, rc] {
        c.move_to(cheek.x, cheek.y - fw * 0.1);
        c.line_to(cheek.x, cheek.y + fw * 0.2);
    }
    c.stroke();

    for i in 0..8 {
        c.set_fill(hex(if i % 2 == 0 { 0x000000 } else { 0xFFFFFF }));
        let y = f.y + fw * 0.5 + i as f64 * fw * 0.08;
        c.fill_rect(f.x - fw * 0.4, y, fw * 0.8, fw * 0.08);
    }

    c.set_stroke(rgba(255, 255, 255, 0.6));
    c.set_line_width(3.0);
    c.set_line_dash(&[10.0, 5.0]);
    c.stroke_rect(f.x - fw * 0.6, f.y - fw * 0.3, fw * 1.2, fw * 0.8);
    c.set_line_dash(&[]);
}

pub(super) fn magician(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let f = face.point(mesh::FOREHEAD);
    let fw = face.eye_distance() * 2.0;
    let t = scene.time.phase(0.008);

    // Top hat
    c.set_fill(hex(0x000000));
    c.set_stroke(hex(0x333333));
    c.set_line_width(3.0);
    plate(c, f.x - fw * 0.25, f.y - fw * 0.6, fw * 0.5, fw * 0.4);
    c.begin_path();
    c.ellipse(f.x, f.y - fw * 0.2, fw * 0.35, fw * 0.1, 0.0, 0.0, TAU, false);
    c.fill();
    c.stroke();

    // Wand with a pentagonal tip
    c.set_stroke(hex(0x8B4513));
    c.set_line_width(6.0);
    c.stroke_line(f.x + fw * 0.4, f.y, f.x + fw * 0.6, f.y - fw * 0.2);
    let tip = Point::new(f.x + fw * 0.6, f.y - fw * 0.2);
    c.set_fill(hex(0xFFD700));
    c.set_stroke(hex(0xFFA500));
    c.set_line_width(2.0);
    c.begin_path();
    for i in 0..5 {
        let a = i as f64 * TAU / 5.0;
        c.line_to(tip.x + a.cos() * 10.0, tip.y + a.sin() * 10.0);
    }
    c.close_path();
    c.fill();
    c.stroke();

    for i in 0..15 {
        let i = i as f64;
        c.set_fill(hsl(t * 200.0 + i * 24.0, 100.0, 50.0));
        c.fill_circle(
            f.x + (t + i).sin() * fw * 0.8,
            f.y + (t * 1.5 + i).cos() * fw * 0.6,
            3.0 + (t * 10.0 + i).sin() * 2.0,
        );
    }

    if (t * 4.0).sin() > 0.5 {
        rabbit(c, f.x - fw * 0.15, f.y - fw * 0.4, fw * 0.1);
    }
}

/// Rabbit head peeking out of the hat, `size` tall, baseline at `y`.
fn rabbit(c: &mut Canvas, x: f64, y: f64, size: f64) {
    let cx = x + size * 0.5;
    c.set_fill(hex(0xFFFFFF));
    c.fill_ellipse(cx, y - size * 0.3, size * 0.35, size * 0.3, 0.0);
    c.fill_ellipse(cx - size * 0.15, y - size * 0.8, size * 0.08, size * 0.3, -0.15);
    c.fill_ellipse(cx + size * 0.15, y - size * 0.8, size * 0.08, size * 0.3, 0.15);
    c.set_fill(hex(0xFFB6C1));
    c.fill_ellipse(cx - size * 0.15, y - size * 0.8, size * 0.04, size * 0.2, -0.15);
    c.fill_ellipse(cx + size * 0.15, y - size * 0.8, size * 0.04, size * 0.2, 0.15);
    c.set_fill(hex(0x000000));
    c.fill_circle(cx - size * 0.12, y - size * 0.35, size * 0.04);
    c.fill_circle(cx + size * 0.12, y - size * 0.35, size * 0.04);
}

pub(super) fn rockstar(scene: &mut Scene<'_>) {
    const CHEERS: [&str; 3] = ["ROCK!", "YEAH!", "WOOOH!"];

    let face = scene.face;
    let c = &mut *scene.canvas;
    let f = face.point(mesh::FOREHEAD);
    let fw = face.eye_distance() * 2.0;
    let t = scene.time.phase(0.01);

    // Spiky hair
    c.set_stroke(hex(0x000000));
    c.set_line_width(8.0);
    c.set_line_cap(LineCap::Round);
    for i in 0..20 {
        let a = i as f64 * PI / 10.0;
        let len = fw * 0.4 + (t * 3.0 + i as f64).sin() * 20.0;
        let x = f.x + a.cos() * fw * 0.3;
        let y = f.y - fw * 0.2;
        c.stroke_line(x, y, x + a.cos() * len, y + a.sin() * len);
    }

    // Leather jacket
    c.set_fill(hex(0x000000));
    c.set_stroke(hex(0x333333));
    c.set_line_width(3.0);
    plate(c, f.x - fw * 0.4, f.y + fw * 0.3, fw * 0.8, fw * 0.5);

    let guitar = Point::new(f.x - fw * 0.6, f.y + fw * 0.2);
    c.set_fill(hex(0x8B4513));
    c.set_stroke(hex(0x654321));
    c.set_line_width(2.0);
    c.begin_path();
    c.ellipse(guitar.x, guitar.y, fw * 0.15, fw * 0.25, 0.0, 0.0, TAU, false);
    c.fill();
    c.stroke();
    c.set_stroke(hex(0xC0C0C0));
    c.set_line_width(1.0);
    for i in 0..6 {
        let y = guitar.y - fw * 0.2 + i as f64 * fw * 0.067;
        c.stroke_line(guitar.x - fw * 0.1, y, guitar.x + fw * 0.1, y);
    }

    // Stage lights orbiting the head
    for i in 0..8 {
        let i = i as f64;
        let a = t * 2.0 + i * PI / 4.0;
        c.set_fill(hsl(t * 100.0 + i * 45.0, 100.0, 50.0));
        c.fill_circle(f.x + a.cos() * fw * 0.8, f.y + a.sin() * fw * 0.4, 10.0);
    }

    c.set_font_size(fw * 0.05);
    c.set_fill(hex(0xFFD700));
    c.set_text_align(TextAlign::Center);
    for (i, cheer) in CHEERS.iter().enumerate() {
        let i = i as f64;
        c.fill_text(
            cheer,
            f.x + (t + i * 2.0).sin() * fw * 0.8,
            f.y + fw * 0.8 + (t * 2.0 + i).cos() * 20.0,
        );
    }
}

#[derive(Debug, Clone, Copy)]
enum Ingredient {
    Tomato,
    Onion,
    Carrot,
    Chili,
    Baguette,
}

impl Ingredient {
    const ALL: [Ingredient; 5] = [
        Ingredient::Tomato,
        Ingredient::Onion,
        Ingredient::Carrot,
        Ingredient::Chili,
        Ingredient::Baguette,
    ];

    /// Draw centred on `(x, y)` within a box `size` across.
    fn draw(self, c: &mut Canvas, x: f64, y: f64, size: f64) {
        let r = size * 0.5;
        match self {
            Ingredient::Tomato => {
                c.set_fill(hex(0xE53935));
                c.fill_circle(x, y, r);
                c.set_fill(hex(0x2E7D32));
                c.fill_ellipse(x, y - r * 0.85, r * 0.45, r * 0.18, 0.0);
            }
            Ingredient::Onion => {
                c.set_fill(hex(0xD8A7C8));
                c.begin_path();
                c.move_to(x, y - r * 1.1);
                c.quad_to(x + r * 1.2, y - r * 0.2, x, y + r);
                c.quad_to(x - r * 1.2, y - r * 0.2, x, y - r * 1.1);
                c.fill();
            }
            Ingredient::Carrot => {
                c.set_fill(hex(0xFB8C00));
                c.fill_polygon(&[(x - r * 0.35, y - r * 0.7), (x + r * 0.35, y - r * 0.7), (x, y + r)]);
                c.set_fill(hex(0x43A047));
                c.fill_ellipse(x, y - r * 0.9, r * 0.12, r * 0.3, 0.0);
            }
            Ingredient::Chili => {
                c.set_fill(hex(0xC62828));
                c.fill_ellipse(x, y, r, r * 0.3, 0.6);
            }
            Ingredient::Baguette => {
                c.set_fill(hex(0xD4A056));
                c.fill_ellipse(x, y, r * 1.1, r * 0.3, -0.5);
            }
        }
    }
}

pub(super) fn chef(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let f = face.point(mesh::FOREHEAD);
    let fw = face.eye_distance() * 2.0;
    let t = scene.time.phase(0.005);

    // Toque and band
    c.set_fill(hex(0xFFFFFF));
    c.set_stroke(hex(0xCCCCCC));
    c.set_line_width(2.0);
    c.begin_path();
    c.ellipse(f.x, f.y - fw * 0.4, fw * 0.4, fw * 0.3, 0.0, 0.0, TAU, false);
    c.fill();
    c.stroke();
    c.set_fill(hex(0x000000));
    c.fill_rect(f.x - fw * 0.3, f.y - fw * 0.15, fw * 0.6, fw * 0.08);

    let nose_y = face.point(mesh::NOSE_BOTTOM).y;
    c.set_fill(hex(0x8B4513));
    c.set_stroke(hex(0x654321));
    c.set_line_width(2.0);
    c.begin_path();
    c.ellipse(f.x, nose_y + fw * 0.1, fw * 0.2, fw * 0.05, 0.0, 0.0, TAU, false);
    c.fill();
    c.stroke();

    for (i, ingredient) in Ingredient::ALL.into_iter().enumerate() {
        let i = i as f64;
        ingredient.draw(
            c,
            f.x + (t * 2.0 + i * 1.2).sin() * fw * 0.8,
            f.y + (t * 3.0 + i * 0.8).cos() * fw * 0.6,
            fw * 0.08,
        );
    }

    // Spatula
    let spatula = Point::new(f.x + fw * 0.5, f.y + fw * 0.2);
    c.set_stroke(hex(0xC0C0C0));
    c.set_line_width(4.0);
    c.set_line_cap(LineCap::Round);
    c.stroke_line(spatula.x, spatula.y, spatula.x, spatula.y + fw * 0.3);
    c.set_fill(hex(0xC0C0C0));
    c.fill_rect(spatula.x - 10.0, spatula.y - 20.0, 20.0, 15.0);

    c.set_stroke(hex(0xDDDDDD));
    c.set_line_width(3.0);
    for i in 0..6 {
        let i = i as f64;
        let x = f.x + (i - 2.5) * fw * 0.1;
        let y = f.y + fw * 0.6;
        c.begin_path();
        c.move_to(x, y);
        c.quad_to(x + (t * 4.0 + i).sin() * 10.0, y - fw * 0.2, x + (t * 2.0 + i).sin() * 20.0, y - fw * 0.4);
        c.stroke();
    }

    c.set_font_size(fw * 0.06);
    c.set_fill(hex(0xFF6347));
    c.set_text_align(TextAlign::Center);
    c.fill_text("BON APPÉTIT!", f.x, f.y + fw * 0.8);
}

#[cfg(test)]
mod tests {
    use crate::filters::test_support::{grey_frame, render_still};

    #[test]
    fn test_mime_box_leaves_dash_gaps() {
        let out = render_still("mime", 0.0, 0);
        let raw = grey_frame();
        // Left edge of the box sits at x = 80 - 46.08, clear of the greasepaint.
        let x = 34;
        let column: Vec<bool> = (10..62).map(|y| out.get_pixel(x, y) == raw.get_pixel(x, y)).collect();
        assert!(column.iter().any(|same| *same));
        assert!(column.iter().any(|same| !*same));
    }

    #[test]
    fn test_army_camo_follows_seed() {
        assert_eq!(render_still("army", 0.0, 5), render_still("army", 0.0, 5));
        assert_ne!(render_still("army", 0.0, 5), render_still("army", 0.0, 6));
    }

    #[test]
    fn test_chef_ingredients_move() {
        assert_ne!(render_still("chef", 0.0, 0), render_still("chef", 900.0, 0));
    }

    #[test]
    fn test_knight_draws_indigo_cape() {
        let out = render_still("medieval", 0.0, 0);
        let indigo = out.pixels().filter(|p| p.0 == [0x4B, 0x00, 0x82, 255]).count();
        assert!(indigo > 0);
    }
}
