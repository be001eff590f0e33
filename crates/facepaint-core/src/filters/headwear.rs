//! Hats, helmets and ears sized from the temple span.

use std::f64::consts::{PI, TAU};

use crate::canvas::{hex, LineCap};
use crate::landmarks::mesh;
use crate::scene::Scene;

pub(super) fn dog_ears(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let left = face.point(mesh::LEFT_TEMPLE);
    let right = face.point(mesh::RIGHT_TEMPLE);
    let forehead = face.point(mesh::FOREHEAD);
    let ear = face.temple_width() * 0.4;

    c.set_fill(hex(0x8B4513));
    c.set_stroke(hex(0x654321));
    c.set_line_width(2.0);
    for (x, tilt) in [(left.x - ear * 0.5, -0.3), (right.x + ear * 0.5, 0.3)] {
        c.begin_path();
        c.ellipse(x, forehead.y - ear * 0.3, ear * 0.6, ear * 0.8, tilt, 0.0, TAU, false);
        c.fill();
        c.stroke();
    }

    c.set_fill(hex(0xFFB6C1));
    for (x, tilt) in [(left.x - ear * 0.5, -0.3), (right.x + ear * 0.5, 0.3)] {
        c.fill_ellipse(x, forehead.y - ear * 0.2, ear * 0.3, ear * 0.4, tilt);
    }
}

pub(super) fn crown(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let forehead = face.point(mesh::FOREHEAD);
    let width = face.temple_width() * 1.2;
    let height = width * 0.4;

    c.set_fill(hex(0xFFD700));
    c.set_stroke(hex(0xFFA500));
    c.set_line_width(3.0);

    c.begin_path();
    c.rect(forehead.x - width * 0.5, forehead.y - height * 0.8, width, height * 0.3);
    c.fill();
    c.stroke();

    const SPIKES: usize = 5;
    let pitch = width / SPIKES as f64;
    for i in 0..SPIKES {
        let x = forehead.x - width * 0.5 + pitch * (i as f64 + 0.5);
        let tip = if i % 2 == 0 { height * 0.6 } else { height * 0.4 };
        c.begin_path();
        c.move_to(x - pitch * 0.4, forehead.y - height * 0.5);
        c.line_to(x, forehead.y - tip);
        c.line_to(x + pitch * 0.4, forehead.y - height * 0.5);
        c.close_path();
        c.fill();
        c.stroke();
    }

    c.set_fill(hex(0xFF0000));
    for i in 0..3 {
        let x = forehead.x - width * 0.3 + width * 0.3 * i as f64;
        c.fill_circle(x, forehead.y - height * 0.65, 5.0);
    }
}

pub(super) fn rainbow(scene: &mut Scene<'_>) {
    const BANDS: [u32; 7] = [0xFF0000, 0xFF7F00, 0xFFFF00, 0x00FF00, 0x0000FF, 0x4B0082, 0x9400D3];
    let face = scene.face;
    let c = &mut *scene.canvas;
    let forehead = face.point(mesh::FOREHEAD);
    let width = face.temple_width() * 1.3;
    let height = width * 0.3;

    c.set_line_width(8.0);
    for (i, band) in BANDS.into_iter().enumerate() {
        c.set_stroke(hex(band));
        c.begin_path();
        c.arc(forehead.x, forehead.y + height * 0.5, width * 0.5 - i as f64 * 8.0, PI, 0.0, false);
        c.stroke();
    }
}

/// Cone hat; the six polka dots are scattered with the scene rng.
pub(super) fn party_hat(scene: &mut Scene<'_>) {
    let face = scene.face;
    let forehead = face.point(mesh::FOREHEAD);
    let width = face.temple_width() * 0.8;
    let height = width * 1.2;

    let c = &mut *scene.canvas;
    c.set_fill(hex(0xFF69B4));
    c.set_stroke(hex(0xFF1493));
    c.set_line_width(3.0);
    c.begin_path();
    c.move_to(forehead.x - width * 0.5, forehead.y);
    c.line_to(forehead.x + width * 0.5, forehead.y);
    c.line_to(forehead.x, forehead.y - height);
    c.close_path();
    c.fill();
    c.stroke();

    c.set_fill(hex(0xFFFF00));
    for _ in 0..6 {
        let x = forehead.x - width * 0.3 + scene.random() * width * 0.6;
        let y = forehead.y - scene.random() * height * 0.8;
        scene.canvas.fill_circle(x, y, 4.0);
    }

    let c = &mut *scene.canvas;
    c.set_fill(hex(0xFFD700));
    c.fill_circle(forehead.x, forehead.y - height, 12.0);
}

pub(super) fn cowboy_hat(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let forehead = face.point(mesh::FOREHEAD);
    let width = face.temple_width() * 1.4;
    let height = width * 0.6;
    let brim = width * 1.6;

    c.set_fill(hex(0x8B4513));
    c.set_stroke(hex(0x654321));
    c.set_line_width(2.0);
    c.begin_path();
    c.ellipse(forehead.x, forehead.y - height * 0.2, brim * 0.5, brim * 0.15, 0.0, 0.0, TAU, false);
    c.fill();
    c.stroke();

    c.set_fill(hex(0xA0522D));
    c.begin_path();
    c.ellipse(forehead.x, forehead.y - height * 0.5, width * 0.4, height * 0.4, 0.0, 0.0, TAU, false);
    c.fill();
    c.stroke();

    // Band and buckle
    c.set_fill(hex(0x654321));
    c.fill_rect(forehead.x - width * 0.4, forehead.y - height * 0.3, width * 0.8, height * 0.1);
    c.set_fill(hex(0xFFD700));
    c.fill_rect(forehead.x - width * 0.05, forehead.y - height * 0.28, width * 0.1, height * 0.06);
}

pub(super) fn beret(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let forehead = face.point(mesh::FOREHEAD);
    let width = face.temple_width() * 1.3;
    let height = width * 0.4;

    c.set_fill(hex(0x8B0000));
    c.set_stroke(hex(0x654321));
    c.set_line_width(2.0);
    c.begin_path();
    c.ellipse(forehead.x, forehead.y - height * 0.5, width * 0.6, height * 0.8, 0.0, 0.0, TAU, false);
    c.fill();
    c.stroke();

    c.set_fill(hex(0x654321));
    c.fill_ellipse(forehead.x, forehead.y - height * 0.1, width * 0.45, height * 0.15, 0.0);

    // Stalk on top
    c.set_fill(hex(0x8B0000));
    c.begin_path();
    c.arc(forehead.x + width * 0.2, forehead.y - height * 0.8, 6.0, 0.0, TAU, false);
    c.fill();
    c.stroke();
}

pub(super) fn viking_helmet(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let f = face.point(mesh::FOREHEAD);
    let w = face.temple_width() * 1.2;
    let h = w * 0.8;

    c.set_fill(hex(0xC0C0C0));
    c.set_stroke(hex(0x808080));
    c.set_line_width(3.0);
    c.begin_path();
    c.arc(f.x, f.y - h * 0.3, w * 0.5, 0.0, PI, true);
    c.fill();
    c.stroke();

    // Nose guard
    c.begin_path();
    c.rect(f.x - w * 0.05, f.y - h * 0.2, w * 0.1, h * 0.4);
    c.fill();
    c.stroke();

    c.set_fill(hex(0xF5DEB3));
    c.set_stroke(hex(0xD2B48C));
    c.set_line_width(2.0);
    for side in [-1.0, 1.0] {
        c.begin_path();
        c.move_to(f.x + side * w * 0.35, f.y - h * 0.4);
        c.quad_to(f.x + side * w * 0.5, f.y - h * 0.8, f.x + side * w * 0.4, f.y - h * 1.1);
        c.quad_to(f.x + side * w * 0.3, f.y - h * 0.9, f.x + side * w * 0.25, f.y - h * 0.5);
        c.close_path();
        c.fill();
        c.stroke();
    }
}

/// Tricorn with skull and crossbones, plus a patch over the left eye.
pub(super) fn pirate_hat(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let f = face.point(mesh::FOREHEAD);
    let w = face.temple_width() * 1.1;
    let h = w * 0.8;

    c.set_fill(hex(0x000000));
    c.set_stroke(hex(0x333333));
    c.set_line_width(2.0);
    c.begin_path();
    c.move_to(f.x - w * 0.5, f.y);
    c.quad_to(f.x - w * 0.3, f.y - h * 0.6, f.x, f.y - h * 0.8);
    c.quad_to(f.x + w * 0.3, f.y - h * 0.6, f.x + w * 0.5, f.y);
    c.quad_to(f.x, f.y + h * 0.1, f.x - w * 0.5, f.y);
    c.fill();
    c.stroke();

    c.set_fill(hex(0xFFFFFF));
    c.fill_circle(f.x, f.y - h * 0.4, w * 0.08);
    c.set_fill(hex(0x000000));
    c.fill_circle(f.x - w * 0.03, f.y - h * 0.45, w * 0.015);
    c.fill_circle(f.x + w * 0.03, f.y - h * 0.45, w * 0.015);

    let bone_ends = [
        (f.x - w * 0.06, f.y - h * 0.25),
        (f.x + w * 0.06, f.y - h * 0.35),
        (f.x - w * 0.06, f.y - h * 0.35),
        (f.x + w * 0.06, f.y - h * 0.25),
    ];
    c.set_stroke(hex(0xFFFFFF));
    c.set_line_width(3.0);
    c.set_line_cap(LineCap::Round);
    for pair in bone_ends.chunks(2) {
        c.stroke_line(pair[0].0, pair[0].1, pair[1].0, pair[1].1);
    }
    c.set_fill(hex(0xFFFFFF));
    for (x, y) in bone_ends {
        c.fill_circle(x, y, w * 0.01);
    }

    let eye = face.point(mesh::LEFT_EYE);
    let patch = face.eye_distance() * 0.4;
    c.set_fill(hex(0x000000));
    c.set_stroke(hex(0x333333));
    c.set_line_width(2.0);
    c.begin_path();
    c.ellipse(eye.x, eye.y, patch * 0.8, patch * 0.6, 0.0, 0.0, TAU, false);
    c.fill();
    c.stroke();

    // Strap
    c.set_stroke(hex(0x000000));
    c.set_line_width(8.0);
    for side in [-1.0, 1.0] {
        c.begin_path();
        c.move_to(eye.x + side * patch * 0.8, eye.y);
        c.quad_to(
            eye.x + side * patch * 1.5,
            eye.y - patch * 0.3,
            eye.x + side * patch * 2.0,
            eye.y - patch * 0.1,
        );
        c.stroke();
    }

    c.set_fill(hex(0x333333));
    c.fill_ellipse(eye.x - patch * 0.2, eye.y - patch * 0.2, patch * 0.3, patch * 0.2, 0.0);
}
