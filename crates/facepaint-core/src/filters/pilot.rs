//! Cockpit scene: the frame is replaced by sky except for an oval around
//! the face, then flight gear and a HUD are drawn on top.

use std::f64::consts::{FRAC_PI_6, PI, TAU};

use image::RgbaImage;
use kurbo::Point;

use crate::canvas::{hex, rgba, Brush, Canvas, Composite, LineCap};
use crate::landmarks::{mesh, Face};
use crate::scene::Scene;

pub(super) fn pilot(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let secs = scene.time.phase(0.001);

    sky(c, secs);

    let eye_distance = face.eye_distance();
    let width = eye_distance * 2.2;
    let height = face.face_height() * 1.3;
    face_cutout(c, scene.frame, face.center(), width, height);

    cockpit_frame(c, secs);
    helmet(c, &face, width * 0.8, height * 0.8);
    goggles(c, &face, eye_distance);
    oxygen_mask(c, &face, width * 0.8);
    hud(c, scene.time.phase(0.002));
}

fn sky(c: &mut Canvas, secs: f64) {
    let (w, h) = (c.width() as f64, c.height() as f64);
    c.with_saved(|c| {
        c.set_fill(
            Brush::linear(0.0, 0.0, 0.0, h)
                .stop(0.0, hex(0x87CEEB))
                .stop(0.3, hex(0xB0E0E6))
                .stop(0.7, hex(0xE0F6FF))
                .stop(1.0, hex(0xF0F8FF)),
        );
        c.fill_rect(0.0, 0.0, w, h);

        // Three parallax cloud layers
        for layer in 0..3 {
            let l = layer as f64;
            let speed = (l + 1.0) * 10.0;
            let scale = 1.0 + l * 0.3;
            c.set_fill(rgba(255, 255, 255, 0.9 - l * 0.2));
            for i in 0..6 + layer * 2 {
                let i = i as f64;
                let x = (w * 0.15 * i + secs * speed + i * 80.0).rem_euclid(w + 300.0) - 150.0;
                let y = h * (0.1 + l * 0.15) + (secs + i + l).sin() * 30.0;
                for j in 0..6 {
                    let j = j as f64;
                    let r = (12.0 + j * 4.0 + (secs * 2.0 + i + j + l).sin() * 3.0) * scale;
                    c.fill_circle(x + j * 10.0 * scale - 25.0, y + (j + secs + l).sin() * 5.0, r);
                }
            }
        }

        c.set_stroke(rgba(50, 50, 50, 0.6));
        c.set_line_width(2.0);
        c.set_line_cap(LineCap::Round);
        for i in 0..4 {
            let i = i as f64;
            let x = (w * 0.25 * i + secs * 25.0 + i * 150.0).rem_euclid(w + 200.0) - 100.0;
            let y = h * 0.2 + (secs * 3.0 + i).sin() * 40.0;
            c.begin_path();
            c.move_to(x - 8.0, y);
            c.quad_to(x - 4.0, y - 4.0, x, y);
            c.quad_to(x + 4.0, y - 4.0, x + 8.0, y);
            c.stroke();
        }
    });
}

/// Punch an oval out of the sky and refill it with the raw frame.
fn face_cutout(c: &mut Canvas, frame: &RgbaImage, center: Point, width: f64, height: f64) {
    let (rx, ry) = (width * 0.5, height * 0.45);
    c.with_saved(|c| {
        c.set_composite(Composite::DestinationOut);
        c.fill_ellipse(center.x, center.y, rx, ry, 0.0);
        c.set_composite(Composite::SourceOver);

        c.with_saved(|c| {
            c.begin_path();
            c.ellipse(center.x, center.y, rx, ry, 0.0, 0.0, TAU, false);
            c.clip();
            c.draw_image(frame);
        });

        c.set_stroke(rgba(255, 255, 255, 0.3));
        c.set_line_width(2.0);
        c.begin_path();
        c.ellipse(center.x, center.y, rx, ry, 0.0, 0.0, TAU, false);
        c.stroke();
    });
}

fn cockpit_frame(c: &mut Canvas, secs: f64) {
    let (w, h) = (c.width() as f64, c.height() as f64);
    c.with_saved(|c| {
        c.set_fill(rgba(0, 0, 0, 0.9));
        c.fill_rect(0.0, 0.0, w, 30.0);
        c.fill_rect(0.0, 0.0, 40.0, h);
        c.fill_rect(w - 40.0, 0.0, 40.0, h);
        c.fill_rect(0.0, h - 30.0, w, 30.0);

        c.set_stroke(hex(0x888888));
        c.set_line_width(1.0);
        for i in 0..5 {
            let x = w / 6.0 * (i + 1) as f64;
            c.stroke_line(x, 5.0, x, 25.0);
        }

        // Rivets
        c.set_fill(hex(0x666666));
        for i in 0..8 {
            let y = h / 9.0 * (i + 1) as f64;
            c.fill_circle(20.0, y, 2.0);
            c.fill_circle(w - 20.0, y, 2.0);
        }

        c.set_fill(
            Brush::linear(0.0, 30.0, 0.0, h * 0.3)
                .stop(0.0, rgba(135, 206, 235, 0.1))
                .stop(1.0, rgba(135, 206, 235, 0.0)),
        );
        c.fill_rect(40.0, 30.0, w - 80.0, h * 0.2);

        c.set_fill(rgba(255, 255, 255, 0.15));
        for i in 0..3 {
            let i = i as f64;
            let x = (w * 0.3 * i + secs * 15.0 + i * 100.0).rem_euclid(w + 100.0) - 50.0;
            let y = 50.0 + (secs + i).sin() * 10.0;
            for j in 0..3 {
                let j = j as f64;
                c.fill_circle(x + j * 8.0 - 8.0, y, 8.0 + j * 3.0);
            }
        }
    });
}

fn helmet(c: &mut Canvas, face: &Face<'_>, width: f64, height: f64) {
    let f = face.point(mesh::FOREHEAD);
    let lt = face.point(mesh::LEFT_TEMPLE);
    let rt = face.point(mesh::RIGHT_TEMPLE);

    c.set_fill(hex(0x2F4F4F));
    c.set_stroke(hex(0x1C1C1C));
    c.set_line_width(2.0);
    c.begin_path();
    c.arc(f.x, f.y - height * 0.3, width * 0.65, 0.2 * PI, 0.8 * PI, false);
    c.close_path();
    c.fill();
    c.stroke();

    // Peak
    c.set_fill(hex(0x1C1C1C));
    c.begin_path();
    c.ellipse(f.x, f.y - height * 0.05, width * 0.4, height * 0.08, 0.0, 0.0, PI, false);
    c.fill();
    c.stroke();

    c.set_fill(hex(0x708090));
    for i in 0..6 {
        let a = i as f64 * PI / 3.0 + FRAC_PI_6;
        c.fill_circle(
            f.x + a.cos() * width * 0.5,
            f.y - height * 0.3 + a.sin() * height * 0.25,
            3.0,
        );
    }

    c.set_stroke(hex(0x654321));
    c.set_line_width(4.0);
    c.begin_path();
    c.move_to(lt.x - width * 0.1, lt.y + height * 0.3);
    c.quad_to(f.x, lt.y + height * 0.5, rt.x + width * 0.1, rt.y + height * 0.3);
    c.stroke();
}

fn goggles(c: &mut Canvas, face: &Face<'_>, eye_distance: f64) {
    let le = face.point(mesh::LEFT_EYE);
    let re = face.point(mesh::RIGHT_EYE);
    let size = eye_distance * 0.8;

    c.set_fill(hex(0x8B4513));
    c.set_stroke(hex(0x654321));
    c.set_line_width(3.0);
    for eye in [le, re] {
        c.begin_path();
        c.arc(eye.x, eye.y, size * 0.6, 0.0, TAU, false);
        c.fill();
        c.stroke();
    }

    c.set_fill(rgba(70, 130, 180, 0.8));
    for eye in [le, re] {
        c.fill_circle(eye.x, eye.y, size * 0.45);
    }
    c.set_fill(rgba(255, 255, 255, 0.6));
    for eye in [le, re] {
        c.fill_circle(eye.x - size * 0.15, eye.y - size * 0.15, size * 0.15);
    }

    // Bridge
    c.set_fill(hex(0x8B4513));
    c.set_line_width(2.0);
    c.begin_path();
    c.rect(le.x + size * 0.45, le.y - size * 0.1, re.x - le.x - size * 0.9, size * 0.2);
    c.fill();
    c.stroke();

    c.set_line_width(8.0);
    c.set_line_cap(LineCap::Round);
    c.stroke_line(le.x - size * 0.6, le.y, le.x - size * 1.2, le.y);
    c.stroke_line(re.x + size * 0.6, re.y, re.x + size * 1.2, re.y);
}

fn oxygen_mask(c: &mut Canvas, face: &Face<'_>, width: f64) {
    let nose = face.point(mesh::NOSE_TIP);
    let lip = face.point(mesh::UPPER_LIP);
    let lm = face.point(mesh::LEFT_MOUTH);
    let rm = face.point(mesh::RIGHT_MOUTH);
    let mask_w = (rm.x - lm.x).abs() * 1.4;
    let mask_h = (lip.y - nose.y).abs() * 1.8;

    c.set_fill(hex(0x696969));
    c.set_stroke(hex(0x2F2F2F));
    c.set_line_width(2.0);
    c.begin_path();
    c.ellipse(nose.x, nose.y + mask_h * 0.3, mask_w * 0.5, mask_h * 0.4, 0.0, 0.0, TAU, false);
    c.fill();
    c.stroke();

    c.set_fill(hex(0x2F2F2F));
    for i in 0..6 {
        let a = i as f64 * PI / 3.0;
        c.fill_circle(
            nose.x + a.cos() * mask_w * 0.2,
            nose.y + mask_h * 0.3 + a.sin() * mask_h * 0.15,
            2.0,
        );
    }

    // Hose
    c.set_stroke(hex(0x4F4F4F));
    c.set_line_width(6.0);
    c.set_line_cap(LineCap::Round);
    c.begin_path();
    c.move_to(nose.x + mask_w * 0.3, nose.y + mask_h * 0.4);
    c.quad_to(nose.x + mask_w * 0.8, nose.y + mask_h * 0.6, nose.x + mask_w * 1.2, nose.y + mask_h * 0.3);
    c.stroke();

    c.set_stroke(hex(0x654321));
    c.set_line_width(4.0);
    c.stroke_line(lm.x, lip.y, lm.x - width * 0.3, lip.y);
    c.stroke_line(rm.x, lip.y, rm.x + width * 0.3, lip.y);
}

fn hud(c: &mut Canvas, t: f64) {
    let (w, h) = (c.width() as f64, c.height() as f64);
    let green = hex(0x00FF00);

    c.set_stroke(green);
    c.set_fill(green);
    c.set_line_width(2.0);
    c.set_font_size(14.0);

    c.stroke_rect(w - 100.0, 50.0, 80.0, 150.0);
    for (text, y) in [("ALT", 70.0), ("10,000", 90.0), ("FT", 110.0)] {
        c.fill_text(text, w - 95.0, y);
    }
    c.stroke_rect(20.0, 50.0, 80.0, 150.0);
    for (text, y) in [("SPEED", 70.0), ("350", 90.0), ("KNOTS", 110.0)] {
        c.fill_text(text, 25.0, y);
    }

    // Artificial horizon with a gentle bank
    let center = Point::new(w / 2.0, h / 2.0);
    c.with_saved(|c| {
        c.translate(center.x, center.y);
        c.rotate(t.sin() * 0.1);
        c.set_stroke(green);
        c.set_line_width(3.0);
        c.stroke_line(-100.0, 0.0, 100.0, 0.0);

        c.set_stroke(hex(0xFFFF00));
        c.set_line_width(4.0);
        c.begin_path();
        c.move_to(-30.0, 0.0);
        c.line_to(-10.0, 0.0);
        c.move_to(10.0, 0.0);
        c.line_to(30.0, 0.0);
        c.move_to(0.0, -15.0);
        c.line_to(0.0, 15.0);
        c.stroke();
    });

    c.set_stroke(green);
    c.set_fill(green);
    c.set_font_size(16.0);
    c.stroke_rect(center.x - 50.0, 60.0, 100.0, 30.0);
    let heading = (t * 10.0).rem_euclid(360.0).floor() as u32;
    c.fill_text(&format!("HDG {heading:03}°"), center.x - 45.0, 80.0);

    c.set_font_size(12.0);
    for (text, dy) in [("ENG 1: OK", 80.0), ("ENG 2: OK", 65.0), ("FUEL: 75%", 50.0)] {
        c.fill_text(text, w - 100.0, h - dy);
    }

    if (t * 5.0).sin() > 0.5 {
        c.set_fill(hex(0xFF0000));
        c.fill_circle(30.0, h - 40.0, 8.0);
        c.set_font_size(10.0);
        c.fill_text("ALERT", 45.0, h - 36.0);
    }
}

#[cfg(test)]
mod tests {
    use crate::filters::test_support::{grey_frame, render_still};

    #[test]
    fn test_face_oval_shows_raw_video() {
        let raw = grey_frame();
        let out = render_still("pilot", 0.0, 0);
        // Lower cheek inside the cutout, clear of the gear and HUD.
        let (a, b) = (out.get_pixel(62, 84).0, raw.get_pixel(62, 84).0);
        for ch in 0..4 {
            assert!((a[ch] as i32 - b[ch] as i32).abs() <= 2, "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn test_sky_replaces_background() {
        let raw = grey_frame();
        let out = render_still("pilot", 0.0, 0);
        // Inside the top frame bar everything is darkened.
        let p = out.get_pixel(70, 10).0;
        assert_ne!(p, raw.get_pixel(70, 10).0);
        assert!(p[0] < 60 && p[1] < 60 && p[2] < 60);
    }
}
