//! Scene-wide effects that restyle the whole frame rather than decorate the
//! face: lighting, weather, film stock and themed backdrops.

use std::f64::consts::{PI, TAU};

use crate::canvas::{hex, hsl, hsla, rgba, Brush, LineCap};
use crate::landmarks::mesh;
use crate::scene::Scene;

/// Afro, gold shades, a mirror ball and a ring of coloured lights.
pub(super) fn disco(scene: &mut Scene<'_>) {
    const NOTES: [&str; 3] = ["♪", "♫", "♬"];

    let face = scene.face;
    let c = &mut *scene.canvas;
    let f = face.point(mesh::FOREHEAD);
    let ed = face.eye_distance();
    let fw = ed * 2.0;
    let t = scene.time.phase(0.01);

    c.set_fill(hex(0x8B4513));
    c.fill_circle(f.x, f.y - fw * 0.4, fw * 0.8);

    c.set_fill(hex(0xFFD700));
    c.set_stroke(hex(0xFF1493));
    c.set_line_width(4.0);
    for eye in [mesh::LEFT_EYE, mesh::RIGHT_EYE] {
        let e = face.point(eye);
        c.begin_path();
        c.ellipse(e.x, e.y, ed * 0.3, ed * 0.2, 0.0, 0.0, TAU, false);
        c.fill();
        c.stroke();
    }

    c.set_fill(hex(0xC0C0C0));
    c.fill_circle(f.x, f.y - fw * 0.8, fw * 0.2);

    for i in 0..20 {
        let i = i as f64;
        let angle = t + i * PI / 10.0;
        let radius = fw * 0.6;
        c.set_fill(hsl((t * 100.0 + i * 18.0) % 360.0, 100.0, 50.0));
        c.fill_circle(f.x + angle.cos() * radius, f.y + angle.sin() * radius * 0.5, 5.0);
    }

    c.set_font_size(fw * 0.08);
    c.set_fill(hex(0xFFD700));
    for i in 0..5 {
        let k = i as f64;
        c.fill_text(
            NOTES[i % NOTES.len()],
            f.x + (t + k).sin() * fw * 0.8,
            f.y + (t * 2.0 + k).cos() * fw * 0.4,
        );
    }
}

/// Blue water tint, a diving mask and drifting bubbles, fish and coral.
pub(super) fn underwater(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let (w, h) = (c.width() as f64, c.height() as f64);
    let f = face.point(mesh::FOREHEAD);
    let fw = face.eye_distance() * 2.0;
    let t = scene.time.phase(0.003);

    c.set_fill(
        Brush::linear(0.0, 0.0, 0.0, h)
            .stop(0.0, rgba(0, 100, 150, 0.3))
            .stop(1.0, rgba(0, 50, 100, 0.5)),
    );
    c.fill_rect(0.0, 0.0, w, h);

    c.set_stroke(hex(0x000000));
    c.set_line_width(8.0);
    c.begin_path();
    c.ellipse(f.x, f.y, fw * 0.4, fw * 0.3, 0.0, 0.0, TAU, false);
    c.stroke();
    c.set_fill(rgba(150, 200, 255, 0.3));
    c.fill_ellipse(f.x, f.y, fw * 0.35, fw * 0.25, 0.0);

    c.set_fill(rgba(173, 216, 230, 0.6));
    c.set_stroke(rgba(100, 150, 200, 0.8));
    c.set_line_width(1.0);
    for i in 0..20 {
        let i = i as f64;
        let x = f.x + (t + i).sin() * fw * 0.8;
        let rise = (t * 50.0 + i * 30.0).rem_euclid(fw * 2.0);
        let r = 5.0 + (t * 3.0 + i).sin() * 3.0;
        c.begin_path();
        c.arc(x, f.y - rise, r, 0.0, TAU, false);
        c.fill();
        c.stroke();
    }

    for i in 0..4 {
        let i = i as f64;
        c.set_fill(hsl(60.0 + i * 90.0, 70.0, 50.0));
        c.fill_ellipse(
            f.x + (t * 2.0 + i * 1.5).sin() * fw * 1.2,
            f.y + (t + i).cos() * fw * 0.4,
            15.0,
            8.0,
            t + i,
        );
    }

    c.set_stroke(hex(0xFF6347));
    c.set_line_width(6.0);
    c.set_line_cap(LineCap::Round);
    for i in 0..5 {
        let i = i as f64;
        let x = f.x - fw * 0.6 + i * fw * 0.3;
        let y = f.y + fw * 0.6;
        c.stroke_line(x, y, x + (t * 5.0 + i).sin() * 20.0, y - fw * 0.3);
    }
}

/// Falling flakes across the frame and a frosty breath cloud.
pub(super) fn snow(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let (w, h) = (c.width() as f64, c.height() as f64);
    let t = scene.time.phase(0.002);

    c.set_fill(rgba(255, 255, 255, 0.8));
    c.set_stroke(rgba(200, 200, 255, 0.3));
    c.set_line_width(1.0);
    for i in 0..100 {
        let k = i as f64;
        let x = (t * 30.0 + k * 123.0).rem_euclid(w) + (t * 3.0 + k).sin() * 20.0;
        let y = (t * 50.0 + k * 456.0).rem_euclid(h);
        let size = (2 + i % 4) as f64;
        c.fill_circle(x, y, size);

        // Crystal arms on the larger flakes.
        if size > 3.0 {
            c.begin_path();
            c.move_to(x - 3.0, y);
            c.line_to(x + 3.0, y);
            c.move_to(x, y - 3.0);
            c.line_to(x, y + 3.0);
            c.move_to(x - 2.0, y - 2.0);
            c.line_to(x + 2.0, y + 2.0);
            c.move_to(x + 2.0, y - 2.0);
            c.line_to(x - 2.0, y + 2.0);
            c.stroke();
        }
    }

    let mouth = face.point(mesh::UPPER_LIP);
    c.set_fill(
        Brush::radial_focal(mouth.x, mouth.y, mouth.x + 50.0, mouth.y - 30.0, 60.0)
            .stop(0.0, rgba(255, 255, 255, 0.6))
            .stop(1.0, rgba(255, 255, 255, 0.0)),
    );
    c.fill_ellipse(mouth.x + 30.0, mouth.y - 15.0, 40.0, 20.0, 0.0);
}

pub(super) fn golden_hour(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let (w, h) = (c.width() as f64, c.height() as f64);
    let f = face.point(mesh::FOREHEAD);
    let fw = face.eye_distance() * 2.0;

    c.set_fill(
        Brush::linear(0.0, 0.0, w, h)
            .stop(0.0, rgba(255, 215, 0, 0.15))
            .stop(0.5, rgba(255, 165, 0, 0.1))
            .stop(1.0, rgba(255, 140, 0, 0.2)),
    );
    c.fill_rect(0.0, 0.0, w, h);

    // Rim light from the upper left.
    let (lx, ly) = (f.x - fw * 0.3, f.y - fw * 0.2);
    c.set_fill(
        Brush::radial(lx, ly, fw * 0.8)
            .stop(0.0, rgba(255, 215, 0, 0.4))
            .stop(0.7, rgba(255, 165, 0, 0.2))
            .stop(1.0, rgba(255, 165, 0, 0.0)),
    );
    c.fill_ellipse(f.x, f.y + fw * 0.1, fw * 0.6, fw * 0.8, 0.0);

    let t = scene.time.phase(0.001);
    for i in 0..5 {
        let i = i as f64;
        c.set_fill(rgba(255, 255, 100, 0.3 + (t * 2.0 + i).sin() * 0.2));
        c.fill_circle(
            f.x + (t + i).sin() * fw * 0.8,
            f.y + (t * 1.2 + i).cos() * fw * 0.6,
            10.0 + (t * 3.0 + i).sin() * 8.0,
        );
    }
}

/// Darkened frame with a glowing face outline, a magenta grid and drifting
/// neon particles.
pub(super) fn cyberpunk_neon(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let (w, h) = (c.width() as f64, c.height() as f64);
    let f = face.point(mesh::FOREHEAD);
    let fw = face.eye_distance() * 2.0;
    let t = scene.time.phase(0.003);

    c.set_fill(rgba(0, 0, 0, 0.3));
    c.fill_rect(0.0, 0.0, w, h);

    c.set_stroke(rgba(0, 255, 255, 0.8 + (t * 5.0).sin() * 0.2));
    c.set_line_width(3.0);
    c.set_shadow(hex(0x00FFFF), 15.0);
    c.begin_path();
    c.ellipse(f.x, f.y + fw * 0.1, fw * 0.5, fw * 0.7, 0.0, 0.0, TAU, false);
    c.stroke();

    c.set_stroke(rgba(255, 0, 255, 0.5 + (t * 4.0).sin() * 0.3));
    c.set_line_width(2.0);
    c.set_shadow(hex(0xFF00FF), 10.0);
    for i in 0..8 {
        let y = i as f64 * h / 8.0;
        c.stroke_line(0.0, y, w, y);
    }
    for i in 0..10 {
        let x = i as f64 * w / 10.0;
        c.stroke_line(x, 0.0, x, h);
    }

    for i in 0..30 {
        let i = i as f64;
        let hue = (t * 100.0 + i * 12.0) % 360.0;
        c.set_fill(hsla(hue, 100.0, 50.0, 0.6 + (t * 8.0 + i).sin() * 0.4));
        c.set_shadow(hsl(hue, 100.0, 50.0), 20.0);
        c.fill_circle(
            f.x + (t + i).sin() * fw * 0.8,
            f.y + (t * 1.5 + i).cos() * fw * 0.6,
            3.0,
        );
    }
    c.clear_shadow();
}

/// Grain, sepia wash, vignette, scratches and a dark film border.
///
/// The grain is applied per pixel to whatever is already on the canvas.
pub(super) fn vintage_film(scene: &mut Scene<'_>) {
    let mut pixels = scene.canvas.image_data();
    for px in pixels.pixels_mut() {
        let noise = (scene.random() - 0.5) * 30.0;
        for channel in &mut px.0[..3] {
            *channel = (*channel as f64 + noise).round().clamp(0.0, 255.0) as u8;
        }
    }
    let c = &mut *scene.canvas;
    if let Err(err) = c.put_image_data(&pixels) {
        tracing::warn!(error = %err, "film grain skipped");
    }

    let (w, h) = (c.width() as f64, c.height() as f64);
    c.set_fill(rgba(222, 184, 135, 0.15));
    c.fill_rect(0.0, 0.0, w, h);

    let (cx, cy) = (w / 2.0, h / 2.0);
    c.set_fill(
        Brush::radial(cx, cy, cx.hypot(cy))
            .stop(0.0, rgba(0, 0, 0, 0.0))
            .stop(0.6, rgba(0, 0, 0, 0.0))
            .stop(1.0, rgba(0, 0, 0, 0.6)),
    );
    c.fill_rect(0.0, 0.0, w, h);

    let t = scene.time.phase(0.001);
    c.set_stroke(rgba(255, 255, 255, 0.3));
    c.set_line_width(1.0);
    for i in 0..5 {
        let i = i as f64;
        let x = (t * 200.0 + i * 123.0).rem_euclid(w);
        c.stroke_line(x, 0.0, x + (t + i).sin() * 50.0, h);
    }

    c.set_stroke(rgba(0, 0, 0, 0.8));
    c.set_line_width(20.0);
    c.stroke_rect(0.0, 0.0, w, h);
}

/// Droplets sliding down a tinted pane, breath fog and reflection streaks.
pub(super) fn rain_glass(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let (w, h) = (c.width() as f64, c.height() as f64);
    let t = scene.time.phase(0.002);

    c.set_fill(rgba(173, 216, 230, 0.1));
    c.fill_rect(0.0, 0.0, w, h);

    for i in 0..50 {
        let k = i as f64;
        let x = ((k * 1.2).sin() * 0.3 + 0.5) * w;
        let y = (t * 100.0 + k * 23.0).rem_euclid(h + 100.0);
        let size = (3 + i % 5) as f64;

        c.set_fill(rgba(173, 216, 230, 0.6));
        c.set_stroke(rgba(100, 149, 237, 0.8));
        c.set_line_width(1.0);
        c.begin_path();
        c.ellipse(x, y, size, size * 1.5, 0.0, 0.0, TAU, false);
        c.fill();
        c.stroke();

        c.set_fill(rgba(255, 255, 255, 0.7));
        c.fill_ellipse(x - size * 0.3, y - size * 0.3, size * 0.3, size * 0.4, 0.0);

        if size > 4.0 {
            c.set_stroke(rgba(173, 216, 230, 0.4));
            c.set_line_width(2.0);
            c.stroke_line(x, y + size, x + (t + k).sin() * 5.0, y + size * 3.0);
        }
    }

    let mouth = face.point(mesh::UPPER_LIP);
    c.set_fill(
        Brush::radial(mouth.x, mouth.y, 80.0)
            .stop(0.0, rgba(255, 255, 255, 0.3))
            .stop(1.0, rgba(255, 255, 255, 0.0)),
    );
    c.fill_circle(mouth.x, mouth.y, 60.0);

    c.set_stroke(rgba(255, 255, 255, 0.2));
    c.set_line_width(3.0);
    c.set_line_cap(LineCap::Round);
    for i in 0..8 {
        let i = i as f64;
        let x = i * w / 8.0 + (t + i).sin() * 30.0;
        c.stroke_line(x, 0.0, x + 20.0, h);
    }
}

#[cfg(test)]
mod tests {
    use crate::filters::test_support::{grey_frame, render_still, HEIGHT, WIDTH};

    #[test]
    fn test_golden_hour_warms_every_corner() {
        let raw = grey_frame();
        let out = render_still("golden-hour", 0.0, 0);
        for (x, y) in [(0, 0), (WIDTH - 1, 0), (0, HEIGHT - 1), (WIDTH - 1, HEIGHT - 1)] {
            let (before, after) = (raw.get_pixel(x, y).0, out.get_pixel(x, y).0);
            assert!(after[0] > before[0] && after[2] < before[2], "({x}, {y}) {after:?}");
        }
    }

    #[test]
    fn test_vintage_border_darkens_edges() {
        let out = render_still("vintage-film", 0.0, 0);
        let p = out.get_pixel(2, 60).0;
        assert!(p[0] < 40 && p[1] < 40 && p[2] < 40, "{p:?}");
    }

    #[test]
    fn test_vintage_grain_keeps_alpha() {
        let out = render_still("vintage-film", 800.0, 4);
        assert!(out.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn test_cyberpunk_darkens_background() {
        let raw = grey_frame();
        let out = render_still("cyberpunk-neon", 0.0, 0);
        // Clear of the grid halos and the particle orbit.
        let (before, after) = (raw.get_pixel(156, 97).0, out.get_pixel(156, 97).0);
        assert!(after[0] < before[0] && after[1] < before[1], "{after:?}");
    }
}
