//! Overlays anchored on the eye corners.

use std::f64::consts::TAU;

use crate::canvas::{hex, Canvas};
use crate::landmarks::mesh;
use crate::scene::Scene;

pub(super) fn sunglasses(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let left = face.point(mesh::LEFT_EYE);
    let right = face.point(mesh::RIGHT_EYE);

    let eye_distance = face.eye_distance();
    let lens_rx = eye_distance * 1.5 * 0.25;
    let lens_ry = eye_distance * 0.6 * 0.4;

    c.set_fill(hex(0x000000));
    c.set_stroke(hex(0x333333));
    c.set_line_width(3.0);

    for eye in [left, right] {
        c.begin_path();
        c.ellipse(eye.x, eye.y, lens_rx, lens_ry, 0.0, 0.0, TAU, false);
        c.fill();
        c.stroke();
    }

    // Bridge
    c.stroke_line(left.x + lens_rx, left.y, right.x - lens_rx, right.y);
}

pub(super) fn heart_eyes(scene: &mut Scene<'_>) {
    let face = scene.face;
    let c = &mut *scene.canvas;
    let size = face.eye_distance() * 0.15;

    c.set_fill(hex(0xFF69B4));
    for eye in [mesh::LEFT_EYE, mesh::RIGHT_EYE] {
        let p = face.point(eye);
        heart(c, p.x, p.y, size);
    }
}

/// Filled heart whose notch sits `size * 0.3` below `(x, y)`.
pub(super) fn heart(c: &mut Canvas, x: f64, y: f64, size: f64) {
    c.begin_path();
    c.move_to(x, y + size * 0.3);
    c.cubic_to(x, y, x - size * 0.5, y, x - size * 0.5, y + size * 0.3);
    c.cubic_to(x - size * 0.5, y + size * 0.7, x, y + size * 1.2, x, y + size * 1.2);
    c.cubic_to(x, y + size * 1.2, x + size * 0.5, y + size * 0.7, x + size * 0.5, y + size * 0.3);
    c.cubic_to(x + size * 0.5, y, x, y, x, y + size * 0.3);
    c.fill();
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::canvas::Canvas;
    use crate::filters::{render, FilterId};
    use crate::landmarks::{mesh, Face, LandmarkSet};
    use crate::scene::{FrameTime, Scene};

    fn render_on_white(id: &str, landmarks: &LandmarkSet) -> Canvas {
        let frame = RgbaImage::from_pixel(640, 480, Rgba([255, 255, 255, 255]));
        let mut canvas = Canvas::new(640, 480).unwrap();
        canvas.draw_image(&frame);
        let mut rng = StdRng::seed_from_u64(0);
        let mut scene = Scene {
            canvas: &mut canvas,
            face: Face::new(landmarks, 640.0, 480.0),
            frame: &frame,
            time: FrameTime::ZERO,
            rng: &mut rng,
        };
        render(&FilterId::new(id), &mut scene);
        canvas
    }

    #[test]
    fn test_sunglasses_lenses_sit_on_eyes() {
        let landmarks = LandmarkSet::neutral()
            .with_point(mesh::LEFT_EYE, 0.3, 0.4)
            .with_point(mesh::RIGHT_EYE, 0.7, 0.4);
        let canvas = render_on_white("sunglasses", &landmarks);

        // Lens centres at (192,192) and (448,192); rx = 96, ry = 61.44 for 256px eyes.
        assert_eq!(canvas.pixel(192, 192), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(448, 192), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(192 + 80, 192), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(192, 192 + 50), Some([0, 0, 0, 255]));
        // Outside each lens
        assert_eq!(canvas.pixel(192, 192 + 70), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(192 - 100, 192), Some([255, 255, 255, 255]));
        // Bridge between the lenses
        assert_eq!(canvas.pixel(320, 192), Some([0x33, 0x33, 0x33, 255]));
        assert_eq!(canvas.pixel(320, 200), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_sunglasses_scale_with_eye_distance() {
        let narrow = LandmarkSet::neutral()
            .with_point(mesh::LEFT_EYE, 0.45, 0.4)
            .with_point(mesh::RIGHT_EYE, 0.55, 0.4);
        let canvas = render_on_white("sunglasses", &narrow);
        // 64px eyes: rx = 24, so 30px from the centre is already outside.
        assert_eq!(canvas.pixel(288, 192), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(288 - 30, 192), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_sunglasses_degenerate_eyes_do_not_panic() {
        let collapsed = LandmarkSet::neutral()
            .with_point(mesh::LEFT_EYE, 0.5, 0.4)
            .with_point(mesh::RIGHT_EYE, 0.5, 0.4);
        let canvas = render_on_white("sunglasses", &collapsed);
        assert_eq!(canvas.pixel(10, 10), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_heart_eyes_are_pink() {
        let landmarks = LandmarkSet::neutral()
            .with_point(mesh::LEFT_EYE, 0.3, 0.4)
            .with_point(mesh::RIGHT_EYE, 0.7, 0.4);
        let canvas = render_on_white("heart-eyes", &landmarks);
        // size = 38.4; the body of the heart lies between y+0.3s and y+1.2s.
        assert_eq!(canvas.pixel(192, 192 + 25), Some([0xFF, 0x69, 0xB4, 255]));
        assert_eq!(canvas.pixel(448, 192 + 25), Some([0xFF, 0x69, 0xB4, 255]));
    }
}
