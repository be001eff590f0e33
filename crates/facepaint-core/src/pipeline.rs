//! One step of the frame loop: raw frame in, filtered canvas out.

use image::RgbaImage;
use rand::RngCore;

use crate::canvas::{Canvas, CanvasError};
use crate::filters::{self, Filter, FilterId};
use crate::landmarks::{Face, LandmarkSet};
use crate::scene::{FrameTime, Scene};

/// What happened while rendering a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOutcome {
    pub face_present: bool,
    /// The filter that drew, if any. `None` for `none`, unknown ids, or no face.
    pub drawn: Option<Filter>,
}

/// Clear the canvas, draw `frame`, and overlay `filter` when a face is present.
///
/// The canvas is resized to the frame first. Without landmarks the renderer
/// is not invoked at all and the output is the raw frame.
pub fn render_frame(
    canvas: &mut Canvas,
    frame: &RgbaImage,
    landmarks: Option<&LandmarkSet>,
    filter: &FilterId,
    time: FrameTime,
    rng: &mut dyn RngCore,
) -> Result<FrameOutcome, CanvasError> {
    canvas.ensure_size(frame.width(), frame.height())?;
    canvas.reset_state();
    canvas.clear();
    canvas.draw_image(frame);

    let Some(landmarks) = landmarks else {
        return Ok(FrameOutcome { face_present: false, drawn: None });
    };

    let face = Face::new(landmarks, canvas.width() as f64, canvas.height() as f64);
    let mut scene = Scene { canvas, face, frame, time, rng };
    let drawn = filters::render(filter, &mut scene);
    if drawn.is_none() && !filter.is_none() {
        tracing::debug!(filter = %filter, "unrecognised filter, passing frame through");
    }
    Ok(FrameOutcome { face_present: true, drawn })
}

#[cfg(test)]
mod tests {
    use image::Rgba;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::landmarks::{mesh, NormalizedPoint};

    fn frame(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255]))
    }

    fn run(
        canvas: &mut Canvas,
        frame: &RgbaImage,
        landmarks: Option<&LandmarkSet>,
        filter: &str,
    ) -> FrameOutcome {
        let mut rng = StdRng::seed_from_u64(0);
        render_frame(canvas, frame, landmarks, &FilterId::new(filter), FrameTime::ZERO, &mut rng)
            .unwrap()
    }

    #[test]
    fn test_none_filter_is_pure_passthrough() {
        let raw = frame(64, 48);
        let landmarks = LandmarkSet::neutral();
        let mut canvas = Canvas::new(64, 48).unwrap();

        let before = canvas.draw_calls();
        let outcome = run(&mut canvas, &raw, Some(&landmarks), "none");

        assert_eq!(outcome, FrameOutcome { face_present: true, drawn: None });
        // Exactly one primitive: the frame itself.
        assert_eq!(canvas.draw_calls() - before, 1);
        assert_eq!(canvas.snapshot(), raw);
    }

    #[test]
    fn test_unknown_filter_matches_none() {
        let raw = frame(64, 48);
        let landmarks = LandmarkSet::neutral();
        let mut canvas = Canvas::new(64, 48).unwrap();

        run(&mut canvas, &raw, Some(&landmarks), "none");
        let (none_calls, none_pixels) = (canvas.draw_calls(), canvas.snapshot());
        run(&mut canvas, &raw, Some(&landmarks), "definitely-not-a-filter");

        assert_eq!(canvas.draw_calls() - none_calls, 1);
        assert_eq!(canvas.snapshot(), none_pixels);
    }

    #[test]
    fn test_no_face_skips_the_renderer() {
        let raw = frame(64, 48);
        let mut canvas = Canvas::new(64, 48).unwrap();

        let outcome = run(&mut canvas, &raw, None, "crown");
        assert_eq!(outcome, FrameOutcome { face_present: false, drawn: None });
        assert_eq!(canvas.draw_calls(), 1);
        assert_eq!(canvas.snapshot(), raw);
    }

    #[test]
    fn test_sunglasses_scenario_640x480() {
        let landmarks = LandmarkSet::new(vec![NormalizedPoint::new(0.5, 0.5); 468])
            .unwrap()
            .with_point(mesh::LEFT_EYE, 0.3, 0.4)
            .with_point(mesh::RIGHT_EYE, 0.7, 0.4);
        let face = Face::new(&landmarks, 640.0, 480.0);
        let (left, right) = (face.point(mesh::LEFT_EYE), face.point(mesh::RIGHT_EYE));
        assert_eq!((left.x, left.y), (192.0, 192.0));
        assert_eq!((right.x, right.y), (448.0, 192.0));
        assert!((face.eye_distance() - 256.0).abs() < 1e-9);

        let raw = RgbaImage::from_pixel(640, 480, Rgba([200, 200, 200, 255]));
        let mut canvas = Canvas::new(640, 480).unwrap();
        let outcome = run(&mut canvas, &raw, Some(&landmarks), "sunglasses");
        assert_eq!(outcome.drawn, Some(Filter::Sunglasses));

        // Lens centres are dark; the far corner is untouched.
        for (x, y) in [(192, 192), (448, 192)] {
            let [r, g, b, _] = canvas.pixel(x, y).unwrap();
            assert!(r < 60 && g < 60 && b < 60, "lens at ({x}, {y}) is {r},{g},{b}");
        }
        assert_eq!(canvas.pixel(10, 470), Some([200, 200, 200, 255]));
    }

    #[test]
    fn test_canvas_follows_frame_size() {
        let mut canvas = Canvas::new(32, 32).unwrap();
        run(&mut canvas, &frame(80, 60), None, "none");
        assert_eq!((canvas.width(), canvas.height()), (80, 60));
    }

    #[test]
    fn test_previous_frame_does_not_bleed_through() {
        let landmarks = LandmarkSet::neutral();
        let raw = frame(64, 48);
        let mut canvas = Canvas::new(64, 48).unwrap();
        run(&mut canvas, &raw, Some(&landmarks), "crown");
        run(&mut canvas, &raw, Some(&landmarks), "none");
        assert_eq!(canvas.snapshot(), raw);
    }
}
