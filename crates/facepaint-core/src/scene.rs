//! Per-frame inputs handed to a filter routine.

use image::RgbaImage;
use rand::{Rng, RngCore};

use crate::canvas::Canvas;
use crate::landmarks::Face;

/// Animation clock value for one frame, in milliseconds.
///
/// Routines derive their phases from this instead of reading a wall clock,
/// so a fixed value reproduces a frame exactly.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct FrameTime {
    millis: f64,
}

impl FrameTime {
    pub const ZERO: FrameTime = FrameTime { millis: 0.0 };

    pub fn from_millis(millis: f64) -> Self {
        Self { millis }
    }

    pub fn millis(self) -> f64 {
        self.millis
    }

    /// Phase angle advancing at `rate` radians per millisecond.
    pub fn phase(self, rate: f64) -> f64 {
        self.millis * rate
    }
}

/// Drawing context for one filter invocation.
pub struct Scene<'a> {
    pub canvas: &'a mut Canvas,
    pub face: Face<'a>,
    /// The unfiltered camera frame, for routines that re-draw the video.
    pub frame: &'a RgbaImage,
    pub time: FrameTime,
    /// Sole source of randomness for routines that scatter elements.
    pub rng: &'a mut dyn RngCore,
}

impl<'a> Scene<'a> {
    /// Uniform sample in `[0, 1)`.
    pub fn random(&mut self) -> f64 {
        self.rng.gen()
    }
}
