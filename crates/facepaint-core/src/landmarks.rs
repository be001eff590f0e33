//! Face-mesh landmark sets and the pixel-space resolver.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of points produced by the face-mesh model (478 when iris refinement is on).
pub const FACE_MESH_LANDMARKS: usize = 468;

/// Semantic indices into the face-mesh landmark scheme.
///
/// "Left" and "right" follow the image, not the subject.
pub mod mesh {
    pub const NOSE_TIP: usize = 1;
    pub const NOSE_BOTTOM: usize = 2;
    pub const FOREHEAD: usize = 10;
    pub const UPPER_LIP: usize = 13;
    pub const LEFT_EYE: usize = 33;
    pub const LEFT_MOUTH: usize = 61;
    pub const LEFT_BROW: usize = 70;
    pub const LEFT_CHEEK: usize = 116;
    pub const LEFT_TEMPLE: usize = 127;
    pub const LEFT_JAW: usize = 172;
    pub const CHIN: usize = 175;
    pub const RIGHT_EYE: usize = 263;
    pub const RIGHT_MOUTH: usize = 291;
    pub const RIGHT_BROW: usize = 300;
    pub const RIGHT_CHEEK: usize = 345;
    pub const RIGHT_TEMPLE: usize = 356;
    pub const RIGHT_JAW: usize = 397;
}

#[derive(Error, Debug)]
pub enum LandmarkError {
    #[error("landmark set has {0} points, face mesh needs at least {FACE_MESH_LANDMARKS}")]
    TooFewPoints(usize),
    #[error("malformed landmark json: {0}")]
    Json(#[from] serde_json::Error),
}

/// A landmark in normalized [0, 1] image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
    /// Relative depth; unused by the renderers.
    #[serde(default)]
    pub z: f64,
}

impl NormalizedPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// One face worth of landmarks with a stable indexing scheme.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<NormalizedPoint>,
}

/// Accepted JSON layouts for a recorded landmark frame.
#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkDocument {
    Points(Vec<NormalizedPoint>),
    Wrapped {
        landmarks: Vec<NormalizedPoint>,
    },
    FaceMesh {
        #[serde(rename = "multiFaceLandmarks")]
        faces: Vec<Vec<NormalizedPoint>>,
    },
}

impl LandmarkSet {
    pub fn new(points: Vec<NormalizedPoint>) -> Result<Self, LandmarkError> {
        if points.len() < FACE_MESH_LANDMARKS {
            return Err(LandmarkError::TooFewPoints(points.len()));
        }
        Ok(Self { points })
    }

    /// Parse one recorded frame. `Ok(None)` means the recording saw no face.
    ///
    /// Accepts a bare point array, `{"landmarks": [...]}`, or a face-mesh
    /// result `{"multiFaceLandmarks": [[...], ...]}` (first face wins).
    pub fn from_json(json: &str) -> Result<Option<Self>, LandmarkError> {
        Self::from_document(serde_json::from_str(json)?)
    }

    /// Like [`from_json`](Self::from_json), for an already parsed value.
    pub fn from_value(value: serde_json::Value) -> Result<Option<Self>, LandmarkError> {
        Self::from_document(serde_json::from_value(value)?)
    }

    fn from_document(document: LandmarkDocument) -> Result<Option<Self>, LandmarkError> {
        let points = match document {
            LandmarkDocument::Points(points) => points,
            LandmarkDocument::Wrapped { landmarks } => landmarks,
            LandmarkDocument::FaceMesh { faces } => match faces.into_iter().next() {
                Some(points) => points,
                None => return Ok(None),
            },
        };
        Self::new(points).map(Some)
    }

    /// A frontal face template centred in the frame.
    ///
    /// Points without a semantic role sit at the centre of the face.
    pub fn neutral() -> Self {
        let mut points = vec![NormalizedPoint::new(0.5, 0.52); FACE_MESH_LANDMARKS];
        let anchors = [
            (mesh::NOSE_TIP, 0.50, 0.52),
            (mesh::NOSE_BOTTOM, 0.50, 0.56),
            (mesh::FOREHEAD, 0.50, 0.25),
            (mesh::UPPER_LIP, 0.50, 0.64),
            (mesh::LEFT_EYE, 0.38, 0.42),
            (mesh::RIGHT_EYE, 0.62, 0.42),
            (mesh::LEFT_MOUTH, 0.43, 0.65),
            (mesh::RIGHT_MOUTH, 0.57, 0.65),
            (mesh::LEFT_BROW, 0.37, 0.37),
            (mesh::RIGHT_BROW, 0.63, 0.37),
            (mesh::LEFT_CHEEK, 0.36, 0.55),
            (mesh::RIGHT_CHEEK, 0.64, 0.55),
            (mesh::LEFT_TEMPLE, 0.31, 0.45),
            (mesh::RIGHT_TEMPLE, 0.69, 0.45),
            (mesh::LEFT_JAW, 0.36, 0.70),
            (mesh::RIGHT_JAW, 0.64, 0.70),
            (mesh::CHIN, 0.50, 0.78),
        ];
        for (index, x, y) in anchors {
            points[index] = NormalizedPoint::new(x, y);
        }
        Self { points }
    }

    /// Copy of this set with one point moved.
    pub fn with_point(mut self, index: usize, x: f64, y: f64) -> Self {
        self.points[index] = NormalizedPoint::new(x, y);
        self
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[NormalizedPoint] {
        &self.points
    }
}

impl std::ops::Index<usize> for LandmarkSet {
    type Output = NormalizedPoint;

    fn index(&self, index: usize) -> &NormalizedPoint {
        &self.points[index]
    }
}

/// Map landmark `index` to pixel coordinates on a `width` x `height` surface.
///
/// Panics if `index` is outside the set.
pub fn resolve(set: &LandmarkSet, index: usize, width: f64, height: f64) -> Point {
    let p = set[index];
    Point::new(p.x * width, p.y * height)
}

/// A landmark set viewed through a particular surface size.
///
/// Every accessor resolves afresh; nothing is cached between calls.
#[derive(Debug, Clone, Copy)]
pub struct Face<'a> {
    landmarks: &'a LandmarkSet,
    width: f64,
    height: f64,
}

impl<'a> Face<'a> {
    pub fn new(landmarks: &'a LandmarkSet, width: f64, height: f64) -> Self {
        Self {
            landmarks,
            width,
            height,
        }
    }

    pub fn point(&self, index: usize) -> Point {
        resolve(self.landmarks, index, self.width, self.height)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn landmarks(&self) -> &'a LandmarkSet {
        self.landmarks
    }

    /// Horizontal distance between the outer eye corners.
    pub fn eye_distance(&self) -> f64 {
        (self.point(mesh::RIGHT_EYE).x - self.point(mesh::LEFT_EYE).x).abs()
    }

    /// Vertical distance from forehead to chin.
    pub fn face_height(&self) -> f64 {
        (self.point(mesh::CHIN).y - self.point(mesh::FOREHEAD).y).abs()
    }

    /// Horizontal distance between the temples.
    pub fn temple_width(&self) -> f64 {
        (self.point(mesh::RIGHT_TEMPLE).x - self.point(mesh::LEFT_TEMPLE).x).abs()
    }

    /// Midpoint of the eye corners horizontally, forehead-to-chin vertically.
    pub fn center(&self) -> Point {
        Point::new(
            (self.point(mesh::LEFT_EYE).x + self.point(mesh::RIGHT_EYE).x) / 2.0,
            (self.point(mesh::FOREHEAD).y + self.point(mesh::CHIN).y) / 2.0,
        )
    }
}
