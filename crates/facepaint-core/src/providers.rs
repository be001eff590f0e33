//! Landmark providers: where face geometry for each frame comes from.
//!
//! The face-mesh model is external. These providers cover the cases the
//! workspace can serve itself: a fixed face, no face, or a recording of
//! model output replayed frame by frame.

use std::path::Path;

use image::RgbaImage;
use thiserror::Error;

use crate::landmarks::{LandmarkError, LandmarkSet};

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("failed to read landmark recording: {0}")]
    Io(#[from] std::io::Error),
    #[error("landmark recording frame {frame}: {source}")]
    BadFrame {
        frame: usize,
        #[source]
        source: LandmarkError,
    },
    #[error("malformed landmark recording: {0}")]
    Json(#[from] serde_json::Error),
    #[error("landmark recording has no frames")]
    EmptyRecording,
}

/// Yields zero or one landmark set per video frame.
pub trait LandmarkProvider: Send {
    /// `Ok(None)` means no face in this frame, which is not an error.
    fn detect(&mut self, frame: &RgbaImage) -> Result<Option<LandmarkSet>, ProviderError>;
}

/// Reports the same face on every frame.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    landmarks: LandmarkSet,
}

impl StaticProvider {
    pub fn new(landmarks: LandmarkSet) -> Self {
        Self { landmarks }
    }
}

impl Default for StaticProvider {
    fn default() -> Self {
        Self::new(LandmarkSet::neutral())
    }
}

impl LandmarkProvider for StaticProvider {
    fn detect(&mut self, _frame: &RgbaImage) -> Result<Option<LandmarkSet>, ProviderError> {
        Ok(Some(self.landmarks.clone()))
    }
}

/// Never finds a face.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFaceProvider;

impl LandmarkProvider for NoFaceProvider {
    fn detect(&mut self, _frame: &RgbaImage) -> Result<Option<LandmarkSet>, ProviderError> {
        Ok(None)
    }
}

/// Cycles through recorded detections, one per call.
#[derive(Debug, Clone)]
pub struct ReplayProvider {
    frames: Vec<Option<LandmarkSet>>,
    cursor: usize,
}

impl ReplayProvider {
    pub fn new(frames: Vec<Option<LandmarkSet>>) -> Result<Self, ProviderError> {
        if frames.is_empty() {
            return Err(ProviderError::EmptyRecording);
        }
        Ok(Self { frames, cursor: 0 })
    }

    pub fn from_path(path: &Path) -> Result<Self, ProviderError> {
        let text = std::fs::read_to_string(path)?;
        let provider = Self::parse(&text)?;
        tracing::info!(path = %path.display(), frames = provider.len(), "loaded landmark recording");
        Ok(provider)
    }

    /// Parse a recording.
    ///
    /// Accepts a single frame in any layout [`LandmarkSet::from_json`]
    /// understands, a JSON array of such frames, or JSON lines with one
    /// frame per line. `null` frames mean no face.
    pub fn parse(text: &str) -> Result<Self, ProviderError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ProviderError::EmptyRecording);
        }

        if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
            let frames = match value {
                serde_json::Value::Array(items) if !is_point_array(&items) => items,
                single => vec![single],
            };
            return Self::new(decode_frames(frames)?);
        }

        let frames = trimmed
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(serde_json::from_str::<serde_json::Value>)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(decode_frames(frames)?)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl LandmarkProvider for ReplayProvider {
    fn detect(&mut self, _frame: &RgbaImage) -> Result<Option<LandmarkSet>, ProviderError> {
        let landmarks = self.frames[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.frames.len();
        Ok(landmarks)
    }
}

/// A bare point array is one frame, not a list of frames.
fn is_point_array(items: &[serde_json::Value]) -> bool {
    items
        .first()
        .and_then(|first| first.as_object())
        .is_some_and(|object| object.contains_key("x"))
}

fn decode_frames(values: Vec<serde_json::Value>) -> Result<Vec<Option<LandmarkSet>>, ProviderError> {
    values
        .into_iter()
        .enumerate()
        .map(|(frame, value)| {
            if value.is_null() {
                return Ok(None);
            }
            LandmarkSet::from_value(value).map_err(|source| ProviderError::BadFrame { frame, source })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::mesh;

    fn blank() -> RgbaImage {
        RgbaImage::new(2, 2)
    }

    fn frame_json(x: f64) -> String {
        let points: Vec<String> = (0..468)
            .map(|i| {
                if i == mesh::FOREHEAD {
                    format!(r#"{{"x":{x},"y":0.2}}"#)
                } else {
                    r#"{"x":0.5,"y":0.5}"#.to_string()
                }
            })
            .collect();
        format!("[{}]", points.join(","))
    }

    #[test]
    fn test_static_and_no_face() {
        let mut fixed = StaticProvider::default();
        assert_eq!(fixed.detect(&blank()).unwrap(), Some(LandmarkSet::neutral()));
        assert_eq!(NoFaceProvider.detect(&blank()).unwrap(), None);
    }

    #[test]
    fn test_replay_json_lines_cycles_with_gaps() {
        let text = format!("{}\nnull\n\n{}\n", frame_json(0.1), frame_json(0.9));
        let mut replay = ReplayProvider::parse(&text).unwrap();
        assert_eq!(replay.len(), 3);

        let first = replay.detect(&blank()).unwrap().unwrap();
        assert_eq!(first[mesh::FOREHEAD].x, 0.1);
        assert!(replay.detect(&blank()).unwrap().is_none());
        let third = replay.detect(&blank()).unwrap().unwrap();
        assert_eq!(third[mesh::FOREHEAD].x, 0.9);
        // Wraps around.
        let again = replay.detect(&blank()).unwrap().unwrap();
        assert_eq!(again[mesh::FOREHEAD].x, 0.1);
    }

    #[test]
    fn test_replay_array_of_frames() {
        let text = format!("[{}, null]", frame_json(0.3));
        let replay = ReplayProvider::parse(&text).unwrap();
        assert_eq!(replay.len(), 2);
    }

    #[test]
    fn test_replay_single_bare_frame() {
        let replay = ReplayProvider::parse(&frame_json(0.4)).unwrap();
        assert_eq!(replay.len(), 1);
    }

    #[test]
    fn test_replay_face_mesh_without_faces_is_no_face() {
        let mut replay = ReplayProvider::parse(r#"{"multiFaceLandmarks": []}"#).unwrap();
        assert!(replay.detect(&blank()).unwrap().is_none());
    }

    #[test]
    fn test_replay_errors() {
        assert!(matches!(ReplayProvider::parse("  \n"), Err(ProviderError::EmptyRecording)));
        assert!(matches!(
            ReplayProvider::parse(r#"[[{"x":0.5,"y":0.5}]]"#),
            Err(ProviderError::BadFrame { frame: 0, .. })
        ));
        assert!(matches!(ReplayProvider::parse("{not json"), Err(ProviderError::Json(_))));
    }
}
