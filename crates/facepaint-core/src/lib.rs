//! facepaint-core — Landmark-anchored face filters on a software canvas.
//!
//! Resolves normalized face-mesh landmarks to pixel space, dispatches the
//! active filter to its render routine, and records captured photos.
//! Landmark detection itself is supplied through [`LandmarkProvider`].

pub mod canvas;
pub mod capture;
pub mod filters;
pub mod landmarks;
pub mod pipeline;
pub mod providers;
pub mod scene;

pub use canvas::{Canvas, CanvasError};
pub use capture::{CaptureError, PhotoGallery, PhotoRecord};
pub use filters::{Filter, FilterId};
pub use landmarks::{resolve, Face, LandmarkError, LandmarkSet, NormalizedPoint};
pub use pipeline::{render_frame, FrameOutcome};
pub use providers::{LandmarkProvider, NoFaceProvider, ProviderError, ReplayProvider, StaticProvider};
pub use scene::{FrameTime, Scene};
