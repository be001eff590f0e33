//! facepaint-hw — Camera abstraction for colour video capture.
//!
//! Provides V4L2-based capture with one device per facing mode, RGBA frame
//! conversion, and a still-image source for offline use.

pub mod camera;
pub mod frame;

pub use camera::{
    Camera, CameraError, DeviceInfo, FacingMode, ParseFacingModeError, PixelFormat, StillSource,
    V4lSource, VideoSource,
};
pub use frame::{Frame, FrameError};
