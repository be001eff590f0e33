//! Colour video sources: V4L2 capture via the `v4l` crate, plus a still-image source.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use v4l::buffer::Type as BufType;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::FourCC;

use crate::frame::{self, Frame, FrameError};

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("device busy")]
    DeviceBusy,
    #[error("capture failed: {0}")]
    CaptureFailed(String),
    #[error("format negotiation failed: {0}")]
    FormatNegotiationFailed(String),
    #[error("streaming not supported")]
    StreamingNotSupported,
    #[error("camera is not streaming")]
    NotStreaming,
    #[error("frame conversion failed: {0}")]
    Frame(#[from] FrameError),
}

/// Which physical camera supplies the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front-facing, towards the user.
    #[default]
    User,
    /// Rear-facing.
    Environment,
}

impl FacingMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::User => Self::Environment,
            Self::Environment => Self::User,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Environment => "environment",
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown facing mode {0:?} (expected \"user\" or \"environment\")")]
pub struct ParseFacingModeError(String);

impl FromStr for FacingMode {
    type Err = ParseFacingModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" | "front" => Ok(Self::User),
            "environment" | "back" | "rear" => Ok(Self::Environment),
            _ => Err(ParseFacingModeError(s.to_string())),
        }
    }
}

/// Anything that can be started for a facing mode and then pulled for frames.
pub trait VideoSource: Send {
    /// Acquire the stream for `facing`, releasing any current one first.
    fn start(&mut self, facing: FacingMode) -> Result<(), CameraError>;
    /// Release the stream. Idempotent.
    fn stop(&mut self);
    fn is_streaming(&self) -> bool;
    /// Block until the next frame is available.
    fn next_frame(&mut self) -> Result<Frame, CameraError>;
}

/// Info about a discovered V4L2 device.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    pub path: String,
    pub name: String,
    pub driver: String,
    pub bus: String,
}

/// Negotiated pixel format for the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// YUYV 4:2:2 packed, 2 bytes/pixel.
    Yuyv,
    /// Packed 24-bit RGB, 3 bytes/pixel.
    Rgb24,
}

/// V4L2 camera device handle.
pub struct Camera {
    device: Device,
    pub width: u32,
    pub height: u32,
    pub device_path: String,
    pub fourcc: FourCC,
    pixel_format: PixelFormat,
    /// Bytes per row as reported by the driver; may exceed the packed width.
    stride: u32,
}

impl Camera {
    /// Open a V4L2 device and ask for `width`x`height` YUYV.
    ///
    /// The size is a preference; whatever the driver negotiates is kept.
    pub fn open(device_path: &str, width: u32, height: u32) -> Result<Self, CameraError> {
        if !Path::new(device_path).exists() {
            return Err(CameraError::DeviceNotFound(device_path.to_string()));
        }

        let device = Device::with_path(device_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => {
                CameraError::PermissionDenied(device_path.to_string())
            }
            _ if e.raw_os_error() == Some(16) => CameraError::DeviceBusy,
            _ => CameraError::DeviceNotFound(format!("{device_path}: {e}")),
        })?;

        let caps = device.query_caps().map_err(|e| {
            CameraError::CaptureFailed(format!("failed to query capabilities: {e}"))
        })?;

        tracing::info!(
            device = device_path,
            driver = %caps.driver,
            card = %caps.card,
            "opened camera"
        );

        if !caps.capabilities.contains(v4l::capability::Flags::VIDEO_CAPTURE) {
            return Err(CameraError::StreamingNotSupported);
        }

        let mut fmt = device.format().map_err(|e| {
            CameraError::FormatNegotiationFailed(format!("failed to get format: {e}"))
        })?;
        fmt.fourcc = FourCC::new(b"YUYV");
        fmt.width = width;
        fmt.height = height;

        let negotiated = device.set_format(&fmt).map_err(|e| {
            CameraError::FormatNegotiationFailed(format!("failed to set format: {e}"))
        })?;

        let fourcc = negotiated.fourcc;
        let pixel_format = if fourcc == FourCC::new(b"YUYV") {
            PixelFormat::Yuyv
        } else if fourcc == FourCC::new(b"RGB3") {
            PixelFormat::Rgb24
        } else {
            return Err(CameraError::FormatNegotiationFailed(format!(
                "unsupported pixel format: {fourcc:?} (need YUYV or RGB3)"
            )));
        };

        tracing::info!(
            width = negotiated.width,
            height = negotiated.height,
            stride = negotiated.stride,
            fourcc = ?fourcc,
            "negotiated format"
        );

        Ok(Self {
            device,
            width: negotiated.width,
            height: negotiated.height,
            device_path: device_path.to_string(),
            fourcc,
            pixel_format,
            stride: negotiated.stride,
        })
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    /// Start a memory-mapped capture stream. Streaming stops when it drops.
    pub fn stream(&self) -> Result<MmapStream<'static>, CameraError> {
        MmapStream::with_buffers(&self.device, BufType::VideoCapture, 4)
            .map_err(|e| CameraError::CaptureFailed(format!("failed to create mmap stream: {e}")))
    }

    /// Dequeue one buffer from `stream` and convert it to RGBA.
    pub fn read_frame(&self, stream: &mut MmapStream<'static>) -> Result<Frame, CameraError> {
        let (buf, meta) = stream
            .next()
            .map_err(|e| CameraError::CaptureFailed(format!("failed to dequeue buffer: {e}")))?;
        let image = self.to_rgba(buf)?;
        Ok(Frame::new(image, meta.sequence))
    }

    fn to_rgba(&self, buf: &[u8]) -> Result<RgbaImage, FrameError> {
        match self.pixel_format {
            PixelFormat::Yuyv => frame::yuyv_to_rgba_strided(buf, self.width, self.height, self.stride),
            PixelFormat::Rgb24 => frame::rgb24_to_rgba_strided(buf, self.width, self.height, self.stride),
        }
    }

    /// List available V4L2 video capture devices.
    pub fn list_devices() -> Vec<DeviceInfo> {
        let mut devices = Vec::new();

        for i in 0..16 {
            let path = format!("/dev/video{i}");
            if !Path::new(&path).exists() {
                continue;
            }
            let Ok(dev) = Device::with_path(&path) else {
                continue;
            };
            let Ok(caps) = dev.query_caps() else {
                continue;
            };
            if !caps.capabilities.contains(v4l::capability::Flags::VIDEO_CAPTURE) {
                continue;
            }
            devices.push(DeviceInfo {
                path,
                name: caps.card.clone(),
                driver: caps.driver.clone(),
                bus: caps.bus.clone(),
            });
        }

        devices
    }
}

struct ActiveStream {
    // Declared first so streaming stops before the device closes.
    stream: MmapStream<'static>,
    camera: Camera,
    facing: FacingMode,
}

/// A V4L2 source with one device node per facing mode.
pub struct V4lSource {
    user_device: String,
    environment_device: String,
    width: u32,
    height: u32,
    active: Option<ActiveStream>,
}

impl V4lSource {
    pub fn new(
        user_device: impl Into<String>,
        environment_device: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            user_device: user_device.into(),
            environment_device: environment_device.into(),
            width,
            height,
            active: None,
        }
    }

    pub fn device_for(&self, facing: FacingMode) -> &str {
        match facing {
            FacingMode::User => &self.user_device,
            FacingMode::Environment => &self.environment_device,
        }
    }

    /// Facing mode of the running stream, if any.
    pub fn facing(&self) -> Option<FacingMode> {
        self.active.as_ref().map(|active| active.facing)
    }
}

impl VideoSource for V4lSource {
    fn start(&mut self, facing: FacingMode) -> Result<(), CameraError> {
        self.stop();
        let path = self.device_for(facing).to_string();
        let camera = Camera::open(&path, self.width, self.height)?;
        let stream = camera.stream()?;
        tracing::info!(device = %path, %facing, "camera stream started");
        self.active = Some(ActiveStream { stream, camera, facing });
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::info!(device = %active.camera.device_path, "camera stream stopped");
        }
    }

    fn is_streaming(&self) -> bool {
        self.active.is_some()
    }

    fn next_frame(&mut self) -> Result<Frame, CameraError> {
        let active = self.active.as_mut().ok_or(CameraError::NotStreaming)?;
        active.camera.read_frame(&mut active.stream)
    }
}

/// Serves one image as every frame, for either facing mode.
pub struct StillSource {
    image: RgbaImage,
    streaming: bool,
    sequence: u32,
}

impl StillSource {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image,
            streaming: false,
            sequence: 0,
        }
    }

    /// Decode an image file.
    pub fn open(path: &Path) -> Result<Self, CameraError> {
        if !path.exists() {
            return Err(CameraError::DeviceNotFound(path.display().to_string()));
        }
        let image = image::open(path)
            .map_err(|e| CameraError::CaptureFailed(format!("{}: {e}", path.display())))?
            .to_rgba8();
        tracing::debug!(path = %path.display(), width = image.width(), height = image.height(), "loaded still image");
        Ok(Self::new(image))
    }
}

impl VideoSource for StillSource {
    fn start(&mut self, _facing: FacingMode) -> Result<(), CameraError> {
        self.streaming = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.streaming = false;
    }

    fn is_streaming(&self) -> bool {
        self.streaming
    }

    fn next_frame(&mut self) -> Result<Frame, CameraError> {
        if !self.streaming {
            return Err(CameraError::NotStreaming);
        }
        let frame = Frame::new(self.image.clone(), self.sequence);
        self.sequence = self.sequence.wrapping_add(1);
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_facing_mode_toggle_and_parse() {
        assert_eq!(FacingMode::default(), FacingMode::User);
        assert_eq!(FacingMode::User.toggled(), FacingMode::Environment);
        assert_eq!(FacingMode::Environment.toggled().toggled(), FacingMode::Environment);

        assert_eq!("user".parse::<FacingMode>().unwrap(), FacingMode::User);
        assert_eq!(" Environment ".parse::<FacingMode>().unwrap(), FacingMode::Environment);
        assert_eq!("back".parse::<FacingMode>().unwrap(), FacingMode::Environment);
        assert!("sideways".parse::<FacingMode>().is_err());
        assert_eq!(FacingMode::Environment.to_string(), "environment");
    }

    #[test]
    fn test_still_source_lifecycle() {
        let image = RgbaImage::from_pixel(4, 2, Rgba([9, 8, 7, 255]));
        let mut source = StillSource::new(image.clone());
        assert!(matches!(source.next_frame(), Err(CameraError::NotStreaming)));

        source.start(FacingMode::Environment).unwrap();
        assert!(source.is_streaming());
        let first = source.next_frame().unwrap();
        let second = source.next_frame().unwrap();
        assert_eq!(first.image, image);
        assert_eq!((first.sequence, second.sequence), (0, 1));

        source.stop();
        source.stop();
        assert!(!source.is_streaming());
    }

    #[test]
    fn test_still_source_missing_file() {
        let result = StillSource::open(Path::new("/nonexistent/facepaint/still.png"));
        assert!(matches!(result, Err(CameraError::DeviceNotFound(_))));
    }

    #[test]
    fn test_open_missing_device() {
        let result = Camera::open("/dev/video-facepaint-missing", 640, 480);
        assert!(matches!(result, Err(CameraError::DeviceNotFound(_))));
    }

    #[test]
    fn test_v4l_source_maps_facing_to_device() {
        let mut source = V4lSource::new("/dev/facepaint-front", "/dev/facepaint-back", 640, 480);
        assert_eq!(source.device_for(FacingMode::User), "/dev/facepaint-front");
        assert_eq!(source.device_for(FacingMode::Environment), "/dev/facepaint-back");

        let err = source.start(FacingMode::Environment).unwrap_err();
        assert!(matches!(err, CameraError::DeviceNotFound(ref path) if path == "/dev/facepaint-back"));
        assert!(!source.is_streaming());
        assert_eq!(source.facing(), None);
        assert!(matches!(source.next_frame(), Err(CameraError::NotStreaming)));
    }
}
