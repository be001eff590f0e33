//! Frame type and pixel conversion from packed YUYV and RGB24 to RGBA.

use image::{Rgba, RgbaImage};

/// A captured colour camera frame.
#[derive(Clone)]
pub struct Frame {
    pub image: RgbaImage,
    pub timestamp: std::time::Instant,
    pub sequence: u32,
}

impl Frame {
    pub fn new(image: RgbaImage, sequence: u32) -> Self {
        Self {
            image,
            timestamp: std::time::Instant::now(),
            sequence,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Average BT.601 luma (0.0–255.0).
    pub fn avg_brightness(&self) -> f32 {
        let pixels = self.image.pixels().len();
        if pixels == 0 {
            return 0.0;
        }
        let sum: f32 = self
            .image
            .pixels()
            .map(|p| 0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32)
            .sum();
        sum / pixels as f32
    }
}

/// Convert packed YUYV (4:2:2) to opaque RGBA using limited-range BT.601.
///
/// YUYV packs two pixels per 4 bytes: [Y0, U, Y1, V]; both pixels share the
/// chroma pair.
pub fn yuyv_to_rgba(yuyv: &[u8], width: u32, height: u32) -> Result<RgbaImage, FrameError> {
    yuyv_to_rgba_strided(yuyv, width, height, 0)
}

/// Like [`yuyv_to_rgba`] for buffers whose rows are `stride` bytes apart.
///
/// A stride shorter than one packed row (including 0) means rows are packed.
pub fn yuyv_to_rgba_strided(
    yuyv: &[u8],
    width: u32,
    height: u32,
    stride: u32,
) -> Result<RgbaImage, FrameError> {
    if width % 2 != 0 {
        return Err(FrameError::OddWidth(width));
    }
    let row = width as usize * 2;
    let stride = check_rows(yuyv.len(), row, stride, height)?;

    let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height as usize {
        let line = &yuyv[y * stride..y * stride + row];
        for quad in line.chunks_exact(4) {
            let (y0, u, y1, v) = (quad[0], quad[1], quad[2], quad[3]);
            rgba.extend_from_slice(&bt601(y0, u, v));
            rgba.extend_from_slice(&bt601(y1, u, v));
        }
    }
    RgbaImage::from_raw(width, height, rgba).ok_or(FrameError::InvalidLength {
        expected: row * height as usize,
        actual: yuyv.len(),
    })
}

/// Convert packed 24-bit RGB to opaque RGBA.
pub fn rgb24_to_rgba(rgb: &[u8], width: u32, height: u32) -> Result<RgbaImage, FrameError> {
    rgb24_to_rgba_strided(rgb, width, height, 0)
}

/// Like [`rgb24_to_rgba`] for buffers whose rows are `stride` bytes apart.
pub fn rgb24_to_rgba_strided(
    rgb: &[u8],
    width: u32,
    height: u32,
    stride: u32,
) -> Result<RgbaImage, FrameError> {
    let row = width as usize * 3;
    let stride = check_rows(rgb.len(), row, stride, height)?;
    Ok(RgbaImage::from_fn(width, height, |x, y| {
        let i = y as usize * stride + x as usize * 3;
        Rgba([rgb[i], rgb[i + 1], rgb[i + 2], u8::MAX])
    }))
}

/// Effective row pitch, after checking `len` covers every row. The last row
/// may omit its padding.
fn check_rows(len: usize, row: usize, stride: u32, height: u32) -> Result<usize, FrameError> {
    let stride = (stride as usize).max(row);
    let expected = match height as usize {
        0 => 0,
        h => stride * (h - 1) + row,
    };
    if len < expected {
        return Err(FrameError::InvalidLength {
            expected,
            actual: len,
        });
    }
    Ok(stride)
}

fn bt601(y: u8, u: u8, v: u8) -> [u8; 4] {
    let c = y as i32 - 16;
    let d = u as i32 - 128;
    let e = v as i32 - 128;
    let clamp = |value: i32| (value >> 8).clamp(0, 255) as u8;
    [
        clamp(298 * c + 409 * e + 128),
        clamp(298 * c - 100 * d - 208 * e + 128),
        clamp(298 * c + 516 * d + 128),
        u8::MAX,
    ]
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid buffer length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("YUYV needs an even width, got {0}")]
    OddWidth(u32),
}
