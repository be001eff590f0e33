//! Captured photos and the in-memory gallery they are appended to.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use image::{ImageFormat, RgbaImage};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::canvas::Canvas;
use crate::filters::FilterId;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("no photo at index {0}")]
    NoSuchPhoto(usize),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A snapshot of the canvas with the filter that produced it.
///
/// Fields are private: a record never changes after creation.
#[derive(Debug, Clone)]
pub struct PhotoRecord {
    id: Uuid,
    captured_at: DateTime<Local>,
    filter: FilterId,
    image: RgbaImage,
}

/// Serializable description of a photo, without pixels.
#[derive(Debug, Clone, Serialize)]
pub struct PhotoSummary {
    pub id: Uuid,
    pub captured_at: DateTime<Local>,
    pub filter: FilterId,
    pub width: u32,
    pub height: u32,
    pub file_name: String,
}

impl PhotoRecord {
    pub fn new(image: RgbaImage, filter: FilterId) -> Self {
        Self {
            id: Uuid::new_v4(),
            captured_at: Local::now(),
            filter,
            image,
        }
    }

    /// Capture the current canvas pixels.
    pub fn from_canvas(canvas: &Canvas, filter: FilterId) -> Self {
        Self::new(canvas.snapshot(), filter)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn captured_at(&self) -> DateTime<Local> {
        self.captured_at
    }

    pub fn filter(&self) -> &FilterId {
        &self.filter
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, CaptureError> {
        let mut bytes = Cursor::new(Vec::new());
        self.image.write_to(&mut bytes, ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }

    /// `filtered-selfie-{filter}-{unix millis}.png`
    pub fn download_name(&self) -> String {
        format!(
            "filtered-selfie-{}-{}.png",
            self.filter,
            self.captured_at.timestamp_millis()
        )
    }

    pub fn summary(&self) -> PhotoSummary {
        PhotoSummary {
            id: self.id,
            captured_at: self.captured_at,
            filter: self.filter.clone(),
            width: self.image.width(),
            height: self.image.height(),
            file_name: self.download_name(),
        }
    }
}

/// Append-only list of photos taken this session, oldest first.
#[derive(Debug, Default)]
pub struct PhotoGallery {
    photos: Vec<PhotoRecord>,
}

impl PhotoGallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `photo`, returning its index.
    pub fn push(&mut self, photo: PhotoRecord) -> usize {
        tracing::info!(id = %photo.id, filter = %photo.filter, "photo captured");
        self.photos.push(photo);
        self.photos.len() - 1
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PhotoRecord> {
        self.photos.get(index)
    }

    pub fn latest(&self) -> Option<&PhotoRecord> {
        self.photos.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhotoRecord> {
        self.photos.iter()
    }

    /// Write photo `index` as PNG into `dir` under its download name.
    pub fn save(&self, index: usize, dir: &Path) -> Result<PathBuf, CaptureError> {
        let photo = self.get(index).ok_or(CaptureError::NoSuchPhoto(index))?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(photo.download_name());
        std::fs::write(&path, photo.encode_png()?)?;
        tracing::info!(path = %path.display(), "photo saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::filters::{lookup, Filter};
    use crate::landmarks::LandmarkSet;
    use crate::pipeline::render_frame;
    use crate::scene::FrameTime;

    fn tiny(color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(4, 3, Rgba(color))
    }

    #[test]
    fn test_capture_keeps_filter_and_pixels() {
        let raw = RgbaImage::from_pixel(160, 120, Rgba([40, 90, 140, 255]));
        let landmarks = LandmarkSet::neutral();
        let mut canvas = Canvas::new(160, 120).unwrap();
        let filter = FilterId::new("crown");
        let mut rng = StdRng::seed_from_u64(1);
        render_frame(&mut canvas, &raw, Some(&landmarks), &filter, FrameTime::ZERO, &mut rng).unwrap();

        let photo = PhotoRecord::from_canvas(&canvas, filter.clone());
        assert_eq!(photo.filter(), &filter);
        assert_eq!(photo.image(), &canvas.snapshot());
        assert_eq!(lookup(photo.filter()), Some(Filter::Crown));
    }

    #[test]
    fn test_gallery_is_append_only_in_order() {
        let mut gallery = PhotoGallery::new();
        assert!(gallery.is_empty());
        assert_eq!(gallery.push(PhotoRecord::new(tiny([1, 1, 1, 255]), "sunglasses".into())), 0);
        assert_eq!(gallery.push(PhotoRecord::new(tiny([2, 2, 2, 255]), "none".into())), 1);

        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery.get(0).unwrap().filter().as_str(), "sunglasses");
        assert_eq!(gallery.latest().unwrap().filter().as_str(), "none");
        let ids: Vec<_> = gallery.iter().map(|p| p.id()).collect();
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_download_name_format() {
        let photo = PhotoRecord::new(tiny([0, 0, 0, 255]), "heart-eyes".into());
        let name = photo.download_name();
        let millis = photo.captured_at().timestamp_millis().to_string();
        assert_eq!(name, format!("filtered-selfie-heart-eyes-{millis}.png"));
    }

    #[test]
    fn test_png_roundtrip_preserves_pixels() {
        let photo = PhotoRecord::new(tiny([10, 20, 30, 255]), "none".into());
        let bytes = photo.encode_png().unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(&decoded, photo.image());
    }

    #[test]
    fn test_save_writes_png_and_rejects_bad_index() {
        let dir = std::env::temp_dir().join(format!("facepaint-capture-{}", Uuid::new_v4()));
        let mut gallery = PhotoGallery::new();
        gallery.push(PhotoRecord::new(tiny([5, 5, 5, 255]), "pirate".into()));

        let path = gallery.save(0, &dir).unwrap();
        assert!(path.exists());
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("filtered-selfie-pirate-"));
        assert!(matches!(gallery.save(3, &dir), Err(CaptureError::NoSuchPhoto(3))));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_summary_serializes() {
        let photo = PhotoRecord::new(tiny([0, 0, 0, 255]), "crown".into());
        let json = serde_json::to_value(photo.summary()).unwrap();
        assert_eq!(json["filter"], "crown");
        assert_eq!(json["width"], 4);
    }
}
