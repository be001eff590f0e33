//! Frame loop controller: owns the video source, canvas and photo gallery.

use std::path::{Path, PathBuf};
use std::time::Instant;

use facepaint_core::capture::PhotoSummary;
use facepaint_core::{
    render_frame, Canvas, CanvasError, CaptureError, FilterId, FrameOutcome, FrameTime,
    LandmarkProvider, PhotoGallery, PhotoRecord, ProviderError,
};
use facepaint_hw::{CameraError, FacingMode, VideoSource};
use image::RgbaImage;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("camera error: {0}")]
    Camera(#[from] CameraError),
    #[error("canvas error: {0}")]
    Canvas(#[from] CanvasError),
    #[error("landmark provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),
    #[error("session is not running")]
    NotRunning,
    #[error("no frame rendered yet")]
    NothingRendered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Not started, or the camera was lost.
    Idle,
    Running,
    /// Acquisition stopped while hidden; renderer state is kept.
    Paused,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub state: SessionState,
    pub filter: FilterId,
    pub facing: FacingMode,
    pub frames_rendered: u64,
    pub face_present: bool,
    pub photos: usize,
}

pub struct Session {
    source: Box<dyn VideoSource>,
    canvas: Canvas,
    filter: FilterId,
    facing: FacingMode,
    state: SessionState,
    gallery: PhotoGallery,
    rng: StdRng,
    clock: Option<Instant>,
    frames_rendered: u64,
    last_outcome: Option<FrameOutcome>,
}

impl Session {
    pub fn new(
        source: Box<dyn VideoSource>,
        canvas: Canvas,
        facing: FacingMode,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            source,
            canvas,
            filter: FilterId::none(),
            facing,
            state: SessionState::Idle,
            gallery: PhotoGallery::new(),
            rng,
            clock: None,
            frames_rendered: 0,
            last_outcome: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    pub fn filter(&self) -> &FilterId {
        &self.filter
    }

    pub fn gallery(&self) -> &PhotoGallery {
        &self.gallery
    }

    /// Acquire the camera for the current facing mode.
    ///
    /// A failure leaves the session idle; calling again is a fresh attempt.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Ok(());
        }
        if let Err(err) = self.source.start(self.facing) {
            tracing::warn!(error = %err, facing = %self.facing, "camera start failed");
            return Err(err.into());
        }
        self.clock.get_or_insert_with(Instant::now);
        self.frames_rendered = 0;
        self.last_outcome = None;
        self.state = SessionState::Running;
        tracing::info!(facing = %self.facing, filter = %self.filter, "session started");
        Ok(())
    }

    /// Release the camera and return to idle.
    pub fn stop(&mut self) {
        self.source.stop();
        if self.state != SessionState::Idle {
            tracing::info!(frames = self.frames_rendered, "session stopped");
        }
        self.state = SessionState::Idle;
    }

    /// Select the filter for the next tick.
    pub fn set_filter(&mut self, filter: FilterId) {
        tracing::info!(from = %self.filter, to = %filter, "filter changed");
        self.filter = filter;
    }

    /// Switch to the other camera, reverting once on failure.
    ///
    /// Returns the facing mode now in use. If neither camera starts the
    /// session drops to idle and the fallback error is returned.
    pub fn toggle_camera(&mut self) -> Result<FacingMode, SessionError> {
        if self.state != SessionState::Running {
            return Ok(self.facing);
        }

        self.source.stop();
        let previous = self.facing;
        self.facing = previous.toggled();
        let err = match self.source.start(self.facing) {
            Ok(()) => {
                tracing::info!(facing = %self.facing, "camera toggled");
                return Ok(self.facing);
            }
            Err(err) => err,
        };

        tracing::warn!(error = %err, facing = %self.facing, "camera toggle failed; reverting");
        self.facing = previous;
        if let Err(err) = self.source.start(self.facing) {
            tracing::warn!(error = %err, facing = %self.facing, "camera fallback failed");
            self.state = SessionState::Idle;
            return Err(err.into());
        }
        Ok(self.facing)
    }

    pub fn pause(&mut self) {
        if self.state == SessionState::Running {
            self.source.stop();
            self.state = SessionState::Paused;
            tracing::debug!("session paused");
        }
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Paused {
            return Ok(());
        }
        if let Err(err) = self.source.start(self.facing) {
            tracing::warn!(error = %err, "camera resume failed");
            self.state = SessionState::Idle;
            return Err(err.into());
        }
        self.state = SessionState::Running;
        tracing::debug!("session resumed");
        Ok(())
    }

    /// Render the next camera frame, timed from session start.
    pub fn tick(&mut self, provider: &mut dyn LandmarkProvider) -> Result<FrameOutcome, SessionError> {
        let millis = self
            .clock
            .map(|start| start.elapsed().as_secs_f64() * 1000.0)
            .unwrap_or(0.0);
        self.tick_at(provider, FrameTime::from_millis(millis))
    }

    pub fn tick_at(
        &mut self,
        provider: &mut dyn LandmarkProvider,
        time: FrameTime,
    ) -> Result<FrameOutcome, SessionError> {
        if self.state != SessionState::Running {
            return Err(SessionError::NotRunning);
        }
        let frame = self.source.next_frame()?;
        let landmarks = provider.detect(&frame.image)?;
        let outcome = render_frame(
            &mut self.canvas,
            &frame.image,
            landmarks.as_ref(),
            &self.filter,
            time,
            &mut self.rng,
        )?;
        self.frames_rendered += 1;
        self.last_outcome = Some(outcome);
        tracing::debug!(
            seq = frame.sequence,
            face = outcome.face_present,
            drawn = ?outcome.drawn,
            "frame rendered"
        );
        Ok(outcome)
    }

    /// Store the current canvas with the active filter. Returns the photo index.
    ///
    /// Refused while idle: the canvas may hold a frame from a lost camera.
    pub fn capture(&mut self) -> Result<usize, SessionError> {
        if self.state == SessionState::Idle {
            return Err(SessionError::NotRunning);
        }
        if self.last_outcome.is_none() {
            return Err(SessionError::NothingRendered);
        }
        let photo = PhotoRecord::from_canvas(&self.canvas, self.filter.clone());
        Ok(self.gallery.push(photo))
    }

    pub fn photo_summary(&self, index: usize) -> Option<PhotoSummary> {
        self.gallery.get(index).map(PhotoRecord::summary)
    }

    /// Write photo `index` (latest when `None`) into `dir`.
    pub fn save(&self, index: Option<usize>, dir: &Path) -> Result<PathBuf, SessionError> {
        let index = match index {
            Some(index) => index,
            None => self
                .gallery
                .len()
                .checked_sub(1)
                .ok_or(CaptureError::NoSuchPhoto(0))?,
        };
        Ok(self.gallery.save(index, dir)?)
    }

    pub fn snapshot(&self) -> RgbaImage {
        self.canvas.snapshot()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            state: self.state,
            filter: self.filter.clone(),
            facing: self.facing,
            frames_rendered: self.frames_rendered,
            face_present: self.last_outcome.is_some_and(|outcome| outcome.face_present),
            photos: self.gallery.len(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use facepaint_core::{Filter, LandmarkSet, NoFaceProvider, StaticProvider};
    use facepaint_hw::{Frame, StillSource};
    use image::Rgba;

    use super::*;

    /// Scripted source: each `start` pops the next outcome (success when the
    /// script runs out) and records the facing mode asked for.
    pub(crate) struct ScriptedSource {
        pub outcomes: VecDeque<Result<(), ()>>,
        pub starts: Arc<Mutex<Vec<FacingMode>>>,
        streaming: bool,
    }

    impl ScriptedSource {
        pub(crate) fn new(outcomes: &[Result<(), ()>]) -> (Self, Arc<Mutex<Vec<FacingMode>>>) {
            let starts = Arc::new(Mutex::new(Vec::new()));
            let source = Self {
                outcomes: outcomes.iter().copied().collect(),
                starts: Arc::clone(&starts),
                streaming: false,
            };
            (source, starts)
        }
    }

    impl VideoSource for ScriptedSource {
        fn start(&mut self, facing: FacingMode) -> Result<(), CameraError> {
            self.starts.lock().unwrap().push(facing);
            match self.outcomes.pop_front().unwrap_or(Ok(())) {
                Ok(()) => {
                    self.streaming = true;
                    Ok(())
                }
                Err(()) => Err(CameraError::PermissionDenied(facing.to_string())),
            }
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
            Ok(Frame::new(RgbaImage::from_pixel(160, 120, Rgba([90, 90, 90, 255])), 0))
        }
    }

    pub(crate) fn still_session() -> Session {
        let source = StillSource::new(RgbaImage::from_pixel(160, 120, Rgba([120, 110, 100, 255])));
        Session::new(Box::new(source), Canvas::new(160, 120).unwrap(), FacingMode::User, Some(3))
    }

    fn scripted(outcomes: &[Result<(), ()>]) -> (Session, Arc<Mutex<Vec<FacingMode>>>) {
        let (source, starts) = ScriptedSource::new(outcomes);
        let session = Session::new(Box::new(source), Canvas::new(160, 120).unwrap(), FacingMode::User, Some(1));
        (session, starts)
    }

    #[test]
    fn test_start_failure_stays_idle_without_retry() {
        let (mut session, starts) = scripted(&[Err(()), Err(())]);

        assert!(matches!(session.start(), Err(SessionError::Camera(CameraError::PermissionDenied(_)))));
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(starts.lock().unwrap().len(), 1);

        // A second manual attempt is its own single try.
        assert!(session.start().is_err());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(starts.lock().unwrap().len(), 2);

        session.start().unwrap();
        assert_eq!(session.state(), SessionState::Running);
    }

    #[test]
    fn test_toggle_switches_facing() {
        let (mut session, starts) = scripted(&[]);
        session.start().unwrap();
        assert_eq!(session.toggle_camera().unwrap(), FacingMode::Environment);
        assert_eq!(session.facing(), FacingMode::Environment);
        assert_eq!(
            *starts.lock().unwrap(),
            vec![FacingMode::User, FacingMode::Environment]
        );
    }

    #[test]
    fn test_toggle_failure_reverts_and_retries_once() {
        let (mut session, starts) = scripted(&[Ok(()), Err(())]);
        session.start().unwrap();

        assert_eq!(session.toggle_camera().unwrap(), FacingMode::User);
        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(
            *starts.lock().unwrap(),
            vec![FacingMode::User, FacingMode::Environment, FacingMode::User]
        );
    }

    #[test]
    fn test_toggle_double_failure_drops_to_idle() {
        let (mut session, starts) = scripted(&[Ok(()), Err(()), Err(())]);
        session.start().unwrap();

        assert!(session.toggle_camera().is_err());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.facing(), FacingMode::User);
        assert_eq!(starts.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_capture_refused_after_camera_lost() {
        let (mut session, _starts) = scripted(&[Ok(()), Err(()), Err(())]);
        session.start().unwrap();
        session.tick_at(&mut StaticProvider::default(), FrameTime::ZERO).unwrap();
        assert!(session.toggle_camera().is_err());

        assert!(matches!(session.capture(), Err(SessionError::NotRunning)));
        assert!(session.gallery().is_empty());

        // A manual restart needs a fresh frame before capturing.
        session.start().unwrap();
        assert!(matches!(session.capture(), Err(SessionError::NothingRendered)));
        session.tick_at(&mut StaticProvider::default(), FrameTime::ZERO).unwrap();
        assert_eq!(session.capture().unwrap(), 0);
    }

    #[test]
    fn test_capture_allowed_while_paused() {
        let mut session = still_session();
        session.start().unwrap();
        session.tick_at(&mut StaticProvider::default(), FrameTime::ZERO).unwrap();
        session.pause();
        assert_eq!(session.capture().unwrap(), 0);
    }

    #[test]
    fn test_toggle_when_idle_is_noop() {
        let (mut session, starts) = scripted(&[]);
        assert_eq!(session.toggle_camera().unwrap(), FacingMode::User);
        assert!(starts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_pause_resume_keeps_renderer_state() {
        let mut session = still_session();
        let mut provider = StaticProvider::default();
        session.start().unwrap();
        session.set_filter("crown".into());
        session.tick_at(&mut provider, FrameTime::ZERO).unwrap();
        session.capture().unwrap();

        session.pause();
        assert_eq!(session.state(), SessionState::Paused);
        assert!(matches!(session.tick_at(&mut provider, FrameTime::ZERO), Err(SessionError::NotRunning)));

        session.resume().unwrap();
        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(session.filter().as_str(), "crown");
        assert_eq!(session.gallery().len(), 1);
    }

    #[test]
    fn test_capture_requires_a_rendered_frame() {
        let mut session = still_session();
        assert!(matches!(session.capture(), Err(SessionError::NotRunning)));
        session.start().unwrap();
        assert!(matches!(session.capture(), Err(SessionError::NothingRendered)));
    }

    #[test]
    fn test_capture_records_active_filter_and_canvas() {
        let mut session = still_session();
        let mut provider = StaticProvider::new(LandmarkSet::neutral());
        session.start().unwrap();
        session.set_filter("crown".into());
        let outcome = session.tick_at(&mut provider, FrameTime::from_millis(250.0)).unwrap();
        assert_eq!(outcome.drawn, Some(Filter::Crown));

        let index = session.capture().unwrap();
        let photo = session.gallery().get(index).unwrap();
        assert_eq!(photo.filter().as_str(), "crown");
        assert_eq!(photo.image(), &session.snapshot());
        assert_eq!(session.photo_summary(index).unwrap().filter.as_str(), "crown");
    }

    #[test]
    fn test_filter_change_applies_next_tick() {
        let mut session = still_session();
        let mut provider = StaticProvider::default();
        session.start().unwrap();
        session.set_filter("sunglasses".into());
        assert_eq!(session.tick_at(&mut provider, FrameTime::ZERO).unwrap().drawn, Some(Filter::Sunglasses));
        session.set_filter(FilterId::none());
        assert_eq!(session.tick_at(&mut provider, FrameTime::ZERO).unwrap().drawn, None);
    }

    #[test]
    fn test_no_face_passthrough_status() {
        let mut session = still_session();
        session.start().unwrap();
        session.set_filter("pirate".into());
        let outcome = session.tick_at(&mut NoFaceProvider, FrameTime::ZERO).unwrap();
        assert!(!outcome.face_present);
        assert_eq!(session.snapshot().get_pixel(80, 60).0, [120, 110, 100, 255]);

        let status = session.status();
        assert_eq!(status.frames_rendered, 1);
        assert!(!status.face_present);
        assert_eq!(status.state, SessionState::Running);
    }

    #[test]
    fn test_save_latest() {
        let dir = std::env::temp_dir().join(format!("facepaint-session-{}", std::process::id()));
        let mut session = still_session();
        assert!(matches!(
            session.save(None, &dir),
            Err(SessionError::Capture(CaptureError::NoSuchPhoto(0)))
        ));

        session.start().unwrap();
        session.tick_at(&mut StaticProvider::default(), FrameTime::ZERO).unwrap();
        session.capture().unwrap();
        let path = session.save(None, &dir).unwrap();
        assert!(path.exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
