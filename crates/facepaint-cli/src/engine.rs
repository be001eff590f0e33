use std::path::PathBuf;
use std::time::{Duration, Instant};

use facepaint_core::capture::PhotoSummary;
use facepaint_core::{FilterId, LandmarkProvider};
use facepaint_hw::FacingMode;
use thiserror::Error;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, oneshot};

use crate::session::{Session, SessionError, SessionState, SessionStatus};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Session(#[from] SessionError),
    #[error("failed to spawn engine thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("engine thread exited")]
    ChannelClosed,
}

/// Engine thread settings.
pub struct EngineOptions {
    pub frame_interval: Duration,
    pub photo_dir: PathBuf,
    /// Write the canvas here about once a second.
    pub preview: Option<PathBuf>,
}

/// Messages sent from the console to the engine thread.
enum EngineRequest {
    Start {
        reply: oneshot::Sender<Result<SessionStatus, EngineError>>,
    },
    SetFilter {
        filter: FilterId,
        reply: oneshot::Sender<()>,
    },
    Capture {
        reply: oneshot::Sender<Result<PhotoSummary, EngineError>>,
    },
    Save {
        index: Option<usize>,
        reply: oneshot::Sender<Result<PathBuf, EngineError>>,
    },
    ToggleCamera {
        reply: oneshot::Sender<Result<FacingMode, EngineError>>,
    },
    Pause {
        reply: oneshot::Sender<()>,
    },
    Resume {
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    Status {
        reply: oneshot::Sender<SessionStatus>,
    },
    Shutdown {
        reply: oneshot::Sender<SessionStatus>,
    },
}

/// Clone-safe handle to the engine thread.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineRequest>,
}

impl EngineHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> EngineRequest,
    ) -> Result<T, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build(reply_tx))
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        reply_rx.await.map_err(|_| EngineError::ChannelClosed)
    }

    /// Reacquire the camera after it was lost. No-op while running or paused.
    pub async fn start(&self) -> Result<SessionStatus, EngineError> {
        self.request(|reply| EngineRequest::Start { reply }).await?
    }

    /// Select the filter drawn from the next frame on.
    pub async fn set_filter(&self, filter: FilterId) -> Result<(), EngineError> {
        self.request(|reply| EngineRequest::SetFilter { filter, reply }).await
    }

    /// Append the current canvas to the gallery.
    pub async fn capture(&self) -> Result<PhotoSummary, EngineError> {
        self.request(|reply| EngineRequest::Capture { reply }).await?
    }

    /// Write a photo as PNG into the photo directory; latest when `index` is `None`.
    pub async fn save(&self, index: Option<usize>) -> Result<PathBuf, EngineError> {
        self.request(|reply| EngineRequest::Save { index, reply }).await?
    }

    pub async fn toggle_camera(&self) -> Result<FacingMode, EngineError> {
        self.request(|reply| EngineRequest::ToggleCamera { reply }).await?
    }

    pub async fn pause(&self) -> Result<(), EngineError> {
        self.request(|reply| EngineRequest::Pause { reply }).await
    }

    pub async fn resume(&self) -> Result<(), EngineError> {
        self.request(|reply| EngineRequest::Resume { reply }).await?
    }

    pub async fn status(&self) -> Result<SessionStatus, EngineError> {
        self.request(|reply| EngineRequest::Status { reply }).await
    }

    /// Stop the camera and end the thread. Returns the final status.
    pub async fn shutdown(&self) -> Result<SessionStatus, EngineError> {
        self.request(|reply| EngineRequest::Shutdown { reply }).await
    }
}

/// Spawn the engine on a dedicated OS thread.
///
/// Starts the camera first and fails fast if it cannot be acquired. The
/// thread then alternates between draining requests and rendering one frame
/// per interval.
pub fn spawn_engine(
    mut session: Session,
    mut provider: Box<dyn LandmarkProvider>,
    options: EngineOptions,
) -> Result<EngineHandle, EngineError> {
    session.start()?;

    let (tx, mut rx) = mpsc::channel::<EngineRequest>(8);

    std::thread::Builder::new()
        .name("facepaint-engine".into())
        .spawn(move || {
            tracing::info!(interval_ms = options.frame_interval.as_millis() as u64, "engine thread started");
            let mut last_preview = Instant::now();
            'run: loop {
                let tick_started = Instant::now();
                loop {
                    match rx.try_recv() {
                        Ok(req) => {
                            if handle_request(&mut session, &options, req) == Flow::Stop {
                                break 'run;
                            }
                        }
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => {
                            session.stop();
                            break 'run;
                        }
                    }
                }

                if session.state() == SessionState::Running {
                    if let Err(err) = session.tick(provider.as_mut()) {
                        tracing::warn!(error = %err, "frame skipped");
                    }
                    if let Some(path) = &options.preview {
                        if last_preview.elapsed() >= Duration::from_secs(1) {
                            last_preview = Instant::now();
                            if let Err(err) = session.snapshot().save(path) {
                                tracing::warn!(error = %err, path = %path.display(), "preview write failed");
                            }
                        }
                    }
                }

                std::thread::sleep(options.frame_interval.saturating_sub(tick_started.elapsed()));
            }
            tracing::info!("engine thread exiting");
        })?;

    Ok(EngineHandle { tx })
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

fn handle_request(session: &mut Session, options: &EngineOptions, req: EngineRequest) -> Flow {
    match req {
        EngineRequest::Start { reply } => {
            let result = session.start().map(|()| session.status()).map_err(EngineError::from);
            let _ = reply.send(result);
        }
        EngineRequest::SetFilter { filter, reply } => {
            session.set_filter(filter);
            let _ = reply.send(());
        }
        EngineRequest::Capture { reply } => {
            let result = session.capture().map_err(EngineError::from).and_then(|index| {
                session
                    .photo_summary(index)
                    .ok_or(EngineError::Session(SessionError::NothingRendered))
            });
            let _ = reply.send(result);
        }
        EngineRequest::Save { index, reply } => {
            let _ = reply.send(session.save(index, &options.photo_dir).map_err(EngineError::from));
        }
        EngineRequest::ToggleCamera { reply } => {
            let _ = reply.send(session.toggle_camera().map_err(EngineError::from));
        }
        EngineRequest::Pause { reply } => {
            session.pause();
            let _ = reply.send(());
        }
        EngineRequest::Resume { reply } => {
            let _ = reply.send(session.resume().map_err(EngineError::from));
        }
        EngineRequest::Status { reply } => {
            let _ = reply.send(session.status());
        }
        EngineRequest::Shutdown { reply } => {
            session.stop();
            let _ = reply.send(session.status());
            return Flow::Stop;
        }
    }
    Flow::Continue
}

#[cfg(test)]
mod tests {
    use facepaint_core::{Canvas, StaticProvider};
    use facepaint_hw::StillSource;
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::session::tests::{still_session, ScriptedSource};

    fn options(dir: PathBuf) -> EngineOptions {
        EngineOptions {
            frame_interval: Duration::from_millis(5),
            photo_dir: dir,
            preview: None,
        }
    }

    async fn wait_for_frames(handle: &EngineHandle) -> SessionStatus {
        for _ in 0..400 {
            let status = handle.status().await.unwrap();
            if status.frames_rendered > 0 {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("engine rendered no frames");
    }

    #[tokio::test]
    async fn test_engine_capture_and_save() {
        let dir = std::env::temp_dir().join(format!("facepaint-engine-{}", std::process::id()));
        let handle = spawn_engine(
            still_session(),
            Box::new(StaticProvider::default()),
            options(dir.clone()),
        )
        .unwrap();

        handle.set_filter("crown".into()).await.unwrap();
        let before = handle.status().await.unwrap().frames_rendered;
        for _ in 0..400 {
            if handle.status().await.unwrap().frames_rendered > before {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let summary = handle.capture().await.unwrap();
        assert_eq!(summary.filter.as_str(), "crown");
        assert_eq!((summary.width, summary.height), (160, 120));

        let path = handle.save(None).await.unwrap();
        assert!(path.starts_with(&dir));
        assert!(path.exists());

        let status = handle.shutdown().await.unwrap();
        assert_eq!(status.state, SessionState::Idle);
        assert_eq!(status.photos, 1);
        assert!(matches!(handle.status().await, Err(EngineError::ChannelClosed)));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_engine_pause_resume_toggle() {
        let handle = spawn_engine(
            still_session(),
            Box::new(StaticProvider::default()),
            options(std::env::temp_dir()),
        )
        .unwrap();
        wait_for_frames(&handle).await;

        handle.pause().await.unwrap();
        assert_eq!(handle.status().await.unwrap().state, SessionState::Paused);
        // Toggling is ignored while paused.
        assert_eq!(handle.toggle_camera().await.unwrap(), FacingMode::User);

        handle.resume().await.unwrap();
        assert_eq!(handle.toggle_camera().await.unwrap(), FacingMode::Environment);
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_engine_restarts_after_camera_lost() {
        // Start ok, toggle and its fallback both denied, then a manual start.
        let (source, starts) = ScriptedSource::new(&[Ok(()), Err(()), Err(())]);
        let session = Session::new(
            Box::new(source),
            Canvas::new(16, 16).unwrap(),
            FacingMode::User,
            Some(0),
        );
        let handle = spawn_engine(session, Box::new(StaticProvider::default()), options(std::env::temp_dir()))
            .unwrap();
        wait_for_frames(&handle).await;

        assert!(handle.toggle_camera().await.is_err());
        assert_eq!(handle.status().await.unwrap().state, SessionState::Idle);
        assert!(matches!(
            handle.capture().await,
            Err(EngineError::Session(SessionError::NotRunning))
        ));

        let status = handle.start().await.unwrap();
        assert_eq!(status.state, SessionState::Running);
        assert_eq!(status.facing, FacingMode::User);
        assert_eq!(starts.lock().unwrap().len(), 4);
        wait_for_frames(&handle).await;
        handle.capture().await.unwrap();
        handle.shutdown().await.unwrap();
    }

    #[test]
    fn test_spawn_fails_fast_when_camera_denied() {
        let (source, _starts) = ScriptedSource::new(&[Err(())]);
        let session = Session::new(
            Box::new(source),
            Canvas::new(8, 8).unwrap(),
            FacingMode::User,
            Some(0),
        );
        let result = spawn_engine(session, Box::new(StaticProvider::default()), options(std::env::temp_dir()));
        assert!(matches!(result, Err(EngineError::Session(SessionError::Camera(_)))));
    }

    #[test]
    fn test_still_source_session_is_send() {
        fn assert_send<T: Send>(_: &T) {}
        let source = StillSource::new(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255])));
        let session = Session::new(Box::new(source), Canvas::new(2, 2).unwrap(), FacingMode::User, None);
        assert_send(&session);
    }
}
