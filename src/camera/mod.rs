//! Camera boundary.
//!
//! The interview only needs "start the feed, grab the current frame, stop".
//! [`StillImageCamera`] serves a fixed image file as its frame, which is
//! enough for console runs; [`NoCamera`] stands in when there is none.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use crate::error::CameraError;

/// A captured still frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    pub mime: String,
    pub data: Vec<u8>,
}

impl CapturedImage {
    pub fn png(data: Vec<u8>) -> Self {
        Self {
            mime: "image/png".to_string(),
            data,
        }
    }

    /// `data:<mime>;base64,...` form, as embedded by image tags.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.data))
    }
}

/// Camera capability.
#[async_trait]
pub trait Camera: Send + Sync {
    async fn start_stream(&self) -> Result<(), CameraError>;

    async fn stop_stream(&self) -> Result<(), CameraError>;

    /// Capture the current frame. The stream must be running.
    async fn capture_frame(&self) -> Result<CapturedImage, CameraError>;
}

/// A camera whose "feed" is a single image file.
pub struct StillImageCamera {
    path: PathBuf,
    streaming: AtomicBool,
}

impl StillImageCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            streaming: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

#[async_trait]
impl Camera for StillImageCamera {
    async fn start_stream(&self) -> Result<(), CameraError> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Err(CameraError::Unavailable);
        }
        self.streaming.store(true, Ordering::SeqCst);
        debug!(path = %self.path.display(), "Camera stream started");
        Ok(())
    }

    async fn stop_stream(&self) -> Result<(), CameraError> {
        self.streaming.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn capture_frame(&self) -> Result<CapturedImage, CameraError> {
        if !self.streaming.load(Ordering::SeqCst) {
            return Err(CameraError::NotStreaming);
        }
        let data = tokio::fs::read(&self.path).await?;
        if data.is_empty() {
            return Err(CameraError::CaptureFailed("empty frame".to_string()));
        }
        Ok(CapturedImage {
            mime: mime_for(&self.path).to_string(),
            data,
        })
    }
}

/// No camera present.
pub struct NoCamera;

#[async_trait]
impl Camera for NoCamera {
    async fn start_stream(&self) -> Result<(), CameraError> {
        Err(CameraError::Unavailable)
    }

    async fn stop_stream(&self) -> Result<(), CameraError> {
        Ok(())
    }

    async fn capture_frame(&self) -> Result<CapturedImage, CameraError> {
        Err(CameraError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_encodes_bytes() {
        let image = CapturedImage::png(vec![0x89, b'P', b'N', b'G']);
        assert_eq!(image.to_data_url(), "data:image/png;base64,iVBORw==");
    }

    #[tokio::test]
    async fn still_image_requires_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.jpg");
        std::fs::write(&path, b"jpegdata").unwrap();

        let camera = StillImageCamera::new(&path);
        assert!(matches!(
            camera.capture_frame().await,
            Err(CameraError::NotStreaming)
        ));

        camera.start_stream().await.unwrap();
        let frame = camera.capture_frame().await.unwrap();
        assert_eq!(frame.mime, "image/jpeg");
        assert_eq!(frame.data, b"jpegdata");

        camera.stop_stream().await.unwrap();
        assert!(camera.capture_frame().await.is_err());
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let camera = StillImageCamera::new(dir.path().join("missing.png"));
        assert!(matches!(
            camera.start_stream().await,
            Err(CameraError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn no_camera_is_unavailable() {
        assert!(matches!(
            NoCamera.start_stream().await,
            Err(CameraError::Unavailable)
        ));
    }
}
