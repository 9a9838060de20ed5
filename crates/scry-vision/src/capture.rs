//! Screen capture with the documented failure policy.
//!
//! Low-level backends implement [`ScreenCapture`] and report errors through
//! [`CaptureError`]. The [`Capturer`] service on top of them is the surface
//! the rest of the system uses: it never raises, logs every failure, falls
//! back to a full-screen grab once when window capture goes wrong, and
//! persists captures for debugging when configured to.

use crate::normalize::sanitize_filename;
use crate::types::{Region, Screenshot, WindowInfo};
use crate::window::WindowQuery;
use async_trait::async_trait;
use image::DynamicImage;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors that can occur during screen capture.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("screen capture is not available in this session")]
    NotAvailable,

    #[error("failed to capture screen: {0}")]
    CaptureFailed(String),

    #[error("no primary monitor found")]
    MonitorNotFound,

    #[error("invalid region: {0}")]
    InvalidRegion(String),
}

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Trait for screen capture backends.
#[async_trait]
pub trait ScreenCapture: Send + Sync {
    /// Check whether this backend can actually reach a display.
    fn is_available(&self) -> bool;

    /// Capture the full primary display.
    async fn capture_primary(&self) -> CaptureResult<Screenshot>;

    /// Capture exactly the given rectangle, in screen coordinates.
    async fn capture_region(&self, region: Region) -> CaptureResult<Screenshot>;
}

fn crop(full: &Screenshot, region: Region) -> CaptureResult<Screenshot> {
    // Bounds math in i64 so oversized requests cannot wrap.
    let rel_x = i64::from(region.x) - i64::from(full.region.x);
    let rel_y = i64::from(region.y) - i64::from(full.region.y);
    if rel_x < 0 || rel_y < 0 {
        return Err(CaptureError::InvalidRegion(format!(
            "region {} starts outside the captured area {}",
            region, full.region
        )));
    }

    if rel_x + i64::from(region.width) > i64::from(full.width())
        || rel_y + i64::from(region.height) > i64::from(full.height())
    {
        return Err(CaptureError::InvalidRegion(format!(
            "region {} extends beyond the captured area {}",
            region, full.region
        )));
    }

    let cropped = full
        .image
        .crop_imm(rel_x as u32, rel_y as u32, region.width, region.height);
    Ok(Screenshot::new(
        cropped,
        region,
        format!("{} (cropped)", full.source),
    ))
}

/// xcap-backed capture for sessions with a real display.
#[cfg(feature = "gui-automation")]
pub mod platform {
    use super::*;

    pub struct XcapCapture;

    impl XcapCapture {
        pub fn new() -> Self {
            Self
        }
    }

    impl Default for XcapCapture {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ScreenCapture for XcapCapture {
        fn is_available(&self) -> bool {
            true
        }

        async fn capture_primary(&self) -> CaptureResult<Screenshot> {
            let monitor = xcap::Monitor::all()
                .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?
                .into_iter()
                .find(|m| m.is_primary())
                .ok_or(CaptureError::MonitorNotFound)?;

            let image = monitor
                .capture_image()
                .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;

            let region = Region::new(monitor.x(), monitor.y(), image.width(), image.height());
            let name = monitor.name().to_string();
            Ok(Screenshot::new(DynamicImage::ImageRgba8(image), region, name))
        }

        async fn capture_region(&self, region: Region) -> CaptureResult<Screenshot> {
            if !region.is_valid() {
                return Err(CaptureError::InvalidRegion(
                    "region must have positive dimensions".to_string(),
                ));
            }

            let full = self.capture_primary().await?;
            crop(&full, region)
        }
    }
}

/// Stub capture substituted when no display is reachable. Returns a
/// deterministic solid placeholder so downstream code still runs
/// end-to-end.
pub struct StubCapture;

/// Size of the placeholder frame produced by [`StubCapture`].
pub const STUB_FRAME_WIDTH: u32 = 800;
pub const STUB_FRAME_HEIGHT: u32 = 600;

/// Largest width or height [`StubCapture`] will fabricate a frame for.
pub const MAX_CAPTURE_DIMENSION: u32 = 16_384;

impl StubCapture {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StubCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScreenCapture for StubCapture {
    fn is_available(&self) -> bool {
        false
    }

    async fn capture_primary(&self) -> CaptureResult<Screenshot> {
        warn!("no display available, returning placeholder frame");
        let image = DynamicImage::new_rgb8(STUB_FRAME_WIDTH, STUB_FRAME_HEIGHT);
        let region = Region::new(0, 0, STUB_FRAME_WIDTH, STUB_FRAME_HEIGHT);
        Ok(Screenshot::new(image, region, "stub"))
    }

    async fn capture_region(&self, region: Region) -> CaptureResult<Screenshot> {
        if !region.is_valid() {
            return Err(CaptureError::InvalidRegion(
                "region must have positive dimensions".to_string(),
            ));
        }
        if region.width > MAX_CAPTURE_DIMENSION || region.height > MAX_CAPTURE_DIMENSION {
            return Err(CaptureError::InvalidRegion(format!(
                "region {region} exceeds {MAX_CAPTURE_DIMENSION}x{MAX_CAPTURE_DIMENSION}"
            )));
        }
        warn!("no display available, returning placeholder frame for region {region}");
        let image = DynamicImage::new_rgb8(region.width, region.height);
        Ok(Screenshot::new(image, region, "stub"))
    }
}

/// Select the capture backend for the probed environment.
#[cfg(feature = "gui-automation")]
pub fn create_screen_capture(has_display: bool) -> Box<dyn ScreenCapture> {
    if has_display {
        Box::new(platform::XcapCapture::new())
    } else {
        Box::new(StubCapture::new())
    }
}

#[cfg(not(feature = "gui-automation"))]
pub fn create_screen_capture(_has_display: bool) -> Box<dyn ScreenCapture> {
    Box::new(StubCapture::new())
}

/// A capture produced by the [`Capturer`] service.
#[derive(Debug)]
pub struct CapturedScreen {
    pub screenshot: Screenshot,
    /// Window the capture came from; `None` for plain and fallback
    /// full-screen captures.
    pub window: Option<WindowInfo>,
    /// Where the frame was persisted, when persistence is enabled.
    pub saved_path: Option<PathBuf>,
}

/// Screen capturer service. Errors never escape: every public method
/// returns `Option` and logs the reason on `None`.
pub struct Capturer {
    backend: Box<dyn ScreenCapture>,
    windows: Box<dyn WindowQuery>,
    screenshots_dir: PathBuf,
    persist: bool,
}

impl Capturer {
    pub fn new(
        backend: Box<dyn ScreenCapture>,
        windows: Box<dyn WindowQuery>,
        screenshots_dir: impl Into<PathBuf>,
        persist: bool,
    ) -> Self {
        Self {
            backend,
            windows,
            screenshots_dir: screenshots_dir.into(),
            persist,
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    /// Capture the given region, or the full primary display when `region`
    /// is `None`.
    pub async fn capture(&self, region: Option<Region>) -> Option<CapturedScreen> {
        if let Some(region) = region {
            if !region.is_valid() {
                error!("refusing to capture zero-sized region {region}");
                return None;
            }
        }

        let result = match region {
            Some(region) => self.backend.capture_region(region).await,
            None => self.backend.capture_primary().await,
        };

        match result {
            Ok(screenshot) => {
                let saved_path = self.persist_frame(&screenshot, "fullscreen");
                Some(CapturedScreen {
                    screenshot,
                    window: None,
                    saved_path,
                })
            }
            Err(e) => {
                error!("screen capture failed: {e}");
                None
            }
        }
    }

    /// Capture the currently active window. Any failure along the way
    /// (no window query, no active window, zero-sized window, capture
    /// error) falls back once to a full-screen capture.
    pub async fn capture_active_window(&self) -> Option<CapturedScreen> {
        let window = match self.windows.active_window().await {
            Ok(Some(window)) => window,
            Ok(None) => {
                warn!("could not determine the active window");
                return self.fallback_fullscreen().await;
            }
            Err(e) => {
                error!("window query failed: {e}");
                return self.fallback_fullscreen().await;
            }
        };

        if !window.region.is_valid() {
            error!("active window '{}' has zero size", window.title);
            return self.fallback_fullscreen().await;
        }

        info!("capturing window '{}' ({})", window.title, window.region);
        match self.backend.capture_region(window.region).await {
            Ok(screenshot) => {
                let name = sanitize_filename(&window.title);
                let saved_path = self.persist_frame(&screenshot, &name);
                Some(CapturedScreen {
                    screenshot,
                    window: Some(window),
                    saved_path,
                })
            }
            Err(e) => {
                error!("window capture failed: {e}");
                self.fallback_fullscreen().await
            }
        }
    }

    async fn fallback_fullscreen(&self) -> Option<CapturedScreen> {
        debug!("falling back to full-screen capture");
        match self.backend.capture_primary().await {
            Ok(screenshot) => {
                let saved_path = self.persist_frame(&screenshot, "fullscreen");
                Some(CapturedScreen {
                    screenshot,
                    window: None,
                    saved_path,
                })
            }
            Err(e) => {
                error!("full-screen fallback failed: {e}");
                None
            }
        }
    }

    fn persist_frame(&self, screenshot: &Screenshot, name: &str) -> Option<PathBuf> {
        if !self.persist {
            return None;
        }

        if let Err(e) = std::fs::create_dir_all(&self.screenshots_dir) {
            warn!(
                "could not create screenshots dir {}: {e}",
                self.screenshots_dir.display()
            );
            return None;
        }

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let path = self
            .screenshots_dir
            .join(format!("{name}_{timestamp}.png"));

        match screenshot.image.save(&path) {
            Ok(()) => {
                info!("screenshot saved: {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("could not save screenshot to {}: {e}", path.display());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::StubWindowQuery;

    fn stub_capturer(dir: &std::path::Path, persist: bool) -> Capturer {
        Capturer::new(
            Box::new(StubCapture::new()),
            Box::new(StubWindowQuery::new()),
            dir,
            persist,
        )
    }

    #[tokio::test]
    async fn test_capture_zero_region_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let capturer = stub_capturer(dir.path(), true);

        assert!(capturer.capture(Some(Region::new(10, 10, 0, 50))).await.is_none());
        assert!(capturer.capture(Some(Region::new(10, 10, 50, 0))).await.is_none());

        // Nothing was attempted, so nothing was persisted either.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_capture_full_screen_persists_frame() {
        let dir = tempfile::tempdir().unwrap();
        let capturer = stub_capturer(dir.path(), true);

        let captured = capturer.capture(None).await.unwrap();
        assert_eq!(captured.screenshot.width(), STUB_FRAME_WIDTH);
        assert!(captured.window.is_none());

        let path = captured.saved_path.unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("fullscreen_"), "unexpected name {name}");
        assert!(name.ends_with(".png"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_capture_without_persistence_saves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let capturer = stub_capturer(dir.path(), false);

        let captured = capturer.capture(None).await.unwrap();
        assert!(captured.saved_path.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_active_window_falls_back_to_full_screen() {
        // The stub window query reports no active window, so the capturer
        // must take the single documented fallback.
        let dir = tempfile::tempdir().unwrap();
        let capturer = stub_capturer(dir.path(), true);

        let captured = capturer.capture_active_window().await.unwrap();
        assert!(captured.window.is_none());
        let name = captured
            .saved_path
            .unwrap()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .to_string();
        assert!(name.starts_with("fullscreen_"));
    }

    #[tokio::test]
    async fn test_region_capture_matches_requested_size() {
        let dir = tempfile::tempdir().unwrap();
        let capturer = stub_capturer(dir.path(), false);

        let captured = capturer
            .capture(Some(Region::new(5, 5, 120, 40)))
            .await
            .unwrap();
        assert_eq!(captured.screenshot.width(), 120);
        assert_eq!(captured.screenshot.height(), 40);
    }

    #[tokio::test]
    async fn test_capture_oversized_region_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let capturer = stub_capturer(dir.path(), true);

        let captured = capturer.capture(Some(Region::new(0, 0, u32::MAX, 10))).await;
        assert!(captured.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_stub_region_capture_is_size_capped() {
        let stub = StubCapture::new();
        assert!(stub
            .capture_region(Region::new(0, 0, MAX_CAPTURE_DIMENSION + 1, 10))
            .await
            .is_err());
        assert!(stub
            .capture_region(Region::new(0, 0, MAX_CAPTURE_DIMENSION, 1))
            .await
            .is_ok());
    }

    #[test]
    fn test_crop_rejects_out_of_bounds_region() {
        let full = Screenshot::new(
            DynamicImage::new_rgb8(100, 100),
            Region::new(0, 0, 100, 100),
            "test",
        );
        assert!(crop(&full, Region::new(-5, 0, 10, 10)).is_err());
        assert!(crop(&full, Region::new(95, 95, 10, 10)).is_err());

        let ok = crop(&full, Region::new(10, 20, 30, 40)).unwrap();
        assert_eq!(ok.width(), 30);
        assert_eq!(ok.height(), 40);
    }

    #[test]
    fn test_crop_rejects_oversized_region() {
        let full = Screenshot::new(
            DynamicImage::new_rgb8(800, 600),
            Region::new(0, 0, 800, 600),
            "test",
        );
        // Extents near u32::MAX must fail the bounds check, not wrap it.
        assert!(crop(&full, Region::new(100, 0, u32::MAX, 10)).is_err());
        assert!(crop(&full, Region::new(0, 100, 10, u32::MAX)).is_err());
    }
}
