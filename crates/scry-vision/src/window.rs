//! Window enumeration and active-window resolution.

use crate::capture::{CaptureError, CaptureResult};
use crate::types::{Region, WindowInfo};
use async_trait::async_trait;
use tracing::warn;

/// Trait for querying windows on the current desktop.
#[async_trait]
pub trait WindowQuery: Send + Sync {
    /// Check whether window queries can reach a desktop session.
    fn is_available(&self) -> bool;

    /// All non-minimized windows.
    async fn list_windows(&self) -> CaptureResult<Vec<WindowInfo>>;

    /// The currently focused window, or `None` when it cannot be
    /// determined.
    async fn active_window(&self) -> CaptureResult<Option<WindowInfo>>;
}

#[cfg(feature = "gui-automation")]
pub mod platform {
    use super::*;

    /// xcap-backed window query.
    pub struct XcapWindowQuery;

    impl XcapWindowQuery {
        pub fn new() -> Self {
            Self
        }
    }

    impl Default for XcapWindowQuery {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl WindowQuery for XcapWindowQuery {
        fn is_available(&self) -> bool {
            true
        }

        async fn list_windows(&self) -> CaptureResult<Vec<WindowInfo>> {
            let windows = xcap::Window::all()
                .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;

            Ok(windows
                .into_iter()
                .filter(|w| !w.is_minimized())
                .map(|w| WindowInfo {
                    id: w.id() as u64,
                    title: w.title().to_string(),
                    app_name: w.app_name().to_string(),
                    region: Region::new(w.x(), w.y(), w.width(), w.height()),
                    is_minimized: w.is_minimized(),
                })
                .collect())
        }

        async fn active_window(&self) -> CaptureResult<Option<WindowInfo>> {
            // The window list is approximately z-ordered; the first titled,
            // non-minimized entry is the frontmost one.
            let windows = self.list_windows().await?;
            Ok(windows.into_iter().find(|w| !w.title.is_empty()))
        }
    }
}

/// Stub window query for sessions without a desktop. Always reports no
/// active window, which sends callers down the full-screen fallback.
pub struct StubWindowQuery;

impl StubWindowQuery {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StubWindowQuery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WindowQuery for StubWindowQuery {
    fn is_available(&self) -> bool {
        false
    }

    async fn list_windows(&self) -> CaptureResult<Vec<WindowInfo>> {
        warn!("window query unavailable, reporting no windows");
        Ok(Vec::new())
    }

    async fn active_window(&self) -> CaptureResult<Option<WindowInfo>> {
        warn!("window query unavailable, reporting no active window");
        Ok(None)
    }
}

/// Select the window query backend for the probed environment.
#[cfg(feature = "gui-automation")]
pub fn create_window_query(has_window_query: bool) -> Box<dyn WindowQuery> {
    if has_window_query {
        Box::new(platform::XcapWindowQuery::new())
    } else {
        Box::new(StubWindowQuery::new())
    }
}

#[cfg(not(feature = "gui-automation"))]
pub fn create_window_query(_has_window_query: bool) -> Box<dyn WindowQuery> {
    Box::new(StubWindowQuery::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_reports_nothing() {
        let query = StubWindowQuery::new();
        assert!(!query.is_available());
        assert!(query.list_windows().await.unwrap().is_empty());
        assert!(query.active_window().await.unwrap().is_none());
    }
}
