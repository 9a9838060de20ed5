//! Screen content analysis.
//!
//! An analysis is a point-in-time summary of what is visible: the
//! recognized text, the frame dimensions and optionally the frame
//! itself as base64 PNG for transport to a UI. Saved analyses always
//! leave the frame out so the JSON stays small.

use scry_vision::{join_tokens, RecognizedToken, Screenshot};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenAnalysis {
    /// Unix timestamp (seconds) of the capture.
    pub timestamp: i64,
    /// All recognized text, joined in reading order.
    pub text: String,
    /// Number of recognized tokens.
    pub token_count: usize,
    /// Captured frame dimensions as (width, height).
    pub resolution: (u32, u32),
    /// Base64-encoded PNG of the frame, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

impl ScreenAnalysis {
    pub fn from_capture(
        screenshot: &Screenshot,
        tokens: &[RecognizedToken],
        include_frame: bool,
    ) -> Self {
        let frame = if include_frame {
            match screenshot.to_base64_png() {
                Ok(encoded) => Some(encoded),
                Err(e) => {
                    warn!("could not encode frame for analysis: {e}");
                    None
                }
            }
        } else {
            None
        };

        Self {
            timestamp: chrono::Utc::now().timestamp(),
            text: join_tokens(tokens),
            token_count: tokens.len(),
            resolution: (screenshot.width(), screenshot.height()),
            screenshot: frame,
        }
    }
}

/// Write an analysis to `{dir}/analysis_{timestamp}.json`, without the
/// frame. Failures are logged and reported as `None`.
pub fn save_screen_analysis(analysis: &ScreenAnalysis, dir: &Path) -> Option<PathBuf> {
    if let Err(e) = std::fs::create_dir_all(dir) {
        warn!("could not create analysis directory {}: {e}", dir.display());
        return None;
    }

    let mut on_disk = analysis.clone();
    on_disk.screenshot = None;

    let path = dir.join(format!("analysis_{}.json", analysis.timestamp));
    let json = match serde_json::to_string_pretty(&on_disk) {
        Ok(json) => json,
        Err(e) => {
            warn!("could not serialize screen analysis: {e}");
            return None;
        }
    };

    match std::fs::write(&path, json) {
        Ok(()) => {
            info!("screen analysis saved: {}", path.display());
            Some(path)
        }
        Err(e) => {
            warn!("could not write analysis file {}: {e}", path.display());
            None
        }
    }
}
