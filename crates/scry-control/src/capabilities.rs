//! Environment probing.
//!
//! The toolkit runs in plenty of places where parts of the stack are
//! missing: headless CI, an SSH session without a display, a machine
//! without tesseract installed. Instead of letting each component test
//! the environment on its own, [`Capabilities`] is probed once at
//! startup and threaded through every constructor. Components a
//! capability is missing for are built as stubs.

use serde::Serialize;
use std::process::Command;
use tracing::{debug, info};

/// What the current process can actually do on this machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// A display server is reachable, so screen capture can work.
    pub has_display: bool,
    /// The OCR engine binary is on PATH.
    pub has_ocr: bool,
    /// Pointer and keyboard events can be injected.
    pub has_automation: bool,
    /// The active window can be resolved.
    pub has_window_query: bool,
}

impl Capabilities {
    /// Probe the environment once. `ocr_binary` is the OCR engine to
    /// look for on PATH, usually "tesseract".
    pub fn probe(ocr_binary: &str) -> Self {
        let has_display = display_present();
        let has_ocr = binary_on_path(ocr_binary);
        // Injecting input and querying windows both go through the same
        // display session as capture, and only exist in gui-automation
        // builds.
        let automation_compiled = cfg!(feature = "gui-automation");

        let capabilities = Self {
            has_display,
            has_ocr,
            has_automation: has_display && automation_compiled,
            has_window_query: has_display && automation_compiled,
        };
        info!(
            "probed capabilities: display={} ocr={} automation={} window_query={}",
            capabilities.has_display,
            capabilities.has_ocr,
            capabilities.has_automation,
            capabilities.has_window_query
        );
        capabilities
    }

    /// All capabilities present, for tests and forced-real setups.
    pub fn full() -> Self {
        Self {
            has_display: true,
            has_ocr: true,
            has_automation: true,
            has_window_query: true,
        }
    }

    /// No capabilities, everything runs as a stub.
    pub fn none() -> Self {
        Self {
            has_display: false,
            has_ocr: false,
            has_automation: false,
            has_window_query: false,
        }
    }
}

#[cfg(target_os = "linux")]
fn display_present() -> bool {
    let has = ["DISPLAY", "WAYLAND_DISPLAY"]
        .iter()
        .any(|var| std::env::var(var).map(|v| !v.is_empty()).unwrap_or(false));
    if !has {
        debug!("neither DISPLAY nor WAYLAND_DISPLAY is set");
    }
    has
}

#[cfg(not(target_os = "linux"))]
fn display_present() -> bool {
    // macOS and Windows sessions always have a display server; whether
    // the process may use it surfaces later as a capture error.
    true
}

fn binary_on_path(binary: &str) -> bool {
    let lookup = if cfg!(target_os = "windows") {
        "where"
    } else {
        "which"
    };
    Command::new(lookup)
        .arg(binary)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_does_not_panic() {
        let capabilities = Capabilities::probe("tesseract");
        // Automation never exceeds what the display allows.
        if !capabilities.has_display {
            assert!(!capabilities.has_automation);
            assert!(!capabilities.has_window_query);
        }
    }

    #[test]
    fn test_missing_binary_is_not_ocr_capable() {
        let capabilities = Capabilities::probe("definitely-not-a-real-ocr-binary");
        assert!(!capabilities.has_ocr);
    }

    #[test]
    fn test_none_disables_everything() {
        let capabilities = Capabilities::none();
        assert!(!capabilities.has_display);
        assert!(!capabilities.has_ocr);
        assert!(!capabilities.has_automation);
        assert!(!capabilities.has_window_query);
    }
}
