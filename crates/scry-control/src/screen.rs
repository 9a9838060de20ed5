//! The screen automation service.
//!
//! [`ScreenAutomation`] wires capture, OCR, text location and input
//! injection into the operations the command layer exposes: read what
//! is on screen, click a piece of text, focus a text field, press a
//! button by its label. Every method degrades to a negative result
//! instead of raising; missing capabilities were already resolved to
//! stub backends at construction.

use crate::analysis::{save_screen_analysis, ScreenAnalysis};
use crate::cache::InterfaceCache;
use crate::capabilities::Capabilities;
use crate::input::{create_input_simulator, InputSimulator};
use scry_config::Config;
use scry_vision::{
    create_ocr_engine, create_screen_capture, create_window_query, join_tokens, locate, normalize,
    CapturedScreen, Capturer, ElementMap, Extractor, Region,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

/// How a text field was found on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldMatch {
    /// A label next to the field matched; the click landed right of it.
    Label,
    /// Placeholder text inside the field matched; the click landed on it.
    Placeholder(String),
}

/// Outcome of a button click attempt, with the user-facing message.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonClick {
    pub clicked: bool,
    pub message: String,
}

/// The active window together with its recognized elements.
#[derive(Debug)]
pub struct WindowSnapshot {
    /// Title of the captured window; `None` when the capture fell back
    /// to the full screen.
    pub window_title: Option<String>,
    pub elements: ElementMap,
    /// Where the element map was cached, when a title was available.
    pub cache_path: Option<PathBuf>,
}

pub struct ScreenAutomation {
    capturer: Capturer,
    extractor: Extractor,
    input: Box<dyn InputSimulator>,
    cache: InterfaceCache,
    screenshots_dir: PathBuf,
    confidence_threshold: f32,
    focus_delay: Duration,
}

impl ScreenAutomation {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        capturer: Capturer,
        extractor: Extractor,
        input: Box<dyn InputSimulator>,
        cache: InterfaceCache,
        screenshots_dir: impl Into<PathBuf>,
        confidence_threshold: f32,
        focus_delay: Duration,
    ) -> Self {
        Self {
            capturer,
            extractor,
            input,
            cache,
            screenshots_dir: screenshots_dir.into(),
            confidence_threshold,
            focus_delay,
        }
    }

    /// Build the full service from configuration and the probed
    /// capabilities. Components a capability is missing for come up as
    /// stubs.
    pub fn from_config(config: &Config, capabilities: Capabilities) -> Self {
        let capturer = Capturer::new(
            create_screen_capture(capabilities.has_display),
            create_window_query(capabilities.has_window_query),
            &config.capture.screenshots_dir,
            config.capture.persist_screenshots,
        );
        let extractor = Extractor::new(create_ocr_engine(
            capabilities.has_ocr,
            &config.ocr.binary,
            &config.ocr.language,
        ));
        let input = create_input_simulator(capabilities.has_automation);
        let cache = InterfaceCache::new(&config.capture.interface_cache_dir);

        Self::new(
            capturer,
            extractor,
            input,
            cache,
            &config.capture.screenshots_dir,
            config.ocr.confidence_threshold,
            Duration::from_secs_f64(config.input.focus_delay),
        )
    }

    /// Pause between a focusing click and the typing that follows it.
    pub fn focus_delay(&self) -> Duration {
        self.focus_delay
    }

    /// Name of the OCR engine in use ("tesseract" or "stub").
    pub fn engine_name(&self) -> &str {
        self.extractor.engine_name()
    }

    /// Capture the full primary display or the given region.
    pub async fn capture(&self, region: Option<Region>) -> Option<CapturedScreen> {
        self.capturer.capture(region).await
    }

    /// Capture the screen and return all recognized text joined in
    /// reading order, together with the token count.
    pub async fn read_screen(&self, region: Option<Region>) -> Option<(String, usize)> {
        let captured = self.capturer.capture(region).await?;
        let tokens = self.extractor.extract_tokens(&captured.screenshot).await;
        Some((join_tokens(&tokens), tokens.len()))
    }

    /// Capture and recognize one frame, reporting what was seen and
    /// where the frame was persisted (when persistence is on).
    pub async fn take_screenshot(
        &self,
        region: Option<Region>,
    ) -> Option<(ScreenAnalysis, Option<PathBuf>)> {
        let captured = self.capturer.capture(region).await?;
        let tokens = self.extractor.extract_tokens(&captured.screenshot).await;
        let analysis = ScreenAnalysis::from_capture(&captured.screenshot, &tokens, false);
        Some((analysis, captured.saved_path))
    }

    /// Find `text` on the full screen and click its center. Returns
    /// false when capture fails, nothing matches, or the click cannot
    /// be delivered.
    pub async fn click_element_by_text(&self, text: &str, double_click: bool) -> bool {
        let Some(captured) = self.capturer.capture(None).await else {
            return false;
        };
        let tokens = self.extractor.extract_tokens(&captured.screenshot).await;

        let Some(region) = locate(&tokens, text, self.confidence_threshold) else {
            warn!("text '{text}' not found on screen");
            return false;
        };

        let (cx, cy) = region.center();
        let x = captured.screenshot.region.x + cx;
        let y = captured.screenshot.region.y + cy;
        match self.input.click_at(x, y, double_click).await {
            Ok(()) => {
                info!(
                    "{} on text '{text}' at ({x}, {y})",
                    if double_click { "double click" } else { "click" }
                );
                true
            }
            Err(e) => {
                error!("click failed at ({x}, {y}): {e}");
                false
            }
        }
    }

    /// Type text with the given pause between characters.
    pub async fn type_text(&self, text: &str, interval: Duration) -> bool {
        match self.input.type_text(text, interval).await {
            Ok(()) => {
                info!("typed text: '{text}'");
                true
            }
            Err(e) => {
                error!("typing failed: {e}");
                false
            }
        }
    }

    /// Find a text input field by its name: first probe common label
    /// spellings next to the field, then known placeholder texts inside
    /// it. A label hit clicks right of the label, a placeholder hit
    /// clicks the placeholder itself.
    pub async fn find_text_field(&self, field_name: &str, double_click: bool) -> Option<FieldMatch> {
        let captured = self.capturer.capture(None).await?;
        let tokens = self.extractor.extract_tokens(&captured.screenshot).await;
        let origin = (captured.screenshot.region.x, captured.screenshot.region.y);

        let labels = [
            field_name.to_string(),
            format!("{field_name}:"),
            format!("Введите {field_name}"),
            format!("Ваш {field_name}"),
            format!("Enter {field_name}"),
            format!("Your {field_name}"),
        ];
        for label in &labels {
            let Some(region) = locate(&tokens, label, self.confidence_threshold) else {
                continue;
            };
            // The input box usually sits to the right of its label.
            let x = origin.0 + region.x + region.width as i32 + 20;
            let y = origin.1 + region.y + (region.height / 2) as i32;
            return match self.input.click_at(x, y, double_click).await {
                Ok(()) => {
                    info!("clicked text field '{field_name}' at ({x}, {y})");
                    Some(FieldMatch::Label)
                }
                Err(e) => {
                    error!("click failed at ({x}, {y}): {e}");
                    None
                }
            };
        }

        let placeholders = [
            field_name.to_string(),
            format!("Введите {field_name}"),
            "Search".to_string(),
            "Поиск".to_string(),
            "Email".to_string(),
            "Пароль".to_string(),
            "Логин".to_string(),
            "Username".to_string(),
            "Password".to_string(),
        ];
        let wanted = field_name.to_lowercase();
        for placeholder in &placeholders {
            let candidate = placeholder.to_lowercase();
            if !wanted.contains(&candidate) && !candidate.contains(&wanted) {
                continue;
            }
            let Some(region) = locate(&tokens, placeholder, self.confidence_threshold) else {
                continue;
            };
            let (cx, cy) = region.center();
            let (x, y) = (origin.0 + cx, origin.1 + cy);
            return match self.input.click_at(x, y, double_click).await {
                Ok(()) => {
                    info!("clicked placeholder '{placeholder}' at ({x}, {y})");
                    Some(FieldMatch::Placeholder(placeholder.clone()))
                }
                Err(e) => {
                    error!("click failed at ({x}, {y}): {e}");
                    None
                }
            };
        }

        warn!("no text field matching '{field_name}' found");
        None
    }

    /// Find and press a button by its visible label.
    ///
    /// This is a separate matching path from [`Self::click_element_by_text`]
    /// and deliberately behaves differently: it captures the active
    /// window rather than the full screen, takes every recognized token
    /// regardless of confidence, and resolves duplicates by keeping the
    /// last occurrence. Lookup is exact first, then the first entry in
    /// scan order that matches as a substring in either direction.
    pub async fn click_button(&self, button_text: &str) -> ButtonClick {
        let Some(captured) = self.capturer.capture_active_window().await else {
            return ButtonClick {
                clicked: false,
                message: "Error: could not capture the window".to_string(),
            };
        };

        let tokens = self.extractor.extract_tokens(&captured.screenshot).await;
        let elements = ElementMap::from_tokens(&tokens);
        info!("recognized elements: {}", elements.labels().join(", "));

        // Element centers are relative to the captured rectangle.
        let origin = (captured.screenshot.region.x, captured.screenshot.region.y);
        let search_key = normalize(button_text);

        if let Some((cx, cy)) = elements.get(&search_key) {
            return self
                .press_element(origin, (cx, cy), button_text, button_text)
                .await;
        }

        for (key, (cx, cy)) in elements.iter() {
            if search_key.contains(key) || key.contains(&search_key) {
                return self.press_element(origin, (cx, cy), key, button_text).await;
            }
        }

        warn!("button '{button_text}' not found");
        ButtonClick {
            clicked: false,
            message: format!(
                "❌ Button '{button_text}' not found. Make sure it is visible on the screen"
            ),
        }
    }

    async fn press_element(
        &self,
        origin: (i32, i32),
        center: (i32, i32),
        matched_label: &str,
        requested_label: &str,
    ) -> ButtonClick {
        let (x, y) = (origin.0 + center.0, origin.1 + center.1);
        match self.input.click_at(x, y, false).await {
            Ok(()) => {
                info!("pressed button '{matched_label}' at ({x}, {y})");
                let message = if matched_label == requested_label {
                    format!("✅ Clicked button '{requested_label}'")
                } else {
                    format!("✅ Clicked button '{matched_label}' (similar to '{requested_label}')")
                };
                ButtonClick {
                    clicked: true,
                    message,
                }
            }
            Err(e) => {
                error!("click failed at ({x}, {y}): {e}");
                ButtonClick {
                    clicked: false,
                    message: format!("An error occurred while pressing the button: {e}"),
                }
            }
        }
    }

    /// Capture the active window, recognize its text elements and cache
    /// them keyed by the window title. The click paths never consult
    /// this cache on their own; it exists for callers that want to skip
    /// an OCR pass on a revisit.
    pub async fn snapshot_active_window(&self) -> Option<WindowSnapshot> {
        let captured = self.capturer.capture_active_window().await?;
        let tokens = self.extractor.extract_tokens(&captured.screenshot).await;
        let elements = ElementMap::from_tokens(&tokens);

        let window_title = captured.window.as_ref().map(|w| w.title.clone());
        let cache_path = window_title
            .as_deref()
            .and_then(|title| self.cache.save(title, &elements));

        Some(WindowSnapshot {
            window_title,
            elements,
            cache_path,
        })
    }

    /// Load the element map cached for a window by a previous snapshot.
    pub fn cached_elements(&self, window_title: &str) -> Option<ElementMap> {
        self.cache.load(window_title)
    }

    /// Capture and summarize what is on screen.
    pub async fn analyze_screen(
        &self,
        region: Option<Region>,
        include_frame: bool,
    ) -> Option<ScreenAnalysis> {
        let captured = self.capturer.capture(region).await?;
        let tokens = self.extractor.extract_tokens(&captured.screenshot).await;
        Some(ScreenAnalysis::from_capture(
            &captured.screenshot,
            &tokens,
            include_frame,
        ))
    }

    /// Persist an analysis next to the screenshots.
    pub fn save_analysis(&self, analysis: &ScreenAnalysis) -> Option<PathBuf> {
        save_screen_analysis(analysis, &self.screenshots_dir)
    }
}
