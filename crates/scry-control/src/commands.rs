//! The assistant-facing command surface.
//!
//! Commands arrive as JSON (`{"command": "...", "params": {...}}`) or
//! from the CLI, and every one of them resolves to a [`CommandOutcome`]
//! with a status and a human-readable message. Unknown command names
//! fail at parse time; the dispatch itself is a single exhaustive
//! match, so adding a command without handling it does not compile.

use crate::analysis::ScreenAnalysis;
use crate::screen::{FieldMatch, ScreenAutomation};
use scry_vision::Region;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Default pause between simulated key presses, in seconds.
pub const DEFAULT_TYPE_INTERVAL: f64 = 0.05;

fn default_interval() -> f64 {
    DEFAULT_TYPE_INTERVAL
}

/// One screen operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "params", rename_all = "snake_case")]
pub enum ScreenCommand {
    /// Capture the screen and report what is visible on it.
    #[serde(alias = "take_screenshot_vision")]
    TakeScreenshot {
        #[serde(default)]
        region: Option<String>,
    },
    /// Read all recognized text from the screen or a region.
    ReadScreenText {
        #[serde(default)]
        region: Option<String>,
    },
    /// Find text on screen and click it.
    ClickOnText {
        text: String,
        #[serde(default)]
        double_click: bool,
    },
    /// Type text on the keyboard.
    #[serde(alias = "input_text_vision")]
    InputText {
        text: String,
        #[serde(default = "default_interval")]
        interval: f64,
    },
    /// Click a piece of text, wait for focus, then type into it.
    FindAndClickThenType {
        text: String,
        input_text: String,
        #[serde(default = "default_interval")]
        interval: f64,
    },
    /// Focus a text input field by its label or placeholder.
    FindTextField {
        field_name: String,
        #[serde(default)]
        double_click: bool,
    },
    /// Press a button in the active window by its visible label.
    ClickButton { button_text: String },
    /// Capture and summarize the screen, optionally saving the result.
    AnalyzeScreen {
        #[serde(default)]
        region: Option<String>,
        #[serde(default)]
        include_frame: bool,
        #[serde(default)]
        save: bool,
    },
}

impl ScreenCommand {
    /// Command name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            ScreenCommand::TakeScreenshot { .. } => "take_screenshot",
            ScreenCommand::ReadScreenText { .. } => "read_screen_text",
            ScreenCommand::ClickOnText { .. } => "click_on_text",
            ScreenCommand::InputText { .. } => "input_text",
            ScreenCommand::FindAndClickThenType { .. } => "find_and_click_then_type",
            ScreenCommand::FindTextField { .. } => "find_text_field",
            ScreenCommand::ClickButton { .. } => "click_button",
            ScreenCommand::AnalyzeScreen { .. } => "analyze_screen",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Error,
}

/// Result of one command as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub status: OutcomeStatus,
    pub message: String,
    /// Operation-specific payload (recognized text, analysis, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl CommandOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Success,
            message: message.into(),
            data: None,
        }
    }

    pub fn success_with(message: impl Into<String>, data: Value) -> Self {
        Self {
            status: OutcomeStatus::Success,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Error,
            message: message.into(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// Execute one command against the automation service. Every failure
/// path is converted into an error outcome; nothing raises.
pub async fn execute(automation: &ScreenAutomation, command: ScreenCommand) -> CommandOutcome {
    info!("executing screen command: {}", command.name());

    match command {
        ScreenCommand::TakeScreenshot { region } => {
            let region = match parse_optional_region(region) {
                Ok(region) => region,
                Err(outcome) => return outcome,
            };
            let Some((analysis, saved)) = automation.take_screenshot(region).await else {
                return CommandOutcome::error("Screen capture failed.");
            };
            match analysis_payload(&analysis, saved.as_deref()) {
                Ok(data) => CommandOutcome::success_with("Screenshot captured.", data),
                Err(outcome) => outcome,
            }
        }

        ScreenCommand::ReadScreenText { region } => {
            let region = match parse_optional_region(region) {
                Ok(region) => region,
                Err(outcome) => return outcome,
            };
            let Some((text, token_count)) = automation.read_screen(region).await else {
                return CommandOutcome::error("Screen capture failed.");
            };
            CommandOutcome::success_with(
                "Screen text read.",
                serde_json::json!({ "text": text, "token_count": token_count }),
            )
        }

        ScreenCommand::ClickOnText { text, double_click } => {
            if text.is_empty() {
                return CommandOutcome::error("No text to search for.");
            }
            if automation.click_element_by_text(&text, double_click).await {
                let kind = if double_click { "Double click" } else { "Click" };
                CommandOutcome::success(format!("{kind} on text '{text}' succeeded."))
            } else {
                CommandOutcome::error(format!("Could not find text '{text}' on the screen."))
            }
        }

        ScreenCommand::InputText { text, interval } => {
            if text.is_empty() {
                return CommandOutcome::error("No text to type.");
            }
            let interval = match parse_interval(interval) {
                Ok(interval) => interval,
                Err(outcome) => return outcome,
            };
            if automation.type_text(&text, interval).await {
                CommandOutcome::success(format!("Typed text '{text}'."))
            } else {
                CommandOutcome::error("Could not type the text.")
            }
        }

        ScreenCommand::FindAndClickThenType {
            text,
            input_text,
            interval,
        } => {
            if text.is_empty() {
                return CommandOutcome::error("No text to search for.");
            }
            if input_text.is_empty() {
                return CommandOutcome::error("No text to type.");
            }
            let interval = match parse_interval(interval) {
                Ok(interval) => interval,
                Err(outcome) => return outcome,
            };
            if !automation.click_element_by_text(&text, false).await {
                return CommandOutcome::error(format!(
                    "Could not find text '{text}' on the screen."
                ));
            }

            // Give the clicked field time to take keyboard focus.
            tokio::time::sleep(automation.focus_delay()).await;

            if automation.type_text(&input_text, interval).await {
                CommandOutcome::success(format!(
                    "Clicked text '{text}' and typed '{input_text}'."
                ))
            } else {
                CommandOutcome::error(format!(
                    "Clicked text '{text}', but could not type the input."
                ))
            }
        }

        ScreenCommand::FindTextField {
            field_name,
            double_click,
        } => {
            if field_name.is_empty() {
                return CommandOutcome::error("No field name to search for.");
            }
            match automation.find_text_field(&field_name, double_click).await {
                Some(FieldMatch::Label) => CommandOutcome::success(format!(
                    "Text field '{field_name}' found and selected."
                )),
                Some(FieldMatch::Placeholder(placeholder)) => CommandOutcome::success(format!(
                    "Text field with placeholder '{placeholder}' found and selected."
                )),
                None => CommandOutcome::error(format!(
                    "Could not find text field '{field_name}' on the screen."
                )),
            }
        }

        ScreenCommand::ClickButton { button_text } => {
            let outcome = automation.click_button(&button_text).await;
            if outcome.clicked {
                CommandOutcome::success(outcome.message)
            } else {
                CommandOutcome::error(outcome.message)
            }
        }

        ScreenCommand::AnalyzeScreen {
            region,
            include_frame,
            save,
        } => {
            let region = match parse_optional_region(region) {
                Ok(region) => region,
                Err(outcome) => return outcome,
            };
            let Some(analysis) = automation.analyze_screen(region, include_frame).await else {
                return CommandOutcome::error("Screen capture failed.");
            };

            let saved = if save {
                automation.save_analysis(&analysis)
            } else {
                None
            };

            match analysis_payload(&analysis, saved.as_deref()) {
                Ok(data) => CommandOutcome::success_with("Screen analyzed.", data),
                Err(outcome) => outcome,
            }
        }
    }
}

/// Parse a JSON command envelope and execute it.
pub async fn execute_json(automation: &ScreenAutomation, payload: &str) -> CommandOutcome {
    match serde_json::from_str::<ScreenCommand>(payload) {
        Ok(command) => execute(automation, command).await,
        Err(e) => CommandOutcome::error(format!("Unknown or malformed command: {e}")),
    }
}

/// Turn an analysis into a JSON payload, recording where it was saved.
fn analysis_payload(
    analysis: &ScreenAnalysis,
    saved: Option<&Path>,
) -> Result<Value, CommandOutcome> {
    let mut data = serde_json::to_value(analysis)
        .map_err(|e| CommandOutcome::error(format!("Could not serialize analysis: {e}")))?;
    if let (Some(path), Value::Object(map)) = (saved, &mut data) {
        map.insert(
            "saved_to".to_string(),
            Value::String(path.display().to_string()),
        );
    }
    Ok(data)
}

fn parse_region_str(raw: &str) -> Result<Region, CommandOutcome> {
    let invalid = || {
        CommandOutcome::error(format!(
            "Invalid region format: '{raw}'. Use 'x,y,width,height'."
        ))
    };

    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(invalid());
    }
    let x = parts[0].parse().map_err(|_| invalid())?;
    let y = parts[1].parse().map_err(|_| invalid())?;
    let width = parts[2].parse().map_err(|_| invalid())?;
    let height = parts[3].parse().map_err(|_| invalid())?;
    Ok(Region::new(x, y, width, height))
}

fn parse_optional_region(raw: Option<String>) -> Result<Option<Region>, CommandOutcome> {
    match raw {
        Some(raw) => parse_region_str(&raw).map(Some),
        None => Ok(None),
    }
}

/// The wire accepts any float for `interval`; only values that convert
/// to a [`Duration`] pass.
fn parse_interval(raw: f64) -> Result<Duration, CommandOutcome> {
    Duration::try_from_secs_f64(raw).map_err(|_| {
        CommandOutcome::error(format!(
            "Invalid interval: '{raw}'. Use a non-negative number of seconds."
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parses_from_json_envelope() {
        let command: ScreenCommand = serde_json::from_str(
            r#"{"command": "click_on_text", "params": {"text": "Вход"}}"#,
        )
        .expect("Failed to parse command");

        assert_eq!(
            command,
            ScreenCommand::ClickOnText {
                text: "Вход".to_string(),
                double_click: false,
            }
        );
    }

    #[test]
    fn test_legacy_command_aliases_still_parse() {
        let command: ScreenCommand = serde_json::from_str(
            r#"{"command": "take_screenshot_vision", "params": {}}"#,
        )
        .expect("Failed to parse aliased command");
        assert_eq!(command.name(), "take_screenshot");

        let command: ScreenCommand = serde_json::from_str(
            r#"{"command": "input_text_vision", "params": {"text": "hi"}}"#,
        )
        .expect("Failed to parse aliased command");
        assert_eq!(command.name(), "input_text");
    }

    #[test]
    fn test_unknown_command_fails_to_parse() {
        let result =
            serde_json::from_str::<ScreenCommand>(r#"{"command": "do_magic", "params": {}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_interval_defaults_when_absent() {
        let command: ScreenCommand = serde_json::from_str(
            r#"{"command": "input_text", "params": {"text": "hi"}}"#,
        )
        .expect("Failed to parse command");

        match command {
            ScreenCommand::InputText { interval, .. } => {
                assert_eq!(interval, DEFAULT_TYPE_INTERVAL)
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_region_string_parses() {
        let region = parse_region_str("10, 20, 300, 400").expect("Failed to parse region");
        assert_eq!(region, Region::new(10, 20, 300, 400));
    }

    #[test]
    fn test_bad_region_strings_are_rejected() {
        for raw in ["", "10,20,300", "10,20,300,400,500", "a,b,c,d", "10,20,-3,400"] {
            let outcome = parse_region_str(raw).expect_err("region should not parse");
            assert_eq!(outcome.status, OutcomeStatus::Error);
            assert!(
                outcome.message.contains("Invalid region format"),
                "unexpected message for {raw:?}: {}",
                outcome.message
            );
        }
    }

    #[test]
    fn test_bad_intervals_are_rejected() {
        for raw in [-0.5, f64::NAN, f64::INFINITY, f64::MAX] {
            let outcome = parse_interval(raw).expect_err("interval should not parse");
            assert_eq!(outcome.status, OutcomeStatus::Error);
            assert!(
                outcome.message.contains("Invalid interval"),
                "unexpected message for {raw}: {}",
                outcome.message
            );
        }
        assert_eq!(parse_interval(0.0).expect("zero interval"), Duration::ZERO);
    }

    #[test]
    fn test_outcome_serializes_with_lowercase_status() {
        let json = serde_json::to_string(&CommandOutcome::success("done")).expect("serialize");
        assert_eq!(json, r#"{"status":"success","message":"done"}"#);

        let json = serde_json::to_string(&CommandOutcome::error("nope")).expect("serialize");
        assert_eq!(json, r#"{"status":"error","message":"nope"}"#);
    }
}
