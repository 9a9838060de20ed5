//! Pointer and keyboard injection.
//!
//! [`InputSimulator`] is the capability the click and typing paths are
//! written against. The real backend drives enigo; the stub records what
//! it would have done and reports success, so every flow above it still
//! runs end-to-end in headless sessions.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::warn;

/// Errors that can occur while injecting input.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("input simulation is not available in this session")]
    NotAvailable,

    #[error("input simulation failed: {0}")]
    SimulationFailed(String),
}

/// Result type for input operations.
pub type InputResult<T> = Result<T, InputError>;

/// Keys that can be pressed on their own or as part of a hotkey chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Escape,
    Backspace,
    Delete,
    Space,
    Up,
    Down,
    Left,
    Right,
    Shift,
    Control,
    Alt,
    Meta,
}

/// Trait for input injection backends.
#[async_trait]
pub trait InputSimulator: Send + Sync {
    /// Check whether events actually reach the desktop.
    fn is_available(&self) -> bool;

    /// Click at absolute screen coordinates, optionally as a double click.
    async fn click_at(&self, x: i32, y: i32, double_click: bool) -> InputResult<()>;

    /// Type text with the given pause between characters.
    async fn type_text(&self, text: &str, interval: Duration) -> InputResult<()>;

    /// Press and release a single key.
    async fn press_key(&self, key: Key) -> InputResult<()>;

    /// Press a chord: every key down in order, then released in reverse.
    async fn hotkey(&self, keys: &[Key]) -> InputResult<()>;
}

/// enigo-backed input injection for sessions with a real display.
#[cfg(feature = "gui-automation")]
pub mod platform {
    use super::*;
    use enigo::{Button, Coordinate, Direction, Enigo, Key as EnigoKey, Keyboard, Mouse, Settings};
    use std::sync::Mutex as StdMutex;

    pub struct EnigoInput {
        enigo: StdMutex<Enigo>,
    }

    impl EnigoInput {
        pub fn new() -> InputResult<Self> {
            let enigo = Enigo::new(&Settings::default())
                .map_err(|e| InputError::SimulationFailed(e.to_string()))?;
            Ok(Self {
                enigo: StdMutex::new(enigo),
            })
        }

        fn lock(&self) -> InputResult<std::sync::MutexGuard<'_, Enigo>> {
            self.enigo
                .lock()
                .map_err(|e| InputError::SimulationFailed(format!("failed to lock enigo: {e}")))
        }

        pub(crate) fn convert_key(key: Key) -> EnigoKey {
            match key {
                Key::Char(c) => EnigoKey::Unicode(c),
                Key::Enter => EnigoKey::Return,
                Key::Tab => EnigoKey::Tab,
                Key::Escape => EnigoKey::Escape,
                Key::Backspace => EnigoKey::Backspace,
                Key::Delete => EnigoKey::Delete,
                Key::Space => EnigoKey::Space,
                Key::Up => EnigoKey::UpArrow,
                Key::Down => EnigoKey::DownArrow,
                Key::Left => EnigoKey::LeftArrow,
                Key::Right => EnigoKey::RightArrow,
                Key::Shift => EnigoKey::Shift,
                Key::Control => EnigoKey::Control,
                Key::Alt => EnigoKey::Alt,
                Key::Meta => EnigoKey::Meta,
            }
        }
    }

    #[async_trait]
    impl InputSimulator for EnigoInput {
        fn is_available(&self) -> bool {
            true
        }

        async fn click_at(&self, x: i32, y: i32, double_click: bool) -> InputResult<()> {
            let mut enigo = self.lock()?;
            enigo
                .move_mouse(x, y, Coordinate::Abs)
                .map_err(|e| InputError::SimulationFailed(e.to_string()))?;
            enigo
                .button(Button::Left, Direction::Click)
                .map_err(|e| InputError::SimulationFailed(e.to_string()))?;
            if double_click {
                enigo
                    .button(Button::Left, Direction::Click)
                    .map_err(|e| InputError::SimulationFailed(e.to_string()))?;
            }
            Ok(())
        }

        async fn type_text(&self, text: &str, interval: Duration) -> InputResult<()> {
            if interval.is_zero() {
                let mut enigo = self.lock()?;
                return enigo
                    .text(text)
                    .map_err(|e| InputError::SimulationFailed(e.to_string()));
            }

            // Per-character presses so the pause lands between keystrokes.
            for c in text.chars() {
                {
                    let mut enigo = self.lock()?;
                    enigo
                        .key(EnigoKey::Unicode(c), Direction::Click)
                        .map_err(|e| InputError::SimulationFailed(e.to_string()))?;
                }
                tokio::time::sleep(interval).await;
            }
            Ok(())
        }

        async fn press_key(&self, key: Key) -> InputResult<()> {
            let mut enigo = self.lock()?;
            enigo
                .key(Self::convert_key(key), Direction::Click)
                .map_err(|e| InputError::SimulationFailed(e.to_string()))
        }

        async fn hotkey(&self, keys: &[Key]) -> InputResult<()> {
            let mut enigo = self.lock()?;
            for key in keys {
                enigo
                    .key(Self::convert_key(*key), Direction::Press)
                    .map_err(|e| InputError::SimulationFailed(e.to_string()))?;
            }
            for key in keys.iter().rev() {
                enigo
                    .key(Self::convert_key(*key), Direction::Release)
                    .map_err(|e| InputError::SimulationFailed(e.to_string()))?;
            }
            Ok(())
        }
    }
}

/// Stub simulator substituted when input injection is unavailable. It
/// records what it was asked to do and reports success, keeping the
/// flows above it runnable.
#[derive(Clone, Default)]
pub struct StubInput {
    actions: Arc<Mutex<Vec<String>>>,
}

impl StubInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything this stub was asked to do, in order.
    pub async fn actions(&self) -> Vec<String> {
        self.actions.lock().await.clone()
    }

    async fn log(&self, action: String) {
        warn!("no input simulation available, pretending: {action}");
        self.actions.lock().await.push(action);
    }
}

#[async_trait]
impl InputSimulator for StubInput {
    fn is_available(&self) -> bool {
        false
    }

    async fn click_at(&self, x: i32, y: i32, double_click: bool) -> InputResult<()> {
        self.log(format!("click_at({x}, {y}, double={double_click})"))
            .await;
        Ok(())
    }

    async fn type_text(&self, text: &str, interval: Duration) -> InputResult<()> {
        self.log(format!("type_text(\"{text}\", {}ms)", interval.as_millis()))
            .await;
        Ok(())
    }

    async fn press_key(&self, key: Key) -> InputResult<()> {
        self.log(format!("press_key({key:?})")).await;
        Ok(())
    }

    async fn hotkey(&self, keys: &[Key]) -> InputResult<()> {
        self.log(format!("hotkey({keys:?})")).await;
        Ok(())
    }
}

/// Select the input backend for the probed environment. Falls back to
/// the stub when enigo cannot attach to the session.
#[cfg(feature = "gui-automation")]
pub fn create_input_simulator(has_automation: bool) -> Box<dyn InputSimulator> {
    if has_automation {
        match platform::EnigoInput::new() {
            Ok(input) => return Box::new(input),
            Err(e) => warn!("could not initialize input simulation: {e}"),
        }
    }
    Box::new(StubInput::new())
}

#[cfg(not(feature = "gui-automation"))]
pub fn create_input_simulator(_has_automation: bool) -> Box<dyn InputSimulator> {
    Box::new(StubInput::new())
}
