//! Screen-driven control: turns recognized on-screen text into clicks
//! and keystrokes.
//!
//! [`screen::ScreenAutomation`] owns the capture/OCR pipeline from
//! `scry-vision` plus an input simulator and the per-window interface
//! cache, and [`commands`] exposes the whole surface as a closed
//! command enum with a single dispatch point.

pub mod analysis;
pub mod cache;
pub mod capabilities;
pub mod commands;
pub mod input;
pub mod screen;

// Re-export the types callers touch directly
pub use analysis::ScreenAnalysis;
pub use cache::InterfaceCache;
pub use capabilities::Capabilities;
pub use commands::{execute, execute_json, CommandOutcome, OutcomeStatus, ScreenCommand};
pub use input::{create_input_simulator, InputSimulator, Key, StubInput};
pub use screen::{ButtonClick, FieldMatch, ScreenAutomation, WindowSnapshot};
