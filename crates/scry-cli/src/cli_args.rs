//! CLI argument parsing for scry.

use clap::{Parser, Subcommand};

#[derive(Parser, Clone)]
#[command(name = "scry")]
#[command(about = "Voice-assistant screen automation: find text on screen, click it, type into it")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Print outcomes as JSON instead of plain text
    #[arg(long)]
    pub json: bool,

    /// Override the configured OCR languages (tesseract notation, e.g. "rus+eng")
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Override the configured confidence threshold
    #[arg(long, value_name = "0.0-1.0")]
    pub threshold: Option<f32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Clone)]
pub enum Command {
    /// Capture the screen and report the recognized text
    Screenshot {
        /// Capture only this region, as "x,y,width,height"
        #[arg(long, value_name = "X,Y,W,H")]
        region: Option<String>,
    },

    /// Read all text visible on screen
    Read {
        #[arg(long, value_name = "X,Y,W,H")]
        region: Option<String>,
    },

    /// Find text on screen and click it
    Click {
        text: String,

        /// Double click instead of a single click
        #[arg(long)]
        double: bool,
    },

    /// Type text on the keyboard
    Type {
        text: String,

        /// Pause between key presses, in seconds (defaults to the
        /// configured type_interval)
        #[arg(long)]
        interval: Option<f64>,
    },

    /// Click a piece of text, then type into the focused field
    ClickType {
        text: String,
        input: String,

        #[arg(long)]
        interval: Option<f64>,
    },

    /// Focus a text input field by its label or placeholder
    FindField {
        name: String,

        #[arg(long)]
        double: bool,
    },

    /// Press a button in the active window by its visible label
    ClickButton { label: String },

    /// Capture, recognize and summarize the screen
    Analyze {
        #[arg(long, value_name = "X,Y,W,H")]
        region: Option<String>,

        /// Embed the captured frame in the output as base64 PNG
        #[arg(long)]
        include_frame: bool,

        /// Save the analysis next to the screenshots
        #[arg(long)]
        save: bool,
    },

    /// Show which capabilities were detected in this session
    Capabilities,

    /// Execute a raw JSON command envelope
    Exec { payload: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_click_subcommand_parses() {
        let cli = Cli::try_parse_from(["scry", "click", "Вход", "--double"])
            .expect("Failed to parse CLI args");
        match cli.command {
            Command::Click { text, double } => {
                assert_eq!(text, "Вход");
                assert!(double);
            }
            _ => panic!("expected the click subcommand"),
        }
    }

    #[test]
    fn test_type_interval_flag_is_optional() {
        // Absent means "use the configured type_interval".
        let cli = Cli::try_parse_from(["scry", "type", "привет"])
            .expect("Failed to parse CLI args");
        match cli.command {
            Command::Type { interval, .. } => assert_eq!(interval, None),
            _ => panic!("expected the type subcommand"),
        }

        let cli = Cli::try_parse_from(["scry", "type", "привет", "--interval", "0.1"])
            .expect("Failed to parse CLI args");
        match cli.command {
            Command::Type { interval, .. } => assert_eq!(interval, Some(0.1)),
            _ => panic!("expected the type subcommand"),
        }
    }

    #[test]
    fn test_global_overrides_parse() {
        let cli = Cli::try_parse_from([
            "scry",
            "--json",
            "--language",
            "eng",
            "--threshold",
            "0.8",
            "read",
        ])
        .expect("Failed to parse CLI args");
        assert!(cli.json);
        assert_eq!(cli.language.as_deref(), Some("eng"));
        assert_eq!(cli.threshold, Some(0.8));
    }
}
