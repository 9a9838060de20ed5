//! scry CLI - command-line interface for the scry screen assistant.

mod cli_args;

use anyhow::Result;
use scry_config::Config;
use scry_control::{
    execute, execute_json, Capabilities, CommandOutcome, ScreenAutomation, ScreenCommand,
};

pub use cli_args::{Cli, Command};
use clap::Parser;

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli);

    // Load configuration with CLI overrides
    let config = Config::load_with_overrides(
        cli.config.as_deref(),
        cli.language.clone(),
        cli.threshold,
    )?;

    // Probe the environment once; components without their capability
    // come up as stubs inside the automation service.
    let capabilities = Capabilities::probe(&config.ocr.binary);
    let automation = ScreenAutomation::from_config(&config, capabilities);

    let outcome = match cli.command {
        Command::Screenshot { region } => {
            execute(&automation, ScreenCommand::TakeScreenshot { region }).await
        }
        Command::Read { region } => {
            execute(&automation, ScreenCommand::ReadScreenText { region }).await
        }
        Command::Click { text, double } => {
            execute(
                &automation,
                ScreenCommand::ClickOnText {
                    text,
                    double_click: double,
                },
            )
            .await
        }
        Command::Type { text, interval } => {
            let interval = interval.unwrap_or(config.input.type_interval);
            execute(&automation, ScreenCommand::InputText { text, interval }).await
        }
        Command::ClickType {
            text,
            input,
            interval,
        } => {
            let interval = interval.unwrap_or(config.input.type_interval);
            execute(
                &automation,
                ScreenCommand::FindAndClickThenType {
                    text,
                    input_text: input,
                    interval,
                },
            )
            .await
        }
        Command::FindField { name, double } => {
            execute(
                &automation,
                ScreenCommand::FindTextField {
                    field_name: name,
                    double_click: double,
                },
            )
            .await
        }
        Command::ClickButton { label } => {
            execute(&automation, ScreenCommand::ClickButton { button_text: label }).await
        }
        Command::Analyze {
            region,
            include_frame,
            save,
        } => {
            execute(
                &automation,
                ScreenCommand::AnalyzeScreen {
                    region,
                    include_frame,
                    save,
                },
            )
            .await
        }
        Command::Capabilities => CommandOutcome::success_with(
            describe_capabilities(&capabilities),
            serde_json::to_value(capabilities)?,
        ),
        Command::Exec { payload } => execute_json(&automation, &payload).await,
    };

    print_outcome(&outcome, cli.json)?;

    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

// --- Helper functions ---

fn initialize_logging(cli: &Cli) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("scry_vision={level}").parse().unwrap())
        .add_directive(format!("scry_control={level}").parse().unwrap())
        .add_directive(format!("scry_config={level}").parse().unwrap())
        .add_directive(format!("scry_cli={level}").parse().unwrap());

    // Logs go to stderr so --json output stays parseable.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn print_outcome(outcome: &CommandOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    println!("{}", outcome.message);
    if let Some(text) = outcome
        .data
        .as_ref()
        .and_then(|data| data.get("text"))
        .and_then(|text| text.as_str())
    {
        if !text.is_empty() {
            println!("{text}");
        }
    }
    Ok(())
}

fn describe_capabilities(capabilities: &Capabilities) -> String {
    fn yes_no(value: bool) -> &'static str {
        if value {
            "yes"
        } else {
            "no"
        }
    }

    format!(
        "Capabilities: display={}, ocr={}, automation={}, window_query={}",
        yes_no(capabilities.has_display),
        yes_no(capabilities.has_ocr),
        yes_no(capabilities.has_automation),
        yes_no(capabilities.has_window_query),
    )
}
