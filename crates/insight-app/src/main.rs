//! Insight application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Install the tracing subscriber
//! 3. Mount a chat widget with the configured reply chain
//! 4. Drive it from stdin lines and print the transcript as it grows

mod cli;
mod repl;

use clap::Parser;
use insight_chat::{ChatError, ChatWidget, PastePayload, SubmitOutcome, WidgetHooks};
use insight_core::config::InsightConfig;
use tokio::io::{AsyncBufReadExt, BufReader};

use cli::CliArgs;
use repl::{format_message, format_status, HostCommand, HELP};

/// Tracks how much of the transcript has been printed.
struct Printer {
    printed: usize,
    json: bool,
}

impl Printer {
    /// Print messages added since the last call, then the status line.
    fn show_new(&mut self, widget: &ChatWidget) -> Result<(), ChatError> {
        let view = widget.view()?;
        for message in view.messages.iter().skip(self.printed) {
            println!("{}", format_message(message));
        }
        self.printed = view.messages.len();
        self.finish(&view);
        Ok(())
    }

    /// Reprint the whole transcript.
    fn show_all(&mut self, widget: &ChatWidget) -> Result<(), ChatError> {
        self.printed = 0;
        self.show_new(widget)
    }

    /// Reprint a single message after its feedback state changed.
    fn show_one(&mut self, widget: &ChatWidget, index: usize) -> Result<(), ChatError> {
        let view = widget.view()?;
        if let Some(message) = view.messages.get(index) {
            println!("{}", format_message(message));
        }
        self.finish(&view);
        Ok(())
    }

    fn finish(&self, view: &insight_chat::SessionView) {
        if self.json {
            match serde_json::to_string(view) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::warn!(error = %e, "Failed to serialize view"),
            }
        } else {
            println!("{}", format_status(view));
        }
    }
}

async fn run_command(
    widget: &ChatWidget,
    printer: &mut Printer,
    command: HostCommand,
) -> Result<(), ChatError> {
    match command {
        HostCommand::Ask(text) => {
            widget.edit(text)?;
            submit(widget, printer).await
        }
        HostCommand::Send => submit(widget, printer).await,
        HostCommand::Paste(text) => {
            widget.paste(PastePayload::plain(text)).await?;
            printer.show_new(widget)
        }
        HostCommand::Copy(index) => {
            widget.copy_message(index).await?;
            printer.show_one(widget, index)
        }
        HostCommand::Like(index) => {
            widget.like(index).await?;
            printer.show_one(widget, index)
        }
        HostCommand::Dislike(index) => {
            widget.dislike(index).await?;
            printer.show_one(widget, index)
        }
        HostCommand::Show => printer.show_all(widget),
        HostCommand::Help => {
            println!("{}", HELP);
            Ok(())
        }
        HostCommand::Invalid(reason) => {
            eprintln!("{} (try /help)", reason);
            Ok(())
        }
        HostCommand::Empty | HostCommand::Quit => Ok(()),
    }
}

async fn submit(widget: &ChatWidget, printer: &mut Printer) -> Result<(), ChatError> {
    match widget.submit().await? {
        SubmitOutcome::Completed { .. } => printer.show_new(widget),
        SubmitOutcome::Rejected(reason) => {
            tracing::debug!(?reason, "Submit rejected");
            eprintln!("nothing to send");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before logging so its level can seed the filter.
    let config_file = args.resolve_config_path();
    let loaded = InsightConfig::load(&config_file);
    let mut config = loaded.as_ref().cloned().unwrap_or_default();

    // Tracing. Logs go to stderr so they never interleave with the transcript.
    let level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Insight v{}", env!("CARGO_PKG_VERSION"));
    match loaded {
        Ok(_) => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Err(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Configuration unavailable, using defaults"
        ),
    }

    // Overrides.
    if let Some(credential) = args.resolve_credential() {
        config.remote.credential = Some(credential);
    }
    if let Some(ref endpoint) = args.endpoint {
        config.remote.endpoint = endpoint.clone();
    }

    let widget = ChatWidget::init(config, WidgetHooks::default())?;
    let mut printer = Printer {
        printed: 0,
        json: args.json,
    };
    printer.show_new(&widget)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = HostCommand::parse(&line);
        if command == HostCommand::Quit {
            break;
        }
        if let Err(e) = run_command(&widget, &mut printer, command).await {
            tracing::warn!(error = %e, "Command failed");
            eprintln!("error: {}", e);
        }
    }

    widget.dispose();
    Ok(())
}
