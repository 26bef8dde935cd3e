//! Terminal host for the wizard engine.
//!
//! Binary name: `wizard`
//!
//! Loads `wizard.toml`, initializes tracing, then walks the user through the
//! sample account-setup wizard and prints the collected data.

mod account;
mod cli;
mod config;
mod session;

use clap::Parser;
use console::style;
use tokio::sync::broadcast::error::RecvError;

use wizard_core::{EventBus, EventCallbacks, WizardContext, WizardEngine};
use wizard_types::config::WizardConfig;

use cli::Cli;
use session::Outcome;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config errors are reported once logging is up.
    let (config, config_error) = match config::load_config(&cli.config).await {
        Ok(config) => (config, None),
        Err(err) => (WizardConfig::default(), Some(err)),
    };

    wizard_observe::tracing_setup::init_tracing(
        cli.log_filter(&config.telemetry.log_filter),
        cli.otel || config.telemetry.otel,
    )
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    if let Some(err) = config_error {
        tracing::warn!("{err:#}, using defaults");
    }

    let bus = EventBus::from_config(&config.engine);
    let mut events = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::debug!(event = event.kind(), "wizard event"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event log lagging behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let context =
        WizardContext::from_config(&config.engine).with_debug(cli.debug || config.engine.debug);
    let callbacks = EventCallbacks::new()
        .on_error(|err| tracing::debug!(error = %err, "wizard operation failed"))
        .with_bus(bus);

    let engine = WizardEngine::start(
        account::account_setup()?,
        context,
        serde_json::json!({}),
        callbacks,
    )
    .await?;

    let outcome = session::run(&engine).await;
    wizard_observe::tracing_setup::shutdown_tracing();

    match outcome? {
        Outcome::Completed(data) => {
            println!();
            println!("  {} Account created", style("✓").green().bold());
            println!();
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Outcome::Abandoned => {
            println!();
            println!("  {}", style("Wizard abandoned.").dim());
        }
    }

    Ok(())
}
