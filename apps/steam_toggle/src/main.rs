use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use deck_integration::{HttpPresence, LoggedPresence, PresenceService, TracingNotifier, VirtualDeck};
use shared::domain::{AlertPolicy, ButtonIndex};
use toggle_core::{
    command_channel, forward_presses, AlertSink, DeviceSurface, IconStore, PresenceClient,
    ToggleController,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod console;

use config::{load_settings, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(about = "Toggle Steam presence from a Stream Deck button")]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(&args.config)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let button = ButtonIndex(settings.button_index);
    let call_timeout = settings.call_timeout();
    info!(config = %args.config.display(), %button, "starting steam status toggle");

    let icons = IconStore::load(&settings.online_icon, &settings.invisible_icon)
        .await
        .context("failed to load button icons")?;

    let presence: Arc<dyn PresenceService> = match settings.presence_endpoint()? {
        Some(endpoint) => {
            info!(%endpoint, "using HTTP presence service");
            Arc::new(HttpPresence::new(endpoint, settings.presence_token.clone()))
        }
        None => {
            warn!("no presence_url configured; presence updates are only logged");
            Arc::new(LoggedPresence)
        }
    };

    let (deck, presses) = VirtualDeck::new(&settings.render_dir);
    info!(render_dir = %deck.render_dir().display(), "virtual deck ready");

    let alerts = AlertSink::new(Arc::new(TracingNotifier), call_timeout)
        .with_title(settings.alert_title.clone())
        .with_display_duration(settings.alert_display());
    let controller = ToggleController::new(
        icons,
        PresenceClient::new(presence, call_timeout),
        DeviceSurface::new(Arc::new(deck), button, call_timeout),
        alerts,
        AlertPolicy {
            alerts_enabled: settings.alerts_enabled,
        },
    );

    let press_stream = controller
        .take_press_events()
        .context("device press stream was already taken")?;
    let (commands, queue) = command_channel();
    let forwarder = tokio::spawn(forward_presses(press_stream, commands.clone()));
    console::spawn_reader(button, presses, commands).context("failed to start console reader")?;
    let runner = tokio::spawn(controller.run(queue));

    tokio::select! {
        finished = runner => {
            let controller = finished.context("controller task failed")?;
            info!(state = %controller.current(), "controller stopped");
        }
        interrupted = tokio::signal::ctrl_c() => {
            interrupted.context("failed to listen for interrupt")?;
            info!("interrupt received, shutting down");
        }
    }

    forwarder.abort();
    Ok(())
}
