//! voice-shopping-daemon: Background daemon for a voice-driven shopping list
//!
//! This daemon provides:
//! - A recognition session controller with retry, network recovery and
//!   inactivity handling
//! - Multilingual command interpretation (add, remove, search, clear, help)
//! - A persisted shopping list with categories and suggestions
//! - An IPC server through which a front-end hosts the platform speech
//!   recognizer and renders status, speech and list updates

mod config;
mod dispatch;
mod events;
mod interpreter;
mod ipc;
mod lifecycle;
mod recognizer;
mod session;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::dispatch::{Catalog, ListStore, ShoppingDispatcher};
use crate::events::{AssistantEvent, Feedback};
use crate::ipc::Server;
use crate::lifecycle::ShutdownSignal;
use crate::recognizer::{BridgeRecognizer, FrontendPresence};
use crate::session::{SessionController, TokioScheduler};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "voice-shopping-daemon starting"
    );

    // Load configuration
    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(?config.socket_path, locale = %config.locale, "configuration loaded");

    let mut shutdown = ShutdownSignal::register().context("failed to register signal handlers")?;

    // Everything user-facing goes out on one broadcast channel
    let (event_tx, _event_rx) = broadcast::channel::<AssistantEvent>(256);
    let feedback = Feedback::new(event_tx.clone());
    // IPC server, recognizer callbacks and timers -> session controller
    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let presence = FrontendPresence::new();

    let dispatcher = ShoppingDispatcher::open(
        ListStore::new(&config.list_path),
        Catalog::default(),
        feedback.clone(),
    )
    .context("failed to load shopping list")?;
    info!(items = dispatcher.list().items().len(), "shopping list ready");

    let mut controller = SessionController::new(
        config.session,
        &config.locale,
        BridgeRecognizer::new(feedback.clone(), presence.clone()),
        TokioScheduler::new(input_tx.clone()),
        dispatcher,
        feedback.clone(),
    );

    let server = Server::new(
        &config.socket_path,
        controller.locale(),
        input_tx,
        feedback,
        presence,
    )?;

    // Mirror controller state into the IPC status snapshot
    let mut state_rx = event_tx.subscribe();
    let server_for_events = &server;

    info!("daemon initialized, entering main loop");

    tokio::select! {
        _ = controller.run(input_rx) => {
            info!("session controller exited");
        }

        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        _ = async {
            loop {
                match state_rx.recv().await {
                    Ok(AssistantEvent::StateChanged { to, .. }) => {
                        server_for_events.set_state(to).await;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "state event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        } => {
            info!("state event handler exited");
        }

        reason = shutdown.wait() => {
            info!(%reason, "shutdown signal received");
        }
    }

    info!("shutting down...");

    // Dropping the controller stops any live recognizer session
    drop(controller);
    server.shutdown().await;

    info!("voice-shopping-daemon stopped");

    Ok(())
}
