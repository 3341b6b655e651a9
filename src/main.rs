//! gesture-text-daemon: background daemon for gesture-driven text entry
//!
//! This daemon provides:
//! - A temporal stabilization engine per client/stream (vote, gate, commit)
//! - IPC server for per-request classification and text editing
//! - Optional frame loop reading a continuous observation stream
//!
//! Camera capture and landmark detection happen upstream; the daemon only
//! sees landmarks or already-classified gestures.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use gesture_text::classifier::RejectionClassifier;
use gesture_text::config::Config;
use gesture_text::events::TextEvent;
use gesture_text::frames::{FrameListener, FrameLoop, FrameSource};
use gesture_text::ipc::Server;
use gesture_text::lifecycle::ShutdownSignal;
use gesture_text::state::{Session, StabilizationEngine};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "gesture-text-daemon starting"
    );

    // Load configuration
    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(?config.socket_path, ?config.model_path, "configuration loaded");

    // Load the classifier; without one only pre-classified gestures work
    let classifier = match RejectionClassifier::load(&config.model_path, &config.engine) {
        Ok(c) => {
            info!(
                kind = c.model_kind(),
                distance_rejection = c.has_reference(),
                "classifier loaded"
            );
            Some(Arc::new(c))
        }
        Err(e) => {
            error!(error = %e, "failed to load classifier");
            warn!("continuing in label-only mode - landmark observations will be refused");
            None
        }
    };

    let shutdown = ShutdownSignal::new();

    // Sessions -> event logger
    let (event_tx, mut event_rx) = broadcast::channel::<TextEvent>(64);
    let next_session = Arc::new(AtomicU64::new(0));

    let server = Server::new(
        &config.socket_path,
        config.engine.clone(),
        classifier.clone(),
        event_tx.clone(),
        Arc::clone(&next_session),
    )?;

    // Optional frame stream: listener thread -> frame loop
    let mut frame_listener = None;
    let mut frame_pipeline = None;
    if let Some(path) = &config.frame_source {
        let (frame_tx, frame_rx) = mpsc::channel(256);
        let listener = FrameListener::new(FrameSource::from(path.as_path()), frame_tx);

        match listener.start() {
            Ok(()) => {
                info!(?path, "frame listener started");
                let id = next_session.fetch_add(1, Ordering::Relaxed);
                let engine = StabilizationEngine::new(&config.engine, classifier.clone());
                let session = Session::new(id, engine, event_tx.clone());
                frame_pipeline = Some((FrameLoop::new(session), frame_rx));
                frame_listener = Some(listener);
            }
            Err(e) => {
                error!(?e, "failed to start frame listener");
                warn!("continuing without frame stream");
            }
        }
    }

    // Once the stream ends the daemon keeps serving IPC until shutdown
    let frames = async move {
        if let Some((mut frame_loop, frame_rx)) = frame_pipeline {
            frame_loop.run(frame_rx).await;
        }
        std::future::pending::<()>().await
    };

    info!("daemon initialized, entering main loop");

    // Main event loop
    tokio::select! {
        // Run the IPC server (accepts client connections)
        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        // Run the frame loop, if a stream is configured
        _ = frames => {}

        // Log text events from every session
        _ = async {
            loop {
                match event_rx.recv().await {
                    Ok(event) => {
                        info!(session = event.session(), %event, "text event");
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "text event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        } => {
            info!("text event handler exited");
        }

        // Wait for shutdown signal
        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    // Cleanup
    info!("shutting down...");

    if let Some(listener) = &frame_listener {
        listener.stop();
    }
    server.shutdown().await;

    info!("gesture-text-daemon stopped");

    Ok(())
}
