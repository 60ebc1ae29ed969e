// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process daemon startup: the body of the `courierd` binary. Acquires
//! the control lock, mounts the HTTP server on a background task, installs
//! signal handlers that flip a shutdown flag, runs the main loop (§10.1)
//! until flagged, then stops the server (§4.K).

use super::control::{ControlPaths, RuntimeState};
use super::mainloop::{MainLoop, TickIntervals};
use crate::config::WeftConfig;
use crate::http::{build_router, AppState};
use crate::registry::ProjectRegistry;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use weft_bus::EventBus;
use weft_cas::{ArtifactStore, CasStore, Manifest};
use weft_core::error::{Error, Result};
use weft_mailbox::{LockManager, MailboxStore, MessageStateManager};

/// Holds the daemon's exclusive lock file for the process lifetime; dropping
/// it releases the lock so a subsequent `start` can succeed.
struct LockGuard(std::fs::File);

fn acquire_lock(paths: &ControlPaths) -> Result<LockGuard> {
    use fs2::FileExt;
    let file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(paths.lock_path())
        .map_err(Error::from)?;
    file.try_lock_exclusive().map_err(|_| Error::conflict("courier daemon already running"))?;
    Ok(LockGuard(file))
}

fn manifest_path(project_root: &Path) -> PathBuf {
    project_root.join(".weft/artifacts/manifest.jsonl")
}

/// Run the daemon to completion: blocks until a shutdown signal arrives.
pub async fn run(project_root: PathBuf) -> Result<()> {
    let config = WeftConfig::load(&project_root)?;
    let paths = ControlPaths::new(&project_root);
    paths.ensure_dirs().map_err(Error::from)?;
    let _lock = acquire_lock(&paths)?;

    let store = MailboxStore::new(&config.mailbox_root);
    let locks = LockManager::load(store.clone())?;
    let state_manager = Arc::new(MessageStateManager::new(store, locks));

    let cas = CasStore::new(&config.store_root);
    let manifest = Manifest::open(manifest_path(&project_root))?;
    let artifacts = Arc::new(ArtifactStore::new(cas, manifest));

    let registry = Arc::new(ProjectRegistry::load(paths.registry_path())?);
    let bus = EventBus::new();

    let app_state = AppState::new(state_manager.clone(), registry);
    let router = build_router(&config.courier_prefix, app_state);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .map_err(|err| Error::Fatal(anyhow::anyhow!("failed to bind {}: {err}", config.bind_addr())))?;
    let local_addr = listener.local_addr().map_err(Error::from)?;

    let mut server_shutdown_rx = shutdown_rx.clone();
    let server_task = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = server_shutdown_rx.changed().await;
            })
            .await
    });

    let state = RuntimeState { pid: std::process::id(), host: config.courier_host.clone(), port: local_addr.port(), started_at: Utc::now() };
    state.write(&paths).map_err(Error::from)?;
    info!(bind = %local_addr, "courier daemon started");

    install_signal_handlers(shutdown_tx.clone());

    let intervals = TickIntervals {
        outbound_drain: config.outbound_drain_interval(),
        retry_scan: config.retry_scan_interval(),
        expiry_sweep: config.expiry_sweep_interval(),
    };
    let main_loop = MainLoop::new(state_manager, artifacts, bus, intervals);
    main_loop.run(shutdown_rx).await;

    let _ = shutdown_tx.send(true);
    let _ = server_task.await;

    let _ = std::fs::remove_file(paths.pid_path());
    let _ = std::fs::remove_file(paths.state_path());
    info!("courier daemon stopped");
    Ok(())
}

#[cfg(unix)]
fn install_signal_handlers(shutdown_tx: watch::Sender<bool>) {
    use tokio::signal::unix::{signal, SignalKind};
    tokio::spawn(async move {
        let mut term = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(_) => return,
        };
        let mut int = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(_) => return,
        };
        tokio::select! {
            _ = term.recv() => {}
            _ = int.recv() => {}
        }
        let _ = shutdown_tx.send(true);
    });
}

#[cfg(not(unix))]
fn install_signal_handlers(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = shutdown_tx.send(true);
    });
}
