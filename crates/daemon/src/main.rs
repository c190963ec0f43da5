// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! braidd: the braid orchestrator daemon.
//!
//! Boot order matters and mirrors shutdown in reverse: config → storage
//! (replay) → provider registry → event bus → engine + listener. On
//! shutdown: stop intake, drain the engine, checkpoint, close.

use braid_config::Config;
use braid_core::SystemClock;
use braid_daemon::engine::{Engine, Runtime, RuntimeSettings};
use braid_daemon::event_bus::EventBus;
use braid_daemon::listener::Listener;
use braid_daemon::notify::DesktopNotifier;
use braid_providers::{HttpProviderApi, ProviderRegistry};
use braid_storage::Store;
use fs2::FileExt;
use std::sync::Arc;
use tokio::net::UnixListener;
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let config_path = braid_daemon::env::config_path(&args);

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("braidd: failed to load config {}: {e}", config_path.display());
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("braidd: failed to start tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    let code = runtime.block_on(run(config));
    std::process::exit(code);
}

async fn run(config: Config) -> i32 {
    // File logging with env-filter; the guard must outlive the daemon.
    let _ = std::fs::create_dir_all(&config.server.log_dir);
    let appender = tracing_appender::rolling::daily(&config.server.log_dir, "braidd.log");
    let (writer, _log_guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(writer)
        .with_ansi(false)
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "braidd starting");
    if let Some(host) = &config.workflow.host {
        tracing::info!(host, "external workflow runtime configured (unused by the built-in engine)");
    }

    // Single-instance lock under the state dir.
    if let Err(e) = std::fs::create_dir_all(&config.storage.state_dir) {
        tracing::error!(error = %e, "cannot create state dir");
        return 1;
    }
    let lock_path = config.storage.state_dir.join("braidd.lock");
    let lock_file = match std::fs::File::create(&lock_path) {
        Ok(file) => file,
        Err(e) => {
            tracing::error!(error = %e, "cannot create lock file");
            return 1;
        }
    };
    if lock_file.try_lock_exclusive().is_err() {
        tracing::error!(path = %lock_path.display(), "another braidd instance holds the lock");
        return 1;
    }

    // Storage first: replay is the source of truth for everything after.
    let db_path = if config.storage.db_file.is_absolute() {
        config.storage.db_file.clone()
    } else {
        config.storage.state_dir.join(&config.storage.db_file)
    };
    let (store, replayed) = match Store::open(&config.storage.state_dir, Some(&db_path)) {
        Ok(opened) => opened,
        Err(e) => {
            tracing::error!(error = %e, "failed to open store");
            return 1;
        }
    };
    tracing::info!(replayed, "store recovered");
    let store = Arc::new(store);

    // Registry second (rehydrated in startup), bus third, workers last.
    let registry = Arc::new(ProviderRegistry::new());
    let (bus, engine_rx) = EventBus::new(config.workflow.event_buffer);

    let runtime = Arc::new(Runtime::new(
        Arc::clone(&store),
        Arc::clone(&registry),
        Arc::new(HttpProviderApi::new()),
        Arc::new(DesktopNotifier),
        bus.clone(),
        SystemClock,
        RuntimeSettings::from_config(&config),
    ));

    if let Err(e) = runtime.startup(&config).await {
        tracing::error!(error = %e, "startup reconciliation failed");
        return 1;
    }

    // Socket listener.
    let socket_path = config.server.socket.clone();
    let _ = std::fs::remove_file(&socket_path);
    let unix = match UnixListener::bind(&socket_path) {
        Ok(unix) => unix,
        Err(e) => {
            tracing::error!(path = %socket_path.display(), error = %e, "failed to bind socket");
            return 1;
        }
    };
    let shutdown = Arc::new(Notify::new());
    let listener = Listener::new(unix, Arc::clone(&runtime), Arc::clone(&shutdown));
    let listener_task = tokio::spawn(listener.run());

    tracing::info!(socket = %socket_path.display(), "braidd ready");

    // Engine loop runs until shutdown (socket request, signal, or bus close).
    let engine = Engine::new(Arc::clone(&runtime), engine_rx);
    let engine_task = tokio::spawn(engine.run());

    tokio::select! {
        _ = shutdown.notified() => {
            tracing::info!("shutdown requested via socket");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupt received");
            runtime.stop();
            let _ = bus.publish(braid_core::Event::Shutdown);
        }
        _ = engine_task => {
            tracing::warn!("engine loop exited");
        }
    }

    // Reverse teardown: stop intake, let the engine drain, close storage.
    shutdown.notify_waiters();
    listener_task.abort();
    let now_ms = braid_core::Clock::epoch_ms(&SystemClock);
    store.close(now_ms);
    let _ = std::fs::remove_file(&socket_path);
    tracing::info!("braidd stopped");
    0
}
