//! A single instrumented run over a batch of requests.

use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

use crate::config::{IndicatorConfig, RenderConfig, TimingConfig};
use crate::intercept::{install, CounterSnapshot, InstallError, NetworkSlot};
use crate::lifecycle::shutdown::Shutdown;
use crate::progress::ProgressSnapshot;
use crate::render::follow;

/// How a session issues calls and draws progress.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Maximum number of calls in flight at once.
    pub concurrency: usize,
    pub timing: TimingConfig,
    pub render: RenderConfig,
}

impl SessionOptions {
    pub fn from_config(config: &IndicatorConfig) -> Self {
        Self {
            concurrency: config.client.max_concurrency,
            timing: config.timing,
            render: config.render.clone(),
        }
    }
}

/// What happened during a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub requested: usize,
    /// Calls that produced a result, successful or not.
    pub completed: usize,
    pub interrupted: bool,
    pub elapsed_ms: u64,
    pub calls: CounterSnapshot,
    pub progress: ProgressSnapshot,
    /// Frames drawn by the renderer.
    pub frames: usize,
}

/// Instrument `slot`, issue `requests` through it and wait for the
/// indicator to hide again.
///
/// Stops issuing calls when `shutdown` is triggered; pending calls are
/// dropped and settle as cancelled.
pub async fn run_session<Req, Resp, E>(
    slot: &Arc<NetworkSlot<Req, Resp, E>>,
    requests: Vec<Req>,
    options: &SessionOptions,
    shutdown: &Shutdown,
) -> Result<SessionSummary, InstallError>
where
    Req: Send + 'static,
    Resp: Send + 'static,
    E: Display + Send + 'static,
{
    let started = Instant::now();
    let installation = install(slot, options.timing)?;
    let mut shutdown_rx = shutdown.subscribe();

    let render_stop = Shutdown::new();
    let renderer = options.render.enabled.then(|| {
        tokio::spawn(follow(
            installation.subscribe(),
            render_stop.subscribe(),
            options.render.bar_width,
            std::io::stderr(),
        ))
    });

    let requested = requests.len();
    tracing::info!(requested, concurrency = options.concurrency, "Session starting");

    let mut calls = stream::iter(requests)
        .map(|request| slot.fetch(request))
        .buffer_unordered(options.concurrency.max(1));

    let mut completed = 0;
    let mut interrupted = shutdown.is_triggered();
    while !interrupted {
        tokio::select! {
            next = calls.next() => match next {
                Some(Ok(_)) => completed += 1,
                Some(Err(e)) => {
                    completed += 1;
                    tracing::warn!(error = %e, "Call failed");
                }
                None => break,
            },
            _ = shutdown_rx.recv() => interrupted = true,
        }
    }
    drop(calls);

    if !interrupted {
        let mut phases = installation.subscribe();
        tokio::select! {
            _ = phases.wait_for(|phase| !phase.is_visible()) => {}
            _ = shutdown_rx.recv() => interrupted = true,
        }
    }

    let calls = installation.counter();
    let progress = installation.progress();
    installation.uninstall();

    render_stop.trigger();
    let frames = match renderer {
        Some(handle) => join_renderer(handle).await,
        None => 0,
    };

    if interrupted {
        tracing::warn!(completed, requested, "Session interrupted");
    } else {
        tracing::info!(completed, failed = calls.failed, "Session finished");
    }

    Ok(SessionSummary {
        requested,
        completed,
        interrupted,
        elapsed_ms: started.elapsed().as_millis() as u64,
        calls,
        progress,
        frames,
    })
}

/// Frames drawn by a finished renderer task; 0 if it panicked or was aborted.
async fn join_renderer(handle: JoinHandle<usize>) -> usize {
    match handle.await {
        Ok(frames) => frames,
        Err(e) => {
            tracing::warn!(error = %e, "Progress renderer did not finish cleanly");
            0
        }
    }
}
