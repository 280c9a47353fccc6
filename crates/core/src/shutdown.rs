use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Process-wide graceful shutdown via a shared CancellationToken.
///
/// The tray's Quit command and the OS signal listener both cancel the same
/// token; the monitor loop and tooltip refresher watch it and stop.
#[derive(Debug)]
pub struct ShutdownGuard {
    token: CancellationToken,
}

impl ShutdownGuard {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// The cancellation token all background tasks should monitor.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Spawn a background task that cancels the token on SIGINT/SIGTERM
    /// (Ctrl+C elsewhere). Must be called from within a tokio runtime.
    pub fn spawn_signal_listener(&self) {
        let token = self.token.clone();
        tokio::spawn(async move {
            #[cfg(unix)]
            {
                let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate())
                {
                    Ok(sig) => sig,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to register SIGTERM handler");
                        return;
                    }
                };
                tokio::select! {
                    _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
                    _ = signal::ctrl_c() => tracing::info!("received SIGINT, shutting down"),
                }
            }
            #[cfg(not(unix))]
            {
                let _ = signal::ctrl_c().await;
                tracing::info!("received Ctrl+C, shutting down");
            }
            token.cancel();
        });
    }
}

impl Default for ShutdownGuard {
    fn default() -> Self {
        Self::new()
    }
}
