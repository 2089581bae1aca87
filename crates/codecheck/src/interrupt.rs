//! Ctrl-C handling for batch runs.
//!
//! The first SIGINT or SIGTERM only raises a flag: the run stops handing out
//! files, waits for the ones in flight and removes its scratch directory. A
//! second signal exits immediately.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use tracing::{debug, warn};

/// Exit status of a run stopped by a signal (128 + SIGINT).
pub(crate) const INTERRUPTED_EXIT_CODE: u8 = 130;

#[derive(Debug, Clone, Default)]
pub(crate) struct Interrupt {
    requested: Arc<AtomicBool>,
}

impl Interrupt {
    /// Starts a thread that raises the flag on the first signal.
    ///
    /// Signal handling is best effort: if it cannot be set up the run goes
    /// on with the default behavior and a warning is logged.
    pub(crate) fn install() -> Self {
        let interrupt = Self::default();

        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                warn!(%err, "signal handling unavailable");
                return interrupt;
            }
        };

        let requested = Arc::clone(&interrupt.requested);
        let spawned = thread::Builder::new()
            .name("codecheck-signals".to_string())
            .spawn(move || {
                runtime.block_on(async {
                    wait_for_shutdown_signal().await;
                    requested.store(true, Ordering::SeqCst);
                    eprintln!(
                        "interrupted: finishing files in progress, press Ctrl-C again to abort"
                    );
                    wait_for_shutdown_signal().await;
                });
                std::process::exit(i32::from(INTERRUPTED_EXIT_CODE));
            });

        match spawned {
            Ok(_) => debug!("signal handler installed"),
            Err(err) => warn!(%err, "failed to start signal thread"),
        }
        interrupt
    }

    pub(crate) fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub(crate) fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let (Ok(mut sigterm), Ok(mut sigint)) = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) else {
            warn!("failed to register signal handlers");
            return std::future::pending().await;
        };
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_err() {
            warn!("failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}
