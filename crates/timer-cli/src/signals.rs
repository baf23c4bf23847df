//! Signal handling for graceful loop shutdown.
//!
//! SIGTERM and SIGINT set an atomic flag that the tick loop checks between
//! ticks. A tick wait already in progress is not interrupted; the loop
//! exits after the current tick returns.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Shared shutdown state.
#[derive(Debug, Default)]
pub struct SignalState {
    /// Set to true when a shutdown signal is received.
    shutdown_requested: AtomicBool,
    /// Count of signals received (for diagnostics).
    signal_count: AtomicU32,
}

impl SignalState {
    /// Check if shutdown has been requested.
    #[inline]
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Relaxed)
    }

    /// Request shutdown (can be called from any thread).
    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::Relaxed);
    }

    fn record_signal(&self) {
        self.signal_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the total number of signals received.
    pub fn signal_count(&self) -> u32 {
        self.signal_count.load(Ordering::Relaxed)
    }
}

/// Cloneable handle to the shutdown state.
#[derive(Clone, Debug)]
pub struct SignalHandler {
    state: Arc<SignalState>,
}

impl SignalHandler {
    /// Create a handler and register SIGTERM/SIGINT handlers on Unix.
    pub fn new() -> std::io::Result<Self> {
        let handler = Self {
            state: Arc::new(SignalState::default()),
        };

        #[cfg(unix)]
        handler.register_unix_handlers()?;

        Ok(handler)
    }

    /// Create a handler without touching process signal dispositions.
    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        Self {
            state: Arc::new(SignalState::default()),
        }
    }

    #[cfg(unix)]
    #[allow(unsafe_code)]
    fn register_unix_handlers(&self) -> std::io::Result<()> {
        use std::os::raw::c_int;

        // Handlers may only touch atomics; a watcher thread forwards the
        // flag into the shared state.
        static SHUTDOWN_FLAG: AtomicBool = AtomicBool::new(false);

        extern "C" fn shutdown_handler(_: c_int) {
            SHUTDOWN_FLAG.store(true, Ordering::Relaxed);
        }

        let state = Arc::clone(&self.state);
        std::thread::Builder::new()
            .name("signal-watch".into())
            .spawn(move || loop {
                if SHUTDOWN_FLAG.swap(false, Ordering::Relaxed) {
                    info!("Shutdown signal received");
                    state.record_signal();
                    state.request_shutdown();
                }
                if state.shutdown_requested() {
                    break;
                }
                std::thread::sleep(std::time::Duration::from_millis(10));
            })?;

        let handler = shutdown_handler as extern "C" fn(c_int) as libc::sighandler_t;
        // SAFETY: the handler only performs an atomic store, which is
        // async-signal-safe.
        unsafe {
            libc::signal(libc::SIGTERM, handler);
            libc::signal(libc::SIGINT, handler);
        }

        debug!("Unix signal handlers registered");
        Ok(())
    }

    /// Check if shutdown has been requested.
    #[inline]
    pub fn shutdown_requested(&self) -> bool {
        self.state.shutdown_requested()
    }

    /// Manually request shutdown, which also stops the watcher thread.
    pub fn request_shutdown(&self) {
        self.state.request_shutdown();
    }

    /// Get the signal state for inspection.
    pub fn state(&self) -> &SignalState {
        &self.state
    }
}
