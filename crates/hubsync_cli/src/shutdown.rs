use std::sync::atomic::{AtomicBool, Ordering};

use console::Term;

/// Set once the operator asks the run to stop.
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// The flag the sync engine polls between entities.
#[inline]
pub(crate) fn shutdown_flag() -> &'static AtomicBool {
    &SHUTDOWN_REQUESTED
}

/// Install the Ctrl+C handler.
///
/// The first signal only raises the flag, so the in-flight entity can finish
/// its commit and the run stays resumable. A second signal aborts the
/// process with the conventional 128+SIGINT status.
pub(crate) fn setup_shutdown_handler() {
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::error!("cannot listen for Ctrl+C; interrupt handling disabled");
            return;
        }

        SHUTDOWN_REQUESTED.store(true, Ordering::Release);
        if Term::stdout().is_term() {
            eprintln!("\nStopping after the current entity commits. Ctrl+C again to abort.");
        } else {
            tracing::warn!("shutdown requested, stopping after the current entity");
        }

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_starts_clear_and_is_shared() {
        let flag = shutdown_flag();
        assert!(!flag.load(Ordering::Acquire));
        // every caller sees the same static
        assert!(std::ptr::eq(flag, shutdown_flag()));
    }
}
