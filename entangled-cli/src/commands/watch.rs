//! Watch command implementation.

use std::path::Path;
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use entangled::errors::{EntangledError, Result};
use entangled::interface::{self, Context};
use entangled::io::TransactionMode;

const SETTLE: Duration = Duration::from_millis(200);

/// Returns true for events Entangled itself causes or does not care
/// about: everything under `.entangled/`.
fn ignored(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str() == ".entangled")
}

/// Watches the project and runs a full sync after each batch of
/// filesystem events. Each sync is a fresh transaction.
pub fn watch(ctx: &Context) -> Result<()> {
    println!("watching for changes, press Ctrl+C to stop");

    // Initial sync so the watch starts from a consistent state
    if let Err(e) = interface::sync(ctx, TransactionMode::Fail) {
        eprintln!("sync error: {}", e);
    }

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            if let Ok(event) = res {
                let _ = tx.send(event);
            }
        },
        notify::Config::default(),
    )
    .map_err(|e| EntangledError::Watch(e.to_string()))?;

    watcher
        .watch(Path::new("."), RecursiveMode::Recursive)
        .map_err(|e| EntangledError::Watch(e.to_string()))?;

    loop {
        let event = rx
            .recv()
            .map_err(|e| EntangledError::Watch(e.to_string()))?;

        let mut relevant = event.paths.iter().any(|p| !ignored(p));

        // Drain the rest of the batch before syncing
        loop {
            match rx.recv_timeout(SETTLE) {
                Ok(event) => relevant |= event.paths.iter().any(|p| !ignored(p)),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(EntangledError::Watch("watcher disconnected".to_string()))
                }
            }
        }

        if relevant {
            tracing::debug!("change batch detected");
            if let Err(e) = interface::sync(ctx, TransactionMode::Fail) {
                eprintln!("sync error: {}", e);
            }
        }
    }
}
