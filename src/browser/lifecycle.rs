//! Shutdown coordination.

use crate::error::Result;
use crate::types::Event;
use std::time::Duration;

use super::WallpaperBrowser;

/// How long shutdown waits for a cancelled download to let go of its slot
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

impl WallpaperBrowser {
    /// Gracefully shut down the browser
    ///
    /// This method performs a graceful shutdown sequence:
    /// 1. Stops accepting new downloads
    /// 2. Cancels the active download, if any (its partial file is kept)
    /// 3. Waits for the download slot to be released, with a timeout (30 seconds)
    /// 4. Emits [`Event::Shutdown`]
    ///
    /// Calling it again is harmless.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        self.accepting_new
            .store(false, std::sync::atomic::Ordering::SeqCst);
        tracing::info!("Stopped accepting new downloads");

        if let Ok(id) = self.downloads.cancel() {
            tracing::info!(item_id = %id, "Cancelled active download");
        }

        match tokio::time::timeout(SHUTDOWN_TIMEOUT, self.downloads.wait_until_idle()).await {
            Ok(()) => tracing::debug!("Download slot released"),
            Err(_) => tracing::warn!(
                "Timeout waiting for the active download to stop, proceeding with shutdown"
            ),
        }

        self.event_tx.send(Event::Shutdown).ok();
        tracing::info!("Graceful shutdown complete");
        Ok(())
    }
}
