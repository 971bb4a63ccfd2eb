//! Disposable headless-browser session.
//!
//! Each audit gets its own browser bound to an ephemeral local debugging
//! port. The session must be closed on every exit path; the engine owns
//! that guarantee.

use crate::error::{Error, Result};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep};
use tracing::debug;

/// A launched browser plus its event-handler task.
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    /// Launch a new headless browser on an ephemeral port.
    pub async fn launch() -> Result<Self> {
        let config = BrowserConfig::builder()
            .new_headless_mode()
            .args(vec![
                "--disable-gpu",
                "--no-sandbox",
                "--disable-dev-shm-usage",
                // Ephemeral port: the OS picks, no collisions across workers
                "--remote-debugging-port=0",
            ])
            .build()
            .map_err(Error::Browser)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::Browser(format!("launch failed: {e}")))?;

        // Drain CDP events in the background for the life of the session
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        // Brief settle before the first CDP command
        sleep(Duration::from_millis(300)).await;

        debug!("headless browser launched");
        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// Open a page and navigate to the URL.
    pub async fn open(&self, url: &str) -> Result<Page> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| Error::Browser(format!("navigation to {url} failed: {e}")))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| Error::Browser(format!("navigation to {url} failed: {e}")))?;
        Ok(page)
    }

    /// Tear the browser down gracefully: close, then reap the child.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            debug!("browser close: {e}");
        }
        let _ = self.browser.wait().await;
        debug!("headless browser closed");
    }
}

impl Drop for BrowserSession {
    /// Last-resort teardown when the session is dropped without `close`
    /// (panic or future cancellation). chromiumoxide kills the child
    /// process when the `Browser` drops; this reaps the event-drain task.
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}
