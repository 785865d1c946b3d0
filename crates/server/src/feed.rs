//! Live activity feed backed by Postgres LISTEN/NOTIFY.
//!
//! A database trigger fires `NOTIFY guest_changes` whenever a guest row is
//! inserted or updated. A background task holds a `PgListener` on that
//! channel and fans each notification out over a `tokio::sync::broadcast`
//! channel. The SSE endpoint subscribes and tells connected dashboards to
//! refetch the activity fragment; no payload crosses the wire.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::sync::broadcast;

/// Postgres notification channel the guest table trigger fires on.
pub const CHANNEL: &str = "guest_changes";

/// Buffered change signals per subscriber. Subscribers that lag simply
/// miss signals and catch up on the next one, so a small buffer is enough.
const BUFFER: usize = 16;

/// Delay before re-establishing a dropped listener connection.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Broadcast hub for guest table change signals.
#[derive(Clone)]
pub struct ActivityFeed {
    sender: broadcast::Sender<()>,
}

impl ActivityFeed {
    /// Create the feed and spawn the listener task.
    ///
    /// The task runs for the lifetime of the process and reconnects with a
    /// delay if the database connection drops.
    #[must_use]
    pub fn spawn(pool: PgPool) -> Self {
        let (sender, _) = broadcast::channel(BUFFER);
        let feed = Self { sender };

        tokio::spawn(listen_loop(pool, feed.sender.clone()));

        feed
    }

    /// Subscribe to change signals.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    #[cfg(test)]
    pub(crate) fn for_test() -> Self {
        let (sender, _) = broadcast::channel(BUFFER);
        Self { sender }
    }

    #[cfg(test)]
    fn notify(&self) {
        let _ = self.sender.send(());
    }
}

async fn listen_loop(pool: PgPool, sender: broadcast::Sender<()>) {
    loop {
        match PgListener::connect_with(&pool).await {
            Ok(mut listener) => {
                if let Err(err) = listener.listen(CHANNEL).await {
                    tracing::warn!(error = %err, "Failed to LISTEN on guest change channel");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                    continue;
                }

                tracing::info!(channel = CHANNEL, "Listening for guest changes");

                loop {
                    match listener.recv().await {
                        Ok(_) => {
                            // send() only fails when nobody is subscribed
                            let _ = sender.send(());
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "Guest change listener disconnected");
                            break;
                        }
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "Could not connect guest change listener");
            }
        }

        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_signal() {
        let feed = ActivityFeed::for_test();
        let mut rx = feed.subscribe();

        feed.notify();

        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_signals() {
        let feed = ActivityFeed::for_test();

        feed.notify();

        let mut rx = feed.subscribe();
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
