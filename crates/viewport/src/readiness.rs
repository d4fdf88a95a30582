//! Viewport readiness signal.
//!
//! The viewport flips a [`tokio::sync::watch`] flag once it can accept
//! insertions. Restoration waits on a [`ReadyWatch`] with a bounded number
//! of polls instead of guessing with a fixed delay.

use std::time::Duration;

use tokio::sync::watch;

/// Owned by the viewport adapter; marks the viewport ready.
pub struct ViewportReadiness {
    sender: watch::Sender<bool>,
}

impl ViewportReadiness {
    /// A signal that starts out not ready.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    /// A signal that is already ready (e.g. a headless viewport).
    pub fn ready() -> Self {
        let (sender, _) = watch::channel(true);
        Self { sender }
    }

    pub fn mark_ready(&self) {
        self.sender.send_replace(true);
    }

    /// Mark the viewport not ready again, e.g. while it is torn down.
    pub fn reset(&self) {
        self.sender.send_replace(false);
    }

    pub fn is_ready(&self) -> bool {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> ReadyWatch {
        ReadyWatch {
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for ViewportReadiness {
    fn default() -> Self {
        Self::new()
    }
}

/// Read side of [`ViewportReadiness`].
#[derive(Clone)]
pub struct ReadyWatch {
    receiver: watch::Receiver<bool>,
}

impl ReadyWatch {
    pub fn is_ready(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Wait for readiness, polling at most `max_polls` times and waiting up
    /// to `interval` for a change between polls.
    ///
    /// Returns `false` if the viewport is still not ready after the last
    /// poll, or if the signal's owner was dropped while not ready.
    pub async fn wait_ready(&mut self, interval: Duration, max_polls: u32) -> bool {
        for poll in 1..=max_polls {
            if self.is_ready() {
                return true;
            }

            tracing::debug!(poll, max_polls, "Viewport not ready yet");

            match tokio::time::timeout(interval, self.receiver.changed()).await {
                Ok(Ok(())) | Err(_) => {}
                Ok(Err(_)) => return self.is_ready(),
            }
        }
        self.is_ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(10);

    #[tokio::test]
    async fn already_ready_returns_immediately() {
        let readiness = ViewportReadiness::ready();
        let mut watch = readiness.subscribe();
        assert!(watch.wait_ready(INTERVAL, 1).await);
    }

    #[tokio::test]
    async fn becomes_ready_while_waiting() {
        let readiness = ViewportReadiness::new();
        let mut watch = readiness.subscribe();

        let waiter = tokio::spawn(async move { watch.wait_ready(INTERVAL, 50).await });
        tokio::time::sleep(Duration::from_millis(25)).await;
        readiness.mark_ready();

        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn gives_up_after_max_polls() {
        let readiness = ViewportReadiness::new();
        let mut watch = readiness.subscribe();
        assert!(!watch.wait_ready(INTERVAL, 3).await);
        assert!(!readiness.is_ready());
    }

    #[tokio::test]
    async fn dropped_signal_stops_waiting() {
        let readiness = ViewportReadiness::new();
        let mut watch = readiness.subscribe();
        drop(readiness);
        assert!(!watch.wait_ready(Duration::from_secs(60), 1000).await);
    }

    #[test]
    fn reset_clears_ready() {
        let readiness = ViewportReadiness::ready();
        readiness.reset();
        assert!(!readiness.subscribe().is_ready());
    }
}
