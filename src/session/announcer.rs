//! Periodic "operation paused" notice
//!
//! While a session is paused the operator sees a reminder every few seconds.
//! The announcer owns at most one background task; stopping it cancels the
//! task and waits for it to finish, so no ticker survives its pause episode.

use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Notice emitted on every tick
pub const PAUSED_NOTICE: &str = "Operation has been paused...";

struct ActiveAnnouncer {
    cancel: oneshot::Sender<()>,
    task: JoinHandle<u64>,
}

/// Heartbeat task active only while the session is paused
pub struct ProgressAnnouncer {
    interval: Duration,
    active: Option<ActiveAnnouncer>,
}

impl ProgressAnnouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Starts announcing
    ///
    /// A second `start` while already active is ignored. Returns true if a
    /// new task was spawned.
    pub fn start(&mut self) -> bool {
        if self.active.is_some() {
            return false;
        }

        let (cancel, mut cancelled) = oneshot::channel::<()>();
        let period = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            let mut notices = 0u64;
            loop {
                tokio::select! {
                    _ = &mut cancelled => break,
                    _ = ticker.tick() => {
                        tracing::info!("{}", PAUSED_NOTICE);
                        notices += 1;
                    }
                }
            }
            notices
        });

        self.active = Some(ActiveAnnouncer { cancel, task });
        true
    }

    /// Stops announcing and joins the task
    ///
    /// Safe to call when nothing is running.
    ///
    /// # Returns
    ///
    /// The number of notices the stopped task emitted, or `None` if no
    /// announcer was active.
    pub async fn stop(&mut self) -> Option<u64> {
        let ActiveAnnouncer { cancel, task } = self.active.take()?;

        // The task may have already exited; a closed channel is fine
        let _ = cancel.send(());

        match task.await {
            Ok(notices) => Some(notices),
            Err(e) => {
                tracing::warn!("Pause announcer ended abnormally: {}", e);
                Some(0)
            }
        }
    }
}

impl Drop for ProgressAnnouncer {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stop_without_start() {
        let mut announcer = ProgressAnnouncer::new(Duration::from_secs(5));
        assert_eq!(announcer.stop().await, None);
        assert!(!announcer.is_active());
    }

    #[tokio::test]
    async fn test_start_is_single_instance() {
        let mut announcer = ProgressAnnouncer::new(Duration::from_secs(5));
        assert!(announcer.start());
        assert!(!announcer.start());
        assert!(announcer.is_active());

        assert!(announcer.stop().await.is_some());
        assert!(!announcer.is_active());
        assert_eq!(announcer.stop().await, None);
    }

    #[tokio::test]
    async fn test_announces_periodically_until_stopped() {
        let mut announcer = ProgressAnnouncer::new(Duration::from_millis(20));
        announcer.start();

        tokio::time::sleep(Duration::from_millis(110)).await;
        let notices = announcer.stop().await.unwrap();

        // First tick fires immediately, then roughly every 20ms
        assert!(notices >= 2, "expected several notices, got {}", notices);
    }

    #[tokio::test]
    async fn test_restart_after_stop() {
        let mut announcer = ProgressAnnouncer::new(Duration::from_millis(10));
        announcer.start();
        announcer.stop().await;

        assert!(announcer.start());
        assert!(announcer.stop().await.is_some());
    }
}
