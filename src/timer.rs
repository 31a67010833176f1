use std::pin::Pin;
use std::time::Duration;
use tokio::time::{Instant, Sleep};

/// Single-slot hide timer. Scheduling replaces whatever was pending, so at
/// most one timer is ever armed.
#[derive(Debug, Default)]
pub struct HideTimer {
    sleep: Option<Pin<Box<Sleep>>>,
}

impl HideTimer {
    pub fn schedule(&mut self, delay: Duration) {
        // `sleep` caps absurdly large delays instead of overflowing the deadline.
        self.sleep = Some(Box::pin(tokio::time::sleep(delay)));
    }

    /// Drop the pending timer, if any. Returns whether one was armed.
    pub fn cancel(&mut self) -> bool {
        self.sleep.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.sleep.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.sleep.as_ref().map(|s| s.deadline())
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline()
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Resolves once the armed timer elapses, disarming it. Pends forever when
    /// nothing is armed. Dropping the future early leaves the timer armed.
    pub async fn fired(&mut self) {
        match &mut self.sleep {
            Some(sleep) => {
                sleep.as_mut().await;
                self.sleep = None;
            }
            None => futures_util::future::pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    #[tokio::test(start_paused = true)]
    async fn idle_timer_never_fires() {
        let mut timer = HideTimer::default();
        assert!(!timer.is_pending());
        assert!(timeout(Duration::from_secs(60), timer.fired()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn reschedule_replaces_pending_deadline() {
        let mut timer = HideTimer::default();
        timer.schedule(Duration::from_millis(1000));
        tokio::time::advance(Duration::from_millis(400)).await;
        timer.schedule(Duration::from_millis(1000));
        assert_eq!(timer.remaining(), Some(Duration::from_millis(1000)));

        let start = Instant::now();
        timer.fired().await;
        assert!(!timer.is_pending());
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_wait_keeps_timer_armed() {
        let mut timer = HideTimer::default();
        timer.schedule(Duration::from_millis(500));
        assert!(timeout(Duration::from_millis(100), timer.fired()).await.is_err());
        assert!(timer.is_pending());
        timer.fired().await;
        assert!(!timer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_reports_whether_armed() {
        let mut timer = HideTimer::default();
        assert!(!timer.cancel());
        timer.schedule(Duration::from_millis(10));
        assert!(timer.cancel());
        assert_eq!(timer.deadline(), None);
    }
}
