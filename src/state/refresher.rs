use crate::state::messages::WatchEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Periodic render tick. Countdowns and the box-score rotation move on even when no file does,
/// and in lazy mode this is the only thing that triggers a render.
pub struct PeriodicRefresher {
    events: mpsc::Sender<WatchEvent>,
    period: Duration,
}

impl PeriodicRefresher {
    pub fn new(events: mpsc::Sender<WatchEvent>, period: Duration) -> Self {
        Self { events, period }
    }

    pub async fn run(self) {
        let mut ticks = interval(self.period);
        // Skip the immediate first tick; startup renders on its own.
        ticks.tick().await;

        loop {
            ticks.tick().await;
            if self.events.send(WatchEvent::RefreshTick).await.is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_after_each_period_not_at_start() {
        let (tx, mut rx) = mpsc::channel(4);
        let task = tokio::spawn(PeriodicRefresher::new(tx, Duration::from_secs(180)).run());

        tokio::time::sleep(Duration::from_secs(179)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(matches!(rx.recv().await, Some(WatchEvent::RefreshTick)));
        task.abort();
    }

    #[tokio::test]
    async fn stops_when_receiver_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let task = tokio::spawn(PeriodicRefresher::new(tx, Duration::from_millis(1)).run());
        assert!(task.await.is_ok());
    }
}
