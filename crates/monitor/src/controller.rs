use crate::monitor_loop::PriceMonitor;
use crate::state::{MonitorState, MonitorStatus, StartOutcome, StopOutcome};
use crate::watchlist::Watchlist;
use chrono::{DateTime, Utc};
use price_alert_core::{AlertSink, MonitorConfig, PriceSource, RecipientId};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

enum LoopTask {
    Stopped,
    Running {
        handle: JoinHandle<()>,
        stop_tx: watch::Sender<bool>,
        started_at: DateTime<Utc>,
    },
}

/// Starts and stops the monitor loop.
///
/// The state and the task handle live behind one mutex, so concurrent
/// start requests never spawn a second loop. A loop that died on its own
/// (panic) is reported as stopped and may be started again.
pub struct MonitorController {
    config: MonitorConfig,
    watchlist: Watchlist,
    source: Arc<dyn PriceSource>,
    sink: Arc<dyn AlertSink>,
    recipients: Arc<[RecipientId]>,
    task: Mutex<LoopTask>,
}

impl MonitorController {
    #[must_use]
    pub fn new(
        config: MonitorConfig,
        watchlist: Watchlist,
        source: Arc<dyn PriceSource>,
        sink: Arc<dyn AlertSink>,
        recipients: Vec<RecipientId>,
    ) -> Self {
        Self {
            config,
            watchlist,
            source,
            sink,
            recipients: recipients.into(),
            task: Mutex::new(LoopTask::Stopped),
        }
    }

    /// Spawns the loop unless one is already running or there is nothing to watch.
    pub async fn start(&self) -> StartOutcome {
        let mut task = self.task.lock().await;

        if let LoopTask::Running { handle, .. } = &*task {
            if !handle.is_finished() {
                tracing::debug!("monitor already running");
                return StartOutcome::AlreadyRunning;
            }
            tracing::warn!("previous monitor loop exited unexpectedly, restarting");
            *task = LoopTask::Stopped;
        }

        if self.watchlist.is_empty() {
            return StartOutcome::NothingToMonitor;
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let monitor = PriceMonitor::new(
            &self.config,
            self.watchlist.clone(),
            Arc::clone(&self.source),
            Arc::clone(&self.sink),
            Arc::clone(&self.recipients),
        );
        let handle = tokio::spawn(monitor.run(stop_rx));

        *task = LoopTask::Running {
            handle,
            stop_tx,
            started_at: Utc::now(),
        };
        tracing::info!(symbols = self.watchlist.len(), "monitoring started");
        StartOutcome::Started
    }

    /// Signals the loop and waits for it to finish its current cycle.
    pub async fn stop(&self) -> StopOutcome {
        let mut task = self.task.lock().await;

        match std::mem::replace(&mut *task, LoopTask::Stopped) {
            LoopTask::Stopped => {
                tracing::debug!("monitor already stopped");
                StopOutcome::AlreadyStopped
            }
            LoopTask::Running { handle, .. } if handle.is_finished() => {
                if let Err(e) = handle.await {
                    tracing::error!("monitor loop had failed: {}", e);
                }
                StopOutcome::AlreadyStopped
            }
            LoopTask::Running {
                handle, stop_tx, ..
            } => {
                // Receiver may already be gone if the task just exited.
                let _ = stop_tx.send(true);
                if let Err(e) = handle.await {
                    tracing::error!("monitor loop failed while stopping: {}", e);
                }
                tracing::info!("monitoring stopped");
                StopOutcome::Stopped
            }
        }
    }

    pub async fn status(&self) -> MonitorStatus {
        let task = self.task.lock().await;
        let (state, started_at) = match &*task {
            LoopTask::Running {
                handle, started_at, ..
            } if !handle.is_finished() => (MonitorState::Running, Some(*started_at)),
            _ => (MonitorState::Stopped, None),
        };
        MonitorStatus {
            state,
            started_at,
            watched: self.watchlist.len(),
        }
    }

    pub async fn is_running(&self) -> bool {
        self.status().await.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use price_alert_core::{AlertEvent, PriceError, SinkError, Symbol};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceSource for CountingSource {
        async fn fetch_price(&self, _symbol: &Symbol) -> Result<Decimal, PriceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(dec!(100))
        }
    }

    /// Holds each lookup until the test releases it.
    #[derive(Default)]
    struct GatedSource {
        calls: AtomicUsize,
        completed: AtomicUsize,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl PriceSource for GatedSource {
        async fn fetch_price(&self, _symbol: &Symbol) -> Result<Decimal, PriceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.release.notified().await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok(dec!(100))
        }
    }

    struct PanickingSource;

    #[async_trait]
    impl PriceSource for PanickingSource {
        async fn fetch_price(&self, _symbol: &Symbol) -> Result<Decimal, PriceError> {
            panic!("exchange exploded");
        }
    }

    struct NullSink;

    #[async_trait]
    impl AlertSink for NullSink {
        async fn deliver(&self, _: &AlertEvent, _: &[RecipientId]) -> Result<(), SinkError> {
            Ok(())
        }
    }

    fn fast_config() -> MonitorConfig {
        MonitorConfig {
            poll_interval_ms: 10,
            ..Default::default()
        }
    }

    fn controller(symbols: &[&str], source: Arc<dyn PriceSource>) -> MonitorController {
        controller_with(fast_config(), symbols, source)
    }

    fn controller_with(
        config: MonitorConfig,
        symbols: &[&str],
        source: Arc<dyn PriceSource>,
    ) -> MonitorController {
        let watchlist = Watchlist::from_symbols(symbols.iter().map(|s| Symbol::parse(s).unwrap()));
        MonitorController::new(config, watchlist, source, Arc::new(NullSink), vec![1])
    }

    #[tokio::test]
    async fn start_requires_symbols() {
        let controller = controller(&[], Arc::new(CountingSource::default()));
        assert_eq!(controller.start().await, StartOutcome::NothingToMonitor);
        assert!(!controller.is_running().await);
    }

    #[tokio::test]
    async fn start_twice_keeps_one_loop() {
        let source = Arc::new(CountingSource::default());
        let controller = controller(&["BTC"], source.clone());

        assert_eq!(controller.start().await, StartOutcome::Started);
        assert_eq!(controller.start().await, StartOutcome::AlreadyRunning);

        let status = controller.status().await;
        assert!(status.is_running());
        assert!(status.started_at.is_some());
        assert_eq!(status.watched, 1);

        assert_eq!(controller.stop().await, StopOutcome::Stopped);
        assert_eq!(controller.stop().await, StopOutcome::AlreadyStopped);

        let calls = source.calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), calls);
    }

    #[tokio::test]
    async fn stop_when_never_started() {
        let controller = controller(&["BTC"], Arc::new(CountingSource::default()));
        assert_eq!(controller.stop().await, StopOutcome::AlreadyStopped);
    }

    #[tokio::test]
    async fn concurrent_starts_spawn_once() {
        let controller = Arc::new(controller(&["BTC"], Arc::new(CountingSource::default())));

        let attempts: Vec<_> = (0..8)
            .map(|_| {
                let controller = Arc::clone(&controller);
                tokio::spawn(async move { controller.start().await })
            })
            .collect();

        let mut started = 0;
        for attempt in attempts {
            if attempt.await.unwrap() == StartOutcome::Started {
                started += 1;
            }
        }
        assert_eq!(started, 1);
        controller.stop().await;
    }

    #[tokio::test]
    async fn panicked_loop_reads_as_stopped_and_restarts() {
        let controller = controller(&["BTC"], Arc::new(PanickingSource));

        assert_eq!(controller.start().await, StartOutcome::Started);
        wait_until_stopped(&controller).await;
        assert!(!controller.is_running().await);

        assert_eq!(controller.start().await, StartOutcome::Started);
        wait_until_stopped(&controller).await;
        assert_eq!(controller.stop().await, StopOutcome::AlreadyStopped);
    }

    #[tokio::test]
    async fn stop_interrupts_the_poll_pause() {
        let source = Arc::new(CountingSource::default());
        let config = MonitorConfig {
            poll_interval_ms: 60_000,
            ..Default::default()
        };
        let controller = controller_with(config, &["BTC"], source.clone());

        assert_eq!(controller.start().await, StartOutcome::Started);
        for _ in 0..200 {
            if source.calls.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        let outcome = tokio::time::timeout(Duration::from_millis(250), controller.stop())
            .await
            .expect("stop should not wait out the poll interval");
        assert_eq!(outcome, StopOutcome::Stopped);
        assert!(!controller.is_running().await);
    }

    #[tokio::test]
    async fn stop_lets_in_flight_lookup_finish_then_polls_no_more() {
        let source = Arc::new(GatedSource::default());
        let controller = Arc::new(controller(&["BTC"], source.clone()));

        assert_eq!(controller.start().await, StartOutcome::Started);
        source.entered.notified().await;

        let stopping = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.stop().await })
        };
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!stopping.is_finished(), "stop returned before the lookup finished");

        source.release.notify_one();
        assert_eq!(stopping.await.unwrap(), StopOutcome::Stopped);
        assert_eq!(source.completed.load(Ordering::SeqCst), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    async fn wait_until_stopped(controller: &MonitorController) {
        for _ in 0..200 {
            if !controller.is_running().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}
