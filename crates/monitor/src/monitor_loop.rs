use crate::detector::IncreaseDetector;
use crate::history::SlidingWindowHistory;
use crate::watchlist::Watchlist;
use chrono::{DateTime, Utc};
use price_alert_core::{AlertEvent, AlertSink, MonitorConfig, PriceSource, RecipientId};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// What a single poll cycle did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// Symbols that produced a usable price.
    pub polled: usize,
    /// Symbols skipped because of a lookup or price failure.
    pub skipped: usize,
    pub alerts: Vec<AlertEvent>,
}

/// The polling task. Owns the price history; nothing else touches it.
pub struct PriceMonitor {
    watchlist: Watchlist,
    source: Arc<dyn PriceSource>,
    sink: Arc<dyn AlertSink>,
    recipients: Arc<[RecipientId]>,
    detector: IncreaseDetector,
    history: SlidingWindowHistory,
    poll_interval: Duration,
}

impl PriceMonitor {
    #[must_use]
    pub fn new(
        config: &MonitorConfig,
        watchlist: Watchlist,
        source: Arc<dyn PriceSource>,
        sink: Arc<dyn AlertSink>,
        recipients: Arc<[RecipientId]>,
    ) -> Self {
        Self {
            watchlist,
            source,
            sink,
            recipients,
            detector: IncreaseDetector::new(config.threshold_pct),
            history: SlidingWindowHistory::new(config.window()),
            poll_interval: config.poll_interval(),
        }
    }

    /// Polls every watched symbol once, stamping samples with `clock`.
    async fn cycle(&mut self, clock: impl Fn() -> DateTime<Utc>) -> CycleReport {
        let symbols = self.watchlist.snapshot();
        self.history.retain_symbols(&symbols);

        let mut report = CycleReport::default();

        for symbol in &symbols {
            let price = match self.source.fetch_price(symbol).await {
                Ok(price) => price,
                Err(e) if e.is_transient() => {
                    warn!(%symbol, error = %e, "lookup failed, skipping symbol this cycle");
                    report.skipped += 1;
                    continue;
                }
                Err(e) => {
                    error!(%symbol, error = %e, "unusable quote, skipping symbol this cycle");
                    report.skipped += 1;
                    continue;
                }
            };

            if price <= Decimal::ZERO {
                warn!(%symbol, %price, "non-positive price, skipping symbol this cycle");
                report.skipped += 1;
                continue;
            }

            let now = clock();
            self.history.record(symbol, price, now);

            let detection = match self.detector.evaluate(symbol, price, &self.history) {
                Ok(detection) => detection,
                Err(e) => {
                    warn!(%symbol, error = %e, "skipping evaluation");
                    report.skipped += 1;
                    continue;
                }
            };
            report.polled += 1;

            debug!(
                %symbol,
                %price,
                samples = self.history.len(symbol),
                percent = detection.percent_increase,
                "evaluated"
            );

            if detection.triggered {
                let alert = AlertEvent {
                    symbol: symbol.clone(),
                    percent_increase: detection.percent_increase,
                    current_price: price,
                    detected_at: now,
                };
                info!(
                    %symbol,
                    percent = alert.percent_increase,
                    %price,
                    "price increase detected"
                );
                if let Err(e) = self.sink.deliver(&alert, &self.recipients).await {
                    error!(%symbol, error = %e, "failed to deliver alert");
                }
                report.alerts.push(alert);
            }
        }

        report
    }

    /// Runs cycles until `stop` turns true or its sender goes away.
    ///
    /// Stop is observed before each cycle and during the pause between
    /// cycles; a cycle in progress always finishes.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) {
        info!(
            symbols = self.watchlist.len(),
            interval_ms = u64::try_from(self.poll_interval.as_millis()).unwrap_or(u64::MAX),
            "monitor loop started"
        );

        loop {
            if *stop.borrow() {
                break;
            }

            let report = self.cycle(Utc::now).await;
            debug!(
                polled = report.polled,
                skipped = report.skipped,
                alerts = report.alerts.len(),
                "cycle complete"
            );

            tokio::select! {
                () = tokio::time::sleep(self.poll_interval) => {}
                changed = stop.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("monitor loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use price_alert_core::{PriceError, SinkError, Symbol};
    use rust_decimal_macros::dec;
    use std::collections::{HashMap, VecDeque};

    /// Returns queued prices per symbol; an empty queue is a lookup failure.
    #[derive(Default)]
    struct QueuedPrices {
        prices: Mutex<HashMap<Symbol, VecDeque<Decimal>>>,
    }

    impl QueuedPrices {
        fn push(&self, symbol: &str, price: Decimal) {
            self.prices
                .lock()
                .entry(Symbol::parse(symbol).unwrap())
                .or_default()
                .push_back(price);
        }
    }

    #[async_trait]
    impl PriceSource for QueuedPrices {
        async fn fetch_price(&self, symbol: &Symbol) -> Result<Decimal, PriceError> {
            self.prices
                .lock()
                .get_mut(symbol)
                .and_then(VecDeque::pop_front)
                .ok_or_else(|| PriceError::lookup(symbol, "no quote"))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        delivered: Mutex<Vec<(AlertEvent, Vec<RecipientId>)>>,
        fail: bool,
    }

    #[async_trait]
    impl AlertSink for RecordingSink {
        async fn deliver(
            &self,
            alert: &AlertEvent,
            recipients: &[RecipientId],
        ) -> Result<(), SinkError> {
            self.delivered
                .lock()
                .push((alert.clone(), recipients.to_vec()));
            if self.fail {
                return Err(SinkError::Transport("down".to_string()));
            }
            Ok(())
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    fn sym(s: &str) -> Symbol {
        Symbol::parse(s).unwrap()
    }

    fn monitor(
        symbols: &[&str],
        source: Arc<QueuedPrices>,
        sink: Arc<RecordingSink>,
    ) -> PriceMonitor {
        let watchlist = Watchlist::from_symbols(symbols.iter().map(|s| sym(s)));
        PriceMonitor::new(
            &MonitorConfig::default(),
            watchlist,
            source,
            sink,
            Arc::from(vec![7_i64, 8]),
        )
    }

    #[tokio::test]
    async fn rise_inside_window_alerts_once_with_evaluated_price() {
        let source = Arc::new(QueuedPrices::default());
        for price in [dec!(100), dec!(101.5), dec!(102)] {
            source.push("BTC", price);
        }
        let sink = Arc::new(RecordingSink::default());
        let mut monitor = monitor(&["BTC"], source, sink.clone());

        assert!(monitor.cycle(|| at(0)).await.alerts.is_empty());
        assert!(monitor.cycle(|| at(120)).await.alerts.is_empty());
        let report = monitor.cycle(|| at(200)).await;

        assert_eq!(report.alerts.len(), 1);
        let alert = &report.alerts[0];
        assert_eq!(alert.symbol, sym("BTC"));
        assert_eq!(alert.current_price, dec!(102));
        assert!((alert.percent_increase - 2.0).abs() < 1e-9);

        let delivered = sink.delivered.lock();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].1, vec![7, 8]);
    }

    #[tokio::test]
    async fn baseline_outside_window_is_trimmed() {
        let source = Arc::new(QueuedPrices::default());
        source.push("BTC", dec!(100));
        source.push("BTC", dec!(101));
        let sink = Arc::new(RecordingSink::default());
        let mut monitor = monitor(&["BTC"], source, sink.clone());

        monitor.cycle(|| at(0)).await;
        let report = monitor.cycle(|| at(310)).await;

        assert!(report.alerts.is_empty());
        assert_eq!(monitor.history.len(&sym("BTC")), 1);
        assert!(sink.delivered.lock().is_empty());
    }

    #[tokio::test]
    async fn lookup_failure_skips_only_that_symbol() {
        let source = Arc::new(QueuedPrices::default());
        source.push("ETH", dec!(3000));
        let sink = Arc::new(RecordingSink::default());
        let mut monitor = monitor(&["BTC", "ETH"], source, sink);

        let report = monitor.cycle(|| at(0)).await;

        assert_eq!(report.skipped, 1);
        assert_eq!(report.polled, 1);
        assert_eq!(monitor.history.len(&sym("BTC")), 0);
        assert_eq!(monitor.history.len(&sym("ETH")), 1);
    }

    #[tokio::test]
    async fn sink_failure_does_not_abort_cycle() {
        let source = Arc::new(QueuedPrices::default());
        for (btc, eth) in [(dec!(100), dec!(10)), (dec!(110), dec!(11))] {
            source.push("BTC", btc);
            source.push("ETH", eth);
        }
        let sink = Arc::new(RecordingSink {
            fail: true,
            ..Default::default()
        });
        let mut monitor = monitor(&["BTC", "ETH"], source, sink.clone());

        monitor.cycle(|| at(0)).await;
        let report = monitor.cycle(|| at(5)).await;

        assert_eq!(report.alerts.len(), 2);
        assert_eq!(sink.delivered.lock().len(), 2);
    }

    #[tokio::test]
    async fn non_positive_price_is_never_recorded() {
        let source = Arc::new(QueuedPrices::default());
        source.push("BTC", dec!(0));
        source.push("BTC", dec!(5));
        let sink = Arc::new(RecordingSink::default());
        let mut monitor = monitor(&["BTC"], source, sink);

        let report = monitor.cycle(|| at(0)).await;
        assert_eq!(report.skipped, 1);
        assert_eq!(monitor.history.len(&sym("BTC")), 0);

        let report = monitor.cycle(|| at(5)).await;
        assert_eq!(report.polled, 1);
        assert!(report.alerts.is_empty());
    }

    #[tokio::test]
    async fn removed_symbol_history_is_dropped() {
        let source = Arc::new(QueuedPrices::default());
        source.push("BTC", dec!(100));
        let sink = Arc::new(RecordingSink::default());
        let mut monitor = monitor(&["BTC"], source, sink);

        monitor.cycle(|| at(0)).await;
        assert_eq!(monitor.history.len(&sym("BTC")), 1);

        monitor.watchlist.remove(&sym("BTC"));
        monitor.cycle(|| at(5)).await;
        assert_eq!(monitor.history.len(&sym("BTC")), 0);
    }

    #[tokio::test]
    async fn run_exits_when_stop_is_signalled() {
        let source = Arc::new(QueuedPrices::default());
        let sink = Arc::new(RecordingSink::default());
        let monitor = monitor(&["BTC"], source, sink);

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(monitor.run(stop_rx));
        stop_tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("loop should stop")
            .unwrap();
    }

    #[tokio::test]
    async fn run_exits_when_sender_dropped() {
        let source = Arc::new(QueuedPrices::default());
        let sink = Arc::new(RecordingSink::default());
        let monitor = monitor(&["BTC"], source, sink);

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(monitor.run(stop_rx));
        drop(stop_tx);

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("loop should stop")
            .unwrap();
    }
}
