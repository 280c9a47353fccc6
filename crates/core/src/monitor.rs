//! The sampling loop: polls the power source on a fixed interval, gates
//! samples through the change detector and threshold policy, and forwards
//! qualifying alerts to the sink. Nothing inside a tick is fatal: the only
//! user-visible failure mode is silence, which the logs explain.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::alert::detector::StateChangeDetector;
use crate::alert::policy::ThresholdPolicy;
use crate::alert::AlertSink;
use crate::config::GuardianConfig;
use crate::power::{PowerSource, SensorError};

/// Published before any alert has been dispatched.
pub const STARTUP_MESSAGE: &str = "Battery Guardian is running...";

/// Owns the sampling loop state: the last-seen reading (inside the
/// detector) and the last dispatched alert message (published on a watch
/// channel for the tray tooltip). The tray side holds only the receiver.
pub struct Monitor {
    cfg: GuardianConfig,
    source: Box<dyn PowerSource>,
    sink: Arc<dyn AlertSink>,
    policy: ThresholdPolicy,
    detector: StateChangeDetector,
    tick_count: u64,
    status_tx: watch::Sender<String>,
}

impl Monitor {
    /// Create a monitor. The returned receiver yields the most recently
    /// dispatched alert message; it starts at [`STARTUP_MESSAGE`].
    pub fn new(
        cfg: GuardianConfig,
        source: Box<dyn PowerSource>,
        sink: Arc<dyn AlertSink>,
    ) -> (Self, watch::Receiver<String>) {
        let (status_tx, status_rx) = watch::channel(STARTUP_MESSAGE.to_string());
        let policy = ThresholdPolicy::new(&cfg);
        let monitor = Self {
            cfg,
            source,
            sink,
            policy,
            detector: StateChangeDetector::new(),
            tick_count: 0,
            status_tx,
        };
        (monitor, status_rx)
    }

    /// Run until cancelled. Samples once immediately, then once per poll
    /// interval.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!(
            poll_interval_secs = self.cfg.poll_interval_secs,
            "battery monitor started"
        );
        let interval = self.cfg.poll_interval();

        self.tick();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(ticks = self.tick_count, "shutdown requested, exiting monitor loop");
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    self.tick();
                }
            }
        }
    }

    /// One sampling cycle: query, gate, evaluate, dispatch.
    pub fn tick(&mut self) {
        self.tick_count += 1;

        let reading = match self.source.query() {
            Ok(reading) => reading,
            Err(SensorError::Unavailable) => {
                // Expected on hosts without a battery; last_reading is kept.
                tracing::debug!("no usable power reading, retrying next tick");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "power query failed, retrying next tick");
                return;
            }
        };

        tracing::debug!(percent = ?reading.percent, plugged = ?reading.plugged, "sampled");

        if !self.detector.observe(reading) {
            // Unchanged reading: already alerted on it, or it never
            // qualified. Either way, stay quiet.
            return;
        }

        let Some(event) = self.policy.evaluate(reading) else {
            return;
        };

        tracing::info!(message = %event.message, urgent = event.urgent, "dispatching alert");
        if let Err(e) = self.sink.dispatch(&event) {
            tracing::warn!(error = %e, "alert delivery failed");
        }
        // The alert counts as attempted even when delivery failed; the
        // tooltip still shows it.
        self.status_tx.send_replace(event.message);
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{AlertEvent, SinkError};
    use crate::power::PowerReading;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Replays a scripted list of query results; once exhausted it reports
    /// the sensor as unavailable.
    struct ScriptedSource {
        script: VecDeque<Result<PowerReading, SensorError>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<PowerReading, SensorError>>) -> Self {
            Self {
                script: script.into(),
            }
        }
    }

    impl PowerSource for ScriptedSource {
        fn query(&mut self) -> Result<PowerReading, SensorError> {
            self.script
                .pop_front()
                .unwrap_or(Err(SensorError::Unavailable))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<AlertEvent>>,
        fail: AtomicBool,
    }

    impl RecordingSink {
        fn dispatched(&self) -> Vec<AlertEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl AlertSink for RecordingSink {
        fn dispatch(&self, event: &AlertEvent) -> Result<(), SinkError> {
            if self.fail.load(Ordering::Relaxed) {
                return Err(SinkError::Notification("notification service down".into()));
            }
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    fn monitor_with(
        script: Vec<Result<PowerReading, SensorError>>,
    ) -> (Monitor, Arc<RecordingSink>, watch::Receiver<String>) {
        let sink = Arc::new(RecordingSink::default());
        let (monitor, status_rx) = Monitor::new(
            GuardianConfig::default(),
            Box::new(ScriptedSource::new(script)),
            sink.clone(),
        );
        (monitor, sink, status_rx)
    }

    #[test]
    fn repeated_reading_dispatches_once() {
        let reading = PowerReading::new(20, false);
        let script = (0..5).map(|_| Ok(reading)).collect();
        let (mut monitor, sink, status_rx) = monitor_with(script);

        for _ in 0..5 {
            monitor.tick();
        }

        let events = sink.dispatched();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "🔋 Battery is 20% - Plug in soon!");
        assert_eq!(*status_rx.borrow(), events[0].message);
    }

    #[test]
    fn crossing_high_threshold_while_plugged() {
        // Scenario: 79% (quiet) then 85% while plugged.
        let (mut monitor, sink, _rx) = monitor_with(vec![
            Ok(PowerReading::new(79, true)),
            Ok(PowerReading::new(85, true)),
        ]);
        monitor.tick();
        monitor.tick();

        let events = sink.dispatched();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "⚡ Battery is 85% - Unplug the charger!");
        assert!(!events[0].urgent);
    }

    #[test]
    fn draining_to_low_threshold() {
        let (mut monitor, sink, _rx) = monitor_with(vec![
            Ok(PowerReading::new(25, false)),
            Ok(PowerReading::new(20, false)),
        ]);
        monitor.tick();
        monitor.tick();

        let events = sink.dispatched();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "🔋 Battery is 20% - Plug in soon!");
    }

    #[test]
    fn full_then_identical_then_one_percent_down() {
        // The detector gates on raw-reading equality only, so 100% → 99%
        // re-evaluates and fires the (different) high alert.
        let (mut monitor, sink, _rx) = monitor_with(vec![
            Ok(PowerReading::new(100, true)),
            Ok(PowerReading::new(100, true)),
            Ok(PowerReading::new(99, true)),
        ]);
        monitor.tick();
        monitor.tick();
        monitor.tick();

        let events = sink.dispatched();
        assert_eq!(events.len(), 2);
        assert!(events[0].urgent);
        assert_eq!(events[0].message, "⚡ Battery is 100% - Unplug now!");
        assert!(!events[1].urgent);
        assert_eq!(events[1].message, "⚡ Battery is 99% - Unplug the charger!");
    }

    #[test]
    fn sensor_outage_then_recovery() {
        let (mut monitor, sink, _rx) = monitor_with(vec![
            Err(SensorError::Unavailable),
            Err(SensorError::Unavailable),
            Err(SensorError::Platform("probe exploded".into())),
            Ok(PowerReading::new(15, false)),
        ]);
        for _ in 0..4 {
            monitor.tick();
        }

        let events = sink.dispatched();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "🔋 Battery is 15% - Plug in soon!");
        assert_eq!(monitor.tick_count(), 4);
    }

    #[test]
    fn unknown_reading_never_alerts_but_counts_as_change() {
        let (mut monitor, sink, _rx) = monitor_with(vec![
            Ok(PowerReading::new(20, false)),
            Ok(PowerReading::unknown()),
            Ok(PowerReading::new(20, false)),
        ]);
        monitor.tick();
        monitor.tick();
        monitor.tick();

        // 20% fires twice: the unknown sample in between is a raw-reading
        // change, so the second 20% is a fresh transition.
        let events = sink.dispatched();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| !e.urgent));
    }

    #[test]
    fn sink_failure_still_updates_status() {
        let (mut monitor, sink, status_rx) =
            monitor_with(vec![Ok(PowerReading::new(100, true))]);
        sink.fail.store(true, Ordering::Relaxed);
        monitor.tick();

        assert!(sink.dispatched().is_empty());
        // attempted alerts still publish
        assert_eq!(*status_rx.borrow(), "⚡ Battery is 100% - Unplug now!");
    }

    #[test]
    fn quiet_transitions_publish_nothing() {
        let (mut monitor, sink, status_rx) = monitor_with(vec![
            Ok(PowerReading::new(50, false)),
            Ok(PowerReading::new(49, false)),
        ]);
        monitor.tick();
        monitor.tick();

        assert!(sink.dispatched().is_empty());
        assert_eq!(*status_rx.borrow(), STARTUP_MESSAGE);
    }

    #[tokio::test(start_paused = true)]
    async fn run_is_cancellable_and_does_not_respam() {
        let reading = PowerReading::new(20, false);
        let script = (0..50).map(|_| Ok(reading)).collect();
        let sink = Arc::new(RecordingSink::default());
        let (monitor, _status_rx) = Monitor::new(
            GuardianConfig::default(),
            Box::new(ScriptedSource::new(script)),
            sink.clone(),
        );

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(monitor.run(cancel.clone()));

        // Let several poll intervals elapse under paused time.
        tokio::time::sleep(std::time::Duration::from_secs(60 * 5 + 1)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(sink.dispatched().len(), 1);
    }
}
