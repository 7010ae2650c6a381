// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic refresh of one panel.
//!
//! The [`PollingCoordinator`] drives one refresh cycle at a time:
//!
//! ```text
//! Idle -> Fetching -> {Updated | SoftFailed | HardFailed} -> Idle
//! ```
//!
//! Each cycle is bounded by a single timeout. Transport errors, non-401
//! HTTP errors, empty data and timeouts are soft: the previous snapshot
//! stays published and polling continues. Decode errors are hard but
//! polling also continues. An HTTP 401 stops the loop until the panel has
//! been paired again.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use span_panel_lib::SpanPanel;
//! use span_panel_lib::coordinator::PollingCoordinator;
//!
//! # async fn example() -> span_panel_lib::Result<()> {
//! let panel = SpanPanel::http("192.168.1.50")
//!     .with_access_token("token")
//!     .build_without_probe()?;
//!
//! let coordinator = Arc::new(PollingCoordinator::new(panel));
//! coordinator.first_refresh().await?;
//!
//! let handle = Arc::clone(&coordinator).spawn();
//! let mut snapshots = coordinator.panel().subscribe();
//! while snapshots.changed().await.is_ok() {
//!     println!("generation {}", snapshots.borrow().generation);
//! }
//! # handle.abort();
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::device::SpanPanel;
use crate::error::{Error, Severity};
use crate::event::PanelEvent;
use crate::protocol::{PanelConfig, PanelProtocol};
use crate::state::PanelSnapshot;

/// Whether a cycle is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// Waiting for the next tick or refresh request.
    Idle,
    /// A cycle is fetching from the panel.
    Fetching,
}

/// How the last completed cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new snapshot was published.
    Updated,
    /// A transient failure; the previous snapshot stays published.
    SoftFailed,
    /// An undecodable payload or a rejected token.
    HardFailed,
}

impl From<Severity> for CycleOutcome {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Soft => Self::SoftFailed,
            Severity::Hard | Severity::AuthenticationRequired => Self::HardFailed,
        }
    }
}

/// Observable state of the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorStatus {
    /// Current phase.
    pub phase: CyclePhase,
    /// Outcome of the last completed cycle.
    pub last_outcome: Option<CycleOutcome>,
    /// Rendered error of the last failed cycle, cleared on success.
    pub last_error: Option<String>,
    /// Failed cycles since the last success.
    pub consecutive_failures: u32,
    /// Completion time of the last successful cycle.
    pub last_success: Option<DateTime<Utc>>,
    /// The panel rejected the token; polling is stopped.
    pub authentication_required: bool,
}

impl CoordinatorStatus {
    fn new() -> Self {
        Self {
            phase: CyclePhase::Idle,
            last_outcome: None,
            last_error: None,
            consecutive_failures: 0,
            last_success: None,
            authentication_required: false,
        }
    }

    /// Returns `true` if the last cycle published a snapshot.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.last_outcome == Some(CycleOutcome::Updated)
    }
}

/// Polls one panel on a fixed interval.
#[derive(Debug)]
pub struct PollingCoordinator<P: PanelProtocol> {
    panel: SpanPanel<P>,
    interval: Duration,
    cycle_timeout: Duration,
    // Held for the whole cycle so cycles never overlap.
    cycle: Mutex<()>,
    status: watch::Sender<CoordinatorStatus>,
    // Bumped by `stop()`; loops only react to bumps made after they start.
    stop: watch::Sender<u64>,
}

impl<P: PanelProtocol> PollingCoordinator<P> {
    /// Creates a coordinator using the panel's configured refresh interval.
    #[must_use]
    pub fn new(panel: SpanPanel<P>) -> Self {
        let interval = panel.options().refresh_interval();
        let (status, _) = watch::channel(CoordinatorStatus::new());
        Self {
            panel,
            interval,
            cycle_timeout: PanelConfig::DEFAULT_TIMEOUT,
            cycle: Mutex::new(()),
            status,
            stop: watch::Sender::new(0),
        }
    }

    /// Sets the wall-clock budget of one cycle.
    #[must_use]
    pub fn with_cycle_timeout(mut self, timeout: Duration) -> Self {
        self.cycle_timeout = timeout;
        self
    }

    /// Returns the panel.
    #[must_use]
    pub fn panel(&self) -> &SpanPanel<P> {
        &self.panel
    }

    /// Returns the refresh interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the cycle timeout.
    #[must_use]
    pub fn cycle_timeout(&self) -> Duration {
        self.cycle_timeout
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn current(&self) -> Arc<PanelSnapshot> {
        self.panel.current()
    }

    /// Returns a copy of the coordinator status.
    #[must_use]
    pub fn status(&self) -> CoordinatorStatus {
        self.status.borrow().clone()
    }

    /// Subscribes to coordinator status changes.
    #[must_use]
    pub fn subscribe_status(&self) -> watch::Receiver<CoordinatorStatus> {
        self.status.subscribe()
    }

    /// Asks the loop to refresh ahead of schedule.
    pub fn request_refresh(&self) {
        self.panel.request_refresh();
    }

    /// Runs the initial refresh.
    ///
    /// Unlike the loop, every failure is returned so the caller can defer
    /// setup until the panel is ready.
    ///
    /// # Errors
    ///
    /// Returns the cycle's error.
    pub async fn first_refresh(&self) -> Result<Arc<PanelSnapshot>, Error> {
        self.refresh().await
    }

    /// Runs one complete cycle.
    ///
    /// Waits for a running cycle to finish first.
    ///
    /// # Errors
    ///
    /// Returns the cycle's error after it has been recorded in the status
    /// and published as an event.
    pub async fn refresh(&self) -> Result<Arc<PanelSnapshot>, Error> {
        let _cycle = self.cycle.lock().await;
        self.status.send_modify(|s| s.phase = CyclePhase::Fetching);

        let result = match tokio::time::timeout(self.cycle_timeout, self.panel.update()).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(self.cycle_timeout)),
        };

        match &result {
            Ok(snapshot) => self.record_success(snapshot),
            Err(err) => self.record_failure(err),
        }
        result
    }

    fn record_success(&self, snapshot: &PanelSnapshot) {
        tracing::debug!(host = %self.panel.host(), generation = snapshot.generation, "Refresh succeeded");

        self.status.send_modify(|s| {
            s.phase = CyclePhase::Idle;
            s.last_outcome = Some(CycleOutcome::Updated);
            s.last_error = None;
            s.consecutive_failures = 0;
            s.last_success = snapshot.refreshed_at;
            s.authentication_required = false;
        });
        self.panel
            .events()
            .publish(PanelEvent::updated(self.panel.host(), snapshot.generation));
    }

    fn record_failure(&self, err: &Error) {
        let host = self.panel.host().to_string();
        let severity = err.severity();

        match severity {
            Severity::Soft => tracing::warn!(host = %host, error = %err, "Refresh failed, keeping previous snapshot"),
            Severity::Hard => tracing::error!(host = %host, error = %err, "Refresh failed"),
            Severity::AuthenticationRequired => {
                tracing::error!(host = %host, error = %err, "Panel rejected the access token");
            }
        }

        self.status.send_modify(|s| {
            s.phase = CyclePhase::Idle;
            s.last_outcome = Some(severity.into());
            s.last_error = Some(err.to_string());
            s.consecutive_failures = s.consecutive_failures.saturating_add(1);
            s.authentication_required = severity == Severity::AuthenticationRequired;
        });

        let event = if severity == Severity::AuthenticationRequired {
            PanelEvent::AuthenticationRequired { host }
        } else {
            PanelEvent::RefreshFailed {
                host,
                severity,
                error: err.to_string(),
            }
        };
        self.panel.events().publish(event);
    }

    /// Refreshes on every interval tick and on every refresh request.
    ///
    /// The first cycle runs one interval after the call; use
    /// [`first_refresh`](Self::first_refresh) beforehand for an immediate
    /// one.
    ///
    /// # Errors
    ///
    /// Returns `Error::AuthenticationRequired` when the panel rejects the
    /// token. Returns `Ok(())` after [`stop`](Self::stop).
    pub async fn run(&self) -> Result<(), Error> {
        self.run_until_stopped(self.stop.subscribe()).await
    }

    async fn run_until_stopped(&self, mut stop: watch::Receiver<u64>) -> Result<(), Error> {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::debug!(host = %self.panel.host(), interval_s = self.interval.as_secs(), "Polling started");

        loop {
            tokio::select! {
                _ = stop.changed() => {
                    tracing::debug!(host = %self.panel.host(), "Polling stopped");
                    return Ok(());
                }
                _ = ticker.tick() => {}
                () = self.panel.refresh_requested() => {
                    ticker.reset();
                }
            }

            if let Err(err) = self.refresh().await
                && err.is_authentication_required()
            {
                tracing::error!(host = %self.panel.host(), "Polling stopped until the panel is paired again");
                return Err(Error::AuthenticationRequired);
            }
        }
    }

    /// Stops a running [`run`](Self::run) before its next cycle.
    ///
    /// A cycle already in progress completes. A stop issued while no loop
    /// is running has no effect on loops started later.
    pub fn stop(&self) {
        self.stop.send_modify(|stops| *stops = stops.wrapping_add(1));
    }
}

impl<P: PanelProtocol + 'static> PollingCoordinator<P> {
    /// Runs [`run`](Self::run) on a background task.
    #[must_use]
    pub fn spawn(self: Arc<Self>) -> JoinHandle<Result<(), Error>> {
        // Subscribed before spawning so a stop issued right after is seen.
        let stop = self.stop.subscribe();
        tokio::spawn(async move { self.run_until_stopped(stop).await })
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::Value;

    use super::*;
    use crate::error::ProtocolError;
    use crate::options::PanelOptions;
    use crate::protocol::{ApiResponse, Auth, endpoints};
    use crate::test_support;

    /// Answers every request after `delay`, tracking overlapping status reads.
    #[derive(Debug)]
    struct SlowProtocol {
        delay: Duration,
        in_flight: Arc<AtomicUsize>,
        max_in_flight: Arc<AtomicUsize>,
    }

    impl SlowProtocol {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                in_flight: Arc::new(AtomicUsize::new(0)),
                max_in_flight: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl PanelProtocol for SlowProtocol {
        fn host(&self) -> &str {
            "slow-panel"
        }

        fn fetch(
            &self,
            path: &str,
            _query: &[(&str, &str)],
            _auth: Auth,
        ) -> impl Future<Output = Result<ApiResponse, ProtocolError>> + Send {
            let body = match path {
                endpoints::STATUS => test_support::status_json("nj-2316-005k6"),
                endpoints::PANEL => test_support::panel_json("CLOSED", 100.0),
                _ => test_support::circuits_json(&[test_support::circuit_json("kitchen", true)]),
            };
            let is_status = path == endpoints::STATUS;
            let delay = self.delay;
            let in_flight = Arc::clone(&self.in_flight);
            let max_in_flight = Arc::clone(&self.max_in_flight);

            async move {
                if is_status {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    max_in_flight.fetch_max(now, Ordering::SeqCst);
                }
                tokio::time::sleep(delay).await;
                if is_status {
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                }
                Ok(ApiResponse::new(200, body.to_string()))
            }
        }

        fn post(
            &self,
            _path: &str,
            _body: &Value,
            _auth: Auth,
        ) -> impl Future<Output = Result<ApiResponse, ProtocolError>> + Send {
            async { Ok(ApiResponse::new(200, "{}".to_string())) }
        }
    }

    fn slow_coordinator(delay: Duration) -> PollingCoordinator<SlowProtocol> {
        PollingCoordinator::new(SpanPanel::new(SlowProtocol::new(delay), PanelOptions::default()))
    }

    #[test]
    fn outcome_from_severity() {
        assert_eq!(CycleOutcome::from(Severity::Soft), CycleOutcome::SoftFailed);
        assert_eq!(CycleOutcome::from(Severity::Hard), CycleOutcome::HardFailed);
        assert_eq!(
            CycleOutcome::from(Severity::AuthenticationRequired),
            CycleOutcome::HardFailed
        );
    }

    #[test]
    fn initial_status() {
        let status = CoordinatorStatus::new();
        assert_eq!(status.phase, CyclePhase::Idle);
        assert!(status.last_outcome.is_none());
        assert!(!status.is_healthy());
        assert!(!status.authentication_required);
    }

    #[test]
    fn defaults_follow_options() {
        let panel = SpanPanel::http("192.168.1.50").build_without_probe().unwrap();
        let coordinator = PollingCoordinator::new(panel);
        assert_eq!(coordinator.interval(), Duration::from_secs(15));
        assert_eq!(coordinator.cycle_timeout(), Duration::from_secs(30));

        let coordinator = coordinator.with_cycle_timeout(Duration::from_secs(3));
        assert_eq!(coordinator.cycle_timeout(), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn unreachable_panel_is_soft_failure() {
        // Nothing listens on port 9 of the loopback interface.
        let panel = SpanPanel::http("127.0.0.1:9")
            .with_retry(crate::protocol::RetryPolicy::none())
            .build_without_probe()
            .unwrap();
        let coordinator = PollingCoordinator::new(panel);
        let mut events = coordinator.panel().events().subscribe();

        let err = coordinator.refresh().await.unwrap_err();
        assert!(matches!(&err, Error::Protocol(ProtocolError::Transport(_))));

        let status = coordinator.status();
        assert_eq!(status.last_outcome, Some(CycleOutcome::SoftFailed));
        assert_eq!(status.consecutive_failures, 1);
        assert!(status.last_error.is_some());
        assert!(matches!(
            events.recv().await.unwrap(),
            PanelEvent::RefreshFailed { severity: Severity::Soft, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_cycle_is_cancelled_by_timeout() {
        let coordinator =
            slow_coordinator(Duration::from_secs(60)).with_cycle_timeout(Duration::from_secs(5));

        let err = coordinator.refresh().await.unwrap_err();

        assert!(matches!(err, Error::Timeout(t) if t == Duration::from_secs(5)));
        assert_eq!(err.severity(), Severity::Soft);
        assert!(coordinator.current().is_empty());
        assert_eq!(coordinator.status().phase, CyclePhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn cycles_never_overlap() {
        let coordinator = slow_coordinator(Duration::from_millis(200));

        let (first, second) = tokio::join!(coordinator.refresh(), coordinator.refresh());

        let mut generations = [first.unwrap().generation, second.unwrap().generation];
        generations.sort_unstable();
        assert_eq!(generations, [1, 2]);
        assert_eq!(
            coordinator.panel().protocol().max_in_flight.load(Ordering::SeqCst),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_idle_loop() {
        let coordinator = Arc::new(slow_coordinator(Duration::ZERO));
        let handle = Arc::clone(&coordinator).spawn();

        coordinator.stop();

        assert!(handle.await.unwrap().is_ok());
        assert_eq!(coordinator.current().generation, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_run_is_ignored() {
        let coordinator = Arc::new(slow_coordinator(Duration::ZERO));
        coordinator.stop();

        let mut snapshots = coordinator.panel().subscribe();
        let handle = Arc::clone(&coordinator).spawn();
        coordinator.request_refresh();

        snapshots.changed().await.unwrap();
        assert!(!handle.is_finished());
        assert_eq!(coordinator.current().generation, 1);

        coordinator.stop();
        assert!(handle.await.unwrap().is_ok());
    }
}
