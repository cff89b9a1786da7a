//! CollectorActor - Polls the monitored host for snapshots
//!
//! ## Cycle
//!
//! ```text
//! fetch ──failure / non-2xx──→ consecutive_failures += 1 ──(== threshold)──→ emit_unavailable
//!   │
//!   └─success─→ consecutive_failures = 0 → decode ──FormatError──→ log, skip evaluation
//!                                            │
//!                                            └─→ evaluate → emit each alert in order
//! ```
//!
//! The unavailable signal fires once per upward crossing of the threshold. Only a successful
//! fetch resets the counter, so after a reset it takes another full run of failures to fire
//! again. Decode failures leave the counter at zero: the host is reachable, just not speaking
//! the expected format.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::alerts::AlertSink;
use crate::clock::{Clock, TokioClock};
use crate::config::MonitorConfig;
use crate::monitors::{resources, snapshot};
use crate::transport::{Transport, TransportError};

use super::messages::{CollectorCommand, CycleOutcome};

/// Failure-counting state of one collector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollState {
    consecutive_failures: usize,
}

impl PollState {
    pub fn consecutive_failures(&self) -> usize {
        self.consecutive_failures
    }

    pub fn record_failure(self) -> PollState {
        PollState {
            consecutive_failures: self.consecutive_failures.saturating_add(1),
        }
    }

    pub fn record_success(self) -> PollState {
        PollState::default()
    }

    pub fn is_unavailable(&self, error_threshold: usize) -> bool {
        self.consecutive_failures >= error_threshold
    }
}

/// Everything one poll cycle needs, fixed at construction
pub struct StatsCollector {
    url: String,
    display_name: String,
    interval: Duration,
    timeout: Duration,
    error_threshold: usize,
    delimiter: char,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn AlertSink>,
    clock: Arc<dyn Clock>,
}

impl StatsCollector {
    pub fn new(
        config: &MonitorConfig,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            url: config.url.clone(),
            display_name: config.display_name(),
            interval: config.interval(),
            timeout: config.timeout(),
            error_threshold: config.error_threshold,
            delimiter: config.delimiter,
            transport,
            sink,
            clock: Arc::new(TokioClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Run one fetch/decode/evaluate cycle.
    ///
    /// Takes the state of the previous cycle and returns the state for the next one.
    #[instrument(skip(self, state), fields(server = %self.display_name))]
    pub async fn poll_cycle(&self, state: PollState) -> (PollState, CycleOutcome) {
        let response = match self.transport.fetch(&self.url, self.timeout).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                return self
                    .transport_failed(state, TransportError::Status(response.status))
                    .await;
            }
            Err(e) => return self.transport_failed(state, e).await,
        };

        if state.is_unavailable(self.error_threshold) {
            info!(
                "{}: statistics available again after {} failed polls",
                self.url,
                state.consecutive_failures()
            );
        }
        let state = state.record_success();

        let readings = match snapshot::decode(&response.body, self.delimiter) {
            Ok(readings) => readings,
            Err(e) => {
                error!("{}: {e}", self.url);
                return (state, CycleOutcome::DecodeFailed(e));
            }
        };

        trace!("{}: decoded {readings:?}", self.url);

        let alerts = resources::evaluate(&readings);
        for alert in &alerts {
            debug!("{}: {}", self.url, alert.message);
            self.sink.emit(alert).await;
        }

        (state, CycleOutcome::Evaluated { alerts })
    }

    async fn transport_failed(
        &self,
        state: PollState,
        error: TransportError,
    ) -> (PollState, CycleOutcome) {
        let state = state.record_failure();
        let consecutive_failures = state.consecutive_failures();
        error!(
            "{}: {error} ({consecutive_failures}/{} consecutive failures)",
            self.url, self.error_threshold
        );

        // fires on the upward crossing only
        let unavailable_signalled = consecutive_failures == self.error_threshold;
        if unavailable_signalled {
            warn!("{}: statistics unavailable", self.url);
            self.sink.emit_unavailable().await;
        }

        (
            state,
            CycleOutcome::TransportFailed {
                error,
                consecutive_failures,
                unavailable_signalled,
            },
        )
    }
}

/// Actor driving a [`StatsCollector`] for the lifetime of the process
pub struct CollectorActor {
    collector: StatsCollector,
    state: PollState,
    command_rx: mpsc::Receiver<CollectorCommand>,
}

impl CollectorActor {
    pub fn new(collector: StatsCollector, command_rx: mpsc::Receiver<CollectorCommand>) -> Self {
        Self {
            collector,
            state: PollState::default(),
            command_rx,
        }
    }

    /// Run the actor's main loop
    ///
    /// Runs until a Shutdown command is received or every handle is dropped. Commands are handled
    /// between cycles, so a Shutdown sent during a cycle takes effect once that cycle finished.
    #[instrument(skip(self), fields(server = %self.collector.display_name))]
    pub async fn run(mut self) {
        debug!(
            "starting collector for {} with interval {:?}",
            self.collector.url, self.collector.interval
        );

        let clock = self.collector.clock.clone();
        let interval = self.collector.interval;

        // re-armed only after a cycle ran, other commands keep the pending deadline
        let mut sleep = clock.sleep(interval);

        loop {
            tokio::select! {
                _ = &mut sleep => {
                    self.cycle().await;
                    sleep = clock.sleep(interval);
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(CollectorCommand::PollNow { respond_to }) => {
                            debug!("received PollNow command");
                            let outcome = self.cycle().await;
                            let _ = respond_to.send(outcome);
                            sleep = clock.sleep(interval);
                        }

                        Some(CollectorCommand::GetState { respond_to }) => {
                            let _ = respond_to.send(self.state);
                        }

                        Some(CollectorCommand::Shutdown) => {
                            debug!("received shutdown command");
                            break;
                        }

                        None => {
                            warn!("command channel closed, shutting down");
                            break;
                        }
                    }
                }
            }
        }

        debug!("collector stopped");
    }

    async fn cycle(&mut self) -> CycleOutcome {
        let (state, outcome) = self.collector.poll_cycle(self.state).await;
        self.state = state;
        outcome
    }
}

/// Handle for controlling a CollectorActor
///
/// Cloneable; the actor stops once every handle is dropped.
#[derive(Clone)]
pub struct CollectorHandle {
    sender: mpsc::Sender<CollectorCommand>,

    /// Display name of the monitored host
    pub display_name: String,
}

impl CollectorHandle {
    /// Spawn the actor as a tokio task and return a handle to it.
    pub fn spawn(collector: StatsCollector) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let display_name = collector.display_name().to_string();

        tokio::spawn(CollectorActor::new(collector, cmd_rx).run());

        Self {
            sender: cmd_tx,
            display_name,
        }
    }

    /// Run one cycle right away and return its outcome.
    pub async fn poll_now(&self) -> Result<CycleOutcome> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(CollectorCommand::PollNow { respond_to: tx })
            .await
            .context("failed to send PollNow command")?;

        rx.await.context("failed to receive cycle outcome")
    }

    pub async fn state(&self) -> Result<PollState> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(CollectorCommand::GetState { respond_to: tx })
            .await
            .context("failed to send GetState command")?;

        rx.await.context("failed to receive poll state")
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(CollectorCommand::Shutdown)
            .await
            .context("failed to send Shutdown command")?;
        Ok(())
    }
}
