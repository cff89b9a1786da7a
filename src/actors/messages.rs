//! Message types for actor communication
//!
//! 1. **Commands**: Request/response messages sent to the collector via mpsc
//! 2. **Events**: Alert notifications published on a broadcast channel

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;

use crate::AlertRecord;
use crate::monitors::snapshot::FormatError;
use crate::transport::TransportError;

use super::collector::PollState;

/// Event published by [`crate::alerts::ChannelSink`]
#[derive(Debug, Clone)]
pub enum AlertEvent {
    /// A threshold was violated
    Alert {
        server: String,
        record: AlertRecord,
        timestamp: DateTime<Utc>,
    },

    /// The host could not be reached for `error_threshold` consecutive polls
    Unavailable {
        server: String,
        timestamp: DateTime<Utc>,
    },
}

/// Result of a single poll cycle
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Snapshot decoded and evaluated; `alerts` were forwarded to the sink in this order
    Evaluated { alerts: Vec<AlertRecord> },

    /// Host replied but the payload was malformed
    DecodeFailed(FormatError),

    /// Host could not be reached or replied with a non-2xx status
    TransportFailed {
        error: TransportError,
        consecutive_failures: usize,

        /// Whether this failure crossed the threshold and triggered the unavailable signal
        unavailable_signalled: bool,
    },
}

/// Commands that can be sent to a CollectorActor
#[derive(Debug)]
pub enum CollectorCommand {
    /// Run one cycle immediately (bypassing the interval)
    PollNow {
        respond_to: oneshot::Sender<CycleOutcome>,
    },

    /// Read the current failure-counting state
    GetState {
        respond_to: oneshot::Sender<PollState>,
    },

    /// Stop the loop; processed after any in-flight cycle
    Shutdown,
}
