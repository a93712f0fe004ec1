use super::frame::{setup_request, S7Frame, SetupCommunication};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

/// PDU reference used for the Setup-Communication request.
const SETUP_PDU_REF: u16 = 7;

/// Caller-requested negotiation values for one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Requested max outstanding caller requests
    pub max_amq_caller: u16,
    /// Requested max outstanding callee requests
    pub max_amq_callee: u16,
    /// Requested PDU size in bytes
    pub pdu_length: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_amq_caller: 8,
            max_amq_callee: 8,
            pdu_length: 1024,
        }
    }
}

/// Working negotiation values of one connection. Starts at the caller's
/// requested values and is replaced by whatever the device answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionParams {
    pub max_amq_caller: u16,
    pub max_amq_callee: u16,
    pub pdu_length: u16,
}

impl From<SessionConfig> for SessionParams {
    fn from(config: SessionConfig) -> Self {
        Self {
            max_amq_caller: config.max_amq_caller,
            max_amq_callee: config.max_amq_callee,
            pdu_length: config.pdu_length,
        }
    }
}

impl From<&SetupCommunication> for SessionParams {
    fn from(setup: &SetupCommunication) -> Self {
        Self {
            max_amq_caller: setup.max_amq_caller,
            max_amq_callee: setup.max_amq_callee,
            pdu_length: setup.pdu_length,
        }
    }
}

/// Connection-setup handshake progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    /// No setup traffic yet; the lower transport is still handshaking
    Uninitialized,
    /// Setup-Communication request sent, waiting for the device's answer
    AwaitingSetupResponse,
    /// Device answered; `Negotiated` persists for the connection lifetime
    Negotiated,
}

/// Negotiation state machine owned by one connection's codec.
///
/// Completion is published on a watch channel; upward consumers hold the
/// receiver handed out at construction and observe the negotiated triple.
#[derive(Debug)]
pub struct Negotiation {
    state: NegotiationState,
    params: SessionParams,
    setup_tx: watch::Sender<Option<SessionParams>>,
}

impl Negotiation {
    pub fn new(config: SessionConfig) -> (Self, watch::Receiver<Option<SessionParams>>) {
        let (setup_tx, setup_rx) = watch::channel(None);
        (
            Self {
                state: NegotiationState::Uninitialized,
                params: config.into(),
                setup_tx,
            },
            setup_rx,
        )
    }

    #[inline]
    pub fn state(&self) -> NegotiationState {
        self.state
    }

    /// Current working values: the requested defaults until a setup response
    /// has been observed, the negotiated values afterwards.
    #[inline]
    pub fn params(&self) -> SessionParams {
        self.params
    }

    /// The lower transport finished its own handshake; emit the
    /// Setup-Communication request for the caller to send.
    pub fn on_transport_connected(&mut self) -> S7Frame {
        self.state = NegotiationState::AwaitingSetupResponse;
        setup_request(
            SETUP_PDU_REF,
            self.params.max_amq_caller,
            self.params.max_amq_callee,
            self.params.pdu_length,
        )
    }

    /// A Setup-Communication parameter was observed in a decoded response.
    /// Overwrites the working values and signals completion; a repeated
    /// observation overwrites again.
    pub(crate) fn observe_setup(&mut self, setup: &SetupCommunication) {
        self.params = setup.into();
        self.state = NegotiationState::Negotiated;
        debug!(
            max_amq_caller = self.params.max_amq_caller,
            max_amq_callee = self.params.max_amq_callee,
            pdu_length = self.params.pdu_length,
            "setup communication complete"
        );
        self.setup_tx.send_replace(Some(self.params));
    }
}
