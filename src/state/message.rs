//! Message schema and outbound fan-out.
//!
//! Every inbound client event and every outbound server event is a variant of
//! an explicitly tagged enum, validated at the boundary before it touches
//! session state. The `Outbox` trait is the delivery seam between the session
//! and whatever transport hosts it.

use serde::{Deserialize, Serialize};

use super::player::{ConnectionId, PlayerId};

/// Inbound client events.
///
/// A connection's implicit loss is not a message; the host process reports it
/// through `Session::disconnect` directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Bind (or rebind) this connection to the identity behind `token`.
    Join {
        token: PlayerId,
        #[serde(default)]
        desired_name: Option<String>,
    },

    /// Rename the calling connection's identity.
    Rename { name: String },

    /// Host-only: begin a round if idle.
    StartRound,

    /// Play a card from the caller's hand into the active round.
    Submit { card: String },

    /// Judge-only: resolve the active round.
    ChooseWinner { token: PlayerId },

    /// Permanently exit the session.
    Leave,
}

/// One row of the roster snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
    pub is_host: bool,
    pub is_spectator: bool,
    pub is_judge: bool,
}

/// An active non-judge player who has not submitted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPlayer {
    pub id: PlayerId,
    pub name: String,
}

/// A collected submission as disclosed in the reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionView {
    pub id: PlayerId,
    pub card: String,
}

/// Outbound server events, broadcast or addressed to one connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Full roster snapshot; follows every registry mutation.
    Roster { players: Vec<RosterEntry> },

    /// A round began (also re-sent privately on resync).
    RoundStarted {
        round_number: u32,
        judge: PlayerId,
        prompt: String,
    },

    /// Private: the receiving player's current hand.
    YourHand { cards: Vec<String> },

    /// Private: the receiving player's submission was accepted.
    SubmissionReceived,

    /// Who still owes a submission this round.
    AwaitingSubmissions { pending: Vec<PendingPlayer> },

    /// All submissions are in, in arrival order.
    Reveal { submissions: Vec<SubmissionView> },

    /// The round resolved; all winner fields are absent when nobody won.
    RoundResolved {
        prompt: String,
        winner: Option<PlayerId>,
        winner_name: Option<String>,
        winning_card: Option<String>,
    },
}

/// Delivery seam between the session and its transport.
///
/// Delivery is best-effort and never queued: the session only addresses live
/// connection handles, and a reconnecting client is brought current by resync
/// rather than by replay.
pub trait Outbox {
    /// Deliver an event to a single connection.
    fn send_to(&mut self, conn: &ConnectionId, event: &ServerEvent);

    /// Deliver an event to every connected client.
    fn send_all(&mut self, event: &ServerEvent);
}

/// An `Outbox` that records everything it is asked to deliver.
///
/// Useful in tests and for embedders that drain outbound traffic themselves.
/// A `None` target marks a broadcast.
#[derive(Debug, Default)]
pub struct MemoryOutbox {
    pub sent: Vec<(Option<ConnectionId>, ServerEvent)>,
}

impl MemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events broadcast to everyone.
    pub fn broadcasts(&self) -> impl Iterator<Item = &ServerEvent> {
        self.sent
            .iter()
            .filter(|(to, _)| to.is_none())
            .map(|(_, ev)| ev)
    }

    /// Events addressed to one specific connection.
    pub fn sent_to<'a>(&'a self, conn: &'a ConnectionId) -> impl Iterator<Item = &'a ServerEvent> {
        self.sent
            .iter()
            .filter(move |(to, _)| to.as_ref() == Some(conn))
            .map(|(_, ev)| ev)
    }

    /// Drop everything recorded so far.
    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

impl Outbox for MemoryOutbox {
    fn send_to(&mut self, conn: &ConnectionId, event: &ServerEvent) {
        self.sent.push((Some(conn.clone()), event.clone()));
    }

    fn send_all(&mut self, event: &ServerEvent) {
        self.sent.push((None, event.clone()));
    }
}
