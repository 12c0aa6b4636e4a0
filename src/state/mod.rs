//! State management module for Blanks.
//!
//! This module provides the core state types for one game session:
//!
//! - `deck` - The two draw piles (prompts, responses)
//! - `player` - Identity registry surviving reconnects
//! - `round` - The round state machine and judge rotation
//! - `message` - Tagged client/server event schema and the outbox seam
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Session<O: Outbox>                     │
//! │                                                               │
//! │  ┌────────────────┐  ┌────────────┐  ┌────────────────────┐  │
//! │  │ PlayerRegistry │  │    Deck    │  │       Round        │  │
//! │  │                │  │            │  │                    │  │
//! │  │ token →        │  │ prompts    │  │ number, judge,     │  │
//! │  │   Player       │  │ responses  │  │ prompt,            │  │
//! │  │ conn → token   │  │            │  │ submissions[]      │  │
//! │  │ roster order   │  │            │  │                    │  │
//! │  └────────────────┘  └────────────┘  └────────────────────┘  │
//! │                                                               │
//! │  inbound ClientEvent ──▶ mutate ──▶ broadcast via Outbox      │
//! │  (re)connect ──────────▶ resync(id) ──▶ private catch-up      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every inbound event runs to completion before the next one; the embedding
//! process must keep a single writer (one owner, or one actor task fed by a
//! channel) so each operation stays atomic.

pub mod deck;
pub mod message;
pub mod player;
pub mod round;

// Re-export commonly used types
pub use deck::{
    CardPack, Deck, PromptCard, ResponseCard, NO_PROMPT_CARDS_LEFT, NO_RESPONSE_CARDS_LEFT,
};
pub use message::{
    ClientEvent, MemoryOutbox, Outbox, PendingPlayer, RosterEntry, ServerEvent, SubmissionView,
};
pub use player::{ConnectionId, Player, PlayerId, PlayerRegistry};
pub use round::{rotate_judge, Round, Submission, HAND_SIZE};

use std::fmt;

/// Why a client event was rejected.
///
/// Rejections are protocol-silent: the dispatch layer logs them and sends
/// nothing back. They surface here so callers and tests can see the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    UnknownConnection,
    UnknownPlayer,
    NotHost,
    NotJudge,
    RoundInProgress,
    NoRoundInProgress,
    NoActivePlayers,
    JudgeCannotSubmit,
    SpectatorCannotSubmit,
    AlreadySubmitted,
    CardNotInHand,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownConnection => write!(f, "Connection is not bound to an identity"),
            Self::UnknownPlayer => write!(f, "No such player"),
            Self::NotHost => write!(f, "Only the host may do this"),
            Self::NotJudge => write!(f, "Only the judge may do this"),
            Self::RoundInProgress => write!(f, "A round is already in progress"),
            Self::NoRoundInProgress => write!(f, "No round is in progress"),
            Self::NoActivePlayers => write!(f, "No active players"),
            Self::JudgeCannotSubmit => write!(f, "The judge cannot submit"),
            Self::SpectatorCannotSubmit => write!(f, "Spectators cannot submit"),
            Self::AlreadySubmitted => write!(f, "Already submitted this round"),
            Self::CardNotInHand => write!(f, "Card is not in hand"),
        }
    }
}

impl std::error::Error for SessionError {}

/// The one global session: player registry, draw piles, current round, and
/// the outbound channel.
///
/// All mutation flows through these methods. Clients never touch the state
/// directly; illegal or out-of-turn requests become no-ops.
#[derive(Debug)]
pub struct Session<O: Outbox> {
    players: PlayerRegistry,
    deck: Deck,
    round: Round,
    outbox: O,
}

impl<O: Outbox> Session<O> {
    pub fn new(deck: Deck, outbox: O) -> Self {
        Self {
            players: PlayerRegistry::new(),
            deck,
            round: Round::new(),
            outbox,
        }
    }

    /// The player registry (read-only).
    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    /// The current round (read-only).
    pub fn round(&self) -> &Round {
        &self.round
    }

    /// The draw piles (read-only).
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// The outbound channel.
    pub fn outbox(&self) -> &O {
        &self.outbox
    }

    /// The outbound channel, mutable (e.g. to drain a recording outbox).
    pub fn outbox_mut(&mut self) -> &mut O {
        &mut self.outbox
    }

    #[cfg(test)]
    fn registry_mut(&mut self) -> &mut PlayerRegistry {
        &mut self.players
    }

    /// Single dispatch entry point for inbound client traffic.
    ///
    /// Malformed or out-of-turn events are dropped after a debug log; nothing
    /// is reported back to the client.
    pub fn handle(&mut self, conn: &ConnectionId, event: ClientEvent) {
        if let Err(error) = self.dispatch(conn, event) {
            tracing::debug!(conn = %conn, %error, "client event ignored");
        }
    }

    fn dispatch(&mut self, conn: &ConnectionId, event: ClientEvent) -> Result<(), SessionError> {
        match event {
            ClientEvent::Join {
                token,
                desired_name,
            } => {
                self.bind(conn, &token, desired_name.as_deref());
                Ok(())
            }
            ClientEvent::Rename { name } => {
                let id = self.require_identity(conn)?;
                self.rename(&id, &name);
                Ok(())
            }
            ClientEvent::StartRound => {
                let id = self.require_identity(conn)?;
                self.start_round(&id)
            }
            ClientEvent::Submit { card } => {
                let id = self.require_identity(conn)?;
                self.submit(&id, &card)
            }
            ClientEvent::ChooseWinner { token } => {
                let id = self.require_identity(conn)?;
                self.choose_winner(&id, &token)
            }
            ClientEvent::Leave => {
                let id = self.require_identity(conn)?;
                self.leave(&id);
                Ok(())
            }
        }
    }

    fn require_identity(&self, conn: &ConnectionId) -> Result<PlayerId, SessionError> {
        self.players
            .identity_for(conn)
            .cloned()
            .ok_or(SessionError::UnknownConnection)
    }

    /// Bind or rebind a connection to an identity, broadcast the roster, and
    /// bring the (re)joining client current with the round in flight.
    pub fn bind(&mut self, conn: &ConnectionId, id: &PlayerId, desired_name: Option<&str>) {
        self.players
            .bind(id, desired_name, conn, self.round.in_progress);
        self.broadcast_roster();
        self.resync(id);
    }

    /// Rename an identity. Empty names are ignored.
    pub fn rename(&mut self, id: &PlayerId, new_name: &str) {
        if new_name.is_empty() {
            return;
        }
        self.players.rename(id, new_name);
        self.broadcast_roster();
        // The pending list carries names; refresh the caller's view of it.
        self.resync(id);
    }

    /// Host-only: begin a round if idle.
    ///
    /// Rotates the judge, draws a prompt, tops up every active hand to
    /// `HAND_SIZE`, and deals each hand privately. With no active players the
    /// call aborts without consuming a round number.
    pub fn start_round(&mut self, caller: &PlayerId) -> Result<(), SessionError> {
        if self.players.host_id() != Some(caller) {
            return Err(SessionError::NotHost);
        }
        if self.round.in_progress {
            return Err(SessionError::RoundInProgress);
        }

        let active = self.players.active_ids();
        let judge = rotate_judge(&active, self.round.judge.as_ref(), self.players.host_id())
            .ok_or(SessionError::NoActivePlayers)?;

        let prompt = self.deck.draw_prompt();
        self.round.begin(judge.clone(), prompt.clone());
        tracing::info!(round = self.round.number, judge = %judge, "round started");

        let started = ServerEvent::RoundStarted {
            round_number: self.round.number,
            judge,
            prompt,
        };
        self.outbox.send_all(&started);

        for id in &active {
            let Some(player) = self.players.get_mut(id) else {
                continue;
            };
            while player.hand.len() < HAND_SIZE {
                player.hand.push(self.deck.draw_response());
            }
            if let Some(conn) = player.connection.clone() {
                let hand = ServerEvent::YourHand {
                    cards: player.hand.clone(),
                };
                self.outbox.send_to(&conn, &hand);
            }
        }

        Ok(())
    }

    /// Play `card` from `id`'s hand into the active round.
    ///
    /// The exact card instance leaves the hand, the submitter gets a private
    /// ack, and either the reveal or the updated pending list goes out.
    pub fn submit(&mut self, id: &PlayerId, card: &str) -> Result<(), SessionError> {
        if !self.round.in_progress {
            return Err(SessionError::NoRoundInProgress);
        }
        if self.round.is_judge(id) {
            return Err(SessionError::JudgeCannotSubmit);
        }
        if self.round.has_submitted(id) {
            return Err(SessionError::AlreadySubmitted);
        }

        let player = self.players.get_mut(id).ok_or(SessionError::UnknownPlayer)?;
        if player.is_spectator {
            return Err(SessionError::SpectatorCannotSubmit);
        }
        let idx = player
            .hand
            .iter()
            .position(|c| c == card)
            .ok_or(SessionError::CardNotInHand)?;
        let card = player.hand.remove(idx);
        let conn = player.connection.clone();

        self.round.record(id.clone(), card);
        if let Some(conn) = conn {
            self.outbox.send_to(&conn, &ServerEvent::SubmissionReceived);
        }

        // Completion check: reveal exactly when every active non-judge
        // player's submission is in.
        let others = self.active_non_judge();
        if self.round.submissions.len() == others.len() {
            let reveal = ServerEvent::Reveal {
                submissions: self.reveal_view(),
            };
            self.outbox.send_all(&reveal);
        } else {
            let waiting = ServerEvent::AwaitingSubmissions {
                pending: self.pending_players(&others),
            };
            self.outbox.send_all(&waiting);
        }

        Ok(())
    }

    /// Judge-only: resolve the active round in `winner`'s favor.
    pub fn choose_winner(&mut self, caller: &PlayerId, winner: &PlayerId) -> Result<(), SessionError> {
        if !self.round.is_judge(caller) {
            return Err(SessionError::NotJudge);
        }
        if !self.round.in_progress {
            return Err(SessionError::NoRoundInProgress);
        }
        self.resolve(Some(winner));
        Ok(())
    }

    /// Resolve the current round, with or without a winner.
    ///
    /// A known winner gains a point and their submitted card is reported; an
    /// unknown or absent winner reports none. Spectator flags clear so late
    /// joiners play the next round.
    pub fn resolve(&mut self, winner: Option<&PlayerId>) {
        self.round.finish();

        let mut winner_id = None;
        let mut winner_name = None;
        let mut winning_card = None;
        if let Some(id) = winner {
            if let Some(player) = self.players.get_mut(id) {
                player.score += 1;
                winner_name = Some(player.name.clone());
                winning_card = self.round.submission_for(id).map(str::to_string);
                winner_id = Some(id.clone());
            }
        }
        tracing::info!(round = self.round.number, winner = ?winner_id, "round resolved");

        let resolved = ServerEvent::RoundResolved {
            prompt: self.round.prompt.clone(),
            winner: winner_id,
            winner_name,
            winning_card,
        };
        self.outbox.send_all(&resolved);
        self.broadcast_roster();

        self.players.clear_spectators();
    }

    /// Permanently remove an identity from the session.
    pub fn leave(&mut self, id: &PlayerId) {
        if self.players.leave(id).is_none() {
            return;
        }
        self.broadcast_roster();

        // A leaving judge can never pick a winner; resolve instead of
        // stalling the round.
        if self.round.in_progress && self.round.is_judge(id) {
            tracing::warn!(judge = %id, "judge left, resolving round with no winner");
            self.resolve(None);
        }
    }

    /// Report a lost connection.
    ///
    /// The identity stays registered with a cleared handle. Losing the judge
    /// mid-round resolves the round immediately with no winner.
    pub fn disconnect(&mut self, conn: &ConnectionId) {
        let Some(id) = self.players.disconnect(conn) else {
            return;
        };
        self.broadcast_roster();

        if self.round.in_progress && self.round.is_judge(&id) {
            tracing::warn!(judge = %id, "judge disconnected, resolving round with no winner");
            self.resolve(None);
        }
    }

    /// Rebuild one client's private view of the round in flight.
    ///
    /// Runs on every (re)bind. No-op while idle. The output is a pure
    /// function of current state, so a reconnecting client needs no
    /// persisted state of its own.
    pub fn resync(&mut self, id: &PlayerId) {
        if !self.round.in_progress {
            return;
        }
        let Some(player) = self.players.get(id) else {
            return;
        };
        let Some(conn) = player.connection.clone() else {
            return;
        };
        let Some(judge) = self.round.judge.clone() else {
            return;
        };

        let started = ServerEvent::RoundStarted {
            round_number: self.round.number,
            judge: judge.clone(),
            prompt: self.round.prompt.clone(),
        };
        self.outbox.send_to(&conn, &started);

        let others = self.active_non_judge();

        if judge == *id {
            if self.round.submissions.len() == others.len() {
                let reveal = ServerEvent::Reveal {
                    submissions: self.reveal_view(),
                };
                self.outbox.send_to(&conn, &reveal);
            } else {
                let waiting = ServerEvent::AwaitingSubmissions {
                    pending: self.pending_players(&others),
                };
                self.outbox.send_to(&conn, &waiting);
            }
            return;
        }

        if self.round.has_submitted(id) {
            self.outbox.send_to(&conn, &ServerEvent::SubmissionReceived);
        } else {
            let hand = ServerEvent::YourHand {
                cards: self.players.get(id).map(|p| p.hand.clone()).unwrap_or_default(),
            };
            self.outbox.send_to(&conn, &hand);
        }

        let waiting = ServerEvent::AwaitingSubmissions {
            pending: self.pending_players(&others),
        };
        self.outbox.send_to(&conn, &waiting);
    }

    /// Send the full roster snapshot to everyone.
    fn broadcast_roster(&mut self) {
        let players: Vec<RosterEntry> = self
            .players
            .players()
            .map(|p| RosterEntry {
                id: p.id.clone(),
                name: p.name.clone(),
                score: p.score,
                is_host: p.is_host,
                is_spectator: p.is_spectator,
                is_judge: self.round.judge.as_ref() == Some(&p.id),
            })
            .collect();
        let roster = ServerEvent::Roster { players };
        self.outbox.send_all(&roster);
    }

    /// Active non-judge ids in roster order.
    fn active_non_judge(&self) -> Vec<PlayerId> {
        self.players
            .active_ids()
            .into_iter()
            .filter(|id| !self.round.is_judge(id))
            .collect()
    }

    fn pending_players(&self, others: &[PlayerId]) -> Vec<PendingPlayer> {
        others
            .iter()
            .filter(|id| !self.round.has_submitted(id))
            .filter_map(|id| self.players.get(id))
            .map(|p| PendingPlayer {
                id: p.id.clone(),
                name: p.name.clone(),
            })
            .collect()
    }

    fn reveal_view(&self) -> Vec<SubmissionView> {
        self.round
            .submissions
            .iter()
            .map(|s| SubmissionView {
                id: s.player.clone(),
                card: s.card.clone(),
            })
            .collect()
    }
}
