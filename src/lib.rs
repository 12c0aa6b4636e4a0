//! Blanks Session State Library
//!
//! This crate provides session state management for the Blanks party game:
//! one shared game session, many connected players, broadcast updates, and
//! reconnection recovery.
//!
//! # Overview
//!
//! The state module provides:
//!
//! - **Player Registry** - Binds a stable per-player token to a display name,
//!   live connection handle, score, hand, and host/spectator flags. The
//!   identity survives reconnection; the connection handle does not.
//!
//! - **Round State Machine** - Round lifecycle from idle through submission
//!   collection to resolution, with judge rotation over a stable roster
//!   ordering.
//!
//! - **Deck Manager** - Two shuffle-once draw piles (prompts, responses) with
//!   sentinel cards on exhaustion instead of errors.
//!
//! - **Resynchronization** - Any (re)connecting client is brought current
//!   from server state alone; nothing is queued or replayed.
//!
//! # Design Principles
//!
//! 1. **Single writer** - One `Session` owns everything; every inbound event
//!    runs to completion before the next.
//!
//! 2. **Silent rejection** - Illegal or out-of-turn client events are no-ops,
//!    never protocol errors.
//!
//! 3. **No networking** - This crate is pure state. The embedding process
//!    supplies the card packs and an `Outbox` transport.
//!
//! 4. **Tagged messages** - Every inbound and outbound event is a serde-tagged
//!    enum variant, validated before it reaches the core.
//!
//! # Example
//!
//! ```rust
//! use blanks_state::state::{ClientEvent, ConnectionId, Deck, MemoryOutbox, PlayerId, Session};
//!
//! let deck = Deck::from_piles(
//!     vec!["___ is great.".to_string()],
//!     (0..30).map(|i| format!("response {}", i)).collect(),
//! );
//! let mut session = Session::new(deck, MemoryOutbox::new());
//!
//! // Two players join; the first becomes host.
//! let host_conn = ConnectionId::from("conn-1");
//! session.handle(&host_conn, ClientEvent::Join {
//!     token: PlayerId::from("uid-alice"),
//!     desired_name: Some("Alice".to_string()),
//! });
//! session.handle(&ConnectionId::from("conn-2"), ClientEvent::Join {
//!     token: PlayerId::from("uid-bob"),
//!     desired_name: Some("Bob".to_string()),
//! });
//!
//! // The host starts a round: Alice judges, everyone active gets a hand.
//! session.handle(&host_conn, ClientEvent::StartRound);
//! assert!(session.round().in_progress);
//! assert_eq!(session.round().judge, Some(PlayerId::from("uid-alice")));
//! ```

pub mod state;

// Re-export everything from state module at crate root
pub use state::*;
