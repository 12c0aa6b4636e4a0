//! Player registry.
//!
//! Maps a stable, client-assigned identity token to mutable session state:
//! display name, live connection handle, score, hand, and role flags. The
//! identity survives reconnection; the connection handle does not. Only an
//! explicit leave removes a record.

use std::collections::HashMap;
use std::fmt;

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Stable per-player identity token, presented by the client on every connect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Handle for one live connection. Opaque to this crate; the transport picks
/// the format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub String);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One human participant, across reconnects.
#[derive(Debug, Clone)]
pub struct Player {
    /// Stable identity token
    pub id: PlayerId,

    /// Display name; no uniqueness constraint
    pub name: String,

    /// Present only while a live connection exists
    pub connection: Option<ConnectionId>,

    /// Incremented only on round win
    pub score: u32,

    /// Response cards currently held, consumed on submission
    pub hand: Vec<String>,

    /// Exactly one player holds this while any player exists
    pub is_host: bool,

    /// Joined mid-round; excluded until the current round resolves
    pub is_spectator: bool,

    /// When this identity first joined
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

impl Player {
    fn new(id: PlayerId, name: String, connection: ConnectionId, is_spectator: bool) -> Self {
        Self {
            id,
            name,
            connection: Some(connection),
            score: 0,
            hand: Vec::new(),
            is_host: false,
            is_spectator,
            joined_at: chrono::Utc::now(),
        }
    }

    /// Check for a live connection.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }
}

/// Player registry - all identities in the session, in stable join order.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    /// Players by identity token
    players: HashMap<PlayerId, Player>,

    /// Join order; the stable roster ordering for host transfer and
    /// judge rotation
    roster: Vec<PlayerId>,

    /// Connection handle to identity token mapping
    connection_index: HashMap<ConnectionId, PlayerId>,

    /// Current host
    host: Option<PlayerId>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent join/rebind.
    ///
    /// An unseen id creates a fresh identity (score 0, empty hand, spectator
    /// iff a round is in progress) and grants host status if no host exists.
    /// An empty desired name falls back to a generated guest name. A known id
    /// rebinds the connection and renames if a different non-empty name was
    /// supplied. Returns the identity's current record.
    pub fn bind(
        &mut self,
        id: &PlayerId,
        desired_name: Option<&str>,
        conn: &ConnectionId,
        round_in_progress: bool,
    ) -> &Player {
        if !self.players.contains_key(id) {
            let name = match desired_name {
                Some(n) if !n.is_empty() => n.to_string(),
                _ => guest_name(),
            };
            tracing::info!(player = %id, %name, spectator = round_in_progress, "new player");

            self.players.insert(
                id.clone(),
                Player::new(id.clone(), name, conn.clone(), round_in_progress),
            );
            self.roster.push(id.clone());

            if self.host.is_none() {
                self.grant_host(id);
            }
        } else {
            let player = self.players.get_mut(id).unwrap();
            if let Some(old) = player.connection.take() {
                self.connection_index.remove(&old);
            }
            player.connection = Some(conn.clone());

            if let Some(name) = desired_name {
                if !name.is_empty() && name != player.name {
                    tracing::info!(player = %id, %name, "player renamed on rebind");
                    player.name = name.to_string();
                }
            }
        }

        self.connection_index.insert(conn.clone(), id.clone());
        &self.players[id]
    }

    /// Overwrite a player's display name. Empty names are ignored.
    pub fn rename(&mut self, id: &PlayerId, new_name: &str) {
        if new_name.is_empty() {
            return;
        }
        if let Some(player) = self.players.get_mut(id) {
            tracing::info!(player = %id, name = %new_name, "player renamed");
            player.name = new_name.to_string();
        }
    }

    /// Clear the connection handle for whoever holds `conn`. The identity
    /// stays registered. Returns the affected id.
    pub fn disconnect(&mut self, conn: &ConnectionId) -> Option<PlayerId> {
        let id = self.connection_index.remove(conn)?;
        if let Some(player) = self.players.get_mut(&id) {
            player.connection = None;
        }
        Some(id)
    }

    /// Permanently remove an identity. Host status transfers to the first
    /// remaining player in roster order, or becomes unset.
    pub fn leave(&mut self, id: &PlayerId) -> Option<Player> {
        let player = self.players.remove(id)?;
        self.roster.retain(|r| r != id);
        if let Some(conn) = &player.connection {
            self.connection_index.remove(conn);
        }

        if self.host.as_ref() == Some(id) {
            self.host = None;
            if let Some(next) = self.roster.first().cloned() {
                self.grant_host(&next);
            }
        }

        Some(player)
    }

    fn grant_host(&mut self, id: &PlayerId) {
        if let Some(player) = self.players.get_mut(id) {
            tracing::info!(player = %id, "host granted");
            player.is_host = true;
            self.host = Some(id.clone());
        }
    }

    /// Identity currently bound to a connection handle.
    pub fn identity_for(&self, conn: &ConnectionId) -> Option<&PlayerId> {
        self.connection_index.get(conn)
    }

    /// Get a player.
    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    /// Get a mutable player.
    pub fn get_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    /// Current host, if any player exists.
    pub fn host_id(&self) -> Option<&PlayerId> {
        self.host.as_ref()
    }

    /// All players in stable join order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.roster.iter().filter_map(|id| self.players.get(id))
    }

    /// Ids of non-spectator players in stable join order.
    pub fn active_ids(&self) -> Vec<PlayerId> {
        self.players()
            .filter(|p| !p.is_spectator)
            .map(|p| p.id.clone())
            .collect()
    }

    /// Clear every spectator flag, so late joiners play the next round.
    pub fn clear_spectators(&mut self) {
        for player in self.players.values_mut() {
            player.is_spectator = false;
        }
    }

    /// Player count.
    pub fn count(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Fallback display name when a joining client supplies none.
fn guest_name() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(4)
        .map(char::from)
        .collect();
    format!("Guest-{}", suffix)
}
