//! Round state.
//!
//! One play cycle: a prompt card, a judge, and the submissions collected from
//! every other active player. At most one round is in progress at a time; the
//! round number keeps advancing across cycles.

use super::player::PlayerId;

/// Target hand size; active hands are topped up to this at round start.
pub const HAND_SIZE: usize = 10;

/// A collected (player, card) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub player: PlayerId,
    pub card: String,
}

/// The current play cycle.
#[derive(Debug, Clone, Default)]
pub struct Round {
    /// Strictly increasing across started rounds; 0 before the first
    pub number: u32,

    /// Excluded from submitting; kept between rounds so rotation has an
    /// anchor
    pub judge: Option<PlayerId>,

    /// Prompt text for this round; fixed once drawn
    pub prompt: String,

    /// Submissions in arrival order
    pub submissions: Vec<Submission>,

    /// True from round start until resolution
    pub in_progress: bool,

    /// When the current round started
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Round {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the next round: bump the number, adopt the rotated judge and the
    /// drawn prompt, drop any stale submissions.
    pub fn begin(&mut self, judge: PlayerId, prompt: String) {
        self.number += 1;
        self.judge = Some(judge);
        self.prompt = prompt;
        self.submissions.clear();
        self.in_progress = true;
        self.started_at = Some(chrono::Utc::now());
    }

    /// Leave the in-progress state. Judge and number are kept for rotation
    /// and reporting.
    pub fn finish(&mut self) {
        self.in_progress = false;
    }

    /// Check whether `id` is the current judge.
    pub fn is_judge(&self, id: &PlayerId) -> bool {
        self.judge.as_ref() == Some(id)
    }

    /// Check whether `id` already submitted this round.
    pub fn has_submitted(&self, id: &PlayerId) -> bool {
        self.submissions.iter().any(|s| &s.player == id)
    }

    /// Record a submission.
    pub fn record(&mut self, player: PlayerId, card: String) {
        self.submissions.push(Submission { player, card });
    }

    /// The card `id` submitted this round, if any.
    pub fn submission_for(&self, id: &PlayerId) -> Option<&str> {
        self.submissions
            .iter()
            .find(|s| &s.player == id)
            .map(|s| s.card.as_str())
    }
}

/// Pick the judge for the next round from the active roster.
///
/// Rotation is recomputed fresh from the stable roster ordering each round:
/// the first round goes to the host, afterwards to the next active player
/// after the sitting judge, wrapping. A judge who is no longer active falls
/// back to the first active player.
pub fn rotate_judge(
    active: &[PlayerId],
    current: Option<&PlayerId>,
    host: Option<&PlayerId>,
) -> Option<PlayerId> {
    if active.is_empty() {
        return None;
    }

    match current {
        None => match host {
            Some(h) if active.contains(h) => Some(h.clone()),
            _ => Some(active[0].clone()),
        },
        Some(judge) => match active.iter().position(|id| id == judge) {
            Some(idx) => Some(active[(idx + 1) % active.len()].clone()),
            None => Some(active[0].clone()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<PlayerId> {
        names.iter().map(|n| PlayerId::from(*n)).collect()
    }

    #[test]
    fn test_begin_advances_and_resets() {
        let mut round = Round::new();
        assert_eq!(round.number, 0);
        assert!(!round.in_progress);

        round.begin(PlayerId::from("u1"), "p1".to_string());
        round.record(PlayerId::from("u2"), "card".to_string());

        assert_eq!(round.number, 1);
        assert!(round.in_progress);
        assert_eq!(round.submissions.len(), 1);

        round.finish();
        assert!(!round.in_progress);

        round.begin(PlayerId::from("u2"), "p2".to_string());
        assert_eq!(round.number, 2);
        assert!(round.submissions.is_empty());
        assert_eq!(round.prompt, "p2");
    }

    #[test]
    fn test_submission_lookup() {
        let mut round = Round::new();
        round.begin(PlayerId::from("judge"), "p".to_string());
        round.record(PlayerId::from("u1"), "first".to_string());
        round.record(PlayerId::from("u2"), "second".to_string());

        assert!(round.has_submitted(&PlayerId::from("u1")));
        assert!(!round.has_submitted(&PlayerId::from("u3")));
        assert_eq!(round.submission_for(&PlayerId::from("u2")), Some("second"));
        assert_eq!(round.submission_for(&PlayerId::from("judge")), None);
    }

    #[test]
    fn test_first_round_judge_is_host() {
        let active = ids(&["a", "b", "c"]);
        let judge = rotate_judge(&active, None, Some(&PlayerId::from("b")));
        assert_eq!(judge, Some(PlayerId::from("b")));
    }

    #[test]
    fn test_rotation_advances_and_wraps() {
        let active = ids(&["a", "b", "c"]);

        let judge = rotate_judge(&active, Some(&PlayerId::from("a")), Some(&PlayerId::from("a")));
        assert_eq!(judge, Some(PlayerId::from("b")));

        let judge = rotate_judge(&active, Some(&PlayerId::from("c")), Some(&PlayerId::from("a")));
        assert_eq!(judge, Some(PlayerId::from("a")));
    }

    #[test]
    fn test_rotation_falls_back_when_judge_gone() {
        let active = ids(&["a", "b"]);
        let judge = rotate_judge(&active, Some(&PlayerId::from("gone")), Some(&PlayerId::from("a")));
        assert_eq!(judge, Some(PlayerId::from("a")));
    }

    #[test]
    fn test_rotation_with_no_active_players() {
        assert_eq!(rotate_judge(&[], None, Some(&PlayerId::from("a"))), None);
        assert_eq!(rotate_judge(&[], Some(&PlayerId::from("a")), None), None);
    }

    #[test]
    fn test_rotation_inactive_host_falls_back() {
        let active = ids(&["b", "c"]);
        let judge = rotate_judge(&active, None, Some(&PlayerId::from("a")));
        assert_eq!(judge, Some(PlayerId::from("b")));
    }
}
