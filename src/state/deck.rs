//! Deck state management.
//!
//! Two independent draw piles (prompt cards and response cards), built once
//! from card packs at load time. Draws pop from the top of the pile; an
//! exhausted pile hands out a sentinel card instead of failing, so play
//! continues degraded rather than crashing.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

/// Sentinel card returned when the prompt pile is empty.
pub const NO_PROMPT_CARDS_LEFT: &str = "NO PROMPT CARDS LEFT";

/// Sentinel card returned when the response pile is empty.
pub const NO_RESPONSE_CARDS_LEFT: &str = "NO RESPONSE CARDS LEFT";

/// A response card as it appears in a pack file.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseCard {
    pub text: String,
}

/// A prompt card as it appears in a pack file.
///
/// `pick` is how many responses the prompt asks for. This session type only
/// plays single-blank prompts; anything else is dropped at load time.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptCard {
    pub text: String,

    #[serde(default = "default_pick")]
    pub pick: u8,
}

fn default_pick() -> u8 {
    1
}

/// One expansion pack. Pack files use the legacy `black`/`white` field names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardPack {
    #[serde(default, rename = "black")]
    pub prompts: Vec<PromptCard>,

    #[serde(default, rename = "white")]
    pub responses: Vec<ResponseCard>,
}

impl CardPack {
    /// Parse a whole pack file (a JSON array of packs).
    pub fn parse_set(json: &str) -> serde_json::Result<Vec<CardPack>> {
        serde_json::from_str(json)
    }
}

/// The two draw piles for a session.
///
/// A drawn card is removed from its pile and never redrawn. There is no
/// reshuffle, so an exhausted pile stays exhausted for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    prompts: Vec<String>,
    responses: Vec<String>,
}

impl Deck {
    /// Build the piles from a set of packs.
    ///
    /// Flattens all packs, keeps single-blank prompts only, dedupes each pile
    /// preserving first occurrence, then shuffles each pile once.
    pub fn from_packs<R: Rng>(packs: &[CardPack], rng: &mut R) -> Self {
        let mut seen = HashSet::new();
        let mut prompts: Vec<String> = packs
            .iter()
            .flat_map(|p| p.prompts.iter())
            .filter(|c| c.pick == 1)
            .map(|c| c.text.clone())
            .filter(|t| seen.insert(t.clone()))
            .collect();

        let mut seen = HashSet::new();
        let mut responses: Vec<String> = packs
            .iter()
            .flat_map(|p| p.responses.iter())
            .map(|c| c.text.clone())
            .filter(|t| seen.insert(t.clone()))
            .collect();

        prompts.shuffle(rng);
        responses.shuffle(rng);

        tracing::info!(
            prompts = prompts.len(),
            responses = responses.len(),
            "deck built from packs"
        );

        Self { prompts, responses }
    }

    /// Build a deck from already-prepared piles (no filtering or shuffling).
    pub fn from_piles(prompts: Vec<String>, responses: Vec<String>) -> Self {
        Self { prompts, responses }
    }

    /// Draw the top prompt card, or the sentinel if the pile is empty.
    pub fn draw_prompt(&mut self) -> String {
        match self.prompts.pop() {
            Some(card) => card,
            None => {
                tracing::warn!("prompt pile exhausted");
                NO_PROMPT_CARDS_LEFT.to_string()
            }
        }
    }

    /// Draw the top response card, or the sentinel if the pile is empty.
    pub fn draw_response(&mut self) -> String {
        match self.responses.pop() {
            Some(card) => card,
            None => {
                tracing::warn!("response pile exhausted");
                NO_RESPONSE_CARDS_LEFT.to_string()
            }
        }
    }

    /// Remaining prompt cards.
    pub fn prompt_count(&self) -> usize {
        self.prompts.len()
    }

    /// Remaining response cards.
    pub fn response_count(&self) -> usize {
        self.responses.len()
    }
}
