//! # tarot_deck
//!
//! The fixed 78-card tarot deck used by the selection engine, plus the
//! spreads a reading can be laid out in and the static card meanings used
//! as a fallback narrative.
//!
//! Card indices are stable: `0..=21` are the major arcana in traditional
//! order, followed by the four suits (Cups, Pentacles, Swords, Wands), each
//! running Ace, 2–10, Page, Knight, Queen, King.
//!
//! ```rust
//! use tarot_deck::{Deck, DECK_SIZE};
//!
//! let deck = Deck::standard();
//! assert_eq!(deck.len(), DECK_SIZE);
//! assert_eq!(deck.get(0).unwrap().name, "The Fool");
//! assert_eq!(deck.get(22).unwrap().name, "Ace of Cups");
//! ```

pub mod meaning;
pub mod spread;

pub use meaning::{meaning, CardMeaning};
pub use spread::{Category, Spread};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = 78;

/// Number of major arcana at the front of the deck.
pub const MAJOR_COUNT: usize = 22;

/// Cards per minor suit.
pub const SUIT_SIZE: usize = 14;

// ════════════════════════════════════════════════════════════════════════════
// Names
// ════════════════════════════════════════════════════════════════════════════

pub(crate) const MAJOR_ARCANA: [&str; MAJOR_COUNT] = [
    "The Fool", "The Magician", "The High Priestess", "The Empress", "The Emperor",
    "The Hierophant", "The Lovers", "The Chariot", "Strength", "The Hermit",
    "Wheel of Fortune", "Justice", "The Hanged Man", "Death", "Temperance",
    "The Devil", "The Tower", "The Star", "The Moon", "The Sun",
    "Judgement", "The World",
];

// ════════════════════════════════════════════════════════════════════════════
// Suit / Arcana
// ════════════════════════════════════════════════════════════════════════════

/// One of the four minor-arcana suits, in deck order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suit { Cups, Pentacles, Swords, Wands }

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Cups, Suit::Pentacles, Suit::Swords, Suit::Wands];

    pub fn name(self) -> &'static str {
        match self {
            Suit::Cups      => "Cups",
            Suit::Pentacles => "Pentacles",
            Suit::Swords    => "Swords",
            Suit::Wands     => "Wands",
        }
    }

    /// Prefix used in texture asset names (`pents` is abbreviated).
    pub fn asset_prefix(self) -> &'static str {
        match self {
            Suit::Cups      => "cups",
            Suit::Pentacles => "pents",
            Suit::Swords    => "swords",
            Suit::Wands     => "wands",
        }
    }
}

/// Which arcana a card belongs to.
///
/// `rank` for minor cards runs 1 (Ace) to 14 (King).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Arcana {
    Major(u8),
    Minor { suit: Suit, rank: u8 },
}

fn rank_name(rank: u8) -> String {
    match rank {
        1  => "Ace".to_string(),
        11 => "Page".to_string(),
        12 => "Knight".to_string(),
        13 => "Queen".to_string(),
        14 => "King".to_string(),
        n  => n.to_string(),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Card
// ════════════════════════════════════════════════════════════════════════════

/// A single card of the standard deck.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    /// Stable position in the deck, `0..DECK_SIZE`.
    pub index:  usize,
    pub name:   String,
    pub arcana: Arcana,
}

impl Card {
    /// Build the card at `index`, or `None` if out of range.
    pub fn at(index: usize) -> Option<Card> {
        if index < MAJOR_COUNT {
            return Some(Card {
                index,
                name:   MAJOR_ARCANA[index].to_string(),
                arcana: Arcana::Major(index as u8),
            });
        }
        if index >= DECK_SIZE { return None; }

        let minor = index - MAJOR_COUNT;
        let suit  = Suit::ALL[minor / SUIT_SIZE];
        let rank  = (minor % SUIT_SIZE + 1) as u8;
        Some(Card {
            index,
            name:   format!("{} of {}", rank_name(rank), suit.name()),
            arcana: Arcana::Minor { suit, rank },
        })
    }

    /// Texture key, e.g. `maj00` or `pents14`.
    pub fn asset_key(&self) -> String {
        match self.arcana {
            Arcana::Major(n)             => format!("maj{:02}", n),
            Arcana::Minor { suit, rank } => format!("{}{:02}", suit.asset_prefix(), rank),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Deck
// ════════════════════════════════════════════════════════════════════════════

/// The full 78-card deck in canonical order.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn standard() -> Self {
        let cards = (0..DECK_SIZE).filter_map(Card::at).collect();
        Deck { cards }
    }

    pub fn get(&self, index: usize) -> Option<&Card> { self.cards.get(index) }
    pub fn len(&self) -> usize { self.cards.len() }
    pub fn is_empty(&self) -> bool { self.cards.is_empty() }
    pub fn iter(&self) -> std::slice::Iter<'_, Card> { self.cards.iter() }
}

impl Default for Deck {
    fn default() -> Self { Deck::standard() }
}

// ════════════════════════════════════════════════════════════════════════════
// Orientation
// ════════════════════════════════════════════════════════════════════════════

/// Whether a drawn card lies upright or reversed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation { Upright, Reversed }

impl Orientation {
    /// Fair coin flip.
    pub fn flip<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.random_bool(0.5) { Orientation::Reversed } else { Orientation::Upright }
    }

    pub fn is_reversed(self) -> bool { self == Orientation::Reversed }

    pub fn label(self) -> &'static str {
        match self {
            Orientation::Upright  => "Upright",
            Orientation::Reversed => "Reversed",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
