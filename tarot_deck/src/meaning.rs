//! Static card meanings.
//!
//! Only the major arcana carry individual keywords; minor cards share a
//! generic text. This is the narrative shown whenever the reading service
//! is unavailable.

use crate::{Arcana, Card, Orientation};

/// Resolved meaning of one card in one orientation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardMeaning {
    pub title:             String,
    pub keywords:          &'static str,
    pub description:       &'static str,
    pub orientation_label: &'static str,
}

struct MajorEntry {
    upright:       &'static str,
    reversed:      &'static str,
    upright_desc:  &'static str,
    reversed_desc: &'static str,
}

const fn entry(upright: &'static str, reversed: &'static str) -> MajorEntry {
    MajorEntry { upright, reversed, upright_desc: "", reversed_desc: "" }
}

// Indexed by major arcana number.
const MAJORS: [MajorEntry; 22] = [
    MajorEntry {
        upright:       "New Beginnings, Freedom, Innocence",
        reversed:      "Recklessness, Risk",
        upright_desc:  "Trust your instincts and take a leap of faith.",
        reversed_desc: "Look before you leap.",
    },
    entry("Manifestation, Power",       "Manipulation, Trickery"),
    entry("Intuition, Mystery",         "Secrets, Withdrawn"),
    entry("Fertility, Nature",          "Dependence, Blocked"),
    entry("Authority, Structure",       "Tyranny, Rigidity"),
    entry("Tradition, Beliefs",         "Rebellion, Freedom"),
    entry("Love, Choices",              "Disharmony, Imbalance"),
    entry("Victory, Willpower",         "Lack of Control"),
    entry("Courage, Patience",          "Weakness, Doubt"),
    entry("Introspection, Solitude",    "Isolation, Withdrawal"),
    entry("Luck, Karma, Cycles",        "Bad Luck, Resistance"),
    entry("Justice, Truth",             "Unfairness, Dishonesty"),
    entry("Surrender, Perspective",     "Stalling, Resistance"),
    entry("Endings, Change",            "Resistance to Change"),
    entry("Balance, Patience",          "Imbalance, Excess"),
    entry("Addiction, Materialism",     "Detachment, Freedom"),
    entry("Disaster, Upheaval",         "Averting Disaster"),
    entry("Hope, Inspiration",          "Despair, Discouragement"),
    entry("Illusion, Fear",             "Release of Fear"),
    entry("Joy, Success",               "Sadness, Temporary"),
    entry("Judgement, Rebirth",         "Self-Doubt, Refusal"),
    entry("Completion, Travel",         "Incompletion, Stagnation"),
];

/// Look up the static meaning of `card` drawn in `orientation`.
pub fn meaning(card: &Card, orientation: Orientation) -> CardMeaning {
    let orientation_label = orientation.label();
    match card.arcana {
        Arcana::Major(n) => {
            let e = &MAJORS[n as usize];
            let (keywords, desc) = match orientation {
                Orientation::Upright  => (e.upright,  e.upright_desc),
                Orientation::Reversed => (e.reversed, e.reversed_desc),
            };
            CardMeaning {
                title: card.name.clone(),
                keywords,
                description: if desc.is_empty() { "A major turning point in your path." } else { desc },
                orientation_label,
            }
        }
        Arcana::Minor { .. } => CardMeaning {
            title:       card.name.clone(),
            keywords:    "Minor Arcana",
            description: "Reveals details of daily life.",
            orientation_label,
        },
    }
}
