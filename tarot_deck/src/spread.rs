//! Spreads (final card layouts) and the question categories that pick them.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Spread
// ════════════════════════════════════════════════════════════════════════════

/// A named layout for the drawn cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spread {
    /// One card, used for simple daily guidance.
    Single,
    /// Past, present, future in a row.
    TimeFlow,
    /// Four cards: self, partner, relationship, future.
    LovePyramid,
}

impl Spread {
    pub fn name(self) -> &'static str {
        match self {
            Spread::Single      => "One Card",
            Spread::TimeFlow    => "Time Flow (Past, Present, Future)",
            Spread::LovePyramid => "Love Pyramid",
        }
    }

    /// Number of cards the user must pick.
    pub fn count(self) -> usize {
        match self {
            Spread::Single      => 1,
            Spread::TimeFlow    => 3,
            Spread::LovePyramid => 4,
        }
    }

    /// Final layout position `(x, y, z)` of every slot, in pick order.
    pub fn slots(self) -> &'static [[f32; 3]] {
        match self {
            Spread::Single   => &[[0.0, 0.0, 0.0]],
            Spread::TimeFlow => &[
                [-2.5, 0.0, 0.0],
                [ 0.0, 0.0, 0.0],
                [ 2.5, 0.0, 0.0],
            ],
            Spread::LovePyramid => &[
                [ 0.0, -1.5, 0.0],
                [-2.0,  0.5, 0.0],
                [ 2.0,  0.5, 0.0],
                [ 0.0,  2.0, 0.0],
            ],
        }
    }

    /// Meaning of each slot, in pick order.
    pub fn position_labels(self) -> &'static [&'static str] {
        match self {
            Spread::Single      => &["Guidance"],
            Spread::TimeFlow    => &["Past", "Present", "Future"],
            Spread::LovePyramid => &["Self", "Partner", "Relationship", "Future"],
        }
    }

    /// Label for slot `i`, with a generic fallback past the end.
    pub fn position_label(self, i: usize) -> &'static str {
        self.position_labels().get(i).copied().unwrap_or("Guide")
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Category
// ════════════════════════════════════════════════════════════════════════════

/// The kind of question the user asks; determines the spread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Daily,
    Love,
    Career,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Daily, Category::Love, Category::Career];

    pub fn spread(self) -> Spread {
        match self {
            Category::Daily  => Spread::Single,
            Category::Love   => Spread::LovePyramid,
            Category::Career => Spread::TimeFlow,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Daily  => "Daily Guidance",
            Category::Love   => "Love & Relationships",
            Category::Career => "Career Path",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Category::Daily  => "The focus of today's energy, and what to do with it.",
            Category::Love   => "Where the relationship stands and where it is heading.",
            Category::Career => "The foundations laid so far and the opportunities ahead.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_and_labels_match_count() {
        for spread in [Spread::Single, Spread::TimeFlow, Spread::LovePyramid] {
            assert_eq!(spread.slots().len(), spread.count());
            assert_eq!(spread.position_labels().len(), spread.count());
        }
    }

    #[test]
    fn categories_map_to_spreads() {
        assert_eq!(Category::Daily.spread(), Spread::Single);
        assert_eq!(Category::Love.spread().count(), 4);
        assert_eq!(Category::Career.spread(), Spread::TimeFlow);
    }

    #[test]
    fn position_label_falls_back() {
        assert_eq!(Spread::TimeFlow.position_label(1), "Present");
        assert_eq!(Spread::Single.position_label(3), "Guide");
    }
}
