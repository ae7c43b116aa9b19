//! Session phases.
//!
//! ```text
//! Intro → CategoryChosen → QuestionInput → Focusing → Shuffling
//!       → Transitioning → DeckReady → AutoSpreading → PickingGuide
//!       → Picking → Manifesting → Revealed → (restart) → Intro
//! ```

use crate::input::InputMode;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    #[default]
    Intro,
    CategoryChosen,
    QuestionInput,
    Focusing,
    Shuffling,
    Transitioning,
    DeckReady,
    AutoSpreading,
    PickingGuide,
    Picking,
    Manifesting,
    Revealed,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Intro          => "intro",
            Phase::CategoryChosen => "category-chosen",
            Phase::QuestionInput  => "question-input",
            Phase::Focusing       => "focusing",
            Phase::Shuffling      => "shuffling",
            Phase::Transitioning  => "transitioning",
            Phase::DeckReady      => "deck-ready",
            Phase::AutoSpreading  => "auto-spreading",
            Phase::PickingGuide   => "picking-guide",
            Phase::Picking        => "picking",
            Phase::Manifesting    => "manifesting",
            Phase::Revealed       => "revealed",
        }
    }

    /// Overlay text for the phase; gesture and touch users get different
    /// instructions.
    pub fn hint(self, mode: InputMode) -> &'static str {
        match (self, mode) {
            (Phase::Intro, _) | (Phase::CategoryChosen, _) => "Follow your inner guidance",
            (Phase::QuestionInput, _)            => "Hold your question in mind",
            (Phase::Focusing, _)                 => "Breathe and focus",
            (Phase::Shuffling, InputMode::Gesture) => "Wave your hand to charge the deck",
            (Phase::Shuffling, InputMode::Touch)   => "Tap to shuffle",
            (Phase::Transitioning, _) | (Phase::DeckReady, _) | (Phase::AutoSpreading, _) => "The deck opens",
            (Phase::PickingGuide, InputMode::Gesture) | (Phase::Picking, InputMode::Gesture) =>
                "Open hand to browse, close your fist to draw",
            (Phase::PickingGuide, InputMode::Touch) | (Phase::Picking, InputMode::Touch) =>
                "Tap to draw a card",
            (Phase::Manifesting, _)              => "The cards are speaking",
            (Phase::Revealed, InputMode::Gesture) => "Sweep your open hand to reveal",
            (Phase::Revealed, InputMode::Touch)   => "Tap a card to reveal it",
        }
    }

    /// Phases in which the user is expected to act; the idle timeout only
    /// runs here.
    pub fn is_interactive(self) -> bool {
        (Phase::Shuffling..=Phase::Picking).contains(&self)
    }

    /// Phases in which the deck orbit is on screen and simulated.
    pub fn shows_orbit(self) -> bool {
        (Phase::DeckReady..=Phase::Picking).contains(&self)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
