//! Everything the engine consumes between two ticks.

use tarot_deck::Category;
use tarot_reading::Reading;

use crate::landmarks::HandFrame;

/// How the user drives the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    /// Hand tracking: poses, motion and the grab-hold.
    #[default]
    Gesture,
    /// Discrete taps replace the classifier; shuffling charges itself.
    Touch,
}

/// A discrete tap or click.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tap {
    /// Anywhere on screen.
    Screen,
    /// On a laid-out spread slot.
    Slot(usize),
}

/// Session-level requests from the UI or the adapters.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    ChooseCategory(Category),
    SubmitQuestion(String),
    SetInputMode(InputMode),
    /// A reading finished for the session with this generation.
    DeliverReading { generation: u64, reading: Reading },
    Restart,
}

/// Input gathered since the previous tick. Tracking callbacks are kept in
/// arrival order; `None` is a callback that saw no hand.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameInput {
    pub commands: Vec<Command>,
    pub tracking: Vec<Option<HandFrame>>,
    pub taps:     Vec<Tap>,
}

impl FrameInput {
    pub fn command(c: Command) -> Self {
        FrameInput { commands: vec![c], ..Default::default() }
    }

    pub fn frames<I: IntoIterator<Item = Option<HandFrame>>>(frames: I) -> Self {
        FrameInput { tracking: frames.into_iter().collect(), ..Default::default() }
    }

    pub fn tap(t: Tap) -> Self {
        FrameInput { taps: vec![t], ..Default::default() }
    }
}
