//! Imperative front end over [`simulate`](crate::engine::simulate).
//!
//! Adapters push input as it arrives (tracking callbacks, taps, UI
//! commands) and call [`SelectionPhaseMachine::tick`] once per animation
//! frame. Input is buffered in arrival order and applied in one step, so a
//! tick always sees the latest completed callbacks and never waits for new
//! ones.

use tarot_deck::Category;
use tarot_reading::Reading;

use crate::config::EngineConfig;
use crate::engine::{EngineEvent, EngineState, FrameSnapshot};
use crate::input::{Command, FrameInput, InputMode, Tap};
use crate::landmarks::HandFrame;
use crate::phase::Phase;

pub struct SelectionPhaseMachine {
    state:   EngineState,
    pending: FrameInput,
}

impl SelectionPhaseMachine {
    pub fn new(cfg: EngineConfig, seed: u64) -> Self {
        SelectionPhaseMachine { state: EngineState::new(cfg, seed), pending: FrameInput::default() }
    }

    pub fn confirm_category(&mut self, category: Category) {
        self.pending.commands.push(Command::ChooseCategory(category));
    }

    pub fn submit_question(&mut self, question: impl Into<String>) {
        self.pending.commands.push(Command::SubmitQuestion(question.into()));
    }

    pub fn set_input_mode(&mut self, mode: InputMode) {
        self.pending.commands.push(Command::SetInputMode(mode));
    }

    pub fn deliver_reading(&mut self, generation: u64, reading: Reading) {
        self.pending.commands.push(Command::DeliverReading { generation, reading });
    }

    pub fn restart(&mut self) {
        self.pending.commands.push(Command::Restart);
    }

    /// One tracking callback; `None` when no hand was detected.
    pub fn on_tracking(&mut self, frame: Option<HandFrame>) {
        self.pending.tracking.push(frame);
    }

    pub fn on_tap(&mut self, tap: Tap) {
        self.pending.taps.push(tap);
    }

    /// Apply everything buffered since the last tick and advance by `dt`.
    pub fn tick(&mut self, dt: f32) -> Vec<EngineEvent> {
        let input = std::mem::take(&mut self.pending);
        self.state.step(&input, dt)
    }

    pub fn snapshot(&self) -> FrameSnapshot { self.state.snapshot() }
    pub fn phase(&self)    -> Phase { self.state.phase() }
    pub fn state(&self)    -> &EngineState { &self.state }
}
