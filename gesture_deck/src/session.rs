//! One reading session: from a confirmed category to the revealed spread.
//!
//! The session owns everything that must not survive a restart: the picks,
//! the shuffle energy and the grab-hold progress. Dropping the session is
//! the reset.

use tarot_deck::{Category, Orientation, Spread, DECK_SIZE};
use tarot_reading::{DrawnCard, ReadingRequest};

use crate::config::EngineConfig;
use crate::energy::EnergyAccumulator;
use crate::error::SelectError;
use crate::grab::GrabHoldDebouncer;

/// A card taken out of the orbit, in pick order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pick {
    pub index:       usize,
    pub orientation: Orientation,
}

#[derive(Clone, Debug)]
pub struct SelectionSession {
    category: Category,
    question: String,
    picks:    Vec<Pick>,
    pub energy: EnergyAccumulator,
    pub grab:   GrabHoldDebouncer,
}

impl SelectionSession {
    pub fn new(category: Category, cfg: &EngineConfig) -> Self {
        let target = category.spread().count();
        SelectionSession {
            category,
            question: String::new(),
            picks:    Vec::with_capacity(target),
            energy:   EnergyAccumulator::new(cfg.energy.clone()),
            grab:     GrabHoldDebouncer::new(cfg.grab.clone()),
        }
    }

    pub fn category(&self)     -> Category { self.category }
    pub fn spread(&self)       -> Spread   { self.category.spread() }
    pub fn target_count(&self) -> usize    { self.spread().count() }
    pub fn question(&self)     -> &str     { &self.question }
    pub fn picks(&self)        -> &[Pick]  { &self.picks }
    pub fn is_complete(&self)  -> bool     { self.picks.len() >= self.target_count() }

    pub fn set_question(&mut self, question: &str) {
        self.question = question.trim().to_string();
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.picks.iter().any(|p| p.index == index)
    }

    /// Add a pick. Returns its slot in the spread.
    pub fn select(&mut self, index: usize, orientation: Orientation) -> Result<usize, SelectError> {
        if index >= DECK_SIZE {
            return Err(SelectError::OutOfRange(index));
        }
        if self.is_complete() {
            return Err(SelectError::Full(self.target_count()));
        }
        if self.is_selected(index) {
            return Err(SelectError::Duplicate(index));
        }
        self.picks.push(Pick { index, orientation });
        Ok(self.picks.len() - 1)
    }

    /// The request handed to the reading service once the spread is full.
    pub fn reading_request(&self) -> ReadingRequest {
        let spread = self.spread();
        ReadingRequest {
            question: self.question.clone(),
            spread,
            cards: self.picks.iter().enumerate()
                .map(|(slot, p)| DrawnCard::new(p.index, p.orientation, spread.position_label(slot)))
                .collect(),
        }
    }
}
