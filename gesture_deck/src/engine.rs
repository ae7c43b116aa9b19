//! The selection engine as a pure step function.
//!
//! [`EngineState`] holds everything that changes over a session; no state
//! lives anywhere else. [`simulate`] advances it by one animation tick given
//! the input gathered since the previous tick, and reports what happened as
//! [`EngineEvent`]s. Nothing here touches a window, a thread or the network,
//! so whole sessions can be replayed deterministically in tests.
//!
//! Within one step the order is fixed:
//!
//! | # | Input | Effect |
//! |---|---|---|
//! | 1 | commands | category, question, input mode, readings, restart |
//! | 2 | tracking callbacks | classify → smoother raw signal → grab-hold (Picking) |
//! | 3 | taps | energy (Shuffling), direct pick (Picking), direct reveal (Revealed) |
//! | 4 | tick | smoothing, energy, orbit, phase timers, reveal sweep, idle abort |
//!
//! Commands run first, so a restart in the same batch as a tracking callback
//! means the callback applies to the fresh session.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use tarot_deck::{Category, Orientation};
use tarot_reading::{fallback_reading, Reading, ReadingRequest, ReadingSource};

use crate::config::EngineConfig;
use crate::energy::ENERGY_MAX;
use crate::input::{Command, FrameInput, InputMode, Tap};
use crate::landmarks::HandFrame;
use crate::motion::MotionSmoother;
use crate::orbit::{CardTransform, OrbitSimulator};
use crate::phase::Phase;
use crate::pose::{Pose, PoseClassifier, PoseSample};
use crate::reveal::RevealSweep;
use crate::session::SelectionSession;

// ════════════════════════════════════════════════════════════════════════════
// Events
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetReason {
    Restart,
    IdleTimeout,
}

/// Discrete outcomes of one step, in the order they happened.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    PhaseChanged     { from: Phase, to: Phase },
    EnergyFull,
    CardSelected     { index: usize, orientation: Orientation, slot: usize },
    /// Hand `request` to the reading service; answer with
    /// [`Command::DeliverReading`] carrying the same generation.
    ReadingRequested { generation: u64, request: ReadingRequest },
    ReadingApplied   { generation: u64, source: ReadingSource },
    CardRevealed     { slot: usize, index: usize },
    SessionReset     { reason: ResetReason },
}

// ════════════════════════════════════════════════════════════════════════════
// Snapshot — copied out for the renderer every frame
// ════════════════════════════════════════════════════════════════════════════

/// One laid-out card of the final spread.
#[derive(Clone, Debug, PartialEq)]
pub struct SpreadSlotView {
    pub slot:        usize,
    pub index:       usize,
    pub name:        String,
    pub label:       &'static str,
    pub orientation: Orientation,
    pub position:    [f32; 3],
    pub revealed:    bool,
    pub passage:     Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameSnapshot {
    pub phase:           Phase,
    pub input_mode:      InputMode,
    pub generation:      u64,
    pub category:        Option<Category>,
    pub energy:          f32,
    pub grab_progress:   f32,
    pub cooldown:        bool,
    pub spread_progress: f32,
    pub pose:            Pose,
    pub pointer:         (f32, f32),
    pub highlighted:     Option<usize>,
    pub cards:           Vec<CardTransform>,
    pub spread:          Vec<SpreadSlotView>,
}

// ════════════════════════════════════════════════════════════════════════════
// EngineState
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct EngineState {
    cfg:             EngineConfig,
    classifier:      PoseClassifier,
    motion:          MotionSmoother,
    orbit:           OrbitSimulator,
    session:         Option<SelectionSession>,
    reveal:          Option<RevealSweep>,
    reading:         Option<Reading>,
    phase:           Phase,
    phase_time:      f32,
    spread_progress: f32,
    idle_time:       f32,
    since_callback:  f32,
    input_mode:      InputMode,
    last_sample:     PoseSample,
    generation:      u64,
    rng:             StdRng,
}

/// Advance `state` by one tick of `dt` seconds.
pub fn simulate(mut state: EngineState, input: &FrameInput, dt: f32) -> (EngineState, Vec<EngineEvent>) {
    let events = state.step(input, dt);
    (state, events)
}

impl EngineState {
    pub fn new(cfg: EngineConfig, seed: u64) -> Self {
        EngineState {
            classifier:      PoseClassifier::new(cfg.pose.clone()),
            motion:          MotionSmoother::new(cfg.motion.clone()),
            orbit:           OrbitSimulator::new(cfg.orbit.clone()),
            session:         None,
            reveal:          None,
            reading:         None,
            phase:           Phase::Intro,
            phase_time:      0.0,
            spread_progress: 0.0,
            idle_time:       0.0,
            since_callback:  0.0,
            input_mode:      InputMode::Gesture,
            last_sample:     PoseSample::ABSENT,
            generation:      0,
            rng:             StdRng::seed_from_u64(seed),
            cfg,
        }
    }

    pub fn phase(&self)        -> Phase     { self.phase }
    pub fn input_mode(&self)   -> InputMode { self.input_mode }
    pub fn generation(&self)   -> u64       { self.generation }
    pub fn config(&self)       -> &EngineConfig { &self.cfg }
    pub fn session(&self)      -> Option<&SelectionSession> { self.session.as_ref() }
    pub fn orbit(&self)        -> &OrbitSimulator { &self.orbit }
    pub fn motion(&self)       -> &MotionSmoother { &self.motion }
    pub fn reading(&self)      -> Option<&Reading> { self.reading.as_ref() }
    pub fn reveal(&self)       -> Option<&RevealSweep> { self.reveal.as_ref() }
    pub fn last_sample(&self)  -> PoseSample { self.last_sample }

    pub fn energy(&self) -> f32 {
        self.session.as_ref().map_or(0.0, |s| s.energy.value())
    }

    pub fn grab_progress(&self) -> f32 {
        self.session.as_ref().map_or(0.0, |s| s.grab.progress())
    }

    /// Run one full step. Prefer [`simulate`] outside this crate.
    pub fn step(&mut self, input: &FrameInput, dt: f32) -> Vec<EngineEvent> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let mut events = Vec::new();

        for cmd in &input.commands {
            self.apply_command(cmd, &mut events);
        }
        for frame in &input.tracking {
            self.on_tracking(frame.as_ref(), &mut events);
        }
        for tap in &input.taps {
            self.on_tap(*tap, &mut events);
        }
        self.tick(dt, &mut events);
        events
    }

    // ── commands ──────────────────────────────────────────────────────────

    fn apply_command(&mut self, cmd: &Command, events: &mut Vec<EngineEvent>) {
        match cmd {
            Command::ChooseCategory(category) => {
                if self.phase != Phase::Intro {
                    debug!(phase = %self.phase, "category ignored outside intro");
                    return;
                }
                self.session = Some(SelectionSession::new(*category, &self.cfg));
                info!(category = category.label(), cards = category.spread().count(), "category chosen");
                self.enter(Phase::CategoryChosen, events);
            }
            Command::SubmitQuestion(q) => {
                if self.phase != Phase::QuestionInput {
                    debug!(phase = %self.phase, "question ignored");
                    return;
                }
                if let Some(s) = self.session.as_mut() {
                    s.set_question(q);
                }
                self.enter(Phase::Focusing, events);
            }
            Command::SetInputMode(mode) => {
                if *mode != self.input_mode {
                    info!(?mode, "input mode changed");
                    self.input_mode = *mode;
                    self.last_sample = PoseSample::ABSENT;
                }
            }
            Command::DeliverReading { generation, reading } => {
                self.accept_reading(*generation, reading, events);
            }
            Command::Restart => self.reset(ResetReason::Restart, events),
        }
    }

    fn accept_reading(&mut self, generation: u64, reading: &Reading, events: &mut Vec<EngineEvent>) {
        let live = generation == self.generation
            && matches!(self.phase, Phase::Manifesting | Phase::Revealed);
        if !live {
            debug!(generation, current = self.generation, phase = %self.phase, "stale reading discarded");
            return;
        }
        let expected = self.session.as_ref().map_or(0, |s| s.picks().len());
        if reading.passages.len() != expected {
            warn!(got = reading.passages.len(), expected, "reading has wrong passage count, ignored");
            return;
        }
        // A service reading always wins; a fallback never replaces one.
        if reading.source == ReadingSource::Fallback
            && self.reading.as_ref().is_some_and(|r| r.source == ReadingSource::Service)
        {
            return;
        }
        info!(generation, source = ?reading.source, late = self.phase == Phase::Revealed, "reading applied");
        self.reading = Some(reading.clone());
        events.push(EngineEvent::ReadingApplied { generation, source: reading.source });
    }

    // ── tracking callbacks ────────────────────────────────────────────────

    fn on_tracking(&mut self, frame: Option<&HandFrame>, events: &mut Vec<EngineEvent>) {
        if self.input_mode == InputMode::Touch {
            return;
        }
        self.since_callback = 0.0;
        let sample = self.classifier.classify(frame);
        self.motion.on_sample(frame, &sample);
        self.last_sample = sample;
        if frame.is_some() {
            self.idle_time = 0.0;
        }

        if self.phase == Phase::Picking {
            let fired = self.session.as_mut().is_some_and(|s| s.grab.on_pose(sample.pose));
            if fired {
                self.pick_highlighted(events);
            }
        }
    }

    // ── taps ──────────────────────────────────────────────────────────────

    fn on_tap(&mut self, tap: Tap, events: &mut Vec<EngineEvent>) {
        self.idle_time = 0.0;
        match self.phase {
            Phase::Shuffling => {
                let full = self.session.as_mut().is_some_and(|s| s.energy.tap());
                if full {
                    self.energy_full(events);
                }
            }
            Phase::Picking => {
                if let Some(s) = self.session.as_mut() {
                    s.grab.discard_progress();
                }
                self.pick_highlighted(events);
            }
            Phase::Revealed => {
                let slot = match tap {
                    Tap::Slot(slot) => Some(slot),
                    // A bare tap turns over the next face-down card.
                    Tap::Screen => self.reveal.as_ref().and_then(|r| r.revealed().iter().position(|v| !*v)),
                };
                if let Some(slot) = slot {
                    self.reveal_slot(slot, events);
                }
            }
            _ => {}
        }
    }

    // ── animation tick ────────────────────────────────────────────────────

    fn tick(&mut self, dt: f32, events: &mut Vec<EngineEvent>) {
        // A silent tracker reports no hand.
        if self.input_mode == InputMode::Gesture {
            self.since_callback += dt;
            if self.since_callback >= self.cfg.motion.stale_after_secs {
                self.on_tracking(None, events);
            }
        }
        self.motion.tick(dt);
        self.phase_time += dt;
        if self.phase.is_interactive() {
            self.idle_time += dt;
        }

        if self.phase.shows_orbit() {
            let pointer = if self.input_mode == InputMode::Gesture { self.motion.signal().pointer_x } else { 0.0 };
            self.orbit.step(pointer, dt);
        }

        let t = self.cfg.timing.clone();
        match self.phase {
            Phase::CategoryChosen if self.phase_time >= t.category_chosen_secs => {
                self.enter(Phase::QuestionInput, events);
            }
            Phase::Focusing if self.phase_time >= t.focusing_secs => {
                self.enter(Phase::Shuffling, events);
            }
            Phase::Shuffling => {
                let speed = self.motion.signal().speed;
                let mode = self.input_mode;
                let full = self.session.as_mut().is_some_and(|s| match mode {
                    InputMode::Gesture => s.energy.charge(speed),
                    InputMode::Touch   => s.energy.auto_charge(),
                });
                if full {
                    self.energy_full(events);
                }
            }
            Phase::Transitioning if self.phase_time >= t.transitioning_secs => {
                self.enter(Phase::DeckReady, events);
            }
            Phase::DeckReady if self.phase_time >= t.deck_ready_secs => {
                self.enter(Phase::AutoSpreading, events);
            }
            Phase::AutoSpreading => {
                self.spread_progress = (self.spread_progress + t.spread_rate * dt).min(100.0);
                if self.spread_progress >= 100.0 {
                    self.enter(Phase::PickingGuide, events);
                }
            }
            Phase::PickingGuide if self.phase_time >= t.picking_guide_secs => {
                self.enter(Phase::Picking, events);
            }
            Phase::Manifesting if self.phase_time >= t.manifesting_secs => {
                if self.reading.is_none() {
                    if let Some(s) = &self.session {
                        info!("no reading yet, revealing with static narrative");
                        self.reading = Some(fallback_reading(&s.reading_request()));
                    }
                }
                self.enter(Phase::Revealed, events);
            }
            Phase::Revealed if self.input_mode == InputMode::Gesture => {
                if self.last_sample.pose == Pose::Hovering {
                    let pointer = self.motion.signal().pointer_x;
                    let newly = self.reveal.as_mut().map(|r| r.sweep(pointer)).unwrap_or_default();
                    for slot in newly {
                        self.revealed_event(slot, events);
                    }
                } else if let Some(r) = self.reveal.as_mut() {
                    r.lift();
                }
            }
            _ => {}
        }

        if let Some(limit) = self.cfg.timing.idle_abort_secs {
            if self.phase.is_interactive() && self.idle_time >= limit {
                warn!(phase = %self.phase, idle_secs = self.idle_time, "no input, aborting session");
                self.reset(ResetReason::IdleTimeout, events);
            }
        }
    }

    // ── transitions ───────────────────────────────────────────────────────

    fn enter(&mut self, to: Phase, events: &mut Vec<EngineEvent>) {
        let from = self.phase;
        if from == to { return; }
        self.phase = to;
        self.phase_time = 0.0;
        info!(%from, %to, "phase");
        events.push(EngineEvent::PhaseChanged { from, to });

        match to {
            Phase::Shuffling | Phase::Picking => self.idle_time = 0.0,
            Phase::Transitioning => self.spread_progress = 0.0,
            Phase::Revealed => {
                if let Some(s) = &self.session {
                    self.reveal = Some(RevealSweep::new(s.spread(), &self.cfg.reveal));
                }
            }
            _ => {}
        }
    }

    fn energy_full(&mut self, events: &mut Vec<EngineEvent>) {
        info!("shuffle energy full");
        events.push(EngineEvent::EnergyFull);
        self.enter(Phase::Transitioning, events);
    }

    fn pick_highlighted(&mut self, events: &mut Vec<EngineEvent>) {
        if self.phase != Phase::Picking { return; }
        let Some(index) = self.orbit.highlighted() else {
            warn!("grab completed with no card in reach");
            return;
        };
        let Some(session) = self.session.as_mut() else { return };

        let orientation = Orientation::flip(&mut self.rng);
        match session.select(index, orientation) {
            Ok(slot) => {
                self.orbit.retire(index);
                info!(index, slot, orientation = orientation.label(), "card selected");
                events.push(EngineEvent::CardSelected { index, orientation, slot });
            }
            Err(e) => {
                warn!(error = %e, "selection refused");
                return;
            }
        }

        if session.is_complete() {
            session.grab.reset();
            let request = session.reading_request();
            self.enter(Phase::Manifesting, events);
            events.push(EngineEvent::ReadingRequested { generation: self.generation, request });
        }
    }

    fn reveal_slot(&mut self, slot: usize, events: &mut Vec<EngineEvent>) {
        if self.reveal.as_mut().is_some_and(|r| r.reveal(slot)) {
            self.revealed_event(slot, events);
        }
    }

    fn revealed_event(&self, slot: usize, events: &mut Vec<EngineEvent>) {
        if let Some(p) = self.session.as_ref().and_then(|s| s.picks().get(slot)) {
            debug!(slot, index = p.index, "card revealed");
            events.push(EngineEvent::CardRevealed { slot, index: p.index });
        }
    }

    /// Tear the session down. Every sub-component returns to its initial
    /// state; the generation bump orphans any reading still in flight.
    fn reset(&mut self, reason: ResetReason, events: &mut Vec<EngineEvent>) {
        info!(?reason, generation = self.generation, "session reset");
        self.session = None;
        self.reveal = None;
        self.reading = None;
        self.motion.reset();
        self.orbit.reset();
        self.spread_progress = 0.0;
        self.idle_time = 0.0;
        self.since_callback = 0.0;
        self.last_sample = PoseSample::ABSENT;
        self.generation += 1;
        events.push(EngineEvent::SessionReset { reason });
        self.enter(Phase::Intro, events);
    }

    // ── renderer view ─────────────────────────────────────────────────────

    pub fn snapshot(&self) -> FrameSnapshot {
        let spread = match &self.session {
            Some(s) => {
                let sp = s.spread();
                let slots = sp.slots();
                s.picks().iter().enumerate().map(|(slot, p)| SpreadSlotView {
                    slot,
                    index:       p.index,
                    name:        tarot_deck::Card::at(p.index).map(|c| c.name).unwrap_or_default(),
                    label:       sp.position_label(slot),
                    orientation: p.orientation,
                    position:    slots.get(slot).copied().unwrap_or_default(),
                    revealed:    self.reveal.as_ref().is_some_and(|r| r.is_revealed(slot)),
                    passage:     self.reading.as_ref().and_then(|r| r.passages.get(slot).cloned()),
                }).collect()
            }
            None => Vec::new(),
        };

        FrameSnapshot {
            phase:           self.phase,
            input_mode:      self.input_mode,
            generation:      self.generation,
            category:        self.session.as_ref().map(|s| s.category()),
            energy:          self.energy(),
            grab_progress:   self.grab_progress(),
            cooldown:        self.session.as_ref().is_some_and(|s| s.grab.cooldown_active()),
            spread_progress: self.spread_progress,
            pose:            self.last_sample.pose,
            pointer:         (self.last_sample.pointer_x, self.last_sample.pointer_y),
            highlighted:     if self.phase.shows_orbit() { self.orbit.highlighted() } else { None },
            cards:           if self.phase.shows_orbit() { self.orbit.transforms() } else { Vec::new() },
            spread,
        }
    }
}

/// Energy as a `[0, 1]` fraction.
pub fn energy_fraction(energy: f32) -> f32 { (energy / ENERGY_MAX).clamp(0.0, 1.0) }

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use tarot_deck::DECK_SIZE;

    const DT: f32 = 1.0 / 60.0;

    fn engine() -> EngineState {
        EngineState::new(EngineConfig::default(), 7)
    }

    fn step(s: &mut EngineState, input: FrameInput) -> Vec<EngineEvent> {
        s.step(&input, DT)
    }

    fn idle(s: &mut EngineState, secs: f32) -> Vec<EngineEvent> {
        let mut all = Vec::new();
        let n = (secs / DT).ceil() as usize;
        for _ in 0..n {
            all.extend(step(s, FrameInput::default()));
        }
        all
    }

    fn phase_changes(events: &[EngineEvent]) -> Vec<Phase> {
        events.iter().filter_map(|e| match e {
            EngineEvent::PhaseChanged { to, .. } => Some(*to),
            _ => None,
        }).collect()
    }

    /// Drive a fresh engine up to `Shuffling`.
    fn to_shuffling(s: &mut EngineState, category: Category) {
        step(s, FrameInput::command(Command::ChooseCategory(category)));
        idle(s, 1.0);
        assert_eq!(s.phase(), Phase::QuestionInput);
        step(s, FrameInput::command(Command::SubmitQuestion("What should I know?".into())));
        idle(s, 3.1);
        assert_eq!(s.phase(), Phase::Shuffling);
    }

    /// Drive a fresh engine up to `Picking` using taps to shuffle.
    fn to_picking(s: &mut EngineState, category: Category) {
        to_shuffling(s, category);
        for _ in 0..13 {
            step(s, FrameInput::tap(Tap::Screen));
        }
        assert_eq!(s.phase(), Phase::Transitioning);
        idle(s, 2.1);
        assert_eq!(s.phase(), Phase::DeckReady);
        idle(s, 1.1);
        idle(s, 2.0);
        assert_eq!(s.phase(), Phase::PickingGuide);
        idle(s, 2.6);
        assert_eq!(s.phase(), Phase::Picking);
    }

    fn fist() -> Option<HandFrame> { Some(HandFrame::fist(0.5, 0.5)) }

    #[test]
    fn timed_phases_follow_in_order() {
        let mut s = engine();
        let mut seen = phase_changes(&step(&mut s, FrameInput::command(Command::ChooseCategory(Category::Daily))));
        seen.extend(phase_changes(&idle(&mut s, 1.0)));
        seen.extend(phase_changes(&step(&mut s, FrameInput::command(Command::SubmitQuestion("q".into())))));
        seen.extend(phase_changes(&idle(&mut s, 3.1)));
        assert_eq!(seen, [Phase::CategoryChosen, Phase::QuestionInput, Phase::Focusing, Phase::Shuffling]);
    }

    #[test]
    fn focusing_is_wall_clock_not_frame_count() {
        let mut s = engine();
        step(&mut s, FrameInput::command(Command::ChooseCategory(Category::Daily)));
        idle(&mut s, 1.0);
        step(&mut s, FrameInput::command(Command::SubmitQuestion("q".into())));
        // Two coarse ticks of 1.6 s pass the 3 s focus timer just as 190 fine ticks do.
        s.step(&FrameInput::default(), 1.6);
        assert_eq!(s.phase(), Phase::Focusing);
        s.step(&FrameInput::default(), 1.6);
        assert_eq!(s.phase(), Phase::Shuffling);
    }

    #[test]
    fn energy_crosses_once_and_transitions() {
        let mut s = engine();
        to_shuffling(&mut s, Category::Daily);

        // Wave the hand side to side; the wrist moves 0.02 per callback.
        let mut energy_full = 0;
        let mut last_energy = 0.0;
        for i in 0..600 {
            let x = if i % 2 == 0 { 0.49 } else { 0.51 };
            let events = step(&mut s, FrameInput::frames([Some(HandFrame::open(x, 0.5))]));
            energy_full += events.iter().filter(|e| **e == EngineEvent::EnergyFull).count();
            if s.phase() == Phase::Shuffling {
                assert!(s.energy() >= last_energy);
                last_energy = s.energy();
            }
        }
        assert_eq!(energy_full, 1);
        assert!(s.phase() > Phase::Shuffling);
        assert_eq!(s.energy(), ENERGY_MAX);
    }

    #[test]
    fn transition_lands_on_the_crossing_tick() {
        // Instant smoothing: each tick charges exactly 50 × 0.06 = 3.
        let cfg = EngineConfig {
            motion: crate::config::MotionConfig { smoothing_rate: 1000.0, speed_gain: 2500.0, ..Default::default() },
            ..Default::default()
        };
        let mut s = EngineState::new(cfg, 7);
        to_shuffling(&mut s, Category::Daily);
        step(&mut s, FrameInput::frames([Some(HandFrame::open(0.49, 0.5))]));
        assert_eq!(s.energy(), 0.0);

        for k in 1..=34 {
            let x = if k % 2 == 1 { 0.51 } else { 0.49 };
            let events = step(&mut s, FrameInput::frames([Some(HandFrame::open(x, 0.5))]));
            let transitioned = phase_changes(&events).contains(&Phase::Transitioning);
            if k < 34 {
                assert!(!transitioned, "transitioned early on tick {}", k);
                assert_eq!(s.phase(), Phase::Shuffling);
            } else {
                assert!(transitioned);
                assert!(events.contains(&EngineEvent::EnergyFull));
            }
        }
    }

    #[test]
    fn silent_tracker_stops_charging() {
        let mut s = engine();
        to_shuffling(&mut s, Category::Daily);
        for i in 0..4 {
            let x = if i % 2 == 0 { 0.49 } else { 0.51 };
            step(&mut s, FrameInput::frames([Some(HandFrame::open(x, 0.5))]));
        }
        // The tracker goes quiet without ever reporting the hand gone.
        idle(&mut s, 10.0);
        assert_eq!(s.phase(), Phase::Shuffling);
        assert!(s.energy() < ENERGY_MAX);
        assert!(s.motion().signal().speed < 1e-3);

        let settled = s.energy();
        idle(&mut s, 10.0);
        assert!((s.energy() - settled).abs() < 1e-3);
        assert_eq!(s.phase(), Phase::Shuffling);
    }

    #[test]
    fn still_hand_never_charges() {
        let mut s = engine();
        to_shuffling(&mut s, Category::Daily);
        for _ in 0..600 {
            step(&mut s, FrameInput::frames([Some(HandFrame::open(0.5, 0.5))]));
        }
        assert_eq!(s.phase(), Phase::Shuffling);
        assert_eq!(s.energy(), 0.0);
    }

    #[test]
    fn touch_mode_shuffles_itself() {
        let mut s = engine();
        step(&mut s, FrameInput::command(Command::SetInputMode(InputMode::Touch)));
        to_shuffling(&mut s, Category::Daily);
        let events = idle(&mut s, 10.0);
        assert!(events.contains(&EngineEvent::EnergyFull));
    }

    #[test]
    fn grab_threshold_selects_highlighted_card() {
        let mut s = engine();
        to_picking(&mut s, Category::Career);
        // 44 callbacks, one per tick: nothing yet.
        for _ in 0..44 {
            let ev = step(&mut s, FrameInput::frames([fist()]));
            assert!(!ev.iter().any(|e| matches!(e, EngineEvent::CardSelected { .. })));
        }
        // The highlight may drift while the hand is held; the pick is
        // whatever is highlighted when the hold completes.
        let target_now = s.orbit().highlighted().unwrap();
        let ev = s.step(&FrameInput::frames([fist()]), 0.0);
        let picked: Vec<usize> = ev.iter().filter_map(|e| match e {
            EngineEvent::CardSelected { index, .. } => Some(*index),
            _ => None,
        }).collect();
        assert_eq!(picked, [target_now]);

        let sess = s.session().unwrap();
        assert_eq!(sess.picks().len(), 1);
        assert_eq!(s.grab_progress(), 0.0);
        assert!(sess.grab.cooldown_active());
        assert!(!s.orbit().is_active(target_now));
        assert_eq!(s.phase(), Phase::Picking);
    }

    #[test]
    fn held_fist_fires_once() {
        let mut s = engine();
        to_picking(&mut s, Category::Career);
        let mut n = 0;
        for _ in 0..300 {
            n += step(&mut s, FrameInput::frames([fist()])).iter()
                .filter(|e| matches!(e, EngineEvent::CardSelected { .. })).count();
        }
        assert_eq!(n, 1);
    }

    #[test]
    fn grab_counts_callbacks_not_ticks() {
        let mut s = engine();
        to_picking(&mut s, Category::Career);
        // All 45 callbacks arrive in one tick.
        let ev = step(&mut s, FrameInput::frames(std::iter::repeat(fist()).take(45)));
        assert_eq!(ev.iter().filter(|e| matches!(e, EngineEvent::CardSelected { .. })).count(), 1);
        // 44 callbacks spread across 200 ticks never fire.
        let mut s = engine();
        to_picking(&mut s, Category::Career);
        for i in 0..200 {
            let input = if i < 44 { FrameInput::frames([fist()]) } else { FrameInput::default() };
            let ev = step(&mut s, input);
            assert!(!ev.iter().any(|e| matches!(e, EngineEvent::CardSelected { .. })));
        }
    }

    #[test]
    fn absent_hand_in_picking_decays_and_stays() {
        let mut s = engine();
        to_picking(&mut s, Category::Career);
        for _ in 0..30 { step(&mut s, FrameInput::frames([fist()])); }
        assert!(s.grab_progress() > 0.0);
        for _ in 0..120 {
            let ev = step(&mut s, FrameInput::frames([None]));
            assert!(!ev.iter().any(|e| matches!(e, EngineEvent::CardSelected { .. })));
        }
        assert_eq!(s.grab_progress(), 0.0);
        assert_eq!(s.phase(), Phase::Picking);
    }

    #[test]
    fn silent_tracker_releases_a_held_fist() {
        let mut s = engine();
        to_picking(&mut s, Category::Career);
        for _ in 0..30 { step(&mut s, FrameInput::frames([fist()])); }
        assert!(s.grab_progress() > 0.0);
        assert_eq!(s.last_sample().pose, Pose::Grabbing);

        let events = idle(&mut s, 10.0);
        assert!(!events.iter().any(|e| matches!(e, EngineEvent::CardSelected { .. })));
        assert_eq!(s.grab_progress(), 0.0);
        assert_eq!(s.last_sample().pose, Pose::None);
        assert_eq!(s.phase(), Phase::Picking);
    }

    #[test]
    fn slow_tracker_is_not_stale() {
        let mut s = engine();
        to_picking(&mut s, Category::Career);
        // One callback every third tick is well inside the staleness window.
        let mut picked = 0;
        for i in 0..45 * 3 {
            let input = if i % 3 == 0 { FrameInput::frames([fist()]) } else { FrameInput::default() };
            picked += step(&mut s, input).iter()
                .filter(|e| matches!(e, EngineEvent::CardSelected { .. })).count();
        }
        assert_eq!(picked, 1);
    }

    #[test]
    fn full_spread_moves_to_manifesting_and_requests_reading() {
        let mut s = engine();
        to_picking(&mut s, Category::Career);
        let mut events = Vec::new();
        for _ in 0..3 {
            for _ in 0..45 { events.extend(step(&mut s, FrameInput::frames([fist()]))); }
            events.extend(step(&mut s, FrameInput::frames([Some(HandFrame::open(0.5, 0.5))])));
        }
        assert_eq!(s.phase(), Phase::Manifesting);
        let picked: Vec<usize> = events.iter().filter_map(|e| match e {
            EngineEvent::CardSelected { index, .. } => Some(*index),
            _ => None,
        }).collect();
        assert_eq!(picked.len(), 3);
        let mut dedup = picked.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), 3);

        let req = events.iter().find_map(|e| match e {
            EngineEvent::ReadingRequested { request, generation } => Some((request.clone(), *generation)),
            _ => None,
        }).unwrap();
        assert_eq!(req.1, s.generation());
        assert_eq!(req.0.cards.len(), 3);
        assert_eq!(req.0.question, "What should I know?");
        assert_eq!(s.grab_progress(), 0.0);
        assert!(!s.session().unwrap().grab.cooldown_active());

        // Further grabs are ignored.
        for _ in 0..100 { step(&mut s, FrameInput::frames([fist()])); }
        assert_eq!(s.session().unwrap().picks().len(), 3);
    }

    #[test]
    fn taps_pick_in_touch_mode() {
        let mut s = engine();
        step(&mut s, FrameInput::command(Command::SetInputMode(InputMode::Touch)));
        to_picking(&mut s, Category::Love);
        for _ in 0..10 {
            step(&mut s, FrameInput::tap(Tap::Screen));
        }
        let sess = s.session().unwrap();
        assert_eq!(sess.picks().len(), 4);
        assert_eq!(s.phase(), Phase::Manifesting);
        assert_eq!(s.orbit().active_count(), DECK_SIZE - 4);
    }

    #[test]
    fn unresolved_reading_reveals_with_fallback() {
        let mut s = engine();
        to_picking(&mut s, Category::Daily);
        step(&mut s, FrameInput::tap(Tap::Screen));
        assert_eq!(s.phase(), Phase::Manifesting);
        idle(&mut s, 3.1);
        assert_eq!(s.phase(), Phase::Revealed);
        let r = s.reading().unwrap();
        assert_eq!(r.source, ReadingSource::Fallback);
        assert_eq!(r.passages.len(), 1);
        let snap = s.snapshot();
        assert!(snap.spread.iter().all(|v| v.passage.is_some()));
    }

    #[test]
    fn late_reading_replaces_fallback_for_same_generation_only() {
        let mut s = engine();
        to_picking(&mut s, Category::Daily);
        let ev = step(&mut s, FrameInput::tap(Tap::Screen));
        let generation = ev.iter().find_map(|e| match e {
            EngineEvent::ReadingRequested { generation, .. } => Some(*generation),
            _ => None,
        }).unwrap();
        idle(&mut s, 3.1);

        let stale = Reading { passages: vec!["old".into()], source: ReadingSource::Service };
        let ev = step(&mut s, FrameInput::command(Command::DeliverReading { generation: generation + 1, reading: stale }));
        assert!(ev.is_empty());
        assert_eq!(s.reading().unwrap().source, ReadingSource::Fallback);

        let fresh = Reading { passages: vec!["The road opens.".into()], source: ReadingSource::Service };
        let ev = step(&mut s, FrameInput::command(Command::DeliverReading { generation, reading: fresh }));
        assert!(ev.contains(&EngineEvent::ReadingApplied { generation, source: ReadingSource::Service }));
        assert_eq!(s.snapshot().spread[0].passage.as_deref(), Some("The road opens."));
    }

    #[test]
    fn reading_after_restart_is_discarded() {
        let mut s = engine();
        to_picking(&mut s, Category::Daily);
        let ev = step(&mut s, FrameInput::tap(Tap::Screen));
        let generation = ev.iter().find_map(|e| match e {
            EngineEvent::ReadingRequested { generation, .. } => Some(*generation),
            _ => None,
        }).unwrap();
        step(&mut s, FrameInput::command(Command::Restart));
        let r = Reading { passages: vec!["x".into()], source: ReadingSource::Service };
        step(&mut s, FrameInput::command(Command::DeliverReading { generation, reading: r }));
        assert!(s.reading().is_none());
    }

    #[test]
    fn open_hand_sweep_reveals_monotonically() {
        let mut s = engine();
        to_picking(&mut s, Category::Career);
        for _ in 0..3 { step(&mut s, FrameInput::tap(Tap::Screen)); }
        idle(&mut s, 3.1);
        assert_eq!(s.phase(), Phase::Revealed);

        // Park a fist on the left so the smoothed pointer settles there
        // without sweeping.
        for _ in 0..120 {
            assert!(step(&mut s, FrameInput::frames([Some(HandFrame::fist(0.1, 0.5))])).is_empty());
        }

        let mut revealed = Vec::new();
        for i in 0..=180 {
            // Open hand travels to the right edge and rests there.
            let x = (0.1 + 0.8 * i as f32 / 120.0).min(0.9);
            for e in step(&mut s, FrameInput::frames([Some(HandFrame::open(x, 0.5))])) {
                if let EngineEvent::CardRevealed { slot, .. } = e { revealed.push(slot); }
            }
        }
        assert_eq!(revealed, [0, 1, 2]);
        // A fist never hides anything.
        for _ in 0..30 { step(&mut s, FrameInput::frames([fist()])); }
        assert!(s.reveal().unwrap().all_revealed());
    }

    #[test]
    fn tap_reveals_specific_slot() {
        let mut s = engine();
        to_picking(&mut s, Category::Love);
        for _ in 0..4 { step(&mut s, FrameInput::tap(Tap::Screen)); }
        idle(&mut s, 3.1);
        let ev = step(&mut s, FrameInput::tap(Tap::Slot(2)));
        let index = s.session().unwrap().picks()[2].index;
        assert_eq!(ev, vec![EngineEvent::CardRevealed { slot: 2, index }]);
        assert!(step(&mut s, FrameInput::tap(Tap::Slot(2))).is_empty());
    }

    #[test]
    fn restart_zeroes_everything() {
        let mut s = engine();
        to_picking(&mut s, Category::Career);
        for _ in 0..45 { step(&mut s, FrameInput::frames([fist()])); }
        for _ in 0..20 { step(&mut s, FrameInput::frames([fist()])); }
        let gen_before = s.generation();

        let ev = step(&mut s, FrameInput::command(Command::Restart));
        assert!(ev.contains(&EngineEvent::SessionReset { reason: ResetReason::Restart }));
        assert_eq!(s.phase(), Phase::Intro);
        assert!(s.session().is_none());
        assert_eq!(s.energy(), 0.0);
        assert_eq!(s.grab_progress(), 0.0);
        assert_eq!(s.orbit().active_count(), DECK_SIZE);
        assert_eq!(s.motion().signal().speed, 0.0);
        assert_eq!(s.generation(), gen_before + 1);
        let snap = s.snapshot();
        assert!(snap.spread.is_empty());
        assert!(!snap.cooldown);

        // The next session starts from scratch.
        to_shuffling(&mut s, Category::Daily);
        assert_eq!(s.energy(), 0.0);
    }

    #[test]
    fn restart_and_callback_in_same_batch_apply_to_new_session() {
        let mut s = engine();
        to_picking(&mut s, Category::Career);
        let input = FrameInput {
            commands: vec![Command::Restart],
            tracking: std::iter::repeat(fist()).take(45).collect(),
            taps:     Vec::new(),
        };
        let ev = s.step(&input, DT);
        assert!(!ev.iter().any(|e| matches!(e, EngineEvent::CardSelected { .. })));
        assert_eq!(s.phase(), Phase::Intro);
        assert_eq!(s.grab_progress(), 0.0);
    }

    #[test]
    fn idle_timeout_aborts_interactive_phase() {
        let cfg = EngineConfig {
            timing: crate::config::TimingConfig { idle_abort_secs: Some(5.0), ..Default::default() },
            ..Default::default()
        };
        let mut s = EngineState::new(cfg, 1);
        to_shuffling(&mut s, Category::Daily);
        let ev = idle(&mut s, 5.1);
        assert!(ev.contains(&EngineEvent::SessionReset { reason: ResetReason::IdleTimeout }));
        assert_eq!(s.phase(), Phase::Intro);
    }

    #[test]
    fn same_seed_same_orientations() {
        let run = |seed| {
            let mut s = EngineState::new(EngineConfig::default(), seed);
            to_picking(&mut s, Category::Love);
            for _ in 0..4 { step(&mut s, FrameInput::tap(Tap::Screen)); }
            s.session().unwrap().picks().to_vec()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn simulate_is_a_pure_step() {
        let s = engine();
        let (s, ev) = simulate(s, &FrameInput::command(Command::ChooseCategory(Category::Love)), DT);
        assert_eq!(s.phase(), Phase::CategoryChosen);
        assert_eq!(ev, vec![EngineEvent::PhaseChanged { from: Phase::Intro, to: Phase::CategoryChosen }]);
        assert_eq!(s.session().unwrap().target_count(), 4);
    }

    #[test]
    fn snapshot_hides_orbit_outside_deck_phases() {
        let mut s = engine();
        assert!(s.snapshot().cards.is_empty());
        to_picking(&mut s, Category::Daily);
        let snap = s.snapshot();
        assert_eq!(snap.cards.len(), DECK_SIZE);
        assert_eq!(snap.cards.iter().filter(|c| c.highlighted).count(), 1);
        assert_eq!(snap.highlighted, s.orbit().highlighted());
    }

    #[test]
    fn energy_fraction_clamps() {
        assert_eq!(energy_fraction(50.0), 0.5);
        assert_eq!(energy_fraction(250.0), 1.0);
    }
}
