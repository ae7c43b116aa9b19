//! Top-level application loop.
//!
//! `App` owns the phase machine, the reading worker and the tracking handle.
//! Each frame it drains tracking frames and finished readings into the
//! machine, ticks it, and forwards reading requests to the worker. `run`
//! wraps it in the visualizer window.

use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use tarot_deck::{Card, Category};
use tarot_reading::{ReadingService, ReadingSource};

use crate::config::EngineConfig;
use crate::engine::{EngineEvent, FrameSnapshot, ResetReason};
use crate::input::InputMode;
use crate::machine::SelectionPhaseMachine;
use crate::phase::Phase;
use crate::reading_task::{select_service, ReadingWorker};
use crate::tracking::{InitOutcome, SimHand, TrackingHandle};
use crate::visualizer::{UiAction, Visualizer};

/// Question used by `--quick` when none is given.
pub const QUICK_QUESTION: &str = "What do I need to know today?";

/// Longest frame step fed to the engine; a stalled window must not skip
/// whole phases.
const MAX_DT: f32 = 0.1;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
pub struct AppConfig {
    pub engine:           EngineConfig,
    /// Skip hand tracking and start in touch mode.
    pub touch:            bool,
    pub seed:             u64,
    /// Choose the daily category and submit the question automatically.
    pub quick:            bool,
    pub question:         String,
    /// Never call the reading service.
    pub offline:          bool,
    pub tracking_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            engine:           EngineConfig::default(),
            touch:            false,
            seed:             0,
            quick:            false,
            question:         String::new(),
            offline:          false,
            tracking_timeout: Duration::from_secs(5),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// App
// ════════════════════════════════════════════════════════════════════════════

pub struct App {
    machine:  SelectionPhaseMachine,
    worker:   ReadingWorker,
    tracking: Option<TrackingHandle>,
    question: String,
    quick:    bool,
    pub status: String,
}

impl App {
    /// Without a tracking handle the session runs in touch mode.
    pub fn new(cfg: AppConfig, service: Box<dyn ReadingService>, tracking: Option<TrackingHandle>) -> Self {
        let mut machine = SelectionPhaseMachine::new(cfg.engine, cfg.seed);
        let status = match &tracking {
            Some(t) => format!("Hand tracking: {}", t.name()),
            None => {
                machine.set_input_mode(InputMode::Touch);
                "Touch mode: click or press T to tap".to_string()
            }
        };
        let question = if cfg.quick && cfg.question.is_empty() { QUICK_QUESTION.to_string() } else { cfg.question };
        if cfg.quick {
            machine.confirm_category(Category::Daily);
        }

        App {
            machine,
            worker: ReadingWorker::spawn(service),
            tracking,
            question,
            quick: cfg.quick,
            status,
        }
    }

    /// Apply one window action. Returns false on quit.
    pub fn handle_action(&mut self, action: UiAction) -> bool {
        match action {
            UiAction::Choose(c)       => self.machine.confirm_category(c),
            UiAction::SubmitQuestion  => self.machine.submit_question(self.question.clone()),
            UiAction::Restart         => self.machine.restart(),
            UiAction::Tap(t)          => self.machine.on_tap(t),
            UiAction::ToggleInputMode => self.toggle_input_mode(),
            UiAction::Quit            => return false,
        }
        true
    }

    fn toggle_input_mode(&mut self) {
        if self.tracking.is_none() {
            self.status = "No hand tracking, staying in touch mode".to_string();
            return;
        }
        let next = match self.machine.state().input_mode() {
            InputMode::Gesture => InputMode::Touch,
            InputMode::Touch   => InputMode::Gesture,
        };
        self.machine.set_input_mode(next);
    }

    /// One animation frame.
    pub fn frame(&mut self, dt: f32) -> Vec<EngineEvent> {
        if let Some(t) = &self.tracking {
            for f in t.drain() { self.machine.on_tracking(f); }
        }
        for r in self.worker.drain_results() {
            self.machine.deliver_reading(r.generation, r.reading);
        }

        let events = self.machine.tick(dt.min(MAX_DT));
        for e in &events { self.on_event(e); }
        events
    }

    fn on_event(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::PhaseChanged { to: Phase::QuestionInput, .. } if self.quick => {
                self.machine.submit_question(self.question.clone());
            }
            // Reset status already set by SessionReset.
            EngineEvent::PhaseChanged { to: Phase::Intro, .. } => {}
            EngineEvent::PhaseChanged { to, .. } => {
                self.status = to.hint(self.machine.state().input_mode()).to_string();
            }
            EngineEvent::EnergyFull => self.status = "The deck is charged".to_string(),
            EngineEvent::CardSelected { index, orientation, slot } => {
                let name = Card::at(*index).map(|c| c.name).unwrap_or_default();
                self.status = format!("Card {}: {} ({})", slot + 1, name, orientation.label());
            }
            EngineEvent::ReadingRequested { generation, request } => {
                self.worker.request(*generation, request.clone());
            }
            EngineEvent::ReadingApplied { source, .. } => {
                self.status = match source {
                    ReadingSource::Service  => "The reading has arrived".to_string(),
                    ReadingSource::Fallback => "Reading from the card meanings".to_string(),
                };
            }
            EngineEvent::CardRevealed { .. } => {}
            EngineEvent::SessionReset { reason } => {
                self.status = match reason {
                    ResetReason::Restart     => "Choose a category (1-3)".to_string(),
                    ResetReason::IdleTimeout => "Session ended after inactivity".to_string(),
                };
            }
        }
    }

    pub fn snapshot(&self) -> FrameSnapshot { self.machine.snapshot() }
    pub fn question(&self) -> &str { &self.question }
    pub fn machine(&self) -> &SelectionPhaseMachine { &self.machine }
}

// ════════════════════════════════════════════════════════════════════════════
// run
// ════════════════════════════════════════════════════════════════════════════

pub fn run(cfg: AppConfig) -> Result<(), String> {
    // ── Sim hand channel (window → simulated tracker) ─────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimHand>();
    let tracking = if cfg.touch { None } else { start_tracking(sim_rx, cfg.tracking_timeout) };

    let service = select_service(cfg.offline);
    let mut vis = Visualizer::new(sim_tx)?;
    let mut app = App::new(cfg, service, tracking);

    // ── Main loop ─────────────────────────────────────────────────────────
    let mut last = Instant::now();
    while vis.is_open() {
        for action in vis.poll_input() {
            if !app.handle_action(action) {
                info!("quit");
                return Ok(());
            }
        }

        let now = Instant::now();
        app.frame((now - last).as_secs_f32());
        last = now;

        let snap = app.snapshot();
        vis.render(&snap, app.question(), &app.status);
    }
    Ok(())
}

/// Start the hand tracker, or `None` when it cannot be opened in time.
fn start_tracking(sim_rx: Receiver<SimHand>, timeout: Duration) -> Option<TrackingHandle> {
    #[cfg(feature = "leap")]
    let outcome = {
        drop(sim_rx);
        TrackingHandle::start(crate::tracking::LeapTrackingSource, timeout)
    };
    #[cfg(not(feature = "leap"))]
    let outcome = TrackingHandle::start(crate::tracking::SimTrackingSource::new(sim_rx), timeout);

    match outcome {
        InitOutcome::Ready(h) => Some(h),
        InitOutcome::Failed(e) => {
            warn!(error = %e, "hand tracking unavailable, falling back to touch");
            None
        }
        InitOutcome::TimedOut => {
            warn!(?timeout, "hand tracking did not start, falling back to touch");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Tap;
    use crate::landmarks::HandFrame;
    use crate::tracking::ReplayTrackingSource;
    use tarot_reading::OfflineReadingService;

    const DT: f32 = 1.0 / 60.0;

    fn quick_touch_app() -> App {
        let cfg = AppConfig { quick: true, seed: 11, ..AppConfig::default() };
        App::new(cfg, Box::new(OfflineReadingService), None)
    }

    #[test]
    fn quick_touch_session_reaches_revealed_cards() {
        let mut app = quick_touch_app();
        assert_eq!(app.question(), QUICK_QUESTION);

        let mut revealed_all = false;
        for _ in 0..3000 {
            app.handle_action(UiAction::Tap(Tap::Screen));
            app.frame(DT);
            let snap = app.snapshot();
            if snap.phase == Phase::Revealed && !snap.spread.is_empty() && snap.spread.iter().all(|v| v.revealed) {
                revealed_all = true;
                break;
            }
        }
        assert!(revealed_all);
        let snap = app.snapshot();
        assert_eq!(snap.category, Some(Category::Daily));
        assert_eq!(snap.spread.len(), 1);
        assert!(snap.spread[0].passage.is_some());
    }

    #[test]
    fn quit_and_touch_only_toggle() {
        let mut app = quick_touch_app();
        app.handle_action(UiAction::ToggleInputMode);
        app.frame(DT);
        assert_eq!(app.machine().state().input_mode(), InputMode::Touch);
        assert!(!app.handle_action(UiAction::Quit));
    }

    #[test]
    fn toggle_switches_modes_when_tracking_runs() {
        let frames = vec![Some(HandFrame::open(0.5, 0.5)); 4];
        let handle = match TrackingHandle::start(ReplayTrackingSource::new(frames, Duration::ZERO), Duration::from_secs(1)) {
            InitOutcome::Ready(h) => h,
            other => panic!("replay failed to start: {:?}", other),
        };
        let cfg = AppConfig { seed: 1, ..AppConfig::default() };
        let mut app = App::new(cfg, Box::new(OfflineReadingService), Some(handle));
        assert_eq!(app.machine().state().input_mode(), InputMode::Gesture);

        std::thread::sleep(Duration::from_millis(50));
        app.handle_action(UiAction::ToggleInputMode);
        app.frame(DT);
        assert_eq!(app.machine().state().input_mode(), InputMode::Touch);
    }

    #[test]
    fn restart_sets_status() {
        let mut app = quick_touch_app();
        app.frame(DT);
        app.handle_action(UiAction::Restart);
        app.frame(DT);
        assert_eq!(app.snapshot().phase, Phase::Intro);
        assert_eq!(app.status, "Choose a category (1-3)");
    }
}
