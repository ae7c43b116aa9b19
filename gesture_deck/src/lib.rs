//! # gesture_deck
//!
//! Hand-gesture controlled selection of tarot cards. A tracking source
//! delivers 21-landmark hand frames; the engine classifies poses, smooths
//! motion into an energy charge, spins a 78-card orbit, selects cards with a
//! debounced grab-hold and walks the session through its phases.
//!
//! ## Gesture → Action mapping
//!
//! | Phase | Gesture | Action |
//! |---|---|---|
//! | Shuffling | Wave (any pose) | Charge energy; full charge opens the deck |
//! | Picking | Open hand, move left/right | Steer the orbit; the card facing the viewer is highlighted |
//! | Picking | Close fist and hold (~0.75 s) | Draw the highlighted card |
//! | Revealed | Open hand sweep | Flip every card the hand passes over |
//!
//! In touch mode a tap replaces each gesture: it adds charge while
//! shuffling, draws the highlighted card while picking and flips the next
//! card once revealed.
//!
//! ## Architecture
//!
//! ```text
//! TrackingSource ──► TrackingHandle ──┐
//!                                     ├─► SelectionPhaseMachine ──► FrameSnapshot ──► Visualizer
//! ReadingWorker  ──► ReadingResult ───┘          │
//!       ▲                                        │
//!       └────────────── ReadingRequested ────────┘
//! ```
//!
//! The engine itself ([`engine::simulate`]) is a pure step over
//! `(state, input, dt)`; threads and windows live only in the adapters.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: the mouse stands in for the hand.
//! * `leap` — **Hardware mode**: polls a LeapMotion controller via LeapC.
//!
//! ### Simulation controls
//!
//! | Input | Effect |
//! |---|---|
//! | Mouse | Hand position |
//! | `Space` held | Fist |
//! | `V` held | Two fingers (neither pose) |
//! | `H` | Hand enters / leaves the camera |
//! | Click / `T` | Tap (on a slot: reveal that card) |
//! | `1` `2` `3` | Daily / Love / Career |
//! | `Enter` | Submit the question |
//! | `M` | Toggle gesture / touch mode |
//! | `R` | Restart |
//! | `Q` | Quit |

pub mod config;
pub mod error;
pub mod landmarks;
pub mod pose;
pub mod motion;
pub mod energy;
pub mod orbit;
pub mod grab;
pub mod session;
pub mod reveal;
pub mod phase;
pub mod input;
pub mod engine;
pub mod machine;
pub mod tracking;
pub mod reading_task;
pub mod visualizer;
pub mod app;

pub use config::EngineConfig;
pub use engine::{simulate, EngineEvent, EngineState, FrameSnapshot};
pub use input::{Command, FrameInput, InputMode, Tap};
pub use landmarks::HandFrame;
pub use machine::SelectionPhaseMachine;
pub use phase::Phase;
pub use pose::Pose;
