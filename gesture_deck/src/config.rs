//! Engine configuration.
//!
//! Every tuning constant of the engine lives here rather than in the code
//! that uses it: the pose dead zone in particular was tuned against one
//! camera and will need recalibrating for others. All sections deserialize
//! from TOML with per-field defaults, so a config file only has to name
//! what it changes:
//!
//! ```toml
//! [grab]
//! hold_frames = 30
//!
//! [timing]
//! manifesting_secs = 4.0
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

// ════════════════════════════════════════════════════════════════════════════
// Sections
// ════════════════════════════════════════════════════════════════════════════

/// Pose classifier thresholds.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    /// A finger is extended when tip-to-wrist exceeds base-to-wrist by this factor.
    pub extension_ratio:   f32,
    /// The thumb is extended when tip-to-index-base exceeds palm width by this factor.
    pub thumb_ratio:       f32,
    /// Extended-finger count at or above which the hand is open.
    pub hover_min_fingers: u8,
    /// Extended-finger count at or below which the hand is a fist.
    pub grab_max_fingers:  u8,
}

impl Default for PoseConfig {
    fn default() -> Self {
        PoseConfig {
            extension_ratio:   1.2,
            thumb_ratio:       0.5,
            hover_min_fingers: 4,
            grab_max_fingers:  1,
        }
    }
}

/// Motion smoothing.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Wrist displacement (normalised units) → raw speed.
    pub speed_gain:       f32,
    /// Raw speed ceiling per tracking callback.
    pub max_speed:        f32,
    /// Exponential smoothing rate `k` in `lerp(s, raw, k·dt)`; half-life is `ln 2 / k`.
    pub smoothing_rate:   f32,
    /// Raw speed multiplier applied on each absent frame.
    pub absent_decay:     f32,
    /// Silence after which the tracker counts as reporting no hand; one
    /// absent frame is applied per interval until a callback arrives.
    pub stale_after_secs: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        MotionConfig {
            speed_gain:       1200.0,
            max_speed:        100.0,
            smoothing_rate:   3.5,
            absent_decay:     0.5,
            stale_after_secs: 0.2,
        }
    }
}

/// Shuffle energy.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// Energy per tick per unit of smoothed speed.
    pub gain:            f32,
    /// Energy added every tick in touch mode.
    pub touch_increment: f32,
    /// Energy added by one tap.
    pub tap_increment:   f32,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        EnergyConfig { gain: 0.06, touch_increment: 0.4, tap_increment: 8.0 }
    }
}

/// Orbit simulation.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// How fast the orbit speed follows the pointer (per second).
    pub responsiveness:        f32,
    /// Angular speed at full pointer deflection.
    pub max_pointer_speed:     f32,
    /// Angular speed used whenever the pointer contributes nothing.
    pub idle_baseline:         f32,
    /// Point the nearest card is measured against, in deck space.
    pub viewer_anchor:         [f32; 3],
    pub base_scale:            f32,
    pub highlight_scale:       f32,
    /// Scale/rotation easing rate (per second).
    pub pose_ease:             f32,
    pub bob_amplitude:         f32,
    pub bob_frequency:         f32,
    pub pulse_amplitude:       f32,
    pub pulse_frequency:       f32,
    /// Recompute the nearest card every N ticks; positions update every tick.
    pub highlight_every_ticks: u32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        OrbitConfig {
            responsiveness:        2.0,
            max_pointer_speed:     1.5,
            idle_baseline:         0.05,
            viewer_anchor:         [0.0, 0.0, 3.0],
            base_scale:            0.8,
            highlight_scale:       1.3,
            pose_ease:             5.0,
            bob_amplitude:         0.2,
            bob_frequency:         0.5,
            pulse_amplitude:       0.02,
            pulse_frequency:       0.3,
            highlight_every_ticks: 2,
        }
    }
}

/// Grab-hold debouncing, counted in tracking callbacks.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GrabConfig {
    pub hold_frames:     u32,
    pub decay_per_frame: u32,
}

impl Default for GrabConfig {
    fn default() -> Self {
        GrabConfig { hold_frames: 45, decay_per_frame: 2 }
    }
}

/// Wall-clock phase timers, in seconds.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub category_chosen_secs: f32,
    pub focusing_secs:        f32,
    pub transitioning_secs:   f32,
    pub deck_ready_secs:      f32,
    /// Spread progress gained per second while auto-spreading (0–100 scale).
    pub spread_rate:          f32,
    pub picking_guide_secs:   f32,
    pub manifesting_secs:     f32,
    /// Tear the session down after this long without any input in an
    /// interactive phase. `None` disables the timeout.
    pub idle_abort_secs:      Option<f32>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            category_chosen_secs: 0.8,
            focusing_secs:        3.0,
            transitioning_secs:   2.0,
            deck_ready_secs:      1.0,
            spread_rate:          60.0,
            picking_guide_secs:   2.5,
            manifesting_secs:     3.0,
            idle_abort_secs:      Some(120.0),
        }
    }
}

/// Reveal sweep over the final spread.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Half the width of a laid-out card, in spread units.
    pub card_half_width: f32,
}

impl Default for RevealConfig {
    fn default() -> Self { RevealConfig { card_half_width: 0.7 } }
}

// ════════════════════════════════════════════════════════════════════════════
// EngineConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub pose:   PoseConfig,
    pub motion: MotionConfig,
    pub energy: EnergyConfig,
    pub orbit:  OrbitConfig,
    pub grab:   GrabConfig,
    pub timing: TimingConfig,
    pub reveal: RevealConfig,
}

fn positive(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason: format!("must be a positive number, got {}", v) })
    }
}

impl EngineConfig {
    /// Read, parse and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse { path: path.to_path_buf(), source },
            other => other,
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: Default::default(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("pose.extension_ratio", self.pose.extension_ratio)?;
        positive("pose.thumb_ratio",     self.pose.thumb_ratio)?;
        // The dead zone must contain at least one finger count.
        if self.pose.hover_min_fingers <= self.pose.grab_max_fingers + 1 {
            return Err(ConfigError::Invalid {
                field:  "pose.hover_min_fingers",
                reason: format!(
                    "must exceed grab_max_fingers + 1 ({} vs {})",
                    self.pose.hover_min_fingers, self.pose.grab_max_fingers
                ),
            });
        }
        if self.pose.hover_min_fingers > 5 {
            return Err(ConfigError::Invalid {
                field:  "pose.hover_min_fingers",
                reason: "a hand has five digits".into(),
            });
        }

        positive("motion.speed_gain",       self.motion.speed_gain)?;
        positive("motion.max_speed",        self.motion.max_speed)?;
        positive("motion.smoothing_rate",   self.motion.smoothing_rate)?;
        positive("motion.stale_after_secs", self.motion.stale_after_secs)?;
        if !(0.0..1.0).contains(&self.motion.absent_decay) {
            return Err(ConfigError::Invalid {
                field:  "motion.absent_decay",
                reason: "must be in [0, 1)".into(),
            });
        }

        positive("energy.gain",            self.energy.gain)?;
        positive("energy.touch_increment", self.energy.touch_increment)?;
        positive("energy.tap_increment",   self.energy.tap_increment)?;

        positive("orbit.responsiveness", self.orbit.responsiveness)?;
        positive("orbit.idle_baseline",  self.orbit.idle_baseline)?;
        if self.orbit.highlight_every_ticks == 0 {
            return Err(ConfigError::Invalid {
                field:  "orbit.highlight_every_ticks",
                reason: "must be at least 1".into(),
            });
        }

        if self.grab.hold_frames == 0 {
            return Err(ConfigError::Invalid { field: "grab.hold_frames", reason: "must be at least 1".into() });
        }

        positive("timing.spread_rate",        self.timing.spread_rate)?;
        positive("timing.manifesting_secs",   self.timing.manifesting_secs)?;
        positive("reveal.card_half_width",    self.reveal.card_half_width)?;
        Ok(())
    }
}
