//! Grab-hold debouncing.
//!
//! Turns a sustained fist into exactly one selection. Counting is per
//! tracking callback, never per render tick, so the hold time does not
//! depend on display refresh.
//!
//! ```text
//!   fist, armed     → duration += 1; fire at `hold_frames`, then cool down
//!   anything else   → duration -= decay (floored at 0)
//!   non-fist        → cooldown clears
//! ```

use crate::config::GrabConfig;
use crate::pose::Pose;

#[derive(Clone, Debug, Default)]
pub struct GrabHoldDebouncer {
    cfg:      GrabConfig,
    duration: u32,
    cooldown: bool,
}

impl GrabHoldDebouncer {
    pub fn new(cfg: GrabConfig) -> Self {
        GrabHoldDebouncer { cfg, duration: 0, cooldown: false }
    }

    /// Feed one classifier result. Returns `true` exactly when a hold
    /// completes.
    pub fn on_pose(&mut self, pose: Pose) -> bool {
        if pose == Pose::Grabbing && !self.cooldown {
            self.duration += 1;
            if self.duration >= self.cfg.hold_frames {
                self.duration = 0;
                self.cooldown = true;
                return true;
            }
            return false;
        }

        self.duration = self.duration.saturating_sub(self.cfg.decay_per_frame);
        if pose != Pose::Grabbing {
            self.cooldown = false;
        }
        false
    }

    /// Hold progress as a percentage, `[0, 100]`.
    pub fn progress(&self) -> f32 {
        (self.duration as f32 / self.cfg.hold_frames as f32).min(1.0) * 100.0
    }

    pub fn cooldown_active(&self) -> bool { self.cooldown }
    pub fn duration(&self) -> u32 { self.duration }

    /// Drop in-flight progress but keep the cooldown (used when a tap
    /// selects directly).
    pub fn discard_progress(&mut self) { self.duration = 0; }

    pub fn reset(&mut self) {
        self.duration = 0;
        self.cooldown = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hold(d: &mut GrabHoldDebouncer, n: usize) -> usize {
        (0..n).filter(|_| d.on_pose(Pose::Grabbing)).count()
    }

    #[test]
    fn one_short_of_threshold_fires_nothing() {
        let mut d = GrabHoldDebouncer::default();
        assert_eq!(hold(&mut d, 44), 0);
        assert!(d.progress() > 97.0 && d.progress() < 100.0);
    }

    #[test]
    fn threshold_fires_once_and_cools_down() {
        let mut d = GrabHoldDebouncer::default();
        assert_eq!(hold(&mut d, 45), 1);
        assert_eq!(d.progress(), 0.0);
        assert!(d.cooldown_active());
    }

    #[test]
    fn prolonged_grab_fires_once() {
        let mut d = GrabHoldDebouncer::default();
        assert_eq!(hold(&mut d, 500), 1);
        assert_eq!(d.duration(), 0);
    }

    #[test]
    fn release_rearms() {
        let mut d = GrabHoldDebouncer::default();
        assert_eq!(hold(&mut d, 45), 1);
        d.on_pose(Pose::None);
        assert!(!d.cooldown_active());
        assert_eq!(hold(&mut d, 45), 1);
    }

    #[test]
    fn flicker_decays_rather_than_resets() {
        let mut d = GrabHoldDebouncer::default();
        hold(&mut d, 30);
        d.on_pose(Pose::None);
        assert_eq!(d.duration(), 28);
        // 17 more completes the hold despite the dropped frame.
        assert_eq!(hold(&mut d, 16), 0);
        assert_eq!(hold(&mut d, 1), 1);
    }

    #[test]
    fn absence_drains_progress() {
        let mut d = GrabHoldDebouncer::default();
        hold(&mut d, 40);
        for _ in 0..120 { assert!(!d.on_pose(Pose::None)); }
        assert_eq!(d.progress(), 0.0);
    }

    #[test]
    fn hovering_does_not_count() {
        let mut d = GrabHoldDebouncer::default();
        for _ in 0..100 { assert!(!d.on_pose(Pose::Hovering)); }
        assert_eq!(d.duration(), 0);
    }
}
