//! Motion smoothing.
//!
//! Tracking callbacks update the *raw* signal (wrist displacement speed and
//! pointer position); animation ticks move the *smoothed* signal toward it
//! with an exponential lerp. The two cadences never need to agree: a tick
//! always reads whatever the most recent callback left behind.

use crate::config::MotionConfig;
use crate::landmarks::{HandFrame, Landmark};
use crate::pose::PoseSample;

/// Smoothed control values read once per animation tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionSignal {
    pub speed:     f32,
    pub pointer_x: f32,
    pub pointer_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct MotionSmoother {
    cfg:        MotionConfig,
    last_wrist: Option<Landmark>,
    raw:        MotionSignal,
    smoothed:   MotionSignal,
}

impl MotionSmoother {
    pub fn new(cfg: MotionConfig) -> Self {
        MotionSmoother { cfg, ..Default::default() }
    }

    /// Feed one tracking callback. `sample` is the classifier output for
    /// the same frame.
    pub fn on_sample(&mut self, frame: Option<&HandFrame>, sample: &PoseSample) {
        match frame {
            Some(f) => {
                let wrist = f.wrist();
                // First frame after re-entry has nothing to compare against.
                let speed = match self.last_wrist {
                    Some(prev) => {
                        let d = prev.distance(wrist) * self.cfg.speed_gain;
                        if d.is_finite() { d.min(self.cfg.max_speed) } else { 0.0 }
                    }
                    None => 0.0,
                };
                self.last_wrist = if wrist.x.is_finite() && wrist.y.is_finite() { Some(wrist) } else { None };
                self.raw = MotionSignal { speed, pointer_x: sample.pointer_x, pointer_y: sample.pointer_y };
            }
            None => {
                self.last_wrist = None;
                self.raw.speed *= self.cfg.absent_decay;
                self.raw.pointer_x = 0.0;
                self.raw.pointer_y = 0.0;
            }
        }
    }

    /// Advance the smoothed signal by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        let t = (self.cfg.smoothing_rate * dt).clamp(0.0, 1.0);
        self.smoothed.speed     = lerp(self.smoothed.speed,     self.raw.speed,     t);
        self.smoothed.pointer_x = lerp(self.smoothed.pointer_x, self.raw.pointer_x, t);
        self.smoothed.pointer_y = lerp(self.smoothed.pointer_y, self.raw.pointer_y, t);
    }

    pub fn signal(&self) -> MotionSignal { self.smoothed }
    pub fn raw(&self)    -> MotionSignal { self.raw }

    pub fn reset(&mut self) {
        *self = MotionSmoother::new(self.cfg.clone());
    }
}

pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 { a + (b - a) * t }

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn feed(m: &mut MotionSmoother, f: &HandFrame) {
        m.on_sample(Some(f), &PoseSample::default());
    }

    #[test]
    fn first_frame_has_no_speed() {
        let mut m = MotionSmoother::default();
        feed(&mut m, &HandFrame::open(0.2, 0.5));
        assert_eq!(m.raw().speed, 0.0);
    }

    #[test]
    fn speed_is_scaled_wrist_displacement() {
        let mut m = MotionSmoother::default();
        feed(&mut m, &HandFrame::open(0.50, 0.5));
        feed(&mut m, &HandFrame::open(0.51, 0.5));
        assert!((m.raw().speed - 12.0).abs() < 1e-3, "{}", m.raw().speed);
    }

    #[test]
    fn spikes_are_clamped() {
        let mut m = MotionSmoother::default();
        feed(&mut m, &HandFrame::open(0.1, 0.5));
        feed(&mut m, &HandFrame::open(0.9, 0.5));
        assert_eq!(m.raw().speed, MotionConfig::default().max_speed);
    }

    #[test]
    fn absent_frames_decay_instead_of_dropping() {
        let mut m = MotionSmoother::default();
        feed(&mut m, &HandFrame::open(0.50, 0.5));
        feed(&mut m, &HandFrame::open(0.52, 0.5));
        let before = m.raw().speed;
        m.on_sample(None, &PoseSample::ABSENT);
        assert!(m.raw().speed > 0.0 && m.raw().speed < before);
        for _ in 0..60 { m.on_sample(None, &PoseSample::ABSENT); }
        assert!(m.raw().speed < 1e-6);
    }

    #[test]
    fn smoothing_half_life_is_a_few_hundred_ms() {
        let mut m = MotionSmoother::default();
        m.raw.speed = 10.0;
        let mut ticks = 0;
        while m.signal().speed < 5.0 {
            m.tick(DT);
            ticks += 1;
        }
        let half_life = ticks as f32 * DT;
        assert!((0.15..=0.3).contains(&half_life), "half-life {}", half_life);
    }

    #[test]
    fn huge_dt_does_not_overshoot() {
        let mut m = MotionSmoother::default();
        m.raw.pointer_x = 0.4;
        m.tick(10.0);
        assert_eq!(m.signal().pointer_x, 0.4);
    }

    #[test]
    fn reset_clears_everything() {
        let mut m = MotionSmoother::default();
        feed(&mut m, &HandFrame::open(0.3, 0.5));
        feed(&mut m, &HandFrame::open(0.4, 0.5));
        m.tick(DT);
        m.reset();
        assert_eq!(m.signal(), MotionSignal::default());
        assert_eq!(m.raw(), MotionSignal::default());
        feed(&mut m, &HandFrame::open(0.9, 0.5));
        assert_eq!(m.raw().speed, 0.0);
    }
}
