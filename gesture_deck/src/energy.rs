//! Shuffle energy.
//!
//! A bounded `[0, 100]` charge. Crossing 100 is reported exactly once; the
//! value then stays frozen at 100 until [`EnergyAccumulator::reset`].

use crate::config::EnergyConfig;

pub const ENERGY_MAX: f32 = 100.0;

#[derive(Clone, Debug, Default)]
pub struct EnergyAccumulator {
    cfg:    EnergyConfig,
    energy: f32,
    full:   bool,
}

impl EnergyAccumulator {
    pub fn new(cfg: EnergyConfig) -> Self {
        EnergyAccumulator { cfg, energy: 0.0, full: false }
    }

    /// Integrate one tick of gesture motion. Returns `true` on the tick the
    /// charge reaches 100.
    pub fn charge(&mut self, speed: f32) -> bool {
        let speed = if speed.is_finite() { speed.max(0.0) } else { 0.0 };
        self.add(speed * self.cfg.gain)
    }

    /// Touch-mode substitute for [`charge`](Self::charge).
    pub fn auto_charge(&mut self) -> bool { self.add(self.cfg.touch_increment) }

    /// One tap during shuffling.
    pub fn tap(&mut self) -> bool { self.add(self.cfg.tap_increment) }

    fn add(&mut self, amount: f32) -> bool {
        if self.full { return false; }
        self.energy = (self.energy + amount).clamp(0.0, ENERGY_MAX);
        if self.energy >= ENERGY_MAX {
            self.full = true;
            return true;
        }
        false
    }

    pub fn value(&self)   -> f32  { self.energy }
    pub fn is_full(&self) -> bool { self.full }

    pub fn reset(&mut self) {
        self.energy = 0.0;
        self.full = false;
    }
}
