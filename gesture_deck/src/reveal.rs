//! Reveal sweep over the laid-out spread.
//!
//! While the hand hovers, the pointer is mapped across the horizontal span
//! of the spread. Every card whose footprint the pointer passes over since
//! the previous sample is turned face up. Reveals are permanent.

use tarot_deck::Spread;

use crate::config::RevealConfig;

#[derive(Clone, Debug)]
pub struct RevealSweep {
    slot_x:     Vec<f32>,
    half_width: f32,
    span:       (f32, f32),
    revealed:   Vec<bool>,
    last_x:     Option<f32>,
}

impl RevealSweep {
    pub fn new(spread: Spread, cfg: &RevealConfig) -> Self {
        let slot_x: Vec<f32> = spread.slots().iter().map(|s| s[0]).collect();
        let hw = cfg.card_half_width;
        let lo = slot_x.iter().copied().fold(f32::INFINITY, f32::min) - hw;
        let hi = slot_x.iter().copied().fold(f32::NEG_INFINITY, f32::max) + hw;
        RevealSweep {
            revealed:   vec![false; slot_x.len()],
            slot_x,
            half_width: hw,
            span:       (lo, hi),
            last_x:     None,
        }
    }

    /// Spread-space x for a centred pointer in `[-0.5, 0.5]`.
    pub fn map_pointer(&self, pointer_x: f32) -> f32 {
        let p = if pointer_x.is_finite() { pointer_x.clamp(-0.5, 0.5) } else { 0.0 };
        let (lo, hi) = self.span;
        lo + (p + 0.5) * (hi - lo)
    }

    /// Feed one hovering sample. Returns the slots newly revealed, in slot
    /// order.
    pub fn sweep(&mut self, pointer_x: f32) -> Vec<usize> {
        let x = self.map_pointer(pointer_x);
        let (a, b) = match self.last_x {
            Some(prev) => (prev.min(x), prev.max(x)),
            None       => (x, x),
        };
        self.last_x = Some(x);

        let mut newly = Vec::new();
        for (slot, &cx) in self.slot_x.iter().enumerate() {
            if self.revealed[slot] { continue; }
            if b >= cx - self.half_width && a <= cx + self.half_width {
                self.revealed[slot] = true;
                newly.push(slot);
            }
        }
        newly
    }

    /// The hand stopped hovering; the next sample starts a fresh stroke.
    pub fn lift(&mut self) { self.last_x = None; }

    /// Reveal one slot directly. Returns `true` if it was face down.
    pub fn reveal(&mut self, slot: usize) -> bool {
        match self.revealed.get_mut(slot) {
            Some(r) if !*r => { *r = true; true }
            _ => false,
        }
    }

    pub fn is_revealed(&self, slot: usize) -> bool {
        self.revealed.get(slot).copied().unwrap_or(false)
    }

    pub fn all_revealed(&self) -> bool { self.revealed.iter().all(|r| *r) }
    pub fn revealed(&self) -> &[bool] { &self.revealed }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> RevealSweep { RevealSweep::new(Spread::TimeFlow, &RevealConfig::default()) }

    #[test]
    fn span_covers_outer_cards() {
        let s = row();
        assert!((s.map_pointer(-0.5) - (-3.2)).abs() < 1e-5);
        assert!((s.map_pointer(0.5)  - 3.2).abs() < 1e-5);
        assert_eq!(s.map_pointer(f32::NAN), 0.0);
    }

    #[test]
    fn sweep_left_to_right_reveals_in_order() {
        let mut s = row();
        let mut order = Vec::new();
        let mut p = -0.5;
        while p <= 0.5 {
            order.extend(s.sweep(p));
            p += 0.05;
        }
        assert_eq!(order, [0, 1, 2]);
        assert!(s.all_revealed());
    }

    #[test]
    fn fast_swipe_reveals_everything_crossed() {
        let mut s = row();
        s.sweep(-0.5);
        assert_eq!(s.sweep(0.5), vec![1, 2]);
    }

    #[test]
    fn lift_breaks_the_stroke() {
        let mut s = row();
        assert_eq!(s.sweep(-0.5), vec![0]);
        s.lift();
        assert_eq!(s.sweep(0.5), vec![2]);
        assert!(!s.is_revealed(1));
    }

    #[test]
    fn reveals_are_monotonic() {
        let mut s = row();
        s.sweep(0.0);
        assert!(s.is_revealed(1));
        for p in [-0.5, 0.5, 0.0, -0.2] {
            s.sweep(p);
            assert!(s.is_revealed(1));
        }
        assert!(s.sweep(0.0).is_empty());
    }

    #[test]
    fn direct_reveal() {
        let mut s = RevealSweep::new(Spread::LovePyramid, &RevealConfig::default());
        assert!(s.reveal(3));
        assert!(!s.reveal(3));
        assert!(!s.reveal(9));
        assert_eq!(s.revealed(), &[false, false, false, true]);
    }

    #[test]
    fn single_card_spread() {
        let mut s = RevealSweep::new(Spread::Single, &RevealConfig::default());
        assert_eq!(s.sweep(-0.4), vec![0]);
        assert!(s.all_revealed());
    }
}
