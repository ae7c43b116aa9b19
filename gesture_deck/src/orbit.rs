//! The 78-card orbit.
//!
//! Every card rides its own fixed orbit around the deck centre. Orbits are
//! laid out as a six-turn spiral from the inner ring (radius 4) to the outer
//! ring (radius 11); inner cards sweep faster than outer ones. A global
//! orbit clock, driven by the smoothed pointer, advances all of them at once.
//!
//! ```text
//!   angle(i, t) = base_angle(i) + orbit_time · speed_factor(i)
//!   position    = (r·cos angle,  y_offset + bob,  r·sin angle)
//! ```
//!
//! The card nearest the viewer anchor is the *highlighted* card: it grows
//! and turns to face the viewer, and it is what a grab selects.

use std::f32::consts::{PI, TAU};

use tarot_deck::DECK_SIZE;

use crate::config::OrbitConfig;
use crate::motion::lerp;

/// Pointer deflection that maps to full orbit speed.
const FULL_DEFLECTION: f32 = 0.5;
/// Per-card breathing phase step (golden angle), so neighbours never pulse together.
const GOLDEN_ANGLE: f32 = 2.399_963;
/// Depth of the point a highlighted card turns toward.
const FACING_Z: f32 = 8.0;

// ════════════════════════════════════════════════════════════════════════════
// OrbitCard / CardTransform
// ════════════════════════════════════════════════════════════════════════════

/// Immutable orbit parameters, computed once per card.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCard {
    pub index:        usize,
    pub base_angle:   f32,
    pub radius:       f32,
    pub y_offset:     f32,
    pub speed_factor: f32,
    pub phase:        f32,
}

impl OrbitCard {
    pub fn for_index(index: usize) -> OrbitCard {
        let p = index as f32 / DECK_SIZE as f32;
        OrbitCard {
            index,
            base_angle:   p * TAU * 6.0,
            radius:       4.0 + p * 7.0,
            y_offset:     (p * PI * 10.0).sin() * 2.5 + (p - 0.5) * 4.0,
            speed_factor: 1.5 - p * 0.8,
            phase:        (index as f32 * GOLDEN_ANGLE) % TAU,
        }
    }
}

/// Per-frame pose of one card, copied out to the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CardTransform {
    pub index:       usize,
    pub position:    [f32; 3],
    pub scale:       f32,
    pub rotation_y:  f32,
    pub highlighted: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// OrbitSimulator
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct OrbitSimulator {
    cfg:           OrbitConfig,
    cards:         Vec<OrbitCard>,
    transforms:    Vec<CardTransform>,
    active:        Vec<bool>,
    current_speed: f32,
    orbit_time:    f32,
    clock:         f32,
    ticks:         u64,
    highlighted:   Option<usize>,
}

impl Default for OrbitSimulator {
    fn default() -> Self { OrbitSimulator::new(OrbitConfig::default()) }
}

impl OrbitSimulator {
    pub fn new(cfg: OrbitConfig) -> Self {
        let cards: Vec<OrbitCard> = (0..DECK_SIZE).map(OrbitCard::for_index).collect();
        let transforms = cards.iter().map(|c| CardTransform {
            index:      c.index,
            scale:      cfg.base_scale,
            rotation_y: -c.base_angle + PI / 2.0,
            ..Default::default()
        }).collect();
        let mut sim = OrbitSimulator {
            cfg,
            cards,
            transforms,
            active:        vec![true; DECK_SIZE],
            current_speed: 0.0,
            orbit_time:    0.0,
            clock:         0.0,
            ticks:         0,
            highlighted:   None,
        };
        sim.place_cards();
        sim.highlighted = sim.nearest();
        sim.mark_highlight();
        sim
    }

    /// Target angular speed for a smoothed pointer position.
    pub fn target_speed(&self, pointer_x: f32) -> f32 {
        if !pointer_x.is_finite() { return 0.0; }
        let max = self.cfg.max_pointer_speed;
        (pointer_x / FULL_DEFLECTION * max).clamp(-max, max)
    }

    /// Angular speed actually applied to the orbit clock. Below the idle
    /// baseline the magnitude is raised to the baseline in the direction the
    /// pointer last pushed, so the deck never stops and never reverses.
    pub fn angular_speed(&self) -> f32 {
        if self.current_speed.abs() < self.cfg.idle_baseline {
            self.cfg.idle_baseline.copysign(self.current_speed)
        } else {
            self.current_speed
        }
    }

    /// Advance the orbit by `dt` seconds with the given smoothed pointer.
    pub fn step(&mut self, pointer_x: f32, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let target = self.target_speed(pointer_x);
        self.current_speed = lerp(self.current_speed, target, (dt * self.cfg.responsiveness).clamp(0.0, 1.0));
        self.orbit_time += self.angular_speed() * dt;
        self.clock += dt;
        self.ticks += 1;

        self.place_cards();

        let stale = self.highlighted.map_or(true, |i| !self.active[i]);
        if stale || self.ticks % self.cfg.highlight_every_ticks as u64 == 0 {
            self.highlighted = self.nearest();
        }
        self.mark_highlight();
        self.ease(dt);
    }

    /// Positions follow the orbit exactly; scale and rotation are eased later.
    fn place_cards(&mut self) {
        let (bob_f, bob_a) = (self.cfg.bob_frequency, self.cfg.bob_amplitude);
        for (card, t) in self.cards.iter().zip(self.transforms.iter_mut()) {
            if !self.active[card.index] { continue; }
            let angle = card.base_angle + self.orbit_time * card.speed_factor;
            let bob = (self.clock * bob_f + card.phase).sin() * bob_a;
            t.position = [card.radius * angle.cos(), card.y_offset + bob, card.radius * angle.sin()];
        }
    }

    fn nearest(&self) -> Option<usize> {
        let a = self.cfg.viewer_anchor;
        let mut best: Option<(usize, f32)> = None;
        for t in self.transforms.iter().filter(|t| self.active[t.index]) {
            let [x, y, z] = t.position;
            let d = ((x - a[0]).powi(2) + (y - a[1]).powi(2) + (z - a[2]).powi(2)).sqrt();
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((t.index, d));
            }
        }
        best.map(|(i, _)| i)
    }

    fn mark_highlight(&mut self) {
        for t in &mut self.transforms {
            t.highlighted = Some(t.index) == self.highlighted;
        }
    }

    fn ease(&mut self, dt: f32) {
        let k = (dt * self.cfg.pose_ease).clamp(0.0, 1.0);
        for (card, t) in self.cards.iter().zip(self.transforms.iter_mut()) {
            if !self.active[card.index] { continue; }
            let [x, _, z] = t.position;
            let (scale, rot) = if t.highlighted {
                (self.cfg.highlight_scale, x.atan2(z - FACING_Z))
            } else {
                let pulse = (self.clock * self.cfg.pulse_frequency + card.phase).sin() * self.cfg.pulse_amplitude;
                let angle = card.base_angle + self.orbit_time * card.speed_factor;
                (self.cfg.base_scale + pulse, -angle + PI / 2.0)
            };
            t.scale = lerp(t.scale, scale, k);
            t.rotation_y = lerp_angle(t.rotation_y, rot, k);
        }
    }

    /// Remove a selected card from the orbit. Returns `false` if it was
    /// already gone or out of range.
    pub fn retire(&mut self, index: usize) -> bool {
        match self.active.get_mut(index) {
            Some(a) if *a => {
                *a = false;
                if self.highlighted == Some(index) {
                    self.highlighted = self.nearest();
                    self.mark_highlight();
                }
                true
            }
            _ => false,
        }
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active.get(index).copied().unwrap_or(false)
    }

    pub fn active_count(&self) -> usize { self.active.iter().filter(|a| **a).count() }
    pub fn highlighted(&self)  -> Option<usize> { self.highlighted }
    pub fn orbit_time(&self)   -> f32 { self.orbit_time }
    pub fn card(&self, index: usize) -> Option<&OrbitCard> { self.cards.get(index) }
    pub fn transform(&self, index: usize) -> Option<&CardTransform> {
        self.transforms.get(index).filter(|t| self.active[t.index])
    }

    /// Copy of every card still in orbit.
    pub fn transforms(&self) -> Vec<CardTransform> {
        self.transforms.iter().filter(|t| self.active[t.index]).copied().collect()
    }

    pub fn reset(&mut self) {
        *self = OrbitSimulator::new(self.cfg.clone());
    }
}

/// Lerp along the shorter arc, so a tangent heading wrapping past ±π does
/// not spin the card the long way round.
fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    let mut d = (to - from) % TAU;
    if d > PI  { d -= TAU; }
    if d < -PI { d += TAU; }
    from + d * t
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn orbit_parameters_span_inner_to_outer() {
        let first = OrbitCard::for_index(0);
        let last  = OrbitCard::for_index(DECK_SIZE - 1);
        assert_eq!(first.radius, 4.0);
        assert!(last.radius > 10.8 && last.radius < 11.0);
        for i in 1..DECK_SIZE {
            let (a, b) = (OrbitCard::for_index(i - 1), OrbitCard::for_index(i));
            assert!(b.radius > a.radius);
            assert!(b.speed_factor < a.speed_factor, "inner cards must sweep faster");
        }
    }

    #[test]
    fn exactly_one_highlight_while_cards_remain() {
        let mut sim = OrbitSimulator::default();
        for _ in 0..120 {
            sim.step(0.3, DT);
            let n = sim.transforms().iter().filter(|t| t.highlighted).count();
            assert_eq!(n, 1);
            assert!(sim.highlighted().is_some());
        }
    }

    #[test]
    fn highlight_is_nearest_to_anchor() {
        let mut sim = OrbitSimulator::new(OrbitConfig { highlight_every_ticks: 1, ..Default::default() });
        sim.step(0.0, DT);
        let a = OrbitConfig::default().viewer_anchor;
        let dist = |t: &CardTransform| {
            let [x, y, z] = t.position;
            ((x - a[0]).powi(2) + (y - a[1]).powi(2) + (z - a[2]).powi(2)).sqrt()
        };
        let h = sim.highlighted().unwrap();
        let hd = dist(sim.transform(h).unwrap());
        assert!(sim.transforms().iter().all(|t| dist(t) >= hd));
    }

    #[test]
    fn idle_speed_converges_to_baseline() {
        let mut sim = OrbitSimulator::default();
        for _ in 0..60 { sim.step(0.5, DT); }
        assert!(sim.angular_speed() > 1.0);
        for _ in 0..600 { sim.step(0.0, DT); }
        let baseline = OrbitConfig::default().idle_baseline;
        assert!((sim.angular_speed() - baseline).abs() < 1e-6);
        assert!(sim.angular_speed() != 0.0);
        let before = sim.orbit_time();
        sim.step(0.0, DT);
        assert!(sim.orbit_time() > before);
    }

    #[test]
    fn slight_left_deflection_spins_left() {
        let mut sim = OrbitSimulator::default();
        for _ in 0..600 { sim.step(-0.01, DT); }
        assert!(sim.target_speed(-0.01) < 0.0);
        assert_eq!(sim.angular_speed(), -OrbitConfig::default().idle_baseline);
        let before = sim.orbit_time();
        sim.step(-0.01, DT);
        assert!(sim.orbit_time() < before);
    }

    #[test]
    fn pointer_speed_is_clamped_and_signed() {
        let sim = OrbitSimulator::default();
        assert_eq!(sim.target_speed(5.0), 1.5);
        assert_eq!(sim.target_speed(-5.0), -1.5);
        assert_eq!(sim.target_speed(f32::NAN), 0.0);
        assert!((sim.target_speed(0.25) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn retired_cards_leave_the_orbit() {
        let mut sim = OrbitSimulator::default();
        let h = sim.highlighted().unwrap();
        assert!(sim.retire(h));
        assert!(!sim.retire(h));
        assert!(!sim.retire(DECK_SIZE));
        assert_eq!(sim.active_count(), DECK_SIZE - 1);
        assert_ne!(sim.highlighted(), Some(h));
        for _ in 0..30 {
            sim.step(-0.4, DT);
            assert_ne!(sim.highlighted(), Some(h));
            assert!(sim.transforms().iter().all(|t| t.index != h));
        }
    }

    #[test]
    fn empty_orbit_has_no_highlight() {
        let mut sim = OrbitSimulator::default();
        for i in 0..DECK_SIZE { sim.retire(i); }
        sim.step(0.0, DT);
        assert_eq!(sim.highlighted(), None);
        assert!(sim.transforms().is_empty());
    }

    #[test]
    fn highlighted_card_grows() {
        let mut sim = OrbitSimulator::new(OrbitConfig { highlight_every_ticks: 1, ..Default::default() });
        for _ in 0..120 { sim.step(0.0, DT); }
        let h = sim.highlighted().unwrap();
        assert!(sim.transform(h).unwrap().scale > 1.0);
        let other = sim.transforms().into_iter().find(|t| !t.highlighted).unwrap();
        assert!(other.scale < 0.9);
    }

    #[test]
    fn lerp_angle_takes_short_way() {
        let r = lerp_angle(PI - 0.1, -PI + 0.1, 0.5);
        assert!((r.abs() - PI).abs() < 1e-4, "{}", r);
    }

    #[test]
    fn reset_restores_full_deck() {
        let mut sim = OrbitSimulator::default();
        sim.retire(3);
        for _ in 0..10 { sim.step(0.5, DT); }
        sim.reset();
        assert_eq!(sim.active_count(), DECK_SIZE);
        assert_eq!(sim.orbit_time(), 0.0);
        assert_eq!(sim.angular_speed(), OrbitConfig::default().idle_baseline);
    }
}
