//! Hand-landmark frames as delivered by the tracking service.
//!
//! A frame is 21 normalised 2-D points in the usual hand-model order
//! (wrist, then four joints per digit from thumb to pinky). An absent hand
//! is represented by `Option::None` at the call sites, never by an empty
//! frame.

use crate::error::FrameError;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_TIP:  usize = 20;

/// (tip, base joint) pairs for the four non-thumb fingers.
pub const FINGER_TIPS_AND_BASES: [(usize, usize); 4] = [
    (INDEX_TIP,  INDEX_MCP),
    (MIDDLE_TIP, MIDDLE_MCP),
    (RING_TIP,   RING_MCP),
    (PINKY_TIP,  PINKY_MCP),
];

// ════════════════════════════════════════════════════════════════════════════
// Landmark / HandFrame
// ════════════════════════════════════════════════════════════════════════════

/// A single normalised image-space point; `x`, `y` nominally in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self { Landmark { x, y } }

    pub fn distance(self, other: Landmark) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn lerp(self, other: Landmark, t: f32) -> Landmark {
        Landmark::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }
}

/// One detected hand.
#[derive(Clone, Debug, PartialEq)]
pub struct HandFrame {
    points: [Landmark; LANDMARK_COUNT],
}

impl HandFrame {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self { HandFrame { points } }

    /// Build from raw `(x, y)` pairs, rejecting anything but 21 points.
    pub fn from_points(raw: &[(f32, f32)]) -> Result<Self, FrameError> {
        if raw.len() != LANDMARK_COUNT {
            return Err(FrameError::WrongLandmarkCount(raw.len()));
        }
        let mut points = [Landmark::default(); LANDMARK_COUNT];
        for (p, &(x, y)) in points.iter_mut().zip(raw) {
            *p = Landmark::new(x, y);
        }
        Ok(HandFrame { points })
    }

    pub fn point(&self, i: usize) -> Landmark { self.points[i] }
    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] { &self.points }
    pub fn wrist(&self) -> Landmark { self.points[WRIST] }

    /// A plausible hand centred on `(x, y)` (the base of the middle finger)
    /// with the given digits extended, thumb first.
    ///
    /// Used by the simulated tracking source and throughout the tests.
    pub fn synthetic(x: f32, y: f32, extended: [bool; 5]) -> HandFrame {
        let wrist = Landmark::new(x, y + 0.12);
        let mut pts = [Landmark::default(); LANDMARK_COUNT];
        pts[WRIST] = wrist;

        // Thumb: CMC near the wrist, tip either out to the side or tucked
        // against the index base.
        let cmc = Landmark::new(x - 0.05, y + 0.09);
        let tip = if extended[0] {
            Landmark::new(x - 0.13, y + 0.02)
        } else {
            Landmark::new(x - 0.035, y + 0.03)
        };
        pts[THUMB_CMC] = cmc;
        pts[THUMB_MCP] = cmc.lerp(tip, 0.4);
        pts[THUMB_IP]  = cmc.lerp(tip, 0.7);
        pts[THUMB_TIP] = tip;

        // Other fingers: base joints fan across the palm; an extended tip
        // continues away from the wrist, a curled tip folds back toward it.
        let bases = [
            Landmark::new(x - 0.040, y),
            Landmark::new(x - 0.013, y - 0.005),
            Landmark::new(x + 0.013, y),
            Landmark::new(x + 0.040, y + 0.010),
        ];
        for (f, base) in bases.iter().enumerate() {
            let mcp_idx = INDEX_MCP + f * 4;
            let dx = base.x - wrist.x;
            let dy = base.y - wrist.y;
            let len = dx.hypot(dy).max(1e-6);
            let tip = if extended[f + 1] {
                Landmark::new(base.x + dx / len * 0.09, base.y + dy / len * 0.09)
            } else {
                base.lerp(wrist, 0.35)
            };
            pts[mcp_idx]     = *base;
            pts[mcp_idx + 1] = base.lerp(tip, 0.4);
            pts[mcp_idx + 2] = base.lerp(tip, 0.7);
            pts[mcp_idx + 3] = tip;
        }

        HandFrame { points: pts }
    }

    /// Open hand (all five digits extended).
    pub fn open(x: f32, y: f32) -> HandFrame { Self::synthetic(x, y, [true; 5]) }

    /// Closed fist.
    pub fn fist(x: f32, y: f32) -> HandFrame { Self::synthetic(x, y, [false; 5]) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_rejects_wrong_count() {
        let raw = vec![(0.5, 0.5); 20];
        assert_eq!(HandFrame::from_points(&raw), Err(FrameError::WrongLandmarkCount(20)));
        let raw = vec![(0.5, 0.5); 21];
        assert!(HandFrame::from_points(&raw).is_ok());
    }

    #[test]
    fn synthetic_open_tips_are_far_from_wrist() {
        let f = HandFrame::open(0.5, 0.5);
        for (tip, base) in FINGER_TIPS_AND_BASES {
            let t = f.point(tip).distance(f.wrist());
            let b = f.point(base).distance(f.wrist());
            assert!(t > b * 1.2, "tip {} not extended", tip);
        }
    }

    #[test]
    fn synthetic_fist_tips_fold_back() {
        let f = HandFrame::fist(0.5, 0.5);
        for (tip, base) in FINGER_TIPS_AND_BASES {
            assert!(f.point(tip).distance(f.wrist()) < f.point(base).distance(f.wrist()));
        }
    }
}
