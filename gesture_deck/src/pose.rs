//! Pose classification: one landmark frame → discrete pose + pointer.
//!
//! | Extended digits | Pose |
//! |---|---|
//! | ≥ `hover_min_fingers` (4) | `Hovering` (open hand) |
//! | 2 – 3 | `None` (dead zone) |
//! | ≤ `grab_max_fingers` (1) | `Grabbing` (fist) |
//!
//! The dead zone sits between the two active poses, so an open hand can
//! never become a fist without at least one `None` frame in between.
//!
//! Extension is judged by distance ratios rather than absolute distances,
//! which keeps the classifier stable as the hand moves toward or away from
//! the camera.

use crate::config::PoseConfig;
use crate::landmarks::{HandFrame, FINGER_TIPS_AND_BASES, INDEX_MCP, INDEX_TIP, PINKY_MCP, THUMB_TIP};

/// Distances below this are degenerate geometry and count as "not extended".
const DEGENERATE: f32 = 1e-6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Pose {
    #[default]
    None,
    Hovering,
    Grabbing,
}

/// Classifier output for one tracking callback.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PoseSample {
    pub pose:      Pose,
    /// Index fingertip, centred on 0 (roughly `[-0.5, 0.5]`).
    pub pointer_x: f32,
    pub pointer_y: f32,
}

impl PoseSample {
    pub const ABSENT: PoseSample = PoseSample { pose: Pose::None, pointer_x: 0.0, pointer_y: 0.0 };
}

#[derive(Clone, Debug, Default)]
pub struct PoseClassifier {
    cfg: PoseConfig,
}

impl PoseClassifier {
    pub fn new(cfg: PoseConfig) -> Self { PoseClassifier { cfg } }

    /// Number of extended digits, thumb included (0–5).
    pub fn extended_count(&self, frame: &HandFrame) -> u8 {
        let wrist = frame.wrist();
        let mut count = 0u8;

        // Thumb: tip away from the index base by more than a fraction of
        // the palm width.
        let palm_width = wrist.distance(frame.point(PINKY_MCP));
        let thumb_reach = frame.point(THUMB_TIP).distance(frame.point(INDEX_MCP));
        if palm_width.is_finite() && palm_width > DEGENERATE && thumb_reach > palm_width * self.cfg.thumb_ratio {
            count += 1;
        }

        for (tip, base) in FINGER_TIPS_AND_BASES {
            let tip_d  = frame.point(tip).distance(wrist);
            let base_d = frame.point(base).distance(wrist);
            if base_d.is_finite() && base_d > DEGENERATE && tip_d > base_d * self.cfg.extension_ratio {
                count += 1;
            }
        }
        count
    }

    pub fn pose_for_count(&self, count: u8) -> Pose {
        if count >= self.cfg.hover_min_fingers {
            Pose::Hovering
        } else if count <= self.cfg.grab_max_fingers {
            Pose::Grabbing
        } else {
            Pose::None
        }
    }

    /// Classify one callback's worth of input; `None` means no hand.
    pub fn classify(&self, frame: Option<&HandFrame>) -> PoseSample {
        let Some(frame) = frame else { return PoseSample::ABSENT };

        let pose = self.pose_for_count(self.extended_count(frame));
        let tip = frame.point(INDEX_TIP);
        PoseSample {
            pose,
            pointer_x: centred(tip.x),
            pointer_y: centred(tip.y),
        }
    }
}

/// `v - 0.5`, with non-finite input pinned to the centre.
fn centred(v: f32) -> f32 {
    if v.is_finite() { (v - 0.5).clamp(-1.0, 1.0) } else { 0.0 }
}
