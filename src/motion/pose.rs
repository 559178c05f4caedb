use crate::detection::Keypoints;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse pose classification derived from named keypoint geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoseLabel {
    Crouching,
    Standing,
    #[serde(rename = "Lying Down")]
    LyingDown,
    Moving,
    Unknown,
}

impl PoseLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoseLabel::Crouching => "Crouching",
            PoseLabel::Standing => "Standing",
            PoseLabel::LyingDown => "Lying Down",
            PoseLabel::Moving => "Moving",
            PoseLabel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PoseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vertical knee/ankle proximity below this many pixels reads as a crouch
const CROUCH_KNEE_ANKLE_MAX_DY: f64 = 50.0;
/// Horizontal head/feet alignment below this many pixels reads as standing
const STANDING_HEAD_FEET_MAX_DX: f64 = 50.0;
/// Vertical head/feet proximity below this many pixels reads as lying down
const LYING_HEAD_FEET_MAX_DY: f64 = 100.0;

/// Classify a single keypoint set into a pose label.
///
/// Rules are evaluated in a fixed priority order and the first match wins.
/// A rule whose keypoints are absent is skipped, falling through to the next.
pub fn classify(keypoints: &Keypoints) -> PoseLabel {
    if let (Some(knee), Some(ankle)) = (keypoints.get("left_knee"), keypoints.get("left_ankle")) {
        if (knee.1 - ankle.1).abs() < CROUCH_KNEE_ANKLE_MAX_DY {
            return PoseLabel::Crouching;
        }
    }

    if let (Some(head), Some(feet)) = (keypoints.get("head"), keypoints.get("feet")) {
        if (head.0 - feet.0).abs() < STANDING_HEAD_FEET_MAX_DX {
            return PoseLabel::Standing;
        } else if (head.1 - feet.1).abs() < LYING_HEAD_FEET_MAX_DY {
            return PoseLabel::LyingDown;
        }
    }

    PoseLabel::Moving
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypoints(entries: &[(&str, (f64, f64))]) -> Keypoints {
        entries
            .iter()
            .map(|(name, point)| (name.to_string(), *point))
            .collect()
    }

    #[test]
    fn test_crouching_from_knee_ankle_proximity() {
        let kp = keypoints(&[("left_knee", (10.0, 100.0)), ("left_ankle", (10.0, 130.0))]);
        assert_eq!(classify(&kp), PoseLabel::Crouching);
    }

    #[test]
    fn test_standing_from_head_feet_alignment() {
        let kp = keypoints(&[("head", (100.0, 10.0)), ("feet", (110.0, 400.0))]);
        assert_eq!(classify(&kp), PoseLabel::Standing);
    }

    #[test]
    fn test_lying_down_from_head_feet_vertical_proximity() {
        let kp = keypoints(&[("head", (100.0, 300.0)), ("feet", (400.0, 320.0))]);
        assert_eq!(classify(&kp), PoseLabel::LyingDown);
    }

    #[test]
    fn test_crouch_rule_takes_priority() {
        let kp = keypoints(&[
            ("left_knee", (10.0, 100.0)),
            ("left_ankle", (10.0, 120.0)),
            ("head", (100.0, 10.0)),
            ("feet", (105.0, 400.0)),
        ]);
        assert_eq!(classify(&kp), PoseLabel::Crouching);
    }

    #[test]
    fn test_missing_keypoints_fall_through_to_moving() {
        let kp = keypoints(&[("left_knee", (10.0, 100.0)), ("head", (500.0, 10.0))]);
        assert_eq!(classify(&kp), PoseLabel::Moving);
    }

    #[test]
    fn test_label_display_strings() {
        assert_eq!(PoseLabel::LyingDown.to_string(), "Lying Down");
        assert_eq!(
            serde_json::to_string(&PoseLabel::LyingDown).unwrap(),
            "\"Lying Down\""
        );
        assert_eq!(serde_json::to_string(&PoseLabel::Crouching).unwrap(), "\"Crouching\"");
    }
}
