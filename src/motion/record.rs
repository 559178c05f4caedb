use crate::detection::Keypoints;
use serde::{Deserialize, Serialize};

/// Motion state of a player, derived from instantaneous speed vs threshold
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionState {
    #[default]
    Stopped,
    Moving,
}

impl MotionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotionState::Stopped => "stopped",
            MotionState::Moving => "moving",
        }
    }
}

/// One accepted positional sample for a player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    /// Presentation timestamp in seconds
    pub timestamp: f64,
    /// Bounding box centroid x in pixels
    pub x: f64,
    /// Bounding box centroid y in pixels
    pub y: f64,
}

impl PositionSample {
    /// Euclidean pixel distance to another sample
    pub fn distance_to(&self, other: &PositionSample) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Accumulated motion history for a single player.
///
/// Records are created lazily on the first accepted sample and never deleted
/// during a run. Histories grow without bound, which is acceptable for the
/// bounded offline batch runs this crate targets.
#[derive(Debug, Clone, Default)]
pub struct PlayerMotionRecord {
    /// Accepted position samples, ordered by timestamp
    pub(crate) positions: Vec<PositionSample>,
    /// Speed in m/s per transition between consecutive positions
    pub(crate) speeds: Vec<f64>,
    /// Current motion state
    pub(crate) state: MotionState,
    /// Number of Moving -> Stopped transitions
    pub(crate) stop_count: u32,
    /// Number of Stopped -> Moving transitions
    pub(crate) move_count: u32,
    /// Meters covered while classified as Moving
    pub(crate) motion_distance: f64,
    /// Truncated second of the last accepted sample, for deduplication
    pub(crate) last_sampled_second: Option<i64>,
    /// Raw pose keypoint history, append-only
    pub(crate) pose_samples: Vec<(f64, Keypoints)>,
}

impl PlayerMotionRecord {
    pub fn positions(&self) -> &[PositionSample] {
        &self.positions
    }

    pub fn speeds(&self) -> &[f64] {
        &self.speeds
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn stop_count(&self) -> u32 {
        self.stop_count
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn motion_distance(&self) -> f64 {
        self.motion_distance
    }

    /// Speed sample `i` describes the transition from `positions[i]` to
    /// `positions[i + 1]`. Returns the endpoints of transition `i`, or None
    /// when out of range.
    pub fn transition(&self, i: usize) -> Option<(&PositionSample, &PositionSample)> {
        if i < self.speeds.len() {
            Some((&self.positions[i], &self.positions[i + 1]))
        } else {
            None
        }
    }

    pub(crate) fn latest_pose(&self) -> Option<&Keypoints> {
        self.pose_samples.last().map(|(_, keypoints)| keypoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_between_samples() {
        let a = PositionSample {
            timestamp: 0.0,
            x: 0.0,
            y: 0.0,
        };
        let b = PositionSample {
            timestamp: 1.0,
            x: 3.0,
            y: 4.0,
        };
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_new_record_starts_stopped_and_empty() {
        let record = PlayerMotionRecord::default();
        assert_eq!(record.state(), MotionState::Stopped);
        assert!(record.positions().is_empty());
        assert!(record.speeds().is_empty());
        assert_eq!(record.stop_count(), 0);
        assert_eq!(record.move_count(), 0);
        assert!(record.transition(0).is_none());
    }
}
