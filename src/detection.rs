use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Named keypoint coordinates in pixels, as produced by the pose estimator
pub type Keypoints = HashMap<String, (f64, f64)>;

/// A single detector output: axis-aligned bounding box with confidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// Bounding box as [x1, y1, x2, y2] in pixels
    pub bbox: [f64; 4],
    /// Detector confidence score
    pub confidence: f64,
    /// Detector class id (0 = person for COCO-trained models)
    pub class_id: i64,
}

impl Detection {
    /// Midpoint of the bounding box, used as the player's tracked position proxy
    pub fn centroid(&self) -> (f64, f64) {
        (
            (self.bbox[0] + self.bbox[2]) / 2.0,
            (self.bbox[1] + self.bbox[3]) / 2.0,
        )
    }
}

/// One processed video frame's worth of collaborator output.
///
/// The detector and pose estimator run outside this crate; a capture file is a
/// JSON array of these frames in presentation order, replayable offline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservedFrame {
    /// Presentation timestamp in seconds
    pub timestamp: f64,
    /// Detections for this frame, unordered
    pub detections: Vec<Detection>,
    /// Pose keypoints for this frame, if the estimator produced any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keypoints: Option<Keypoints>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centroid() {
        let det = Detection {
            bbox: [0.0, 0.0, 100.0, 50.0],
            confidence: 0.9,
            class_id: 0,
        };
        assert_eq!(det.centroid(), (50.0, 25.0));
    }

    #[test]
    fn test_observed_frame_deserializes_without_keypoints() {
        let json = r#"{
            "timestamp": 1.25,
            "detections": [
                {"bbox": [10.0, 20.0, 30.0, 40.0], "confidence": 0.95, "class_id": 0}
            ]
        }"#;

        let frame: ObservedFrame = serde_json::from_str(json).unwrap();
        assert!(frame.keypoints.is_none());
        assert_eq!(frame.detections.len(), 1);
        assert!((frame.timestamp - 1.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_observed_frame_roundtrip_with_keypoints() {
        let mut keypoints = Keypoints::new();
        keypoints.insert("head".to_string(), (120.0, 40.0));

        let frame = ObservedFrame {
            timestamp: 0.5,
            detections: vec![],
            keypoints: Some(keypoints),
        };

        let json = serde_json::to_string(&frame).unwrap();
        let parsed: ObservedFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed.keypoints.unwrap().get("head"),
            Some(&(120.0, 40.0))
        );
    }
}
