use crate::config::PlaymetricsConfig;
use crate::detection::{Detection, ObservedFrame};
use crate::error::Result;
use crate::identity::{IdentityAssigner, LeftToRightAssigner};
use crate::motion::MotionAggregator;
use crate::report::{build_player_metrics, PoseTimeline, SessionReport};

use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};

/// Offline analysis pass over a recorded observation stream.
///
/// Consumes one `ObservedFrame` at a time in presentation order, assigns
/// frame-local player ids through the identity seam, and feeds the motion
/// aggregator. Updates are strictly sequential, which the aggregator's
/// dedup and state transitions depend on.
pub struct AnalysisPipeline {
    config: PlaymetricsConfig,
    aggregator: MotionAggregator,
    identity: Box<dyn IdentityAssigner>,
    poses: PoseTimeline,
    frames_processed: u64,
}

impl AnalysisPipeline {
    pub fn new(config: PlaymetricsConfig) -> Self {
        let aggregator = MotionAggregator::new(config.motion.clone());
        Self {
            config,
            aggregator,
            identity: Box::new(LeftToRightAssigner),
            poses: PoseTimeline::new(),
            frames_processed: 0,
        }
    }

    /// Replace the frame-local identity convention with a different assigner
    pub fn with_identity_assigner(mut self, identity: Box<dyn IdentityAssigner>) -> Self {
        self.identity = identity;
        self
    }

    pub fn aggregator(&self) -> &MotionAggregator {
        &self.aggregator
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Process a single frame's detections and optional pose keypoints
    pub fn process_frame(&mut self, frame: &ObservedFrame) {
        let mut players: Vec<Detection> = frame
            .detections
            .iter()
            .filter(|d| {
                d.class_id == self.config.pipeline.target_class_id
                    && d.confidence >= self.config.pipeline.min_confidence
            })
            .cloned()
            .collect();

        self.identity.assign(&mut players);

        debug!(
            "Frame at t={:.3}s: {} of {} detections accepted",
            frame.timestamp,
            players.len(),
            frame.detections.len()
        );

        let frame_poses = self.poses.entry(format!("{}", frame.timestamp)).or_default();

        for (index, player) in players.iter().enumerate() {
            let player_id = index as u32;
            self.aggregator.update(player_id, player.bbox, frame.timestamp);

            if let Some(keypoints) = &frame.keypoints {
                self.aggregator
                    .update_pose(player_id, keypoints.clone(), frame.timestamp);
                let label = self.aggregator.analyze_pose(player_id);
                frame_poses.insert(player_id, label);
            }
        }

        self.frames_processed += 1;
    }

    /// Process an entire observation stream in order
    pub fn run(&mut self, frames: &[ObservedFrame]) {
        info!("Processing {} observed frames", frames.len());
        for frame in frames {
            self.process_frame(frame);
        }
        info!(
            "Aggregation complete: {} frames, {} players",
            self.frames_processed,
            self.aggregator.player_ids().len()
        );
    }

    /// Consume the pipeline and produce the final report
    pub fn into_report(self, source: &str) -> SessionReport {
        let players = build_player_metrics(&self.aggregator);
        if players.is_empty() {
            warn!("No players accumulated any samples; report will be empty");
        }

        SessionReport {
            run_id: uuid::Uuid::new_v4().to_string(),
            generated_at: chrono::Utc::now(),
            source: source.to_string(),
            players,
            poses: self.poses,
        }
    }
}

/// Load a capture file: a JSON array of observed frames
pub async fn load_capture<P: AsRef<Path>>(path: P) -> Result<Vec<ObservedFrame>> {
    let raw = fs::read_to_string(path.as_ref()).await?;
    let frames: Vec<ObservedFrame> = serde_json::from_str(&raw)?;
    debug!(
        "Loaded {} frames from {}",
        frames.len(),
        path.as_ref().display()
    );
    Ok(frames)
}

/// Convenience entry point: load a capture file, run the full analysis pass,
/// and return the report
pub async fn analyze_capture<P: AsRef<Path>>(
    config: PlaymetricsConfig,
    path: P,
) -> Result<SessionReport> {
    let frames = load_capture(path.as_ref()).await?;
    let mut pipeline = AnalysisPipeline::new(config);
    pipeline.run(&frames);
    Ok(pipeline.into_report(&path.as_ref().to_string_lossy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::Keypoints;
    use crate::motion::PoseLabel;

    fn det(x1: f64, confidence: f64, class_id: i64) -> Detection {
        Detection {
            bbox: [x1, 0.0, x1 + 40.0, 180.0],
            confidence,
            class_id,
        }
    }

    fn frame(timestamp: f64, detections: Vec<Detection>) -> ObservedFrame {
        ObservedFrame {
            timestamp,
            detections,
            keypoints: None,
        }
    }

    #[test]
    fn test_filters_by_class_and_confidence() {
        let mut pipeline = AnalysisPipeline::new(PlaymetricsConfig::default());
        pipeline.process_frame(&frame(
            0.0,
            vec![
                det(10.0, 0.95, 0),
                det(200.0, 0.5, 0),  // below min_confidence
                det(400.0, 0.95, 2), // wrong class
            ],
        ));

        assert_eq!(pipeline.aggregator().player_ids(), vec![0]);
    }

    #[test]
    fn test_left_to_right_indices_across_frame() {
        let mut pipeline = AnalysisPipeline::new(PlaymetricsConfig::default());
        // Detections arrive unordered; ids follow left-to-right rank
        pipeline.process_frame(&frame(0.0, vec![det(500.0, 0.9, 0), det(10.0, 0.9, 0)]));
        pipeline.process_frame(&frame(1.0, vec![det(30.0, 0.9, 0), det(520.0, 0.9, 0)]));

        assert_eq!(pipeline.aggregator().player_ids(), vec![0, 1]);
        // Player 0 is always the leftmost detection
        let record = pipeline.aggregator().record(0).unwrap();
        assert_eq!(record.positions().len(), 2);
        assert!(record.positions()[0].x < 100.0);
        assert!(record.positions()[1].x < 100.0);
    }

    #[test]
    fn test_sub_second_frames_collapse_per_player() {
        let mut pipeline = AnalysisPipeline::new(PlaymetricsConfig::default());
        // 5 frames within the same truncated second
        for i in 0..5 {
            pipeline.process_frame(&frame(0.1 + i as f64 * 0.15, vec![det(10.0, 0.9, 0)]));
        }

        assert_eq!(pipeline.frames_processed(), 5);
        assert_eq!(
            pipeline.aggregator().record(0).unwrap().positions().len(),
            1
        );
    }

    #[test]
    fn test_pose_timeline_recorded() {
        let mut pipeline = AnalysisPipeline::new(PlaymetricsConfig::default());
        let mut keypoints = Keypoints::new();
        keypoints.insert("left_knee".to_string(), (10.0, 100.0));
        keypoints.insert("left_ankle".to_string(), (10.0, 130.0));

        pipeline.process_frame(&ObservedFrame {
            timestamp: 0.5,
            detections: vec![det(10.0, 0.9, 0)],
            keypoints: Some(keypoints),
        });

        let report = pipeline.into_report("synthetic");
        let labels = report.poses.get("0.5").unwrap();
        assert_eq!(labels.get(&0), Some(&PoseLabel::Crouching));
        assert_eq!(report.players.len(), 1);
        assert!(!report.run_id.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_capture_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let capture_path = dir.path().join("capture.json");

        let frames = vec![
            frame(0.0, vec![det(0.0, 0.9, 0)]),
            frame(1.0, vec![det(100.0, 0.9, 0)]),
            frame(2.0, vec![det(100.0, 0.9, 0)]),
        ];
        std::fs::write(&capture_path, serde_json::to_string(&frames).unwrap()).unwrap();

        let report = analyze_capture(PlaymetricsConfig::default(), &capture_path)
            .await
            .unwrap();

        assert_eq!(report.players.len(), 1);
        let metrics = &report.players[0];
        assert_eq!(metrics.move_count, 1);
        assert_eq!(metrics.stop_count, 1);
        // 100px at 10/1200 m/px rounds to 0.83
        assert_eq!(metrics.total_distance_meters, 0.83);
    }
}
