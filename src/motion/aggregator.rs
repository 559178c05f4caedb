use crate::config::MotionConfig;
use crate::detection::Keypoints;
use crate::motion::pose::{self, PoseLabel};
use crate::motion::record::{MotionState, PlayerMotionRecord, PositionSample};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Motion pattern summary for a single player
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MotionPattern {
    /// Population standard deviation of the speed series, in m/s
    pub motion_rate_variation: f64,
    /// Meters covered per Stopped -> Moving transition
    pub distance_per_motion: f64,
}

/// Temporal motion-state aggregation over externally-identified players.
///
/// Ingests one bounding-box sample per player per truncated second, derives
/// speed and displacement from the positional history, and classifies
/// stop/move transitions with hysteresis against a speed threshold. All read
/// queries return neutral defaults for players with no data, so callers never
/// need to pre-check existence.
///
/// Update calls are order-dependent (deduplication and state transitions);
/// callers must serialize them per player.
pub struct MotionAggregator {
    config: MotionConfig,
    records: HashMap<u32, PlayerMotionRecord>,
}

impl MotionAggregator {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            records: HashMap::new(),
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Player ids with at least one accepted sample, ascending
    pub fn player_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.records.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn record(&self, player_id: u32) -> Option<&PlayerMotionRecord> {
        self.records.get(&player_id)
    }

    /// Ingest one positional sample for a player.
    ///
    /// At most one sample is accepted per player per truncated second; calls
    /// landing in an already-sampled second are silently ignored. The first
    /// accepted sample initializes the record in the Stopped state. Subsequent
    /// samples derive speed from the previous position (0 when the elapsed
    /// time is zero or negative) and drive the stop/move state machine.
    pub fn update(&mut self, player_id: u32, bbox: [f64; 4], timestamp: f64) {
        let current_second = timestamp.floor() as i64;
        let record = self.records.entry(player_id).or_default();

        if record.last_sampled_second == Some(current_second) {
            trace!(
                "Player {} already sampled in second {}, skipping",
                player_id,
                current_second
            );
            return;
        }
        record.last_sampled_second = Some(current_second);

        let cx = (bbox[0] + bbox[2]) / 2.0;
        let cy = (bbox[1] + bbox[3]) / 2.0;
        let sample = PositionSample {
            timestamp,
            x: cx,
            y: cy,
        };

        if record.positions.is_empty() {
            debug!(
                "Initializing motion record for player {} at ({:.1}, {:.1})",
                player_id, cx, cy
            );
            record.positions.push(sample);
            return;
        }

        let previous = record.positions[record.positions.len() - 1];
        let distance_pixels = sample.distance_to(&previous);
        let time_diff = timestamp - previous.timestamp;

        let speed = if time_diff > 0.0 {
            distance_pixels / time_diff * self.config.player_scale
        } else {
            0.0
        };

        record.speeds.push(speed);

        if speed < self.config.stop_threshold {
            if record.state == MotionState::Moving {
                record.state = MotionState::Stopped;
                record.stop_count += 1;
                debug!(
                    "Player {} stopped at t={:.2}s (speed {:.3} m/s, stop #{})",
                    player_id, timestamp, speed, record.stop_count
                );
            }
        } else {
            if record.state == MotionState::Stopped {
                record.state = MotionState::Moving;
                record.move_count += 1;
                debug!(
                    "Player {} started moving at t={:.2}s (speed {:.3} m/s, move #{})",
                    player_id, timestamp, speed, record.move_count
                );
            }
            // Every sample classified as Moving contributes, including the
            // one that triggered the transition
            record.motion_distance += distance_pixels * self.config.distance_scale;
        }

        record.positions.push(sample);
    }

    /// Append a pose sample for a player. No deduplication, no validation;
    /// the pose history is created lazily alongside the motion record.
    pub fn update_pose(&mut self, player_id: u32, keypoints: Keypoints, timestamp: f64) {
        let record = self.records.entry(player_id).or_default();
        record.pose_samples.push((timestamp, keypoints));
    }

    /// Classify the player's most recent pose sample
    pub fn analyze_pose(&self, player_id: u32) -> PoseLabel {
        match self.records.get(&player_id).and_then(|r| r.latest_pose()) {
            Some(keypoints) => pose::classify(keypoints),
            None => PoseLabel::Unknown,
        }
    }

    /// Total displacement in meters across all stored positions, regardless of
    /// motion state. Distinct from the Moving-only motion distance reported by
    /// `calculate_motion_pattern`.
    pub fn calculate_distance(&self, player_id: u32) -> f64 {
        let Some(record) = self.records.get(&player_id) else {
            return 0.0;
        };

        let distance_pixels: f64 = record
            .positions
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum();

        distance_pixels * self.config.distance_scale
    }

    /// Arithmetic mean of the speed series in m/s, 0 when empty
    pub fn calculate_average_speed(&self, player_id: u32) -> f64 {
        match self.records.get(&player_id) {
            Some(record) if !record.speeds.is_empty() => {
                record.speeds.iter().sum::<f64>() / record.speeds.len() as f64
            }
            _ => 0.0,
        }
    }

    /// Variation in motion rate and distance covered per motion event
    pub fn calculate_motion_pattern(&self, player_id: u32) -> MotionPattern {
        let Some(record) = self.records.get(&player_id) else {
            return MotionPattern::default();
        };

        let motion_rate_variation = population_stddev(&record.speeds);
        let distance_per_motion = if record.move_count > 0 {
            record.motion_distance / record.move_count as f64
        } else {
            0.0
        };

        MotionPattern {
            motion_rate_variation,
            distance_per_motion,
        }
    }

    /// Mean deceleration in m/s² over consecutive speed samples.
    ///
    /// Speed `i` describes the transition from position `i` to `i + 1`, so the
    /// time base pairs position timestamps `i - 1` and `i` against speeds
    /// `i - 1` and `i`. Pairs with a non-positive time delta are skipped.
    pub fn calculate_deceleration(&self, player_id: u32) -> f64 {
        let Some(record) = self.records.get(&player_id) else {
            return 0.0;
        };

        let mut decelerations = Vec::new();
        for i in 1..record.speeds.len() {
            let speed_diff = record.speeds[i - 1] - record.speeds[i];
            let time_diff = record.positions[i].timestamp - record.positions[i - 1].timestamp;

            if time_diff > 0.0 {
                decelerations.push(speed_diff / time_diff);
            }
        }

        if decelerations.is_empty() {
            0.0
        } else {
            decelerations.iter().sum::<f64>() / decelerations.len() as f64
        }
    }

    pub fn get_stop_count(&self, player_id: u32) -> u32 {
        self.records
            .get(&player_id)
            .map(|r| r.stop_count)
            .unwrap_or(0)
    }

    pub fn get_move_count(&self, player_id: u32) -> u32 {
        self.records
            .get(&player_id)
            .map(|r| r.move_count)
            .unwrap_or(0)
    }

    pub fn get_current_state(&self, player_id: u32) -> MotionState {
        self.records
            .get(&player_id)
            .map(|r| r.state)
            .unwrap_or(MotionState::Stopped)
    }
}

fn population_stddev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
