use crate::error::{PlaymetricsError, Result};
use crate::motion::{MotionAggregator, PoseLabel};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Final per-player metrics, one record per player id.
///
/// Field names and 2-decimal rounding match the downstream visualization
/// contract; do not rename without updating the plotting step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerMetrics {
    pub player_id: u32,
    pub total_distance_meters: f64,
    pub ave_speed_m_s: f64,
    pub deceleration_rate_m_s: f64,
    pub stop_count: u32,
    pub move_count: u32,
    pub motion_rate_variation: f64,
    pub distance_per_motion: f64,
}

/// Pose label per player at each processed timestamp. Timestamps are kept as
/// their decimal string form so the JSON map keys stay stable and ordered.
pub type PoseTimeline = BTreeMap<String, BTreeMap<u32, PoseLabel>>;

/// Everything a single analysis run produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Unique id for this run
    pub run_id: String,
    /// When the report was generated (RFC 3339)
    pub generated_at: chrono::DateTime<chrono::Utc>,
    /// Path of the capture file that was analyzed
    pub source: String,
    pub players: Vec<PlayerMetrics>,
    pub poses: PoseTimeline,
}

/// Round to 2 decimal places, matching the output contract
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Build the per-player metric records from a finished aggregation pass
pub fn build_player_metrics(aggregator: &MotionAggregator) -> Vec<PlayerMetrics> {
    aggregator
        .player_ids()
        .into_iter()
        .map(|player_id| {
            let pattern = aggregator.calculate_motion_pattern(player_id);
            PlayerMetrics {
                player_id,
                total_distance_meters: round2(aggregator.calculate_distance(player_id)),
                ave_speed_m_s: round2(aggregator.calculate_average_speed(player_id)),
                deceleration_rate_m_s: round2(aggregator.calculate_deceleration(player_id)),
                stop_count: aggregator.get_stop_count(player_id),
                move_count: aggregator.get_move_count(player_id),
                motion_rate_variation: round2(pattern.motion_rate_variation),
                distance_per_motion: round2(pattern.distance_per_motion),
            }
        })
        .collect()
}

impl SessionReport {
    /// Persist the report under `base_path` as `player_metrics.json` and,
    /// when a pose timeline exists, `player_pose_analysis.json`. Creates the
    /// directory if needed and returns the written paths.
    pub async fn save(&self, base_path: &str, write_pose_timeline: bool) -> Result<Vec<PathBuf>> {
        let base = Path::new(base_path);
        fs::create_dir_all(base).await.map_err(|e| {
            PlaymetricsError::component(
                "report",
                &format!("Failed to create report directory: {}", e),
            )
        })?;

        let mut written = Vec::new();

        let metrics_json = serde_json::to_string_pretty(&self.players)?;
        let metrics_path = base.join("player_metrics.json");
        fs::write(&metrics_path, metrics_json).await?;
        debug!("Saved player metrics to {}", metrics_path.display());
        written.push(metrics_path);

        if write_pose_timeline {
            let poses_json = serde_json::to_string_pretty(&self.poses)?;
            let poses_path = base.join("player_pose_analysis.json");
            fs::write(&poses_path, poses_json).await?;
            debug!("Saved pose timeline to {}", poses_path.display());
            written.push(poses_path);
        }

        let report_json = serde_json::to_string_pretty(self)?;
        let report_path = base.join("session_report.json");
        fs::write(&report_path, report_json).await?;
        written.push(report_path);

        info!(
            "Report for {} players written to {}",
            self.players.len(),
            base.display()
        );
        Ok(written)
    }
}
