use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlaymetricsConfig {
    pub motion: MotionConfig,
    pub pipeline: PipelineConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MotionConfig {
    /// Meters per pixel for cumulative displacement, calibrated against the
    /// visible field width (e.g. 10m field / 1200px frame)
    #[serde(default = "default_distance_scale")]
    pub distance_scale: f64,

    /// Meters per pixel for speed, calibrated against a known player height
    /// (e.g. 1.8m player / 200px bounding box)
    #[serde(default = "default_player_scale")]
    pub player_scale: f64,

    /// Speed in m/s below which a player is considered stopped
    #[serde(default = "default_stop_threshold")]
    pub stop_threshold: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PipelineConfig {
    /// Detection class id accepted as a player
    #[serde(default = "default_target_class_id")]
    pub target_class_id: i64,

    /// Minimum detection confidence accepted by the pipeline
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReportConfig {
    /// Base path for report output
    #[serde(default = "default_report_path")]
    pub path: String,

    /// Write the per-timestamp pose timeline alongside the metrics
    #[serde(default = "default_write_pose_timeline")]
    pub write_pose_timeline: bool,
}

impl PlaymetricsConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("playmetrics.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            // Start with default values
            .set_default("motion.distance_scale", default_distance_scale())?
            .set_default("motion.player_scale", default_player_scale())?
            .set_default("motion.stop_threshold", default_stop_threshold())?
            .set_default("pipeline.target_class_id", default_target_class_id())?
            .set_default("pipeline.min_confidence", default_min_confidence())?
            .set_default("report.path", default_report_path())?
            .set_default("report.write_pose_timeline", default_write_pose_timeline())?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // Add environment variables with PLAYMETRICS_ prefix
            .add_source(Environment::with_prefix("PLAYMETRICS").separator("_"))
            .build()?;

        let config: PlaymetricsConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.motion.distance_scale <= 0.0 {
            return Err(ConfigError::Message(
                "Motion distance_scale must be greater than 0".to_string(),
            ));
        }

        if self.motion.player_scale <= 0.0 {
            return Err(ConfigError::Message(
                "Motion player_scale must be greater than 0".to_string(),
            ));
        }

        if self.motion.stop_threshold < 0.0 {
            return Err(ConfigError::Message(
                "Motion stop_threshold must not be negative".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.pipeline.min_confidence) {
            return Err(ConfigError::Message(
                "Pipeline min_confidence must be between 0 and 1".to_string(),
            ));
        }

        if self.report.path.is_empty() {
            return Err(ConfigError::Message(
                "Report path must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for PlaymetricsConfig {
    fn default() -> Self {
        Self {
            motion: MotionConfig {
                distance_scale: default_distance_scale(),
                player_scale: default_player_scale(),
                stop_threshold: default_stop_threshold(),
            },
            pipeline: PipelineConfig {
                target_class_id: default_target_class_id(),
                min_confidence: default_min_confidence(),
            },
            report: ReportConfig {
                path: default_report_path(),
                write_pose_timeline: default_write_pose_timeline(),
            },
        }
    }
}

// Default value functions
fn default_distance_scale() -> f64 {
    10.0 / 1200.0
}
fn default_player_scale() -> f64 {
    1.8 / 200.0
}
fn default_stop_threshold() -> f64 {
    0.1
}

fn default_target_class_id() -> i64 {
    0
}
fn default_min_confidence() -> f64 {
    0.8
}

fn default_report_path() -> String {
    "./outputs".to_string()
}
fn default_write_pose_timeline() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlaymetricsConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.motion.stop_threshold - 0.1).abs() < f64::EPSILON);
        assert!((config.pipeline.min_confidence - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_validation() {
        let mut config = PlaymetricsConfig::default();

        config.motion.distance_scale = 0.0;
        assert!(config.validate().is_err());

        config.motion.distance_scale = default_distance_scale();
        assert!(config.validate().is_ok());

        config.pipeline.min_confidence = 1.5;
        assert!(config.validate().is_err());

        config.pipeline.min_confidence = 0.5;
        config.report.path = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config =
            PlaymetricsConfig::load_from_file("/nonexistent/playmetrics.toml").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.report.path, "./outputs");
    }
}
