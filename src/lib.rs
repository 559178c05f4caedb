pub mod config;
pub mod detection;
pub mod error;
pub mod identity;
pub mod motion;
pub mod pipeline;
pub mod report;

pub use config::{MotionConfig, PipelineConfig, PlaymetricsConfig, ReportConfig};
pub use detection::{Detection, Keypoints, ObservedFrame};
pub use error::{PlaymetricsError, Result};
pub use identity::{IdentityAssigner, LeftToRightAssigner};
pub use motion::{MotionAggregator, MotionPattern, MotionState, PlayerMotionRecord, PoseLabel, PositionSample};
pub use pipeline::{analyze_capture, load_capture, AnalysisPipeline};
pub use report::{build_player_metrics, PlayerMetrics, PoseTimeline, SessionReport};
