pub mod aggregator;
pub mod pose;
pub mod record;

pub use aggregator::{MotionAggregator, MotionPattern};
pub use pose::PoseLabel;
pub use record::{MotionState, PlayerMotionRecord, PositionSample};
