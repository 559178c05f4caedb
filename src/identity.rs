use crate::detection::Detection;

/// Assigns a per-frame player index to a set of detections by reordering them
/// so that slice position equals player id for that frame.
///
/// The default implementation ranks detections left-to-right. Positional rank
/// is NOT stable identity: a player occluded or overtaken between frames will
/// swap ids with their neighbor. A real multi-object tracker can be
/// substituted behind this trait without touching the aggregator.
pub trait IdentityAssigner: Send + Sync {
    fn assign(&self, detections: &mut [Detection]);
}

/// Ranks detections by ascending left edge (bbox x1)
#[derive(Debug, Default, Clone, Copy)]
pub struct LeftToRightAssigner;

impl IdentityAssigner for LeftToRightAssigner {
    fn assign(&self, detections: &mut [Detection]) {
        detections.sort_by(|a, b| {
            a.bbox[0]
                .partial_cmp(&b.bbox[0])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(x1: f64) -> Detection {
        Detection {
            bbox: [x1, 0.0, x1 + 50.0, 100.0],
            confidence: 0.9,
            class_id: 0,
        }
    }

    #[test]
    fn test_left_to_right_ordering() {
        let mut detections = vec![det(300.0), det(10.0), det(150.0)];
        LeftToRightAssigner.assign(&mut detections);

        assert_eq!(detections[0].bbox[0], 10.0);
        assert_eq!(detections[1].bbox[0], 150.0);
        assert_eq!(detections[2].bbox[0], 300.0);
    }

    #[test]
    fn test_nan_left_edge_does_not_panic() {
        let mut detections = vec![det(100.0), det(f64::NAN), det(50.0)];
        LeftToRightAssigner.assign(&mut detections);
        assert_eq!(detections.len(), 3);
    }
}
