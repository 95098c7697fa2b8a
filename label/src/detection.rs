use crate::{GridLabel, Label};
use bbox::TLBR;

/// One object reported by the external detector.
///
/// The box is kept as raw corner coordinates in canonical pixel space so that
/// malformed detector output can be carried around and rejected at use time.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub class_id: usize,
    pub confidence: f64,
    /// Corner coordinates `(x1, y1, x2, y2)`.
    pub xyxy: [f64; 4],
}

impl Detection {
    pub fn new(class_id: usize, confidence: f64, xyxy: [f64; 4]) -> Self {
        Self {
            class_id,
            confidence,
            xyxy,
        }
    }

    /// The box, or `None` if it has non-positive width/height or non-finite corners.
    pub fn rect(&self) -> Option<TLBR<f64>> {
        TLBR::from_xyxy(self.xyxy)
    }

    pub fn grid_label(&self) -> GridLabel {
        GridLabel::from_detector_class(self.class_id)
    }

    pub fn to_label(&self) -> Option<Label<TLBR<f64>, GridLabel>> {
        Some(Label {
            rect: self.rect()?,
            class: self.grid_label(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bbox::Rect;

    #[test]
    fn detection_to_label() {
        let det = Detection::new(1, 0.9, [10.0, 20.0, 30.0, 60.0]);
        let label = det.to_label().unwrap();
        assert_eq!(label.class, GridLabel::Bat);
        assert_eq!(label.rect.t(), 20.0);
        assert_eq!(label.rect.l(), 10.0);
        assert_eq!(label.rect.h(), 40.0);
    }

    #[test]
    fn malformed_detection_has_no_label() {
        let det = Detection::new(0, 0.9, [30.0, 20.0, 10.0, 60.0]);
        assert!(det.rect().is_none());
        assert!(det.to_label().is_none());
    }
}
