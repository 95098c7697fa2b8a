use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

/// The closed set of per-cell classes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[repr(u8)]
pub enum GridLabel {
    #[default]
    None = 0,
    Ball = 1,
    Bat = 2,
    Stump = 3,
}

impl GridLabel {
    /// Map a raw detector class id to a grid label.
    ///
    /// The detector is prompted with the classes "cricket ball", "cricket bat" and
    /// "cricket stump" in this order. Any other id maps to [`GridLabel::None`].
    pub fn from_detector_class(class_id: usize) -> Self {
        match class_id {
            0 => Self::Ball,
            1 => Self::Bat,
            2 => Self::Stump,
            _ => Self::None,
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

impl TryFrom<u8> for GridLabel {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self> {
        let label = match value {
            0 => Self::None,
            1 => Self::Ball,
            2 => Self::Bat,
            3 => Self::Stump,
            _ => bail!("grid label {} is out of range 0..=3", value),
        };
        Ok(label)
    }
}

impl From<GridLabel> for u8 {
    fn from(label: GridLabel) -> Self {
        label.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn detector_class_mapping_is_total() {
        assert_eq!(GridLabel::from_detector_class(0), GridLabel::Ball);
        assert_eq!(GridLabel::from_detector_class(1), GridLabel::Bat);
        assert_eq!(GridLabel::from_detector_class(2), GridLabel::Stump);
        assert_eq!(GridLabel::from_detector_class(3), GridLabel::None);
        assert_eq!(GridLabel::from_detector_class(usize::MAX), GridLabel::None);
    }

    #[test]
    fn value_round_trip() {
        for label in GridLabel::iter() {
            assert_eq!(GridLabel::try_from(label.value()).unwrap(), label);
        }
        assert!(GridLabel::try_from(4).is_err());
    }
}
