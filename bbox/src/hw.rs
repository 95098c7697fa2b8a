use crate::common::*;
use std::fmt;

/// Height and width of an image or an image region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HW<T> {
    h: T,
    w: T,
}

impl<T> HW<T>
where
    T: Num + PartialOrd + Copy,
{
    pub fn try_from_hw([h, w]: [T; 2]) -> Result<Self> {
        let zero = T::zero();
        ensure!(
            h >= zero && w >= zero,
            "height and width parameters must be non-negative"
        );
        Ok(Self { h, w })
    }

    pub fn from_hw(hw: [T; 2]) -> Self {
        Self::try_from_hw(hw).unwrap()
    }

    pub fn h(&self) -> T {
        self.h
    }

    pub fn w(&self) -> T {
        self.w
    }

    pub fn hw(&self) -> [T; 2] {
        [self.h, self.w]
    }

    pub fn area(&self) -> T {
        self.h * self.w
    }

    /// The size of one tile when this size is divided into `rows` by `cols` tiles.
    ///
    /// For integers the division truncates, so the tiles may not cover the
    /// whole region.
    pub fn tile(&self, rows: T, cols: T) -> Self {
        Self {
            h: self.h / rows,
            w: self.w / cols,
        }
    }

    /// The size of `rows` by `cols` tiles of this size.
    pub fn repeat(&self, rows: T, cols: T) -> Self {
        Self {
            h: self.h * rows,
            w: self.w * cols,
        }
    }

    /// Check whether both sides are at least as large as `other`'s.
    pub fn covers(&self, other: &Self) -> bool {
        self.h >= other.h && self.w >= other.w
    }
}

/// Formats as `WIDTHxHEIGHT`.
impl<T> fmt::Display for HW<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiles_truncate() {
        let size = HW::from_hw([603, 805]);
        let tile = size.tile(8, 8);
        assert_eq!(tile, HW::from_hw([75, 100]));
        assert_eq!(tile.area(), 7500);
        assert_eq!(tile.repeat(8, 8), HW::from_hw([600, 800]));
        assert_eq!(tile.to_string(), "100x75");
    }

    #[test]
    fn size_covers() {
        let canonical = HW::from_hw([600, 800]);
        assert!(HW::from_hw([600, 800]).covers(&canonical));
        assert!(HW::from_hw([1080, 1920]).covers(&canonical));
        assert!(!HW::from_hw([599, 1920]).covers(&canonical));
        assert!(HW::try_from_hw([-1, 3]).is_err());
    }

    #[test]
    fn float_tiles() {
        let tile = HW::from_hw([600.0, 800.0]).tile(8.0, 8.0);
        assert_eq!(tile.hw(), [75.0, 100.0]);
    }
}
