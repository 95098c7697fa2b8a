use super::Rect;
use crate::common::*;

/// Bounding box in TLBR format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TLBR<T> {
    pub(crate) t: T,
    pub(crate) l: T,
    pub(crate) b: T,
    pub(crate) r: T,
}

impl<T> TLBR<T> {
    pub fn try_cast<V>(self) -> Option<TLBR<V>>
    where
        T: ToPrimitive,
        V: NumCast,
    {
        Some(TLBR {
            t: V::from(self.t)?,
            l: V::from(self.l)?,
            b: V::from(self.b)?,
            r: V::from(self.r)?,
        })
    }

    pub fn cast<V>(self) -> TLBR<V>
    where
        T: ToPrimitive,
        V: NumCast,
    {
        self.try_cast().unwrap()
    }
}

impl TLBR<f64> {
    /// Build a box from corner coordinates `(x1, y1, x2, y2)`.
    ///
    /// Returns `None` if any coordinate is not finite or the box has non-positive
    /// width or height.
    pub fn from_xyxy(xyxy: [f64; 4]) -> Option<Self> {
        let [x1, y1, x2, y2] = xyxy;
        let finite = xyxy.iter().all(|val| val.is_finite());
        (finite && x2 > x1 && y2 > y1).then(|| Self {
            t: y1,
            l: x1,
            b: y2,
            r: x2,
        })
    }
}

impl<T> Rect for TLBR<T>
where
    T: Copy + Num + PartialOrd,
{
    type Type = T;

    fn t(&self) -> Self::Type {
        self.t
    }

    fn l(&self) -> Self::Type {
        self.l
    }

    fn b(&self) -> Self::Type {
        self.b
    }

    fn r(&self) -> Self::Type {
        self.r
    }

    fn h(&self) -> Self::Type {
        self.b - self.t
    }

    fn w(&self) -> Self::Type {
        self.r - self.l
    }

    fn try_from_tlbr(tlbr: [Self::Type; 4]) -> Result<Self> {
        let [t, l, b, r] = tlbr;
        ensure!(b >= t && r >= l, "b >= t and r >= l must hold");

        Ok(Self { t, l, b, r })
    }

    fn try_from_tlhw(tlhw: [Self::Type; 4]) -> Result<Self> {
        let [t, l, h, w] = tlhw;
        let b = t + h;
        let r = l + w;
        Self::try_from_tlbr([t, l, b, r])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xyxy_rejects_degenerate_boxes() {
        assert!(TLBR::from_xyxy([10.0, 10.0, 10.0, 20.0]).is_none());
        assert!(TLBR::from_xyxy([10.0, 30.0, 20.0, 20.0]).is_none());
        assert!(TLBR::from_xyxy([f64::NAN, 0.0, 1.0, 1.0]).is_none());

        let rect = TLBR::from_xyxy([100.0, 50.0, 200.0, 80.0]).unwrap();
        assert_eq!(rect.h(), 30.0);
        assert_eq!(rect.w(), 100.0);
    }

    #[test]
    fn cast_to_float() {
        let rect = TLBR::try_from_tlbr([1, 2, 3, 4]).unwrap();
        let rect: TLBR<f64> = rect.cast();
        assert_eq!(rect.t(), 1.0);
        assert_eq!(rect.r(), 4.0);
    }
}
