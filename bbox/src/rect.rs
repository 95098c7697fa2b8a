use super::TLBR;
use crate::common::*;

/// The generic rectangle.
pub trait Rect {
    type Type;

    fn t(&self) -> Self::Type;
    fn l(&self) -> Self::Type;
    fn b(&self) -> Self::Type;
    fn r(&self) -> Self::Type;
    fn h(&self) -> Self::Type;
    fn w(&self) -> Self::Type;

    fn try_from_tlbr(tlbr: [Self::Type; 4]) -> Result<Self>
    where
        Self: Sized;

    fn try_from_tlhw(tlhw: [Self::Type; 4]) -> Result<Self>
    where
        Self: Sized;
}

pub trait RectNum: Rect
where
    Self::Type: Num + PartialOrd + Copy,
{
    fn from_tlbr(tlbr: [Self::Type; 4]) -> Self
    where
        Self: Sized,
    {
        Self::try_from_tlbr(tlbr).unwrap()
    }

    fn from_tlhw(tlhw: [Self::Type; 4]) -> Self
    where
        Self: Sized,
    {
        Self::try_from_tlhw(tlhw).unwrap()
    }

    fn tlbr(&self) -> [Self::Type; 4] {
        [self.t(), self.l(), self.b(), self.r()]
    }

    fn tlhw(&self) -> [Self::Type; 4] {
        [self.t(), self.l(), self.h(), self.w()]
    }

    fn hw(&self) -> [Self::Type; 2] {
        [self.h(), self.w()]
    }

    fn to_tlbr(&self) -> TLBR<Self::Type> {
        TLBR {
            t: self.t(),
            l: self.l(),
            b: self.b(),
            r: self.r(),
        }
    }

    fn area(&self) -> <Self::Type as Mul<Self::Type>>::Output
    where
        Self::Type: Mul<Self::Type>,
    {
        self.h() * self.w()
    }

    /// Compute the overlapping region, or `None` if the rectangles only touch or are disjoint.
    fn intersect_with<R>(&self, other: &R) -> Option<TLBR<Self::Type>>
    where
        R: Rect<Type = Self::Type>,
    {
        let t = partial_max(self.t(), other.t());
        let l = partial_max(self.l(), other.l());
        let b = partial_min(self.b(), other.b());
        let r = partial_min(self.r(), other.r());
        (b > t && r > l).then(|| TLBR { t, l, b, r })
    }

    fn intersection_area_with<R>(&self, other: &R) -> Self::Type
    where
        R: Rect<Type = Self::Type>,
    {
        self.intersect_with(other)
            .map(|rect| rect.h() * rect.w())
            .unwrap_or_else(Self::Type::zero)
    }

    /// Check whether the point `(y, x)` lies in the half-open region `[t, b) × [l, r)`.
    fn contains_point(&self, y: Self::Type, x: Self::Type) -> bool {
        self.t() <= y && y < self.b() && self.l() <= x && x < self.r()
    }
}

impl<T> RectNum for T
where
    T: Rect,
    T::Type: Num + PartialOrd + Copy,
{
}

fn partial_max<T: PartialOrd>(lhs: T, rhs: T) -> T {
    if rhs > lhs {
        rhs
    } else {
        lhs
    }
}

fn partial_min<T: PartialOrd>(lhs: T, rhs: T) -> T {
    if rhs < lhs {
        rhs
    } else {
        lhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn intersection_of_overlapping_boxes() {
        let lhs = TLBR::from_tlbr([0.0, 0.0, 10.0, 10.0]);
        let rhs = TLBR::from_tlbr([5.0, 2.0, 20.0, 8.0]);
        let inter = lhs.intersect_with(&rhs).unwrap();
        assert_eq!(inter.tlbr(), [5.0, 2.0, 10.0, 8.0]);
        assert_abs_diff_eq!(lhs.intersection_area_with(&rhs), 30.0);
    }

    #[test]
    fn touching_boxes_do_not_intersect() {
        let lhs = TLBR::from_tlbr([0, 0, 75, 100]);
        let rhs = TLBR::from_tlbr([0, 100, 75, 200]);
        assert!(lhs.intersect_with(&rhs).is_none());
        assert_eq!(lhs.intersection_area_with(&rhs), 0);
    }

    #[test]
    fn integer_area() {
        let rect = TLBR::from_tlhw([75, 100, 75, 100]);
        assert_eq!(rect.area(), 7500);
        assert_eq!(rect.tlbr(), [75, 100, 150, 200]);
        assert!(rect.contains_point(75, 100));
        assert!(!rect.contains_point(150, 100));
    }
}
