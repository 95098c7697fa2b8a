use crate::{common::*, Rect, HW, TLBR};
use opencv::core as core_cv;

impl TryFrom<&core_cv::Rect> for TLBR<i32> {
    type Error = Error;

    fn try_from(from: &core_cv::Rect) -> Result<Self, Self::Error> {
        let core_cv::Rect {
            x: l,
            y: t,
            width: w,
            height: h,
        } = *from;
        Self::try_from_tlhw([t, l, h, w])
    }
}

impl TryFrom<core_cv::Rect> for TLBR<i32> {
    type Error = Error;

    fn try_from(from: core_cv::Rect) -> Result<Self, Self::Error> {
        (&from).try_into()
    }
}

impl From<&TLBR<i32>> for core_cv::Rect {
    fn from(from: &TLBR<i32>) -> Self {
        Self {
            x: from.l(),
            y: from.t(),
            width: from.w(),
            height: from.h(),
        }
    }
}

impl From<TLBR<i32>> for core_cv::Rect {
    fn from(from: TLBR<i32>) -> Self {
        (&from).into()
    }
}

impl TryFrom<core_cv::Size> for HW<i32> {
    type Error = Error;

    fn try_from(from: core_cv::Size) -> Result<Self, Self::Error> {
        let core_cv::Size { width, height } = from;
        Self::try_from_hw([height, width])
    }
}

impl From<&HW<i32>> for core_cv::Size {
    fn from(from: &HW<i32>) -> Self {
        Self {
            width: from.w(),
            height: from.h(),
        }
    }
}

impl From<HW<i32>> for core_cv::Size {
    fn from(from: HW<i32>) -> Self {
        (&from).into()
    }
}
