//! Grid occupancy labels and detector outputs.

mod detection;
mod grid_label;
mod label_vector;

pub use detection::*;
pub use grid_label::*;
pub use label_vector::*;

use bbox::Rect;

/// A rectangle tagged with a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label<R, C>
where
    R: Rect,
{
    pub rect: R,
    pub class: C,
}
