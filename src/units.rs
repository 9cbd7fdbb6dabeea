use derive_more::{Add, AddAssign, Display, Div, From, Into, Mul, MulAssign, Sub, SubAssign, Sum};
use serde::{Deserialize, Serialize};

/// A length in canvas pixels. The canvas is rasterised 1:1, so one `Px` is one
/// pixel of the exported PNG.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    PartialOrd,
    Add,
    AddAssign,
    Sub,
    SubAssign,
    Mul,
    MulAssign,
    Div,
    Sum,
    Display,
    From,
    Into,
    Serialize,
    Deserialize,
)]
#[display("{_0}")]
#[serde(transparent)]
pub struct Px(pub f32);

impl Px {
    /// The nearest whole pixel count, clamped at zero
    pub fn whole(self) -> u32 {
        self.0.max(0.0).round() as u32
    }
}

impl From<u32> for Px {
    fn from(value: u32) -> Self {
        Px(value as f32)
    }
}
