use std::fmt::{self, Display};
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A burn rate expressed in tenths of mB/t, always non-negative.
///
/// Keeping the unit in the type prevents a caller from mixing whole mB/t with
/// tenths at a call site (the allocation arithmetic in `scada-kernel` is
/// defined entirely in tenths).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Tenths(u32);

impl Tenths {
    pub const ZERO: Tenths = Tenths(0);

    pub fn new(tenths: u32) -> Self {
        Self(tenths)
    }

    /// Builds from a whole mB/t burn rate, truncating to the nearest tenth.
    pub fn from_mb_per_tick(mb: f64) -> Self {
        Self((mb * 10.0).max(0.0).floor() as u32)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn as_mb_per_tick(self) -> f64 {
        f64::from(self.0) / 10.0
    }

    pub fn min(self, other: Tenths) -> Tenths {
        Tenths(self.0.min(other.0))
    }

    pub fn saturating_sub(self, other: Tenths) -> Tenths {
        Tenths(self.0.saturating_sub(other.0))
    }
}

impl Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

impl Add for Tenths {
    type Output = Tenths;
    fn add(self, rhs: Tenths) -> Tenths {
        Tenths(self.0 + rhs.0)
    }
}

impl AddAssign for Tenths {
    fn add_assign(&mut self, rhs: Tenths) {
        self.0 += rhs.0;
    }
}

impl Sub for Tenths {
    type Output = Tenths;
    fn sub(self, rhs: Tenths) -> Tenths {
        Tenths(self.0 - rhs.0)
    }
}

impl SubAssign for Tenths {
    fn sub_assign(&mut self, rhs: Tenths) {
        self.0 -= rhs.0;
    }
}

impl From<u32> for Tenths {
    fn from(value: u32) -> Self {
        Tenths(value)
    }
}

impl From<Tenths> for u32 {
    fn from(value: Tenths) -> Self {
        value.0
    }
}
