use serde::{Deserialize, Serialize};

/// Identifies a single reactor unit within the facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// A priority group, 1..4, or `Independent` (unit 0 — not facility-controlled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupId {
    Independent,
    Group(u8),
}

impl GroupId {
    /// Builds a `GroupId` from the wire/config representation (0 = independent).
    ///
    /// Returns `None` for values outside `0..=4`.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(GroupId::Independent),
            1..=4 => Some(GroupId::Group(index)),
            _ => None,
        }
    }

    pub fn to_index(self) -> u8 {
        match self {
            GroupId::Independent => 0,
            GroupId::Group(n) => n,
        }
    }

    /// The four facility-controlled groups in priority order (1 is highest).
    pub fn all_controlled() -> [GroupId; 4] {
        [
            GroupId::Group(1),
            GroupId::Group(2),
            GroupId::Group(3),
            GroupId::Group(4),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_independent() {
        assert_eq!(GroupId::from_index(0), Some(GroupId::Independent));
    }

    #[test]
    fn out_of_range_is_none() {
        assert_eq!(GroupId::from_index(5), None);
    }

    #[test]
    fn round_trips_index() {
        for i in 0..=4u8 {
            assert_eq!(GroupId::from_index(i).unwrap().to_index(), i);
        }
    }
}
