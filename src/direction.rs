#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use bevy_math::IVec2;

// Grid rows are stored top to bottom, so `y` grows southward.
pub const NORTH: IVec2 = IVec2 { x: 0, y: -1 };
pub const SOUTH: IVec2 = IVec2 { x: 0, y: 1 };
pub const WEST: IVec2 = IVec2 { x: -1, y: 0 };
pub const EAST: IVec2 = IVec2 { x: 1, y: 0 };

/// Neighbor visiting order for 4-connected cells. The adjacency builder and
/// every search in the crate use this order, which keeps tie-breaking
/// deterministic.
pub const CARDINALS: [IVec2; 4] = [NORTH, SOUTH, WEST, EAST];

/// Offsets of the eight cells surrounding a 3×3 block center.
pub const SURROUNDING: [IVec2; 8] = [
    IVec2 { x: -1, y: -1 },
    IVec2 { x: 0, y: -1 },
    IVec2 { x: 1, y: -1 },
    IVec2 { x: -1, y: 0 },
    IVec2 { x: 1, y: 0 },
    IVec2 { x: -1, y: 1 },
    IVec2 { x: 0, y: 1 },
    IVec2 { x: 1, y: 1 },
];

/// A cardinal direction in the grid plane.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    /// Returns the unit vector for this direction.
    #[inline]
    #[must_use]
    pub fn unit(&self) -> IVec2 {
        match self {
            Direction::North => NORTH,
            Direction::South => SOUTH,
            Direction::West => WEST,
            Direction::East => EAST,
        }
    }

    /// Move a point in this direction by the given amount.
    #[inline]
    #[must_use]
    pub fn move_point(&self, point: IVec2, by: i32) -> IVec2 {
        point + self.unit() * by
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bevy_math::ivec2;

    #[test]
    fn test_unit() {
        assert_eq!(Direction::North.unit(), ivec2(0, -1));
        assert_eq!(Direction::South.unit(), ivec2(0, 1));
        assert_eq!(Direction::West.unit(), ivec2(-1, 0));
        assert_eq!(Direction::East.unit(), ivec2(1, 0));
    }

    #[test]
    fn test_move_point() {
        assert_eq!(Direction::East.move_point(ivec2(2, 3), 2), ivec2(4, 3));
        assert_eq!(Direction::North.move_point(ivec2(2, 3), 1), ivec2(2, 2));
    }
}
