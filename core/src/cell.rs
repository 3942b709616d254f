use serde::{Deserialize, Serialize};

use crate::*;

/// Player-set marker on a hidden cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellFlag {
    None,
    Flagged,
    /// Kept for the three-state cycle, which is currently disabled.
    Questioned,
}

impl CellFlag {
    /// Next marker when the player cycles the flag. Only `None` and `Flagged` alternate.
    pub const fn cycled(self) -> Self {
        match self {
            Self::None => Self::Flagged,
            Self::Flagged => Self::None,
            Self::Questioned => Self::None,
        }
    }

    pub const fn is_set(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl Default for CellFlag {
    fn default() -> Self {
        Self::None
    }
}

/// One grid position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    id: CellCount,
    x: Coord,
    y: Coord,
    pub(crate) is_mine: bool,
    pub(crate) is_revealed: bool,
    pub(crate) is_killing_mine: bool,
    pub(crate) flag: CellFlag,
    pub(crate) nearby_mine_count: u8,
}

impl Cell {
    pub(crate) const fn new(id: CellCount, (x, y): Coord2) -> Self {
        Self {
            id,
            x,
            y,
            is_mine: false,
            is_revealed: false,
            is_killing_mine: false,
            flag: CellFlag::None,
            nearby_mine_count: 0,
        }
    }

    /// Row-major index, `y * width + x`.
    pub const fn id(&self) -> CellCount {
        self.id
    }

    pub const fn x(&self) -> Coord {
        self.x
    }

    pub const fn y(&self) -> Coord {
        self.y
    }

    pub const fn coords(&self) -> Coord2 {
        (self.x, self.y)
    }

    pub const fn is_mine(&self) -> bool {
        self.is_mine
    }

    pub const fn is_revealed(&self) -> bool {
        self.is_revealed
    }

    pub const fn is_killing_mine(&self) -> bool {
        self.is_killing_mine
    }

    pub const fn flag(&self) -> CellFlag {
        self.flag
    }

    pub const fn is_flagged(&self) -> bool {
        matches!(self.flag, CellFlag::Flagged)
    }

    /// Number of mines among the adjacent cells, fixed once the board is populated.
    pub const fn nearby_mine_count(&self) -> u8 {
        self.nearby_mine_count
    }

    /// Whether a reveal could still open this cell.
    pub const fn is_revealable(&self) -> bool {
        !self.is_revealed && !self.flag.is_set()
    }
}
