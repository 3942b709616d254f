use serde::{Deserialize, Serialize};

use crate::*;

/// Board shape of a round. Only valid configurations can be built: at least one cell in each
/// direction and at least one cell left without a mine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LevelRequest")]
pub struct Level {
    width: Coord,
    height: Coord,
    mines: CellCount,
}

impl Level {
    pub const BEGINNER: Self = Self::new_unchecked(9, 9, 12);
    pub const INTERMEDIATE: Self = Self::new_unchecked(16, 16, 40);
    pub const EXPERT: Self = Self::new_unchecked(30, 16, 99);

    const fn new_unchecked(width: Coord, height: Coord, mines: CellCount) -> Self {
        Self {
            width,
            height,
            mines,
        }
    }

    pub fn new(width: Coord, height: Coord, mines: CellCount) -> Result<Self> {
        LevelRequest {
            width: width.into(),
            height: height.into(),
            mines: mines.into(),
        }
        .try_into()
    }

    pub const fn width(&self) -> Coord {
        self.width
    }

    pub const fn height(&self) -> Coord {
        self.height
    }

    pub const fn size(&self) -> Coord2 {
        (self.width, self.height)
    }

    pub const fn mines(&self) -> CellCount {
        self.mines
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.width, self.height)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.mines
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::BEGINNER
    }
}

/// Unvalidated level as typed into a customization dialog.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRequest {
    pub width: i64,
    pub height: i64,
    pub mines: i64,
}

impl TryFrom<LevelRequest> for Level {
    type Error = GameError;

    fn try_from(request: LevelRequest) -> Result<Self> {
        let LevelRequest {
            width,
            height,
            mines,
        } = request;

        let (Ok(w), Ok(h)) = (Coord::try_from(width), Coord::try_from(height)) else {
            return Err(GameError::InvalidSize { width, height });
        };
        if w == 0 || h == 0 {
            return Err(GameError::InvalidSize { width, height });
        }

        if mines < 0 {
            return Err(GameError::NegativeMines);
        }

        let cells = mult(w, h);
        match CellCount::try_from(mines) {
            Ok(m) if m < cells => Ok(Self::new_unchecked(w, h, m)),
            _ => Err(GameError::TooManyMines {
                mines,
                cells: cells.into(),
            }),
        }
    }
}

/// Named levels offered by the game menu.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Beginner,
    Intermediate,
    Expert,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Self::Beginner, Self::Intermediate, Self::Expert];

    pub const fn level(self) -> Level {
        match self {
            Self::Beginner => Level::BEGINNER,
            Self::Intermediate => Level::INTERMEDIATE,
            Self::Expert => Level::EXPERT,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Expert => "expert",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(name))
    }
}

impl From<Preset> for Level {
    fn from(preset: Preset) -> Self {
        preset.level()
    }
}
