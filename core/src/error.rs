use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid board size {width}x{height}")]
    InvalidSize { width: i64, height: i64 },
    #[error("Too many mines, {mines} requested for {cells} cells")]
    TooManyMines { mines: i64, cells: i64 },
    #[error("Mine count cannot be negative")]
    NegativeMines,
    #[error("Invalid coordinates")]
    InvalidCoords,
}

pub type Result<T> = core::result::Result<T, GameError>;
