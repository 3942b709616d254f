use ndarray::{Array2, Zip};
use rand::Rng;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};

use crate::*;

/// Grid of one round: cells, mine placement and the reveal rules.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Board {
    level: Level,
    cells: Array2<Cell>,
    revealed_count: CellCount,
    flagged_count: CellCount,
}

impl Board {
    /// Lays out the grid and places `level.mines()` mines uniformly at random.
    pub fn generate<R: Rng>(level: Level, rng: &mut R) -> Self {
        let mut board = Self::layout(level);

        // sample without replacement from the cells that are still free
        let mut free_cells: Vec<CellCount> = (0..level.total_cells()).collect();
        for _ in 0..level.mines() {
            let drawn = free_cells.swap_remove(rng.random_range(0..free_cells.len()));
            let coords = board.coords_of(drawn);
            board.cells[coords.to_nd_index()].is_mine = true;
        }

        board.count_nearby_mines();
        log::debug!(
            "Generated {}x{} board with {} mines",
            level.width(),
            level.height(),
            level.mines()
        );
        board
    }

    /// Builds a board with mines at exactly the given coordinates. Duplicates are collapsed.
    pub fn from_mine_coords((width, height): Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let empty = Level::new(width, height, 0)?;

        let mut mines = HashSet::new();
        for &coords in mine_coords {
            if coords.0 >= width || coords.1 >= height {
                return Err(GameError::InvalidCoords);
            }
            mines.insert(coords);
        }
        if mines.len() != mine_coords.len() {
            log::warn!(
                "Duplicate mine coordinates collapsed, requested {} but placed {}",
                mine_coords.len(),
                mines.len()
            );
        }

        // mines.len() is bounded by the cell count, which fits a CellCount
        let mine_count = CellCount::try_from(mines.len()).unwrap_or(CellCount::MAX);
        let level = Level::new(width, height, mine_count)?;

        let mut board = Self::layout(empty);
        board.level = level;
        for coords in mines {
            board.cells[coords.to_nd_index()].is_mine = true;
        }
        board.count_nearby_mines();
        Ok(board)
    }

    fn layout(level: Level) -> Self {
        let (width, height) = level.size();
        let cells = Array2::from_shape_fn(
            (usize::from(height), usize::from(width)),
            |(row, col)| {
                let (x, y) = (col as Coord, row as Coord);
                Cell::new(mult(y, width) + CellCount::from(x), (x, y))
            },
        );
        Self {
            level,
            cells,
            revealed_count: 0,
            flagged_count: 0,
        }
    }

    fn count_nearby_mines(&mut self) {
        let counts = Array2::from_shape_fn(self.cells.dim(), |(row, col)| {
            self.adjacent_mine_count((col as Coord, row as Coord))
        });
        Zip::from(&mut self.cells)
            .and(&counts)
            .for_each(|cell, &count| cell.nearby_mine_count = count);
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn width(&self) -> Coord {
        self.level.width()
    }

    pub fn height(&self) -> Coord {
        self.level.height()
    }

    pub fn size(&self) -> Coord2 {
        self.level.size()
    }

    pub fn mine_count(&self) -> CellCount {
        self.level.mines()
    }

    pub fn total_cells(&self) -> CellCount {
        self.level.total_cells()
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.level.safe_cells()
    }

    /// Safe cells revealed so far.
    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    /// Mines minus flags. Goes negative when the player places more flags than there are mines.
    pub fn remaining_unchecked_count(&self) -> isize {
        (self.level.mines() as isize) - (self.flagged_count as isize)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (width, height) = self.size();
        if coords.0 < width && coords.1 < height {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn get(&self, coords: Coord2) -> Option<&Cell> {
        self.cells.get(coords.to_nd_index())
    }

    pub fn cell_by_id(&self, id: CellCount) -> Option<&Cell> {
        if id < self.total_cells() {
            self.get(self.coords_of(id))
        } else {
            None
        }
    }

    fn coords_of(&self, id: CellCount) -> Coord2 {
        let width = CellCount::from(self.width());
        // both quotient and remainder are below the dimensions, which fit a Coord
        ((id % width) as Coord, (id / width) as Coord)
    }

    /// All cells in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Rows from top to bottom, each from left to right.
    pub fn rows(&self) -> impl Iterator<Item = impl Iterator<Item = &Cell>> {
        self.cells.rows().into_iter().map(|row| row.into_iter())
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.cells.iter_neighbors(coords)
    }

    pub fn neighbor_cells(&self, coords: Coord2) -> impl Iterator<Item = &Cell> {
        self.iter_neighbors(coords)
            .map(|pos| &self.cells[pos.to_nd_index()])
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        // at most eight neighbours
        self.neighbor_cells(coords)
            .filter(|cell| cell.is_mine)
            .count() as u8
    }

    /// Whether every safe cell has been revealed.
    pub fn is_won(&self) -> bool {
        self.revealed_count == self.level.safe_cells()
    }

    pub(crate) fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;
        let cell = self.cells[coords.to_nd_index()];

        if !cell.is_revealable() {
            return Ok(RevealOutcome::NoChange);
        }

        if cell.is_mine {
            self.detonate(coords);
            return Ok(RevealOutcome::HitMine);
        }

        self.open(coords);
        log::debug!(
            "Revealed cell at {:?}, nearby mines: {}",
            coords,
            cell.nearby_mine_count
        );
        if cell.nearby_mine_count == 0 {
            self.flood_reveal(coords);
        }

        Ok(if self.check_win() {
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        })
    }

    pub(crate) fn cycle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.validate_coords(coords)?;
        let cell = &mut self.cells[coords.to_nd_index()];

        if cell.is_revealed {
            return Ok(MarkOutcome::NoChange);
        }

        let previous = cell.flag;
        cell.flag = previous.cycled();
        match (previous, cell.flag) {
            (CellFlag::Flagged, _) => self.flagged_count -= 1,
            (_, CellFlag::Flagged) => self.flagged_count += 1,
            _ => {}
        }
        log::debug!("Flag at {:?}: {:?} -> {:?}", coords, previous, cell.flag);

        Ok(if self.check_win() {
            MarkOutcome::Won
        } else {
            MarkOutcome::Changed
        })
    }

    fn open(&mut self, coords: Coord2) {
        self.cells[coords.to_nd_index()].is_revealed = true;
        self.revealed_count += 1;
    }

    /// Neighbours a flood may open: hidden, unflagged and not a mine.
    fn floodable_neighbors(&self, coords: Coord2) -> impl Iterator<Item = Coord2> + '_ {
        self.iter_neighbors(coords).filter(|&pos| {
            let cell = &self.cells[pos.to_nd_index()];
            !cell.is_mine && cell.is_revealable()
        })
    }

    /// Opens the region around a zero cell. A cell is marked revealed when dequeued, so a
    /// second queue entry for it fails the revealable check. Only zero cells enqueue their
    /// neighbours. The visited set just keeps coordinates from being queued again.
    fn flood_reveal(&mut self, origin: Coord2) {
        let mut visited = HashSet::from([origin]);
        let mut to_visit: VecDeque<_> = self.floodable_neighbors(origin).collect();
        log::trace!(
            "Starting flood reveal from {:?}, initial neighbors: {:?}",
            origin,
            to_visit
        );

        while let Some(visit_coords) = to_visit.pop_front() {
            if !visited.insert(visit_coords) {
                continue;
            }

            let cell = self.cells[visit_coords.to_nd_index()];
            if cell.is_mine || !cell.is_revealable() {
                log::trace!("Skipping cell at {:?}", visit_coords);
                continue;
            }

            self.open(visit_coords);
            log::trace!(
                "Flood revealed cell at {:?}, nearby mines: {}",
                visit_coords,
                cell.nearby_mine_count
            );

            if cell.nearby_mine_count == 0 {
                to_visit.extend(
                    self.floodable_neighbors(visit_coords)
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }
    }

    /// Marks the struck mine and uncovers every mine on the board, flags are left alone.
    fn detonate(&mut self, coords: Coord2) {
        let struck = &mut self.cells[coords.to_nd_index()];
        struck.is_revealed = true;
        struck.is_killing_mine = true;
        log::debug!("Hit mine at {:?}", coords);

        self.cells
            .iter_mut()
            .filter(|cell| cell.is_mine)
            .for_each(|cell| cell.is_revealed = true);
    }

    /// Once every safe cell is open, flags the remaining mines and reports the win.
    fn check_win(&mut self) -> bool {
        if !self.is_won() {
            return false;
        }

        for cell in self.cells.iter_mut().filter(|cell| cell.is_mine) {
            if !cell.is_flagged() {
                cell.flag = CellFlag::Flagged;
                self.flagged_count += 1;
            }
        }
        true
    }
}
