use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

/// Valid transitions:
/// - Stopped -> Running (start)
/// - any -> Stopped (stop, also the first half of restart)
/// - Running -> Won
/// - Running -> Failed
/// - any -> Running (restart)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Stopped,
    Running,
    Won,
    Failed,
}

impl GameState {
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    /// Round ended, only a restart leaves this state.
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Failed)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::Stopped
    }
}

/// Life cycle of the game: owns the level, the current round's board and its timer.
///
/// Player commands issued while the round is not running are absorbed without effect.
#[derive(Clone, Debug)]
pub struct Game {
    level: Level,
    board: Board,
    state: GameState,
    elapsed_seconds: u32,
    timer: RoundTimer,
    rng: SmallRng,
}

impl Game {
    /// Starts a beginner round with a random seed.
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_level_and_seed(Level::default(), seed)
    }

    pub fn with_level(level: Level) -> Self {
        Self::with_level_and_seed(level, rand::random())
    }

    pub fn with_level_and_seed(level: Level, seed: u64) -> Self {
        log::debug!("seed: {}", seed);
        let mut rng = SmallRng::seed_from_u64(seed);
        let board = Board::generate(level, &mut rng);
        Self::running(level, board, rng)
    }

    /// Runs a round on a prepared board. Restarts generate random boards of the same level.
    pub fn with_board(board: Board) -> Self {
        Self::running(board.level(), board, SmallRng::seed_from_u64(rand::random()))
    }

    fn running(level: Level, board: Board, rng: SmallRng) -> Self {
        Self {
            level,
            board,
            state: GameState::Running,
            elapsed_seconds: 0,
            timer: RoundTimer::default(),
            rng,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Token of the running timer, to be passed back with each tick.
    pub fn timer_token(&self) -> Option<TimerToken> {
        self.timer.token()
    }

    /// Begins a new round from the current level unless one is already running.
    pub fn start(&mut self) {
        if self.state.is_running() {
            return;
        }

        self.elapsed_seconds = 0;
        self.board = Board::generate(self.level, &mut self.rng);
        self.state = GameState::Running;
        log::debug!("Round started: {:?}", self.level);
    }

    pub fn stop(&mut self) {
        self.timer.cancel();
        self.state = GameState::Stopped;
    }

    /// Always deals a fresh board, even in the middle of a round.
    pub fn restart(&mut self) {
        self.stop();
        self.start();
    }

    pub fn set_level(&mut self, level: Level) {
        self.level = level;
        self.restart();
    }

    fn fail(&mut self) {
        self.stop();
        self.state = GameState::Failed;
        log::debug!("Round lost after {}s", self.elapsed_seconds);
    }

    fn win(&mut self) {
        self.stop();
        self.state = GameState::Won;
        log::debug!("Round won after {}s", self.elapsed_seconds);
    }

    /// Starts the round timer. Returns `None` and leaves the timer alone unless the round is
    /// running.
    pub fn start_timer(&mut self) -> Option<TimerToken> {
        self.start_timer_at(Instant::now())
    }

    pub fn start_timer_at(&mut self, now: Instant) -> Option<TimerToken> {
        if !self.state.is_running() {
            log::trace!("Timer not started, round is {:?}", self.state);
            return None;
        }
        log::debug!("Timer started");
        Some(self.timer.start_at(now))
    }

    /// Recomputes the elapsed time, returns whether the readout changed.
    pub fn tick(&mut self, token: TimerToken) -> bool {
        self.tick_at(token, Instant::now())
    }

    pub fn tick_at(&mut self, token: TimerToken, now: Instant) -> bool {
        match self.timer.elapsed_secs_at(token, now) {
            Some(secs) if secs != self.elapsed_seconds => {
                self.elapsed_seconds = secs;
                true
            }
            Some(_) => false,
            None => {
                log::trace!("Ignoring tick for {:?}", token);
                false
            }
        }
    }

    /// Pointer pressed on a cell. The first press on a hidden, unflagged cell of a running
    /// round starts the timer.
    pub fn press(&mut self, coords: Coord2) -> Option<TimerToken> {
        let pressable = self.state.is_running()
            && !self.timer.is_running()
            && self.board.get(coords).is_some_and(Cell::is_revealable);

        if !pressable {
            return None;
        }
        self.start_timer()
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.board.validate_coords(coords)?;
        if !self.state.is_running() {
            return Ok(RevealOutcome::NoChange);
        }

        let outcome = self.board.reveal(coords)?;
        match outcome {
            RevealOutcome::HitMine => self.fail(),
            RevealOutcome::Won => self.win(),
            RevealOutcome::Revealed | RevealOutcome::NoChange => {}
        }
        Ok(outcome)
    }

    pub fn cycle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.board.validate_coords(coords)?;
        if !self.state.is_running() {
            return Ok(MarkOutcome::NoChange);
        }

        let outcome = self.board.cycle_flag(coords)?;
        if matches!(outcome, MarkOutcome::Won) {
            self.win();
        }
        Ok(outcome)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;

    fn game(size: Coord2, mines: &[Coord2]) -> Game {
        Game::with_board(Board::from_mine_coords(size, mines).unwrap())
    }

    #[test]
    fn new_game_runs_beginner_level() {
        let game = Game::with_seed(1);

        assert_eq!(game.state(), GameState::Running);
        assert_eq!(game.level(), Level::BEGINNER);
        assert_eq!(game.board().size(), (9, 9));
        assert_eq!(game.elapsed_seconds(), 0);
        assert!(!game.is_timer_running());
    }

    #[test]
    fn start_is_noop_while_running() {
        let mut game = game((3, 3), &[(2, 2)]);
        game.cycle_flag((0, 0)).unwrap();

        game.start();

        assert!(game.board().get((0, 0)).unwrap().is_flagged());
    }

    #[test]
    fn restart_deals_fresh_board_mid_round() {
        let mut game = game((3, 3), &[(2, 2)]);
        game.cycle_flag((0, 0)).unwrap();
        assert!(game.start_timer().is_some());

        game.restart();

        assert_eq!(game.state(), GameState::Running);
        assert!(!game.is_timer_running());
        assert_eq!(game.board().flagged_count(), 0);
        assert_eq!(game.board().mine_count(), 1);
    }

    #[test]
    fn stop_then_start_resumes_running() {
        let mut game = Game::with_seed(3);

        game.stop();
        assert_eq!(game.state(), GameState::Stopped);

        game.start();
        assert_eq!(game.state(), GameState::Running);
    }

    #[test]
    fn stop_leaves_finished_round() {
        let mut game = game((2, 2), &[(0, 0)]);
        game.reveal((0, 0)).unwrap();
        assert_eq!(game.state(), GameState::Failed);

        game.stop();
        assert_eq!(game.state(), GameState::Stopped);

        game.start();
        assert_eq!(game.state(), GameState::Running);
    }

    #[test]
    fn commands_are_ignored_when_not_running() {
        let mut game = game((3, 3), &[(2, 2)]);
        let start = Instant::now();
        let token = game.start_timer_at(start).unwrap();
        game.stop();

        assert_eq!(game.reveal((0, 0)), Ok(RevealOutcome::NoChange));
        assert_eq!(game.cycle_flag((1, 1)), Ok(MarkOutcome::NoChange));
        assert!(!game.tick_at(token, start + Duration::from_secs(4)));

        let board = game.board();
        assert!(board.iter_cells().all(|cell| !cell.is_revealed()));
        assert!(board.iter_cells().all(|cell| !cell.flag().is_set()));
        assert_eq!(game.elapsed_seconds(), 0);
        assert_eq!(game.press((0, 0)), None);
    }

    #[test]
    fn timer_does_not_start_outside_running_round() {
        let start = Instant::now();

        let mut failed = game((2, 2), &[(0, 0)]);
        failed.reveal((0, 0)).unwrap();
        assert!(failed.state().is_finished());

        let mut stopped = game((2, 2), &[(0, 0)]);
        stopped.stop();
        assert!(!stopped.state().is_finished());

        for round in [&mut failed, &mut stopped] {
            assert_eq!(round.start_timer_at(start), None);
            assert!(!round.is_timer_running());
            assert_eq!(round.timer_token(), None);
            assert_eq!(round.elapsed_seconds(), 0);
        }
    }

    #[test]
    fn finished_round_ignores_commands() {
        let mut game = game((2, 2), &[(0, 0)]);
        game.reveal((0, 0)).unwrap();
        assert_eq!(game.state(), GameState::Failed);

        assert_eq!(game.reveal((1, 1)), Ok(RevealOutcome::NoChange));
        assert_eq!(game.cycle_flag((1, 0)), Ok(MarkOutcome::NoChange));
        assert!(!game.board().get((1, 1)).unwrap().is_revealed());
        assert_eq!(game.board().flagged_count(), 0);
        assert_eq!(game.state(), GameState::Failed);
    }

    #[test]
    fn invalid_coords_are_reported() {
        let mut game = game((2, 2), &[(0, 0)]);

        assert_eq!(game.reveal((2, 0)), Err(GameError::InvalidCoords));
        assert_eq!(game.cycle_flag((0, 9)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn first_press_starts_timer_once() {
        let mut game = game((3, 3), &[(2, 2)]);

        let token = game.press((0, 0));
        assert!(token.is_some());
        assert!(game.is_timer_running());
        assert_eq!(game.timer_token(), token);

        assert_eq!(game.press((1, 1)), None);
    }

    #[test]
    fn press_on_flagged_cell_does_not_start_timer() {
        let mut game = game((3, 3), &[(2, 2)]);
        game.cycle_flag((0, 0)).unwrap();

        assert_eq!(game.press((0, 0)), None);
        assert_eq!(game.press((5, 5)), None);
        assert!(!game.is_timer_running());
    }

    #[test]
    fn tick_recomputes_from_wall_clock() {
        let mut game = game((3, 3), &[(2, 2)]);
        let start = Instant::now();
        let token = game.start_timer_at(start).unwrap();

        assert!(game.tick_at(token, start + Duration::from_millis(1100)));
        assert_eq!(game.elapsed_seconds(), 1);
        assert!(!game.tick_at(token, start + Duration::from_millis(1200)));
        // delayed tick catches up
        assert!(game.tick_at(token, start + Duration::from_millis(6700)));
        assert_eq!(game.elapsed_seconds(), 7);
    }

    #[test]
    fn stale_tick_from_previous_round_is_ignored() {
        let mut game = game((3, 3), &[(2, 2)]);
        let start = Instant::now();
        let stale = game.start_timer_at(start).unwrap();

        game.restart();
        let fresh = game.start_timer_at(start).unwrap();

        assert!(!game.tick_at(stale, start + Duration::from_secs(30)));
        assert_eq!(game.elapsed_seconds(), 0);
        assert!(game.tick_at(fresh, start + Duration::from_secs(2)));
        assert_eq!(game.elapsed_seconds(), 2);
    }

    #[test]
    fn win_stops_timer_and_keeps_elapsed() {
        let mut game = game((2, 1), &[(0, 0)]);
        let start = Instant::now();
        let token = game.start_timer_at(start).unwrap();
        game.tick_at(token, start + Duration::from_secs(3));

        assert_eq!(game.reveal((1, 0)), Ok(RevealOutcome::Won));

        assert_eq!(game.state(), GameState::Won);
        assert!(!game.is_timer_running());
        assert_eq!(game.elapsed_seconds(), 3);
        assert!(!game.tick_at(token, start + Duration::from_secs(9)));
    }

    #[test]
    fn set_level_restarts_with_new_dimensions() {
        let mut game = Game::with_seed(11);
        let custom = Level::new(5, 4, 3).unwrap();

        game.set_level(custom);

        assert_eq!(game.level(), custom);
        assert_eq!(game.board().size(), (5, 4));
        assert_eq!(game.board().mine_count(), 3);
        assert_eq!(game.state(), GameState::Running);
    }

    #[test]
    fn restart_leaves_finished_state() {
        let mut game = game((2, 2), &[(0, 0)]);
        game.reveal((0, 0)).unwrap();

        game.restart();

        assert_eq!(game.state(), GameState::Running);
        assert_eq!(game.board().size(), (2, 2));
        assert!(game.board().iter_cells().all(|cell| !cell.is_revealed()));
    }
}
