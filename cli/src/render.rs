use std::io::{self, Write};
use sweeper_core::{Cell, CellFlag, Game, GameState};

fn glyph(cell: &Cell, state: GameState) -> char {
    if cell.is_revealed() {
        return match (cell.is_mine(), cell.nearby_mine_count()) {
            (true, _) if cell.is_killing_mine() => 'X',
            (true, _) => '*',
            (false, 0) => '.',
            (false, count) => char::from(b'0' + count),
        };
    }

    match cell.flag() {
        // wrong flags are only shown once the round is lost
        CellFlag::Flagged if state == GameState::Failed && !cell.is_mine() => 'x',
        CellFlag::Flagged => 'F',
        CellFlag::Questioned => '?',
        CellFlag::None => '#',
    }
}

fn status(state: GameState) -> &'static str {
    match state {
        GameState::Stopped => "stopped",
        GameState::Running => "running",
        GameState::Won => "won",
        GameState::Failed => "lost",
    }
}

pub(crate) fn render(game: &Game, out: &mut impl Write) -> io::Result<()> {
    let board = game.board();
    writeln!(
        out,
        "mines {:>3}   time {:>3}   {}",
        board.remaining_unchecked_count(),
        game.elapsed_seconds(),
        status(game.state())
    )?;

    for row in board.rows() {
        let line: String = row.map(|cell| glyph(cell, game.state())).collect();
        writeln!(out, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweeper_core::Board;

    fn rendered(game: &Game) -> String {
        let mut out = Vec::new();
        render(game, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn fresh_board_is_hidden() {
        let game = Game::with_board(Board::from_mine_coords((3, 2), &[(0, 0)]).unwrap());

        assert_eq!(rendered(&game), "mines   1   time   0   running\n###\n###\n");
    }

    #[test]
    fn won_board_shows_counts_and_flags_mines() {
        let board = Board::from_mine_coords((4, 2), &[(0, 0), (0, 1)]).unwrap();
        let mut game = Game::with_board(board);
        game.cycle_flag((0, 0)).unwrap();
        game.reveal((3, 0)).unwrap();

        assert_eq!(rendered(&game), "mines   0   time   0   won\nF2..\nF2..\n");
    }

    #[test]
    fn lost_board_marks_killing_mine_and_wrong_flags() {
        let board = Board::from_mine_coords((3, 1), &[(0, 0), (2, 0)]).unwrap();
        let mut game = Game::with_board(board);
        game.cycle_flag((1, 0)).unwrap();
        game.reveal((2, 0)).unwrap();

        assert_eq!(rendered(&game), "mines   1   time   0   lost\n*xX\n");
    }
}
