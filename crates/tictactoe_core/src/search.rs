//! Exhaustive minimax search with alpha-beta pruning.
//!
//! Scores are from the automated side's point of view: `+1` when it has a
//! line, `-1` when its opponent does, `0` on a full board. There is no depth
//! cutoff, every branch is searched to a terminal board.

use crate::rules::{is_full, is_winner};
use crate::{Board, Mark, Position, Square};
use tracing::{debug, instrument};

type Score = i8;

const WIN: Score = 1;
const LOSS: Score = -1;
const DRAW: Score = 0;

/// Largest board edge the exhaustive search finishes on in interactive time.
///
/// A 4×4 board already has trillions of reachable positions, so callers
/// must refuse larger boards before asking for a move.
pub const MAX_SEARCH_SIZE: usize = 3;

/// Returns the optimal move for `ai` on `board`.
///
/// Ties go to the first move in row-major order. Returns `None` only when
/// the board has no empty square. The input board is never modified.
///
/// Only boards up to [`MAX_SEARCH_SIZE`] finish in reasonable time.
#[instrument(skip(board), fields(size = board.size(), occupied = board.occupied()))]
pub fn best_move(board: &Board, ai: Mark) -> Option<Position> {
    let mut search = Search {
        board: board.clone(),
        ai,
        nodes: 0,
    };

    let mut best: Option<(Position, Score)> = None;
    let mut alpha = Score::MIN;
    for pos in search.board.empty_positions() {
        search.play(pos, ai);
        let score = search.minimax(false, alpha, Score::MAX);
        search.undo(pos);

        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((pos, score));
            alpha = alpha.max(score);
        }
        if score == WIN {
            break;
        }
    }

    debug!(nodes = search.nodes, best = ?best, "Search finished");
    best.map(|(pos, _)| pos)
}

/// Working state for one search; owns its private board copy.
struct Search {
    board: Board,
    ai: Mark,
    nodes: u64,
}

impl Search {
    fn play(&mut self, pos: Position, mark: Mark) {
        self.board.set(pos, Square::Occupied(mark));
    }

    fn undo(&mut self, pos: Position) {
        self.board.set(pos, Square::Empty);
    }

    fn evaluate(&self) -> Option<Score> {
        if is_winner(&self.board, self.ai.opponent()) {
            Some(LOSS)
        } else if is_winner(&self.board, self.ai) {
            Some(WIN)
        } else if is_full(&self.board) {
            Some(DRAW)
        } else {
            None
        }
    }

    fn minimax(&mut self, maximizing: bool, mut alpha: Score, mut beta: Score) -> Score {
        self.nodes += 1;
        if let Some(score) = self.evaluate() {
            return score;
        }

        let mark = if maximizing { self.ai } else { self.ai.opponent() };
        let mut best = if maximizing { Score::MIN } else { Score::MAX };

        for pos in self.board.empty_positions() {
            self.play(pos, mark);
            let score = self.minimax(!maximizing, alpha, beta);
            self.undo(pos);

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Outcome, outcome};

    fn board_from(rows: &[&str]) -> Board {
        let rows = rows
            .iter()
            .map(|row| {
                row.chars()
                    .map(|c| Square::try_from(c.to_string()).unwrap())
                    .collect()
            })
            .collect();
        Board::from_rows(rows).unwrap()
    }

    #[test]
    fn test_does_not_mutate_input() {
        let board = board_from(&["X--", "-O-", "--X"]);
        let before = board.clone();
        let _ = best_move(&board, Mark::O);
        assert_eq!(board, before);
    }

    #[test]
    fn test_full_board_has_no_move() {
        let board = board_from(&["XOX", "OXX", "OXO"]);
        assert_eq!(best_move(&board, Mark::O), None);
        assert_eq!(best_move(&board, Mark::X), None);
    }

    #[test]
    fn test_takes_immediate_win() {
        let board = board_from(&["OO-", "XX-", "X--"]);
        assert_eq!(best_move(&board, Mark::O), Some(Position::new(0, 2)));
    }

    #[test]
    fn test_blocks_immediate_loss() {
        let board = board_from(&["XX-", "-O-", "---"]);
        assert_eq!(best_move(&board, Mark::O), Some(Position::new(0, 2)));
    }

    #[test]
    fn test_plays_as_x() {
        let board = board_from(&["X-O", "XO-", "---"]);
        assert_eq!(best_move(&board, Mark::X), Some(Position::new(2, 0)));
    }

    #[test]
    fn test_deterministic() {
        let board = Board::new();
        assert_eq!(best_move(&board, Mark::X), best_move(&board, Mark::X));
    }

    #[test]
    fn test_self_play_is_a_draw() {
        let mut board = Board::new();
        let mut mark = Mark::X;
        while outcome(&board).is_none() {
            let pos = best_move(&board, mark).unwrap();
            board.place(pos, mark).unwrap();
            mark = mark.opponent();
        }
        assert_eq!(outcome(&board), Some(Outcome::Draw));
    }

    #[test]
    fn test_two_by_two_first_player_wins() {
        let mut board = Board::with_size(2).unwrap();
        board.place(Position::new(0, 0), Mark::X).unwrap();
        board.place(Position::new(0, 1), Mark::O).unwrap();
        // Any X move completes a column or diagonal.
        let pos = best_move(&board, Mark::X).unwrap();
        board.place(pos, Mark::X).unwrap();
        assert_eq!(outcome(&board), Some(Outcome::Won(Mark::X)));
    }
}
