//! 3×3 tic-tac-toe. Player 0 plays `X`, player 1 plays `O`.

use std::fmt;

use crate::interface::*;
use crate::util::hash_combine;

const SIDE: usize = 3;
const EMPTY: u8 = b'_';
const PLAYER_CHARS: [u8; 2] = [b'X', b'O'];

// Rows, columns, both diagonals, as board indices.
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TicTacToeMove {
    pub x: u8,
    pub y: u8,
}

impl TicTacToeMove {
    pub fn new(x: u8, y: u8) -> TicTacToeMove {
        TicTacToeMove { x, y }
    }
}

impl fmt::Display for TicTacToeMove {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

impl Move for TicTacToeMove {
    fn hash(&self) -> u64 {
        hash_combine(hash_combine(0, self.x as u64), self.y as u64)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TicTacToeState {
    board: [u8; SIDE * SIDE],
    player_to_move: usize,
}

impl TicTacToeState {
    pub fn new() -> TicTacToeState {
        TicTacToeState { board: [EMPTY; SIDE * SIDE], player_to_move: 0 }
    }

    /// Parses a 9-cell grid of `X`, `O` and `_` (whitespace ignored) with
    /// the given side to move.
    pub fn from_grid(grid: &str, to_move: char) -> Result<TicTacToeState, String> {
        let cells: Vec<u8> =
            grid.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
        if cells.len() != SIDE * SIDE {
            return Err(format!("grid must have {} cells", SIDE * SIDE));
        }
        let mut board = [EMPTY; SIDE * SIDE];
        for (i, &cell) in cells.iter().enumerate() {
            if cell != EMPTY && cell != PLAYER_CHARS[0] && cell != PLAYER_CHARS[1] {
                return Err(format!("undefined symbol used: '{}'", cell as char));
            }
            board[i] = cell;
        }
        let player_to_move = match to_move {
            'X' => 0,
            'O' => 1,
            _ => return Err(format!("unknown player: '{}'", to_move)),
        };
        Ok(TicTacToeState { board, player_to_move })
    }

    // For each line, how many cells belong to the side to move and how
    // many to the opponent.
    fn count_players_on_lines(&self) -> [(u32, u32); 8] {
        let mine = PLAYER_CHARS[self.player_to_move];
        let theirs = PLAYER_CHARS[self.next_player(self.player_to_move)];
        let mut counts = [(0, 0); 8];
        for (line, counts) in LINES.iter().zip(counts.iter_mut()) {
            for &i in line {
                if self.board[i] == mine {
                    counts.0 += 1;
                } else if self.board[i] == theirs {
                    counts.1 += 1;
                }
            }
        }
        counts
    }

    fn has_empty_space(&self) -> bool {
        self.board.iter().any(|&cell| cell == EMPTY)
    }
}

impl Default for TicTacToeState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for TicTacToeState {
    type M = TicTacToeMove;

    fn player_to_move(&self) -> usize {
        self.player_to_move
    }

    fn set_player_to_move(&mut self, player: usize) {
        self.player_to_move = player;
    }

    fn num_players(&self) -> usize {
        2
    }

    fn player_char(&self, player: usize) -> char {
        PLAYER_CHARS[player] as char
    }

    fn player_index(&self, ch: char) -> Option<usize> {
        match ch {
            'X' => Some(0),
            'O' => Some(1),
            _ => None,
        }
    }

    fn generate_moves(&self, max_moves: usize, moves: &mut Vec<TicTacToeMove>) {
        moves.clear();
        if self.is_terminal() {
            return;
        }
        for y in 0..SIDE {
            for x in 0..SIDE {
                if self.board[y * SIDE + x] == EMPTY {
                    moves.push(TicTacToeMove::new(x as u8, y as u8));
                    if moves.len() >= max_moves {
                        return;
                    }
                }
            }
        }
    }

    fn make_move(&mut self, m: &TicTacToeMove) {
        self.board[m.y as usize * SIDE + m.x as usize] = PLAYER_CHARS[self.player_to_move];
        self.player_to_move = self.next_player(self.player_to_move);
    }

    fn undo_move(&mut self, m: &TicTacToeMove) {
        self.board[m.y as usize * SIDE + m.x as usize] = EMPTY;
        self.player_to_move = self.prev_player(self.player_to_move);
    }

    fn is_terminal(&self) -> bool {
        !self.has_empty_space() || self.is_winner(0) || self.is_winner(1)
    }

    fn is_winner(&self, player: usize) -> bool {
        let piece = PLAYER_CHARS[player];
        LINES.iter().any(|line| line.iter().all(|&i| self.board[i] == piece))
    }

    fn goodness(&self) -> Evaluation {
        if self.is_winner(self.player_to_move) {
            return 10_000;
        }
        if self.is_winner(self.next_player(self.player_to_move)) {
            return -10_000;
        }
        if !self.has_empty_space() {
            return 0;
        }
        let mut goodness = 0;
        for &(mine, theirs) in self.count_players_on_lines().iter() {
            if mine == 2 && theirs == 0 {
                goodness += SIDE as Evaluation;
            } else if theirs == 2 && mine == 0 {
                goodness -= SIDE as Evaluation;
            } else if mine == 1 && theirs == 0 {
                goodness += 1;
            } else if theirs == 1 && mine == 0 {
                goodness -= 1;
            }
        }
        goodness
    }

    fn hash(&self) -> u64 {
        let mut seed = 0;
        for &cell in self.board.iter() {
            seed = hash_combine(seed, cell as u64);
        }
        hash_combine(seed, self.player_to_move as u64)
    }
}

impl fmt::Display for TicTacToeState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..SIDE {
            for x in 0..SIDE {
                write!(f, "{}", self.board[y * SIDE + x] as char)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "{}", self.player_char(self.player_to_move))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::testing::check_state_invariants;

    #[test]
    fn detects_winner() {
        let state = TicTacToeState::from_grid("XXX OO_ ___", 'O').unwrap();
        assert!(state.is_winner(0));
        assert!(!state.is_winner(1));
        assert!(state.is_terminal());
    }

    #[test]
    fn full_board_is_terminal_draw() {
        let state = TicTacToeState::from_grid("XOXXOOOXX", 'O').unwrap();
        assert!(state.is_terminal());
        assert!(!state.is_winner(0));
        assert!(!state.is_winner(1));
        assert_eq!(state.goodness(), 0);
    }

    #[test]
    fn open_lines_shape_the_evaluation() {
        // X holds the center and a corner, O one edge; X to move is ahead.
        let state = TicTacToeState::from_grid("X___X___O", 'X').unwrap();
        assert!(state.goodness() > 0);
    }

    #[test]
    fn generate_moves_respects_max_moves() {
        let state = TicTacToeState::new();
        let mut moves = Vec::new();
        state.generate_moves(4, &mut moves);
        assert_eq!(moves.len(), 4);
        state.generate_moves(usize::MAX, &mut moves);
        assert_eq!(moves.len(), 9);
    }

    #[test]
    fn state_invariants() {
        check_state_invariants(&TicTacToeState::new());
        check_state_invariants(&TicTacToeState::from_grid("XX__O____", 'X').unwrap());
        check_state_invariants(&TicTacToeState::from_grid("XOXXOOOXX", 'O').unwrap());
    }

    #[test]
    fn display_round_trips_through_from_grid() {
        let state = TicTacToeState::from_grid("XX__O____", 'O').unwrap();
        let rendered = state.to_string();
        let mut lines = rendered.lines();
        let grid: String = (&mut lines).take(SIDE).collect();
        let to_move = lines.next().unwrap().chars().next().unwrap();
        let reparsed = TicTacToeState::from_grid(&grid, to_move).unwrap();
        assert_eq!(reparsed, state);
    }
}
