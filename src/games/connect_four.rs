//! Connect-Four on an 8-wide, 7-tall grid, one bitboard per player.
//!
//! A column occupies 8 consecutive bits (7 cells plus one guard bit), so
//! four-in-a-row in every direction reduces to three shift-and-mask steps.

use std::fmt;

use crate::interface::*;
use crate::util::hash_combine;

const WIDTH: usize = 8;
const HEIGHT: usize = 7;
const EMPTY: u8 = b'_';

// Every y == 0 cell: bit HEIGHT - 1 of each column.
const TOP_ROW: u64 = 0x4040_4040_4040_4040;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ConnectFourMove {
    pub x: u8,
}

impl ConnectFourMove {
    pub fn new(x: u8) -> ConnectFourMove {
        ConnectFourMove { x }
    }
}

impl fmt::Display for ConnectFourMove {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.x)
    }
}

impl Move for ConnectFourMove {
    fn hash(&self) -> u64 {
        hash_combine(0, self.x as u64)
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
struct Bitboard {
    bits: u64,
}

impl Bitboard {
    fn index(x: usize, y: usize) -> u64 {
        (HEIGHT - y - 1 + x * WIDTH) as u64
    }

    fn set(&mut self, x: usize, y: usize, value: bool) {
        if value {
            self.bits |= 1 << Self::index(x, y);
        } else {
            self.bits &= !(1 << Self::index(x, y));
        }
    }

    fn get(&self, x: usize, y: usize) -> bool {
        (self.bits >> Self::index(x, y)) & 1 != 0
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConnectFourState {
    boards: [Bitboard; 2],
    player_to_move: usize,
}

impl ConnectFourState {
    pub fn new() -> ConnectFourState {
        ConnectFourState { boards: [Bitboard::default(); 2], player_to_move: 0 }
    }

    /// Parses a 56-cell grid of `1`, `2` and `_` (whitespace ignored);
    /// player 1 is to move.
    pub fn from_grid(grid: &str) -> Result<ConnectFourState, String> {
        let cells: Vec<u8> = grid.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
        if cells.len() != WIDTH * HEIGHT {
            return Err(format!("grid must have {} cells", WIDTH * HEIGHT));
        }
        let mut state = ConnectFourState::new();
        for (i, &cell) in cells.iter().enumerate() {
            let (x, y) = (i % WIDTH, i / WIDTH);
            match cell {
                b'1' => state.boards[0].set(x, y, true),
                b'2' => state.boards[1].set(x, y, true),
                EMPTY => {}
                _ => return Err(format!("undefined symbol used: '{}'", cell as char)),
            }
        }
        Ok(state)
    }

    fn is_empty(&self, x: usize, y: usize) -> bool {
        !self.boards[0].get(x, y) && !self.boards[1].get(x, y)
    }

    fn has_empty_space(&self) -> bool {
        let occupied = self.boards[0].bits | self.boards[1].bits;
        occupied & TOP_ROW != TOP_ROW
    }
}

impl Default for ConnectFourState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for ConnectFourState {
    type M = ConnectFourMove;

    fn player_to_move(&self) -> usize {
        self.player_to_move
    }

    fn set_player_to_move(&mut self, player: usize) {
        self.player_to_move = player;
    }

    fn num_players(&self) -> usize {
        2
    }

    fn generate_moves(&self, max_moves: usize, moves: &mut Vec<ConnectFourMove>) {
        moves.clear();
        if self.is_terminal() {
            return;
        }
        for x in 0..WIDTH {
            if self.is_empty(x, 0) {
                moves.push(ConnectFourMove::new(x as u8));
                if moves.len() >= max_moves {
                    return;
                }
            }
        }
    }

    fn make_move(&mut self, m: &ConnectFourMove) {
        for y in (0..HEIGHT).rev() {
            if self.is_empty(m.x as usize, y) {
                self.boards[self.player_to_move].set(m.x as usize, y, true);
                break;
            }
        }
        self.player_to_move = self.next_player(self.player_to_move);
    }

    fn undo_move(&mut self, m: &ConnectFourMove) {
        for y in 0..HEIGHT {
            if !self.is_empty(m.x as usize, y) {
                self.boards[0].set(m.x as usize, y, false);
                self.boards[1].set(m.x as usize, y, false);
                break;
            }
        }
        self.player_to_move = self.prev_player(self.player_to_move);
    }

    fn is_terminal(&self) -> bool {
        !self.has_empty_space() || self.is_winner(0) || self.is_winner(1)
    }

    fn is_winner(&self, player: usize) -> bool {
        let board = self.boards[player].bits;
        // Adjacent pairs in each direction, then pairs of pairs.
        let diag_down = board & (board >> 7);
        let horizontal = board & (board >> 8);
        let diag_up = board & (board >> 9);
        let vertical = board & (board >> 1);
        (diag_down & (diag_down >> 14))
            | (horizontal & (horizontal >> 16))
            | (diag_up & (diag_up >> 18))
            | (vertical & (vertical >> 2))
            != 0
    }

    fn goodness(&self) -> Evaluation {
        if self.is_terminal() {
            if self.is_winner(self.player_to_move) {
                return 10_000;
            }
            if self.is_winner(self.next_player(self.player_to_move)) {
                return -10_000;
            }
            return 10;
        }
        0
    }

    fn hash(&self) -> u64 {
        let mut seed = hash_combine(0, self.boards[0].bits);
        seed = hash_combine(seed, self.boards[1].bits);
        hash_combine(seed, self.player_to_move as u64)
    }
}

impl fmt::Display for ConnectFourState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                let cell = if self.boards[0].get(x, y) {
                    '1'
                } else if self.boards[1].get(x, y) {
                    '2'
                } else {
                    EMPTY as char
                };
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "{}", self.player_char(self.player_to_move))
    }
}
