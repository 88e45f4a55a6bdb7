//! 5×5 Go with area scoring and positional superko.
//!
//! A turn is a pass or a stone placement that does not repeat an earlier
//! grid coloring; the game ends when every player has passed in a row.
//! Captures (and suicide) clear every group left without a liberty, so
//! `undo_move` restores from a per-move snapshot instead of recomputing.

use std::collections::HashSet;
use std::fmt;

use crate::interface::*;
use crate::util::hash_combine;

const SIDE: i32 = 5;
const CELLS: usize = (SIDE * SIDE) as usize;
const EMPTY: u8 = b'_';
const PLAYER_CHARS: [u8; 2] = [b'1', b'2'];

/// `x == -1` is a pass.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GoMove {
    pub x: i8,
    pub y: i8,
}

impl GoMove {
    pub fn new(x: i8, y: i8) -> GoMove {
        GoMove { x, y }
    }

    pub fn pass() -> GoMove {
        GoMove { x: -1, y: 0 }
    }

    pub fn is_pass(&self) -> bool {
        self.x == -1
    }
}

impl fmt::Display for GoMove {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

impl Move for GoMove {
    fn hash(&self) -> u64 {
        hash_combine(hash_combine(0, self.x as i64 as u64), self.y as i64 as u64)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GoState {
    board: [u8; CELLS],
    pass: [bool; 2],
    player_to_move: usize,
    // Grid colorings seen so far, for the superko rule.
    history: HashSet<u64>,
    undo_stack: Vec<([u8; CELLS], [bool; 2])>,
}

struct ReachResult {
    area: Vec<(i32, i32)>,
    closed: bool,
}

impl GoState {
    pub fn new() -> GoState {
        let mut state = GoState {
            board: [EMPTY; CELLS],
            pass: [false; 2],
            player_to_move: 0,
            history: HashSet::new(),
            undo_stack: Vec::new(),
        };
        state.history.insert(state.board_key());
        state
    }

    /// Parses a 25-cell grid of `1`, `2` and `_` (whitespace ignored);
    /// player 1 is to move.
    pub fn from_grid(grid: &str) -> Result<GoState, String> {
        let cells: Vec<u8> = grid.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
        if cells.len() != CELLS {
            return Err(format!("grid must have {} cells", CELLS));
        }
        let mut state = GoState::new();
        state.history.clear();
        for (i, &cell) in cells.iter().enumerate() {
            if cell != EMPTY && cell != PLAYER_CHARS[0] && cell != PLAYER_CHARS[1] {
                return Err(format!("undefined symbol used: '{}'", cell as char));
            }
            state.board[i] = cell;
        }
        state.history.insert(state.board_key());
        Ok(state)
    }

    fn at(&self, x: i32, y: i32) -> u8 {
        self.board[(y * SIDE + x) as usize]
    }

    // The superko set keys on the grid coloring alone; the public hash
    // also mixes in the side to move.
    fn board_key(&self) -> u64 {
        let mut seed = 0;
        for &cell in self.board.iter() {
            seed = hash_combine(seed, cell as u64);
        }
        seed
    }

    pub fn stones(&self, player: usize) -> usize {
        let piece = PLAYER_CHARS[player];
        self.board.iter().filter(|&&cell| cell == piece).count()
    }

    /// Empty points that reach only `player`'s stones.
    pub fn area(&self, player: usize) -> usize {
        let piece = PLAYER_CHARS[player];
        let mut area = 0;
        let mut seen = [false; CELLS];
        for x in 0..SIDE {
            for y in 0..SIDE {
                if !seen[(y * SIDE + x) as usize] {
                    let result = self.reach(x, y, EMPTY, piece, &mut seen);
                    if result.closed {
                        area += result.area.len();
                    }
                }
            }
        }
        area
    }

    fn score(&self, player: usize) -> usize {
        self.stones(player) + self.area(player)
    }

    // Flood fill over `from` cells starting at (x, y). `closed` stays true
    // as long as the region's boundary consists of walls and `to` cells
    // only.
    fn reach(&self, x: i32, y: i32, from: u8, to: u8, seen: &mut [bool; CELLS]) -> ReachResult {
        if x < 0 || y < 0 || x >= SIDE || y >= SIDE {
            return ReachResult { area: Vec::new(), closed: true };
        }
        let i = (y * SIDE + x) as usize;
        if seen[i] && self.board[i] == from {
            return ReachResult { area: Vec::new(), closed: true };
        }
        seen[i] = true;
        if self.board[i] == to {
            return ReachResult { area: Vec::new(), closed: true };
        }
        if self.board[i] != from {
            return ReachResult { area: Vec::new(), closed: false };
        }
        let north = self.reach(x, y - 1, from, to, seen);
        let east = self.reach(x + 1, y, from, to, seen);
        let west = self.reach(x - 1, y, from, to, seen);
        let south = self.reach(x, y + 1, from, to, seen);
        let mut area = vec![(x, y)];
        area.extend(north.area);
        area.extend(east.area);
        area.extend(west.area);
        area.extend(south.area);
        ReachResult {
            area,
            closed: north.closed && east.closed && west.closed && south.closed,
        }
    }

    // Empties every `player` stone in the group at (x, y) that reaches
    // only enemy stones.
    fn clear(&mut self, x: i32, y: i32, player: usize) {
        let mut seen = [false; CELLS];
        let from = PLAYER_CHARS[player];
        let to = PLAYER_CHARS[self.next_player(player)];
        let result = self.reach(x, y, from, to, &mut seen);
        if result.closed {
            for (x, y) in result.area {
                self.board[(y * SIDE + x) as usize] = EMPTY;
            }
        }
    }
}

impl Default for GoState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for GoState {
    type M = GoMove;

    fn player_to_move(&self) -> usize {
        self.player_to_move
    }

    fn set_player_to_move(&mut self, player: usize) {
        self.player_to_move = player;
    }

    fn num_players(&self) -> usize {
        2
    }

    fn generate_moves(&self, max_moves: usize, moves: &mut Vec<GoMove>) {
        moves.clear();
        if self.is_terminal() || max_moves == 0 {
            return;
        }
        let mut probe = self.clone();
        for y in 0..SIDE {
            for x in 0..SIDE {
                if self.at(x, y) == EMPTY {
                    let m = GoMove::new(x as i8, y as i8);
                    probe.make_move(&m);
                    let key = probe.board_key();
                    probe.undo_move(&m);
                    if !self.history.contains(&key) {
                        moves.push(m);
                        if moves.len() >= max_moves {
                            return;
                        }
                    }
                }
            }
        }
        moves.push(GoMove::pass());
    }

    fn make_move(&mut self, m: &GoMove) {
        self.undo_stack.push((self.board, self.pass));
        if m.is_pass() {
            self.pass[self.player_to_move] = true;
            self.player_to_move = self.next_player(self.player_to_move);
            return;
        }
        self.pass[self.player_to_move] = false;
        let (x, y) = (m.x as i32, m.y as i32);
        self.board[(y * SIDE + x) as usize] = PLAYER_CHARS[self.player_to_move];
        let enemy = self.next_player(self.player_to_move);
        self.clear(x, y - 1, enemy);
        self.clear(x + 1, y, enemy);
        self.clear(x - 1, y, enemy);
        self.clear(x, y + 1, enemy);
        // Suicide clears the mover's own group.
        self.clear(x, y, self.player_to_move);
        self.player_to_move = self.next_player(self.player_to_move);
        self.history.insert(self.board_key());
    }

    fn undo_move(&mut self, m: &GoMove) {
        if !m.is_pass() {
            self.history.remove(&self.board_key());
        }
        if let Some((board, pass)) = self.undo_stack.pop() {
            self.board = board;
            self.pass = pass;
        }
        self.player_to_move = self.prev_player(self.player_to_move);
    }

    fn is_terminal(&self) -> bool {
        self.pass.iter().all(|&p| p)
    }

    fn is_winner(&self, player: usize) -> bool {
        self.score(player) > self.score(self.next_player(player))
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
        hash_combine(self.board_key(), self.player_to_move as u64)
    }
}

impl fmt::Display for GoState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..SIDE {
            for x in 0..SIDE {
                write!(f, "{}", self.at(x, y) as char)?;
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
    fn counts_stones() {
        let state = GoState::from_grid(
            "____1\
             1__2_\
             _22__\
             ___1_\
             222__",
        )
        .unwrap();
        assert_eq!(state.stones(0), 3);
        assert_eq!(state.stones(1), 6);
    }

    #[test]
    fn counts_area() {
        let state = GoState::from_grid(
            "_1_1_\
             _1_21\
             1_2_2\
             11_2_\
             ____2",
        )
        .unwrap();
        assert_eq!(state.area(0), 3);
        assert_eq!(state.area(1), 2);
    }

    #[test]
    fn capture_is_undone_exactly() {
        let state = GoState::from_grid(
            "2____\
             1____\
             _____\
             ___2_\
             _____",
        )
        .unwrap();
        let mut state = state;
        let copy = state.clone();
        let m = GoMove::new(1, 0);
        state.make_move(&m);
        assert_eq!(state.area(0), 1);
        state.undo_move(&m);
        assert_eq!(state, copy);
    }

    #[test]
    fn group_capture_is_undone_exactly() {
        let state = GoState::from_grid(
            "_21__\
             1221_\
             _11__\
             _____\
             ___2_",
        )
        .unwrap();
        let mut state = state;
        let copy = state.clone();
        let m = GoMove::new(0, 0);
        state.make_move(&m);
        assert_eq!(state.area(0), 3);
        state.undo_move(&m);
        assert_eq!(state, copy);
    }

    #[test]
    fn suicide_clears_own_group() {
        let state = GoState::from_grid(
            "_2___\
             12___\
             2____\
             _____\
             _____",
        )
        .unwrap();
        let mut state = state;
        let copy = state.clone();
        let m = GoMove::new(0, 0);
        state.make_move(&m);
        assert_eq!(state.stones(0), 0);
        state.undo_move(&m);
        assert_eq!(state, copy);
    }

    #[test]
    fn superko_forbids_recapture() {
        let mut state = GoState::from_grid(
            "_21__\
             2_21_\
             _21__\
             _____\
             _____",
        )
        .unwrap();
        state.make_move(&GoMove::new(1, 1));
        let mut moves = Vec::new();
        state.generate_moves(usize::MAX, &mut moves);
        assert!(!moves.contains(&GoMove::new(2, 1)));
    }

    #[test]
    fn immediate_suicide_is_pruned_by_superko() {
        let state = GoState::from_grid(
            "_2___\
             2_2__\
             _2___\
             _____\
             _____",
        )
        .unwrap();
        let mut moves = Vec::new();
        state.generate_moves(usize::MAX, &mut moves);
        assert!(!moves.contains(&GoMove::new(1, 1)));
    }

    #[test]
    fn two_passes_end_the_game() {
        let mut state = GoState::new();
        state.make_move(&GoMove::new(2, 2));
        state.make_move(&GoMove::pass());
        assert!(!state.is_terminal());
        state.make_move(&GoMove::pass());
        assert!(state.is_terminal());
        assert!(state.is_winner(0));
        assert!(!state.is_winner(1));
    }

    #[test]
    fn state_invariants() {
        check_state_invariants(&GoState::new());
        let state = GoState::from_grid(
            "__1__\
             __212\
             _1212\
             _1212\
             __12_",
        )
        .unwrap();
        check_state_invariants(&state);
    }
}
