//! Isola on a 7×7 board. A move steps your pawn to an adjacent square and
//! removes one empty square; a player who cannot step loses.
//!
//! Move generation is deliberately narrowed the way the original game
//! driver narrows it: removal candidates are the squares ringing the enemy
//! pawn plus the square just vacated, ordered toward the board center, and
//! the list honors the engine's `max_moves` cap.

use std::fmt;

use crate::interface::*;
use crate::util::hash_combine;

const SIDE: i32 = 7;
const EMPTY: u8 = b'_';
const REMOVED: u8 = b'#';

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct IsolaMove {
    pub from_x: u8,
    pub from_y: u8,
    pub step_x: u8,
    pub step_y: u8,
    pub remove_x: u8,
    pub remove_y: u8,
}

impl IsolaMove {
    pub fn new(
        from_x: u8, from_y: u8, step_x: u8, step_y: u8, remove_x: u8, remove_y: u8,
    ) -> IsolaMove {
        IsolaMove { from_x, from_y, step_x, step_y, remove_x, remove_y }
    }
}

impl fmt::Display for IsolaMove {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.from_x, self.from_y, self.step_x, self.step_y, self.remove_x, self.remove_y
        )
    }
}

impl Move for IsolaMove {
    fn hash(&self) -> u64 {
        let mut seed = hash_combine(0, self.from_x as u64);
        seed = hash_combine(seed, self.from_y as u64);
        seed = hash_combine(seed, self.step_x as u64);
        seed = hash_combine(seed, self.step_y as u64);
        seed = hash_combine(seed, self.remove_x as u64);
        hash_combine(seed, self.remove_y as u64)
    }
}

type Cords = (i32, i32);

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IsolaState {
    removed: u64,
    pawns: [Cords; 2],
    player_to_move: usize,
}

impl IsolaState {
    /// Parses a 49-cell grid of `1`, `2`, `_` and `#` (whitespace ignored)
    /// with the given side to move.
    pub fn from_grid(grid: &str, to_move: char) -> Result<IsolaState, String> {
        let cells: Vec<u8> = grid.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
        if cells.len() != (SIDE * SIDE) as usize {
            return Err(format!("grid must have {} cells", SIDE * SIDE));
        }
        let mut removed = 0;
        let mut pawns = [(-1, -1); 2];
        for (i, &cell) in cells.iter().enumerate() {
            let x = i as i32 % SIDE;
            let y = i as i32 / SIDE;
            match cell {
                b'1' => pawns[0] = (x, y),
                b'2' => pawns[1] = (x, y),
                REMOVED => removed |= 1 << (y * SIDE + x),
                EMPTY => {}
                _ => return Err(format!("undefined symbol used: '{}'", cell as char)),
            }
        }
        if pawns[0] == (-1, -1) || pawns[1] == (-1, -1) {
            return Err("missing player symbols".to_string());
        }
        let player_to_move = match to_move {
            '1' => 0,
            '2' => 1,
            _ => return Err(format!("unknown player: '{}'", to_move)),
        };
        Ok(IsolaState { removed, pawns, player_to_move })
    }

    /// The standard opening: the pawns face each other across the board.
    pub fn new() -> IsolaState {
        IsolaState { removed: 0, pawns: [(SIDE / 2, SIDE - 1), (SIDE / 2, 0)], player_to_move: 0 }
    }

    fn is_removed(&self, x: i32, y: i32) -> bool {
        self.removed >> (y * SIDE + x) & 1 != 0
    }

    fn set_removed(&mut self, x: i32, y: i32, value: bool) {
        if value {
            self.removed |= 1 << (y * SIDE + x);
        } else {
            self.removed &= !(1 << (y * SIDE + x));
        }
    }

    fn is_empty(&self, x: i32, y: i32) -> bool {
        !self.is_removed(x, y) && (x, y) != self.pawns[0] && (x, y) != self.pawns[1]
    }

    fn in_bounds(x: i32, y: i32) -> bool {
        x >= 0 && x < SIDE && y >= 0 && y < SIDE
    }

    // The empty squares ringing (start_x, start_y), squares closer to the
    // board center first.
    fn moves_around(&self, start_x: i32, start_y: i32) -> Vec<Cords> {
        let dx_order = if start_x < SIDE / 2 { -1 } else { 1 };
        let dy_order = if start_y < SIDE / 2 { -1 } else { 1 };
        let mut result = Vec::with_capacity(8);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let x = start_x + dx * dx_order;
                let y = start_y + dy * dy_order;
                if Self::in_bounds(x, y) && self.is_empty(x, y) {
                    result.push((x, y));
                }
            }
        }
        result
    }

    fn count_moves_around(&self, cords: Cords) -> i32 {
        let mut result = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                let x = cords.0 + dx;
                let y = cords.1 + dy;
                if Self::in_bounds(x, y) && self.is_empty(x, y) {
                    result += 1;
                }
            }
        }
        result
    }

    // Removal candidates: empty squares ringing the enemy pawn, center
    // side first, then the mover's own square which the step vacates.
    fn remove_moves(&self, how_many: usize) -> Vec<Cords> {
        let enemy_cords = self.pawns[self.next_player(self.player_to_move)];
        let dx_order = if enemy_cords.0 < SIDE / 2 { -1 } else { 1 };
        let dy_order = if enemy_cords.1 < SIDE / 2 { -1 } else { 1 };
        let mut result = Vec::with_capacity(9);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let x = enemy_cords.0 + dx * dx_order;
                let y = enemy_cords.1 + dy * dy_order;
                if Self::in_bounds(x, y) && self.is_empty(x, y) {
                    result.push((x, y));
                    if result.len() + 1 >= how_many {
                        result.push(self.pawns[self.player_to_move]);
                        return result;
                    }
                }
            }
        }
        result.push(self.pawns[self.player_to_move]);
        result
    }

    fn center_score(cords: Cords) -> Evaluation {
        let center = SIDE / 2;
        -(cords.0 - center).abs() - (cords.1 - center).abs()
    }

    fn mobility_score(moves: i32) -> Evaluation {
        if moves == 1 {
            -100
        } else {
            moves
        }
    }
}

impl Default for IsolaState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for IsolaState {
    type M = IsolaMove;

    fn player_to_move(&self) -> usize {
        self.player_to_move
    }

    fn set_player_to_move(&mut self, player: usize) {
        self.player_to_move = player;
    }

    fn num_players(&self) -> usize {
        2
    }

    fn swap_players(&mut self) {
        self.pawns.swap(0, 1);
    }

    fn generate_moves(&self, max_moves: usize, moves: &mut Vec<IsolaMove>) {
        moves.clear();
        let player_cords = self.pawns[self.player_to_move];
        let step_moves = self.moves_around(player_cords.0, player_cords.1);
        if step_moves.is_empty() {
            return;
        }
        let per_step = max_moves.saturating_add(step_moves.len() - 1) / step_moves.len();
        let remove_moves = self.remove_moves(per_step);
        for &step in step_moves.iter() {
            for &remove in remove_moves.iter() {
                if step == remove {
                    continue;
                }
                moves.push(IsolaMove::new(
                    player_cords.0 as u8,
                    player_cords.1 as u8,
                    step.0 as u8,
                    step.1 as u8,
                    remove.0 as u8,
                    remove.1 as u8,
                ));
                if moves.len() >= max_moves {
                    return;
                }
            }
        }
    }

    fn make_move(&mut self, m: &IsolaMove) {
        self.set_removed(m.remove_x as i32, m.remove_y as i32, true);
        self.pawns[self.player_to_move] = (m.step_x as i32, m.step_y as i32);
        self.player_to_move = self.next_player(self.player_to_move);
    }

    fn undo_move(&mut self, m: &IsolaMove) {
        self.player_to_move = self.prev_player(self.player_to_move);
        self.pawns[self.player_to_move] = (m.from_x as i32, m.from_y as i32);
        self.set_removed(m.remove_x as i32, m.remove_y as i32, false);
    }

    fn is_terminal(&self) -> bool {
        self.count_moves_around(self.pawns[self.player_to_move]) == 0
    }

    fn is_winner(&self, player: usize) -> bool {
        player != self.player_to_move && self.is_terminal()
    }

    fn goodness(&self) -> Evaluation {
        let player_cords = self.pawns[self.player_to_move];
        let enemy_cords = self.pawns[self.next_player(self.player_to_move)];

        let player_moves = self.count_moves_around(player_cords);
        if player_moves == 0 {
            return -10_000;
        }
        let enemy_moves = self.count_moves_around(enemy_cords);
        if enemy_moves == 0 {
            return 10_000;
        }

        let mobility = Self::mobility_score(player_moves) - Self::mobility_score(enemy_moves);
        let center = Self::center_score(player_cords) - Self::center_score(enemy_cords);
        10 * mobility + center
    }

    fn hash(&self) -> u64 {
        let mut seed = hash_combine(0, self.removed);
        seed = hash_combine(seed, self.pawns[0].0 as u64);
        seed = hash_combine(seed, self.pawns[0].1 as u64);
        seed = hash_combine(seed, self.pawns[1].0 as u64);
        seed = hash_combine(seed, self.pawns[1].1 as u64);
        hash_combine(seed, self.player_to_move as u64)
    }
}

impl fmt::Display for IsolaState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..SIDE {
            for x in 0..SIDE {
                let cell = if (x, y) == self.pawns[0] {
                    '1'
                } else if (x, y) == self.pawns[1] {
                    '2'
                } else if self.is_removed(x, y) {
                    REMOVED as char
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
