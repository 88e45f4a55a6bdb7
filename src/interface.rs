//! The capability traits a game implements to be searchable, plus the
//! strategy seam the engines implement.
//!
//! A game provides two types: a `Move` and a `GameState`. The engines are
//! generic over the state type and get monomorphized per game; there is no
//! runtime dispatch inside the search.

use std::error::Error;
use std::fmt;

/// Evaluations are given from the perspective of the side to move.
pub type Evaluation = i32;

/// Sentinel reserved for decided positions; real evaluations stay strictly
/// inside `(WORST_EVAL, BEST_EVAL)`.
pub const BEST_EVAL: Evaluation = i32::MAX;
pub const WORST_EVAL: Evaluation = -BEST_EVAL;

/// A game move. Moves are small plain values created by the state on
/// request and immutable afterwards.
pub trait Move: Copy + Eq + fmt::Debug + fmt::Display {
    /// Stable 64-bit hash. Two moves are equal iff their payloads are equal,
    /// and equal moves must hash equal.
    fn hash(&self) -> u64;
}

/// A game position, together with the rules needed to search it.
///
/// `Display` renders the position as a rectangular ASCII grid, one row per
/// line, followed by a line with the character of the side to move. Cells
/// are `_` for empty, `#` for an obstacle, and a digit or game-chosen
/// letter for a piece.
pub trait GameState: Clone + fmt::Display {
    type M: Move;

    /// Index of the side to move, in `0..num_players()`.
    fn player_to_move(&self) -> usize;

    /// Overrides the side to move. Used by the tournament harness to vary
    /// the starting seat between games.
    fn set_player_to_move(&mut self, player: usize);

    fn num_players(&self) -> usize;

    fn next_player(&self, player: usize) -> usize {
        (player + 1) % self.num_players()
    }

    fn prev_player(&self, player: usize) -> usize {
        (player + self.num_players() - 1) % self.num_players()
    }

    /// Character used for a player in the grid serialization.
    fn player_char(&self, player: usize) -> char {
        (b'1' + player as u8) as char
    }

    fn player_index(&self, ch: char) -> Option<usize> {
        let index = (ch as usize).checked_sub('1' as usize)?;
        if index < self.num_players() {
            Some(index)
        } else {
            None
        }
    }

    /// Optional permutation of player-specific data (e.g. swapping the two
    /// pawns), used by the harness to de-duplicate games.
    fn swap_players(&mut self) {}

    /// Clears `moves` and fills it with the legal moves, best-first in the
    /// game's preferred order, keeping at most `max_moves` of them. The
    /// result is empty iff the position is terminal.
    fn generate_moves(&self, max_moves: usize, moves: &mut Vec<Self::M>);

    fn make_move(&mut self, m: &Self::M);

    /// Exact inverse of `make_move` under stack discipline: undoing the
    /// most recently made move restores the previous state bit for bit.
    fn undo_move(&mut self, m: &Self::M);

    fn is_terminal(&self) -> bool;

    /// At most one player may be a winner in any position.
    fn is_winner(&self, player: usize) -> bool;

    /// Static evaluation from the perspective of the side to move, higher
    /// is better. Must return at least `10_000` when the side to move has
    /// already won and at most `-10_000` when it has lost.
    fn goodness(&self) -> Evaluation;

    /// Stable 64-bit hash of the position and the side to move.
    fn hash(&self) -> u64;
}

/// An agent that proposes a move for the side to move.
pub trait Strategy<S: GameState> {
    /// Returns a legal move for `state` within the strategy's configured
    /// budget. Running out of time is not an error; being handed a finished
    /// game is.
    fn choose_move(&mut self, state: &S) -> Result<S::M, SearchError>;

    /// Drops internal caches so the next `choose_move` starts cold. The
    /// harness calls this between moves to keep games independent.
    fn reset(&mut self) {}

    fn name(&self) -> &'static str;

    /// Human-readable account of the last `choose_move`, for verbose
    /// harness output.
    fn stats(&self) -> String {
        String::new()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchError {
    /// `choose_move` was called on a position with no legal moves. The
    /// payload is the rendered position.
    TerminalState(String),
    /// A strategy proposed a move outside the legal set. Search engines
    /// never produce this; it flags a broken external opponent.
    IllegalMove(String),
    /// The tournament harness was assembled with the wrong number of
    /// strategies.
    BadConfig(String),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SearchError::TerminalState(state) => {
                write!(f, "given state is terminal:\n{}", state)
            }
            SearchError::IllegalMove(details) => write!(f, "illegal move: {}", details),
            SearchError::BadConfig(details) => write!(f, "bad configuration: {}", details),
        }
    }
}

impl Error for SearchError {}
