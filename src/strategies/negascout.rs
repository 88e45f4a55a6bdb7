//! An implementation of iterative-deepening negascout.
//!
//! Search and evaluate at depth 1, then start over at depth 2, etc., until
//! the time budget runs out; the move returned comes from the deepest fully
//! completed iteration. Uses a transposition table to reuse information
//! from previous iterations and a history table for move ordering.

use std::cmp::max;
use std::fmt::Write;
use std::time::Duration;

use super::super::interface::*;
use super::super::util::Timer;
use super::table::{EntryFlag, HistoryTable, TranspositionTable};
use super::util::MovePool;

const MAX_DEPTH: u8 = 20;

/// How the engine orders moves before searching them.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MoveOrdering {
    /// Keep the game's own hint order from `generate_moves`.
    GameOrder,
    /// Stable sort by descending history-table score.
    History,
}

/// Options to use for the negascout engine.
#[derive(Clone, Copy)]
pub struct NegascoutOptions {
    table_byte_size: usize,
    max_depth: u8,
    max_time: Duration,
    max_moves: usize,
    move_ordering: MoveOrdering,
}

impl NegascoutOptions {
    pub fn new() -> Self {
        NegascoutOptions {
            table_byte_size: 1_000_000,
            max_depth: MAX_DEPTH,
            max_time: Duration::from_secs(1),
            max_moves: usize::MAX,
            move_ordering: MoveOrdering::History,
        }
    }
}

impl Default for NegascoutOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl NegascoutOptions {
    /// Approximately how large the transposition table should be in memory.
    pub fn with_table_byte_size(mut self, size: usize) -> Self {
        self.table_byte_size = size;
        self
    }

    /// The deepest iteration to run. The default is 20 plies.
    pub fn with_max_depth(mut self, depth: u8) -> Self {
        self.max_depth = depth;
        self
    }

    /// Wall-clock budget per `choose_move`. The running iteration is
    /// abandoned when the budget is exceeded.
    pub fn with_timeout(mut self, max_time: Duration) -> Self {
        self.max_time = max_time;
        self
    }

    /// Cap on how many moves are requested per node; games truncate their
    /// hint-ordered move list to this length.
    pub fn with_max_moves(mut self, max_moves: usize) -> Self {
        self.max_moves = max_moves;
        self
    }

    pub fn with_move_ordering(mut self, ordering: MoveOrdering) -> Self {
        self.move_ordering = ordering;
        self
    }
}

struct NodeOutcome<M> {
    goodness: Evaluation,
    best_move: Option<M>,
    completed: bool,
}

pub struct Negascout<S: GameState> {
    opts: NegascoutOptions,
    table: TranspositionTable<S::M>,
    history: HistoryTable,
    move_pool: MovePool<S::M>,
    timer: Timer,
    prev_value: Evaluation,

    // Per-iteration counters for the last move generated.
    nodes: u64,
    leafs: u64,
    scout_cuts: u64,
    beta_cuts: u64,
    tt_hits: u64,
    tt_exacts: u64,
    tt_cuts: u64,
    actual_depth: u8,
    log: String,
}

impl<S: GameState> Negascout<S> {
    pub fn new(opts: NegascoutOptions) -> Negascout<S> {
        Negascout {
            opts,
            table: TranspositionTable::new(opts.table_byte_size),
            history: HistoryTable::new(),
            move_pool: MovePool::default(),
            timer: Timer::start(),
            prev_value: 0,
            nodes: 0,
            leafs: 0,
            scout_cuts: 0,
            beta_cuts: 0,
            tt_hits: 0,
            tt_exacts: 0,
            tt_cuts: 0,
            actual_depth: 0,
            log: String::new(),
        }
    }

    /// Goodness of the deepest completed iteration of the last
    /// `choose_move`, from the perspective of the side to move.
    pub fn root_value(&self) -> Evaluation {
        self.prev_value
    }

    /// Deepest fully completed iteration of the last `choose_move`.
    pub fn depth_reached(&self) -> u8 {
        self.actual_depth
    }

    fn reset_counters(&mut self) {
        self.nodes = 0;
        self.leafs = 0;
        self.scout_cuts = 0;
        self.beta_cuts = 0;
        self.tt_hits = 0;
        self.tt_exacts = 0;
        self.tt_cuts = 0;
    }

    // Recursive negascout over the window [alpha, beta). Results are from
    // the perspective of the side to move; `completed == false` marks a
    // result that was cut short by the timer (or a leaf) and must not be
    // cached or adopted at the root.
    fn negascout(
        &mut self, s: &mut S, depth: u8, mut alpha: Evaluation, mut beta: Evaluation,
    ) -> NodeOutcome<S::M> {
        self.nodes += 1;
        if depth == 0 || s.is_terminal() {
            self.leafs += 1;
            return NodeOutcome { goodness: s.goodness(), best_move: None, completed: false };
        }

        let alpha_original = alpha;
        let hash = s.hash();
        if let Some(entry) = self.table.lookup(hash) {
            if entry.depth >= depth {
                self.tt_hits += 1;
                match entry.flag {
                    EntryFlag::Exact => {
                        self.tt_exacts += 1;
                        return NodeOutcome {
                            goodness: entry.value,
                            best_move: entry.best_move,
                            completed: true,
                        };
                    }
                    EntryFlag::Lower => alpha = max(alpha, entry.value),
                    EntryFlag::Upper => beta = beta.min(entry.value),
                }
                if alpha >= beta {
                    self.tt_cuts += 1;
                    return NodeOutcome {
                        goodness: entry.value,
                        best_move: entry.best_move,
                        completed: true,
                    };
                }
            }
        }

        let mut moves = self.move_pool.alloc();
        s.generate_moves(self.opts.max_moves, &mut moves);
        if self.opts.move_ordering == MoveOrdering::History {
            let history = &self.history;
            // sort_by is stable, so equally scored moves keep the game's
            // hint order.
            moves.sort_by(|a, b| history.score(b.hash()).cmp(&history.score(a.hash())));
        }

        let mut max_goodness = WORST_EVAL;
        let mut best_move = None;
        let mut completed = true;
        for i in 0..moves.len() {
            let m = moves[i];
            s.make_move(&m);
            let goodness = if i == 0 {
                -self.negascout(s, depth - 1, -beta, -alpha).goodness
            } else {
                // Null-window scout; re-search on a fail inside the window.
                let probe = -self.negascout(s, depth - 1, -alpha - 1, -alpha).goodness;
                if alpha < probe && probe < beta {
                    -self.negascout(s, depth - 1, -beta, -probe).goodness
                } else {
                    self.scout_cuts += 1;
                    probe
                }
            };
            s.undo_move(&m);
            if self.timer.exceeded(self.opts.max_time) {
                completed = false;
                break;
            }
            if goodness > max_goodness {
                max_goodness = goodness;
                best_move = Some(m);
                if max_goodness >= beta {
                    self.beta_cuts += 1;
                    break;
                }
            }
            alpha = max(alpha, max_goodness);
        }
        self.move_pool.free(moves);

        if completed {
            if let Some(best) = best_move {
                let flag = if max_goodness <= alpha_original {
                    EntryFlag::Upper
                } else if max_goodness >= beta {
                    EntryFlag::Lower
                } else {
                    EntryFlag::Exact
                };
                self.table.store(hash, max_goodness, depth, flag, best);
                self.history.bump(best.hash(), depth);
            }
        }

        NodeOutcome { goodness: max_goodness, best_move, completed }
    }
}

impl<S: GameState> Strategy<S> for Negascout<S> {
    fn choose_move(&mut self, root: &S) -> Result<S::M, SearchError> {
        if root.is_terminal() {
            return Err(SearchError::TerminalState(root.to_string()));
        }
        self.timer.restart();
        self.log.clear();
        self.actual_depth = 0;

        let mut legal = Vec::new();
        root.generate_moves(self.opts.max_moves, &mut legal);
        let _ = writeln!(self.log, "moves: {}", legal.len());

        let root_hash = root.hash();
        let mut best_move = None;
        for depth in 1..=self.opts.max_depth {
            self.reset_counters();
            let mut scratch = root.clone();
            let outcome = self.negascout(&mut scratch, depth, WORST_EVAL, BEST_EVAL);
            if outcome.completed {
                best_move = outcome.best_move;
                self.prev_value = outcome.goodness;
                self.actual_depth = depth;
                let _ = writeln!(
                    self.log,
                    "goodness: {} time: {} nodes: {} leafs: {} scout_cuts: {} beta_cuts: {} \
                     tt_hits: {} tt_exacts: {} tt_cuts: {} tt_size: {} max_depth: {}",
                    outcome.goodness,
                    self.timer,
                    self.nodes,
                    self.leafs,
                    self.scout_cuts,
                    self.beta_cuts,
                    self.tt_hits,
                    self.tt_exacts,
                    self.tt_cuts,
                    self.table.len(),
                    depth
                );
            }
            if self.timer.exceeded(self.opts.max_time) {
                break;
            }
        }

        // If not even depth 1 completed, fall back to the transposition
        // table's idea of the root, and failing that to the first legal
        // move; the returned move is always legal.
        let chosen = best_move
            .or_else(|| self.table.lookup(root_hash).and_then(|entry| entry.best_move))
            .filter(|m| legal.contains(m))
            .unwrap_or(legal[0]);
        Ok(chosen)
    }

    fn reset(&mut self) {
        self.table.clear();
        self.history.clear();
    }

    fn name(&self) -> &'static str {
        "Negascout"
    }

    fn stats(&self) -> String {
        self.log.clone()
    }
}
