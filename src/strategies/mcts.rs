//! Monte-Carlo tree search with UCT selection and uniform random rollouts.
//!
//! The search tree lives in an arena owned by a single `choose_move` call:
//! children are reached through a per-node map keyed by move hash, and the
//! walk back to the root during backpropagation follows non-owning integer
//! parent indices, so there is no shared ownership anywhere in the tree.

use std::collections::HashMap;
use std::fmt::Write;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::super::interface::*;
use super::super::util::Timer;
use super::util::MovePool;

const MAX_SIMULATIONS: u32 = 10_000_000;
const WIN_SCORE: f64 = 1.0;
const DRAW_SCORE: f64 = 0.5;
const LOSE_SCORE: f64 = 0.0;

/// Options to use for the Monte-Carlo engine.
#[derive(Clone, Copy)]
pub struct MctsOptions {
    max_time: Duration,
    max_simulations: u32,
    uct_c: f64,
    virtual_visits: u32,
    seed: Option<u64>,
}

impl MctsOptions {
    pub fn new() -> Self {
        MctsOptions {
            max_time: Duration::from_secs(1),
            max_simulations: MAX_SIMULATIONS,
            uct_c: std::f64::consts::SQRT_2,
            virtual_visits: 5,
            seed: None,
        }
    }
}

impl Default for MctsOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl MctsOptions {
    /// Wall-clock budget per `choose_move`, polled between iterations so a
    /// rollout is never abandoned halfway through backpropagation.
    pub fn with_timeout(mut self, max_time: Duration) -> Self {
        self.max_time = max_time;
        self
    }

    pub fn with_max_simulations(mut self, max_simulations: u32) -> Self {
        self.max_simulations = max_simulations;
        self
    }

    pub fn with_uct_constant(mut self, uct_c: f64) -> Self {
        self.uct_c = uct_c;
        self
    }

    /// Visit count every new node starts with. The seed damps early
    /// exploitation of barely sampled children; 0 disables it.
    pub fn with_virtual_visits(mut self, virtual_visits: u32) -> Self {
        self.virtual_visits = virtual_visits;
        self
    }

    /// Fixes the rollout RNG for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

struct Node {
    visits: u32,
    score: f64,
    player_to_move: usize,
    parent: Option<usize>,
    children: HashMap<u64, usize>,
}

impl Node {
    fn new(player_to_move: usize, parent: Option<usize>, virtual_visits: u32) -> Node {
        Node {
            visits: virtual_visits,
            score: 0.0,
            player_to_move,
            parent,
            children: HashMap::new(),
        }
    }

    fn update_stats(&mut self, result: f64) {
        self.score += result;
        self.visits += 1;
    }
}

// Upper confidence bound from the perspective of the player choosing at the
// parent; the win ratio is inverted when the child's side to move is not
// the chooser.
fn uct(parent_visits: u32, parent_player: usize, child: &Node, c: f64) -> f64 {
    let visits = child.visits as f64;
    let ratio = if parent_player == child.player_to_move {
        child.score / visits
    } else {
        (visits - child.score) / visits
    };
    ratio + c * ((parent_visits as f64).ln() / visits).sqrt()
}

pub struct MonteCarloTreeSearch<S: GameState> {
    opts: MctsOptions,
    rng: StdRng,
    timer: Timer,
    move_pool: MovePool<S::M>,
    log: String,
}

impl<S: GameState> MonteCarloTreeSearch<S> {
    pub fn new(opts: MctsOptions) -> MonteCarloTreeSearch<S> {
        let rng = match opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        MonteCarloTreeSearch {
            opts,
            rng,
            timer: Timer::start(),
            move_pool: MovePool::default(),
            log: String::new(),
        }
    }

    // One iteration: descend by the tree policy, expand a single node, play
    // out the rest of the game at random, then push the result back up with
    // a flip at every step.
    fn simulate(&mut self, tree: &mut Vec<Node>, root: &S) {
        let mut state = root.clone();
        let mut node = 0;
        let mut moves = self.move_pool.alloc();
        loop {
            if state.is_terminal() {
                break;
            }
            state.generate_moves(usize::MAX, &mut moves);
            let m = tree_policy_move(tree, node, &moves, self.opts.uct_c);
            let key = m.hash();
            state.make_move(&m);
            let existing = tree[node].children.get(&key).copied();
            match existing {
                Some(child) => node = child,
                None => {
                    let child = tree.len();
                    tree.push(Node::new(
                        state.player_to_move(),
                        Some(node),
                        self.opts.virtual_visits,
                    ));
                    tree[node].children.insert(key, child);
                    node = child;
                    break;
                }
            }
        }

        let mut result = self.rollout(&mut state, &mut moves);
        self.move_pool.free(moves);

        let mut current = Some(node);
        while let Some(index) = current {
            tree[index].update_stats(result);
            result = 1.0 - result;
            current = tree[index].parent;
        }
    }

    // Plays uniformly random legal moves to the end of the game and scores
    // the outcome for whoever was to move at the starting state.
    fn rollout(&mut self, state: &mut S, moves: &mut Vec<S::M>) -> f64 {
        let rollout_player = state.player_to_move();
        while !state.is_terminal() {
            state.generate_moves(usize::MAX, moves);
            let m = moves[self.rng.gen_range(0..moves.len())];
            state.make_move(&m);
        }
        if state.is_winner(rollout_player) {
            WIN_SCORE
        } else if (0..state.num_players()).any(|player| state.is_winner(player)) {
            LOSE_SCORE
        } else {
            DRAW_SCORE
        }
    }
}

// The tree policy move at a node: the first legal move without a child gets
// expanded right away; once every move has a child, take the UCT argmax.
fn tree_policy_move<M: Move>(tree: &[Node], node: usize, moves: &[M], c: f64) -> M {
    let parent = &tree[node];
    let mut best = moves[0];
    let mut best_uct = f64::NEG_INFINITY;
    for &m in moves {
        match parent.children.get(&m.hash()) {
            None => return m,
            Some(&child) => {
                let value = uct(parent.visits, parent.player_to_move, &tree[child], c);
                if value > best_uct {
                    best_uct = value;
                    best = m;
                }
            }
        }
    }
    best
}

impl<S: GameState> Strategy<S> for MonteCarloTreeSearch<S> {
    fn choose_move(&mut self, root: &S) -> Result<S::M, SearchError> {
        if root.is_terminal() {
            return Err(SearchError::TerminalState(root.to_string()));
        }
        self.timer.restart();
        self.log.clear();

        let mut tree = vec![Node::new(root.player_to_move(), None, self.opts.virtual_visits)];
        let mut simulations = 0;
        while simulations < self.opts.max_simulations && !self.timer.exceeded(self.opts.max_time) {
            self.simulate(&mut tree, root);
            simulations += 1;
        }

        let mut legal = self.move_pool.alloc();
        root.generate_moves(usize::MAX, &mut legal);
        let _ = writeln!(self.log, "simulations: {}", simulations);
        let _ = writeln!(self.log, "moves: {}", legal.len());

        // The answer is the most visited root child; the exploration bonus
        // must not leak into the final choice.
        let mut chosen = legal[0];
        let mut max_visits = 0;
        for &m in legal.iter() {
            if let Some(&child) = tree[0].children.get(&m.hash()) {
                let node = &tree[child];
                let _ = writeln!(
                    self.log,
                    "move: {} score: {} visits: {}",
                    m, node.score, node.visits
                );
                if node.visits > max_visits {
                    max_visits = node.visits;
                    chosen = m;
                }
            }
        }
        self.move_pool.free(legal);
        Ok(chosen)
    }

    fn name(&self) -> &'static str {
        "MonteCarloTreeSearch"
    }

    fn stats(&self) -> String {
        self.log.clone()
    }
}
