//! A baseline strategy that plays a uniformly random legal move.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::super::interface::*;

pub struct RandomStrategy {
    rng: StdRng,
}

impl RandomStrategy {
    pub fn new() -> RandomStrategy {
        RandomStrategy { rng: StdRng::from_entropy() }
    }

    pub fn with_seed(seed: u64) -> RandomStrategy {
        RandomStrategy { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Default for RandomStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GameState> Strategy<S> for RandomStrategy {
    fn choose_move(&mut self, state: &S) -> Result<S::M, SearchError> {
        let mut moves = Vec::new();
        state.generate_moves(usize::MAX, &mut moves);
        if moves.is_empty() {
            return Err(SearchError::TerminalState(state.to_string()));
        }
        Ok(moves[self.rng.gen_range(0..moves.len())])
    }

    fn name(&self) -> &'static str {
        "Random"
    }
}
