//! Generic adversarial search for perfect-information sequential games.
//!
//! A game exposes its rules through the [`GameState`] capability trait and
//! gets two interchangeable engines in return: [`Negascout`], an
//! iterative-deepening alpha-beta search with a transposition table and
//! history-heuristic move ordering, and [`MonteCarloTreeSearch`], a UCT
//! tree search with uniform random rollouts. The [`Tester`] harness plays
//! engines against each other until one is statistically separated from an
//! even score.
//!
//! Everything runs on the calling thread; the only interruption mechanism
//! is the cooperative wall-clock budget each engine polls during search.

pub mod games;
pub mod interface;
pub mod stats;
pub mod strategies;
pub mod tester;
pub mod util;

pub use interface::*;
pub use strategies::mcts::{MctsOptions, MonteCarloTreeSearch};
pub use strategies::negascout::{MoveOrdering, Negascout, NegascoutOptions};
pub use strategies::random::RandomStrategy;
pub use tester::{OutcomeCounts, Tester};
pub use util::Timer;
