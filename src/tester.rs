//! Engine-versus-engine tournament harness.
//!
//! Plays a sequence of games between one strategy per player seat, varies
//! the starting position between games to avoid replays, throws away games
//! that still duplicate an earlier one, and stops as soon as the exact
//! binomial confidence interval separates one player from an even score.

use std::collections::HashSet;

use crate::interface::*;
use crate::stats::{lower_bound_on_p, upper_bound_on_p};
use crate::util::{hash_combine, Timer};

// Per-side significance for a two-sided 99% confidence interval.
const SIGNIFICANCE_LEVEL: f64 = 0.005;

/// Aggregated results of a tournament: one win counter per player seat
/// plus the number of drawn games.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub wins: Vec<u32>,
    pub draws: u32,
}

impl OutcomeCounts {
    fn new(players: usize) -> OutcomeCounts {
        OutcomeCounts { wins: vec![0; players], draws: 0 }
    }

    /// Games that were actually counted (duplicates are discarded).
    pub fn games(&self) -> u32 {
        self.wins.iter().sum::<u32>() + self.draws
    }
}

pub struct Tester<S: GameState> {
    root: S,
    strategies: Vec<Box<dyn Strategy<S>>>,
    matches: u32,
    verbose: bool,
}

impl<S: GameState> Tester<S> {
    /// One strategy per player seat, in seat order. Fails when the number
    /// of strategies does not match the number of players in `root`.
    pub fn new(root: S, strategies: Vec<Box<dyn Strategy<S>>>) -> Result<Tester<S>, SearchError> {
        if strategies.len() != root.num_players() {
            return Err(SearchError::BadConfig(format!(
                "{} strategies for {} players",
                strategies.len(),
                root.num_players()
            )));
        }
        Ok(Tester { root, strategies, matches: u32::MAX, verbose: false })
    }

    /// Upper limit on games played; the statistical stop can end the
    /// tournament earlier.
    pub fn with_matches(mut self, matches: u32) -> Self {
        self.matches = matches;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn start(&mut self) -> Result<OutcomeCounts, SearchError> {
        let total_timer = Timer::start();
        let players = self.root.num_players();
        let mut counts = OutcomeCounts::new(players);
        let mut unique_games: HashSet<u64> = HashSet::new();
        let mut legal = Vec::new();

        for game in 1..=self.matches {
            let mut current = self.root.clone();
            // Vary the seed position so consecutive games differ: rotate
            // the starting seat half the time, swap player data half the
            // time.
            if game % 4 == 0 || game % 4 == 2 {
                let next = current.next_player(current.player_to_move());
                current.set_player_to_move(next);
            }
            if game % 4 == 0 || game % 4 == 3 {
                current.swap_players();
            }
            let mut game_hash = hash_combine(0, current.hash());
            if self.verbose {
                println!("{}", current);
            }

            while !current.is_terminal() {
                let seat = current.player_to_move();
                let strategy = &mut self.strategies[seat];
                strategy.reset();
                if self.verbose {
                    println!("{} {}", current.player_char(seat), strategy.name());
                }
                let move_timer = Timer::start();
                let scratch = current.clone();
                let m = strategy.choose_move(&scratch)?;
                if self.verbose {
                    print!("{}", strategy.stats());
                    println!("{}", move_timer);
                }
                current.generate_moves(usize::MAX, &mut legal);
                if !legal.contains(&m) {
                    return Err(SearchError::IllegalMove(format!(
                        "{} from {} in state:\n{}",
                        m,
                        strategy.name(),
                        current
                    )));
                }
                current.make_move(&m);
                game_hash = hash_combine(game_hash, current.hash());
                if self.verbose {
                    println!("{}", current);
                }
            }

            if !unique_games.insert(game_hash) {
                if self.verbose {
                    println!("Game {}: not unique, not counting\n", game);
                }
                continue;
            }

            let winner = (0..players).find(|&player| current.is_winner(player));
            match winner {
                Some(player) => counts.wins[player] += 1,
                None => counts.draws += 1,
            }
            let trials = unique_games.len() as f64;
            if self.verbose {
                match winner {
                    Some(player) => {
                        println!("Game {}: {} won", game, current.player_char(player))
                    }
                    None => println!("Game {}: draw", game),
                }
                println!("Unique games: {}", unique_games.len());
                for player in 0..players {
                    println!(
                        "{} {} wins: {}",
                        current.player_char(player),
                        self.strategies[player].name(),
                        counts.wins[player]
                    );
                }
                println!("Draws: {}", counts.draws);
            }

            let mut separated = false;
            for player in 0..players {
                let successes = counts.wins[player] as f64 + 0.5 * counts.draws as f64;
                let lower = lower_bound_on_p(trials, successes, SIGNIFICANCE_LEVEL);
                let upper = upper_bound_on_p(trials, successes, SIGNIFICANCE_LEVEL);
                if self.verbose {
                    println!(
                        "{} ratio: {:.3} bounds: [{:.3}, {:.3}]",
                        current.player_char(player),
                        successes / trials,
                        lower,
                        upper
                    );
                }
                if upper < 0.5 || lower > 0.5 {
                    separated = true;
                }
            }
            if self.verbose {
                println!();
            }
            if separated {
                if self.verbose {
                    println!("Total time: {}", total_timer);
                }
                break;
            }
        }
        Ok(counts)
    }
}
