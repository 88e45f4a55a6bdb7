//! End-to-end engine scenarios on the demo games, plus the engine-level
//! invariants: legality, terminal-input errors, value equivalence with a
//! plain full-window search, and insensitivity to move order.

use std::time::Duration;

use gamesearch::games::connect_four::{ConnectFourMove, ConnectFourState};
use gamesearch::games::go::{GoMove, GoState};
use gamesearch::games::isola::IsolaState;
use gamesearch::games::tic_tac_toe::{TicTacToeMove, TicTacToeState};
use gamesearch::*;

fn negascout_engine<S: GameState>() -> Negascout<S> {
    Negascout::new(NegascoutOptions::new().with_timeout(Duration::from_secs(5)))
}

fn mcts_engine<S: GameState>(simulations: u32) -> MonteCarloTreeSearch<S> {
    MonteCarloTreeSearch::new(
        MctsOptions::new()
            .with_max_simulations(simulations)
            .with_timeout(Duration::from_secs(30))
            .with_seed(12345),
    )
}

#[test]
fn tic_tac_toe_finish_negascout() {
    let state = TicTacToeState::from_grid("XX_ _O_ ___", 'X').unwrap();
    let m = negascout_engine().choose_move(&state).unwrap();
    assert_eq!(m, TicTacToeMove::new(2, 0));
}

#[test]
fn tic_tac_toe_finish_mcts() {
    let state = TicTacToeState::from_grid("XX_ _O_ ___", 'X').unwrap();
    let m = mcts_engine(10_000).choose_move(&state).unwrap();
    assert_eq!(m, TicTacToeMove::new(2, 0));
}

#[test]
fn tic_tac_toe_block_negascout() {
    let state = TicTacToeState::from_grid("O__ OX_ ___", 'X').unwrap();
    let m = negascout_engine().choose_move(&state).unwrap();
    assert_eq!(m, TicTacToeMove::new(0, 2));
}

#[test]
fn tic_tac_toe_block_mcts() {
    let state = TicTacToeState::from_grid("O__ OX_ ___", 'X').unwrap();
    let m = mcts_engine(30_000).choose_move(&state).unwrap();
    assert_eq!(m, TicTacToeMove::new(0, 2));
}

#[test]
fn connect_four_winning_drop_negascout() {
    let state = ConnectFourState::from_grid(
        "___12___\
         ___11___\
         ___21___\
         ___21___\
         __112_1_\
         _222121_\
         _2211212",
    )
    .unwrap();
    let m = negascout_engine().choose_move(&state).unwrap();
    assert_eq!(m, ConnectFourMove::new(6));
}

#[test]
fn connect_four_winning_drop_mcts() {
    let state = ConnectFourState::from_grid(
        "___12___\
         ___11___\
         ___21___\
         ___21___\
         __112_1_\
         _222121_\
         _2211212",
    )
    .unwrap();
    let m = mcts_engine(10_000).choose_move(&state).unwrap();
    assert_eq!(m, ConnectFourMove::new(6));
}

#[test]
fn isola_moves_start_at_the_pawn() {
    let state = IsolaState::from_grid(
        "___2___\
         _______\
         _______\
         _______\
         _______\
         _______\
         ___1___",
        '1',
    )
    .unwrap();
    let m = Negascout::new(
        NegascoutOptions::new()
            .with_max_moves(25)
            .with_timeout(Duration::from_millis(200)),
    )
    .choose_move(&state)
    .unwrap();
    assert_eq!((m.from_x, m.from_y), (3, 6));

    let m = mcts_engine(2_000).choose_move(&state).unwrap();
    assert_eq!((m.from_x, m.from_y), (3, 6));
}

#[test]
fn go_capture_mcts() {
    let state = GoState::from_grid(
        "__1__\
         __212\
         _1212\
         _1212\
         __12_",
    )
    .unwrap();
    let mut engine = MonteCarloTreeSearch::new(
        MctsOptions::new()
            .with_max_simulations(5_000)
            .with_timeout(Duration::from_secs(120))
            .with_seed(12345),
    );
    let m = engine.choose_move(&state).unwrap();
    assert_eq!(m, GoMove::new(1, 1));
}

#[test]
fn chosen_moves_are_always_legal() {
    let state = IsolaState::new();
    let mut legal = Vec::new();
    state.generate_moves(usize::MAX, &mut legal);

    // A zero budget forces the no-completed-iteration fallback path.
    let m = Negascout::new(NegascoutOptions::new().with_timeout(Duration::from_secs(0)))
        .choose_move(&state)
        .unwrap();
    assert!(legal.contains(&m));

    let m = MonteCarloTreeSearch::new(
        MctsOptions::new()
            .with_max_simulations(0)
            .with_seed(7),
    )
    .choose_move(&state)
    .unwrap();
    assert!(legal.contains(&m));

    let m = RandomStrategy::with_seed(7).choose_move(&state).unwrap();
    assert!(legal.contains(&m));
}

#[test]
fn terminal_input_is_an_error() {
    let state = TicTacToeState::from_grid("XXX OO_ ___", 'O').unwrap();
    assert!(matches!(
        negascout_engine().choose_move(&state),
        Err(SearchError::TerminalState(_))
    ));
    assert!(matches!(
        mcts_engine(100).choose_move(&state),
        Err(SearchError::TerminalState(_))
    ));
    assert!(matches!(
        RandomStrategy::with_seed(1).choose_move(&state),
        Err(SearchError::TerminalState(_))
    ));
}

// Reference full-window negamax without any of the engine machinery.
fn reference_negamax<S: GameState>(state: &mut S, depth: u8) -> Evaluation {
    if depth == 0 || state.is_terminal() {
        return state.goodness();
    }
    let mut moves = Vec::new();
    state.generate_moves(usize::MAX, &mut moves);
    let mut best = WORST_EVAL;
    for m in &moves {
        state.make_move(m);
        let value = -reference_negamax(state, depth - 1);
        state.undo_move(m);
        best = best.max(value);
    }
    best
}

#[test]
fn negascout_matches_reference_values() {
    let positions = [
        TicTacToeState::new(),
        TicTacToeState::from_grid("X________", 'O').unwrap(),
        TicTacToeState::from_grid("XX__O___O", 'X').unwrap(),
        TicTacToeState::from_grid("O__ OX_ ___", 'X').unwrap(),
    ];
    for state in positions.iter() {
        for depth in 1..=4 {
            let expected = reference_negamax(&mut state.clone(), depth);
            let mut engine = Negascout::<TicTacToeState>::new(
                NegascoutOptions::new()
                    .with_max_depth(depth)
                    .with_timeout(Duration::from_secs(3600)),
            );
            engine.choose_move(state).unwrap();
            assert_eq!(engine.root_value(), expected, "depth {} of\n{}", depth, state);
        }
    }
}

// Delegates to tic-tac-toe but reverses the move list, to show the root
// value does not depend on the game's hint order.
#[derive(Clone, Debug, PartialEq, Eq)]
struct ReversedMoves(TicTacToeState);

impl std::fmt::Display for ReversedMoves {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl GameState for ReversedMoves {
    type M = TicTacToeMove;

    fn player_to_move(&self) -> usize {
        self.0.player_to_move()
    }

    fn set_player_to_move(&mut self, player: usize) {
        self.0.set_player_to_move(player)
    }

    fn num_players(&self) -> usize {
        self.0.num_players()
    }

    fn generate_moves(&self, max_moves: usize, moves: &mut Vec<TicTacToeMove>) {
        self.0.generate_moves(max_moves, moves);
        moves.reverse();
    }

    fn make_move(&mut self, m: &TicTacToeMove) {
        self.0.make_move(m)
    }

    fn undo_move(&mut self, m: &TicTacToeMove) {
        self.0.undo_move(m)
    }

    fn is_terminal(&self) -> bool {
        self.0.is_terminal()
    }

    fn is_winner(&self, player: usize) -> bool {
        self.0.is_winner(player)
    }

    fn goodness(&self) -> Evaluation {
        self.0.goodness()
    }

    fn hash(&self) -> u64 {
        self.0.hash()
    }
}

#[test]
fn negascout_root_value_is_order_insensitive() {
    let base = TicTacToeState::from_grid("X___O___X", 'O').unwrap();
    let reversed = ReversedMoves(base.clone());
    for depth in 1..=5 {
        let opts = NegascoutOptions::new()
            .with_max_depth(depth)
            .with_timeout(Duration::from_secs(3600));
        let mut straight = Negascout::<TicTacToeState>::new(opts);
        straight.choose_move(&base).unwrap();
        let mut flipped = Negascout::<ReversedMoves>::new(opts);
        flipped.choose_move(&reversed).unwrap();
        assert_eq!(straight.root_value(), flipped.root_value(), "depth {}", depth);
    }
}

#[test]
fn mcts_visits_concentrate_on_the_winning_move() {
    // With the budget raised, the most visited child stays the mating
    // move and its lead grows; both virtual-visit settings must agree.
    let state = TicTacToeState::from_grid("XX_ _O_ ___", 'X').unwrap();
    for &virtual_visits in &[0, 5] {
        let mut engine = MonteCarloTreeSearch::new(
            MctsOptions::new()
                .with_max_simulations(20_000)
                .with_timeout(Duration::from_secs(30))
                .with_virtual_visits(virtual_visits)
                .with_seed(99),
        );
        let m = engine.choose_move(&state).unwrap();
        assert_eq!(m, TicTacToeMove::new(2, 0), "virtual visits {}", virtual_visits);
    }
}
