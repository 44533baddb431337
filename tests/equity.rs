use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_chacha::ChaCha8Rng;

use holdem_cpu::cards::{Card, parse_cards};
use holdem_cpu::equity::{
    EquityBudget, estimate_win_rate, estimate_win_rate_parallel, estimate_with_budget,
};

fn cards(text: &str) -> Vec<Card> {
    parse_cards(text).expect("valid cards")
}

#[test]
fn pocket_aces_preflop_is_about_85_percent() {
    let hole = cards("As Ah");
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let rate = estimate_win_rate(&hole, &[], 20_000, &mut rng).unwrap();

    // Heads-up AA vs a random hand is ~85%; ties are scored as wins.
    assert!(rate > 0.82 && rate < 0.90, "rate={rate}");
}

#[test]
fn parallel_estimate_agrees_with_sequential_range() {
    let hole = cards("As Ah");
    let rate = estimate_win_rate_parallel(&hole, &[], 20_000, 11).unwrap();
    assert!(rate > 0.82 && rate < 0.90, "rate={rate}");
}

#[test]
fn board_flush_ties_count_as_wins() {
    // Hero plays the board's ace-high flush. Only the Ts (a straight flush) beats
    // it; every other opponent ties, and ties are counted as wins: 43/45.
    let hole = cards("2c 3d");
    let board = cards("As Ks Qs Js 9s");
    let mut rng = StdRng::seed_from_u64(7);
    let rate = estimate_win_rate(&hole, &board, 5_000, &mut rng).unwrap();
    assert!(rate > 0.92 && rate < 0.98, "rate={rate}");
}

#[test]
fn made_nuts_on_river_never_loses() {
    let hole = cards("Ah Kh");
    let board = cards("Qh Jh Th 2c 3d");
    let mut rng = StdRng::seed_from_u64(3);
    assert_eq!(estimate_win_rate(&hole, &board, 500, &mut rng).unwrap(), 1.0);
}

#[test]
fn weak_hand_on_scary_turn_is_an_underdog() {
    let hole = cards("2c 7d");
    let board = cards("Ah Kh Qd Js");
    let mut rng = StdRng::seed_from_u64(99);
    let rate = estimate_win_rate(&hole, &board, 3_000, &mut rng).unwrap();
    assert!(rate < 0.5, "rate={rate}");
}

#[test]
fn single_trial_is_binary() {
    let hole = cards("8s 8d");
    let board = cards("2c 9h Kd");
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let rate = estimate_win_rate(&hole, &board, 1, &mut rng).unwrap();
        assert!(rate == 0.0 || rate == 1.0);
    }
}

#[test]
fn same_seed_same_estimate() {
    let hole = cards("Tc 9c");
    let board = cards("8c 7d 2h");
    let a = estimate_win_rate(&hole, &board, 800, &mut StdRng::seed_from_u64(5)).unwrap();
    let b = estimate_win_rate(&hole, &board, 800, &mut StdRng::seed_from_u64(5)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn report_counts_wins_and_trials() {
    let hole = cards("Qs Qd");
    let mut rng = StdRng::seed_from_u64(21);
    let report = estimate_with_budget(&hole, &[], EquityBudget::trials(400), &mut rng).unwrap();
    assert_eq!(report.trials_run, 400);
    assert_eq!(report.win_rate, report.wins as f64 / 400.0);
}
