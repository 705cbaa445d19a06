use onecard_core::model::bid::Bid;
use onecard_core::scores::{ExpectedScore, aggregate, evaluate_all, expected_scores};
use onecard_core::simulate::Simulator;
use onecard_core::solver::ThresholdSolver;

fn score(numerator: u128, denominator: u128) -> ExpectedScore {
    ExpectedScore::new(numerator, denominator)
}

fn falling(from: u128, picks: u128) -> u128 {
    (0..picks).map(|k| from - k).product()
}

#[test]
fn two_player_scores_are_exact() {
    let report = expected_scores(2).unwrap();
    assert_eq!(report.scores, vec![score(209, 25), score(66, 25)]);
    let total: f64 = report.score_values().iter().sum();
    assert!((total - 11.0).abs() < 1e-9);
}

#[test]
fn three_player_scores_are_exact() {
    let report = expected_scores(3).unwrap();
    assert_eq!(report.total_weight, 61_250);
    assert_eq!(report.weighted_scores, vec![464_350, 569_880, 226_160]);
    assert_eq!(
        report.scores,
        vec![score(9287, 1225), score(56988, 6125), score(22616, 6125)]
    );
    assert_eq!(report.skipped_unreachable, 0);
    assert_eq!(report.skipped_illegal, 3);

    let passes = report.sequence(&[Bid::Zero, Bid::Zero, Bid::Zero]).unwrap();
    assert_eq!(passes.wins, vec![9080, 2490, 7050]);
    assert!(passes.dealer_forced);
}

#[test]
fn four_player_totals() {
    let report = expected_scores(4).unwrap();
    assert_eq!(report.total_weight, 2_940_000);
    assert_eq!(
        report.weighted_scores,
        vec![22_797_900, 27_678_780, 27_983_440, 11_200_480]
    );
    assert_eq!(report.sequences.len(), 12);
    assert_eq!(report.skipped_illegal, 4);
}

#[test]
fn five_player_drops_pinned_histories() {
    let report = expected_scores(5).unwrap();
    assert_eq!(report.total_weight, 138_099_254);
    assert_eq!(report.skipped_unreachable, 8);
    assert_eq!(report.skipped_illegal, 5);
    assert!(report.sequence(&[Bid::One; 5]).is_none());
}

#[test]
fn weight_covers_every_deal_when_nothing_is_pinned() {
    // Leader holds one of 25 ranks, the rest draw from the other 50.
    for players in 2..=4u128 {
        let report = expected_scores(players as usize).unwrap();
        assert_eq!(report.total_weight, 25 * falling(50, players - 1));
    }
}

#[test]
fn scores_stay_positive_and_bounded() {
    for players in 2..=4 {
        let report = expected_scores(players).unwrap();
        let values = report.score_values();
        assert_eq!(values.len(), players);
        for value in &values {
            assert!(*value >= 0.0 && *value <= 11.0, "players={players}: {values:?}");
        }
        // Exactly one seat takes the trick, and at most every seat predicts right.
        let total: f64 = values.iter().sum();
        assert!(total >= 1.0 && total <= 1.0 + 10.0 * players as f64);
    }
}

#[test]
fn solver_reuse_matches_fresh_aggregation() {
    let mut solver = ThresholdSolver::new();
    let first = solver.expected_scores(3).unwrap();
    let table = solver.table(3).unwrap();
    let rebuilt = aggregate(3, evaluate_all(&table)).unwrap();
    assert_eq!(first, rebuilt);
    assert_eq!(first, expected_scores(3).unwrap());
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_evaluation_matches_sequential() {
    use onecard_core::scores::evaluate_all_par;

    let table = ThresholdSolver::new().table(4).unwrap();
    assert_eq!(evaluate_all(&table), evaluate_all_par(&table));
}

#[test]
fn simulation_tracks_exact_two_player_scores() {
    let mut solver = ThresholdSolver::new();
    let exact = solver.expected_scores(2).unwrap().score_values();
    let table = solver.table(2).unwrap();
    let summary = Simulator::new(&table, 20251019).run(20_000);

    assert_eq!(summary.deals_scored, 20_000);
    assert_eq!(summary.deals_discarded, 0);
    for (seat, stats) in summary.seats.iter().enumerate() {
        assert!(
            (stats.mean - exact[seat]).abs() < 0.25,
            "seat {seat}: simulated {} vs exact {}",
            stats.mean,
            exact[seat]
        );
    }
    let total: f64 = summary.seats.iter().map(|s| s.mean).sum();
    assert!((total - 11.0).abs() < 1e-9);
}
