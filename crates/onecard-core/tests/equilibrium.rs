use onecard_core::model::bid::{Bid, BidSequence};
use onecard_core::solver::{FOLLOWER_LIMIT, LEADER_LIMIT, ThresholdSolver, bid_threshold};

fn seq(text: &str) -> BidSequence {
    text.parse().expect("valid bid string")
}

fn threshold(solver: &mut ThresholdSolver, players: usize, history: &str) -> u8 {
    solver
        .bid_threshold(players, seq(history).as_slice())
        .expect("valid history")
}

#[test]
fn pinned_thresholds_for_small_tables() {
    let expected: &[(usize, &[(&str, u8)])] = &[
        (2, &[("-", 25), ("0", 0), ("1", 12)]),
        (
            3,
            &[
                ("-", 15),
                ("0", 12),
                ("1", 7),
                ("00", 12),
                ("01", 6),
                ("10", 7),
                ("11", 3),
            ],
        ),
        (
            4,
            &[
                ("-", 11),
                ("0", 12),
                ("1", 5),
                ("01", 5),
                ("11", 2),
                ("001", 6),
                ("011", 2),
                ("101", 2),
                ("111", 1),
            ],
        ),
        (
            5,
            &[
                ("-", 8),
                ("1", 3),
                ("11", 1),
                ("111", 0),
                ("1011", 0),
                ("1000", 4),
                ("0000", 12),
            ],
        ),
    ];

    let mut solver = ThresholdSolver::new();
    for (players, cases) in expected {
        for (history, value) in cases.iter() {
            assert_eq!(
                threshold(&mut solver, *players, history),
                *value,
                "players={players} history={history}"
            );
        }
    }
}

#[test]
fn lead_threshold_is_stable_and_bounded() {
    let mut shared = ThresholdSolver::new();
    for players in 1..=5 {
        let first = shared.bid_threshold(players, &[]).unwrap();
        let again = shared.bid_threshold(players, &[]).unwrap();
        let fresh = bid_threshold(players, &[]).unwrap();
        assert_eq!(first, again);
        assert_eq!(first, fresh);
        assert!(first <= LEADER_LIMIT, "players={players} threshold={first}");
    }
    assert_eq!(bid_threshold(1, &[]).unwrap(), LEADER_LIMIT);
}

#[test]
fn shared_cache_agrees_with_fresh_solvers() {
    let mut shared = ThresholdSolver::new();
    for players in 2..=4 {
        let table = shared.table(players).unwrap();
        for entry in table.entries() {
            let fresh = bid_threshold(players, entry.history.as_slice()).unwrap();
            assert_eq!(entry.threshold, fresh, "players={players} {}", entry.history);
        }
    }
}

#[test]
fn follower_thresholds_never_exceed_trump_count() {
    let mut solver = ThresholdSolver::new();
    for players in 2..=4 {
        let table = solver.table(players).unwrap();
        for entry in table.entries().iter().filter(|e| !e.history.is_empty()) {
            assert!(
                entry.threshold <= FOLLOWER_LIMIT,
                "players={players} {} -> {}",
                entry.history,
                entry.threshold
            );
        }
    }
}

#[test]
fn claiming_instead_of_passing_never_raises_the_next_threshold() {
    let mut solver = ThresholdSolver::new();
    for players in 2..=4 {
        let table = solver.table(players).unwrap();
        for entry in table.entries() {
            if entry.history.len() + 1 >= players {
                continue;
            }
            let mut passed = entry.history.clone();
            passed.push(Bid::Zero);
            let mut claimed = entry.history.clone();
            claimed.push(Bid::One);
            let (Some(after_pass), Some(after_claim)) =
                (table.get(passed.as_slice()), table.get(claimed.as_slice()))
            else {
                panic!("missing table entry after {}", entry.history);
            };
            if after_pass == 0 || after_claim == 0 {
                continue;
            }
            assert!(
                after_claim <= after_pass,
                "players={players} after {}: claim {after_claim} > pass {after_pass}",
                entry.history
            );
        }
    }
}

#[test]
fn later_thresholds_fall_as_claims_accumulate() {
    let mut solver = ThresholdSolver::new();
    for players in 2..=4 {
        let table = solver.table(players).unwrap();
        for len in 1..players {
            let unclaimed = vec![Bid::Zero; len];
            let ceiling = match table.get(&unclaimed) {
                Some(value) if value != 0 => value,
                _ => FOLLOWER_LIMIT,
            };

            // Highest reachable threshold after each number of claims.
            let mut highest = vec![None::<u8>; len + 1];
            for entry in table.entries() {
                if entry.history.len() != len || !entry.reachable {
                    continue;
                }
                assert!(
                    entry.threshold <= ceiling,
                    "players={players} {} -> {} above {ceiling}",
                    entry.history,
                    entry.threshold
                );
                let slot = &mut highest[entry.history.total()];
                *slot = Some(slot.map_or(entry.threshold, |seen| seen.max(entry.threshold)));
            }

            let observed: Vec<u8> = highest.into_iter().flatten().collect();
            assert!(
                observed.windows(2).all(|pair| pair[1] <= pair[0]),
                "players={players} len={len}: {observed:?}"
            );
        }
    }

    let four = solver.table(4).unwrap();
    let by_claims: Vec<u8> = ["000", "001", "011", "111"]
        .iter()
        .map(|history| four.get(seq(history).as_slice()).expect("entry"))
        .collect();
    assert_eq!(by_claims, vec![12, 6, 2, 1]);
}

#[test]
fn contradictory_history_is_unreachable() {
    // With two seats the leader always claims, so a leading pass never happens.
    assert_eq!(bid_threshold(2, &[Bid::Zero]).unwrap(), 0);

    // Three claims pin the third bidder to the top trump; nobody after can ever win.
    let mut solver = ThresholdSolver::new();
    assert_eq!(threshold(&mut solver, 5, "111"), 0);
    assert_eq!(threshold(&mut solver, 5, "1110"), 0);
    assert_eq!(threshold(&mut solver, 5, "1111"), 0);
}
