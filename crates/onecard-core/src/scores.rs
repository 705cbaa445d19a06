//! Expected score per seat under equilibrium bidding.

use crate::constraints::{DealRanges, UNREACHABLE, deal_ranges};
use crate::counting::{AtomChoices, AtomWeights, count_assignments};
use crate::error::SolverError;
use crate::model::bid::{Bid, BidSequence};
use crate::partition::{atoms_per_range, deintersect_masks};
use crate::solver::ThresholdSolver;
use crate::table::ThresholdTable;
use core::fmt;
use serde::{Deserialize, Serialize};
use tracing::{Level, event};

/// Points for taking the trick.
pub const TRICK_POINTS: u32 = 1;

/// Points for predicting the outcome correctly.
pub const PREDICTION_POINTS: u32 = 10;

/// Exact non-negative rational in lowest terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpectedScore {
    pub numerator: u128,
    pub denominator: u128,
}

impl ExpectedScore {
    pub fn new(numerator: u128, denominator: u128) -> Self {
        assert!(denominator > 0, "expected score over zero weight");
        let divisor = gcd(numerator, denominator);
        Self {
            numerator: numerator / divisor,
            denominator: denominator / divisor,
        }
    }

    pub fn as_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

impl fmt::Display for ExpectedScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a.max(1)
}

/// Weighted outcome of one scored bid sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceOutcome {
    pub bids: BidSequence,
    pub thresholds: Vec<u8>,
    pub dealer_forced: bool,
    /// Arrangements in which each seat takes the trick.
    pub wins: Vec<u128>,
    pub weight: u128,
}

impl SequenceOutcome {
    /// Weighted score of `seat`: a point per trick taken plus the prediction bonus.
    pub fn seat_score(&self, seat: usize) -> u128 {
        let won = self.wins[seat];
        let correct = match self.bids.as_slice()[seat] {
            Bid::One => won,
            Bid::Zero => self.weight - won,
        };
        u128::from(TRICK_POINTS) * won + u128::from(PREDICTION_POINTS) * correct
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceEval {
    Unreachable,
    Illegal,
    Scored(SequenceOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub players: usize,
    /// Total arrangement count over all scored sequences.
    pub total_weight: u128,
    pub weighted_scores: Vec<u128>,
    pub scores: Vec<ExpectedScore>,
    pub sequences: Vec<SequenceOutcome>,
    pub skipped_unreachable: usize,
    pub skipped_illegal: usize,
}

impl ScoreReport {
    pub fn score_values(&self) -> Vec<f64> {
        self.scores.iter().map(|score| score.as_f64()).collect()
    }

    pub fn sequence(&self, bids: &[Bid]) -> Option<&SequenceOutcome> {
        self.sequences
            .iter()
            .find(|outcome| outcome.bids.as_slice() == bids)
    }
}

/// Scores one complete bid sequence against the thresholds in `table`.
pub fn evaluate_sequence(table: &ThresholdTable, bids: &BidSequence) -> SequenceEval {
    let players = table.players();
    debug_assert_eq!(bids.len(), players);
    let Some(thresholds) = table.prefix_thresholds(bids.prefix(players - 1)) else {
        return SequenceEval::Unreachable;
    };
    if thresholds.contains(&UNREACHABLE) {
        return SequenceEval::Unreachable;
    }
    let Some(DealRanges {
        masks,
        dealer_forced,
    }) = deal_ranges(bids.as_slice(), &thresholds)
    else {
        return SequenceEval::Illegal;
    };

    let atoms = deintersect_masks(&masks);
    let options = atoms_per_range(&masks, &atoms);
    let mut wins = vec![0u128; players];
    for assignment in AtomChoices::new(&options) {
        let weights = AtomWeights::from_assignment(&assignment);
        let Some((lowest, sharing)) = weights.lowest() else {
            continue;
        };
        // Seats sharing the lowest atom are equally likely to hold its best card.
        let per_seat = count_assignments(&weights) / u128::from(sharing);
        for (seat, atom) in assignment.iter().enumerate() {
            if *atom == lowest {
                wins[seat] += per_seat;
            }
        }
    }

    let weight = wins.iter().sum();
    SequenceEval::Scored(SequenceOutcome {
        bids: bids.clone(),
        thresholds,
        dealer_forced,
        wins,
        weight,
    })
}

/// Evaluations of every complete sequence in lexicographic order.
pub fn evaluate_all(table: &ThresholdTable) -> Vec<SequenceEval> {
    let players = table.players();
    (0..1u32 << players)
        .map(|bits| evaluate_sequence(table, &BidSequence::from_bits(bits, players)))
        .collect()
}

#[cfg(feature = "parallel")]
mod par {
    use super::*;
    use rayon::prelude::*;

    /// Same as [`evaluate_all`], spreading sequences across the rayon pool. The table is
    /// only read, so no locking is involved.
    pub fn evaluate_all_par(table: &ThresholdTable) -> Vec<SequenceEval> {
        let players = table.players();
        (0..1u32 << players)
            .into_par_iter()
            .map(|bits| evaluate_sequence(table, &BidSequence::from_bits(bits, players)))
            .collect()
    }
}

#[cfg(feature = "parallel")]
pub use par::evaluate_all_par;

/// Folds per-sequence evaluations into per-seat expected scores.
pub fn aggregate(
    players: usize,
    evaluations: Vec<SequenceEval>,
) -> Result<ScoreReport, SolverError> {
    let mut total_weight: u128 = 0;
    let mut weighted_scores = vec![0u128; players];
    let mut sequences = Vec::new();
    let mut skipped_unreachable = 0usize;
    let mut skipped_illegal = 0usize;

    for evaluation in evaluations {
        match evaluation {
            SequenceEval::Unreachable => skipped_unreachable += 1,
            SequenceEval::Illegal => skipped_illegal += 1,
            SequenceEval::Scored(outcome) => {
                total_weight += outcome.weight;
                for (seat, total) in weighted_scores.iter_mut().enumerate() {
                    *total += outcome.seat_score(seat);
                }
                sequences.push(outcome);
            }
        }
    }

    if total_weight == 0 {
        return Err(SolverError::NoReachableSequences { players });
    }

    let scores = weighted_scores
        .iter()
        .map(|&score| ExpectedScore::new(score, total_weight))
        .collect();

    Ok(ScoreReport {
        players,
        total_weight,
        weighted_scores,
        scores,
        sequences,
        skipped_unreachable,
        skipped_illegal,
    })
}

impl ThresholdSolver {
    /// Expected score of every seat, reusing and extending this solver's cache.
    pub fn expected_scores(&mut self, players: usize) -> Result<ScoreReport, SolverError> {
        let table = self.table(players)?;

        #[cfg(feature = "parallel")]
        let evaluations = evaluate_all_par(&table);
        #[cfg(not(feature = "parallel"))]
        let evaluations = evaluate_all(&table);

        let report = aggregate(players, evaluations)?;
        if tracing::enabled!(Level::INFO) {
            event!(
                target: "onecard_core::scores",
                Level::INFO,
                players,
                total_weight = %report.total_weight,
                scored = report.sequences.len(),
                skipped_unreachable = report.skipped_unreachable,
                skipped_illegal = report.skipped_illegal,
                scores = ?report.score_values(),
            );
        }
        Ok(report)
    }
}

/// Expected scores computed with a fresh solver.
pub fn expected_scores(players: usize) -> Result<ScoreReport, SolverError> {
    ThresholdSolver::new().expected_scores(players)
}
