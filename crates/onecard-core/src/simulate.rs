//! Monte Carlo play of the equilibrium strategy, for cross-checking exact scores.

use crate::constraints::UNREACHABLE;
use crate::model::bid::{Bid, BidSequence, total_bid};
use crate::model::rank::{MAX_RANK, RankBand};
use crate::scores::{PREDICTION_POINTS, TRICK_POINTS};
use crate::table::ThresholdTable;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{Level, event};

/// Result of playing one deal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealOutcome {
    pub ranks: Vec<u8>,
    pub bids: BidSequence,
    pub winner: usize,
    /// Band of the winning card; a trump or the led suit always takes the trick.
    pub winning_band: RankBand,
    pub points: Vec<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SeatStats {
    pub mean: f64,
    pub std_error: f64,
    pub tricks_won: u64,
    pub correct_predictions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub players: usize,
    pub seed: u64,
    pub deals_requested: usize,
    pub deals_scored: usize,
    /// Deals whose bidding passed through a history the solver marks unreachable.
    pub deals_discarded: usize,
    pub seats: Vec<SeatStats>,
}

#[derive(Debug, Clone, Default)]
struct Accumulator {
    sum: f64,
    sum_sq: f64,
    tricks_won: u64,
    correct: u64,
}

impl Accumulator {
    fn add(&mut self, points: u32, won: bool, correct: bool) {
        let value = f64::from(points);
        self.sum += value;
        self.sum_sq += value * value;
        self.tricks_won += u64::from(won);
        self.correct += u64::from(correct);
    }

    fn finish(&self, samples: usize) -> SeatStats {
        if samples == 0 {
            return SeatStats::default();
        }
        let n = samples as f64;
        let mean = self.sum / n;
        let variance = if samples > 1 {
            ((self.sum_sq - n * mean * mean) / (n - 1.0)).max(0.0)
        } else {
            0.0
        };
        SeatStats {
            mean,
            std_error: (variance / n).sqrt(),
            tricks_won: self.tricks_won,
            correct_predictions: self.correct,
        }
    }
}

/// Deals cards and bids by the thresholds in a solved table.
pub struct Simulator<'a> {
    table: &'a ThresholdTable,
    rng: StdRng,
    seed: u64,
}

impl<'a> Simulator<'a> {
    pub fn new(table: &'a ThresholdTable, seed: u64) -> Self {
        Self {
            table,
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// The leader's card is trump or fixes the led suit; everyone else draws from the
    /// rest of the deck.
    pub fn deal(&mut self) -> Vec<u8> {
        let players = self.table.players();
        let (_, last_led) = RankBand::LedSuit.bounds();
        let leader = self.rng.gen_range(0..=last_led);
        let mut rest: Vec<u8> = (0..=MAX_RANK).filter(|&rank| rank != leader).collect();
        let (drawn, _) = rest.partial_shuffle(&mut self.rng, players - 1);
        let mut ranks = Vec::with_capacity(players);
        ranks.push(leader);
        ranks.extend_from_slice(drawn);
        ranks
    }

    /// Bids and scores `ranks`, or `None` when the bidding reaches an unreachable history.
    pub fn play(&self, ranks: &[u8]) -> Option<DealOutcome> {
        let players = self.table.players();
        debug_assert_eq!(ranks.len(), players);
        let mut bids = BidSequence::new();
        for (seat, &rank) in ranks.iter().enumerate() {
            let threshold = self.table.get(bids.as_slice())?;
            if threshold == UNREACHABLE {
                return None;
            }
            let mut bid = if rank < threshold { Bid::One } else { Bid::Zero };
            if seat + 1 == players && total_bid(bids.as_slice()) + usize::from(bid.value()) == 1 {
                bid = bid.flipped();
            }
            bids.push(bid);
        }

        let winner = ranks
            .iter()
            .enumerate()
            .min_by_key(|(_, rank)| **rank)
            .map(|(seat, _)| seat)?;
        let winning_band = RankBand::of(ranks[winner])?;
        debug_assert!(winning_band.can_win());
        let points = bids
            .as_slice()
            .iter()
            .enumerate()
            .map(|(seat, bid)| {
                let won = seat == winner;
                let correct = bid.claims_trick() == won;
                TRICK_POINTS * u32::from(won) + PREDICTION_POINTS * u32::from(correct)
            })
            .collect();

        Some(DealOutcome {
            ranks: ranks.to_vec(),
            bids,
            winner,
            winning_band,
            points,
        })
    }

    pub fn run(&mut self, deals: usize) -> SimulationSummary {
        let players = self.table.players();
        let mut seats = vec![Accumulator::default(); players];
        let mut scored = 0usize;
        let mut discarded = 0usize;

        for _ in 0..deals {
            let ranks = self.deal();
            let Some(outcome) = self.play(&ranks) else {
                discarded += 1;
                continue;
            };
            scored += 1;
            for (seat, acc) in seats.iter_mut().enumerate() {
                let won = seat == outcome.winner;
                let correct = outcome.bids.as_slice()[seat].claims_trick() == won;
                acc.add(outcome.points[seat], won, correct);
            }
        }

        let summary = SimulationSummary {
            players,
            seed: self.seed,
            deals_requested: deals,
            deals_scored: scored,
            deals_discarded: discarded,
            seats: seats.iter().map(|acc| acc.finish(scored)).collect(),
        };

        if tracing::enabled!(Level::INFO) {
            let means = summary
                .seats
                .iter()
                .map(|seat| format!("{:.3}", seat.mean))
                .collect::<Vec<_>>()
                .join(",");
            event!(
                target: "onecard_core::simulate",
                Level::INFO,
                players,
                seed = self.seed,
                deals,
                scored,
                discarded,
                means = %means,
            );
        }

        summary
    }
}
