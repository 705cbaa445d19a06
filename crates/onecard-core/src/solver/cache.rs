//! Memoized thresholds keyed by player count and bid history.

use super::evaluate::solve_prefix;
use crate::constraints::UNREACHABLE;
use crate::error::SolverError;
use crate::model::bid::{Bid, BidSequence};
use std::collections::HashMap;
use tracing::{Level, event};

/// Largest table the exact `u128` counts cover with room to spare.
pub const MAX_PLAYERS: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThresholdKey {
    players: usize,
    history: BidSequence,
}

impl ThresholdKey {
    pub fn new(players: usize, history: &[Bid]) -> Self {
        Self {
            players,
            history: BidSequence::with_bids(history.to_vec()),
        }
    }

    pub fn history(&self) -> &BidSequence {
        &self.history
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Equilibrium threshold solver owning its cache. Entries are never evicted.
#[derive(Debug, Default)]
pub struct ThresholdSolver {
    entries: HashMap<ThresholdKey, u8>,
    hits: u64,
    misses: u64,
}

impl ThresholdSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rank below which the bidder after `history` claims the trick; 0 when `history`
    /// cannot arise from equilibrium play.
    pub fn bid_threshold(&mut self, players: usize, history: &[Bid]) -> Result<u8, SolverError> {
        validate_history(players, history)?;
        let thresholds = self.prefix_thresholds(players, history);
        Ok(thresholds[history.len()])
    }

    /// Thresholds faced by every prefix of `history`, shortest first, ending with the one
    /// for `history` itself.
    pub(crate) fn prefix_thresholds(&mut self, players: usize, history: &[Bid]) -> Vec<u8> {
        let mut thresholds: Vec<u8> = Vec::with_capacity(history.len() + 1);
        for len in 0..=history.len() {
            let prefix = &history[..len];
            let threshold = if thresholds.contains(&UNREACHABLE) {
                UNREACHABLE
            } else {
                self.lookup_or_solve(players, prefix, &thresholds)
            };
            thresholds.push(threshold);
        }
        thresholds
    }

    fn lookup_or_solve(&mut self, players: usize, prefix: &[Bid], thresholds: &[u8]) -> u8 {
        let key = ThresholdKey::new(players, prefix);
        if let Some(&threshold) = self.entries.get(&key) {
            self.hits += 1;
            return threshold;
        }

        self.misses += 1;
        let threshold = solve_prefix(players, prefix, thresholds);
        if tracing::enabled!(Level::DEBUG) {
            event!(
                target: "onecard_core::solver",
                Level::DEBUG,
                players,
                history = %key.history(),
                threshold,
                cached = self.entries.len(),
            );
        }
        self.entries.insert(key, threshold);
        threshold
    }

    pub fn cached(&self, players: usize, history: &[Bid]) -> Option<u8> {
        self.entries.get(&ThresholdKey::new(players, history)).copied()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

/// Threshold computed with a solver that lives only for this call.
pub fn bid_threshold(players: usize, history: &[Bid]) -> Result<u8, SolverError> {
    ThresholdSolver::new().bid_threshold(players, history)
}

pub(crate) fn validate_players(players: usize) -> Result<(), SolverError> {
    if players == 0 || players > MAX_PLAYERS {
        return Err(SolverError::InvalidPlayerCount {
            players,
            max: MAX_PLAYERS,
        });
    }
    Ok(())
}

fn validate_history(players: usize, history: &[Bid]) -> Result<(), SolverError> {
    validate_players(players)?;
    if history.len() >= players {
        return Err(SolverError::HistoryTooLong {
            len: history.len(),
            players,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_queries_hit_the_cache() {
        let mut solver = ThresholdSolver::new();
        let first = solver.bid_threshold(3, &[]).unwrap();
        let misses = solver.stats().misses;
        let second = solver.bid_threshold(3, &[]).unwrap();
        assert_eq!(first, second);
        assert_eq!(solver.stats().misses, misses);
        assert_eq!(solver.stats().hits, 1);
    }

    #[test]
    fn prefixes_are_cached_on_the_way() {
        let mut solver = ThresholdSolver::new();
        solver.bid_threshold(3, &[Bid::One, Bid::Zero]).unwrap();
        assert_eq!(solver.cached(3, &[]), Some(15));
        assert_eq!(solver.cached(3, &[Bid::One]), Some(7));
        assert_eq!(solver.cached(3, &[Bid::One, Bid::Zero]), Some(7));
        assert_eq!(solver.stats().entries, 3);
    }

    #[test]
    fn unreachable_prefix_short_circuits() {
        let mut solver = ThresholdSolver::new();
        let thresholds = solver.prefix_thresholds(5, &[Bid::One; 4]);
        assert_eq!(thresholds, vec![8, 3, 1, 0, 0]);
        // Only the first zero needed solving; the longer history inherits it.
        assert_eq!(solver.stats().misses, 4);
        assert_eq!(solver.cached(5, &[Bid::One; 4]), None);
    }

    #[test]
    fn rejects_bad_inputs() {
        assert_eq!(
            bid_threshold(0, &[]),
            Err(SolverError::InvalidPlayerCount {
                players: 0,
                max: MAX_PLAYERS
            })
        );
        assert_eq!(
            bid_threshold(MAX_PLAYERS + 1, &[]),
            Err(SolverError::InvalidPlayerCount {
                players: MAX_PLAYERS + 1,
                max: MAX_PLAYERS
            })
        );
        assert_eq!(
            bid_threshold(2, &[Bid::One, Bid::One]),
            Err(SolverError::HistoryTooLong { len: 2, players: 2 })
        );
    }

    #[test]
    fn clear_resets_state() {
        let mut solver = ThresholdSolver::new();
        solver.bid_threshold(2, &[Bid::One]).unwrap();
        solver.clear();
        assert_eq!(solver.stats(), CacheStats::default());
        assert_eq!(solver.cached(2, &[]), None);
    }
}
