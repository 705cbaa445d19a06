//! Thresholds for every bid history of one table size.

use crate::constraints::UNREACHABLE;
use crate::error::SolverError;
use crate::model::bid::{Bid, BidSequence};
use crate::solver::{ThresholdSolver, validate_players};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub history: BidSequence,
    pub threshold: u8,
    pub reachable: bool,
}

/// Histories of length `0..players`, grouped by length and in lexicographic order within
/// each length, so a history of length `l` with bit pattern `b` sits at `2^l - 1 + b`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdTable {
    players: usize,
    entries: Vec<ThresholdEntry>,
}

impl ThresholdTable {
    pub fn players(&self) -> usize {
        self.players
    }

    pub fn entries(&self) -> &[ThresholdEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Threshold for the bidder following `history`.
    pub fn get(&self, history: &[Bid]) -> Option<u8> {
        self.entries
            .get(entry_index(history)?)
            .map(|entry| entry.threshold)
    }

    /// Thresholds for every prefix of `history`, shortest first, including `history`.
    pub fn prefix_thresholds(&self, history: &[Bid]) -> Option<Vec<u8>> {
        (0..=history.len())
            .map(|len| self.get(&history[..len]))
            .collect()
    }

    pub fn unreachable(&self) -> impl Iterator<Item = &ThresholdEntry> {
        self.entries.iter().filter(|entry| !entry.reachable)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn entry_index(history: &[Bid]) -> Option<usize> {
    let len = u32::try_from(history.len()).ok().filter(|len| *len < usize::BITS - 1)?;
    let bits = history
        .iter()
        .fold(0usize, |acc, bid| (acc << 1) | usize::from(bid.value()));
    Some((1usize << len) - 1 + bits)
}

impl ThresholdSolver {
    /// Solves every history for a table of `players` seats.
    pub fn table(&mut self, players: usize) -> Result<ThresholdTable, SolverError> {
        validate_players(players)?;
        let mut entries = Vec::with_capacity((1usize << players) - 1);
        for len in 0..players {
            for bits in 0..1u32 << len {
                let history = BidSequence::from_bits(bits, len);
                let threshold = self.bid_threshold(players, history.as_slice())?;
                entries.push(ThresholdEntry {
                    history,
                    threshold,
                    reachable: threshold != UNREACHABLE,
                });
            }
        }
        Ok(ThresholdTable { players, entries })
    }
}
