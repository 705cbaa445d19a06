//! Win/loss tallies for the next bidder's possible ranks.

use crate::constraints::history_ranges;
use crate::counting::{AtomChoices, AtomWeights, count_assignments};
use crate::model::bid::Bid;
use crate::model::mask::{RankMask, range_to_mask};
use crate::model::rank::{RANK_COUNT, RankBand};
use crate::partition::{atoms_per_range, deintersect_masks};

/// The leader can win holding trump or the led suit.
pub const LEADER_LIMIT: u8 = RankBand::LedSuit.bounds().1 + 1;

/// Later bidders only take the trick with a trump.
pub const FOLLOWER_LIMIT: u8 = RankBand::Trump.bounds().1 + 1;

/// Ordered arrangements of the other seats' cards in which my card at each rank wins or
/// loses the trick.
#[derive(Debug, Clone)]
pub(crate) struct RankTally {
    wins: [u128; RANK_COUNT as usize],
    losses: [u128; RANK_COUNT as usize],
}

impl RankTally {
    fn new() -> Self {
        Self {
            wins: [0; RANK_COUNT as usize],
            losses: [0; RANK_COUNT as usize],
        }
    }

    /// Adds every arrangement in which the other seats hold cards from `assignment`.
    fn record(&mut self, assignment: &[RankMask], upper_limit: u8) {
        let weights = AtomWeights::from_assignment(assignment);
        let Some((lowest, lowest_weight)) = weights.lowest() else {
            return;
        };
        let (lo, hi) = lowest.range();

        let outright = count_assignments(&weights);
        for rank in 0..usize::from(lo) {
            self.wins[rank] += outright;
        }

        // Arrangements with my card fixed at one particular rank of the lowest atom.
        let mine_in_lowest =
            count_assignments(&weights.with_extra(lowest)) / u128::from(lowest.width());

        let mut narrowed = weights.clone();
        for rank in lo..hi {
            narrowed.remove(range_to_mask(rank, hi));
            narrowed.set(range_to_mask(rank + 1, hi), lowest_weight);
            let beaten = count_assignments(&narrowed);
            self.wins[usize::from(rank)] += beaten;
            self.losses[usize::from(rank)] += mine_in_lowest - beaten;
        }

        for rank in hi..upper_limit {
            let holder = assignment.iter().copied().find(|atom| atom.contains(rank));
            let lost = match holder {
                Some(atom) => {
                    count_assignments(&weights.with_extra(atom)) / u128::from(atom.width())
                }
                None => outright,
            };
            self.losses[usize::from(rank)] += lost;
        }
    }

    /// First rank at which bidding 1 stops paying off. Ties count as a flip, which also
    /// turns a history with no arrangements at all into a threshold of 0.
    fn first_flip(&self, upper_limit: u8) -> u8 {
        (0..upper_limit)
            .find(|&rank| self.wins[usize::from(rank)] <= self.losses[usize::from(rank)])
            .unwrap_or(upper_limit)
    }
}

/// Threshold for the bidder following `history`, given the thresholds the earlier seats
/// bid against. Every entry of `thresholds` must be reachable.
pub(crate) fn solve_prefix(players: usize, history: &[Bid], thresholds: &[u8]) -> u8 {
    let upper_limit = if history.is_empty() {
        LEADER_LIMIT
    } else {
        FOLLOWER_LIMIT
    };

    let ranges = history_ranges(players, history, thresholds);
    if ranges.is_empty() {
        // Nobody else holds a card.
        return upper_limit;
    }

    let atoms = deintersect_masks(&ranges);
    let options = atoms_per_range(&ranges, &atoms);
    let mut tally = RankTally::new();
    for assignment in AtomChoices::new(&options) {
        tally.record(&assignment, upper_limit);
    }
    tally.first_flip(upper_limit)
}
