//! Rank ranges implied by observed bids under threshold play.

use crate::model::bid::{Bid, total_bid};
use crate::model::mask::{RankMask, range_to_mask};
use crate::model::rank::{MAX_RANK, RankBand};

/// Threshold value marking a bid history that equilibrium play never produces.
pub const UNREACHABLE: u8 = 0;

/// Ranks consistent with `bid` from a seat whose threshold was `threshold`.
pub fn bid_range(bid: Bid, threshold: u8) -> (u8, u8) {
    debug_assert_ne!(threshold, UNREACHABLE, "unreachable threshold has no range");
    match bid {
        Bid::One => (0, threshold - 1),
        Bid::Zero => (threshold, MAX_RANK),
    }
}

/// A leader who does not claim the trick still holds trump or the led suit.
fn cap_leader(ranges: &mut [(u8, u8)], bids: &[Bid], thresholds: &[u8]) {
    if bids.first() == Some(&Bid::Zero) {
        let (_, last_led) = RankBand::LedSuit.bounds();
        ranges[0] = (thresholds[0], last_led);
    }
}

fn to_masks(ranges: &[(u8, u8)]) -> Vec<RankMask> {
    ranges
        .iter()
        .map(|&(lo, hi)| range_to_mask(lo, hi))
        .collect()
}

/// Ranges of every seat other than the next bidder, in seat order: the seats that already
/// bid, then the seats still to bid, which are unconstrained.
pub fn history_ranges(players: usize, history: &[Bid], thresholds: &[u8]) -> Vec<RankMask> {
    debug_assert_eq!(history.len(), thresholds.len());
    let mut ranges: Vec<(u8, u8)> = history
        .iter()
        .zip(thresholds)
        .map(|(&bid, &threshold)| bid_range(bid, threshold))
        .collect();
    ranges.extend(std::iter::repeat((0, MAX_RANK)).take(players - history.len() - 1));
    cap_leader(&mut ranges, history, thresholds);
    to_masks(&ranges)
}

/// Seat ranges for a complete bid sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealRanges {
    pub masks: Vec<RankMask>,
    /// The dealer's bid was the only legal one, so it says nothing about their card.
    pub dealer_forced: bool,
}

/// Ranges for a complete sequence, or `None` when the bids total exactly one trick, which
/// the dealer is never allowed to produce.
pub fn deal_ranges(bids: &[Bid], thresholds: &[u8]) -> Option<DealRanges> {
    debug_assert_eq!(bids.len(), thresholds.len());
    let (&dealer, earlier) = bids.split_last()?;
    if total_bid(bids) == 1 {
        return None;
    }

    let mut ranges: Vec<(u8, u8)> = bids
        .iter()
        .zip(thresholds)
        .map(|(&bid, &threshold)| bid_range(bid, threshold))
        .collect();

    let dealer_forced = total_bid(earlier) + usize::from(dealer.flipped().value()) == 1;
    if dealer_forced {
        if let Some(last) = ranges.last_mut() {
            *last = (0, MAX_RANK);
        }
    }
    cap_leader(&mut ranges, bids, thresholds);

    Some(DealRanges {
        masks: to_masks(&ranges),
        dealer_forced,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bid_ranges_split_at_threshold() {
        assert_eq!(bid_range(Bid::One, 7), (0, 6));
        assert_eq!(bid_range(Bid::Zero, 7), (7, 50));
    }

    #[test]
    fn history_ranges_cap_leader_and_fill_unknowns() {
        let masks = history_ranges(4, &[Bid::Zero, Bid::One], &[11, 5]);
        assert_eq!(
            masks,
            vec![
                range_to_mask(11, 24),
                range_to_mask(0, 4),
                range_to_mask(0, 50)
            ]
        );
        assert_eq!(history_ranges(3, &[], &[]).len(), 2);

        let (lo, hi) = masks[0].range();
        assert_eq!(RankBand::of(lo), Some(RankBand::Trump));
        assert_eq!(RankBand::of(hi), Some(RankBand::LedSuit));
        assert!(RankBand::of(hi + 1).is_some_and(|band| !band.can_win()));
    }

    #[test]
    fn leader_passing_on_full_threshold_is_empty() {
        let masks = history_ranges(2, &[Bid::Zero], &[25]);
        assert_eq!(masks, vec![RankMask::EMPTY]);
    }

    #[test]
    fn single_trick_total_is_illegal() {
        assert_eq!(deal_ranges(&[Bid::One, Bid::Zero], &[25, 12]), None);
        assert_eq!(deal_ranges(&[Bid::Zero, Bid::Zero, Bid::One], &[15, 12, 12]), None);
    }

    #[test]
    fn forced_dealer_is_unconstrained() {
        let ranges = deal_ranges(&[Bid::One, Bid::One], &[25, 12]).unwrap();
        assert!(ranges.dealer_forced);
        assert_eq!(ranges.masks, vec![range_to_mask(0, 24), range_to_mask(0, 50)]);

        let passed = deal_ranges(&[Bid::Zero, Bid::Zero, Bid::Zero], &[15, 12, 12]).unwrap();
        assert!(passed.dealer_forced);
        assert_eq!(passed.masks[0], range_to_mask(15, 24));
        assert_eq!(passed.masks[2], range_to_mask(0, 50));
    }

    #[test]
    fn free_dealer_keeps_threshold_range() {
        let ranges = deal_ranges(&[Bid::One, Bid::One, Bid::Zero], &[15, 7, 3]).unwrap();
        assert!(!ranges.dealer_forced);
        assert_eq!(
            ranges.masks,
            vec![range_to_mask(0, 14), range_to_mask(0, 6), range_to_mask(3, 50)]
        );
    }
}
