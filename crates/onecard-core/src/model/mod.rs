pub mod bid;
pub mod mask;
pub mod rank;

pub use bid::{Bid, BidSequence, total_bid};
pub use mask::{Fragments, RankMask, fragment_mask, mask_to_range, range_to_mask};
pub use rank::{LAST_LED_RANK, MAX_RANK, RANK_COUNT, RankBand, TRUMP_COUNT};
