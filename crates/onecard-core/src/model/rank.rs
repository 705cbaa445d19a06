use core::fmt;
use serde::{Deserialize, Serialize};

/// Number of cards left in the deck once the trump marker is turned up.
pub const RANK_COUNT: u8 = 51;

/// Worst possible rank.
pub const MAX_RANK: u8 = RANK_COUNT - 1;

/// Trumps occupy ranks `0..TRUMP_COUNT`.
pub const TRUMP_COUNT: u8 = 12;

/// Last rank that can still take the trick: the lowest card of the led suit.
pub const LAST_LED_RANK: u8 = 24;

/// Which part of the deck a rank belongs to once the lead has fixed the trick's suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RankBand {
    Trump,
    LedSuit,
    OffSuit,
}

impl RankBand {
    pub const fn of(rank: u8) -> Option<Self> {
        if rank < TRUMP_COUNT {
            Some(RankBand::Trump)
        } else if rank <= LAST_LED_RANK {
            Some(RankBand::LedSuit)
        } else if rank <= MAX_RANK {
            Some(RankBand::OffSuit)
        } else {
            None
        }
    }

    /// Inclusive rank range covered by the band.
    pub const fn bounds(self) -> (u8, u8) {
        match self {
            RankBand::Trump => (0, TRUMP_COUNT - 1),
            RankBand::LedSuit => (TRUMP_COUNT, LAST_LED_RANK),
            RankBand::OffSuit => (LAST_LED_RANK + 1, MAX_RANK),
        }
    }

    /// True when a card from this band can ever take the trick.
    pub const fn can_win(self) -> bool {
        !matches!(self, RankBand::OffSuit)
    }
}

impl fmt::Display for RankBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RankBand::Trump => "trump",
            RankBand::LedSuit => "led",
            RankBand::OffSuit => "off",
        };
        f.write_str(text)
    }
}
