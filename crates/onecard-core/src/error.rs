use thiserror::Error;

/// Caller-facing failures. Broken internal invariants panic instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("player count {players} is outside the supported range 1..={max}")]
    InvalidPlayerCount { players: usize, max: usize },
    #[error("bid history of length {len} leaves no bidder among {players} players")]
    HistoryTooLong { len: usize, players: usize },
    #[error("invalid bid character {0:?}; expected '0' or '1'")]
    InvalidBid(char),
    #[error("no bid sequence is reachable with {players} player(s)")]
    NoReachableSequences { players: usize },
}
