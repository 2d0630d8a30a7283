use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid hand: a hand needs at least one card")]
    InvalidHand,
    #[error("Unknown rank: {0:?}")]
    UnknownRank(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
}
