mod advisor;
mod config;
mod count;
mod error;
mod hand;
mod rank;
mod rules;
mod strategy;

pub use advisor::{Advisor, Decision, TableView};
pub use config::{AdvisorConfig, BettingConfig, CountingConfig};
pub use count::{
    BetRecommendation, BetTag, CountEngine, CountStats, CountingSystem, Deviations,
    ADVANTAGE_PER_TRUE_COUNT, BASE_HOUSE_EDGE, BET_VARIANCE, DEFAULT_WONG_OUT_THRESHOLD,
};
pub use error::Error;
pub use hand::{
    calculate_hand_value, classify, is_blackjack, is_busted, is_pair, is_soft_hand, Hand,
    HandClass,
};
pub use rank::Rank;
pub use rules::{DoubleRestriction, GameRules};
pub use strategy::{
    dealer_value, optimal_move, should_take_insurance, Action, ChartVariant, PlayOptions,
    StrategyTable, INSURANCE_TRUE_COUNT,
};
