use serde::{Deserialize, Serialize};

use crate::Error;

/// Restrictions on when doubling down is allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoubleRestriction {
    /// Can double on any two cards
    Any,
    /// Can only double on hard 9, 10, or 11
    Hard9_10_11,
    /// Can only double on hard 10 or 11
    Hard10_11,
}

impl DoubleRestriction {
    pub fn allows(&self, value: u8, is_soft: bool) -> bool {
        match self {
            DoubleRestriction::Any => true,
            DoubleRestriction::Hard9_10_11 => !is_soft && (9..=11).contains(&value),
            DoubleRestriction::Hard10_11 => !is_soft && (10..=11).contains(&value),
        }
    }
}

/// Table rules the advice is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRules {
    /// Number of decks in the shoe
    pub num_decks: u8,

    /// Dealer hits on soft 17 (selects the H17 strategy tables)
    pub dealer_hits_soft_17: bool,

    /// Allow doubling after split
    pub double_after_split: bool,

    /// Allow late surrender
    pub allow_surrender: bool,

    /// Restriction on when doubling is allowed based on hand value
    pub double_restriction: DoubleRestriction,

    /// Maximum number of splits allowed per hand
    pub max_splits: u8,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            num_decks: 6,
            dealer_hits_soft_17: true,
            double_after_split: true,
            allow_surrender: false,
            double_restriction: DoubleRestriction::Any,
            max_splits: 3,
        }
    }
}

impl GameRules {
    /// European rules (no surrender, no double after split)
    pub fn european() -> Self {
        Self {
            num_decks: 6,
            dealer_hits_soft_17: false,
            double_after_split: false,
            allow_surrender: false,
            double_restriction: DoubleRestriction::Hard9_10_11,
            max_splits: 1,
        }
    }

    /// Atlantic City rules
    pub fn atlantic_city() -> Self {
        Self {
            num_decks: 8,
            dealer_hits_soft_17: false,
            double_after_split: true,
            allow_surrender: true,
            double_restriction: DoubleRestriction::Any,
            max_splits: 3,
        }
    }

    /// Single deck rules
    pub fn single_deck() -> Self {
        Self {
            num_decks: 1,
            dealer_hits_soft_17: true,
            double_after_split: false,
            allow_surrender: false,
            double_restriction: DoubleRestriction::Hard10_11,
            max_splits: 1,
        }
    }

    pub fn total_cards(&self) -> u32 {
        u32::from(self.num_decks) * 52
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.num_decks == 0 {
            return Err(Error::Configuration(
                "a shoe needs at least one deck".to_string(),
            ));
        }
        Ok(())
    }
}
