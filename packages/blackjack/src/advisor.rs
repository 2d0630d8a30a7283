use serde::{Deserialize, Serialize};

use crate::hand::classify;
use crate::strategy::should_take_insurance;
use crate::{
    Action, AdvisorConfig, BetRecommendation, CountEngine, Error, HandClass, PlayOptions, Rank,
    StrategyTable,
};

/// One observed decision point: the player's hand and the dealer up-card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableView {
    pub player_cards: Vec<Rank>,
    pub dealer_up: Rank,
    /// Current balance; falls back to the configured bankroll when absent.
    pub balance: Option<f64>,
    /// Splits already made on this spot.
    pub split_count: u8,
}

impl TableView {
    pub fn new(player_cards: Vec<Rank>, dealer_up: Rank) -> Self {
        Self {
            player_cards,
            dealer_up,
            balance: None,
            split_count: 0,
        }
    }

    pub fn with_balance(mut self, balance: f64) -> Self {
        self.balance = Some(balance);
        self
    }

    pub fn after_splits(mut self, split_count: u8) -> Self {
        self.split_count = split_count;
        self
    }

    /// Moves the table offers for this hand under `config`.
    pub fn options(&self, hand: &HandClass, config: &AdvisorConfig) -> PlayOptions {
        let rules = &config.rules;
        let two_cards = self.player_cards.len() == 2;
        let split_hand = self.split_count > 0;

        PlayOptions {
            can_double: two_cards
                && (!split_hand || rules.double_after_split)
                && rules.double_restriction.allows(hand.value, hand.is_soft),
            can_split: hand.is_pair && self.split_count < rules.max_splits,
            can_surrender: two_cards && !split_hand,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub dealer_up: Rank,
    pub hand: HandClass,
    /// Basic strategy action. Index plays never replace it; they are listed in
    /// `deviation_notes` for the caller to act on.
    pub action: Action,
    pub insurance: bool,
    pub bet: Option<BetRecommendation>,
    pub deviation_notes: Vec<String>,
    pub leave_table: bool,
}

impl Decision {
    /// Plain-text rationale for the recommended action.
    pub fn explain(&self) -> String {
        let mut reason = format!("Player: {}", self.hand.value);
        if self.hand.is_soft {
            reason.push_str(" (soft)");
        }
        if let Some(pair) = self.hand.pair_rank {
            reason.push_str(&format!(" (pair of {pair}s)"));
        }
        reason.push_str(&format!("\nDealer: {}\n\n", self.dealer_up));

        reason.push_str(match self.action {
            Action::Hit => "HIT: Take another card to improve your hand.",
            Action::Stand => "STAND: Your hand is strong enough. Don't risk busting.",
            Action::Double => {
                "DOUBLE: You have the advantage. Double your bet and take one card."
            }
            Action::Split => "SPLIT: Split your pair into two hands for better odds.",
            Action::Surrender => {
                "SURRENDER: This is a losing hand. Surrender to save half your bet."
            }
        });
        reason
    }
}

/// Combines basic strategy with the count into one recommendation.
#[derive(Debug, Clone)]
pub struct Advisor {
    config: AdvisorConfig,
    table: StrategyTable,
}

impl Advisor {
    pub fn new(config: AdvisorConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            table: StrategyTable::new(&config.rules),
            config,
        })
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    pub fn table(&self) -> &StrategyTable {
        &self.table
    }

    /// Fresh count for a new shoe under this configuration.
    pub fn new_shoe(&self) -> Result<CountEngine, Error> {
        CountEngine::new(self.config.counting.system, self.config.rules.num_decks)?
            .with_penetration_reset(self.config.counting.penetration_reset)
    }

    /// Recommend an action (and, when counting, a bet) for one decision point.
    ///
    /// Counting output is produced only when counting is enabled and a shoe
    /// count is supplied.
    pub fn decide(&self, view: &TableView, count: Option<&CountEngine>) -> Result<Decision, Error> {
        let hand = classify(&view.player_cards)?;
        let options = view.options(&hand, &self.config);
        let action = self.table.base_action(&hand, view.dealer_up, options);

        let mut decision = Decision {
            dealer_up: view.dealer_up,
            hand,
            action,
            insurance: false,
            bet: None,
            deviation_notes: Vec::new(),
            leave_table: false,
        };

        let counting = &self.config.counting;
        if let Some(engine) = count.filter(|_| counting.enabled) {
            let betting = &self.config.betting;
            let bankroll = view.balance.unwrap_or(betting.bankroll);

            decision.insurance = should_take_insurance(view.dealer_up, engine.true_count());
            decision.deviation_notes = engine.deviation_plays(hand.value, view.dealer_up).deviations;
            decision.bet = Some(engine.advantage_and_bet(
                betting.min_bet,
                betting.max_bet,
                bankroll,
                betting.kelly_fraction,
            )?);
            decision.leave_table =
                counting.wong_out && engine.should_leave(counting.wong_out_threshold);
        }

        log::debug!(
            "{:?} vs {} -> {} ({} deviation notes)",
            view.player_cards,
            view.dealer_up,
            decision.action,
            decision.deviation_notes.len()
        );
        Ok(decision)
    }
}
