use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hand::classify;
use crate::{Error, GameRules, HandClass, Rank};

/// Minimum true count at which insurance becomes a positive bet.
pub const INSURANCE_TRUE_COUNT: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Hit,
    Stand,
    Double,
    Split,
    Surrender,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Hit => "HIT",
            Action::Stand => "STAND",
            Action::Double => "DOUBLE",
            Action::Split => "SPLIT",
            Action::Surrender => "SURRENDER",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which moves the table currently offers the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayOptions {
    pub can_double: bool,
    pub can_split: bool,
    pub can_surrender: bool,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            can_double: true,
            can_split: true,
            can_surrender: true,
        }
    }
}

/// Chart variant, selected by the dealer soft 17 rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartVariant {
    /// Dealer hits soft 17
    H17,
    /// Dealer stands on all 17s
    S17,
}

/// Up-card value used to key the charts: ace is 11, faces are 10.
pub fn dealer_value(up: Rank) -> u8 {
    up.value()
}

// Hard totals 4..=21 against dealer 2..=11.
fn hard_chart(variant: ChartVariant, total: u8, dealer: u8) -> Option<Action> {
    use Action::*;
    let action = match (total, dealer) {
        (4..=8, _) => Hit,
        (9, 3..=6) => Double,
        (9, _) => Hit,
        (10, 2..=9) => Double,
        (10, _) => Hit,
        (11, 11) if variant == ChartVariant::S17 => Hit,
        (11, _) => Double,
        (12, 4..=6) => Stand,
        (12, _) => Hit,
        (13..=16, 2..=6) => Stand,
        (13..=16, _) => Hit,
        (17..=21, _) => Stand,
        _ => return None,
    };
    Some(action)
}

// Soft totals 13..=21 against dealer 2..=11.
fn soft_chart(total: u8, dealer: u8) -> Option<Action> {
    use Action::*;
    let action = match (total, dealer) {
        (13..=14, 5..=6) => Double,
        (13..=14, _) => Hit,
        (15..=16, 4..=6) => Double,
        (15..=16, _) => Hit,
        (17, 3..=6) => Double,
        (17, _) => Hit,
        (18, 3..=6) => Double,
        (18, 2 | 7 | 8) => Stand,
        (18, _) => Hit,
        (19..=21, _) => Stand,
        _ => return None,
    };
    Some(action)
}

// Pairs keyed by ten-normalized rank against dealer 2..=11.
fn pair_chart(pair: Rank, dealer: u8) -> Action {
    use Action::*;
    match (pair, dealer) {
        (Rank::Ace | Rank::Eight, _) => Split,
        (Rank::Two | Rank::Three | Rank::Seven, 2..=7) => Split,
        (Rank::Four, 5..=6) => Split,
        (Rank::Six, 2..=6) => Split,
        (Rank::Nine, 2..=6 | 8..=9) => Split,
        (Rank::Nine, _) => Stand,
        (Rank::Ten | Rank::Jack | Rank::Queen | Rank::King, _) => Stand,
        _ => Hit,
    }
}

fn surrender_chart(total: u8, dealer: u8) -> bool {
    matches!((total, dealer), (16, 9..=11) | (15, 10))
}

/// Precomputed basic strategy for one rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyTable {
    variant: ChartVariant,
    surrender_allowed: bool,
}

impl StrategyTable {
    pub fn new(rules: &GameRules) -> Self {
        let variant = if rules.dealer_hits_soft_17 {
            ChartVariant::H17
        } else {
            ChartVariant::S17
        };
        Self {
            variant,
            surrender_allowed: rules.allow_surrender,
        }
    }

    pub fn variant(&self) -> ChartVariant {
        self.variant
    }

    /// Basic strategy action for a classified hand.
    ///
    /// Surrender is checked first, then splitting, then the soft chart, then
    /// the hard chart. A chart Double the table does not offer becomes Hit.
    pub fn base_action(&self, hand: &HandClass, dealer_up: Rank, options: PlayOptions) -> Action {
        let dealer = dealer_value(dealer_up);
        let value = hand.value;

        if options.can_surrender && self.surrender_allowed && surrender_chart(value, dealer) {
            return Action::Surrender;
        }

        if options.can_split && hand.is_pair {
            if let Some(pair) = hand.pair_rank {
                if pair_chart(pair, dealer) == Action::Split {
                    return Action::Split;
                }
            }
        }

        let charted = if hand.is_soft {
            soft_chart(value, dealer).or_else(|| hard_chart(self.variant, value, dealer))
        } else {
            hard_chart(self.variant, value, dealer)
        };

        let action = charted.unwrap_or(if value >= 17 {
            Action::Stand
        } else {
            Action::Hit
        });

        if action == Action::Double && !options.can_double {
            Action::Hit
        } else {
            action
        }
    }
}

/// Get the optimal move for a list of player cards based on basic strategy
pub fn optimal_move(
    player_cards: &[Rank],
    dealer_up: Rank,
    options: PlayOptions,
    rules: &GameRules,
) -> Result<Action, Error> {
    let hand = classify(player_cards)?;
    Ok(StrategyTable::new(rules).base_action(&hand, dealer_up, options))
}

/// Insurance is taken only against an ace at a true count of +3 or better.
pub fn should_take_insurance(dealer_up: Rank, true_count: f64) -> bool {
    dealer_up.is_ace() && true_count >= INSURANCE_TRUE_COUNT
}

#[cfg(test)]
mod tests {
    use super::*;
    use Rank::*;

    fn h17() -> GameRules {
        GameRules::default()
    }

    fn play(cards: &[Rank], up: Rank, options: PlayOptions, rules: &GameRules) -> Action {
        optimal_move(cards, up, options, rules).unwrap()
    }

    #[test]
    fn test_hard_16_vs_ten_hits() {
        assert_eq!(play(&[Ten, Six], Ten, PlayOptions::default(), &h17()), Action::Hit);
        assert_eq!(play(&[Ten, Six], King, PlayOptions::default(), &h17()), Action::Hit);
    }

    #[test]
    fn test_hard_11_vs_six_doubles() {
        assert_eq!(play(&[Six, Five], Six, PlayOptions::default(), &h17()), Action::Double);
    }

    #[test]
    fn test_double_downgrades_to_hit() {
        let options = PlayOptions {
            can_double: false,
            ..PlayOptions::default()
        };
        assert_eq!(play(&[Six, Five], Six, options, &h17()), Action::Hit);
        // soft 18 vs 4 is a chart double; without doubling it is a hit
        assert_eq!(play(&[Ace, Seven], Four, options, &h17()), Action::Hit);
    }

    #[test]
    fn test_pair_of_eights_vs_ten_splits() {
        assert_eq!(play(&[Eight, Eight], Ten, PlayOptions::default(), &h17()), Action::Split);
    }

    #[test]
    fn test_pair_without_split_uses_totals() {
        let options = PlayOptions {
            can_split: false,
            ..PlayOptions::default()
        };
        assert_eq!(play(&[Eight, Eight], Ten, options, &h17()), Action::Hit);
        // A,A unsplit is soft 12, not charted as soft, so the hard 12 row applies
        assert_eq!(play(&[Ace, Ace], Five, options, &h17()), Action::Stand);
    }

    #[test]
    fn test_never_split_tens_or_fives() {
        assert_eq!(play(&[King, Queen], Six, PlayOptions::default(), &h17()), Action::Stand);
        assert_eq!(play(&[Five, Five], Six, PlayOptions::default(), &h17()), Action::Double);
    }

    #[test]
    fn test_nines_split_except_seven_ten_ace() {
        let rules = h17();
        assert_eq!(play(&[Nine, Nine], Eight, PlayOptions::default(), &rules), Action::Split);
        assert_eq!(play(&[Nine, Nine], Seven, PlayOptions::default(), &rules), Action::Stand);
        assert_eq!(play(&[Nine, Nine], Ace, PlayOptions::default(), &rules), Action::Stand);
    }

    #[test]
    fn test_soft_18_vs_nine_hits() {
        assert_eq!(play(&[Ace, Seven], Nine, PlayOptions::default(), &h17()), Action::Hit);
        assert_eq!(play(&[Ace, Seven], Seven, PlayOptions::default(), &h17()), Action::Stand);
    }

    #[test]
    fn test_soft_19_and_up_always_stand() {
        for rules in [h17(), GameRules::atlantic_city()] {
            for up in Rank::ALL {
                for kicker in [Eight, Nine, Ten] {
                    assert_eq!(
                        play(&[Ace, kicker], up, PlayOptions::default(), &rules),
                        Action::Stand,
                        "A,{kicker} vs {up}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_surrender_requires_rule_and_request() {
        let mut rules = h17();
        assert_eq!(play(&[Ten, Six], Ten, PlayOptions::default(), &rules), Action::Hit);

        rules.allow_surrender = true;
        assert_eq!(play(&[Ten, Six], Ten, PlayOptions::default(), &rules), Action::Surrender);
        assert_eq!(play(&[Ten, Six], Ace, PlayOptions::default(), &rules), Action::Surrender);
        assert_eq!(play(&[Ten, Five], Ten, PlayOptions::default(), &rules), Action::Surrender);
        assert_eq!(play(&[Ten, Five], Nine, PlayOptions::default(), &rules), Action::Hit);

        let options = PlayOptions {
            can_surrender: false,
            ..PlayOptions::default()
        };
        assert_eq!(play(&[Ten, Six], Ten, options, &rules), Action::Hit);
    }

    #[test]
    fn test_surrender_checked_before_split() {
        let rules = GameRules {
            allow_surrender: true,
            ..h17()
        };
        assert_eq!(play(&[Eight, Eight], Ten, PlayOptions::default(), &rules), Action::Surrender);
    }

    #[test]
    fn test_eleven_vs_ace_depends_on_soft_17_rule() {
        let s17 = GameRules {
            dealer_hits_soft_17: false,
            ..h17()
        };
        assert_eq!(StrategyTable::new(&s17).variant(), ChartVariant::S17);
        assert_eq!(play(&[Six, Five], Ace, PlayOptions::default(), &h17()), Action::Double);
        assert_eq!(play(&[Six, Five], Ace, PlayOptions::default(), &s17), Action::Hit);
    }

    #[test]
    fn test_charts_cover_every_cell() {
        for variant in [ChartVariant::H17, ChartVariant::S17] {
            for dealer in 2..=11 {
                for total in 4..=21 {
                    assert!(hard_chart(variant, total, dealer).is_some());
                }
            }
        }
        for dealer in 2..=11 {
            for total in 13..=21 {
                assert!(soft_chart(total, dealer).is_some());
            }
        }
    }

    #[test]
    fn test_bust_and_tiny_totals_fall_back() {
        assert_eq!(play(&[King, Queen, Five], Six, PlayOptions::default(), &h17()), Action::Stand);
        assert_eq!(play(&[Two], Six, PlayOptions::default(), &h17()), Action::Hit);
    }

    #[test]
    fn test_empty_hand_is_rejected() {
        assert_eq!(
            optimal_move(&[], Six, PlayOptions::default(), &h17()),
            Err(Error::InvalidHand)
        );
    }

    #[test]
    fn test_insurance_threshold() {
        assert!(!should_take_insurance(Ace, 2.9));
        assert!(should_take_insurance(Ace, 3.0));
        for up in Rank::ALL.into_iter().filter(|r| !r.is_ace()) {
            assert!(!should_take_insurance(up, 10.0));
        }
    }
}
