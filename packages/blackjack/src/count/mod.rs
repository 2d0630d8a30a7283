use serde::{Deserialize, Serialize};

use crate::config::validate_betting;
use crate::strategy::dealer_value;
use crate::{Error, Rank};


/// Bet variance of a blackjack hand, used as the Kelly denominator.
pub const BET_VARIANCE: f64 = 1.3;

/// House edge of basic strategy at a neutral count.
pub const BASE_HOUSE_EDGE: f64 = 0.005;

/// Player edge gained per true count point.
pub const ADVANTAGE_PER_TRUE_COUNT: f64 = 0.005;

pub const DEFAULT_WONG_OUT_THRESHOLD: f64 = -1.0;

const CARDS_PER_DECK: u32 = 52;

/// Card counting systems. Each maps every rank to a fixed weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CountingSystem {
    HiLo,
    Ko,
    OmegaII,
    Halves,
}

impl CountingSystem {
    pub const ALL: [CountingSystem; 4] = [
        CountingSystem::HiLo,
        CountingSystem::Ko,
        CountingSystem::OmegaII,
        CountingSystem::Halves,
    ];

    pub fn weight_for(&self, rank: Rank) -> f64 {
        use Rank::*;
        match self {
            CountingSystem::HiLo => match rank {
                Two | Three | Four | Five | Six => 1.0,
                Seven | Eight | Nine => 0.0,
                Ten | Jack | Queen | King | Ace => -1.0,
            },
            CountingSystem::Ko => match rank {
                Two | Three | Four | Five | Six | Seven => 1.0,
                Eight | Nine => 0.0,
                Ten | Jack | Queen | King | Ace => -1.0,
            },
            CountingSystem::OmegaII => match rank {
                Two | Three | Seven => 1.0,
                Four | Five | Six => 2.0,
                Eight | Ace => 0.0,
                Nine => -1.0,
                Ten | Jack | Queen | King => -2.0,
            },
            CountingSystem::Halves => match rank {
                Two | Seven => 0.5,
                Three | Four | Six => 1.0,
                Five => 1.5,
                Eight => 0.0,
                Nine => -0.5,
                Ten | Jack | Queen | King | Ace => -1.0,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CountingSystem::HiLo => "hi_lo",
            CountingSystem::Ko => "ko",
            CountingSystem::OmegaII => "omega_ii",
            CountingSystem::Halves => "halves",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, Error> {
        match name.to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "hi_lo" | "hilo" => Ok(CountingSystem::HiLo),
            "ko" => Ok(CountingSystem::Ko),
            "omega_ii" | "omega2" | "omega_2" => Ok(CountingSystem::OmegaII),
            "halves" => Ok(CountingSystem::Halves),
            _ => Err(Error::Configuration(format!(
                "unknown counting system '{name}'"
            ))),
        }
    }
}

/// Bet size band, chosen by true count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BetTag {
    BetMin,
    BetSmall,
    BetMedium,
    BetLarge,
}

impl BetTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetTag::BetMin => "bet_min",
            BetTag::BetSmall => "bet_small",
            BetTag::BetMedium => "bet_medium",
            BetTag::BetLarge => "bet_large",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetRecommendation {
    pub amount: f64,
    pub unit_count: u32,
    pub tag: BetTag,
    pub reason: String,
    pub true_count: f64,
    /// Player edge as a fraction, 0.01 is 1%.
    pub advantage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deviations {
    pub has_deviations: bool,
    pub deviations: Vec<String>,
    pub true_count: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountStats {
    pub system: CountingSystem,
    pub running_count: f64,
    pub true_count: f64,
    pub cards_seen: u32,
    pub decks_remaining: f64,
    pub player_advantage: f64,
    /// Share of the shoe already seen, in percent.
    pub penetration: f64,
}

/// One index play: a departure from basic strategy above a true count.
struct IndexPlay {
    /// `None` matches any player total.
    player_total: Option<u8>,
    dealer: &'static [u8],
    min_true_count: f64,
    note: &'static str,
}

// Subset of the Illustrious 18 and Fab 4, in reporting order.
const INDEX_PLAYS: &[IndexPlay] = &[
    IndexPlay {
        player_total: Some(16),
        dealer: &[10],
        min_true_count: 0.0,
        note: "STAND on 16 vs 10 (TC >= 0)",
    },
    IndexPlay {
        player_total: Some(15),
        dealer: &[10],
        min_true_count: 4.0,
        note: "STAND on 15 vs 10 (TC >= 4)",
    },
    IndexPlay {
        player_total: Some(20),
        dealer: &[5, 6],
        min_true_count: 5.0,
        note: "Consider SPLITTING 10,10 vs 5 or 6 (TC >= 5)",
    },
    IndexPlay {
        player_total: Some(10),
        dealer: &[10, 11],
        min_true_count: 4.0,
        note: "DOUBLE 10 vs 10 or A (TC >= 4)",
    },
    IndexPlay {
        player_total: Some(12),
        dealer: &[2, 3],
        min_true_count: 3.0,
        note: "STAND on 12 vs 2 or 3 (TC >= 3)",
    },
    IndexPlay {
        player_total: Some(9),
        dealer: &[2],
        min_true_count: 1.0,
        note: "DOUBLE 9 vs 2 (TC >= 1)",
    },
    IndexPlay {
        player_total: Some(16),
        dealer: &[9],
        min_true_count: 5.0,
        note: "STAND on 16 vs 9 (TC >= 5)",
    },
    IndexPlay {
        player_total: None,
        dealer: &[11],
        min_true_count: 3.0,
        note: "TAKE INSURANCE (TC >= 3)",
    },
];

/// Running count and derived statistics for one shoe.
///
/// The engine is a plain owned value. Callers feeding it from more than one
/// thread must wrap it in a lock so `apply` and `reset` never interleave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountEngine {
    system: CountingSystem,
    num_decks: u8,
    running_count: f64,
    cards_seen: u32,
    total_cards: u32,
    penetration_reset: Option<f64>,
}

impl CountEngine {
    pub fn new(system: CountingSystem, num_decks: u8) -> Result<Self, Error> {
        if num_decks == 0 {
            return Err(Error::Configuration(
                "a shoe needs at least one deck".to_string(),
            ));
        }
        Ok(Self {
            system,
            num_decks,
            running_count: 0.0,
            cards_seen: 0,
            total_cards: u32::from(num_decks) * CARDS_PER_DECK,
            penetration_reset: None,
        })
    }

    /// Reset automatically once `percent` of the shoe has been seen.
    pub fn with_penetration_reset(mut self, percent: Option<f64>) -> Result<Self, Error> {
        if let Some(p) = percent {
            if !(p > 0.0 && p <= 100.0) {
                return Err(Error::Configuration(format!(
                    "penetration_reset must be within (0, 100], got {p}"
                )));
            }
        }
        self.penetration_reset = percent;
        Ok(self)
    }

    pub fn system(&self) -> CountingSystem {
        self.system
    }

    pub fn num_decks(&self) -> u8 {
        self.num_decks
    }

    pub fn running_count(&self) -> f64 {
        self.running_count
    }

    pub fn cards_seen(&self) -> u32 {
        self.cards_seen
    }

    pub fn total_cards(&self) -> u32 {
        self.total_cards
    }

    pub fn apply(&mut self, card: Rank) {
        self.running_count += self.system.weight_for(card);
        self.cards_seen += 1;
        log::trace!(
            "counted {card}: running count {} after {} cards",
            self.running_count,
            self.cards_seen
        );

        if let Some(limit) = self.penetration_reset {
            let penetration = self.penetration();
            if penetration >= limit {
                log::info!(
                    "penetration {penetration:.1}% reached the {limit:.1}% limit, starting a new shoe"
                );
                self.reset();
            }
        }
    }

    pub fn apply_all(&mut self, cards: &[Rank]) {
        for &card in cards {
            self.apply(card);
        }
    }

    /// Parse a raw symbol and count it. Unknown symbols leave the state untouched.
    pub fn apply_symbol(&mut self, symbol: &str) -> Result<Rank, Error> {
        let card = symbol.parse::<Rank>().inspect_err(|e| {
            log::warn!("{e}, card not counted");
        })?;
        self.apply(card);
        Ok(card)
    }

    /// Start a new shoe. The deck count is kept.
    pub fn reset(&mut self) {
        log::debug!(
            "count reset after {} cards (running count {})",
            self.cards_seen,
            self.running_count
        );
        self.running_count = 0.0;
        self.cards_seen = 0;
    }

    pub fn decks_remaining(&self) -> f64 {
        let remaining = self.total_cards.saturating_sub(self.cards_seen);
        (f64::from(remaining) / f64::from(CARDS_PER_DECK)).max(1.0)
    }

    pub fn true_count(&self) -> f64 {
        self.running_count / self.decks_remaining()
    }

    pub fn player_advantage(&self) -> f64 {
        self.true_count() * ADVANTAGE_PER_TRUE_COUNT - BASE_HOUSE_EDGE
    }

    pub fn penetration(&self) -> f64 {
        f64::from(self.cards_seen) / f64::from(self.total_cards) * 100.0
    }

    /// Bet size from a fractional Kelly stake, banded by true count.
    pub fn advantage_and_bet(
        &self,
        min_bet: f64,
        max_bet: f64,
        bankroll: f64,
        kelly_fraction: f64,
    ) -> Result<BetRecommendation, Error> {
        validate_betting(min_bet, max_bet, bankroll, kelly_fraction)?;

        let tc = self.true_count();
        let advantage = self.player_advantage();

        let minimum = |reason: &str| BetRecommendation {
            amount: min_bet,
            unit_count: 1,
            tag: BetTag::BetMin,
            reason: reason.to_string(),
            true_count: tc,
            advantage,
        };

        if advantage <= 0.0 {
            return Ok(minimum("Negative count - bet minimum"));
        }

        let kelly_bet = bankroll * (advantage / BET_VARIANCE) * kelly_fraction;
        let kelly_units = (kelly_bet / min_bet).round_ties_even().max(1.0);

        let (units, tag, reason) = if tc < 1.0 {
            return Ok(minimum("Count not high enough - bet minimum"));
        } else if tc < 2.0 {
            (
                kelly_units.min(2.0),
                BetTag::BetSmall,
                format!("Slight advantage (TC: {tc:.1}) - small bet increase"),
            )
        } else if tc < 3.0 {
            (
                kelly_units.min(4.0),
                BetTag::BetMedium,
                format!("Good advantage (TC: {tc:.1}) - medium bet increase"),
            )
        } else {
            (
                kelly_units,
                BetTag::BetLarge,
                format!("Strong advantage (TC: {tc:.1}) - large bet increase"),
            )
        };

        // Whole units only, so the cap is the largest multiple of min_bet within max_bet.
        let max_units = (max_bet / min_bet).floor().max(1.0);
        let units = units.min(max_units);
        let amount = units * min_bet;
        let unit_count = units as u32;

        Ok(BetRecommendation {
            amount,
            unit_count,
            tag,
            reason,
            true_count: tc,
            advantage,
        })
    }

    /// Index plays that fire for this player total against the up-card.
    pub fn deviation_plays(&self, player_total: u8, dealer_up: Rank) -> Deviations {
        let tc = self.true_count();
        let dealer = dealer_value(dealer_up);
        let deviations: Vec<String> = INDEX_PLAYS
            .iter()
            .filter(|play| play.player_total.map_or(true, |total| total == player_total))
            .filter(|play| play.dealer.contains(&dealer))
            .filter(|play| tc >= play.min_true_count)
            .map(|play| play.note.to_string())
            .collect();

        Deviations {
            has_deviations: !deviations.is_empty(),
            deviations,
            true_count: tc,
        }
    }

    /// Wong out signal: the true count is at or below `threshold`.
    pub fn should_leave(&self, threshold: f64) -> bool {
        self.true_count() <= threshold
    }

    pub fn stats(&self) -> CountStats {
        CountStats {
            system: self.system,
            running_count: self.running_count,
            true_count: self.true_count(),
            cards_seen: self.cards_seen,
            decks_remaining: self.decks_remaining(),
            player_advantage: self.player_advantage(),
            penetration: self.penetration(),
        }
    }
}
