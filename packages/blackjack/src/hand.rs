use crate::{Error, Rank};
use serde::{Deserialize, Serialize};

/// Classification of a hand at a decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandClass {
    pub value: u8,
    pub is_soft: bool,
    pub is_pair: bool,
    /// Ten-normalized rank of the pair, set only when `is_pair` is true.
    pub pair_rank: Option<Rank>,
}

/// Hand total with aces counted as 11 and each one dropped to 1 while the
/// total is over 21. Returns the total and the number of aces still counted high.
fn reduce_aces(cards: &[Rank]) -> (u32, u32) {
    let mut total: u32 = 0;
    let mut aces = 0;

    for card in cards {
        if card.is_ace() {
            aces += 1;
        }
        total += u32::from(card.value());
    }

    while total > 21 && aces > 0 {
        total -= 10;
        aces -= 1;
    }

    (total, aces)
}

/// Calculate the value of a blackjack hand
pub fn calculate_hand_value(cards: &[Rank]) -> u8 {
    let (total, _) = reduce_aces(cards);
    u8::try_from(total).unwrap_or(u8::MAX)
}

/// Check if a hand is soft (has an ace still counted as 11)
pub fn is_soft_hand(cards: &[Rank]) -> bool {
    let (_, high_aces) = reduce_aces(cards);
    high_aces > 0
}

/// Check if a hand is exactly two cards of the same ten-normalized rank
pub fn is_pair(cards: &[Rank]) -> bool {
    cards.len() == 2 && cards[0].pair_rank() == cards[1].pair_rank()
}

/// Check if a hand is busted
pub fn is_busted(cards: &[Rank]) -> bool {
    calculate_hand_value(cards) > 21
}

/// Check if a hand is blackjack (21 with 2 cards)
pub fn is_blackjack(cards: &[Rank]) -> bool {
    cards.len() == 2 && calculate_hand_value(cards) == 21
}

/// Classify a hand for a strategy lookup.
pub fn classify(cards: &[Rank]) -> Result<HandClass, Error> {
    if cards.is_empty() {
        return Err(Error::InvalidHand);
    }
    let (total, high_aces) = reduce_aces(cards);
    let pair = is_pair(cards);
    Ok(HandClass {
        value: u8::try_from(total).unwrap_or(u8::MAX),
        is_soft: high_aces > 0,
        is_pair: pair,
        pair_rank: pair.then(|| cards[0].pair_rank()),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    pub cards: Vec<Rank>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn from_cards(cards: &[Rank]) -> Self {
        Self {
            cards: cards.to_vec(),
        }
    }

    pub fn value(&self) -> u8 {
        calculate_hand_value(&self.cards)
    }

    pub fn is_soft(&self) -> bool {
        is_soft_hand(&self.cards)
    }

    pub fn is_pair(&self) -> bool {
        is_pair(&self.cards)
    }

    pub fn pair_rank(&self) -> Option<Rank> {
        self.is_pair().then(|| self.cards[0].pair_rank())
    }

    pub fn is_busted(&self) -> bool {
        is_busted(&self.cards)
    }

    pub fn is_blackjack(&self) -> bool {
        is_blackjack(&self.cards)
    }

    pub fn add_card(&mut self, card: Rank) {
        self.cards.push(card);
    }

    pub fn classify(&self) -> Result<HandClass, Error> {
        classify(&self.cards)
    }
}
