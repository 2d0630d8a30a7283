use std::io::Write;

use blackjack::{BetRecommendation, CountStats, Decision};
use serde::Serialize;

use crate::BoxErr;

/// Text or JSON rendering of engine outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<(), BoxErr> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_decision<W: Write>(out: &mut W, decision: &Decision, format: Format) -> Result<(), BoxErr> {
    if format == Format::Json {
        return write_json(out, decision);
    }

    writeln!(out, "Action: {}", decision.action)?;
    writeln!(out, "{}", decision.explain())?;
    if decision.insurance {
        writeln!(out, "Insurance: TAKE")?;
    }
    if !decision.deviation_notes.is_empty() {
        writeln!(out, "Index plays:")?;
        for note in &decision.deviation_notes {
            writeln!(out, "  - {note}")?;
        }
    }
    if let Some(bet) = &decision.bet {
        write_bet_text(out, bet)?;
    }
    if decision.leave_table {
        writeln!(out, "Count is against you: consider leaving the table")?;
    }
    Ok(())
}

fn write_bet_text<W: Write>(out: &mut W, bet: &BetRecommendation) -> Result<(), BoxErr> {
    writeln!(
        out,
        "Recommended Bet: ${:.2} ({} units, {})",
        bet.amount,
        bet.unit_count,
        bet.tag.as_str()
    )?;
    writeln!(out, "  {}", bet.reason)?;
    Ok(())
}

#[derive(Serialize)]
struct CountReport<'a> {
    stats: &'a CountStats,
    bet: &'a BetRecommendation,
}

pub fn write_count<W: Write>(
    out: &mut W,
    stats: &CountStats,
    bet: &BetRecommendation,
    format: Format,
) -> Result<(), BoxErr> {
    if format == Format::Json {
        return write_json(out, &CountReport { stats, bet });
    }

    writeln!(out, "System: {}", stats.system.name())?;
    writeln!(out, "Running Count: {}", stats.running_count)?;
    writeln!(out, "True Count: {:.2}", stats.true_count)?;
    writeln!(out, "Cards Seen: {}", stats.cards_seen)?;
    writeln!(out, "Decks Remaining: {:.1}", stats.decks_remaining)?;
    writeln!(out, "Player Advantage: {:.2}%", stats.player_advantage * 100.0)?;
    writeln!(out, "Deck Penetration: {:.1}%", stats.penetration)?;
    write_bet_text(out, bet)
}
