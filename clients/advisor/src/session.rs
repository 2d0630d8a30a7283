use std::io::{BufRead, Write};

use blackjack::{Advisor, CountEngine, Rank, TableView};

use crate::output::{write_count, write_decision, Format};
use crate::BoxErr;

/// One line of session input.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Cards observed on the table, raw symbols.
    Cards(Vec<String>),
    Play { player: Vec<Rank>, dealer_up: Rank },
    Stats,
    Shuffle,
    Quit,
}

pub fn parse_line(line: &str) -> Result<Option<SessionCommand>, BoxErr> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let command = match word.to_ascii_lowercase().as_str() {
        "cards" | "c" => SessionCommand::Cards(
            rest.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        "play" | "p" => {
            let (player, dealer) = rest
                .rsplit_once(" vs ")
                .ok_or("expected `play <cards> vs <dealer card>`")?;
            SessionCommand::Play {
                player: Rank::parse_many(player)?,
                dealer_up: dealer.parse()?,
            }
        }
        "stats" | "s" => SessionCommand::Stats,
        "shuffle" | "reset" => SessionCommand::Shuffle,
        "quit" | "exit" | "q" => SessionCommand::Quit,
        other => return Err(format!("unknown command '{other}'").into()),
    };
    Ok(Some(command))
}

/// Interactive loop: one shoe count, fed only from this loop.
pub struct Session<'a> {
    advisor: &'a Advisor,
    shoe: CountEngine,
    format: Format,
}

impl<'a> Session<'a> {
    pub fn new(advisor: &'a Advisor, shoe: CountEngine, format: Format) -> Self {
        Self {
            advisor,
            shoe,
            format,
        }
    }

    pub fn shoe(&self) -> &CountEngine {
        &self.shoe
    }

    /// Process input until `quit` or end of input. Bad lines are logged and skipped.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<(), BoxErr> {
        for line in input.lines() {
            let line = line?;
            let command = match parse_line(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("{e}");
                    continue;
                }
            };
            if command == SessionCommand::Quit {
                break;
            }
            if let Err(e) = self.execute(command, out) {
                log::warn!("{e}");
            }
            out.flush()?;
        }
        Ok(())
    }

    fn execute<W: Write>(&mut self, command: SessionCommand, out: &mut W) -> Result<(), BoxErr> {
        match command {
            SessionCommand::Cards(symbols) => {
                let mut counted = 0;
                for symbol in &symbols {
                    if self.shoe.apply_symbol(symbol).is_ok() {
                        counted += 1;
                    }
                }
                log::debug!("counted {counted} of {} cards", symbols.len());
            }
            SessionCommand::Play { player, dealer_up } => {
                let view = TableView::new(player, dealer_up);
                let decision = self.advisor.decide(&view, Some(&self.shoe))?;
                write_decision(out, &decision, self.format)?;
            }
            SessionCommand::Stats => {
                let betting = &self.advisor.config().betting;
                let bet = self.shoe.advantage_and_bet(
                    betting.min_bet,
                    betting.max_bet,
                    betting.bankroll,
                    betting.kelly_fraction,
                )?;
                write_count(out, &self.shoe.stats(), &bet, self.format)?;
            }
            SessionCommand::Shuffle => {
                self.shoe.reset();
                log::info!("new shoe, count reset");
            }
            SessionCommand::Quit => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackjack::AdvisorConfig;
    use std::io::Cursor;

    #[test]
    fn test_parse_lines() {
        assert_eq!(parse_line("  ").unwrap(), None);
        assert_eq!(parse_line("# comment").unwrap(), None);
        assert_eq!(
            parse_line("cards K, 5 x").unwrap(),
            Some(SessionCommand::Cards(vec![
                "K".to_string(),
                "5".to_string(),
                "x".to_string()
            ]))
        );
        assert_eq!(
            parse_line("play A 7 vs 9").unwrap(),
            Some(SessionCommand::Play {
                player: vec![Rank::Ace, Rank::Seven],
                dealer_up: Rank::Nine,
            })
        );
        assert_eq!(parse_line("SHUFFLE").unwrap(), Some(SessionCommand::Shuffle));
        assert!(parse_line("play A 7").is_err());
        assert!(parse_line("play A Z vs 9").is_err());
        assert!(parse_line("dance").is_err());
    }

    #[test]
    fn test_session_counts_and_advises() {
        let advisor = Advisor::new(AdvisorConfig::default()).unwrap();
        let mut session = Session::new(&advisor, advisor.new_shoe().unwrap(), Format::Text);
        let input = Cursor::new("cards K 5 10 6 bogus 2\nplay 10 6 vs 10\nbad line\nquit\ncards 2 2 2\n");
        let mut out = Vec::new();
        session.run(input, &mut out).unwrap();

        assert_eq!(session.shoe().cards_seen(), 5);
        assert_eq!(session.shoe().running_count(), 1.0);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Action: HIT"));
    }

    #[test]
    fn test_session_shuffle_resets() {
        let advisor = Advisor::new(AdvisorConfig::default()).unwrap();
        let mut session = Session::new(&advisor, advisor.new_shoe().unwrap(), Format::Json);
        let input = Cursor::new("c 2 3 4\nshuffle\nstats\n");
        let mut out = Vec::new();
        session.run(input, &mut out).unwrap();

        assert_eq!(session.shoe().cards_seen(), 0);
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["stats"]["cards_seen"], 0);
        assert_eq!(value["bet"]["tag"], "BetMin");
    }
}
