mod output;
mod session;

use std::io;

use blackjack::{
    Advisor, AdvisorConfig, BettingConfig, CountingConfig, CountingSystem, DoubleRestriction,
    GameRules, Rank, TableView,
};
use clap::{Args, Parser, Subcommand};

use output::{write_count, write_decision, Format};
use session::Session;

type BoxErr = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(
    name = "blackjack-advisor",
    about = "Basic strategy, card counting and bet sizing advisor"
)]
struct Cli {
    #[command(flatten)]
    table: TableArgs,

    /// Print JSON instead of text
    #[arg(long, global = true, env = "BJ_JSON", default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct TableArgs {
    /// Use a rules preset: default, european, atlantic_city, single_deck
    #[arg(long, global = true, env = "BJ_PRESET")]
    preset: Option<String>,

    /// Number of decks in the shoe
    #[arg(long, global = true, env = "BJ_DECKS", default_value = "6")]
    num_decks: u8,

    /// Dealer hits soft 17
    #[arg(long, global = true, env = "BJ_H17", default_value_t = true, action = clap::ArgAction::Set)]
    dealer_hits_soft_17: bool,

    /// Double after split allowed
    #[arg(long, global = true, env = "BJ_DAS", default_value_t = true, action = clap::ArgAction::Set)]
    double_after_split: bool,

    /// Late surrender allowed
    #[arg(long, global = true, env = "BJ_SURRENDER", default_value_t = false, action = clap::ArgAction::Set)]
    allow_surrender: bool,

    /// Double restriction: any, hard9_10_11, hard10_11
    #[arg(long, global = true, env = "BJ_DOUBLE_RESTRICTION", default_value = "any")]
    double_restriction: String,

    /// Maximum splits per hand
    #[arg(long, global = true, env = "BJ_MAX_SPLITS", default_value = "3")]
    max_splits: u8,

    /// Track the count and size bets
    #[arg(long, global = true, env = "BJ_COUNTING", default_value_t = true, action = clap::ArgAction::Set)]
    counting: bool,

    /// Counting system: hi_lo, ko, omega_ii, halves
    #[arg(long, global = true, env = "BJ_SYSTEM", default_value = "hi_lo")]
    system: String,

    /// Minimum table bet
    #[arg(long, global = true, env = "BJ_MIN_BET", default_value = "10")]
    min_bet: f64,

    /// Maximum table bet
    #[arg(long, global = true, env = "BJ_MAX_BET", default_value = "500")]
    max_bet: f64,

    /// Bankroll used for Kelly staking
    #[arg(long, global = true, env = "BJ_BANKROLL", default_value = "1000")]
    bankroll: f64,

    /// Fraction of the Kelly stake (0.5 = half Kelly)
    #[arg(long, global = true, env = "BJ_KELLY_FRACTION", default_value = "0.5")]
    kelly_fraction: f64,

    /// Reset the count once this percent of the shoe was seen
    #[arg(long, global = true, env = "BJ_PENETRATION_RESET")]
    penetration_reset: Option<f64>,

    /// Flag decisions to leave the table at or below this true count
    #[arg(long, global = true, env = "BJ_WONG_OUT", allow_negative_numbers = true)]
    wong_out: Option<f64>,
}

#[derive(Subcommand)]
enum Command {
    /// Recommend a play for one hand
    Decide {
        /// Player cards, e.g. "A,7"
        #[arg(long)]
        player: String,

        /// Dealer up-card
        #[arg(long)]
        dealer: String,

        /// Cards already seen from this shoe
        #[arg(long)]
        seen: Option<String>,

        /// Current balance, overrides the bankroll for bet sizing
        #[arg(long)]
        balance: Option<f64>,

        /// Splits already made on this spot
        #[arg(long, default_value = "0")]
        splits: u8,
    },

    /// Count a list of cards and recommend a bet
    Count {
        /// Cards seen, e.g. "K,5,10,6"
        #[arg(long)]
        cards: String,
    },

    /// Read `cards`, `play`, `stats`, `shuffle` and `quit` lines from stdin
    Session,
}

fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), BoxErr> {
    let config = build_config(&cli.table)?;
    let advisor = Advisor::new(config)?;
    let format = if cli.json { Format::Json } else { Format::Text };
    let mut shoe = advisor.new_shoe()?;
    let mut out = io::stdout().lock();

    match cli.command {
        Command::Decide {
            player,
            dealer,
            seen,
            balance,
            splits,
        } => {
            if let Some(seen) = seen {
                shoe.apply_all(&Rank::parse_many(&seen)?);
            }
            let mut view = TableView::new(Rank::parse_many(&player)?, dealer.parse()?)
                .after_splits(splits);
            view.balance = balance;
            let decision = advisor.decide(&view, Some(&shoe))?;
            write_decision(&mut out, &decision, format)?;
        }
        Command::Count { cards } => {
            shoe.apply_all(&Rank::parse_many(&cards)?);
            let betting = &advisor.config().betting;
            let bet = shoe.advantage_and_bet(
                betting.min_bet,
                betting.max_bet,
                betting.bankroll,
                betting.kelly_fraction,
            )?;
            write_count(&mut out, &shoe.stats(), &bet, format)?;
        }
        Command::Session => {
            log::info!(
                "session started: {} decks, {} count",
                advisor.config().rules.num_decks,
                advisor.config().counting.system.name()
            );
            let stdin = io::stdin().lock();
            Session::new(&advisor, shoe, format).run(stdin, &mut out)?;
        }
    }
    Ok(())
}

fn build_config(args: &TableArgs) -> Result<AdvisorConfig, BoxErr> {
    let rules = if let Some(preset) = &args.preset {
        match preset.as_str() {
            "default" => GameRules::default(),
            "european" => GameRules::european(),
            "atlantic_city" => GameRules::atlantic_city(),
            "single_deck" => GameRules::single_deck(),
            _ => {
                return Err(format!(
                    "Unknown preset '{preset}'. Available: default, european, atlantic_city, single_deck"
                )
                .into())
            }
        }
    } else {
        GameRules {
            num_decks: args.num_decks,
            dealer_hits_soft_17: args.dealer_hits_soft_17,
            double_after_split: args.double_after_split,
            allow_surrender: args.allow_surrender,
            double_restriction: parse_double_restriction(&args.double_restriction)?,
            max_splits: args.max_splits,
        }
    };

    let config = AdvisorConfig {
        rules,
        betting: BettingConfig {
            min_bet: args.min_bet,
            max_bet: args.max_bet,
            bankroll: args.bankroll,
            kelly_fraction: args.kelly_fraction,
        },
        counting: CountingConfig {
            enabled: args.counting,
            system: CountingSystem::from_name(&args.system)?,
            wong_out: args.wong_out.is_some(),
            wong_out_threshold: args
                .wong_out
                .unwrap_or(blackjack::DEFAULT_WONG_OUT_THRESHOLD),
            penetration_reset: args.penetration_reset,
        },
    };
    config.validate()?;
    log::debug!("configuration: {config:?}");
    Ok(config)
}

fn parse_double_restriction(s: &str) -> Result<DoubleRestriction, BoxErr> {
    match s.to_lowercase().as_str() {
        "any" => Ok(DoubleRestriction::Any),
        "hard9_10_11" => Ok(DoubleRestriction::Hard9_10_11),
        "hard10_11" => Ok(DoubleRestriction::Hard10_11),
        _ => Err(format!(
            "Invalid double restriction '{s}'. Options: any, hard9_10_11, hard10_11"
        )
        .into()),
    }
}
