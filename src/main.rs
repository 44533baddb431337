use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use holdem_cpu::cards::{Card, parse_cards};
use holdem_cpu::policy::DecisionInput;
use holdem_cpu::web;
use holdem_cpu::{Advisor, AdvisorConfig};
use itertools::Itertools;
use owo_colors::OwoColorize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "holdem-cpu",
    version,
    about = "Hold'em hand evaluator, equity estimator and CPU betting policy",
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RNG seed (random if omitted)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// JSON config file; flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Monte Carlo trials per equity estimate
    #[arg(long, global = true)]
    trials: Option<u32>,

    /// Spread trials across all cores
    #[arg(long, global = true, default_value_t = false)]
    parallel: bool,

    /// Print results as JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Disable ANSI colors in CLI output
    #[arg(long = "no-color", global = true, default_value_t = false)]
    no_color: bool,

    /// Log at debug level
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Classify 5 to 7 cards
    Eval {
        /// Cards such as `As Kd 10h` (symbols like A♠ work too)
        #[arg(required = true)]
        cards: Vec<String>,
    },
    /// Estimate win rate against one random hand
    Equity {
        #[arg(long)]
        hole: String,
        #[arg(long, default_value = "")]
        board: String,
    },
    /// Pick a betting action for the given spot
    Decide {
        #[arg(long)]
        hole: String,
        #[arg(long, default_value = "")]
        board: String,
        #[arg(long, default_value_t = 0)]
        pot: u64,
        #[arg(long = "to-call", default_value_t = 0)]
        to_call: u64,
    },
    /// Run the web server
    Serve {
        /// Address to bind (HOST:PORT)
        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    let out = Output {
        json: cli.json,
        color: !cli.no_color,
    };

    match cli.command {
        Commands::Serve { addr } => {
            let addr: SocketAddr = addr.parse()?;
            web::serve(addr, config).await
        }
        Commands::Eval { cards } => run_eval(&out, &Advisor::new(config), &cards),
        Commands::Equity { hole, board } => {
            run_equity(&out, &mut Advisor::new(config), &hole, &board)
        }
        Commands::Decide {
            hole,
            board,
            pot,
            to_call,
        } => {
            let input = DecisionInput {
                hole: parse_cards(&hole)?,
                board: parse_cards(&board)?,
                pot,
                to_call,
            };
            run_decide(&out, &mut Advisor::new(config), &input)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "holdem_cpu=debug,tower_http=debug"
    } else {
        "holdem_cpu=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<AdvisorConfig> {
    let mut config = match &cli.config {
        Some(path) => AdvisorConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AdvisorConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(trials) = cli.trials {
        config.policy.trials = trials;
    }
    config.parallel |= cli.parallel;
    Ok(config)
}

fn run_eval(out: &Output, advisor: &Advisor, cards: &[String]) -> Result<()> {
    let cards = parse_cards(&cards.join(" "))?;
    let evaluation = advisor.evaluate(&cards)?;
    if out.json {
        println!(
            "{}",
            json!({
                "cards": cards.iter().map(Card::notation).collect::<Vec<_>>(),
                "category": evaluation.category,
                "name": evaluation.category.name(),
                "score": evaluation.score,
            })
        );
    } else if out.color {
        println!(
            "{} {} {} (score {})",
            out.cards(&cards),
            "=>".dimmed(),
            evaluation.category.name().bold().green(),
            evaluation.score
        );
    } else {
        println!(
            "{} => {} (score {})",
            out.cards(&cards),
            evaluation.category.name(),
            evaluation.score
        );
    }
    Ok(())
}

fn run_equity(out: &Output, advisor: &mut Advisor, hole: &str, board: &str) -> Result<()> {
    let hole = parse_cards(hole)?;
    let board = parse_cards(board)?;
    let report = advisor.estimate(&hole, &board, None)?;
    if out.json {
        println!(
            "{}",
            json!({
                "win_rate": report.win_rate,
                "wins": report.wins,
                "trials": report.trials_run,
                "seed": advisor.seed(),
            })
        );
    } else {
        println!(
            "Hole {} | Board {} | Win rate {:.1}% over {} trials",
            out.cards(&hole),
            out.board(&board),
            report.win_rate * 100.0,
            report.trials_run
        );
    }
    Ok(())
}

fn run_decide(out: &Output, advisor: &mut Advisor, input: &DecisionInput) -> Result<()> {
    let decision = advisor.decide(input)?;
    if out.json {
        println!("{}", serde_json::to_string(&decision)?);
        return Ok(());
    }

    let action = format!("{} {}", decision.action, decision.amount);
    let action = if out.color {
        action.bold().yellow().to_string()
    } else {
        action
    };
    println!(
        "Hole {} | Board {} | Pot {} | To call {}",
        out.cards(&input.hole),
        out.board(&input.board),
        input.pot,
        input.to_call
    );
    println!(
        "Decision: {} (win rate {:.1}%, required {:.1}%, rule {:?})",
        action,
        decision.win_rate * 100.0,
        decision.required_win_rate * 100.0,
        decision.rule
    );
    Ok(())
}

struct Output {
    json: bool,
    color: bool,
}

impl Output {
    fn card(&self, card: &Card) -> String {
        if self.color && card.suit.is_red() {
            card.notation().red().to_string()
        } else {
            card.notation()
        }
    }

    fn cards(&self, cards: &[Card]) -> String {
        cards.iter().map(|c| self.card(c)).join(" ")
    }

    fn board(&self, board: &[Card]) -> String {
        if board.is_empty() {
            "--".to_string()
        } else {
            self.cards(board)
        }
    }
}
