//! Play command - run one game in the terminal
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_options(), build_runner(), play(), report_result()
//! - Level 3: print_turn(), print_search_stats()
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use wargame_broker::{BrokerClient, BrokerSource};
use wargame_core::{GameError, GameState, GameType, Heuristic, Options, Team};
use wargame_search::{
    GameRunner, GameStats, MoveSource, RunnerError, SearchAi, SearchOutcome, Suggestion,
    TurnReport,
};

use crate::human::PromptSource;
use crate::output::GameTrace;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

/// Who plays which side
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GameTypeArg {
    /// Computer against computer
    Auto,
    /// Human Attacker against the computer
    Attacker,
    /// Human Defender against the computer
    Defender,
    /// Two humans
    Manual,
}

impl From<GameTypeArg> for GameType {
    fn from(arg: GameTypeArg) -> Self {
        match arg {
            GameTypeArg::Auto => GameType::CompVsComp,
            GameTypeArg::Attacker => GameType::AttackerVsComp,
            GameTypeArg::Defender => GameType::CompVsDefender,
            GameTypeArg::Manual => GameType::AttackerVsDefender,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum HeuristicArg {
    /// Material count
    E0,
    /// Weighted health and Virus threat
    E1,
    /// Weighted health plus mobility
    E2,
}

impl From<HeuristicArg> for Heuristic {
    fn from(arg: HeuristicArg) -> Self {
        match arg {
            HeuristicArg::E0 => Heuristic::Material,
            HeuristicArg::E1 => Heuristic::WeightedHealth,
            HeuristicArg::E2 => Heuristic::Mobility,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct PlayArgs {
    /// JSON options file; flags below override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Board dimension
    #[arg(long)]
    pub dim: Option<usize>,

    /// Deepest ply the search may reach
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Search seconds per computer move
    #[arg(long)]
    pub max_time: Option<f64>,

    /// Turn limit after which the Defender wins (0 = no limit)
    #[arg(long)]
    pub max_turns: Option<u32>,

    #[arg(long, value_enum)]
    pub game_type: Option<GameTypeArg>,

    #[arg(long, value_enum)]
    pub heuristic: Option<HeuristicArg>,

    /// Plain minimax instead of alpha-beta
    #[arg(long)]
    pub no_alpha_beta: bool,

    /// Game broker URL
    #[arg(long, value_name = "URL")]
    pub broker: Option<String>,

    /// RNG seed for the computer player
    #[arg(long)]
    pub seed: Option<u64>,

    /// Do not write a trace file
    #[arg(long)]
    pub no_file_output: bool,

    /// Directory for the trace file
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub trace_dir: PathBuf,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// This function reads like a table of contents:
/// 1. Resolve options
/// 2. Open the trace
/// 3. Play until the game ends
/// 4. Close the trace
pub fn run(args: PlayArgs) -> Result<()> {
    let options = build_options(&args)?;

    let mut trace = if args.no_file_output {
        GameTrace::console()
    } else {
        GameTrace::open(&options, &args.trace_dir).context("could not create trace file")?
    };

    let mut runner = build_runner(&options)?;
    let result = play(&mut runner, options, &mut trace);

    if let Some(path) = trace.close().context("could not finish trace file")? {
        tracing::info!(path = %path.display(), "game trace saved");
    }
    result
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Defaults, then the options file, then command-line flags
pub fn build_options(args: &PlayArgs) -> Result<Options> {
    let mut options = match &args.config {
        Some(path) => Options::load(path)
            .with_context(|| format!("could not load options from {}", path.display()))?,
        None => Options::default(),
    };

    if let Some(dim) = args.dim {
        options.dim = dim;
    }
    if let Some(max_depth) = args.max_depth {
        options.max_depth = max_depth;
    }
    if let Some(max_time) = args.max_time {
        options.max_time = max_time;
    }
    if let Some(max_turns) = args.max_turns {
        options.max_turns = (max_turns > 0).then_some(max_turns);
    }
    if let Some(game_type) = args.game_type {
        options.game_type = game_type.into();
    }
    if let Some(heuristic) = args.heuristic {
        options.heuristic = heuristic.into();
    }
    if args.no_alpha_beta {
        options.alpha_beta = false;
    }
    if args.broker.is_some() {
        options.broker = args.broker.clone();
    }
    if args.seed.is_some() {
        options.seed = args.seed;
    }

    options.validate()?;
    Ok(options)
}

/// Human moves come from the broker when one is configured, else stdin.
/// With a broker, computer moves are also posted to it.
fn build_runner(options: &Options) -> Result<GameRunner> {
    let ai = SearchAi::from_options(options);

    let Some(url) = &options.broker else {
        return Ok(GameRunner::new(ai, Box::new(PromptSource::stdin())));
    };

    let client = BrokerClient::new(url.as_str()).context("could not create broker client")?;
    let source: Box<dyn MoveSource> = Box::new(BrokerSource::new(client.clone()));
    Ok(GameRunner::new(ai, source).with_publisher(Box::new(client)))
}

/// The game loop: board, winner check, one turn
fn play(runner: &mut GameRunner, options: Options, trace: &mut GameTrace) -> Result<()> {
    let mut state = GameState::new(options);
    let mut stats = GameStats::default();

    print_welcome(&state, trace);

    loop {
        trace.line("");
        trace.line(&state);

        match state.winner() {
            Ok(Some(winner)) => {
                report_result(winner, &state, trace);
                return Ok(());
            }
            Ok(None) => {}
            Err(GameError::BothAiDestroyed) => {
                trace.line("Both AIs were destroyed! The game ends without a winner.");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }

        match runner.play_turn(&mut state, &mut stats) {
            Ok(report) => print_turn(&report, &stats, trace),
            Err(RunnerError::NoMove(team)) => {
                trace.line(format!("Computer ({team}) doesn't know what to do!!!"));
                return Ok(());
            }
            Err(err) => return Err(err).context("game aborted"),
        }
    }
}

fn print_welcome(state: &GameState, trace: &mut GameTrace) {
    let options = state.options();
    trace.line(format!("Welcome! Game type: {}", options.game_type.name()));
    if let Some(max_turns) = options.max_turns {
        trace.line(format!(
            "After {max_turns} turns, the Defender will win by default!"
        ));
    }
}

fn report_result(winner: Team, state: &GameState, trace: &mut GameTrace) {
    trace.line(format!(
        "{} wins in {} turns!",
        winner,
        state.turns_played()
    ));
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn print_turn(report: &TurnReport, stats: &GameStats, trace: &mut GameTrace) {
    match &report.suggestion {
        Some(suggestion) => {
            trace.line(format!("Computer {}: {}", report.team, report.pair));
            trace.line(&report.description);
            print_search_stats(suggestion, stats, trace);
        }
        None => {
            trace.line(format!("Player {}: {}", report.team, report.pair));
            trace.line(&report.description);
        }
    }
}

fn print_search_stats(suggestion: &Suggestion, stats: &GameStats, trace: &mut GameTrace) {
    if let Some(note) = outcome_note(suggestion.outcome) {
        trace.line(note);
    }
    if let Some(score) = suggestion.score {
        trace.line(format!("Heuristic score: {score}"));
    }
    trace.line(format!(
        "Evals per depth: {}",
        format_depth_counts(&suggestion.stats.sorted_evaluations())
    ));
    trace.line(format!("Cumulative evals: {}", stats.total_evaluations()));
    if let Some(rate) = stats.evaluation_rate() {
        trace.line(format!("Eval perf.: {:.1}k/s", rate / 1000.0));
    }
    trace.line(format!(
        "Average branching factor: {:.1}",
        stats.average_branching_factor()
    ));
    trace.line(format!("Depth reached: {}", suggestion.depth_reached));
    trace.line(format!(
        "Elapsed time: {:.1}s",
        suggestion.stats.elapsed.as_secs_f64()
    ));
}

// ============================================================================
// LEVEL 4 - FORMATTING
// ============================================================================

fn outcome_note(outcome: SearchOutcome) -> Option<&'static str> {
    match outcome {
        SearchOutcome::Complete | SearchOutcome::NoMoves => None,
        SearchOutcome::TimedOut => Some("(search ran out of time, using the deepest finished result)"),
        SearchOutcome::RandomAfterTimeout => Some("(search ran out of time, playing a random move)"),
        SearchOutcome::RandomUnscored => Some("(no move could be scored, playing a random move)"),
    }
}

/// "1:12 2:140 3:1902"
fn format_depth_counts(counts: &[(u32, u64)]) -> String {
    counts
        .iter()
        .map(|(depth, count)| format!("{depth}:{count}"))
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// TESTS
// ============================================================================
