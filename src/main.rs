//! Formcheck CLI
//!
//! Usage:
//!   formcheck --exercise squat --replay frames.jsonl   # Replay recorded landmarks
//!   formcheck --exercise neck < frames.jsonl           # Replay from stdin
//!   formcheck --exercise plank --demo                  # Built-in scripted session
//!   formcheck --list                                   # Exercises and thresholds
//!   formcheck --serve                                  # HTTP API server
//!   formcheck --print-config                           # Default config file

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use formcheck::config::FormcheckConfig;
use formcheck::core::{
    demo_frames, run_server, JsonFileSink, MemorySink, ReplaySource, Replayer, SessionDriver, UiSink,
};
use formcheck::types::{AnalysisResult, ExerciseKind, HintColor, Notification, SessionAggregate, SessionResult};
use formcheck::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "formcheck",
    version = VERSION,
    about = "Formcheck - count exercise repetitions and judge their form",
    long_about = "Formcheck reads per-frame body landmarks, runs them through an\n\
                  exercise state machine and reports counted repetitions with a\n\
                  correct/incorrect verdict and diagnostics.\n\n\
                  Exercises:\n  \
                  squat, pushup, situp, plank (hold), mountain, neck\n\n\
                  Input (one JSON object per line):\n  \
                  {\"t_ms\": 0, \"landmarks\": [{\"x\": 0.5, \"y\": 0.4}, ...]}\n  \
                  {\"t_ms\": 33, \"landmarks\": null}"
)]
struct Args {
    /// Exercise to check (aliases like push-up or neck-rotation work)
    #[arg(short, long, default_value = "squat")]
    exercise: String,

    /// JSON Lines file with landmark frames (default: stdin)
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// Run a built-in scripted session instead of reading frames
    #[arg(long)]
    demo: bool,

    /// List exercises with their targets and thresholds
    #[arg(long)]
    list: bool,

    /// Print the default configuration file and exit
    #[arg(long)]
    print_config: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (overrides the config file)
    #[arg(long)]
    addr: Option<String>,

    /// Configuration file
    #[arg(short, long, default_value = "formcheck.toml")]
    config: PathBuf,

    /// Output every frame outcome and the final result as JSON lines
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Suppress hints
    #[arg(long)]
    no_hints: bool,

    /// Directory for result files (overrides the config file)
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Do not write the result file
    #[arg(long)]
    no_save: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,

    /// Log format (pretty, compact, json)
    #[arg(long)]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    if args.no_color {
        colored::control::set_override(false);
    }

    if args.print_config {
        print!("{}", FormcheckConfig::default_toml()?);
        return Ok(());
    }

    let config = FormcheckConfig::load_from_file(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config.display()))?;

    if args.list {
        return run_list(&config, &args);
    }

    if args.serve {
        let addr = args.addr.clone().unwrap_or_else(|| config.server.addr.clone());
        let results_dir = if args.no_save { None } else { Some(results_dir(&args, &config)) };
        run_server(&addr, config, results_dir).await?;
        return Ok(());
    }

    run_session(&config, &args)
}

fn init_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, fmt, Layer};

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("formcheck={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(io::stderr)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(io::stderr)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .with_writer(io::stderr)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer().with_target(true).with_writer(io::stderr).boxed()
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("initializing logging")?;
    Ok(())
}

fn results_dir(args: &Args, config: &FormcheckConfig) -> PathBuf {
    args.results_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.session.results_dir))
}

/// Print exercise catalog
fn run_list(config: &FormcheckConfig, args: &Args) -> Result<()> {
    let mut exercises = Vec::new();
    for kind in ExerciseKind::ALL {
        exercises.push(config.exercise(kind)?);
    }

    if args.json {
        let list: Vec<_> = exercises
            .iter()
            .map(|e| serde_json::json!({ "meta": e.meta(), "thresholds": e.thresholds() }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    for exercise in &exercises {
        let meta = exercise.meta();
        let unit = if meta.is_hold() { "s" } else { " reps" };
        println!("{} ({}) - target {}{}", meta.title.bold(), meta.name, meta.target, unit);
        for (name, value) in exercise.thresholds().iter() {
            println!("    {:<22} {}", name, value);
        }
    }
    Ok(())
}

/// Replay or demo one recording through the session driver
fn run_session(config: &FormcheckConfig, args: &Args) -> Result<()> {
    let kind: ExerciseKind = args.exercise.parse()?;
    let exercise = config.exercise(kind)?;
    let mut driver = SessionDriver::new(exercise);
    driver.set_hints_enabled(config.session.hints_enabled && !args.no_hints);

    if !args.json {
        print_header(&driver);
    }

    let mut ui = TerminalUi::new(args.json, args.verbose || args.debug);
    let mut replayer = Replayer::new(Duration::from_millis(config.session.hold_tick_ms));
    driver.start();

    let frames = if args.demo {
        info!(exercise = %kind, "running demo script");
        replayer.run(&mut driver, demo_frames(kind).into_iter().map(Ok), &mut ui)?
    } else if let Some(path) = &args.replay {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        replayer.run(&mut driver, ReplaySource::new(BufReader::new(file)), &mut ui)?
    } else {
        let stdin = io::stdin();
        replayer.run(&mut driver, ReplaySource::new(stdin.lock()), &mut ui)?
    };
    debug!(frames, "input exhausted");

    let result = if args.no_save {
        driver.stop(&mut MemorySink::default())?
    } else {
        let mut sink = JsonFileSink::new(results_dir(args, config));
        match driver.stop(&mut sink) {
            Ok(result) => {
                if let (Some(path), false) = (sink.last_path(), args.json) {
                    println!("Result saved to: {}", path.display());
                }
                result
            }
            Err(e) => {
                warn!(error = %e, "could not save result");
                driver.stop(&mut MemorySink::default())?
            }
        }
    };

    if args.json {
        println!("{}", serde_json::to_string(&result)?);
    } else {
        print_summary(&driver, &result);
    }
    Ok(())
}

/// Prints live hints and counters; repeated hints are shown once
///
/// With `json` every frame outcome is one JSON line instead.
struct TerminalUi {
    json: bool,
    verbose: bool,
    last_hint: Option<String>,
}

impl TerminalUi {
    fn new(json: bool, verbose: bool) -> Self {
        Self {
            json,
            verbose,
            last_hint: None,
        }
    }
}

impl UiSink for TerminalUi {
    fn notify(&mut self, notification: &Notification) {
        if self.json || self.last_hint.as_deref() == Some(notification.message.as_str()) {
            return;
        }
        self.last_hint = Some(notification.message.clone());
        let (r, g, b) = notification.background.rgb();
        let text = format!("  » {}", notification.message);
        match notification.background {
            HintColor::Red | HintColor::Crimson => println!("{}", text.truecolor(r, g, b).bold()),
            _ => println!("{}", text.truecolor(r, g, b)),
        }
    }

    fn counters(&mut self, aggregate: &SessionAggregate) {
        if self.json {
            return;
        }
        println!(
            "  #{:<3} {} {}",
            aggregate.total_count,
            format!("✓ {}", aggregate.correct_count).green(),
            format!("✗ {}", aggregate.incorrect_count).red(),
        );
    }

    fn frame(&mut self, result: &AnalysisResult) {
        if self.json {
            if let Ok(json) = serde_json::to_string(result) {
                println!("{}", json);
            }
        } else if self.verbose {
            println!("{}", result.to_parseable_string().dimmed());
        }
    }
}

fn print_header(driver: &SessionDriver) {
    let meta = driver.meta();
    println!("{}", "========================================".bold());
    println!("  Formcheck v{} - {}", VERSION, meta.title.bold());
    println!("{}", "========================================".bold());
    for step in meta.instructions {
        println!("  - {}", step);
    }
    println!();
}

fn print_summary(driver: &SessionDriver, result: &SessionResult) {
    let meta = driver.meta();
    println!();
    println!("{}", "Results".bold().underline());
    println!("  Exercise:   {}", meta.title);
    match result.time {
        Some(time) => println!("  Time held:  {:.1} of {} seconds", time, meta.target),
        None => println!("  Repetitions: {} of {}", result.repetitions, meta.target),
    }
    println!("  Correct:    {}", result.correct_count.to_string().green());
    println!("  Incorrect:  {}", result.incorrect_count.to_string().red());

    let score = format!("{}%", result.score);
    let score = match result.score {
        80..=100 => score.green(),
        50..=79 => score.yellow(),
        _ => score.red(),
    };
    println!("  Score:      {}", score.bold());

    let diagnostics = &driver.aggregate().diagnostics;
    if diagnostics.is_empty() {
        println!("\n  {}", "All repetitions performed cleanly".green());
    } else {
        println!("\n  {}", "Error report".bold());
        for entry in diagnostics {
            println!("    #{:<3} {} ({})", entry.index, entry.message, entry.code.code().dimmed());
        }
    }
}
