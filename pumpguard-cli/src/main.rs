//! pumpguard — pump health check from temperature, vibration and pressure
//!
//! # Subcommands
//! - `predict [-t T] [-v V] [-p P] [--json]` — classify, log and show history
//! - `history [--json]`                      — table of every logged prediction
//! - `trend [--width N]`                     — sensor trend chart
//! - `session`                               — one prediction per stdin line
//! - `model show|reset`                      — inspect or rebuild the model artifact

mod render;

use std::io::BufRead;
use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pumpguard_core::config::FieldBounds;
use pumpguard_core::{
    Classifier, CsvHistoryStore, HistoryRecord, HistoryStore, ModelArtifact, PumpGuardConfig,
    SensorReading,
};
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_TREND_WIDTH: usize = 60;

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "pumpguard",
    version,
    about = "PumpGuard — rule-based pump health check with a persistent history log"
)]
struct Cli {
    /// Path to the TOML config file (optional)
    #[arg(short, long, env = "PUMPGUARD_CONFIG", default_value = "pumpguard.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Classify one reading, append it to the history and redisplay the log
    Predict {
        /// Temperature in °C (defaults to the configured input default)
        #[arg(short, long, allow_negative_numbers = true)]
        temperature: Option<f64>,

        /// Vibration in mm/s
        #[arg(short, long, allow_negative_numbers = true)]
        vibration: Option<f64>,

        /// Pressure in bar
        #[arg(short, long, allow_negative_numbers = true)]
        pressure: Option<f64>,

        /// Print the assessment as JSON instead of the dashboard view
        #[arg(long)]
        json: bool,
    },

    /// Show every logged prediction
    History {
        #[arg(long)]
        json: bool,
    },

    /// Show the sensor trend chart
    Trend {
        /// Number of most recent records to chart
        #[arg(
            short,
            long,
            default_value_t = DEFAULT_TREND_WIDTH,
            value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
        )]
        width: usize,
    },

    /// Read "temperature vibration pressure" lines from stdin, one cycle each
    Session,

    /// Inspect or rebuild the model artifact
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
}

#[derive(Debug, Subcommand)]
enum ModelAction {
    /// Print the active artifact
    Show,
    /// Overwrite the artifact with the rule-based default
    Reset,
}

// ============================================================================
// App
// ============================================================================

struct App {
    config: PumpGuardConfig,
    /// Loaded on first prediction so read-only commands never touch the
    /// model file.
    classifier: Option<Classifier>,
    store: CsvHistoryStore,
}

impl App {
    fn new(config: PumpGuardConfig) -> Self {
        let store = CsvHistoryStore::new(&config.storage.history_path);
        Self {
            config,
            classifier: None,
            store,
        }
    }

    fn classifier(&mut self) -> &Classifier {
        let model_path = Path::new(&self.config.storage.model_path);
        self.classifier.get_or_insert_with(|| {
            let outcome = ModelArtifact::load_or_init(model_path);
            if let Some(warning) = &outcome.warning {
                eprintln!("pumpguard: warning: {}", warning);
            }
            Classifier::new(outcome.artifact.into_model())
        })
    }

    /// Apply the configured input bounds. The classifier never sees a value
    /// that fails here.
    fn read_input(
        &self,
        temperature: Option<f64>,
        vibration: Option<f64>,
        pressure: Option<f64>,
    ) -> Result<SensorReading, String> {
        let input = &self.config.input;
        let field = |name: &str, value: Option<f64>, bounds: &FieldBounds| {
            bounds.check(name, value.unwrap_or(bounds.default))
        };
        Ok(SensorReading::new(
            field("temperature", temperature, &input.temperature)?,
            field("vibration", vibration, &input.vibration)?,
            field("pressure", pressure, &input.pressure)?,
        ))
    }

    /// Read the full log, downgrading failures to a warning.
    fn load_history(&self) -> Option<Vec<HistoryRecord>> {
        match self.store.read_all() {
            Ok(records) => Some(records),
            Err(e) => {
                tracing::warn!("History read failed: {}", e);
                eprintln!("pumpguard: warning: could not read history: {}", e);
                None
            }
        }
    }

    /// classify → display → append → redisplay, exactly once.
    /// A classification failure aborts before anything is logged.
    fn run_cycle(&mut self, reading: SensorReading, json: bool) -> anyhow::Result<()> {
        let assessment = self
            .classifier()
            .assess(reading)
            .context("prediction failed")?;

        if json {
            println!("{}", serde_json::to_string_pretty(&assessment)?);
        } else {
            print!("{}", render::render_assessment(&assessment));
        }

        let record = HistoryRecord::new(reading, assessment.verdict.status);
        if let Err(e) = self.store.append(&record) {
            tracing::warn!("History append failed: {}", e);
            eprintln!("pumpguard: warning: could not save history: {}", e);
        }

        if !json {
            if let Some(records) = self.load_history() {
                println!("\nPrediction History");
                print!("{}", render::render_table(&records));
                if !records.is_empty() {
                    println!();
                    print!("{}", render::render_trend(&records, DEFAULT_TREND_WIDTH));
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Commands
// ============================================================================

fn do_predict(
    app: &mut App,
    temperature: Option<f64>,
    vibration: Option<f64>,
    pressure: Option<f64>,
    json: bool,
) -> anyhow::Result<()> {
    let reading = app
        .read_input(temperature, vibration, pressure)
        .map_err(anyhow::Error::msg)?;
    app.run_cycle(reading, json)
}

fn do_history(app: &App, json: bool) -> anyhow::Result<()> {
    let records = app.store.read_all()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print!("{}", render::render_table(&records));
    }
    Ok(())
}

fn do_trend(app: &App, width: usize) -> anyhow::Result<()> {
    let records = app.store.read_all()?;
    print!("{}", render::render_trend(&records, width));
    Ok(())
}

/// Parse "T V P" (whitespace or comma separated) from one session line.
fn parse_session_line(line: &str) -> Result<[f64; 3], String> {
    let parts: Vec<&str> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    if parts.len() != 3 {
        return Err(format!(
            "expected 3 values (temperature vibration pressure), got {}",
            parts.len()
        ));
    }
    let mut values = [0.0; 3];
    for (slot, raw) in values.iter_mut().zip(&parts) {
        *slot = raw
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a number", raw))?;
    }
    Ok(values)
}

fn do_session(app: &mut App) -> anyhow::Result<()> {
    let input = &app.config.input;
    eprintln!("Enter readings as: temperature vibration pressure (blank line or 'quit' to exit)");
    for (name, b) in [
        ("temperature", &input.temperature),
        ("vibration", &input.vibration),
        ("pressure", &input.pressure),
    ] {
        eprintln!("  {:<12} {} to {}, step {}", name, b.min, b.max, b.step);
    }
    let stdin = std::io::stdin();
    run_session(app, stdin.lock())
}

/// One cycle per line until a blank line, `quit` or end of input. A bad
/// line, including one that is not valid UTF-8, is reported and skipped.
fn run_session<R: BufRead>(app: &mut App, mut reader: R) -> anyhow::Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(e) => {
                eprintln!("pumpguard: skipping line that is not valid UTF-8: {}", e);
                continue;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("quit") {
            break;
        }

        let result = parse_session_line(trimmed)
            .and_then(|[t, v, p]| app.read_input(Some(t), Some(v), Some(p)))
            .map_err(anyhow::Error::msg)
            .and_then(|reading| app.run_cycle(reading, false));

        if let Err(e) = result {
            eprintln!("pumpguard: {:#}", e);
        }
        println!();
    }
    Ok(())
}

fn do_model(app: &App, action: ModelAction) -> anyhow::Result<()> {
    let path = Path::new(&app.config.storage.model_path);
    match action {
        ModelAction::Show => {
            let artifact = ModelArtifact::load(path)?;
            println!("Model:   {} ({})", artifact.strategy_name(), path.display());
            println!("{}", serde_json::to_string_pretty(&artifact)?);
        }
        ModelAction::Reset => {
            ModelArtifact::default().save(path)?;
            println!("Model artifact reset to rule-based default at {}", path.display());
        }
    }
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    // .env is optional; real environment variables win.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match PumpGuardConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("pumpguard: failed to load config from {}: {}", cli.config, e);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut app = App::new(config);

    let result = match cli.command {
        Commands::Predict {
            temperature,
            vibration,
            pressure,
            json,
        } => do_predict(&mut app, temperature, vibration, pressure, json),
        Commands::History { json } => do_history(&app, json),
        Commands::Trend { width } => do_trend(&app, width),
        Commands::Session => do_session(&mut app),
        Commands::Model { action } => do_model(&app, action),
    };

    if let Err(e) = result {
        eprintln!("pumpguard: {:#}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
