mod logging;

use std::path::PathBuf;

use agewatch::{
    BirthInput, Config, LiveClock, MilestoneKind, Pass, Snapshot, SystemClock, TokioScheduler,
    Trigger, live, report,
};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueHint};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};

#[derive(Parser)]
#[command(name = "agewatch", version)]
#[command(about = "Exact live age, next birthday and life milestones", long_about = None)]
struct Cli {
    /// Date of birth, YYYY-MM-DD
    #[arg(long, global = true)]
    date: Option<String>,

    /// Time of birth, HH:MM or HH:MM:SS
    #[arg(long, global = true)]
    time: Option<String>,

    /// IANA timezone of the birth place; defaults to the local zone
    #[arg(short = 'z', long, global = true)]
    timezone: Option<String>,

    /// Path to the configuration file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current age once (default)
    Show,

    /// Redraw every second; type `DATE [TIME] [TIMEZONE]` to change the input
    Watch,

    /// Write a milestone reminder as an .ics file
    Export {
        #[arg(short, long, value_enum, default_value_t = MilestoneKind::Day)]
        milestone: MilestoneKind,

        /// Directory to write into
        #[arg(short, long, default_value = ".", value_hint = ValueHint::DirPath)]
        out: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = Config::load(cli.config)
        .await?
        .merge(cli.date, cli.time, cli.timezone);

    match cli.command.unwrap_or(Commands::Show) {
        Commands::Show => show(&config, cli.json),
        Commands::Watch => watch(&config, cli.json).await,
        Commands::Export { milestone, out } => export(&config, milestone, out).await,
    }
}

fn show(config: &Config, json: bool) -> Result<()> {
    let snapshot = Snapshot::take(&config.birth_input(), &SystemClock)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", report::render(&snapshot));
    }
    Ok(())
}

async fn watch(config: &Config, json: bool) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut clock =
        LiveClock::new(TokioScheduler, SystemClock, tx.clone()).with_interval(config.interval());

    tx.send(Trigger::Input(config.birth_input()))
        .context("trigger channel closed")?;
    tokio::spawn(read_inputs(tx));

    let render = |pass: &Pass| match pass {
        Pass::Computed(snapshot) if json => match serde_json::to_string(snapshot) {
            Ok(line) => println!("{line}"),
            Err(err) => tracing::error!(%err, "failed to serialize snapshot"),
        },
        Pass::Computed(snapshot) => print!("\x1B[2J\x1B[H{}", report::render(snapshot)),
        Pass::Rejected(err) => eprint!("{}", report::render_error(err)),
    };

    tokio::select! {
        _ = live::drive(&mut clock, &mut rx, render) => {}
        result = tokio::signal::ctrl_c() => result.context("failed to listen for Ctrl-C")?,
    }
    clock.stop();
    Ok(())
}

// Each stdin line is a new submission: `DATE [TIME] [TIMEZONE]`.
async fn read_inputs(tx: UnboundedSender<Trigger>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if tx.send(Trigger::Input(parse_input_line(&line))).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => {
                tracing::warn!(%err, "stopped reading input");
                break;
            }
        }
    }
}

fn parse_input_line(line: &str) -> BirthInput {
    let mut fields = line.split_whitespace();
    let mut input = BirthInput::new(fields.next().unwrap_or_default());
    for field in fields {
        if field.contains(':') && input.time.is_none() {
            input.time = Some(field.to_string());
        } else {
            input.timezone = Some(field.to_string());
        }
    }
    input
}

async fn export(config: &Config, kind: MilestoneKind, out: PathBuf) -> Result<()> {
    let snapshot = Snapshot::take(&config.birth_input(), &SystemClock)?;
    let milestones = snapshot
        .milestones
        .context("milestone lies outside the supported calendar range")?;

    let event = milestones.get(kind).to_event();
    let path = out.join(event.file_name());
    tokio::fs::write(&path, event.to_ics())
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), start = %event.start, "exported milestone");
    println!("Wrote {}", path.display());
    Ok(())
}
