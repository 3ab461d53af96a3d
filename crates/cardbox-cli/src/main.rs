//! cardbox - debounced card presence detector

use anyhow::{Result, bail};
use cardbox_hardware::TagReader;
use cardbox_hardware::mock::MockTagReader;
use cardbox_presence::{DetectorConfig, PollManager};
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod script;

/// Report each card placed on the reader exactly once
#[derive(Parser, Debug)]
#[command(name = "cardbox")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (JSON); defaults are used if it cannot be read
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Minimum time between reported cards, in milliseconds
    #[arg(long)]
    min_interval_ms: Option<u64>,

    /// Reader poll period, in milliseconds
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Use the mock reader, driven by commands on stdin
    #[arg(long)]
    mock: bool,
}

impl Cli {
    fn detector_config(&self) -> Result<DetectorConfig> {
        let mut config = DetectorConfig::load_or_default(&self.config);

        if let Some(ms) = self.min_interval_ms {
            config.min_interval_ms = ms;
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval_ms = ms;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = cli.detector_config()?;

    if !cli.mock {
        bail!("no hardware reader driver is built in; run with --mock");
    }

    run_mock(config).await
}

/// Poll the mock reader while stdin drives its field.
async fn run_mock(config: DetectorConfig) -> Result<()> {
    let (reader, control) = MockTagReader::new();
    let reader_info = reader.get_reader_info().await?;
    info!(
        "Reader: {} ({})",
        reader_info.name,
        reader_info.protocols.join(", ")
    );

    let mut handle = PollManager::new(reader, config).start().await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    info!(
        "Mock reader ready: <uid hex> places a card, '-' removes it, \
         '!' injects a fault, 'q' quits"
    );

    loop {
        tokio::select! {
            event = handle.recv() => match event {
                Some(event) => println!("{}  {}", event.detected_at.to_rfc3339(), event.tag),
                None => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match script::parse_line(&line) {
                    Ok(Some(command)) => match script::apply(command, &control) {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => warn!("{:#}", e),
                    },
                    Ok(None) => {}
                    Err(e) => warn!("{:#}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    let stats = handle.shutdown().await?;
    info!(
        ticks = stats.ticks,
        raw_detections = stats.raw_detections,
        faults = stats.faults,
        events = stats.events,
        suppressed = stats.suppressed,
        "Stopped"
    );

    Ok(())
}
