use std::io::{self, BufWriter, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, bail};
use clap::Parser;
use tracing::{info, warn};

use pgn_stream::input::{self, CompressionMode, PgnInput};
use pgn_stream::{
    ClockSyntax, GameReader, ReaderConfig, Strictness, Throughput, TokenizerKind, json, log,
};

/// Tokenize PGN exports into line-delimited JSON games.
///
/// Settings default from `PGN_*` environment variables (a `.env` file is
/// honoured); flags override them. Progress goes to stderr.
#[derive(Parser, Debug)]
#[command(name = "pgn-stream", version)]
struct Args {
    /// Input files or glob patterns; stdin when omitted or `-`
    paths: Vec<String>,

    /// auto, zstd or none
    #[arg(long, default_value = "auto")]
    compression: String,

    /// lexical (fast, no legality checks) or library (replays every move)
    #[arg(long, value_parser = parse_tokenizer)]
    tokenizer: Option<TokenizerKind>,

    /// bracketed (`[%clk 0:03:00]`) or inline (`0:03:00`)
    #[arg(long, value_parser = parse_clock_syntax)]
    clock_syntax: Option<ClockSyntax>,

    /// Abort on the first malformed header or movetext
    #[arg(long)]
    strict: bool,

    /// Drop a trailing header block that has no movetext
    #[arg(long)]
    complete_only: bool,

    /// Accept header lines that open with `[` but do not close with `]`
    #[arg(long)]
    lenient_brackets: bool,

    /// Games between progress reports (0 disables)
    #[arg(long)]
    progress_interval: Option<u64>,
}

impl Args {
    fn reader_config(&self) -> ReaderConfig {
        let mut config = ReaderConfig::from_env();
        if self.strict {
            config.strictness = Strictness::Strict;
        }
        if self.complete_only {
            config.emit_trailing_headers = false;
        }
        if self.lenient_brackets {
            config.require_closing_bracket = false;
        }
        if let Some(tokenizer) = self.tokenizer {
            config.tokenizer = tokenizer;
        }
        if let Some(clock_syntax) = self.clock_syntax {
            config.clock_syntax = clock_syntax;
        }
        if let Some(interval) = self.progress_interval {
            config.progress_interval = interval;
        }
        config
    }
}

fn parse_tokenizer(raw: &str) -> Result<TokenizerKind, String> {
    TokenizerKind::parse(raw).ok_or_else(|| format!("unknown tokenizer '{raw}'"))
}

fn parse_clock_syntax(raw: &str) -> Result<ClockSyntax, String> {
    ClockSyntax::parse(raw).ok_or_else(|| format!("unknown clock syntax '{raw}'"))
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    log::init();

    let args = Args::parse();
    let config = args.reader_config();
    let compression = CompressionMode::parse(&args.compression)?;
    let sources = input::expand_sources(&args.paths)?;
    if sources.is_empty() {
        bail!("no input files match {:?}", args.paths);
    }

    let interrupt = Arc::new(AtomicBool::new(false));
    {
        let interrupt = interrupt.clone();
        ctrlc::set_handler(move || interrupt.store(true, Ordering::SeqCst))
            .context("Failed to set Ctrl-C handler")?;
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut throughput = Throughput::new(config.progress_interval);
    let mut outcome: anyhow::Result<()> = Ok(());

    for source in &sources {
        if interrupt.load(Ordering::SeqCst) {
            break;
        }

        let stream = match source.open(compression) {
            Ok(stream) => stream,
            Err(err) if sources.len() > 1 => {
                warn!("{err}");
                continue;
            }
            Err(err) => {
                outcome = Err(anyhow::Error::new(err).context(format!("cannot read {source}")));
                break;
            }
        };

        let mut reader = GameReader::new(stream, config.clone())
            .with_interrupt(interrupt.clone())
            .with_throughput(throughput);
        let result = write_games(&mut reader, &mut out)
            .with_context(|| format!("while reading {source}"));
        throughput = reader.into_throughput();

        if result.is_err() {
            outcome = result;
            break;
        }
    }

    let flushed = out.flush().context("Failed to flush output");
    if interrupt.load(Ordering::SeqCst) {
        info!("interrupted");
    }
    info!("{}", throughput.summary());

    outcome.and(flushed)
}

fn write_games<W: Write>(reader: &mut GameReader<PgnInput>, out: &mut W) -> anyhow::Result<()> {
    for game in reader {
        json::write_game(out, &game?)?;
    }
    Ok(())
}
