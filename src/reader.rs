//! Line-oriented game assembly.
//!
//! [`GameReader`] pulls one line at a time, routes header lines to the header
//! reader and the movetext line to the configured tokenizer, and yields one
//! [`Game`] per movetext line in input order. At most one game is under
//! construction at any time.

use std::io::BufRead;
use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::config::{ReaderConfig, Strictness};
use crate::error::{ErrorAccumulator, ParseError, ReadError};
use crate::header;
use crate::movetext::{self, Tokenizer};
use crate::progress::Throughput;
use crate::types::Game;

pub struct GameReader<R> {
    input: R,
    line_buffer: Vec<u8>,
    line_no: u64,
    config: ReaderConfig,
    tokenizer: Box<dyn Tokenizer + Send>,
    current_game: Game,
    parse_error: ErrorAccumulator,
    throughput: Throughput,
    interrupt: Option<Arc<AtomicBool>>,
    finished: bool,
}

impl<R: BufRead> GameReader<R> {
    pub fn new(input: R, config: ReaderConfig) -> Self {
        let tokenizer = config.tokenizer.build(config.clock_syntax);
        let throughput = Throughput::new(config.progress_interval);
        Self {
            input,
            line_buffer: Vec::with_capacity(4096),
            line_no: 0,
            config,
            tokenizer,
            current_game: Game::default(),
            parse_error: ErrorAccumulator::default(),
            throughput,
            interrupt: None,
            finished: false,
        }
    }

    /// Stops reading once `flag` is set. Checked before every line read; the
    /// game in progress at that point is abandoned.
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// Continues counting from an existing meter, e.g. across input files.
    pub fn with_throughput(mut self, throughput: Throughput) -> Self {
        self.throughput = throughput;
        self
    }

    pub fn throughput(&self) -> &Throughput {
        &self.throughput
    }

    pub fn into_throughput(self) -> Throughput {
        self.throughput
    }

    /// Reads until the next game is complete.
    ///
    /// In strict mode a parse failure is returned as `ReadError::Parse`. A
    /// failed movetext has already discarded its game, so reading on skips
    /// it; a malformed header line is dropped and its game keeps building.
    pub fn read_game(&mut self) -> Option<Result<Game, ReadError>> {
        while !self.finished {
            if self.interrupted() {
                info!(line = self.line_no, "interrupted; abandoning game in progress");
                self.finished = true;
                return None;
            }

            let mut buffer = mem::take(&mut self.line_buffer);
            buffer.clear();

            let outcome = match self.input.read_until(b'\n', &mut buffer) {
                Ok(0) => self.end_of_stream(),
                Ok(_) => {
                    self.line_no += 1;
                    let line = String::from_utf8_lossy(&buffer);
                    self.consume_line(line.trim())
                }
                Err(err) => {
                    self.finished = true;
                    Some(Err(ReadError::Io(err)))
                }
            };

            self.line_buffer = buffer;
            if outcome.is_some() {
                return outcome;
            }
        }
        None
    }

    fn interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn consume_line(&mut self, line: &str) -> Option<Result<Game, ReadError>> {
        if header::is_header(line, self.config.require_closing_bracket) {
            return header::read_header(line, &mut self.current_game.headers)
                .err()
                .and_then(|err| self.reject(err))
                .map(Err);
        }

        if movetext::is_movetext(line) {
            return self.complete_game(line);
        }

        None
    }

    fn complete_game(&mut self, movetext: &str) -> Option<Result<Game, ReadError>> {
        let parsed = self
            .tokenizer
            .tokenize(movetext, &self.current_game.headers);
        let mut game = mem::take(&mut self.current_game);

        match parsed {
            Ok(moves) => game.moves = moves,
            Err(err) => {
                if let Some(err) = self.reject(err) {
                    self.parse_error = ErrorAccumulator::default();
                    return Some(Err(err));
                }
            }
        }

        game.parse_error = self.parse_error.take();
        self.throughput.record();
        Some(Ok(game))
    }

    /// Applies the strictness policy: strict mode hands the error back,
    /// lenient mode logs it and records it on the current game.
    fn reject(&mut self, err: ParseError) -> Option<ReadError> {
        match self.config.strictness {
            Strictness::Strict => Some(ReadError::Parse {
                line: self.line_no,
                source: err,
            }),
            Strictness::Lenient => {
                warn!(line = self.line_no, "{err}");
                self.parse_error.push(&err.to_string());
                None
            }
        }
    }

    fn end_of_stream(&mut self) -> Option<Result<Game, ReadError>> {
        self.finished = true;

        let mut game = mem::take(&mut self.current_game);
        let parse_error = self.parse_error.take();
        if game.headers.is_empty() {
            return None;
        }
        if !self.config.emit_trailing_headers {
            debug!(
                headers = game.headers.len(),
                "discarding header block without movetext at end of input"
            );
            return None;
        }

        debug!(
            headers = game.headers.len(),
            "emitting header block without movetext at end of input"
        );
        game.parse_error = parse_error;
        self.throughput.record();
        Some(Ok(game))
    }
}

impl<R: BufRead> Iterator for GameReader<R> {
    type Item = Result<Game, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_game()
    }
}
