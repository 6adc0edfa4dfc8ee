use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure confined to a single game. The driver resets after any of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed header line: {0}")]
    HeaderMalformed(String),

    #[error("clock count mismatch: {moves} moves, {clocks} clock annotations")]
    ClockCountMismatch { moves: usize, clocks: usize },

    #[error("eval count exceeds clock count: {evals} evaluations, {clocks} clock annotations")]
    EvalCountExceedsClock { evals: usize, clocks: usize },

    #[error("illegal move at ply {ply}: {san}")]
    IllegalMove { ply: usize, san: String },

    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("unreadable movetext: {0}")]
    Movetext(String),
}

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("line {line}: {source}")]
    Parse {
        line: u64,
        #[source]
        source: ParseError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("failed to open file '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to initialize zstd decoder for '{}': {source}", path.display())]
    Zstd {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid path pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("invalid compression value '{0}'. Supported values: 'zstd', 'none' or 'auto'")]
    Compression(String),
}

/// Collects per-game diagnostics in lenient mode.
#[derive(Debug, Clone, Default)]
pub struct ErrorAccumulator(Option<String>);

impl ErrorAccumulator {
    pub fn push(&mut self, msg: &str) {
        match &mut self.0 {
            Some(existing) => {
                existing.push_str("; ");
                existing.push_str(msg);
            }
            None => {
                self.0 = Some(msg.to_string());
            }
        }
    }

    pub fn take(&mut self) -> Option<String> {
        self.0.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_single_message() {
        let mut accumulator = ErrorAccumulator::default();
        accumulator.push("first error");

        assert_eq!(accumulator.take().as_deref(), Some("first error"));
    }

    #[test]
    fn test_push_multiple_messages_uses_separator() {
        let mut accumulator = ErrorAccumulator::default();
        accumulator.push(&ParseError::HeaderMalformed("[Event".to_string()).to_string());
        accumulator.push(
            &ParseError::ClockCountMismatch {
                moves: 4,
                clocks: 3,
            }
            .to_string(),
        );

        assert_eq!(
            accumulator.take().as_deref(),
            Some(
                "malformed header line: [Event; clock count mismatch: 4 moves, 3 clock annotations"
            )
        );
    }

    #[test]
    fn test_take_consumes_accumulator() {
        let mut accumulator = ErrorAccumulator::default();
        accumulator.push("error");

        assert_eq!(accumulator.take().as_deref(), Some("error"));
        assert!(accumulator.take().is_none());
    }

    #[test]
    fn test_read_error_carries_line_number() {
        let err = ReadError::Parse {
            line: 7,
            source: ParseError::EvalCountExceedsClock {
                evals: 3,
                clocks: 2,
            },
        };
        assert_eq!(
            err.to_string(),
            "line 7: eval count exceeds clock count: 3 evaluations, 2 clock annotations"
        );
    }
}
