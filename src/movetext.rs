//! Movetext line tokenizers.
//!
//! Two interchangeable strategies turn one movetext line into plies:
//! [`LexicalTokenizer`] scans the raw text with regular expressions and never
//! builds a board, while [`LibraryTokenizer`] replays the game with
//! `pgn-reader` and `shakmaty`, rejecting illegal moves. Both feed the same
//! [`Move`] model and enforce the same clock/eval correspondence rules.

use regex::Regex;
use shakmaty::Color;
use smallvec::SmallVec;
use std::sync::LazyLock;

use crate::annotation::{ClockSyntax, scan_clocks, scan_evals, zip_annotations};
use crate::error::ParseError;
use crate::types::{Headers, Move};
use crate::visitor::LibraryTokenizer;

type SanList<'a> = SmallVec<[&'a str; 128]>;

static SAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[NBRQK]?[a-h]?[1-8]?x?[a-h][1-8](?:=[NBRQK])?[+#]?|O-O(?:-O)?[+#]?").unwrap()
});

/// `[%clk ...]`, `[%cal Gd2d4]` and other embedded commands, whose bodies can
/// look like SAN.
static COMMAND: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[%[^\]]*\]").unwrap());

static BLACK_TO_MOVE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\d+\s*\.\.\.").unwrap());

const RESULT_MARKERS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

pub trait Tokenizer {
    /// Produces the plies of one movetext line. `headers` are the tags read
    /// so far for the same game.
    fn tokenize(&self, movetext: &str, headers: &Headers) -> Result<Vec<Move>, ParseError>;
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TokenizerKind {
    #[default]
    Lexical,
    Library,
}

impl TokenizerKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "lexical" | "fast" | "regex" => Some(Self::Lexical),
            "library" | "legal" | "shakmaty" => Some(Self::Library),
            _ => None,
        }
    }

    pub fn build(self, clock_syntax: ClockSyntax) -> Box<dyn Tokenizer + Send> {
        match self {
            Self::Lexical => Box::new(LexicalTokenizer::new(clock_syntax)),
            Self::Library => Box::new(LibraryTokenizer::new(clock_syntax)),
        }
    }
}

/// Whether a trimmed line is the movetext of a game.
///
/// A line made of a bare result marker also closes a game, with no moves.
pub fn is_movetext(line: &str) -> bool {
    line.starts_with("1.") || RESULT_MARKERS.contains(&line)
}

/// The side making the first move of a movetext line: black when the line
/// opens with a `N...` continuation marker.
pub fn first_mover(movetext: &str) -> Color {
    if BLACK_TO_MOVE.is_match(movetext) {
        Color::Black
    } else {
        Color::White
    }
}

/// Pattern-matching tokenizer. Three independent scans over the line (moves,
/// clocks, evals) are paired by position. Bracketed `[%...]` commands are
/// blanked before the move scan, but no board state is kept, so a SAN-shaped
/// word inside free comment text is still taken for a move.
#[derive(Clone, Copy, Debug, Default)]
pub struct LexicalTokenizer {
    clock_syntax: ClockSyntax,
}

impl LexicalTokenizer {
    pub fn new(clock_syntax: ClockSyntax) -> Self {
        Self { clock_syntax }
    }
}

impl Tokenizer for LexicalTokenizer {
    fn tokenize(&self, movetext: &str, _headers: &Headers) -> Result<Vec<Move>, ParseError> {
        let clocks = scan_clocks(movetext, self.clock_syntax);
        if clocks.is_empty() {
            return Ok(Vec::new());
        }

        let without_commands = COMMAND.replace_all(movetext, " ");
        let sans: SanList<'_> = SAN
            .find_iter(&without_commands)
            .map(|m| m.as_str())
            .collect();
        let evals = scan_evals(movetext);

        zip_annotations(&sans, &clocks, &evals, first_mover(movetext))
    }
}
