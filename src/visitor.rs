use pgn_reader::{RawComment, Reader, SanPlus, Skip, Visitor};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Color, Position};
use std::io;
use std::mem;
use std::ops::ControlFlow;

use crate::annotation::{ClockSyntax, check_counts, scan_clocks, scan_evals};
use crate::error::ParseError;
use crate::movetext::Tokenizer;
use crate::types::{Evaluation, Headers, Move};

/// Legality-checking tokenizer (pgn-reader + shakmaty).
///
/// Replays the mainline from the game's starting position; variations are
/// skipped. Clock and eval annotations are anchored to the ply whose comment
/// carries them rather than paired by position.
#[derive(Clone, Copy, Debug, Default)]
pub struct LibraryTokenizer {
    clock_syntax: ClockSyntax,
}

impl LibraryTokenizer {
    pub fn new(clock_syntax: ClockSyntax) -> Self {
        Self { clock_syntax }
    }
}

impl Tokenizer for LibraryTokenizer {
    fn tokenize(&self, movetext: &str, headers: &Headers) -> Result<Vec<Move>, ParseError> {
        let start = starting_position(headers)?;

        let mut reader = Reader::new(io::Cursor::new(movetext.as_bytes()));
        let mut visitor = PlyVisitor::new(start, self.clock_syntax);

        match reader.read_game(&mut visitor) {
            Ok(Some(result)) => result,
            Ok(None) => Ok(Vec::new()),
            Err(err) => Err(ParseError::Movetext(err.to_string())),
        }
    }
}

/// Standard position unless the game declares a `FEN` setup.
fn starting_position(headers: &Headers) -> Result<Chess, ParseError> {
    if headers.get("SetUp") == Some("0") {
        return Ok(Chess::default());
    }
    let Some(raw) = headers.get("FEN") else {
        return Ok(Chess::default());
    };

    let mode = match headers.get("Variant") {
        Some(variant) if variant.eq_ignore_ascii_case("chess960") => CastlingMode::Chess960,
        _ => CastlingMode::Standard,
    };

    let fen: Fen = raw
        .trim()
        .parse()
        .map_err(|err| ParseError::InvalidFen(format!("'{raw}' ({err})")))?;
    fen.into_position(mode)
        .map_err(|err| ParseError::InvalidFen(format!("'{raw}' ({err})")))
}

struct Ply {
    san: String,
    color: Color,
    clock: Option<f64>,
    eval: Option<Evaluation>,
}

/// Mainline visitor: plays each SAN on `pos` and attaches comment
/// annotations to the last played ply.
struct PlyVisitor {
    pos: Chess,
    clock_syntax: ClockSyntax,
    plies: Vec<Ply>,
    clocks_seen: usize,
    evals_seen: usize,
}

impl PlyVisitor {
    fn new(pos: Chess, clock_syntax: ClockSyntax) -> Self {
        Self {
            pos,
            clock_syntax,
            plies: Vec::with_capacity(128),
            clocks_seen: 0,
            evals_seen: 0,
        }
    }

    fn finish(&mut self) -> Result<Vec<Move>, ParseError> {
        if self.clocks_seen == 0 {
            return Ok(Vec::new());
        }

        let plies = mem::take(&mut self.plies);
        check_counts(plies.len(), self.clocks_seen, self.evals_seen)?;

        // Equal totals can still hide a comment with two clocks next to a ply
        // with none.
        let anchored = plies.iter().filter(|ply| ply.clock.is_some()).count();
        if anchored != plies.len() {
            return Err(ParseError::ClockCountMismatch {
                moves: plies.len(),
                clocks: anchored,
            });
        }

        Ok(plies
            .into_iter()
            .map(|ply| Move {
                san: ply.san,
                color: ply.color,
                clock: ply.clock,
                eval: ply.eval,
            })
            .collect())
    }
}

impl Visitor for PlyVisitor {
    type Tags = ();
    type Movetext = ();
    type Output = Result<Vec<Move>, ParseError>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, _tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, _: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn san(
        &mut self,
        _movetext: &mut Self::Movetext,
        san_plus: SanPlus,
    ) -> ControlFlow<Self::Output> {
        let color = self.pos.turn();
        match san_plus.san.to_move(&self.pos) {
            Ok(m) => {
                self.pos.play_unchecked(m);
                self.plies.push(Ply {
                    san: san_plus.to_string(),
                    color,
                    clock: None,
                    eval: None,
                });
                ControlFlow::Continue(())
            }
            Err(_) => ControlFlow::Break(Err(ParseError::IllegalMove {
                ply: self.plies.len() + 1,
                san: san_plus.to_string(),
            })),
        }
    }

    fn comment(
        &mut self,
        _movetext: &mut Self::Movetext,
        comment: RawComment<'_>,
    ) -> ControlFlow<Self::Output> {
        let text = String::from_utf8_lossy(comment.as_bytes());
        let clocks = scan_clocks(&text, self.clock_syntax);
        let evals = scan_evals(&text);
        self.clocks_seen += clocks.len();
        self.evals_seen += evals.len();

        if let Some(ply) = self.plies.last_mut() {
            if let Some(&clock) = clocks.last() {
                ply.clock = Some(clock);
            }
            if let Some(&eval) = evals.last() {
                ply.eval = Some(eval);
            }
        }
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, _movetext: Self::Movetext) -> Self::Output {
        self.finish()
    }
}
