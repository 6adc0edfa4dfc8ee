//! Clock and evaluation annotations, and the rules tying them to plies.

use regex::{Captures, Match, Regex};
use shakmaty::Color;
use smallvec::SmallVec;
use std::sync::LazyLock;

use crate::error::ParseError;
use crate::types::{Evaluation, Move};

pub type ClockList = SmallVec<[f64; 128]>;
pub type EvalList = SmallVec<[Evaluation; 128]>;

static CLOCK_BRACKETED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[%clk\s+(\d+):(\d{1,2}):(\d{1,2}(?:\.\d*)?)\s*\]").unwrap()
});

static CLOCK_INLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+):(\d{2}):(\d{2}(?:\.\d+)?)\b").unwrap());

static EVAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[%eval\s+(?:#([+-]?\d+)|([+-]?(?:\d+(?:\.\d*)?|\.\d+)))(?:,\d+)?\s*\]").unwrap()
});

/// How clock readings are written in the movetext.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ClockSyntax {
    /// `{ [%clk 0:03:00] }`, as exported by lichess and chess.com.
    #[default]
    Bracketed,
    /// A bare `0:03:00` anywhere in the line.
    Inline,
}

impl ClockSyntax {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bracketed" | "clk" => Some(Self::Bracketed),
            "inline" | "bare" => Some(Self::Inline),
            _ => None,
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            Self::Bracketed => &CLOCK_BRACKETED,
            Self::Inline => &CLOCK_INLINE,
        }
    }
}

/// Every clock reading in `text`, in seconds, in order of appearance.
pub fn scan_clocks(text: &str, syntax: ClockSyntax) -> ClockList {
    syntax
        .pattern()
        .captures_iter(text)
        .map(|caps| clock_seconds(&caps))
        .collect()
}

/// Every evaluation in `text`, in order of appearance.
pub fn scan_evals(text: &str) -> EvalList {
    EVAL.captures_iter(text).map(|caps| evaluation(&caps)).collect()
}

/// `H:MM:SS[.fraction]` as `H*3600 + M*60 + S`.
fn clock_seconds(caps: &Captures<'_>) -> f64 {
    number(caps.get(1)) * 3600.0 + number(caps.get(2)) * 60.0 + number(caps.get(3))
}

fn number(m: Option<Match<'_>>) -> f64 {
    m.and_then(|m| m.as_str().parse().ok()).unwrap_or(0.0)
}

fn evaluation(caps: &Captures<'_>) -> Evaluation {
    if let Some(mate) = caps.get(1) {
        let raw = mate.as_str();
        let distance = raw.parse::<i32>().unwrap_or(if raw.starts_with('-') {
            -i32::MAX
        } else {
            i32::MAX
        });
        return Evaluation::Mate(distance);
    }
    Evaluation::Score(number(caps.get(2)))
}

/// Checks the annotation counts of one movetext line.
///
/// Callers only reach this with at least one clock; an unannotated line is
/// not decomposed into moves at all.
pub fn check_counts(moves: usize, clocks: usize, evals: usize) -> Result<(), ParseError> {
    if moves != clocks {
        return Err(ParseError::ClockCountMismatch { moves, clocks });
    }
    if evals > clocks {
        return Err(ParseError::EvalCountExceedsClock { evals, clocks });
    }
    Ok(())
}

/// Pairs independently scanned move, clock and eval streams by position.
///
/// Colors alternate from `first`. Evaluations may stop early; later plies
/// then carry none.
pub fn zip_annotations(
    sans: &[&str],
    clocks: &[f64],
    evals: &[Evaluation],
    first: Color,
) -> Result<Vec<Move>, ParseError> {
    if clocks.is_empty() {
        return Ok(Vec::new());
    }
    check_counts(sans.len(), clocks.len(), evals.len())?;

    let mut color = first;
    let moves = sans
        .iter()
        .zip(clocks)
        .enumerate()
        .map(|(index, (san, clock))| {
            let mv = Move {
                san: (*san).to_string(),
                color,
                clock: Some(*clock),
                eval: evals.get(index).copied(),
            };
            color = !color;
            mv
        })
        .collect();
    Ok(moves)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_clocks_bracketed() {
        let clocks = scan_clocks(
            "1. e4 { [%clk 0:03:00] } e5 { [%clk 0:02:58] } 2. Nf3 { [%clk 1:30:43] }",
            ClockSyntax::Bracketed,
        );
        assert_eq!(clocks.as_slice(), &[180.0, 178.0, 5443.0]);
    }

    #[test]
    fn test_scan_clocks_fractional_seconds() {
        let clocks = scan_clocks("{ [%clk 0:00:09.7] }", ClockSyntax::Bracketed);
        assert_eq!(clocks.len(), 1);
        assert!((clocks[0] - 9.7).abs() < 1e-9);
    }

    #[test]
    fn test_scan_clocks_trailing_dot() {
        let clocks = scan_clocks("{ [%clk 0:00:09.] } { [%clk 0:01:05.] }", ClockSyntax::Bracketed);
        assert_eq!(clocks.as_slice(), &[9.0, 65.0]);
    }

    #[test]
    fn test_scan_clocks_bracketed_ignores_bare_times() {
        let clocks = scan_clocks("1. e4 { 0:03:00 } e5 { [%emt 0:00:02] }", ClockSyntax::Bracketed);
        assert!(clocks.is_empty());
    }

    #[test]
    fn test_scan_clocks_inline() {
        let clocks = scan_clocks("1. e4 {0:03:00} e5 {0:02:59.5}", ClockSyntax::Inline);
        assert_eq!(clocks.as_slice(), &[180.0, 179.5]);
    }

    #[test]
    fn test_clock_syntax_parse() {
        assert_eq!(ClockSyntax::parse("Bracketed"), Some(ClockSyntax::Bracketed));
        assert_eq!(ClockSyntax::parse(" inline "), Some(ClockSyntax::Inline));
        assert_eq!(ClockSyntax::parse("sometimes"), None);
    }

    #[test]
    fn test_scan_evals_scores_and_mates() {
        let evals = scan_evals(
            "1. d4 { [%eval 0.25] [%clk 1:30:43] } Nf6 { [%eval -1.5] } 2. c4 { [%eval #3] } \
             e6 { [%eval #-2] } 3. Nc3 { [%eval 0.17,22] } Bb4 { [%eval 12] }",
        );
        assert_eq!(
            evals.as_slice(),
            &[
                Evaluation::Score(0.25),
                Evaluation::Score(-1.5),
                Evaluation::Mate(3),
                Evaluation::Mate(-2),
                Evaluation::Score(0.17),
                Evaluation::Score(12.0),
            ]
        );
    }

    #[test]
    fn test_scan_evals_mate_overflow_saturates() {
        let evals = scan_evals("{ [%eval #-99999999999] }");
        assert_eq!(evals.as_slice(), &[Evaluation::Mate(-i32::MAX)]);
    }

    #[test]
    fn test_check_counts() {
        assert_eq!(check_counts(2, 2, 0), Ok(()));
        assert_eq!(check_counts(2, 2, 2), Ok(()));
        assert_eq!(
            check_counts(4, 3, 0),
            Err(ParseError::ClockCountMismatch {
                moves: 4,
                clocks: 3
            })
        );
        assert_eq!(
            check_counts(2, 2, 3),
            Err(ParseError::EvalCountExceedsClock {
                evals: 3,
                clocks: 2
            })
        );
    }

    #[test]
    fn test_zip_annotations_alternates_colors() {
        let moves = zip_annotations(
            &["e4", "e5", "Nf3"],
            &[180.0, 178.0, 175.0],
            &[Evaluation::Score(0.3)],
            Color::White,
        )
        .unwrap();

        let colors: Vec<Color> = moves.iter().map(|m| m.color).collect();
        assert_eq!(colors, [Color::White, Color::Black, Color::White]);
        assert_eq!(moves[0].eval, Some(Evaluation::Score(0.3)));
        assert_eq!(moves[1].eval, None);
        assert_eq!(moves[2].clock, Some(175.0));
    }

    #[test]
    fn test_zip_annotations_black_first() {
        let moves = zip_annotations(&["e5", "Nf3"], &[60.0, 59.0], &[], Color::Black).unwrap();
        assert_eq!(moves[0].color, Color::Black);
        assert_eq!(moves[1].color, Color::White);
    }

    #[test]
    fn test_zip_annotations_without_clocks_is_empty() {
        let moves = zip_annotations(&["e4", "e5"], &[], &[Evaluation::Score(0.1)], Color::White);
        assert_eq!(moves, Ok(Vec::new()));
    }
}
