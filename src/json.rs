//! Line-delimited JSON: one game object per line.

use std::io::{self, BufRead, Write};

use crate::types::Game;

pub fn write_game<W: Write>(out: &mut W, game: &Game) -> io::Result<()> {
    serde_json::to_writer(&mut *out, game)?;
    out.write_all(b"\n")
}

/// Reads back games written by [`write_game`].
pub fn read_games<R: BufRead>(input: R) -> impl Iterator<Item = serde_json::Result<Game>> {
    serde_json::Deserializer::from_reader(input).into_iter::<Game>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReaderConfig;
    use crate::reader::GameReader;

    #[test]
    fn test_jsonl_one_line_per_game() {
        let input = "[Event \"A\"]\n1. e4 { [%clk 0:03:00] } 1-0\n[Event \"B\"]\n1. d4 d5 0-1\n";
        let mut out = Vec::new();
        for game in GameReader::new(input.as_bytes(), ReaderConfig::default()) {
            write_game(&mut out, &game.unwrap()).unwrap();
        }

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            r#"{"headers":{"Event":"A"},"moves":[{"san":"e4","color":"white","clock":180.0,"eval":null}]}"#
        );
        assert_eq!(lines[1], r#"{"headers":{"Event":"B"},"moves":[]}"#);
    }

    #[test]
    fn test_jsonl_round_trip_through_reader() {
        let input = "[Event \"Rated Blitz\"]\n[White \"A \\\"the\\\" player\"]\n\
                     1. e4 { [%eval 0.3] [%clk 0:03:00] } e5 { [%eval #-4] [%clk 0:02:58.5] } 0-1\n\
                     [Event \"Bad\"]\n1. e4 { [%clk 0:03:00] } e5 1-0\n";
        let games: Vec<Game> = GameReader::new(input.as_bytes(), ReaderConfig::default())
            .map(Result::unwrap)
            .collect();

        let mut out = Vec::new();
        for game in &games {
            write_game(&mut out, game).unwrap();
        }

        let decoded: Vec<Game> = read_games(out.as_slice()).map(Result::unwrap).collect();
        assert_eq!(decoded, games);
        assert_eq!(decoded[0].header("White"), Some("A \"the\" player"));
        assert!(decoded[1].parse_error.is_some());
    }
}
