//! Streaming PGN tokenizer for single-line-movetext exports.
//!
//! Games are read line by line: `[Tag "value"]` header lines followed by one
//! movetext line starting with `1.`. Each movetext line is split into plies
//! with their `[%clk]` and `[%eval]` annotations, without simulating the
//! board unless the legality-checking tokenizer is selected.
//!
//! ```no_run
//! use pgn_stream::{GameReader, ReaderConfig};
//!
//! let stdin = std::io::stdin().lock();
//! for game in GameReader::new(stdin, ReaderConfig::default()) {
//!     let game = game?;
//!     println!("{:?} {} plies", game.header("Event"), game.moves.len());
//! }
//! # Ok::<(), pgn_stream::ReadError>(())
//! ```

pub mod annotation;
pub mod config;
pub mod error;
pub mod header;
pub mod input;
pub mod json;
pub mod log;
pub mod movetext;
pub mod progress;
pub mod reader;
pub mod types;
pub mod visitor;

pub use annotation::ClockSyntax;
pub use config::{ReaderConfig, Strictness};
pub use error::{InputError, ParseError, ReadError};
pub use movetext::{LexicalTokenizer, Tokenizer, TokenizerKind};
pub use progress::{Summary, Throughput};
pub use reader::GameReader;
pub use types::{Evaluation, Game, Headers, Move};
pub use visitor::LibraryTokenizer;
