//! Opening PGN inputs: stdin, plain files and zstd-compressed files.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use zstd::stream::read::Decoder as ZstdDecoder;

use crate::error::InputError;

pub type PgnInput = Box<dyn BufRead + Send>;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CompressionMode {
    /// Zstd for `.zst` files, plain otherwise.
    #[default]
    Auto,
    Plain,
    Zstd,
}

impl CompressionMode {
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        let normalized = raw.trim();
        if normalized.eq_ignore_ascii_case("auto") {
            Ok(Self::Auto)
        } else if normalized.eq_ignore_ascii_case("zstd") || normalized.eq_ignore_ascii_case("zst")
        {
            Ok(Self::Zstd)
        } else if normalized.eq_ignore_ascii_case("none") || normalized.eq_ignore_ascii_case("plain")
        {
            Ok(Self::Plain)
        } else {
            Err(InputError::Compression(normalized.to_string()))
        }
    }

    fn resolve(self, path: &Path) -> Self {
        match self {
            Self::Auto if path.extension().is_some_and(|ext| ext == "zst") => Self::Zstd,
            Self::Auto => Self::Plain,
            other => other,
        }
    }
}

/// Where games are read from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    pub fn open(&self, compression: CompressionMode) -> Result<PgnInput, InputError> {
        match self {
            Source::Stdin => Ok(Box::new(BufReader::new(io::stdin()))),
            Source::File(path) => open_input_stream(path, compression),
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Stdin => f.write_str("<stdin>"),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

pub fn open_input_stream(path: &Path, compression: CompressionMode) -> Result<PgnInput, InputError> {
    let file = File::open(path).map_err(|source| InputError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    match compression.resolve(path) {
        CompressionMode::Zstd => ZstdDecoder::new(file)
            .map(|decoder| Box::new(BufReader::new(decoder)) as PgnInput)
            .map_err(|source| InputError::Zstd {
                path: path.to_path_buf(),
                source,
            }),
        _ => Ok(Box::new(BufReader::new(file))),
    }
}

/// Expands command line arguments into sources. No arguments, or `-`, means
/// stdin; arguments containing `*` or `?` are glob patterns.
pub fn expand_sources(args: &[String]) -> Result<Vec<Source>, InputError> {
    if args.is_empty() {
        return Ok(vec![Source::Stdin]);
    }

    let mut sources = Vec::with_capacity(args.len());
    for arg in args {
        if arg == "-" {
            sources.push(Source::Stdin);
        } else if arg.contains('*') || arg.contains('?') {
            sources.extend(
                glob::glob(arg)?
                    .filter_map(|entry| entry.ok())
                    .map(Source::File),
            );
        } else {
            sources.push(Source::File(PathBuf::from(arg)));
        }
    }
    Ok(sources)
}
