use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use shakmaty::Color;
use std::fmt;

/// One parsed game record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub headers: Headers,
    pub moves: Vec<Move>,

    /// `None` for cleanly parsed games. In lenient mode, holds the
    /// diagnostics for skipped header lines or an abandoned movetext parse.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

impl Game {
    pub fn header(&self, tag: &str) -> Option<&str> {
        self.headers.get(tag)
    }
}

/// One ply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub san: String,
    #[serde(with = "color_name")]
    pub color: Color,
    /// Remaining clock time in seconds.
    pub clock: Option<f64>,
    pub eval: Option<Evaluation>,
}

/// Engine evaluation attached to a ply.
///
/// Scores are stored as written in the source (usually pawn units). A forced
/// mate is kept apart from the numeric score: `Mate(n)` with `n > 0` means
/// white mates in `n`, `n < 0` means black does.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Evaluation {
    Score(f64),
    Mate(i32),
}

impl Evaluation {
    pub fn score(self) -> Option<f64> {
        match self {
            Evaluation::Score(score) => Some(score),
            Evaluation::Mate(_) => None,
        }
    }

    pub fn is_mate(self) -> bool {
        matches!(self, Evaluation::Mate(_))
    }
}

/// Header tags in first-seen order. A repeated tag overwrites the value in
/// place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: String, value: String) {
        match self.0.iter_mut().find(|(existing, _)| *existing == tag) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((tag, value)),
        }
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == tag)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(tag, value)| (tag.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (tag, value) in iter {
            headers.insert(tag.into(), value.into());
        }
        headers
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (tag, value) in &self.0 {
            map.serialize_entry(tag, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HeadersVisitor;

        impl<'de> Visitor<'de> for HeadersVisitor {
            type Value = Headers;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of header tags to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Headers, A::Error> {
                let mut headers = Headers::new();
                while let Some((tag, value)) = access.next_entry::<String, String>()? {
                    headers.insert(tag, value);
                }
                Ok(headers)
            }
        }

        deserializer.deserialize_map(HeadersVisitor)
    }
}

mod color_name {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use shakmaty::Color;

    pub fn serialize<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(match color {
            Color::White => "white",
            Color::Black => "black",
        })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
        let name = String::deserialize(deserializer)?;
        match name.as_str() {
            "white" => Ok(Color::White),
            "black" => Ok(Color::Black),
            other => Err(D::Error::unknown_variant(other, &["white", "black"])),
        }
    }
}
