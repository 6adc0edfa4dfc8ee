//! Header block lines: `[Tag "value"]`.

use crate::error::ParseError;
use crate::types::Headers;

/// Whether a trimmed line belongs to a header block.
///
/// With `require_closing_bracket` unset, any line opening with `[` counts,
/// matching exports that append trailing junk after the tag.
pub fn is_header(line: &str, require_closing_bracket: bool) -> bool {
    line.starts_with('[') && (!require_closing_bracket || line.ends_with(']'))
}

/// Splits a header line into its tag and unescaped value.
pub fn parse_header(line: &str) -> Result<(String, String), ParseError> {
    let malformed = || ParseError::HeaderMalformed(line.to_string());

    let inner = line.strip_prefix('[').ok_or_else(malformed)?;
    let inner = inner.strip_suffix(']').unwrap_or(inner).trim_end();

    let (tag, rest) = inner
        .split_once(char::is_whitespace)
        .ok_or_else(malformed)?;
    if tag.is_empty() || tag.contains('"') {
        return Err(malformed());
    }

    let value = rest
        .trim_start()
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or_else(malformed)?;

    Ok((tag.to_string(), unescape(value)))
}

/// Parses `line` and upserts the result into `headers`.
pub fn read_header(line: &str, headers: &mut Headers) -> Result<(), ParseError> {
    let (tag, value) = parse_header(line)?;
    headers.insert(tag, value);
    Ok(())
}

fn unescape(value: &str) -> String {
    if !value.contains('\\') {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some(escaped @ ('\\' | '"')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
