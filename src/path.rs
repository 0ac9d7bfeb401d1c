//! Field path parsing and validation
//!
//! A field path addresses a value nested inside a record: dotted segments
//! name record members, bracketed or bare numeric segments address sequence
//! elements.
//!
//! - `user`
//! - `user.role`
//! - `roles[0].name`
//! - `privs.0` (bare numeric segment, equivalent to `privs[0]`)
//!
//! Paths are parsed strictly at construction time; projection over a parsed
//! path can only ever yield a value or absence, never a path error.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while parsing a field path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path string is empty
    #[error("field path cannot be empty")]
    Empty,

    /// A dotted segment is empty (leading/trailing dot, or `a..b`)
    #[error("field path segment cannot be empty")]
    EmptySegment,

    /// A bracketed index is not a decimal number
    #[error("invalid sequence index '{0}'")]
    InvalidIndex(String),

    /// A `[` has no matching `]`
    #[error("unclosed sequence index in segment '{0}'")]
    UnclosedIndex(String),
}

/// One step of a field path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Named member of a record
    Name(String),
    /// Positional element of a sequence
    Index(usize),
}

/// A parsed, validated field path
///
/// Keeps the original spelling for display and serialization; projection and
/// shape introspection work off the parsed segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Parse a path string
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The string or any dotted segment is empty
    /// - A bracketed index is malformed (`a[`, `a[x]`, `a[0]b`)
    pub fn parse(s: &str) -> Result<Self, PathError> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for piece in s.split('.') {
            parse_piece(piece, &mut segments)?;
        }

        Ok(Self {
            raw: s.to_string(),
            segments,
        })
    }

    /// Returns the parsed segments
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the original path string
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the number of segments
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

/// Parse one dot-separated piece into segments
///
/// A piece is either a bare decimal index, or a member name followed by any
/// number of `[n]` index groups (the name may be empty when the piece starts
/// with a bracket, as in `[0].name`).
fn parse_piece(piece: &str, segments: &mut Vec<Segment>) -> Result<(), PathError> {
    if piece.is_empty() {
        return Err(PathError::EmptySegment);
    }

    // Bare numeric segment descends into a sequence element
    if piece.bytes().all(|b| b.is_ascii_digit()) {
        let index = piece
            .parse()
            .map_err(|_| PathError::InvalidIndex(piece.to_string()))?;
        segments.push(Segment::Index(index));
        return Ok(());
    }

    let (name, mut rest) = match piece.find('[') {
        Some(pos) => (&piece[..pos], &piece[pos..]),
        None => (piece, ""),
    };

    if !name.is_empty() {
        segments.push(Segment::Name(name.to_string()));
    }

    while !rest.is_empty() {
        let close = rest
            .find(']')
            .ok_or_else(|| PathError::UnclosedIndex(piece.to_string()))?;
        let digits = &rest[1..close];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PathError::InvalidIndex(digits.to_string()));
        }
        let index = digits
            .parse()
            .map_err(|_| PathError::InvalidIndex(digits.to_string()))?;
        segments.push(Segment::Index(index));

        rest = &rest[close + 1..];
        if !rest.is_empty() && !rest.starts_with('[') {
            return Err(PathError::InvalidIndex(rest.to_string()));
        }
    }

    Ok(())
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(D::Error::custom)
    }
}
