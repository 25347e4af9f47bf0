use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::store::StoreError;

/// Separator used when a pair key is flattened to a string for the save file.
pub const PAIR_SEP: char = '&';

// Chord grammar: root letter, optional accidental, optional minor marker,
// optional extension from {2,3,4,5,6,7,9,11,13}.
// Anchored on both ends — "ABCD" must not match via its "A" prefix.
// e.g., A, Bm, F#, C#7, Bb13
static CHORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<root>[a-gA-G])(?P<rest>[b#]?m?(?:1[13]|[2-79])?)$").unwrap()
});

/// A validated, normalized chord name (root letter upper-cased).
///
/// Only constructible through [`parse_chord`] or pair-key decoding, so a
/// `Chord` in hand is always grammatically valid.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Chord(String);

impl Chord {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate a raw chord name against the grammar.
///
/// The *entire* input must match — a valid chord followed by trailing junk
/// is rejected. On success the root letter is upper-cased and the rest of
/// the token kept as written.
pub fn parse_chord(input: &str) -> Option<Chord> {
    let caps = CHORD_RE.captures(input)?;
    let root = caps.name("root").unwrap().as_str().to_ascii_uppercase();
    let rest = caps.name("rest").unwrap().as_str();
    Some(Chord(format!("{root}{rest}")))
}

/// An unordered pair of two distinct chords, canonicalized so that
/// (A, Bm) and (Bm, A) compare and hash identically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    first: Chord,
    second: Chord,
}

impl PairKey {
    /// Build the canonical key for two distinct chords.
    /// Returns `None` when both chords are the same — a chord is never
    /// practiced against itself.
    pub fn new(a: Chord, b: Chord) -> Option<Self> {
        if a == b {
            return None;
        }
        let (first, second) = if a.as_str() <= b.as_str() { (a, b) } else { (b, a) };
        Some(Self { first, second })
    }

    pub fn first(&self) -> &Chord {
        &self.first
    }

    pub fn second(&self) -> &Chord {
        &self.second
    }

    /// Flatten to the save-file form, e.g. `"A&Bm"`.
    pub fn encode(&self) -> String {
        format!("{}{}{}", self.first, PAIR_SEP, self.second)
    }

    /// Parse a save-file pair string back into a canonical key.
    ///
    /// Anything other than exactly two valid chord names around a single
    /// separator is a hard error — a malformed key means the file is
    /// corrupt, not that the pair should be skipped.
    pub fn decode(s: &str) -> Result<Self, StoreError> {
        let mut parts = s.split(PAIR_SEP);
        let (Some(a), Some(b), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(StoreError::MalformedPair(s.to_string()));
        };
        let a = parse_chord(a).ok_or_else(|| StoreError::MalformedPair(s.to_string()))?;
        let b = parse_chord(b).ok_or_else(|| StoreError::MalformedPair(s.to_string()))?;
        Self::new(a, b).ok_or_else(|| StoreError::MalformedPair(s.to_string()))
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.first, self.second)
    }
}
