//! Move sequences and their enumeration
//!
//! A [`Sequence`] is a string of turn symbols handed to the simulator and
//! reused as the stem of the screenshot filename. [`enumerate`] walks every
//! sequence over an [`Alphabet`] for a range of lengths, shortest first,
//! each length in the lexicographic order induced by the alphabet.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Default turn symbols: left, right, u-turn, no turn
pub const DEFAULT_SYMBOLS: [char; 4] = ['L', 'R', 'U', 'N'];

/// Ordered set of distinct symbols sequences are built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<char>", into = "Vec<char>")]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    /// Build an alphabet, rejecting empty or duplicated symbol lists.
    pub fn new(symbols: Vec<char>) -> Result<Self, String> {
        if symbols.is_empty() {
            return Err("alphabet must contain at least one symbol".to_string());
        }
        for (i, c) in symbols.iter().enumerate() {
            if symbols[..i].contains(c) {
                return Err(format!("alphabet contains '{}' more than once", c));
            }
            if c.is_whitespace() || c.is_control() {
                return Err(format!("alphabet symbol {:?} is not printable", c));
            }
            if *c == '/' || *c == '\\' {
                return Err(format!("alphabet symbol '{}' cannot appear in a filename", c));
            }
        }
        Ok(Self { symbols })
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, c: char) -> bool {
        self.symbols.contains(&c)
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.to_vec(),
        }
    }
}

impl TryFrom<Vec<char>> for Alphabet {
    type Error = String;

    fn try_from(symbols: Vec<char>) -> Result<Self, Self::Error> {
        Self::new(symbols)
    }
}

impl From<Alphabet> for Vec<char> {
    fn from(alphabet: Alphabet) -> Self {
        alphabet.symbols
    }
}

impl std::str::FromStr for Alphabet {
    type Err = String;

    /// Parse "LRUN" or "L,R,U,N"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbols: Vec<char> = s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
        Self::new(symbols)
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.symbols {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// One unit of work: one simulation run, one screenshot
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequence(String);

impl Sequence {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build a sequence from text, checking every symbol is in `alphabet`.
    pub fn parse(text: &str, alphabet: &Alphabet) -> Result<Self, String> {
        if text.is_empty() {
            return Err("sequence cannot be empty".to_string());
        }
        if let Some(bad) = text.chars().find(|c| !alphabet.contains(*c)) {
            return Err(format!("'{}' is not in alphabet {}", bad, alphabet));
        }
        Ok(Self(text.to_string()))
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Sequence {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lazy iterator over every sequence for a range of lengths.
///
/// Holds an odometer of symbol indices; the rightmost digit turns fastest,
/// which yields lexicographic order for a fixed length.
#[derive(Debug, Clone)]
pub struct Sequences {
    symbols: Vec<char>,
    max_length: usize,
    digits: Vec<usize>,
    done: bool,
}

impl Sequences {
    fn new(alphabet: &Alphabet, lengths: RangeInclusive<usize>) -> Self {
        let (min, max) = (*lengths.start(), *lengths.end());
        let done = alphabet.is_empty() || min == 0 || min > max;
        Self {
            symbols: alphabet.symbols().to_vec(),
            max_length: max,
            digits: vec![0; min],
            done,
        }
    }

    fn advance(&mut self) {
        let base = self.symbols.len();
        for digit in self.digits.iter_mut().rev() {
            *digit += 1;
            if *digit < base {
                return;
            }
            *digit = 0;
        }
        // Every digit rolled over: move on to the next length
        if self.digits.len() >= self.max_length {
            self.done = true;
        } else {
            self.digits = vec![0; self.digits.len() + 1];
        }
    }
}

impl Iterator for Sequences {
    type Item = Sequence;

    fn next(&mut self) -> Option<Sequence> {
        if self.done {
            return None;
        }
        let text: String = self.digits.iter().map(|&i| self.symbols[i]).collect();
        self.advance();
        Some(Sequence(text))
    }
}

/// Every sequence over `alphabet` with length in `min_length..=max_length`.
///
/// Pure: calling it twice with the same inputs yields the same order.
/// A zero or inverted range yields nothing.
pub fn enumerate(alphabet: &Alphabet, min_length: usize, max_length: usize) -> Sequences {
    Sequences::new(alphabet, min_length..=max_length)
}

/// Number of items [`enumerate`] yields, computed without enumerating.
pub fn expected_count(alphabet_size: usize, min_length: usize, max_length: usize) -> u64 {
    if alphabet_size == 0 || min_length == 0 || min_length > max_length {
        return 0;
    }
    (min_length..=max_length)
        .map(|len| (alphabet_size as u64).saturating_pow(len as u32))
        .fold(0u64, |acc, n| acc.saturating_add(n))
}
