//! Personality axes and the four-letter type code assembled from them.
//!
//! Each axis is decided by an independent binary classifier. The mapping
//! from raw classifier output to letter is fixed by how the heads were
//! trained and must never be inferred or inverted:
//!
//! | Axis | output = 1 | output = 0 |
//! |------|-----------|-----------|
//! | IE   | I         | E         |
//! | NS   | N         | S         |
//! | TF   | T         | F         |
//! | JP   | J         | P         |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the four personality dimensions, in type-code order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    IE,
    NS,
    TF,
    JP,
}

impl Axis {
    /// All axes in the order their letters appear in a type code.
    pub const ALL: [Axis; 4] = [Axis::IE, Axis::NS, Axis::TF, Axis::JP];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IE => "IE",
            Self::NS => "NS",
            Self::TF => "TF",
            Self::JP => "JP",
        }
    }

    /// Position of this axis within a type code.
    pub fn index(&self) -> usize {
        match self {
            Self::IE => 0,
            Self::NS => 1,
            Self::TF => 2,
            Self::JP => 3,
        }
    }

    /// `(letter for output 1, letter for output 0)`.
    pub fn poles(&self) -> (char, char) {
        match self {
            Self::IE => ('I', 'E'),
            Self::NS => ('N', 'S'),
            Self::TF => ('T', 'F'),
            Self::JP => ('J', 'P'),
        }
    }

    /// Resolve a raw classifier output to this axis's letter.
    ///
    /// `output` is `true` when the classifier predicted label 1.
    pub fn letter(&self, output: bool) -> char {
        let (one, zero) = self.poles();
        if output { one } else { zero }
    }

    /// Inverse of [`Axis::letter`]: which raw output produces `letter`.
    fn output_for(&self, letter: char) -> Option<bool> {
        let (one, zero) = self.poles();
        match letter.to_ascii_uppercase() {
            c if c == one => Some(true),
            c if c == zero => Some(false),
            _ => None,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = TypeCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IE" => Ok(Self::IE),
            "NS" => Ok(Self::NS),
            "TF" => Ok(Self::TF),
            "JP" => Ok(Self::JP),
            _ => Err(TypeCodeError::UnknownAxis(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeCodeError {
    #[error("type code must be 4 letters, got {0:?}")]
    Length(String),

    #[error("letter {letter:?} is not valid for axis {axis} in {code:?}")]
    Letter {
        code: String,
        axis: Axis,
        letter: char,
    },

    #[error("unknown axis {0:?}")]
    UnknownAxis(String),
}

/// A four-letter personality type, always one of the 16 valid codes.
///
/// Stored as the raw outputs of the four heads in [`Axis::ALL`] order, so an
/// invalid letter combination cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeCode {
    outputs: [bool; 4],
}

impl TypeCode {
    /// Build from raw head outputs in [`Axis::ALL`] order.
    pub fn from_outputs(outputs: [bool; 4]) -> Self {
        Self { outputs }
    }

    /// Raw output of the head for `axis`.
    pub fn output(&self, axis: Axis) -> bool {
        self.outputs[axis.index()]
    }

    /// Resolved letter for `axis`.
    pub fn letter(&self, axis: Axis) -> char {
        axis.letter(self.output(axis))
    }

    /// All 16 valid codes.
    pub fn all() -> impl Iterator<Item = TypeCode> {
        (0u8..16).map(|bits| {
            Self::from_outputs([bits & 8 != 0, bits & 4 != 0, bits & 2 != 0, bits & 1 != 0])
        })
    }

    /// Static description for this code, or the fallback.
    pub fn description(&self) -> &'static str {
        crate::describe(&self.to_string())
    }
}

/// Concatenate the resolved poles of the four heads in fixed axis order.
pub fn assemble(ie: bool, ns: bool, tf: bool, jp: bool) -> TypeCode {
    TypeCode::from_outputs([ie, ns, tf, jp])
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for axis in Axis::ALL {
            write!(f, "{}", self.letter(axis))?;
        }
        Ok(())
    }
}

impl FromStr for TypeCode {
    type Err = TypeCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let letters: Vec<char> = s.trim().chars().collect();
        if letters.len() != 4 {
            return Err(TypeCodeError::Length(s.to_string()));
        }

        let mut outputs = [false; 4];
        for (axis, letter) in Axis::ALL.into_iter().zip(letters) {
            outputs[axis.index()] = axis.output_for(letter).ok_or_else(|| TypeCodeError::Letter {
                code: s.to_string(),
                axis,
                letter,
            })?;
        }
        Ok(Self::from_outputs(outputs))
    }
}

impl TryFrom<String> for TypeCode {
    type Error = TypeCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeCode> for String {
    fn from(code: TypeCode) -> Self {
        code.to_string()
    }
}
