// core/src/codec.rs
//
// Encoded dictionary keys and the codec trait phonetic crates implement.

use crate::error::CodecError;
use std::fmt;
use std::ops::Range;

/// One encoded syllable, bit-packed into 16 bits.
pub type EncodedUnit = u16;

/// An ordered sequence of encoded syllables; the dictionary lookup unit.
///
/// Equality is unit-by-unit. The wire form is the concatenation of the units'
/// 16-bit values in syllable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EncodedKey(Vec<EncodedUnit>);

impl EncodedKey {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_units<I: IntoIterator<Item = EncodedUnit>>(units: I) -> Self {
        Self(units.into_iter().collect())
    }

    pub fn units(&self) -> &[EncodedUnit] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, unit: EncodedUnit) {
        self.0.push(unit);
    }

    /// Key of the first `len` syllables (clamped to the key length).
    pub fn prefix(&self, len: usize) -> EncodedKey {
        Self(self.0[..len.min(self.0.len())].to_vec())
    }

    /// Key of the syllables in `range`, clamped to the key length.
    pub fn slice(&self, range: Range<usize>) -> EncodedKey {
        let end = range.end.min(self.0.len());
        let start = range.start.min(end);
        Self(self.0[start..end].to_vec())
    }

    /// Whether `other` occurs in this key as a contiguous run of units.
    /// The empty key is contained in every key.
    pub fn contains(&self, other: &EncodedKey) -> bool {
        if other.is_empty() {
            return true;
        }
        self.0
            .windows(other.len())
            .any(|window| window == other.units())
    }

    /// Big-endian bytes, two per unit.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.iter().flat_map(|unit| unit.to_be_bytes()).collect()
    }

    /// Inverse of `to_bytes`; `None` for an odd byte count.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() % 2 != 0 {
            return None;
        }
        Some(Self(
            bytes
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect(),
        ))
    }

    /// The key as a string of 16-bit code units.
    pub fn to_code_units(&self) -> String {
        String::from_utf16_lossy(&self.0)
    }
}

impl fmt::Display for EncodedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, unit) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:04x}", unit)?;
        }
        Ok(())
    }
}

impl FromIterator<EncodedUnit> for EncodedKey {
    fn from_iter<I: IntoIterator<Item = EncodedUnit>>(iter: I) -> Self {
        Self::from_units(iter)
    }
}

/// One syllable of raw input together with its encoded unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syllable {
    /// The raw symbols exactly as typed.
    pub raw: String,
    pub unit: EncodedUnit,
}

impl Syllable {
    pub fn new<T: Into<String>>(raw: T, unit: EncodedUnit) -> Self {
        Self {
            raw: raw.into(),
            unit,
        }
    }
}

/// Join the raw text of a run of syllables.
pub fn raw_text(syllables: &[Syllable]) -> String {
    syllables.iter().map(|s| s.raw.as_str()).collect()
}

/// Build the key for a run of syllables.
pub fn key_of(syllables: &[Syllable]) -> EncodedKey {
    syllables.iter().map(|s| s.unit).collect()
}

/// Trait that phonetic codecs implement to work with the segmentation engine.
///
/// `split` is the only required tokenization: it cuts raw input into
/// syllables and encodes each. It must fail on the first unrecognized
/// character and never return a partial result.
pub trait SyllableCodec {
    /// Split raw input into encoded syllables.
    fn split(&self, input: &str) -> Result<Vec<Syllable>, CodecError>;

    /// Decode a key back into symbols in canonical role order.
    fn decode(&self, key: &EncodedKey) -> String;

    /// Encode raw input into a key.
    fn encode(&self, input: &str) -> Result<EncodedKey, CodecError> {
        Ok(key_of(&self.split(input)?))
    }
}
