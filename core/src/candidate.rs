//! Candidate types for phonetic text conversion.
//!
//! A `Candidate` is one (text, weight) pair. For dictionary entries the weight
//! is also the number of syllables the text covers, which is what
//! `CompositionController::confirm_selection` consumes from the buffer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single text candidate with its weight.
///
/// Serialized as the two-element tuple `[text, weight]`, which is the shape
/// dictionary data files use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, u32)", into = "(String, u32)")]
pub struct Candidate {
    pub text: String,
    pub weight: u32,
}

/// An ordered candidate sequence. Order is storage order unless the
/// segmentation engine synthesizes an entry in front.
pub type CandidateList = Vec<Candidate>;

impl Candidate {
    pub fn new<T: Into<String>>(text: T, weight: u32) -> Self {
        Candidate {
            text: text.into(),
            weight,
        }
    }

    /// Number of syllables this candidate stands for when confirmed.
    pub fn syllable_count(&self) -> usize {
        self.weight as usize
    }
}

impl From<(String, u32)> for Candidate {
    fn from((text, weight): (String, u32)) -> Self {
        Candidate { text, weight }
    }
}

impl From<Candidate> for (String, u32) {
    fn from(c: Candidate) -> Self {
        (c.text, c.weight)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.text, self.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_shape() {
        let c = Candidate::new("台北", 2);
        let bytes = bincode::serialize(&c).unwrap();
        let pair: (String, u32) = bincode::deserialize(&bytes).unwrap();
        assert_eq!(pair, ("台北".to_string(), 2));
    }

    #[test]
    fn test_display() {
        assert_eq!(Candidate::new("台", 1).to_string(), "台(1)");
    }
}
