/*!
Bopomofo syllable codec - `libzhuyin/src/codec.rs`

Packs one Bopomofo syllable into a 16-bit unit, following the libtabe /
ETen layout:

| role    | symbols          | count | bits | shift |
|---------|------------------|-------|------|-------|
| initial | U+3105..=U+3119  | 21    | 6    | 9     |
| medial  | U+3127..=U+3129  | 3     | 2    | 7     |
| final   | U+311A..=U+3126  | 13    | 4    | 3     |
| tone    | ` ` `ˊ` `ˇ` `ˋ` `ˉ` | 5  | 3    | 0     |

Each role value is the symbol's offset from the code point just before its
range, so 0 always means "role absent". Units produced here therefore never
exceed 0x7FFF and are valid UTF-16 code units.

A syllable ends when a symbol arrives whose role is already filled, or that
cannot follow what is there (a medial after a tone, a final after a tone).
Initials never share a unit with anything typed before them.
*/

use phf::phf_map;
use zhuyin_core::{CodecError, EncodedKey, EncodedUnit, Syllable, SyllableCodec};

pub const INITIAL_PAD: u32 = 0x3104;
pub const MEDIAL_PAD: u32 = 0x3126;
pub const FINAL_PAD: u32 = 0x3119;

const INITIAL_SHIFT: u16 = 9;
const MEDIAL_SHIFT: u16 = 7;
const FINAL_SHIFT: u16 = 3;

const INITIAL_MASK: u16 = 0x7e00;
const MEDIAL_MASK: u16 = 0x0180;
const FINAL_MASK: u16 = 0x0078;
const TONE_MASK: u16 = 0x0007;

/// Tone marks and their 3-bit values. The first tone is typed as a space.
static TONE_MARKS: phf::Map<char, u16> = phf_map! {
    ' ' => 1,
    'ˊ' => 2,
    'ˇ' => 3,
    'ˋ' => 4,
    'ˉ' => 5,
};

/// Tone mark for each value, indexed by `value - 1`.
const TONE_SYMBOLS: [char; 5] = [' ', 'ˊ', 'ˇ', 'ˋ', 'ˉ'];

/// The slot a symbol occupies inside a syllable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolRole {
    Initial,
    Medial,
    Final,
    Tone,
}

/// Role of `symbol` together with its role value, or `None` when it is not
/// a Bopomofo symbol.
pub fn classify(symbol: char) -> Option<(SymbolRole, u16)> {
    let cp = symbol as u32;
    match cp {
        0x3105..=0x3119 => Some((SymbolRole::Initial, (cp - INITIAL_PAD) as u16)),
        0x3127..=0x3129 => Some((SymbolRole::Medial, (cp - MEDIAL_PAD) as u16)),
        0x311a..=0x3126 => Some((SymbolRole::Final, (cp - FINAL_PAD) as u16)),
        _ => TONE_MARKS.get(&symbol).map(|&v| (SymbolRole::Tone, v)),
    }
}

/// Unit being assembled plus the raw symbols that went into it.
#[derive(Debug, Default)]
struct Working {
    unit: EncodedUnit,
    raw: String,
    initial: bool,
    medial: bool,
    fin: bool,
    tone: bool,
}

impl Working {
    fn is_blank(&self) -> bool {
        !(self.initial || self.medial || self.fin || self.tone)
    }

    /// Whether `role` has to start a new syllable.
    fn must_flush_before(&self, role: SymbolRole) -> bool {
        match role {
            SymbolRole::Initial => !self.is_blank(),
            SymbolRole::Medial => self.medial || self.tone,
            SymbolRole::Final => self.fin || self.tone,
            SymbolRole::Tone => self.tone,
        }
    }

    fn take(&mut self) -> Syllable {
        let done = std::mem::take(self);
        Syllable::new(done.raw, done.unit)
    }

    fn accept(&mut self, symbol: char, role: SymbolRole, value: u16) {
        match role {
            SymbolRole::Initial => {
                self.initial = true;
                self.unit |= value << INITIAL_SHIFT;
            }
            SymbolRole::Medial => {
                self.medial = true;
                self.unit |= value << MEDIAL_SHIFT;
            }
            SymbolRole::Final => {
                self.fin = true;
                self.unit |= value << FINAL_SHIFT;
            }
            SymbolRole::Tone => {
                self.tone = true;
                self.unit |= value;
            }
        }
        self.raw.push(symbol);
    }
}

/// Codec for standard Bopomofo spelling.
#[derive(Debug, Clone, Copy, Default)]
pub struct BopomofoCodec;

impl BopomofoCodec {
    pub fn new() -> Self {
        Self
    }

    /// Symbols of one unit in initial, medial, final, tone order.
    pub fn decode_unit(unit: EncodedUnit) -> String {
        let mut out = String::with_capacity(12);
        let initial = u32::from((unit & INITIAL_MASK) >> INITIAL_SHIFT);
        let medial = u32::from((unit & MEDIAL_MASK) >> MEDIAL_SHIFT);
        let fin = u32::from((unit & FINAL_MASK) >> FINAL_SHIFT);
        let tone = usize::from(unit & TONE_MASK);

        for (value, pad) in [(initial, INITIAL_PAD), (medial, MEDIAL_PAD), (fin, FINAL_PAD)] {
            if value != 0 {
                if let Some(ch) = char::from_u32(pad + value) {
                    out.push(ch);
                }
            }
        }
        // Values 6 and 7 have no symbol.
        if let Some(&mark) = tone.checked_sub(1).and_then(|i| TONE_SYMBOLS.get(i)) {
            out.push(mark);
        }
        out
    }
}

impl SyllableCodec for BopomofoCodec {
    fn split(&self, input: &str) -> Result<Vec<Syllable>, CodecError> {
        let mut out = Vec::new();
        let mut working = Working::default();

        for (index, symbol) in input.chars().enumerate() {
            let (role, value) =
                classify(symbol).ok_or(CodecError::InvalidSymbol { index, symbol })?;
            if working.must_flush_before(role) {
                out.push(working.take());
            }
            working.accept(symbol, role, value);
        }
        if !working.is_blank() {
            out.push(working.take());
        }
        Ok(out)
    }

    fn decode(&self, key: &EncodedKey) -> String {
        key.units().iter().map(|&u| Self::decode_unit(u)).collect()
    }
}
