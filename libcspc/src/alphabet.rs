use phf::phf_map;
use serde::{Deserialize, Serialize};

pub const UTF8_SPACE: u8 = 32;
pub const UTF8_DASH: u8 = 45;
pub const UTF8_DOT: u8 = 46;
pub const UTF8_TILDE: u8 = 126;

pub const AMINO_ALPHABET: [&str; 20] = [
    "A", "C", "D", "E", "F", "G", "H", "I", "K", "L", "M", "N", "P", "Q", "R", "S", "T", "V", "W",
    "Y",
];

pub const DNA_ALPHABET: [&str; 4] = ["A", "C", "G", "T"];

pub const AMINO_SIZE: u8 = 20;
pub const DNA_SIZE: u8 = 4;

/// maps from \<UTF8 byte\> -> \<digital amino acid\>
///
/// Residues occupy [0..20), the degenerate characters all
/// collapse onto ANY (20) and the gap characters onto GAP (21)
pub const UTF8_TO_DIGITAL_AMINO: phf::Map<u8, u8> = phf_map! {
    // upper case
    65u8 => 0,    // A
    67u8 => 1,    // C
    68u8 => 2,    // D
    69u8 => 3,    // E
    70u8 => 4,    // F
    71u8 => 5,    // G
    72u8 => 6,    // H
    73u8 => 7,    // I
    75u8 => 8,    // K
    76u8 => 9,    // L
    77u8 => 10,   // M
    78u8 => 11,   // N
    80u8 => 12,   // P
    81u8 => 13,   // Q
    82u8 => 14,   // R
    83u8 => 15,   // S
    84u8 => 16,   // T
    86u8 => 17,   // V
    87u8 => 18,   // W
    89u8 => 19,   // Y
    // lower case
    97u8 => 0,    // a
    99u8 => 1,    // c
    100u8 => 2,   // d
    101u8 => 3,   // e
    102u8 => 4,   // f
    103u8 => 5,   // g
    104u8 => 6,   // h
    105u8 => 7,   // i
    107u8 => 8,   // k
    108u8 => 9,   // l
    109u8 => 10,  // m
    110u8 => 11,  // n
    112u8 => 12,  // p
    113u8 => 13,  // q
    114u8 => 14,  // r
    115u8 => 15,  // s
    116u8 => 16,  // t
    118u8 => 17,  // v
    119u8 => 18,  // w
    121u8 => 19,  // y
    // degenerate characters
    88u8 => 20,   // X
    79u8 => 20,   // O
    85u8 => 20,   // U
    66u8 => 20,   // B
    90u8 => 20,   // Z
    74u8 => 20,   // J
    120u8 => 20,  // x
    111u8 => 20,  // o
    117u8 => 20,  // u
    98u8 => 20,   // b
    122u8 => 20,  // z
    106u8 => 20,  // j
    // gaps
    45u8 => 21,   // -
    46u8 => 21,   // .
};

pub const AMINO_INVERSE_MAP: phf::Map<u8, u8> = phf_map! {
    0u8  => 65,   // A
    1u8  => 67,   // C
    2u8  => 68,   // D
    3u8  => 69,   // E
    4u8  => 70,   // F
    5u8  => 71,   // G
    6u8  => 72,   // H
    7u8  => 73,   // I
    8u8  => 75,   // K
    9u8  => 76,   // L
    10u8 => 77,   // M
    11u8 => 78,   // N
    12u8 => 80,   // P
    13u8 => 81,   // Q
    14u8 => 82,   // R
    15u8 => 83,   // S
    16u8 => 84,   // T
    17u8 => 86,   // V
    18u8 => 87,   // W
    19u8 => 89,   // Y
    // reserved
    20u8 => 88,   // X
    21u8 => 45,   // -
    22u8 => 126,  // ~
};

/// maps from \<UTF8 byte\> -> \<digital nucleotide\>
pub const UTF8_TO_DIGITAL_DNA: phf::Map<u8, u8> = phf_map! {
    65u8 => 0,    // A
    67u8 => 1,    // C
    71u8 => 2,    // G
    84u8 => 3,    // T
    85u8 => 3,    // U
    97u8 => 0,    // a
    99u8 => 1,    // c
    103u8 => 2,   // g
    116u8 => 3,   // t
    117u8 => 3,   // u
    // IUPAC ambiguity codes
    78u8 => 4,    // N
    82u8 => 4,    // R
    89u8 => 4,    // Y
    75u8 => 4,    // K
    77u8 => 4,    // M
    83u8 => 4,    // S
    87u8 => 4,    // W
    66u8 => 4,    // B
    68u8 => 4,    // D
    72u8 => 4,    // H
    86u8 => 4,    // V
    110u8 => 4,   // n
    114u8 => 4,   // r
    121u8 => 4,   // y
    107u8 => 4,   // k
    109u8 => 4,   // m
    115u8 => 4,   // s
    119u8 => 4,   // w
    98u8 => 4,    // b
    100u8 => 4,   // d
    104u8 => 4,   // h
    118u8 => 4,   // v
    // gaps
    45u8 => 5,    // -
    46u8 => 5,    // .
};

pub const DNA_INVERSE_MAP: phf::Map<u8, u8> = phf_map! {
    0u8 => 65,    // A
    1u8 => 67,    // C
    2u8 => 71,    // G
    3u8 => 84,    // T
    // reserved
    4u8 => 78,    // N
    5u8 => 45,    // -
    6u8 => 126,   // ~
};

/// The residue alphabet of a sequence, profile, or context library.
///
/// Digital residues live in [0..size). The three indices directly
/// after the residues are reserved for ANY, GAP, and ENDGAP.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alphabet {
    #[default]
    Amino,
    Dna,
}

impl Alphabet {
    /// The number of real residues (K), excluding the reserved symbols.
    pub fn size(&self) -> usize {
        match self {
            Alphabet::Amino => AMINO_SIZE as usize,
            Alphabet::Dna => DNA_SIZE as usize,
        }
    }

    pub fn any(&self) -> u8 {
        self.size() as u8
    }

    pub fn gap(&self) -> u8 {
        self.size() as u8 + 1
    }

    pub fn endgap(&self) -> u8 {
        self.size() as u8 + 2
    }

    /// Returns true if the digital byte is a real residue (i.e. less than ANY).
    pub fn is_residue(&self, digital_byte: u8) -> bool {
        (digital_byte as usize) < self.size()
    }

    pub fn ctoi(&self, utf8_byte: u8) -> Option<u8> {
        match self {
            Alphabet::Amino => UTF8_TO_DIGITAL_AMINO.get(&utf8_byte).copied(),
            Alphabet::Dna => UTF8_TO_DIGITAL_DNA.get(&utf8_byte).copied(),
        }
    }

    pub fn itoc(&self, digital_byte: u8) -> Option<u8> {
        match self {
            Alphabet::Amino => AMINO_INVERSE_MAP.get(&digital_byte).copied(),
            Alphabet::Dna => DNA_INVERSE_MAP.get(&digital_byte).copied(),
        }
    }

    pub fn letters(&self) -> &'static [&'static str] {
        match self {
            Alphabet::Amino => &AMINO_ALPHABET,
            Alphabet::Dna => &DNA_ALPHABET,
        }
    }
}

impl std::fmt::Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alphabet::Amino => write!(f, "amino"),
            Alphabet::Dna => write!(f, "dna"),
        }
    }
}
