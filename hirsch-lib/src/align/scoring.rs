use anyhow::{anyhow, Error};
use bio::scores::blosum62::blosum62;
use std::{fmt::Display, str::FromStr};

use crate::util::dna::{is_iupac_base, iupac_index};

/// The pluggable cost model parameterizing an alignment.
///
/// Both cost operations are pure functions of their inputs and are called once
/// per matrix cell, so implementations must be cheap.  `pair_cost` is only
/// defined over symbols for which `supports` returns true; the aligner
/// validates its inputs against `supports` before any scoring work.
pub trait ScoringScheme {
    /// The cost of one inserted gap column.  Typically negative.
    fn gap_cost(&self) -> i32;

    /// The cost of aligning symbol `a` against symbol `b`.
    fn pair_cost(&self, a: u8, b: u8) -> i32;

    /// Returns true if the scheme can price the given symbol.
    fn supports(&self, symbol: u8) -> bool;
}

/// Uniform match/mismatch scoring over any symbol alphabet.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SimpleScheme {
    match_score: i32,
    mismatch_score: i32,
    gap_cost: i32,
}

impl SimpleScheme {
    /// Create a new `SimpleScheme` with the given match, mismatch, and gap costs.
    ///
    /// # Arguments
    ///
    /// * `match_score` - the score for aligning two equal symbols
    /// * `mismatch_score` - the score for aligning two unequal symbols
    /// * `gap_cost` - the score for one gap column (should not be positive)
    pub fn new(match_score: i32, mismatch_score: i32, gap_cost: i32) -> Self {
        assert!(gap_cost <= 0, "gap_cost can't be positive");
        Self { match_score, mismatch_score, gap_cost }
    }
}

impl Default for SimpleScheme {
    fn default() -> Self {
        Self::new(1, -1, -2)
    }
}

impl ScoringScheme for SimpleScheme {
    fn gap_cost(&self) -> i32 {
        self.gap_cost
    }

    fn pair_cost(&self, a: u8, b: u8) -> i32 {
        if a == b {
            self.match_score
        } else {
            self.mismatch_score
        }
    }

    fn supports(&self, _symbol: u8) -> bool {
        true
    }
}

/// The EDNAFULL (NUC.4.4) substitution table over the IUPAC DNA alphabet.
/// Rows and columns follow `IUPAC_BASES` order (`ATGCSWRYKMBVHDN`).
#[rustfmt::skip]
const EDNAFULL: [[i32; 15]; 15] = [
    //  A   T   G   C   S   W   R   Y   K   M   B   V   H   D   N
    [   5, -4, -4, -4, -4,  1,  1, -4, -4,  1, -4, -1, -1, -1, -2], // A
    [  -4,  5, -4, -4, -4,  1, -4,  1,  1, -4, -1, -4, -1, -1, -2], // T
    [  -4, -4,  5, -4,  1, -4,  1, -4,  1, -4, -1, -1, -4, -1, -2], // G
    [  -4, -4, -4,  5,  1, -4, -4,  1, -4,  1, -1, -1, -1, -4, -2], // C
    [  -4, -4,  1,  1, -1, -4, -2, -2, -2, -2, -1, -1, -3, -3, -1], // S
    [   1,  1, -4, -4, -4, -1, -2, -2, -2, -2, -3, -3, -1, -1, -1], // W
    [   1, -4,  1, -4, -2, -2, -1, -4, -2, -2, -3, -1, -3, -1, -1], // R
    [  -4,  1, -4,  1, -2, -2, -4, -1, -2, -2, -1, -3, -1, -3, -1], // Y
    [  -4,  1,  1, -4, -2, -2, -2, -2, -1, -4, -1, -3, -3, -1, -1], // K
    [   1, -4, -4,  1, -2, -2, -2, -2, -4, -1, -3, -1, -1, -3, -1], // M
    [  -4, -1, -1, -1, -1, -3, -3, -1, -1, -3, -1, -2, -2, -2, -1], // B
    [  -1, -4, -1, -1, -1, -3, -1, -3, -3, -1, -2, -1, -2, -2, -1], // V
    [  -1, -1, -4, -1, -3, -1, -3, -1, -3, -1, -2, -2, -1, -2, -1], // H
    [  -1, -1, -1, -4, -3, -1, -1, -3, -1, -3, -2, -2, -2, -1, -1], // D
    [  -2, -2, -2, -2, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1], // N
];

/// Nucleotide scoring using the EDNAFULL substitution table over the full
/// IUPAC alphabet, with a configurable gap cost.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct DnaFull {
    gap_cost: i32,
}

impl DnaFull {
    /// Create a new `DnaFull` scheme with the given gap cost (should not be
    /// positive).
    pub fn new(gap_cost: i32) -> Self {
        assert!(gap_cost <= 0, "gap_cost can't be positive");
        Self { gap_cost }
    }
}

impl Default for DnaFull {
    fn default() -> Self {
        Self::new(-5)
    }
}

impl ScoringScheme for DnaFull {
    fn gap_cost(&self) -> i32 {
        self.gap_cost
    }

    fn pair_cost(&self, a: u8, b: u8) -> i32 {
        match (iupac_index(a), iupac_index(b)) {
            (Some(i), Some(j)) => EDNAFULL[i][j],
            _ => panic!(
                "symbol pair ({}, {}) is not in the IUPAC DNA alphabet",
                a as char, b as char
            ),
        }
    }

    fn supports(&self, symbol: u8) -> bool {
        is_iupac_base(symbol)
    }
}

/// The amino acids (plus ambiguity codes and the stop symbol) priced by the
/// BLOSUM62 substitution table.
const BLOSUM62_SYMBOLS: &[u8] = b"ABCDEFGHIKLMNPQRSTVWXYZ*";

/// Protein scoring using the BLOSUM62 substitution table, with a configurable
/// gap cost.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Blosum62 {
    gap_cost: i32,
}

impl Blosum62 {
    /// Create a new `Blosum62` scheme with the given gap cost (should not be
    /// positive).
    pub fn new(gap_cost: i32) -> Self {
        assert!(gap_cost <= 0, "gap_cost can't be positive");
        Self { gap_cost }
    }
}

impl Default for Blosum62 {
    fn default() -> Self {
        Self::new(-5)
    }
}

impl ScoringScheme for Blosum62 {
    fn gap_cost(&self) -> i32 {
        self.gap_cost
    }

    fn pair_cost(&self, a: u8, b: u8) -> i32 {
        blosum62(a.to_ascii_uppercase(), b.to_ascii_uppercase())
    }

    fn supports(&self, symbol: u8) -> bool {
        BLOSUM62_SYMBOLS.contains(&symbol.to_ascii_uppercase())
    }
}

/// The scoring scheme variants selectable by name.
#[derive(Default, Debug, PartialEq, Eq, Copy, Clone)]
pub enum SchemeKind {
    /// Uniform match/mismatch costs over any alphabet.
    #[default]
    Simple,
    /// EDNAFULL nucleotide substitution table over the IUPAC alphabet.
    DnaFull,
    /// BLOSUM62 protein substitution table.
    Blosum62,
}

impl Display for SchemeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::DnaFull => write!(f, "dna-full"),
            Self::Blosum62 => write!(f, "blosum62"),
        }
    }
}

impl FromStr for SchemeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simple" | "default" => Ok(SchemeKind::Simple),
            "dna-full" | "dna_full" | "dnafull" | "dna" => Ok(SchemeKind::DnaFull),
            "blosum62" | "blosum" | "protein" => Ok(SchemeKind::Blosum62),
            _ => Err(anyhow!("Invalid scoring scheme: {}", s)),
        }
    }
}
