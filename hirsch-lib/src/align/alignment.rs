use std::{collections::BTreeSet, fmt};

use serde::Serialize;

/// The gap glyph inserted into the output sequences.
pub const GAP: u8 = b'_';

/// The number of symbols per line when rendering an alignment.
pub const LINE_WIDTH: usize = 50;

/// A completed global alignment: the two gapped output sequences plus the
/// total alignment score.
///
/// Both gapped sequences have the same length, and stripping the gap glyphs
/// from either reproduces the corresponding input sequence unchanged.
#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize)]
pub struct Alignment {
    /// The first input sequence with gaps inserted.
    pub seq1_aligned: Vec<u8>,

    /// The second input sequence with gaps inserted.
    pub seq2_aligned: Vec<u8>,

    /// Global alignment score.
    pub score: i32,
}

impl Alignment {
    /// The common length of the two gapped output sequences.
    pub fn padded_len(&self) -> usize {
        self.seq1_aligned.len()
    }

    /// The first input sequence, recovered by stripping gap glyphs.
    pub fn seq1(&self) -> Vec<u8> {
        strip_gaps(&self.seq1_aligned)
    }

    /// The second input sequence, recovered by stripping gap glyphs.
    pub fn seq2(&self) -> Vec<u8> {
        strip_gaps(&self.seq2_aligned)
    }

    // Validate that the two gapped sequences are consistent with each other.
    pub fn validate(&self) {
        assert_eq!(self.seq1_aligned.len(), self.seq2_aligned.len());
    }
}

/// Removes all gap glyphs from a gapped sequence.
pub fn strip_gaps(aligned: &[u8]) -> Vec<u8> {
    aligned.iter().copied().filter(|&symbol| symbol != GAP).collect()
}

/// Builds the two gapped output sequences from the completed anchor set.
///
/// Anchors are cells of the conceptual score matrix: `(i, j)` means `i`
/// symbols of `seq2` (rows) and `j` symbols of `seq1` (columns) have been
/// consumed.  Walking the anchors in increasing order, each step emits one
/// output column: the next row symbol if the row coordinate advanced (else a
/// gap), and likewise for the column coordinate.  Material before the first
/// anchor and after the last is emitted as straight gap-padded runs, rows
/// first, with one synthesized diagonal step into the first anchor when both
/// of its coordinates are positive.
pub(crate) fn reconstruct(
    seq1: &[u8],
    seq2: &[u8],
    anchors: &BTreeSet<(usize, usize)>,
) -> (Vec<u8>, Vec<u8>) {
    let mut out1 = Vec::with_capacity(seq1.len() + seq2.len());
    let mut out2 = Vec::with_capacity(seq1.len() + seq2.len());

    let mut iter = anchors.iter().copied();
    let (mut prev_i, mut prev_j) = match iter.next() {
        Some((i0, j0)) => {
            // leading material strictly before the first anchor, as straight
            // rows-then-columns runs, with a diagonal step into the anchor
            // when one fits
            let (rows, cols, diagonal) = if i0 > 0 && j0 > 0 {
                (i0 - 1, j0 - 1, true)
            } else {
                (i0, j0, false)
            };
            for &symbol in &seq2[..rows] {
                out2.push(symbol);
                out1.push(GAP);
            }
            for &symbol in &seq1[..cols] {
                out1.push(symbol);
                out2.push(GAP);
            }
            if diagonal {
                out2.push(seq2[i0 - 1]);
                out1.push(seq1[j0 - 1]);
            }
            (i0, j0)
        }
        None => (0, 0),
    };

    for (i, j) in iter {
        out2.push(if i > prev_i { seq2[i - 1] } else { GAP });
        out1.push(if j > prev_j { seq1[j - 1] } else { GAP });
        prev_i = i;
        prev_j = j;
    }

    // trailing material strictly after the last anchor
    for &symbol in &seq2[prev_i..] {
        out2.push(symbol);
        out1.push(GAP);
    }
    for &symbol in &seq1[prev_j..] {
        out1.push(symbol);
        out2.push(GAP);
    }

    (out1, out2)
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.seq1_aligned.is_empty() {
            writeln!(f, "Seq1: ")?;
            writeln!(f, "Seq2: ")?;
            writeln!(f)?;
        }
        for (chunk1, chunk2) in self
            .seq1_aligned
            .chunks(LINE_WIDTH)
            .zip(self.seq2_aligned.chunks(LINE_WIDTH))
        {
            writeln!(f, "Seq1: {}", String::from_utf8_lossy(chunk1))?;
            writeln!(f, "Seq2: {}", String::from_utf8_lossy(chunk2))?;
            writeln!(f)?;
        }
        write!(f, "Score: {}", self.score)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rstest::rstest;

    use super::{reconstruct, strip_gaps, Alignment};

    fn anchors(cells: &[(usize, usize)]) -> BTreeSet<(usize, usize)> {
        cells.iter().copied().collect()
    }

    #[rstest]
    // a complete staircase: A_C / AGC
    #[case(b"AC".as_slice(), b"AGC".as_slice(), &[(0, 0), (1, 1), (2, 1), (3, 2)], "A_C", "AGC")]
    // a lone interior anchor exercises the lead synthesis paths
    #[case(b"AC".as_slice(), b"AG".as_slice(), &[(2, 2)], "_AC", "A_G")]
    // an anchor on the column boundary pads the remaining columns after it
    #[case(b"AC".as_slice(), b"A".as_slice(), &[(1, 0)], "_AC", "A__")]
    // no anchors at all: straight rows-then-columns runs
    #[case(b"AC".as_slice(), b"G".as_slice(), &[], "_AC", "G__")]
    #[case(b"".as_slice(), b"".as_slice(), &[], "", "")]
    fn test_reconstruct(
        #[case] seq1: &[u8],
        #[case] seq2: &[u8],
        #[case] cells: &[(usize, usize)],
        #[case] expected1: &str,
        #[case] expected2: &str,
    ) {
        let (out1, out2) = reconstruct(seq1, seq2, &anchors(cells));
        assert_eq!(out1, expected1.as_bytes());
        assert_eq!(out2, expected2.as_bytes());
        // the binding invariants: equal lengths and gap-strip round-trip
        assert_eq!(out1.len(), out2.len());
        assert_eq!(strip_gaps(&out1), seq1);
        assert_eq!(strip_gaps(&out2), seq2);
    }

    #[test]
    fn test_strip_gaps() {
        assert_eq!(strip_gaps(b"A_C_"), b"AC".to_vec());
        assert_eq!(strip_gaps(b"____"), Vec::<u8>::new());
        assert_eq!(strip_gaps(b""), Vec::<u8>::new());
    }

    #[test]
    fn test_display_single_block() {
        let alignment = Alignment {
            seq1_aligned: b"A_C".to_vec(),
            seq2_aligned: b"AGC".to_vec(),
            score: 0,
        };
        assert_eq!(alignment.to_string(), "Seq1: A_C\nSeq2: AGC\n\nScore: 0");
    }

    #[test]
    fn test_display_wraps_at_fifty_symbols() {
        let alignment = Alignment {
            seq1_aligned: vec![b'A'; 60],
            seq2_aligned: vec![b'A'; 60],
            score: 60,
        };
        let expected = format!(
            "Seq1: {0}\nSeq2: {0}\n\nSeq1: {1}\nSeq2: {1}\n\nScore: 60",
            "A".repeat(50),
            "A".repeat(10),
        );
        assert_eq!(alignment.to_string(), expected);
    }

    #[test]
    fn test_display_empty_alignment() {
        let alignment = Alignment::default();
        assert_eq!(alignment.to_string(), "Seq1: \nSeq2: \n\nScore: 0");
    }
}
