use std::collections::BTreeSet;

use anyhow::{bail, Result};

use super::{
    alignment::{reconstruct, Alignment, GAP},
    score_row::score_row,
    scoring::ScoringScheme,
};

/// Linear-space global aligner.
///
/// Computes an optimal global alignment of two sequences with the Hirschberg
/// divide-and-conquer: Needleman-Wunsch score rows locate the cell an optimal
/// path crosses at the midline of the longer sequence, the problem splits at
/// that cell, and the recursion bottoms out in sub-problems thin enough to
/// solve directly.  Peak auxiliary memory is O(n + m); the full O(n * m)
/// score matrix is never materialized.
pub struct Aligner<'a, S: ScoringScheme + ?Sized> {
    scheme: &'a S,
}

impl<'a, S: ScoringScheme + ?Sized> Aligner<'a, S> {
    pub fn new(scheme: &'a S) -> Self {
        Self { scheme }
    }

    /// Aligns `seq1` against `seq2` globally, returning the gapped sequence
    /// pair and the optimal score.
    ///
    /// Fails if either sequence contains a symbol the scoring scheme cannot
    /// price.  Empty and single-symbol sequences are valid.
    pub fn align(&self, seq1: &[u8], seq2: &[u8]) -> Result<Alignment> {
        self.validate(seq1, "seq1")?;
        self.validate(seq2, "seq2")?;

        let mut search = PathSearch::new(self.scheme);
        search.fill_path(seq1, seq2, 0, 0);

        let (seq1_aligned, seq2_aligned) = reconstruct(seq1, seq2, &search.anchors);
        // The score is fixed at the very first midpoint discovery.  If the
        // recursion never reached one (an input shorter than two symbols),
        // price the reconstructed columns directly.
        let score = match search.score {
            Some(score) => score,
            None => column_score(self.scheme, &seq1_aligned, &seq2_aligned),
        };

        Ok(Alignment { seq1_aligned, seq2_aligned, score })
    }

    fn validate(&self, seq: &[u8], label: &str) -> Result<()> {
        for (index, &symbol) in seq.iter().enumerate() {
            if !self.scheme.supports(symbol) {
                bail!(
                    "unsupported symbol '{}' at position {} of {}",
                    symbol as char,
                    index + 1,
                    label
                );
            }
        }
        Ok(())
    }
}

/// Aligns `seq1` against `seq2` globally under the given scoring scheme.
pub fn align<S: ScoringScheme + ?Sized>(seq1: &[u8], seq2: &[u8], scheme: &S) -> Result<Alignment> {
    Aligner::new(scheme).align(seq1, seq2)
}

/// Prices a reconstructed alignment column-by-column: a pair cost where both
/// symbols are present, a gap cost otherwise.
fn column_score<S: ScoringScheme + ?Sized>(scheme: &S, aligned1: &[u8], aligned2: &[u8]) -> i32 {
    aligned1
        .iter()
        .zip(aligned2.iter())
        .map(|(&a, &b)| {
            if a == GAP || b == GAP {
                scheme.gap_cost()
            } else {
                scheme.pair_cost(a, b)
            }
        })
        .sum()
}

/// One in-flight path search: the shared anchor set and the once-captured
/// global score, populated over the whole recursion.
///
/// Anchors are cells of the conceptual (m+1)x(n+1) score matrix: `(i, j)`
/// means `i` row symbols and `j` column symbols consumed.  `seq1` supplies
/// the columns and `seq2` the rows.
struct PathSearch<'a, S: ScoringScheme + ?Sized> {
    scheme: &'a S,
    anchors: BTreeSet<(usize, usize)>,
    score: Option<i32>,
}

impl<'a, S: ScoringScheme + ?Sized> PathSearch<'a, S> {
    fn new(scheme: &'a S) -> Self {
        Self { scheme, anchors: BTreeSet::new(), score: None }
    }

    /// Records the cells of an optimal alignment path for the rectangle
    /// `(x columns) x (y rows)`, whose top-left cell sits at
    /// `(row_offset, col_offset)` in the global matrix.
    ///
    /// Each recursive level inserts the midline crossing cell and recurses on
    /// the two sub-rectangles it induces; rectangles with a side shorter than
    /// two symbols are solved directly.  Adjacent sub-rectangles share their
    /// corner cells, so the union over the whole recursion is a complete
    /// monotone staircase from the rectangle's origin to its far corner.
    fn fill_path(&mut self, x: &[u8], y: &[u8], row_offset: usize, col_offset: usize) {
        if x.len() < 2 || y.len() < 2 {
            self.fill_degenerate(x, y, row_offset, col_offset);
            return;
        }

        // split the longer sequence at its structural midpoint; the midpoint
        // search finds where an optimal path crosses the other sequence
        let (rows, cols) = if x.len() >= y.len() {
            let (split, whole) = self.midpoint(x, y);
            (whole, split)
        } else {
            self.midpoint(y, x)
        };
        self.anchors.insert((row_offset + rows, col_offset + cols));

        self.fill_path(&x[..cols], &y[..rows], row_offset, col_offset);
        self.fill_path(&x[cols..], &y[rows..], row_offset + rows, col_offset + cols);
    }

    /// Hirschberg's midline crossing: returns `(split_consumed,
    /// whole_consumed)`, the cell where an optimal path crosses the split
    /// sequence's midline.  Both inputs must have at least two symbols.
    ///
    /// The split index biases toward the first half when the length is even.
    /// The crossing maximizes `forward[k] + backward[len - k]`; ties prefer
    /// the lowest `k`.  The first invocation across the whole computation
    /// fixes the global alignment score; sub-problem invocations never touch
    /// it again, since their maxima are not the global optimum.
    fn midpoint(&mut self, split: &[u8], whole: &[u8]) -> (usize, usize) {
        let len = split.len();
        let split_index = if len % 2 == 0 { len / 2 - 1 } else { len / 2 };
        let consumed = split_index + 1;

        let forward = score_row(self.scheme, &split[..consumed], whole);
        let rev_suffix: Vec<u8> = split[consumed..].iter().rev().copied().collect();
        let rev_whole: Vec<u8> = whole.iter().rev().copied().collect();
        let backward = score_row(self.scheme, &rev_suffix, &rev_whole);

        let mut best = i32::MIN;
        let mut best_k = 0;
        for (k, &head) in forward.iter().enumerate() {
            let total = head + backward[whole.len() - k];
            if total > best {
                best = total;
                best_k = k;
            }
        }

        if self.score.is_none() {
            self.score = Some(best);
        }
        (consumed, best_k)
    }

    /// Solves a rectangle with a side shorter than two symbols directly,
    /// recording the complete cell run of an optimal path through it.
    fn fill_degenerate(&mut self, x: &[u8], y: &[u8], row_offset: usize, col_offset: usize) {
        let (n, m) = (x.len(), y.len());
        if m == 0 {
            for j in 0..=n {
                self.anchors.insert((row_offset, col_offset + j));
            }
        } else if n == 0 {
            for i in 0..=m {
                self.anchors.insert((row_offset + i, col_offset));
            }
        } else if m == 1 {
            // one row: either its symbol pairs with the best-scoring column,
            // or the whole row rides on a gap
            let gap = self.scheme.gap_cost();
            let mut best = (n as i32 - 1) * gap + self.scheme.pair_cost(x[0], y[0]);
            let mut best_j = 0;
            for (j, &a) in x.iter().enumerate().skip(1) {
                let total = (n as i32 - 1) * gap + self.scheme.pair_cost(a, y[0]);
                if total > best {
                    best = total;
                    best_j = j;
                }
            }
            if (n as i32 + 1) * gap > best {
                for j in 0..=n {
                    self.anchors.insert((row_offset, col_offset + j));
                }
                self.anchors.insert((row_offset + 1, col_offset + n));
            } else {
                for j in 0..=best_j {
                    self.anchors.insert((row_offset, col_offset + j));
                }
                for j in best_j + 1..=n {
                    self.anchors.insert((row_offset + 1, col_offset + j));
                }
            }
        } else {
            // one column: the mirror image of the one-row case
            let gap = self.scheme.gap_cost();
            let mut best = (m as i32 - 1) * gap + self.scheme.pair_cost(x[0], y[0]);
            let mut best_i = 0;
            for (i, &b) in y.iter().enumerate().skip(1) {
                let total = (m as i32 - 1) * gap + self.scheme.pair_cost(x[0], b);
                if total > best {
                    best = total;
                    best_i = i;
                }
            }
            if (m as i32 + 1) * gap > best {
                for i in 0..=m {
                    self.anchors.insert((row_offset + i, col_offset));
                }
                self.anchors.insert((row_offset + m, col_offset + 1));
            } else {
                for i in 0..=best_i {
                    self.anchors.insert((row_offset + i, col_offset));
                }
                for i in best_i + 1..=m {
                    self.anchors.insert((row_offset + i, col_offset + 1));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{align, Aligner, PathSearch};
    use crate::align::{
        alignment::strip_gaps,
        scoring::{Blosum62, DnaFull, ScoringScheme, SimpleScheme},
    };

    /// Reference implementation: the full Needleman-Wunsch score matrix.
    fn full_matrix_score<S: ScoringScheme + ?Sized>(scheme: &S, x: &[u8], y: &[u8]) -> i32 {
        let gap = scheme.gap_cost();
        let mut matrix = vec![vec![0i32; x.len() + 1]; y.len() + 1];
        for (j, cell) in matrix[0].iter_mut().enumerate() {
            *cell = j as i32 * gap;
        }
        for i in 1..=y.len() {
            matrix[i][0] = i as i32 * gap;
            for j in 1..=x.len() {
                let diag = matrix[i - 1][j - 1] + scheme.pair_cost(x[j - 1], y[i - 1]);
                let up = matrix[i - 1][j] + gap;
                let left = matrix[i][j - 1] + gap;
                matrix[i][j] = diag.max(up).max(left);
            }
        }
        matrix[y.len()][x.len()]
    }

    /// Aligns and asserts every binding invariant: the score matches the
    /// full-matrix reference, the outputs have equal length, stripping gaps
    /// round-trips both inputs, and the emitted columns price out to the
    /// reported score.
    fn align_and_check<S: ScoringScheme + ?Sized>(
        scheme: &S,
        seq1: &[u8],
        seq2: &[u8],
    ) -> crate::align::Alignment {
        let alignment = align(seq1, seq2, scheme).unwrap();
        alignment.validate();
        assert_eq!(
            alignment.score,
            full_matrix_score(scheme, seq1, seq2),
            "score mismatch for {:?} vs {:?}",
            String::from_utf8_lossy(seq1),
            String::from_utf8_lossy(seq2),
        );
        assert_eq!(alignment.seq1_aligned.len(), alignment.seq2_aligned.len());
        assert_eq!(strip_gaps(&alignment.seq1_aligned), seq1);
        assert_eq!(strip_gaps(&alignment.seq2_aligned), seq2);
        assert_eq!(
            super::column_score(scheme, &alignment.seq1_aligned, &alignment.seq2_aligned),
            alignment.score,
            "emitted columns do not price out to the reported score",
        );
        alignment
    }

    #[rstest]
    #[case(b"".as_slice(), b"".as_slice())]
    #[case(b"".as_slice(), b"ACGT".as_slice())]
    #[case(b"ACGT".as_slice(), b"".as_slice())]
    #[case(b"A".as_slice(), b"A".as_slice())]
    #[case(b"A".as_slice(), b"G".as_slice())]
    #[case(b"A".as_slice(), b"AG".as_slice())]
    #[case(b"AG".as_slice(), b"A".as_slice())]
    #[case(b"A".as_slice(), b"GGGGGGG".as_slice())]
    #[case(b"AC".as_slice(), b"AGC".as_slice())]
    #[case(b"AGC".as_slice(), b"AC".as_slice())]
    #[case(b"GATTACA".as_slice(), b"GCATGCT".as_slice())]
    #[case(b"GCATGCT".as_slice(), b"GATTACA".as_slice())]
    #[case(b"AGTACGCA".as_slice(), b"TATGC".as_slice())]
    #[case(b"TTTTTTTTTTTTTTTT".as_slice(), b"TT".as_slice())]
    #[case(b"CTGAACGGTCTTAGCGACCGGT".as_slice(), b"CTGAACGGTCTTAGCGACCGGT".as_slice())]
    #[case(
        b"ATGGCGTACGTTAGCCTAGGCTTAACGGATCGATCCGATTACAGGCTTA".as_slice(),
        b"ATGGCTTACGTAGCCTAGGGTTAACGATCGATCCCGATTACAGCTTAGC".as_slice()
    )]
    #[case(
        b"TTGACCGGAATCGATTACAGGCTTAATGGCGTACGTTAGCC".as_slice(),
        b"CCGGAATCGTTACAGGCTAATGGCGTCGTTAGCCAAA".as_slice()
    )]
    fn test_score_matches_full_matrix(#[case] seq1: &[u8], #[case] seq2: &[u8]) {
        align_and_check(&SimpleScheme::default(), seq1, seq2);
    }

    #[rstest]
    #[case(b"GATTACA".as_slice(), b"GCATGCT".as_slice())]
    #[case(b"ACGTRYSWKM".as_slice(), b"ACGTNNNN".as_slice())]
    #[case(b"TTGACCGGAATCGATTACAGG".as_slice(), b"CCGGAATCGTTACAGG".as_slice())]
    fn test_score_matches_full_matrix_dna_full(#[case] seq1: &[u8], #[case] seq2: &[u8]) {
        align_and_check(&DnaFull::default(), seq1, seq2);
    }

    #[rstest]
    #[case(b"HEAGAWGHEE".as_slice(), b"PAWHEAE".as_slice())]
    #[case(b"MKVLAT".as_slice(), b"MKVIAT".as_slice())]
    fn test_score_matches_full_matrix_blosum62(#[case] seq1: &[u8], #[case] seq2: &[u8]) {
        align_and_check(&Blosum62::default(), seq1, seq2);
    }

    /// The worked example: match +1, mismatch -1, gap -2.
    #[test]
    fn test_worked_example() {
        let scheme = SimpleScheme::new(1, -1, -2);
        let alignment = align_and_check(&scheme, b"AC", b"AGC");
        assert_eq!(alignment.score, 0);
        assert_eq!(alignment.seq1_aligned, b"A_C".to_vec());
        assert_eq!(alignment.seq2_aligned, b"AGC".to_vec());
    }

    #[test]
    fn test_empty_against_non_empty_is_all_gaps() {
        let scheme = SimpleScheme::default();
        let alignment = align_and_check(&scheme, b"", b"ACGT");
        assert_eq!(alignment.seq1_aligned, b"____".to_vec());
        assert_eq!(alignment.seq2_aligned, b"ACGT".to_vec());
        assert_eq!(alignment.score, 4 * scheme.gap_cost());
    }

    #[test]
    fn test_identical_sequences_align_without_gaps() {
        let scheme = SimpleScheme::default();
        let seq = b"GATTACAGATTACA";
        let alignment = align_and_check(&scheme, seq, seq);
        assert_eq!(alignment.seq1_aligned, seq.to_vec());
        assert_eq!(alignment.seq2_aligned, seq.to_vec());
        assert_eq!(alignment.score, seq.len() as i32 * scheme.pair_cost(b'A', b'A'));
    }

    #[test]
    fn test_anchors_are_strictly_increasing() {
        let scheme = SimpleScheme::default();
        let mut search = PathSearch::new(&scheme);
        search.fill_path(b"AC", b"AGC", 0, 0);

        let anchors: Vec<_> = search.anchors.iter().copied().collect();
        assert_eq!(anchors, vec![(0, 0), (1, 1), (2, 1), (3, 2)]);
        for pair in anchors.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_score_is_captured_exactly_once() {
        let scheme = SimpleScheme::default();
        let mut search = PathSearch::new(&scheme);
        search.fill_path(b"GATTACA", b"GCATGCT", 0, 0);
        // the captured score is the global optimum, not a sub-problem's
        assert_eq!(
            search.score,
            Some(full_matrix_score(&scheme, b"GATTACA", b"GCATGCT"))
        );
    }

    #[rstest]
    #[case(b"ACGU".as_slice(), b"ACGT".as_slice())] // U is not IUPAC DNA
    #[case(b"ACGT".as_slice(), b"AC-T".as_slice())]
    fn test_unsupported_dna_symbol_is_an_error(#[case] seq1: &[u8], #[case] seq2: &[u8]) {
        let result = Aligner::new(&DnaFull::default()).align(seq1, seq2);
        let message = result.unwrap_err().to_string();
        assert!(message.contains("unsupported symbol"), "{message}");
    }

    #[test]
    fn test_unsupported_protein_symbol_is_an_error() {
        let result = Aligner::new(&Blosum62::default()).align(b"MKJV", b"MKV");
        let message = result.unwrap_err().to_string();
        assert!(message.contains("unsupported symbol"), "{message}");
        assert!(message.contains('J'), "{message}");
    }

    /// Swapping the inputs must not change the optimal score.
    #[rstest]
    #[case(b"AGTACGCA".as_slice(), b"TATGC".as_slice())]
    #[case(b"GATTACA".as_slice(), b"GCATGCT".as_slice())]
    fn test_score_is_symmetric(#[case] seq1: &[u8], #[case] seq2: &[u8]) {
        let scheme = SimpleScheme::default();
        let forward = align(seq1, seq2, &scheme).unwrap();
        let flipped = align(seq2, seq1, &scheme).unwrap();
        assert_eq!(forward.score, flipped.score);
    }
}
