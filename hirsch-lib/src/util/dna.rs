use lazy_static::lazy_static;

/// Valid IUPAC DNA bases, in the row/column order of the EDNAFULL
/// substitution table.
pub const IUPAC_BASES: [u8; 15] = *b"ATGCSWRYKMBVHDN";

lazy_static! {
    /// An array-based look up of the EDNAFULL table index for each IUPAC base.
    /// Entries are -1 for bytes that are not IUPAC bases.
    pub static ref IUPAC_INDEX: [i8; 256] = {
        let mut index = [-1i8; 256];
        for (i, &base) in IUPAC_BASES.iter().enumerate() {
            index[base as usize] = i as i8;
            index[base as usize + 32] = i as i8; // lowercase variants
        }
        index
    };
}

/// Returns the EDNAFULL table index for a IUPAC DNA base (either case), or
/// `None` for any other byte.
pub fn iupac_index(base: u8) -> Option<usize> {
    let idx = IUPAC_INDEX[base as usize];
    (idx >= 0).then_some(idx as usize)
}

/// Returns true if the byte is a IUPAC DNA base (either case).
pub fn is_iupac_base(base: u8) -> bool {
    IUPAC_INDEX[base as usize] >= 0
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{is_iupac_base, iupac_index};

    #[rstest]
    #[case(b'A', Some(0))]
    #[case(b'a', Some(0))]
    #[case(b'T', Some(1))]
    #[case(b'N', Some(14))]
    #[case(b'n', Some(14))]
    #[case(b'U', None)]
    #[case(b'-', None)]
    #[case(b'_', None)]
    fn test_iupac_index(#[case] base: u8, #[case] expected: Option<usize>) {
        assert_eq!(iupac_index(base), expected);
        assert_eq!(is_iupac_base(base), expected.is_some());
    }
}
