use std::path::Path;

/// Returns true if the path ends with one of the given file extensions
fn is_path_with_extension<P: AsRef<Path>>(p: &P, extensions: [&str; 2]) -> bool {
    if let Some(ext) = p.as_ref().extension() {
        match ext.to_str() {
            Some(x) => extensions.contains(&x),
            None => false,
        }
    } else {
        false
    }
}

/// The set of file extensions to treat as GZIPPED
const GZIP_EXTENSIONS: [&str; 2] = ["gz", "bgz"];

/// Returns true if the path ends with a recognized GZIP file extension
pub fn is_gzip_path<P: AsRef<Path>>(p: &P) -> bool {
    is_path_with_extension(p, GZIP_EXTENSIONS)
}

/// The set of file extensions to treat as FASTA
const FASTA_EXTENSIONS: [&str; 2] = ["fasta", "fa"];

/// Returns true if the path ends with a recognized FASTA file extension
pub fn is_fasta_path<P: AsRef<Path>>(p: &P) -> bool {
    is_path_with_extension(p, FASTA_EXTENSIONS)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{is_fasta_path, is_gzip_path};

    #[rstest]
    #[case("seqs.fasta", true, false)]
    #[case("seqs.fa", true, false)]
    #[case("seqs.fasta.gz", false, true)]
    #[case("seqs.fa.bgz", false, true)]
    #[case("seqs.txt", false, false)]
    #[case("seqs", false, false)]
    fn test_path_extensions(#[case] path: &str, #[case] fasta: bool, #[case] gzip: bool) {
        assert_eq!(is_fasta_path(&path), fasta);
        assert_eq!(is_gzip_path(&path), gzip);
    }
}
