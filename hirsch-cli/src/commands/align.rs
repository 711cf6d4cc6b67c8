use super::command::{Command, ValueEnum};
use anyhow::{ensure, Context, Result};
use clap::{
    builder::{PossibleValuesParser, TypedValueParser as _},
    Parser,
};
use hirsch::{
    align::{align, Blosum62, DnaFull, SchemeKind, ScoringScheme, SimpleScheme},
    util::fasta::{read_fasta, FastaSeq},
};
use log::{info, warn};
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
};

impl ValueEnum for SchemeKind {
    fn variants<'a>() -> &'a [Self] {
        &[Self::Simple, Self::DnaFull, Self::Blosum62]
    }
}

/// Computes the optimal global alignment of two sequences read from FASTA.
///
/// Every symbol of both sequences appears in the output, padded with gap
/// columns where needed.  The alignment is computed with Hirschberg's
/// linear-space divide-and-conquer, so arbitrarily long sequences need only
/// memory proportional to their combined length, not to the product of their
/// lengths.
///
/// The scoring scheme is selected with `--scheme`:
/// - simple: uniform match/mismatch costs over any alphabet.
/// - dna-full: the EDNAFULL substitution table over the IUPAC DNA alphabet.
/// - blosum62: the BLOSUM62 protein substitution table.
///
/// Only the first sequence of each input FASTA is aligned; additional records
/// are ignored with a warning.  The result is written as fixed-width paired
/// sequence blocks followed by the total score.
#[derive(Parser, Debug, Clone)]
#[clap(version, term_width = 0)]
pub struct Align {
    /// The path to the FASTA with the first sequence.
    #[clap(long, short = '1', display_order = 1)]
    seq1_fasta: PathBuf,

    /// The path to the FASTA with the second sequence.
    #[clap(long, short = '2', display_order = 2)]
    seq2_fasta: PathBuf,

    /// The scoring scheme:
    /// - simple: uniform match/mismatch costs over any alphabet.
    /// - dna-full: the EDNAFULL substitution table (IUPAC DNA).
    /// - blosum62: the BLOSUM62 protein substitution table.
    #[clap(
        long,
        short = 'a',
        value_parser = PossibleValuesParser::new(SchemeKind::possible_values())
            .map(|s| s.parse::<SchemeKind>().unwrap()),
        default_value_t = SchemeKind::Simple,
        ignore_case = true,
        display_order = 3,
        verbatim_doc_comment
    )]
    scheme: SchemeKind,

    /// Score for a sequence match, for the simple scheme
    #[clap(long, short = 'A', default_value = "1", display_order = 4)]
    match_score: i32,

    /// Score for a sequence mismatch, for the simple scheme (must be negative)
    #[clap(
        long,
        short = 'B',
        default_value = "-1",
        allow_hyphen_values = true,
        display_order = 5
    )]
    mismatch_score: i32,

    /// Score for one gap column (must be negative)
    #[clap(
        long,
        short = 'g',
        default_value = "-5",
        allow_hyphen_values = true,
        display_order = 6
    )]
    gap_cost: i32,

    /// The path to write the alignment to; stdout if not given.
    #[clap(long, short = 'o', display_order = 7)]
    output: Option<PathBuf>,
}

impl Align {
    /// Executes the align command
    pub fn execute(&self) -> Result<()> {
        ensure!(self.gap_cost <= 0, "--gap-cost can't be positive");

        info!("Reading the first sequence from {}", self.seq1_fasta.display());
        let seq1 = first_fasta_seq(&self.seq1_fasta)?;
        info!("Reading the second sequence from {}", self.seq2_fasta.display());
        let seq2 = first_fasta_seq(&self.seq2_fasta)?;

        let scheme: Box<dyn ScoringScheme> = match self.scheme {
            SchemeKind::Simple => Box::new(SimpleScheme::new(
                self.match_score,
                self.mismatch_score,
                self.gap_cost,
            )),
            SchemeKind::DnaFull => Box::new(DnaFull::new(self.gap_cost)),
            SchemeKind::Blosum62 => Box::new(Blosum62::new(self.gap_cost)),
        };

        info!(
            "Aligning {} ({} symbols) against {} ({} symbols) with the {} scheme",
            seq1.name,
            seq1.len(),
            seq2.name,
            seq2.len(),
            self.scheme
        );
        let alignment = align(&seq1.seq, &seq2.seq, scheme.as_ref())?;
        info!("Alignment score: {}", alignment.score);

        match &self.output {
            Some(path) => {
                let handle = File::create(path)
                    .with_context(|| format!("Could not create {}", path.display()))?;
                let mut writer = BufWriter::new(handle);
                writeln!(writer, "{alignment}")?;
            }
            None => {
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{alignment}")?;
            }
        }

        Ok(())
    }
}

/// Reads the first sequence of a FASTA file, warning if more are present.
fn first_fasta_seq(path: &PathBuf) -> Result<FastaSeq> {
    let mut seqs = read_fasta(path)?;
    if seqs.len() > 1 {
        warn!(
            "Found {} sequences in {}; aligning only the first",
            seqs.len(),
            path.display()
        );
    }
    Ok(seqs.remove(0))
}

impl Command for Align {
    fn execute(&self) -> Result<()> {
        Align::execute(self)
    }
}
