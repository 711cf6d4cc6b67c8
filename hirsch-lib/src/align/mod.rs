mod aligner;
mod alignment;
mod score_row;
mod scoring;

pub use aligner::{align, Aligner};
pub use alignment::{strip_gaps, Alignment, GAP, LINE_WIDTH};
pub use score_row::score_row;
pub use scoring::{Blosum62, DnaFull, SchemeKind, ScoringScheme, SimpleScheme};
