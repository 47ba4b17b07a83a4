//! Staple and stitch notation for '-'-delimited peptide sequences.
//!
//! A sequence column holds one residue per token, e.g.
//! `Ac-A-S5-L-K-E-S5-Q-NH2`. Punctuation marks staple residues with `$`
//! and stitch residues with `$$`; merging folds each cross-linked group into
//! its first position and leaves `STAP`, `WAHL` or `LACT` placeholders
//! behind so every row keeps the same token count.

mod merge;
mod punctuation;
pub mod vocabulary;

use polars::prelude::DataFrame;
use tracing::debug;

use dpb_model::Result;

use crate::util::map_text_column;

pub use merge::{Marking, merge_residues};
pub use punctuation::punctuate;

/// Mark staple (`$`) and stitch (`$$`) residues in `column`, writing the
/// marked sequence to `output_column`.
pub fn add_punctuation_staples_and_stitches(
    df: &DataFrame,
    column: &str,
    output_column: &str,
) -> Result<DataFrame> {
    debug!(column, output_column, "punctuating staples and stitches");
    map_text_column(df, column, output_column, punctuate)
}

/// Merge cross-linked residues of an already-marked sequence column.
///
/// Only tokens carrying their `$`/`$$` marker take part; unmarked staple
/// residues are left where they are.
pub fn concatenate_stitches_and_staples(
    df: &DataFrame,
    column: &str,
    output_column: &str,
) -> Result<DataFrame> {
    debug!(column, output_column, "merging marked staples and stitches");
    map_text_column(df, column, output_column, |seq| {
        merge_residues(seq, Marking::Required)
    })
}

/// Merge cross-linked residues, accepting marked and unmarked sequences.
pub fn concatenate_stitches_and_staples2(
    df: &DataFrame,
    column: &str,
    output_column: &str,
) -> Result<DataFrame> {
    debug!(column, output_column, "merging staples and stitches");
    map_text_column(df, column, output_column, |seq| {
        merge_residues(seq, Marking::Optional)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn sequences(values: &[Option<&str>]) -> DataFrame {
        df! { "seq" => values.to_vec() }.unwrap()
    }

    #[test]
    fn punctuation_writes_output_column() {
        let df = sequences(&[Some("Ac-S5-A-A-A-S5-NH2"), None]);
        let out = add_punctuation_staples_and_stitches(&df, "seq", "marked").unwrap();
        let marked = out.column("marked").unwrap();
        assert_eq!(
            marked.get(0).unwrap(),
            AnyValue::String("Ac-$S5-A-A-A-$S5-NH2")
        );
        assert_eq!(marked.get(1).unwrap(), AnyValue::Null);
        // Source column is untouched.
        assert_eq!(
            out.column("seq").unwrap().get(0).unwrap(),
            AnyValue::String("Ac-S5-A-A-A-S5-NH2")
        );
    }

    #[test]
    fn merge_variants_differ_on_unmarked_input() {
        let df = sequences(&[Some("Ac-S5-A-A-A-R8-NH2")]);
        let v1 = concatenate_stitches_and_staples(&df, "seq", "merged").unwrap();
        let v2 = concatenate_stitches_and_staples2(&df, "seq", "merged").unwrap();
        assert_eq!(
            v1.column("merged").unwrap().get(0).unwrap(),
            AnyValue::String("Ac-S5-A-A-A-R8-NH2")
        );
        assert_eq!(
            v2.column("merged").unwrap().get(0).unwrap(),
            AnyValue::String("Ac-$S5$R8-A-A-A-STAP-NH2")
        );
    }

    #[test]
    fn unknown_column_is_reported() {
        let df = sequences(&[Some("A")]);
        let err = concatenate_stitches_and_staples2(&df, "missing", "out").unwrap_err();
        assert!(matches!(err, dpb_model::TableError::UnknownColumn { .. }));
    }
}
