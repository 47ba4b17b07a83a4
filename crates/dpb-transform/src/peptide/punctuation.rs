use super::vocabulary::{STAPLE_MARK, STITCH_MARK, is_single_marked, is_stitch};

/// Prefix every interior staple token with `$` and every interior stitch
/// token with `$$`.
///
/// Only tokens with a `-` on both sides are candidates, so the N- and
/// C-terminal caps are never marked. A marked token consumes its trailing
/// `-`, so in a run of identical residues only every other one is marked
/// (`Ac-S5-S5-S5-NH2` becomes `Ac-$S5-S5-$S5-NH2`). Tokens already carrying
/// a marker do not match the vocabulary and are left alone.
pub fn punctuate(sequence: &str) -> String {
    let tokens: Vec<&str> = sequence.split('-').collect();
    let last = tokens.len().saturating_sub(1);
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    let mut previous_marked: Option<&str> = None;
    for (idx, token) in tokens.iter().copied().enumerate() {
        let mark = if idx == 0 || idx == last || previous_marked == Some(token) {
            None
        } else if is_stitch(token) {
            Some(STITCH_MARK)
        } else if is_single_marked(token) {
            Some(STAPLE_MARK)
        } else {
            None
        };
        previous_marked = mark.map(|_| token);
        out.push(match mark {
            Some(mark) => format!("{mark}{token}"),
            None => token.to_string(),
        });
    }
    out.join("-")
}
