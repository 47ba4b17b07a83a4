use super::vocabulary::{
    LACTAM_MARK, LACTAM_PLACEHOLDER, STAPLE_MARK, STAPLE_PLACEHOLDER, STITCH_MARK,
    WAHL_PLACEHOLDER, WAHL_SPACING, WAHL_STAPLES, is_staple, is_stitch, is_wahl,
};

/// Whether residues must already carry their `$`/`$$` marker to be merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marking {
    /// Only marked tokens are recognised; merged text is the raw tokens.
    Required,
    /// Markers are stripped before matching and re-applied canonically.
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CrossLink {
    Staple,
    Stitch,
}

/// A residue taking part in a cross-link, with the text it contributes to
/// the merged token.
#[derive(Debug)]
struct Tagged {
    position: usize,
    text: String,
}

#[derive(Debug, Default)]
struct Classified {
    links: Vec<(Tagged, CrossLink)>,
    wahl: Vec<Tagged>,
    lactams: Vec<Tagged>,
}

fn strip_marker(token: &str) -> &str {
    token
        .strip_prefix(STITCH_MARK)
        .or_else(|| token.strip_prefix(STAPLE_MARK))
        .unwrap_or(token)
}

fn classify_link(token: &str, marking: Marking) -> Option<(CrossLink, String)> {
    match marking {
        Marking::Required => {
            if let Some(base) = token.strip_prefix(STITCH_MARK) {
                is_stitch(base).then(|| (CrossLink::Stitch, token.to_string()))
            } else if let Some(base) = token.strip_prefix(STAPLE_MARK) {
                is_staple(base).then(|| (CrossLink::Staple, token.to_string()))
            } else {
                None
            }
        }
        Marking::Optional => {
            let base = strip_marker(token);
            if is_stitch(base) {
                Some((CrossLink::Stitch, format!("{STITCH_MARK}{base}")))
            } else if is_staple(base) {
                Some((CrossLink::Staple, format!("{STAPLE_MARK}{base}")))
            } else {
                None
            }
        }
    }
}

fn classify_wahl(token: &str, marking: Marking) -> Option<String> {
    match marking {
        Marking::Required => token
            .strip_prefix(STAPLE_MARK)
            .filter(|base| is_wahl(base))
            .map(|_| token.to_string()),
        Marking::Optional => {
            let base = strip_marker(token);
            WAHL_STAPLES
                .iter()
                .any(|w| base.ends_with(w))
                .then(|| format!("{STAPLE_MARK}{base}"))
        }
    }
}

fn classify(tokens: &[String], marking: Marking) -> Classified {
    let mut classified = Classified::default();
    for (position, token) in tokens.iter().enumerate() {
        if let Some((kind, text)) = classify_link(token, marking) {
            classified.links.push((Tagged { position, text }, kind));
        } else if let Some(text) = classify_wahl(token, marking) {
            classified.wahl.push(Tagged { position, text });
        }
        if token.contains(LACTAM_MARK) {
            classified.lactams.push(Tagged {
                position,
                text: token.clone(),
            });
        }
    }
    classified
}

/// Fold staple and stitch partners into the first residue of each group.
///
/// Partners pair up in encounter order. When the second member of a pair is
/// a stitch, the next residue is folded in as well and both trailing
/// positions become placeholders.
fn merge_links(tokens: &mut [String], links: &[(Tagged, CrossLink)]) {
    let mut i = 0;
    while i + 1 < links.len() {
        let (head, _) = &links[i];
        let (second, second_kind) = &links[i + 1];
        if *second_kind == CrossLink::Stitch && i + 2 < links.len() {
            let (third, _) = &links[i + 2];
            tokens[head.position] = format!("{}{}{}", head.text, second.text, third.text);
            tokens[second.position] = STAPLE_PLACEHOLDER.to_string();
            tokens[third.position] = STAPLE_PLACEHOLDER.to_string();
            i += 3;
        } else {
            tokens[head.position] = format!("{}{}", head.text, second.text);
            tokens[second.position] = STAPLE_PLACEHOLDER.to_string();
            i += 2;
        }
    }
}

fn merge_wahl(tokens: &mut [String], wahl: &[Tagged]) {
    let mut i = 0;
    while i + 1 < wahl.len() {
        let (first, second) = (&wahl[i], &wahl[i + 1]);
        if second.position - first.position == WAHL_SPACING {
            tokens[first.position] = format!("{}{}", first.text, second.text);
            tokens[second.position] = WAHL_PLACEHOLDER.to_string();
            i += 2;
        } else {
            i += 1;
        }
    }
}

fn merge_lactams(tokens: &mut [String], lactams: &[Tagged]) {
    for pair in lactams.chunks_exact(2) {
        tokens[pair[0].position] = format!("{}{}", pair[0].text, pair[1].text);
        tokens[pair[1].position] = LACTAM_PLACEHOLDER.to_string();
    }
}

/// Merge cross-linked residues of one '-'-delimited sequence.
pub fn merge_residues(sequence: &str, marking: Marking) -> String {
    let mut tokens: Vec<String> = sequence.split('-').map(str::to_string).collect();
    let classified = classify(&tokens, marking);
    merge_links(&mut tokens, &classified.links);
    merge_wahl(&mut tokens, &classified.wahl);
    merge_lactams(&mut tokens, &classified.lactams);
    tokens.join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_single_staple_pair() {
        assert_eq!(
            merge_residues("Ac-$S5-A-A-A-$S5-NH2", Marking::Optional),
            "Ac-$S5$S5-A-A-A-STAP-NH2"
        );
    }

    #[test]
    fn unmarked_input_is_canonicalised() {
        assert_eq!(
            merge_residues("Ac-R8-A-A-A-A-A-A-S5-NH2", Marking::Optional),
            "Ac-$R8$S5-A-A-A-A-A-A-STAP-NH2"
        );
    }

    #[test]
    fn stitch_folds_three_residues() {
        assert_eq!(
            merge_residues("Ac-$R8-A-A-$$B5-A-A-$S8-NH2", Marking::Optional),
            "Ac-$R8$$B5$S8-A-A-STAP-A-A-STAP-NH2"
        );
    }

    #[test]
    fn stitch_at_end_pairs_normally() {
        assert_eq!(
            merge_residues("Ac-$S5-A-$$B5-NH2", Marking::Optional),
            "Ac-$S5$$B5-A-STAP-NH2"
        );
    }

    #[test]
    fn two_independent_pairs() {
        assert_eq!(
            merge_residues("S5-A-S5-R8-A-R8", Marking::Optional),
            "$S5$S5-A-STAP-$R8$R8-A-STAP"
        );
    }

    #[test]
    fn odd_staple_is_left_alone() {
        assert_eq!(
            merge_residues("Ac-$S5-A-A-NH2", Marking::Optional),
            "Ac-$S5-A-A-NH2"
        );
    }

    #[test]
    fn wahl_pairs_need_spacing_of_seven() {
        assert_eq!(
            merge_residues("Ac-$Cys-A-A-A-A-A-A-$Cys-NH2", Marking::Optional),
            "Ac-$Cys$Cys-A-A-A-A-A-A-WAHL-NH2"
        );
        assert_eq!(
            merge_residues("Ac-$Cys-A-A-$Cys-NH2", Marking::Optional),
            "Ac-$Cys-A-A-$Cys-NH2"
        );
    }

    #[test]
    fn wahl_skips_unpaired_leader() {
        // The first Cys has no partner seven along; the second and third pair.
        assert_eq!(
            merge_residues("Cys-A-Cys-A-A-A-A-A-A-dCys", Marking::Optional),
            "Cys-A-$Cys$dCys-A-A-A-A-A-A-WAHL"
        );
    }

    #[test]
    fn lactams_pair_in_order() {
        assert_eq!(
            merge_residues("Ac-K*-A-A-A-E*-A-K*-NH2", Marking::Optional),
            "Ac-K*E*-A-A-A-LACT-A-K*-NH2"
        );
    }

    #[test]
    fn required_marking_ignores_bare_residues() {
        assert_eq!(
            merge_residues("Ac-S5-A-$S5-A-$R8-NH2", Marking::Required),
            "Ac-S5-A-$S5$R8-A-STAP-NH2"
        );
    }

    #[test]
    fn required_marking_checks_marker_family() {
        // A stitch residue with a single marker is not a stitch.
        assert_eq!(
            merge_residues("Ac-$B5-A-$$B5-NH2", Marking::Required),
            "Ac-$B5-A-$$B5-NH2"
        );
    }

    #[test]
    fn token_count_is_preserved() {
        let input = "Ac-$R8-A-$$B5-A-$S8-K*-E*-NH2";
        let merged = merge_residues(input, Marking::Optional);
        assert_eq!(merged.split('-').count(), input.split('-').count());
    }
}
