//! Residue vocabularies recognised by the staple/stitch notation.

/// S-configured hydrocarbon and pyrrolidine staples.
pub const S_STAPLES: &[&str] = &[
    "S4", "S5", "S6", "S7", "S8", "S9", "PyrS", "PyrS1", "PyrS2", "PyrS3", "PyrS4", "PyrS5",
    "SgN", "SdN", "SeN", "PL3",
];

/// R-configured counterparts of [`S_STAPLES`].
pub const R_STAPLES: &[&str] = &[
    "R4", "R5", "R6", "R7", "R8", "R9", "PyrR", "PyrR1", "PyrR2", "PyrR3", "PyrR4", "PyrR5",
    "RgN", "RdN", "ReN", "PD3",
];

/// Azide and pipecolic staples.
pub const A_STAPLES: &[&str] = &["Az", "Az1", "Az2", "Az3", "SPip", "SPip1", "SPip2", "SPip3"];

pub const EXTRA_STAPLES: &[&str] = &["PD3Lac"];

/// Cysteine-family residues paired with a partner seven positions along.
pub const WAHL_STAPLES: &[&str] = &["%Cys", "%dCys", "Cys", "dCys", "aMeC", "%aMeC"];

/// Bis-olefinic stitch residues; each links to two partners.
pub const STITCHES: &[&str] = &["B4", "B5", "B6", "B7", "B8", "B9"];

/// Distance between paired Wahl residues.
pub const WAHL_SPACING: usize = 7;

pub const STAPLE_MARK: &str = "$";
pub const STITCH_MARK: &str = "$$";
pub const LACTAM_MARK: char = '*';

/// Placeholders left at positions folded into an earlier residue.
pub const STAPLE_PLACEHOLDER: &str = "STAP";
pub const WAHL_PLACEHOLDER: &str = "WAHL";
pub const LACTAM_PLACEHOLDER: &str = "LACT";

pub fn is_staple(residue: &str) -> bool {
    S_STAPLES
        .iter()
        .chain(R_STAPLES)
        .chain(A_STAPLES)
        .chain(EXTRA_STAPLES)
        .any(|s| *s == residue)
}

pub fn is_stitch(residue: &str) -> bool {
    STITCHES.contains(&residue)
}

pub fn is_wahl(residue: &str) -> bool {
    WAHL_STAPLES.contains(&residue)
}

/// Residues that receive a single `$` when punctuated.
pub fn is_single_marked(residue: &str) -> bool {
    is_staple(residue) || is_wahl(residue)
}
