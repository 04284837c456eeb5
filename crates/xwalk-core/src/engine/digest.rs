use crate::core::models::collection::AtomList;
use crate::core::utils::identifiers::one_letter_code;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Shortest peptide detectable by the downstream search engine.
pub const MIN_PEPTIDE_LENGTH: usize = 5;
/// Longest peptide detectable by the downstream search engine.
pub const MAX_PEPTIDE_LENGTH: usize = 40;
/// Missed cleavage sites allowed within one peptide.
pub const MAX_MISCLEAVAGES: usize = 1;

/// Cross-linkable peptide with the miscleavage before the linked lysine:
/// tryptic C-terminus, one central lysine, at most one internal K/R.
fn miscleavage_before_expression() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^KR]*[KR]?[^KR]*K[^KR]*[KR]$").expect("invalid expression"))
}

/// Cross-linkable peptide with the miscleavage after the linked lysine.
fn miscleavage_after_expression() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^KR]*K[^KR]*[KR]?[^KR]*[KR]$").expect("invalid expression"))
}

/// Half-open residue range of a peptide within its chain sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peptide {
    pub start: usize,
    pub end: usize,
}

/// Tryptic digestion: cleaves after lysine or arginine, except before
/// proline. Returns every peptide with up to `max_miscleavages` missed
/// cleavage sites, in N- to C-terminal order.
pub fn digest(sequence: &str, max_miscleavages: usize) -> Vec<Peptide> {
    let residues: Vec<char> = sequence.chars().collect();
    if residues.is_empty() {
        return Vec::new();
    }

    let mut cut_points = vec![0];
    for i in 0..residues.len() - 1 {
        if matches!(residues[i], 'K' | 'R') && residues[i + 1] != 'P' {
            cut_points.push(i + 1);
        }
    }
    cut_points.push(residues.len());

    let fragment_count = cut_points.len() - 1;
    let mut peptides = Vec::new();
    for first in 0..fragment_count {
        let last_limit = (first + max_miscleavages + 1).min(fragment_count);
        for last in first..last_limit {
            peptides.push(Peptide {
                start: cut_points[first],
                end: cut_points[last + 1],
            });
        }
    }
    peptides
}

/// Whether a peptide sequence is cross-linkable: detectable length and a
/// match of either published expression.
pub fn is_cross_linkable(peptide: &str) -> bool {
    let length = peptide.chars().count();
    (MIN_PEPTIDE_LENGTH..=MAX_PEPTIDE_LENGTH).contains(&length)
        && (miscleavage_before_expression().is_match(peptide)
            || miscleavage_after_expression().is_match(peptide))
}

/// Residues eligible as cross-linking sites: internal lysines of
/// cross-linkable tryptic peptides, keyed by `(chain, res_seq)`.
///
/// Chains are digested on their one-letter sequence; residues without a
/// standard code (ligands, ions) become 'X' and never match.
pub fn cross_linkable_residues(atoms: &AtomList) -> HashSet<(char, isize)> {
    let mut eligible = HashSet::new();
    for (chain, residues) in atoms.chain_residues() {
        let sequence: String = residues
            .iter()
            .map(|(_, name)| one_letter_code(name).unwrap_or('X'))
            .collect();

        for peptide in digest(&sequence, MAX_MISCLEAVAGES) {
            let seq = &sequence[peptide.start..peptide.end];
            if !is_cross_linkable(seq) {
                continue;
            }
            for (offset, residue) in seq.chars().enumerate() {
                let is_terminal = offset + 1 == seq.len();
                if residue == 'K' && !is_terminal {
                    eligible.insert((chain, residues[peptide.start + offset].0));
                }
            }
        }
    }
    eligible
}
