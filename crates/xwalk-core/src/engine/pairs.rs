use crate::core::models::collection::{AtomIndex, AtomList};
use crate::engine::config::DistanceConfig;
use crate::engine::digest;
use itertools::iproduct;
use std::collections::HashSet;
use tracing::debug;

/// A source-target candidate admitted by the pair specification.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePair {
    pub source: AtomIndex,
    pub target: AtomIndex,
    /// Straight-line distance in Å, computed once at enumeration.
    pub euclidean: f64,
}

/// Identity of a cross-linking site irrespective of its chain, used for
/// homomeric deduplication.
type SiteKey = (String, isize, String);

fn site_key(atoms: &AtomList, index: AtomIndex) -> SiteKey {
    let atom = atoms.get(index).expect("candidate index out of range");
    (atom.res_name.clone(), atom.res_seq, atom.name.clone())
}

/// Applies the two selectors independently and emits every admitted ordered
/// pair, in atom-list order of the sources and, per source, of the targets.
///
/// Filtering rules, in order: a pair never connects an atom to itself; the
/// intra/inter chain predicate applies; a pair already seen with its ends
/// swapped is dropped (output is undirected); under the homomeric flag,
/// pairs equivalent by residue identity across symmetric chains are emitted
/// once. Pairs are never dropped for exceeding the distance bound here; the
/// driver decides between the straight-line shortcut and the full search.
pub fn enumerate(atoms: &AtomList, config: &DistanceConfig) -> Vec<CandidatePair> {
    let eligible = config
        .digest
        .then(|| digest::cross_linkable_residues(atoms));
    let admitted = |index: AtomIndex| {
        eligible.as_ref().map_or(true, |set| {
            let atom = atoms.get(index).expect("candidate index out of range");
            set.contains(&(atom.chain_id, atom.res_seq))
        })
    };

    let sources: Vec<AtomIndex> = atoms
        .enumerate()
        .filter(|(_, atom)| config.pair.first.matches(atom))
        .map(|(index, _)| index)
        .filter(|&index| admitted(index))
        .collect();
    let targets: Vec<AtomIndex> = atoms
        .enumerate()
        .filter(|(_, atom)| config.pair.second.matches(atom))
        .map(|(index, _)| index)
        .filter(|&index| admitted(index))
        .collect();

    let mut seen_unordered: HashSet<(AtomIndex, AtomIndex)> = HashSet::new();
    let mut seen_sites: HashSet<(SiteKey, SiteKey)> = HashSet::new();
    let mut pairs = Vec::new();

    for (&source, &target) in iproduct!(sources.iter(), targets.iter()) {
        if source == target {
            continue;
        }
        let source_atom = atoms.get(source).expect("candidate index out of range");
        let target_atom = atoms.get(target).expect("candidate index out of range");

        if config.intra_only && source_atom.chain_id != target_atom.chain_id {
            continue;
        }
        if config.inter_only && source_atom.chain_id == target_atom.chain_id {
            continue;
        }

        if !seen_unordered.insert((source.min(target), source.max(target))) {
            continue;
        }

        if config.homomeric {
            let a = site_key(atoms, source);
            let b = site_key(atoms, target);
            let key = if a <= b { (a, b) } else { (b, a) };
            if !seen_sites.insert(key) {
                continue;
            }
        }

        pairs.push(CandidatePair {
            source,
            target,
            euclidean: source_atom.distance_to(target_atom),
        });
    }

    debug!(
        sources = sources.len(),
        targets = targets.len(),
        pairs = pairs.len(),
        "Candidate pairs enumerated."
    );
    pairs
}
