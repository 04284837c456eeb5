use super::atom::Atom;
use crate::core::utils::geometry::BoundingBox;
use std::collections::BTreeMap;

/// Index of an atom within an [`AtomList`]. Stable for the lifetime of the list.
pub type AtomIndex = usize;

/// An ordered collection of atoms.
///
/// Order matches the input file and is preserved by every accessor; the
/// distance engine itself attaches no meaning to it beyond determinism.
#[derive(Debug, Clone, Default)]
pub struct AtomList {
    atoms: Vec<Atom>,
}

impl AtomList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, atom: Atom) -> AtomIndex {
        self.atoms.push(atom);
        self.atoms.len() - 1
    }

    pub fn get(&self, index: AtomIndex) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn get_mut(&mut self, index: AtomIndex) -> Option<&mut Atom> {
        self.atoms.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Atom> {
        self.atoms.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Atom> {
        self.atoms.iter_mut()
    }

    /// Iterator over `(index, atom)` pairs in input order.
    pub fn enumerate(&self) -> impl Iterator<Item = (AtomIndex, &Atom)> {
        self.atoms.iter().enumerate()
    }

    /// Bounding box over all atom centres, or `None` for an empty list.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.atoms.iter().map(|a| &a.position))
    }

    /// The largest van der Waals radius in the list (0.0 for an empty list).
    pub fn max_vdw_radius(&self) -> f64 {
        self.atoms.iter().map(|a| a.vdw_radius).fold(0.0, f64::max)
    }

    /// Residue sequence per chain, keyed by chain identifier. Each entry is
    /// the ordered list of `(res_seq, res_name)` for distinct residues, in
    /// input order. Used by the digestion filter.
    pub fn chain_residues(&self) -> BTreeMap<char, Vec<(isize, String)>> {
        let mut chains: BTreeMap<char, Vec<(isize, String)>> = BTreeMap::new();
        for atom in &self.atoms {
            let residues = chains.entry(atom.chain_id).or_default();
            if residues.last().map(|(seq, _)| *seq) != Some(atom.res_seq) {
                residues.push((atom.res_seq, atom.res_name.clone()));
            }
        }
        chains
    }
}

impl FromIterator<Atom> for AtomList {
    fn from_iter<T: IntoIterator<Item = Atom>>(iter: T) -> Self {
        Self {
            atoms: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a AtomList {
    type Item = &'a Atom;
    type IntoIter = std::slice::Iter<'a, Atom>;

    fn into_iter(self) -> Self::IntoIter {
        self.atoms.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::{AtomFlags, Element};
    use nalgebra::Point3;

    fn atom(serial: usize, chain_id: char, res_seq: isize, name: &str, x: f64) -> Atom {
        Atom {
            serial,
            name: name.to_string(),
            alt_loc: ' ',
            res_name: "GLY".to_string(),
            res_seq,
            i_code: ' ',
            chain_id,
            position: Point3::new(x, 0.0, 0.0),
            element: Element::C,
            vdw_radius: 1.7,
            charge: None,
            flags: AtomFlags::default(),
        }
    }

    #[test]
    fn push_preserves_input_order() {
        let mut list = AtomList::new();
        let i0 = list.push(atom(10, 'A', 1, "N", 0.0));
        let i1 = list.push(atom(11, 'A', 1, "CA", 1.0));
        assert_eq!((i0, i1), (0, 1));
        let names: Vec<_> = list.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["N", "CA"]);
    }

    #[test]
    fn bounding_box_spans_the_list() {
        let list: AtomList = [
            atom(1, 'A', 1, "CA", -3.0),
            atom(2, 'A', 2, "CA", 7.0),
        ]
        .into_iter()
        .collect();
        let bbox = list.bounding_box().unwrap();
        assert_eq!(bbox.min.x, -3.0);
        assert_eq!(bbox.max.x, 7.0);
    }

    #[test]
    fn chain_residues_groups_by_chain_in_order() {
        let mut list = AtomList::new();
        list.push(atom(1, 'A', 1, "N", 0.0));
        list.push(atom(2, 'A', 1, "CA", 1.0));
        list.push(atom(3, 'A', 2, "N", 2.0));
        list.push(atom(4, 'B', 5, "N", 3.0));

        let chains = list.chain_residues();
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[&'A'].len(), 2);
        assert_eq!(chains[&'A'][0].0, 1);
        assert_eq!(chains[&'A'][1].0, 2);
        assert_eq!(chains[&'B'], vec![(5, "GLY".to_string())]);
    }

    #[test]
    fn max_vdw_radius_over_empty_list_is_zero() {
        assert_eq!(AtomList::new().max_vdw_radius(), 0.0);
    }
}
