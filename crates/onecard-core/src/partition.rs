//! Splits overlapping rank ranges into disjoint atoms.

use crate::model::mask::{RankMask, fragment_mask};

/// Refines `range_masks` into pairwise-disjoint contiguous atoms such that every input
/// mask is exactly the union of the atoms it intersects.
pub fn deintersect_masks(range_masks: &[RankMask]) -> Vec<RankMask> {
    let mut atoms: Vec<RankMask> = Vec::new();
    for &range in range_masks {
        let mut uncovered = range;
        let mut refined = Vec::with_capacity(atoms.len() + 2);
        for atom in atoms {
            let shared = atom.intersection(uncovered);
            if shared.is_empty() {
                refined.push(atom);
                continue;
            }
            refined.push(shared);
            uncovered = uncovered.without(shared);
            refined.extend(fragment_mask(atom.without(shared)));
        }
        refined.extend(fragment_mask(uncovered));
        atoms = refined;
    }
    atoms
}

/// For each input mask, the atoms it is made of, in atom order.
pub fn atoms_per_range(range_masks: &[RankMask], atoms: &[RankMask]) -> Vec<Vec<RankMask>> {
    range_masks
        .iter()
        .map(|range| {
            atoms
                .iter()
                .copied()
                .filter(|atom| atom.intersects(*range))
                .collect()
        })
        .collect()
}
