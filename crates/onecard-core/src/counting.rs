//! Exact counting of ordered rank assignments over disjoint atoms.

use crate::model::mask::RankMask;
use std::collections::BTreeMap;

/// How many seats draw a distinct rank from each atom.
///
/// Ordered by mask value, so for disjoint atoms the first entry is the lowest-rank atom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomWeights {
    entries: BTreeMap<RankMask, u32>,
}

impl AtomWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tallies one seat per listed atom.
    pub fn from_assignment(assignment: &[RankMask]) -> Self {
        let mut weights = Self::new();
        for &atom in assignment {
            weights.add(atom, 1);
        }
        weights
    }

    pub fn get(&self, atom: RankMask) -> u32 {
        self.entries.get(&atom).copied().unwrap_or(0)
    }

    pub fn set(&mut self, atom: RankMask, weight: u32) {
        self.entries.insert(atom, weight);
    }

    pub fn add(&mut self, atom: RankMask, weight: u32) {
        *self.entries.entry(atom).or_insert(0) += weight;
    }

    pub fn remove(&mut self, atom: RankMask) -> Option<u32> {
        self.entries.remove(&atom)
    }

    /// Lowest atom and the number of seats drawing from it.
    pub fn lowest(&self) -> Option<(RankMask, u32)> {
        self.entries
            .first_key_value()
            .map(|(atom, weight)| (*atom, *weight))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RankMask, u32)> + '_ {
        self.entries.iter().map(|(atom, weight)| (*atom, *weight))
    }

    /// Copy with one extra seat drawing from `atom`.
    pub fn with_extra(&self, atom: RankMask) -> Self {
        let mut bumped = self.clone();
        bumped.add(atom, 1);
        bumped
    }
}

/// Product over atoms of the falling factorial `w·(w-1)···(w-k+1)` for atom width `w` and
/// weight `k`. A weight above the width yields zero.
pub fn count_assignments(weights: &AtomWeights) -> u128 {
    let mut total: u128 = 1;
    for (atom, weight) in weights.iter() {
        let width = atom.width();
        assert!(width > 0, "atom {atom} has no ranks");
        if weight > width {
            return 0;
        }
        for taken in 0..weight {
            total *= u128::from(width - taken);
        }
    }
    total
}

/// Every way of picking one atom per seat, first seat varying slowest.
#[derive(Debug, Clone)]
pub struct AtomChoices<'a> {
    options: &'a [Vec<RankMask>],
    cursor: Vec<usize>,
    exhausted: bool,
}

impl<'a> AtomChoices<'a> {
    pub fn new(options: &'a [Vec<RankMask>]) -> Self {
        Self {
            options,
            cursor: vec![0; options.len()],
            exhausted: options.iter().any(Vec::is_empty),
        }
    }
}

impl Iterator for AtomChoices<'_> {
    type Item = Vec<RankMask>;

    fn next(&mut self) -> Option<Vec<RankMask>> {
        if self.exhausted {
            return None;
        }
        let choice = self
            .cursor
            .iter()
            .zip(self.options)
            .map(|(&idx, atoms)| atoms[idx])
            .collect();

        self.exhausted = true;
        for seat in (0..self.cursor.len()).rev() {
            self.cursor[seat] += 1;
            if self.cursor[seat] < self.options[seat].len() {
                self.exhausted = false;
                break;
            }
            self.cursor[seat] = 0;
        }
        Some(choice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mask::range_to_mask;

    #[test]
    fn empty_map_counts_one() {
        assert_eq!(count_assignments(&AtomWeights::new()), 1);
    }

    #[test]
    fn single_atom_is_falling_factorial() {
        let mut weights = AtomWeights::new();
        weights.set(range_to_mask(0, 50), 3);
        assert_eq!(count_assignments(&weights), 51 * 50 * 49);
    }

    #[test]
    fn atoms_multiply_independently() {
        let weights = AtomWeights::from_assignment(&[
            range_to_mask(0, 4),
            range_to_mask(5, 50),
            range_to_mask(0, 4),
        ]);
        assert_eq!(weights.get(range_to_mask(0, 4)), 2);
        assert_eq!(count_assignments(&weights), 5 * 4 * 46);
    }

    #[test]
    fn overfull_atom_counts_zero() {
        let mut weights = AtomWeights::new();
        weights.set(range_to_mask(7, 8), 3);
        assert_eq!(count_assignments(&weights), 0);
    }

    #[test]
    fn lowest_is_lowest_rank_atom() {
        let weights = AtomWeights::from_assignment(&[range_to_mask(12, 50), range_to_mask(3, 11)]);
        assert_eq!(weights.lowest(), Some((range_to_mask(3, 11), 1)));
        let bumped = weights.with_extra(range_to_mask(3, 11));
        assert_eq!(bumped.get(range_to_mask(3, 11)), 2);
        assert_eq!(weights.get(range_to_mask(3, 11)), 1);
    }

    #[test]
    fn choices_enumerate_cartesian_product() {
        let a = range_to_mask(0, 1);
        let b = range_to_mask(2, 3);
        let c = range_to_mask(4, 5);
        let options = vec![vec![a, b], vec![c], vec![a, c]];
        let all: Vec<_> = AtomChoices::new(&options).collect();
        assert_eq!(
            all,
            vec![vec![a, c, a], vec![a, c, c], vec![b, c, a], vec![b, c, c]]
        );
    }

    #[test]
    fn choices_edge_cases() {
        assert_eq!(AtomChoices::new(&[]).collect::<Vec<_>>(), vec![Vec::new()]);
        let options = vec![vec![range_to_mask(0, 0)], Vec::new()];
        assert_eq!(AtomChoices::new(&options).count(), 0);
    }
}
