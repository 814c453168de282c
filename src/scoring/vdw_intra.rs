//! Intramolecular van der Waals term (spec §4.4.3): pairwise energy over
//! atoms connected through at least one rotatable bond, outside 1-3
//! exclusion, with a partition list that can be narrowed and restored.

use std::collections::HashMap;

use crate::model::{AtomId, Model};
use crate::request::Request;

use super::common::{lj_pair_energy, vdw_params};

#[derive(Debug, Clone, Default)]
pub struct VdwIntraSF {
    pub ecut: f64,
    /// Full movable-neighbour map, built once at setup.
    vdw_intns: HashMap<AtomId, Vec<AtomId>>,
    /// Narrowed copy; `Partition(0)` resets it back to `vdw_intns`.
    prt_intns: HashMap<AtomId, Vec<AtomId>>,
    /// Score recorded at first ligand assignment, subtracted from every
    /// later report so the reported score is relative (spec glossary
    /// "zero-point score").
    zero_point: f64,
}

impl VdwIntraSF {
    pub fn new(ecut: f64) -> VdwIntraSF {
        VdwIntraSF { ecut, ..Default::default() }
    }

    fn bonded_13(model: &Model) -> HashMap<AtomId, Vec<AtomId>> {
        let mut adjacency: HashMap<AtomId, Vec<AtomId>> = HashMap::new();
        for b in model.bonds.iter() {
            adjacency.entry(b.atom1).or_default().push(b.atom2);
            adjacency.entry(b.atom2).or_default().push(b.atom1);
        }
        let mut excluded: HashMap<AtomId, Vec<AtomId>> = HashMap::new();
        for atom in model.atoms.iter() {
            let mut set = vec![atom.id];
            if let Some(n1) = adjacency.get(&atom.id) {
                set.extend(n1.iter().copied());
                for &n in n1 {
                    if let Some(n2) = adjacency.get(&n) {
                        set.extend(n2.iter().copied());
                    }
                }
            }
            set.sort_unstable();
            set.dedup();
            excluded.insert(atom.id, set);
        }
        excluded
    }

    /// Builds `vdw_intns[i]` = every atom reachable through a rotatable
    /// bond, excluding 1-2/1-3 neighbours (spec §4.4.3).
    pub fn setup(&mut self, model: Option<&Model>) {
        self.vdw_intns.clear();
        self.prt_intns.clear();
        self.zero_point = 0.0;
        let Some(model) = model else { return };
        if model.rotatable_bonds.is_empty() {
            return;
        }
        let excluded = Self::bonded_13(model);
        for rb in model.rotatable_bonds.iter() {
            let fixed_side: Vec<AtomId> = model
                .atoms
                .iter()
                .map(|a| a.id)
                .filter(|id| !rb.pendant_atoms.contains(id))
                .collect();
            for &mobile in rb.pendant_atoms.iter() {
                let excl = excluded.get(&mobile).cloned().unwrap_or_default();
                for &other in fixed_side.iter() {
                    if excl.contains(&other) {
                        continue;
                    }
                    self.vdw_intns.entry(mobile).or_default().push(other);
                }
            }
        }
        for list in self.vdw_intns.values_mut() {
            list.sort_unstable();
            list.dedup();
        }
        self.prt_intns = self.vdw_intns.clone();
        self.zero_point = self.raw_score_unshifted(model);
    }

    fn raw_score_unshifted(&self, model: &Model) -> f64 {
        let mut total = 0.0;
        for (&i, neighbours) in self.prt_intns.iter() {
            let Some(ai) = model.atom(i) else { continue };
            if !ai.enabled {
                continue;
            }
            let pi = vdw_params(&ai.ff_type);
            for &j in neighbours.iter() {
                if j <= i {
                    continue; // each unordered pair counted once
                }
                let Some(aj) = model.atom(j) else { continue };
                if !aj.enabled {
                    continue;
                }
                let r = ai.coord.distance(&aj.coord);
                let pj = vdw_params(&aj.ff_type);
                total += lj_pair_energy(r, pi, pj, self.ecut);
            }
        }
        total
    }

    pub fn raw_score(&self, model: Option<&Model>) -> f64 {
        match model {
            Some(m) => self.raw_score_unshifted(m) - self.zero_point,
            None => 0.0,
        }
    }

    /// `Partition(d)` narrows `prt_intns` to pairs within `d`; `d == 0`
    /// restores the full list (spec §4.4.3, §8.2 round-trip law).
    pub fn partition(&mut self, model: Option<&Model>, d: f64) {
        if d <= 0.0 {
            self.prt_intns = self.vdw_intns.clone();
            return;
        }
        let Some(model) = model else { return };
        let mut narrowed = HashMap::new();
        for (&i, neighbours) in self.vdw_intns.iter() {
            let Some(ai) = model.atom(i) else { continue };
            let kept: Vec<AtomId> = neighbours
                .iter()
                .copied()
                .filter(|&j| model.atom(j).map(|aj| ai.coord.distance(&aj.coord) <= d).unwrap_or(false))
                .collect();
            narrowed.insert(i, kept);
        }
        self.prt_intns = narrowed;
    }

    pub fn handle_request(&mut self, req: &Request, name: &str, model: Option<&Model>) -> bool {
        match req {
            Request::Partition(d) => {
                self.partition(model, *d);
                true
            }
            Request::PartitionTerm(term, d) if term == name => {
                self.partition(model, *d);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Atom, Bond, RotatableBond};

    fn sample_model() -> Model {
        let atoms = vec![
            Atom::new(1, "C", crate::geom::Vec3::new(0.0, 0.0, 0.0)),
            Atom::new(2, "C", crate::geom::Vec3::new(1.5, 0.0, 0.0)),
            Atom::new(3, "C", crate::geom::Vec3::new(3.0, 0.0, 0.0)),
            Atom::new(4, "C", crate::geom::Vec3::new(6.0, 0.0, 0.0)),
        ];
        let mut m = Model::new("lig", atoms);
        m.bonds = vec![
            Bond { atom1: 1, atom2: 2, rotatable: false },
            Bond { atom1: 2, atom2: 3, rotatable: true },
            Bond { atom1: 3, atom2: 4, rotatable: false },
        ];
        m.rotatable_bonds = vec![RotatableBond {
            bond: Bond { atom1: 2, atom2: 3, rotatable: true },
            pendant_atoms: vec![3, 4],
        }];
        m
    }

    #[test]
    fn partition_zero_restores_full_list() {
        let model = sample_model();
        let mut sf = VdwIntraSF::new(10.0);
        sf.setup(Some(&model));
        let full = sf.vdw_intns.clone();
        sf.partition(Some(&model), 2.0);
        assert_ne!(sf.prt_intns, full);
        sf.partition(Some(&model), 0.0);
        assert_eq!(sf.prt_intns, full);
    }

    #[test]
    fn zero_point_makes_initial_score_zero() {
        let model = sample_model();
        let mut sf = VdwIntraSF::new(10.0);
        sf.setup(Some(&model));
        assert!(sf.raw_score(Some(&model)).abs() < 1e-9);
    }
}
