//! Interaction centers (spec §3.1 "Interaction center (IC)", component C2).
//! A compact record binding 1-3 atoms with a geometry tag, used by every
//! scoring term that needs a point, a point-with-axis, or a plane.

use crate::geom::Vec3;
use crate::model::{Atom, AtomId, Model};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geom {
    None,
    Plane,
    LonePair,
}

#[derive(Debug, Clone)]
pub struct InteractionCenter {
    pub a1: AtomId,
    pub a2: Option<AtomId>,
    pub a3: Option<AtomId>,
    pub geom: Geom,
}

impl InteractionCenter {
    pub fn single(a1: AtomId, _anchor: Vec3, geom: Geom) -> InteractionCenter {
        InteractionCenter { a1, a2: None, a3: None, geom }
    }

    pub fn point_axis(a1: AtomId, a2: AtomId) -> InteractionCenter {
        InteractionCenter { a1, a2: Some(a2), a3: None, geom: Geom::None }
    }

    pub fn plane(a1: AtomId, a2: AtomId, a3: AtomId) -> InteractionCenter {
        InteractionCenter { a1, a2: Some(a2), a3: Some(a3), geom: Geom::Plane }
    }

    pub fn lone_pair(a1: AtomId, a2: AtomId, a3: AtomId) -> InteractionCenter {
        InteractionCenter { a1, a2: Some(a2), a3: Some(a3), geom: Geom::LonePair }
    }

    /// Sortable/dedupable key used by `InteractionGrid::unique`.
    pub fn identity_key(&self) -> (AtomId, Option<AtomId>, Option<AtomId>, u8) {
        (
            self.a1,
            self.a2,
            self.a3,
            match self.geom {
                Geom::None => 0,
                Geom::Plane => 1,
                Geom::LonePair => 2,
            },
        )
    }

    /// Expands any pseudo-atom referenced by this IC to its constituents;
    /// for a real atom, returns the atom id itself.
    pub fn atom_list(&self, model: &Model) -> Vec<AtomId> {
        let mut out = Vec::new();
        for id in [Some(self.a1), self.a2, self.a3].into_iter().flatten() {
            if let Some(pseudo) = model.pseudo_atoms.iter().find(|p| p.atom.id == id) {
                out.extend(pseudo.constituents.iter().copied());
            } else {
                out.push(id);
            }
        }
        out
    }

    /// An IC is enabled iff any constituent atom (after pseudo-atom
    /// expansion) is enabled (spec §3.2 invariant).
    pub fn enabled(&self, model: &Model) -> bool {
        self.atom_list(model)
            .iter()
            .filter_map(|id| model.atom(*id))
            .any(|a| a.enabled)
    }

    fn resolve<'a>(&self, model: &'a Model) -> Vec<&'a Atom> {
        [Some(self.a1), self.a2, self.a3]
            .into_iter()
            .flatten()
            .filter_map(|id| model.atom(id))
            .collect()
    }

    /// The anchor point for grid binding and distance calculations: a1's
    /// coordinate (the donor H, the metal, the centroid pseudo-atom, ...).
    pub fn anchor(&self, model: &Model) -> Option<Vec3> {
        model.atom(self.a1).map(|a| a.coord)
    }

    /// Directional axis for a two-atom (point+axis) IC: from the parent
    /// (a2) through the anchor (a1), pointing "outward".
    pub fn axis(&self, model: &Model) -> Option<Vec3> {
        let a1 = model.atom(self.a1)?.coord;
        let a2 = model.atom(self.a2?)?.coord;
        Some((a1 - a2).normalized())
    }

    /// Plane normal for `Plane`/`LonePair` ICs: a1 is the in-plane anchor
    /// (e.g. ring centroid or carboxylate carbon), a2/a3 the two other
    /// in-plane atoms.
    pub fn plane_normal(&self, model: &Model) -> Option<Vec3> {
        if self.geom == Geom::None {
            return None;
        }
        let p1 = model.atom(self.a1)?.coord;
        let p2 = model.atom(self.a2?)?.coord;
        let p3 = model.atom(self.a3?)?.coord;
        Some((p2 - p1).cross(&(p3 - p1)).normalized())
    }

    /// In-plane lone-pair direction for a `LonePair` IC: the component of
    /// the bisector of (a2-a1),(a3-a1) orthogonal to the plane normal,
    /// negated so it points away from the ring/bonded neighbours.
    pub fn lone_pair_direction(&self, model: &Model) -> Option<Vec3> {
        if self.geom != Geom::LonePair {
            return None;
        }
        let p1 = model.atom(self.a1)?.coord;
        let p2 = model.atom(self.a2?)?.coord;
        let p3 = model.atom(self.a3?)?.coord;
        let bisector = (p2 - p1).normalized() + (p3 - p1).normalized();
        Some(-bisector.normalized())
    }

    pub fn resolved_atoms<'a>(&self, model: &'a Model) -> Vec<&'a Atom> {
        self.resolve(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Atom;

    fn model_with(coords: &[(AtomId, f64, f64, f64)]) -> Model {
        let atoms = coords
            .iter()
            .map(|&(id, x, y, z)| Atom::new(id, "C", Vec3::new(x, y, z)))
            .collect();
        Model::new("m", atoms)
    }

    #[test]
    fn enabled_is_disjunction_over_atoms() {
        let mut model = model_with(&[(1, 0.0, 0.0, 0.0), (2, 1.0, 0.0, 0.0)]);
        model.atom_mut(1).unwrap().enabled = false;
        model.atom_mut(2).unwrap().enabled = true;
        let ic = InteractionCenter::point_axis(1, 2);
        assert!(ic.enabled(&model));
        model.atom_mut(2).unwrap().enabled = false;
        assert!(!ic.enabled(&model));
    }

    #[test]
    fn plane_normal_orthogonal_to_both_edges() {
        let model = model_with(&[(1, 0.0, 0.0, 0.0), (2, 1.0, 0.0, 0.0), (3, 0.0, 1.0, 0.0)]);
        let ic = InteractionCenter::plane(1, 2, 3);
        let n = ic.plane_normal(&model).unwrap();
        assert!((n.dot(&Vec3::new(1.0, 0.0, 0.0))).abs() < 1e-9);
        assert!((n.dot(&Vec3::new(0.0, 1.0, 0.0))).abs() < 1e-9);
    }

    #[test]
    fn axis_points_from_parent_to_anchor() {
        let model = model_with(&[(1, 1.0, 0.0, 0.0), (2, 0.0, 0.0, 0.0)]);
        let ic = InteractionCenter::point_axis(1, 2);
        let axis = ic.axis(&model).unwrap();
        assert!((axis.x - 1.0).abs() < 1e-9);
    }
}
